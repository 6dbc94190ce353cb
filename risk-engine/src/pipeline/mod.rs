pub mod pipeline;

pub use pipeline::{Pipeline, execute_evaluation, evaluate_criteria};
