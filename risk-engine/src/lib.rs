pub mod pipeline;
pub mod risk_control;
pub mod engine;

pub use engine::RiskEngine;
