pub mod config;
pub mod error;
pub mod input;
pub mod messages;
pub mod types;

pub use config::RiskThresholds;
pub use error::{ConfigError, RequestError};
pub use input::{RawInput, RawValue};
pub use types::{
    AnalysisInput, CriterionKind, Metric, Period, PeriodMetrics, QualitativeFlags,
    ReportingPeriod, RiskCriterion, RiskResult,
};
