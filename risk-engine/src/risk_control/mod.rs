pub mod normalizer;
pub mod risk_rules;
pub mod risk_state;
pub mod risk_calculator;

pub use normalizer::normalize;
pub use risk_rules::{RiskRule, RiskRuleChain, create_rule_chain};
pub use risk_state::CriteriaSet;
pub use risk_calculator::{RiskCalculator, Indicators, ReviewChecks};
