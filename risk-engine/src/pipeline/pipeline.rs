use tracing::{debug, instrument};

use common::input::RawInput;
use common::types::{AnalysisInput, RiskResult};

use crate::risk_control::normalizer::normalize;
use crate::risk_control::risk_calculator::RiskCalculator;
use crate::risk_control::risk_rules::RiskRuleChain;
use crate::risk_control::risk_state::CriteriaSet;

pub trait Pipeline<T> {
    fn pipe<U, F>(self, f: F) -> U
    where
        F: FnOnce(T) -> U;
}

impl<T> Pipeline<T> for T {
    #[inline(always)]
    fn pipe<U, F>(self, f: F) -> U
    where
        F: FnOnce(T) -> U,
    {
        f(self)
    }
}

/// 归一化 -> 标准评估 -> 汇总
#[instrument(skip_all, fields(input_fields = raw.len()))]
pub fn execute_evaluation(
    raw: &RawInput,
    rules: &RiskRuleChain,
    calculator: &RiskCalculator,
) -> RiskResult {
    debug!("Starting risk evaluation pipeline");

    raw.pipe(normalize)
        .pipe(|input| evaluate_criteria(&input, rules))
        .pipe(|criteria| calculator.aggregate(criteria))
}

/// 所有规则无条件执行，结果按编号收集
#[inline(always)]
pub fn evaluate_criteria(input: &AnalysisInput, rules: &RiskRuleChain) -> CriteriaSet {
    let set = CriteriaSet::new(rules.evaluate_all(input));
    debug!(
        "Evaluated {} criteria, triggered: {:?}",
        set.iter().count(),
        set.triggered().map(|c| c.kind.name()).collect::<Vec<_>>()
    );
    set
}
