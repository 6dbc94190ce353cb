use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, info};

use common::config::ScoringConfig;
use common::types::{CriterionKind, RiskResult};

use super::risk_state::CriteriaSet;

/// 风险汇总指标
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Indicators {
    pub prbm: bool,   // 盈亏
    pub optr: bool,   // 经营
    pub ndss: bool,   // 税务
    pub retab: bool,  // 盈利能力
}

/// 后续检查建议
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewChecks {
    pub finance_check: bool,
    pub explanation_needed: bool,
    pub accounting_check: bool,
}

/// 风险汇总计算器：指标、评分、检查建议与最终结论
#[derive(Debug, Clone, Default)]
pub struct RiskCalculator {
    scoring: ScoringConfig,
}

impl RiskCalculator {
    pub fn new(scoring: ScoringConfig) -> Self {
        Self { scoring }
    }

    /// 汇总指标，每个指标是固定标准子集的“或”
    pub fn indicators(&self, set: &CriteriaSet) -> Indicators {
        use CriterionKind::*;

        Indicators {
            prbm: set.is_triggered(Loss),
            optr: set.is_triggered(ExpenseGrowth),
            ndss: set.is_triggered(LowTaxBurden)
                || set.is_triggered(HighVatDeduction)
                || set.is_triggered(NoExplanation),
            retab: set.is_triggered(LowProfitabilitySales)
                || set.is_triggered(LowProfitabilityAssets)
                || set.is_triggered(LowSalary)
                || set.is_triggered(ProfitabilityDeviation),
        }
    }

    pub fn review_checks(&self, set: &CriteriaSet) -> ReviewChecks {
        use CriterionKind::*;

        ReviewChecks {
            finance_check: set.risk_count() >= self.scoring.finance_check_from,
            explanation_needed: set.is_triggered(NoExplanation)
                || set.is_triggered(DoubtfulCounterparties)
                || set.is_triggered(HighVatDeduction),
            accounting_check: set.is_triggered(LowTaxBurden)
                || set.is_triggered(HighVatDeduction)
                || set.is_triggered(LocationChange)
                || set.is_triggered(Reregistration),
        }
    }

    /// 风险评分 = min(触发数 × 每项分值, 上限)，不取整
    pub fn risk_score(&self, risk_count: u32) -> f64 {
        (f64::from(risk_count) * self.scoring.points_per_criterion).min(self.scoring.max_score)
    }

    /// 触发数少于阈值为正面结论（低风险）
    pub fn is_positive(&self, risk_count: u32) -> bool {
        risk_count < self.scoring.positive_below
    }

    /// 生成最终结果
    pub fn aggregate(&self, set: CriteriaSet) -> RiskResult {
        let indicators = self.indicators(&set);
        let checks = self.review_checks(&set);
        let risk_count = set.risk_count();
        let risk_score = self.risk_score(risk_count);
        let is_positive_result = self.is_positive(risk_count);

        debug!(
            "Indicators: PRBM={}, OPTR={}, NDSS={}, RETAB={}",
            indicators.prbm, indicators.optr, indicators.ndss, indicators.retab
        );

        let profitability_sales = round2(set.value(CriterionKind::LowProfitabilitySales));

        let result = RiskResult {
            prbm: indicators.prbm,
            optr: indicators.optr,
            ndss: indicators.ndss,
            retab: indicators.retab,
            risk_score,
            risk_count,
            total_criteria: CriterionKind::ALL.len() as u32,
            finance_check: checks.finance_check,
            explanation_needed: checks.explanation_needed,
            accounting_check: checks.accounting_check,
            is_positive_result,
            tax_burden: round2(set.value(CriterionKind::LowTaxBurden)),
            avg_salary: round2(set.value(CriterionKind::LowSalary)),
            vat_deduction_ratio: round2(set.value(CriterionKind::HighVatDeduction)),
            profitability_sales,
            profitability_assets: round2(set.value(CriterionKind::LowProfitabilityAssets)),
            // 两期利润率均取期末销售利润率，增速固定为 0（保持既有口径）
            profitability_ratio_start: profitability_sales,
            profitability_ratio_end: profitability_sales,
            revenue_growth: 0.0,
            profit_growth: 0.0,
            criteria: set.into_vec(),
        };

        info!(
            "Risk verdict: {} of {} criteria, score={}, positive={}",
            result.risk_count, result.total_criteria, result.risk_score, result.is_positive_result
        );

        result
    }
}

/// 保留两位小数（银行家舍入）
///
/// 按 f64 的精确二进制值舍入，2.675 实际略小于 2.675，结果为 2.67。
pub fn round2(value: f64) -> f64 {
    Decimal::from_f64_retain(value)
        .map(|d| d.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven))
        .and_then(|d| d.to_f64())
        .unwrap_or(value)
}
