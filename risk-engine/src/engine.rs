use tracing::instrument;

use common::config::RiskThresholds;
use common::input::RawInput;
use common::types::{AnalysisInput, RiskResult};

use crate::pipeline::{evaluate_criteria, execute_evaluation};
use crate::risk_control::risk_calculator::RiskCalculator;
use crate::risk_control::risk_rules::{create_rule_chain, RiskRuleChain};

/// 税务稽查风险评估引擎
///
/// 无状态：内部只持有不可变的规则链和评分参数，可跨线程共享。
/// 对任意输入都返回完整结果，从不报错。
pub struct RiskEngine {
    rules: RiskRuleChain,
    calculator: RiskCalculator,
}

impl RiskEngine {
    pub fn new(thresholds: &RiskThresholds) -> Self {
        Self {
            rules: create_rule_chain(thresholds),
            calculator: RiskCalculator::new(thresholds.scoring.clone()),
        }
    }

    /// 评估原始请求（表单或 JSON）
    pub fn evaluate(&self, raw: &RawInput) -> RiskResult {
        execute_evaluation(raw, &self.rules, &self.calculator)
    }

    /// 评估已归一化的输入
    #[instrument(skip_all)]
    pub fn evaluate_input(&self, input: &AnalysisInput) -> RiskResult {
        let criteria = evaluate_criteria(input, &self.rules);
        self.calculator.aggregate(criteria)
    }
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new(&RiskThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::CriterionKind;

    fn evaluate(pairs: &[(&str, &str)]) -> RiskResult {
        let raw = RawInput::from_pairs(pairs.iter().map(|(k, v)| (*k, *v)));
        RiskEngine::default().evaluate(&raw)
    }

    /// 一家各项指标都健康的公司
    fn healthy() -> Vec<(&'static str, &'static str)> {
        vec![
            ("period_start", "2023-01-01"),
            ("period_end", "2023-12-31"),
            ("revenue_base_start", "10000000"),
            ("revenue_base_end", "12000000"),
            ("cost_sales_base_start", "7000000"),
            ("cost_sales_base_end", "8000000"),
            ("commercial_expenses_start", "500000"),
            ("commercial_expenses_end", "500000"),
            ("management_expenses_start", "500000"),
            ("management_expenses_end", "500000"),
            ("profit_sales_start", "3000000"),
            ("profit_sales_end", "3000000"),
            ("profit_tax_base_end", "2500000"),
            ("balance_sheet_asset_end", "20000000"),
            ("total_taxes_paid_end", "1200000"),
            ("vat_accrued_end", "2000000"),
            ("vat_deduction_end", "1500000"),
            ("employee_count_end", "20"),
            ("salary_fund_end", "14400000"),
        ]
    }

    #[test]
    fn test_healthy_company_is_positive() {
        let result = evaluate(&healthy());

        assert_eq!(result.risk_count, 0);
        assert_eq!(result.risk_score, 0.0);
        assert!(result.is_positive_result);
        assert!(!result.prbm && !result.optr && !result.ndss && !result.retab);
        assert!(!result.finance_check && !result.explanation_needed && !result.accounting_check);

        // 税负 10%，月均工资 60000，抵扣占比 75%，销售利润率 25%，资产收益率 12.5%
        assert_eq!(result.tax_burden, 10.0);
        assert_eq!(result.avg_salary, 60000.0);
        assert_eq!(result.vat_deduction_ratio, 75.0);
        assert_eq!(result.profitability_sales, 25.0);
        assert_eq!(result.profitability_assets, 12.5);
    }

    #[test]
    fn test_all_zero_input_fires_denominator_fallbacks() {
        let result = RiskEngine::default().evaluate(&RawInput::new());

        for kind in [
            CriterionKind::LowTaxBurden,
            CriterionKind::LowSalary,
            CriterionKind::LowProfitabilitySales,
            CriterionKind::LowProfitabilityAssets,
            CriterionKind::ProfitabilityDeviation,
        ] {
            assert!(result.is_triggered(kind), "{} should be triggered", kind);
        }
        assert!(!result.is_triggered(CriterionKind::HighVatDeduction));
        assert!(!result.is_triggered(CriterionKind::ExpenseGrowth));
        assert_eq!(result.risk_count, 5);
        assert!(!result.is_positive_result);
        assert!(result.finance_check);
        assert_eq!(result.tax_burden, 0.0);
        assert_eq!(result.avg_salary, 0.0);
    }

    #[test]
    fn test_loss_sets_prbm() {
        let result = evaluate(&[("profit_sales_start", "-100"), ("profit_sales_end", "-50")]);
        assert!(result.is_triggered(CriterionKind::Loss));
        assert!(result.prbm);
    }

    #[test]
    fn test_high_vat_deduction_sets_ndss() {
        let result = evaluate(&[("vat_accrued_end", "1000"), ("vat_deduction_end", "900")]);
        assert_eq!(result.vat_deduction_ratio, 90.0);
        assert!(result.is_triggered(CriterionKind::HighVatDeduction));
        assert!(result.ndss);
        assert!(result.explanation_needed);
        assert!(result.accounting_check);
    }

    #[test]
    fn test_average_salary() {
        let result = evaluate(&[("employee_count_end", "10"), ("salary_fund_end", "6000000")]);
        assert_eq!(result.avg_salary, 50000.0);
        assert!(!result.is_triggered(CriterionKind::LowSalary));
    }

    #[test]
    fn test_non_numeric_field_normalizes_to_zero() {
        let mut pairs = healthy();
        pairs.retain(|(k, _)| *k != "revenue_base_end");
        pairs.push(("revenue_base_end", "abc"));

        let result = evaluate(&pairs);
        // 收入为 0：税负与销售利润率走兜底
        assert!(result.is_triggered(CriterionKind::LowProfitabilitySales));
        assert_eq!(result.profitability_sales, 0.0);
        assert_eq!(result.criteria.len(), 12);
    }

    #[test]
    fn test_expense_growth_sets_optr() {
        let mut pairs = healthy();
        pairs.retain(|(k, _)| *k != "cost_sales_base_end");
        // 成本增速超过收入增速
        pairs.push(("cost_sales_base_end", "10500000"));

        let result = evaluate(&pairs);
        assert!(result.optr);
        assert!(result.is_triggered(CriterionKind::ExpenseGrowth));
    }

    #[test]
    fn test_qualitative_flags() {
        let mut pairs = healthy();
        pairs.push(("doubtful_counterparties", "on"));
        pairs.push(("frequent_location_change", "on"));

        let result = evaluate(&pairs);
        assert_eq!(result.risk_count, 2);
        assert!(result.is_positive_result);
        assert!(result.explanation_needed);
        assert!(result.accounting_check);
        assert!(!result.ndss);

        pairs.push(("frequent_reregistration", "true"));
        let result = evaluate(&pairs);
        assert_eq!(result.risk_count, 3);
        assert!(!result.is_positive_result);
        assert_eq!(result.risk_score, 3.0 * 8.33);
    }

    #[test]
    fn test_every_criterion_triggered() {
        let result = evaluate(&[
            ("revenue_base_start", "1000"),
            ("cost_sales_base_start", "500"),
            ("revenue_base_end", "1000"),
            ("cost_sales_base_end", "990"),
            ("profit_sales_start", "-1"),
            ("profit_sales_end", "-1"),
            ("vat_accrued_end", "100"),
            ("vat_deduction_end", "100"),
            ("doubtful_counterparties", "1"),
            ("no_explanation_notification", "1"),
            ("frequent_location_change", "1"),
            ("frequent_reregistration", "1"),
        ]);
        assert_eq!(result.risk_count, 12);
        assert_eq!(result.risk_score, (12.0 * 8.33f64).min(100.0));
        assert!(result.prbm && result.optr && result.ndss && result.retab);
        assert!(result.finance_check && result.explanation_needed && result.accounting_check);
    }

    #[test]
    fn test_evaluate_is_idempotent() {
        let engine = RiskEngine::default();
        let raw = RawInput::from_pairs(healthy());
        assert_eq!(engine.evaluate(&raw), engine.evaluate(&raw));
    }

    #[test]
    fn test_typed_input_matches_raw_input() {
        use crate::risk_control::normalizer::normalize;

        let engine = RiskEngine::default();
        let raw = RawInput::from_pairs(healthy());
        assert_eq!(engine.evaluate(&raw), engine.evaluate_input(&normalize(&raw)));
    }

    #[test]
    fn test_custom_thresholds() {
        let mut thresholds = RiskThresholds::default();
        thresholds.industry.avg_salary = 70000.0;

        let raw = RawInput::from_pairs(healthy());
        let result = RiskEngine::new(&thresholds).evaluate(&raw);
        assert!(result.is_triggered(CriterionKind::LowSalary));
        assert!(result.retab);
    }

    #[test]
    fn test_engine_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RiskEngine>();
    }
}
