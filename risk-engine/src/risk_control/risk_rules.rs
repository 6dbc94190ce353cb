use tracing::debug;

use common::config::RiskThresholds;
use common::types::{AnalysisInput, CriterionKind, PeriodMetrics, QualitativeFlags, RiskCriterion};

/// 月数，年度工资总额折算为月平均
const MONTHS_PER_YEAR: f64 = 12.0;

/// 风险标准trait - 每项标准都实现这个接口
pub trait RiskRule: Send + Sync {
    /// 对应的标准
    fn kind(&self) -> CriterionKind;

    /// 规则名称
    fn name(&self) -> &str {
        self.kind().name()
    }

    /// 执行评估；分母为零时按各规则约定的兜底取值，从不报错
    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion;
}

/// 税负率 %，分母非正时为 None
pub fn tax_burden(end: &PeriodMetrics) -> Option<f64> {
    let total_revenue = end.revenue_base + end.other_income;
    if total_revenue > 0.0 {
        Some(end.total_taxes_paid / total_revenue * 100.0)
    } else {
        None
    }
}

/// 增值税抵扣占比 %
pub fn vat_deduction_ratio(end: &PeriodMetrics) -> Option<f64> {
    if end.vat_accrued > 0.0 {
        Some(end.vat_deduction / end.vat_accrued * 100.0)
    } else {
        None
    }
}

/// 月平均工资
pub fn avg_salary(end: &PeriodMetrics) -> Option<f64> {
    if end.employee_count > 0 {
        Some(end.salary_fund / f64::from(end.employee_count) / MONTHS_PER_YEAR)
    } else {
        None
    }
}

/// 销售利润率 %
pub fn profitability_of_sales(end: &PeriodMetrics) -> Option<f64> {
    if end.revenue_base > 0.0 {
        Some((end.revenue_base - end.total_costs()) / end.revenue_base * 100.0)
    } else {
        None
    }
}

/// 资产收益率 %
pub fn profitability_of_assets(end: &PeriodMetrics) -> Option<f64> {
    if end.balance_sheet_asset > 0.0 {
        Some(end.profit_tax_base / end.balance_sheet_asset * 100.0)
    } else {
        None
    }
}

/// 收入增速与成本增速 %，期初收入或成本非正时无法计算
pub fn growth_rates(start: &PeriodMetrics, end: &PeriodMetrics) -> Option<(f64, f64)> {
    let revenue_start = start.revenue_base;
    let cost_start = start.total_costs();
    if revenue_start > 0.0 && cost_start > 0.0 {
        let revenue_growth = (end.revenue_base - revenue_start) / revenue_start * 100.0;
        let cost_growth = (end.total_costs() - cost_start) / cost_start * 100.0;
        Some((revenue_growth, cost_growth))
    } else {
        None
    }
}

/// 1. 税负率低于行业水平
pub struct TaxBurdenRule {
    pub min_tax_burden: f64,  // %
}

impl TaxBurdenRule {
    pub fn new(min_tax_burden: f64) -> Self {
        Self { min_tax_burden }
    }
}

impl RiskRule for TaxBurdenRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::LowTaxBurden
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        match tax_burden(&input.end) {
            Some(burden) => {
                let triggered = burden < self.min_tax_burden;
                debug!("Tax burden: {:.2}% (risk: {})", burden, triggered);
                RiskCriterion::new(self.kind(), triggered, Some(burden))
            }
            None => {
                debug!("Tax burden: no revenue, treated as risk");
                RiskCriterion::new(self.kind(), true, Some(0.0))
            }
        }
    }
}

/// 2. 两期均亏损
pub struct LossRule;

impl RiskRule for LossRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::Loss
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        let profit_start = input.start.profit_sales;
        let profit_end = input.end.profit_sales;
        let triggered = profit_start < 0.0 && profit_end < 0.0;
        debug!("Loss: start={}, end={} (risk: {})", profit_start, profit_end, triggered);
        RiskCriterion::flag(self.kind(), triggered)
    }
}

/// 3. 增值税抵扣占比过高
pub struct VatDeductionRule {
    pub max_ratio: f64,  // %，达到即触发
}

impl VatDeductionRule {
    pub fn new(max_ratio: f64) -> Self {
        Self { max_ratio }
    }
}

impl RiskRule for VatDeductionRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::HighVatDeduction
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        // 无应计增值税时不视为风险
        let (ratio, triggered) = match vat_deduction_ratio(&input.end) {
            Some(ratio) => (ratio, ratio >= self.max_ratio),
            None => (0.0, false),
        };
        debug!("VAT deduction: {:.2}% (risk: {})", ratio, triggered);
        RiskCriterion::new(self.kind(), triggered, Some(ratio))
    }
}

/// 4. 费用增速超过收入增速
pub struct ExpenseGrowthRule;

impl RiskRule for ExpenseGrowthRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::ExpenseGrowth
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        match growth_rates(&input.start, &input.end) {
            Some((revenue_growth, cost_growth)) => {
                let triggered = cost_growth > revenue_growth;
                debug!(
                    "Growth: revenue={:.2}%, costs={:.2}% (risk: {})",
                    revenue_growth, cost_growth, triggered
                );
                // 数值为两者之差（百分点）
                RiskCriterion::new(self.kind(), triggered, Some(cost_growth - revenue_growth))
            }
            None => {
                debug!("Growth: no base period revenue or costs, skipped");
                RiskCriterion::flag(self.kind(), false)
            }
        }
    }
}

/// 5. 月平均工资低于行业水平
pub struct SalaryRule {
    pub min_avg_salary: f64,
}

impl SalaryRule {
    pub fn new(min_avg_salary: f64) -> Self {
        Self { min_avg_salary }
    }
}

impl RiskRule for SalaryRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::LowSalary
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        match avg_salary(&input.end) {
            Some(salary) => {
                let triggered = salary < self.min_avg_salary;
                debug!("Average salary: {:.2} (risk: {})", salary, triggered);
                RiskCriterion::new(self.kind(), triggered, Some(salary))
            }
            None => {
                debug!("Average salary: no employees, treated as risk");
                RiskCriterion::new(self.kind(), true, Some(0.0))
            }
        }
    }
}

/// 6. 销售利润率低于行业水平
pub struct SalesProfitabilityRule {
    pub min_profitability: f64,  // %
}

impl SalesProfitabilityRule {
    pub fn new(min_profitability: f64) -> Self {
        Self { min_profitability }
    }
}

impl RiskRule for SalesProfitabilityRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::LowProfitabilitySales
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        match profitability_of_sales(&input.end) {
            Some(value) => {
                let triggered = value < self.min_profitability;
                debug!("Sales profitability: {:.2}% (risk: {})", value, triggered);
                RiskCriterion::new(self.kind(), triggered, Some(value))
            }
            None => RiskCriterion::new(self.kind(), true, Some(0.0)),
        }
    }
}

/// 7. 资产收益率低于行业水平
pub struct AssetProfitabilityRule {
    pub min_profitability: f64,  // %
}

impl AssetProfitabilityRule {
    pub fn new(min_profitability: f64) -> Self {
        Self { min_profitability }
    }
}

impl RiskRule for AssetProfitabilityRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::LowProfitabilityAssets
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        match profitability_of_assets(&input.end) {
            Some(value) => {
                let triggered = value < self.min_profitability;
                debug!("Asset profitability: {:.2}% (risk: {})", value, triggered);
                RiskCriterion::new(self.kind(), triggered, Some(value))
            }
            None => RiskCriterion::new(self.kind(), true, Some(0.0)),
        }
    }
}

/// 8-11. 定性标记，原样传递
pub struct FlagRule {
    kind: CriterionKind,
    flag: fn(&QualitativeFlags) -> bool,
}

impl FlagRule {
    pub fn doubtful_counterparties() -> Self {
        Self { kind: CriterionKind::DoubtfulCounterparties, flag: |f| f.doubtful_counterparties }
    }

    pub fn no_explanation() -> Self {
        Self { kind: CriterionKind::NoExplanation, flag: |f| f.no_explanation_notification }
    }

    pub fn location_change() -> Self {
        Self { kind: CriterionKind::LocationChange, flag: |f| f.frequent_location_change }
    }

    pub fn reregistration() -> Self {
        Self { kind: CriterionKind::Reregistration, flag: |f| f.frequent_reregistration }
    }
}

impl RiskRule for FlagRule {
    fn kind(&self) -> CriterionKind {
        self.kind
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        RiskCriterion::flag(self.kind, (self.flag)(&input.flags))
    }
}

/// 12. 盈利能力显著偏离
///
/// 复用 6/7 的计算值（包括分母为零时的 0 兜底），阈值独立于行业基准。
pub struct ProfitabilityDeviationRule {
    pub min_sales: f64,   // %
    pub min_assets: f64,  // %
}

impl ProfitabilityDeviationRule {
    pub fn new(min_sales: f64, min_assets: f64) -> Self {
        Self { min_sales, min_assets }
    }
}

impl RiskRule for ProfitabilityDeviationRule {
    fn kind(&self) -> CriterionKind {
        CriterionKind::ProfitabilityDeviation
    }

    fn evaluate(&self, input: &AnalysisInput) -> RiskCriterion {
        let sales = profitability_of_sales(&input.end).unwrap_or(0.0);
        let assets = profitability_of_assets(&input.end).unwrap_or(0.0);
        let triggered = sales < self.min_sales || assets < self.min_assets;
        debug!(
            "Profitability deviation: sales={:.2}%, assets={:.2}% (risk: {})",
            sales, assets, triggered
        );
        RiskCriterion::flag(self.kind(), triggered)
    }
}

/// 风险规则链 - 按顺序执行所有规则，不短路
pub struct RiskRuleChain {
    rules: Vec<Box<dyn RiskRule>>,
}

impl RiskRuleChain {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// 添加规则
    pub fn add_rule(mut self, rule: Box<dyn RiskRule>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 执行所有规则
    pub fn evaluate_all(&self, input: &AnalysisInput) -> Vec<RiskCriterion> {
        self.rules
            .iter()
            .map(|rule| {
                let criterion = rule.evaluate(input);
                debug!("Rule {} -> {}", rule.name(), criterion.triggered);
                criterion
            })
            .collect()
    }
}

impl Default for RiskRuleChain {
    fn default() -> Self {
        create_rule_chain(&RiskThresholds::default())
    }
}

/// 按阈值创建完整的十二项规则链
pub fn create_rule_chain(thresholds: &RiskThresholds) -> RiskRuleChain {
    let industry = &thresholds.industry;
    let deviation = &thresholds.deviation;

    RiskRuleChain::new()
        .add_rule(Box::new(TaxBurdenRule::new(industry.tax_burden)))
        .add_rule(Box::new(LossRule))
        .add_rule(Box::new(VatDeductionRule::new(thresholds.high_vat_deduction_ratio)))
        .add_rule(Box::new(ExpenseGrowthRule))
        .add_rule(Box::new(SalaryRule::new(industry.avg_salary)))
        .add_rule(Box::new(SalesProfitabilityRule::new(industry.profitability_sales)))
        .add_rule(Box::new(AssetProfitabilityRule::new(industry.profitability_assets)))
        .add_rule(Box::new(FlagRule::doubtful_counterparties()))
        .add_rule(Box::new(FlagRule::no_explanation()))
        .add_rule(Box::new(FlagRule::location_change()))
        .add_rule(Box::new(FlagRule::reregistration()))
        .add_rule(Box::new(ProfitabilityDeviationRule::new(
            deviation.profitability_sales,
            deviation.profitability_assets,
        )))
}
