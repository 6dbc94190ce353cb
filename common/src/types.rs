use serde::{Deserialize, Serialize};
use chrono::NaiveDate;
use std::fmt;

/// 报告期：期初 / 期末
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Period {
    Start,
    End,
}

impl Period {
    /// 原始字段名的后缀
    pub fn suffix(&self) -> &'static str {
        match self {
            Period::Start => "_start",
            Period::End => "_end",
        }
    }

    /// 拆分原始字段名，例如 `revenue_base_end` -> (`revenue_base`, End)
    pub fn split_key(key: &str) -> Option<(&str, Period)> {
        if let Some(stem) = key.strip_suffix("_start") {
            return Some((stem, Period::Start));
        }
        key.strip_suffix("_end").map(|stem| (stem, Period::End))
    }
}

/// 单期财务指标名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    RevenueBase,
    RevenueEarly,
    ProfitSales,
    ProfitTaxBase,
    ProfitTaxRent,
    OtherIncome,
    CostSalesBase,
    CostSalesRent,
    CommercialExpenses,
    ManagementExpenses,
    EmployeeCount,
    SalaryFund,
    BalanceSheetAsset,
    AccruedInterest,
    TotalTaxesPaid,
    VatDeduction,
    VatAccrued,
}

impl Metric {
    pub const ALL: [Metric; 17] = [
        Metric::RevenueBase,
        Metric::RevenueEarly,
        Metric::ProfitSales,
        Metric::ProfitTaxBase,
        Metric::ProfitTaxRent,
        Metric::OtherIncome,
        Metric::CostSalesBase,
        Metric::CostSalesRent,
        Metric::CommercialExpenses,
        Metric::ManagementExpenses,
        Metric::EmployeeCount,
        Metric::SalaryFund,
        Metric::BalanceSheetAsset,
        Metric::AccruedInterest,
        Metric::TotalTaxesPaid,
        Metric::VatDeduction,
        Metric::VatAccrued,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Metric::RevenueBase => "revenue_base",
            Metric::RevenueEarly => "revenue_early",
            Metric::ProfitSales => "profit_sales",
            Metric::ProfitTaxBase => "profit_tax_base",
            Metric::ProfitTaxRent => "profit_tax_rent",
            Metric::OtherIncome => "other_income",
            Metric::CostSalesBase => "cost_sales_base",
            Metric::CostSalesRent => "cost_sales_rent",
            Metric::CommercialExpenses => "commercial_expenses",
            Metric::ManagementExpenses => "management_expenses",
            Metric::EmployeeCount => "employee_count",
            Metric::SalaryFund => "salary_fund",
            Metric::BalanceSheetAsset => "balance_sheet_asset",
            Metric::AccruedInterest => "accrued_interest",
            Metric::TotalTaxesPaid => "total_taxes_paid",
            Metric::VatDeduction => "vat_deduction",
            Metric::VatAccrued => "vat_accrued",
        }
    }

    pub fn from_name(name: &str) -> Option<Metric> {
        Metric::ALL.iter().copied().find(|m| m.name() == name)
    }

    /// 带期间后缀的字段名
    pub fn key(&self, period: Period) -> String {
        format!("{}{}", self.name(), period.suffix())
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个报告期的财务快照
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodMetrics {
    pub revenue_base: f64,          // 基期营业收入
    pub revenue_early: f64,         // 前期营业收入
    pub profit_sales: f64,          // 销售利润（可为负）
    pub profit_tax_base: f64,       // 税前利润（可为负）
    pub profit_tax_rent: f64,
    pub other_income: f64,          // 其他收入
    pub cost_sales_base: f64,       // 销售成本
    pub cost_sales_rent: f64,
    pub commercial_expenses: f64,   // 商业费用
    pub management_expenses: f64,   // 管理费用
    pub employee_count: u32,        // 员工人数
    pub salary_fund: f64,           // 年度工资总额
    pub balance_sheet_asset: f64,   // 资产负债表资产总额
    pub accrued_interest: f64,
    pub total_taxes_paid: f64,      // 已缴税款合计
    pub vat_deduction: f64,         // 增值税抵扣额
    pub vat_accrued: f64,           // 增值税应计额
}

impl PeriodMetrics {
    /// 按指标名写入，返回新值（便于链式构造）
    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        match metric {
            Metric::RevenueBase => self.revenue_base = value,
            Metric::RevenueEarly => self.revenue_early = value,
            Metric::ProfitSales => self.profit_sales = value,
            Metric::ProfitTaxBase => self.profit_tax_base = value,
            Metric::ProfitTaxRent => self.profit_tax_rent = value,
            Metric::OtherIncome => self.other_income = value,
            Metric::CostSalesBase => self.cost_sales_base = value,
            Metric::CostSalesRent => self.cost_sales_rent = value,
            Metric::CommercialExpenses => self.commercial_expenses = value,
            Metric::ManagementExpenses => self.management_expenses = value,
            Metric::EmployeeCount => self.employee_count = headcount(value),
            Metric::SalaryFund => self.salary_fund = value,
            Metric::BalanceSheetAsset => self.balance_sheet_asset = value,
            Metric::AccruedInterest => self.accrued_interest = value,
            Metric::TotalTaxesPaid => self.total_taxes_paid = value,
            Metric::VatDeduction => self.vat_deduction = value,
            Metric::VatAccrued => self.vat_accrued = value,
        }
        self
    }

    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::RevenueBase => self.revenue_base,
            Metric::RevenueEarly => self.revenue_early,
            Metric::ProfitSales => self.profit_sales,
            Metric::ProfitTaxBase => self.profit_tax_base,
            Metric::ProfitTaxRent => self.profit_tax_rent,
            Metric::OtherIncome => self.other_income,
            Metric::CostSalesBase => self.cost_sales_base,
            Metric::CostSalesRent => self.cost_sales_rent,
            Metric::CommercialExpenses => self.commercial_expenses,
            Metric::ManagementExpenses => self.management_expenses,
            Metric::EmployeeCount => f64::from(self.employee_count),
            Metric::SalaryFund => self.salary_fund,
            Metric::BalanceSheetAsset => self.balance_sheet_asset,
            Metric::AccruedInterest => self.accrued_interest,
            Metric::TotalTaxesPaid => self.total_taxes_paid,
            Metric::VatDeduction => self.vat_deduction,
            Metric::VatAccrued => self.vat_accrued,
        }
    }

    /// 总成本 = 销售成本 + 商业费用 + 管理费用
    pub fn total_costs(&self) -> f64 {
        self.cost_sales_base + self.commercial_expenses + self.management_expenses
    }
}

/// 员工人数按整数截断，非正或非有限值为 0
///
/// 小于 1 的小数（如 0.5）截断为 0，平均工资走零人数兜底并触发低工资标准，
/// 不会以小数人数做除数。
fn headcount(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.trunc() as u32
    } else {
        0
    }
}

/// 定性风险标记
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualitativeFlags {
    pub doubtful_counterparties: bool,      // 可疑交易对手
    pub no_explanation_notification: bool,  // 未提交说明
    pub frequent_location_change: bool,     // 频繁变更注册地址
    #[serde(default)]
    pub frequent_reregistration: bool,      // 多次注销并重新登记（旧字段，可缺省）
}

impl QualitativeFlags {
    /// 按字段名设置，未知字段返回 false
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        match key {
            "doubtful_counterparties" => self.doubtful_counterparties = value,
            "no_explanation_notification" => self.no_explanation_notification = value,
            "frequent_location_change" => self.frequent_location_change = value,
            "frequent_reregistration" => self.frequent_reregistration = value,
            _ => return false,
        }
        true
    }
}

/// 报告期起止日期，仅用于记录
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingPeriod {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

/// 一次分析的完整输入：两期指标 + 定性标记
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub start: PeriodMetrics,
    pub end: PeriodMetrics,
    pub flags: QualitativeFlags,
    pub period: Option<ReportingPeriod>,
}

/// 十二项税务稽查风险标准
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CriterionKind {
    LowTaxBurden,
    Loss,
    HighVatDeduction,
    ExpenseGrowth,
    LowSalary,
    LowProfitabilitySales,
    LowProfitabilityAssets,
    DoubtfulCounterparties,
    NoExplanation,
    LocationChange,
    Reregistration,
    ProfitabilityDeviation,
}

impl CriterionKind {
    pub const ALL: [CriterionKind; 12] = [
        CriterionKind::LowTaxBurden,
        CriterionKind::Loss,
        CriterionKind::HighVatDeduction,
        CriterionKind::ExpenseGrowth,
        CriterionKind::LowSalary,
        CriterionKind::LowProfitabilitySales,
        CriterionKind::LowProfitabilityAssets,
        CriterionKind::DoubtfulCounterparties,
        CriterionKind::NoExplanation,
        CriterionKind::LocationChange,
        CriterionKind::Reregistration,
        CriterionKind::ProfitabilityDeviation,
    ];

    /// 标准编号 1..=12
    pub fn number(&self) -> usize {
        match self {
            CriterionKind::LowTaxBurden => 1,
            CriterionKind::Loss => 2,
            CriterionKind::HighVatDeduction => 3,
            CriterionKind::ExpenseGrowth => 4,
            CriterionKind::LowSalary => 5,
            CriterionKind::LowProfitabilitySales => 6,
            CriterionKind::LowProfitabilityAssets => 7,
            CriterionKind::DoubtfulCounterparties => 8,
            CriterionKind::NoExplanation => 9,
            CriterionKind::LocationChange => 10,
            CriterionKind::Reregistration => 11,
            CriterionKind::ProfitabilityDeviation => 12,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CriterionKind::LowTaxBurden => "low_tax_burden",
            CriterionKind::Loss => "loss",
            CriterionKind::HighVatDeduction => "high_vat_deduction",
            CriterionKind::ExpenseGrowth => "expense_growth",
            CriterionKind::LowSalary => "low_salary",
            CriterionKind::LowProfitabilitySales => "low_profitability_sales",
            CriterionKind::LowProfitabilityAssets => "low_profitability_assets",
            CriterionKind::DoubtfulCounterparties => "doubtful_counterparties",
            CriterionKind::NoExplanation => "no_explanation",
            CriterionKind::LocationChange => "location_change",
            CriterionKind::Reregistration => "reregistration",
            CriterionKind::ProfitabilityDeviation => "profitability_deviation",
        }
    }
}

impl fmt::Display for CriterionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} {}", self.number(), self.name())
    }
}

/// 单项标准的评估结果
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskCriterion {
    pub kind: CriterionKind,
    pub triggered: bool,
    pub value: Option<f64>,  // 支撑数值（比率、平均工资等），无则为 None
}

impl RiskCriterion {
    pub fn new(kind: CriterionKind, triggered: bool, value: Option<f64>) -> Self {
        Self { kind, triggered, value }
    }

    pub fn flag(kind: CriterionKind, triggered: bool) -> Self {
        Self::new(kind, triggered, None)
    }
}

/// 风险评估结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskResult {
    // 汇总指标
    pub prbm: bool,   // 盈亏
    pub optr: bool,   // 经营（费用增速）
    pub ndss: bool,   // 税务
    pub retab: bool,  // 盈利能力

    // 评分
    pub risk_score: f64,       // 0-100，不取整
    pub risk_count: u32,       // 触发的标准数 0-12
    pub total_criteria: u32,

    // 后续检查
    pub finance_check: bool,
    pub explanation_needed: bool,
    pub accounting_check: bool,

    // 最终结论：true 表示低风险
    pub is_positive_result: bool,

    // 支撑数值，保留两位小数
    pub tax_burden: f64,
    pub avg_salary: f64,
    pub vat_deduction_ratio: f64,
    pub profitability_sales: f64,
    pub profitability_assets: f64,
    pub profitability_ratio_start: f64,
    pub profitability_ratio_end: f64,
    pub revenue_growth: f64,
    pub profit_growth: f64,

    pub criteria: Vec<RiskCriterion>,
}

impl RiskResult {
    pub fn criterion(&self, kind: CriterionKind) -> Option<&RiskCriterion> {
        self.criteria.iter().find(|c| c.kind == kind)
    }

    pub fn is_triggered(&self, kind: CriterionKind) -> bool {
        self.criterion(kind).map(|c| c.triggered).unwrap_or(false)
    }
}
