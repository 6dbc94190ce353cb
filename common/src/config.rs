use std::fs;
use std::path::Path;
use serde::{Deserialize, Serialize};
use anyhow::{Result, Context};

use crate::error::ConfigError;

/// 行业基准：销售利润率 %
pub const INDUSTRY_PROFITABILITY_SALES: f64 = 9.6;
/// 行业基准：资产收益率 %
pub const INDUSTRY_PROFITABILITY_ASSETS: f64 = 5.4;
/// 行业基准：月平均工资
pub const INDUSTRY_AVG_SALARY: f64 = 43_000.0;
/// 行业基准：税负率 %
pub const INDUSTRY_TAX_BURDEN: f64 = 8.0;

/// 增值税抵扣占比达到该值即视为风险 %
pub const HIGH_VAT_DEDUCTION_RATIO: f64 = 89.0;

/// 盈利能力偏离的二次检查阈值 %
pub const DEVIATION_PROFITABILITY_SALES: f64 = 5.0;
pub const DEVIATION_PROFITABILITY_ASSETS: f64 = 3.0;

/// 每项触发标准的分值（100 / 12 取两位）
pub const POINTS_PER_CRITERION: f64 = 8.33;
pub const MAX_RISK_SCORE: f64 = 100.0;
/// 触发数低于该值为正面结论
pub const POSITIVE_BELOW_RISK_COUNT: u32 = 3;
/// 触发数达到该值需要财务检查
pub const FINANCE_CHECK_RISK_COUNT: u32 = 4;

/// 行业基准
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IndustryStandards {
    pub profitability_sales: f64,
    pub profitability_assets: f64,
    pub avg_salary: f64,
    pub tax_burden: f64,
}

impl Default for IndustryStandards {
    fn default() -> Self {
        Self {
            profitability_sales: INDUSTRY_PROFITABILITY_SALES,
            profitability_assets: INDUSTRY_PROFITABILITY_ASSETS,
            avg_salary: INDUSTRY_AVG_SALARY,
            tax_burden: INDUSTRY_TAX_BURDEN,
        }
    }
}

/// 盈利能力偏离阈值（比行业基准更严格的二次检查）
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct DeviationThresholds {
    pub profitability_sales: f64,
    pub profitability_assets: f64,
}

impl Default for DeviationThresholds {
    fn default() -> Self {
        Self {
            profitability_sales: DEVIATION_PROFITABILITY_SALES,
            profitability_assets: DEVIATION_PROFITABILITY_ASSETS,
        }
    }
}

/// 评分与结论参数
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ScoringConfig {
    pub points_per_criterion: f64,
    pub max_score: f64,
    pub positive_below: u32,
    pub finance_check_from: u32,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            points_per_criterion: POINTS_PER_CRITERION,
            max_score: MAX_RISK_SCORE,
            positive_below: POSITIVE_BELOW_RISK_COUNT,
            finance_check_from: FINANCE_CHECK_RISK_COUNT,
        }
    }
}

/// 风险评估阈值全集
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct RiskThresholds {
    pub industry: IndustryStandards,
    pub deviation: DeviationThresholds,
    pub high_vat_deduction_ratio: f64,
    pub scoring: ScoringConfig,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            industry: IndustryStandards::default(),
            deviation: DeviationThresholds::default(),
            high_vat_deduction_ratio: HIGH_VAT_DEDUCTION_RATIO,
            scoring: ScoringConfig::default(),
        }
    }
}

impl RiskThresholds {
    /// 从 TOML 文件加载阈值，缺省字段使用行业基准
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read thresholds config: {:?}", path))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load thresholds from {:?}", path))
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let thresholds: Self = toml::from_str(content)?;
        thresholds.validate()?;
        Ok(thresholds)
    }

    /// 检查阈值是否可用
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("industry.profitability_sales", self.industry.profitability_sales),
            ("industry.profitability_assets", self.industry.profitability_assets),
            ("industry.tax_burden", self.industry.tax_burden),
            ("deviation.profitability_sales", self.deviation.profitability_sales),
            ("deviation.profitability_assets", self.deviation.profitability_assets),
            ("high_vat_deduction_ratio", self.high_vat_deduction_ratio),
        ];
        for (field, value) in ratios {
            if !value.is_finite() {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be finite, got {}", value),
                });
            }
        }

        if !self.industry.avg_salary.is_finite() || self.industry.avg_salary < 0.0 {
            return Err(ConfigError::Invalid {
                field: "industry.avg_salary",
                reason: format!("must be a non-negative number, got {}", self.industry.avg_salary),
            });
        }

        if !self.scoring.points_per_criterion.is_finite() || self.scoring.points_per_criterion < 0.0 {
            return Err(ConfigError::Invalid {
                field: "scoring.points_per_criterion",
                reason: format!("must be a non-negative number, got {}", self.scoring.points_per_criterion),
            });
        }

        if !self.scoring.max_score.is_finite() || self.scoring.max_score <= 0.0 {
            return Err(ConfigError::Invalid {
                field: "scoring.max_score",
                reason: format!("must be positive, got {}", self.scoring.max_score),
            });
        }

        Ok(())
    }
}
