use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RequestError;
use crate::input::{RawInput, RawValue};
use crate::types::RiskResult;

pub const PERIOD_START_KEY: &str = "period_start";
pub const PERIOD_END_KEY: &str = "period_end";

/// 已通过调用方校验的分析请求
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisRequest {
    raw: RawInput,
}

impl AnalysisRequest {
    /// 解析 JSON 请求体
    pub fn from_json(body: &str) -> Result<Self, RequestError> {
        match serde_json::from_str::<Value>(body)? {
            Value::Object(map) => Self::from_raw(RawInput::from(map)),
            _ => Err(RequestError::NotAnObject),
        }
    }

    /// 解析表单提交
    pub fn from_form<I, K, V>(pairs: I) -> Result<Self, RequestError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::from_raw(RawInput::from_pairs(
            pairs.into_iter().map(|(k, v)| (k.into(), RawValue::Text(v.into()))),
        ))
    }

    /// 报告期两个日期必须存在且非空
    pub fn from_raw(raw: RawInput) -> Result<Self, RequestError> {
        for key in [PERIOD_START_KEY, PERIOD_END_KEY] {
            if !is_present(raw.get(key)) {
                return Err(RequestError::MissingPeriod(key));
            }
        }
        Ok(Self { raw })
    }

    pub fn raw(&self) -> &RawInput {
        &self.raw
    }

    pub fn into_raw(self) -> RawInput {
        self.raw
    }
}

fn is_present(value: Option<&RawValue>) -> bool {
    match value {
        None | Some(RawValue::Null) => false,
        Some(RawValue::Text(s)) => !s.trim().is_empty(),
        Some(_) => true,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSummary {
    pub prbm: bool,
    pub optr: bool,
    pub ndss: bool,
    pub retab: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckSummary {
    pub finance_check: bool,
    pub explanation_needed: bool,
    pub accounting_check: bool,
}

/// 返回给界面的分析摘要
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub risk_score: f64,
    pub is_positive: bool,
    pub profitability: f64,
    pub revenue_growth: f64,
    pub profit_growth: f64,
    pub tax_burden: f64,
    pub indicators: IndicatorSummary,
    pub checks: CheckSummary,
}

impl From<&RiskResult> for AnalysisSummary {
    fn from(result: &RiskResult) -> Self {
        Self {
            risk_score: result.risk_score,
            is_positive: result.is_positive_result,
            profitability: result.profitability_ratio_end,
            revenue_growth: result.revenue_growth,
            profit_growth: result.profit_growth,
            tax_burden: result.tax_burden,
            indicators: IndicatorSummary {
                prbm: result.prbm,
                optr: result.optr,
                ndss: result.ndss,
                retab: result.retab,
            },
            checks: CheckSummary {
                finance_check: result.finance_check,
                explanation_needed: result.explanation_needed,
                accounting_check: result.accounting_check,
            },
        }
    }
}
