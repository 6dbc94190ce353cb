use chrono::NaiveDate;
use tracing::{debug, trace};

use common::input::{RawInput, RawValue};
use common::messages::{PERIOD_END_KEY, PERIOD_START_KEY};
use common::types::{AnalysisInput, Metric, Period, ReportingPeriod};

/// 报告期日期格式
const DATE_FORMAT: &str = "%Y-%m-%d";

/// 表单复选框/字符串中表示“否”的取值
const FALSE_WORDS: [&str; 5] = ["", "false", "off", "0", "no"];

/// 将原始请求归一化为完整的分析输入
///
/// 全函数：数值字段解析失败或缺失时取 0.0，定性标记缺失时取 false，
/// 无法识别的字段被忽略。
pub fn normalize(raw: &RawInput) -> AnalysisInput {
    let mut input = AnalysisInput::default();
    let mut metric_fields = 0usize;
    let mut ignored = 0usize;

    for (key, value) in raw.iter() {
        if key == PERIOD_START_KEY || key == PERIOD_END_KEY {
            continue;
        }

        if let Some((stem, period)) = Period::split_key(key) {
            if let Some(metric) = Metric::from_name(stem) {
                let number = coerce_number(value);
                trace!("{} = {}", key, number);
                let metrics = match period {
                    Period::Start => &mut input.start,
                    Period::End => &mut input.end,
                };
                *metrics = std::mem::take(metrics).with(metric, number);
                metric_fields += 1;
                continue;
            }
        }

        if input.flags.set(key, coerce_flag(value)) {
            continue;
        }

        // 无法识别的字段直接忽略
        ignored += 1;
    }

    input.period = parse_period(raw);

    debug!(
        "Normalized input: {} metric fields, flags={:?}, period={:?}, {} ignored",
        metric_fields, input.flags, input.period, ignored
    );

    input
}

/// 数值强制转换，任何失败都取 0.0
pub fn coerce_number(value: &RawValue) -> f64 {
    let number = match value {
        RawValue::Null => 0.0,
        RawValue::Bool(b) => {
            if *b { 1.0 } else { 0.0 }
        }
        RawValue::Number(n) => *n,
        RawValue::Text(s) => s.trim().parse::<f64>().unwrap_or(0.0),
    };

    if number.is_finite() {
        number
    } else {
        0.0
    }
}

/// 布尔强制转换，按真值语义
pub fn coerce_flag(value: &RawValue) -> bool {
    match value {
        RawValue::Null => false,
        RawValue::Bool(b) => *b,
        RawValue::Number(n) => *n != 0.0,
        RawValue::Text(s) => {
            let s = s.trim().to_ascii_lowercase();
            !FALSE_WORDS.contains(&s.as_str())
        }
    }
}

/// 解析报告期，任一日期缺失或格式错误时返回 None
fn parse_period(raw: &RawInput) -> Option<ReportingPeriod> {
    let start = parse_date(raw.get(PERIOD_START_KEY)?)?;
    let end = parse_date(raw.get(PERIOD_END_KEY)?)?;
    Some(ReportingPeriod { start, end })
}

fn parse_date(value: &RawValue) -> Option<NaiveDate> {
    match value {
        RawValue::Text(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::types::QualitativeFlags;

    #[test]
    fn test_numeric_fields_are_coerced() {
        let raw = RawInput::new()
            .with("revenue_base_end", "1500.5")
            .with("revenue_base_start", 1000.0)
            .with("salary_fund_end", " 6000000 ")
            .with("employee_count_end", "10")
            .with("profit_sales_start", "-100");

        let input = normalize(&raw);
        assert_eq!(input.end.revenue_base, 1500.5);
        assert_eq!(input.start.revenue_base, 1000.0);
        assert_eq!(input.end.salary_fund, 6_000_000.0);
        assert_eq!(input.end.employee_count, 10);
        assert_eq!(input.start.profit_sales, -100.0);
    }

    #[test]
    fn test_malformed_numbers_become_zero() {
        let raw = RawInput::new()
            .with("revenue_base_end", "abc")
            .with("vat_accrued_end", "")
            .with("vat_deduction_end", RawValue::Null)
            .with("other_income_end", "inf")
            .with("salary_fund_end", "NaN");

        let input = normalize(&raw);
        assert_eq!(input.end.revenue_base, 0.0);
        assert_eq!(input.end.vat_accrued, 0.0);
        assert_eq!(input.end.vat_deduction, 0.0);
        assert_eq!(input.end.other_income, 0.0);
        assert_eq!(input.end.salary_fund, 0.0);
    }

    #[test]
    fn test_flags() {
        let raw = RawInput::new()
            .with("doubtful_counterparties", "on")
            .with("no_explanation_notification", true)
            .with("frequent_location_change", "false");

        let input = normalize(&raw);
        assert!(input.flags.doubtful_counterparties);
        assert!(input.flags.no_explanation_notification);
        assert!(!input.flags.frequent_location_change);
        // 缺省为 false
        assert!(!input.flags.frequent_reregistration);
    }

    #[test]
    fn test_coerce_flag_truthiness() {
        assert!(!coerce_flag(&RawValue::Null));
        assert!(!coerce_flag(&RawValue::Number(0.0)));
        assert!(coerce_flag(&RawValue::Number(2.0)));
        assert!(!coerce_flag(&"OFF".into()));
        assert!(!coerce_flag(&" ".into()));
        assert!(coerce_flag(&"yes".into()));
    }

    #[test]
    fn test_coerce_number_bool() {
        assert_eq!(coerce_number(&RawValue::Bool(true)), 1.0);
        assert_eq!(coerce_number(&RawValue::Bool(false)), 0.0);
        assert_eq!(coerce_number(&"1e3".into()), 1000.0);
    }

    #[test]
    fn test_period_dates() {
        let raw = RawInput::new()
            .with("period_start", "2024-01-01")
            .with("period_end", "2024-12-31");
        let period = normalize(&raw).period.unwrap();
        assert_eq!(period.start, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(period.end, NaiveDate::from_ymd_opt(2024, 12, 31).unwrap());

        let raw = RawInput::new()
            .with("period_start", "01.01.2024")
            .with("period_end", "2024-12-31");
        assert!(normalize(&raw).period.is_none());
    }

    #[test]
    fn test_unknown_fields_are_ignored() {
        let raw = RawInput::new()
            .with("csrfmiddlewaretoken", "xyz")
            .with("unknown_metric_end", "500")
            .with("revenue_base_end", "10");

        let input = normalize(&raw);
        assert_eq!(input.end.revenue_base, 10.0);
        assert_eq!(input.flags, QualitativeFlags::default());
    }
}
