use std::collections::HashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 表单或 JSON 请求中的原始值，未经校验
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl From<Value> for RawValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => RawValue::Null,
            Value::Bool(b) => RawValue::Bool(b),
            Value::Number(n) => n.as_f64().map(RawValue::Number).unwrap_or(RawValue::Null),
            Value::String(s) => RawValue::Text(s),
            // 数组/对象：空的视为缺失，非空的保留文本（数值解析会失败，布尔为真）
            Value::Array(ref a) if a.is_empty() => RawValue::Null,
            Value::Object(ref o) if o.is_empty() => RawValue::Null,
            other => RawValue::Text(other.to_string()),
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        RawValue::Text(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        RawValue::Bool(value)
    }
}

/// 扁平的 字段名 -> 原始值 映射
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawInput {
    fields: HashMap<String, RawValue>,
}

impl RawInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 从键值对构造（表单提交）
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<RawValue>,
    {
        let fields = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self { fields }
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<RawValue>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.fields.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &RawValue)> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl From<serde_json::Map<String, Value>> for RawInput {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self::from_pairs(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_object() {
        let value = json!({
            "revenue_base_end": "1500.5",
            "salary_fund_end": 120000,
            "doubtful_counterparties": true,
            "period_start": "2024-01-01",
            "note": null,
            "tags": [],
        });
        let raw = match value {
            Value::Object(map) => RawInput::from(map),
            _ => unreachable!(),
        };

        assert_eq!(raw.len(), 6);
        assert_eq!(raw.get("revenue_base_end"), Some(&RawValue::Text("1500.5".into())));
        assert_eq!(raw.get("salary_fund_end"), Some(&RawValue::Number(120000.0)));
        assert_eq!(raw.get("doubtful_counterparties"), Some(&RawValue::Bool(true)));
        assert_eq!(raw.get("note"), Some(&RawValue::Null));
        assert_eq!(raw.get("tags"), Some(&RawValue::Null));
    }

    #[test]
    fn test_from_form_pairs() {
        let raw = RawInput::from_pairs(vec![
            ("revenue_base_start", "100"),
            ("frequent_location_change", "on"),
        ]);
        assert_eq!(raw.get("frequent_location_change"), Some(&RawValue::Text("on".into())));
        assert!(raw.get("missing").is_none());
    }

    #[test]
    fn test_deserialize_untagged() {
        let raw: RawInput = serde_json::from_str(r#"{"a": 1.5, "b": "x", "c": false, "d": null}"#).unwrap();
        assert_eq!(raw.get("a"), Some(&RawValue::Number(1.5)));
        assert_eq!(raw.get("b"), Some(&RawValue::Text("x".into())));
        assert_eq!(raw.get("c"), Some(&RawValue::Bool(false)));
        assert_eq!(raw.get("d"), Some(&RawValue::Null));
    }
}
