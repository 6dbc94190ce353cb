use thiserror::Error;

/// 调用方请求校验错误（引擎本身从不返回错误）
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request body must be a JSON object")]
    NotAnObject,

    #[error("analysis period is not specified: missing `{0}`")]
    MissingPeriod(&'static str),
}

/// 阈值配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse thresholds: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid threshold `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
