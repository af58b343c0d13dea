use thiserror::Error;

#[derive(Debug, Error)]
pub enum BrambleError {
    #[error("config error: {0}")]
    Config(String),

    #[error("telemetry error: {0}")]
    Telemetry(String),

    #[error("serve error: {0}")]
    Serve(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type BrambleResult<T> = Result<T, BrambleError>;
