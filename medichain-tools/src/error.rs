use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}
