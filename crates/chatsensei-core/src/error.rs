//! Client error types.
//!
//! Both request flows surface failures through [`ClientError`]. The
//! `Display` output is the message body shown to the user; the controller
//! adds the flow-specific prefix.

use thiserror::Error;

/// Generic message when the backend gives no usable `detail`.
pub const GENERIC_REQUEST_FAILURE: &str = "请求失败";

/// `/feedback` error bodies carry no usable detail.
pub const FEEDBACK_FAILURE: &str = "反馈提交失败";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The chat input was empty after trimming. No request was made.
    #[error("请先输入聊天内容！")]
    Validation,

    /// Non-2xx response or transport failure.
    #[error("{0}")]
    Request(String),

    /// A 2xx response whose body did not match the expected shape.
    #[error("响应格式错误: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Malformed(err.to_string())
        } else {
            ClientError::Request(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::Malformed(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
