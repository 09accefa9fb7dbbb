//! 错误定义模块

use thiserror::Error;

/// 请求失败时的通用提示
pub const GENERIC_REQUEST_FAILURE: &str = "Request failed";

/// 诊所客户端统一错误类型
#[derive(Error, Debug)]
pub enum ClinicError {
    /// 请求失败，消息直接展示给用户
    #[error("{message}")]
    Request { status: Option<u16>, message: String },

    /// 凭证失效，会话已被清除
    #[error("{message}")]
    CredentialExpired { message: String },

    #[error("{0}")]
    Validation(String),

    #[error("存储错误: {0}")]
    Storage(String),

    #[error("序列化错误: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("无效状态转换: 从 {from} 执行 {action}")]
    InvalidStateTransition { from: String, action: String },
}

impl ClinicError {
    /// 构造通用的请求失败错误
    pub fn request_failed(status: Option<u16>) -> Self {
        ClinicError::Request {
            status,
            message: GENERIC_REQUEST_FAILURE.to_string(),
        }
    }

    /// 是否为凭证失效
    pub fn is_credential_expired(&self) -> bool {
        matches!(self, ClinicError::CredentialExpired { .. })
    }

    /// HTTP状态码（若有）
    pub fn status(&self) -> Option<u16> {
        match self {
            ClinicError::Request { status, .. } => *status,
            ClinicError::CredentialExpired { .. } => Some(401),
            _ => None,
        }
    }
}

/// 诊所客户端统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;
