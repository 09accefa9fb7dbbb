//! # Clinic Config
//!
//! 客户端配置加载与日志初始化

pub mod config;
pub mod logging;

pub use config::{ApiConfig, ClinicConfig, ConfigValidator, LogFormat, LoggingConfig, SessionConfig};
pub use logging::{build_filter, init_logging};
