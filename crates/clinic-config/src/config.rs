//! 配置管理
//!
//! 配置分三层叠加：内置默认值、可选的TOML文件、`CLINIC_` 前缀的环境变量。
//! 环境变量以双下划线分隔层级，例如 `CLINIC_API__BASE_URL`。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

/// 诊所客户端完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClinicConfig {
    /// 后端接口配置
    pub api: ApiConfig,
    /// 会话存储配置
    pub session: SessionConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 后端接口配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// 后端基础地址
    pub base_url: String,
    /// 单次请求超时（秒）
    pub timeout_secs: u64,
}

/// 会话存储配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// 本地存储文件
    pub storage_path: String,
    /// 会话信封的存储键
    pub storage_key: String,
    /// 外部修改轮询间隔（毫秒）
    pub watch_interval_ms: u64,
}

/// 日志格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 优先
    pub level: String,
    /// 日志格式
    pub format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/api".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_path: "./.clinic/local_storage.json".to_string(),
            storage_key: "auth".to_string(),
            watch_interval_ms: 1000,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl SessionConfig {
    pub fn watch_interval(&self) -> Duration {
        Duration::from_millis(self.watch_interval_ms.max(1))
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("CLINIC")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

impl ClinicConfig {
    /// 加载配置：默认值 → 文件 → 环境变量
    pub fn load(path: Option<&str>) -> Result<Self> {
        Self::load_with_env(path, env_source())
    }

    fn load_with_env(path: Option<&str>, env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&ClinicConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(File::with_name(path));
        }
        let settings = builder.add_source(env).build()?;

        let config: ClinicConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        match path {
            Some(path) => info!("Configuration loaded from: {}", path),
            None => info!("Configuration loaded from defaults and environment"),
        }
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ConfigValidator::new().validate(self)
    }

    /// 以TOML格式写入文件
    pub async fn save(&self, path: &str) -> Result<()> {
        let content =
            toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        if let Some(parent) = std::path::Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .context("Failed to create configuration directory")?;
            }
        }

        tokio::fs::write(path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Configuration saved to: {}", path);
        Ok(())
    }
}

/// 配置验证器
#[derive(Debug)]
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

/// 验证规则
#[derive(Debug)]
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&ClinicConfig) -> Result<()>,
}

impl ConfigValidator {
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "api.base_url",
                validator: |config| {
                    let url = config.api.base_url.trim();
                    if url.is_empty() {
                        Err(anyhow::anyhow!(
                            "Missing API base URL. Set CLINIC_API__BASE_URL to the clinic backend"
                        ))
                    } else if !(url.starts_with("http://") || url.starts_with("https://")) {
                        Err(anyhow::anyhow!("API base URL must start with http:// or https://"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "api.timeout_secs",
                validator: |config| {
                    if config.api.timeout_secs == 0 {
                        Err(anyhow::anyhow!("Request timeout cannot be 0"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "session.storage_key",
                validator: |config| {
                    if config.session.storage_key.trim().is_empty() {
                        Err(anyhow::anyhow!("Session storage key cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
        ];

        Self { validation_rules }
    }

    pub fn validate(&self, config: &ClinicConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid {}: {}", rule.field_path, e));
            }
        }
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}
