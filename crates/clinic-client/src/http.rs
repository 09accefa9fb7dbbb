//! REST请求封装
//!
//! 每次调用只做一次请求/响应往返：附加Bearer令牌，解析JSON，
//! 凭证失效时清除会话并跳转登录页。不做重试。

use clinic_core::error::GENERIC_REQUEST_FAILURE;
use clinic_core::{ClinicError, Result};
use clinic_session::SessionStore;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::envelope::message_of;
use crate::navigator::{LogNavigator, Navigator};

/// 默认后端地址
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// 默认请求超时
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const REQUEST_ID_HEADER: &str = "x-request-id";

/// 单次请求参数
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Method,
    pub body: Option<Value>,
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            ..Default::default()
        }
    }

    pub fn json<B: Serialize + ?Sized>(mut self, body: &B) -> Result<Self> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((key.into(), value.into()));
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }
}

/// 判断401消息是否指向令牌问题
pub fn is_token_issue(message: &str) -> bool {
    let normalized = message.to_lowercase();
    normalized.contains("token") || normalized.contains("expired") || normalized.contains("credential")
}

/// API客户端构建器
pub struct ApiClientBuilder {
    base_url: String,
    session: SessionStore,
    timeout: Duration,
    navigator: Arc<dyn Navigator>,
}

impl ApiClientBuilder {
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn navigator(mut self, navigator: Arc<dyn Navigator>) -> Self {
        self.navigator = navigator;
        self
    }

    pub fn build(self) -> Result<ApiClient> {
        let base_url = self.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(ClinicError::Config(
                "Missing API base URL. Point it at the clinic backend".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| ClinicError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(ApiClient {
            http,
            base_url,
            session: self.session,
            navigator: self.navigator,
        })
    }
}

/// API客户端
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn builder(base_url: impl Into<String>, session: SessionStore) -> ApiClientBuilder {
        ApiClientBuilder {
            base_url: base_url.into(),
            session,
            timeout: DEFAULT_TIMEOUT,
            navigator: Arc::new(LogNavigator),
        }
    }

    pub fn new(base_url: impl Into<String>, session: SessionStore) -> Result<Self> {
        Self::builder(base_url, session).build()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// 发送请求并返回解析后的响应体
    ///
    /// 响应体无法解析为JSON时视为null。非2xx状态返回 [`ClinicError::Request`]，
    /// 携带令牌时收到令牌相关的401则返回 [`ClinicError::CredentialExpired`]。
    pub async fn request(&self, path: &str, options: RequestOptions) -> Result<Value> {
        let url = format!("{}{}", self.base_url, path);
        let request_id = Uuid::new_v4().to_string();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        for (key, value) in &options.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| ClinicError::Validation(format!("Invalid header name: {}", key)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| ClinicError::Validation(format!("Invalid header value for {}", key)))?;
            headers.insert(name, value);
        }

        let token = self.session.get_token();
        let had_token = token.is_some();
        if let Some(token) = token {
            let value = HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ClinicError::Validation("Stored token is not a valid header".to_string()))?;
            headers.insert(AUTHORIZATION, value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            headers.insert(REQUEST_ID_HEADER, value);
        }

        let mut builder = self
            .http
            .request(options.method.clone(), &url)
            .headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        if let Some(body) = &options.body {
            builder = builder.body(body.to_string());
        }

        debug!(%request_id, method = %options.method, path, authenticated = had_token, "API request");

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(%request_id, path, "API request failed: {}", e);
                return Err(ClinicError::request_failed(None));
            }
        };

        let status = response.status();
        let payload = match response.text().await {
            Ok(text) => serde_json::from_str::<Value>(&text).unwrap_or(Value::Null),
            Err(e) => {
                debug!(%request_id, "Failed to read response body: {}", e);
                Value::Null
            }
        };

        debug!(%request_id, status = status.as_u16(), path, "API response");

        if !status.is_success() {
            let message = message_of(&payload).unwrap_or_else(|| GENERIC_REQUEST_FAILURE.to_string());

            if status == StatusCode::UNAUTHORIZED && had_token && is_token_issue(&message) {
                warn!(%request_id, "Credential rejected by backend, signing out: {}", message);
                self.session.clear();
                self.navigator.redirect_to_login();
                return Err(ClinicError::CredentialExpired { message });
            }

            return Err(ClinicError::Request {
                status: Some(status.as_u16()),
                message,
            });
        }

        Ok(payload)
    }

    pub async fn get(&self, path: &str) -> Result<Value> {
        self.request(path, RequestOptions::new(Method::GET)).await
    }

    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Value> {
        self.request(path, RequestOptions::new(method).json(body)?).await
    }

    pub async fn send_empty(&self, method: Method, path: &str) -> Result<Value> {
        self.request(path, RequestOptions::new(method)).await
    }
}
