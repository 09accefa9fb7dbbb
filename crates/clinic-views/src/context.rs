//! 页面上下文
//!
//! 每个页面都通过 [`AppContext`] 取得会话、接口与时钟，不直接读取全局状态。

use crate::role::ViewRole;
use chrono::{Local, NaiveDate, NaiveDateTime};
use clinic_client::ClinicApi;
use clinic_core::User;
use clinic_session::SessionStore;
use std::fmt;
use std::sync::Arc;

/// 本地时钟
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    fn today(&self) -> NaiveDate {
        self.now().date()
    }
}

/// 系统本地时间
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// 固定时间，用于测试
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// 应用上下文
#[derive(Clone)]
pub struct AppContext {
    session: SessionStore,
    api: ClinicApi,
    clock: Arc<dyn Clock>,
}

impl AppContext {
    /// 会话取自接口客户端，两者共享同一个存储
    pub fn new(api: ClinicApi) -> Self {
        Self {
            session: api.client().session().clone(),
            api,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn api(&self) -> &ClinicApi {
        &self.api
    }

    pub fn user(&self) -> Option<User> {
        self.session.get_user()
    }

    /// 每次调用都重新读取会话，外部登出后立即生效
    pub fn role(&self) -> ViewRole {
        ViewRole::from_session(&self.session)
    }

    pub fn now(&self) -> NaiveDateTime {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }
}

impl fmt::Debug for AppContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppContext")
            .field("session", &self.session)
            .field("base_url", &self.api.client().base_url())
            .field("now", &self.clock.now())
            .finish()
    }
}
