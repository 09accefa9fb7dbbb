//! 页面视图模型
//!
//! 每个页面按角色构建，只拉取该角色需要的数据。
//! 请求失败写入页面内联的 `error`，成功提示写入 `message`。

pub mod bookings;
pub mod dashboard;
pub mod doctors;
pub mod profile;
pub mod schedules;

use crate::context::AppContext;
use async_trait::async_trait;
use clinic_core::ClinicError;
use tracing::debug;

pub use bookings::{BookingsPage, DoctorBookings, PatientBookings};
pub use dashboard::{DashboardPage, DashboardView, StatusCounts};
pub use doctors::{DoctorDirectory, DoctorsPage};
pub use profile::{AccountProfile, DoctorProfile, ProfilePage};
pub use schedules::{ScheduleBuilder, SchedulesPage};

/// 页面内联提示
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notice {
    pub error: Option<String>,
    pub message: Option<String>,
}

impl Notice {
    pub fn clear(&mut self) {
        self.error = None;
        self.message = None;
    }

    /// 记录失败，错误没有消息时使用 `fallback`
    pub fn fail(&mut self, err: &ClinicError, fallback: &str) {
        let text = err.to_string();
        if err.is_credential_expired() {
            debug!("Credential expired while rendering page: {}", text);
        }
        self.error = Some(if text.trim().is_empty() {
            fallback.to_string()
        } else {
            text
        });
    }

    pub fn succeed(&mut self, message: impl Into<String>) {
        self.error = None;
        self.message = Some(message.into());
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 非本角色可用的页面
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Restricted {
    pub title: &'static str,
    pub detail: &'static str,
}

impl Restricted {
    pub const fn new(title: &'static str, detail: &'static str) -> Self {
        Self { title, detail }
    }
}

/// 可刷新的页面
#[async_trait]
pub trait Page: Send {
    /// 重新拉取页面数据
    async fn refresh(&mut self, ctx: &AppContext);

    fn notice(&self) -> &Notice;
}
