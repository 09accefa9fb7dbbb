//! 视图跳转
//!
//! 凭证失效时，API客户端通过 [`Navigator`] 请求跳转到登录页。

use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// 跳转接口
pub trait Navigator: Send + Sync {
    /// 以替换方式跳转到登录页
    fn redirect_to_login(&self);
}

/// 仅记录日志的跳转器
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect_to_login(&self) {
        info!("Redirecting to login view");
    }
}

/// 记录跳转次数，便于测试断言
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    redirects: AtomicUsize,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn redirects(&self) -> usize {
        self.redirects.load(Ordering::SeqCst)
    }
}

impl Navigator for RecordingNavigator {
    fn redirect_to_login(&self) {
        self.redirects.fetch_add(1, Ordering::SeqCst);
    }
}
