//! # Clinic Views
//!
//! 按角色划分的页面视图模型：
//! - 角色判定与路由守卫
//! - 仪表盘、医生目录、排班、预约与个人资料页面
//! - 页面的文本渲染

pub mod context;
pub mod pages;
pub mod render;
pub mod role;
pub mod route;
pub mod view;

pub use context::{AppContext, Clock, FixedClock, SystemClock};
pub use pages::{Notice, Page, Restricted};
pub use render::status_label;
pub use role::ViewRole;
pub use route::{guard, menu, MenuItem, Route};
pub use view::{open, render_menu, View};
