//! # Clinic Workflow
//!
//! 客户端侧的预约流程辅助：
//! - 预约状态机：决定医生与患者在各状态下可执行的操作
//! - 预约表单：日期时间的展示层校验
//! - 医生、排班与认证表单校验
//! - 预约列表排序

pub mod booking;
pub mod forms;
pub mod ordering;
pub mod state_machine;

pub use booking::BookingForm;
pub use forms::{login_request, register_request, DoctorForm, ScheduleForm};
pub use ordering::{sort_history, sort_requests, upcoming};
pub use state_machine::{Actor, AppointmentAction, AppointmentStateMachine};
