//! # Clinic Client
//!
//! 诊所后端的REST客户端：
//! - 请求封装：Bearer令牌、JSON信封拆解、凭证失效处理
//! - 按角色划分的接口分组：认证、患者、医生、管理员、排班

pub mod api;
pub mod envelope;
pub mod http;
pub mod navigator;

pub use api::{
    AdminDoctorApi, AuthApi, ClinicApi, DoctorAppointmentApi, DoctorProfileApi, PatientApi,
    Registration, ScheduleApi,
};
pub use envelope::{data_or_none, ensure_array, message_of, unwrap_data};
pub use http::{is_token_issue, ApiClient, ApiClientBuilder, RequestOptions, DEFAULT_BASE_URL};
pub use navigator::{LogNavigator, Navigator, RecordingNavigator};
