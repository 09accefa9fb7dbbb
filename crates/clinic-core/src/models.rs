//! 核心数据模型定义
//!
//! 实体均由后端定义和持有，客户端仅镜像其结构。

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ClinicError;
use crate::utils::take_chars;

/// 用户信息
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    /// 原始角色字符串，保证会话信封往返不变
    #[serde(default)]
    pub role: String,
}

impl User {
    /// 按精确匹配解析角色
    pub fn role(&self) -> Option<UserRole> {
        UserRole::from_exact(&self.role)
    }
}

/// 用户角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 管理员 - 医生目录管理
    Admin,
    /// 医生 - 排班与预约审批
    Doctor,
    /// 患者 - 预约挂号
    Patient,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Doctor => "doctor",
            UserRole::Patient => "patient",
        }
    }

    /// 大小写敏感的精确匹配，"Admin" 不被视为管理员
    pub fn from_exact(value: &str) -> Option<Self> {
        match value {
            "admin" => Some(UserRole::Admin),
            "doctor" => Some(UserRole::Doctor),
            "patient" => Some(UserRole::Patient),
            _ => None,
        }
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserRole {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UserRole::from_exact(s)
            .ok_or_else(|| ClinicError::Validation(format!("Unknown role: {}", s)))
    }
}

/// 会话信封：登录后持久化的 `{user, token}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
    #[serde(default)]
    pub token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(user: User, token: impl Into<String>) -> Self {
        Self {
            user,
            token: token.into(),
            expires_at: None,
        }
    }
}

/// 专科
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Specialization {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: String,
}

/// 性别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Male,
    Female,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

impl FromStr for Gender {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "male" => Ok(Gender::Male),
            "female" => Ok(Gender::Female),
            _ => Err(ClinicError::Validation(
                "Gender must be male or female".to_string(),
            )),
        }
    }
}

/// 医生档案
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Doctor {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub user_id: i64,
    /// 后端字段名带有尾随空格，两种写法都接受
    #[serde(default, alias = "specialization_id ")]
    pub specialization_id: Option<i64>,
    #[serde(default)]
    pub gender: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub license_number: String,
    #[serde(default)]
    pub is_active: bool,
    #[serde(default)]
    pub user: Option<User>,
    #[serde(default)]
    pub specialization: Option<Specialization>,
}

impl Doctor {
    /// 医生姓名，缺失时回退为编号
    pub fn display_name(&self) -> String {
        self.user
            .as_ref()
            .map(|u| u.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Doctor #{}", self.id))
    }

    /// 专科名称，缺失时回退为专科ID，再缺失显示 `-`
    pub fn specialization_label(&self) -> String {
        self.specialization
            .as_ref()
            .map(|s| s.name.clone())
            .filter(|name| !name.is_empty())
            .or_else(|| self.resolve_specialization_id().map(|id| id.to_string()))
            .unwrap_or_else(|| "-".to_string())
    }

    /// 专科ID，优先取扁平字段，其次取关联对象
    pub fn resolve_specialization_id(&self) -> Option<i64> {
        self.specialization_id
            .or_else(|| self.specialization.as_ref().map(|s| s.id))
    }
}

/// 工作日
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkDay {
    #[default]
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl WorkDay {
    pub const ALL: [WorkDay; 7] = [
        WorkDay::Monday,
        WorkDay::Tuesday,
        WorkDay::Wednesday,
        WorkDay::Thursday,
        WorkDay::Friday,
        WorkDay::Saturday,
        WorkDay::Sunday,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkDay::Monday => "monday",
            WorkDay::Tuesday => "tuesday",
            WorkDay::Wednesday => "wednesday",
            WorkDay::Thursday => "thursday",
            WorkDay::Friday => "friday",
            WorkDay::Saturday => "saturday",
            WorkDay::Sunday => "sunday",
        }
    }
}

impl fmt::Display for WorkDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkDay {
    type Err = ClinicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        WorkDay::ALL
            .iter()
            .copied()
            .find(|day| day.as_str() == normalized)
            .ok_or_else(|| ClinicError::Validation(format!("Invalid work day: {}", s)))
    }
}

/// 医生排班
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub doctor_id: i64,
    #[serde(default)]
    pub work_day: WorkDay,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub end_time: String,
    #[serde(default)]
    pub patient_quota: i32,
}

/// 预约状态
///
/// 后端返回的未知状态保留为 `Unknown`，原样展示。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
    Completed,
    Unknown(String),
}

impl AppointmentStatus {
    pub fn as_str(&self) -> &str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Confirmed => "Confirmed",
            AppointmentStatus::Rejected => "Rejected",
            AppointmentStatus::Completed => "Completed",
            AppointmentStatus::Unknown(raw) => raw,
        }
    }

    /// 解析用户输入，接受与后端一致的别名
    pub fn normalize(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "pending" => Some(AppointmentStatus::Pending),
            "confirmed" | "approved" | "approve" | "approving" | "accept" | "accepted" => {
                Some(AppointmentStatus::Confirmed)
            }
            "rejected" | "reject" => Some(AppointmentStatus::Rejected),
            "completed" | "complete" => Some(AppointmentStatus::Completed),
            _ => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, AppointmentStatus::Unknown(_))
    }
}

impl From<String> for AppointmentStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Pending" => AppointmentStatus::Pending,
            "Confirmed" => AppointmentStatus::Confirmed,
            "Rejected" => AppointmentStatus::Rejected,
            "Completed" => AppointmentStatus::Completed,
            _ => AppointmentStatus::Unknown(value),
        }
    }
}

impl From<AppointmentStatus> for String {
    fn from(value: AppointmentStatus) -> Self {
        match value {
            AppointmentStatus::Unknown(raw) => raw,
            other => other.as_str().to_string(),
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 预约
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Appointment {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub doctor_id: i64,
    #[serde(default)]
    pub patient_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_id: Option<i64>,
    /// 后端返回RFC3339时间戳，仅前10位为日期
    #[serde(default)]
    pub appointment_date: String,
    #[serde(default)]
    pub start_time_slot: String,
    #[serde(default)]
    pub complaint: String,
    #[serde(default)]
    pub status: AppointmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub patient: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doctor: Option<Doctor>,
}

impl Appointment {
    pub fn date_label(&self) -> String {
        non_empty_or_dash(take_chars(&self.appointment_date, 10))
    }

    pub fn time_label(&self) -> String {
        non_empty_or_dash(take_chars(&self.start_time_slot, 5))
    }

    pub fn complaint_label(&self) -> String {
        non_empty_or_dash(self.complaint.clone())
    }

    pub fn patient_label(&self) -> String {
        self.patient
            .as_ref()
            .map(|p| p.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Patient #{}", self.patient_id))
    }

    pub fn doctor_label(&self) -> String {
        self.doctor
            .as_ref()
            .and_then(|d| d.user.as_ref())
            .map(|u| u.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| format!("Doctor #{}", self.doctor_id))
    }

    pub fn date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&take_chars(&self.appointment_date, 10), "%Y-%m-%d").ok()
    }

    /// 预约的本地日期时间，无法解析时为None
    pub fn scheduled_at(&self) -> Option<NaiveDateTime> {
        let date = self.date()?;
        let time = NaiveTime::parse_from_str(&take_chars(&self.start_time_slot, 5), "%H:%M").ok()?;
        Some(date.and_time(time))
    }
}

fn non_empty_or_dash(value: String) -> String {
    if value.is_empty() {
        "-".to_string()
    } else {
        value
    }
}

/// 登录请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// 注册请求
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<UserRole>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_picture: Option<String>,
}

/// 登录响应（信封中的data部分）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user: User,
    pub token: String,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<LoginResponse> for Session {
    fn from(value: LoginResponse) -> Self {
        Session {
            user: value.user,
            token: value.token,
            expires_at: value.expires_at,
        }
    }
}

/// 医生创建/更新请求，同时用于医生更新个人档案
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DoctorRequest {
    pub name: String,
    pub email: String,
    pub specialization_id: i64,
    pub gender: Gender,
    pub address: String,
    pub license_number: String,
}

/// 排班创建/更新请求，doctor_id 由后端根据令牌填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub work_day: WorkDay,
    pub start_time: String,
    pub end_time: String,
    pub patient_quota: i32,
}

/// 患者预约请求，patient_id 由后端根据令牌填充
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentRequest {
    pub doctor_id: i64,
    pub appointment_date: String,
    pub start_time_slot: String,
    pub complaint: String,
}

/// 医生更新预约状态
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppointmentStatusUpdate {
    pub status: AppointmentStatus,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_exact_match() {
        assert_eq!(UserRole::from_exact("admin"), Some(UserRole::Admin));
        assert_eq!(UserRole::from_exact("doctor"), Some(UserRole::Doctor));
        assert_eq!(UserRole::from_exact("patient"), Some(UserRole::Patient));
        assert_eq!(UserRole::from_exact("Admin"), None);
        assert_eq!(UserRole::from_exact(" admin"), None);
        assert_eq!(UserRole::from_exact(""), None);
    }

    #[test]
    fn test_status_wire_format() {
        let status: AppointmentStatus = serde_json::from_value(json!("Confirmed")).unwrap();
        assert_eq!(status, AppointmentStatus::Confirmed);

        let status: AppointmentStatus = serde_json::from_value(json!("Cancelled")).unwrap();
        assert_eq!(status, AppointmentStatus::Unknown("Cancelled".to_string()));
        assert_eq!(serde_json::to_value(&status).unwrap(), json!("Cancelled"));
    }

    #[test]
    fn test_status_aliases() {
        assert_eq!(
            AppointmentStatus::normalize(" Approved "),
            Some(AppointmentStatus::Confirmed)
        );
        assert_eq!(
            AppointmentStatus::normalize("accept"),
            Some(AppointmentStatus::Confirmed)
        );
        assert_eq!(
            AppointmentStatus::normalize("REJECT"),
            Some(AppointmentStatus::Rejected)
        );
        assert_eq!(
            AppointmentStatus::normalize("complete"),
            Some(AppointmentStatus::Completed)
        );
        assert_eq!(AppointmentStatus::normalize("cancel"), None);
    }

    #[test]
    fn test_doctor_accepts_padded_specialization_key() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 3,
            "specialization_id ": 7,
            "license_number": "STR-1",
            "is_active": true
        }))
        .unwrap();
        assert_eq!(doctor.specialization_id, Some(7));
        assert_eq!(doctor.display_name(), "Doctor #3");

        let doctor: Doctor = serde_json::from_value(json!({
            "id": 4,
            "specialization": {"id": 2, "name": "Cardiology"}
        }))
        .unwrap();
        assert_eq!(doctor.resolve_specialization_id(), Some(2));
        assert_eq!(doctor.specialization_label(), "Cardiology");
    }

    #[test]
    fn test_specialization_label_falls_back_to_id() {
        let doctor: Doctor = serde_json::from_value(json!({
            "id": 1,
            "specialization_id": 2,
            "license_number": "STR-2"
        }))
        .unwrap();
        assert_eq!(doctor.specialization_label(), "2");

        let doctor: Doctor = serde_json::from_value(json!({
            "id": 9,
            "specialization": {"id": 0, "name": ""}
        }))
        .unwrap();
        assert_eq!(doctor.specialization_label(), "0");

        assert_eq!(Doctor::default().specialization_label(), "-");
    }

    #[test]
    fn test_session_without_token_keeps_user() {
        let session: Session = serde_json::from_value(json!({
            "user": {"id": 7, "name": "Budi", "email": "budi@clinic.id", "role": "doctor"}
        }))
        .unwrap();
        assert_eq!(session.token, "");
        assert_eq!(session.user.role(), Some(UserRole::Doctor));
    }

    #[test]
    fn test_appointment_labels() {
        let appointment: Appointment = serde_json::from_value(json!({
            "id": 1,
            "doctor_id": 2,
            "patient_id": 5,
            "appointment_date": "2026-11-02T00:00:00Z",
            "start_time_slot": "09:30:00",
            "complaint": "",
            "status": "Pending"
        }))
        .unwrap();
        assert_eq!(appointment.date_label(), "2026-11-02");
        assert_eq!(appointment.time_label(), "09:30");
        assert_eq!(appointment.complaint_label(), "-");
        assert_eq!(appointment.patient_label(), "Patient #5");
        assert_eq!(
            appointment.scheduled_at(),
            NaiveDate::from_ymd_opt(2026, 11, 2).and_then(|d| d.and_hms_opt(9, 30, 0))
        );
    }

    #[test]
    fn test_login_response_into_session() {
        let response: LoginResponse = serde_json::from_value(json!({
            "user": {"id": 1, "name": "Rina", "email": "rina@clinic.id", "role": "patient", "password": ""},
            "token": "abc"
        }))
        .unwrap();
        let session = Session::from(response);
        assert_eq!(session.token, "abc");
        assert_eq!(session.user.role(), Some(UserRole::Patient));
    }
}
