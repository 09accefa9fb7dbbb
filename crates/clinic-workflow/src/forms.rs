//! 医生、排班与认证表单校验

use clinic_core::utils::{parse_time, take_chars};
use clinic_core::{
    ClinicError, Doctor, DoctorRequest, Gender, LoginRequest, RegisterRequest, Result,
    Schedule, ScheduleRequest, UserRole, WorkDay,
};

pub const REQUIRED_FIELDS: &str = "Please complete the required fields";
pub const SPECIALIZATION_NOT_NUMBER: &str = "Specialization must be a number";

/// 后端要求的最短密码长度
pub const MIN_PASSWORD_LEN: usize = 6;

/// 管理员维护医生时使用的表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoctorForm {
    pub name: String,
    pub email: String,
    pub specialization_id: String,
    pub gender: String,
    pub address: String,
    pub license_number: String,
}

impl Default for DoctorForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            email: String::new(),
            specialization_id: String::new(),
            gender: Gender::Male.as_str().to_string(),
            address: String::new(),
            license_number: String::new(),
        }
    }
}

impl DoctorForm {
    /// 以现有医生档案填充表单（编辑）
    pub fn from_doctor(doctor: &Doctor) -> Self {
        let user = doctor.user.clone().unwrap_or_default();
        Self {
            name: user.name,
            email: user.email,
            specialization_id: doctor
                .resolve_specialization_id()
                .map(|id| id.to_string())
                .unwrap_or_default(),
            gender: if doctor.gender.is_empty() {
                Gender::Male.as_str().to_string()
            } else {
                doctor.gender.clone()
            },
            address: doctor.address.clone(),
            license_number: doctor.license_number.clone(),
        }
    }

    pub fn to_request(&self) -> Result<DoctorRequest> {
        let name = self.name.trim();
        let email = self.email.trim();
        let license_number = self.license_number.trim();
        if name.is_empty() || email.is_empty() || license_number.is_empty() {
            return Err(ClinicError::Validation(REQUIRED_FIELDS.to_string()));
        }

        let specialization_id = self
            .specialization_id
            .trim()
            .parse::<i64>()
            .map_err(|_| ClinicError::Validation(SPECIALIZATION_NOT_NUMBER.to_string()))?;

        let gender = self.gender.trim().parse::<Gender>()?;

        Ok(DoctorRequest {
            name: name.to_string(),
            email: email.to_string(),
            specialization_id,
            gender,
            address: self.address.trim().to_string(),
            license_number: license_number.to_string(),
        })
    }
}

/// 医生排班表单
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ScheduleForm {
    pub work_day: String,
    pub start_time: String,
    pub end_time: String,
    pub patient_quota: String,
}

impl ScheduleForm {
    /// 以现有排班填充表单（编辑）
    pub fn from_schedule(schedule: &Schedule) -> Self {
        Self {
            work_day: schedule.work_day.to_string(),
            start_time: take_chars(&schedule.start_time, 5),
            end_time: take_chars(&schedule.end_time, 5),
            patient_quota: schedule.patient_quota.to_string(),
        }
    }

    pub fn to_request(&self) -> Result<ScheduleRequest> {
        let work_day = self.work_day.parse::<WorkDay>()?;

        let start = parse_time(self.start_time.trim())
            .ok_or_else(|| ClinicError::Validation("Start time must use HH:MM".to_string()))?;
        let end = parse_time(self.end_time.trim())
            .ok_or_else(|| ClinicError::Validation("End time must use HH:MM".to_string()))?;
        if end <= start {
            return Err(ClinicError::Validation(
                "End time must be after start time".to_string(),
            ));
        }

        let quota = self.patient_quota.trim();
        let patient_quota = if quota.is_empty() {
            0
        } else {
            quota
                .parse::<i32>()
                .ok()
                .filter(|q| *q >= 0)
                .ok_or_else(|| {
                    ClinicError::Validation("Patient quota must be a non-negative number".to_string())
                })?
        };

        Ok(ScheduleRequest {
            work_day,
            start_time: start.format("%H:%M").to_string(),
            end_time: end.format("%H:%M").to_string(),
            patient_quota,
        })
    }
}

fn validate_credentials(email: &str, password: &str) -> Result<()> {
    if email.is_empty() || !email.contains('@') {
        return Err(ClinicError::Validation("Enter a valid email address".to_string()));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(ClinicError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

/// 登录表单
pub fn login_request(email: &str, password: &str) -> Result<LoginRequest> {
    let email = email.trim();
    validate_credentials(email, password)?;
    Ok(LoginRequest {
        email: email.to_string(),
        password: password.to_string(),
    })
}

/// 注册表单
pub fn register_request(
    name: &str,
    email: &str,
    password: &str,
    role: Option<UserRole>,
) -> Result<RegisterRequest> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ClinicError::Validation(REQUIRED_FIELDS.to_string()));
    }
    let email = email.trim();
    validate_credentials(email, password)?;
    Ok(RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: password.to_string(),
        role,
        profile_picture: None,
    })
}
