//! 预约表单
//!
//! 只做展示层校验：字段非空、时间格式、日期时间在未来。
//! 配额与冲突检测由后端负责。

use chrono::{NaiveDate, NaiveDateTime};
use clinic_core::utils::{build_local_datetime, is_valid_time_value, iso_date, parse_date, take_chars, DEFAULT_START_TIME};
use clinic_core::{AppointmentRequest, ClinicError, Result};

pub const MISSING_FIELDS: &str = "Complete the desired date and time.";
pub const INVALID_TIME: &str = "Invalid time format. Use e.g. 09:30.";
pub const UNPARSEABLE_DATETIME: &str = "Date or time could not be processed.";
pub const NOT_IN_FUTURE: &str = "Choose a date and time in the future.";

/// 患者预约表单
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookingForm {
    pub doctor_id: Option<i64>,
    pub appointment_date: String,
    pub start_time: String,
    pub complaint: String,
}

impl BookingForm {
    /// 日期默认为今天，时间默认为09:00
    pub fn new(today: NaiveDate) -> Self {
        Self {
            doctor_id: None,
            appointment_date: iso_date(today),
            start_time: DEFAULT_START_TIME.to_string(),
            complaint: String::new(),
        }
    }

    pub fn select_doctor(&mut self, doctor_id: i64) {
        self.doctor_id = Some(doctor_id);
    }

    /// 日期为空或早于今天时回到今天
    pub fn set_appointment_date(&mut self, value: &str, today: NaiveDate) {
        let value = value.trim();
        if value.is_empty() {
            self.appointment_date = iso_date(today);
            return;
        }
        match parse_date(value) {
            Some(date) if date < today => self.appointment_date = iso_date(today),
            _ => self.appointment_date = value.to_string(),
        }
    }

    /// 时间截取前5位，格式不合法时回到默认值
    pub fn set_start_time(&mut self, value: &str) {
        let normalized = take_chars(value.trim(), 5);
        if is_valid_time_value(&normalized) {
            self.start_time = normalized;
        } else {
            self.start_time = DEFAULT_START_TIME.to_string();
        }
    }

    pub fn set_complaint(&mut self, value: &str) {
        self.complaint = value.to_string();
    }

    pub fn can_submit(&self) -> bool {
        self.doctor_id.is_some() && !self.appointment_date.is_empty() && !self.start_time.is_empty()
    }

    /// 提交前校验，`now` 为本地当前时间
    pub fn validate(&self, now: NaiveDateTime) -> Result<AppointmentRequest> {
        let doctor_id = match self.doctor_id {
            Some(id) if !self.appointment_date.is_empty() && !self.start_time.is_empty() => id,
            _ => return Err(ClinicError::Validation(MISSING_FIELDS.to_string())),
        };

        let normalized_time = take_chars(&self.start_time, 5);
        if !is_valid_time_value(&normalized_time) {
            return Err(ClinicError::Validation(INVALID_TIME.to_string()));
        }

        let desired = build_local_datetime(&self.appointment_date, &normalized_time)
            .ok_or_else(|| ClinicError::Validation(UNPARSEABLE_DATETIME.to_string()))?;

        if desired <= now {
            return Err(ClinicError::Validation(NOT_IN_FUTURE.to_string()));
        }

        Ok(AppointmentRequest {
            doctor_id,
            appointment_date: self.appointment_date.clone(),
            start_time_slot: normalized_time,
            complaint: self.complaint.clone(),
        })
    }

    /// 提交成功后重置，保留已选医生
    pub fn reset(&mut self, today: NaiveDate) {
        self.appointment_date = iso_date(today);
        self.start_time = DEFAULT_START_TIME.to_string();
        self.complaint.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn now() -> NaiveDateTime {
        today().and_hms_opt(10, 0, 0).unwrap()
    }

    fn form(date: &str, time: &str) -> BookingForm {
        BookingForm {
            doctor_id: Some(3),
            appointment_date: date.to_string(),
            start_time: time.to_string(),
            complaint: "batuk".to_string(),
        }
    }

    fn message(result: Result<AppointmentRequest>) -> String {
        result.unwrap_err().to_string()
    }

    #[test]
    fn test_valid_booking() {
        let request = form("2026-10-18", "10:30:00").validate(now()).unwrap();
        assert_eq!(request.doctor_id, 3);
        assert_eq!(request.appointment_date, "2026-10-18");
        assert_eq!(request.start_time_slot, "10:30");
        assert_eq!(request.complaint, "batuk");
    }

    #[test]
    fn test_rejects_past_date_and_time() {
        assert_eq!(message(form("2026-10-17", "11:00").validate(now())), NOT_IN_FUTURE);
        assert_eq!(message(form("2026-10-18", "09:59").validate(now())), NOT_IN_FUTURE);
        assert_eq!(message(form("2026-10-18", "10:00").validate(now())), NOT_IN_FUTURE);
    }

    #[test]
    fn test_rejects_malformed_time() {
        assert_eq!(message(form("2026-10-20", "25:00").validate(now())), INVALID_TIME);
        assert_eq!(message(form("2026-10-20", "9.30").validate(now())), INVALID_TIME);
    }

    #[test]
    fn test_rejects_missing_and_unparseable() {
        let mut missing_doctor = form("2026-10-20", "10:00");
        missing_doctor.doctor_id = None;
        assert!(!missing_doctor.can_submit());
        assert_eq!(message(missing_doctor.validate(now())), MISSING_FIELDS);

        assert_eq!(message(form("", "10:00").validate(now())), MISSING_FIELDS);
        assert_eq!(message(form("2026-02-30", "10:00").validate(now())), UNPARSEABLE_DATETIME);
    }

    #[test]
    fn test_date_field_snaps_to_today() {
        let mut form = BookingForm::new(today());
        form.set_appointment_date("2026-10-01", today());
        assert_eq!(form.appointment_date, "2026-10-18");

        form.set_appointment_date("", today());
        assert_eq!(form.appointment_date, "2026-10-18");

        form.set_appointment_date("2026-12-24", today());
        assert_eq!(form.appointment_date, "2026-12-24");
    }

    #[test]
    fn test_time_field_falls_back_to_default() {
        let mut form = BookingForm::new(today());
        form.set_start_time("14:45:00");
        assert_eq!(form.start_time, "14:45");

        form.set_start_time("noon");
        assert_eq!(form.start_time, DEFAULT_START_TIME);
    }

    #[test]
    fn test_reset_keeps_doctor() {
        let mut form = form("2026-12-24", "15:00");
        form.reset(today());
        assert_eq!(form.doctor_id, Some(3));
        assert_eq!(form.appointment_date, "2026-10-18");
        assert_eq!(form.start_time, DEFAULT_START_TIME);
        assert!(form.complaint.is_empty());
    }
}
