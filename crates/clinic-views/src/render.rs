//! 文本渲染辅助

use crate::pages::{Notice, Restricted};
use clinic_core::{Appointment, AppointmentStatus, Doctor, Schedule};
use std::fmt::{self, Write};

/// 预约状态的展示文字，未知状态原样显示
pub fn status_label(status: &AppointmentStatus) -> String {
    match status {
        AppointmentStatus::Pending => "Waiting".to_string(),
        AppointmentStatus::Confirmed => "Approved".to_string(),
        AppointmentStatus::Rejected => "Rejected".to_string(),
        AppointmentStatus::Completed => "Done".to_string(),
        AppointmentStatus::Unknown(raw) if raw.trim().is_empty() => "-".to_string(),
        AppointmentStatus::Unknown(raw) => raw.clone(),
    }
}

pub(crate) fn heading(f: &mut fmt::Formatter<'_>, title: &str) -> fmt::Result {
    writeln!(f, "{}", title)?;
    writeln!(f, "{}", "=".repeat(title.chars().count()))
}

pub(crate) fn notice(f: &mut fmt::Formatter<'_>, notice: &Notice) -> fmt::Result {
    if let Some(error) = &notice.error {
        writeln!(f, "[error] {}", error)?;
    }
    if let Some(message) = &notice.message {
        writeln!(f, "[ok] {}", message)?;
    }
    Ok(())
}

pub(crate) fn restricted(f: &mut fmt::Formatter<'_>, page: &Restricted) -> fmt::Result {
    writeln!(f, "RESTRICTED")?;
    heading(f, page.title)?;
    writeln!(f, "{}", page.detail)
}

pub(crate) fn doctor_row(doctor: &Doctor) -> String {
    let mut row = format!(
        "#{:<4} {:<24} {:<18} {}",
        doctor.id,
        doctor.display_name(),
        doctor.specialization_label(),
        if doctor.license_number.is_empty() {
            "-"
        } else {
            doctor.license_number.as_str()
        }
    );
    if !doctor.is_active {
        row.push_str(" (inactive)");
    }
    row
}

pub(crate) fn schedule_row(schedule: &Schedule) -> String {
    format!(
        "#{:<4} {:<10} {}-{}  quota {}",
        schedule.id,
        schedule.work_day,
        schedule.start_time,
        schedule.end_time,
        schedule.patient_quota
    )
}

/// 预约行；`counterpart` 为对方的名称
pub(crate) fn appointment_row(item: &Appointment, counterpart: &str, actions: &[&str]) -> String {
    let mut row = String::new();
    let _ = write!(
        row,
        "#{:<4} {} {}  {:<20} {:<9} {}",
        item.id,
        item.date_label(),
        item.time_label(),
        counterpart,
        status_label(&item.status),
        item.complaint_label()
    );
    if !actions.is_empty() {
        let _ = write!(row, "  [{}]", actions.join(" | "));
    }
    row
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(status_label(&AppointmentStatus::Pending), "Waiting");
        assert_eq!(status_label(&AppointmentStatus::Confirmed), "Approved");
        assert_eq!(status_label(&AppointmentStatus::Completed), "Done");
        assert_eq!(status_label(&AppointmentStatus::Unknown("Postponed".to_string())), "Postponed");
        assert_eq!(status_label(&AppointmentStatus::Unknown(String::new())), "-");
    }

    #[test]
    fn test_appointment_row() {
        let item = Appointment {
            id: 7,
            appointment_date: "2026-10-20T00:00:00Z".to_string(),
            start_time_slot: "09:30:00".to_string(),
            status: AppointmentStatus::Confirmed,
            ..Default::default()
        };
        let row = appointment_row(&item, "Dr. Sarah", &["Cancel"]);
        assert!(row.starts_with("#7"));
        assert!(row.contains("2026-10-20 09:30"));
        assert!(row.contains("Approved"));
        assert!(row.ends_with("[Cancel]"));
    }
}
