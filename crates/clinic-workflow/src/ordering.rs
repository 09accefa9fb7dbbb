//! 预约列表排序

use clinic_core::{Appointment, AppointmentStatus};
use std::cmp::{Ordering, Reverse};

/// 患者历史：最新的在前，无法解析日期的排最后
pub fn sort_history(items: &mut [Appointment]) {
    items.sort_by(|a, b| match (a.scheduled_at(), b.scheduled_at()) {
        (Some(x), Some(y)) => y.cmp(&x).then_with(|| b.id.cmp(&a.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.id.cmp(&a.id),
    });
}

fn action_rank(status: &AppointmentStatus) -> u8 {
    match status {
        AppointmentStatus::Pending => 0,
        AppointmentStatus::Confirmed => 1,
        _ => 2,
    }
}

/// 医生收到的预约：待处理在前，同组内时间最早的在前
pub fn sort_requests(items: &mut [Appointment]) {
    items.sort_by_key(|item| {
        let when = item.scheduled_at();
        (action_rank(&item.status), when.is_none(), when, item.id)
    });
}

/// 最近的n个未来预约（日期时间晚于now）
pub fn upcoming(items: &[Appointment], now: chrono::NaiveDateTime, limit: usize) -> Vec<Appointment> {
    let mut future: Vec<Appointment> = items
        .iter()
        .filter(|item| item.scheduled_at().map(|at| at > now).unwrap_or(false))
        .filter(|item| {
            matches!(
                item.status,
                AppointmentStatus::Pending | AppointmentStatus::Confirmed
            )
        })
        .cloned()
        .collect();
    future.sort_by_key(|item| (item.scheduled_at(), Reverse(item.id)));
    future.truncate(limit);
    future
}
