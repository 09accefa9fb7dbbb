//! 通用工具函数

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

/// 表单默认开始时间
pub const DEFAULT_START_TIME: &str = "09:00";

fn time_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^([01]\d|2[0-3]):[0-5]\d$").expect("valid time pattern"))
}

/// 按字符截取前n个字符
pub fn take_chars(value: &str, n: usize) -> String {
    value.chars().take(n).collect()
}

/// 验证 `HH:MM` 时间格式（先截取前5个字符）
pub fn is_valid_time_value(value: &str) -> bool {
    time_pattern().is_match(&take_chars(value, 5))
}

/// 解析 `HH:MM`
pub fn parse_time(value: &str) -> Option<NaiveTime> {
    let value = take_chars(value, 5);
    if !time_pattern().is_match(&value) {
        return None;
    }
    NaiveTime::parse_from_str(&value, "%H:%M").ok()
}

/// 解析 `YYYY-MM-DD`
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

/// 组合本地日期与时间，任一无法解析则返回None
pub fn build_local_datetime(date: &str, time: &str) -> Option<NaiveDateTime> {
    if date.is_empty() || time.is_empty() {
        return None;
    }
    Some(parse_date(date)?.and_time(parse_time(time)?))
}

/// 日期的ISO表示
pub fn iso_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
