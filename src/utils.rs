use std::hash::Hash;

use chrono::{NaiveTime, TimeDelta, Timelike};
use itertools::Itertools;

/// Time of day from an `(hour, minute)` pair; out-of-range pairs fall back to midnight.
pub fn clock((hour, minute): (u32, u32)) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or_default()
}

/// Move a clock forward by whole minutes; `None` once it would pass midnight.
pub fn advance(at: NaiveTime, minutes: i64) -> Option<NaiveTime> {
    let (next, wrapped) = at.overflowing_add_signed(TimeDelta::minutes(minutes));
    (wrapped == 0).then_some(next)
}

/// Whole minutes needed to drive `miles` at `mph`, rounded to the nearest minute.
pub fn travel_minutes(miles: f64, mph: f64) -> i64 {
    ((miles / mph) * 60.0).round() as i64
}

pub fn minutes_of_day(at: NaiveTime) -> u32 {
    at.num_seconds_from_midnight() / 60
}

pub fn hhmm(at: NaiveTime) -> String {
    at.format("%H:%M").to_string()
}

/// Clock from `H:MM` plus an optional `am`/`pm` marker.
pub fn meridiem_clock(hour: u32, minute: u32, meridiem: Option<&str>) -> Option<NaiveTime> {
    let hour = match meridiem.map(|m| m.to_ascii_lowercase()) {
        Some(m) if m == "pm" && hour != 12 => hour + 12,
        Some(m) if m == "am" && hour == 12 => 0,
        Some(_) if hour > 12 => return None,
        _ => hour,
    };
    NaiveTime::from_hms_opt(hour, minute, 0)
}

/// Parse labels such as `10:30 AM`, `10:30AM` or `14:05`.
pub fn parse_clock_label(label: &str) -> Option<NaiveTime> {
    let s = label.trim().to_ascii_uppercase();
    ["%I:%M %p", "%I:%M%p", "%H:%M", "%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(&s, fmt).ok())
}

/// Deadline of a parcel. `EOD`, blanks and unreadable labels mean "no deadline".
pub fn parse_deadline(label: &str) -> Option<NaiveTime> {
    let s = label.trim().to_ascii_uppercase();
    if s.is_empty() || s == "EOD" || s == "END OF DAY" {
        return None;
    }
    parse_clock_label(&s)
}

pub fn dedupe_preserving_order<T: Clone + Eq + Hash>(items: &[T]) -> Vec<T> {
    items.iter().cloned().unique().collect()
}

/// Lowercase, punctuation to spaces, whitespace collapsed.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .join(" ")
}
