//! Display formatting for currency and backend timestamps.

use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc};
use chrono_tz::Tz;

const MONTHS: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

pub fn month_name(month: u32) -> Option<&'static str> {
    MONTHS.get(month.checked_sub(1)? as usize).copied()
}

/// `1250000.0` becomes `Rp 1.250.000`. Fractions are rounded to whole rupiah.
pub fn rupiah(amount: f64) -> String {
    if !amount.is_finite() {
        return "Rp 0".to_string();
    }
    let rounded = amount.round();
    let negative = rounded < 0.0;
    let digits = format!("{:.0}", rounded.abs());

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }

    if negative {
        format!("-Rp {grouped}")
    } else {
        format!("Rp {grouped}")
    }
}

enum Parsed {
    Instant(DateTime<Utc>),
    Date(NaiveDate),
}

fn parse(raw: &str) -> Option<Parsed> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(instant) = DateTime::parse_from_rfc3339(raw) {
        return Some(Parsed::Instant(instant.with_timezone(&Utc)));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(Parsed::Instant(naive.and_utc()));
    }
    NaiveDate::parse_from_str(raw.get(..10).unwrap_or(raw), "%Y-%m-%d")
        .ok()
        .map(Parsed::Date)
}

/// `2024-03-01T08:00:00Z` becomes `1 Maret 2024` in the given zone. Values
/// that do not parse are shown as-is.
pub fn date(raw: &str, tz: Tz) -> String {
    match parse(raw) {
        Some(Parsed::Instant(instant)) => {
            let local = instant.with_timezone(&tz);
            long_date(local.day(), local.month(), local.year())
        }
        Some(Parsed::Date(day)) => long_date(day.day(), day.month(), day.year()),
        None => raw.trim().to_string(),
    }
}

/// Like [`date`] with the local time appended when the value carries one.
pub fn date_time(raw: &str, tz: Tz) -> String {
    match parse(raw) {
        Some(Parsed::Instant(instant)) => {
            let local = instant.with_timezone(&tz);
            format!(
                "{} {:02}:{:02}",
                long_date(local.day(), local.month(), local.year()),
                local.hour(),
                local.minute()
            )
        }
        Some(Parsed::Date(day)) => long_date(day.day(), day.month(), day.year()),
        None => raw.trim().to_string(),
    }
}

pub fn optional_date(raw: Option<&str>, tz: Tz) -> String {
    raw.map(|value| date(value, tz))
        .filter(|value| !value.is_empty())
        .unwrap_or_else(|| "-".to_string())
}

/// `YYYY-MM-DD` for date inputs.
pub fn input_date(raw: &str) -> String {
    match parse(raw) {
        Some(Parsed::Instant(instant)) => instant.date_naive().format("%Y-%m-%d").to_string(),
        Some(Parsed::Date(day)) => day.format("%Y-%m-%d").to_string(),
        None => String::new(),
    }
}

fn long_date(day: u32, month: u32, year: i32) -> String {
    format!("{day} {} {year}", month_name(month).unwrap_or("?"))
}
