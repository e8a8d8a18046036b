//! Parsing of `-A`/`-B` time arguments into epoch seconds.

use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};

const SECONDS_PER_UNIT: &[(char, u64)] = &[
    ('w', 7 * 24 * 60 * 60),
    ('d', 24 * 60 * 60),
    ('h', 60 * 60),
    ('m', 60),
    ('s', 1),
];

/// Parses a time argument relative to `now`.
///
/// Accepted forms are `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS` (UTC), raw epoch
/// seconds, and a relative offset such as `1w2d` meaning that long before
/// `now`. Returns `None` for anything else and for the epoch itself.
pub(crate) fn parse(text: &str, now: OffsetDateTime) -> Option<u64> {
    let text = text.trim();
    let seconds = if text.bytes().all(|byte| byte.is_ascii_digit()) {
        text.parse().ok()?
    } else if let Some(timestamp) = absolute(text) {
        u64::try_from(timestamp.unix_timestamp()).ok()?
    } else {
        let offset = relative(text.strip_prefix('-').unwrap_or(text))?;
        u64::try_from(now.unix_timestamp()).ok()?.checked_sub(offset)?
    };
    (seconds != 0).then_some(seconds)
}

fn absolute(text: &str) -> Option<OffsetDateTime> {
    let date_format = format_description!("[year]-[month]-[day]");
    let full_format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");
    if let Ok(date) = Date::parse(text, date_format) {
        return Some(PrimitiveDateTime::new(date, Time::MIDNIGHT).assume_utc());
    }
    PrimitiveDateTime::parse(text, full_format)
        .ok()
        .map(PrimitiveDateTime::assume_utc)
}

/// Sums `NwNdNhNmNs` components; a bare trailing number counts as seconds.
fn relative(text: &str) -> Option<u64> {
    if text.is_empty() {
        return None;
    }
    let mut total = 0_u64;
    let mut digits = String::new();
    for ch in text.chars() {
        if ch.is_ascii_digit() {
            digits.push(ch);
            continue;
        }
        let (_, unit) = SECONDS_PER_UNIT
            .iter()
            .find(|(suffix, _)| *suffix == ch.to_ascii_lowercase())?;
        let count: u64 = digits.parse().ok()?;
        total = total.checked_add(count.checked_mul(*unit)?)?;
        digits.clear();
    }
    if !digits.is_empty() {
        total = total.checked_add(digits.parse().ok()?)?;
    }
    Some(total)
}
