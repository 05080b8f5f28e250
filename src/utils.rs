use crate::error::{BriefingError, Result};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

/// Parses an ISO-8601 date or datetime into a timezone-naive instant.
///
/// Accepts `YYYY-MM-DD`, optionally followed by `T` or a space and `HH`, `HH:MM` or
/// `HH:MM:SS[.ffffff]`, optionally followed by `Z`, `+HH:MM` or `+HHMM`. Every field
/// must be zero-padded and surrounding whitespace is rejected. The offset is dropped:
/// the wall-clock time is kept as written, not converted to UTC. A bare date becomes
/// midnight.
pub fn parse_report_date(value: &str) -> Result<NaiveDateTime> {
    let invalid = || parse_error(value, "expected an ISO-8601 date or datetime");

    let (day, rest) = match (value.get(..10), value.get(10..)) {
        (Some(day), Some(rest)) if has_shape(day, "dddd-dd-dd") => (day, rest),
        _ => return Err(invalid()),
    };
    let date = NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|_| invalid())?;

    if rest.is_empty() {
        return date.and_hms_opt(0, 0, 0).ok_or_else(invalid);
    }

    let time = rest
        .strip_prefix('T')
        .or_else(|| rest.strip_prefix(' '))
        .ok_or_else(invalid)?;
    let (clock, offset) = match time.find(|c: char| matches!(c, 'Z' | '+' | '-')) {
        Some(at) => (&time[..at], Some(&time[at..])),
        None => (time, None),
    };

    if !offset.map_or(true, is_utc_offset) {
        return Err(invalid());
    }

    parse_clock(clock)
        .map(|time| date.and_time(time))
        .ok_or_else(invalid)
}

/// `d` matches one ASCII digit, any other pattern byte must match literally.
fn has_shape(value: &str, pattern: &str) -> bool {
    value.len() == pattern.len()
        && value
            .bytes()
            .zip(pattern.bytes())
            .all(|(v, p)| if p == b'd' { v.is_ascii_digit() } else { v == p })
}

fn parse_clock(clock: &str) -> Option<NaiveTime> {
    let (clock, fraction) = match clock.split_once('.') {
        Some((clock, fraction)) => (clock, Some(fraction)),
        None => (clock, None),
    };

    let (hour, minute, second) = if has_shape(clock, "dd:dd:dd") {
        (&clock[..2], &clock[3..5], &clock[6..])
    } else if fraction.is_some() {
        return None;
    } else if has_shape(clock, "dd:dd") {
        (&clock[..2], &clock[3..], "00")
    } else if has_shape(clock, "dd") {
        (clock, "00", "00")
    } else {
        return None;
    };

    let nanos = match fraction {
        None => 0,
        Some(digits)
            if (1..=9).contains(&digits.len()) && digits.bytes().all(|b| b.is_ascii_digit()) =>
        {
            format!("{:0<9}", digits).parse().ok()?
        }
        Some(_) => return None,
    };

    NaiveTime::from_hms_nano_opt(hour.parse().ok()?, minute.parse().ok()?, second.parse().ok()?, nanos)
}

fn is_utc_offset(offset: &str) -> bool {
    if offset == "Z" {
        return true;
    }
    let Some(body) = offset.strip_prefix(|c: char| c == '+' || c == '-') else {
        return false;
    };

    let (hours, minutes) = if has_shape(body, "dd:dd") {
        (&body[..2], &body[3..])
    } else if has_shape(body, "dddd") {
        (&body[..2], &body[2..])
    } else {
        return false;
    };

    hours.parse::<u32>().map_or(false, |h| h < 24) && minutes.parse::<u32>().map_or(false, |m| m < 60)
}

/// Calendar-day view of [`parse_report_date`].
pub fn parse_report_day(value: &str) -> Result<NaiveDate> {
    parse_report_date(value).map(|datetime| datetime.date())
}

fn parse_error(value: &str, reason: &str) -> BriefingError {
    BriefingError::ParseError {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Formats a monetary amount as `$1,234,567.89`. Negative amounts keep the sign
/// after the currency symbol (`$-1,234.50`), even when they round to zero (`$-0.00`).
pub fn format_currency(amount: f64) -> String {
    format!("${}", format_with_separators(amount, 2))
}

/// Fixed-point formatting with comma thousands separators.
pub fn format_with_separators(amount: f64, decimals: usize) -> String {
    if !amount.is_finite() {
        return format!("{}", amount);
    }

    let fixed = format!("{:.*}", decimals, amount.abs());
    let (integer, fraction) = match fixed.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction)),
        None => (fixed.as_str(), None),
    };

    let mut grouped = String::with_capacity(integer.len() + integer.len() / 3);
    for (i, digit) in integer.chars().enumerate() {
        if i > 0 && (integer.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount.is_sign_negative() { "-" } else { "" };

    match fraction {
        Some(fraction) => format!("{}{}.{}", sign, grouped, fraction),
        None => format!("{}{}", sign, grouped),
    }
}
