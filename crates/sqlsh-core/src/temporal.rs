//! Calendar arithmetic for temporal values.
//!
//! Dates are counted in days since 1970-01-01 and timestamps in microseconds
//! since the Unix epoch, both in the proleptic Gregorian calendar. Conversions
//! use the era-based civil date algorithms, so they are exact for every
//! representable day (including years before 1970).

pub const MICROS_PER_SECOND: i64 = 1_000_000;
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;
const DAYS_PER_ERA: i64 = 146_097;
/// Days from 0000-03-01 to 1970-01-01.
const EPOCH_SHIFT: i64 = 719_468;

/// A parsed temporal literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Temporal {
    /// Days since the Unix epoch.
    Date(i32),
    /// Microseconds since the Unix epoch.
    Timestamp(i64),
}

/// Days since 1970-01-01 for a civil date.
pub fn days_from_civil(year: i64, month: u32, day: u32) -> i64 {
    let year = if month <= 2 { year - 1 } else { year };
    let era = year.div_euclid(400);
    let yoe = year.rem_euclid(400);
    let mp = i64::from((month + 9) % 12);
    let doy = (153 * mp + 2) / 5 + i64::from(day) - 1;
    let doe = yoe * 365 + yoe / 4 - yoe / 100 + doy;
    era * DAYS_PER_ERA + doe - EPOCH_SHIFT
}

/// Civil date (year, month, day) for a count of days since 1970-01-01.
pub fn civil_from_days(days: i64) -> (i64, u32, u32) {
    let z = days + EPOCH_SHIFT;
    let era = z.div_euclid(DAYS_PER_ERA);
    let doe = z.rem_euclid(DAYS_PER_ERA);
    let yoe = (doe - doe / 1460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u32;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}

fn is_leap_year(year: i64) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

fn days_in_month(year: i64, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 if is_leap_year(year) => 29,
        2 => 28,
        _ => 0,
    }
}

/// Format days since the epoch as `YYYY-MM-DD`.
pub fn format_date(days: i32) -> String {
    let (y, m, d) = civil_from_days(i64::from(days));
    format!("{:04}-{:02}-{:02}", y, m, d)
}

/// Format microseconds since midnight as `HH:MM:SS`.
pub fn format_time(micros: i64) -> String {
    let secs = micros.rem_euclid(MICROS_PER_DAY) / MICROS_PER_SECOND;
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs / 60) % 60, secs % 60)
}

/// Format microseconds since the epoch as `YYYY-MM-DD HH:MM:SS`.
///
/// Sub-second precision is dropped.
pub fn format_timestamp(micros: i64) -> String {
    let days = micros.div_euclid(MICROS_PER_DAY);
    let time_of_day = micros.rem_euclid(MICROS_PER_DAY);
    let (y, m, d) = civil_from_days(days);
    format!("{:04}-{:02}-{:02} {}", y, m, d, format_time(time_of_day))
}

/// Parse `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS[.ffffff][Z]` or the `T`-separated
/// form. Returns `None` for anything else, including out-of-range fields.
pub fn parse_temporal(text: &str) -> Option<Temporal> {
    let text = text.trim();
    let bytes = text.as_bytes();
    if bytes.len() < 10 || bytes[4] != b'-' || bytes[7] != b'-' {
        return None;
    }
    // Fields are sliced by byte offset, so every offset must sit on a char
    // boundary.
    if !bytes[..bytes.len().min(19)].is_ascii() {
        return None;
    }

    let year: i64 = parse_digits(&text[0..4])?;
    let month: u32 = parse_digits(&text[5..7])?;
    let day: u32 = parse_digits(&text[8..10])?;
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return None;
    }
    let days = days_from_civil(year, month, day);

    if bytes.len() == 10 {
        return i32::try_from(days).ok().map(Temporal::Date);
    }

    if bytes.len() < 19 || !matches!(bytes[10], b' ' | b'T') || bytes[13] != b':' || bytes[16] != b':'
    {
        return None;
    }
    let hour: i64 = parse_digits(&text[11..13])?;
    let minute: i64 = parse_digits(&text[14..16])?;
    let second: i64 = parse_digits(&text[17..19])?;
    if hour > 23 || minute > 59 || second > 59 {
        return None;
    }

    let mut rest = text[19..].strip_suffix('Z').unwrap_or(&text[19..]);
    let mut micros = 0_i64;
    if let Some(fraction) = rest.strip_prefix('.') {
        if fraction.is_empty() || fraction.len() > 9 {
            return None;
        }
        let digits: i64 = parse_digits(fraction)?;
        let scale = 10_i64.pow(6_u32.abs_diff(fraction.len() as u32));
        micros = if fraction.len() <= 6 {
            digits * scale
        } else {
            digits / scale
        };
        rest = "";
    }
    if !rest.is_empty() {
        return None;
    }

    let seconds_of_day = hour * 3600 + minute * 60 + second;
    Some(Temporal::Timestamp(
        days * MICROS_PER_DAY + seconds_of_day * MICROS_PER_SECOND + micros,
    ))
}

fn parse_digits<T: std::str::FromStr>(s: &str) -> Option<T> {
    if s.bytes().all(|b| b.is_ascii_digit()) {
        s.parse().ok()
    } else {
        None
    }
}
