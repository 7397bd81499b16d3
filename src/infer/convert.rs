//! Best-effort conversion of text tokens into typed values.
//!
//! Every function here is total: a token that cannot be converted yields
//! `Value::Null` (or a NaN float) instead of an error.

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};

use crate::sql::types::SqlType;
use crate::table::Value;

/// Lower bound (exclusive) for integers read as epoch seconds.
pub const EPOCH_SECONDS_MIN: i64 = 1_002_857_600;
/// Upper bound (exclusive) for integers read as epoch seconds.
pub const EPOCH_SECONDS_MAX: i64 = 3_002_857_600;
/// Lower bound (exclusive) for integers read as epoch milliseconds.
pub const EPOCH_MILLIS_MIN: i64 = 1_002_857_600_000;
/// Upper bound (exclusive) for integers read as epoch milliseconds.
pub const EPOCH_MILLIS_MAX: i64 = 3_002_857_600_000;

const TIMESTAMP_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];
const TIME_FORMATS: &[&str] = &["%H:%M:%S%.f", "%H:%M"];

/// Convert a text token to a value of the given column type.
pub fn convert(token: &str, target: &SqlType) -> Value {
    let t = token.trim();
    match target {
        SqlType::Text => Value::Text(t.to_string()),
        SqlType::Float32 | SqlType::Float64 => Value::Float(parse_number(t).unwrap_or(f64::NAN)),
        SqlType::Int16 | SqlType::Int32 | SqlType::Int64 => match parse_integer(t) {
            Some(n) if fits_integer(n, target) => Value::Int(n),
            _ => Value::Null,
        },
        SqlType::Bool => {
            if t.eq_ignore_ascii_case("true") {
                Value::Bool(true)
            } else if t.eq_ignore_ascii_case("false") {
                Value::Bool(false)
            } else {
                Value::Null
            }
        }
        SqlType::Date => parse_date(t).map(Value::Date).unwrap_or(Value::Null),
        SqlType::Time => parse_time(t).map(Value::Time).unwrap_or(Value::Null),
        SqlType::Timestamp => parse_timestamp(t)
            .or_else(|| parse_date(t).and_then(|d| d.and_hms_opt(0, 0, 0)))
            .map(Value::Timestamp)
            .unwrap_or(Value::Null),
        SqlType::Uuid => uuid::Uuid::parse_str(t)
            .map(Value::Uuid)
            .unwrap_or(Value::Null),
        SqlType::Array(elem) => match serde_json::from_str::<serde_json::Value>(t) {
            Ok(serde_json::Value::Array(items)) => Value::Array(
                items
                    .iter()
                    .map(|item| match item {
                        serde_json::Value::Null => Value::Null,
                        serde_json::Value::String(s) => convert(s, elem),
                        other => convert(&other.to_string(), elem),
                    })
                    .collect(),
            ),
            _ => Value::Null,
        },
    }
}

/// Whether an integer is representable in the given integer column type.
pub fn fits_integer(n: i64, target: &SqlType) -> bool {
    match target {
        SqlType::Int16 => i16::try_from(n).is_ok(),
        SqlType::Int32 => i32::try_from(n).is_ok(),
        _ => true,
    }
}

/// Strip thousands separators and a trailing `million` multiplier.
///
/// Returns the cleaned numeric body and its scale factor.
fn clean_number(s: &str) -> (String, f64) {
    let lower = s.trim().to_ascii_lowercase();
    let (body, scale) = match lower.strip_suffix("million") {
        Some(body) => (body.trim_end().to_string(), 1_000_000.0),
        None => (lower, 1.0),
    };
    (body.replace(',', ""), scale)
}

/// Parse a numeric token, tolerating `,` separators and a `million` suffix.
///
/// Infinite and NaN spellings are rejected.
pub fn parse_number(s: &str) -> Option<f64> {
    let (body, scale) = clean_number(s);
    if body.is_empty()
        || !body.bytes().any(|b| b.is_ascii_digit())
        || !body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'+' | b'-' | b'.' | b'e'))
    {
        return None;
    }
    body.parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
        .map(|f| f * scale)
}

/// Parse an integer token. Integral floats (`3 million`, `1e3`) are accepted.
pub fn parse_integer(s: &str) -> Option<i64> {
    let (body, scale) = clean_number(s);
    if scale == 1.0 {
        if let Ok(n) = body.parse::<i64>() {
            return Some(n);
        }
    }
    let f = parse_number(s)?;
    if f.fract() == 0.0 && f >= i64::MIN as f64 && f <= i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}

fn digits(b: &[u8], range: std::ops::Range<usize>) -> bool {
    range.into_iter().all(|i| b.get(i).is_some_and(u8::is_ascii_digit))
}

fn number_at(s: &str, range: std::ops::Range<usize>) -> Option<u32> {
    s.get(range)?.parse().ok()
}

/// `yyyy-mm-dd` at the start of the token.
pub(crate) fn has_iso_date_prefix(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() >= 10 && digits(b, 0..4) && b[4] == b'-' && digits(b, 5..7) && b[7] == b'-' && digits(b, 8..10)
}

/// Month (`yyyy-mm`) or quarter (`yyyy-Qn`) token.
pub(crate) fn is_year_period(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 7
        && digits(b, 0..4)
        && b[4] == b'-'
        && (digits(b, 5..7) || (b[5].eq_ignore_ascii_case(&b'q') && (b'1'..=b'4').contains(&b[6])))
}

/// Four-digit year beginning with 1 or 2.
pub(crate) fn is_year(s: &str) -> bool {
    let b = s.as_bytes();
    b.len() == 4 && digits(b, 0..4) && (b[0] == b'1' || b[0] == b'2')
}

/// `nn/nn/yy` or `nn/nn/yyyy`, read as UK order when the first field
/// exceeds 12 and US order otherwise.
pub(crate) fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let b = s.as_bytes();
    if !(b.len() == 8 || b.len() == 10)
        || !digits(b, 0..2)
        || b[2] != b'/'
        || !digits(b, 3..5)
        || b[5] != b'/'
        || !digits(b, 6..b.len())
    {
        return None;
    }
    let first = number_at(s, 0..2)?;
    let second = number_at(s, 3..5)?;
    let year = number_at(s, 6..b.len())? as i32;
    let year = if b.len() == 8 {
        if year < 69 {
            2000 + year
        } else {
            1900 + year
        }
    } else {
        year
    };
    let (month, day) = if first > 12 { (second, first) } else { (first, second) };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse any of the recognized date shapes.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if is_year(s) {
        return NaiveDate::from_ymd_opt(number_at(s, 0..4)? as i32, 1, 1);
    }
    if is_year_period(s) {
        let year = number_at(s, 0..4)? as i32;
        let month = if s.as_bytes()[5].eq_ignore_ascii_case(&b'q') {
            3 * number_at(s, 6..7)? - 2
        } else {
            number_at(s, 5..7)?
        };
        return NaiveDate::from_ymd_opt(year, month, 1);
    }
    if let Some(d) = parse_slash_date(s) {
        return Some(d);
    }
    if has_iso_date_prefix(s) {
        return NaiveDate::parse_from_str(&s[..10], "%Y-%m-%d").ok();
    }
    None
}

/// Parse an ISO-like timestamp. A space separator is accepted in place of
/// `T` and a trailing `Z` is dropped.
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if !has_iso_date_prefix(s) || s.len() <= 10 {
        return None;
    }
    let sep = s.as_bytes()[10];
    if sep != b'T' && sep != b' ' {
        return None;
    }
    let normalized = format!("{}T{}", &s[..10], s[11..].trim_end_matches('Z'));
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(&normalized, fmt).ok())
}

/// Parse `HH:MM[:SS[.fff]]`.
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    let s = s.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveTime::parse_from_str(s, fmt).ok())
}

/// Interpret an integer as a timestamp: epoch seconds inside the seconds
/// window, epoch milliseconds otherwise.
pub fn epoch_timestamp(v: i64) -> Value {
    let ts = if v > EPOCH_SECONDS_MIN && v < EPOCH_SECONDS_MAX {
        DateTime::from_timestamp(v, 0)
    } else {
        DateTime::from_timestamp_millis(v)
    };
    ts.map(|t| Value::Timestamp(t.naive_utc()))
        .unwrap_or(Value::Null)
}

/// Interpret an integer as a date: epoch seconds, epoch milliseconds, a
/// bare year, or a `yyyymmdd` number.
pub fn epoch_date(v: i64) -> Value {
    let date = if v > EPOCH_SECONDS_MIN && v < EPOCH_SECONDS_MAX {
        DateTime::from_timestamp(v, 0).map(|t| t.date_naive())
    } else if v > EPOCH_MILLIS_MIN && v < EPOCH_MILLIS_MAX {
        DateTime::from_timestamp_millis(v).map(|t| t.date_naive())
    } else if v > 1700 && v <= 2200 {
        NaiveDate::from_ymd_opt(v as i32, 1, 1)
    } else if (10_000_101..=99_991_231).contains(&v) {
        NaiveDate::parse_from_str(&v.to_string(), "%Y%m%d").ok()
    } else {
        None
    };
    date.map(Value::Date).unwrap_or(Value::Null)
}
