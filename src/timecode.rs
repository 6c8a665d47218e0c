//! Timecode text <-> seconds.
//!
//! Accepted input is `ss[.fff]`, `mm:ss[.fff]` or `hh:mm:ss[.fff]`. Every
//! component must be a plain unsigned integer; anything else is invalid and
//! yields `None`.

/// Maximum number of `:`-separated components (hours, minutes, seconds).
const MAX_PARTS: usize = 3;

/// Parse human-typed timecode text into seconds.
///
/// The fractional suffix of the seconds component is read as milliseconds:
/// one digit is tenths, two digits hundredths, three or more digits are
/// truncated to the first three.
///
/// The total is counted in whole milliseconds as a `u64`, so anything past
/// `u64::MAX` ms (about 1.8e16 s) is rejected rather than wrapped.
pub fn parse(text: &str) -> Option<f64> {
    let text = text.trim();
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() > MAX_PARTS {
        return None;
    }

    let (seconds, millis) = parse_seconds(parts[parts.len() - 1])?;
    let mut total_ms = seconds.checked_mul(1_000)?.checked_add(millis)?;

    // Remaining components, right to left: minutes, hours.
    let multipliers = [60_000u64, 3_600_000u64];
    for (part, multiplier) in parts[..parts.len() - 1].iter().rev().zip(multipliers) {
        let value = parse_integer(part)?;
        total_ms = total_ms.checked_add(value.checked_mul(multiplier)?)?;
    }

    Some(total_ms as f64 / 1000.0)
}

/// Same as [`parse`] but substitutes zero for invalid input.
pub fn parse_or_zero(text: &str) -> f64 {
    parse(text).unwrap_or(0.0)
}

/// Render seconds with exactly three decimals, e.g. `12.5` -> `"12.500"`.
pub fn format(seconds: f64) -> String {
    // `-0.0` would render with a sign that `parse` rejects.
    let seconds = if seconds == 0.0 { 0.0 } else { seconds };
    format!("{:.3}", seconds)
}

/// Render seconds the way the edit page displays segment times:
/// `m:ss.mmm`, or `h:mm:ss.mmm` once the value reaches an hour.
pub fn format_segment_time(seconds: f64) -> String {
    let total_ms = (seconds.max(0.0) * 1000.0).round() as u64;
    let millis = total_ms % 1_000;
    let total_secs = total_ms / 1_000;
    let secs = total_secs % 60;
    let total_mins = total_secs / 60;
    let mins = total_mins % 60;
    let hours = total_mins / 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}.{:03}", hours, mins, secs, millis)
    } else {
        format!("{}:{:02}.{:03}", mins, secs, millis)
    }
}

fn parse_seconds(part: &str) -> Option<(u64, u64)> {
    let (whole, fraction) = match part.split_once('.') {
        Some((whole, fraction)) => (whole, Some(fraction)),
        None => (part, None),
    };

    // ".5" is half a second.
    let seconds = if whole.is_empty() && fraction.is_some() {
        0
    } else {
        parse_integer(whole)?
    };

    let millis = match fraction {
        None => 0,
        Some(digits) => {
            if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let value = parse_integer(&digits[..digits.len().min(3)])?;
            match digits.len() {
                1 => value * 100,
                2 => value * 10,
                _ => value,
            }
        }
    };

    Some((seconds, millis))
}

fn parse_integer(part: &str) -> Option<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
