//! Rendering facet values as display text.
//!
//! The rendered strings are shared by the details view, free-text search
//! matching, and value tallying - a search term matches against exactly
//! the text a user would see. Formats are fixed en-US style; proper
//! localization is out of scope.

use chrono::NaiveDateTime;

use crate::types::FacetValue;

/// Differences below this are treated as arithmetic noise when counting
/// significant digits.
const EPSILON: f64 = 1e-5;

/// Format a number assumed to be a decimal value.
///
/// Tries to avoid long runs of zeros or nines, since those are usually
/// floating-point artifacts rather than meaningful digits: the value is
/// reduced to its significant digits (at most ten) and printed with just
/// enough precision to show them. Smallish integers print plainly because
/// `1.2e2` looks silly; large ones switch to exponential notation.
pub fn format_number(num: f64) -> String {
    // check for zero so we can avoid taking its log
    if num == 0.0 {
        return "0".to_string();
    }

    // count the significant digits
    let scale = num.abs().log10().floor() as i32;
    let mut y = num / 10f64.powi(scale);
    let mut digits: i32 = 0;
    while digits < 10 && y.abs() > EPSILON {
        digits += 1;
        y = (y - y.round()) * 10.0;
    }
    let digits = digits.max(1);

    if scale >= digits && scale < digits + 5 {
        format!("{:.0}", num)
    } else if scale >= digits + 5 {
        exponential(num, (digits - 1) as usize)
    } else {
        let decimals = (digits - 1 - scale).max(0) as usize;
        format!("{:.*}", decimals, num)
    }
}

/// Exponential notation with an explicit exponent sign, `1.5e+20` style.
fn exponential(num: f64, mantissa_digits: usize) -> String {
    let raw = format!("{:.*e}", mantissa_digits, num);
    match raw.find('e') {
        Some(pos) if !raw[pos + 1..].starts_with('-') => {
            format!("{}e+{}", &raw[..pos], &raw[pos + 1..])
        }
        _ => raw,
    }
}

/// Render an instant the way the details view shows it: date then time.
pub fn format_date_time(value: &NaiveDateTime) -> String {
    format!(
        "{} {}",
        value.format("%-m/%-d/%Y"),
        value.format("%-I:%M:%S %p")
    )
}

/// Date-only rendering, used by day-level bucket labels.
pub fn format_date(value: &NaiveDateTime) -> String {
    value.format("%-m/%-d/%Y").to_string()
}

/// Time-only rendering, used by sub-day bucket labels.
pub fn format_time(value: &NaiveDateTime) -> String {
    value.format("%-I:%M:%S %p").to_string()
}

/// The display text of a facet value.
///
/// String and link values render as their label; numbers and dates go
/// through the formatters above.
pub fn facet_value_string(value: &FacetValue) -> String {
    match value {
        FacetValue::Text(s) => s.clone(),
        FacetValue::Link { label, .. } => label.clone(),
        FacetValue::Number(n) => format_number(*n),
        FacetValue::Date(d) => format_date_time(d),
    }
}
