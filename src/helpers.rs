//! Shared helpers for reducing and displaying weather values.
//!
//! - `mean`: arithmetic mean, `None` for an empty slice
//! - `format_one_decimal`: one decimal digit plus a unit suffix (`"37.0 °C"`)
//! - `title_case`: display form of a free-text place name

/// Arithmetic mean of a slice. Returns `None` when the slice is empty.
pub(crate) fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Format a value with exactly one decimal digit followed by a space and `unit`.
pub(crate) fn format_one_decimal(value: f64, unit: &str) -> String {
    format!("{:.1} {}", value, unit)
}

/// Title-case a string for display.
///
/// A letter is uppercased when the previous character is not a letter and
/// lowercased otherwise, so `"new york"` → `"New York"` and
/// `"o'NEIL"` → `"O'Neil"`.
pub(crate) fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            out.push(c);
            prev_is_letter = false;
        }
    }

    out
}
