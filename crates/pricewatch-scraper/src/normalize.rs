//! Price-text normalization.
//!
//! Raw locator output arrives in whatever shape the storefront renders:
//! currency symbols, thousands separators, stray whitespace, sometimes an
//! "MRP" or "Rs." prefix. Normalization reduces all of that to digits and at
//! most one decimal separator so day-over-day comparison can parse the value.

/// Currency markers stripped before the character filter runs. Matching the
/// token form (e.g. `Rs.`) keeps its trailing dot from being mistaken for a
/// decimal separator.
const CURRENCY_TOKENS: &[&str] = &["Rs.", "RS.", "rs.", "₹", "$", "€", "£", "INR", "MRP"];

/// Normalize raw price text to digits and at most one decimal separator.
///
/// Strips currency symbols, thousands separators, and whitespace. The first
/// `.` that follows a digit is kept as the decimal separator; everything else
/// non-numeric is dropped. Idempotent: normalizing an already-normalized
/// string returns it unchanged.
///
/// Returns an empty string when the input holds no digits, which callers
/// treat as a locator miss.
#[must_use]
pub fn normalize_price(raw: &str) -> String {
    let mut text = raw.trim().to_string();
    for token in CURRENCY_TOKENS {
        text = text.replace(token, "");
    }

    let mut out = String::with_capacity(text.len());
    let mut seen_decimal = false;
    for c in text.chars() {
        if c.is_ascii_digit() {
            out.push(c);
        } else if c == '.' && !seen_decimal && !out.is_empty() {
            out.push('.');
            seen_decimal = true;
        }
    }

    // A trailing separator carries no fractional digits.
    if out.ends_with('.') {
        out.pop();
    }

    out
}
