//! Text formatting shared by the PDF layout and the file naming.

use chrono::{DateTime, FixedOffset, Utc};

/// Formats `value` as `<prefix><value with exactly two decimals>`.
pub fn format_currency(prefix: &str, value: f64) -> String {
    format!("{}{:.2}", prefix, normalize_zero(value))
}

/// Formats the tax row label, e.g. `Tax (12.5%):` for a rate of `0.125`.
pub fn format_tax_label(rate: f64) -> String {
    format!("Tax ({:.1}%):", normalize_zero(rate * 100.0))
}

/// Keeps at most `max_chars` characters of `name`.
pub fn truncate_name(name: &str, max_chars: usize) -> &str {
    match name.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &name[..byte_index],
        None => name,
    }
}

/// Builds the download name `<brand>-Bill-<bill_number>-<timestamp>.pdf`.
///
/// The timestamp is the UTC instant of `date` truncated to whole seconds, with
/// `:` replaced by `-` so the name is safe on every filesystem.
pub fn bill_file_name(brand: &str, bill_number: &str, date: &DateTime<FixedOffset>) -> String {
    format!(
        "{}-Bill-{}-{}.pdf",
        brand,
        bill_number,
        file_timestamp(date)
    )
}

/// Returns the filesystem-safe ISO-8601 timestamp used in file names.
pub fn file_timestamp(date: &DateTime<FixedOffset>) -> String {
    date.with_timezone(&Utc)
        .format("%Y-%m-%dT%H-%M-%S")
        .to_string()
}

/// Formats the receipt date as `dd/mm/yyyy` in the offset of `date`.
pub fn format_bill_date(date: &DateTime<FixedOffset>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// Formats the receipt time as `HH:MM:SS` in the offset of `date`.
pub fn format_bill_time(date: &DateTime<FixedOffset>) -> String {
    date.format("%H:%M:%S").to_string()
}

// `-0.00` would otherwise leak into receipts for zero amounts.
fn normalize_zero(value: f64) -> f64 {
    if value == 0.0 {
        0.0
    } else {
        value
    }
}
