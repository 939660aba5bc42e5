//! Locale-aware parsing of amounts and dates as they appear in Italian
//! statement exports.
//!
//! Amounts use `.` as thousands separator and `,` as decimal separator
//! (`1.234,56`) and are converted straight to [`Decimal`]; no float is
//! involved at any point.

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

static LOCALE_DECIMAL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d+(?:\.\d{3})*(?:,\d+)?$").expect("valid amount regex"));

/// Amounts are bounded so that summing any realistic number of movements
/// stays inside `Decimal`'s range.
pub const MAX_INTEGER_DIGITS: usize = 15;
pub const MAX_FRACTION_DIGITS: usize = 8;

/// Currency markers that may surround an amount.
const CURRENCY_MARKERS: [&str; 3] = ["Euro", "EUR", "€"];

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("not a locale decimal amount (expected e.g. 1.234,56)")]
    Amount,
    #[error("not a date in {0} format")]
    Date(&'static str),
    #[error("amount out of range (at most 15 integer and 8 decimal digits)")]
    OutOfRange,
}

/// Parse an unsigned locale decimal such as `1.000,00` or `12,5`.
pub fn parse_locale_decimal(raw: &str) -> Result<Decimal, FormatError> {
    let s = raw.trim();
    if !LOCALE_DECIMAL.is_match(s) {
        return Err(FormatError::Amount);
    }
    let canonical = s.replace('.', "").replace(',', ".");
    let (int_part, fraction) = canonical.split_once('.').unwrap_or((canonical.as_str(), ""));
    if int_part.trim_start_matches('0').len() > MAX_INTEGER_DIGITS
        || fraction.len() > MAX_FRACTION_DIGITS
    {
        return Err(FormatError::OutOfRange);
    }
    Decimal::from_str(&canonical).map_err(|_| FormatError::Amount)
}

/// Apply the same bounds to an amount that did not come from text, such as
/// a numeric spreadsheet cell.
pub fn check_amount_range(value: Decimal) -> Result<Decimal, FormatError> {
    let limit = Decimal::from(10_i64.pow(MAX_INTEGER_DIGITS as u32));
    if value.abs() >= limit || value.scale() as usize > MAX_FRACTION_DIGITS {
        return Err(FormatError::OutOfRange);
    }
    Ok(value)
}

/// Parse a declared balance: optional sign, locale decimal, optional
/// currency marker before or after (`+1.234,56 Euro`, `-12,00`, `€ 3,00`).
pub fn parse_signed_amount(raw: &str) -> Result<Decimal, FormatError> {
    let mut s = raw.trim();
    for marker in CURRENCY_MARKERS {
        s = s.strip_suffix(marker).unwrap_or(s).trim_end();
        s = s.strip_prefix(marker).unwrap_or(s).trim_start();
    }

    let (negative, digits) = match s.chars().next() {
        Some('-') => (true, &s[1..]),
        Some('+') => (false, &s[1..]),
        _ => (false, s),
    };

    let value = parse_locale_decimal(digits.trim_start())?;
    Ok(if negative { -value } else { value })
}

/// Parse a spreadsheet money cell like `€1.234,56`: one leading currency
/// symbol, then a locale decimal.
pub fn parse_currency_cell(raw: &str) -> Result<Decimal, FormatError> {
    let s = raw.trim();
    let s = s.strip_prefix('€').unwrap_or(s);
    parse_locale_decimal(s.trim_start())
}

/// `dd/mm/yyyy`
pub fn parse_date_slashed(raw: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(raw.trim(), "%d/%m/%Y").map_err(|_| FormatError::Date("dd/mm/yyyy"))
}

/// `dd.mm.yyyy`
pub fn parse_date_dotted(raw: &str) -> Result<NaiveDate, FormatError> {
    NaiveDate::parse_from_str(raw.trim(), "%d.%m.%Y").map_err(|_| FormatError::Date("dd.mm.yyyy"))
}
