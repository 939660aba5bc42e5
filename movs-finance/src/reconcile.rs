//! Reconciliation of a parsed ledger against its declared header.
//!
//! A mismatch is an expected outcome the caller has to decide about, so
//! nothing here returns an error: each check yields a pass/fail flag and
//! appends human-readable diagnostics.

use chrono::NaiveDate;
use movs_core::{Header, Ledger, Movement};
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::warn;

/// Outcome of [`validate_at`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub ok: bool,
    pub diagnostics: Vec<String>,
    /// Days between the declared balance date and `today`, when the header
    /// carries a balance date.
    pub days_since_balance: Option<i64>,
}

/// Sum of signed amounts over the whole ledger.
pub fn ledger_total(ledger: &Ledger) -> Decimal {
    ledger.movements.iter().map(Movement::signed_amount).sum()
}

/// Passes iff the computed total equals both declared balances exactly.
pub fn check_balance(header: &Header, ledger: &Ledger, diagnostics: &mut Vec<String>) -> bool {
    let total = ledger_total(ledger);
    let ok = header.accounting_balance == total && total == header.available_balance;
    if !ok {
        let delta = (header.accounting_balance - total)
            .abs()
            .max((total - header.available_balance).abs());
        diagnostics.push(format!("accounting balance: {}", header.accounting_balance));
        diagnostics.push(format!("available balance: {}", header.available_balance));
        diagnostics.push(format!("Σ (credit - debit): {total}"));
        diagnostics.push(format!("Δ = {delta}"));
        warn!(ledger = %ledger.name, %total, %delta, "balance mismatch");
    }
    ok
}

/// Passes iff accounting dates never increase going forward. Stops at the
/// first offending pair.
pub fn check_dates(ledger: &Ledger, diagnostics: &mut Vec<String>) -> bool {
    for pair in ledger.movements.windows(2) {
        let (prev, next) = (pair[0].accounting_date, pair[1].accounting_date);
        if prev < next {
            diagnostics.push(format!("accounting dates out of order: {prev} < {next}"));
            warn!(ledger = %ledger.name, %prev, %next, "movements not in descending order");
            return false;
        }
    }
    true
}

/// Run both checks. Both always run, so the diagnostics of a balance
/// failure are followed by any date-order findings.
pub fn validate(header: &Header, ledger: &Ledger) -> (bool, Vec<String>) {
    let mut diagnostics = Vec::new();
    let balance_ok = check_balance(header, ledger, &mut diagnostics);
    let dates_ok = check_dates(ledger, &mut diagnostics);
    (balance_ok && dates_ok, diagnostics)
}

/// [`validate`] plus balance freshness relative to `today`.
pub fn validate_at(header: &Header, ledger: &Ledger, today: NaiveDate) -> ValidationReport {
    let (ok, diagnostics) = validate(header, ledger);
    ValidationReport {
        ok,
        diagnostics,
        days_since_balance: header
            .balance_as_of
            .map(|as_of| (today - as_of).num_days()),
    }
}
