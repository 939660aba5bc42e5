//! Declared statement metadata and balances.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Key/value block at the top of a statement export. Produced once per
/// parsed source and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    pub period_start: Option<NaiveDate>,
    pub period_end: Option<NaiveDate>,
    pub account_type: String,
    pub account_number: String,
    pub holder: String,
    pub balance_as_of: Option<NaiveDate>,
    pub accounting_balance: Decimal,
    pub available_balance: Decimal,
}

impl Header {
    /// Header for a synthetic source whose declared balances are, by
    /// construction, the sum of its own movements.
    pub fn synthetic(account_type: impl Into<String>, balance: Decimal) -> Self {
        Self {
            period_start: None,
            period_end: None,
            account_type: account_type.into(),
            account_number: String::new(),
            holder: String::new(),
            balance_as_of: None,
            accounting_balance: balance,
            available_balance: balance,
        }
    }

    /// Label/value pairs for every field, in declaration order.
    pub fn entries(&self) -> [(&'static str, String); 8] {
        fn opt(d: Option<NaiveDate>) -> String {
            d.map(|d| d.to_string()).unwrap_or_default()
        }
        [
            ("period_start", opt(self.period_start)),
            ("period_end", opt(self.period_end)),
            ("account_type", self.account_type.clone()),
            ("account_number", self.account_number.clone()),
            ("holder", self.holder.clone()),
            ("balance_as_of", opt(self.balance_as_of)),
            ("accounting_balance", self.accounting_balance.to_string()),
            ("available_balance", self.available_balance.to_string()),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_synthetic_balances_match() {
        let h = Header::synthetic("buoni postali", "150.00".parse().unwrap());
        assert_eq!(h.accounting_balance, h.available_balance);
        assert!(h.balance_as_of.is_none());
    }

    #[test]
    fn test_entries_cover_all_fields() {
        let h = Header::synthetic("conto", Decimal::ZERO);
        let entries = h.entries();
        assert_eq!(entries[2], ("account_type", "conto".to_string()));
        assert_eq!(entries[7].0, "available_balance");
        assert_eq!(entries[0].1, "");
    }
}
