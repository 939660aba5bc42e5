//! Movement types: one dated debit or credit line of a statement.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::tag::Tag;

/// A single ledger line.
///
/// At most one of `debit` / `credit` is set; both absent is a zero-value
/// entry. Amounts are always positive, the direction is carried by which
/// field holds the value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub accounting_date: NaiveDate,
    pub value_date: NaiveDate,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
    pub description: String,
}

impl Movement {
    /// Column names, in the order produced by [`Movement::cells`].
    pub const COLUMNS: [&'static str; 5] = [
        "accounting_date",
        "value_date",
        "debit",
        "credit",
        "description",
    ];

    /// Money leaving the account.
    pub fn debit(
        accounting_date: NaiveDate,
        value_date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            accounting_date,
            value_date,
            debit: Some(amount),
            credit: None,
            description: description.into(),
        }
    }

    /// Money entering the account.
    pub fn credit(
        accounting_date: NaiveDate,
        value_date: NaiveDate,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            accounting_date,
            value_date,
            debit: None,
            credit: Some(amount),
            description: description.into(),
        }
    }

    /// `credit - debit`, absent amounts counting as zero.
    pub fn signed_amount(&self) -> Decimal {
        self.credit.unwrap_or(Decimal::ZERO) - self.debit.unwrap_or(Decimal::ZERO)
    }

    pub fn is_credit(&self) -> bool {
        self.credit.is_some()
    }

    /// Display strings for every column of [`Movement::COLUMNS`].
    pub fn cells(&self) -> [String; 5] {
        [
            self.accounting_date.to_string(),
            self.value_date.to_string(),
            self.debit.map(|d| d.to_string()).unwrap_or_default(),
            self.credit.map(|c| c.to_string()).unwrap_or_default(),
            self.description.clone(),
        ]
    }
}

/// A movement plus the category tags assigned to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedMovement {
    pub movement: Movement,
    pub tags: BTreeSet<Tag>,
}

impl TaggedMovement {
    pub fn has(&self, tag: Tag) -> bool {
        self.tags.contains(&tag)
    }

    /// Tags joined with `,` in their stable order.
    pub fn tag_list(&self) -> String {
        self.tags
            .iter()
            .map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}
