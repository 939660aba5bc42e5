//! Inflation revaluation of monthly buckets through an external lookup.

use movs_core::Ledger;
use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use tracing::debug;

use crate::aggregate::{MonthBucket, monthly_buckets};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// Converts an amount from one month's money into another's, e.g. through
/// a national statistics coefficient service.
pub trait Revaluator {
    type Error;

    fn revalue(&self, from: YearMonth, to: YearMonth, amount: Decimal) -> Result<Decimal, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevaluedBucket {
    pub period: YearMonth,
    pub nominal: Decimal,
    pub revalued: Decimal,
}

/// Revalue each monthly bucket to `target`.
///
/// Zero buckets and buckets at or after `target` are passed through without
/// calling the revaluator. The first revaluator error aborts.
pub fn revalue_monthly<R: Revaluator>(
    buckets: &[MonthBucket],
    target: YearMonth,
    revaluator: &R,
) -> Result<Vec<RevaluedBucket>, R::Error> {
    buckets
        .iter()
        .map(|bucket| {
            let period = YearMonth::new(bucket.year, bucket.month);
            let revalued = if bucket.sum.is_zero() || period >= target {
                bucket.sum
            } else {
                revaluator.revalue(period, target, bucket.sum)?
            };
            Ok(RevaluedBucket {
                period,
                nominal: bucket.sum,
                revalued,
            })
        })
        .collect()
}

/// Ledger total expressed in `target` money.
pub fn revalued_total<R: Revaluator>(
    ledger: &Ledger,
    target: YearMonth,
    revaluator: &R,
) -> Result<Decimal, R::Error> {
    let buckets = monthly_buckets(ledger);
    let revalued = revalue_monthly(&buckets, target, revaluator)?;
    debug!(ledger = %ledger.name, %target, buckets = revalued.len(), "revalued ledger");
    Ok(revalued.iter().map(|b| b.revalued).sum())
}
