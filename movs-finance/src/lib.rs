//! movs-finance: reconciliation, rule-based tagging, time-series aggregation
//! and inflation revaluation over parsed ledgers.

pub mod aggregate;
pub mod reconcile;
pub mod revalue;
pub mod tag_rules;

pub use aggregate::{
    AggregateOptions, AggregateResult, MonthBucket, Point, YearBucket, YearSeries, YearlyStats,
    aggregate, monthly_buckets, yearly_stats,
};
pub use reconcile::{ValidationReport, validate, validate_at};
pub use revalue::{Revaluator, RevaluedBucket, YearMonth, revalue_monthly, revalued_total};
pub use tag_rules::{Rule, RuleTable, tag};
