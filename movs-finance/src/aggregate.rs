//! Time-series views over a ledger: running balance, per-year reset,
//! multi-year overlays and gap-filled year / month buckets.
//!
//! Every running-total series is emitted as step pairs: a change at `t`
//! produces `(t, previous)` followed by `(t, new)`. Values stay exact
//! decimals; [`Point::value_f64`] is the one conversion for display.

use chrono::{Datelike, Days, NaiveDate};
use movs_core::{Ledger, Movement};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::debug;

/// One sample of a series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Point {
    pub date: NaiveDate,
    pub value: Decimal,
}

impl Point {
    pub fn new(date: NaiveDate, value: Decimal) -> Self {
        Self { date, value }
    }

    /// Milliseconds since the Unix epoch at UTC midnight of `date`.
    pub fn timestamp_millis(&self) -> i64 {
        self.date.and_time(chrono::NaiveTime::MIN).and_utc().timestamp_millis()
    }

    pub fn value_f64(&self) -> f64 {
        self.value.to_f64().unwrap_or(f64::NAN)
    }
}

/// The overlay series of a single calendar year.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearSeries {
    pub year: i32,
    pub points: Vec<Point>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearBucket {
    pub year: i32,
    pub sum: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MonthBucket {
    pub year: i32,
    pub month: u32,
    pub sum: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    /// Seed date of the running balance.
    pub epoch: NaiveDate,
    /// Right-hand anchor of the running balance.
    pub today: NaiveDate,
}

impl AggregateOptions {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            epoch: default_epoch(),
            today,
        }
    }

    pub fn with_epoch(mut self, epoch: NaiveDate) -> Self {
        self.epoch = epoch;
        self
    }
}

pub fn default_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(2008, 1, 1).unwrap_or(NaiveDate::MIN)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AggregateResult {
    pub raw: Vec<Point>,
    pub running: Vec<Point>,
    pub per_year: Vec<Point>,
    pub overlays: Vec<YearSeries>,
    pub by_year: Vec<YearBucket>,
    pub by_month: Vec<MonthBucket>,
}

impl AggregateResult {
    /// Earliest and latest date across every series, widened by
    /// `padding_days` on both sides. `None` for an empty result.
    pub fn date_bounds(&self, padding_days: u64) -> Option<(NaiveDate, NaiveDate)> {
        let dates = self
            .raw
            .iter()
            .chain(&self.running)
            .chain(&self.per_year)
            .chain(self.overlays.iter().flat_map(|s| &s.points))
            .map(|p| p.date);

        let (min, max) = dates.fold(None, |acc: Option<(NaiveDate, NaiveDate)>, d| match acc {
            None => Some((d, d)),
            Some((lo, hi)) => Some((lo.min(d), hi.max(d))),
        })?;
        let pad = Days::new(padding_days);
        Some((
            min.checked_sub_days(pad).unwrap_or(NaiveDate::MIN),
            max.checked_add_days(pad).unwrap_or(NaiveDate::MAX),
        ))
    }
}

/// Accumulates step pairs for one series.
#[derive(Debug, Default)]
struct StepSeries {
    points: Vec<Point>,
    value: Decimal,
}

impl StepSeries {
    fn seeded(date: NaiveDate) -> Self {
        Self {
            points: vec![Point::new(date, Decimal::ZERO)],
            value: Decimal::ZERO,
        }
    }

    /// Emit `(date, current)` then `(date, next)`.
    fn step_to(&mut self, date: NaiveDate, next: Decimal) {
        self.points.push(Point::new(date, self.value));
        self.points.push(Point::new(date, next));
        self.value = next;
    }

    fn step_by(&mut self, date: NaiveDate, delta: Decimal) {
        self.step_to(date, self.value + delta);
    }
}

/// Sorted ascending (stable) copy of the movements.
fn ascending(ledger: &Ledger) -> Vec<&Movement> {
    let mut movements: Vec<&Movement> = ledger.movements.iter().collect();
    movements.sort_by_key(|m| m.accounting_date);
    movements
}

/// Net amount per accounting date, ascending.
fn transitions(movements: &[&Movement]) -> Vec<(NaiveDate, Decimal)> {
    let mut out: Vec<(NaiveDate, Decimal)> = Vec::new();
    for m in movements {
        match out.last_mut() {
            Some((date, sum)) if *date == m.accounting_date => *sum += m.signed_amount(),
            _ => out.push((m.accounting_date, m.signed_amount())),
        }
    }
    out
}

fn running(days: &[(NaiveDate, Decimal)], options: &AggregateOptions) -> Vec<Point> {
    let (Some(first), Some(last)) = (days.first(), days.last()) else {
        return Vec::new();
    };
    let mut series = StepSeries::seeded(options.epoch.min(first.0));
    for &(date, delta) in days {
        series.step_by(date, delta);
    }
    series.step_by(options.today.max(last.0), Decimal::ZERO);
    series.points
}

fn per_year(days: &[(NaiveDate, Decimal)]) -> Vec<Point> {
    let mut series = StepSeries::default();
    let mut year = None;
    for &(date, delta) in days {
        if year == Some(date.year()) {
            series.step_by(date, delta);
        } else {
            series.step_to(date, delta);
            year = Some(date.year());
        }
    }
    series.points
}

fn overlays(days: &[(NaiveDate, Decimal)]) -> Vec<YearSeries> {
    let mut out: Vec<YearSeries> = Vec::new();
    let mut current: Option<(i32, StepSeries)> = None;
    for &(date, delta) in days {
        let year = date.year();
        if current.as_ref().is_none_or(|(y, _)| *y != year) {
            if let Some((y, series)) = current.take() {
                out.push(YearSeries {
                    year: y,
                    points: series.points,
                });
            }
            let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(date);
            current = Some((year, StepSeries::seeded(jan1)));
        }
        if let Some((_, series)) = current.as_mut() {
            series.step_by(date, delta);
        }
    }
    if let Some((year, series)) = current {
        out.push(YearSeries {
            year,
            points: series.points,
        });
    }
    out
}

fn year_range(movements: &[&Movement]) -> Option<std::ops::RangeInclusive<i32>> {
    let first = movements.first()?.accounting_date.year();
    let last = movements.last()?.accounting_date.year();
    Some(first..=last)
}

fn by_year(movements: &[&Movement]) -> Vec<YearBucket> {
    let Some(range) = year_range(movements) else {
        return Vec::new();
    };
    let mut sums: BTreeMap<i32, Decimal> = range.map(|y| (y, Decimal::ZERO)).collect();
    for m in movements {
        *sums.entry(m.accounting_date.year()).or_default() += m.signed_amount();
    }
    sums.into_iter()
        .map(|(year, sum)| YearBucket { year, sum })
        .collect()
}

fn by_month(movements: &[&Movement]) -> Vec<MonthBucket> {
    let Some(range) = year_range(movements) else {
        return Vec::new();
    };
    let mut sums: BTreeMap<(i32, u32), Decimal> = range
        .flat_map(|y| (1..=12).map(move |m| ((y, m), Decimal::ZERO)))
        .collect();
    for m in movements {
        let key = (m.accounting_date.year(), m.accounting_date.month());
        *sums.entry(key).or_default() += m.signed_amount();
    }
    sums.into_iter()
        .map(|((year, month), sum)| MonthBucket { year, month, sum })
        .collect()
}

/// Compute every series and bucket of `ledger`. The ledger's own order is
/// not relied upon.
pub fn aggregate(ledger: &Ledger, options: &AggregateOptions) -> AggregateResult {
    let movements = ascending(ledger);
    let days = transitions(&movements);

    let result = AggregateResult {
        raw: movements
            .iter()
            .map(|m| Point::new(m.accounting_date, m.signed_amount()))
            .collect(),
        running: running(&days, options),
        per_year: per_year(&days),
        overlays: overlays(&days),
        by_year: by_year(&movements),
        by_month: by_month(&movements),
    };
    debug!(
        ledger = %ledger.name,
        dates = days.len(),
        years = result.by_year.len(),
        "aggregated ledger"
    );
    result
}

/// The gap-filled (year, month) grid of [`aggregate`] on its own.
pub fn monthly_buckets(ledger: &Ledger) -> Vec<MonthBucket> {
    by_month(&ascending(ledger))
}

/// Per-year net amounts for the years that have movements, plus the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct YearlyStats {
    pub years: Vec<YearBucket>,
    pub total: Decimal,
}

pub fn yearly_stats(ledger: &Ledger) -> YearlyStats {
    let mut sums: BTreeMap<i32, Decimal> = BTreeMap::new();
    for m in &ledger.movements {
        *sums.entry(m.accounting_date.year()).or_default() += m.signed_amount();
    }
    let total = sums.values().copied().sum();
    YearlyStats {
        years: sums
            .into_iter()
            .map(|(year, sum)| YearBucket { year, sum })
            .collect(),
        total,
    }
}
