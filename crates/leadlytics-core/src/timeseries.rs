//! Daily / weekly / monthly / yearly trend series built in one pass.
//!
//! Every lead yields four period keys from its `created_at` (UTC). Each key
//! feeds its own accumulator, and entries sharing a key are always merged, so
//! partial series coming from chunked input consolidate to the same totals as
//! a single pass over everything.

use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedLead, Outcome};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodKeys {
    pub day: String,
    pub week: String,
    pub month: String,
    pub year: String,
}

impl PeriodKeys {
    /// Weeks use the ISO week-numbering year, so 2024-12-30 is `2025-W1`.
    pub fn from_timestamp(ts: &DateTime<Utc>) -> Self {
        let iso = ts.iso_week();
        Self {
            day: ts.format("%Y-%m-%d").to_string(),
            week: format!("{}-W{}", iso.year(), iso.week()),
            month: format!("{}-{}", ts.year(), ts.month()),
            year: ts.year().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    pub period_key: String,
    /// First timestamp observed for this key; only used for ordering.
    pub representative_date: DateTime<Utc>,
    pub count: u64,
    pub amount: f64,
    pub won_count: u64,
    pub won_amount: f64,
    pub lost_count: u64,
    pub lost_amount: f64,
}

impl SeriesPoint {
    fn empty(period_key: String, representative_date: DateTime<Utc>) -> Self {
        Self {
            period_key,
            representative_date,
            count: 0,
            amount: 0.0,
            won_count: 0,
            won_amount: 0.0,
            lost_count: 0,
            lost_amount: 0.0,
        }
    }

    fn record(&mut self, outcome: Outcome, amount: f64) {
        self.count += 1;
        self.amount += amount;
        match outcome {
            Outcome::Won => {
                self.won_count += 1;
                self.won_amount += amount;
            }
            Outcome::Lost => {
                self.lost_count += 1;
                self.lost_amount += amount;
            }
            Outcome::Open => {}
        }
    }

    /// Sum `other` into `self`. The representative date is left untouched.
    fn absorb(&mut self, other: &SeriesPoint) {
        self.count += other.count;
        self.amount += other.amount;
        self.won_count += other.won_count;
        self.won_amount += other.won_amount;
        self.lost_count += other.lost_count;
        self.lost_amount += other.lost_amount;
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TimeSeries {
    pub daily: Vec<SeriesPoint>,
    pub weekly: Vec<SeriesPoint>,
    pub monthly: Vec<SeriesPoint>,
    pub yearly: Vec<SeriesPoint>,
}

/// Running totals for one granularity, keyed by period key.
#[derive(Debug, Clone, Default)]
struct PeriodAccumulator {
    slots: HashMap<String, usize>,
    points: Vec<SeriesPoint>,
}

impl PeriodAccumulator {
    fn slot(&mut self, key: &str, ts: DateTime<Utc>) -> &mut SeriesPoint {
        let existing = self.slots.get(key).copied();
        let idx = match existing {
            Some(idx) => idx,
            None => {
                self.points.push(SeriesPoint::empty(key.to_string(), ts));
                self.slots.insert(key.to_string(), self.points.len() - 1);
                self.points.len() - 1
            }
        };
        &mut self.points[idx]
    }

    fn record(&mut self, key: &str, ts: DateTime<Utc>, outcome: Outcome, amount: f64) {
        self.slot(key, ts).record(outcome, amount);
    }

    fn absorb(&mut self, point: &SeriesPoint) {
        self.slot(&point.period_key, point.representative_date)
            .absorb(point);
    }

    fn into_sorted(self) -> Vec<SeriesPoint> {
        let mut points = self.points;
        points.sort_by(|a, b| {
            a.representative_date
                .cmp(&b.representative_date)
                .then_with(|| a.period_key.cmp(&b.period_key))
        });
        points
    }
}

/// Merge entries sharing a period key by summing their numeric fields, then
/// order by representative date. The first entry seen for a key keeps its date.
pub fn consolidate<I>(points: I) -> Vec<SeriesPoint>
where
    I: IntoIterator<Item = SeriesPoint>,
{
    let mut acc = PeriodAccumulator::default();
    for point in points {
        acc.absorb(&point);
    }
    acc.into_sorted()
}

#[derive(Debug, Clone, Default)]
pub struct TimeSeriesBuilder {
    daily: PeriodAccumulator,
    weekly: PeriodAccumulator,
    monthly: PeriodAccumulator,
    yearly: PeriodAccumulator,
}

impl TimeSeriesBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already classified lead to all four accumulators.
    pub fn push(&mut self, classified: &ClassifiedLead<'_>) {
        let ClassifiedLead { lead, outcome } = *classified;
        let keys = PeriodKeys::from_timestamp(&lead.created_at);
        let ts = lead.created_at;
        self.daily.record(&keys.day, ts, outcome, lead.amount);
        self.weekly.record(&keys.week, ts, outcome, lead.amount);
        self.monthly.record(&keys.month, ts, outcome, lead.amount);
        self.yearly.record(&keys.year, ts, outcome, lead.amount);
    }

    /// Fold a builder fed with another chunk of leads into this one.
    pub fn merge(&mut self, other: TimeSeriesBuilder) {
        for point in &other.daily.points {
            self.daily.absorb(point);
        }
        for point in &other.weekly.points {
            self.weekly.absorb(point);
        }
        for point in &other.monthly.points {
            self.monthly.absorb(point);
        }
        for point in &other.yearly.points {
            self.yearly.absorb(point);
        }
    }

    pub fn finish(self) -> TimeSeries {
        TimeSeries {
            daily: self.daily.into_sorted(),
            weekly: self.weekly.into_sorted(),
            monthly: self.monthly.into_sorted(),
            yearly: self.yearly.into_sorted(),
        }
    }
}

pub fn build_series(leads: &[ClassifiedLead<'_>]) -> TimeSeries {
    let mut builder = TimeSeriesBuilder::new();
    for classified in leads {
        builder.push(classified);
    }
    builder.finish()
}
