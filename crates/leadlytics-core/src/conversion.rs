use serde::{Deserialize, Serialize};

use crate::dimension::{SegmentRow, SegmentTotals};

/// Won share of `total_count` as a percentage in `[0, 100]`, rounded to two
/// decimals. Zero when there is nothing to convert.
pub fn rate(won_count: u64, total_count: u64) -> f64 {
    if total_count == 0 {
        return 0.0;
    }
    let pct = (won_count.min(total_count) as f64 / total_count as f64) * 100.0;
    (pct * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentConversion {
    pub key: String,
    pub label: String,
    pub won_count: u64,
    pub total_count: u64,
    pub rate: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversionRates {
    pub overall: f64,
    pub by_source: Vec<SegmentConversion>,
    pub by_pipeline: Vec<SegmentConversion>,
}

pub fn per_segment(rows: &[SegmentRow]) -> Vec<SegmentConversion> {
    rows.iter()
        .map(|row| SegmentConversion {
            key: row.key.clone(),
            label: row.label.clone(),
            won_count: row.totals.won_count,
            total_count: row.totals.total_count,
            rate: rate(row.totals.won_count, row.totals.total_count),
        })
        .collect()
}

pub fn conversion_rates(
    summary: &SegmentTotals,
    by_source: &[SegmentRow],
    by_pipeline: &[SegmentRow],
) -> ConversionRates {
    ConversionRates {
        overall: rate(summary.won_count, summary.total_count),
        by_source: per_segment(by_source),
        by_pipeline: per_segment(by_pipeline),
    }
}
