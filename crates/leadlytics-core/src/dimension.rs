//! Count / amount rollups grouped by a pluggable segment key.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::classify::{ClassifiedLead, Outcome};
use crate::model::{Company, Contact, Lead, Pipeline, Source};

pub const UNASSIGNED_KEY: &str = "unassigned";
pub const UNASSIGNED_LABEL: &str = "Unassigned";
pub const OVERALL_KEY: &str = "ALL";

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentTotals {
    pub total_count: u64,
    pub total_amount: f64,
    pub won_count: u64,
    pub won_amount: f64,
    pub lost_count: u64,
    pub lost_amount: f64,
    pub open_count: u64,
    pub open_amount: f64,
}

impl SegmentTotals {
    pub fn record(&mut self, outcome: Outcome, amount: f64) {
        self.total_count += 1;
        self.total_amount += amount;
        match outcome {
            Outcome::Won => {
                self.won_count += 1;
                self.won_amount += amount;
            }
            Outcome::Lost => {
                self.lost_count += 1;
                self.lost_amount += amount;
            }
            Outcome::Open => {
                self.open_count += 1;
                self.open_amount += amount;
            }
        }
    }

    pub fn merge(&mut self, other: &SegmentTotals) {
        self.total_count += other.total_count;
        self.total_amount += other.total_amount;
        self.won_count += other.won_count;
        self.won_amount += other.won_amount;
        self.lost_count += other.lost_count;
        self.lost_amount += other.lost_amount;
        self.open_count += other.open_count;
        self.open_amount += other.open_amount;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SegmentRow {
    pub key: String,
    pub label: String,
    #[serde(flatten)]
    pub totals: SegmentTotals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Source,
    Pipeline,
    Stage,
    Company,
}

/// Name lookups for segment labels and the contact → company join.
#[derive(Debug, Clone, Default)]
pub struct Directory {
    sources: HashMap<String, String>,
    pipelines: HashMap<String, String>,
    companies: HashMap<String, String>,
    contact_company: HashMap<String, String>,
}

impl Directory {
    pub fn new(
        sources: &[Source],
        pipelines: &[Pipeline],
        companies: &[Company],
        contacts: &[Contact],
    ) -> Self {
        Self {
            sources: sources
                .iter()
                .map(|s| (s.id.clone(), s.name.clone()))
                .collect(),
            pipelines: pipelines
                .iter()
                .map(|p| (p.id.clone(), p.name.clone()))
                .collect(),
            companies: companies
                .iter()
                .map(|c| (c.id.clone(), c.name.clone()))
                .collect(),
            contact_company: contacts
                .iter()
                .filter_map(|c| c.company_id.clone().map(|company| (c.id.clone(), company)))
                .collect(),
        }
    }

    pub fn company_of(&self, lead: &Lead) -> Option<&str> {
        lead.contact_id
            .as_deref()
            .and_then(|contact| self.contact_company.get(contact))
            .map(String::as_str)
    }

    /// Segment key of `lead` along `dimension`; `None` means unassigned.
    pub fn key_for(&self, dimension: Dimension, lead: &Lead) -> Option<String> {
        match dimension {
            Dimension::Source => lead.source_id.clone(),
            Dimension::Pipeline => Some(lead.pipeline_id.clone()),
            Dimension::Stage => Some(lead.stage.clone()),
            Dimension::Company => self.company_of(lead).map(str::to_string),
        }
    }

    /// Human label for an assigned segment key, falling back to the key itself.
    pub fn label_for(&self, dimension: Dimension, key: &str) -> String {
        let names = match dimension {
            Dimension::Source => &self.sources,
            Dimension::Pipeline => &self.pipelines,
            Dimension::Company => &self.companies,
            Dimension::Stage => return key.to_string(),
        };
        names.get(key).cloned().unwrap_or_else(|| key.to_string())
    }
}

/// Fold every classified lead into the bucket named by `key_fn`.
///
/// A `None` key is its own bucket, distinct from any real key, so the bucket
/// totals always add up to the number of leads.
pub fn aggregate<F>(
    leads: &[ClassifiedLead<'_>],
    key_fn: F,
) -> BTreeMap<Option<String>, SegmentTotals>
where
    F: Fn(&Lead) -> Option<String>,
{
    let mut buckets: BTreeMap<Option<String>, SegmentTotals> = BTreeMap::new();
    for classified in leads {
        buckets
            .entry(key_fn(classified.lead))
            .or_default()
            .record(classified.outcome, classified.lead.amount);
    }
    buckets
}

/// Overall won / lost / open totals for the scoped lead set.
pub fn summarize(leads: &[ClassifiedLead<'_>]) -> SegmentTotals {
    aggregate(leads, |_| Some(OVERALL_KEY.to_string()))
        .into_values()
        .next()
        .unwrap_or_default()
}

/// Labelled rows for one dimension, largest segments first.
///
/// The missing-key bucket is emitted as [`UNASSIGNED_KEY`] / [`UNASSIGNED_LABEL`]
/// and sorts after a real segment of equal size and key.
pub fn breakdown(
    leads: &[ClassifiedLead<'_>],
    directory: &Directory,
    dimension: Dimension,
) -> Vec<SegmentRow> {
    let mut buckets: Vec<(Option<String>, SegmentTotals)> =
        aggregate(leads, |lead| directory.key_for(dimension, lead))
            .into_iter()
            .collect();
    buckets.sort_by(|(key_a, a), (key_b, b)| {
        b.total_count
            .cmp(&a.total_count)
            .then_with(|| row_key(key_a).cmp(row_key(key_b)))
            .then_with(|| key_a.is_none().cmp(&key_b.is_none()))
    });

    buckets
        .into_iter()
        .map(|(key, totals)| match key {
            Some(key) => SegmentRow {
                label: directory.label_for(dimension, &key),
                key,
                totals,
            },
            None => SegmentRow {
                key: UNASSIGNED_KEY.to_string(),
                label: UNASSIGNED_LABEL.to_string(),
                totals,
            },
        })
        .collect()
}

fn row_key(key: &Option<String>) -> &str {
    key.as_deref().unwrap_or(UNASSIGNED_KEY)
}
