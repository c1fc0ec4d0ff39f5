//! Narrows the working lead set before any aggregation runs.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::{Contact, Lead};

/// Inclusive calendar-day range applied to record timestamps (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// Build a range only when both bounds are present.
    ///
    /// A lone start or end date yields `None`, so the date filter is skipped
    /// entirely.
    pub fn from_bounds(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Option<Self> {
        match (start, end) {
            (Some(start), Some(end)) => Some(Self { start, end }),
            _ => None,
        }
    }

    pub fn contains(&self, ts: &DateTime<Utc>) -> bool {
        let day = ts.date_naive();
        day >= self.start && day <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportCriteria {
    pub organization_id: String,
    pub pipeline_id: Option<String>,
    pub source_id: Option<String>,
    pub company_id: Option<String>,
    pub date_range: Option<DateRange>,
}

impl ReportCriteria {
    pub fn for_organization(organization_id: impl Into<String>) -> Self {
        Self {
            organization_id: organization_id.into(),
            ..Self::default()
        }
    }
}

/// Keep the leads matching every filter in `criteria`.
///
/// The company filter joins through contacts: a lead matches when its contact
/// belongs to the company. Leads without a contact never match it.
pub fn scope_leads(leads: Vec<Lead>, contacts: &[Contact], criteria: &ReportCriteria) -> Vec<Lead> {
    let company_contacts: Option<HashSet<&str>> = criteria.company_id.as_deref().map(|company| {
        contacts
            .iter()
            .filter(|c| c.company_id.as_deref() == Some(company))
            .map(|c| c.id.as_str())
            .collect()
    });

    leads
        .into_iter()
        .filter(|lead| lead.organization_id == criteria.organization_id)
        .filter(|lead| {
            criteria
                .pipeline_id
                .as_deref()
                .map_or(true, |p| lead.pipeline_id == p)
        })
        .filter(|lead| {
            criteria
                .source_id
                .as_deref()
                .map_or(true, |s| lead.source_id.as_deref() == Some(s))
        })
        .filter(|lead| match &company_contacts {
            None => true,
            Some(ids) => lead
                .contact_id
                .as_deref()
                .is_some_and(|contact| ids.contains(contact)),
        })
        .filter(|lead| {
            criteria
                .date_range
                .as_ref()
                .map_or(true, |range| range.contains(&lead.created_at))
        })
        .collect()
}
