//! Follow-up activity counts grouped by the follow-up's own lifecycle stage.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::Followup;
use crate::scope::ReportCriteria;

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FollowupStats {
    pub stage: String,
    pub count: u64,
    pub open_count: u64,
    pub closed_count: u64,
    pub call_count: u64,
    pub email_count: u64,
    pub whatsapp_count: u64,
}

impl FollowupStats {
    fn record(&mut self, followup: &Followup) {
        self.count += 1;
        match followup.stage.as_str() {
            "Open" => self.open_count += 1,
            "Closed" => self.closed_count += 1,
            _ => {}
        }
        match followup.followup_type.as_str() {
            "Call" => self.call_count += 1,
            "Email" => self.email_count += 1,
            "WhatsApp" => self.whatsapp_count += 1,
            _ => {}
        }
    }
}

/// Group the follow-ups in scope by stage.
///
/// Only the organization and date range of `criteria` apply; the date range
/// is matched against `followup_date`. Lead-level filters (pipeline, source,
/// company) do not narrow follow-ups.
pub fn collect(followups: &[Followup], criteria: &ReportCriteria) -> Vec<FollowupStats> {
    let mut groups: BTreeMap<&str, FollowupStats> = BTreeMap::new();
    for followup in followups
        .iter()
        .filter(|f| f.organization_id == criteria.organization_id)
        .filter(|f| {
            criteria
                .date_range
                .as_ref()
                .map_or(true, |range| range.contains(&f.followup_date))
        })
    {
        groups
            .entry(followup.stage.as_str())
            .or_insert_with(|| FollowupStats {
                stage: followup.stage.clone(),
                ..FollowupStats::default()
            })
            .record(followup);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use super::*;
    use crate::scope::DateRange;

    fn followup(id: &str, stage: &str, kind: &str, day: u32) -> Followup {
        Followup {
            id: id.to_string(),
            organization_id: "org_1".to_string(),
            stage: stage.to_string(),
            followup_type: kind.to_string(),
            followup_date: Utc.with_ymd_and_hms(2024, 4, day, 15, 0, 0).unwrap(),
        }
    }

    #[test]
    fn groups_by_stage_with_type_counts() {
        let followups = vec![
            followup("f1", "Open", "Call", 1),
            followup("f2", "Open", "WhatsApp", 2),
            followup("f3", "Open", "Email", 3),
            followup("f4", "Closed", "Call", 4),
            followup("f5", "Closed", "Meeting", 5),
        ];
        let stats = collect(&followups, &ReportCriteria::for_organization("org_1"));
        assert_eq!(stats.len(), 2);

        let closed = &stats[0];
        assert_eq!(closed.stage, "Closed");
        assert_eq!(closed.count, 2);
        assert_eq!(closed.closed_count, 2);
        assert_eq!(closed.call_count, 1);
        assert_eq!(closed.email_count, 0);

        let open = &stats[1];
        assert_eq!(open.stage, "Open");
        assert_eq!(open.count, 3);
        assert_eq!(open.open_count, 3);
        assert_eq!(open.call_count + open.email_count + open.whatsapp_count, 3);
    }

    #[test]
    fn date_range_applies_to_followup_date() {
        let followups = vec![
            followup("f1", "Open", "Call", 1),
            followup("f2", "Open", "Call", 20),
        ];
        let criteria = ReportCriteria {
            date_range: Some(DateRange {
                start: NaiveDate::from_ymd_opt(2024, 4, 10).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 4, 30).unwrap(),
            }),
            ..ReportCriteria::for_organization("org_1")
        };
        let stats = collect(&followups, &criteria);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 1);
    }

    #[test]
    fn type_and_stage_match_exactly() {
        let followups = vec![
            followup("f1", "Open", "call", 1),
            followup("f2", "Open", "Whatsapp", 2),
            followup("f3", "open", "Call", 3),
        ];
        let stats = collect(&followups, &ReportCriteria::for_organization("org_1"));

        let open = stats.iter().find(|s| s.stage == "Open").unwrap();
        assert_eq!(open.count, 2);
        assert_eq!(open.open_count, 2);
        assert_eq!(open.call_count, 0);
        assert_eq!(open.whatsapp_count, 0);

        let lower = stats.iter().find(|s| s.stage == "open").unwrap();
        assert_eq!(lower.count, 1);
        assert_eq!(lower.open_count, 0);
        assert_eq!(lower.call_count, 1);
    }

    #[test]
    fn other_organizations_are_ignored() {
        let mut foreign = followup("f1", "Open", "Call", 1);
        foreign.organization_id = "org_2".to_string();
        assert!(collect(&[foreign], &ReportCriteria::for_organization("org_1")).is_empty());
    }
}
