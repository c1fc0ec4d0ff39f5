//! Dashboard report shape and its assembly from the individual aggregations.

use serde::{Deserialize, Serialize};

use crate::classify::PipelineIndex;
use crate::conversion::{conversion_rates, ConversionRates};
use crate::dimension::{breakdown, summarize, Dimension, Directory, SegmentRow, SegmentTotals};
use crate::followup::{self, FollowupStats};
use crate::funnel::{pipeline_funnels, PipelineFunnel};
use crate::model::{Company, Contact, Followup, Lead, Pipeline, Source};
use crate::scope::ReportCriteria;
use crate::timeseries::{build_series, TimeSeries};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub summary: SegmentTotals,
    pub time_based_reports: TimeSeries,
    pub source_wise_reports: Vec<SegmentRow>,
    pub pipeline_wise_reports: Vec<SegmentRow>,
    pub stage_wise_reports: Vec<SegmentRow>,
    pub company_wise_reports: Vec<SegmentRow>,
    pub followup_stats: Vec<FollowupStats>,
    pub conversion_rates: ConversionRates,
    pub pipeline_funnels: Vec<PipelineFunnel>,
}

/// Snapshot of everything one report is computed from.
///
/// `leads` must already be scoped by [`crate::scope::scope_leads`];
/// follow-ups are scoped by the collector itself.
#[derive(Debug, Clone, Default)]
pub struct ReportInputs {
    pub criteria: ReportCriteria,
    pub leads: Vec<Lead>,
    pub pipelines: Vec<Pipeline>,
    pub sources: Vec<Source>,
    pub companies: Vec<Company>,
    pub contacts: Vec<Contact>,
    pub followups: Vec<Followup>,
}

/// Results of the independent aggregations, ready for composition.
#[derive(Debug, Clone, Default)]
pub struct ReportParts {
    pub summary: SegmentTotals,
    pub series: TimeSeries,
    pub by_source: Vec<SegmentRow>,
    pub by_pipeline: Vec<SegmentRow>,
    pub by_stage: Vec<SegmentRow>,
    pub by_company: Vec<SegmentRow>,
    pub followups: Vec<FollowupStats>,
    pub funnels: Vec<PipelineFunnel>,
}

pub fn build_report(inputs: &ReportInputs) -> DashboardReport {
    let index = PipelineIndex::new(&inputs.pipelines);
    let directory = Directory::new(
        &inputs.sources,
        &inputs.pipelines,
        &inputs.companies,
        &inputs.contacts,
    );
    let classified = index.classify_all(&inputs.leads);

    compose(ReportParts {
        summary: summarize(&classified),
        series: build_series(&classified),
        by_source: breakdown(&classified, &directory, Dimension::Source),
        by_pipeline: breakdown(&classified, &directory, Dimension::Pipeline),
        by_stage: breakdown(&classified, &directory, Dimension::Stage),
        by_company: breakdown(&classified, &directory, Dimension::Company),
        followups: followup::collect(&inputs.followups, &inputs.criteria),
        funnels: pipeline_funnels(&inputs.leads, &inputs.pipelines),
    })
}

/// Assemble the response; conversion rates are the only derived field.
pub fn compose(parts: ReportParts) -> DashboardReport {
    let conversion_rates = conversion_rates(&parts.summary, &parts.by_source, &parts.by_pipeline);
    DashboardReport {
        summary: parts.summary,
        time_based_reports: parts.series,
        source_wise_reports: parts.by_source,
        pipeline_wise_reports: parts.by_pipeline,
        stage_wise_reports: parts.by_stage,
        company_wise_reports: parts.by_company,
        followup_stats: parts.followups,
        conversion_rates,
        pipeline_funnels: parts.funnels,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_inputs_produce_fully_shaped_zero_report() {
        let report = build_report(&ReportInputs {
            criteria: ReportCriteria::for_organization("org_1"),
            ..ReportInputs::default()
        });
        assert_eq!(report, DashboardReport::default());

        let json = serde_json::to_value(&report).unwrap();
        for key in [
            "summary",
            "timeBasedReports",
            "sourceWiseReports",
            "pipelineWiseReports",
            "stageWiseReports",
            "companyWiseReports",
            "followupStats",
            "conversionRates",
            "pipelineFunnels",
        ] {
            assert!(!json[key].is_null(), "{key} missing");
        }
        assert_eq!(json["summary"]["totalCount"], 0);
        assert_eq!(json["summary"]["openAmount"], 0.0);
        assert_eq!(json["timeBasedReports"]["weekly"], serde_json::json!([]));
        assert_eq!(json["conversionRates"]["overall"], 0.0);
        assert_eq!(json["conversionRates"]["bySource"], serde_json::json!([]));
    }
}
