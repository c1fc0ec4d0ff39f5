use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use leadlytics_core::{
    engine::dashboard_report,
    scope::{DateRange, ReportCriteria},
};

use crate::{auth::middleware::OrgContext, error::AppError, state::AppState};

use super::query::{optional_filter, parse_optional_date, validate_date_order};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardQuery {
    pub pipeline_id: Option<String>,
    pub source_id: Option<String>,
    pub company_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl DashboardQuery {
    /// Validate the raw query and combine it with the caller's organization.
    ///
    /// A lone `startDate` or `endDate` is accepted but leaves the date filter off.
    pub fn into_criteria(self, organization_id: String) -> Result<ReportCriteria, AppError> {
        let start = parse_optional_date(self.start_date.as_deref(), "startDate")?;
        let end = parse_optional_date(self.end_date.as_deref(), "endDate")?;
        validate_date_order(start, end)?;

        let date_range = DateRange::from_bounds(start, end);
        if date_range.is_none() && (start.is_some() || end.is_some()) {
            tracing::debug!(?start, ?end, "Only one date bound given; date filter ignored");
        }

        Ok(ReportCriteria {
            organization_id,
            pipeline_id: optional_filter(self.pipeline_id),
            source_id: optional_filter(self.source_id),
            company_id: optional_filter(self.company_id),
            date_range,
        })
    }
}

/// `GET /reports/dashboard`: the full sales dashboard for the caller's organization.
#[tracing::instrument(skip_all)]
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Extension(org): Extension<OrgContext>,
    Query(query): Query<DashboardQuery>,
) -> Result<impl IntoResponse, AppError> {
    let criteria = query.into_criteria(org.organization_id.clone())?;
    let report = dashboard_report(
        state.db.as_ref(),
        &criteria,
        state.config.fetch_timeout(),
    )
    .await?;
    Ok(Json(report))
}
