//! Fetch-then-aggregate orchestration for one dashboard request.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::report::{build_report, DashboardReport, ReportInputs};
use crate::scope::{scope_leads, ReportCriteria};
use crate::store::CrmStore;

/// Build the dashboard report for `criteria.organization_id`.
///
/// All store calls share one deadline of `fetch_timeout`. A store error or an
/// elapsed deadline fails the whole report; nothing partial is returned.
#[tracing::instrument(skip_all, fields(organization_id = %criteria.organization_id))]
pub async fn dashboard_report<S>(
    store: &S,
    criteria: &ReportCriteria,
    fetch_timeout: Duration,
) -> Result<DashboardReport, EngineError>
where
    S: CrmStore + ?Sized,
{
    dashboard_report_until(store, criteria, fetch_timeout, std::future::pending()).await
}

/// Like [`dashboard_report`], aborting with [`EngineError::Cancelled`] as soon
/// as `cancelled` resolves. In-flight fetches are dropped with it.
pub async fn dashboard_report_until<S, C>(
    store: &S,
    criteria: &ReportCriteria,
    fetch_timeout: Duration,
    cancelled: C,
) -> Result<DashboardReport, EngineError>
where
    S: CrmStore + ?Sized,
    C: Future<Output = ()>,
{
    tokio::select! {
        biased;
        _ = cancelled => {
            debug!("dashboard report cancelled");
            Err(EngineError::Cancelled)
        }
        result = fetch_and_build(store, criteria, fetch_timeout) => result,
    }
}

async fn fetch_and_build<S>(
    store: &S,
    criteria: &ReportCriteria,
    fetch_timeout: Duration,
) -> Result<DashboardReport, EngineError>
where
    S: CrmStore + ?Sized,
{
    let deadline = Instant::now() + fetch_timeout;
    let timeout_ms = fetch_timeout.as_millis() as u64;
    let org = criteria.organization_id.as_str();

    if !bounded(deadline, timeout_ms, store.organization_exists(org)).await? {
        return Err(EngineError::OrganizationNotFound(org.to_string()));
    }

    let (leads, pipelines, sources, companies, contacts, followups) =
        bounded(deadline, timeout_ms, async {
            tokio::try_join!(
                store.fetch_leads(org),
                store.fetch_pipelines(org),
                store.fetch_sources(org),
                store.fetch_companies(org),
                store.fetch_contacts(org),
                store.fetch_followups(org)
            )
        })
        .await?;

    let fetched = leads.len();
    let leads = scope_leads(leads, &contacts, criteria);
    debug!(fetched, scoped = leads.len(), "leads scoped");

    let inputs = ReportInputs {
        criteria: criteria.clone(),
        leads,
        pipelines,
        sources,
        companies,
        contacts,
        followups,
    };
    let report = tokio::task::spawn_blocking(move || build_report(&inputs))
        .await
        .map_err(|e| EngineError::Aggregation(e.to_string()))?;

    info!(
        total_count = report.summary.total_count,
        won_count = report.summary.won_count,
        "dashboard report built"
    );
    Ok(report)
}

async fn bounded<T, F>(deadline: Instant, timeout_ms: u64, fut: F) -> Result<T, EngineError>
where
    F: Future<Output = anyhow::Result<T>>,
{
    tokio::time::timeout_at(deadline, fut)
        .await
        .map_err(|_| EngineError::FetchTimeout(timeout_ms))?
        .map_err(EngineError::UpstreamFetch)
}
