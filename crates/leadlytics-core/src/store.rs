//! Read interfaces of the CRM collaborators the engine depends on.
//!
//! Every fetch is scoped to one organization. The engine never writes through
//! these traits and never keeps the returned records past one report.

use async_trait::async_trait;

use crate::model::{Company, Contact, Followup, Lead, Pipeline, Source};

#[async_trait]
pub trait OrganizationStore: Send + Sync + 'static {
    async fn organization_exists(&self, organization_id: &str) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait LeadStore: Send + Sync + 'static {
    /// Leads of the organization, oldest `created_at` first.
    async fn fetch_leads(&self, organization_id: &str) -> anyhow::Result<Vec<Lead>>;
}

#[async_trait]
pub trait PipelineStore: Send + Sync + 'static {
    /// Pipelines with their open and close stages in configured order.
    async fn fetch_pipelines(&self, organization_id: &str) -> anyhow::Result<Vec<Pipeline>>;
}

/// Sources, companies and contacts: label lookups and the company join.
#[async_trait]
pub trait DirectoryStore: Send + Sync + 'static {
    async fn fetch_sources(&self, organization_id: &str) -> anyhow::Result<Vec<Source>>;
    async fn fetch_companies(&self, organization_id: &str) -> anyhow::Result<Vec<Company>>;
    async fn fetch_contacts(&self, organization_id: &str) -> anyhow::Result<Vec<Contact>>;
}

#[async_trait]
pub trait FollowupStore: Send + Sync + 'static {
    async fn fetch_followups(&self, organization_id: &str) -> anyhow::Result<Vec<Followup>>;
}

pub trait CrmStore:
    OrganizationStore + LeadStore + PipelineStore + DirectoryStore + FollowupStore
{
}

impl<T> CrmStore for T where
    T: OrganizationStore + LeadStore + PipelineStore + DirectoryStore + FollowupStore
{
}
