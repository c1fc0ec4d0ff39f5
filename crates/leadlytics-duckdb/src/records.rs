//! Typed writes used by fixtures, seeding and the CRUD side of the CRM.

use anyhow::Result;

use leadlytics_core::model::{Company, Contact, Followup, Lead, Pipeline, Source};

use crate::backend::format_ts;
use crate::DuckDbBackend;

impl DuckDbBackend {
    /// Insert an organization row. Safe to call repeatedly with the same `id`.
    pub async fn seed_organization(&self, id: &str, name: &str) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO organizations (id, name, created_at) VALUES (?1, ?2, CURRENT_TIMESTAMP) \
             ON CONFLICT (id) DO UPDATE SET name = EXCLUDED.name",
            duckdb::params![id, name],
        )?;
        Ok(())
    }

    /// Insert a pipeline and its stages in one transaction.
    ///
    /// The stage taxonomy is validated first; an invalid config writes nothing.
    pub async fn insert_pipeline(&self, pipeline: &Pipeline) -> Result<()> {
        pipeline.validate()?;

        let mut conn = self.conn.lock().await;
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO pipelines (id, organization_id, name) VALUES (?1, ?2, ?3)",
            duckdb::params![pipeline.id, pipeline.organization_id, pipeline.name],
        )?;
        for (position, stage) in pipeline.open_stages.iter().enumerate() {
            tx.execute(
                "INSERT INTO pipeline_stages (pipeline_id, position, name, color, kind, won, lost) \
                 VALUES (?1, ?2, ?3, ?4, 'open', FALSE, FALSE)",
                duckdb::params![pipeline.id, position as i64, stage.name, stage.color],
            )?;
        }
        for (position, stage) in pipeline.close_stages.iter().enumerate() {
            tx.execute(
                "INSERT INTO pipeline_stages (pipeline_id, position, name, color, kind, won, lost) \
                 VALUES (?1, ?2, ?3, ?4, 'close', ?5, ?6)",
                duckdb::params![
                    pipeline.id,
                    position as i64,
                    stage.name,
                    stage.color,
                    stage.won,
                    stage.lost
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub async fn insert_source(&self, source: &Source) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO sources (id, organization_id, name) VALUES (?1, ?2, ?3)",
            duckdb::params![source.id, source.organization_id, source.name],
        )?;
        Ok(())
    }

    pub async fn insert_company(&self, company: &Company) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO companies (id, organization_id, name) VALUES (?1, ?2, ?3)",
            duckdb::params![company.id, company.organization_id, company.name],
        )?;
        Ok(())
    }

    pub async fn insert_contact(&self, contact: &Contact) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO contacts (id, organization_id, name, company_id) VALUES (?1, ?2, ?3, ?4)",
            duckdb::params![
                contact.id,
                contact.organization_id,
                contact.name,
                contact.company_id
            ],
        )?;
        Ok(())
    }

    pub async fn insert_lead(&self, lead: &Lead) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO leads (id, organization_id, title, amount, stage, pipeline_id, \
             source_id, contact_id, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            duckdb::params![
                lead.id,
                lead.organization_id,
                lead.title,
                lead.amount,
                lead.stage,
                lead.pipeline_id,
                lead.source_id,
                lead.contact_id,
                format_ts(&lead.created_at)
            ],
        )?;
        Ok(())
    }

    pub async fn insert_followup(&self, followup: &Followup) -> Result<()> {
        let conn = self.conn.lock().await;
        conn.execute(
            "INSERT INTO followups (id, organization_id, stage, followup_type, followup_date) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            duckdb::params![
                followup.id,
                followup.organization_id,
                followup.stage,
                followup.followup_type,
                format_ts(&followup.followup_date)
            ],
        )?;
        Ok(())
    }
}
