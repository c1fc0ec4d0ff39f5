use std::collections::HashMap;

use async_trait::async_trait;

use leadlytics_core::model::{
    CloseStage, Company, Contact, Followup, Lead, OpenStage, Pipeline, Source,
};
use leadlytics_core::store::{
    DirectoryStore, FollowupStore, LeadStore, OrganizationStore, PipelineStore,
};

use crate::backend::parse_ts;
use crate::DuckDbBackend;

#[async_trait]
impl OrganizationStore for DuckDbBackend {
    async fn organization_exists(&self, organization_id: &str) -> anyhow::Result<bool> {
        let conn = self.conn.lock().await;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM organizations WHERE id = ?1",
            duckdb::params![organization_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[async_trait]
impl LeadStore for DuckDbBackend {
    async fn fetch_leads(&self, organization_id: &str) -> anyhow::Result<Vec<Lead>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, title, amount, stage, pipeline_id, source_id, contact_id, \
                    CAST(created_at AS VARCHAR) \
             FROM leads \
             WHERE organization_id = ?1 \
             ORDER BY created_at ASC, id ASC",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok((
                Lead {
                    id: row.get(0)?,
                    organization_id: row.get(1)?,
                    title: row.get(2)?,
                    amount: row.get(3)?,
                    stage: row.get(4)?,
                    pipeline_id: row.get(5)?,
                    source_id: row.get(6)?,
                    contact_id: row.get(7)?,
                    created_at: chrono::DateTime::<chrono::Utc>::MIN_UTC,
                },
                row.get::<_, String>(8)?,
            ))
        })?;

        let mut leads = Vec::new();
        for row in rows {
            let (mut lead, created_at) = row?;
            lead.created_at = parse_ts(&created_at)?;
            leads.push(lead);
        }
        Ok(leads)
    }
}

#[async_trait]
impl PipelineStore for DuckDbBackend {
    async fn fetch_pipelines(&self, organization_id: &str) -> anyhow::Result<Vec<Pipeline>> {
        let conn = self.conn.lock().await;

        let mut stmt = conn.prepare(
            "SELECT id, organization_id, name FROM pipelines \
             WHERE organization_id = ?1 ORDER BY name ASC, id ASC",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok(Pipeline {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                name: row.get(2)?,
                open_stages: Vec::new(),
                close_stages: Vec::new(),
            })
        })?;
        let mut pipelines = Vec::new();
        for row in rows {
            pipelines.push(row?);
        }
        let slots: HashMap<String, usize> = pipelines
            .iter()
            .enumerate()
            .map(|(idx, p)| (p.id.clone(), idx))
            .collect();

        let mut stmt = conn.prepare(
            "SELECT s.pipeline_id, s.name, s.color, s.kind, s.won, s.lost \
             FROM pipeline_stages s \
             JOIN pipelines p ON p.id = s.pipeline_id \
             WHERE p.organization_id = ?1 \
             ORDER BY s.pipeline_id, s.kind, s.position",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Option<String>>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, bool>(4)?,
                row.get::<_, bool>(5)?,
            ))
        })?;
        for row in rows {
            let (pipeline_id, name, color, kind, won, lost) = row?;
            let Some(&idx) = slots.get(&pipeline_id) else {
                continue;
            };
            let pipeline = &mut pipelines[idx];
            if kind == "close" {
                pipeline.close_stages.push(CloseStage {
                    name,
                    color,
                    won,
                    lost,
                });
            } else {
                pipeline.open_stages.push(OpenStage { name, color });
            }
        }
        Ok(pipelines)
    }
}

#[async_trait]
impl DirectoryStore for DuckDbBackend {
    async fn fetch_sources(&self, organization_id: &str) -> anyhow::Result<Vec<Source>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, name FROM sources WHERE organization_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok(Source {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        let mut sources = Vec::new();
        for row in rows {
            sources.push(row?);
        }
        Ok(sources)
    }

    async fn fetch_companies(&self, organization_id: &str) -> anyhow::Result<Vec<Company>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, name FROM companies WHERE organization_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok(Company {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                name: row.get(2)?,
            })
        })?;
        let mut companies = Vec::new();
        for row in rows {
            companies.push(row?);
        }
        Ok(companies)
    }

    async fn fetch_contacts(&self, organization_id: &str) -> anyhow::Result<Vec<Contact>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, name, company_id FROM contacts \
             WHERE organization_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok(Contact {
                id: row.get(0)?,
                organization_id: row.get(1)?,
                name: row.get(2)?,
                company_id: row.get(3)?,
            })
        })?;
        let mut contacts = Vec::new();
        for row in rows {
            contacts.push(row?);
        }
        Ok(contacts)
    }
}

#[async_trait]
impl FollowupStore for DuckDbBackend {
    async fn fetch_followups(&self, organization_id: &str) -> anyhow::Result<Vec<Followup>> {
        let conn = self.conn.lock().await;
        let mut stmt = conn.prepare(
            "SELECT id, organization_id, stage, followup_type, CAST(followup_date AS VARCHAR) \
             FROM followups \
             WHERE organization_id = ?1 \
             ORDER BY followup_date ASC, id ASC",
        )?;
        let rows = stmt.query_map(duckdb::params![organization_id], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut followups = Vec::new();
        for row in rows {
            let (id, organization_id, stage, followup_type, followup_date) = row?;
            followups.push(Followup {
                id,
                organization_id,
                stage,
                followup_type,
                followup_date: parse_ts(&followup_date)?,
            });
        }
        Ok(followups)
    }
}
