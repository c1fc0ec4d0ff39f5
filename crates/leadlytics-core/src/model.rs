//! Read-only record snapshots handed to the engine by the CRM stores.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::PipelineConfigError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub id: String,
    pub organization_id: String,
    pub title: String,
    /// Deal value in the tenant's currency. Never negative.
    pub amount: f64,
    /// Current pipeline stage name, matched against the pipeline config at query time.
    pub stage: String,
    pub pipeline_id: String,
    pub source_id: Option<String>,
    pub contact_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenStage {
    pub name: String,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloseStage {
    pub name: String,
    pub color: Option<String>,
    #[serde(default)]
    pub won: bool,
    #[serde(default)]
    pub lost: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub open_stages: Vec<OpenStage>,
    pub close_stages: Vec<CloseStage>,
}

impl Pipeline {
    /// Check the stage taxonomy: a close stage is won XOR lost XOR neither,
    /// and a stage name appears once across open and close stages.
    pub fn validate(&self) -> Result<(), PipelineConfigError> {
        let mut seen = HashSet::new();
        for stage in &self.close_stages {
            if stage.won && stage.lost {
                return Err(PipelineConfigError::WonAndLost {
                    pipeline_id: self.id.clone(),
                    stage: stage.name.clone(),
                });
            }
        }
        let names = self
            .open_stages
            .iter()
            .map(|s| s.name.as_str())
            .chain(self.close_stages.iter().map(|s| s.name.as_str()));
        for name in names {
            if !seen.insert(name) {
                return Err(PipelineConfigError::DuplicateStage {
                    pipeline_id: self.id.clone(),
                    stage: name.to_string(),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: String,
    pub organization_id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    pub id: String,
    pub organization_id: String,
    pub name: String,
    pub company_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Followup {
    pub id: String,
    pub organization_id: String,
    /// Lifecycle stage of the follow-up itself ("Open" / "Closed").
    pub stage: String,
    /// Channel: "Call", "Email", "WhatsApp", ...
    #[serde(rename = "type")]
    pub followup_type: String,
    pub followup_date: DateTime<Utc>,
}
