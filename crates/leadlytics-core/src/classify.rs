//! Won / lost / open classification derived from the current pipeline config.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ClassificationError;
use crate::model::{Lead, Pipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Won,
    Lost,
    Open,
}

/// Classify `stage_name` against `pipeline`'s close stages.
///
/// Only a close stage flagged `won` or `lost` resolves the lead. Open stages,
/// close stages with neither flag and stage names the config no longer knows
/// all count as `Open`.
pub fn classify(pipeline: &Pipeline, stage_name: &str) -> Outcome {
    match pipeline
        .close_stages
        .iter()
        .find(|stage| stage.name == stage_name)
    {
        Some(stage) if stage.won => Outcome::Won,
        Some(stage) if stage.lost => Outcome::Lost,
        _ => Outcome::Open,
    }
}

/// A lead paired with the outcome it was classified to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifiedLead<'a> {
    pub lead: &'a Lead,
    pub outcome: Outcome,
}

/// Pipeline lookup keyed by id, built once per report.
#[derive(Debug, Clone, Default)]
pub struct PipelineIndex<'a> {
    by_id: HashMap<&'a str, &'a Pipeline>,
}

impl<'a> PipelineIndex<'a> {
    pub fn new(pipelines: &'a [Pipeline]) -> Self {
        Self {
            by_id: pipelines.iter().map(|p| (p.id.as_str(), p)).collect(),
        }
    }

    pub fn get(&self, pipeline_id: &str) -> Option<&'a Pipeline> {
        self.by_id.get(pipeline_id).copied()
    }

    /// Classify a lead, failing when its pipeline is not in the index.
    pub fn try_classify(&self, lead: &Lead) -> Result<Outcome, ClassificationError> {
        let pipeline =
            self.get(&lead.pipeline_id)
                .ok_or_else(|| ClassificationError::MissingPipelineConfig {
                    pipeline_id: lead.pipeline_id.clone(),
                })?;
        Ok(classify(pipeline, &lead.stage))
    }

    /// Classify a lead, treating a missing pipeline config as `Open`.
    pub fn classify_lead(&self, lead: &Lead) -> Outcome {
        match self.try_classify(lead) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(
                    lead_id = %lead.id,
                    pipeline_id = %lead.pipeline_id,
                    error = %err,
                    "classifying lead as open"
                );
                Outcome::Open
            }
        }
    }

    /// Classify every lead exactly once; all aggregations share the result.
    pub fn classify_all<'l>(&self, leads: &'l [Lead]) -> Vec<ClassifiedLead<'l>> {
        leads
            .iter()
            .map(|lead| ClassifiedLead {
                lead,
                outcome: self.classify_lead(lead),
            })
            .collect()
    }
}
