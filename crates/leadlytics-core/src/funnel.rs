//! Per-pipeline stage funnel following each pipeline's configured stage order.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::{Lead, Pipeline};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageKind {
    Open,
    Won,
    Lost,
    /// Close stage carrying neither flag; its leads classify as open.
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FunnelStage {
    pub stage: String,
    pub kind: StageKind,
    pub count: u64,
    pub amount: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineFunnel {
    pub pipeline_id: String,
    pub pipeline_name: String,
    pub total_count: u64,
    pub stages: Vec<FunnelStage>,
}

#[derive(Default)]
struct StageTally {
    count: u64,
    amount: f64,
}

/// Stage-by-stage counts for every pipeline that has leads in scope.
///
/// Configured stages come first in order (open, then close), zero-filled.
/// Stage names the config does not know are appended as `open`, and a
/// pipeline missing from `pipelines` is reported with only those stages.
pub fn pipeline_funnels(leads: &[Lead], pipelines: &[Pipeline]) -> Vec<PipelineFunnel> {
    let mut tallies: HashMap<&str, BTreeMap<&str, StageTally>> = HashMap::new();
    for lead in leads {
        let tally = tallies
            .entry(lead.pipeline_id.as_str())
            .or_default()
            .entry(lead.stage.as_str())
            .or_default();
        tally.count += 1;
        tally.amount += lead.amount;
    }

    let mut funnels = Vec::new();
    for pipeline in pipelines {
        let Some(mut stage_tallies) = tallies.remove(pipeline.id.as_str()) else {
            continue;
        };
        let configured = pipeline
            .open_stages
            .iter()
            .map(|s| (s.name.as_str(), StageKind::Open))
            .chain(pipeline.close_stages.iter().map(|s| {
                let kind = if s.won {
                    StageKind::Won
                } else if s.lost {
                    StageKind::Lost
                } else {
                    StageKind::Closed
                };
                (s.name.as_str(), kind)
            }))
            .collect::<Vec<_>>();

        let mut stages = Vec::with_capacity(configured.len() + stage_tallies.len());
        for (name, kind) in configured {
            let tally = stage_tallies.remove(name).unwrap_or_default();
            stages.push(FunnelStage {
                stage: name.to_string(),
                kind,
                count: tally.count,
                amount: tally.amount,
            });
        }
        stages.extend(unconfigured(stage_tallies));
        funnels.push(funnel(&pipeline.id, &pipeline.name, stages));
    }

    let mut orphans: Vec<_> = tallies.into_iter().collect();
    orphans.sort_by(|a, b| a.0.cmp(b.0));
    for (pipeline_id, stage_tallies) in orphans {
        funnels.push(funnel(pipeline_id, pipeline_id, unconfigured(stage_tallies).collect()));
    }
    funnels
}

fn unconfigured<'a>(
    tallies: BTreeMap<&'a str, StageTally>,
) -> impl Iterator<Item = FunnelStage> + 'a {
    tallies.into_iter().map(|(name, tally)| FunnelStage {
        stage: name.to_string(),
        kind: StageKind::Open,
        count: tally.count,
        amount: tally.amount,
    })
}

fn funnel(id: &str, name: &str, stages: Vec<FunnelStage>) -> PipelineFunnel {
    PipelineFunnel {
        pipeline_id: id.to_string(),
        pipeline_name: name.to_string(),
        total_count: stages.iter().map(|s| s.count).sum(),
        stages,
    }
}
