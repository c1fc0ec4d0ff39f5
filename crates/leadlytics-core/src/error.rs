use thiserror::Error;

/// Failures that abort a dashboard report.
///
/// Classification problems are not here: they degrade to `Open` inside the
/// aggregation and never surface to the caller.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("organization not found: {0}")]
    OrganizationNotFound(String),

    #[error("upstream fetch failed: {0}")]
    UpstreamFetch(#[source] anyhow::Error),

    #[error("upstream fetch timed out after {0} ms")]
    FetchTimeout(u64),

    #[error("report cancelled")]
    Cancelled,

    #[error("aggregation failed: {0}")]
    Aggregation(String),
}

/// A lead could not be classified against its pipeline config.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClassificationError {
    #[error("lead references unknown pipeline {pipeline_id}")]
    MissingPipelineConfig { pipeline_id: String },
}

/// A pipeline stage taxonomy breaks the won XOR lost / unique-name rules.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipelineConfigError {
    #[error("stage '{stage}' in pipeline {pipeline_id} is marked both won and lost")]
    WonAndLost { pipeline_id: String, stage: String },

    #[error("stage '{stage}' appears more than once in pipeline {pipeline_id}")]
    DuplicateStage { pipeline_id: String, stage: String },
}
