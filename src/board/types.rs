use chrono::{DateTime, Utc};
use log::warn;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{BoardError, Result};

/// One row of the wall board, as served by the `?data=all` endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResult {
    /// Bamboo plan key (e.g., "PROJ-PLAN")
    #[serde(default)]
    pub plan_key: Option<String>,
    pub cdresult: CdResult,
    #[serde(default)]
    pub uptime_grade: Option<UptimeSummary>,
}

impl AsRef<PipelineResult> for PipelineResult {
    fn as_ref(&self) -> &PipelineResult {
        self
    }
}

/// Deployment state of a single plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CdResult {
    pub project_name: String,
    pub plan_name: String,
    #[serde(default)]
    pub contributors: Vec<Contributor>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_update_time: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_milliseconds_option")]
    pub last_deployment_time: Option<DateTime<Utc>>,
    /// Commits since the last deployment
    #[serde(default)]
    pub num_changes: u32,
    #[serde(default)]
    pub current_build: Option<CurrentBuild>,
    #[serde(default)]
    pub pipeline_stages: Vec<PipelineStage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub fullname: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentBuild {
    #[serde(default)]
    pub cdpipeline_state: Option<CdPipelineState>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineStage {
    pub stage_name: String,
    /// Outcome of this stage in the current build, absent before it ran
    #[serde(default)]
    pub state: Option<CdPipelineState>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeSummary {
    /// Fraction of time the plan has been green, negative when unknown
    pub uptime_percentage: f64,
    #[serde(default)]
    pub grade: Option<String>,
}

/// Build state reported by the backend. Anything that is not in progress
/// or queued keeps its raw label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CdPipelineState {
    InProgress,
    Queued,
    Other(String),
}

impl From<String> for CdPipelineState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "CD_IN_PROGRESS" => Self::InProgress,
            "CD_QUEUED" => Self::Queued,
            _ => Self::Other(value),
        }
    }
}

impl From<CdPipelineState> for String {
    fn from(state: CdPipelineState) -> Self {
        match state {
            CdPipelineState::InProgress => "CD_IN_PROGRESS".to_string(),
            CdPipelineState::Queued => "CD_QUEUED".to_string(),
            CdPipelineState::Other(label) => label,
        }
    }
}

impl CdResult {
    pub fn state(&self) -> Option<&CdPipelineState> {
        self.current_build
            .as_ref()
            .and_then(|build| build.cdpipeline_state.as_ref())
    }

    /// Whole days between the last deployment and `now`.
    ///
    /// Returns `None` when nothing was deployed yet or the deployment lies
    /// after `now`.
    pub fn days_since_deployment(&self, now: DateTime<Utc>) -> Option<i64> {
        let deployed = self.last_deployment_time?;
        if deployed > now {
            return None;
        }
        Some((now - deployed).num_days())
    }
}

/// Decodes the opaque poll payload into typed rows.
///
/// Rows that do not match the expected shape are skipped with a warning so
/// one bad plan cannot blank the whole board.
pub fn decode_results(payload: &Value) -> Result<Vec<PipelineResult>> {
    let Value::Array(items) = payload else {
        return Err(BoardError::NotAList(json_kind(payload)));
    };

    let results = items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| {
            PipelineResult::deserialize(item)
                .inspect_err(|e| warn!("Skipping malformed pipeline result #{index}: {e}"))
                .ok()
        })
        .collect();

    Ok(results)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
