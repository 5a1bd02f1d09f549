use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Opaque backend job identifier.
pub type JobId = String;

/// The two job flows the backend runs for a funder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Flow {
    Discovery,
    Harvest,
}

/// Progress payload reported while a job is active.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgress {
    pub phase: String,
    pub percent: u8,
    #[serde(default)]
    pub current_url: Option<String>,
}

/// Backend job state, tagged so progress cannot coexist with a terminal
/// state. The state set is closed: anything else is a decode error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    Waiting,
    Active { progress: Option<JobProgress> },
    Completed,
    Failed { reason: Option<String> },
}

impl JobState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Completed | JobState::Failed { .. })
    }
}

/// One status fetch's view of a job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub id: JobId,
    pub state: JobState,
}

/// Raw status payload as the backend sends it: a state string plus
/// optional fields. Converted into the tagged [`JobState`] immediately.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawJobStatus {
    pub(crate) id: String,
    pub(crate) state: String,
    #[serde(default)]
    pub(crate) progress: Option<JobProgress>,
    #[serde(default)]
    pub(crate) failed_reason: Option<String>,
}

impl TryFrom<RawJobStatus> for JobSnapshot {
    type Error = ApiError;

    fn try_from(raw: RawJobStatus) -> Result<Self, Self::Error> {
        let state = match raw.state.as_str() {
            "waiting" => JobState::Waiting,
            "active" => JobState::Active {
                progress: raw.progress,
            },
            "completed" => JobState::Completed,
            "failed" => JobState::Failed {
                reason: raw.failed_reason,
            },
            other => return Err(ApiError::UnknownState(other.to_string())),
        };
        Ok(JobSnapshot { id: raw.id, state })
    }
}

/// Trigger responses carry only the enqueued job's identifier.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct TriggerResponse {
    pub(crate) job_id: String,
}

/// One scored candidate page from a discovery run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSource {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub anchor_text: Option<String>,
    pub score: f64,
    #[serde(default)]
    pub keywords: Vec<String>,
}

/// Suggested-sources read-model for a funder.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedSourcesPage {
    #[serde(default)]
    pub sources: Vec<SuggestedSource>,
    #[serde(default)]
    pub last_discovery_at: Option<String>,
}

/// A configured harvest source.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HarvestSource {
    pub id: String,
    pub name: String,
    pub base_url: String,
    pub enabled: bool,
    #[serde(default)]
    pub funder_id: Option<String>,
    #[serde(default)]
    pub last_run_at: Option<String>,
    #[serde(default)]
    pub cron_schedule: Option<String>,
}

/// Payload for adopting a suggestion as a configured source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSourceRequest {
    pub name: String,
    pub base_url: String,
    pub funder_id: String,
}

/// Envelope the sources listing arrives in.
#[derive(Debug, Deserialize)]
pub(crate) struct SourcesEnvelope {
    #[serde(default)]
    pub(crate) data: Vec<HarvestSource>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("invalid url: {0}")]
    InvalidUrl(String),
    #[error("http status {0}")]
    Status(u16),
    #[error("timeout")]
    Timeout,
    #[error("network error: {0}")]
    Network(String),
    #[error("decode error: {0}")]
    Decode(String),
    #[error("unrecognized job state `{0}`")]
    UnknownState(String),
}

pub(crate) fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::Timeout;
    }
    if err.is_decode() {
        return ApiError::Decode(err.to_string());
    }
    ApiError::Network(err.to_string())
}

/// Events the client emits back to the state-machine side.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// A trigger call resolved, successfully or not.
    TriggerFinished {
        flow: Flow,
        result: Result<JobId, ApiError>,
    },
    /// A watched job's status fetch returned.
    StatusUpdate {
        flow: Flow,
        job_id: JobId,
        state: JobState,
    },
    /// A watched job's status fetch itself errored; polling has stopped.
    PollFailed {
        flow: Flow,
        job_id: JobId,
        error: ApiError,
    },
    /// The suggested-sources read-model was loaded (or served from cache).
    SuggestedLoaded {
        funder_id: String,
        result: Result<SuggestedSourcesPage, ApiError>,
        from_cache: bool,
    },
    /// The configured-sources read-model was loaded (or served from cache).
    SourcesLoaded {
        funder_id: String,
        result: Result<Vec<HarvestSource>, ApiError>,
        from_cache: bool,
    },
    /// A source-adoption call resolved.
    SourceCreated {
        result: Result<HarvestSource, ApiError>,
    },
}
