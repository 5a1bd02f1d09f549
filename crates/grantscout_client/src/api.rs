use std::time::Duration;

use serde::de::DeserializeOwned;
use url::Url;

use crate::types::{
    map_reqwest_error, ApiError, CreateSourceRequest, HarvestSource, JobId, JobSnapshot,
    RawJobStatus, SourcesEnvelope, SuggestedSourcesPage, TriggerResponse,
};

/// Connection settings for the REST surface.
///
/// `poll_interval` is the fixed cadence between job-status fetches. It is a
/// construction-time setting, never a per-call parameter.
#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: Url,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub poll_interval: Duration,
}

impl ClientSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(2000),
        }
    }
}

/// The backend surface this client consumes. Seam for tests and for the
/// poller, which only needs `job_status`.
#[async_trait::async_trait]
pub trait GrantsApi: Send + Sync {
    /// Starts a source-discovery job for a funder. Exactly one job is
    /// enqueued per successful call.
    async fn discover_sources(
        &self,
        funder_id: &str,
        manual_links: &[String],
        search_depth: u32,
    ) -> Result<JobId, ApiError>;

    /// Starts a harvest run for a configured source.
    async fn trigger_harvest(&self, source_id: &str) -> Result<JobId, ApiError>;

    /// Fetches a job's current state.
    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError>;

    /// Suggested-sources read-model for a funder.
    async fn suggested_sources(&self, funder_id: &str) -> Result<SuggestedSourcesPage, ApiError>;

    /// Configured-sources read-model for a funder.
    async fn configured_sources(&self, funder_id: &str) -> Result<Vec<HarvestSource>, ApiError>;

    /// Adopts a suggestion as a configured source.
    async fn create_source(&self, request: &CreateSourceRequest) -> Result<HarvestSource, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestGrantsApi {
    client: reqwest::Client,
    settings: ClientSettings,
}

impl ReqwestGrantsApi {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::Network(err.to_string()))?;
        Ok(Self { client, settings })
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.as_str().trim_end_matches('/'),
            path
        )
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ApiError> {
        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::Status(status.as_u16()));
        }
        response.json::<T>().await.map_err(map_reqwest_error)
    }
}

#[async_trait::async_trait]
impl GrantsApi for ReqwestGrantsApi {
    async fn discover_sources(
        &self,
        funder_id: &str,
        manual_links: &[String],
        search_depth: u32,
    ) -> Result<JobId, ApiError> {
        let body = serde_json::json!({
            "manualLinks": manual_links,
            "searchDepth": search_depth,
        });
        let response = self
            .client
            .post(self.endpoint(&format!("funders/{funder_id}/discover-sources")))
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let trigger: TriggerResponse = Self::decode(response).await?;
        Ok(trigger.job_id)
    }

    async fn trigger_harvest(&self, source_id: &str) -> Result<JobId, ApiError> {
        let response = self
            .client
            .post(self.endpoint(&format!("sources/{source_id}/trigger")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let trigger: TriggerResponse = Self::decode(response).await?;
        Ok(trigger.job_id)
    }

    async fn job_status(&self, job_id: &str) -> Result<JobSnapshot, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("jobs/{job_id}/status")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let raw: RawJobStatus = Self::decode(response).await?;
        JobSnapshot::try_from(raw)
    }

    async fn suggested_sources(&self, funder_id: &str) -> Result<SuggestedSourcesPage, ApiError> {
        let response = self
            .client
            .get(self.endpoint(&format!("funders/{funder_id}/suggested-sources")))
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::decode(response).await
    }

    async fn configured_sources(&self, funder_id: &str) -> Result<Vec<HarvestSource>, ApiError> {
        let response = self
            .client
            .get(self.endpoint("sources"))
            .query(&[("funderId", funder_id)])
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let envelope: SourcesEnvelope = Self::decode(response).await?;
        Ok(envelope.data)
    }

    async fn create_source(&self, request: &CreateSourceRequest) -> Result<HarvestSource, ApiError> {
        let response = self
            .client
            .post(self.endpoint("sources"))
            .json(request)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        Self::decode(response).await
    }
}
