use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use tracing::info;

use super::backoff::BackoffConfig;
use super::error::ClientError;
use super::poll::{Poller, StatusSource};
use crate::config::ClientSettings;
use crate::state_machine::{JobId, JobStatus};
use crate::wire::{CreateJobResponse, StatusResponse};

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the job server, with a built-in polling loop.
pub struct JobClient {
    client: Client,
    base_url: Url,
    poller: Poller,
}

impl JobClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Self::with_poller(base_url, DEFAULT_REQUEST_TIMEOUT, Poller::new(BackoffConfig::default()))
    }

    pub fn from_settings(settings: &ClientSettings) -> Result<Self, ClientError> {
        let poller = Poller::new(BackoffConfig::from(settings))
            .with_transport_retries(settings.transport_retries);
        Self::with_poller(
            &settings.base_url,
            Duration::from_secs_f64(settings.request_timeout),
            poller,
        )
    }

    pub fn with_poller(
        base_url: &str,
        request_timeout: Duration,
        poller: Poller,
    ) -> Result<Self, ClientError> {
        let base_url =
            Url::parse(base_url).map_err(|_| ClientError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(ClientError::InvalidUrl(base_url.to_string()));
        }
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(5))
            .timeout(request_timeout)
            .build()?;
        Ok(Self {
            client,
            base_url,
            poller,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    /// `POST /jobs`.
    pub async fn create_job(&self) -> Result<JobId, ClientError> {
        let response = self.client.post(self.endpoint(&["jobs"])).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(http_error(response).await);
        }

        let body = response.json::<CreateJobResponse>().await?;
        info!(job_id = %body.job_id, "Created job");
        Ok(body.job_id)
    }

    /// `GET /status/{job_id}`.
    pub async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError> {
        let response = self
            .client
            .get(self.endpoint(&["status", job_id.as_str()]))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(ClientError::NotFound {
                job_id: job_id.clone(),
            });
        }
        if !status.is_success() {
            return Err(http_error(response).await);
        }

        let body = response.json::<StatusResponse>().await?;
        Ok(body.result)
    }

    /// Poll `job_id` with this client's backoff settings until it reaches a
    /// terminal status or `timeout` elapses.
    pub async fn wait_for_completion(
        &self,
        job_id: &JobId,
        observer: Option<&mut dyn FnMut(JobStatus)>,
        timeout: Option<Duration>,
    ) -> Result<JobStatus, ClientError> {
        self.poller
            .wait_for_completion(self, job_id, observer, timeout)
            .await
    }
}

impl StatusSource for JobClient {
    async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError> {
        JobClient::get_status(self, job_id).await
    }
}

async fn http_error(response: reqwest::Response) -> ClientError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unknown error".to_string());
    ClientError::Http { status, message }
}
