use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::backoff::BackoffConfig;
use super::error::ClientError;
use crate::state_machine::{JobId, JobStatus};

/// Anything that can answer a single status query for a job.
// Futures are awaited in place, never spawned, so no `Send` bound.
#[allow(async_fn_in_trait)]
pub trait StatusSource {
    async fn get_status(&self, job_id: &JobId) -> Result<JobStatus, ClientError>;
}

/// Suspends the polling loop between queries.
#[allow(async_fn_in_trait)]
pub trait Sleeper {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer, so a paused test runtime advances instantly.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Drives a job to a terminal status with capped exponential backoff.
#[derive(Debug, Clone)]
pub struct Poller<Z = TokioSleeper> {
    backoff: BackoffConfig,
    transport_retries: u32,
    sleeper: Z,
}

impl Poller<TokioSleeper> {
    pub fn new(backoff: BackoffConfig) -> Self {
        Self::with_sleeper(backoff, TokioSleeper)
    }
}

impl<Z: Sleeper> Poller<Z> {
    pub fn with_sleeper(backoff: BackoffConfig, sleeper: Z) -> Self {
        Self {
            backoff,
            transport_retries: 0,
            sleeper,
        }
    }

    /// Tolerate up to `retries` consecutive transport failures before
    /// giving up. `NotFound` is never retried.
    pub fn with_transport_retries(mut self, retries: u32) -> Self {
        self.transport_retries = retries;
        self
    }

    pub fn backoff(&self) -> &BackoffConfig {
        &self.backoff
    }

    /// Query `job_id` until it reports a terminal status.
    ///
    /// Every observed status is passed to `observer` in query order. The
    /// timeout is checked after each non-terminal observation and before
    /// sleeping, so the loop may overshoot `timeout` by at most one interval
    /// and a zero timeout fails right after the first pending observation.
    pub async fn wait_for_completion(
        &self,
        source: &impl StatusSource,
        job_id: &JobId,
        mut observer: Option<&mut dyn FnMut(JobStatus)>,
        timeout: Option<Duration>,
    ) -> Result<JobStatus, ClientError> {
        let started = Instant::now();
        let mut backoff = self.backoff.start();
        let mut consecutive_failures = 0u32;

        loop {
            match source.get_status(job_id).await {
                Ok(status) => {
                    consecutive_failures = 0;
                    info!(job_id = %job_id, %status, "Job status");
                    if let Some(observer) = observer.as_mut() {
                        observer(status);
                    }
                    if status.is_terminal() {
                        return Ok(status);
                    }
                }
                Err(err) if err.is_transport() && consecutive_failures < self.transport_retries => {
                    consecutive_failures += 1;
                    warn!(
                        job_id = %job_id,
                        attempt = consecutive_failures,
                        max = self.transport_retries,
                        error = %err,
                        "Status query failed, retrying"
                    );
                }
                Err(err) => return Err(err),
            }

            let elapsed = started.elapsed();
            if timeout.is_some_and(|limit| elapsed >= limit) {
                warn!(job_id = %job_id, elapsed_ms = elapsed.as_millis() as u64, "Job timed out");
                return Err(ClientError::Timeout {
                    job_id: job_id.clone(),
                    elapsed,
                });
            }

            debug!(
                job_id = %job_id,
                interval_ms = backoff.current().as_millis() as u64,
                "Waiting before next status query"
            );
            self.sleeper.sleep(backoff.current()).await;
            backoff.advance();
        }
    }
}
