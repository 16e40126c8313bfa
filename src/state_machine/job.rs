use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::{JobStatus, StatusPolicy};

/// Opaque job identifier. Generated ids are UUID v4 strings, but any string
/// received over the wire is accepted as-is.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for JobId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for JobId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl FromStr for JobId {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

/// What a single status evaluation did to a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// Terminal status under the sticky policy; nothing was evaluated.
    Frozen(JobStatus),
    /// The transient error draw fired.
    TransientError,
    /// Elapsed time reached the completion duration.
    Completed,
    /// Neither fired; the job keeps its current status.
    Unchanged(JobStatus),
}

impl Transition {
    pub fn status(self) -> JobStatus {
        match self {
            Transition::Frozen(status) | Transition::Unchanged(status) => status,
            Transition::TransientError => JobStatus::Error,
            Transition::Completed => JobStatus::Completed,
        }
    }
}

/// A simulated unit of asynchronous work.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: JobId,
    pub created_at: DateTime<Utc>,
    pub completion_duration: Duration,
    pub status: JobStatus,
}

impl Job {
    pub fn new(id: JobId, created_at: DateTime<Utc>, completion_duration: Duration) -> Self {
        Self {
            id,
            created_at,
            completion_duration,
            status: JobStatus::Pending,
        }
    }

    /// Time since creation. A clock that went backwards yields zero.
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        (now - self.created_at).to_std().unwrap_or(Duration::ZERO)
    }

    /// Recompute the status at `now`.
    ///
    /// `transient_error` is only called when an evaluation actually happens,
    /// so a frozen job consumes no random draw.
    pub fn evaluate(
        &mut self,
        now: DateTime<Utc>,
        policy: StatusPolicy,
        transient_error: impl FnOnce() -> bool,
    ) -> Transition {
        if policy == StatusPolicy::Sticky && self.status.is_terminal() {
            return Transition::Frozen(self.status);
        }

        if transient_error() {
            self.status = JobStatus::Error;
            return Transition::TransientError;
        }

        if self.elapsed(now) >= self.completion_duration {
            self.status = JobStatus::Completed;
            return Transition::Completed;
        }

        Transition::Unchanged(self.status)
    }
}
