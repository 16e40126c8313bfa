//! Server-side job registry.
//!
//! [`JobRegistry`] owns every job created by this process and derives each
//! job's status on demand from elapsed time and a random error draw.
//!
//! Locking is two-level: the map lock is held only long enough to insert a
//! job or clone its handle, and each job has its own mutex for the
//! read-modify-write of its status. Queries for different ids never
//! contend on the same job lock.

mod clock;
mod random;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use tracing::{debug, error, info, warn};

pub use clock::{Clock, SystemClock};
pub use random::{RandomSource, SeededRandom, ThreadRandom};

use crate::config::ServerSettings;
use crate::error::RegistryError;
use crate::state_machine::{Job, JobId, JobStatus, StatusPolicy, Transition};

/// Tunables for job creation and evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleConfig {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub error_rate: f64,
    pub policy: StatusPolicy,
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(10),
            max_delay: Duration::from_secs(30),
            error_rate: 0.05,
            policy: StatusPolicy::Sticky,
        }
    }
}

impl From<&ServerSettings> for LifecycleConfig {
    fn from(settings: &ServerSettings) -> Self {
        Self {
            min_delay: Duration::from_secs_f64(settings.min_delay),
            max_delay: Duration::from_secs_f64(settings.max_delay),
            error_rate: settings.error_rate,
            policy: settings.status_policy,
        }
    }
}

pub struct JobRegistry {
    jobs: RwLock<HashMap<JobId, Arc<Mutex<Job>>>>,
    config: LifecycleConfig,
    random: Arc<dyn RandomSource>,
    clock: Arc<dyn Clock>,
}

impl JobRegistry {
    /// Registry backed by the system clock and a per-thread RNG.
    pub fn new(config: LifecycleConfig) -> Self {
        Self::with_sources(config, Arc::new(ThreadRandom), Arc::new(SystemClock))
    }

    pub fn with_sources(
        config: LifecycleConfig,
        random: Arc<dyn RandomSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            config,
            random,
            clock,
        }
    }

    /// Build a registry from server settings, seeding the RNG when a seed
    /// is configured.
    pub fn from_settings(settings: &ServerSettings) -> Self {
        let random: Arc<dyn RandomSource> = match settings.random_seed {
            Some(seed) => Arc::new(SeededRandom::new(seed)),
            None => Arc::new(ThreadRandom),
        };
        Self::with_sources(LifecycleConfig::from(settings), random, Arc::new(SystemClock))
    }

    pub fn config(&self) -> &LifecycleConfig {
        &self.config
    }

    /// Allocate a new pending job and return its id.
    pub fn create_job(&self) -> JobId {
        let id = JobId::generate();
        let completion_duration = self
            .random
            .completion_delay(self.config.min_delay, self.config.max_delay);
        let job = Job::new(id.clone(), self.clock.now(), completion_duration);

        self.jobs
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(id.clone(), Arc::new(Mutex::new(job)));

        info!(
            job_id = %id,
            completion_secs = completion_duration.as_secs_f64(),
            "Created job"
        );
        id
    }

    /// Evaluate and return the current status of a job.
    pub fn get_status(&self, job_id: &JobId) -> Result<JobStatus, RegistryError> {
        let entry = self
            .jobs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(job_id)
            .cloned();

        let Some(entry) = entry else {
            warn!(job_id = %job_id, "Job not found");
            return Err(RegistryError::NotFound(job_id.clone()));
        };

        let mut job = entry.lock().unwrap_or_else(|e| e.into_inner());
        let transition = job.evaluate(self.clock.now(), self.config.policy, || {
            self.random.transient_error(self.config.error_rate)
        });

        match transition {
            Transition::TransientError => error!(job_id = %job_id, "Job encountered an error"),
            Transition::Completed => info!(job_id = %job_id, "Job completed"),
            Transition::Frozen(status) | Transition::Unchanged(status) => {
                debug!(job_id = %job_id, %status, "Job status unchanged")
            }
        }

        Ok(transition.status())
    }

    pub fn len(&self) -> usize {
        self.jobs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[cfg(test)]
    fn completion_duration(&self, job_id: &JobId) -> Option<Duration> {
        let jobs = self.jobs.read().unwrap_or_else(|e| e.into_inner());
        let entry = jobs.get(job_id)?;
        let job = entry.lock().unwrap_or_else(|e| e.into_inner());
        Some(job.completion_duration)
    }
}
