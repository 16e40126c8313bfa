use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three statuses a job can report.
///
/// `Pending` is the only non-terminal status. Once a poller observes
/// `Completed` or `Error` it stops querying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        match self {
            JobStatus::Pending => false,
            JobStatus::Completed | JobStatus::Error => true,
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobStatus::Pending => write!(f, "pending"),
            JobStatus::Completed => write!(f, "completed"),
            JobStatus::Error => write!(f, "error"),
        }
    }
}

/// How the registry treats a job that already reported a terminal status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusPolicy {
    /// The first terminal status is frozen and returned on every later query.
    #[default]
    Sticky,
    /// Every query re-runs the error draw and the completion check, so a
    /// terminal status may flip between `completed` and `error`.
    Reevaluate,
}

impl fmt::Display for StatusPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatusPolicy::Sticky => write!(f, "sticky"),
            StatusPolicy::Reevaluate => write!(f, "reevaluate"),
        }
    }
}

impl FromStr for StatusPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sticky" => Ok(StatusPolicy::Sticky),
            "reevaluate" => Ok(StatusPolicy::Reevaluate),
            other => Err(format!(
                "unknown status policy '{other}' (expected 'sticky' or 'reevaluate')"
            )),
        }
    }
}
