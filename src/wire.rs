//! JSON bodies exchanged between the job server and the polling client.

use serde::{Deserialize, Serialize};

use crate::state_machine::{JobId, JobStatus};

/// Body of `POST /jobs`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateJobResponse {
    pub job_id: JobId,
}

/// Body of `GET /status/{job_id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub result: JobStatus,
}

/// Error body for non-success responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// Body of `GET /health`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub jobs: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_job_response_format() {
        let body = CreateJobResponse {
            job_id: JobId::from("0b7c"),
        };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"job_id":"0b7c"}"#);
    }

    #[test]
    fn status_response_deserialize_from_server_format() {
        let body: StatusResponse = serde_json::from_str(r#"{"result": "pending"}"#).unwrap();
        assert_eq!(body.result, JobStatus::Pending);
    }

    #[test]
    fn status_response_rejects_unknown_status() {
        assert!(serde_json::from_str::<StatusResponse>(r#"{"result": "queued"}"#).is_err());
    }

    #[test]
    fn error_response_format() {
        let body = ErrorResponse {
            detail: "Job not found".into(),
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"detail":"Job not found"}"#
        );
    }
}
