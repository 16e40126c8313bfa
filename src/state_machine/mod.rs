mod job;
mod status;

pub use job::{Job, JobId, Transition};
pub use status::{JobStatus, StatusPolicy};
