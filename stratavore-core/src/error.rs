//! Error types for stratavore-core

use thiserror::Error;

/// Top-level error type for stratavore-core
#[derive(Error, Debug)]
pub enum StratavoreError {
    #[error("Agent error: {0}")]
    Agent(#[from] AgentError),

    #[error("Job error: {0}")]
    Job(#[from] JobError),

    #[error("Time tracking error: {0}")]
    Tracker(#[from] TrackerError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from the record store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode {kind} record: {source}")]
    Encode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Errors from the agent lifecycle manager
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Agent not found: {0}")]
    NotFound(String),

    #[error("Agent {agent_id} is not available (status: {status})")]
    Unavailable { agent_id: String, status: String },

    #[error("Invalid agent transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the job board
#[derive(Error, Debug)]
pub enum JobError {
    #[error("Job not found: {0}")]
    NotFound(String),

    #[error("Job already exists: {0}")]
    Duplicate(String),

    #[error("Invalid job transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Invalid estimate for job {job_id}: {hours}")]
    InvalidEstimate { job_id: String, hours: f64 },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors from the time session tracker
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Session not found: {0}")]
    NotFound(String),

    #[error("Invalid state: expected {expected}, got {actual}")]
    InvalidState { expected: String, actual: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Convenience alias used by the binary and integration tests
pub type StratavoreResult<T> = Result<T, StratavoreError>;
