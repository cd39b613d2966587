//! stratavore-core: coordination core for a small agent fleet
//!
//! This crate provides the three managers behind stratavore:
//!
//! - **Agents** - [`AgentManager`] owns agent lifecycle, thought logs, task
//!   metrics and the activity log
//! - **Jobs** - [`JobBoard`] holds the backlog; [`validate_dependencies`],
//!   [`ready_jobs`] and the planner functions read it without mutating it
//! - **Time tracking** - [`TimeTracker`] records start/pause/resume/end
//!   sessions per job
//!
//! All three persist through a shared [`JsonlStore`].
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use stratavore_core::{AgentManager, AgentManagerConfig, JsonlStore, Personality};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = Arc::new(JsonlStore::new("/tmp/stratavore"));
//!     let agents = AgentManager::open(store, AgentManagerConfig::default()).await?;
//!
//!     let spawned = agents.spawn(Personality::Senior, None).await?;
//!     spawned.startup.wait().await;
//!     agents.assign_task(&spawned.agent_id, "job-1").await?;
//!     Ok(())
//! }
//! ```

pub mod agent;
pub mod error;
pub mod jobs;
pub mod store;
pub mod timetrack;

pub use agent::{
    ActivityEntry, ActivityLog, ActivityStatus, AgentManager, AgentManagerConfig, AgentRecord,
    AgentStatus, AgentSummary, Personality, SpawnedAgent, StartupHandle,
};
pub use error::{AgentError, JobError, StoreError, StratavoreError, StratavoreResult, TrackerError};
pub use jobs::{
    AssignmentConflict, AssignmentSuggestion, DependencyReport, Job, JobBoard, JobStatus,
    JobSummary, Priority, detect_assignment_conflicts, ready_jobs, suggest_assignments,
    summarize_jobs, validate_dependencies,
};
pub use store::{JsonlStore, Record, RecordKind};
pub use timetrack::{JobTime, SessionStatus, TimeSession, TimeTracker};
