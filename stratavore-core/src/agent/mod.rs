//! Agent fleet: personalities, lifecycle and activity

pub mod activity;
pub mod manager;
pub mod personality;
pub mod spawn;
pub mod types;

pub use activity::{ActivityEntry, ActivityLog, ActivityStatus};
pub use manager::{
    AgentManager, AgentManagerConfig, AgentSummary, DEFAULT_SPAWN_GRACE, DEFAULT_STALE_THRESHOLD,
    SpawnedAgent,
};
pub use personality::{ParsePersonalityError, Personality, PersonalityProfile};
pub use spawn::StartupHandle;
pub use types::{
    AgentMetrics, AgentRecord, AgentStatus, CompletedTask, ParseAgentStatusError,
    THOUGHT_LOG_CAPACITY, Thought, ThoughtLog,
};
