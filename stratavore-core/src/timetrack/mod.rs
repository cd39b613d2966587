//! Time tracking per job

pub mod tracker;
pub mod types;

pub use tracker::TimeTracker;
pub use types::{
    JobTime, ParseSessionStatusError, PauseRecord, SessionStatus, TimeSession, format_duration,
};
