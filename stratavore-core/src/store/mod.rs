//! Line-oriented record persistence
//!
//! Every record kind lives in its own JSON-lines file under the data
//! directory. Managers own the business logic; the store only knows how to
//! load, replace and append whole records.

mod jsonl;

pub use jsonl::JsonlStore;

use serde::Serialize;
use serde::de::DeserializeOwned;

/// The logical record kinds kept by stratavore
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    Agents,
    Jobs,
    Sessions,
    Activity,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Agents => "agent",
            Self::Jobs => "job",
            Self::Sessions => "session",
            Self::Activity => "activity",
        }
    }

    /// File name inside the data directory
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Agents => "active_agents.jsonl",
            Self::Jobs => "jobs.jsonl",
            Self::Sessions => "time_sessions.jsonl",
            Self::Activity => "agent_todos.jsonl",
        }
    }

    /// Keyed kinds prefix each line with `<id> ` before the JSON payload
    pub fn is_keyed(&self) -> bool {
        matches!(self, Self::Agents | Self::Activity)
    }
}

/// A value that can be persisted as one line of a record file
pub trait Record: Serialize + DeserializeOwned {
    const KIND: RecordKind;

    /// Stable identifier of this record
    fn key(&self) -> &str;
}
