//! Job backlog: model, dependency resolution and scheduling advice

pub mod board;
pub mod graph;
pub mod planner;
pub mod types;

pub use board::{AgentWorkload, JobBoard, JobSummary, summarize_jobs};
pub use graph::{
    DependencyCycle, DependencyReport, MissingDependency, ready_jobs, validate_dependencies,
};
pub use planner::{
    AssignmentConflict, AssignmentSuggestion, detect_assignment_conflicts, suggest_assignments,
};
pub use types::{Job, JobStatus, ParseJobStatusError, ParsePriorityError, Priority};
