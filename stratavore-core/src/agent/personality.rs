//! Agent personalities
//!
//! The set is closed. Each personality carries a static profile used for
//! display and for matching work to agents by hand.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The fixed set of agent personalities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Personality {
    Cadet,
    Senior,
    Specialist,
    Researcher,
    Debugger,
    Optimizer,
}

/// Descriptive profile of a personality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PersonalityProfile {
    pub name: &'static str,
    pub description: &'static str,
    pub strengths: &'static [&'static str],
    pub specialties: &'static [&'static str],
    pub work_style: &'static str,
    pub communication_style: &'static str,
}

impl Personality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cadet => "cadet",
            Self::Senior => "senior",
            Self::Specialist => "specialist",
            Self::Researcher => "researcher",
            Self::Debugger => "debugger",
            Self::Optimizer => "optimizer",
        }
    }

    /// All variants for iteration
    pub fn all() -> &'static [Personality] {
        &[
            Self::Cadet,
            Self::Senior,
            Self::Specialist,
            Self::Researcher,
            Self::Debugger,
            Self::Optimizer,
        ]
    }

    pub fn profile(&self) -> PersonalityProfile {
        match self {
            Self::Cadet => PersonalityProfile {
                name: "Cadet Agent",
                description: "Eager junior developer, quick with simple tasks",
                strengths: &["speed", "enthusiasm", "learning"],
                specialties: &["quick_fixes", "documentation", "testing"],
                work_style: "rapid_iteration",
                communication_style: "brief_and_focused",
            },
            Self::Senior => PersonalityProfile {
                name: "Senior Agent",
                description: "Experienced developer, methodical and thorough",
                strengths: &["experience", "architecture", "problem_solving"],
                specialties: &["system_design", "refactoring", "optimization"],
                work_style: "careful_planning",
                communication_style: "detailed_and_comprehensive",
            },
            Self::Specialist => PersonalityProfile {
                name: "Specialist Agent",
                description: "Domain expert for specific technologies",
                strengths: &["expertise", "depth", "precision"],
                specialties: &["databases", "security", "performance"],
                work_style: "focused_deep_dive",
                communication_style: "technical_detailed",
            },
            Self::Researcher => PersonalityProfile {
                name: "Researcher Agent",
                description: "Investigative agent for exploring new solutions",
                strengths: &["analysis", "exploration", "documentation"],
                specialties: &["feature_research", "comparative_analysis", "prototyping"],
                work_style: "systematic_investigation",
                communication_style: "analytical_and_curious",
            },
            Self::Debugger => PersonalityProfile {
                name: "Debugger Agent",
                description: "Specialized in troubleshooting and fixing issues",
                strengths: &["troubleshooting", "precision", "persistence"],
                specialties: &["bug_fixing", "testing", "root_cause_analysis"],
                work_style: "systematic_debugging",
                communication_style: "methodical_and_precise",
            },
            Self::Optimizer => PersonalityProfile {
                name: "Optimizer Agent",
                description: "Focuses on improving performance and efficiency",
                strengths: &["performance", "efficiency", "scalability"],
                specialties: &["optimization", "refactoring", "benchmarking"],
                work_style: "iterative_improvement",
                communication_style: "metrics_focused",
            },
        }
    }
}

impl std::fmt::Display for Personality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error type for parsing Personality from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsePersonalityError(String);

impl std::fmt::Display for ParsePersonalityError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "unknown personality: {}", self.0)
    }
}

impl std::error::Error for ParsePersonalityError {}

impl FromStr for Personality {
    type Err = ParsePersonalityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cadet" => Ok(Self::Cadet),
            "senior" => Ok(Self::Senior),
            "specialist" => Ok(Self::Specialist),
            "researcher" => Ok(Self::Researcher),
            "debugger" => Ok(Self::Debugger),
            "optimizer" => Ok(Self::Optimizer),
            _ => Err(ParsePersonalityError(s.to_string())),
        }
    }
}
