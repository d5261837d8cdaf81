//! Consensus scores and the disciplines questions are filed under.

use serde::{Deserialize, Serialize};

/// Strength of scientific consensus, derived from a score between 0 and 10.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsensusLevel {
    None,
    Weak,
    Somewhat,
    Strong,
    Full,
}

impl ConsensusLevel {
    /// Scores are clamped to `0..=10` first.
    pub fn from_score(score: f64) -> Self {
        let score = if score.is_nan() { 0.0 } else { score.clamp(0.0, 10.0) };
        if score == 0.0 {
            ConsensusLevel::None
        } else if score <= 3.0 {
            ConsensusLevel::Weak
        } else if score < 7.0 {
            ConsensusLevel::Somewhat
        } else if score < 10.0 {
            ConsensusLevel::Strong
        } else {
            ConsensusLevel::Full
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ConsensusLevel::None => "No Consensus",
            ConsensusLevel::Weak => "Weak Consensus",
            ConsensusLevel::Somewhat => "Moderate Consensus",
            ConsensusLevel::Strong => "Strong Consensus",
            ConsensusLevel::Full => "Full Consensus",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Discipline {
    ClimateScience,
    Medicine,
    Cosmology,
    Biology,
    Physics,
    Mathematics,
    Geology,
}

impl Discipline {
    pub const ALL: [Discipline; 7] = [
        Discipline::ClimateScience,
        Discipline::Medicine,
        Discipline::Cosmology,
        Discipline::Biology,
        Discipline::Physics,
        Discipline::Mathematics,
        Discipline::Geology,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Discipline::ClimateScience => "Climate Science",
            Discipline::Medicine => "Medicine",
            Discipline::Cosmology => "Cosmology",
            Discipline::Biology => "Biology",
            Discipline::Physics => "Physics",
            Discipline::Mathematics => "Mathematics",
            Discipline::Geology => "Geology",
        }
    }

    /// URL path of the discipline's listing page, e.g. `/climate-science`.
    pub fn path(&self) -> &'static str {
        match self {
            Discipline::ClimateScience => "/climate-science",
            Discipline::Medicine => "/medicine",
            Discipline::Cosmology => "/cosmology",
            Discipline::Biology => "/biology",
            Discipline::Physics => "/physics",
            Discipline::Mathematics => "/mathematics",
            Discipline::Geology => "/geology",
        }
    }

    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.path() == path)
    }
}
