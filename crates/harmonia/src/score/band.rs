use serde::{Deserialize, Serialize};
use std::fmt;

/// Interpretation band of a relationship score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Minimal,
    Medium,
    Important,
    VeryImportant,
    Exceptional,
    RareExceptional,
}

// Lower bound of each band, ascending; a band runs up to the next bound.
const THRESHOLDS: &[(f64, ScoreBand)] = &[
    (0.0, ScoreBand::Minimal),
    (5.0, ScoreBand::Medium),
    (10.0, ScoreBand::Important),
    (15.0, ScoreBand::VeryImportant),
    (20.0, ScoreBand::Exceptional),
    (30.0, ScoreBand::RareExceptional),
];

impl ScoreBand {
    pub fn for_value(value: f64) -> ScoreBand {
        THRESHOLDS
            .iter()
            .rev()
            .find(|(bound, _)| value >= *bound)
            .map(|(_, band)| *band)
            .unwrap_or(ScoreBand::Minimal)
    }

    pub fn lower_bound(&self) -> f64 {
        THRESHOLDS
            .iter()
            .find(|(_, band)| band == self)
            .map(|(bound, _)| *bound)
            .unwrap_or(0.0)
    }

    pub fn description(&self) -> &'static str {
        match self {
            ScoreBand::Minimal => "Minimal",
            ScoreBand::Medium => "Medium",
            ScoreBand::Important => "Important",
            ScoreBand::VeryImportant => "Very Important",
            ScoreBand::Exceptional => "Exceptional",
            ScoreBand::RareExceptional => "Rare Exceptional",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}
