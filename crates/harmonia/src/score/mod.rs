//! Relationship scoring with the Ciro Discepolo weights.

pub mod band;
pub mod scorer;
pub mod table;

pub use band::ScoreBand;
pub use scorer::{destiny_sign, RelationshipScore, RelationshipScorer, ScoreContribution};
pub use table::{PointRoles, Role, TightOrbWeight, WeightRule, WeightTable, DESTINY_SIGN_BONUS};
