use serde::{Deserialize, Serialize};

use crate::aspects::types::AspectSet;
use crate::chart::render::RenderedChart;
use crate::ephemeris::types::PositionSet;
use crate::score::RelationshipScore;

/// Positions and self-aspects of one subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NatalAspects {
    pub positions: PositionSet,
    pub aspects: AspectSet,
}

/// Two subjects, their cross aspects and optionally their score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynastryAspects {
    pub first: PositionSet,
    pub second: PositionSet,
    pub aspects: AspectSet,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<RelationshipScore>,
}

/// Relationship score of two subjects with the positions it was computed from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    pub first: PositionSet,
    pub second: PositionSet,
    pub score: RelationshipScore,
}

/// Natal positions against the sky of a later moment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitAspects {
    pub natal: PositionSet,
    pub transit: PositionSet,
    pub aspects: AspectSet,
}

/// Midpoint composite of two subjects and its self-aspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompositeAspects {
    pub first: PositionSet,
    pub second: PositionSet,
    pub composite: PositionSet,
    pub aspects: AspectSet,
}

/// A chart result together with its rendered artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rendered<T> {
    #[serde(flatten)]
    pub chart: T,
    pub rendering: RenderedChart,
}
