use serde::{Deserialize, Serialize};

use crate::aspects::types::{Aspect, AspectSet, AspectSetKind};
use crate::ephemeris::types::PositionSet;
use crate::error::{EngineError, Result};
use crate::points::Point;
use crate::score::band::ScoreBand;
use crate::score::table::{PointRoles, RuleKey, WeightTable};

/// One aspect that added to a relationship score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub aspect: Aspect,
    pub weight: f64,
}

/// Compatibility score between two subjects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipScore {
    pub value: f64,
    pub band: ScoreBand,
    pub destiny_sign: bool,
    pub contributions: Vec<ScoreContribution>,
}

impl RelationshipScore {
    /// The same score with the destiny-sign bonus added.
    pub fn with_destiny_sign(self, bonus: f64) -> Self {
        if self.destiny_sign {
            return self;
        }
        let value = self.value + bonus.max(0.0);
        Self {
            value,
            band: ScoreBand::for_value(value),
            destiny_sign: true,
            ..self
        }
    }

    pub fn description(&self) -> &'static str {
        self.band.description()
    }
}

/// Whether both Suns fall in signs of the same quality.
///
/// False when either set lacks a Sun.
pub fn destiny_sign(set_a: &PositionSet, set_b: &PositionSet) -> bool {
    match (set_a.get(Point::Sun), set_b.get(Point::Sun)) {
        (Some(a), Some(b)) => a.sign().quality == b.sign().quality,
        _ => false,
    }
}

/// Scores cross aspects with a weight table.
#[derive(Debug, Clone, Copy, Default)]
pub struct RelationshipScorer;

impl RelationshipScorer {
    pub fn new() -> Self {
        Self
    }

    /// Sum the weights of the aspects in `cross` that the table covers.
    ///
    /// The from-point of each aspect takes its role from `roles_a` and the
    /// to-point from `roles_b`.
    pub fn compute_score(
        &self,
        cross: &AspectSet,
        roles_a: &PointRoles,
        roles_b: &PointRoles,
        table: &WeightTable,
    ) -> Result<RelationshipScore> {
        if cross.kind != AspectSetKind::Cross {
            return Err(EngineError::invalid(format!(
                "relationship score needs cross aspects, got {:?} set {}",
                cross.kind, cross.id
            )));
        }
        let index = table.index()?;

        let mut value = 0.0;
        let mut contributions = Vec::new();
        for aspect in cross.iter() {
            let (Some(role_a), Some(role_b)) = (
                roles_a.role_of(aspect.from.point),
                roles_b.role_of(aspect.to.point),
            ) else {
                continue;
            };
            let Some(rule) = index.get(&RuleKey::new(role_a, role_b, aspect.kind())) else {
                continue;
            };
            let weight = rule.weight_for(aspect.orb());
            value += weight;
            contributions.push(ScoreContribution {
                aspect: aspect.clone(),
                weight,
            });
        }

        Ok(RelationshipScore {
            value,
            band: ScoreBand::for_value(value),
            destiny_sign: false,
            contributions,
        })
    }
}
