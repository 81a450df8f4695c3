use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::aspects::types::AspectKind;
use crate::error::{EngineError, Result};
use crate::points::Point;

/// Scoring role a point plays in a relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    /// Uranus, Neptune and Pluto
    Outer,
    Node,
    Ascendant,
    Midheaven,
    /// Descendant and Imum Coeli
    Angle,
    /// Chiron, Lilith
    Minor,
}

/// Assignment of scoring roles to points for one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointRoles(BTreeMap<Point, Role>);

impl Default for PointRoles {
    fn default() -> Self {
        Self::standard()
    }
}

impl PointRoles {
    /// Each point plays the role that shares its name.
    pub fn standard() -> Self {
        let roles = Point::ALL
            .iter()
            .map(|&point| {
                let role = match point {
                    Point::Sun => Role::Sun,
                    Point::Moon => Role::Moon,
                    Point::Mercury => Role::Mercury,
                    Point::Venus => Role::Venus,
                    Point::Mars => Role::Mars,
                    Point::Jupiter => Role::Jupiter,
                    Point::Saturn => Role::Saturn,
                    Point::Uranus | Point::Neptune | Point::Pluto => Role::Outer,
                    Point::MeanNorthNode
                    | Point::TrueNorthNode
                    | Point::MeanSouthNode
                    | Point::TrueSouthNode => Role::Node,
                    Point::Ascendant => Role::Ascendant,
                    Point::Midheaven => Role::Midheaven,
                    Point::Descendant | Point::ImumCoeli => Role::Angle,
                    Point::Chiron | Point::MeanLilith => Role::Minor,
                };
                (point, role)
            })
            .collect();
        Self(roles)
    }

    pub fn empty() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with_role(mut self, point: Point, role: Role) -> Self {
        self.0.insert(point, role);
        self
    }

    pub fn without(mut self, point: Point) -> Self {
        self.0.remove(&point);
        self
    }

    pub fn role_of(&self, point: Point) -> Option<Role> {
        self.0.get(&point).copied()
    }
}

/// Weight used instead of the base weight when the aspect is tight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TightOrbWeight {
    /// Largest |orb| that still counts as tight
    pub max_orb: f64,
    pub weight: f64,
}

/// Weight for one (role, role, aspect) combination. Role pairs are unordered.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeightRule {
    pub first: Role,
    pub second: Role,
    pub aspect: AspectKind,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tight: Option<TightOrbWeight>,
}

impl WeightRule {
    pub fn new(first: Role, second: Role, aspect: AspectKind, weight: f64) -> Self {
        Self {
            first,
            second,
            aspect,
            weight,
            tight: None,
        }
    }

    pub fn with_tight(mut self, max_orb: f64, weight: f64) -> Self {
        self.tight = Some(TightOrbWeight { max_orb, weight });
        self
    }

    fn key(&self) -> RuleKey {
        RuleKey::new(self.first, self.second, self.aspect)
    }

    /// Weight of an aspect matched by this rule with signed deviation `orb`.
    pub fn weight_for(&self, orb: f64) -> f64 {
        match self.tight {
            Some(tight) if orb.abs() <= tight.max_orb => tight.weight,
            _ => self.weight,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct RuleKey(Role, Role, AspectKind);

impl RuleKey {
    pub(crate) fn new(a: Role, b: Role, aspect: AspectKind) -> Self {
        if a <= b {
            Self(a, b, aspect)
        } else {
            Self(b, a, aspect)
        }
    }
}

/// Ciro Discepolo destiny-sign bonus
pub const DESTINY_SIGN_BONUS: f64 = 5.0;

/// Weights for relationship aspects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightTable {
    pub rules: Vec<WeightRule>,
    #[serde(default = "default_destiny_sign_bonus")]
    pub destiny_sign_bonus: f64,
}

fn default_destiny_sign_bonus() -> f64 {
    DESTINY_SIGN_BONUS
}

impl Default for WeightTable {
    fn default() -> Self {
        Self::discepolo()
    }
}

impl WeightTable {
    /// The Ciro Discepolo weighting.
    pub fn discepolo() -> Self {
        use AspectKind::*;

        let mut rules = Vec::new();
        for aspect in [Conjunction, Opposition, Square] {
            rules.push(WeightRule::new(Role::Sun, Role::Sun, aspect, 8.0).with_tight(2.0, 11.0));
        }
        for aspect in [Trine, Sextile] {
            rules.push(WeightRule::new(Role::Sun, Role::Sun, aspect, 4.0));
        }
        rules.push(WeightRule::new(Role::Sun, Role::Moon, Conjunction, 8.0).with_tight(2.0, 11.0));
        for aspect in [Opposition, Square, Trine, Sextile] {
            rules.push(WeightRule::new(Role::Sun, Role::Moon, aspect, 4.0));
        }
        for (first, second) in [
            (Role::Sun, Role::Ascendant),
            (Role::Moon, Role::Ascendant),
            (Role::Venus, Role::Mars),
        ] {
            for aspect in AspectKind::MAJOR {
                rules.push(WeightRule::new(first, second, aspect, 4.0));
            }
        }

        Self {
            rules,
            destiny_sign_bonus: DESTINY_SIGN_BONUS,
        }
    }

    pub fn with_rule(mut self, rule: WeightRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn with_destiny_sign_bonus(mut self, bonus: f64) -> Self {
        self.destiny_sign_bonus = bonus;
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.index().map(|_| ())
    }

    /// Index the rules by unordered role pair and aspect kind.
    pub(crate) fn index(&self) -> Result<BTreeMap<RuleKey, &WeightRule>> {
        if self.rules.is_empty() {
            return Err(EngineError::invalid("weight table has no rules"));
        }
        if !is_valid_weight(self.destiny_sign_bonus) {
            return Err(EngineError::invalid(format!(
                "destiny sign bonus must be a non-negative number, got {}",
                self.destiny_sign_bonus
            )));
        }

        let mut index = BTreeMap::new();
        for rule in &self.rules {
            let tight_ok = rule
                .tight
                .map_or(true, |t| is_valid_weight(t.weight) && is_valid_weight(t.max_orb));
            if !is_valid_weight(rule.weight) || !tight_ok {
                return Err(EngineError::invalid(format!(
                    "weight for {:?}-{:?} {} must be a non-negative number",
                    rule.first, rule.second, rule.aspect
                )));
            }
            if index.insert(rule.key(), rule).is_some() {
                return Err(EngineError::invalid(format!(
                    "weight for {:?}-{:?} {} defined more than once",
                    rule.first, rule.second, rule.aspect
                )));
            }
        }
        Ok(index)
    }
}

fn is_valid_weight(value: f64) -> bool {
    value.is_finite() && value >= 0.0
}
