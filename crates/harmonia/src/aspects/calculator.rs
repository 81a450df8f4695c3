use std::collections::BTreeSet;

use crate::angles::{circular_distance, signed_separation};
use crate::aspects::types::{
    Aspect, AspectConfig, AspectCore, AspectDefinition, AspectMotion, AspectPointRef, AspectSet,
    AspectSetKind,
};
use crate::ephemeris::types::{PointPosition, PositionSet};
use crate::error::{EngineError, Result};
use crate::points::Point;

/// Within this many degrees an aspect is reported as exact
const EXACT_THRESHOLD: f64 = 0.1;

/// Aspect calculator
#[derive(Debug, Clone, Copy, Default)]
pub struct AspectCalculator;

impl AspectCalculator {
    /// Create a new aspect calculator
    pub fn new() -> Self {
        Self
    }

    /// Compute aspects between two position sets.
    ///
    /// Passing the same set twice computes its natal self-aspects.
    pub fn compute_aspects(
        &self,
        set_a: &PositionSet,
        set_b: &PositionSet,
        config: &AspectConfig,
    ) -> Result<AspectSet> {
        if std::ptr::eq(set_a, set_b) {
            self.self_aspects(set_a, config)
        } else {
            self.cross_aspects(set_a, set_b, config)
        }
    }

    /// Compute aspects within a single position set
    pub fn self_aspects(&self, set: &PositionSet, config: &AspectConfig) -> Result<AspectSet> {
        config.validate()?;

        let pairs: Vec<(&PointPosition, &PointPosition)> = if config.requested_pairs.is_empty() {
            let positions = active_positions(set, config);
            let mut pairs = Vec::new();
            for i in 0..positions.len() {
                for j in (i + 1)..positions.len() {
                    let (p, q) = (positions[i], positions[j]);
                    // Asc/Dsc, MC/IC and a node with its own south node are
                    // opposite by construction
                    if p.point.fixed_opposite() == Some(q.point) {
                        continue;
                    }
                    pairs.push((p, q));
                }
            }
            pairs
        } else {
            let mut seen = BTreeSet::new();
            let mut pairs = Vec::new();
            for &(p, q) in &config.requested_pairs {
                if p == q {
                    return Err(EngineError::invalid(format!(
                        "requested pair joins {} with itself",
                        p
                    )));
                }
                let key = if p < q { (p, q) } else { (q, p) };
                let pos_p = require(set, p)?;
                let pos_q = require(set, q)?;
                if seen.insert(key) {
                    pairs.push((pos_p, pos_q));
                }
            }
            pairs
        };

        let subject = set.subject();
        let aspects = pairs
            .into_iter()
            .filter_map(|(p, q)| self.aspect_between(subject, p, subject, q, config))
            .collect();

        Ok(AspectSet {
            id: subject.to_string(),
            label: format!("{} Aspects", subject),
            kind: AspectSetKind::Natal,
            subjects: vec![subject.to_string()],
            aspects,
        })
    }

    /// Compute aspects between the points of two position sets
    pub fn cross_aspects(
        &self,
        set_a: &PositionSet,
        set_b: &PositionSet,
        config: &AspectConfig,
    ) -> Result<AspectSet> {
        config.validate()?;

        let pairs: Vec<(&PointPosition, &PointPosition)> = if config.requested_pairs.is_empty() {
            let positions_a = active_positions(set_a, config);
            let positions_b = active_positions(set_b, config);
            positions_a
                .iter()
                .flat_map(|p| positions_b.iter().map(move |q| (*p, *q)))
                .collect()
        } else {
            let mut seen = BTreeSet::new();
            let mut pairs = Vec::new();
            for &(p, q) in &config.requested_pairs {
                let pos_p = require(set_a, p)?;
                let pos_q = require(set_b, q)?;
                if seen.insert((p, q)) {
                    pairs.push((pos_p, pos_q));
                }
            }
            pairs
        };

        let (subject_a, subject_b) = (set_a.subject(), set_b.subject());
        let aspects = pairs
            .into_iter()
            .filter_map(|(p, q)| self.aspect_between(subject_a, p, subject_b, q, config))
            .collect();

        Ok(AspectSet {
            id: format!("{}:{}", subject_a, subject_b),
            label: format!("{} / {} Aspects", subject_a, subject_b),
            kind: AspectSetKind::Cross,
            subjects: vec![subject_a.to_string(), subject_b.to_string()],
            aspects,
        })
    }

    fn aspect_between(
        &self,
        subject_p: &str,
        p: &PointPosition,
        subject_q: &str,
        q: &PointPosition,
        config: &AspectConfig,
    ) -> Option<Aspect> {
        let involves_angle = p.point.is_angle() || q.point.is_angle();
        let orb_cap = config.angle_orb.filter(|_| involves_angle);

        let core = self.calculate_aspect(p, q, &config.definitions, orb_cap)?;
        Some(Aspect {
            from: AspectPointRef {
                subject: subject_p.to_string(),
                point: p.point,
            },
            to: AspectPointRef {
                subject: subject_q.to_string(),
                point: q.point,
            },
            core,
        })
    }

    /// Match the circular distance between two points against the active
    /// definitions. The smallest deviation within orb wins; ties go to the
    /// earlier definition.
    pub fn calculate_aspect(
        &self,
        p: &PointPosition,
        q: &PointPosition,
        definitions: &[AspectDefinition],
        orb_cap: Option<f64>,
    ) -> Option<AspectCore> {
        let distance = circular_distance(p.lon, q.lon);

        let mut best: Option<(&AspectDefinition, f64)> = None;
        for definition in definitions {
            let orb = match orb_cap {
                Some(cap) => definition.orb.min(cap),
                None => definition.orb,
            };
            let deviation = (distance - definition.exact_angle).abs();
            if deviation > orb {
                continue;
            }
            if best.map_or(true, |(_, best_dev)| deviation < best_dev) {
                best = Some((definition, deviation));
            }
        }

        let (definition, deviation) = best?;
        let signed_orb = distance - definition.exact_angle;

        Some(AspectCore {
            kind: definition.kind,
            exact_angle: definition.exact_angle,
            distance,
            orb: signed_orb,
            motion: aspect_motion(p, q, signed_orb),
            is_exact: deviation < EXACT_THRESHOLD,
            is_retrograde: p.is_retrograde() || q.is_retrograde(),
        })
    }
}

/// Determine whether the deviation from exactness is shrinking.
///
/// The circular distance moves at the relative speed of the two points, with
/// its sign set by which point is ahead along the shorter arc. The aspect is
/// applying when that movement carries the distance toward the exact angle.
fn aspect_motion(p: &PointPosition, q: &PointPosition, signed_orb: f64) -> AspectMotion {
    let (Some(speed_p), Some(speed_q)) = (p.speed_lon, q.speed_lon) else {
        return AspectMotion::Undetermined;
    };
    if signed_orb == 0.0 {
        return AspectMotion::Separating;
    }

    let relative_speed = speed_p - speed_q;
    let separation = signed_separation(p.lon, q.lon);
    let distance_rate = if separation >= 0.0 {
        relative_speed
    } else {
        -relative_speed
    };
    let deviation_rate = signed_orb.signum() * distance_rate;

    if deviation_rate < 0.0 {
        AspectMotion::Applying
    } else {
        AspectMotion::Separating
    }
}

fn active_positions<'a>(set: &'a PositionSet, config: &AspectConfig) -> Vec<&'a PointPosition> {
    set.points()
        .filter(|pos| config.active_points.contains(&pos.point))
        .collect()
}

fn require(set: &PositionSet, point: Point) -> Result<&PointPosition> {
    set.get(point).ok_or_else(|| {
        EngineError::invalid(format!(
            "requested pair references {}, which is missing from the positions of {}",
            point,
            set.subject()
        ))
    })
}
