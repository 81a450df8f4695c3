//! Midpoint composite charts.

use crate::angles::circular_midpoint;
use crate::ephemeris::provider::{EphemerisError, HouseCalculator, HouseRequest};
use crate::ephemeris::types::{HouseCusps, PointPosition, PositionSet};
use crate::error::{EngineError, Result};
use crate::points::Point;

/// Builds a synthetic position set from the midpoints of two others.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompositeCalculator;

impl CompositeCalculator {
    pub fn new() -> Self {
        Self
    }

    /// Midpoint composite of `set_a` and `set_b`.
    ///
    /// Only points present in both sets appear in the result. Houses are
    /// recomputed from the midpoint Ascendant and Midheaven; without both the
    /// composite has none.
    pub fn compute_composite(
        &self,
        set_a: &PositionSet,
        set_b: &PositionSet,
        houses: &dyn HouseCalculator,
    ) -> Result<PositionSet> {
        if set_a.config() != set_b.config() {
            return Err(EngineError::configuration(format!(
                "composite of {} and {} needs matching chart configurations ({:?} vs {:?})",
                set_a.subject(),
                set_b.subject(),
                set_a.config(),
                set_b.config()
            )));
        }

        let mut points: Vec<PointPosition> = set_a
            .points()
            .filter_map(|a| set_b.get(a.point).map(|b| midpoint_position(a, b)))
            .collect();

        let cusps = match (
            find(&points, Point::Ascendant),
            find(&points, Point::Midheaven),
        ) {
            (Some(ascendant), Some(midheaven)) => {
                let request = HouseRequest {
                    system: set_a.config().house_system,
                    ascendant,
                    midheaven,
                    latitude: mean_latitude(set_a, set_b),
                };
                composite_cusps(set_a, set_b, houses, &request)?
            }
            _ => None,
        };

        if let Some(cusps) = &cusps {
            place_in_houses(&mut points, cusps);
        }

        let name = format!("{} and {} Composite Chart", set_a.subject(), set_b.subject());
        log::debug!("Composite {} holds {} points", name, points.len());
        PositionSet::new(name, *set_a.config(), points, cusps)
    }
}

/// House cusps for the composite. When the house backend does not support the
/// chart's system, the cusps fall back to the midpoints of both charts' cusps,
/// or to no houses when either chart has none.
fn composite_cusps(
    set_a: &PositionSet,
    set_b: &PositionSet,
    houses: &dyn HouseCalculator,
    request: &HouseRequest,
) -> Result<Option<HouseCusps>> {
    match houses.cusps(request) {
        Ok(cusps) => Ok(Some(cusps)),
        Err(EphemerisError::UnsupportedHouseSystem { system, .. }) => {
            match (set_a.houses(), set_b.houses()) {
                (Some(a), Some(b)) => {
                    log::debug!(
                        "{:?} houses unsupported, using midpoint cusps for {} and {}",
                        system,
                        set_a.subject(),
                        set_b.subject()
                    );
                    Ok(Some(midpoint_cusps(a, b)?))
                }
                _ => {
                    log::warn!(
                        "{:?} houses unsupported and {} or {} carries no cusps; composite has no houses",
                        system,
                        set_a.subject(),
                        set_b.subject()
                    );
                    Ok(None)
                }
            }
        }
        Err(source) => {
            log::warn!(
                "Composite houses for {} and {} failed: {}",
                set_a.subject(),
                set_b.subject(),
                source
            );
            Err(EngineError::Ephemeris {
                subject: format!("{} and {}", set_a.subject(), set_b.subject()),
                moment: composite_moment(set_a, set_b),
                source,
            })
        }
    }
}

fn midpoint_cusps(a: &HouseCusps, b: &HouseCusps) -> Result<HouseCusps> {
    let (a, b) = (a.as_array(), b.as_array());
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = circular_midpoint(a[i], b[i]);
    }
    HouseCusps::new(cusps)
}

fn composite_moment(set_a: &PositionSet, set_b: &PositionSet) -> String {
    let local = |set: &PositionSet| {
        set.moment()
            .map(|m| m.local.to_string())
            .unwrap_or_else(|| "unknown moment".to_string())
    };
    format!("{} / {}", local(set_a), local(set_b))
}

fn midpoint_position(a: &PointPosition, b: &PointPosition) -> PointPosition {
    PointPosition {
        point: a.point,
        lon: circular_midpoint(a.lon, b.lon),
        lat: (a.lat + b.lat) / 2.0,
        house: None,
        speed_lon: match (a.speed_lon, b.speed_lon) {
            (Some(sa), Some(sb)) => Some((sa + sb) / 2.0),
            _ => None,
        },
    }
}

fn find(points: &[PointPosition], point: Point) -> Option<f64> {
    points.iter().find(|p| p.point == point).map(|p| p.lon)
}

fn mean_latitude(set_a: &PositionSet, set_b: &PositionSet) -> Option<f64> {
    match (set_a.moment(), set_b.moment()) {
        (Some(a), Some(b)) => Some((a.place.location.lat + b.place.location.lat) / 2.0),
        _ => None,
    }
}

fn place_in_houses(points: &mut [PointPosition], cusps: &HouseCusps) {
    for position in points.iter_mut() {
        position.house = Some(cusps.house_of(position.lon));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ephemeris::houses::GeometricHouses;
    use crate::ephemeris::types::{ChartConfig, HouseSystem};

    fn set(name: &str, config: ChartConfig, points: Vec<PointPosition>) -> PositionSet {
        PositionSet::new(name, config, points, None).unwrap()
    }

    fn equal_houses() -> ChartConfig {
        ChartConfig {
            house_system: HouseSystem::Equal,
            ..ChartConfig::default()
        }
    }

    #[test]
    fn test_midpoint_across_zero() {
        let a = set("A", equal_houses(), vec![PointPosition::new(Point::Sun, 10.0)]);
        let b = set("B", equal_houses(), vec![PointPosition::new(Point::Sun, 350.0)]);
        let composite = CompositeCalculator::new()
            .compute_composite(&a, &b, &GeometricHouses)
            .unwrap();
        assert_eq!(composite.get(Point::Sun).unwrap().lon, 0.0);
        assert_eq!(composite.subject(), "A and B Composite Chart");
    }

    #[test]
    fn test_mean_speed_needs_both() {
        let a = set(
            "A",
            equal_houses(),
            vec![
                PointPosition::new(Point::Sun, 10.0).with_speed(1.0),
                PointPosition::new(Point::Moon, 10.0).with_speed(12.0),
            ],
        );
        let b = set(
            "B",
            equal_houses(),
            vec![
                PointPosition::new(Point::Sun, 20.0).with_speed(0.5),
                PointPosition::new(Point::Moon, 30.0),
            ],
        );
        let composite = CompositeCalculator::new()
            .compute_composite(&a, &b, &GeometricHouses)
            .unwrap();
        assert_eq!(composite.get(Point::Sun).unwrap().speed_lon, Some(0.75));
        assert_eq!(composite.get(Point::Moon).unwrap().speed_lon, None);
    }

    #[test]
    fn test_houses_follow_midpoint_angles() {
        let a = set(
            "A",
            equal_houses(),
            vec![
                PointPosition::new(Point::Ascendant, 0.0),
                PointPosition::new(Point::Midheaven, 270.0),
                PointPosition::new(Point::Sun, 40.0),
            ],
        );
        let b = set(
            "B",
            equal_houses(),
            vec![
                PointPosition::new(Point::Ascendant, 20.0),
                PointPosition::new(Point::Midheaven, 290.0),
                PointPosition::new(Point::Sun, 60.0),
            ],
        );
        let composite = CompositeCalculator::new()
            .compute_composite(&a, &b, &GeometricHouses)
            .unwrap();
        let houses = composite.houses().unwrap();
        assert_eq!(houses.cusp(1), Some(10.0));
        // Sun midpoint at 50 lies in the second equal house (40-70)
        assert_eq!(composite.get(Point::Sun).unwrap().house, Some(2));
    }

    fn angles() -> Vec<PointPosition> {
        vec![
            PointPosition::new(Point::Ascendant, 0.0),
            PointPosition::new(Point::Midheaven, 270.0),
        ]
    }

    fn with_houses(name: &str, start: f64) -> PositionSet {
        let mut cusps = [0.0; 12];
        for (i, cusp) in cusps.iter_mut().enumerate() {
            *cusp = start + 30.0 * i as f64;
        }
        PositionSet::new(
            name,
            ChartConfig::default(),
            angles(),
            Some(HouseCusps::new(cusps).unwrap()),
        )
        .unwrap()
    }

    #[test]
    fn test_unsupported_house_system_without_cusps_has_no_houses() {
        let a = set("A", ChartConfig::default(), angles());
        let b = set("B", ChartConfig::default(), angles());
        let composite = CompositeCalculator::new()
            .compute_composite(&a, &b, &GeometricHouses)
            .unwrap();
        assert!(composite.houses().is_none());
        assert_eq!(composite.get(Point::Ascendant).unwrap().house, None);
    }

    #[test]
    fn test_unsupported_house_system_uses_midpoint_cusps() {
        let a = with_houses("A", 0.0);
        let b = with_houses("B", 20.0);
        let composite = CompositeCalculator::new()
            .compute_composite(&a, &b, &GeometricHouses)
            .unwrap();
        let houses = composite.houses().unwrap();
        assert_eq!(houses.cusp(1), Some(10.0));
        assert_eq!(houses.cusp(12), Some(340.0));
        assert_eq!(composite.get(Point::Ascendant).unwrap().house, Some(12));
    }

    struct BrokenHouses;

    impl HouseCalculator for BrokenHouses {
        fn cusps(&self, _request: &HouseRequest) -> std::result::Result<HouseCusps, EphemerisError> {
            Err(EphemerisError::OutOfRange {
                moment: "2400-01-01".to_string(),
                message: "no tables".to_string(),
            })
        }
    }

    #[test]
    fn test_house_backend_failure_stays_retryable() {
        let a = set("A", equal_houses(), angles());
        let b = set("B", equal_houses(), angles());
        let err = CompositeCalculator::new()
            .compute_composite(&a, &b, &BrokenHouses)
            .unwrap_err();
        assert!(err.is_retryable());
        match err {
            EngineError::Ephemeris {
                subject, source, ..
            } => {
                assert_eq!(subject, "A and B");
                assert!(matches!(source, EphemerisError::OutOfRange { .. }));
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
