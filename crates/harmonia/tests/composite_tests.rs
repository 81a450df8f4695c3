use chrono::NaiveDate;
use harmonia::angles::lies_on_shorter_arc;
use harmonia::ephemeris::{
    ChartConfig, ChartMoment, EphemerisError, GeoLocation, GeometricHouses, HouseCalculator,
    HouseCusps, HouseRequest, HouseSystem, PointPosition, PositionSet, ResolvedPlace,
};
use harmonia::{CompositeCalculator, EngineError, Point};
use std::sync::Mutex;

fn set(name: &str, config: ChartConfig, points: Vec<PointPosition>) -> PositionSet {
    PositionSet::new(name, config, points, None).unwrap()
}

fn equal_houses() -> ChartConfig {
    ChartConfig {
        house_system: HouseSystem::Equal,
        ..ChartConfig::default()
    }
}

fn moment(lat: f64) -> ChartMoment {
    ChartMoment {
        local: NaiveDate::from_ymd_opt(2000, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap(),
        place: ResolvedPlace {
            location: GeoLocation { lat, lon: 0.0 },
            timezone: "UTC".to_string(),
        },
    }
}

#[test]
fn test_composite_is_symmetric() {
    let calculator = CompositeCalculator::new();
    let a = set(
        "Alice",
        equal_houses(),
        vec![
            PointPosition::new(Point::Sun, 10.0).with_lat(1.0),
            PointPosition::new(Point::Moon, 100.0),
            PointPosition::new(Point::Mars, 200.0).with_speed(0.5),
        ],
    );
    let b = set(
        "Bob",
        equal_houses(),
        vec![
            PointPosition::new(Point::Sun, 350.0).with_lat(-3.0),
            PointPosition::new(Point::Moon, 280.0),
            PointPosition::new(Point::Mars, 140.0).with_speed(0.7),
        ],
    );

    let ab = calculator.compute_composite(&a, &b, &GeometricHouses).unwrap();
    let ba = calculator.compute_composite(&b, &a, &GeometricHouses).unwrap();

    for point in [Point::Sun, Point::Moon, Point::Mars] {
        assert_eq!(ab.get(point).unwrap().lon, ba.get(point).unwrap().lon);
        assert_eq!(ab.get(point).unwrap().lat, ba.get(point).unwrap().lat);
    }
    assert_eq!(ab.get(Point::Sun).unwrap().lon, 0.0);
    assert_eq!(ab.get(Point::Sun).unwrap().lat, -1.0);
    // exactly opposite Moons resolve the same way in either order
    assert_eq!(ab.get(Point::Moon).unwrap().lon, 190.0);
    assert_eq!(ab.get(Point::Mars).unwrap().lon, 170.0);
}

#[test]
fn test_composite_midpoints_on_shorter_arc() {
    let calculator = CompositeCalculator::new();
    let pairs = [(5.0, 355.0), (40.0, 170.0), (300.0, 20.0), (90.0, 91.0)];
    for (lon_a, lon_b) in pairs {
        let a = set("A", equal_houses(), vec![PointPosition::new(Point::Venus, lon_a)]);
        let b = set("B", equal_houses(), vec![PointPosition::new(Point::Venus, lon_b)]);
        let composite = calculator.compute_composite(&a, &b, &GeometricHouses).unwrap();
        let mid = composite.get(Point::Venus).unwrap().lon;
        assert!((0.0..360.0).contains(&mid));
        assert!(lies_on_shorter_arc(mid, lon_a, lon_b), "{} not between {} and {}", mid, lon_a, lon_b);
    }
}

#[test]
fn test_composite_omits_one_sided_points() {
    let calculator = CompositeCalculator::new();
    let a = set(
        "Alice",
        equal_houses(),
        vec![
            PointPosition::new(Point::Sun, 10.0),
            PointPosition::new(Point::Chiron, 50.0),
        ],
    );
    let b = set("Bob", equal_houses(), vec![PointPosition::new(Point::Sun, 30.0)]);

    let composite = calculator.compute_composite(&a, &b, &GeometricHouses).unwrap();
    assert_eq!(composite.len(), 1);
    assert!(!composite.contains(Point::Chiron));
    assert!(composite.houses().is_none());
    assert_eq!(composite.get(Point::Sun).unwrap().house, None);
}

#[test]
fn test_composite_rejects_mismatched_configs() {
    let calculator = CompositeCalculator::new();
    let a = set("Alice", equal_houses(), vec![PointPosition::new(Point::Sun, 10.0)]);
    let b = set("Bob", ChartConfig::default(), vec![PointPosition::new(Point::Sun, 30.0)]);

    let result = calculator.compute_composite(&a, &b, &GeometricHouses);
    assert!(matches!(result, Err(EngineError::Configuration(_))));
}

struct RecordingHouses {
    seen: Mutex<Vec<HouseRequest>>,
}

impl HouseCalculator for RecordingHouses {
    fn cusps(&self, request: &HouseRequest) -> Result<HouseCusps, EphemerisError> {
        self.seen.lock().unwrap().push(*request);
        GeometricHouses.cusps(&HouseRequest {
            system: HouseSystem::Equal,
            ..*request
        })
    }
}

#[test]
fn test_composite_houses_use_mean_latitude() {
    let calculator = CompositeCalculator::new();
    let angles = |asc: f64, mc: f64| {
        vec![
            PointPosition::new(Point::Ascendant, asc),
            PointPosition::new(Point::Midheaven, mc),
        ]
    };
    let a = set("Alice", ChartConfig::default(), angles(100.0, 10.0)).with_moment(moment(40.0));
    let b = set("Bob", ChartConfig::default(), angles(120.0, 30.0)).with_moment(moment(50.0));
    let houses = RecordingHouses {
        seen: Mutex::new(Vec::new()),
    };

    let composite = calculator.compute_composite(&a, &b, &houses).unwrap();

    let seen = houses.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].system, HouseSystem::Placidus);
    assert_eq!(seen[0].ascendant, 110.0);
    assert_eq!(seen[0].midheaven, 20.0);
    assert_eq!(seen[0].latitude, Some(45.0));
    assert_eq!(composite.houses().unwrap().cusp(1), Some(110.0));
    assert_eq!(composite.get(Point::Ascendant).unwrap().house, Some(1));
}
