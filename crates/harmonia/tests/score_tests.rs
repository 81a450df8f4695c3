use harmonia::aspects::{AspectCalculator, AspectConfig, AspectKind, AspectSet};
use harmonia::ephemeris::{ChartConfig, PointPosition, PositionSet};
use harmonia::score::{
    PointRoles, RelationshipScorer, Role, ScoreBand, WeightRule, WeightTable,
};
use harmonia::{EngineError, Point};

fn set(name: &str, points: Vec<PointPosition>) -> PositionSet {
    PositionSet::new(name, ChartConfig::default(), points, None).unwrap()
}

fn cross(a: &PositionSet, b: &PositionSet) -> AspectSet {
    AspectCalculator::new()
        .cross_aspects(a, b, &AspectConfig::default())
        .unwrap()
}

fn score(aspects: &AspectSet, table: &WeightTable) -> f64 {
    let roles = PointRoles::standard();
    RelationshipScorer::new()
        .compute_score(aspects, &roles, &roles, table)
        .unwrap()
        .value
}

#[test]
fn test_tight_sun_conjunction_scores_eleven() {
    let a = set("Alice", vec![PointPosition::new(Point::Sun, 10.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Sun, 11.0)]);

    let result = RelationshipScorer::new()
        .compute_score(
            &cross(&a, &b),
            &PointRoles::standard(),
            &PointRoles::standard(),
            &WeightTable::discepolo(),
        )
        .unwrap();

    assert_eq!(result.value, 11.0);
    assert_eq!(result.band, ScoreBand::Important);
    assert!(!result.destiny_sign);
    assert_eq!(result.contributions.len(), 1);
    assert_eq!(result.contributions[0].weight, 11.0);
}

#[test]
fn test_wide_sun_conjunction_scores_eight() {
    let a = set("Alice", vec![PointPosition::new(Point::Sun, 10.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Sun, 15.0)]);
    assert_eq!(score(&cross(&a, &b), &WeightTable::discepolo()), 8.0);
}

#[test]
fn test_mixed_aspects_sum() {
    let a = set(
        "Alice",
        vec![
            PointPosition::new(Point::Sun, 10.0),
            PointPosition::new(Point::Venus, 100.0),
        ],
    );
    let b = set(
        "Bob",
        vec![
            PointPosition::new(Point::Sun, 11.0),
            PointPosition::new(Point::Mars, 220.0),
        ],
    );
    let aspects = cross(&a, &b);
    // Venus square Sun is an aspect but carries no weight
    assert!(aspects.find(Point::Venus, Point::Sun).is_some());

    let result = RelationshipScorer::new()
        .compute_score(
            &aspects,
            &PointRoles::standard(),
            &PointRoles::standard(),
            &WeightTable::discepolo(),
        )
        .unwrap();
    assert_eq!(result.value, 15.0);
    assert_eq!(result.band, ScoreBand::VeryImportant);
    assert_eq!(result.contributions.len(), 2);
}

#[test]
fn test_role_pairs_are_unordered() {
    let venus = set("Alice", vec![PointPosition::new(Point::Venus, 0.0)]);
    let mars = set("Bob", vec![PointPosition::new(Point::Mars, 120.0)]);
    let table = WeightTable::discepolo();

    assert_eq!(score(&cross(&venus, &mars), &table), 4.0);

    let mars_first = set("Alice", vec![PointPosition::new(Point::Mars, 0.0)]);
    let venus_second = set("Bob", vec![PointPosition::new(Point::Venus, 120.0)]);
    assert_eq!(score(&cross(&mars_first, &venus_second), &table), 4.0);
}

#[test]
fn test_roles_looked_up_per_subject() {
    let a = set("Alice", vec![PointPosition::new(Point::Sun, 0.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Moon, 0.0)]);
    let aspects = cross(&a, &b);

    // Without a role for Bob's Moon the Sun-Moon conjunction is not scored
    let roles_b = PointRoles::standard().without(Point::Moon);
    let result = RelationshipScorer::new()
        .compute_score(
            &aspects,
            &PointRoles::standard(),
            &roles_b,
            &WeightTable::discepolo(),
        )
        .unwrap();
    assert_eq!(result.value, 0.0);
}

#[test]
fn test_no_matching_aspects_is_minimal() {
    let a = set("Alice", vec![PointPosition::new(Point::Jupiter, 0.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Saturn, 0.5)]);
    let result = RelationshipScorer::new()
        .compute_score(
            &cross(&a, &b),
            &PointRoles::standard(),
            &PointRoles::standard(),
            &WeightTable::discepolo(),
        )
        .unwrap();
    assert_eq!(result.value, 0.0);
    assert_eq!(result.band, ScoreBand::Minimal);
    assert!(result.contributions.is_empty());
}

#[test]
fn test_score_of_exactly_ten_is_important() {
    let table = WeightTable {
        rules: vec![WeightRule::new(
            Role::Sun,
            Role::Sun,
            AspectKind::Conjunction,
            10.0,
        )],
        destiny_sign_bonus: 5.0,
    };
    let a = set("Alice", vec![PointPosition::new(Point::Sun, 10.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Sun, 11.0)]);
    let roles = PointRoles::standard();

    let result = RelationshipScorer::new()
        .compute_score(&cross(&a, &b), &roles, &roles, &table)
        .unwrap();
    assert_eq!(result.value, 10.0);
    assert_eq!(result.band, ScoreBand::Important);
}

#[test]
fn test_adding_aspects_never_lowers_score() {
    let table = WeightTable::discepolo();
    let a = set(
        "Alice",
        vec![
            PointPosition::new(Point::Sun, 10.0),
            PointPosition::new(Point::Moon, 130.0),
        ],
    );
    let b_small = set("Bob", vec![PointPosition::new(Point::Sun, 70.0)]);
    let b_large = set(
        "Bob",
        vec![
            PointPosition::new(Point::Sun, 70.0),
            PointPosition::new(Point::Ascendant, 250.0),
            PointPosition::new(Point::Mars, 190.0),
        ],
    );

    let small = score(&cross(&a, &b_small), &table);
    let large = score(&cross(&a, &b_large), &table);
    assert!(small > 0.0);
    assert!(large >= small);
}

#[test]
fn test_empty_table_rejected() {
    let table = WeightTable {
        rules: Vec::new(),
        destiny_sign_bonus: 5.0,
    };
    let a = set("Alice", vec![PointPosition::new(Point::Sun, 10.0)]);
    let b = set("Bob", vec![PointPosition::new(Point::Sun, 11.0)]);
    let roles = PointRoles::standard();

    let result = RelationshipScorer::new().compute_score(&cross(&a, &b), &roles, &roles, &table);
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}

#[test]
fn test_invalid_weights_rejected() {
    let duplicate = WeightTable::discepolo().with_rule(WeightRule::new(
        Role::Sun,
        Role::Sun,
        AspectKind::Trine,
        1.0,
    ));
    assert!(matches!(duplicate.validate(), Err(EngineError::InvalidInput(_))));

    let negative = WeightTable {
        rules: vec![WeightRule::new(Role::Moon, Role::Moon, AspectKind::Trine, -1.0)],
        destiny_sign_bonus: 5.0,
    };
    assert!(matches!(negative.validate(), Err(EngineError::InvalidInput(_))));

    let not_finite = WeightTable::discepolo().with_destiny_sign_bonus(f64::NAN);
    assert!(matches!(not_finite.validate(), Err(EngineError::InvalidInput(_))));
}

#[test]
fn test_natal_set_rejected() {
    let a = set(
        "Alice",
        vec![
            PointPosition::new(Point::Sun, 10.0),
            PointPosition::new(Point::Moon, 10.0),
        ],
    );
    let natal = AspectCalculator::new()
        .self_aspects(&a, &AspectConfig::default())
        .unwrap();
    let roles = PointRoles::standard();
    let result =
        RelationshipScorer::new().compute_score(&natal, &roles, &roles, &WeightTable::discepolo());
    assert!(matches!(result, Err(EngineError::InvalidInput(_))));
}
