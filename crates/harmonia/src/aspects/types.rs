use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::{EngineError, Result};
use crate::points::Point;

/// Named angular relationships, in table order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectKind {
    Conjunction,
    SemiSextile,
    SemiSquare,
    Sextile,
    Quintile,
    Square,
    Trine,
    Sesquiquadrate,
    Biquintile,
    Quincunx,
    Opposition,
}

// (kind, exact angle, default orb, major)
const ASPECT_TABLE: &[(AspectKind, f64, f64, bool)] = &[
    (AspectKind::Conjunction, 0.0, 10.0, true),
    (AspectKind::SemiSextile, 30.0, 1.0, false),
    (AspectKind::SemiSquare, 45.0, 1.0, false),
    (AspectKind::Sextile, 60.0, 6.0, true),
    (AspectKind::Quintile, 72.0, 1.0, false),
    (AspectKind::Square, 90.0, 5.0, true),
    (AspectKind::Trine, 120.0, 8.0, true),
    (AspectKind::Sesquiquadrate, 135.0, 1.0, false),
    (AspectKind::Biquintile, 144.0, 1.0, false),
    (AspectKind::Quincunx, 150.0, 1.0, false),
    (AspectKind::Opposition, 180.0, 10.0, true),
];

impl AspectKind {
    pub const MAJOR: [AspectKind; 5] = [
        AspectKind::Conjunction,
        AspectKind::Sextile,
        AspectKind::Square,
        AspectKind::Trine,
        AspectKind::Opposition,
    ];

    fn entry(&self) -> (AspectKind, f64, f64, bool) {
        ASPECT_TABLE
            .iter()
            .copied()
            .find(|(kind, _, _, _)| kind == self)
            .unwrap_or((*self, 0.0, 0.0, false))
    }

    /// Exact angle for this aspect
    pub fn exact_angle(&self) -> f64 {
        self.entry().1
    }

    pub fn default_orb(&self) -> f64 {
        self.entry().2
    }

    pub fn is_major(&self) -> bool {
        self.entry().3
    }

    pub fn all() -> impl Iterator<Item = AspectKind> {
        ASPECT_TABLE.iter().map(|(kind, _, _, _)| *kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AspectKind::Conjunction => "conjunction",
            AspectKind::SemiSextile => "semi_sextile",
            AspectKind::SemiSquare => "semi_square",
            AspectKind::Sextile => "sextile",
            AspectKind::Quintile => "quintile",
            AspectKind::Square => "square",
            AspectKind::Trine => "trine",
            AspectKind::Sesquiquadrate => "sesquiquadrate",
            AspectKind::Biquintile => "biquintile",
            AspectKind::Quincunx => "quincunx",
            AspectKind::Opposition => "opposition",
        }
    }
}

impl fmt::Display for AspectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of the active aspect table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectDefinition {
    pub kind: AspectKind,
    pub exact_angle: f64,
    /// Maximum allowed deviation from `exact_angle`
    pub orb: f64,
}

impl AspectDefinition {
    pub fn new(kind: AspectKind) -> Self {
        Self {
            kind,
            exact_angle: kind.exact_angle(),
            orb: kind.default_orb(),
        }
    }

    pub fn with_orb(kind: AspectKind, orb: f64) -> Self {
        Self {
            orb,
            ..Self::new(kind)
        }
    }
}

/// Which aspect families are active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectSelection {
    #[default]
    Major,
    MajorAndMinor,
}

/// Whether an aspect is tightening toward or loosening from exactness.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectMotion {
    Applying,
    Separating,
    /// At least one of the two speeds is unknown
    Undetermined,
}

/// Core aspect information
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AspectCore {
    pub kind: AspectKind,
    /// Exact angle for this aspect (0, 60, 90, 120, 180, ...)
    pub exact_angle: f64,
    /// Circular distance between the two points, 0-180
    pub distance: f64,
    /// Signed deviation from the exact angle (distance - exact_angle)
    pub orb: f64,
    pub motion: AspectMotion,
    /// Whether the aspect is exact (within 0.1 degrees)
    pub is_exact: bool,
    /// Whether either point is retrograde
    pub is_retrograde: bool,
}

/// Reference to a point in an aspect
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AspectPointRef {
    pub subject: String,
    pub point: Point,
}

/// An aspect between two points
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Aspect {
    pub from: AspectPointRef,
    pub to: AspectPointRef,
    #[serde(flatten)]
    pub core: AspectCore,
}

impl Aspect {
    pub fn kind(&self) -> AspectKind {
        self.core.kind
    }

    pub fn orb(&self) -> f64 {
        self.core.orb
    }

    /// Whether this aspect joins `a` and `b`, in either direction.
    pub fn joins(&self, a: Point, b: Point) -> bool {
        (self.from.point == a && self.to.point == b) || (self.from.point == b && self.to.point == a)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AspectSetKind {
    /// Aspects among the points of one position set
    Natal,
    /// Aspects between the points of two position sets
    Cross,
}

/// A set of aspects (natal or cross)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectSet {
    pub id: String,
    pub label: String,
    pub kind: AspectSetKind,
    pub subjects: Vec<String>,
    pub aspects: Vec<Aspect>,
}

impl AspectSet {
    pub fn len(&self) -> usize {
        self.aspects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aspects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Aspect> {
        self.aspects.iter()
    }

    pub fn find(&self, a: Point, b: Point) -> Option<&Aspect> {
        self.aspects.iter().find(|aspect| aspect.joins(a, b))
    }
}

/// Settings for aspect calculations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectConfig {
    /// Points that take part; ignored for explicitly requested pairs
    pub active_points: Vec<Point>,
    /// Active aspect definitions, in match order
    pub definitions: Vec<AspectDefinition>,
    /// Evaluate only these pairs when non-empty
    #[serde(default)]
    pub requested_pairs: Vec<(Point, Point)>,
    /// Tighter orb for aspects that involve an angle
    #[serde(default)]
    pub angle_orb: Option<f64>,
}

impl Default for AspectConfig {
    fn default() -> Self {
        Self::for_selection(AspectSelection::Major)
    }
}

impl AspectConfig {
    pub fn for_selection(selection: AspectSelection) -> Self {
        let definitions = AspectKind::all()
            .filter(|kind| selection == AspectSelection::MajorAndMinor || kind.is_major())
            .map(AspectDefinition::new)
            .collect();
        Self {
            active_points: Point::default_active(),
            definitions,
            requested_pairs: Vec::new(),
            angle_orb: None,
        }
    }

    pub fn major() -> Self {
        Self::for_selection(AspectSelection::Major)
    }

    pub fn major_and_minor() -> Self {
        Self::for_selection(AspectSelection::MajorAndMinor)
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.active_points = points;
        self
    }

    /// Override the orb of one aspect kind, adding the definition if absent.
    pub fn with_orb(mut self, kind: AspectKind, orb: f64) -> Self {
        match self.definitions.iter_mut().find(|d| d.kind == kind) {
            Some(definition) => definition.orb = orb,
            None => self.definitions.push(AspectDefinition::with_orb(kind, orb)),
        }
        self
    }

    /// Cap every minor aspect orb at `cap`.
    pub fn with_minor_orb_cap(mut self, cap: f64) -> Self {
        for definition in self.definitions.iter_mut().filter(|d| !d.kind.is_major()) {
            definition.orb = definition.orb.min(cap);
        }
        self
    }

    pub fn with_requested_pairs(mut self, pairs: Vec<(Point, Point)>) -> Self {
        self.requested_pairs = pairs;
        self
    }

    pub fn with_angle_orb(mut self, orb: f64) -> Self {
        self.angle_orb = Some(orb);
        self
    }

    /// Largest orb among the active definitions.
    pub fn max_orb(&self) -> f64 {
        self.definitions.iter().map(|d| d.orb).fold(0.0, f64::max)
    }

    pub fn validate(&self) -> Result<()> {
        let mut seen = BTreeSet::new();
        for definition in &self.definitions {
            if !definition.orb.is_finite() || definition.orb < 0.0 {
                return Err(EngineError::invalid(format!(
                    "orb for {} must be a non-negative number, got {}",
                    definition.kind, definition.orb
                )));
            }
            if !definition.exact_angle.is_finite()
                || !(0.0..=180.0).contains(&definition.exact_angle)
            {
                return Err(EngineError::invalid(format!(
                    "exact angle for {} must lie in 0-180, got {}",
                    definition.kind, definition.exact_angle
                )));
            }
            if !seen.insert(definition.kind) {
                return Err(EngineError::invalid(format!(
                    "aspect {} defined more than once",
                    definition.kind
                )));
            }
        }
        if let Some(orb) = self.angle_orb {
            if !orb.is_finite() || orb < 0.0 {
                return Err(EngineError::invalid(format!(
                    "angle orb must be a non-negative number, got {}",
                    orb
                )));
            }
        }
        Ok(())
    }
}
