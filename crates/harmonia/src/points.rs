//! Celestial points known to the engine.
//!
//! The declaration order of [`Point`] is the canonical enumeration order used
//! for position sets and aspect pairs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Point {
    Sun,
    Moon,
    Mercury,
    Venus,
    Mars,
    Jupiter,
    Saturn,
    Uranus,
    Neptune,
    Pluto,
    MeanNorthNode,
    TrueNorthNode,
    MeanSouthNode,
    TrueSouthNode,
    Chiron,
    MeanLilith,
    Ascendant,
    Midheaven,
    Descendant,
    ImumCoeli,
}

/// Broad classification of a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointCategory {
    Luminary,
    Planet,
    Node,
    /// Minor bodies and calculated points (chiron, lilith).
    Asteroid,
    Angle,
}

// (point, id, aliases accepted when parsing)
const POINT_IDS: &[(Point, &str, &[&str])] = &[
    (Point::Sun, "sun", &[]),
    (Point::Moon, "moon", &[]),
    (Point::Mercury, "mercury", &[]),
    (Point::Venus, "venus", &[]),
    (Point::Mars, "mars", &[]),
    (Point::Jupiter, "jupiter", &[]),
    (Point::Saturn, "saturn", &[]),
    (Point::Uranus, "uranus", &[]),
    (Point::Neptune, "neptune", &[]),
    (Point::Pluto, "pluto", &[]),
    (Point::MeanNorthNode, "mean_north_node", &["mean_node"]),
    (Point::TrueNorthNode, "true_north_node", &["north_node", "true_node"]),
    (Point::MeanSouthNode, "mean_south_node", &[]),
    (Point::TrueSouthNode, "true_south_node", &["south_node"]),
    (Point::Chiron, "chiron", &[]),
    (Point::MeanLilith, "mean_lilith", &["lilith"]),
    (Point::Ascendant, "ascendant", &["asc"]),
    (Point::Midheaven, "midheaven", &["mc", "medium_coeli"]),
    (Point::Descendant, "descendant", &["dc", "dsc", "desc"]),
    (Point::ImumCoeli, "imum_coeli", &["ic"]),
];

impl Point {
    pub const ALL: [Point; 20] = [
        Point::Sun,
        Point::Moon,
        Point::Mercury,
        Point::Venus,
        Point::Mars,
        Point::Jupiter,
        Point::Saturn,
        Point::Uranus,
        Point::Neptune,
        Point::Pluto,
        Point::MeanNorthNode,
        Point::TrueNorthNode,
        Point::MeanSouthNode,
        Point::TrueSouthNode,
        Point::Chiron,
        Point::MeanLilith,
        Point::Ascendant,
        Point::Midheaven,
        Point::Descendant,
        Point::ImumCoeli,
    ];

    pub fn as_str(&self) -> &'static str {
        POINT_IDS
            .iter()
            .find(|(point, _, _)| point == self)
            .map(|(_, id, _)| *id)
            .unwrap_or("unknown")
    }

    pub fn category(&self) -> PointCategory {
        match self {
            Point::Sun | Point::Moon => PointCategory::Luminary,
            Point::Mercury
            | Point::Venus
            | Point::Mars
            | Point::Jupiter
            | Point::Saturn
            | Point::Uranus
            | Point::Neptune
            | Point::Pluto => PointCategory::Planet,
            Point::MeanNorthNode
            | Point::TrueNorthNode
            | Point::MeanSouthNode
            | Point::TrueSouthNode => PointCategory::Node,
            Point::Chiron | Point::MeanLilith => PointCategory::Asteroid,
            Point::Ascendant | Point::Midheaven | Point::Descendant | Point::ImumCoeli => {
                PointCategory::Angle
            }
        }
    }

    pub fn is_angle(&self) -> bool {
        self.category() == PointCategory::Angle
    }

    /// The point that always sits exactly opposite this one by construction.
    pub fn fixed_opposite(&self) -> Option<Point> {
        match self {
            Point::Ascendant => Some(Point::Descendant),
            Point::Descendant => Some(Point::Ascendant),
            Point::Midheaven => Some(Point::ImumCoeli),
            Point::ImumCoeli => Some(Point::Midheaven),
            Point::MeanNorthNode => Some(Point::MeanSouthNode),
            Point::MeanSouthNode => Some(Point::MeanNorthNode),
            Point::TrueNorthNode => Some(Point::TrueSouthNode),
            Point::TrueSouthNode => Some(Point::TrueNorthNode),
            _ => None,
        }
    }

    /// Points that take part in aspect calculations unless configured otherwise:
    /// everything except the asteroid category, with the mean lunar nodes only.
    pub fn default_active() -> Vec<Point> {
        Point::ALL
            .iter()
            .copied()
            .filter(|p| p.category() != PointCategory::Asteroid)
            .filter(|p| !matches!(p, Point::TrueNorthNode | Point::TrueSouthNode))
            .collect()
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Point {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s.trim().to_lowercase().replace(|c: char| c == '-' || c == ' ', "_");
        POINT_IDS
            .iter()
            .find(|(_, name, aliases)| *name == id || aliases.contains(&id.as_str()))
            .map(|(point, _, _)| *point)
            .ok_or_else(|| EngineError::invalid(format!("Unknown point: {}", s)))
    }
}
