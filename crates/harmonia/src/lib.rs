pub mod angles;
pub mod aspects;
pub mod chart;
pub mod composite;
pub mod ephemeris;
pub mod error;
pub mod points;
pub mod score;
pub mod zodiac;

pub use aspects::{
    Aspect, AspectCalculator, AspectConfig, AspectKind, AspectMotion, AspectSelection, AspectSet,
};
pub use chart::{ChartOrchestrator, EngineSettings, Place, Subject, TransitMoment};
pub use composite::CompositeCalculator;
pub use ephemeris::{
    ChartConfig, EphemerisProvider, GeometricHouses, PointPosition, PositionSet,
    PrecomputedEphemeris,
};
pub use error::{EngineError, Result};
pub use points::{Point, PointCategory};
pub use score::{RelationshipScore, RelationshipScorer, ScoreBand, WeightTable};
pub use zodiac::{Element, Quality, Sign, SignPosition};
