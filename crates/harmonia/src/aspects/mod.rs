pub mod calculator;
pub mod types;

pub use calculator::AspectCalculator;
pub use types::{
    Aspect, AspectConfig, AspectCore, AspectDefinition, AspectKind, AspectMotion, AspectPointRef,
    AspectSelection, AspectSet, AspectSetKind,
};
