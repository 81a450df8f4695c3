pub mod houses;
pub mod precomputed;
pub mod provider;
pub mod types;

pub use houses::GeometricHouses;
pub use precomputed::PrecomputedEphemeris;
pub use provider::{
    EphemerisError, EphemerisProvider, EphemerisRequest, Geocoder, HouseCalculator, HouseRequest,
    LookupError,
};
pub use types::{
    greenwich, ChartConfig, ChartMoment, GeoLocation, HouseCusps, HouseSystem, Perspective,
    PointPosition, PositionSet, ResolvedPlace, SiderealMode, ZodiacType,
};
