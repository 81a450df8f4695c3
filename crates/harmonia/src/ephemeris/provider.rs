use async_trait::async_trait;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ephemeris::types::{ChartConfig, HouseCusps, HouseSystem, PositionSet, ResolvedPlace};
use crate::points::Point;

/// Errors that can occur during ephemeris calculations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EphemerisError {
    #[error("Ephemeris file not found at path: {path}. {message}")]
    FileNotFound { path: String, message: String },
    #[error("Invalid ephemeris data: {message}")]
    InvalidData { message: String },
    #[error("Moment {moment} is outside the supported range: {message}")]
    OutOfRange { moment: String, message: String },
    #[error("No positions available for {subject} at {moment}")]
    NotAvailable { subject: String, moment: String },
    #[error("Unsupported configuration: {message}")]
    UnsupportedConfiguration { message: String },
    #[error("Unsupported house system: {system:?}. Supported systems: {supported:?}")]
    UnsupportedHouseSystem {
        system: HouseSystem,
        supported: Vec<HouseSystem>,
    },
    #[error("Failed to calculate position for {point}: {message}")]
    CalculationFailed { point: Point, message: String },
    #[error("House calculation failed: {message}")]
    HouseCalculationFailed { message: String },
}

/// Errors raised while resolving a place name to coordinates.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LookupError {
    #[error("No place found for city {city:?} in {nation:?}. The nation must be a country code (e.g. US, UK, FR, DE).")]
    NotFound { city: String, nation: String },
    #[error("Place lookup service unreachable: {message}")]
    Unreachable { message: String },
    #[error("No geocoding provider configured; supply coordinates directly")]
    NotConfigured,
}

/// Everything an ephemeris needs to produce one position set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EphemerisRequest {
    pub subject: String,
    /// Local civil time at `place`
    pub local: NaiveDateTime,
    pub place: ResolvedPlace,
    pub config: ChartConfig,
    /// Points to compute; empty means every point the provider supports
    pub points: Vec<Point>,
}

/// Source of planetary, node and angle positions.
#[async_trait]
pub trait EphemerisProvider: Send + Sync {
    async fn positions(&self, request: &EphemerisRequest) -> Result<PositionSet, EphemerisError>;
}

/// Resolves place names to coordinates and timezone.
///
/// Credentials for the lookup service belong to the implementation.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn resolve(&self, city: &str, nation: &str) -> Result<ResolvedPlace, LookupError>;
}

/// Inputs for deriving house cusps from chart angles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HouseRequest {
    pub system: HouseSystem,
    pub ascendant: f64,
    pub midheaven: f64,
    /// Geographic latitude, when one is meaningful for the chart
    pub latitude: Option<f64>,
}

/// Computes house cusps from the Ascendant and Midheaven.
pub trait HouseCalculator: Send + Sync {
    fn cusps(&self, request: &HouseRequest) -> Result<HouseCusps, EphemerisError>;
}
