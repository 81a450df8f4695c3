use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::ephemeris::types::{ChartConfig, GeoLocation, ResolvedPlace};
use crate::error::{EngineError, Result};

/// Where a subject was born or an event took place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Place {
    /// Coordinates and timezone known up front
    Coordinates {
        latitude: f64,
        longitude: f64,
        timezone: String,
    },
    /// Resolved through the geocoder
    City { city: String, nation: String },
}

impl Place {
    pub fn coordinates(latitude: f64, longitude: f64, timezone: impl Into<String>) -> Self {
        Place::Coordinates {
            latitude,
            longitude,
            timezone: timezone.into(),
        }
    }

    pub fn city(city: impl Into<String>, nation: impl Into<String>) -> Self {
        Place::City {
            city: city.into(),
            nation: nation.into(),
        }
    }

    /// The resolved place when coordinates are given directly.
    pub fn resolved(&self) -> Result<Option<ResolvedPlace>> {
        match self {
            Place::Coordinates {
                latitude,
                longitude,
                timezone,
            } => {
                if !latitude.is_finite() || !(-90.0..=90.0).contains(latitude) {
                    return Err(EngineError::invalid(format!(
                        "latitude must lie in -90..90, got {}",
                        latitude
                    )));
                }
                if !longitude.is_finite() || !(-180.0..=180.0).contains(longitude) {
                    return Err(EngineError::invalid(format!(
                        "longitude must lie in -180..180, got {}",
                        longitude
                    )));
                }
                if timezone.trim().is_empty() {
                    return Err(EngineError::invalid("timezone must not be empty"));
                }
                Ok(Some(ResolvedPlace {
                    location: GeoLocation {
                        lat: *latitude,
                        lon: *longitude,
                    },
                    timezone: timezone.clone(),
                }))
            }
            Place::City { city, nation } => {
                if city.trim().is_empty() || nation.trim().is_empty() {
                    return Err(EngineError::invalid("city and nation must not be empty"));
                }
                Ok(None)
            }
        }
    }
}

/// A person or event a chart is cast for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub name: String,
    /// Local civil time at `place`
    pub local_datetime: NaiveDateTime,
    pub place: Place,
    #[serde(default)]
    pub config: ChartConfig,
}

impl Subject {
    pub fn new(name: impl Into<String>, local_datetime: NaiveDateTime, place: Place) -> Self {
        Self {
            name: name.into(),
            local_datetime,
            place,
            config: ChartConfig::default(),
        }
    }

    pub fn with_config(mut self, config: ChartConfig) -> Self {
        self.config = config;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(EngineError::invalid("subject name must not be empty"));
        }
        self.place.resolved()?;
        self.config.validate()
    }
}

/// The moment a transit chart is cast for.
///
/// Without a place the natal subject's place is used. The chart
/// configuration always comes from the natal subject.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransitMoment {
    pub local_datetime: NaiveDateTime,
    #[serde(default)]
    pub place: Option<Place>,
}

impl TransitMoment {
    pub fn new(local_datetime: NaiveDateTime) -> Self {
        Self {
            local_datetime,
            place: None,
        }
    }

    pub fn at(mut self, place: Place) -> Self {
        self.place = Some(place);
        self
    }

    /// The transit as a subject inheriting `natal`'s configuration.
    pub fn subject_for(&self, natal: &Subject) -> Subject {
        Subject {
            name: "Transit".to_string(),
            local_datetime: self.local_datetime,
            place: self.place.clone().unwrap_or_else(|| natal.place.clone()),
            config: natal.config,
        }
    }
}
