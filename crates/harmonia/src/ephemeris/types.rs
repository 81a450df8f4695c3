use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::angles::normalize_degrees;
use crate::error::{EngineError, Result};
use crate::points::{Point, PointCategory};
use crate::zodiac::SignPosition;

/// Geographic location coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub lat: f64,
    pub lon: f64,
}

/// A place with coordinates and the timezone used to interpret local times there.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedPlace {
    pub location: GeoLocation,
    pub timezone: String,
}

/// Greenwich, used for "current sky" charts.
pub fn greenwich() -> ResolvedPlace {
    ResolvedPlace {
        location: GeoLocation {
            lat: 51.477928,
            lon: -0.001545,
        },
        timezone: "GMT".to_string(),
    }
}

/// The local moment and place a position set was computed for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartMoment {
    pub local: NaiveDateTime,
    pub place: ResolvedPlace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacType {
    #[default]
    Tropical,
    Sidereal,
}

/// Ayanamsa used for sidereal charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiderealMode {
    Lahiri,
    FaganBradley,
    DeLuce,
    Raman,
    Krishnamurti,
    Yukteshwar,
    DjwhalKhul,
    TrueCitra,
    TrueRevati,
    Aryabhata,
    AryabhataMeanSun,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HouseSystem {
    #[default]
    Placidus,
    WholeSign,
    Koch,
    Equal,
    Regiomontanus,
    Campanus,
    Morinus,
    Porphyry,
}

/// House system mapping to the single-letter codes ephemeris backends use
const HOUSE_SYSTEM_CODES: &[(HouseSystem, u8)] = &[
    (HouseSystem::Placidus, b'P'),
    (HouseSystem::WholeSign, b'W'),
    (HouseSystem::Koch, b'K'),
    (HouseSystem::Equal, b'E'),
    (HouseSystem::Regiomontanus, b'R'),
    (HouseSystem::Campanus, b'C'),
    (HouseSystem::Morinus, b'M'),
    (HouseSystem::Porphyry, b'O'),
];

impl HouseSystem {
    pub fn code(&self) -> u8 {
        HOUSE_SYSTEM_CODES
            .iter()
            .find(|(system, _)| system == self)
            .map(|(_, code)| *code)
            .unwrap_or(b'P')
    }

    pub fn from_code(code: u8) -> Option<HouseSystem> {
        HOUSE_SYSTEM_CODES
            .iter()
            .find(|(_, c)| *c == code.to_ascii_uppercase())
            .map(|(system, _)| *system)
    }
}

/// Observer perspective the positions are computed from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Perspective {
    #[default]
    ApparentGeocentric,
    TrueGeocentric,
    Heliocentric,
    Topocentric,
}

/// Zodiac, house system and perspective a chart is derived with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub zodiac: ZodiacType,
    pub sidereal_mode: Option<SiderealMode>,
    pub house_system: HouseSystem,
    pub perspective: Perspective,
}

impl ChartConfig {
    pub fn sidereal(mode: SiderealMode) -> Self {
        Self {
            zodiac: ZodiacType::Sidereal,
            sidereal_mode: Some(mode),
            ..Self::default()
        }
    }

    /// Reject zodiac/sidereal-mode combinations no ephemeris can honor.
    pub fn validate(&self) -> Result<()> {
        match (self.zodiac, self.sidereal_mode) {
            (ZodiacType::Sidereal, None) => Err(EngineError::configuration(
                "sidereal zodiac requires a sidereal mode",
            )),
            (ZodiacType::Tropical, Some(mode)) => Err(EngineError::configuration(format!(
                "sidereal mode {:?} given for a tropical zodiac",
                mode
            ))),
            _ => Ok(()),
        }
    }
}

/// The twelve house cusp longitudes, house 1 first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<f64>", into = "Vec<f64>")]
pub struct HouseCusps([f64; 12]);

impl HouseCusps {
    pub fn new(cusps: [f64; 12]) -> Result<Self> {
        if let Some(bad) = cusps.iter().find(|c| !c.is_finite()) {
            return Err(EngineError::invalid(format!("house cusp is not finite: {}", bad)));
        }
        Ok(Self(cusps.map(normalize_degrees)))
    }

    /// Cusp longitude of `house` (1-12).
    pub fn cusp(&self, house: u8) -> Option<f64> {
        match house {
            1..=12 => Some(self.0[house as usize - 1]),
            _ => None,
        }
    }

    pub fn as_array(&self) -> &[f64; 12] {
        &self.0
    }

    /// House (1-12) containing `longitude`.
    ///
    /// A house runs from its cusp up to (not including) the next cusp, walking
    /// forward through the zodiac.
    pub fn house_of(&self, longitude: f64) -> u8 {
        let lon = normalize_degrees(longitude);
        for i in 0..12 {
            let start = self.0[i];
            let end = self.0[(i + 1) % 12];
            let span = normalize_degrees(end - start);
            if normalize_degrees(lon - start) < span {
                return i as u8 + 1;
            }
        }
        // Degenerate cusps (all equal) leave every longitude in the first house
        1
    }
}

impl TryFrom<Vec<f64>> for HouseCusps {
    type Error = EngineError;

    fn try_from(values: Vec<f64>) -> Result<Self> {
        let cusps: [f64; 12] = values.try_into().map_err(|v: Vec<f64>| {
            EngineError::invalid(format!("expected 12 house cusps, got {}", v.len()))
        })?;
        HouseCusps::new(cusps)
    }
}

impl From<HouseCusps> for Vec<f64> {
    fn from(cusps: HouseCusps) -> Self {
        cusps.0.to_vec()
    }
}

/// Position of one celestial point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointPosition {
    pub point: Point,
    /// Ecliptic longitude in degrees (0-360)
    pub lon: f64,
    /// Ecliptic latitude in degrees
    #[serde(default)]
    pub lat: f64,
    /// House placement (1-12), when houses are known
    #[serde(default)]
    pub house: Option<u8>,
    /// Speed in longitude (degrees per day); negative when retrograde
    #[serde(default)]
    pub speed_lon: Option<f64>,
}

impl PointPosition {
    pub fn new(point: Point, lon: f64) -> Self {
        Self {
            point,
            lon: normalize_degrees(lon),
            lat: 0.0,
            house: None,
            speed_lon: None,
        }
    }

    pub fn with_speed(mut self, speed_lon: f64) -> Self {
        self.speed_lon = Some(speed_lon);
        self
    }

    pub fn with_lat(mut self, lat: f64) -> Self {
        self.lat = lat;
        self
    }

    pub fn with_house(mut self, house: u8) -> Self {
        self.house = Some(house);
        self
    }

    pub fn category(&self) -> PointCategory {
        self.point.category()
    }

    pub fn is_retrograde(&self) -> bool {
        self.speed_lon.is_some_and(|s| s < 0.0)
    }

    pub fn sign(&self) -> SignPosition {
        SignPosition::from_longitude(self.lon)
    }

    fn validated(mut self) -> Result<Self> {
        if !self.lon.is_finite() || !self.lat.is_finite() {
            return Err(EngineError::invalid(format!(
                "{} has a non-finite coordinate",
                self.point
            )));
        }
        if let Some(speed) = self.speed_lon {
            if !speed.is_finite() {
                return Err(EngineError::invalid(format!(
                    "{} has a non-finite speed",
                    self.point
                )));
            }
        }
        if let Some(house) = self.house {
            if !(1..=12).contains(&house) {
                return Err(EngineError::invalid(format!(
                    "{} placed in house {}, expected 1-12",
                    self.point, house
                )));
            }
        }
        self.lon = normalize_degrees(self.lon);
        Ok(self)
    }
}

/// All positions for one subject at one moment.
///
/// Built once and read-only afterwards; points iterate in canonical
/// [`Point`] order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PositionSetRecord", into = "PositionSetRecord")]
pub struct PositionSet {
    subject: String,
    moment: Option<ChartMoment>,
    config: ChartConfig,
    points: BTreeMap<Point, PointPosition>,
    houses: Option<HouseCusps>,
}

impl PositionSet {
    pub fn new(
        subject: impl Into<String>,
        config: ChartConfig,
        points: impl IntoIterator<Item = PointPosition>,
        houses: Option<HouseCusps>,
    ) -> Result<Self> {
        let subject = subject.into();
        let mut by_point = BTreeMap::new();
        for position in points {
            let position = position.validated()?;
            if by_point.insert(position.point, position).is_some() {
                return Err(EngineError::invalid(format!(
                    "{} appears twice in the positions for {}",
                    position.point, subject
                )));
            }
        }
        Ok(Self {
            subject,
            moment: None,
            config,
            points: by_point,
            houses,
        })
    }

    pub fn with_moment(mut self, moment: ChartMoment) -> Self {
        self.moment = Some(moment);
        self
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn moment(&self) -> Option<&ChartMoment> {
        self.moment.as_ref()
    }

    pub fn config(&self) -> &ChartConfig {
        &self.config
    }

    pub fn houses(&self) -> Option<&HouseCusps> {
        self.houses.as_ref()
    }

    pub fn get(&self, point: Point) -> Option<&PointPosition> {
        self.points.get(&point)
    }

    pub fn contains(&self, point: Point) -> bool {
        self.points.contains_key(&point)
    }

    /// Positions in canonical point order.
    pub fn points(&self) -> impl Iterator<Item = &PointPosition> {
        self.points.values()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// A copy holding only the listed points; an empty list keeps everything.
    pub fn restricted_to(&self, keep: &[Point]) -> PositionSet {
        if keep.is_empty() {
            return self.clone();
        }
        PositionSet {
            points: self
                .points
                .iter()
                .filter(|(point, _)| keep.contains(*point))
                .map(|(point, pos)| (*point, *pos))
                .collect(),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct PositionSetRecord {
    subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    moment: Option<ChartMoment>,
    #[serde(default)]
    config: ChartConfig,
    points: Vec<PointPosition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    houses: Option<HouseCusps>,
}

impl TryFrom<PositionSetRecord> for PositionSet {
    type Error = EngineError;

    fn try_from(record: PositionSetRecord) -> Result<Self> {
        let set = PositionSet::new(record.subject, record.config, record.points, record.houses)?;
        Ok(match record.moment {
            Some(moment) => set.with_moment(moment),
            None => set,
        })
    }
}

impl From<PositionSet> for PositionSetRecord {
    fn from(set: PositionSet) -> Self {
        PositionSetRecord {
            subject: set.subject,
            moment: set.moment,
            config: set.config,
            points: set.points.into_values().collect(),
            houses: set.houses,
        }
    }
}
