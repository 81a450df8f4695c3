//! House cusps that follow from the chart angles alone.
//!
//! Quadrant systems that need sidereal time and obliquity (Placidus, Koch,
//! Regiomontanus, ...) are left to a full ephemeris backend.

use crate::angles::normalize_degrees;
use crate::ephemeris::provider::{EphemerisError, HouseCalculator, HouseRequest};
use crate::ephemeris::types::{HouseCusps, HouseSystem};

const SUPPORTED: &[HouseSystem] = &[
    HouseSystem::Equal,
    HouseSystem::WholeSign,
    HouseSystem::Porphyry,
];

/// Equal, whole-sign and Porphyry houses.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeometricHouses;

impl GeometricHouses {
    pub fn new() -> Self {
        Self
    }

    pub fn supports(&self, system: HouseSystem) -> bool {
        SUPPORTED.contains(&system)
    }
}

impl HouseCalculator for GeometricHouses {
    fn cusps(&self, request: &HouseRequest) -> Result<HouseCusps, EphemerisError> {
        let asc = normalize_degrees(request.ascendant);
        let mc = normalize_degrees(request.midheaven);

        let cusps = match request.system {
            HouseSystem::Equal => equal_from(asc),
            HouseSystem::WholeSign => equal_from((asc / 30.0).floor() * 30.0),
            HouseSystem::Porphyry => porphyry(asc, mc),
            other => {
                return Err(EphemerisError::UnsupportedHouseSystem {
                    system: other,
                    supported: SUPPORTED.to_vec(),
                })
            }
        };

        HouseCusps::new(cusps).map_err(|e| EphemerisError::HouseCalculationFailed {
            message: e.to_string(),
        })
    }
}

fn equal_from(start: f64) -> [f64; 12] {
    let mut cusps = [0.0; 12];
    for (i, cusp) in cusps.iter_mut().enumerate() {
        *cusp = normalize_degrees(start + 30.0 * i as f64);
    }
    cusps
}

/// Trisect each quadrant between the four angles.
fn porphyry(asc: f64, mc: f64) -> [f64; 12] {
    let ic = normalize_degrees(mc + 180.0);
    let dsc = normalize_degrees(asc + 180.0);
    let quadrants = [(asc, ic), (ic, dsc), (dsc, mc), (mc, asc)];

    let mut cusps = [0.0; 12];
    for (q, (from, to)) in quadrants.iter().enumerate() {
        let arc = normalize_degrees(to - from);
        for step in 0..3 {
            cusps[q * 3 + step] = normalize_degrees(from + arc * step as f64 / 3.0);
        }
    }
    cusps
}
