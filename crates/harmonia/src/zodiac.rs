//! Zodiac signs and their classical groupings.

use serde::{Deserialize, Serialize};

use crate::angles::normalize_degrees;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Element {
    Fire,
    Earth,
    Air,
    Water,
}

/// Sign quality (modality).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Cardinal,
    Fixed,
    Mutable,
}

const SIGNS: [Sign; 12] = [
    Sign::Aries,
    Sign::Taurus,
    Sign::Gemini,
    Sign::Cancer,
    Sign::Leo,
    Sign::Virgo,
    Sign::Libra,
    Sign::Scorpio,
    Sign::Sagittarius,
    Sign::Capricorn,
    Sign::Aquarius,
    Sign::Pisces,
];

impl Sign {
    /// Sign index 0-11 (Aries = 0).
    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_index(index: usize) -> Sign {
        SIGNS[index % 12]
    }

    pub fn from_longitude(longitude: f64) -> Sign {
        let normalized = normalize_degrees(longitude);
        Sign::from_index((normalized / 30.0) as usize)
    }

    pub fn element(&self) -> Element {
        match self.index() % 4 {
            0 => Element::Fire,
            1 => Element::Earth,
            2 => Element::Air,
            _ => Element::Water,
        }
    }

    pub fn quality(&self) -> Quality {
        match self.index() % 3 {
            0 => Quality::Cardinal,
            1 => Quality::Fixed,
            _ => Quality::Mutable,
        }
    }
}

/// Where a longitude falls within the zodiac.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignPosition {
    pub sign: Sign,
    /// Degrees into the sign, `[0, 30)`.
    pub degree: f64,
    pub element: Element,
    pub quality: Quality,
}

impl SignPosition {
    pub fn from_longitude(longitude: f64) -> Self {
        let normalized = normalize_degrees(longitude);
        let sign = Sign::from_longitude(normalized);
        Self {
            sign,
            degree: normalized - sign.index() as f64 * 30.0,
            element: sign.element(),
            quality: sign.quality(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_from_longitude() {
        assert_eq!(Sign::from_longitude(0.0), Sign::Aries);
        assert_eq!(Sign::from_longitude(29.999), Sign::Aries);
        assert_eq!(Sign::from_longitude(30.0), Sign::Taurus);
        assert_eq!(Sign::from_longitude(135.0), Sign::Leo);
        assert_eq!(Sign::from_longitude(359.9), Sign::Pisces);
        assert_eq!(Sign::from_longitude(-15.0), Sign::Pisces);
    }

    #[test]
    fn test_elements_and_qualities() {
        assert_eq!(Sign::Leo.element(), Element::Fire);
        assert_eq!(Sign::Capricorn.element(), Element::Earth);
        assert_eq!(Sign::Aquarius.element(), Element::Air);
        assert_eq!(Sign::Pisces.element(), Element::Water);

        assert_eq!(Sign::Libra.quality(), Quality::Cardinal);
        assert_eq!(Sign::Scorpio.quality(), Quality::Fixed);
        assert_eq!(Sign::Sagittarius.quality(), Quality::Mutable);
        assert_eq!(Sign::Cancer.quality(), Quality::Cardinal);
    }

    #[test]
    fn test_sign_position_degree() {
        let pos = SignPosition::from_longitude(95.5);
        assert_eq!(pos.sign, Sign::Cancer);
        assert!((pos.degree - 5.5).abs() < 1e-9);
        assert_eq!(pos.quality, Quality::Cardinal);
    }
}
