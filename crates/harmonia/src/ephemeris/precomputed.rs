use async_trait::async_trait;
use std::path::Path;

use crate::ephemeris::provider::{EphemerisError, EphemerisProvider, EphemerisRequest};
use crate::ephemeris::types::PositionSet;

/// Ephemeris that serves position sets computed ahead of time.
///
/// Sets are matched on subject name and local moment. A set without a moment
/// matches any moment for its subject.
#[derive(Debug, Clone, Default)]
pub struct PrecomputedEphemeris {
    sets: Vec<PositionSet>,
}

impl PrecomputedEphemeris {
    pub fn new(sets: Vec<PositionSet>) -> Self {
        Self { sets }
    }

    /// Load a JSON array of position sets.
    pub fn from_json_str(json: &str) -> Result<Self, EphemerisError> {
        let sets: Vec<PositionSet> =
            serde_json::from_str(json).map_err(|e| EphemerisError::InvalidData {
                message: e.to_string(),
            })?;
        Ok(Self::new(sets))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, EphemerisError> {
        if !path.exists() {
            return Err(EphemerisError::FileNotFound {
                path: path.display().to_string(),
                message: "Precomputed positions file does not exist.".to_string(),
            });
        }
        let text = std::fs::read_to_string(path).map_err(|e| EphemerisError::FileNotFound {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_json_str(&text)
    }

    pub fn sets(&self) -> &[PositionSet] {
        &self.sets
    }

    fn find(&self, request: &EphemerisRequest) -> Option<&PositionSet> {
        let for_subject = self.sets.iter().filter(|s| s.subject() == request.subject);
        let mut undated = None;
        for set in for_subject {
            match set.moment() {
                Some(moment) if moment.local == request.local => return Some(set),
                None if undated.is_none() => undated = Some(set),
                _ => {}
            }
        }
        undated
    }
}

#[async_trait]
impl EphemerisProvider for PrecomputedEphemeris {
    async fn positions(&self, request: &EphemerisRequest) -> Result<PositionSet, EphemerisError> {
        let set = self.find(request).ok_or_else(|| EphemerisError::NotAvailable {
            subject: request.subject.clone(),
            moment: request.local.to_string(),
        })?;

        if set.config() != &request.config {
            return Err(EphemerisError::UnsupportedConfiguration {
                message: format!(
                    "positions for {} were computed with {:?}, requested {:?}",
                    request.subject,
                    set.config(),
                    request.config
                ),
            });
        }

        Ok(set.restricted_to(&request.points))
    }
}
