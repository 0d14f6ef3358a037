//! Neurochemical profiles: the hormones an emotion releases and how each one
//! rises and decays over time.
//!
//! These are static reference records. The simulation engine reads them but
//! never mutates them, and presentation metadata (line colors) lives in the
//! palette, not here.

use crate::error::ProfileError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// A hormone's `{peak_time, decay_rate}` pair governing its rise/fall curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecayProfile {
    /// Minutes from event onset to concentration peak. `0` means instantaneous.
    pub peak_time: f64,
    /// Dimensionless decay constant applied per 10 minutes of elapsed time.
    pub decay_rate: f64,
}

impl DecayProfile {
    /// Build a validated decay profile.
    pub fn new(peak_time: f64, decay_rate: f64) -> Result<Self, ProfileError> {
        let profile = Self {
            peak_time,
            decay_rate,
        };
        profile.validate()?;
        Ok(profile)
    }

    pub fn validate(&self) -> Result<(), ProfileError> {
        if !self.peak_time.is_finite() || self.peak_time < 0.0 {
            return Err(ProfileError::InvalidPeakTime(self.peak_time));
        }
        // A zero rate would make the decay horizon infinite.
        if !self.decay_rate.is_finite() || self.decay_rate <= 0.0 {
            return Err(ProfileError::InvalidDecayRate(self.decay_rate));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hormone {
    pub name: String,
    /// Short gloss shown next to the name in legends and tooltips.
    pub description: String,
    pub decay_profile: DecayProfile,
}

impl Hormone {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        decay_profile: DecayProfile,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            decay_profile,
        }
    }
}

/// The fixed set of hormones and their kinetics associated with one emotion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmotionNeuroProfile {
    pub description: String,
    /// Human-readable recovery window, presentation only.
    pub recovery_estimate: String,
    /// Insertion order is the chart legend order.
    pub hormones: Vec<Hormone>,
}

impl EmotionNeuroProfile {
    pub fn new(
        description: impl Into<String>,
        recovery_estimate: impl Into<String>,
        hormones: Vec<Hormone>,
    ) -> Self {
        Self {
            description: description.into(),
            recovery_estimate: recovery_estimate.into(),
            hormones,
        }
    }

    /// Check the invariants the decay engine depends on: at least one
    /// hormone, unique names, and a well-formed decay profile for each.
    pub fn validate(&self) -> Result<(), ProfileError> {
        if self.hormones.is_empty() {
            return Err(ProfileError::NoHormones);
        }
        let mut seen = HashSet::with_capacity(self.hormones.len());
        for hormone in &self.hormones {
            if !seen.insert(hormone.name.as_str()) {
                return Err(ProfileError::DuplicateHormone(hormone.name.clone()));
            }
            hormone
                .decay_profile
                .validate()
                .map_err(|e| ProfileError::Hormone {
                    name: hormone.name.clone(),
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    pub fn hormone(&self, name: &str) -> Option<&Hormone> {
        self.hormones.iter().find(|h| h.name == name)
    }

    pub fn hormone_names(&self) -> impl Iterator<Item = &str> {
        self.hormones.iter().map(|h| h.name.as_str())
    }
}
