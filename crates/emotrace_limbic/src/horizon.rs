//! Horizon calculator: how long to simulate, how finely to sample, and where
//! to put axis labels.
//!
//! The horizon is chosen so every hormone's baseline curve falls to ~1% of
//! its peak. Solving `exp(-rate · elapsed / 10) = 0.01` gives
//! `elapsed = 4.6 / rate · 10`; adding the hormone's peak time yields its
//! full-cycle duration. The slowest hormone sets the horizon.

use crate::kinetics::DECAY_TIME_UNIT;
use emotrace_core::{DecayProfile, EmotionNeuroProfile};
use serde::{Deserialize, Serialize};

/// `-ln(0.01)` to one decimal.
pub const NEAR_ZERO_LOG: f64 = 4.6;

/// Simulation span, sampling resolution and axis hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Horizon {
    pub total_duration_minutes: u32,
    pub sample_step_minutes: u32,
    pub axis_ticks: Vec<u32>,
}

/// Tunables for horizon selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HorizonPolicy {
    /// Never simulate less than this, even for very fast hormones.
    pub floor_minutes: u32,
    /// Pre-multiplier minimum when ruminating.
    pub rumination_floor_minutes: u32,
    pub rumination_multiplier: u32,
    /// Horizons are rounded up to a multiple of this.
    pub rounding_minutes: u32,
    /// Cap on the pre-rumination candidate. `None` leaves it unbounded.
    pub max_base_minutes: Option<u32>,
}

impl Default for HorizonPolicy {
    fn default() -> Self {
        Self {
            floor_minutes: 60,
            rumination_floor_minutes: 180,
            rumination_multiplier: 3,
            rounding_minutes: 30,
            max_base_minutes: Some(24 * 60),
        }
    }
}

impl HorizonPolicy {
    /// Default policy without the horizon cap.
    pub fn uncapped() -> Self {
        Self {
            max_base_minutes: None,
            ..Self::default()
        }
    }

    /// Compute the horizon for a profile.
    ///
    /// The profile must already be validated: a non-positive decay rate
    /// would make the full-cycle time infinite.
    pub fn compute(&self, profile: &EmotionNeuroProfile, ruminating: bool) -> Horizon {
        let mut candidate = f64::from(self.floor_minutes);
        for hormone in &profile.hormones {
            candidate = candidate.max(full_cycle_minutes(&hormone.decay_profile));
        }

        if let Some(cap) = self.max_base_minutes {
            let cap = f64::from(cap);
            if candidate > cap {
                tracing::warn!(
                    "Decay horizon {:.0}min exceeds cap, truncating to {:.0}min",
                    candidate,
                    cap
                );
                candidate = cap;
            }
        }

        if ruminating {
            candidate = candidate.max(f64::from(self.rumination_floor_minutes))
                * f64::from(self.rumination_multiplier);
        }

        let total = round_up_to(candidate, self.rounding_minutes);
        let step = sample_step(total);
        let axis_ticks = axis_ticks(total);

        tracing::debug!(
            "Horizon: {}min (ruminating={}), step={}min, {} ticks",
            total,
            ruminating,
            step,
            axis_ticks.len()
        );

        Horizon {
            total_duration_minutes: total,
            sample_step_minutes: step,
            axis_ticks,
        }
    }
}

/// Compute a horizon with the default policy.
pub fn compute_horizon(profile: &EmotionNeuroProfile, ruminating: bool) -> Horizon {
    HorizonPolicy::default().compute(profile, ruminating)
}

/// Minutes after onset at which a hormone's baseline curve is ~1% of peak.
pub fn full_cycle_minutes(profile: &DecayProfile) -> f64 {
    profile.peak_time + (NEAR_ZERO_LOG / profile.decay_rate) * DECAY_TIME_UNIT
}

/// Round `minutes` up to the next multiple of `multiple`. Saturates at
/// `u32::MAX` for absurd inputs.
pub fn round_up_to(minutes: f64, multiple: u32) -> u32 {
    let multiple = f64::from(multiple.max(1));
    let rounded = (minutes / multiple).ceil() * multiple;
    rounded.clamp(0.0, f64::from(u32::MAX)) as u32
}

/// 5-minute samples up to five hours, 10-minute samples beyond.
pub fn sample_step(total_minutes: u32) -> u32 {
    if total_minutes <= 300 {
        5
    } else {
        10
    }
}

pub fn axis_tick_interval(total_minutes: u32) -> u32 {
    if total_minutes <= 60 {
        15
    } else if total_minutes <= 180 {
        30
    } else {
        60
    }
}

/// Tick marks from 0 to the horizon inclusive.
pub fn axis_ticks(total_minutes: u32) -> Vec<u32> {
    let interval = axis_tick_interval(total_minutes) as usize;
    (0..=total_minutes).step_by(interval).collect()
}
