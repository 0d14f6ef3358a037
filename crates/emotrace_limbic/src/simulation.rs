//! Series assembly: combine the horizon and the per-hormone curves into a
//! full sampled time series for one `(profile, intensity, rumination)` input.
//!
//! Pure and deterministic: no I/O, no shared state. Results are never
//! mutated in place; a new input produces a new result.

use crate::error::SimulationError;
use crate::horizon::{Horizon, HorizonPolicy};
use crate::kinetics::{peak_value, sample_hormone, DecayMode};
use emotrace_core::{EmotionNeuroProfile, SimulationConfig, MAX_LEVEL, MIN_LEVEL};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// An intensity on the 1–7 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct IntensityLevel(u8);

impl IntensityLevel {
    pub fn new(level: u8) -> Result<Self, SimulationError> {
        if (MIN_LEVEL..=MAX_LEVEL).contains(&level) {
            Ok(Self(level))
        } else {
            Err(SimulationError::InvalidIntensity(level))
        }
    }

    pub fn get(self) -> u8 {
        self.0
    }

    /// Peak amplitude in percent: `100 · level / 7`.
    pub fn peak_value(self) -> f64 {
        peak_value(self.0)
    }
}

impl TryFrom<u8> for IntensityLevel {
    type Error = SimulationError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::new(level)
    }
}

impl From<IntensityLevel> for u8 {
    fn from(level: IntensityLevel) -> u8 {
        level.0
    }
}

/// One simulation input, created per render.
#[derive(Debug, Clone, Copy)]
pub struct SimulationRequest<'a> {
    pub profile: &'a EmotionNeuroProfile,
    pub intensity_level: u8,
    pub ruminating: bool,
}

/// Concentrations of every hormone at one sample time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataPoint {
    pub time_minutes: u32,
    /// Percentage in `[0, 100]` keyed by hormone name.
    pub values: BTreeMap<String, f64>,
}

impl DataPoint {
    pub fn value(&self, hormone: &str) -> Option<f64> {
        self.values.get(hormone).copied()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationResult {
    pub total_duration_minutes: u32,
    pub sample_step_minutes: u32,
    pub axis_ticks: Vec<u32>,
    /// Ascending by time, from 0 to `total_duration_minutes` inclusive.
    pub series: Vec<DataPoint>,
}

impl SimulationResult {
    /// `(time, value)` pairs for one hormone. Empty if the name is unknown.
    pub fn curve(&self, hormone: &str) -> Vec<(u32, f64)> {
        self.series
            .iter()
            .filter_map(|p| p.value(hormone).map(|v| (p.time_minutes, v)))
            .collect()
    }

    /// Earliest sample holding the hormone's maximum value.
    pub fn peak_of(&self, hormone: &str) -> Option<(u32, f64)> {
        self.curve(hormone)
            .into_iter()
            .fold(None, |best, (t, v)| match best {
                Some((_, bv)) if bv >= v => best,
                _ => Some((t, v)),
            })
    }

    pub fn final_point(&self) -> Option<&DataPoint> {
        self.series.last()
    }
}

/// The decay simulation engine.
#[derive(Debug, Clone, Default)]
pub struct DecayEngine {
    pub policy: HorizonPolicy,
}

impl DecayEngine {
    pub fn new(policy: HorizonPolicy) -> Self {
        Self { policy }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(HorizonPolicy {
            max_base_minutes: config.horizon_cap(),
            ..HorizonPolicy::default()
        })
    }

    pub fn simulate(
        &self,
        profile: &EmotionNeuroProfile,
        intensity_level: u8,
        ruminating: bool,
    ) -> Result<SimulationResult, SimulationError> {
        self.run(&SimulationRequest {
            profile,
            intensity_level,
            ruminating,
        })
    }

    /// Validate the request, size the horizon, and sample every hormone.
    pub fn run(&self, request: &SimulationRequest<'_>) -> Result<SimulationResult, SimulationError> {
        request.profile.validate()?;
        let level = IntensityLevel::new(request.intensity_level)?;

        let Horizon {
            total_duration_minutes,
            sample_step_minutes,
            axis_ticks,
        } = self.policy.compute(request.profile, request.ruminating);

        let peak = level.peak_value();
        let mode = DecayMode::from_ruminating(request.ruminating);

        let series = sample_times(total_duration_minutes, sample_step_minutes)
            .into_iter()
            .map(|t| DataPoint {
                time_minutes: t,
                values: request
                    .profile
                    .hormones
                    .iter()
                    .map(|h| {
                        let value = sample_hormone(&h.decay_profile, peak, mode, f64::from(t));
                        (h.name.clone(), value)
                    })
                    .collect(),
            })
            .collect::<Vec<_>>();

        tracing::debug!(
            "Simulated {} hormones at level {} (ruminating={}): {} points over {}min",
            request.profile.hormones.len(),
            level.get(),
            request.ruminating,
            series.len(),
            total_duration_minutes
        );

        Ok(SimulationResult {
            total_duration_minutes,
            sample_step_minutes,
            axis_ticks,
            series,
        })
    }
}

/// Simulate with the default horizon policy.
pub fn simulate(
    profile: &EmotionNeuroProfile,
    intensity_level: u8,
    ruminating: bool,
) -> Result<SimulationResult, SimulationError> {
    DecayEngine::default().simulate(profile, intensity_level, ruminating)
}

/// `0, step, 2·step, …` up to `total`, always ending exactly on `total`.
pub fn sample_times(total: u32, step: u32) -> Vec<u32> {
    let mut times: Vec<u32> = (0..=total).step_by(step.max(1) as usize).collect();
    if times.last() != Some(&total) {
        times.push(total);
    }
    times
}
