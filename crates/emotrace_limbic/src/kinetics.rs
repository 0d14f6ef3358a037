//! Per-hormone concentration curves.
//!
//! Each hormone rises linearly to its peak, then decays. Two decay models
//! exist for the post-peak region:
//!
//! - **Baseline**: `peak · exp(-rate · elapsed / 10)`, a clean monotonic fall
//! - **Rumination**: the rate is quartered and a bounded sine "re-trigger"
//!   wave is added, so the curve plateaus and pulses instead of resolving
//!
//! The rumination model is an illustrative heuristic, not a clinical one.
//! Its exact formula is kept stable so charts stay comparable across
//! versions.
//!
//! Curves are independent: no hormone influences another.

use emotrace_core::DecayProfile;

/// Elapsed minutes are divided by this before applying the decay rate.
pub const DECAY_TIME_UNIT: f64 = 10.0;

/// Values below this are drawn as flat baseline.
pub const DISPLAY_FLOOR: f64 = 0.5;

/// Full-scale concentration, reached at intensity 7.
pub const FULL_SCALE: f64 = 100.0;

const RUMINATION_RATE_DIVISOR: f64 = 4.0;
const RUMINATION_DECAY_WEIGHT: f64 = 0.7;
const THOUGHT_WAVE_PERIOD_DIVISOR: f64 = 20.0;
const THOUGHT_WAVE_AMPLITUDE: f64 = 0.15;

/// Which post-peak decay model applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayMode {
    Baseline,
    Rumination,
}

impl DecayMode {
    pub fn from_ruminating(ruminating: bool) -> Self {
        if ruminating {
            DecayMode::Rumination
        } else {
            DecayMode::Baseline
        }
    }

    /// Raw (unclamped, unrounded) value `elapsed` minutes after the peak.
    pub fn post_peak(self, profile: &DecayProfile, peak: f64, elapsed: f64) -> f64 {
        match self {
            DecayMode::Baseline => baseline_decay(profile, peak, elapsed),
            DecayMode::Rumination => rumination_decay(profile, peak, elapsed),
        }
    }
}

/// Peak amplitude for an intensity level: level 7 is 100%, lower levels
/// scale down proportionally.
pub fn peak_value(level: u8) -> f64 {
    FULL_SCALE * (f64::from(level) / 7.0)
}

/// Linear rise from 0 at onset to `peak` at `peak_time`. An instantaneous
/// peak (`peak_time == 0`) sits at `peak` from the first sample.
pub fn ramp_up(profile: &DecayProfile, peak: f64, t: f64) -> f64 {
    if profile.peak_time <= 0.0 {
        return peak;
    }
    (t / profile.peak_time) * peak
}

pub fn baseline_decay(profile: &DecayProfile, peak: f64, elapsed: f64) -> f64 {
    peak * (-profile.decay_rate * elapsed / DECAY_TIME_UNIT).exp()
}

/// Quartered decay rate plus a periodic re-trigger pulse in `[0, 0.3]`,
/// capped at the nominal peak.
pub fn rumination_decay(profile: &DecayProfile, peak: f64, elapsed: f64) -> f64 {
    let slow_decay =
        (-(profile.decay_rate / RUMINATION_RATE_DIVISOR) * elapsed / DECAY_TIME_UNIT).exp();
    let thought_wave =
        ((elapsed / THOUGHT_WAVE_PERIOD_DIVISOR).sin() + 1.0) * THOUGHT_WAVE_AMPLITUDE;
    let value = peak * (slow_decay * RUMINATION_DECAY_WEIGHT + thought_wave);
    value.min(peak)
}

/// Clamp to `[0, 100]`, flatten sub-0.5 residue to exactly zero, and round
/// to one decimal place.
pub fn finish(value: f64) -> f64 {
    let value = value.clamp(0.0, FULL_SCALE);
    if value < DISPLAY_FLOOR {
        return 0.0;
    }
    (value * 10.0).round() / 10.0
}

/// Concentration percentage of one hormone at `t` minutes after onset.
pub fn sample_hormone(profile: &DecayProfile, peak: f64, mode: DecayMode, t: f64) -> f64 {
    let raw = if t <= profile.peak_time {
        ramp_up(profile, peak, t)
    } else {
        mode.post_peak(profile, peak, t - profile.peak_time)
    };
    finish(raw)
}
