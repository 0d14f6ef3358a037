//! Property-based tests for the decay simulation.
//!
//! Verifies the series and horizon invariants for arbitrary well-formed
//! profiles, intensities and rumination flags.

use emotrace_core::{DecayProfile, EmotionNeuroProfile, Hormone, ReferenceData};
use emotrace_limbic::horizon::full_cycle_minutes;
use emotrace_limbic::{peak_value, sample_hormone, simulate, DecayMode, HorizonPolicy};
use proptest::prelude::*;

// ============================================================================
// Strategies
// ============================================================================

fn arb_decay_profile() -> impl Strategy<Value = DecayProfile> {
    (0.0f64..=120.0, 0.1f64..=3.0)
        .prop_map(|(peak, rate)| DecayProfile::new(peak, rate).expect("valid ranges"))
}

fn arb_profile() -> impl Strategy<Value = EmotionNeuroProfile> {
    prop::collection::vec(arb_decay_profile(), 1..5).prop_map(|profiles| {
        let hormones = profiles
            .into_iter()
            .enumerate()
            .map(|(i, p)| Hormone::new(format!("H{}", i), "", p))
            .collect();
        EmotionNeuroProfile::new("arb", "", hormones)
    })
}

fn arb_level() -> impl Strategy<Value = u8> {
    1u8..=7
}

// ============================================================================
// Series shape
// ============================================================================

proptest! {
    /// Series runs from 0 to the horizon, ascending, and every point carries
    /// every hormone with a value in [0, 100].
    #[test]
    fn series_is_complete_and_ordered(
        profile in arb_profile(),
        level in arb_level(),
        ruminating in any::<bool>(),
    ) {
        let r = simulate(&profile, level, ruminating).unwrap();
        prop_assert_eq!(r.series.first().map(|p| p.time_minutes), Some(0));
        prop_assert_eq!(r.series.last().map(|p| p.time_minutes), Some(r.total_duration_minutes));
        for pair in r.series.windows(2) {
            prop_assert!(pair[0].time_minutes < pair[1].time_minutes);
        }
        for point in &r.series {
            prop_assert_eq!(point.values.len(), profile.hormones.len());
            for h in &profile.hormones {
                let v = point.value(&h.name).unwrap();
                prop_assert!((0.0..=100.0).contains(&v), "{} out of range: {}", h.name, v);
                prop_assert!(v == 0.0 || v >= 0.5, "residue not floored: {}", v);
            }
        }
    }

    /// Horizons are always whole half-hours.
    #[test]
    fn horizon_is_multiple_of_thirty(
        profile in arb_profile(),
        ruminating in any::<bool>(),
    ) {
        let r = simulate(&profile, 4, ruminating).unwrap();
        prop_assert_eq!(r.total_duration_minutes % 30, 0);
        prop_assert!(r.total_duration_minutes >= 60);
    }

    /// Rumination strictly lengthens the horizon by at least the 180-minute
    /// floor times three, and at least triples the baseline candidate.
    #[test]
    fn rumination_lengthens_horizon(
        profile in arb_profile(),
        level in arb_level(),
    ) {
        let base = simulate(&profile, level, false).unwrap();
        let rum = simulate(&profile, level, true).unwrap();
        prop_assert!(rum.total_duration_minutes > base.total_duration_minutes);
        prop_assert!(rum.total_duration_minutes >= 540);

        let slowest = profile
            .hormones
            .iter()
            .map(|h| full_cycle_minutes(&h.decay_profile))
            .fold(60.0f64, f64::max);
        prop_assert!(f64::from(rum.total_duration_minutes) >= slowest * 3.0);
    }

    /// Identical inputs give identical outputs.
    #[test]
    fn simulation_is_deterministic(
        profile in arb_profile(),
        level in arb_level(),
        ruminating in any::<bool>(),
    ) {
        let a = simulate(&profile, level, ruminating).unwrap();
        let b = simulate(&profile, level, ruminating).unwrap();
        prop_assert_eq!(a, b);
    }

    /// Non-ruminating curves end at or below 1% of full scale.
    #[test]
    fn baseline_decays_to_floor(
        profile in arb_profile(),
        level in arb_level(),
    ) {
        let r = simulate(&profile, level, false).unwrap();
        let last = r.final_point().unwrap();
        for h in &profile.hormones {
            let v = last.value(&h.name).unwrap();
            prop_assert!(v <= 1.0, "{} ends at {}", h.name, v);
        }
    }
}

// ============================================================================
// Per-hormone curve shape
// ============================================================================

proptest! {
    /// The rise to peak never goes down.
    #[test]
    fn ramp_is_monotonic(
        decay in arb_decay_profile(),
        level in arb_level(),
        ruminating in any::<bool>(),
    ) {
        prop_assume!(decay.peak_time > 0.0);
        let peak = peak_value(level);
        let mode = DecayMode::from_ruminating(ruminating);
        let steps = 50;
        let mut prev = -1.0;
        for i in 0..=steps {
            // Rounding can push the last step past the peak into the decay branch
            let t = (decay.peak_time * f64::from(i) / f64::from(steps)).min(decay.peak_time);
            let v = sample_hormone(&decay, peak, mode, t);
            prop_assert!(v >= prev, "t={} v={} prev={}", t, v, prev);
            prev = v;
        }
    }

    /// At the peak time the value is the scaled peak amplitude.
    #[test]
    fn peak_amplitude_scales_with_level(
        decay in arb_decay_profile(),
        level in arb_level(),
    ) {
        let expected = peak_value(level);
        let v = sample_hormone(&decay, expected, DecayMode::Baseline, decay.peak_time);
        prop_assert!((v - expected).abs() <= 0.05 + 1e-9, "got {} expected {}", v, expected);
    }

    /// Baseline decay is monotonically non-increasing after the peak.
    #[test]
    fn baseline_decay_is_monotonic(
        decay in arb_decay_profile(),
        level in arb_level(),
    ) {
        let peak = peak_value(level);
        let mut prev = f64::INFINITY;
        for i in 0..200 {
            let t = decay.peak_time + f64::from(i) * 2.0;
            let v = sample_hormone(&decay, peak, DecayMode::Baseline, t);
            prop_assert!(v <= prev);
            prev = v;
        }
    }

    /// The rumination curve never exceeds the nominal peak.
    #[test]
    fn rumination_bounded_by_peak(
        decay in arb_decay_profile(),
        level in arb_level(),
        elapsed in 0.0f64..5000.0,
    ) {
        let peak = peak_value(level);
        let v = sample_hormone(&decay, peak, DecayMode::Rumination, decay.peak_time + elapsed);
        prop_assert!(v <= (peak * 10.0).round() / 10.0 + 1e-9);
    }
}

// ============================================================================
// Rumination plateau
// ============================================================================

/// For joy at full intensity the serotonin curve never returns to baseline
/// during the ruminating horizon, while the non-ruminating curve does.
#[test]
fn rumination_keeps_slow_hormone_elevated() {
    let data = ReferenceData::builtin().unwrap();
    let alegria = data.neuro_profile("alegria").unwrap();

    let rum = simulate(alegria, 7, true).unwrap();
    let serotonin_peak = alegria.hormone("Serotonina").unwrap().decay_profile.peak_time;
    for (t, v) in rum.curve("Serotonina") {
        if f64::from(t) > serotonin_peak {
            assert!(v > 0.0, "serotonin hit zero at t={}", t);
        }
    }

    let base = simulate(alegria, 7, false).unwrap();
    let end = base.total_duration_minutes;
    let base_end = base.final_point().unwrap().value("Serotonina").unwrap();
    let rum_same_t = rum
        .series
        .iter()
        .find(|p| p.time_minutes == end)
        .and_then(|p| p.value("Serotonina"))
        .unwrap();
    assert!(base_end <= 1.0);
    assert!(rum_same_t > base_end * 10.0, "{} vs {}", rum_same_t, base_end);
}

/// Two hormones: the slower one sets the horizon.
#[test]
fn slower_hormone_drives_horizon() {
    let fast = Hormone::new("fast", "", DecayProfile::new(5.0, 2.0).unwrap());
    let slow = Hormone::new("slow", "", DecayProfile::new(20.0, 0.4).unwrap());
    let both = EmotionNeuroProfile::new("", "", vec![fast.clone(), slow]);
    let only_fast = EmotionNeuroProfile::new("", "", vec![fast]);

    // slow: 20 + 115 = 135 → 150
    assert_eq!(simulate(&both, 7, false).unwrap().total_duration_minutes, 150);
    assert_eq!(simulate(&only_fast, 7, false).unwrap().total_duration_minutes, 60);
}

/// An uncapped policy never truncates, so the 1% floor holds even for slow rates.
#[test]
fn uncapped_policy_reaches_floor() {
    let slow = EmotionNeuroProfile::new(
        "",
        "",
        vec![Hormone::new("slow", "", DecayProfile::new(0.0, 0.02).unwrap())],
    );
    let h = HorizonPolicy::uncapped().compute(&slow, false);
    // 4.6/0.02·10 = 2300 → 2310
    assert_eq!(h.total_duration_minutes, 2310);
}
