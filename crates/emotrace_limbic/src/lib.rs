//! # emotrace Limbic Simulation
//!
//! Maps an emotion's neurochemical profile, an intensity level (1–7) and a
//! rumination flag into a sampled time series of hormone concentrations.
//!
//! ## Pipeline
//!
//! 1. **Horizon**: size the simulated window so the slowest hormone decays
//!    to ~1% of peak (or much longer when ruminating), pick a sampling step
//!    and axis tick spacing
//! 2. **Kinetics**: per hormone, a linear rise to `100 · level / 7` then
//!    either exponential decay or the rumination plateau-and-pulse model
//! 3. **Assembly**: sample every hormone at every step, clamp, floor and
//!    round for display
//!
//! The engine is pure computation over immutable profiles and is safe to
//! call concurrently.

pub mod axis;
mod error;
pub mod horizon;
pub mod kinetics;
mod simulation;

pub use axis::{format_axis_tick, format_elapsed};
pub use error::SimulationError;
pub use horizon::{compute_horizon, Horizon, HorizonPolicy};
pub use kinetics::{peak_value, sample_hormone, DecayMode};
pub use simulation::{
    sample_times, simulate, DataPoint, DecayEngine, IntensityLevel, SimulationRequest,
    SimulationResult,
};
