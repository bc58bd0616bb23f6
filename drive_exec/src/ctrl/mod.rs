//! # Drive control module
//!
//! Drive control maps a scene snapshot to a vehicle control command once per
//! tick, using two independent algorithms:
//!
//! - Longitudinal control tracks a fixed target speed with a proportional
//!   law plus a constant bias, splitting the acceleration demand into
//!   throttle and brake so that the two are never simultaneously nonzero.
//! - Lateral control is a Stanley-style heading-error controller: it selects
//!   a speed-scaled lookahead point on the reference trajectory and steers to
//!   reduce the heading error towards it.
//!
//! Obstacles are not consulted - this module performs no avoidance. An
//! externally-supplied command (for example from the manual input rig) may
//! replace the algorithmic output on any tick via [`CtrlMode::Manual`].

// ---------------------------------------------------------------------------
// MODULES
// ---------------------------------------------------------------------------

mod calc_speed;
mod calc_steering;
mod params;
mod state;

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
pub use params::Params;
pub use state::*;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum number of trajectory points required by lateral control. Shorter
/// trajectories produce a zero steering demand.
pub const MIN_TRAJ_POINTS: usize = 3;
