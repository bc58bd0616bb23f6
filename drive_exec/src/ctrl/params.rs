//! Parameters structure for DriveCtrl

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Deserialize;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Parameters for drive control.
///
/// The defaults are the tuned values for the simulator's single operating
/// point.
#[derive(Debug, Clone, Deserialize)]
pub struct Params {
    // ---- LONGITUDINAL ----
    /// The fixed target speed tracked by longitudinal control.
    ///
    /// Units: meters/second
    pub target_speed_ms: f64,

    /// Proportional gain applied to the speed error.
    pub speed_err_gain: f64,

    /// Constant bias added to the acceleration demand.
    ///
    /// Units: meters/second^2
    pub accel_bias_ms2: f64,

    /// Scale factor mapping a negative acceleration demand into a brake
    /// position.
    pub brake_gain: f64,

    // ---- LATERAL ----
    /// Speed-scaled lookahead gain used to select the target point.
    ///
    /// Units: seconds
    pub lookahead_gain_s: f64,

    /// Heading error at which the steering demand saturates.
    ///
    /// Units: degrees
    pub steering_full_scale_deg: f64,

    /// Empirical gain applied on top of the normalised heading error.
    pub steering_gain: f64,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for Params {
    fn default() -> Self {
        Self {
            target_speed_ms: 15.0,
            speed_err_gain: 0.2,
            accel_bias_ms2: 0.2,
            brake_gain: 0.5,
            lookahead_gain_s: 0.5,
            steering_full_scale_deg: 45.0,
            steering_gain: 2.0,
        }
    }
}
