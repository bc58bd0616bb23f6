//! Longitudinal speed tracking

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::Params;

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the throttle and brake positions tracking the target speed.
///
/// A positive acceleration demand becomes a throttle position, a negative
/// one becomes a brake position, both saturated at 1. The two are never
/// simultaneously nonzero.
pub(crate) fn calc_throttle_brake(speed_ms: f64, params: &Params) -> (f64, f64) {
    let accel_ms2 =
        (params.target_speed_ms - speed_ms) * params.speed_err_gain + params.accel_bias_ms2;

    if accel_ms2 > 0.0 {
        (accel_ms2.min(1.0), 0.0)
    } else {
        (0.0, (-accel_ms2 * params.brake_gain).min(1.0))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_below_target_speed() {
        // (15 - 10) * 0.2 + 0.2 = 1.2, saturated to full throttle
        let (throttle, brake) = calc_throttle_brake(10.0, &Params::default());

        assert_eq!(throttle, 1.0);
        assert_eq!(brake, 0.0);
    }

    #[test]
    fn test_above_target_speed() {
        // (15 - 20) * 0.2 + 0.2 = -0.8, brake = 0.8 * 0.5 = 0.4
        let (throttle, brake) = calc_throttle_brake(20.0, &Params::default());

        assert_eq!(throttle, 0.0);
        assert!((brake - 0.4).abs() < EPSILON);
    }

    #[test]
    fn test_at_target_speed() {
        // The bias keeps a small positive demand at the target speed
        let (throttle, brake) = calc_throttle_brake(15.0, &Params::default());

        assert!((throttle - 0.2).abs() < EPSILON);
        assert_eq!(brake, 0.0);
    }

    #[test]
    fn test_never_both_nonzero() {
        let params = Params::default();

        let mut speed_ms = -50.0;
        while speed_ms < 100.0 {
            let (throttle, brake) = calc_throttle_brake(speed_ms, &params);

            assert!(
                throttle == 0.0 || brake == 0.0,
                "throttle {} and brake {} both nonzero at speed {}",
                throttle,
                brake,
                speed_ms
            );
            assert!(throttle <= 1.0 && brake <= 1.0);

            speed_ms += 0.25;
        }
    }
}
