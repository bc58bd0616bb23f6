//! Stanley-style lateral tracking

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use std::f64::consts::{PI, TAU};

// Internal
use super::{Params, MIN_TRAJ_POINTS};
use scene_if::{geom::Vector3, scene::ObjectInfo};
use util::maths::{clamp, norm, rem_euclid};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Result of the steering calculation, including monitoring quantities.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct SteeringCalc {
    /// The steering demand, always in [-1, 1].
    pub steering: f64,

    /// The heading error to the selected target point, in (-pi, pi].
    ///
    /// Units: radians
    pub head_err_rad: f64,

    /// True if no point was beyond the lookahead distance and the
    /// third-from-last trajectory point was used instead.
    pub lookahead_fallback: bool,
}

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Calculate the steering demand tracking the reference trajectory.
///
/// The target is the first trajectory point further from the ego position
/// than the speed-scaled lookahead distance. The last two points of the
/// trajectory are unreliable lookahead artifacts and are never considered as
/// targets.
///
/// Trajectories with fewer than [`MIN_TRAJ_POINTS`] points produce a zero
/// demand - a defined fallback, not an error.
pub(crate) fn calc_steering(
    main_vehicle: &ObjectInfo,
    speed_ms: f64,
    trajectory_m: &[Vector3],
    params: &Params,
) -> SteeringCalc {
    if trajectory_m.len() < MIN_TRAJ_POINTS {
        return SteeringCalc::default();
    }

    let lookahead_m = params.lookahead_gain_s * speed_ms;
    let ego_pos_m = main_vehicle.pos_m;

    let mut target_m = trajectory_m[trajectory_m.len() - 3];
    let mut lookahead_fallback = true;

    for point in trajectory_m[..trajectory_m.len() - 2].iter() {
        let dist_m = norm(&point.as_array(), &ego_pos_m.as_array()).unwrap();

        if dist_m > lookahead_m {
            target_m = *point;
            lookahead_fallback = false;
            break;
        }
    }

    // Heading error to the target, wrapped into (-pi, pi]
    let theta_rad = (target_m - ego_pos_m).yaw_rad();
    let mut head_err_rad = rem_euclid(theta_rad - main_vehicle.yaw_rad, TAU);
    if head_err_rad > PI {
        head_err_rad -= TAU;
    }

    let steering = clamp(
        &(-head_err_rad.to_degrees() / params.steering_full_scale_deg * params.steering_gain),
        &-1.0,
        &1.0,
    );

    SteeringCalc {
        steering,
        head_err_rad,
        lookahead_fallback,
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    fn vehicle_at(pos_m: Vector3, yaw_rad: f64) -> ObjectInfo {
        ObjectInfo {
            pos_m,
            vel_ms: Vector3::default(),
            yaw_rad,
            length_m: 4.6,
            width_m: 1.9,
            height_m: 1.5,
        }
    }

    /// A straight trajectory along the positive x axis.
    fn straight_trajectory(num_points: usize) -> Vec<Vector3> {
        (0..num_points)
            .map(|i| Vector3::new(i as f64, 0.0, 0.0))
            .collect()
    }

    #[test]
    fn test_degenerate_trajectories() {
        let vehicle = vehicle_at(Vector3::default(), 0.0);
        let params = Params::default();

        for num_points in 0..MIN_TRAJ_POINTS {
            let calc = calc_steering(
                &vehicle,
                10.0,
                &straight_trajectory(num_points),
                &params,
            );
            assert_eq!(calc.steering, 0.0);
        }
    }

    #[test]
    fn test_straight_ahead() {
        let vehicle = vehicle_at(Vector3::default(), 0.0);
        let calc = calc_steering(&vehicle, 10.0, &straight_trajectory(20), &Params::default());

        assert!(calc.steering.abs() < 1e-12);
        assert!(!calc.lookahead_fallback);
    }

    #[test]
    fn test_target_to_the_left_steers_left() {
        // Target 45 degrees to the left of the heading; left is negative
        // steering on the wire
        let vehicle = vehicle_at(Vector3::default(), 0.0);
        let trajectory = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(10.0, 10.0, 0.0),
            Vector3::new(11.0, 11.0, 0.0),
            Vector3::new(12.0, 12.0, 0.0),
        ];

        let calc = calc_steering(&vehicle, 10.0, &trajectory, &Params::default());

        assert_eq!(calc.steering, -1.0);
        assert!((calc.head_err_rad - PI / 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_lookahead_fallback() {
        // Every candidate point is within the lookahead distance, so the
        // third-from-last point must be selected
        let vehicle = vehicle_at(Vector3::default(), 0.0);
        let trajectory = straight_trajectory(5);

        let calc = calc_steering(&vehicle, 100.0, &trajectory, &Params::default());

        assert!(calc.lookahead_fallback);
        // Third-from-last point of the straight line is dead ahead
        assert!(calc.steering.abs() < 1e-12);
    }

    #[test]
    fn test_output_always_in_range() {
        let trajectory = vec![
            Vector3::new(0.0, 0.0, 0.0),
            Vector3::new(-10.0, 3.0, 0.0),
            Vector3::new(-11.0, 3.0, 0.0),
            Vector3::new(-12.0, 3.0, 0.0),
        ];
        let params = Params::default();

        let mut yaw_rad = -4.0 * TAU;
        while yaw_rad < 4.0 * TAU {
            let vehicle = vehicle_at(Vector3::default(), yaw_rad);
            let calc = calc_steering(&vehicle, 5.0, &trajectory, &params);

            assert!(
                calc.steering >= -1.0 && calc.steering <= 1.0,
                "steering {} out of range at yaw {}",
                calc.steering,
                yaw_rad
            );
            assert!(calc.head_err_rad > -PI && calc.head_err_rad <= PI);

            yaw_rad += 0.01;
        }
    }
}
