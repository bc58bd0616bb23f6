//! Implementations for the DriveCtrl state structure

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use super::calc_speed::calc_throttle_brake;
use super::calc_steering::calc_steering;
use super::Params;
use scene_if::scene::{GearMode, SceneInfo, VehicleControl};
use util::{module::State, params, session::Session};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Drive control module state
#[derive(Default)]
pub struct DriveCtrl {
    pub(crate) params: Params,

    pub(crate) report: StatusReport,
}

/// Input data to drive control for one tick.
#[derive(Debug, Clone)]
pub struct CtrlInput {
    /// The scene snapshot for this tick.
    pub scene: SceneInfo,

    /// The command source for this tick.
    pub mode: CtrlMode,
}

/// Status report for DriveCtrl processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusReport {
    /// The speed error to the target.
    ///
    /// Units: meters/second
    pub speed_err_ms: f64,

    /// The heading error to the selected target point.
    ///
    /// Units: radians
    pub head_err_rad: f64,

    /// True if the lookahead fell back to the third-from-last trajectory
    /// point.
    pub lookahead_fallback: bool,

    /// True if the command came from the manual source.
    pub manual_override: bool,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// The per-tick command source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CtrlMode {
    /// Compute the command from the control algorithms.
    Auto,

    /// Pass the externally-supplied command through unchanged.
    Manual(VehicleControl),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl State for DriveCtrl {
    type InitData = &'static str;
    type InitError = params::LoadError;

    type InputData = CtrlInput;
    type OutputData = VehicleControl;
    type StatusReport = StatusReport;
    type ProcError = std::convert::Infallible;

    /// Initialise the DriveCtrl module.
    ///
    /// Expected init data is the path to the parameter file
    fn init(
        &mut self,
        init_data: Self::InitData,
        _session: &Session,
    ) -> Result<(), Self::InitError> {
        self.params = params::load(init_data)?;

        Ok(())
    }

    /// Perform cyclic processing of drive control.
    ///
    /// Both algorithms are pure in their inputs - all cross-tick state lives
    /// in the simulator's telemetry, so a snapshot in always yields the same
    /// command out.
    fn proc(
        &mut self,
        input_data: &Self::InputData,
    ) -> Result<(Self::OutputData, Self::StatusReport), Self::ProcError> {
        self.report = StatusReport::default();

        if let CtrlMode::Manual(vc) = input_data.mode {
            self.report.manual_override = true;
            return Ok((vc, self.report));
        }

        let scene = &input_data.scene;
        let speed_ms = scene.main_vehicle_speed_ms;

        let (throttle, brake) = calc_throttle_brake(speed_ms, &self.params);
        let steering_calc = calc_steering(
            &scene.main_vehicle,
            speed_ms,
            &scene.trajectory.points_m,
            &self.params,
        );

        self.report.speed_err_ms = self.params.target_speed_ms - speed_ms;
        self.report.head_err_rad = steering_calc.head_err_rad;
        self.report.lookahead_fallback = steering_calc.lookahead_fallback;

        let vc = VehicleControl {
            throttle,
            brake,
            steering: steering_calc.steering,
            gear: GearMode::Drive,
            ..VehicleControl::default()
        };

        Ok((vc, self.report))
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
