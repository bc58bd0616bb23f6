//! # Data Store

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use crate::ctrl;
use crate::input::InputCtx;
use scene_if::scene::VehicleControl;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Global data store for the executable.
#[derive(Default)]
pub struct DataStore {
    /// Number of ticks already executed
    pub num_ticks: u128,

    /// True once the operator has requested a stop
    pub quit_requested: bool,

    /// Input-mode context, mutated by operator commands
    pub input_ctx: InputCtx,

    // DriveCtrl
    pub drive_ctrl: ctrl::DriveCtrl,
    pub drive_ctrl_output: VehicleControl,
    pub drive_ctrl_status_rpt: ctrl::StatusReport,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl DataStore {
    /// Perform actions required at the start of a tick.
    ///
    /// Clears those items that are rebuilt every tick.
    pub fn tick_start(&mut self) {
        self.drive_ctrl_output = VehicleControl::default();
        self.drive_ctrl_status_rpt = ctrl::StatusReport::default();
    }
}
