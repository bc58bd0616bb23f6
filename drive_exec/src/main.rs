//! Main driving executable entry point.
//!
//! # Architecture
//!
//! The general execution methodology consists of:
//!
//!     - Initialise session, logging and modules
//!     - Accept the simulator connection and perform the handshake
//!     - Main loop, one tick per telemetry frame:
//!         - Blocking receive of the scene snapshot
//!         - Operator command processing
//!         - Drive control processing (or manual pass-through)
//!         - Blocking send of the control command
//!         - Snapshot delivery to the dashboard
//!
//! The loop is strictly sequential - one receive, one compute, one send per
//! tick, with no overlap. The session ends when the simulator sends the
//! scenario-end code, when the connection drops, or when the operator
//! requests a stop.

// ---------------------------------------------------------------------------
// USE MODULES FROM LIBRARY
// ---------------------------------------------------------------------------

use drive_lib::{
    ctrl::CtrlInput,
    dashboard::Dashboard,
    data_store::DataStore,
    input::{DriveCmd, InputSource},
    scene_client::{SceneClient, SceneClientError},
};

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use color_eyre::{
    eyre::{eyre, WrapErr},
    Report,
};
use log::{info, warn};
use std::env;

// Internal
use scene_if::net::{NetError, NetParams};
use util::{
    logger::{logger_init, LevelFilter},
    module::State,
    session::Session,
};

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Network parameter file, relative to the params directory.
const NET_PARAMS_FILE: &str = "net.toml";

/// Drive control parameter file, relative to the params directory.
const CTRL_PARAMS_FILE: &str = "drive_ctrl.toml";

// ---------------------------------------------------------------------------
// FUNCTIONS
// ---------------------------------------------------------------------------

/// Executable main function, entry point.
fn main() -> Result<(), Report> {
    // ---- EARLY INITIALISATION ----

    // Initialise session
    let session =
        Session::new("drive_exec", "sessions").wrap_err("Failed to create the session")?;

    // Initialise logger
    logger_init(LevelFilter::Trace, &session).wrap_err("Failed to initialise logging")?;

    // Log information on this execution.
    info!("Autodrive Executable\n");
    info!("Session directory: {:?}\n", session.session_root);

    // ---- ARGUMENT PROCESSING ----

    let args: Vec<String> = env::args().collect();

    let use_dashboard = match args.len() {
        1 => true,
        2 if args[1] == "--no-dashboard" => false,
        _ => {
            return Err(eyre!(
                "Expected either no argument or `--no-dashboard`, found {:?}",
                &args[1..]
            ))
        }
    };

    // ---- LOAD PARAMETERS ----

    let net_params: NetParams =
        util::params::load(NET_PARAMS_FILE).wrap_err("Could not load net params")?;

    info!("Exec parameters loaded");

    // ---- INITIALISE MODULES ----

    info!("Initialising modules...");

    let mut ds = DataStore::default();

    ds.drive_ctrl
        .init(CTRL_PARAMS_FILE, &session)
        .wrap_err("Failed to initialise DriveCtrl")?;
    info!("DriveCtrl init complete");

    info!("Module initialisation complete\n");

    // ---- INITIALISE INPUT SOURCE ----

    let input_source = InputSource::start();
    info!("Operator commands are read from stdin (`retry`, `skip`, `manual`, `gear d|r|n|p`, `t|b|s <value>`, `quit`)");

    // ---- INITIALISE NETWORK ----

    // Blocks until the simulator connects and completes the handshake
    let mut scene_client =
        SceneClient::connect(&net_params).wrap_err("Failed to connect to the simulator")?;

    // ---- INITIALISE DASHBOARD ----

    let dashboard = match use_dashboard {
        true => {
            let d = Dashboard::new(scene_client.road_lines());
            info!("Dashboard initialised");
            Some(d)
        }
        false => None,
    };

    // ---- MAIN LOOP ----

    scene_client.ready().wrap_err("Failed to signal readiness")?;

    info!("Begining main loop\n");

    loop {
        // ---- DATA INPUT ----

        let scene_info = match scene_client.get_scene_info() {
            Ok(Some(s)) => s,
            // Scenario end is the nominal way out of the loop
            Ok(None) => {
                info!("No more scenes, stopping");
                break;
            }
            Err(SceneClientError::NetError(NetError::ConnectionClosed)) => {
                warn!("Connection to the simulator lost, stopping");
                break;
            }
            Err(e) => return Err(e).wrap_err("Failed to get the scene info"),
        };

        ds.tick_start();

        // ---- OPERATOR COMMAND PROCESSING ----

        for cmd in input_source.pending() {
            match cmd {
                DriveCmd::Retry => scene_client.retry_level(),
                DriveCmd::Skip => scene_client.skip_level(),
                DriveCmd::Quit => ds.quit_requested = true,
                cmd => ds.input_ctx.apply(&cmd),
            }
        }

        if ds.quit_requested {
            info!("Operator requested stop");
            break;
        }

        // ---- CONTROL ALGORITHM PROCESSING ----

        let ctrl_input = CtrlInput {
            scene: scene_info.clone(),
            mode: ds.input_ctx.ctrl_mode(),
        };

        let (output, report) = ds
            .drive_ctrl
            .proc(&ctrl_input)
            .wrap_err("DriveCtrl processing failed")?;
        ds.drive_ctrl_output = output;
        ds.drive_ctrl_status_rpt = report;

        // ---- CONTROL OUTPUT ----

        scene_client
            .set_vehicle_control(&ds.drive_ctrl_output)
            .wrap_err("Failed to send the vehicle control")?;

        // ---- DASHBOARD ----

        if let Some(ref dashboard) = dashboard {
            dashboard.update(&scene_info);
        }

        // Increment tick counter
        ds.num_ticks += 1;
    }

    // ---- SHUTDOWN ----

    if let Some(dashboard) = dashboard {
        dashboard.quit();
        info!("Dashboard stopped");
    }

    info!("End of execution, {} ticks processed", ds.num_ticks);

    Ok(())
}
