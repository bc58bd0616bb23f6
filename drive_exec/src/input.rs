//! # Input command processing
//!
//! Line commands typed on stdin give the operator scenario control (`retry`,
//! `skip`), the manual/auto toggle, gear selection and manual actuation
//! setpoints. A background thread parses each line into
//! a [`DriveCmd`] and hands it to the tick loop over a channel; the loop
//! drains pending commands non-blockingly once per tick.
//!
//! The manual state lives in an explicit [`InputCtx`] owned by the data
//! store and passed into the control call - there is no hidden shared state
//! between the input rig and the control algorithms.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::warn;
use std::io::BufRead;
use std::sync::mpsc::{channel, Receiver};
use std::thread;

// Internal
use crate::ctrl::CtrlMode;
use scene_if::scene::{GearMode, VehicleControl};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// A command typed by the operator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DriveCmd {
    /// Request a scenario restart.
    Retry,

    /// Request a scenario skip.
    Skip,

    /// Toggle between manual and algorithmic control.
    ToggleManual,

    /// Select the gear used while in manual control.
    SetGear(GearMode),

    /// Set the manual throttle position.
    Throttle(f64),

    /// Set the manual brake position.
    Brake(f64),

    /// Set the manual steering position.
    Steering(f64),

    /// Stop the executable after the current tick.
    Quit,
}

/// Possible errors when parsing a command line.
#[derive(Debug, thiserror::Error)]
pub enum CmdParseError {
    #[error("Unrecognised command: {0:?}")]
    UnknownCommand(String),

    #[error("Unrecognised gear: {0:?}")]
    UnknownGear(String),

    #[error("Missing value for {0:?}")]
    MissingValue(&'static str),

    #[error("Invalid value for {0:?}: {1:?}")]
    InvalidValue(&'static str, String),
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Source of operator commands, read from stdin on a background thread.
pub struct InputSource {
    receiver: Receiver<DriveCmd>,
}

/// The per-tick input-mode context.
///
/// Holds the manual/auto toggle and the manual command being built up from
/// operator setpoints.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputCtx {
    /// True if the manual command replaces the algorithmic output.
    pub manual: bool,

    /// The manual command. Setpoints are retained between ticks until
    /// changed by another command.
    pub manual_vc: VehicleControl,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl DriveCmd {
    /// Parse one command line.
    pub fn parse(line: &str) -> Result<Self, CmdParseError> {
        let mut tokens = line.split_whitespace();

        let keyword = match tokens.next() {
            Some(k) => k,
            None => return Err(CmdParseError::UnknownCommand(line.into())),
        };

        match keyword {
            "retry" => Ok(DriveCmd::Retry),
            "skip" => Ok(DriveCmd::Skip),
            "manual" | "m" => Ok(DriveCmd::ToggleManual),
            "quit" | "q" => Ok(DriveCmd::Quit),
            "gear" | "g" => match tokens.next() {
                Some("d") | Some("drive") => Ok(DriveCmd::SetGear(GearMode::Drive)),
                Some("r") | Some("reverse") => Ok(DriveCmd::SetGear(GearMode::Reverse)),
                Some("n") | Some("neutral") => Ok(DriveCmd::SetGear(GearMode::Neutral)),
                Some("p") | Some("park") => Ok(DriveCmd::SetGear(GearMode::Park)),
                Some(other) => Err(CmdParseError::UnknownGear(other.into())),
                None => Err(CmdParseError::MissingValue("gear")),
            },
            "throttle" | "t" => parse_value(tokens.next(), "throttle").map(DriveCmd::Throttle),
            "brake" | "b" => parse_value(tokens.next(), "brake").map(DriveCmd::Brake),
            "steer" | "s" => parse_value(tokens.next(), "steer").map(DriveCmd::Steering),
            other => Err(CmdParseError::UnknownCommand(other.into())),
        }
    }
}

impl InputSource {
    /// Start the stdin reader thread.
    pub fn start() -> Self {
        let (sender, receiver) = channel();

        thread::spawn(move || {
            let stdin = std::io::stdin();

            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(l) => l,
                    Err(_) => break,
                };

                if line.trim().is_empty() {
                    continue;
                }

                match DriveCmd::parse(&line) {
                    Ok(cmd) => {
                        // The receiver going away means the exec is stopping
                        if sender.send(cmd).is_err() {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                }
            }
        });

        Self { receiver }
    }

    /// Drain all commands received since the last call, without blocking.
    pub fn pending(&self) -> Vec<DriveCmd> {
        self.receiver.try_iter().collect()
    }
}

impl InputCtx {
    /// Apply a mode or setpoint command to the context.
    ///
    /// Scenario-control and quit commands are not mode changes and are
    /// handled by the caller.
    pub fn apply(&mut self, cmd: &DriveCmd) {
        match *cmd {
            DriveCmd::ToggleManual => self.manual = !self.manual,
            DriveCmd::SetGear(gear) => self.manual_vc.gear = gear,
            DriveCmd::Throttle(value) => self.manual_vc.throttle = value,
            DriveCmd::Brake(value) => self.manual_vc.brake = value,
            DriveCmd::Steering(value) => self.manual_vc.steering = value,
            DriveCmd::Retry | DriveCmd::Skip | DriveCmd::Quit => (),
        }
    }

    /// The command source to use for this tick.
    pub fn ctrl_mode(&self) -> CtrlMode {
        if self.manual {
            CtrlMode::Manual(self.manual_vc)
        } else {
            CtrlMode::Auto
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

fn parse_value(token: Option<&str>, name: &'static str) -> Result<f64, CmdParseError> {
    let token = token.ok_or(CmdParseError::MissingValue(name))?;

    token
        .parse()
        .map_err(|_| CmdParseError::InvalidValue(name, token.into()))
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
