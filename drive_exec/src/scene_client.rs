//! # Scene Client
//!
//! The SceneClient owns the single TCP session with the driving simulator.
//! It performs the handshake (including the one-off road-line ingestion),
//! signals readiness, and exchanges one telemetry/control frame pair per
//! tick.
//!
//! The session moves through the states
//! `Connected -> Handshaken -> Ready -> Running` and ends in either `Ended`
//! (the simulator sent the scenario-end code) or `Closed` (the connection
//! dropped mid-session). There is no reconnection - any mid-session drop is
//! terminal and propagates to the caller.
//!
//! Scenario restart/skip requests go out as a side channel on every control
//! frame: two monotonic counters which the simulator compares against the
//! previous tick, acting once per increment. The counters are never reset.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

// External
use log::{info, warn};
use std::fs;
use std::path::PathBuf;

// Internal
use scene_if::msg::{self, ControlFrame, Frame, HandshakeMsg, RoadLineEntry, SimCarMsg};
use scene_if::net::{FramedSocket, NetError, NetParams};
use scene_if::scene::{RoadLineInfo, SceneError, SceneInfo, VehicleControl};

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Client for the simulator's scene protocol.
pub struct SceneClient {
    socket: FramedSocket,

    state: SessionState,

    /// Road lines, loaded once during the handshake and read-only afterwards.
    road_lines: Vec<RoadLineInfo>,

    /// Scenario restart counter, incremented by [`SceneClient::retry_level`].
    move_to_start: u64,

    /// Scenario skip counter, incremented by [`SceneClient::skip_level`].
    move_to_end: u64,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// The state of the protocol session.
///
/// A client is only ever created from an accepted connection, so the
/// earliest observable state is `Connected` - "disconnected" is simply the
/// absence of a client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// The simulator has connected but the handshake is incomplete.
    Connected,

    /// Handshake complete, road lines loaded.
    Handshaken,

    /// Readiness signalled, waiting for the first telemetry frame.
    Ready,

    /// Telemetry is flowing.
    Running,

    /// The simulator ended the scenario; the transport has been closed.
    Ended,

    /// The connection dropped mid-session.
    Closed,
}

#[derive(Debug, thiserror::Error)]
pub enum SceneClientError {
    #[error("Network error: {0}")]
    NetError(NetError),

    #[error("Handshake failed, the simulator sent code {0}")]
    HandshakeFailed(i64),

    #[error("Frame with code {0} is missing its SimCarMsg body")]
    MissingBody(i64),

    #[error("Could not parse the message body: {0}")]
    MalformedBody(serde_json::Error),

    #[error("Could not read the road line resource {0:?}: {1}")]
    RoadLineFileError(PathBuf, std::io::Error),

    #[error("Could not parse the road line resource: {0}")]
    RoadLineParseError(serde_json::Error),

    #[error("Invalid scene data: {0}")]
    SceneDataError(SceneError),
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl SceneClient {
    /// Accept the simulator's connection and complete the handshake.
    ///
    /// Blocks until the simulator connects to the bind address, then performs
    /// [`SceneClient::handshake`] on the accepted connection.
    pub fn connect(params: &NetParams) -> Result<Self, SceneClientError> {
        let socket = FramedSocket::listen(&params.scene_bind_address)
            .map_err(|e| SceneClientError::NetError(e))?;

        Self::handshake(socket)
    }

    /// Complete the handshake on an already-accepted connection.
    ///
    /// The first frame must carry the handshake code - anything else is a
    /// fatal handshake failure, with no retry. The map resource path from the
    /// handshake is used to load the road-line set, which is immutable for
    /// the rest of the session.
    pub fn handshake(socket: FramedSocket) -> Result<Self, SceneClientError> {
        let mut client = Self {
            socket,
            state: SessionState::Connected,
            road_lines: Vec::new(),
            move_to_start: 0,
            move_to_end: 0,
        };

        let frame: Frame = client
            .socket
            .recv()
            .map_err(|e| SceneClientError::NetError(e))?;

        if frame.code != msg::CODE_HANDSHAKE {
            return Err(SceneClientError::HandshakeFailed(frame.code));
        }

        let body = frame
            .sim_car_msg
            .ok_or(SceneClientError::MissingBody(frame.code))?;
        let handshake: HandshakeMsg =
            serde_json::from_value(body).map_err(|e| SceneClientError::MalformedBody(e))?;

        client.road_lines = read_road_lines(&handshake.map_info.path)?;
        client.state = SessionState::Handshaken;

        info!(
            "Handshake complete, {} road lines loaded",
            client.road_lines.len()
        );

        Ok(client)
    }

    /// Signal readiness for the first telemetry tick.
    pub fn ready(&mut self) -> Result<(), SceneClientError> {
        self.socket
            .send(&msg::ReadyFrame::new())
            .map_err(|e| SceneClientError::NetError(e))?;

        self.state = SessionState::Ready;

        Ok(())
    }

    /// The road-line set loaded during the handshake.
    ///
    /// The set is large and static, which is why the simulator transmits it
    /// once rather than on every tick. Callers must treat it as read-only for
    /// the session.
    pub fn road_lines(&self) -> &[RoadLineInfo] {
        &self.road_lines
    }

    /// The current session state.
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Block until the next scene snapshot arrives.
    ///
    /// Returns `Ok(None)` once the simulator has ended the scenario. The
    /// transport is closed exactly once on scenario end - later calls keep
    /// returning `Ok(None)` without touching the socket.
    pub fn get_scene_info(&mut self) -> Result<Option<SceneInfo>, SceneClientError> {
        if self.state == SessionState::Ended {
            return Ok(None);
        }

        let frame: Frame = match self.socket.recv() {
            Ok(f) => f,
            Err(NetError::ConnectionClosed) => {
                self.state = SessionState::Closed;
                return Err(SceneClientError::NetError(NetError::ConnectionClosed));
            }
            Err(e) => return Err(SceneClientError::NetError(e)),
        };

        if frame.code == msg::CODE_SCENE_END {
            info!("Scenario ended by the simulator");
            self.socket.close();
            self.state = SessionState::Ended;
            return Ok(None);
        }

        let body = frame
            .sim_car_msg
            .ok_or(SceneClientError::MissingBody(frame.code))?;
        let sim_car_msg: SimCarMsg =
            serde_json::from_value(body).map_err(|e| SceneClientError::MalformedBody(e))?;

        let scene_info =
            SceneInfo::from_msg(sim_car_msg).map_err(|e| SceneClientError::SceneDataError(e))?;

        self.state = SessionState::Running;

        Ok(Some(scene_info))
    }

    /// Send the control command for this tick, along with the current
    /// scenario-control counters.
    pub fn set_vehicle_control(&mut self, vc: &VehicleControl) -> Result<(), SceneClientError> {
        let frame = ControlFrame::new(vc.to_msg(self.move_to_start, self.move_to_end));

        self.socket
            .send(&frame)
            .map_err(|e| SceneClientError::NetError(e))
    }

    /// Request a scenario restart.
    ///
    /// The simulator acts on the counter delta, so repeated calls within one
    /// tick collapse into a single restart.
    pub fn retry_level(&mut self) {
        self.move_to_start += 1;
        info!("Scenario restart requested");
    }

    /// Request a scenario skip.
    pub fn skip_level(&mut self) {
        self.move_to_end += 1;
        info!("Scenario skip requested");
    }
}

// ------------------------------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ------------------------------------------------------------------------------------------------

/// Load the road-line set from the map resource directory.
fn read_road_lines(map_path: &str) -> Result<Vec<RoadLineInfo>, SceneClientError> {
    let mut path = PathBuf::from(map_path);
    path.push("rd");

    let contents = match fs::read_to_string(&path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Road line resource {:?} could not be read", path);
            return Err(SceneClientError::RoadLineFileError(path, e));
        }
    };

    let entries: Vec<RoadLineEntry> =
        serde_json::from_str(&contents).map_err(|e| SceneClientError::RoadLineParseError(e))?;

    entries
        .into_iter()
        .map(|entry| RoadLineInfo::from_entry(entry).map_err(|e| SceneClientError::SceneDataError(e)))
        .collect()
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::{json, Value};
    use std::net::{TcpListener, TcpStream};
    use std::thread;

    /// Write a two-line road-line resource into a unique temp map directory.
    fn write_map_resource(name: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("autodrive_test_{}_{}", name, std::process::id()));
        fs::create_dir_all(&dir).unwrap();

        let mut rd = dir.clone();
        rd.push("rd");
        fs::write(
            &rd,
            r#"[
                {"Type": 1, "PointPath": [
                    {"x": 0.0, "y": 0.0, "z": 0.0},
                    {"x": 1.0, "y": 0.0, "z": 0.0}
                ]},
                {"Type": 6, "PointPath": [
                    {"x": 0.0, "y": 3.5, "z": 0.0}
                ]}
            ]"#,
        )
        .unwrap();

        dir
    }

    fn telemetry_frame(speed: f64) -> Value {
        json!({
            "code": 4,
            "SimCarMsg": {
                "VehicleControl": {
                    "throttle": 0.0, "brake": 0.0, "steering": 0.0,
                    "handbrake": false, "isManualGear": false, "gear": 1
                },
                "DataGnss": {
                    "poseGnss": {
                        "posX": 0.0, "posY": 0.0, "posZ": 0.0,
                        "velX": speed, "velY": 0.0, "velZ": 0.0,
                        "oriX": 0.0, "oriY": 0.0, "oriZ": 0.0
                    }
                },
                "DataMainVehilce": {
                    "length": 4.6, "width": 1.9, "height": 1.5, "speed": speed
                },
                "ObstacleEntryList": [],
                "Trajectory": {
                    "trajectory": [
                        {"P": {"x": 0.0, "y": 0.0, "z": 0.0}},
                        {"P": {"x": 1.0, "y": 0.0, "z": 0.0}},
                        {"P": {"x": 2.0, "y": 0.0, "z": 0.0}},
                        {"P": {"x": 3.0, "y": 0.0, "z": 0.0}}
                    ]
                }
            }
        })
    }

    /// A connected (client, sim-side) socket pair over loopback.
    fn socket_pair() -> (FramedSocket, FramedSocket) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let address = listener.local_addr().unwrap();

        let sim = TcpStream::connect(address).unwrap();
        let (client, _) = listener.accept().unwrap();

        (
            FramedSocket::from_stream(client),
            FramedSocket::from_stream(sim),
        )
    }

    #[test]
    fn test_full_session() {
        let map_dir = write_map_resource("full_session");
        let map_path = map_dir.to_str().unwrap().to_string();

        let (client_socket, mut sim_socket) = socket_pair();

        let sim = thread::spawn(move || {
            // Handshake
            sim_socket
                .send(&json!({"code": 1, "SimCarMsg": {"MapInfo": {"path": map_path}}}))
                .unwrap();

            // Readiness
            let ready: Value = sim_socket.recv().unwrap();
            assert_eq!(ready["code"], 2);

            // One telemetry/control tick
            sim_socket.send(&telemetry_frame(12.0)).unwrap();
            let control: Value = sim_socket.recv().unwrap();
            assert_eq!(control["code"], 4);
            assert_eq!(
                control["SimCarMsg"]["VehicleControl"]["movetostart"],
                1
            );
            assert_eq!(control["SimCarMsg"]["VehicleControl"]["movetoend"], 0);

            // Scenario end
            sim_socket.send(&json!({"code": 5})).unwrap();
        });

        let mut client = SceneClient::handshake(client_socket).unwrap();
        assert_eq!(client.state(), SessionState::Handshaken);
        assert_eq!(client.road_lines().len(), 2);

        let road_lines_before = client.road_lines().to_vec();

        client.ready().unwrap();
        assert_eq!(client.state(), SessionState::Ready);

        let scene_info = client.get_scene_info().unwrap().unwrap();
        assert_eq!(client.state(), SessionState::Running);
        assert_eq!(scene_info.main_vehicle_speed_ms, 12.0);
        assert_eq!(scene_info.trajectory.points_m.len(), 4);

        client.retry_level();
        client.set_vehicle_control(&VehicleControl::default()).unwrap();

        // Scenario end: one close, then the sentinel forever after
        assert!(client.get_scene_info().unwrap().is_none());
        assert_eq!(client.state(), SessionState::Ended);
        assert!(client.get_scene_info().unwrap().is_none());
        assert_eq!(client.state(), SessionState::Ended);

        // Road lines are untouched by a full session
        assert_eq!(road_lines_before, client.road_lines());

        sim.join().unwrap();
    }

    #[test]
    fn test_handshake_bad_code() {
        let (client_socket, mut sim_socket) = socket_pair();

        let sim = thread::spawn(move || {
            sim_socket.send(&json!({"code": 4})).unwrap();
        });

        match SceneClient::handshake(client_socket) {
            Err(SceneClientError::HandshakeFailed(4)) => (),
            other => panic!("Expected HandshakeFailed, got {:?}", other.map(|_| ())),
        }

        sim.join().unwrap();
    }

    #[test]
    fn test_connection_drop_is_terminal() {
        let map_dir = write_map_resource("conn_drop");
        let map_path = map_dir.to_str().unwrap().to_string();

        let (client_socket, mut sim_socket) = socket_pair();

        let sim = thread::spawn(move || {
            sim_socket
                .send(&json!({"code": 1, "SimCarMsg": {"MapInfo": {"path": map_path}}}))
                .unwrap();
            // Drop the connection without ending the scenario
        });

        let mut client = SceneClient::handshake(client_socket).unwrap();
        sim.join().unwrap();

        match client.get_scene_info() {
            Err(SceneClientError::NetError(NetError::ConnectionClosed)) => (),
            other => panic!("Expected ConnectionClosed, got {:?}", other.map(|_| ())),
        }
        assert_eq!(client.state(), SessionState::Closed);
    }
}
