//! # Wire message definitions
//!
//! Raw serde views of the frames exchanged with the simulator. Field names
//! mirror the simulator's JSON exactly, including the `DataMainVehilce`
//! spelling - these are the simulator's names, not ours.
//!
//! Every frame carries an integer `code` identifying its intent:
//! 1 = handshake, 2 = ready, 4 = control/telemetry, 5 = scenario end.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Internal
use crate::geom::Vector3;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// First frame of a session, sent by the simulator.
pub const CODE_HANDSHAKE: i64 = 1;

/// Readiness signal, sent by the client after the handshake.
pub const CODE_READY: i64 = 2;

/// Per-tick telemetry (simulator to client) and control (client to
/// simulator) frames.
pub const CODE_TICK: i64 = 4;

/// Scenario end, sent by the simulator. Carries no further payload.
pub const CODE_SCENE_END: i64 = 5;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An incoming frame. The body is kept as raw JSON until the code has been
/// inspected, since its shape depends on the code.
#[derive(Debug, Deserialize)]
pub struct Frame {
    pub code: i64,

    #[serde(rename = "SimCarMsg", default)]
    pub sim_car_msg: Option<Value>,
}

/// The readiness frame sent to the simulator, `{"code": 2}`.
#[derive(Debug, Serialize)]
pub struct ReadyFrame {
    pub code: i64,
}

/// The per-tick control frame sent to the simulator.
#[derive(Debug, Serialize)]
pub struct ControlFrame {
    pub code: i64,

    #[serde(rename = "SimCarMsg")]
    pub sim_car_msg: ControlMsg,
}

/// Body of a control frame.
#[derive(Debug, Serialize)]
pub struct ControlMsg {
    #[serde(rename = "VehicleControl")]
    pub vehicle_control: VehicleControlMsg,
}

/// Wire view of a vehicle control command.
///
/// `movetostart`/`movetoend` are the scenario-control side channel: the
/// simulator acts once on each increment since the previous tick. They are
/// defaulted on receive since the telemetry echo may omit them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleControlMsg {
    pub throttle: f64,
    pub brake: f64,
    pub steering: f64,
    pub handbrake: bool,

    #[serde(rename = "isManualGear")]
    pub is_manual_gear: bool,

    pub gear: i64,

    #[serde(default)]
    pub movetostart: u64,

    #[serde(default)]
    pub movetoend: u64,
}

/// Body of the handshake frame.
#[derive(Debug, Deserialize)]
pub struct HandshakeMsg {
    #[serde(rename = "MapInfo")]
    pub map_info: MapInfo,
}

#[derive(Debug, Deserialize)]
pub struct MapInfo {
    /// Path to the map resource directory. The road-line resource is the
    /// sibling file `<path>/rd`.
    pub path: String,
}

/// Body of a telemetry frame.
#[derive(Debug, Deserialize)]
pub struct SimCarMsg {
    #[serde(rename = "VehicleControl")]
    pub vehicle_control: VehicleControlMsg,

    #[serde(rename = "DataGnss")]
    pub data_gnss: DataGnss,

    #[serde(rename = "DataMainVehilce")]
    pub data_main_vehicle: MainVehicleData,

    #[serde(rename = "ObstacleEntryList")]
    pub obstacle_entry_list: Vec<ObstacleEntry>,

    #[serde(rename = "Trajectory")]
    pub trajectory: TrajectoryMsg,
}

#[derive(Debug, Deserialize)]
pub struct DataGnss {
    #[serde(rename = "poseGnss")]
    pub pose_gnss: PoseGnss,
}

/// GNSS pose of the ego vehicle.
///
/// Orientations are in degrees, clockwise positive - the simulator's
/// convention, not ours.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct PoseGnss {
    #[serde(rename = "posX")]
    pub pos_x: f64,
    #[serde(rename = "posY")]
    pub pos_y: f64,
    #[serde(rename = "posZ")]
    pub pos_z: f64,

    #[serde(rename = "velX")]
    pub vel_x: f64,
    #[serde(rename = "velY")]
    pub vel_y: f64,
    #[serde(rename = "velZ")]
    pub vel_z: f64,

    #[serde(rename = "oriX")]
    pub ori_x: f64,
    #[serde(rename = "oriY")]
    pub ori_y: f64,
    #[serde(rename = "oriZ")]
    pub ori_z: f64,
}

/// Dimensions and speed of the ego vehicle.
#[derive(Debug, Deserialize)]
pub struct MainVehicleData {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub speed: f64,
}

/// One entry of the obstacle list.
#[derive(Debug, Deserialize)]
pub struct ObstacleEntry {
    #[serde(rename = "posX")]
    pub pos_x: f64,
    #[serde(rename = "posY")]
    pub pos_y: f64,
    #[serde(rename = "posZ")]
    pub pos_z: f64,

    #[serde(rename = "velX")]
    pub vel_x: f64,
    #[serde(rename = "velY")]
    pub vel_y: f64,
    #[serde(rename = "velZ")]
    pub vel_z: f64,

    #[serde(rename = "oriX")]
    pub ori_x: f64,
    #[serde(rename = "oriY")]
    pub ori_y: f64,
    #[serde(rename = "oriZ")]
    pub ori_z: f64,

    pub length: f64,
    pub width: f64,
    pub height: f64,

    /// Opaque simulator-native tag, passed through untouched.
    #[serde(rename = "type")]
    pub obstacle_type: String,
}

#[derive(Debug, Deserialize)]
pub struct TrajectoryMsg {
    pub trajectory: Vec<TrajectoryEntry>,
}

#[derive(Debug, Deserialize)]
pub struct TrajectoryEntry {
    #[serde(rename = "P")]
    pub p: Vector3,
}

/// One entry of the road-line resource file at `<MapInfo.path>/rd`.
#[derive(Debug, Deserialize)]
pub struct RoadLineEntry {
    #[serde(rename = "Type")]
    pub line_type: i64,

    #[serde(rename = "PointPath")]
    pub point_path: Vec<Vector3>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl ReadyFrame {
    pub fn new() -> Self {
        Self { code: CODE_READY }
    }
}

impl Default for ReadyFrame {
    fn default() -> Self {
        Self::new()
    }
}

impl ControlFrame {
    pub fn new(vehicle_control: VehicleControlMsg) -> Self {
        Self {
            code: CODE_TICK,
            sim_car_msg: ControlMsg { vehicle_control },
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_handshake() {
        let raw = r#"{"code": 1, "SimCarMsg": {"MapInfo": {"path": "/maps/level_3"}}}"#;

        let frame: Frame = serde_json::from_str(raw).unwrap();
        assert_eq!(frame.code, CODE_HANDSHAKE);

        let msg: HandshakeMsg = serde_json::from_value(frame.sim_car_msg.unwrap()).unwrap();
        assert_eq!(msg.map_info.path, "/maps/level_3");
    }

    #[test]
    fn test_deserialize_scene_end() {
        let frame: Frame = serde_json::from_str(r#"{"code": 5}"#).unwrap();

        assert_eq!(frame.code, CODE_SCENE_END);
        assert!(frame.sim_car_msg.is_none());
    }

    #[test]
    fn test_deserialize_telemetry() {
        let raw = json!({
            "code": 4,
            "SimCarMsg": {
                "VehicleControl": {
                    "throttle": 0.5,
                    "brake": 0.0,
                    "steering": -0.25,
                    "handbrake": false,
                    "isManualGear": false,
                    "gear": 1
                },
                "DataGnss": {
                    "poseGnss": {
                        "posX": 10.0, "posY": -2.0, "posZ": 0.1,
                        "velX": 5.0, "velY": 0.0, "velZ": 0.0,
                        "oriX": 0.0, "oriY": 0.0, "oriZ": 90.0
                    }
                },
                "DataMainVehilce": {
                    "length": 4.6, "width": 1.9, "height": 1.5, "speed": 5.0
                },
                "ObstacleEntryList": [
                    {
                        "posX": 20.0, "posY": 0.0, "posZ": 0.0,
                        "velX": 0.0, "velY": 0.0, "velZ": 0.0,
                        "oriX": 0.0, "oriY": 0.0, "oriZ": 0.0,
                        "length": 0.6, "width": 0.6, "height": 1.7,
                        "type": "pedestrian"
                    }
                ],
                "Trajectory": {
                    "trajectory": [
                        {"P": {"x": 10.0, "y": -2.0, "z": 0.0}},
                        {"P": {"x": 11.0, "y": -2.0, "z": 0.0}}
                    ]
                }
            }
        });

        let frame: Frame = serde_json::from_value(raw).unwrap();
        assert_eq!(frame.code, CODE_TICK);

        let msg: SimCarMsg = serde_json::from_value(frame.sim_car_msg.unwrap()).unwrap();
        assert_eq!(msg.vehicle_control.throttle, 0.5);
        // Counters omitted by the echo default to zero
        assert_eq!(msg.vehicle_control.movetostart, 0);
        assert_eq!(msg.data_gnss.pose_gnss.ori_z, 90.0);
        assert_eq!(msg.data_main_vehicle.speed, 5.0);
        assert_eq!(msg.obstacle_entry_list.len(), 1);
        assert_eq!(msg.obstacle_entry_list[0].obstacle_type, "pedestrian");
        assert_eq!(msg.trajectory.trajectory.len(), 2);
        assert_eq!(msg.trajectory.trajectory[1].p.x, 11.0);
    }

    #[test]
    fn test_serialize_control_frame() {
        let frame = ControlFrame::new(VehicleControlMsg {
            throttle: 1.0,
            brake: 0.0,
            steering: 0.5,
            handbrake: false,
            is_manual_gear: false,
            gear: 1,
            movetostart: 2,
            movetoend: 0,
        });

        let value = serde_json::to_value(&frame).unwrap();

        assert_eq!(
            value,
            json!({
                "code": 4,
                "SimCarMsg": {
                    "VehicleControl": {
                        "throttle": 1.0,
                        "brake": 0.0,
                        "steering": 0.5,
                        "handbrake": false,
                        "isManualGear": false,
                        "gear": 1,
                        "movetostart": 2,
                        "movetoend": 0
                    }
                }
            })
        );
    }

    #[test]
    fn test_serialize_ready_frame() {
        let value = serde_json::to_value(&ReadyFrame::new()).unwrap();
        assert_eq!(value, json!({"code": 2}));
    }

    #[test]
    fn test_deserialize_road_line_entry() {
        let raw = r#"[{"Type": 6, "PointPath": [{"x": 0.0, "y": 1.0, "z": 0.0}]}]"#;

        let entries: Vec<RoadLineEntry> = serde_json::from_str(raw).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].line_type, 6);
        assert_eq!(entries[0].point_path[0].y, 1.0);
    }
}
