//! # Scene data model
//!
//! Value types describing the state of the driving scene, derived each tick
//! from the decoded telemetry frame. A [`SceneInfo`] is rebuilt wholesale
//! from the latest frame - there is no carry-over state between ticks beyond
//! what the simulator itself encodes.
//!
//! Road-line geometry is the exception: it is loaded exactly once during the
//! handshake and is read-only for the remainder of the session.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// Internal
use crate::geom::Vector3;
use crate::msg::{ObstacleEntry, PoseGnss, RoadLineEntry, SimCarMsg, VehicleControlMsg};

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Possible errors when building the scene model from wire data.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("Unrecognised gear value from the simulator: {0}")]
    InvalidGear(i64),

    #[error("Unrecognised road line type: {0}")]
    InvalidRoadLineType(i64),
}

/// Gearbox mode of the ego vehicle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GearMode {
    Neutral,
    Drive,
    Reverse,
    Park,
}

/// Classification of a road line, as given by the map resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoadLineType {
    Null,
    MiddleLine,
    SideLine,
    SolidLine,
    StopLine,
    ZebraCrossing,
    DashLine,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Actuation command for the ego vehicle.
///
/// Throttle and brake are nominally in `[0, 1]` and steering in `[-1, 1]`,
/// but the model does not enforce this beyond what each control algorithm
/// naturally clamps - consumers must not assume universal clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleControl {
    pub throttle: f64,
    pub brake: f64,
    pub steering: f64,
    pub handbrake: bool,
    pub is_manual_gear: bool,
    pub gear: GearMode,
}

/// Pose, velocity and dimensions of an object in the scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectInfo {
    /// Position in the world frame.
    ///
    /// Units: meters
    pub pos_m: Vector3,

    /// Velocity in the world frame.
    ///
    /// Units: meters/second
    pub vel_ms: Vector3,

    /// Heading, counter-clockwise positive, derived from the simulator's
    /// clockwise-positive degrees orientation.
    ///
    /// Units: radians
    pub yaw_rad: f64,

    /// Bounding box dimensions.
    ///
    /// Units: meters
    pub length_m: f64,
    pub width_m: f64,
    pub height_m: f64,
}

/// An obstacle: a scene object plus the simulator's opaque type tag.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstacleInfo {
    pub object: ObjectInfo,
    pub obstacle_type: String,
}

/// A single road line, immutable once loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct RoadLineInfo {
    pub line_type: RoadLineType,

    /// Ordered polyline points.
    ///
    /// Units: meters
    pub points_m: Vec<Vector3>,
}

/// The reference trajectory for the current tick. Rebuilt every tick, no
/// identity across ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrajectoryInfo {
    /// Ordered trajectory points.
    ///
    /// Units: meters
    pub points_m: Vec<Vector3>,
}

/// Aggregate snapshot of one telemetry tick.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneInfo {
    /// Echo of the control command currently applied by the simulator.
    pub vehicle_control: VehicleControl,

    /// The ego vehicle's pose and dimensions.
    pub main_vehicle: ObjectInfo,

    /// The ego vehicle's speed over ground.
    ///
    /// Units: meters/second
    pub main_vehicle_speed_ms: f64,

    /// All obstacles in the scene, in the simulator's order.
    pub obstacles: Vec<ObstacleInfo>,

    /// The reference trajectory for this tick.
    pub trajectory: TrajectoryInfo,
}

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Convert the simulator's `oriZ` orientation (degrees, clockwise positive)
/// into a heading (radians, counter-clockwise positive).
pub fn ori_z_to_yaw_rad(ori_z_deg: f64) -> f64 {
    (-ori_z_deg).to_radians()
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl GearMode {
    /// Decode the wire integer, failing on unknown values.
    pub fn from_wire(value: i64) -> Result<Self, SceneError> {
        match value {
            0 => Ok(GearMode::Neutral),
            1 => Ok(GearMode::Drive),
            2 => Ok(GearMode::Reverse),
            3 => Ok(GearMode::Park),
            _ => Err(SceneError::InvalidGear(value)),
        }
    }

    pub fn to_wire(self) -> i64 {
        match self {
            GearMode::Neutral => 0,
            GearMode::Drive => 1,
            GearMode::Reverse => 2,
            GearMode::Park => 3,
        }
    }
}

impl Default for GearMode {
    fn default() -> Self {
        GearMode::Drive
    }
}

impl RoadLineType {
    /// Decode the wire integer, failing on unknown values.
    pub fn from_wire(value: i64) -> Result<Self, SceneError> {
        match value {
            0 => Ok(RoadLineType::Null),
            1 => Ok(RoadLineType::MiddleLine),
            2 => Ok(RoadLineType::SideLine),
            3 => Ok(RoadLineType::SolidLine),
            4 => Ok(RoadLineType::StopLine),
            5 => Ok(RoadLineType::ZebraCrossing),
            6 => Ok(RoadLineType::DashLine),
            _ => Err(SceneError::InvalidRoadLineType(value)),
        }
    }
}

impl Default for VehicleControl {
    fn default() -> Self {
        Self {
            throttle: 0.0,
            brake: 0.0,
            steering: 0.0,
            handbrake: false,
            is_manual_gear: false,
            gear: GearMode::default(),
        }
    }
}

impl VehicleControl {
    /// Build the model from the telemetry echo.
    pub fn from_msg(msg: &VehicleControlMsg) -> Result<Self, SceneError> {
        Ok(Self {
            throttle: msg.throttle,
            brake: msg.brake,
            steering: msg.steering,
            handbrake: msg.handbrake,
            is_manual_gear: msg.is_manual_gear,
            gear: GearMode::from_wire(msg.gear)?,
        })
    }

    /// Build the wire view, attaching the scenario-control counters.
    pub fn to_msg(&self, move_to_start: u64, move_to_end: u64) -> VehicleControlMsg {
        VehicleControlMsg {
            throttle: self.throttle,
            brake: self.brake,
            steering: self.steering,
            handbrake: self.handbrake,
            is_manual_gear: self.is_manual_gear,
            gear: self.gear.to_wire(),
            movetostart: move_to_start,
            movetoend: move_to_end,
        }
    }
}

impl ObjectInfo {
    fn from_pose(pose: &PoseGnss, length_m: f64, width_m: f64, height_m: f64) -> Self {
        Self {
            pos_m: Vector3::new(pose.pos_x, pose.pos_y, pose.pos_z),
            vel_ms: Vector3::new(pose.vel_x, pose.vel_y, pose.vel_z),
            yaw_rad: ori_z_to_yaw_rad(pose.ori_z),
            length_m,
            width_m,
            height_m,
        }
    }
}

impl ObstacleInfo {
    fn from_entry(entry: ObstacleEntry) -> Self {
        Self {
            object: ObjectInfo {
                pos_m: Vector3::new(entry.pos_x, entry.pos_y, entry.pos_z),
                vel_ms: Vector3::new(entry.vel_x, entry.vel_y, entry.vel_z),
                yaw_rad: ori_z_to_yaw_rad(entry.ori_z),
                length_m: entry.length,
                width_m: entry.width,
                height_m: entry.height,
            },
            obstacle_type: entry.obstacle_type,
        }
    }
}

impl RoadLineInfo {
    /// Build a road line from one entry of the map's road-line resource.
    pub fn from_entry(entry: RoadLineEntry) -> Result<Self, SceneError> {
        Ok(Self {
            line_type: RoadLineType::from_wire(entry.line_type)?,
            points_m: entry.point_path,
        })
    }
}

impl SceneInfo {
    /// Build a full scene snapshot from a decoded telemetry body.
    pub fn from_msg(msg: SimCarMsg) -> Result<Self, SceneError> {
        let vehicle_control = VehicleControl::from_msg(&msg.vehicle_control)?;

        let main_vehicle = ObjectInfo::from_pose(
            &msg.data_gnss.pose_gnss,
            msg.data_main_vehicle.length,
            msg.data_main_vehicle.width,
            msg.data_main_vehicle.height,
        );

        let obstacles = msg
            .obstacle_entry_list
            .into_iter()
            .map(ObstacleInfo::from_entry)
            .collect();

        let trajectory = TrajectoryInfo {
            points_m: msg
                .trajectory
                .trajectory
                .into_iter()
                .map(|entry| entry.p)
                .collect(),
        };

        Ok(Self {
            vehicle_control,
            main_vehicle,
            main_vehicle_speed_ms: msg.data_main_vehicle.speed,
            obstacles,
            trajectory,
        })
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    const EPSILON: f64 = 1e-4;

    #[test]
    fn test_ori_z_conversion() {
        // Clockwise-positive degrees map to counter-clockwise-positive
        // radians with a sign flip
        assert!((ori_z_to_yaw_rad(90.0) + 1.5708).abs() < EPSILON);
        assert_eq!(ori_z_to_yaw_rad(0.0), 0.0);
        assert!((ori_z_to_yaw_rad(-90.0) - 1.5708).abs() < EPSILON);
    }

    #[test]
    fn test_gear_wire_conversion() {
        for &(gear, wire) in &[
            (GearMode::Neutral, 0),
            (GearMode::Drive, 1),
            (GearMode::Reverse, 2),
            (GearMode::Park, 3),
        ] {
            assert_eq!(gear.to_wire(), wire);
            assert_eq!(GearMode::from_wire(wire).unwrap(), gear);
        }

        assert!(GearMode::from_wire(7).is_err());
    }

    #[test]
    fn test_road_line_type_conversion() {
        assert_eq!(RoadLineType::from_wire(0).unwrap(), RoadLineType::Null);
        assert_eq!(
            RoadLineType::from_wire(5).unwrap(),
            RoadLineType::ZebraCrossing
        );
        assert!(RoadLineType::from_wire(99).is_err());
    }

    #[test]
    fn test_vehicle_control_round_trip() {
        let vc = VehicleControl {
            throttle: 0.3,
            brake: 0.0,
            steering: -1.0,
            handbrake: true,
            is_manual_gear: true,
            gear: GearMode::Reverse,
        };

        let msg = vc.to_msg(4, 2);
        assert_eq!(msg.gear, 2);
        assert_eq!(msg.movetostart, 4);
        assert_eq!(msg.movetoend, 2);

        assert_eq!(VehicleControl::from_msg(&msg).unwrap(), vc);
    }

    #[test]
    fn test_scene_from_msg() {
        let raw = serde_json::json!({
            "VehicleControl": {
                "throttle": 0.2, "brake": 0.0, "steering": 0.1,
                "handbrake": false, "isManualGear": false, "gear": 1
            },
            "DataGnss": {
                "poseGnss": {
                    "posX": 1.0, "posY": 2.0, "posZ": 3.0,
                    "velX": 4.0, "velY": 5.0, "velZ": 6.0,
                    "oriX": 0.0, "oriY": 0.0, "oriZ": 180.0
                }
            },
            "DataMainVehilce": {
                "length": 4.0, "width": 2.0, "height": 1.5, "speed": 8.0
            },
            "ObstacleEntryList": [
                {
                    "posX": 9.0, "posY": 8.0, "posZ": 7.0,
                    "velX": 0.0, "velY": 0.0, "velZ": 0.0,
                    "oriX": 0.0, "oriY": 0.0, "oriZ": -90.0,
                    "length": 1.0, "width": 1.0, "height": 1.0,
                    "type": "car"
                }
            ],
            "Trajectory": {
                "trajectory": [
                    {"P": {"x": 1.0, "y": 2.0, "z": 0.0}},
                    {"P": {"x": 2.0, "y": 2.0, "z": 0.0}},
                    {"P": {"x": 3.0, "y": 2.0, "z": 0.0}}
                ]
            }
        });

        let msg: SimCarMsg = serde_json::from_value(raw).unwrap();
        let scene = SceneInfo::from_msg(msg).unwrap();

        assert_eq!(scene.main_vehicle.pos_m, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(scene.main_vehicle.vel_ms, Vector3::new(4.0, 5.0, 6.0));
        assert!((scene.main_vehicle.yaw_rad + std::f64::consts::PI).abs() < EPSILON);
        assert_eq!(scene.main_vehicle_speed_ms, 8.0);
        assert_eq!(scene.vehicle_control.gear, GearMode::Drive);

        assert_eq!(scene.obstacles.len(), 1);
        assert_eq!(scene.obstacles[0].obstacle_type, "car");
        assert!(
            (scene.obstacles[0].object.yaw_rad - std::f64::consts::FRAC_PI_2).abs() < EPSILON
        );

        assert_eq!(scene.trajectory.points_m.len(), 3);
        assert_eq!(scene.trajectory.points_m[2], Vector3::new(3.0, 2.0, 0.0));
    }

    #[test]
    fn test_scene_from_msg_invalid_gear() {
        let raw = serde_json::json!({
            "VehicleControl": {
                "throttle": 0.0, "brake": 0.0, "steering": 0.0,
                "handbrake": false, "isManualGear": false, "gear": 9
            },
            "DataGnss": {
                "poseGnss": {
                    "posX": 0.0, "posY": 0.0, "posZ": 0.0,
                    "velX": 0.0, "velY": 0.0, "velZ": 0.0,
                    "oriX": 0.0, "oriY": 0.0, "oriZ": 0.0
                }
            },
            "DataMainVehilce": {
                "length": 4.0, "width": 2.0, "height": 1.5, "speed": 0.0
            },
            "ObstacleEntryList": [],
            "Trajectory": {"trajectory": []}
        });

        let msg: SimCarMsg = serde_json::from_value(raw).unwrap();
        assert!(SceneInfo::from_msg(msg).is_err());
    }
}
