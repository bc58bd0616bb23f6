//! # Dashboard
//!
//! Renders scene snapshots on a dedicated worker thread, decoupled from the
//! tick loop's blocking socket I/O. Snapshots reach the worker through a
//! one-directional channel; delivery is best-effort - an update sent to a
//! worker that has already terminated is silently dropped, which is a
//! liveness policy rather than an error.
//!
//! On shutdown the worker processes every update queued before the quit
//! request, then exits, so no snapshot handed over before `quit` is lost.
//!
//! The render itself is a rate-limited status line: the control echo, ego
//! speed/pose/heading, obstacle count and the number of road-line points
//! near the ego (answered by a quadtree built once over the static road-line
//! geometry).

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use log::info;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

// Internal
use scene_if::geom::Vector2;
use scene_if::scene::{RoadLineInfo, SceneInfo};
use util::quadtree::QuadTree;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Minimum time between two rendered status lines.
const RENDER_PERIOD: Duration = Duration::from_secs(1);

/// Radius of the "nearby road lines" query around the ego position.
///
/// Units: meters
const NEARBY_RADIUS_M: f64 = 30.0;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Handle to the dashboard worker.
pub struct Dashboard {
    sender: Sender<DashboardMsg>,

    join_handle: Option<JoinHandle<()>>,

    /// Lowered by the worker when it exits.
    alive: Arc<AtomicBool>,
}

// ---------------------------------------------------------------------------
// ENUMS
// ---------------------------------------------------------------------------

enum DashboardMsg {
    Update(Box<SceneInfo>),
    Quit,
}

// ---------------------------------------------------------------------------
// IMPLS
// ---------------------------------------------------------------------------

impl Dashboard {
    /// Start the dashboard worker.
    ///
    /// The road-line set is indexed into a quadtree once here - it is static
    /// for the whole session.
    pub fn new(road_lines: &[RoadLineInfo]) -> Self {
        let points: Vec<Vector2> = road_lines
            .iter()
            .flat_map(|line| line.points_m.iter().map(|p| p.to_vector2()))
            .collect();
        let tree = QuadTree::from_points(&points);

        let (sender, receiver) = channel();
        let alive = Arc::new(AtomicBool::new(true));

        let alive_clone = alive.clone();
        let join_handle = thread::spawn(move || dashboard_thread(receiver, tree, alive_clone));

        Self {
            sender,
            join_handle: Some(join_handle),
            alive,
        }
    }

    /// Deliver a snapshot to the worker.
    ///
    /// If the worker has terminated the snapshot is silently dropped.
    pub fn update(&self, scene_info: &SceneInfo) {
        if !self.alive.load(Ordering::Relaxed) {
            return;
        }

        self.sender
            .send(DashboardMsg::Update(Box::new(scene_info.clone())))
            .ok();
    }

    /// Stop the worker and wait for it to finish.
    ///
    /// Updates queued before this call are still processed by the worker
    /// before it exits.
    pub fn quit(mut self) {
        self.sender.send(DashboardMsg::Quit).ok();

        if let Some(join_handle) = self.join_handle.take() {
            join_handle.join().ok();
        }
    }
}

// ---------------------------------------------------------------------------
// PRIVATE FUNCTIONS
// ---------------------------------------------------------------------------

/// Worker thread, renders snapshots until the quit message arrives.
fn dashboard_thread(receiver: Receiver<DashboardMsg>, tree: QuadTree, alive: Arc<AtomicBool>) {
    let mut last_render: Option<Instant> = None;

    loop {
        let msg = match receiver.recv() {
            Ok(m) => m,
            // All senders gone, the exec is shutting down without a quit
            Err(_) => break,
        };

        match msg {
            DashboardMsg::Update(scene_info) => {
                let due = match last_render {
                    Some(instant) => instant.elapsed() >= RENDER_PERIOD,
                    None => true,
                };

                if due {
                    render(&scene_info, &tree);
                    last_render = Some(Instant::now());
                }
            }
            DashboardMsg::Quit => {
                // Drain updates queued before the quit request
                while let Ok(DashboardMsg::Update(scene_info)) = receiver.try_recv() {
                    render(&scene_info, &tree);
                }
                break;
            }
        }
    }

    alive.store(false, Ordering::Relaxed);
}

/// Render one status line for the given snapshot.
fn render(scene_info: &SceneInfo, tree: &QuadTree) {
    let vc = &scene_info.vehicle_control;
    let ego = &scene_info.main_vehicle;

    let heading_deg = ego.yaw_rad.to_degrees().rem_euclid(360.0);
    let nearby_points = tree
        .query_in_radius(ego.pos_m.to_vector2(), NEARBY_RADIUS_M)
        .len();

    info!(
        "thr {:.3} brk {:.3} str {:+.3} gear {:?} | spd {:6.2} m/s pos ({:8.2}, {:8.2}) hdg {:5.1} deg | {} obstacle(s), {} traj pts, {} roadline pts nearby",
        vc.throttle,
        vc.brake,
        vc.steering,
        vc.gear,
        scene_info.main_vehicle_speed_ms,
        ego.pos_m.x,
        ego.pos_m.y,
        heading_deg,
        scene_info.obstacles.len(),
        scene_info.trajectory.points_m.len(),
        nearby_points
    );
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------
