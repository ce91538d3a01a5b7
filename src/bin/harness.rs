//! viewer-bridge-harness binary
//!
//! Soak harness for the bridge: wires a stub engine to a [`Bridge`], logs
//! every host-side event, and feeds scripted reports through the slot/pump
//! path at a fixed cadence.
//!
//! ## Configuration
//!
//! Precedence: CLI flag / env var, then the optional TOML file, then the
//! built-in defaults.
//!
//! | Key                       | Default | Description                        |
//! |---------------------------|---------|------------------------------------|
//! | `BRIDGE_CONFIG`           | unset   | Optional TOML settings file        |
//! | `BRIDGE_TICK_RATE_HZ`     | `30`    | Driver tick cadence                |
//! | `BRIDGE_REPORT_PERIOD_MS` | `750`   | Scripted report interval           |
//! | `BRIDGE_RUN_SECS`         | unset   | Bounded run length (forever unset) |

use anyhow::Result;
use clap::Parser;
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use viewer_bridge::engine::{
    AvatarControl, CameraControl, EngineRef, EntityDirectory, ProtocolClient, RenderStats,
    ViewerSession,
};
use viewer_bridge::protocol::{ChatRange, LoginParams};
use viewer_bridge::{Bridge, BridgeDriver, DriverConfig, Vec3, WorldTime};

// ---------------------------------------------------------------------------
// CLI
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(name = "viewer-bridge-harness", about = "Viewer Host Bridge soak harness", version)]
struct Args {
    /// Optional TOML settings file
    #[arg(long, env = "BRIDGE_CONFIG")]
    config: Option<String>,

    /// Tick rate (Hz)
    #[arg(long, env = "BRIDGE_TICK_RATE_HZ")]
    tick_rate_hz: Option<f32>,

    /// Milliseconds between scripted engine reports
    #[arg(long, env = "BRIDGE_REPORT_PERIOD_MS")]
    report_period_ms: Option<u64>,

    /// Stop after this many seconds (run forever when unset)
    #[arg(long, env = "BRIDGE_RUN_SECS")]
    run_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct HarnessSettings {
    tick_rate_hz: f32,
    report_period_ms: u64,
    run_secs: Option<u64>,
}

fn load_settings(args: &Args) -> Result<HarnessSettings> {
    let mut builder = config::Config::builder()
        .set_default("tick_rate_hz", 30.0)?
        .set_default("report_period_ms", 750_i64)?;
    if let Some(path) = &args.config {
        builder = builder.add_source(config::File::with_name(path));
    }
    let mut settings: HarnessSettings = builder.build()?.try_deserialize()?;

    // CLI / env overrides
    if let Some(hz) = args.tick_rate_hz {
        settings.tick_rate_hz = hz;
    }
    if let Some(ms) = args.report_period_ms {
        settings.report_period_ms = ms;
    }
    if args.run_secs.is_some() {
        settings.run_secs = args.run_secs;
    }
    Ok(settings)
}

// ---------------------------------------------------------------------------
// Stub engine
// ---------------------------------------------------------------------------

/// In-memory engine stand-in: a handful of known objects, one avatar, a
/// camera rig with fixed limits.
struct StubEngine {
    objects: Vec<String>,
    avatars: Vec<String>,
    camera_distance: Mutex<f32>,
    camera_fov: Mutex<f32>,
}

impl StubEngine {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            objects: vec!["cube-1".into(), "cube-2".into(), "sign-1".into()],
            avatars: vec!["stub-avatar".into()],
            camera_distance: Mutex::new(5.0),
            camera_fov: Mutex::new(std::f32::consts::FRAC_PI_3),
        })
    }
}

fn engine_ref(stub: &Arc<StubEngine>) -> EngineRef {
    EngineRef {
        entities: stub.clone(),
        avatars: stub.clone(),
        protocol: stub.clone(),
        camera: stub.clone(),
        session: stub.clone(),
        render: stub.clone(),
    }
}

impl EntityDirectory for StubEngine {
    fn local_id(&self, object_id: &str) -> Option<u32> {
        self.objects
            .iter()
            .position(|o| o == object_id)
            .map(|i| i as u32 + 1)
    }

    fn contains(&self, object_id: &str) -> bool {
        self.objects.iter().any(|o| o == object_id)
    }

    fn entity_count(&self) -> usize {
        self.objects.len()
    }
}

impl AvatarControl for StubEngine {
    fn contains(&self, avatar_info: &str) -> bool {
        self.avatars.iter().any(|a| a == avatar_info)
    }

    fn stand_up(&self) {}
    fn move_forward(&self, _active: bool) {}
    fn move_backward(&self, _active: bool) {}
    fn move_left(&self, _active: bool) {}
    fn move_right(&self, _active: bool) {}

    fn user_position(&self) -> Option<Vec3> {
        Some(Vec3::new(128.0, 0.0, 128.0))
    }

    fn avatar_count(&self) -> usize {
        self.avatars.len()
    }
}

impl ProtocolClient for StubEngine {
    fn touch(&self, local_id: u32) {
        log::debug!("stub touch on local id {}", local_id);
    }

    fn sit_on(&self, target_id: &str) {
        log::debug!("stub sit on {}", target_id);
    }

    fn send_instant_message(&self, target_id: &str, message: &str) {
        log::debug!("stub IM to {}: {}", target_id, message);
    }

    fn send_chat(&self, message: &str, range: ChatRange) {
        log::debug!("stub chat (code {}): {}", range.code(), message);
    }

    fn teleport(&self, region_name: &str, x: i32, y: i32, z: i32) {
        log::debug!("stub teleport to {} ({},{},{})", region_name, x, y, z);
    }

    fn region_name(&self) -> String {
        "StubRegion".into()
    }

    fn self_id(&self) -> Option<String> {
        Some("00000000-0000-0000-0000-000000000001".into())
    }

    fn self_name(&self) -> Option<String> {
        Some("Stub Resident".into())
    }
}

impl CameraControl for StubEngine {
    fn look_at(&self, _position: Vec3, _target: Vec3) {}

    fn set_distance(&self, distance: f32) {
        *self.camera_distance.lock() = distance;
    }

    fn distance(&self) -> f32 {
        *self.camera_distance.lock()
    }

    fn min_distance(&self) -> f32 {
        1.0
    }

    fn max_distance(&self) -> f32 {
        20.0
    }

    fn set_fov(&self, radians: f32) {
        *self.camera_fov.lock() = radians;
    }

    fn fov(&self) -> f32 {
        *self.camera_fov.lock()
    }

    fn position(&self) -> Vec3 {
        Vec3::new(128.0, 10.0, 120.0)
    }

    fn target(&self) -> Option<Vec3> {
        Some(Vec3::new(128.0, 0.0, 128.0))
    }
}

impl ViewerSession for StubEngine {
    fn request_login(&self, params: &LoginParams) {
        log::info!("stub login to {} as {} {}", params.server_url, params.first_name, params.last_name);
    }

    fn request_logout(&self) {
        log::info!("stub logout");
    }

    fn world_time(&self) -> WorldTime {
        WorldTime {
            year: 2026,
            month: 1,
            day: 1,
            hour: 12,
            minute: 0,
            second: 0,
        }
    }

    fn set_world_time(&self, spec: &str) {
        log::debug!("stub world time set to {}", spec);
    }
}

impl RenderStats for StubEngine {
    fn fps(&self) -> i32 {
        60
    }

    fn primitive_count(&self) -> i32 {
        1234
    }

    fn texture_count(&self) -> i32 {
        56
    }
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("viewer_bridge=debug".parse()?),
        )
        .init();

    let args = Args::parse();
    let settings = load_settings(&args)?;

    log::info!(
        "Starting viewer-bridge-harness (tick_rate_hz={}, report_period_ms={}, run_secs={:?})",
        settings.tick_rate_hz,
        settings.report_period_ms,
        settings.run_secs,
    );

    let engine = StubEngine::new();
    let bridge = Arc::new(Bridge::new());

    // Host-side subscriptions (valid before initialize)
    bridge.on_touched(|e| log::info!("[event] touched {}", e.object_id));
    bridge.on_avatar_picked(|e| log::info!("[event] avatar picked {}", e.info));
    bridge.on_teleport_started(|e| {
        log::info!(
            "[event] teleport started to {} ({},{},{})",
            e.region_name,
            e.x,
            e.y,
            e.z
        )
    });
    bridge.on_teleported(|e| {
        log::info!("[event] {} teleported to ({},{},{})", e.avatar_name, e.x, e.y, e.z)
    });
    bridge.on_dispatch(|e| log::info!("[event] dispatch {}: {}", e.action, e.message));
    bridge.on_state_changed(|e| log::info!("[event] state changed to {}", e.state));
    bridge.on_window_request(|e| log::info!("[event] open {} in {}", e.uri, e.target));
    bridge.on_chat_received(|e| log::info!("[chat] {}: {}", e.avatar_name, e.message));
    bridge.on_debug_message(|e| log::debug!("[engine] {}", e.message));

    // Channel registry demo
    bridge.register_message("host.echo", |args| {
        log::info!("[channel] host.echo got {}", args);
        None
    });
    bridge.register_callback("host.time", |message| format!("pong:{}", message));
    bridge.send_message("host.echo", &serde_json::json!({ "hello": "world" }));
    log::info!("host.time replied '{}'", bridge.run_callback("host.time", "ping"));

    bridge.initialize(engine_ref(&engine))?;

    // A few facade round trips against the stub
    bridge.login(&LoginParams {
        first_name: "Stub".into(),
        last_name: "Resident".into(),
        password: "hunter2".into(),
        server_url: "http://localhost:9000".into(),
        login_location: "last".into(),
    })?;
    bridge.send_chat("hello from the harness", ChatRange::Say)?;
    bridge.set_camera_distance(50.0)?; // clamps to the stub's max
    log::info!(
        "region '{}', world time {}, camera distance {}",
        bridge.region_name()?,
        bridge.world_time()?,
        bridge.camera_distance()?,
    );

    // Scripted engine traffic
    let traffic_bridge = Arc::clone(&bridge);
    let report_period = Duration::from_millis(settings.report_period_ms);
    tokio::spawn(async move {
        let mut step: u64 = 0;
        loop {
            tokio::time::sleep(report_period).await;
            let result = match step % 6 {
                0 => traffic_bridge.report_touch("cube-1"),
                1 => traffic_bridge.report_touch("ghost-99"), // dropped at the gate
                2 => traffic_bridge.report_avatar_picked("stub-avatar"),
                3 => traffic_bridge.report_teleport_started("StubRegion", 128, 128, 30),
                4 => traffic_bridge.report_teleported("u-1", "Stub Resident", 128, 128, 30),
                _ => {
                    traffic_bridge.dispatch("status", "heartbeat");
                    traffic_bridge.notify_debug("scripted traffic heartbeat")
                }
            };
            if result.is_err() {
                break;
            }
            step += 1;
        }
    });

    // Bounded runs tear the bridge down from a timer
    if let Some(secs) = settings.run_secs {
        let stop_bridge = Arc::clone(&bridge);
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(secs)).await;
            log::info!("run time elapsed; tearing bridge down");
            stop_bridge.teardown();
        });
    }

    let driver = BridgeDriver::new(
        DriverConfig {
            tick_rate_hz: settings.tick_rate_hz,
        },
        Arc::clone(&bridge),
    );
    driver.run().await?;

    log::info!("final stats: {}", serde_json::to_string_pretty(&bridge.stats())?);
    Ok(())
}
