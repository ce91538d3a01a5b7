//! Bridge – lifecycle controller, event intake, tick pump and host facade.
//!
//! ## Threading model
//!
//! ```text
//!   engine threads                host / driver thread       tokio workers
//!   ──────────────                ────────────────────       ─────────────
//!   report_touch ──▶ slot         tick() ─▶ pump.drive ────▶ listener sweep
//!   report_* ... ──▶ slot         (never blocks)             (one per kind)
//!   notify_* ──────────────────▶ listeners, synchronous
//!   dispatch ──────────────────▶ listeners, synchronous
//! ```
//!
//! Reports may arrive from any thread at any time; the slot mutex gives
//! them an atomic replace and a happens-before edge to the delivery task.
//! `tick` only moves payloads from slots into per-kind delivery tasks. The
//! four kinds may deliver in parallel; listeners within one kind never
//! overlap.
//!
//! The registry and the dispatch outlet are deliberately not lifecycle
//! gated: hosts register script channels while the engine is still booting.

use crate::engine::EngineRef;
use crate::error::{BridgeError, Result};
use crate::listeners::HostListeners;
use crate::protocol::{
    AvatarPicked, ChatRange, ChatReceived, DebugMessage, Dispatched, LoginParams, StateChanged,
    Teleported, TeleportStarted, Touched, WindowRequest,
};
use crate::pump::DeliveryPump;
use crate::registry::ChannelRegistry;
use crate::slot::EventSlot;
use crate::types::{BridgeStats, EventKind, Vec3};
use log::{debug, info};
use parking_lot::RwLock;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

enum Lifecycle {
    Uninitialized,
    Initialized(EngineRef),
    TornDown,
}

// ---------------------------------------------------------------------------
// Tick result
// ---------------------------------------------------------------------------

/// Outcome of a single [`Bridge::tick`] call.
#[derive(Debug, Clone)]
pub struct TickActivity {
    /// The tick counter that produced this report.
    pub tick: u64,
    /// Kinds for which a delivery task was started this tick.
    pub started: Vec<EventKind>,
}

struct Slots {
    touched: Arc<EventSlot<Touched>>,
    avatar_picked: Arc<EventSlot<AvatarPicked>>,
    teleport_started: Arc<EventSlot<TeleportStarted>>,
    teleported: Arc<EventSlot<Teleported>>,
}

pub struct Bridge {
    state: RwLock<Lifecycle>,
    slots: Slots,
    listeners: HostListeners,
    registry: ChannelRegistry,
    pump: DeliveryPump,
    tick_count: AtomicU64,
    dropped_reports: AtomicU64,
    deliveries: [Arc<AtomicU64>; 4],
}

impl Bridge {
    pub fn new() -> Self {
        Self {
            state: RwLock::new(Lifecycle::Uninitialized),
            slots: Slots {
                touched: Arc::new(EventSlot::new(EventKind::Touched)),
                avatar_picked: Arc::new(EventSlot::new(EventKind::AvatarPicked)),
                teleport_started: Arc::new(EventSlot::new(EventKind::TeleportStarted)),
                teleported: Arc::new(EventSlot::new(EventKind::Teleported)),
            },
            listeners: HostListeners::new(),
            registry: ChannelRegistry::new(),
            pump: DeliveryPump::new(),
            tick_count: AtomicU64::new(0),
            dropped_reports: AtomicU64::new(0),
            deliveries: std::array::from_fn(|_| Arc::new(AtomicU64::new(0))),
        }
    }

    // -----------------------------------------------------------------------
    // Lifecycle
    // -----------------------------------------------------------------------

    /// Bind the bridge to its engine. Exactly once per bridge.
    pub fn initialize(&self, engine: EngineRef) -> Result<()> {
        let mut state = self.state.write();
        match &*state {
            Lifecycle::Initialized(_) => return Err(BridgeError::AlreadyInitialized),
            Lifecycle::TornDown => return Err(BridgeError::TornDown),
            Lifecycle::Uninitialized => {}
        }
        *state = Lifecycle::Initialized(engine);
        info!("bridge initialized");
        Ok(())
    }

    /// Pump all four kinds once.
    ///
    /// Never blocks: each pending payload is handed to a fresh delivery task
    /// and the call returns immediately. Requires a tokio runtime.
    pub fn tick(&self) -> Result<TickActivity> {
        self.ensure_active()?;
        let tick = self.tick_count.fetch_add(1, Ordering::Relaxed) + 1;

        let mut started = Vec::new();
        if self.pump.drive(
            &self.slots.touched,
            &self.listeners.touched,
            &self.deliveries[EventKind::Touched.index()],
        ) {
            started.push(EventKind::Touched);
        }
        if self.pump.drive(
            &self.slots.avatar_picked,
            &self.listeners.avatar_picked,
            &self.deliveries[EventKind::AvatarPicked.index()],
        ) {
            started.push(EventKind::AvatarPicked);
        }
        if self.pump.drive(
            &self.slots.teleport_started,
            &self.listeners.teleport_started,
            &self.deliveries[EventKind::TeleportStarted.index()],
        ) {
            started.push(EventKind::TeleportStarted);
        }
        if self.pump.drive(
            &self.slots.teleported,
            &self.listeners.teleported,
            &self.deliveries[EventKind::Teleported.index()],
        ) {
            started.push(EventKind::Teleported);
        }

        if !started.is_empty() {
            debug!("tick {} started deliveries: {:?}", tick, started);
        }
        Ok(TickActivity { tick, started })
    }

    /// Shut the bridge down.
    ///
    /// Idempotent. Cancels running deliveries cooperatively, drops the
    /// engine handles, clears pending payloads and releases every host
    /// closure held by listener sets and the registry.
    pub fn teardown(&self) {
        {
            let mut state = self.state.write();
            if matches!(*state, Lifecycle::TornDown) {
                return;
            }
            *state = Lifecycle::TornDown;
        }
        self.pump.cancel();
        self.slots.touched.clear();
        self.slots.avatar_picked.clear();
        self.slots.teleport_started.clear();
        self.slots.teleported.clear();
        self.registry.close();
        self.listeners.clear_all();
        info!("bridge torn down");
    }

    pub fn is_initialized(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::Initialized(_))
    }

    pub fn is_torn_down(&self) -> bool {
        matches!(*self.state.read(), Lifecycle::TornDown)
    }

    fn ensure_active(&self) -> Result<()> {
        match &*self.state.read() {
            Lifecycle::Uninitialized => Err(BridgeError::NotInitialized),
            Lifecycle::Initialized(_) => Ok(()),
            Lifecycle::TornDown => Err(BridgeError::TornDown),
        }
    }

    fn engine(&self) -> Result<EngineRef> {
        match &*self.state.read() {
            Lifecycle::Uninitialized => Err(BridgeError::NotInitialized),
            Lifecycle::Initialized(engine) => Ok(engine.clone()),
            Lifecycle::TornDown => Err(BridgeError::TornDown),
        }
    }

    // -----------------------------------------------------------------------
    // Event intake (engine side)
    // -----------------------------------------------------------------------

    /// Store a touch event for the next tick.
    ///
    /// Ids the entity directory no longer knows are dropped silently; the
    /// object may already be gone by the time the report lands.
    pub fn report_touch(&self, object_id: &str) -> Result<()> {
        let engine = self.engine()?;
        if !engine.entities.contains(object_id) {
            debug!("dropping touch report for unknown object '{}'", object_id);
            self.dropped_reports.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.slots.touched.publish(Touched {
            object_id: object_id.to_string(),
        });
        Ok(())
    }

    /// Store an avatar-pick event for the next tick, gated the same way as
    /// touches.
    pub fn report_avatar_picked(&self, info: &str) -> Result<()> {
        let engine = self.engine()?;
        if !engine.avatars.contains(info) {
            debug!("dropping pick report for unknown avatar");
            self.dropped_reports.fetch_add(1, Ordering::Relaxed);
            return Ok(());
        }
        self.slots.avatar_picked.publish(AvatarPicked {
            info: info.to_string(),
        });
        Ok(())
    }

    pub fn report_teleport_started(
        &self,
        region_name: &str,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<()> {
        self.ensure_active()?;
        self.slots.teleport_started.publish(TeleportStarted {
            region_name: region_name.to_string(),
            x,
            y,
            z,
        });
        Ok(())
    }

    pub fn report_teleported(
        &self,
        avatar_id: &str,
        avatar_name: &str,
        x: i32,
        y: i32,
        z: i32,
    ) -> Result<()> {
        self.ensure_active()?;
        self.slots.teleported.publish(Teleported {
            avatar_id: avatar_id.to_string(),
            avatar_name: avatar_name.to_string(),
            x,
            y,
            z,
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Direct notifications (engine side, synchronous)
    // -----------------------------------------------------------------------

    /// Multicast a connection-state change on the calling context.
    pub fn notify_state_changed(&self, state: i32) -> Result<()> {
        self.ensure_active()?;
        self.listeners.state_changed.notify(&StateChanged { state });
        Ok(())
    }

    pub fn notify_window_request(&self, target: &str, uri: &str) -> Result<()> {
        self.ensure_active()?;
        self.listeners.window_request.notify(&WindowRequest {
            target: target.to_string(),
            uri: uri.to_string(),
        });
        Ok(())
    }

    pub fn notify_chat_received(
        &self,
        avatar_id: &str,
        avatar_name: &str,
        message: &str,
    ) -> Result<()> {
        self.ensure_active()?;
        self.listeners.chat_received.notify(&ChatReceived {
            avatar_id: avatar_id.to_string(),
            avatar_name: avatar_name.to_string(),
            message: message.to_string(),
        });
        Ok(())
    }

    pub fn notify_debug(&self, message: &str) -> Result<()> {
        self.ensure_active()?;
        self.listeners.debug_message.notify(&DebugMessage {
            message: message.to_string(),
        });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Dispatch outlet + channel registry (usable at any time)
    // -----------------------------------------------------------------------

    /// Multicast `(action, message)` to every dispatch subscriber, now.
    ///
    /// No buffering, no slot; zero subscribers is a no-op.
    pub fn dispatch(&self, action: &str, message: &str) {
        self.listeners.dispatch.notify(&Dispatched {
            action: action.to_string(),
            message: message.to_string(),
        });
    }

    pub fn register_message(
        &self,
        channel: impl Into<String>,
        handler: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) {
        self.registry.register_message(channel, handler);
    }

    /// See [`ChannelRegistry::send_message`]: fan-out to every handler,
    /// always `None`.
    pub fn send_message(&self, channel: &str, args: &Value) -> Option<Value> {
        self.registry.send_message(channel, args)
    }

    pub fn register_callback(
        &self,
        channel: impl Into<String>,
        callback: impl Fn(&str) -> String + Send + Sync + 'static,
    ) {
        self.registry.register_callback(channel, callback);
    }

    /// See [`ChannelRegistry::run_callback`]: first registrant answers.
    pub fn run_callback(&self, channel: &str, message: &str) -> String {
        self.registry.run_callback(channel, message)
    }

    // -----------------------------------------------------------------------
    // Subscriptions (host side, usable at any time)
    // -----------------------------------------------------------------------

    pub fn on_touched(&self, listener: impl Fn(&Touched) + Send + Sync + 'static) {
        self.listeners.touched.subscribe(listener);
    }

    pub fn on_avatar_picked(&self, listener: impl Fn(&AvatarPicked) + Send + Sync + 'static) {
        self.listeners.avatar_picked.subscribe(listener);
    }

    pub fn on_teleport_started(&self, listener: impl Fn(&TeleportStarted) + Send + Sync + 'static) {
        self.listeners.teleport_started.subscribe(listener);
    }

    pub fn on_teleported(&self, listener: impl Fn(&Teleported) + Send + Sync + 'static) {
        self.listeners.teleported.subscribe(listener);
    }

    pub fn on_dispatch(&self, listener: impl Fn(&Dispatched) + Send + Sync + 'static) {
        self.listeners.dispatch.subscribe(listener);
    }

    pub fn on_state_changed(&self, listener: impl Fn(&StateChanged) + Send + Sync + 'static) {
        self.listeners.state_changed.subscribe(listener);
    }

    pub fn on_window_request(&self, listener: impl Fn(&WindowRequest) + Send + Sync + 'static) {
        self.listeners.window_request.subscribe(listener);
    }

    pub fn on_chat_received(&self, listener: impl Fn(&ChatReceived) + Send + Sync + 'static) {
        self.listeners.chat_received.subscribe(listener);
    }

    pub fn on_debug_message(&self, listener: impl Fn(&DebugMessage) + Send + Sync + 'static) {
        self.listeners.debug_message.subscribe(listener);
    }

    // -----------------------------------------------------------------------
    // Session facade
    // -----------------------------------------------------------------------

    pub fn login(&self, params: &LoginParams) -> Result<()> {
        let engine = self.engine()?;
        info!(
            "login requested for {} {}",
            params.first_name, params.last_name
        );
        engine.session.request_login(params);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        let engine = self.engine()?;
        engine.session.request_logout();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Avatar facade
    // -----------------------------------------------------------------------

    /// Touch an object on behalf of the host.
    ///
    /// Resolves the protocol-local id, issues the touch, then stores the
    /// same gated report the engine path uses.
    pub fn touch_to(&self, object_id: &str) -> Result<()> {
        let engine = self.engine()?;
        if let Some(local_id) = engine.entities.local_id(object_id) {
            engine.protocol.touch(local_id);
        }
        self.report_touch(object_id)
    }

    pub fn sit_on(&self, target_id: &str) -> Result<()> {
        let engine = self.engine()?;
        engine.protocol.sit_on(target_id);
        Ok(())
    }

    pub fn stand_up(&self) -> Result<()> {
        let engine = self.engine()?;
        engine.avatars.stand_up();
        Ok(())
    }

    pub fn send_chat(&self, message: &str, range: ChatRange) -> Result<()> {
        let engine = self.engine()?;
        engine.protocol.send_chat(message, range);
        Ok(())
    }

    pub fn send_instant_message(&self, target_id: &str, message: &str) -> Result<()> {
        let engine = self.engine()?;
        engine.protocol.send_instant_message(target_id, message);
        Ok(())
    }

    /// Start a teleport: store the teleport-started report, then hand the
    /// move to the protocol stack.
    pub fn teleport_to(&self, region_name: &str, x: i32, y: i32, z: i32) -> Result<()> {
        let engine = self.engine()?;
        self.report_teleport_started(region_name, x, y, z)?;
        engine.protocol.teleport(region_name, x, y, z);
        Ok(())
    }

    pub fn move_forward(&self, active: bool) -> Result<()> {
        let engine = self.engine()?;
        engine.avatars.move_forward(active);
        Ok(())
    }

    pub fn move_backward(&self, active: bool) -> Result<()> {
        let engine = self.engine()?;
        engine.avatars.move_backward(active);
        Ok(())
    }

    pub fn move_left(&self, active: bool) -> Result<()> {
        let engine = self.engine()?;
        engine.avatars.move_left(active);
        Ok(())
    }

    pub fn move_right(&self, active: bool) -> Result<()> {
        let engine = self.engine()?;
        engine.avatars.move_right(active);
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Camera facade
    // -----------------------------------------------------------------------

    pub fn camera_look_at(&self, position: Vec3, target: Vec3) -> Result<()> {
        let engine = self.engine()?;
        engine.camera.look_at(position, target);
        Ok(())
    }

    /// Set the follow distance, clamped to the rig's limits.
    pub fn set_camera_distance(&self, distance: f32) -> Result<()> {
        let engine = self.engine()?;
        let clamped = distance.clamp(engine.camera.min_distance(), engine.camera.max_distance());
        engine.camera.set_distance(clamped);
        Ok(())
    }

    pub fn camera_distance(&self) -> Result<String> {
        Ok(format!("{:.3}", self.engine()?.camera.distance()))
    }

    /// Set the vertical field of view in radians.
    ///
    /// NaN and non-positive values are ignored.
    pub fn set_camera_fov(&self, radians: f32) -> Result<()> {
        let engine = self.engine()?;
        if radians.is_nan() || radians <= 0.0 {
            debug!("ignoring camera fov {}", radians);
            return Ok(());
        }
        engine.camera.set_fov(radians);
        Ok(())
    }

    pub fn set_camera_fov_degrees(&self, degrees: f32) -> Result<()> {
        self.set_camera_fov(degrees.to_radians())
    }

    pub fn camera_fov(&self) -> Result<String> {
        Ok(format!("{:.3}", self.engine()?.camera.fov()))
    }

    pub fn camera_position(&self) -> Result<String> {
        Ok(format_csv(self.engine()?.camera.position()))
    }

    /// Camera target as `"x,y,z"`, or empty when the rig has no target.
    pub fn camera_target(&self) -> Result<String> {
        Ok(self
            .engine()?
            .camera
            .target()
            .map(format_csv)
            .unwrap_or_default())
    }

    // -----------------------------------------------------------------------
    // World / identity queries
    // -----------------------------------------------------------------------

    /// World clock as `"year,month,day,hour,minute,second"`.
    pub fn world_time(&self) -> Result<String> {
        Ok(self.engine()?.session.world_time().to_string())
    }

    pub fn set_world_time(&self, spec: &str) -> Result<()> {
        let engine = self.engine()?;
        engine.session.set_world_time(spec);
        Ok(())
    }

    pub fn region_name(&self) -> Result<String> {
        Ok(self.engine()?.protocol.region_name())
    }

    pub fn user_id(&self) -> Result<String> {
        Ok(self.engine()?.protocol.self_id().unwrap_or_default())
    }

    pub fn user_name(&self) -> Result<String> {
        Ok(self.engine()?.protocol.self_name().unwrap_or_default())
    }

    /// User avatar position as `"x,y,z"`, or empty before one exists.
    pub fn user_position(&self) -> Result<String> {
        Ok(self
            .engine()?
            .avatars
            .user_position()
            .map(format_csv)
            .unwrap_or_default())
    }

    pub fn avatar_count(&self) -> Result<usize> {
        Ok(self.engine()?.avatars.avatar_count())
    }

    pub fn object_count(&self) -> Result<usize> {
        Ok(self.engine()?.entities.entity_count())
    }

    pub fn fps(&self) -> Result<i32> {
        Ok(self.engine()?.render.fps())
    }

    pub fn primitive_count(&self) -> Result<i32> {
        Ok(self.engine()?.render.primitive_count())
    }

    pub fn texture_count(&self) -> Result<i32> {
        Ok(self.engine()?.render.texture_count())
    }

    // -----------------------------------------------------------------------
    // Stats
    // -----------------------------------------------------------------------

    pub fn stats(&self) -> BridgeStats {
        BridgeStats {
            total_ticks: self.tick_count.load(Ordering::Relaxed),
            touched_deliveries: self.deliveries[EventKind::Touched.index()].load(Ordering::Relaxed),
            avatar_picked_deliveries: self.deliveries[EventKind::AvatarPicked.index()]
                .load(Ordering::Relaxed),
            teleport_started_deliveries: self.deliveries[EventKind::TeleportStarted.index()]
                .load(Ordering::Relaxed),
            teleported_deliveries: self.deliveries[EventKind::Teleported.index()]
                .load(Ordering::Relaxed),
            dropped_reports: self.dropped_reports.load(Ordering::Relaxed),
            deliveries_in_flight: self.pump.in_flight(),
            message_channels: self.registry.message_channel_count(),
            callback_channels: self.registry.callback_channel_count(),
        }
    }
}

impl Default for Bridge {
    fn default() -> Self {
        Self::new()
    }
}

/// Three-decimal CSV form used by every coordinate query.
fn format_csv(v: Vec3) -> String {
    format!("{:.3},{:.3},{:.3}", v.x, v.y, v.z)
}
