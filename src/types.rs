//! Core bridge types shared across all modules.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

/// The four engine event families that travel through the slot/pump path.
///
/// Every kind owns exactly one mailbox slot and one delivery lane; kinds are
/// never interchangeable.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Touched,
    AvatarPicked,
    TeleportStarted,
    Teleported,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Touched,
        EventKind::AvatarPicked,
        EventKind::TeleportStarted,
        EventKind::Teleported,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Touched => "touched",
            EventKind::AvatarPicked => "avatar_picked",
            EventKind::TeleportStarted => "teleport_started",
            EventKind::Teleported => "teleported",
        }
    }

    pub(crate) fn index(self) -> usize {
        match self {
            EventKind::Touched => 0,
            EventKind::AvatarPicked => 1,
            EventKind::TeleportStarted => 2,
            EventKind::Teleported => 3,
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Basic math
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn zero() -> Self {
        Self::new(0.0, 0.0, 0.0)
    }
}

impl std::fmt::Display for Vec3 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.2}, {:.2}, {:.2})", self.x, self.y, self.z)
    }
}

// ---------------------------------------------------------------------------
// World clock
// ---------------------------------------------------------------------------

/// Calendar world time reported by the viewer session.
///
/// `Display` renders the comma-joined form the host surface expects
/// (`"year,month,day,hour,minute,second"`, no padding).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct WorldTime {
    pub year: i32,
    pub month: u32,
    pub day: u32,
    pub hour: u32,
    pub minute: u32,
    pub second: u32,
}

impl std::fmt::Display for WorldTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{},{},{},{},{},{}",
            self.year, self.month, self.day, self.hour, self.minute, self.second
        )
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeStats {
    pub total_ticks: u64,
    pub touched_deliveries: u64,
    pub avatar_picked_deliveries: u64,
    pub teleport_started_deliveries: u64,
    pub teleported_deliveries: u64,
    pub dropped_reports: u64,
    pub deliveries_in_flight: usize,
    pub message_channels: usize,
    pub callback_channels: usize,
}
