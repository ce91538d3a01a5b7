//! Boundary payloads between the bridge and the embedding host.
//!
//! This module owns **every payload that crosses the bridge boundary** in
//! either direction (engine → host events, host → engine commands).
//!
//! ## Event families
//!
//! | Payload           | Path          | Delivery                     |
//! |-------------------|---------------|------------------------------|
//! | `Touched`         | slot + pump   | async task, serial per kind  |
//! | `AvatarPicked`    | slot + pump   | async task, serial per kind  |
//! | `TeleportStarted` | slot + pump   | async task, serial per kind  |
//! | `Teleported`      | slot + pump   | async task, serial per kind  |
//! | `Dispatched`      | direct outlet | synchronous multicast        |
//! | `StateChanged`    | direct notify | synchronous multicast        |
//! | `WindowRequest`   | direct notify | synchronous multicast        |
//! | `ChatReceived`    | direct notify | synchronous multicast        |
//! | `DebugMessage`    | direct notify | synchronous multicast        |
//!
//! ## Design rules
//!
//! 1. Every struct is `Serialize + Deserialize` with snake_case JSON.
//! 2. Payloads are opaque to the bridge — it stores and forwards, never
//!    interprets.
//! 3. A slot payload carries everything its listeners need; slots hold one
//!    value, so nothing here references bridge state.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Slot-delivered events
// ---------------------------------------------------------------------------

/// An in-world object was touched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Touched {
    pub object_id: String,
}

/// An avatar was picked in the viewport.
///
/// `info` is whatever identifying string the avatar manager hands out; the
/// bridge only checks that the manager still knows it at report time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvatarPicked {
    pub info: String,
}

/// A teleport request left the viewer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TeleportStarted {
    pub region_name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

/// The user avatar arrived somewhere (possibly another region).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Teleported {
    pub avatar_id: String,
    pub avatar_name: String,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

// ---------------------------------------------------------------------------
// Directly multicast events
// ---------------------------------------------------------------------------

/// Free-form `(action, message)` pair pushed through the dispatch outlet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Dispatched {
    pub action: String,
    pub message: String,
}

/// Connection-state transition of the underlying protocol session.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StateChanged {
    pub state: i32,
}

/// The viewer asks the host to open a window or panel on `uri`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WindowRequest {
    pub target: String,
    pub uri: String,
}

/// Incoming chat line, already resolved to a display name.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatReceived {
    pub avatar_id: String,
    pub avatar_name: String,
    pub message: String,
}

/// Diagnostic text the engine wants surfaced host-side.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DebugMessage {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Host commands
// ---------------------------------------------------------------------------

/// Credentials and destination for a login request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginParams {
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub server_url: String,
    /// Grid location spec, e.g. `"last"`, `"home"` or a region URI.
    pub login_location: String,
}

/// Audible range of an outgoing chat line.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ChatRange {
    Whisper,
    Say,
    Shout,
}

impl ChatRange {
    /// Wire code used by the protocol stack (1 whisper, 2 say, 3 shout).
    pub fn code(self) -> i32 {
        match self {
            ChatRange::Whisper => 1,
            ChatRange::Say => 2,
            ChatRange::Shout => 3,
        }
    }
}
