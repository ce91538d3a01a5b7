//! Viewer Host Bridge
//!
//! Marshals asynchronous events from a 3D virtual-world client (render
//! engine + protocol stack) into an embedding host, and carries host
//! commands back the other way.
//!
//! ## Architecture
//!
//! ```text
//! BridgeDriver  (driver.rs)       ← optional fixed-cadence tick loop
//!   └── Bridge  (bridge.rs)       ← lifecycle, intake, facade
//!         ├── EventSlot ×4   (slot.rs)      ← one mailbox per kind
//!         ├── DeliveryPump   (pump.rs)      ← per-kind delivery tasks
//!         ├── HostListeners  (listeners.rs) ← typed multicast sets
//!         └── ChannelRegistry (registry.rs) ← message/callback channels
//! ```
//!
//! Engine managers stay behind the trait seams in [`engine`]; the bridge
//! holds them only between `initialize` and `teardown`. Everything that
//! crosses the host boundary is a [`protocol`] payload.

pub mod bridge;
pub mod driver;
pub mod engine;
pub mod error;
pub mod listeners;
pub mod protocol;
pub mod pump;
pub mod registry;
pub mod slot;
pub mod types;

// Convenience re-exports
pub use bridge::{Bridge, TickActivity};
pub use driver::{BridgeDriver, DriverConfig};
pub use engine::EngineRef;
pub use error::{BridgeError, Result};
pub use types::{BridgeStats, EventKind, Vec3, WorldTime};
