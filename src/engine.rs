//! Narrow interfaces over the engine managers the bridge delegates to.
//!
//! The bridge never owns engine state. At initialize time the host hands
//! over an [`EngineRef`] — one trait object per manager — and every facade
//! call goes through these seams. Keeping the traits narrow keeps the test
//! fakes small.

use crate::protocol::{ChatRange, LoginParams};
use crate::types::{Vec3, WorldTime};
use std::sync::Arc;

/// Lookup into the scene's object table.
pub trait EntityDirectory: Send + Sync {
    /// Protocol-level local id of an object, if the scene still knows it.
    fn local_id(&self, object_id: &str) -> Option<u32>;
    fn contains(&self, object_id: &str) -> bool;
    fn entity_count(&self) -> usize;
}

/// Avatar bookkeeping and user-avatar movement nudges.
pub trait AvatarControl: Send + Sync {
    fn contains(&self, avatar_info: &str) -> bool;
    fn stand_up(&self);
    fn move_forward(&self, active: bool);
    fn move_backward(&self, active: bool);
    fn move_left(&self, active: bool);
    fn move_right(&self, active: bool);
    /// Position of the user avatar, once one exists.
    fn user_position(&self) -> Option<Vec3>;
    fn avatar_count(&self) -> usize;
}

/// Outbound operations on the connected protocol session.
pub trait ProtocolClient: Send + Sync {
    fn touch(&self, local_id: u32);
    fn sit_on(&self, target_id: &str);
    fn send_instant_message(&self, target_id: &str, message: &str);
    fn send_chat(&self, message: &str, range: ChatRange);
    fn teleport(&self, region_name: &str, x: i32, y: i32, z: i32);
    fn region_name(&self) -> String;
    fn self_id(&self) -> Option<String>;
    fn self_name(&self) -> Option<String>;
}

/// Viewer camera rig.
pub trait CameraControl: Send + Sync {
    fn look_at(&self, position: Vec3, target: Vec3);
    fn set_distance(&self, distance: f32);
    fn distance(&self) -> f32;
    fn min_distance(&self) -> f32;
    fn max_distance(&self) -> f32;
    /// Vertical field of view in radians.
    fn set_fov(&self, radians: f32);
    fn fov(&self) -> f32;
    fn position(&self) -> Vec3;
    /// Current look target, if the rig is tracking one.
    fn target(&self) -> Option<Vec3>;
}

/// Session-level viewer operations (login flow, world clock).
pub trait ViewerSession: Send + Sync {
    fn request_login(&self, params: &LoginParams);
    fn request_logout(&self);
    fn world_time(&self) -> WorldTime;
    fn set_world_time(&self, spec: &str);
}

/// Frame statistics from the renderer.
pub trait RenderStats: Send + Sync {
    fn fps(&self) -> i32;
    fn primitive_count(&self) -> i32;
    fn texture_count(&self) -> i32;
}

/// Shared handles to every engine manager the bridge needs.
///
/// Cloning is cheap (six `Arc`s). The bridge holds exactly one of these for
/// its initialized lifetime and drops it at teardown.
#[derive(Clone)]
pub struct EngineRef {
    pub entities: Arc<dyn EntityDirectory>,
    pub avatars: Arc<dyn AvatarControl>,
    pub protocol: Arc<dyn ProtocolClient>,
    pub camera: Arc<dyn CameraControl>,
    pub session: Arc<dyn ViewerSession>,
    pub render: Arc<dyn RenderStats>,
}
