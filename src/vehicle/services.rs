//! Client Services
//!
//! Capabilities the vehicle provider is wired with: player data, feedback
//! (notifications, sounds, animations), vehicle lookups and the
//! server-authoritative state store.

use async_trait::async_trait;
use serde::{Serialize, Deserialize};
use tokio::sync::broadcast;

use crate::core::hash::ModelHash;
use crate::vehicle::types::{EntityId, NetworkId, VehicleVolatileState};

// =============================================================================
// PLAYER
// =============================================================================

/// Metadata flags of the local character that gate vehicle actions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerMetadata {
    /// Bypasses lock checks.
    pub godmode: bool,
    /// Character is dead.
    pub isdead: bool,
    /// Character is handcuffed.
    pub ishandcuffed: bool,
}

/// The loaded character.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    /// Citizen id, matched against vehicle owners.
    pub citizenid: String,
    /// Gating flags.
    pub metadata: PlayerMetadata,
}

/// Local player queries.
pub trait PlayerService: Send + Sync {
    /// The loaded character, `None` before character selection.
    fn player(&self) -> Option<PlayerData>;

    /// An inventory interaction is in progress.
    fn is_inventory_busy(&self) -> bool;

    /// The seatbelt is fastened.
    fn is_seatbelt_on(&self) -> bool;

    /// The phone UI is in front.
    fn is_phone_visible(&self) -> bool;
}

// =============================================================================
// FEEDBACK
// =============================================================================

/// Notification severity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// Informational
    Info,
    /// Something could not be done right now
    Warning,
    /// The action was refused
    Error,
}

/// Transient on-screen notifications.
pub trait Notifier: Send + Sync {
    /// Show a notification.
    fn notify(&self, message: &str, kind: NotificationKind);
}

/// Positional sounds.
pub trait SoundService: Send + Sync {
    /// Play a sound heard by everyone within `radius` meters.
    fn play_around(&self, sound: &str, radius: f32, volume: f32);
}

/// One animation clip.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationClip {
    /// Animation dictionary
    pub dictionary: &'static str,
    /// Clip name
    pub name: &'static str,
    /// Blend-in speed
    pub blend_in_speed: f32,
    /// Blend-out speed
    pub blend_out_speed: f32,
    /// Duration in milliseconds
    pub duration_ms: u64,
    /// Loop the clip
    pub repeat: bool,
    /// Upper body only
    pub only_upper_body: bool,
    /// Player keeps control while playing
    pub enable_player_control: bool,
}

/// Key-fob click played when locking from outside the vehicle.
pub const KEY_FOB_ANIMATION: AnimationClip = AnimationClip {
    dictionary: "anim@mp_player_intmenu@key_fob@",
    name: "fob_click",
    blend_in_speed: 3.0,
    blend_out_speed: 3.0,
    duration_ms: 750,
    repeat: true,
    only_upper_body: true,
    enable_player_control: true,
};

/// Ped animations.
#[async_trait]
pub trait AnimationService: Send + Sync {
    /// Play a clip and resolve when it ends. `reset_weapon` holsters first.
    async fn play_animation(&self, clip: AnimationClip, reset_weapon: bool);
}

// =============================================================================
// VEHICLES
// =============================================================================

/// Vehicle lookups that sit above raw natives.
pub trait VehicleService: Send + Sync {
    /// Closest vehicle to the player, optionally within `max_distance` meters.
    fn closest_vehicle(&self, max_distance: Option<f32>) -> Option<EntityId>;

    /// Re-apply clothing tweaks after entering or leaving a vehicle.
    fn update_vehicle_cloth_config(&self);

    /// Catalogue name of a model, when the dealership knows it.
    fn model_name(&self, model: ModelHash) -> Option<String>;
}

/// Lock flags changed on the server for a vehicle present on this client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VehicleLockChange {
    /// Local vehicle handle
    pub vehicle: EntityId,
    /// Doors unlocked
    pub open: bool,
    /// Lock forced
    pub forced: bool,
}

/// State store errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StateStoreError {
    /// The vehicle has no server-side state.
    #[error("Unknown vehicle: {0:?}")]
    UnknownVehicle(EntityId),

    /// The RPC did not answer in time.
    #[error("RPC {0} timed out")]
    Timeout(&'static str),

    /// The RPC failed on the server.
    #[error("RPC failed: {0}")]
    Rpc(String),
}

/// Server-authoritative vehicle state, reached through state sync and RPC.
#[async_trait]
pub trait VehicleStateStore: Send + Sync {
    /// Locally mirrored volatile state.
    async fn vehicle_state(&self, vehicle: EntityId) -> Result<VehicleVolatileState, StateStoreError>;

    /// Volatile state fetched from the server, bypassing the local mirror.
    async fn server_vehicle_state(&self, vehicle: EntityId) -> Result<VehicleVolatileState, StateStoreError>;

    /// Whether the local player holds a key for `plate`.
    async fn has_vehicle_key(&self, plate: &str) -> Result<bool, StateStoreError>;

    /// Every unlocked vehicle.
    async fn opened_vehicles(&self) -> Result<Vec<NetworkId>, StateStoreError>;

    /// Stream of open/forced changes.
    fn subscribe_lock_changes(&self) -> broadcast::Receiver<VehicleLockChange>;
}
