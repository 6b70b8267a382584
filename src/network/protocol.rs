//! Bus Event Vocabulary
//!
//! Named events exchanged over the engine's pub/sub bus and the RPC request
//! names used against the server. Payloads are JSON, tagged by `type`.

use serde::{Serialize, Deserialize};

use crate::core::hash::ModelHash;
use crate::vehicle::types::{NetworkId, VehicleClass};

// =============================================================================
// SERVER -> CLIENT
// =============================================================================

/// Events delivered to the client-side vehicle provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientEvent {
    /// Full replacement of the set of unlocked vehicles.
    VehicleSetOpenList {
        /// Network ids of every unlocked vehicle.
        vehicles: Vec<NetworkId>,
    },

    /// Close the trunk session, if any.
    VehicleCloseTrunk,

    /// Open or shut a vehicle's trunk door.
    VehicleSetTrunkState {
        /// Target vehicle.
        vehicle: NetworkId,
        /// Door open.
        open: bool,
    },

    /// A lockpick attempt happened on this client.
    VehicleLockpick {
        /// Which tool was used.
        kind: LockpickKind,
        /// Model of the targeted vehicle.
        model: ModelHash,
    },

    /// The local ped entered a vehicle.
    BaseEnteredVehicle,

    /// The local ped left a vehicle.
    BaseLeftVehicle,
}

impl ClientEvent {
    /// Bus event name.
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::VehicleSetOpenList { .. } => "soz-core:client:vehicle:set-open-list",
            ClientEvent::VehicleCloseTrunk => "soz-core:client:vehicle:close-trunk",
            ClientEvent::VehicleSetTrunkState { .. } => "soz-core:client:vehicle:set-trunk-state",
            ClientEvent::VehicleLockpick { .. } => "soz-core:client:vehicle:lockpick",
            ClientEvent::BaseEnteredVehicle => "baseevents:enteredVehicle",
            ClientEvent::BaseLeftVehicle => "baseevents:leftVehicle",
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Lockpicking tools. Each has its own set of police alert lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockpickKind {
    /// Classic lockpick on the door.
    Lockpick,
    /// Slim jim / door jacking.
    Slimjim,
    /// Electronic bypass kit.
    Electronic,
}

// =============================================================================
// CLIENT -> SERVER
// =============================================================================

/// Events emitted by the client to the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Lock or unlock a vehicle.
    VehicleSetOpen {
        /// Target vehicle.
        vehicle: NetworkId,
        /// Unlocked.
        open: bool,
    },

    /// Mirror the trunk door state to every client.
    VehicleSetTrunkState {
        /// Target vehicle.
        vehicle: NetworkId,
        /// Door open.
        open: bool,
    },

    /// Open a shared inventory for a trunk.
    InventoryOpen {
        /// Inventory type (`trunk`, `tanker`, ...).
        inventory_type: String,
        /// Inventory key, the vehicle plate.
        plate: String,
        /// Vehicle description for the inventory service.
        context: TrunkContext,
    },

    /// Message to a society phone line.
    PhoneSocietyMessage {
        /// Unique event id (`phone:sendSocietyMessage:<uuid>`).
        event_id: String,
        /// Message body.
        message: SocietyMessage,
    },
}

impl ServerEvent {
    /// Bus event name.
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::VehicleSetOpen { .. } => "soz-core:server:vehicle:set-open",
            ServerEvent::VehicleSetTrunkState { .. } => "soz-core:server:vehicle:set-trunk-state",
            ServerEvent::InventoryOpen { .. } => "inventory:server:openInventory",
            ServerEvent::PhoneSocietyMessage { .. } => "phone:sendSocietyMessage",
        }
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Vehicle description attached to a trunk inventory request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrunkContext {
    /// Vehicle model.
    pub model: ModelHash,
    /// Vehicle class.
    pub class: VehicleClass,
    /// Vehicle network id.
    pub entity: NetworkId,
}

/// Anonymous alert sent to a society phone number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocietyMessage {
    /// Hide the sender.
    pub anonymous: bool,
    /// Destination number.
    pub number: String,
    /// Plain-text body.
    pub message: String,
    /// Body with `<span {class}>` highlights.
    pub html_message: String,
    /// Attach the sender position.
    pub position: bool,
    /// Alert category.
    pub info: SocietyMessageInfo,
    /// Displayed sender identifier.
    pub override_identifier: String,
}

/// Category block of a [`SocietyMessage`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocietyMessageInfo {
    /// Category name, e.g. `auto-theft`.
    #[serde(rename = "type")]
    pub kind: String,
}

// =============================================================================
// CLIENT-LOCAL
// =============================================================================

/// Events that stay on the emitting client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LocalEvent {
    /// Close whatever inventory UI is open.
    CloseInventory,
}

impl LocalEvent {
    /// Bus event name.
    pub fn name(&self) -> &'static str {
        match self {
            LocalEvent::CloseInventory => "inventory:client:closeInventory",
        }
    }
}

// =============================================================================
// RPC
// =============================================================================

/// Request/response pairs served by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RpcServerEvent {
    /// Network ids of every unlocked vehicle.
    VehicleGetOpened,
    /// Whether the caller holds a key for a plate.
    VehicleHasKey,
}

impl RpcServerEvent {
    /// RPC name.
    pub fn name(&self) -> &'static str {
        match self {
            RpcServerEvent::VehicleGetOpened => "soz-core:server:vehicle:get-opened",
            RpcServerEvent::VehicleHasKey => "soz-core:server:vehicle:has-key",
        }
    }
}
