//! Vehicle Types
//!
//! Entity handles, engine enums and the static seat/trunk tables.

use serde::{Serialize, Deserialize};

use crate::core::hash::{joaat, ModelHash};

// =============================================================================
// HANDLES
// =============================================================================

/// Engine-local entity handle. Only meaningful on the client that owns it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub i32);

/// Network id of an entity, stable across clients.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NetworkId(pub i32);

// =============================================================================
// ENGINE ENUMS
// =============================================================================

/// Door lock status codes understood by the engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VehicleLockStatus {
    /// No lock state
    None = 0,
    /// Anyone may enter
    Unlocked = 1,
    /// Nobody may enter
    Locked = 2,
    /// Locked for players only
    LockedForPlayer = 3,
    /// Occupants cannot leave
    StickPlayerInside = 4,
    /// Locked, window can be smashed
    CanBeBrokenInto = 7,
    /// Locked, stays breakable after entry
    CanBeBrokenIntoPersist = 8,
    /// Entry attempts are refused outright
    CannotBeTriedToEnter = 10,
}

/// Engine vehicle class ids.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
#[allow(missing_docs)]
pub enum VehicleClass {
    Compacts = 0,
    Sedans = 1,
    Suvs = 2,
    Coupes = 3,
    Muscle = 4,
    SportsClassics = 5,
    Sports = 6,
    Super = 7,
    Motorcycles = 8,
    OffRoad = 9,
    Industrial = 10,
    Utility = 11,
    Vans = 12,
    Cycles = 13,
    Boats = 14,
    Helicopters = 15,
    Planes = 16,
    Service = 17,
    Emergency = 18,
    Military = 19,
    Commercial = 20,
    Trains = 21,
    OpenWheel = 22,
}

impl VehicleClass {
    /// Map an engine class id.
    pub fn from_id(id: u8) -> Option<Self> {
        use VehicleClass::*;
        const ALL: [VehicleClass; 23] = [
            Compacts, Sedans, Suvs, Coupes, Muscle, SportsClassics, Sports, Super,
            Motorcycles, OffRoad, Industrial, Utility, Vans, Cycles, Boats,
            Helicopters, Planes, Service, Emergency, Military, Commercial, Trains,
            OpenWheel,
        ];
        ALL.get(id as usize).copied()
    }

    /// Motorcycles and bicycles.
    #[inline]
    pub fn is_two_wheeled(self) -> bool {
        matches!(self, VehicleClass::Motorcycles | VehicleClass::Cycles)
    }
}

/// Seat index as the engine numbers them (driver is -1).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VehicleSeat(pub i32);

impl VehicleSeat {
    /// Driver seat
    pub const DRIVER: Self = Self(-1);
    /// Front passenger seat
    pub const COPILOT: Self = Self(0);
    /// Rear left seat
    pub const BACK_LEFT: Self = Self(1);
    /// Rear right seat
    pub const BACK_RIGHT: Self = Self(2);
}

/// How the entry point of a seat is located.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorType {
    /// Use the door's entry position.
    Door,
    /// Use the seat bone's world position.
    Bone,
}

/// Static description of one seat.
#[derive(Clone, Copy, Debug)]
pub struct SeatConfig {
    /// Seat index
    pub seat: VehicleSeat,
    /// Door serving this seat
    pub door_index: u8,
    /// Bone name of the seat
    pub seat_bone: &'static str,
    /// Entry point lookup
    pub door_type: DoorType,
}

/// Seats probed when picking where to enter, in probe order.
pub const SEATS_CONFIG: [SeatConfig; 8] = [
    SeatConfig { seat: VehicleSeat::DRIVER, door_index: 0, seat_bone: "seat_dside_f", door_type: DoorType::Door },
    SeatConfig { seat: VehicleSeat::COPILOT, door_index: 1, seat_bone: "seat_pside_f", door_type: DoorType::Door },
    SeatConfig { seat: VehicleSeat::BACK_LEFT, door_index: 2, seat_bone: "seat_dside_r", door_type: DoorType::Door },
    SeatConfig { seat: VehicleSeat::BACK_RIGHT, door_index: 3, seat_bone: "seat_pside_r", door_type: DoorType::Door },
    SeatConfig { seat: VehicleSeat(3), door_index: 2, seat_bone: "seat_dside_r1", door_type: DoorType::Bone },
    SeatConfig { seat: VehicleSeat(4), door_index: 3, seat_bone: "seat_pside_r1", door_type: DoorType::Bone },
    SeatConfig { seat: VehicleSeat(5), door_index: 2, seat_bone: "seat_dside_r2", door_type: DoorType::Bone },
    SeatConfig { seat: VehicleSeat(6), door_index: 3, seat_bone: "seat_pside_r2", door_type: DoorType::Bone },
];

/// Door index of the trunk.
pub const TRUNK_DOOR_INDEX: u8 = 5;

/// Control id of the "exit vehicle" input.
pub const EXIT_VEHICLE_CONTROL: u32 = 75;

// =============================================================================
// MODEL TABLES
// =============================================================================

/// Inventory type for models whose trunk is not a regular trunk.
const VEHICLE_TRUNK_TYPES: [(ModelHash, &str); 7] = [
    (joaat("tanker"), "tanker"),
    (joaat("tanker2"), "tanker"),
    (joaat("trailerlogs"), "trailerlogs"),
    (joaat("brickade"), "brickade"),
    (joaat("brickade1"), "brickade"),
    (joaat("trash"), "trash"),
    (joaat("tiptruck2"), "tiptruck"),
];

/// Models whose door entry points are unreliable; seat bones are used instead.
const VEHICLE_FORCE_USE_BONES: [ModelHash; 2] = [joaat("bus"), joaat("cargobob")];

/// Inventory type opened for a model's trunk.
pub fn trunk_type_for_model(model: ModelHash) -> &'static str {
    VEHICLE_TRUNK_TYPES
        .iter()
        .find(|(hash, _)| *hash == model)
        .map(|(_, kind)| *kind)
        .unwrap_or("trunk")
}

/// Whether entry points for this model must come from seat bones.
pub fn forces_seat_bones(model: ModelHash) -> bool {
    VEHICLE_FORCE_USE_BONES.contains(&model)
}

// =============================================================================
// VOLATILE STATE
// =============================================================================

/// Server-authoritative lock state of a vehicle, read-only on the client.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct VehicleVolatileState {
    /// Persistent vehicle id; `None` for temporary vehicles.
    pub id: Option<i64>,
    /// Doors unlocked.
    pub open: bool,
    /// Lock was forced (lockpicked or broken).
    pub forced: bool,
    /// Registered plate.
    pub plate: Option<String>,
    /// Owner citizen id.
    pub owner: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trunk_types() {
        assert_eq!(trunk_type_for_model(joaat("tanker2")), "tanker");
        assert_eq!(trunk_type_for_model(joaat("tiptruck2")), "tiptruck");
        assert_eq!(trunk_type_for_model(joaat("adder")), "trunk");
    }

    #[test]
    fn test_forced_bones() {
        assert!(forces_seat_bones(joaat("bus")));
        assert!(forces_seat_bones(joaat("CARGOBOB")));
        assert!(!forces_seat_bones(joaat("adder")));
    }

    #[test]
    fn test_vehicle_class_ids() {
        assert_eq!(VehicleClass::from_id(8), Some(VehicleClass::Motorcycles));
        assert_eq!(VehicleClass::from_id(13), Some(VehicleClass::Cycles));
        assert_eq!(VehicleClass::from_id(22), Some(VehicleClass::OpenWheel));
        assert_eq!(VehicleClass::from_id(23), None);
        assert!(VehicleClass::Cycles.is_two_wheeled());
        assert!(!VehicleClass::Sedans.is_two_wheeled());
    }

    #[test]
    fn test_seat_table_order() {
        assert_eq!(SEATS_CONFIG[0].seat, VehicleSeat::DRIVER);
        assert_eq!(SEATS_CONFIG[1].seat, VehicleSeat::COPILOT);
    }
}
