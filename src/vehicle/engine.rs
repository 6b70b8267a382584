//! Engine Capability
//!
//! The slice of engine natives the vehicle provider needs. Natives are
//! synchronous and cheap; handles may go stale between calls, so callers
//! check existence before acting.

use crate::core::hash::ModelHash;
use crate::core::vector::Vector3;
use crate::vehicle::types::{EntityId, NetworkId, VehicleClass, VehicleLockStatus, VehicleSeat};

/// Engine natives used for vehicle interaction.
pub trait VehicleEngineAdapter: Send + Sync {
    // -- peds -----------------------------------------------------------------

    /// Ped controlled by the local player.
    fn player_ped(&self) -> EntityId;

    /// Whether a ped belongs to a player (as opposed to an NPC).
    fn is_ped_a_player(&self, ped: EntityId) -> bool;

    /// Whether an entity is dead.
    fn is_entity_dead(&self, entity: EntityId) -> bool;

    /// Vehicle the ped is currently sitting in.
    fn vehicle_ped_is_in(&self, ped: EntityId) -> Option<EntityId>;

    /// Vehicle the ped has been tasked to enter.
    fn vehicle_ped_is_trying_to_enter(&self, ped: EntityId) -> Option<EntityId>;

    /// Vehicle the ped is mid-animation entering.
    fn vehicle_ped_is_entering(&self, ped: EntityId) -> Option<EntityId>;

    /// Ped sitting in a given seat.
    fn ped_in_vehicle_seat(&self, vehicle: EntityId, seat: VehicleSeat) -> Option<EntityId>;

    /// Cancel every task of a ped.
    fn clear_ped_tasks_immediately(&self, ped: EntityId);

    /// Task a ped into a specific seat.
    fn task_enter_vehicle(&self, ped: EntityId, vehicle: EntityId, seat: VehicleSeat);

    /// Task a ped out of its vehicle.
    fn task_leave_vehicle(&self, ped: EntityId, vehicle: EntityId);

    // -- input ----------------------------------------------------------------

    /// Whether a control is held this frame.
    fn is_control_pressed(&self, control: u32) -> bool;

    /// Suppress a control for this frame.
    fn disable_control_action(&self, control: u32);

    // -- entities -------------------------------------------------------------

    /// Whether the handle still refers to a live entity.
    fn does_entity_exist(&self, entity: EntityId) -> bool;

    /// Whether the entity is a vehicle.
    fn is_entity_a_vehicle(&self, entity: EntityId) -> bool;

    /// World position.
    fn entity_coords(&self, entity: EntityId) -> Vector3;

    /// Heading in degrees.
    fn entity_heading(&self, entity: EntityId) -> f32;

    /// Speed in meters per second.
    fn entity_speed(&self, entity: EntityId) -> f32;

    /// Model hash.
    fn entity_model(&self, entity: EntityId) -> ModelHash;

    /// Collision bounds (min, max) of a model, relative to its origin.
    fn model_dimensions(&self, model: ModelHash) -> (Vector3, Vector3);

    // -- networking -----------------------------------------------------------

    /// Network id of a networked entity.
    fn network_id_from_entity(&self, entity: EntityId) -> Option<NetworkId>;

    /// Local entity for a network id, if the id exists on this client.
    fn entity_from_network_id(&self, network_id: NetworkId) -> Option<EntityId>;

    /// Whether this client owns the entity.
    fn network_has_control_of_entity(&self, entity: EntityId) -> bool;

    // -- vehicles -------------------------------------------------------------

    /// Class of a vehicle.
    fn vehicle_class(&self, vehicle: EntityId) -> VehicleClass;

    /// Passenger capacity, driver excluded.
    fn vehicle_max_passengers(&self, vehicle: EntityId) -> i32;

    /// Plate text as painted on the vehicle.
    fn vehicle_plate_text(&self, vehicle: EntityId) -> String;

    /// World position where a ped stands to use a door.
    fn entry_position_of_door(&self, vehicle: EntityId, door_index: u8) -> Vector3;

    /// World position of a named bone, if the model has it.
    fn bone_world_position(&self, vehicle: EntityId, bone: &str) -> Option<Vector3>;

    /// Set the door lock status.
    fn set_vehicle_doors_locked(&self, vehicle: EntityId, status: VehicleLockStatus);

    /// Open a door.
    fn set_vehicle_door_open(&self, vehicle: EntityId, door_index: u8);

    /// Shut a door.
    fn set_vehicle_door_shut(&self, vehicle: EntityId, door_index: u8);

    /// Light mode (0 default, 1 off, 2 on).
    fn set_vehicle_lights(&self, vehicle: EntityId, mode: u8);

    /// Start or stop the engine.
    fn set_vehicle_engine_on(&self, vehicle: EntityId, on: bool);

    // -- world ----------------------------------------------------------------

    /// Short zone code at a position (`ISHEIST`, `DOWNT`, ...).
    fn zone_name_at(&self, position: Vector3) -> String;

    /// Localized label for a text key.
    fn label_text(&self, key: &str) -> String;

    /// Display name of a vehicle model.
    fn display_name_from_model(&self, model: ModelHash) -> String;
}
