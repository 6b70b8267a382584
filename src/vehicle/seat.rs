//! Seat Selection
//!
//! Picks the seat a ped should be tasked into when it walks up to an
//! unlocked vehicle.

use crate::vehicle::engine::VehicleEngineAdapter;
use crate::vehicle::types::{forces_seat_bones, DoorType, EntityId, VehicleSeat, SEATS_CONFIG};

/// Whether a seat can be taken: empty, or occupied by an NPC.
pub fn is_seat_free(engine: &dyn VehicleEngineAdapter, vehicle: EntityId, seat: VehicleSeat) -> bool {
    match engine.ped_in_vehicle_seat(vehicle, seat) {
        None => true,
        Some(ped) => !engine.is_ped_a_player(ped),
    }
}

/// Closest free seat whose entry point is near the ped.
///
/// The first candidate must lie within `max_distance`; later candidates only
/// need to be strictly closer than the current pick. On two-wheelers a
/// passenger pick is moved to the driver seat when that one is free.
pub fn closest_seat(
    engine: &dyn VehicleEngineAdapter,
    ped: EntityId,
    vehicle: EntityId,
    max_distance: f32,
) -> Option<VehicleSeat> {
    let max_seats = engine.vehicle_max_passengers(vehicle);
    let ped_position = engine.entity_coords(ped);
    let use_bones = forces_seat_bones(engine.entity_model(vehicle));

    let mut closest: Option<(VehicleSeat, f32)> = None;

    for config in SEATS_CONFIG.iter() {
        if config.seat.0 > max_seats - 1 {
            continue;
        }

        if !is_seat_free(engine, vehicle, config.seat) {
            continue;
        }

        let entry_position = if config.door_type == DoorType::Door && !use_bones {
            Some(engine.entry_position_of_door(vehicle, config.door_index))
        } else {
            engine.bone_world_position(vehicle, config.seat_bone)
        };

        let Some(entry_position) = entry_position else {
            continue;
        };

        let distance = ped_position.distance(entry_position);

        match closest {
            None if distance <= max_distance => closest = Some((config.seat, distance)),
            Some((_, best)) if distance < best => closest = Some((config.seat, distance)),
            _ => {}
        }
    }

    let (mut seat, _) = closest?;

    if seat == VehicleSeat::COPILOT
        && engine.vehicle_class(vehicle).is_two_wheeled()
        && is_seat_free(engine, vehicle, VehicleSeat::DRIVER)
    {
        seat = VehicleSeat::DRIVER;
    }

    Some(seat)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::hash::joaat;
    use crate::core::vector::Vector3;
    use crate::vehicle::headless::{HeadlessEngine, HeadlessVehicle};
    use crate::vehicle::types::VehicleClass;

    /// Vehicle at the origin with door entries at chosen distances from a
    /// player standing at (0, -10).
    fn setup(class: VehicleClass, entries: &[(u8, f32)]) -> (HeadlessEngine, EntityId, EntityId) {
        let engine = HeadlessEngine::new(Vector3::new(0.0, -10.0, 0.0));
        let mut spec = HeadlessVehicle::new(joaat("adder"), class, Vector3::ZERO);
        spec.door_entries.clear();
        for (door, distance) in entries {
            spec.door_entries.insert(*door, Vector3::new(*distance, -10.0, 0.0));
        }
        let vehicle = engine.spawn_vehicle(spec);
        let ped = engine.player_ped();
        (engine, ped, vehicle)
    }

    #[test]
    fn test_picks_nearest_free_seat() {
        // Driver door 3.0m, copilot 1.0m, rear left 1.5m.
        let (engine, ped, vehicle) = setup(VehicleClass::Sedans, &[(0, 3.0), (1, 1.0), (2, 1.5), (3, 9.0)]);

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::COPILOT));
    }

    #[test]
    fn test_occupied_by_player_is_skipped() {
        let (engine, ped, vehicle) = setup(VehicleClass::Sedans, &[(0, 3.0), (1, 1.0), (2, 1.5), (3, 9.0)]);
        let other = engine.spawn_ped(Vector3::ZERO, true);
        engine.seat_ped(other, vehicle, VehicleSeat::COPILOT);

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::BACK_LEFT));
    }

    #[test]
    fn test_npc_seat_counts_as_free() {
        let (engine, ped, vehicle) = setup(VehicleClass::Sedans, &[(0, 3.0), (1, 1.0), (2, 1.5), (3, 9.0)]);
        let npc = engine.spawn_ped(Vector3::ZERO, false);
        engine.seat_ped(npc, vehicle, VehicleSeat::COPILOT);

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::COPILOT));
    }

    #[test]
    fn test_nothing_within_radius() {
        let (engine, ped, vehicle) = setup(VehicleClass::Sedans, &[(0, 2.5), (1, 3.0), (2, 4.0), (3, 5.0)]);

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), None);
    }

    #[test]
    fn test_capacity_limits_candidates() {
        let (engine, ped, vehicle) = setup(VehicleClass::Sedans, &[(0, 1.8), (1, 1.5), (2, 0.5), (3, 0.6)]);
        engine.world().vehicles.get_mut(&vehicle).unwrap().max_passengers = 1;

        // Rear seats are beyond a one-passenger capacity.
        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::COPILOT));
    }

    #[test]
    fn test_motorcycle_prefers_driver() {
        let (engine, ped, vehicle) = setup(VehicleClass::Motorcycles, &[(0, 1.5), (1, 1.0)]);
        engine.world().vehicles.get_mut(&vehicle).unwrap().max_passengers = 1;

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::DRIVER));
    }

    #[test]
    fn test_motorcycle_driver_taken_keeps_passenger() {
        let (engine, ped, vehicle) = setup(VehicleClass::Motorcycles, &[(0, 1.5), (1, 1.0)]);
        engine.world().vehicles.get_mut(&vehicle).unwrap().max_passengers = 1;
        let rider = engine.spawn_ped(Vector3::ZERO, true);
        engine.seat_ped(rider, vehicle, VehicleSeat::DRIVER);

        assert_eq!(closest_seat(&engine, ped, vehicle, 2.0), Some(VehicleSeat::COPILOT));
    }

    #[test]
    fn test_forced_bone_models_use_seat_bones() {
        let engine = HeadlessEngine::new(Vector3::new(0.0, -10.0, 0.0));
        let mut spec = HeadlessVehicle::new(joaat("bus"), VehicleClass::Commercial, Vector3::ZERO);
        // Door entries would say copilot; bones say rear left.
        spec.door_entries.insert(1, Vector3::new(0.2, -10.0, 0.0));
        spec.bones.clear();
        spec.bones.insert("seat_dside_r".to_string(), Vector3::new(0.5, -10.0, 0.0));
        spec.bones.insert("seat_pside_f".to_string(), Vector3::new(1.9, -10.0, 0.0));
        let vehicle = engine.spawn_vehicle(spec);

        assert_eq!(
            closest_seat(&engine, engine.player_ped(), vehicle, 2.0),
            Some(VehicleSeat::BACK_LEFT)
        );
    }
}
