//! Headless Adapters
//!
//! In-memory stand-ins for the engine, the client UI services and the server
//! state store. They record every side effect so the provider can be driven
//! without a running game, from tests and from the demo binary.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::core::hash::ModelHash;
use crate::core::vector::Vector3;
use crate::network::protocol::RpcServerEvent;
use crate::vehicle::engine::VehicleEngineAdapter;
use crate::vehicle::services::{
    AnimationClip, AnimationService, NotificationKind, Notifier, PlayerData, PlayerService,
    SoundService, StateStoreError, VehicleLockChange, VehicleService, VehicleStateStore,
};
use crate::vehicle::types::{
    EntityId, NetworkId, VehicleClass, VehicleLockStatus, VehicleSeat, VehicleVolatileState,
};

/// Offset between entity handles and network ids.
const NETWORK_ID_OFFSET: i32 = 1000;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // A panicked test must not cascade into every later assertion.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

// =============================================================================
// WORLD
// =============================================================================

/// Task handed to a ped, in call order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PedTask {
    /// Walk into a seat.
    EnterVehicle {
        /// Target vehicle
        vehicle: EntityId,
        /// Target seat
        seat: VehicleSeat,
    },
    /// Get out.
    LeaveVehicle {
        /// Vehicle left
        vehicle: EntityId,
    },
    /// Every task cancelled.
    Cleared,
}

/// A ped in the headless world.
#[derive(Clone, Debug)]
pub struct HeadlessPed {
    /// World position
    pub position: Vector3,
    /// Controlled by a player
    pub is_player: bool,
    /// Dead
    pub dead: bool,
    /// Seated in
    pub vehicle: Option<EntityId>,
    /// Tasked to enter
    pub trying_to_enter: Option<EntityId>,
    /// Mid entry animation
    pub entering: Option<EntityId>,
    /// Task history
    pub tasks: Vec<PedTask>,
}

impl HeadlessPed {
    fn new(position: Vector3, is_player: bool) -> Self {
        Self {
            position,
            is_player,
            dead: false,
            vehicle: None,
            trying_to_enter: None,
            entering: None,
            tasks: Vec::new(),
        }
    }
}

/// A vehicle in the headless world. Entry points and bones are world-space.
#[derive(Clone, Debug)]
pub struct HeadlessVehicle {
    /// Model hash
    pub model: ModelHash,
    /// Class
    pub class: VehicleClass,
    /// World position
    pub position: Vector3,
    /// Heading in degrees
    pub heading: f32,
    /// Speed in m/s
    pub speed: f32,
    /// Model bounds minimum
    pub min: Vector3,
    /// Model bounds maximum
    pub max: Vector3,
    /// Painted plate
    pub plate: String,
    /// Passenger capacity, driver excluded
    pub max_passengers: i32,
    /// Door entry points by door index
    pub door_entries: BTreeMap<u8, Vector3>,
    /// Bone positions by name
    pub bones: BTreeMap<String, Vector3>,
    /// Seat occupants
    pub seats: BTreeMap<VehicleSeat, EntityId>,
    /// Current door lock status
    pub lock_status: VehicleLockStatus,
    /// Doors currently open
    pub doors_open: BTreeSet<u8>,
    /// Every light mode set, in order
    pub lights: Vec<u8>,
    /// Engine running
    pub engine_on: bool,
    /// This client owns the entity
    pub controlled: bool,
    /// Has a network id
    pub networked: bool,
}

impl HeadlessVehicle {
    /// Sedan-sized vehicle with four doors and front/rear seat bones.
    pub fn new(model: ModelHash, class: VehicleClass, position: Vector3) -> Self {
        let at = |dx: f32, dy: f32| Vector3::new(position.x + dx, position.y + dy, position.z);

        let door_entries = BTreeMap::from([
            (0, at(-1.5, 0.6)),
            (1, at(1.5, 0.6)),
            (2, at(-1.5, -0.8)),
            (3, at(1.5, -0.8)),
        ]);
        let bones = BTreeMap::from([
            ("seat_dside_f".to_string(), at(-0.4, 0.4)),
            ("seat_pside_f".to_string(), at(0.4, 0.4)),
            ("seat_dside_r".to_string(), at(-0.4, -0.6)),
            ("seat_pside_r".to_string(), at(0.4, -0.6)),
        ]);

        Self {
            model,
            class,
            position,
            heading: 0.0,
            speed: 0.0,
            min: Vector3::new(-1.0, -2.5, -0.5),
            max: Vector3::new(1.0, 2.5, 1.0),
            plate: "HEADLESS".to_string(),
            max_passengers: 3,
            door_entries,
            bones,
            seats: BTreeMap::new(),
            lock_status: VehicleLockStatus::Locked,
            doors_open: BTreeSet::new(),
            lights: Vec::new(),
            engine_on: false,
            controlled: true,
            networked: true,
        }
    }
}

/// Everything the headless engine knows.
#[derive(Debug)]
pub struct HeadlessWorld {
    /// The local player's ped
    pub player_ped: EntityId,
    /// Every ped
    pub peds: BTreeMap<EntityId, HeadlessPed>,
    /// Every vehicle
    pub vehicles: BTreeMap<EntityId, HeadlessVehicle>,
    /// Controls held this frame
    pub pressed_controls: BTreeSet<u32>,
    /// Controls disabled, one entry per frame call
    pub disabled_controls: Vec<u32>,
    /// Zone code returned for every position
    pub zone_name: String,
    /// Text labels by key
    pub labels: BTreeMap<String, String>,
    /// Display names by model
    pub display_names: BTreeMap<ModelHash, String>,
    /// Entry tasks finish instantly when set; otherwise the ped stays entering.
    pub enter_completes: bool,
    next_id: i32,
}

impl HeadlessWorld {
    fn allocate(&mut self) -> EntityId {
        self.next_id += 1;
        EntityId(self.next_id)
    }

    fn exists(&self, entity: EntityId) -> bool {
        self.peds.contains_key(&entity) || self.vehicles.contains_key(&entity)
    }

    fn unseat(&mut self, ped: EntityId) {
        for vehicle in self.vehicles.values_mut() {
            vehicle.seats.retain(|_, occupant| *occupant != ped);
        }
        if let Some(state) = self.peds.get_mut(&ped) {
            state.vehicle = None;
        }
    }
}

// =============================================================================
// ENGINE
// =============================================================================

/// In-memory engine.
#[derive(Debug)]
pub struct HeadlessEngine {
    world: Mutex<HeadlessWorld>,
}

impl HeadlessEngine {
    /// Empty world with the local player standing at `player_position`.
    pub fn new(player_position: Vector3) -> Self {
        let mut world = HeadlessWorld {
            player_ped: EntityId(0),
            peds: BTreeMap::new(),
            vehicles: BTreeMap::new(),
            pressed_controls: BTreeSet::new(),
            disabled_controls: Vec::new(),
            zone_name: "DOWNT".to_string(),
            labels: BTreeMap::new(),
            display_names: BTreeMap::new(),
            enter_completes: true,
            next_id: 0,
        };
        let player = world.allocate();
        world.player_ped = player;
        world.peds.insert(player, HeadlessPed::new(player_position, true));

        Self { world: Mutex::new(world) }
    }

    /// Direct access to the world.
    pub fn world(&self) -> MutexGuard<'_, HeadlessWorld> {
        lock(&self.world)
    }

    /// Add a vehicle.
    pub fn spawn_vehicle(&self, vehicle: HeadlessVehicle) -> EntityId {
        let mut world = self.world();
        let id = world.allocate();
        world.vehicles.insert(id, vehicle);
        id
    }

    /// Remove a vehicle, ejecting its occupants.
    pub fn despawn(&self, entity: EntityId) {
        let mut world = self.world();
        if let Some(vehicle) = world.vehicles.remove(&entity) {
            for ped in vehicle.seats.values() {
                if let Some(state) = world.peds.get_mut(ped) {
                    state.vehicle = None;
                }
            }
        }
        world.peds.remove(&entity);
    }

    /// Add a ped.
    pub fn spawn_ped(&self, position: Vector3, is_player: bool) -> EntityId {
        let mut world = self.world();
        let id = world.allocate();
        world.peds.insert(id, HeadlessPed::new(position, is_player));
        id
    }

    /// Put a ped in a seat.
    pub fn seat_ped(&self, ped: EntityId, vehicle: EntityId, seat: VehicleSeat) {
        let mut world = self.world();
        world.unseat(ped);
        if let Some(target) = world.vehicles.get_mut(&vehicle) {
            target.seats.insert(seat, ped);
        }
        if let Some(state) = world.peds.get_mut(&ped) {
            state.vehicle = Some(vehicle);
        }
    }

    /// Move a ped.
    pub fn move_ped(&self, ped: EntityId, position: Vector3) {
        if let Some(state) = self.world().peds.get_mut(&ped) {
            state.position = position;
        }
    }

    /// Start walking a ped toward a vehicle, as pressing the enter key does.
    pub fn try_enter(&self, ped: EntityId, vehicle: EntityId) {
        if let Some(state) = self.world().peds.get_mut(&ped) {
            state.trying_to_enter = Some(vehicle);
        }
    }

    /// Hold or release a control.
    pub fn set_control(&self, control: u32, pressed: bool) {
        let mut world = self.world();
        if pressed {
            world.pressed_controls.insert(control);
        } else {
            world.pressed_controls.remove(&control);
        }
    }

    fn with_vehicle<R>(&self, vehicle: EntityId, f: impl FnOnce(&HeadlessVehicle) -> R) -> Option<R> {
        self.world().vehicles.get(&vehicle).map(f)
    }

    fn with_vehicle_mut(&self, vehicle: EntityId, f: impl FnOnce(&mut HeadlessVehicle)) {
        if let Some(state) = self.world().vehicles.get_mut(&vehicle) {
            f(state);
        }
    }
}

impl VehicleEngineAdapter for HeadlessEngine {
    fn player_ped(&self) -> EntityId {
        self.world().player_ped
    }

    fn is_ped_a_player(&self, ped: EntityId) -> bool {
        self.world().peds.get(&ped).map(|p| p.is_player).unwrap_or(false)
    }

    fn is_entity_dead(&self, entity: EntityId) -> bool {
        self.world().peds.get(&entity).map(|p| p.dead).unwrap_or(false)
    }

    fn vehicle_ped_is_in(&self, ped: EntityId) -> Option<EntityId> {
        self.world().peds.get(&ped).and_then(|p| p.vehicle)
    }

    fn vehicle_ped_is_trying_to_enter(&self, ped: EntityId) -> Option<EntityId> {
        self.world().peds.get(&ped).and_then(|p| p.trying_to_enter)
    }

    fn vehicle_ped_is_entering(&self, ped: EntityId) -> Option<EntityId> {
        self.world().peds.get(&ped).and_then(|p| p.entering)
    }

    fn ped_in_vehicle_seat(&self, vehicle: EntityId, seat: VehicleSeat) -> Option<EntityId> {
        self.world().vehicles.get(&vehicle).and_then(|v| v.seats.get(&seat).copied())
    }

    fn clear_ped_tasks_immediately(&self, ped: EntityId) {
        if let Some(state) = self.world().peds.get_mut(&ped) {
            state.trying_to_enter = None;
            state.entering = None;
            state.tasks.push(PedTask::Cleared);
        }
    }

    fn task_enter_vehicle(&self, ped: EntityId, vehicle: EntityId, seat: VehicleSeat) {
        let mut world = self.world();
        let completes = world.enter_completes;

        if completes {
            world.unseat(ped);
            if let Some(target) = world.vehicles.get_mut(&vehicle) {
                target.seats.insert(seat, ped);
            }
        }

        if let Some(state) = world.peds.get_mut(&ped) {
            state.tasks.push(PedTask::EnterVehicle { vehicle, seat });
            if completes {
                state.vehicle = Some(vehicle);
                state.trying_to_enter = None;
                state.entering = None;
            } else {
                state.entering = Some(vehicle);
            }
        }
    }

    fn task_leave_vehicle(&self, ped: EntityId, vehicle: EntityId) {
        let mut world = self.world();
        world.unseat(ped);
        if let Some(state) = world.peds.get_mut(&ped) {
            state.tasks.push(PedTask::LeaveVehicle { vehicle });
        }
    }

    fn is_control_pressed(&self, control: u32) -> bool {
        self.world().pressed_controls.contains(&control)
    }

    fn disable_control_action(&self, control: u32) {
        self.world().disabled_controls.push(control);
    }

    fn does_entity_exist(&self, entity: EntityId) -> bool {
        self.world().exists(entity)
    }

    fn is_entity_a_vehicle(&self, entity: EntityId) -> bool {
        self.world().vehicles.contains_key(&entity)
    }

    fn entity_coords(&self, entity: EntityId) -> Vector3 {
        let world = self.world();
        if let Some(ped) = world.peds.get(&entity) {
            return ped.position;
        }
        world.vehicles.get(&entity).map(|v| v.position).unwrap_or(Vector3::ZERO)
    }

    fn entity_heading(&self, entity: EntityId) -> f32 {
        self.with_vehicle(entity, |v| v.heading).unwrap_or(0.0)
    }

    fn entity_speed(&self, entity: EntityId) -> f32 {
        self.with_vehicle(entity, |v| v.speed).unwrap_or(0.0)
    }

    fn entity_model(&self, entity: EntityId) -> ModelHash {
        self.with_vehicle(entity, |v| v.model).unwrap_or(0)
    }

    fn model_dimensions(&self, model: ModelHash) -> (Vector3, Vector3) {
        self.world()
            .vehicles
            .values()
            .find(|v| v.model == model)
            .map(|v| (v.min, v.max))
            .unwrap_or((Vector3::ZERO, Vector3::ZERO))
    }

    fn network_id_from_entity(&self, entity: EntityId) -> Option<NetworkId> {
        let world = self.world();
        let networked = match world.vehicles.get(&entity) {
            Some(vehicle) => vehicle.networked,
            None => world.peds.contains_key(&entity),
        };
        networked.then(|| NetworkId(entity.0 + NETWORK_ID_OFFSET))
    }

    fn entity_from_network_id(&self, network_id: NetworkId) -> Option<EntityId> {
        let entity = EntityId(network_id.0 - NETWORK_ID_OFFSET);
        self.world().exists(entity).then_some(entity)
    }

    fn network_has_control_of_entity(&self, entity: EntityId) -> bool {
        self.with_vehicle(entity, |v| v.controlled).unwrap_or(false)
    }

    fn vehicle_class(&self, vehicle: EntityId) -> VehicleClass {
        self.with_vehicle(vehicle, |v| v.class).unwrap_or(VehicleClass::Compacts)
    }

    fn vehicle_max_passengers(&self, vehicle: EntityId) -> i32 {
        self.with_vehicle(vehicle, |v| v.max_passengers).unwrap_or(0)
    }

    fn vehicle_plate_text(&self, vehicle: EntityId) -> String {
        self.with_vehicle(vehicle, |v| v.plate.clone()).unwrap_or_default()
    }

    fn entry_position_of_door(&self, vehicle: EntityId, door_index: u8) -> Vector3 {
        self.with_vehicle(vehicle, |v| {
            v.door_entries.get(&door_index).copied().unwrap_or(v.position)
        })
        .unwrap_or(Vector3::ZERO)
    }

    fn bone_world_position(&self, vehicle: EntityId, bone: &str) -> Option<Vector3> {
        self.with_vehicle(vehicle, |v| v.bones.get(bone).copied()).flatten()
    }

    fn set_vehicle_doors_locked(&self, vehicle: EntityId, status: VehicleLockStatus) {
        let mut world = self.world();
        if let Some(target) = world.vehicles.get_mut(&vehicle) {
            target.lock_status = status;
        }
        // A locked door makes the engine abandon entry attempts.
        if status == VehicleLockStatus::Locked {
            for ped in world.peds.values_mut() {
                if ped.trying_to_enter == Some(vehicle) {
                    ped.trying_to_enter = None;
                }
            }
        }
    }

    fn set_vehicle_door_open(&self, vehicle: EntityId, door_index: u8) {
        self.with_vehicle_mut(vehicle, |v| {
            v.doors_open.insert(door_index);
        });
    }

    fn set_vehicle_door_shut(&self, vehicle: EntityId, door_index: u8) {
        self.with_vehicle_mut(vehicle, |v| {
            v.doors_open.remove(&door_index);
        });
    }

    fn set_vehicle_lights(&self, vehicle: EntityId, mode: u8) {
        self.with_vehicle_mut(vehicle, |v| v.lights.push(mode));
    }

    fn set_vehicle_engine_on(&self, vehicle: EntityId, on: bool) {
        self.with_vehicle_mut(vehicle, |v| v.engine_on = on);
    }

    fn zone_name_at(&self, _position: Vector3) -> String {
        self.world().zone_name.clone()
    }

    fn label_text(&self, key: &str) -> String {
        self.world().labels.get(key).cloned().unwrap_or_else(|| key.to_string())
    }

    fn display_name_from_model(&self, model: ModelHash) -> String {
        self.world()
            .display_names
            .get(&model)
            .cloned()
            .unwrap_or_else(|| "CARNOTFOUND".to_string())
    }
}

// =============================================================================
// CLIENT SERVICES
// =============================================================================

/// Recorded client-side state and side effects.
#[derive(Debug, Default)]
pub struct ClientState {
    /// Loaded character
    pub player: Option<PlayerData>,
    /// Inventory interaction running
    pub inventory_busy: bool,
    /// Seatbelt fastened
    pub seatbelt_on: bool,
    /// Phone in front
    pub phone_visible: bool,
    /// Notifications shown
    pub notifications: Vec<(String, NotificationKind)>,
    /// Sounds played as (name, radius, volume)
    pub sounds: Vec<(String, f32, f32)>,
    /// Animations played
    pub animations: Vec<AnimationClip>,
    /// Cloth config refreshes
    pub cloth_updates: usize,
    /// Dealership catalogue
    pub model_names: BTreeMap<ModelHash, String>,
}

/// UI and player services backed by [`ClientState`].
#[derive(Debug)]
pub struct HeadlessClient {
    engine: Arc<HeadlessEngine>,
    state: Mutex<ClientState>,
}

impl HeadlessClient {
    /// Client with `player` loaded.
    pub fn new(engine: Arc<HeadlessEngine>, player: Option<PlayerData>) -> Self {
        Self {
            engine,
            state: Mutex::new(ClientState { player, ..ClientState::default() }),
        }
    }

    /// Direct access to the recorded state.
    pub fn state(&self) -> MutexGuard<'_, ClientState> {
        lock(&self.state)
    }
}

impl PlayerService for HeadlessClient {
    fn player(&self) -> Option<PlayerData> {
        self.state().player.clone()
    }

    fn is_inventory_busy(&self) -> bool {
        self.state().inventory_busy
    }

    fn is_seatbelt_on(&self) -> bool {
        self.state().seatbelt_on
    }

    fn is_phone_visible(&self) -> bool {
        self.state().phone_visible
    }
}

impl Notifier for HeadlessClient {
    fn notify(&self, message: &str, kind: NotificationKind) {
        self.state().notifications.push((message.to_string(), kind));
    }
}

impl SoundService for HeadlessClient {
    fn play_around(&self, sound: &str, radius: f32, volume: f32) {
        self.state().sounds.push((sound.to_string(), radius, volume));
    }
}

#[async_trait]
impl AnimationService for HeadlessClient {
    async fn play_animation(&self, clip: AnimationClip, _reset_weapon: bool) {
        self.state().animations.push(clip);
    }
}

impl VehicleService for HeadlessClient {
    /// Vehicle the player sits in, else the nearest one. `None` means unbounded.
    fn closest_vehicle(&self, max_distance: Option<f32>) -> Option<EntityId> {
        let world = self.engine.world();
        let player = world.peds.get(&world.player_ped)?;

        if let Some(vehicle) = player.vehicle {
            return Some(vehicle);
        }

        world
            .vehicles
            .iter()
            .map(|(id, v)| (*id, v.position.distance(player.position)))
            .filter(|(_, distance)| max_distance.map_or(true, |max| *distance <= max))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(id, _)| id)
    }

    fn update_vehicle_cloth_config(&self) {
        self.state().cloth_updates += 1;
    }

    fn model_name(&self, model: ModelHash) -> Option<String> {
        self.state().model_names.get(&model).cloned()
    }
}

// =============================================================================
// STATE STORE
// =============================================================================

/// Server-side view held by [`HeadlessStateStore`].
#[derive(Debug, Default)]
pub struct StoreState {
    /// Volatile state per vehicle
    pub states: BTreeMap<EntityId, VehicleVolatileState>,
    /// Plates the player holds keys for
    pub keys: BTreeSet<String>,
    /// Answer of the opened-vehicles RPC
    pub opened: Vec<NetworkId>,
    /// RPCs issued, in order
    pub rpc_calls: Vec<RpcServerEvent>,
}

/// In-memory state store; local and server state are the same map.
#[derive(Debug)]
pub struct HeadlessStateStore {
    inner: Mutex<StoreState>,
    changes: broadcast::Sender<VehicleLockChange>,
}

impl HeadlessStateStore {
    /// Empty store.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(64);
        Self { inner: Mutex::new(StoreState::default()), changes }
    }

    /// Direct access to the stored state.
    pub fn state(&self) -> MutexGuard<'_, StoreState> {
        lock(&self.inner)
    }

    /// Replace a vehicle's state and publish the lock flags.
    pub fn set_state(&self, vehicle: EntityId, state: VehicleVolatileState) {
        let change = VehicleLockChange { vehicle, open: state.open, forced: state.forced };
        self.state().states.insert(vehicle, state);
        let _ = self.changes.send(change);
    }
}

impl Default for HeadlessStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VehicleStateStore for HeadlessStateStore {
    async fn vehicle_state(&self, vehicle: EntityId) -> Result<VehicleVolatileState, StateStoreError> {
        self.state()
            .states
            .get(&vehicle)
            .cloned()
            .ok_or(StateStoreError::UnknownVehicle(vehicle))
    }

    async fn server_vehicle_state(&self, vehicle: EntityId) -> Result<VehicleVolatileState, StateStoreError> {
        self.vehicle_state(vehicle).await
    }

    async fn has_vehicle_key(&self, plate: &str) -> Result<bool, StateStoreError> {
        let mut state = self.state();
        state.rpc_calls.push(RpcServerEvent::VehicleHasKey);
        Ok(state.keys.contains(plate))
    }

    async fn opened_vehicles(&self) -> Result<Vec<NetworkId>, StateStoreError> {
        let mut state = self.state();
        state.rpc_calls.push(RpcServerEvent::VehicleGetOpened);
        Ok(state.opened.clone())
    }

    fn subscribe_lock_changes(&self) -> broadcast::Receiver<VehicleLockChange> {
        self.changes.subscribe()
    }
}
