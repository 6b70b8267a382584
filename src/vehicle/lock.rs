//! Vehicle Lock Provider
//!
//! Client-side gating for vehicle locks and trunks:
//!
//! - Lock toggling (key check, speed limit, key-fob animation)
//! - Trunk sessions that close themselves when the player walks away
//! - Entry interception: locked vehicles refuse entry, unlocked ones seat
//!   the player in the closest free seat
//! - Police alerts on lockpick attempts
//!
//! The provider owns no engine state. Everything it reads or mutates goes
//! through the injected [`ClientServices`].

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::{broadcast, mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, Instant, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};

use crate::config::LockConfig;
use crate::core::hash::ModelHash;
use crate::network::bus::EventBus;
use crate::network::protocol::{ClientEvent, LocalEvent, LockpickKind, ServerEvent, TrunkContext};
use crate::vehicle::engine::VehicleEngineAdapter;
use crate::vehicle::lockpick::{self, HEIST_ZONE};
use crate::vehicle::seat::closest_seat;
use crate::vehicle::services::{
    AnimationService, NotificationKind, Notifier, PlayerData, PlayerService, SoundService,
    StateStoreError, VehicleLockChange, VehicleService, VehicleStateStore, KEY_FOB_ANIMATION,
};
use crate::vehicle::trunk::TrunkOpened;
use crate::vehicle::types::{
    trunk_type_for_model, EntityId, NetworkId, VehicleLockStatus, VehicleSeat,
    VehicleVolatileState, EXIT_VEHICLE_CONTROL, TRUNK_DOOR_INDEX,
};

/// Radius (m) the lock/unlock sounds carry.
const LOCK_SOUND_RADIUS: f32 = 5.0;
/// Lock/unlock sound volume.
const LOCK_SOUND_VOLUME: f32 = 0.1;

// =============================================================================
// ERRORS AND OUTCOMES
// =============================================================================

/// Provider errors. Gating failures are outcomes, not errors.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The state store could not answer.
    #[error("State store error: {0}")]
    StateStore(#[from] StateStoreError),
}

/// Why an action was refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DenyReason {
    /// No character loaded.
    NoPlayer,
    /// The phone UI has focus.
    PhoneVisible,
    /// Dead or handcuffed.
    Incapacitated,
    /// Sitting in a vehicle.
    InVehicle,
    /// Another action holds the inventory.
    ActionInProgress,
    /// The inventory is in use.
    InventoryBusy,
    /// No vehicle nearby.
    NoVehicle,
    /// Vehicle moving too fast.
    TooFast,
    /// Player holds no key.
    NoKey,
    /// Player is not next to the vehicle.
    NotInTrunkZone,
    /// Vehicle is locked.
    Locked,
}

impl DenyReason {
    /// Notification shown for this refusal, if any.
    pub fn notification(self) -> Option<(&'static str, NotificationKind)> {
        match self {
            DenyReason::NoPlayer
            | DenyReason::PhoneVisible
            | DenyReason::Incapacitated
            | DenyReason::InVehicle => None,
            DenyReason::ActionInProgress => Some(("An action is already in progress!", NotificationKind::Warning)),
            DenyReason::InventoryBusy => Some(("Inventory in use.", NotificationKind::Warning)),
            DenyReason::NoVehicle => Some(("No vehicle nearby.", NotificationKind::Error)),
            DenyReason::TooFast => Some(("You are going too fast to do that.", NotificationKind::Error)),
            DenyReason::NoKey => Some(("You don't have the keys.", NotificationKind::Error)),
            DenyReason::NotInTrunkZone => Some(("You must be next to the vehicle.", NotificationKind::Error)),
            DenyReason::Locked => Some(("Vehicle locked.", NotificationKind::Error)),
        }
    }
}

/// Result of a lock toggle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LockOutcome {
    /// The vehicle was locked.
    Locked(NetworkId),
    /// The vehicle was unlocked.
    Unlocked(NetworkId),
    /// Nothing changed.
    Denied(DenyReason),
}

/// Result of a trunk opening.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrunkOutcome {
    /// Inventory requested and session recorded.
    Opened {
        /// Vehicle whose trunk is open
        vehicle: NetworkId,
        /// Inventory type requested
        inventory_type: &'static str,
    },
    /// Nothing changed.
    Denied(DenyReason),
}

/// Checks run every frame.
#[derive(Clone, Copy, Debug)]
enum FrameCheck {
    Enter,
    Leave,
}

// =============================================================================
// SERVICES
// =============================================================================

/// Everything the provider is wired with.
#[derive(Clone)]
pub struct ClientServices {
    /// Engine natives
    pub engine: Arc<dyn VehicleEngineAdapter>,
    /// Local player
    pub player: Arc<dyn PlayerService>,
    /// Vehicle lookups
    pub vehicles: Arc<dyn VehicleService>,
    /// Notifications
    pub notifier: Arc<dyn Notifier>,
    /// Sounds
    pub sounds: Arc<dyn SoundService>,
    /// Animations
    pub animations: Arc<dyn AnimationService>,
    /// Server-authoritative vehicle state
    pub state: Arc<dyn VehicleStateStore>,
    /// Outbound events
    pub bus: Arc<dyn EventBus>,
}

// =============================================================================
// PROVIDER
// =============================================================================

/// Vehicle lock and trunk gating for the local player.
pub struct VehicleLockProvider {
    config: LockConfig,
    services: ClientServices,
    /// Open trunk session.
    trunk_opened: RwLock<Option<TrunkOpened>>,
    /// Network ids of every unlocked vehicle.
    vehicle_opened: RwLock<BTreeSet<NetworkId>>,
    /// Entry interception paused (scripted sequences).
    lock_temp_disabled: AtomicBool,
}

impl VehicleLockProvider {
    /// Create a provider.
    pub fn new(config: LockConfig, services: ClientServices) -> Self {
        Self {
            config,
            services,
            trunk_opened: RwLock::new(None),
            vehicle_opened: RwLock::new(BTreeSet::new()),
            lock_temp_disabled: AtomicBool::new(false),
        }
    }

    fn engine(&self) -> &dyn VehicleEngineAdapter {
        self.services.engine.as_ref()
    }

    fn deny(&self, reason: DenyReason) -> DenyReason {
        if let Some((message, kind)) = reason.notification() {
            self.services.notifier.notify(message, kind);
        }
        debug!(?reason, "vehicle action denied");
        reason
    }

    // ===== Opened set =====

    /// Load the set of unlocked vehicles from the server.
    pub async fn setup_vehicle_opened(&self) -> Result<(), ProviderError> {
        let opened = self.services.state.opened_vehicles().await?;
        let mut set = self.vehicle_opened.write().await;
        *set = opened.into_iter().collect();
        info!(count = set.len(), "Loaded opened vehicles");
        Ok(())
    }

    /// Whether a local vehicle is in the unlocked set.
    pub async fn is_vehicle_open(&self, entity: EntityId) -> bool {
        match self.engine().network_id_from_entity(entity) {
            Some(network_id) => self.vehicle_opened.read().await.contains(&network_id),
            None => false,
        }
    }

    /// Replace the unlocked set.
    pub async fn on_vehicle_open_list(&self, vehicles: Vec<NetworkId>) {
        *self.vehicle_opened.write().await = vehicles.into_iter().collect();
    }

    /// Entered or left a vehicle.
    pub fn on_enter_leave_vehicle(&self) {
        self.services.vehicles.update_vehicle_cloth_config();
    }

    /// Mirror a server-side lock change onto the engine.
    pub async fn on_vehicle_open_change(&self, vehicle: EntityId, open: bool, forced: bool) {
        let engine = self.engine();

        if open || forced {
            engine.set_vehicle_doors_locked(vehicle, VehicleLockStatus::Unlocked);
        } else {
            engine.set_vehicle_doors_locked(vehicle, VehicleLockStatus::Locked);

            let mut trunk = self.trunk_opened.write().await;
            if trunk.as_ref().map(|t| t.vehicle) == Some(vehicle) {
                *trunk = None;
                drop(trunk);
                info!(?vehicle, "Vehicle locked with trunk open, closing inventory");
                self.services.bus.emit_local(LocalEvent::CloseInventory);
            }
        }

        if engine.network_has_control_of_entity(vehicle) {
            engine.set_vehicle_lights(vehicle, 2);
            sleep(self.config.light_on_delay).await;
            engine.set_vehicle_lights(vehicle, 1);
            sleep(self.config.light_off_delay).await;
            engine.set_vehicle_lights(vehicle, 0);
        }
    }

    // ===== Lock =====

    /// Lock or unlock the closest vehicle.
    pub async fn toggle_lock(&self) -> Result<LockOutcome, ProviderError> {
        let services = &self.services;
        let engine = self.engine();

        let Some(player) = services.player.player() else {
            return Ok(LockOutcome::Denied(DenyReason::NoPlayer));
        };

        if services.player.is_phone_visible() {
            return Ok(LockOutcome::Denied(DenyReason::PhoneVisible));
        }

        if player.metadata.ishandcuffed || player.metadata.isdead {
            return Ok(LockOutcome::Denied(DenyReason::Incapacitated));
        }

        if services.player.is_inventory_busy() {
            return Ok(LockOutcome::Denied(self.deny(DenyReason::ActionInProgress)));
        }

        let Some(vehicle) = services.vehicles.closest_vehicle(None) else {
            return Ok(LockOutcome::Denied(self.deny(DenyReason::NoVehicle)));
        };

        if engine.entity_speed(vehicle) > self.config.max_lock_speed_ms() {
            return Ok(LockOutcome::Denied(self.deny(DenyReason::TooFast)));
        }

        let state = services.state.vehicle_state(vehicle).await?;

        if !self.has_vehicle_key(&player, &state).await? {
            return Ok(LockOutcome::Denied(self.deny(DenyReason::NoKey)));
        }

        let Some(network_id) = engine.network_id_from_entity(vehicle) else {
            warn!(?vehicle, "Closest vehicle is not networked");
            return Ok(LockOutcome::Denied(self.deny(DenyReason::NoVehicle)));
        };

        let in_vehicle = engine.vehicle_ped_is_in(engine.player_ped()) == Some(vehicle);
        if !in_vehicle {
            services.animations.play_animation(KEY_FOB_ANIMATION, false).await;
        }

        if state.open {
            services.sounds.play_around("vehicle/lock", LOCK_SOUND_RADIUS, LOCK_SOUND_VOLUME);
            services.bus.emit_server(ServerEvent::VehicleSetOpen { vehicle: network_id, open: false });
            engine.set_vehicle_doors_locked(vehicle, VehicleLockStatus::Locked);
            info!(?network_id, "Vehicle locked");
            Ok(LockOutcome::Locked(network_id))
        } else {
            services.sounds.play_around("vehicle/unlock", LOCK_SOUND_RADIUS, LOCK_SOUND_VOLUME);
            services.bus.emit_server(ServerEvent::VehicleSetOpen { vehicle: network_id, open: true });
            engine.set_vehicle_doors_locked(vehicle, VehicleLockStatus::Unlocked);
            info!(?network_id, "Vehicle unlocked");
            Ok(LockOutcome::Unlocked(network_id))
        }
    }

    /// Key rule: temporary vehicles answer to their owner only; persistent
    /// ones to their owner or any key holder.
    async fn has_vehicle_key(&self, player: &PlayerData, state: &VehicleVolatileState) -> Result<bool, ProviderError> {
        let is_owner = state.owner.as_deref() == Some(player.citizenid.as_str());

        if state.id.is_none() || is_owner {
            return Ok(is_owner);
        }

        match state.plate.as_deref() {
            Some(plate) => Ok(self.services.state.has_vehicle_key(plate).await?),
            None => Ok(false),
        }
    }

    // ===== Trunk =====

    /// Open the trunk of the closest vehicle.
    pub async fn open_trunk(&self) -> Result<TrunkOutcome, ProviderError> {
        self.open_trunk_inner(None, true).await
    }

    /// Open a vehicle's trunk regardless of its lock.
    pub async fn open_vehicle_police(&self, vehicle: EntityId) -> Result<TrunkOutcome, ProviderError> {
        self.open_trunk_inner(Some(vehicle), false).await
    }

    async fn open_trunk_inner(&self, target: Option<EntityId>, check_open: bool) -> Result<TrunkOutcome, ProviderError> {
        let services = &self.services;
        let engine = self.engine();
        let ped = engine.player_ped();

        let Some(player) = services.player.player() else {
            return Ok(TrunkOutcome::Denied(DenyReason::NoPlayer));
        };

        if player.metadata.isdead || player.metadata.ishandcuffed {
            return Ok(TrunkOutcome::Denied(DenyReason::Incapacitated));
        }

        if engine.vehicle_ped_is_in(ped).is_some() {
            return Ok(TrunkOutcome::Denied(DenyReason::InVehicle));
        }

        let vehicle = target
            .or_else(|| services.vehicles.closest_vehicle(Some(self.config.trunk_search_distance)))
            .filter(|v| engine.does_entity_exist(*v) && engine.is_entity_a_vehicle(*v));

        let Some((vehicle, network_id)) = vehicle.and_then(|v| Some((v, engine.network_id_from_entity(v)?))) else {
            return Ok(TrunkOutcome::Denied(self.deny(DenyReason::NoVehicle)));
        };

        let opened = TrunkOpened::capture(engine, vehicle, network_id);

        if !self.is_in_trunk_zone(&opened) {
            return Ok(TrunkOutcome::Denied(self.deny(DenyReason::NotInTrunkZone)));
        }

        let state = services.state.server_vehicle_state(vehicle).await?;

        if check_open && !state.forced && !player.metadata.godmode && !state.open {
            return Ok(TrunkOutcome::Denied(self.deny(DenyReason::Locked)));
        }

        if services.player.is_inventory_busy() {
            return Ok(TrunkOutcome::Denied(self.deny(DenyReason::InventoryBusy)));
        }

        let plate = state.plate.unwrap_or_else(|| engine.vehicle_plate_text(vehicle));
        let model = engine.entity_model(vehicle);
        let inventory_type = trunk_type_for_model(model);

        services.bus.emit_server(ServerEvent::InventoryOpen {
            inventory_type: inventory_type.to_string(),
            plate,
            context: TrunkContext {
                model,
                class: engine.vehicle_class(vehicle),
                entity: network_id,
            },
        });
        services.bus.emit_server(ServerEvent::VehicleSetTrunkState { vehicle: network_id, open: true });

        *self.trunk_opened.write().await = Some(opened);
        info!(?network_id, inventory_type, police = !check_open, "Trunk opened");

        Ok(TrunkOutcome::Opened { vehicle: network_id, inventory_type })
    }

    fn is_in_trunk_zone(&self, opened: &TrunkOpened) -> bool {
        let engine = self.engine();
        opened.contains(
            engine,
            engine.entity_coords(engine.player_ped()),
            self.config.trunk_zone_margin,
            self.config.trunk_zone_height,
        )
    }

    /// Current trunk session.
    pub async fn trunk_session(&self) -> Option<TrunkOpened> {
        *self.trunk_opened.read().await
    }

    /// Close the trunk session if the vehicle is gone or out of reach.
    /// Returns whether it was closed.
    pub async fn check_keep_vehicle_trunk_open(&self) -> bool {
        let Some(opened) = *self.trunk_opened.read().await else {
            return false;
        };

        if self.engine().does_entity_exist(opened.vehicle) && self.is_in_trunk_zone(&opened) {
            return false;
        }

        // Another path may have closed it meanwhile; only the closer warns.
        if self.close_trunk().await.is_none() {
            return false;
        }

        self.services.bus.emit_local(LocalEvent::CloseInventory);
        self.services.notifier.notify("The trunk is too far away.", NotificationKind::Warning);
        info!(network_id = ?opened.network_id, "Trunk out of reach, session closed");
        true
    }

    /// Close the trunk session, returning it.
    pub async fn close_trunk(&self) -> Option<TrunkOpened> {
        let closed = self.trunk_opened.write().await.take();

        if let Some(opened) = closed {
            self.services.bus.emit_server(ServerEvent::VehicleSetTrunkState {
                vehicle: opened.network_id,
                open: false,
            });
        }

        closed
    }

    /// Open or shut a vehicle's trunk door.
    pub fn set_vehicle_trunk_state(&self, network_id: NetworkId, open: bool) {
        let engine = self.engine();

        let Some(vehicle) = engine.entity_from_network_id(network_id) else {
            return;
        };

        if !engine.does_entity_exist(vehicle) {
            return;
        }

        if open {
            engine.set_vehicle_door_open(vehicle, TRUNK_DOOR_INDEX);
        } else {
            engine.set_vehicle_door_shut(vehicle, TRUNK_DOOR_INDEX);
        }
    }

    // ===== Entry / exit =====

    /// Intercept the player's entry attempt.
    pub async fn check_player_can_enter_vehicle(&self) {
        let engine = self.engine();

        let Some(player) = self.services.player.player() else {
            return;
        };

        let ped = engine.player_ped();

        let Some(vehicle) = engine.vehicle_ped_is_trying_to_enter(ped) else {
            return;
        };

        let Some(network_id) = engine.network_id_from_entity(vehicle) else {
            return;
        };

        if self.lock_temp_disabled.load(Ordering::Relaxed) {
            return;
        }

        let opened = self.vehicle_opened.read().await.contains(&network_id);

        if !player.metadata.godmode && !opened {
            engine.set_vehicle_doors_locked(vehicle, VehicleLockStatus::Locked);

            if engine.vehicle_class(vehicle).is_two_wheeled() {
                engine.clear_ped_tasks_immediately(ped);
            }

            debug!(?network_id, "Entry refused, vehicle locked");

            // Hold this check until the attempt is abandoned.
            while engine.vehicle_ped_is_trying_to_enter(ped).is_some() {
                sleep(self.config.frame_interval).await;
            }

            return;
        }

        let Some(seat) = closest_seat(engine, ped, vehicle, self.config.seat_radius) else {
            return;
        };

        let start = Instant::now();
        engine.task_enter_vehicle(ped, vehicle, seat);
        debug!(?network_id, seat = seat.0, "Entering vehicle");

        let entering = || {
            engine
                .vehicle_ped_is_entering(ped)
                .or_else(|| engine.vehicle_ped_is_trying_to_enter(ped))
        };

        sleep(self.config.enter_poll_interval).await;

        while entering().is_some() && start.elapsed() < self.config.enter_timeout {
            sleep(self.config.enter_poll_interval).await;
        }

        if entering().is_some() {
            warn!(?network_id, "Entry task timed out, cancelling");
            engine.clear_ped_tasks_immediately(ped);
        }
    }

    /// Seatbelt and exit handling while driving.
    pub async fn check_vehicle_leave(&self) {
        let engine = self.engine();
        let ped = engine.player_ped();

        if self.services.player.is_seatbelt_on() {
            engine.disable_control_action(EXIT_VEHICLE_CONTROL);
            return;
        }

        let Some(vehicle) = engine.vehicle_ped_is_in(ped) else {
            return;
        };

        if engine.ped_in_vehicle_seat(vehicle, VehicleSeat::DRIVER) != Some(ped) {
            return;
        }

        let wants_exit = || engine.is_control_pressed(EXIT_VEHICLE_CONTROL) && !engine.is_entity_dead(ped);

        if !wants_exit() {
            return;
        }

        // Keep the engine running unless the press turns out to be a tap.
        engine.set_vehicle_engine_on(vehicle, true);
        sleep(self.config.leave_confirm_delay).await;

        if engine.does_entity_exist(vehicle) && wants_exit() {
            engine.set_vehicle_engine_on(vehicle, true);
            engine.task_leave_vehicle(ped, vehicle);
        } else {
            engine.set_vehicle_engine_on(vehicle, false);
        }
    }

    /// Pause or resume entry interception.
    pub fn set_lock_temp_disabled(&self, value: bool) {
        self.lock_temp_disabled.store(value, Ordering::Relaxed);
    }

    // ===== Lockpick =====

    /// Tip off the police about a lockpick attempt. Returns whether an alert
    /// was sent.
    pub fn on_lockpick(&self, kind: LockpickKind, model: ModelHash) -> bool {
        let engine = self.engine();
        let position = engine.entity_coords(engine.player_ped());
        let zone_id = engine.zone_name_at(position);

        if zone_id == HEIST_ZONE {
            debug!("Lockpick inside heist zone, no alert");
            return false;
        }

        let zone = engine.label_text(&zone_id);
        let model_name = self
            .services
            .vehicles
            .model_name(model)
            .unwrap_or_else(|| engine.display_name_from_model(model));

        let message = lockpick::random_alert(&mut rand::thread_rng(), kind, &zone, &model_name);

        self.services.bus.emit_server(ServerEvent::PhoneSocietyMessage {
            event_id: lockpick::society_event_id(),
            message,
        });
        info!(?kind, zone = %zone, "Lockpick alert sent");
        true
    }

    // ===== Wiring =====

    /// Dispatch a bus event.
    pub async fn handle_event(&self, event: ClientEvent) {
        debug!(event = event.name(), "client event");

        match event {
            ClientEvent::VehicleSetOpenList { vehicles } => self.on_vehicle_open_list(vehicles).await,
            ClientEvent::VehicleCloseTrunk => {
                self.close_trunk().await;
            }
            ClientEvent::VehicleSetTrunkState { vehicle, open } => self.set_vehicle_trunk_state(vehicle, open),
            ClientEvent::VehicleLockpick { kind, model } => {
                self.on_lockpick(kind, model);
            }
            ClientEvent::BaseEnteredVehicle | ClientEvent::BaseLeftVehicle => self.on_enter_leave_vehicle(),
        }
    }

    /// Start the background tasks: bus events, lock-state changes, the
    /// per-frame checks and the trunk watchdog. All stop on `shutdown`.
    pub fn spawn(
        self: &Arc<Self>,
        mut events: mpsc::Receiver<ClientEvent>,
        shutdown: &broadcast::Sender<()>,
    ) -> Vec<JoinHandle<()>> {
        let mut handles = Vec::new();

        // Bus events
        let provider = self.clone();
        let mut shutdown_rx = shutdown.subscribe();
        handles.push(tokio::spawn(async move {
            loop {
                tokio::select! {
                    event = events.recv() => match event {
                        Some(event) => provider.handle_event(event).await,
                        None => break,
                    },
                    _ = shutdown_rx.recv() => break,
                }
            }
            debug!("Event loop stopped");
        }));

        // Lock-state changes
        let provider = self.clone();
        let changes = self.services.state.subscribe_lock_changes();
        let mut shutdown_rx = shutdown.subscribe();
        handles.push(tokio::spawn(async move {
            provider.run_lock_change_loop(changes, &mut shutdown_rx).await;
        }));

        // Per-frame checks
        for check in [FrameCheck::Enter, FrameCheck::Leave] {
            let provider = self.clone();
            let mut shutdown_rx = shutdown.subscribe();
            handles.push(tokio::spawn(async move {
                provider.run_frame_loop(check, &mut shutdown_rx).await;
            }));
        }

        // Trunk watchdog
        let provider = self.clone();
        let mut shutdown_rx = shutdown.subscribe();
        handles.push(tokio::spawn(async move {
            provider.run_trunk_watchdog(&mut shutdown_rx).await;
        }));

        info!(tasks = handles.len(), "Vehicle lock provider started");
        handles
    }

    #[instrument(skip(self, changes, shutdown))]
    async fn run_lock_change_loop(
        self: &Arc<Self>,
        mut changes: broadcast::Receiver<VehicleLockChange>,
        shutdown: &mut broadcast::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                change = changes.recv() => match change {
                    Ok(change) => {
                        // Light flashes sleep; keep receiving meanwhile.
                        let provider = self.clone();
                        tokio::spawn(async move {
                            provider.on_vehicle_open_change(change.vehicle, change.open, change.forced).await;
                        });
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "Lock change stream lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                _ = shutdown.recv() => break,
            }
        }
    }

    #[instrument(skip(self, shutdown))]
    async fn run_frame_loop(self: &Arc<Self>, check: FrameCheck, shutdown: &mut broadcast::Receiver<()>) {
        let mut ticker = interval(self.config.frame_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = async {
                    ticker.tick().await;
                    #[cfg(feature = "debug-tracing")]
                    tracing::trace!(?check, "frame check");
                    match check {
                        FrameCheck::Enter => self.check_player_can_enter_vehicle().await,
                        FrameCheck::Leave => self.check_vehicle_leave().await,
                    }
                } => {}
                _ = shutdown.recv() => break,
            }
        }
    }

    #[instrument(skip(self, shutdown))]
    async fn run_trunk_watchdog(self: &Arc<Self>, shutdown: &mut broadcast::Receiver<()>) {
        let mut ticker = interval(self.config.watchdog_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.check_keep_vehicle_trunk_open().await;
                }
                _ = shutdown.recv() => break,
            }
        }
    }
}
