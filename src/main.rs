//! SoZ Gameplay Demo
//!
//! Wires the vehicle provider and the housing repository against the
//! headless adapters and walks through a few interactions.

use std::sync::Arc;

use tokio::sync::{broadcast, mpsc};
use tracing::info;
use tracing_subscriber::EnvFilter;

use soz_gameplay::{
    core::hash::joaat,
    housing::{ApartmentZoneKind, GarageZones, MemoryHousingDatabase, PropertyZoneKind},
    network::{ChannelEventBus, ClientEvent},
    vehicle::{
        headless::{HeadlessClient, HeadlessEngine, HeadlessStateStore, HeadlessVehicle},
        PlayerData, VehicleClass, VehicleEngineAdapter, VehicleVolatileState,
    },
    BoxZone, ClientServices, HousingConfig, HousingRepository, LockConfig, Vector3,
    VehicleLockProvider, VERSION,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    info!("SoZ Gameplay v{}", VERSION);

    demo_vehicle().await?;
    demo_housing().await?;

    Ok(())
}

/// Lock, unlock and search a vehicle.
async fn demo_vehicle() -> anyhow::Result<()> {
    info!("=== Vehicle ===");

    let engine = Arc::new(HeadlessEngine::new(Vector3::new(0.0, -3.5, 0.0)));
    let mut spec = HeadlessVehicle::new(joaat("adder"), VehicleClass::Sports, Vector3::ZERO);
    spec.plate = "SOZ 001".to_string();
    let vehicle = engine.spawn_vehicle(spec);

    let player = PlayerData { citizenid: "CIT1".to_string(), ..Default::default() };
    let client = Arc::new(HeadlessClient::new(engine.clone(), Some(player)));
    let store = Arc::new(HeadlessStateStore::new());
    store.set_state(
        vehicle,
        VehicleVolatileState {
            id: Some(1),
            open: false,
            forced: false,
            plate: Some("SOZ 001".to_string()),
            owner: Some("CIT1".to_string()),
        },
    );
    let bus = Arc::new(ChannelEventBus::default());

    let services = ClientServices {
        engine: engine.clone(),
        player: client.clone(),
        vehicles: client.clone(),
        notifier: client.clone(),
        sounds: client.clone(),
        animations: client.clone(),
        state: store.clone(),
        bus,
    };
    let provider = Arc::new(VehicleLockProvider::new(LockConfig::from_env(), services));
    provider.setup_vehicle_opened().await?;

    let (shutdown_tx, _) = broadcast::channel(1);
    let (events_tx, events_rx) = mpsc::channel(32);
    let handles = provider.spawn(events_rx, &shutdown_tx);

    info!("Toggle: {:?}", provider.toggle_lock().await?);
    if let Some(network_id) = engine.network_id_from_entity(vehicle) {
        events_tx.send(ClientEvent::VehicleSetOpenList { vehicles: vec![network_id] }).await?;
    }
    tokio::time::sleep(std::time::Duration::from_millis(50)).await;

    info!("Trunk: {:?}", provider.open_trunk().await?);
    info!("Trunk session: {:?}", provider.trunk_session().await);

    let _ = shutdown_tx.send(());
    for handle in handles {
        handle.await?;
    }

    for (message, kind) in &client.state().notifications {
        info!("Notification [{:?}] {}", kind, message);
    }

    Ok(())
}

/// Create a property, sell an apartment and give the property a garage.
async fn demo_housing() -> anyhow::Result<()> {
    info!("=== Housing ===");

    let garages = Arc::new(GarageZones::new());
    let repository = HousingRepository::init(
        &HousingConfig::from_env(),
        Arc::new(MemoryHousingDatabase::new()),
        garages.clone(),
    )
    .await?;

    let property = repository.add_property("alta_street").await?;
    let apartment = repository.add_apartment(property.id, "alta_street_1", "Alta Street 1").await?;

    repository.set_apartment_price(apartment.id, 150_000).await?;
    repository.set_apartment_owner("CIT1", apartment.id).await?;
    repository
        .update_apartment_zone(
            apartment.id,
            BoxZone::new(Vector3::new(-270.0, -940.0, 92.5), 1.0, 1.0).with_heading(70.0),
            ApartmentZoneKind::Inside,
        )
        .await?;

    let entry = BoxZone::new(Vector3::new(-260.0, -970.0, 31.2), 2.0, 4.0);
    let garage = BoxZone::new(Vector3::new(-280.0, -990.0, 31.2), 12.0, 8.0).with_heading(160.0);
    repository.update_property_zone(property.id, entry, PropertyZoneKind::Entry).await?;
    repository.update_property_zone(property.id, garage, PropertyZoneKind::Garage).await?;

    if let Some((property, apartment)) = repository.get_apartment(property.id, apartment.id).await? {
        info!(
            "{} / {}: owner {:?}, price {:?}, spawn {:?}",
            property.identifier, apartment.label, apartment.owner, apartment.price, apartment.position
        );
    }
    info!("CIT1 has an apartment: {}", repository.has_apartment("CIT1").await?);
    info!("Registered garages: {}", garages.len().await);

    Ok(())
}
