//! Housing Repository
//!
//! In-memory cache of every property and its apartments, kept in step with
//! the database. Writes go to the database first; the row it commits is then
//! decoded and written over the cached copy, so the cache never holds a value
//! the database refused or defaulted differently.
//!
//! The cache loads lazily on first access unless preloaded.

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::config::HousingConfig;
use crate::core::vector::Vector4;
use crate::core::zone::BoxZone;
use crate::housing::database::{DatabaseError, HousingDatabase};
use crate::housing::garage::GarageRegistry;
use crate::housing::model::{
    Apartment, ApartmentId, ApartmentZoneKind, Property, PropertyId, PropertyZoneKind,
};
use crate::housing::record::{
    ApartmentRecord, ApartmentUpdate, NewApartment, PropertyRecord, PropertyUpdate,
};

/// Housing errors.
#[derive(Debug, thiserror::Error)]
pub enum HousingError {
    /// The database refused or failed the statement.
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// A JSON column could not be decoded or encoded.
    #[error("Invalid JSON column: {0}")]
    Json(#[from] serde_json::Error),

    /// No such property.
    #[error("Unknown property {0}")]
    UnknownProperty(PropertyId),

    /// A committed write targets a property the cache does not hold.
    #[error("Property {0} is not cached")]
    PropertyNotCached(PropertyId),
}

type PropertyMap = BTreeMap<PropertyId, Property>;

/// Cached view over the housing tables.
pub struct HousingRepository {
    database: Arc<dyn HousingDatabase>,
    garages: Arc<dyn GarageRegistry>,
    /// `None` until first loaded.
    data: RwLock<Option<PropertyMap>>,
}

impl HousingRepository {
    /// Create a repository. Nothing is loaded yet.
    pub fn new(database: Arc<dyn HousingDatabase>, garages: Arc<dyn GarageRegistry>) -> Self {
        Self {
            database,
            garages,
            data: RwLock::new(None),
        }
    }

    /// Create a repository and preload it when configured to.
    pub async fn init(
        config: &HousingConfig,
        database: Arc<dyn HousingDatabase>,
        garages: Arc<dyn GarageRegistry>,
    ) -> Result<Self, HousingError> {
        let repository = Self::new(database, garages);
        if config.preload {
            repository.refresh().await?;
        }
        Ok(repository)
    }

    // ===== Loading =====

    /// Reload both tables, replacing the cache.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<usize, HousingError> {
        let loaded = self.load().await?;
        let count = loaded.len();
        *self.data.write().await = Some(loaded);
        info!(properties = count, "Housing cache loaded");
        Ok(count)
    }

    /// Index properties, then attach apartments to their parent.
    async fn load(&self) -> Result<PropertyMap, HousingError> {
        let properties = self.database.list_properties().await?;
        let apartments = self.database.list_apartments().await?;

        let mut indexed = PropertyMap::new();

        for record in &properties {
            indexed.insert(record.id, record.to_property()?);
        }

        for record in &apartments {
            match indexed.get_mut(&record.property_id) {
                Some(property) => property.apartments.push(record.to_apartment()?),
                None => warn!(
                    apartment = record.id,
                    property = record.property_id,
                    "Apartment references a missing property, skipped"
                ),
            }
        }

        Ok(indexed)
    }

    async fn ensure_loaded(&self) -> Result<(), HousingError> {
        if self.data.read().await.is_some() {
            return Ok(());
        }

        let loaded = self.load().await?;
        let mut data = self.data.write().await;
        // Another caller may have loaded meanwhile; keep theirs.
        if data.is_none() {
            info!(properties = loaded.len(), "Housing cache loaded");
            *data = Some(loaded);
        }
        Ok(())
    }

    /// Run `f` against the loaded cache.
    async fn read<R>(&self, f: impl FnOnce(&PropertyMap) -> R) -> Result<R, HousingError> {
        self.ensure_loaded().await?;
        let data = self.data.read().await;
        let empty = PropertyMap::new();
        Ok(f(data.as_ref().unwrap_or(&empty)))
    }

    /// Run `f` against the loaded cache, mutably.
    async fn write<R>(&self, f: impl FnOnce(&mut PropertyMap) -> R) -> Result<R, HousingError> {
        self.ensure_loaded().await?;
        let mut data = self.data.write().await;
        Ok(f(data.get_or_insert_with(PropertyMap::new)))
    }

    // ===== Queries =====

    /// Every property, ordered by id.
    pub async fn get(&self) -> Result<Vec<Property>, HousingError> {
        self.read(|data| data.values().cloned().collect()).await
    }

    /// Property by id.
    pub async fn find(&self, property_id: PropertyId) -> Result<Option<Property>, HousingError> {
        self.read(|data| data.get(&property_id).cloned()).await
    }

    /// Whether a citizen owns or shares any apartment.
    pub async fn has_apartment(&self, citizen_id: &str) -> Result<bool, HousingError> {
        Ok(self.database.count_apartments_for_citizen(citizen_id).await? > 0)
    }

    /// Apartment by identifier.
    pub async fn get_apartment_by_identifier(&self, identifier: &str) -> Result<Option<Apartment>, HousingError> {
        self.read(|data| {
            data.values()
                .flat_map(|p| p.apartments.iter())
                .find(|a| a.identifier == identifier)
                .cloned()
        })
        .await
    }

    /// Property by identifier.
    pub async fn get_property_by_identifier(&self, identifier: &str) -> Result<Option<Property>, HousingError> {
        self.read(|data| data.values().find(|p| p.identifier == identifier).cloned())
            .await
    }

    /// A property and one of its apartments; `None` unless both exist.
    pub async fn get_apartment(
        &self,
        property_id: PropertyId,
        apartment_id: ApartmentId,
    ) -> Result<Option<(Property, Apartment)>, HousingError> {
        self.read(|data| {
            let property = data.get(&property_id)?;
            let apartment = property.apartment(apartment_id)?.clone();
            Some((property.clone(), apartment))
        })
        .await
    }

    // ===== Apartment writes =====

    /// Write the committed row over the cached apartment.
    async fn apply_apartment(&self, record: ApartmentRecord) -> Result<(), HousingError> {
        let apartment = record.to_apartment()?;
        let property_id = apartment.property_id;

        let cached = self
            .write(|data| {
                let property = data.get_mut(&property_id)?;

                match property.apartments.iter_mut().find(|a| a.id == apartment.id) {
                    Some(existing) => *existing = apartment,
                    None => {
                        warn!(apartment = apartment.id, property = property_id, "Apartment missing from cache, inserting committed row");
                        property.apartments.push(apartment);
                    }
                }
                Some(())
            })
            .await?;

        if cached.is_none() {
            warn!(property = property_id, "Committed apartment write for a property missing from cache");
            return Err(HousingError::PropertyNotCached(property_id));
        }

        Ok(())
    }

    async fn update_apartment(&self, apartment_id: ApartmentId, update: ApartmentUpdate) -> Result<(), HousingError> {
        let record = self.database.update_apartment(apartment_id, update).await?;
        self.apply_apartment(record).await
    }

    /// Evict owner and roommate, reset tier and parking.
    pub async fn clear_apartment(&self, apartment_id: ApartmentId) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Clear).await?;
        info!(apartment = apartment_id, "Apartment cleared");
        Ok(())
    }

    /// Set the owner.
    pub async fn set_apartment_owner(&self, citizen_id: &str, apartment_id: ApartmentId) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Owner(Some(citizen_id.to_string())))
            .await?;
        info!(apartment = apartment_id, citizen_id, "Apartment owner set");
        Ok(())
    }

    /// Set or remove the roommate.
    pub async fn set_apartment_roommate(
        &self,
        citizen_id: Option<&str>,
        apartment_id: ApartmentId,
    ) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Roommate(citizen_id.map(str::to_string)))
            .await?;
        info!(apartment = apartment_id, ?citizen_id, "Apartment roommate set");
        Ok(())
    }

    /// Create an apartment under a cached property.
    pub async fn add_apartment(
        &self,
        property_id: PropertyId,
        identifier: &str,
        label: &str,
    ) -> Result<Apartment, HousingError> {
        if !self.read(|data| data.contains_key(&property_id)).await? {
            warn!(property = property_id, identifier, "Refusing apartment for an unknown property");
            return Err(HousingError::UnknownProperty(property_id));
        }

        let record = self
            .database
            .create_apartment(NewApartment {
                property_id,
                identifier: identifier.to_string(),
                label: label.to_string(),
            })
            .await?;
        let apartment = record.to_apartment()?;

        self.apply_apartment(record).await?;
        info!(apartment = apartment.id, property = property_id, identifier, "Apartment added");
        Ok(apartment)
    }

    /// Set the price.
    pub async fn set_apartment_price(&self, apartment_id: ApartmentId, price: i32) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Price(price)).await
    }

    /// Set the tier.
    pub async fn set_apartment_tier(&self, apartment_id: ApartmentId, tier: i32) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Tier(tier)).await
    }

    /// Set the parking flag.
    pub async fn set_apartment_has_parking(&self, apartment_id: ApartmentId, has_parking_place: bool) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::HasParkingPlace(has_parking_place))
            .await
    }

    /// Rename.
    pub async fn set_apartment_name(&self, apartment_id: ApartmentId, name: &str) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Label(name.to_string())).await
    }

    /// Change the identifier.
    pub async fn set_apartment_identifier(&self, apartment_id: ApartmentId, identifier: &str) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::Identifier(identifier.to_string()))
            .await
    }

    /// Move one of the apartment's zones. `Inside` stores the zone center and
    /// heading as the interior spawn point.
    pub async fn update_apartment_zone(
        &self,
        apartment_id: ApartmentId,
        zone: BoxZone,
        kind: ApartmentZoneKind,
    ) -> Result<(), HousingError> {
        let json = match kind {
            ApartmentZoneKind::Inside => {
                let position = Vector4::new(zone.center.x, zone.center.y, zone.center.z, zone.heading);
                serde_json::to_string(&position)?
            }
            _ => zone.to_legacy_json(),
        };

        self.update_apartment(apartment_id, ApartmentUpdate::Zone(kind, Some(json)))
            .await?;
        debug!(apartment = apartment_id, column = kind.column(), "Apartment zone updated");
        Ok(())
    }

    /// Delete an apartment.
    pub async fn remove_apartment(&self, apartment_id: ApartmentId) -> Result<(), HousingError> {
        let record = self.database.delete_apartment(apartment_id).await?;
        let property_id = record.property_id;

        let cached = self
            .write(|data| {
                let property = data.get_mut(&property_id)?;
                property.apartments.retain(|a| a.id != apartment_id);
                Some(())
            })
            .await?;

        if cached.is_none() {
            warn!(property = property_id, apartment = apartment_id, "Removed apartment of a property missing from cache");
            return Err(HousingError::PropertyNotCached(property_id));
        }

        info!(apartment = apartment_id, property = property_id, "Apartment removed");
        Ok(())
    }

    /// Set or clear the senate party.
    pub async fn set_senate_party(&self, apartment_id: ApartmentId, senate_party_id: Option<&str>) -> Result<(), HousingError> {
        self.update_apartment(apartment_id, ApartmentUpdate::SenateParty(senate_party_id.map(str::to_string)))
            .await
    }

    // ===== Property writes =====

    /// Write the committed row over the cached property, keeping apartments.
    /// A property missing from the cache is inserted with its stored
    /// apartments.
    async fn apply_property(&self, record: &PropertyRecord) -> Result<(), HousingError> {
        let mut property = record.to_property()?;

        let patched = self
            .write(|data| {
                let existing = data.get_mut(&property.id)?;
                existing.identifier = property.identifier.clone();
                existing.entry_zone = property.entry_zone;
                existing.garage_zone = property.garage_zone;
                existing.exterior_culling = property.exterior_culling.clone();
                Some(())
            })
            .await?;

        if patched.is_some() {
            return Ok(());
        }

        warn!(property = property.id, "Property missing from cache, loading it with its apartments");
        for apartment in self.database.list_apartments().await? {
            if apartment.property_id == property.id {
                property.apartments.push(apartment.to_apartment()?);
            }
        }

        self.write(|data| {
            // Loaded meanwhile by another write; the cached copy wins.
            data.entry(property.id).or_insert(property);
        })
        .await
    }

    async fn set_exterior_culling(&self, property_id: PropertyId, culling: Vec<i32>) -> Result<(), HousingError> {
        let json = serde_json::to_string(&culling)?;
        let record = self
            .database
            .update_property(property_id, PropertyUpdate::ExteriorCulling(json))
            .await?;
        self.apply_property(&record).await
    }

    /// Hide an exterior object while inside. Unknown properties are ignored.
    pub async fn add_property_exterior_culling(&self, property_id: PropertyId, culling: i32) -> Result<(), HousingError> {
        let Some(property) = self.find(property_id).await? else {
            return Ok(());
        };

        let mut list = property.exterior_culling;
        list.push(culling);
        self.set_exterior_culling(property_id, list).await
    }

    /// Show an exterior object again. Unknown properties are ignored.
    pub async fn remove_property_exterior_culling(&self, property_id: PropertyId, culling: i32) -> Result<(), HousingError> {
        let Some(property) = self.find(property_id).await? else {
            return Ok(());
        };

        let list = property.exterior_culling.into_iter().filter(|c| *c != culling).collect();
        self.set_exterior_culling(property_id, list).await
    }

    /// Create a property.
    pub async fn add_property(&self, identifier: &str) -> Result<Property, HousingError> {
        let record = self.database.create_property(identifier).await?;
        let property = record.to_property()?;

        self.write(|data| data.insert(property.id, property.clone())).await?;
        info!(property = property.id, identifier, "Property added");
        Ok(property)
    }

    /// Move the entry or garage zone. Once both are set the property's garage
    /// is (re)registered.
    pub async fn update_property_zone(
        &self,
        property_id: PropertyId,
        zone: BoxZone,
        kind: PropertyZoneKind,
    ) -> Result<(), HousingError> {
        let record = self
            .database
            .update_property(property_id, PropertyUpdate::Zone(kind, Some(zone.to_legacy_json())))
            .await?;

        self.apply_property(&record).await?;
        debug!(property = property_id, column = kind.column(), "Property zone updated");

        let garage_zone = BoxZone::from_legacy_json(record.garage_zone.as_deref())?;
        let entry_zone = BoxZone::from_legacy_json(record.entry_zone.as_deref())?;

        if let (Some(garage_zone), Some(entry_zone)) = (garage_zone, entry_zone) {
            self.garages
                .update_add_garage(&record.identifier, garage_zone, entry_zone)
                .await;
        }

        Ok(())
    }

    /// Delete a property. The database refuses while apartments remain.
    pub async fn remove_property(&self, property_id: PropertyId) -> Result<(), HousingError> {
        self.database.delete_property(property_id).await?;
        self.write(|data| data.remove(&property_id)).await?;
        info!(property = property_id, "Property removed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vector3;
    use crate::housing::database::MemoryHousingDatabase;
    use crate::housing::garage::GarageZones;

    struct Fixture {
        db: Arc<MemoryHousingDatabase>,
        garages: Arc<GarageZones>,
        repo: HousingRepository,
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryHousingDatabase::new())
    }

    fn fixture_with(db: MemoryHousingDatabase) -> Fixture {
        let db = Arc::new(db);
        let garages = Arc::new(GarageZones::new());
        let repo = HousingRepository::new(db.clone(), garages.clone());
        Fixture { db, garages, repo }
    }

    /// One property with one apartment.
    async fn seeded() -> (Fixture, PropertyId, ApartmentId) {
        let f = fixture();
        let property = f.repo.add_property("alta_street").await.unwrap();
        let apartment = f.repo.add_apartment(property.id, "alta_1", "Alta 1").await.unwrap();
        (f, property.id, apartment.id)
    }

    #[tokio::test]
    async fn test_load_indexes_properties_first() {
        let db = MemoryHousingDatabase::with_rows(
            vec![
                PropertyRecord { id: 1, identifier: "a".to_string(), ..Default::default() },
                PropertyRecord { id: 2, identifier: "b".to_string(), ..Default::default() },
            ],
            vec![
                ApartmentRecord { id: 1, property_id: 2, identifier: "b1".to_string(), ..Default::default() },
                ApartmentRecord { id: 2, property_id: 1, identifier: "a1".to_string(), ..Default::default() },
                ApartmentRecord { id: 3, property_id: 2, identifier: "b2".to_string(), ..Default::default() },
            ],
        );
        let f = fixture_with(db);

        let properties = f.repo.get().await.unwrap();

        assert_eq!(properties.len(), 2);
        for property in &properties {
            for apartment in &property.apartments {
                assert_eq!(apartment.property_id, property.id);
            }
        }
        assert_eq!(properties[1].apartments.len(), 2);
    }

    #[tokio::test]
    async fn test_init_preloads() {
        let db: Arc<dyn HousingDatabase> = Arc::new(MemoryHousingDatabase::with_rows(
            vec![PropertyRecord { id: 3, identifier: "c".to_string(), ..Default::default() }],
            vec![],
        ));
        let repo = HousingRepository::init(&HousingConfig { preload: true }, db, Arc::new(GarageZones::new()))
            .await
            .unwrap();

        assert!(repo.data.read().await.is_some());
        assert_eq!(repo.find(3).await.unwrap().map(|p| p.identifier), Some("c".to_string()));
    }

    #[tokio::test]
    async fn test_bad_json_fails_load() {
        let db = MemoryHousingDatabase::with_rows(
            vec![PropertyRecord { id: 1, entry_zone: Some("{".to_string()), ..Default::default() }],
            vec![],
        );
        let f = fixture_with(db);

        assert!(matches!(f.repo.get().await, Err(HousingError::Json(_))));
    }

    #[tokio::test]
    async fn test_set_owner_reflected() {
        let (f, property_id, apartment_id) = seeded().await;

        f.repo.set_apartment_owner("CIT1", apartment_id).await.unwrap();
        f.repo.set_apartment_owner("CIT1", apartment_id).await.unwrap();

        let (_, apartment) = f.repo.get_apartment(property_id, apartment_id).await.unwrap().unwrap();
        assert_eq!(apartment.owner.as_deref(), Some("CIT1"));

        let property = f.repo.find(property_id).await.unwrap().unwrap();
        assert_eq!(property.apartments.len(), 1);
        assert!(f.repo.has_apartment("CIT1").await.unwrap());
    }

    #[tokio::test]
    async fn test_roommate_and_clear() {
        let (f, _, apartment_id) = seeded().await;
        f.repo.set_apartment_owner("CIT1", apartment_id).await.unwrap();
        f.repo.set_apartment_roommate(Some("CIT2"), apartment_id).await.unwrap();
        f.repo.set_apartment_tier(apartment_id, 2).await.unwrap();
        f.repo.set_apartment_has_parking(apartment_id, true).await.unwrap();
        f.repo.set_apartment_price(apartment_id, 120_000).await.unwrap();

        assert!(f.repo.has_apartment("CIT2").await.unwrap());

        f.repo.clear_apartment(apartment_id).await.unwrap();

        let apartment = f.repo.get_apartment_by_identifier("alta_1").await.unwrap().unwrap();
        assert_eq!(apartment.owner, None);
        assert_eq!(apartment.roommate, None);
        assert_eq!(apartment.tier, 0);
        assert!(!apartment.has_parking_place);
        assert_eq!(apartment.price, Some(120_000));
        assert!(!f.repo.has_apartment("CIT2").await.unwrap());
    }

    #[tokio::test]
    async fn test_rename_and_reidentify() {
        let (f, _, apartment_id) = seeded().await;

        f.repo.set_apartment_name(apartment_id, "Penthouse").await.unwrap();
        f.repo.set_apartment_identifier(apartment_id, "alta_ph").await.unwrap();
        f.repo.set_senate_party(apartment_id, Some("green")).await.unwrap();

        assert!(f.repo.get_apartment_by_identifier("alta_1").await.unwrap().is_none());
        let apartment = f.repo.get_apartment_by_identifier("alta_ph").await.unwrap().unwrap();
        assert_eq!(apartment.label, "Penthouse");
        assert_eq!(apartment.senate_party_id.as_deref(), Some("green"));

        f.repo.set_senate_party(apartment_id, None).await.unwrap();
        let apartment = f.repo.get_apartment_by_identifier("alta_ph").await.unwrap().unwrap();
        assert_eq!(apartment.senate_party_id, None);
    }

    #[tokio::test]
    async fn test_remove_apartment() {
        let (f, property_id, apartment_id) = seeded().await;

        f.repo.remove_apartment(apartment_id).await.unwrap();

        assert!(f.repo.get_apartment_by_identifier("alta_1").await.unwrap().is_none());
        assert!(f.repo.get_apartment(property_id, apartment_id).await.unwrap().is_none());
        assert!(matches!(
            f.repo.remove_apartment(apartment_id).await,
            Err(HousingError::Database(DatabaseError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_get_apartment_mismatch() {
        let (f, property_id, apartment_id) = seeded().await;
        let other = f.repo.add_property("other").await.unwrap();

        assert!(f.repo.get_apartment(other.id, apartment_id).await.unwrap().is_none());
        assert!(f.repo.get_apartment(property_id, 999).await.unwrap().is_none());
        assert!(f.repo.get_apartment(999, apartment_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_apartment_zones() {
        let (f, property_id, apartment_id) = seeded().await;
        let zone = BoxZone::new(Vector3::new(10.0, 20.0, 30.0), 2.0, 3.0).with_heading(90.0);

        f.repo.update_apartment_zone(apartment_id, zone, ApartmentZoneKind::Inside).await.unwrap();
        f.repo.update_apartment_zone(apartment_id, zone, ApartmentZoneKind::Stash).await.unwrap();

        let (_, apartment) = f.repo.get_apartment(property_id, apartment_id).await.unwrap().unwrap();
        assert_eq!(apartment.position, Some(Vector4::new(10.0, 20.0, 30.0, 90.0)));
        assert_eq!(apartment.stash_zone, Some(zone));
        assert_eq!(apartment.fridge_zone, None);
    }

    #[tokio::test]
    async fn test_exterior_culling() {
        let (f, property_id, _) = seeded().await;

        f.repo.add_property_exterior_culling(property_id, 11).await.unwrap();
        f.repo.add_property_exterior_culling(property_id, 22).await.unwrap();
        f.repo.remove_property_exterior_culling(property_id, 11).await.unwrap();

        let property = f.repo.find(property_id).await.unwrap().unwrap();
        assert_eq!(property.exterior_culling, vec![22]);
        // Apartments survive a property patch.
        assert_eq!(property.apartments.len(), 1);

        let rows = f.db.list_properties().await.unwrap();
        assert_eq!(rows[0].exterior_culling.as_deref(), Some("[22]"));

        // Unknown property: silently ignored.
        f.repo.add_property_exterior_culling(999, 1).await.unwrap();
    }

    #[tokio::test]
    async fn test_property_zones_register_garage() {
        let f = fixture();
        let property = f.repo.add_property("alta_street").await.unwrap();
        let entry = BoxZone::new(Vector3::new(1.0, 1.0, 1.0), 2.0, 2.0);
        let garage = BoxZone::new(Vector3::new(5.0, 5.0, 1.0), 6.0, 4.0).with_heading(45.0);

        f.repo.update_property_zone(property.id, entry, PropertyZoneKind::Entry).await.unwrap();
        assert!(f.garages.is_empty().await);

        f.repo.update_property_zone(property.id, garage, PropertyZoneKind::Garage).await.unwrap();

        let registered = f.garages.get("alta_street").await.unwrap();
        assert_eq!(registered.garage_zone, garage);
        assert_eq!(registered.entry_zone, entry);

        let cached = f.repo.get_property_by_identifier("alta_street").await.unwrap().unwrap();
        assert_eq!(cached.entry_zone, Some(entry));
        assert_eq!(cached.garage_zone, Some(garage));
    }

    #[tokio::test]
    async fn test_remove_property() {
        let (f, property_id, apartment_id) = seeded().await;

        // Apartments still reference it.
        assert!(matches!(
            f.repo.remove_property(property_id).await,
            Err(HousingError::Database(DatabaseError::ForeignKey(_)))
        ));
        assert!(f.repo.find(property_id).await.unwrap().is_some());

        f.repo.remove_apartment(apartment_id).await.unwrap();
        f.repo.remove_property(property_id).await.unwrap();
        assert!(f.repo.find(property_id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_add_apartment_requires_cached_property() {
        let f = fixture();
        f.repo.refresh().await.unwrap();
        // Created behind the repository's back.
        let property = f.db.create_property("hidden").await.unwrap();

        assert!(matches!(
            f.repo.add_apartment(property.id, "h1", "H1").await,
            Err(HousingError::UnknownProperty(_))
        ));
        // Refused before the write.
        assert!(f.db.list_apartments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_apartment_is_compensated() {
        let (f, property_id, _) = seeded().await;
        let record = f
            .db
            .create_apartment(NewApartment { property_id, identifier: "alta_2".to_string(), label: "Alta 2".to_string() })
            .await
            .unwrap();

        f.repo.set_apartment_price(record.id, 900).await.unwrap();

        let apartment = f.repo.get_apartment_by_identifier("alta_2").await.unwrap().unwrap();
        assert_eq!(apartment.price, Some(900));
    }

    #[tokio::test]
    async fn test_missing_property_reports_drift() {
        let f = fixture();
        f.repo.refresh().await.unwrap();
        let property = f.db.create_property("hidden").await.unwrap();
        let record = f
            .db
            .create_apartment(NewApartment { property_id: property.id, identifier: "h1".to_string(), label: "H1".to_string() })
            .await
            .unwrap();

        let result = f.repo.set_apartment_tier(record.id, 1).await;

        assert!(matches!(result, Err(HousingError::PropertyNotCached(id)) if id == property.id));
        // The write itself was committed.
        assert_eq!(f.db.list_apartments().await.unwrap()[0].tier, 1);

        // A refresh heals the cache.
        f.repo.refresh().await.unwrap();
        assert_eq!(f.repo.get_apartment_by_identifier("h1").await.unwrap().unwrap().tier, 1);
    }

    #[tokio::test]
    async fn test_load_skips_orphan_apartments() {
        let db = MemoryHousingDatabase::with_rows(
            vec![PropertyRecord { id: 1, identifier: "a".to_string(), ..Default::default() }],
            vec![
                ApartmentRecord { id: 1, property_id: 1, identifier: "a1".to_string(), ..Default::default() },
                ApartmentRecord { id: 2, property_id: 7, identifier: "orphan".to_string(), ..Default::default() },
            ],
        );
        let f = fixture_with(db);

        let properties = f.repo.get().await.unwrap();

        assert_eq!(properties.len(), 1);
        assert_eq!(properties[0].apartments.len(), 1);
        assert!(properties.iter().flat_map(|p| p.apartments.iter()).all(|a| a.id != 2));
        assert!(f.repo.get_apartment_by_identifier("orphan").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_uncached_property_loaded_with_apartments() {
        let f = fixture();
        f.repo.refresh().await.unwrap();
        let property = f.db.create_property("hidden").await.unwrap();
        f.db
            .create_apartment(NewApartment { property_id: property.id, identifier: "h1".to_string(), label: "H1".to_string() })
            .await
            .unwrap();

        let entry = BoxZone::new(Vector3::new(1.0, 1.0, 1.0), 2.0, 2.0);
        f.repo.update_property_zone(property.id, entry, PropertyZoneKind::Entry).await.unwrap();

        let cached = f.repo.find(property.id).await.unwrap().unwrap();
        assert_eq!(cached.entry_zone, Some(entry));
        assert_eq!(cached.apartments.len(), 1);
        assert_eq!(
            f.repo.get_apartment_by_identifier("h1").await.unwrap().map(|a| a.property_id),
            Some(property.id)
        );
    }

    #[tokio::test]
    async fn test_remove_apartment_of_uncached_property() {
        let f = fixture();
        f.repo.refresh().await.unwrap();
        let property = f.db.create_property("hidden").await.unwrap();
        let record = f
            .db
            .create_apartment(NewApartment { property_id: property.id, identifier: "h1".to_string(), label: "H1".to_string() })
            .await
            .unwrap();

        let result = f.repo.remove_apartment(record.id).await;

        assert!(matches!(result, Err(HousingError::PropertyNotCached(id)) if id == property.id));
        // The delete itself was committed.
        assert!(f.db.list_apartments().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_lazy_load() {
        let db = MemoryHousingDatabase::with_rows(
            vec![PropertyRecord { id: 1, identifier: "a".to_string(), ..Default::default() }],
            vec![],
        );
        let f = fixture_with(db);
        let repo = Arc::new(f.repo);

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let repo = repo.clone();
                tokio::spawn(async move { repo.get().await.unwrap().len() })
            })
            .collect();

        for handle in handles {
            assert_eq!(handle.await.unwrap(), 1);
        }
    }
}
