//! Housing Database
//!
//! The slice of the ORM the repository uses, and an in-memory backend
//! enforcing the same constraints: auto-increment ids and the
//! `housing_apartment.property_id -> housing_property.id` foreign key.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use crate::housing::model::{ApartmentId, PropertyId};
use crate::housing::record::{
    ApartmentRecord, ApartmentUpdate, NewApartment, PropertyRecord, PropertyUpdate,
    APARTMENT_TABLE, PROPERTY_TABLE,
};

/// Database errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DatabaseError {
    /// No row with that id.
    #[error("No row {id} in {table}")]
    NotFound {
        /// Table queried
        table: &'static str,
        /// Missing id
        id: i32,
    },

    /// The write would break a foreign key.
    #[error("Foreign key violation: {0}")]
    ForeignKey(String),

    /// The backend failed.
    #[error("Database backend error: {0}")]
    Backend(String),
}

/// Housing tables.
///
/// Every write returns the row as committed.
#[async_trait]
pub trait HousingDatabase: Send + Sync {
    /// Apartments where the citizen is owner or roommate.
    async fn count_apartments_for_citizen(&self, citizen_id: &str) -> Result<u64, DatabaseError>;

    /// Every property row.
    async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError>;

    /// Every apartment row.
    async fn list_apartments(&self) -> Result<Vec<ApartmentRecord>, DatabaseError>;

    /// Insert a property.
    async fn create_property(&self, identifier: &str) -> Result<PropertyRecord, DatabaseError>;

    /// Update one property column.
    async fn update_property(&self, id: PropertyId, update: PropertyUpdate) -> Result<PropertyRecord, DatabaseError>;

    /// Delete a property with no apartments left.
    async fn delete_property(&self, id: PropertyId) -> Result<PropertyRecord, DatabaseError>;

    /// Insert an apartment.
    async fn create_apartment(&self, apartment: NewApartment) -> Result<ApartmentRecord, DatabaseError>;

    /// Update apartment columns.
    async fn update_apartment(&self, id: ApartmentId, update: ApartmentUpdate) -> Result<ApartmentRecord, DatabaseError>;

    /// Delete an apartment.
    async fn delete_apartment(&self, id: ApartmentId) -> Result<ApartmentRecord, DatabaseError>;
}

// =============================================================================
// IN-MEMORY BACKEND
// =============================================================================

#[derive(Debug, Default)]
struct Tables {
    properties: BTreeMap<PropertyId, PropertyRecord>,
    apartments: BTreeMap<ApartmentId, ApartmentRecord>,
    next_property_id: PropertyId,
    next_apartment_id: ApartmentId,
}

/// In-memory housing tables.
#[derive(Debug, Default)]
pub struct MemoryHousingDatabase {
    tables: Mutex<Tables>,
}

impl MemoryHousingDatabase {
    /// Empty tables.
    pub fn new() -> Self {
        Self::default()
    }

    /// Tables seeded with rows, as if loaded from a dump.
    pub fn with_rows(properties: Vec<PropertyRecord>, apartments: Vec<ApartmentRecord>) -> Self {
        let mut tables = Tables::default();

        for property in properties {
            tables.next_property_id = tables.next_property_id.max(property.id);
            tables.properties.insert(property.id, property);
        }
        for apartment in apartments {
            tables.next_apartment_id = tables.next_apartment_id.max(apartment.id);
            tables.apartments.insert(apartment.id, apartment);
        }

        Self { tables: Mutex::new(tables) }
    }
}

#[async_trait]
impl HousingDatabase for MemoryHousingDatabase {
    async fn count_apartments_for_citizen(&self, citizen_id: &str) -> Result<u64, DatabaseError> {
        let tables = self.tables.lock().await;
        let count = tables
            .apartments
            .values()
            .filter(|a| a.owner.as_deref() == Some(citizen_id) || a.roommate.as_deref() == Some(citizen_id))
            .count();
        Ok(count as u64)
    }

    async fn list_properties(&self) -> Result<Vec<PropertyRecord>, DatabaseError> {
        Ok(self.tables.lock().await.properties.values().cloned().collect())
    }

    async fn list_apartments(&self) -> Result<Vec<ApartmentRecord>, DatabaseError> {
        Ok(self.tables.lock().await.apartments.values().cloned().collect())
    }

    async fn create_property(&self, identifier: &str) -> Result<PropertyRecord, DatabaseError> {
        let mut tables = self.tables.lock().await;
        tables.next_property_id += 1;

        let record = PropertyRecord {
            id: tables.next_property_id,
            identifier: identifier.to_string(),
            exterior_culling: Some("[]".to_string()),
            ..Default::default()
        };
        tables.properties.insert(record.id, record.clone());
        debug!(table = PROPERTY_TABLE, id = record.id, "insert");

        Ok(record)
    }

    async fn update_property(&self, id: PropertyId, update: PropertyUpdate) -> Result<PropertyRecord, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .properties
            .get_mut(&id)
            .ok_or(DatabaseError::NotFound { table: PROPERTY_TABLE, id })?;

        update.apply(record);
        Ok(record.clone())
    }

    async fn delete_property(&self, id: PropertyId) -> Result<PropertyRecord, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if tables.apartments.values().any(|a| a.property_id == id) {
            return Err(DatabaseError::ForeignKey(format!(
                "{} {} is referenced by {}",
                PROPERTY_TABLE, id, APARTMENT_TABLE
            )));
        }

        tables
            .properties
            .remove(&id)
            .ok_or(DatabaseError::NotFound { table: PROPERTY_TABLE, id })
    }

    async fn create_apartment(&self, apartment: NewApartment) -> Result<ApartmentRecord, DatabaseError> {
        let mut tables = self.tables.lock().await;

        if !tables.properties.contains_key(&apartment.property_id) {
            return Err(DatabaseError::ForeignKey(format!(
                "{} {} does not exist",
                PROPERTY_TABLE, apartment.property_id
            )));
        }

        tables.next_apartment_id += 1;
        let record = ApartmentRecord {
            id: tables.next_apartment_id,
            property_id: apartment.property_id,
            identifier: apartment.identifier,
            label: apartment.label,
            ..Default::default()
        };
        tables.apartments.insert(record.id, record.clone());
        debug!(table = APARTMENT_TABLE, id = record.id, "insert");

        Ok(record)
    }

    async fn update_apartment(&self, id: ApartmentId, update: ApartmentUpdate) -> Result<ApartmentRecord, DatabaseError> {
        let mut tables = self.tables.lock().await;
        let record = tables
            .apartments
            .get_mut(&id)
            .ok_or(DatabaseError::NotFound { table: APARTMENT_TABLE, id })?;

        update.apply(record);
        Ok(record.clone())
    }

    async fn delete_apartment(&self, id: ApartmentId) -> Result<ApartmentRecord, DatabaseError> {
        self.tables
            .lock()
            .await
            .apartments
            .remove(&id)
            .ok_or(DatabaseError::NotFound { table: APARTMENT_TABLE, id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_auto_increment() {
        let db = MemoryHousingDatabase::new();
        let a = db.create_property("a").await.unwrap();
        let b = db.create_property("b").await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
        assert_eq!(a.exterior_culling.as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_seeded_ids_continue() {
        let db = MemoryHousingDatabase::with_rows(
            vec![PropertyRecord { id: 10, identifier: "x".to_string(), ..Default::default() }],
            vec![],
        );
        assert_eq!(db.create_property("y").await.unwrap().id, 11);
    }

    #[tokio::test]
    async fn test_foreign_key() {
        let db = MemoryHousingDatabase::new();
        let orphan = NewApartment { property_id: 99, identifier: "a".to_string(), label: "A".to_string() };
        assert!(matches!(db.create_apartment(orphan).await, Err(DatabaseError::ForeignKey(_))));

        let property = db.create_property("p").await.unwrap();
        let apartment = NewApartment { property_id: property.id, identifier: "a".to_string(), label: "A".to_string() };
        let apartment = db.create_apartment(apartment).await.unwrap();

        assert!(matches!(db.delete_property(property.id).await, Err(DatabaseError::ForeignKey(_))));
        db.delete_apartment(apartment.id).await.unwrap();
        db.delete_property(property.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_update_returns_committed_row() {
        let db = MemoryHousingDatabase::new();
        let property = db.create_property("p").await.unwrap();
        let apartment = db
            .create_apartment(NewApartment { property_id: property.id, identifier: "a".to_string(), label: "A".to_string() })
            .await
            .unwrap();

        let updated = db
            .update_apartment(apartment.id, ApartmentUpdate::Owner(Some("CIT1".to_string())))
            .await
            .unwrap();
        assert_eq!(updated.owner.as_deref(), Some("CIT1"));
        assert_eq!(db.count_apartments_for_citizen("CIT1").await.unwrap(), 1);
        assert_eq!(db.count_apartments_for_citizen("CIT2").await.unwrap(), 0);

        assert_eq!(
            db.update_apartment(404, ApartmentUpdate::Tier(1)).await,
            Err(DatabaseError::NotFound { table: APARTMENT_TABLE, id: 404 })
        );
    }
}
