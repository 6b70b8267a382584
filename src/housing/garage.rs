//! Property Garages
//!
//! A property with both an entry and a garage zone gets a private garage.
//! The registry is told whenever either zone changes.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::info;

use crate::core::zone::BoxZone;

/// Garage attached to a property.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PropertyGarage {
    /// Where vehicles are parked and taken out
    pub garage_zone: BoxZone,
    /// Property door, used to access the garage on foot
    pub entry_zone: BoxZone,
}

/// Registry of property garages.
#[async_trait]
pub trait GarageRegistry: Send + Sync {
    /// Create or replace the garage of a property.
    async fn update_add_garage(&self, identifier: &str, garage_zone: BoxZone, entry_zone: BoxZone);
}

/// In-memory garage registry keyed by property identifier.
#[derive(Debug, Default)]
pub struct GarageZones {
    garages: RwLock<BTreeMap<String, PropertyGarage>>,
}

impl GarageZones {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Garage of a property.
    pub async fn get(&self, identifier: &str) -> Option<PropertyGarage> {
        self.garages.read().await.get(identifier).copied()
    }

    /// Number of registered garages.
    pub async fn len(&self) -> usize {
        self.garages.read().await.len()
    }

    /// Whether no garage is registered.
    pub async fn is_empty(&self) -> bool {
        self.garages.read().await.is_empty()
    }
}

#[async_trait]
impl GarageRegistry for GarageZones {
    async fn update_add_garage(&self, identifier: &str, garage_zone: BoxZone, entry_zone: BoxZone) {
        let previous = self
            .garages
            .write()
            .await
            .insert(identifier.to_string(), PropertyGarage { garage_zone, entry_zone });

        info!(identifier, replaced = previous.is_some(), "Property garage registered");
    }
}
