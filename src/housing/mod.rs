//! Housing
//!
//! Properties, apartments and the cached repository over their tables.

pub mod model;
pub mod record;
pub mod database;
pub mod garage;
pub mod repository;

// Re-export commonly used types
pub use model::{Apartment, ApartmentId, ApartmentZoneKind, Property, PropertyId, PropertyZoneKind};
pub use record::{ApartmentRecord, ApartmentUpdate, NewApartment, PropertyRecord, PropertyUpdate};
pub use database::{DatabaseError, HousingDatabase, MemoryHousingDatabase};
pub use garage::{GarageRegistry, GarageZones, PropertyGarage};
pub use repository::{HousingError, HousingRepository};
