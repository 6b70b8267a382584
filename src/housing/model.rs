//! Housing Model
//!
//! Properties and their apartments as served to gameplay code.

use serde::{Serialize, Deserialize};

use crate::core::vector::Vector4;
use crate::core::zone::BoxZone;

/// Property id (`housing_property.id`).
pub type PropertyId = i32;

/// Apartment id (`housing_apartment.id`).
pub type ApartmentId = i32;

/// A building or plot holding one or more apartments.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    /// Row id
    pub id: PropertyId,
    /// Unique name
    pub identifier: String,
    /// Door zone outside
    pub entry_zone: Option<BoxZone>,
    /// Garage zone outside
    pub garage_zone: Option<BoxZone>,
    /// Exterior map objects hidden while inside
    pub exterior_culling: Vec<i32>,
    /// Apartments of this property
    pub apartments: Vec<Apartment>,
}

impl Property {
    /// Apartment by id.
    pub fn apartment(&self, id: ApartmentId) -> Option<&Apartment> {
        self.apartments.iter().find(|a| a.id == id)
    }
}

/// One rentable unit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Apartment {
    /// Row id
    pub id: ApartmentId,
    /// Parent property
    pub property_id: PropertyId,
    /// Unique name
    pub identifier: String,
    /// Display name
    pub label: String,
    /// Sale price
    pub price: Option<i32>,
    /// Owner citizen id
    pub owner: Option<String>,
    /// Roommate citizen id
    pub roommate: Option<String>,
    /// Spawn point inside, heading in `w`
    pub position: Option<Vector4>,
    /// Exit door zone
    pub exit_zone: Option<BoxZone>,
    /// Fridge zone
    pub fridge_zone: Option<BoxZone>,
    /// Stash zone
    pub stash_zone: Option<BoxZone>,
    /// Wardrobe zone
    pub closet_zone: Option<BoxZone>,
    /// Money safe zone
    pub money_zone: Option<BoxZone>,
    /// Upgrade tier
    pub tier: i32,
    /// Comes with a parking place
    pub has_parking_place: bool,
    /// Senate party headquartered here
    pub senate_party_id: Option<String>,
}

/// Editable apartment zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApartmentZoneKind {
    /// Interior spawn point (stored as a position, not a zone).
    Inside,
    /// Exit door
    Exit,
    /// Fridge
    Fridge,
    /// Stash
    Stash,
    /// Wardrobe
    Closet,
    /// Money safe
    Money,
}

impl ApartmentZoneKind {
    /// Column holding this zone.
    pub fn column(self) -> &'static str {
        match self {
            ApartmentZoneKind::Inside => "inside_coord",
            ApartmentZoneKind::Exit => "exit_zone",
            ApartmentZoneKind::Fridge => "fridge_zone",
            ApartmentZoneKind::Stash => "stash_zone",
            ApartmentZoneKind::Closet => "closet_zone",
            ApartmentZoneKind::Money => "money_zone",
        }
    }
}

/// Editable property zones.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyZoneKind {
    /// Front door
    Entry,
    /// Garage
    Garage,
}

impl PropertyZoneKind {
    /// Column holding this zone.
    pub fn column(self) -> &'static str {
        match self {
            PropertyZoneKind::Entry => "entry_zone",
            PropertyZoneKind::Garage => "garage_zone",
        }
    }
}
