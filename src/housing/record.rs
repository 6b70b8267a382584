//! Table Rows
//!
//! Rows of `housing_property` and `housing_apartment` as the database hands
//! them back. Zones, culling lists and coordinates are JSON text columns.

use serde::{Serialize, Deserialize};

use crate::core::vector::Vector4;
use crate::core::zone::BoxZone;
use crate::housing::model::{
    Apartment, ApartmentId, ApartmentZoneKind, Property, PropertyId, PropertyZoneKind,
};

/// Property table name.
pub const PROPERTY_TABLE: &str = "housing_property";
/// Apartment table name.
pub const APARTMENT_TABLE: &str = "housing_apartment";

// =============================================================================
// PROPERTY
// =============================================================================

/// `housing_property` row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyRecord {
    /// Primary key
    pub id: PropertyId,
    /// Unique name
    pub identifier: String,
    /// Legacy zone JSON
    pub entry_zone: Option<String>,
    /// Legacy zone JSON
    pub garage_zone: Option<String>,
    /// JSON array of object hashes
    pub exterior_culling: Option<String>,
}

impl PropertyRecord {
    /// Decode into a [`Property`] without apartments.
    pub fn to_property(&self) -> Result<Property, serde_json::Error> {
        let exterior_culling = match self.exterior_culling.as_deref() {
            Some(raw) => serde_json::from_str::<Option<Vec<i32>>>(raw)?.unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(Property {
            id: self.id,
            identifier: self.identifier.clone(),
            entry_zone: BoxZone::from_legacy_json(self.entry_zone.as_deref())?,
            garage_zone: BoxZone::from_legacy_json(self.garage_zone.as_deref())?,
            exterior_culling,
            apartments: Vec::new(),
        })
    }
}

/// Single-column property writes.
#[derive(Clone, Debug, PartialEq)]
pub enum PropertyUpdate {
    /// Replace the culling list (JSON array).
    ExteriorCulling(String),
    /// Replace a zone (legacy zone JSON).
    Zone(PropertyZoneKind, Option<String>),
}

impl PropertyUpdate {
    /// Apply to a row.
    pub fn apply(self, record: &mut PropertyRecord) {
        match self {
            PropertyUpdate::ExteriorCulling(json) => record.exterior_culling = Some(json),
            PropertyUpdate::Zone(PropertyZoneKind::Entry, json) => record.entry_zone = json,
            PropertyUpdate::Zone(PropertyZoneKind::Garage, json) => record.garage_zone = json,
        }
    }
}

// =============================================================================
// APARTMENT
// =============================================================================

/// `housing_apartment` row.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ApartmentRecord {
    /// Primary key
    pub id: ApartmentId,
    /// Foreign key to `housing_property.id`
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
    /// `{x, y, z, w}` JSON
    pub inside_coord: Option<String>,
    /// Legacy zone JSON
    pub exit_zone: Option<String>,
    /// Legacy zone JSON
    pub fridge_zone: Option<String>,
    /// Legacy zone JSON
    pub stash_zone: Option<String>,
    /// Legacy zone JSON
    pub closet_zone: Option<String>,
    /// Legacy zone JSON
    pub money_zone: Option<String>,
    /// Upgrade tier
    pub tier: i32,
    /// 0 or 1
    pub has_parking_place: i32,
    /// Senate party id, possibly empty
    pub senate_party_id: Option<String>,
}

impl ApartmentRecord {
    /// Decode into an [`Apartment`].
    pub fn to_apartment(&self) -> Result<Apartment, serde_json::Error> {
        let position = match self.inside_coord.as_deref() {
            Some(raw) => serde_json::from_str::<Option<Vector4>>(raw)?,
            None => None,
        };

        Ok(Apartment {
            id: self.id,
            property_id: self.property_id,
            identifier: self.identifier.clone(),
            label: self.label.clone(),
            price: self.price,
            owner: self.owner.clone(),
            roommate: self.roommate.clone(),
            position,
            exit_zone: BoxZone::from_legacy_json(self.exit_zone.as_deref())?,
            fridge_zone: BoxZone::from_legacy_json(self.fridge_zone.as_deref())?,
            stash_zone: BoxZone::from_legacy_json(self.stash_zone.as_deref())?,
            closet_zone: BoxZone::from_legacy_json(self.closet_zone.as_deref())?,
            money_zone: BoxZone::from_legacy_json(self.money_zone.as_deref())?,
            tier: self.tier,
            has_parking_place: self.has_parking_place == 1,
            senate_party_id: self.senate_party_id.clone().filter(|id| !id.is_empty()),
        })
    }
}

/// Columns set when creating an apartment.
#[derive(Clone, Debug, PartialEq)]
pub struct NewApartment {
    /// Parent property
    pub property_id: PropertyId,
    /// Unique name
    pub identifier: String,
    /// Display name
    pub label: String,
}

/// Apartment writes, one statement each.
#[derive(Clone, Debug, PartialEq)]
pub enum ApartmentUpdate {
    /// Reset owner, roommate, tier and parking.
    Clear,
    /// Set the owner.
    Owner(Option<String>),
    /// Set the roommate.
    Roommate(Option<String>),
    /// Set the price.
    Price(i32),
    /// Set the tier.
    Tier(i32),
    /// Set the parking flag.
    HasParkingPlace(bool),
    /// Set the label.
    Label(String),
    /// Set the identifier.
    Identifier(String),
    /// Set a zone column (`inside_coord` takes coordinate JSON).
    Zone(ApartmentZoneKind, Option<String>),
    /// Set the senate party.
    SenateParty(Option<String>),
}

impl ApartmentUpdate {
    /// Apply to a row.
    pub fn apply(self, record: &mut ApartmentRecord) {
        match self {
            ApartmentUpdate::Clear => {
                record.owner = None;
                record.roommate = None;
                record.tier = 0;
                record.has_parking_place = 0;
            }
            ApartmentUpdate::Owner(owner) => record.owner = owner,
            ApartmentUpdate::Roommate(roommate) => record.roommate = roommate,
            ApartmentUpdate::Price(price) => record.price = Some(price),
            ApartmentUpdate::Tier(tier) => record.tier = tier,
            ApartmentUpdate::HasParkingPlace(value) => record.has_parking_place = i32::from(value),
            ApartmentUpdate::Label(label) => record.label = label,
            ApartmentUpdate::Identifier(identifier) => record.identifier = identifier,
            ApartmentUpdate::Zone(kind, json) => {
                let column = match kind {
                    ApartmentZoneKind::Inside => &mut record.inside_coord,
                    ApartmentZoneKind::Exit => &mut record.exit_zone,
                    ApartmentZoneKind::Fridge => &mut record.fridge_zone,
                    ApartmentZoneKind::Stash => &mut record.stash_zone,
                    ApartmentZoneKind::Closet => &mut record.closet_zone,
                    ApartmentZoneKind::Money => &mut record.money_zone,
                };
                *column = json;
            }
            ApartmentUpdate::SenateParty(party) => record.senate_party_id = party,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::vector::Vector3;

    #[test]
    fn test_property_decode() {
        let record = PropertyRecord {
            id: 4,
            identifier: "alta_street".to_string(),
            entry_zone: Some(r#"{"x":1.0,"y":2.0,"z":3.0,"sx":4.0,"sy":6.0,"heading":90.0,"minZ":2.0,"maxZ":5.0}"#.to_string()),
            garage_zone: None,
            exterior_culling: Some("[12, -7]".to_string()),
        };

        let property = record.to_property().unwrap();

        let entry = property.entry_zone.unwrap();
        assert_eq!(entry.center, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(entry.width, 4.0);
        assert_eq!(entry.length, 6.0);
        assert_eq!(property.garage_zone, None);
        assert_eq!(property.exterior_culling, vec![12, -7]);
        assert!(property.apartments.is_empty());
    }

    #[test]
    fn test_null_json_columns() {
        let record = PropertyRecord {
            exterior_culling: Some("null".to_string()),
            entry_zone: Some("null".to_string()),
            ..Default::default()
        };

        let property = record.to_property().unwrap();
        assert!(property.exterior_culling.is_empty());
        assert_eq!(property.entry_zone, None);
    }

    #[test]
    fn test_apartment_decode() {
        let record = ApartmentRecord {
            id: 9,
            property_id: 4,
            identifier: "alta_1".to_string(),
            label: "Alta 1".to_string(),
            inside_coord: Some(r#"{"x":1.0,"y":2.0,"z":3.0,"w":180.0}"#.to_string()),
            has_parking_place: 1,
            senate_party_id: Some(String::new()),
            ..Default::default()
        };

        let apartment = record.to_apartment().unwrap();

        assert_eq!(apartment.position, Some(Vector4::new(1.0, 2.0, 3.0, 180.0)));
        assert!(apartment.has_parking_place);
        assert_eq!(apartment.senate_party_id, None);
        assert_eq!(apartment.exit_zone, None);
    }

    #[test]
    fn test_bad_zone_json() {
        let record = ApartmentRecord { stash_zone: Some("{oops".to_string()), ..Default::default() };
        assert!(record.to_apartment().is_err());
    }

    #[test]
    fn test_clear_update() {
        let mut record = ApartmentRecord {
            owner: Some("A".to_string()),
            roommate: Some("B".to_string()),
            tier: 3,
            has_parking_place: 1,
            price: Some(500),
            ..Default::default()
        };

        ApartmentUpdate::Clear.apply(&mut record);

        assert_eq!(record.owner, None);
        assert_eq!(record.roommate, None);
        assert_eq!(record.tier, 0);
        assert_eq!(record.has_parking_place, 0);
        // Untouched columns keep their value.
        assert_eq!(record.price, Some(500));
    }

    #[test]
    fn test_zone_update_targets_column() {
        let mut record = ApartmentRecord::default();
        ApartmentUpdate::Zone(ApartmentZoneKind::Fridge, Some("{}".to_string())).apply(&mut record);
        assert_eq!(record.fridge_zone.as_deref(), Some("{}"));
        assert_eq!(record.stash_zone, None);
    }
}
