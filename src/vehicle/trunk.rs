//! Trunk Sessions
//!
//! A trunk session is a snapshot of the vehicle's collision bounds taken when
//! the trunk is opened. The player must stay inside a box built from those
//! bounds, expanded by a margin, for the session to survive.

use crate::core::vector::Vector3;
use crate::core::zone::BoxZone;
use crate::vehicle::engine::VehicleEngineAdapter;
use crate::vehicle::types::{EntityId, NetworkId};

/// Open trunk session.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrunkOpened {
    /// Local vehicle handle
    pub vehicle: EntityId,
    /// Vehicle network id
    pub network_id: NetworkId,
    /// Model bounds minimum (relative to the vehicle origin)
    pub min: Vector3,
    /// Model bounds maximum (relative to the vehicle origin)
    pub max: Vector3,
}

impl TrunkOpened {
    /// Snapshot the bounds of a vehicle.
    pub fn capture(engine: &dyn VehicleEngineAdapter, vehicle: EntityId, network_id: NetworkId) -> Self {
        let (min, max) = engine.model_dimensions(engine.entity_model(vehicle));
        Self { vehicle, network_id, min, max }
    }

    /// Zone around the vehicle placed at `position` with `heading`.
    ///
    /// The footprint is centered on the bounds' midpoint; the vertical band
    /// starts at the vehicle's lowest point and rises `height` meters.
    pub fn zone(&self, position: Vector3, heading: f32, margin: f32, height: f32) -> BoxZone {
        let mid = self.min.midpoint(self.max);
        let center = Vector3::new(
            position.x + mid.x,
            position.y + mid.y,
            position.z + self.min.z,
        );

        BoxZone::new(
            center,
            self.max.y - self.min.y + margin,
            self.max.x - self.min.x + margin,
        )
        .with_heading(heading)
        .with_z_band(center.z, center.z + height)
    }

    /// Whether `point` is inside the trunk zone of the vehicle's current pose.
    pub fn contains(&self, engine: &dyn VehicleEngineAdapter, point: Vector3, margin: f32, height: f32) -> bool {
        let zone = self.zone(
            engine.entity_coords(self.vehicle),
            engine.entity_heading(self.vehicle),
            margin,
            height,
        );
        zone.is_point_inside(point)
    }
}
