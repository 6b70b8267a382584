//! Box Zones
//!
//! Heading-rotated boxes used for proximity and containment checks, plus the
//! legacy JSON layout zones are stored in.

use serde::{Serialize, Deserialize};

use super::vector::Vector3;

/// A heading-rotated box with an optional vertical band.
///
/// `width` is the extent along the local X axis and `length` along the local
/// Y axis, both centered on `center`. Missing `min_z`/`max_z` are unbounded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxZone {
    /// Center of the box footprint
    pub center: Vector3,
    /// Extent along local Y
    pub length: f32,
    /// Extent along local X
    pub width: f32,
    /// Rotation around Z in degrees
    pub heading: f32,
    /// Lower vertical bound
    pub min_z: Option<f32>,
    /// Upper vertical bound
    pub max_z: Option<f32>,
}

impl BoxZone {
    /// Create an unrotated zone with no vertical band.
    pub fn new(center: Vector3, length: f32, width: f32) -> Self {
        Self {
            center,
            length,
            width,
            heading: 0.0,
            min_z: None,
            max_z: None,
        }
    }

    /// Set the heading (degrees).
    pub fn with_heading(mut self, heading: f32) -> Self {
        self.heading = heading;
        self
    }

    /// Set the vertical band.
    pub fn with_z_band(mut self, min_z: f32, max_z: f32) -> Self {
        self.min_z = Some(min_z);
        self.max_z = Some(max_z);
        self
    }

    /// Check whether a world-space point lies inside the zone (edges included).
    pub fn is_point_inside(&self, point: Vector3) -> bool {
        if let Some(min_z) = self.min_z {
            if point.z < min_z {
                return false;
            }
        }
        if let Some(max_z) = self.max_z {
            if point.z > max_z {
                return false;
            }
        }

        let (local_x, local_y) = self.to_local(point);
        local_x.abs() <= self.width / 2.0 && local_y.abs() <= self.length / 2.0
    }

    /// Offset of `point` from the center, expressed in the zone's local frame.
    fn to_local(&self, point: Vector3) -> (f32, f32) {
        let dx = point.x - self.center.x;
        let dy = point.y - self.center.y;
        let (sin, cos) = (-self.heading).to_radians().sin_cos();
        (dx * cos - dy * sin, dx * sin + dy * cos)
    }

    /// Parse a zone from a nullable legacy JSON column.
    pub fn from_legacy_json(raw: Option<&str>) -> Result<Option<Self>, serde_json::Error> {
        let Some(raw) = raw else {
            return Ok(None);
        };
        let data: Option<LegacyZoneData> = serde_json::from_str(raw)?;
        Ok(data.map(Self::from))
    }

    /// Encode as legacy JSON.
    pub fn to_legacy_json(&self) -> String {
        // Plain floats and options cannot fail to serialize.
        serde_json::to_string(&LegacyZoneData::from(*self)).unwrap_or_default()
    }
}

/// Zone layout as persisted in JSON columns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LegacyZoneData {
    /// Center X
    pub x: f32,
    /// Center Y
    pub y: f32,
    /// Center Z
    pub z: f32,
    /// Width (local X extent)
    pub sx: f32,
    /// Length (local Y extent)
    pub sy: f32,
    /// Heading in degrees
    #[serde(default)]
    pub heading: f32,
    /// Lower vertical bound
    #[serde(rename = "minZ", default, skip_serializing_if = "Option::is_none")]
    pub min_z: Option<f32>,
    /// Upper vertical bound
    #[serde(rename = "maxZ", default, skip_serializing_if = "Option::is_none")]
    pub max_z: Option<f32>,
}

impl From<LegacyZoneData> for BoxZone {
    fn from(data: LegacyZoneData) -> Self {
        Self {
            center: Vector3::new(data.x, data.y, data.z),
            length: data.sy,
            width: data.sx,
            heading: data.heading,
            min_z: data.min_z,
            max_z: data.max_z,
        }
    }
}

impl From<BoxZone> for LegacyZoneData {
    fn from(zone: BoxZone) -> Self {
        Self {
            x: zone.center.x,
            y: zone.center.y,
            z: zone.center.z,
            sx: zone.width,
            sy: zone.length,
            heading: zone.heading,
            min_z: zone.min_z,
            max_z: zone.max_z,
        }
    }
}
