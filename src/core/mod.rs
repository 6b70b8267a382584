//! Core geometric primitives.
//!
//! Vectors, box zones and the engine's model-name hash. Everything here is
//! pure and engine-agnostic.

pub mod vector;
pub mod zone;
pub mod hash;

// Re-export core types
pub use vector::{Vector3, Vector4};
pub use zone::{BoxZone, LegacyZoneData};
pub use hash::{joaat, ModelHash};
