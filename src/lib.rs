//! # SoZ Gameplay
//!
//! Vehicle lock gating for the local player and the housing repository of
//! the SoZ roleplay server.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        SOZ GAMEPLAY                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Engine-agnostic primitives                │
//! │  ├── vector.rs   - World-space vectors                       │
//! │  ├── zone.rs     - Rotated box zones, legacy zone JSON       │
//! │  └── hash.rs     - Model-name hashing                        │
//! │                                                              │
//! │  vehicle/        - Client-side lock and trunk provider       │
//! │  ├── engine.rs   - Engine native capability                  │
//! │  ├── services.rs - Player, feedback and state capabilities   │
//! │  ├── trunk.rs    - Trunk zone and session                    │
//! │  ├── seat.rs     - Seat selection for entry                  │
//! │  ├── lockpick.rs - Police alerts on theft attempts           │
//! │  ├── lock.rs     - The provider and its background tasks     │
//! │  └── headless.rs - In-memory engine and services             │
//! │                                                              │
//! │  housing/        - Server-side housing persistence           │
//! │  ├── model.rs    - Properties and apartments                 │
//! │  ├── record.rs   - Table rows and column updates             │
//! │  ├── database.rs - Table access, in-memory backend           │
//! │  ├── garage.rs   - Property garage registry                  │
//! │  └── repository.rs - Write-through cache                     │
//! │                                                              │
//! │  network/        - Bus events                                │
//! │  ├── protocol.rs - Event vocabulary                          │
//! │  └── bus.rs      - Outbound event bus                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every engine, UI and database touchpoint is a trait injected as
//! `Arc<dyn _>`, so both halves run headless under tokio.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod config;
pub mod network;
pub mod vehicle;
pub mod housing;

// Re-export commonly used types
pub use config::{HousingConfig, LockConfig};
pub use crate::core::{BoxZone, Vector3, Vector4};
pub use housing::{HousingError, HousingRepository};
pub use vehicle::{ClientServices, LockOutcome, TrunkOutcome, VehicleLockProvider};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
