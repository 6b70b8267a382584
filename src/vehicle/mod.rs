//! Vehicle Lock Gating
//!
//! Client-side provider deciding who may lock, unlock, enter and search a
//! vehicle. Engine access and server state are injected capabilities; the
//! `headless` module implements them in memory.

pub mod types;
pub mod engine;
pub mod services;
pub mod trunk;
pub mod seat;
pub mod lockpick;
pub mod lock;
pub mod headless;

// Re-export commonly used types
pub use types::{EntityId, NetworkId, VehicleClass, VehicleLockStatus, VehicleSeat, VehicleVolatileState};
pub use engine::VehicleEngineAdapter;
pub use services::{
    AnimationService, Notifier, NotificationKind, PlayerData, PlayerMetadata, PlayerService,
    SoundService, StateStoreError, VehicleService, VehicleStateStore,
};
pub use trunk::TrunkOpened;
pub use lock::{ClientServices, DenyReason, LockOutcome, ProviderError, TrunkOutcome, VehicleLockProvider};
