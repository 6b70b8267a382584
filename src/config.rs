//! Configuration
//!
//! Tunables for the vehicle provider and the housing repository. Defaults
//! match live server behaviour; every value can be overridden from the
//! environment.

use std::str::FromStr;
use std::time::Duration;

/// Vehicle lock/trunk provider configuration.
#[derive(Debug, Clone)]
pub struct LockConfig {
    /// Above this speed (km/h) the lock cannot be toggled.
    pub max_lock_speed_kmh: f32,
    /// Search radius (m) for the vehicle whose trunk is opened.
    pub trunk_search_distance: f32,
    /// Added to the model's length and width to form the trunk zone.
    pub trunk_zone_margin: f32,
    /// Height of the trunk zone above the vehicle's lowest point.
    pub trunk_zone_height: f32,
    /// The first seat candidate must be within this distance (m).
    pub seat_radius: f32,
    /// Poll period while waiting on an entry task.
    pub enter_poll_interval: Duration,
    /// Entry tasks still running after this are cancelled.
    pub enter_timeout: Duration,
    /// Exit control must still be held after this delay to leave.
    pub leave_confirm_delay: Duration,
    /// Lights stay on this long when the lock state changes.
    pub light_on_delay: Duration,
    /// Lights stay off this long before returning to default.
    pub light_off_delay: Duration,
    /// Per-frame tick period.
    pub frame_interval: Duration,
    /// Trunk watchdog period.
    pub watchdog_interval: Duration,
}

impl Default for LockConfig {
    fn default() -> Self {
        Self {
            max_lock_speed_kmh: 75.0,
            trunk_search_distance: 15.0,
            trunk_zone_margin: 3.0,
            trunk_zone_height: 6.0,
            seat_radius: 2.0,
            enter_poll_interval: Duration::from_millis(200),
            enter_timeout: Duration::from_secs(10),
            leave_confirm_delay: Duration::from_millis(150),
            light_on_delay: Duration::from_millis(250),
            light_off_delay: Duration::from_millis(200),
            frame_interval: Duration::from_millis(16),
            watchdog_interval: Duration::from_secs(1),
        }
    }
}

impl LockConfig {
    /// Create config from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_lock_speed_kmh: env_or("SOZ_LOCK_MAX_SPEED_KMH", defaults.max_lock_speed_kmh),
            trunk_search_distance: env_or("SOZ_TRUNK_SEARCH_DISTANCE", defaults.trunk_search_distance),
            trunk_zone_margin: env_or("SOZ_TRUNK_ZONE_MARGIN", defaults.trunk_zone_margin),
            trunk_zone_height: env_or("SOZ_TRUNK_ZONE_HEIGHT", defaults.trunk_zone_height),
            seat_radius: env_or("SOZ_SEAT_RADIUS", defaults.seat_radius),
            enter_poll_interval: env_ms_or("SOZ_ENTER_POLL_MS", defaults.enter_poll_interval),
            enter_timeout: env_ms_or("SOZ_ENTER_TIMEOUT_MS", defaults.enter_timeout),
            leave_confirm_delay: env_ms_or("SOZ_LEAVE_CONFIRM_MS", defaults.leave_confirm_delay),
            light_on_delay: defaults.light_on_delay,
            light_off_delay: defaults.light_off_delay,
            frame_interval: env_ms_or("SOZ_FRAME_INTERVAL_MS", defaults.frame_interval),
            watchdog_interval: env_ms_or("SOZ_WATCHDOG_INTERVAL_MS", defaults.watchdog_interval),
        }
    }

    /// Maximum lock speed in meters per second.
    pub fn max_lock_speed_ms(&self) -> f32 {
        self.max_lock_speed_kmh / 3.6
    }
}

/// Housing repository configuration.
#[derive(Debug, Clone)]
pub struct HousingConfig {
    /// Load both tables at startup instead of on first access.
    pub preload: bool,
}

impl Default for HousingConfig {
    fn default() -> Self {
        Self { preload: true }
    }
}

impl HousingConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            preload: std::env::var("SOZ_HOUSING_PRELOAD")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(Self::default().preload),
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_ms_or(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
