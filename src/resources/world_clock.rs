use bevy::prelude::*;
use chrono::{NaiveDateTime, Timelike};

/// Resource tracking the world's simulated time.
///
/// The stored value is the configured zone's wall-clock date-time with the
/// offset stripped. Mutated exclusively by the clock convergence systems:
/// - hard snap at world activation
/// - per-tick convergence toward the real-time target
///
/// Monotonically non-decreasing except at the activation snap.
///
/// Used by:
/// - Weather sampling (hour-of-day keys the forecast tables)
/// - Moon phase events (timestamp of the activation sample)
#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct WorldClock {
    /// The current simulated date-time.
    pub simulated_time: NaiveDateTime,
}

impl Default for WorldClock {
    fn default() -> Self {
        Self {
            simulated_time: chrono::DateTime::UNIX_EPOCH.naive_utc(),
        }
    }
}

impl WorldClock {
    /// Hour of the simulated day (0-23). Keys the hourly weather resample.
    pub fn current_hour(&self) -> u32 {
        self.simulated_time.hour()
    }

    /// Simulated time as epoch milliseconds.
    pub fn millis(&self) -> i64 {
        self.simulated_time.and_utc().timestamp_millis()
    }

    /// Sets the clock to the target with no smoothing.
    pub fn snap_to(&mut self, target: NaiveDateTime) {
        self.simulated_time = target;
    }

    /// Moves the clock toward the target by the elapsed-tick fraction `dt`.
    pub fn converge_toward(&mut self, target: NaiveDateTime, dt: f32) {
        let millis = converge_millis(self.millis(), target.and_utc().timestamp_millis(), dt);
        if let Some(converged) = chrono::DateTime::from_timestamp_millis(millis) {
            self.simulated_time = converged.naive_utc();
        }
    }

    /// Returns a formatted string for diagnostics and HUD display.
    pub fn formatted_time(&self) -> String {
        self.simulated_time.format("%Y-%m-%d %H:%M:%S").to_string()
    }
}

/// One exponential convergence step in epoch-millisecond space.
///
/// `dt` is clamped to `[0, 1]`: 0 is a no-op, 1 snaps exactly to the target,
/// anything between moves proportionally closer. The clamp prevents both
/// overshoot past the target and reversal of the clock.
pub fn converge_millis(current: i64, target: i64, dt: f32) -> i64 {
    let dt = f64::from(dt).clamp(0.0, 1.0);
    current + ((target - current) as f64 * dt) as i64
}
