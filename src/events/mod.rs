use bevy::prelude::*;
use chrono::NaiveDateTime;
use std::collections::HashMap;

use crate::utils::moon::MoonPhase;

/// Event emitted when the world clock snaps to real time at activation,
/// carrying the moon sample for the snap instant.
#[derive(Event, Debug, Clone)]
pub struct MoonPhaseChangedEvent {
    /// The instant the sample was computed for.
    pub timestamp: NaiveDateTime,
    /// Closest continuous phase.
    pub phase: MoonPhase,
    /// Illuminated fraction of the disc, 0.0-1.0.
    pub illumination: f32,
    /// The discrete phase code the simulation renders.
    pub game_phase: u8,
}

/// Throttled weather snapshot pushed to observers (client-facing trackers).
#[derive(Event, Debug, Clone)]
pub struct WeatherBroadcastEvent {
    /// Sampled weather variant per environment index.
    pub environment_weather: HashMap<usize, u16>,
    /// Forced variant in effect, 0 if none. When nonzero it overrides the
    /// per-environment values.
    pub forced_weather_index: u16,
}
