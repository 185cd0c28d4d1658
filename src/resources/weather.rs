//! Weather sampling state and the static forecast catalogue.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::SyncResult;

/// Seconds of simulated time between observer pushes.
///
/// Weather recomputes hourly; observers are told at most once per window.
/// The two cadences are independent so push fan-out stays bounded no matter
/// the tick rate.
pub const PUSH_INTERVAL_SECS: f32 = 1.0;

const HOURS_PER_DAY: usize = 24;

/// Per-world weather sampling state.
#[derive(Resource, Debug, Clone)]
pub struct WeatherState {
    /// Hour of day the last resample ran for. -1 = never sampled.
    pub last_sampled_hour: i32,
    /// Externally forced weather variant; 0 = none. Hourly sampling is
    /// suspended while a forced variant is in effect.
    pub forced_weather_index: u16,
    /// Edge trigger armed when the forced variant changes; consumed once.
    forced_change_pending: bool,
    /// Latest sampled weather variant per environment index.
    pub environment_weather: HashMap<usize, u16>,
    /// Countdown to the next observer push.
    pub push_delay: f32,
}

impl Default for WeatherState {
    fn default() -> Self {
        Self {
            last_sampled_hour: -1,
            forced_weather_index: 0,
            forced_change_pending: false,
            environment_weather: HashMap::new(),
            push_delay: PUSH_INTERVAL_SECS,
        }
    }
}

impl WeatherState {
    /// Forces a specific weather variant (0 clears the override), arming the
    /// one-shot change trigger either way.
    pub fn force_weather(&mut self, index: u16) {
        self.forced_weather_index = index;
        self.forced_change_pending = true;
    }

    /// Consumes the pending forced-change trigger. Returns true exactly once
    /// per `force_weather` call.
    pub fn consume_forced_change(&mut self) -> bool {
        std::mem::take(&mut self.forced_change_pending)
    }

    /// Records `hour` as sampled. Returns true only on the transition, so a
    /// single caller wins each hour boundary.
    pub fn compare_and_swap_hour(&mut self, hour: i32) -> bool {
        if self.last_sampled_hour == hour {
            return false;
        }
        self.last_sampled_hour = hour;
        true
    }
}

/// One weighted forecast option.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForecastEntry {
    /// Index into the catalogue's weather variant list.
    pub weather_index: u16,
    /// Relative weight. Non-positive weights are never drawn.
    pub weight: f32,
}

/// A weighted list of forecast options for a single hour.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeightedForecast {
    entries: Vec<ForecastEntry>,
}

impl WeightedForecast {
    pub fn new(entries: Vec<ForecastEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[ForecastEntry] {
        &self.entries
    }

    /// Draws one weather index by cumulative weight: a uniform value in
    /// `[0, total)` selects the first entry whose running total exceeds it.
    ///
    /// Returns `None` for an empty table or a non-positive total weight.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<u16> {
        let total: f32 = self.entries.iter().map(|e| e.weight.max(0.0)).sum();
        if total <= 0.0 {
            return None;
        }
        let draw = rng.gen_range(0.0..total);
        let mut cumulative = 0.0;
        for entry in &self.entries {
            cumulative += entry.weight.max(0.0);
            if draw < cumulative {
                return Some(entry.weather_index);
            }
        }
        // Float round-off can leave draw == cumulative at the end.
        self.entries.last().map(|e| e.weather_index)
    }
}

/// Per-environment forecast: one weighted table per hour of day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnvironmentForecast {
    hourly: Vec<WeightedForecast>,
}

impl EnvironmentForecast {
    /// Builds a forecast from hourly tables, padded/truncated to 24 entries.
    pub fn new(mut hourly: Vec<WeightedForecast>) -> Self {
        hourly.resize_with(HOURS_PER_DAY, WeightedForecast::default);
        Self { hourly }
    }

    /// The same table for every hour of the day.
    pub fn uniform(table: WeightedForecast) -> Self {
        Self {
            hourly: vec![table; HOURS_PER_DAY],
        }
    }

    /// The weighted table for the given hour, if one is authored.
    pub fn for_hour(&self, hour: u32) -> Option<&WeightedForecast> {
        if self.hourly.is_empty() {
            return None;
        }
        self.hourly.get(hour as usize % self.hourly.len())
    }
}

/// Read-only catalogue of environments and their authored forecasts.
///
/// Environments receive dense indices in registration order; those indices
/// key the sampled `environment_weather` map and the broadcast snapshots.
/// Deserializable so hosts can ship the catalogue as a JSON data file.
#[derive(Resource, Debug, Clone, Default, Serialize, Deserialize)]
pub struct ForecastCatalog {
    /// Weather variant names, indexable by `ForecastEntry::weather_index`.
    weather_variants: Vec<String>,
    /// Environment names in index order.
    environments: Vec<String>,
    /// Forecast tables keyed by environment name.
    forecasts: HashMap<String, EnvironmentForecast>,
}

impl ForecastCatalog {
    /// Registers a weather variant name, returning its index.
    pub fn register_weather(&mut self, name: impl Into<String>) -> u16 {
        self.weather_variants.push(name.into());
        (self.weather_variants.len() - 1) as u16
    }

    /// Registers an environment with its forecast, returning its index.
    pub fn register_environment(
        &mut self,
        name: impl Into<String>,
        forecast: EnvironmentForecast,
    ) -> usize {
        let name = name.into();
        self.forecasts.insert(name.clone(), forecast);
        self.environments.push(name);
        self.environments.len() - 1
    }

    /// Iterates environments as `(index, name)` pairs.
    pub fn environments(&self) -> impl Iterator<Item = (usize, &str)> {
        self.environments.iter().map(String::as_str).enumerate()
    }

    /// The forecast for an environment, if its table exists.
    pub fn forecast(&self, environment: &str) -> Option<&EnvironmentForecast> {
        self.forecasts.get(environment)
    }

    pub fn environment_count(&self) -> usize {
        self.environments.len()
    }

    /// Weather variant name for an index, for diagnostics.
    pub fn weather_name(&self, index: u16) -> Option<&str> {
        self.weather_variants.get(index as usize).map(String::as_str)
    }

    pub fn weather_variants(&self) -> &[String] {
        &self.weather_variants
    }

    /// Parses a catalogue from its JSON data-file form.
    pub fn from_json(json: &str) -> SyncResult<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
