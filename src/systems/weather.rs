//! Hourly weighted weather sampling with forced overrides and a throttled
//! observer push.

use bevy::prelude::*;
use rand::Rng;
use std::collections::HashMap;

use crate::error::{SyncError, SyncResult};
use crate::events::WeatherBroadcastEvent;
use crate::resources::{ForecastCatalog, SyncConfig, WeatherState, WorldClock, PUSH_INTERVAL_SECS};

/// System that keeps per-environment weather aligned with the simulated hour.
///
/// Runs on FixedUpdate after the clock convergence system, so the hour key
/// reflects the converged clock for this tick. Worlds without a weather data
/// source skip the whole system.
///
/// Per tick:
/// 1. A pending forced change (consumed exactly once) resamples immediately,
///    bypassing the hourly cache, restarts the push window, and notifies
///    observers at once.
/// 2. Otherwise, with no override in force, the hour is compare-and-swapped
///    against the last sampled hour; the winning transition redraws every
///    environment's weather from its forecast table.
/// 3. The push countdown runs independently of the resample cadence: on
///    expiry it resets to the full window and broadcasts the snapshot.
pub fn weather_sampler_system(
    time: Res<Time<Fixed>>,
    config: Res<SyncConfig>,
    catalog: Res<ForecastCatalog>,
    clock: Res<WorldClock>,
    mut weather: ResMut<WeatherState>,
    mut broadcasts: EventWriter<WeatherBroadcastEvent>,
) {
    if !config.weather_enabled() {
        return;
    }
    let dt = time.delta_secs();
    let hour = clock.current_hour();

    if weather.consume_forced_change() {
        weather.push_delay = PUSH_INTERVAL_SECS;
        match sample_all(&catalog, hour, &weather.environment_weather, &mut rand::thread_rng()) {
            Ok(sampled) => {
                weather.environment_weather = sampled;
                weather.last_sampled_hour = hour as i32;
            }
            Err(e) => error!("Forced weather resample failed: {}", e),
        }
        push_snapshot(&weather, &mut broadcasts);
        return;
    }

    if weather.forced_weather_index == 0 {
        let previous_hour = weather.last_sampled_hour;
        if weather.compare_and_swap_hour(hour as i32) {
            match sample_all(&catalog, hour, &weather.environment_weather, &mut rand::thread_rng())
            {
                Ok(sampled) => weather.environment_weather = sampled,
                Err(e) => {
                    // Previous snapshot stays; rolling the hour back means
                    // the next tick retries instead of waiting an hour.
                    error!("Weather resample for hour {} failed: {}", hour, e);
                    weather.last_sampled_hour = previous_hour;
                }
            }
        }
    }

    weather.push_delay -= dt;
    if weather.push_delay <= 0.0 {
        weather.push_delay = PUSH_INTERVAL_SECS;
        push_snapshot(&weather, &mut broadcasts);
    }
}

/// Logs the forecast catalogue at world activation: the environments the
/// sampler will iterate and the weather variants their tables reference.
pub fn log_catalog_system(config: Res<SyncConfig>, catalog: Res<ForecastCatalog>) {
    if !config.weather_enabled() {
        return;
    }
    let mut environments = String::from("Known environments:\n");
    for (index, name) in catalog.environments() {
        environments.push_str(&format!("- [{}] {}\n", index, name));
    }
    info!("{}", environments);

    let mut variants = String::from("Known weather variants:\n");
    for (index, name) in catalog.weather_variants().iter().enumerate() {
        variants.push_str(&format!("- [{}] {}\n", index, name));
    }
    info!("{}", variants);
}

/// Draws one weather variant per environment into a fresh map.
///
/// Fails without touching any state when an environment has no forecast
/// table, so the caller commits the whole snapshot or none of it. An hour
/// with nothing to draw (no entries, zero total weight) carries the prior
/// value forward instead of failing.
fn sample_all<R: Rng + ?Sized>(
    catalog: &ForecastCatalog,
    hour: u32,
    previous: &HashMap<usize, u16>,
    rng: &mut R,
) -> SyncResult<HashMap<usize, u16>> {
    let mut sampled = HashMap::with_capacity(catalog.environment_count());
    for (index, name) in catalog.environments() {
        let forecast = catalog
            .forecast(name)
            .ok_or_else(|| SyncError::UnknownEnvironment(name.to_string()))?;
        match forecast.for_hour(hour).and_then(|table| table.sample(rng)) {
            Some(weather_index) => {
                sampled.insert(index, weather_index);
            }
            None => {
                debug!("Environment '{}' has no forecast weight for hour {}", name, hour);
                if let Some(&prior) = previous.get(&index) {
                    sampled.insert(index, prior);
                }
            }
        }
    }
    Ok(sampled)
}

fn push_snapshot(weather: &WeatherState, broadcasts: &mut EventWriter<WeatherBroadcastEvent>) {
    broadcasts.send(WeatherBroadcastEvent {
        environment_weather: weather.environment_weather.clone(),
        forced_weather_index: weather.forced_weather_index,
    });
}
