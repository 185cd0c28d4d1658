use std::time::Duration;

use bevy::app::ScheduleRunnerPlugin;
use bevy::log::LogPlugin;
use bevy::prelude::*;

use realtime_sync::events::{MoonPhaseChangedEvent, WeatherBroadcastEvent};
use realtime_sync::plugins::sync::RealTimeSyncPlugin;
use realtime_sync::resources::{
    ConvergenceStrategy, EnvironmentForecast, ForecastCatalog, ForecastEntry, SyncConfig,
    WeightedForecast, WorldClock,
};

/// Command-line arguments parsed at startup.
/// Used to exercise the sync engine without editing the config file.
#[derive(Debug, Default)]
struct CliArgs {
    /// Override the configured timezone for this run.
    /// Usage: `cargo run -- --timezone Europe/Berlin`
    timezone: Option<String>,
    /// Use the smoothed convergence strategy instead of direct set.
    smooth: bool,
    /// Pretend the extended moon-phase content is present.
    extended_moons: bool,
}

impl CliArgs {
    /// Parse command-line arguments.
    /// Supports:
    /// - `--timezone <zone>`: IANA zone id override
    /// - `--smooth`: smoothed clock convergence
    /// - `--extended-moons`: enable the extended moon-phase table
    fn parse() -> Self {
        let args: Vec<String> = std::env::args().collect();
        let mut cli = CliArgs::default();

        let mut i = 1; // Skip program name
        while i < args.len() {
            match args[i].as_str() {
                "--timezone" => {
                    if i + 1 < args.len() {
                        cli.timezone = Some(args[i + 1].clone());
                        i += 2;
                    } else {
                        eprintln!("CLI: --timezone requires a zone id argument");
                        i += 1;
                    }
                }
                "--smooth" => {
                    cli.smooth = true;
                    i += 1;
                }
                "--extended-moons" => {
                    cli.extended_moons = true;
                    i += 1;
                }
                arg => {
                    if arg.starts_with('-') {
                        eprintln!("CLI: Unknown argument '{}'", arg);
                    }
                    i += 1;
                }
            }
        }

        cli
    }
}

fn main() {
    let cli = CliArgs::parse();

    let mut config = SyncConfig::load_from_file();
    if let Some(zone) = cli.timezone {
        config.set_timezone(Some(zone));
    }
    if cli.smooth {
        config.convergence = ConvergenceStrategy::Smoothed;
    }
    if config.open_meteo_api_key().is_none() {
        // The demo world always samples weather.
        config.set_open_meteo_api_key(Some("demo".to_string()));
    }

    App::new()
        .add_plugins(
            MinimalPlugins
                .set(ScheduleRunnerPlugin::run_loop(Duration::from_secs_f64(1.0 / 20.0))),
        )
        .add_plugins(LogPlugin::default())
        .insert_resource(config)
        .insert_resource(demo_catalog())
        .add_plugins(RealTimeSyncPlugin {
            extended_moon_phases: cli.extended_moons,
        })
        .add_systems(
            Update,
            (report_clock_system, report_moon_system, report_weather_system),
        )
        .run();
}

/// A small authored catalogue so the demo has something to sample.
fn demo_catalog() -> ForecastCatalog {
    let mut catalog = ForecastCatalog::default();
    let clear = catalog.register_weather("Clear");
    let overcast = catalog.register_weather("Overcast");
    let rain = catalog.register_weather("Rain");
    let thunder = catalog.register_weather("Thunderstorm");
    let snow = catalog.register_weather("Snow");

    catalog.register_environment(
        "Plains",
        hourly_forecast(|hour| {
            let mut entries = vec![
                ForecastEntry { weather_index: clear, weight: 6.0 },
                ForecastEntry { weather_index: overcast, weight: 2.0 },
                ForecastEntry { weather_index: rain, weight: 1.0 },
            ];
            // Afternoon convection window.
            if (14..20).contains(&hour) {
                entries.push(ForecastEntry { weather_index: thunder, weight: 0.5 });
            }
            entries
        }),
    );
    catalog.register_environment(
        "Forest",
        hourly_forecast(|hour| {
            vec![
                ForecastEntry { weather_index: clear, weight: 4.0 },
                ForecastEntry { weather_index: overcast, weight: 3.0 },
                ForecastEntry {
                    weather_index: rain,
                    weight: if hour < 8 { 3.0 } else { 1.5 },
                },
            ]
        }),
    );
    catalog.register_environment(
        "Tundra",
        hourly_forecast(|_| {
            vec![
                ForecastEntry { weather_index: clear, weight: 3.0 },
                ForecastEntry { weather_index: overcast, weight: 2.0 },
                ForecastEntry { weather_index: snow, weight: 4.0 },
            ]
        }),
    );
    catalog
}

fn hourly_forecast(entries_for: impl Fn(u32) -> Vec<ForecastEntry>) -> EnvironmentForecast {
    EnvironmentForecast::new(
        (0..24)
            .map(|hour| WeightedForecast::new(entries_for(hour)))
            .collect(),
    )
}

/// Prints the simulated clock once per simulated hour.
fn report_clock_system(clock: Res<WorldClock>, mut last_hour: Local<Option<u32>>) {
    let hour = clock.current_hour();
    if *last_hour != Some(hour) {
        *last_hour = Some(hour);
        info!("Simulated time: {}", clock.formatted_time());
    }
}

fn report_moon_system(mut events: EventReader<MoonPhaseChangedEvent>) {
    for event in events.read() {
        info!(
            "Moon at {}: {:?}, {:.0}% illuminated, game phase {}",
            event.timestamp,
            event.phase,
            event.illumination * 100.0,
            event.game_phase
        );
    }
}

/// Logs weather broadcasts, but only when the snapshot actually changed.
fn report_weather_system(
    mut events: EventReader<WeatherBroadcastEvent>,
    catalog: Res<ForecastCatalog>,
    mut last: Local<Option<std::collections::HashMap<usize, u16>>>,
) {
    for event in events.read() {
        if last.as_ref() == Some(&event.environment_weather) {
            continue;
        }
        *last = Some(event.environment_weather.clone());

        let mut line = String::from("Weather update:");
        for (index, name) in catalog.environments() {
            if let Some(&weather) = event.environment_weather.get(&index) {
                line.push_str(&format!(
                    " {}={}",
                    name,
                    catalog.weather_name(weather).unwrap_or("?")
                ));
            }
        }
        if event.forced_weather_index != 0 {
            line.push_str(&format!(" (forced: {})", event.forced_weather_index));
        }
        info!("{}", line);
    }
}
