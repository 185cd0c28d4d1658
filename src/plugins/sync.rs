use bevy::app::AppExit;
use bevy::prelude::*;

use crate::events::{MoonPhaseChangedEvent, WeatherBroadcastEvent};
use crate::resources::{
    ContentCapabilities, ForecastCatalog, RealTimeSource, SyncConfig, WeatherState, WorldClock,
};
use crate::systems::clock::{
    clock_activate_system, clock_convergence_system, clock_deactivate_system,
};
use crate::systems::sleep_guard::sleep_guard;
use crate::systems::weather::{log_catalog_system, weather_sampler_system};

/// Plugin that keeps the world's clock, moon phase, and weather aligned with
/// real-world time.
///
/// Insert `SyncConfig` and `ForecastCatalog` before adding the plugin to
/// supply them directly; otherwise the config loads from the platform data
/// directory and the catalogue starts empty (weather then has nothing to
/// sample). The extended moon-phase capability is resolved here, once, and
/// threaded through a resource.
pub struct RealTimeSyncPlugin {
    /// Whether the optional extended moon-phase content is present.
    pub extended_moon_phases: bool,
}

impl Default for RealTimeSyncPlugin {
    fn default() -> Self {
        Self {
            extended_moon_phases: false,
        }
    }
}

impl Plugin for RealTimeSyncPlugin {
    fn build(&self, app: &mut App) {
        if app.world().get_resource::<SyncConfig>().is_none() {
            app.insert_resource(SyncConfig::load_from_file());
        }
        let config = app.world().resource::<SyncConfig>();
        if let Err(e) = config.validate() {
            warn!("Sync config: {}", e);
        }
        let source = RealTimeSource::from_config(config);

        app.insert_resource(source)
            .insert_resource(ContentCapabilities {
                extended_moon_phases: self.extended_moon_phases,
            })
            .init_resource::<WorldClock>()
            .init_resource::<WeatherState>()
            .init_resource::<ForecastCatalog>()
            .add_event::<MoonPhaseChangedEvent>()
            .add_event::<WeatherBroadcastEvent>()
            .add_observer(sleep_guard)
            .add_systems(Startup, (clock_activate_system, log_catalog_system))
            // Bevy advances Time before FixedUpdate runs, and the sampler
            // keys on the converged clock, hence the explicit edge.
            .add_systems(
                FixedUpdate,
                (
                    clock_convergence_system,
                    weather_sampler_system.after(clock_convergence_system),
                ),
            )
            .add_systems(
                Last,
                clock_deactivate_system.run_if(on_event::<AppExit>),
            );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{SleepState, Somnolence};

    fn plugin_app() -> App {
        let mut app = App::new();
        app.add_plugins(bevy::time::TimePlugin);
        app.insert_resource(SyncConfig::default());
        app.add_plugins(RealTimeSyncPlugin::default());
        app
    }

    #[test]
    fn test_plugin_installs_resources_and_snaps_clock() {
        let mut app = plugin_app();
        app.update();

        assert!(app.world().contains_resource::<WorldClock>());
        assert!(app.world().contains_resource::<WeatherState>());
        assert!(app.world().contains_resource::<RealTimeSource>());
        assert!(
            app.world().resource::<WorldClock>().millis() > 0,
            "Startup must snap the clock to real time"
        );
    }

    #[test]
    fn test_plugin_respects_preinserted_config() {
        let mut app = App::new();
        app.add_plugins(bevy::time::TimePlugin);
        let mut config = SyncConfig::default();
        config.set_open_meteo_api_key(Some("host-key".to_string()));
        app.insert_resource(config);
        app.add_plugins(RealTimeSyncPlugin::default());

        assert!(app.world().resource::<SyncConfig>().weather_enabled());
    }

    #[test]
    fn test_plugin_capability_flag_threads_through() {
        let mut app = App::new();
        app.add_plugins(bevy::time::TimePlugin);
        app.insert_resource(SyncConfig::default());
        app.add_plugins(RealTimeSyncPlugin {
            extended_moon_phases: true,
        });

        assert!(
            app.world()
                .resource::<ContentCapabilities>()
                .extended_moon_phases
        );
    }

    #[test]
    fn test_plugin_guard_reverts_sleep() {
        let mut app = plugin_app();
        app.update();

        let entity = app
            .world_mut()
            .spawn(Somnolence::in_state(SleepState::Asleep))
            .id();
        app.update();

        assert!(
            app.world().get::<Somnolence>(entity).unwrap().is_fully_awake(),
            "Plugin-registered guard must revert sleep transitions"
        );
    }
}
