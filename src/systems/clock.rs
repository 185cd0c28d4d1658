//! Clock convergence: activation snap, per-tick convergence, and the
//! shutdown write-back.

use bevy::prelude::*;

use crate::events::MoonPhaseChangedEvent;
use crate::resources::{
    ContentCapabilities, ConvergenceStrategy, RealTimeSource, SyncConfig, WorldClock,
};
use crate::utils::moon;

/// Snaps the world clock to real time at world activation.
///
/// A freshly loaded world must not open showing yesterday's moment, so the
/// snap is immediate with no smoothing. The moon sample for the snap instant
/// goes out as an event for downstream observers; event delivery is deferred
/// to the next read, keeping the emission off the activation path itself.
pub fn clock_activate_system(
    source: Res<RealTimeSource>,
    capabilities: Res<ContentCapabilities>,
    mut clock: ResMut<WorldClock>,
    mut events: EventWriter<MoonPhaseChangedEvent>,
) {
    let now = source.now();
    clock.snap_to(now);
    let sample = moon::compute_sample(now, capabilities.extended_moon_phases);
    info!(
        "World clock activated at {} (moon: {:?}, game phase {})",
        clock.formatted_time(),
        sample.phase,
        sample.game_phase
    );
    events.send(MoonPhaseChangedEvent {
        timestamp: now,
        phase: sample.phase,
        illumination: sample.illumination,
        game_phase: sample.game_phase,
    });
}

/// System that converges the simulated clock toward the real-time target.
///
/// Runs on FixedUpdate, after Bevy's own time advance for the tick. The
/// strategy comes from configuration: `Direct` sets the clock outright,
/// `Smoothed` takes one exponential step with the tick's elapsed fraction,
/// absorbing host pauses and system clock jumps over several ticks.
pub fn clock_convergence_system(
    time: Res<Time<Fixed>>,
    config: Res<SyncConfig>,
    source: Res<RealTimeSource>,
    mut clock: ResMut<WorldClock>,
) {
    let target = source.now();
    match config.convergence {
        ConvergenceStrategy::Direct => clock.snap_to(target),
        ConvergenceStrategy::Smoothed => clock.converge_toward(target, time.delta_secs()),
    }
}

/// Writes the current real time back into the persisted config at world
/// deactivation, so a cold-started host resumes consistent.
pub fn clock_deactivate_system(source: Res<RealTimeSource>, mut config: ResMut<SyncConfig>) {
    config.game_time = Some(source.now());
    match config.save_to_file() {
        Ok(()) => info!("Persisted game time at deactivation"),
        Err(e) => error!("Failed to persist game time: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_app(config: SyncConfig) -> App {
        let mut app = App::new();
        app.add_plugins(bevy::time::TimePlugin);
        app.insert_resource(config);
        app.insert_resource(RealTimeSource::with_zone(chrono_tz::UTC));
        app.insert_resource(ContentCapabilities::default());
        app.init_resource::<WorldClock>();
        app.add_event::<MoonPhaseChangedEvent>();
        app.add_systems(FixedUpdate, clock_convergence_system);
        app
    }

    fn run_fixed(app: &mut App, dt: f32) {
        // Huge timestep keeps the app's own fixed-loop driver from firing;
        // the schedule below runs exactly once with the delta we set.
        let mut fixed_time = Time::<Fixed>::from_seconds(10_000.0);
        fixed_time.advance_by(Duration::from_secs_f32(dt));
        app.insert_resource(fixed_time);
        app.update();
        app.world_mut().run_schedule(FixedUpdate);
    }

    #[test]
    fn test_direct_strategy_matches_target_after_one_tick() {
        let mut app = test_app(SyncConfig::default());
        run_fixed(&mut app, 0.05);
        let clock = *app.world().resource::<WorldClock>();
        let now = app.world().resource::<RealTimeSource>().now();
        let drift = (now.and_utc().timestamp_millis() - clock.millis()).abs();
        assert!(drift < 1_000, "Direct set drifted {}ms from now", drift);
    }

    #[test]
    fn test_smoothed_strategy_closes_half_the_gap() {
        let mut config = SyncConfig::default();
        config.convergence = ConvergenceStrategy::Smoothed;
        let mut app = test_app(config);

        let start = app.world().resource::<RealTimeSource>().now();
        let start_millis = start.and_utc().timestamp_millis();
        run_fixed(&mut app, 0.5);

        let clock = app.world().resource::<WorldClock>();
        // The clock began at the epoch, so one dt=0.5 step lands halfway to
        // now. Wall-clock motion during the test stays well under a second.
        let expected = start_millis / 2;
        let drift = (clock.millis() - expected).abs();
        assert!(drift < 1_000, "Smoothed step off by {}ms", drift);
    }

    #[test]
    fn test_smoothed_strategy_clamps_large_dt() {
        let mut config = SyncConfig::default();
        config.convergence = ConvergenceStrategy::Smoothed;
        let mut app = test_app(config);

        run_fixed(&mut app, 3.0);

        let clock = app.world().resource::<WorldClock>();
        let now = app.world().resource::<RealTimeSource>().now();
        let drift = (now.and_utc().timestamp_millis() - clock.millis()).abs();
        // dt clamps to 1.0, which is an exact snap.
        assert!(drift < 1_000, "Clamped snap drifted {}ms", drift);
    }

    #[test]
    fn test_activation_snaps_and_emits_moon_event() {
        let mut app = test_app(SyncConfig::default());
        app.add_systems(Startup, clock_activate_system);
        app.update();

        let clock = *app.world().resource::<WorldClock>();
        assert!(clock.millis() > 0, "Activation must snap off the epoch");

        let events = app.world().resource::<Events<MoonPhaseChangedEvent>>();
        let mut cursor = events.get_cursor();
        let emitted: Vec<_> = cursor.read(events).collect();
        assert_eq!(emitted.len(), 1, "Exactly one moon event at activation");
        let event = &emitted[0];
        assert!(event.game_phase <= 4, "Base phase codes are 0..=4");
        assert!((0.0..=1.0).contains(&event.illumination));
        assert_eq!(
            event.game_phase,
            moon::game_moon_phase(event.phase, false)
        );
    }

    #[test]
    fn test_deactivation_writes_game_time() {
        let mut app = App::new();
        app.insert_resource(SyncConfig::default());
        app.insert_resource(RealTimeSource::with_zone(chrono_tz::UTC));
        app.add_systems(Update, clock_deactivate_system);
        app.update();

        let config = app.world().resource::<SyncConfig>();
        assert!(config.game_time.is_some(), "Deactivation must record game time");
    }
}
