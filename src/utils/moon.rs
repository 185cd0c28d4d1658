//! Moon phase astronomy and the discrete game-phase mapping.
//!
//! The continuous phase comes from mean synodic-month arithmetic against a
//! reference new moon (2000-01-06 18:14 UTC). Mean-phase error is on the
//! order of hours, while the game-facing output is quantized to eight named
//! phases each ~3.7 days wide, so the approximation never shows in-game.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Mean length of the synodic month in days.
pub const SYNODIC_MONTH_DAYS: f64 = 29.530_588_853;

/// Reference new moon: 2000-01-06 18:14 UTC, as epoch milliseconds.
const REFERENCE_NEW_MOON_MILLIS: i64 = 947_182_440_000;

const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// The eight named phases of the lunar cycle, in waxing order from new.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoonPhase {
    New,
    WaxingCrescent,
    FirstQuarter,
    WaxingGibbous,
    Full,
    WaningGibbous,
    LastQuarter,
    WaningCrescent,
}

impl MoonPhase {
    /// All phases in cycle order; index `round(fraction * 8) % 8`.
    pub fn all() -> &'static [MoonPhase] {
        &[
            MoonPhase::New,
            MoonPhase::WaxingCrescent,
            MoonPhase::FirstQuarter,
            MoonPhase::WaxingGibbous,
            MoonPhase::Full,
            MoonPhase::WaningGibbous,
            MoonPhase::LastQuarter,
            MoonPhase::WaningCrescent,
        ]
    }
}

/// A moon reading derived from a single timestamp.
///
/// Never stored — recomputed on demand from the instant of interest.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoonSample {
    /// Closest named phase.
    pub phase: MoonPhase,
    /// Illuminated fraction of the disc, 0.0 (new) to 1.0 (full).
    pub illumination: f32,
    /// The small integer code the simulation uses in place of the
    /// continuous phase.
    pub game_phase: u8,
}

/// Fraction of the lunar cycle elapsed since the last new moon, in `[0, 1)`.
pub fn phase_fraction(time: NaiveDateTime) -> f64 {
    let millis = time.and_utc().timestamp_millis() - REFERENCE_NEW_MOON_MILLIS;
    let cycles = millis as f64 / MILLIS_PER_DAY / SYNODIC_MONTH_DAYS;
    cycles.rem_euclid(1.0)
}

/// Illuminated fraction of the lunar disc at the given time.
pub fn illumination_fraction(time: NaiveDateTime) -> f64 {
    let fraction = phase_fraction(time);
    (1.0 - (std::f64::consts::TAU * fraction).cos()) / 2.0
}

/// The named phase closest to the given time.
pub fn closest_phase(time: NaiveDateTime) -> MoonPhase {
    let fraction = phase_fraction(time);
    let index = ((fraction * 8.0).round() as usize) % 8;
    MoonPhase::all()[index]
}

/// Maps a named phase onto the simulation's phase code.
///
/// Without the extended phase set the waning phases share codes with their
/// waxing counterparts — the base simulation only distinguishes five moon
/// states. With it, the waning phases get codes of their own.
pub fn game_moon_phase(phase: MoonPhase, extended: bool) -> u8 {
    match phase {
        MoonPhase::Full => 0,
        MoonPhase::WaxingGibbous => 1,
        MoonPhase::FirstQuarter => 2,
        MoonPhase::WaxingCrescent => 3,
        MoonPhase::New => 4,
        MoonPhase::WaningGibbous => {
            if extended {
                5
            } else {
                1
            }
        }
        MoonPhase::LastQuarter => {
            if extended {
                6
            } else {
                2
            }
        }
        MoonPhase::WaningCrescent => {
            if extended {
                7
            } else {
                3
            }
        }
    }
}

/// Computes the full moon sample for a timestamp.
pub fn compute_sample(time: NaiveDateTime, extended: bool) -> MoonSample {
    let phase = closest_phase(time);
    MoonSample {
        phase,
        illumination: illumination_fraction(time) as f32,
        game_phase: game_moon_phase(phase, extended),
    }
}
