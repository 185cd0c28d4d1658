//! Real-time environmental sync engine.
//!
//! Keeps a simulated world's clock, moon phase, and weather continuously
//! aligned with real-world wall-clock time: the clock converges toward the
//! configured zone's "now" every tick, weather is resampled hourly from
//! authored forecast tables, and the host's sleep fast-forward is neutralized
//! so it cannot fight the convergence.

pub mod components;
pub mod error;
pub mod events;
pub mod plugins;
pub mod resources;
pub mod systems;
pub mod utils;
