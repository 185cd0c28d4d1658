use bevy::prelude::*;
use chrono::{Local, NaiveDateTime, Utc};
use chrono_tz::Tz;

use crate::resources::SyncConfig;

/// Resource resolving "now" in the world's configured timezone.
///
/// The zone is resolved from config once at plugin build and cached here;
/// `now()` is called every tick by the convergence system and must stay
/// cheap, so the name string is never re-parsed on the call path.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct RealTimeSource {
    /// Cached resolved zone. `None` means the host's local zone.
    zone: Option<Tz>,
}

impl RealTimeSource {
    /// Resolves the zone from config. An unrecognized name falls back to the
    /// local zone — the configuration validator has already warned about it,
    /// and a running world must not abort over a bad setting.
    pub fn from_config(config: &SyncConfig) -> Self {
        let zone = config.timezone().and_then(|name| name.parse::<Tz>().ok());
        Self { zone }
    }

    /// Builds a source pinned to a specific zone.
    pub fn with_zone(zone: Tz) -> Self {
        Self { zone: Some(zone) }
    }

    /// The resolved zone, if one is configured.
    pub fn zone(&self) -> Option<Tz> {
        self.zone
    }

    /// Current wall-clock date-time in the configured zone.
    pub fn now(&self) -> NaiveDateTime {
        match self.zone {
            Some(tz) => Utc::now().with_timezone(&tz).naive_local(),
            None => Local::now().naive_local(),
        }
    }
}
