use bevy::prelude::*;

/// Optional-content capabilities, resolved once when the world is built.
///
/// Threading the flag through a resource keeps the moon phase mapping pure:
/// nothing re-queries a global content registry per call.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct ContentCapabilities {
    /// True when the extended moon-phase content is present, giving the
    /// waning phases their own codes instead of reusing the waxing ones.
    pub extended_moon_phases: bool,
}
