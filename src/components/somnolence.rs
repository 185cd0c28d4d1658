use bevy::prelude::*;

/// Rest state of an entity, written by the host's sleep mechanic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SleepState {
    /// Not engaged with the rest mechanic at all.
    #[default]
    FullyAwake,
    /// In bed, waiting for the slumber threshold.
    Drowsy,
    /// Sleep cycle running; completion fast-forwards the simulated clock.
    Asleep,
    /// Transitioning back out of a completed cycle.
    Waking,
}

/// Sleep component watched by the sleep guard.
///
/// State transitions are written by re-inserting the component, which is
/// what fires the guard's observer. The guard only ever asks one question:
/// is the entity fully awake.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Somnolence {
    /// Current rest state.
    pub state: SleepState,
}

impl Somnolence {
    /// Builds a component already in the given state.
    pub fn in_state(state: SleepState) -> Self {
        Self { state }
    }

    pub fn is_fully_awake(&self) -> bool {
        self.state == SleepState::FullyAwake
    }
}
