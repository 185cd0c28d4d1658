//! Reactive guard that neutralizes the host's sleep fast-forward.
//!
//! The native rest mechanic advances simulated time by a large step when a
//! sleep cycle completes, which would fight the real-time convergence and
//! desynchronize the clock. Rather than disabling the mechanic, the guard
//! reverts its effect: any transition away from fully-awake is immediately
//! overwritten with a fresh awake component.

use bevy::prelude::*;

use crate::components::Somnolence;

/// Observer fired on every `Somnolence` insertion.
///
/// Observers run after the inserting system's own transition handling, so
/// the guard always sees the final state of the write, not an intermediate
/// one. The corrective insert goes through `Commands` and lands at the next
/// flush on the world's own schedule — it is never applied inline in the
/// triggering write. Re-inserting the default value fires this observer
/// again with a fully-awake state, which no-ops, so the chain terminates.
pub fn sleep_guard(
    trigger: Trigger<OnInsert, Somnolence>,
    somnolence: Query<&Somnolence>,
    mut commands: Commands,
) {
    let entity = trigger.entity();
    let Ok(current) = somnolence.get(entity) else {
        return;
    };
    if !current.is_fully_awake() {
        debug!("Reverting sleep transition on {:?}", entity);
        commands.entity(entity).insert(Somnolence::default());
    }
}
