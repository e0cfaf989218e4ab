//! The once-per-second heartbeat: boost timers, the free-crate drip,
//! and auto-claiming.

use rand::Rng;

use crate::core::game_state::{GameState, NotificationKind};
use crate::loot::open::{claim_free_crates, tick_free_crate_timer};

/// Advance the game by one second of wall time.
pub fn tick(state: &mut GameState, rng: &mut impl Rng) {
    state.play_time_seconds += 1;

    tick_boost_timers(state);
    tick_free_crate_timer(state, rng);

    if state.auto_claim_active() && !state.free_crates_to_claim.is_empty() {
        claim_free_crates(state, rng);
    }
}

fn tick_boost_timers(state: &mut GameState) {
    let mut expired = Vec::new();
    for (kind, boost) in state.active_boosts.iter_mut() {
        if boost.time_left > 0 {
            boost.time_left -= 1;
            if boost.time_left == 0 {
                expired.push((*kind, boost.potion.clone()));
            }
        }
    }
    for (kind, name) in expired {
        state.active_boosts.remove(&kind);
        state.notify(
            format!("Your {name} potion wore off."),
            NotificationKind::Info,
        );
    }
}
