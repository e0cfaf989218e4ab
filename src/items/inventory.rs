use rand::Rng;

use crate::core::constants::{
    FREE_CRATE_DELAY_STEP, FREE_CRATE_QUEUE_CAP, GOLDEN_TOUCH_BONUS_PER_TIER,
};
use crate::core::game_state::{GameState, NotificationKind};
use crate::items::catalog;
use crate::items::types::{ActiveBoost, BoostKind, PotionEffect};
use crate::loot::open::claim_free_crates;
use crate::rebirth::UpgradeId;

/// Wild Magic Potion side effect: every shop or crate interaction
/// nudges the coin balance by a random amount, possibly negative.
pub fn apply_wild_magic(state: &mut GameState, rng: &mut impl Rng) {
    let (min, max) = match state.active_boost(BoostKind::WildMagic) {
        Some(boost) => match boost.effect {
            PotionEffect::WildMagic { min, max, .. } => (min, max),
            _ => return,
        },
        None => return,
    };
    let change = rng.gen_range(min..=max);
    state.coins += change;
    if change > 0 {
        state.stats.lifetime_coins += change;
        state.notify(
            format!("Wild magic grants you {change} coins!"),
            NotificationKind::Success,
        );
    } else if change < 0 {
        state.notify(
            format!("Wild magic costs you {} coins!", -change),
            NotificationKind::Error,
        );
    }
}

/// Sell price multiplier from Golden Touch and Merchant's Elixir.
pub fn sell_multiplier(state: &GameState) -> f64 {
    1.0 + state.upgrade_tier(UpgradeId::GoldenTouch) as f64 * GOLDEN_TOUCH_BONUS_PER_TIER
        + state.merchant_wisdom().1
}

pub fn sell_item(state: &mut GameState, name: &str, count: u32, rng: &mut impl Rng) -> bool {
    if state.item_count(name) < count {
        return false;
    }
    apply_wild_magic(state, rng);

    let unit = (catalog::item_sell_value(name) as f64 * sell_multiplier(state)).ceil() as i64;
    let gain = unit * count as i64;
    state.coins += gain;
    state.stats.lifetime_coins += gain;
    *state.inventory.entry(name.to_string()).or_insert(0) -= count;

    if state.item_count(name) == 0 {
        if state.equipped_weapon.as_deref() == Some(name) {
            equip_weapon(state, None);
        }
        if state.equipped_armor.as_deref() == Some(name) {
            equip_armor(state, None);
        }
    }
    true
}

pub fn sell_potion(state: &mut GameState, name: &str, count: u32, rng: &mut impl Rng) -> bool {
    if state.potion_count(name) < count {
        return false;
    }
    apply_wild_magic(state, rng);

    let unit = (catalog::potion_sell_value(name) as f64 * sell_multiplier(state)).ceil() as i64;
    let gain = unit * count as i64;
    state.coins += gain;
    state.stats.lifetime_coins += gain;
    *state.potions.entry(name.to_string()).or_insert(0) -= count;
    true
}

/// Liquidate the entire inventory, potions included, unequipping
/// anything sold out from under the player.
pub fn sell_all(state: &mut GameState, rng: &mut impl Rng) {
    let multiplier = sell_multiplier(state);
    let mut total = 0i64;
    let mut sold = 0u64;

    let item_names: Vec<String> = state.inventory.keys().cloned().collect();
    for name in item_names {
        let count = state.item_count(&name);
        if count == 0 {
            continue;
        }
        let unit = (catalog::item_sell_value(&name) as f64 * multiplier).ceil() as i64;
        total += unit * count as i64;
        sold += count as u64;
        state.inventory.insert(name.clone(), 0);
        if state.equipped_weapon.as_deref() == Some(name.as_str()) {
            equip_weapon(state, None);
        }
        if state.equipped_armor.as_deref() == Some(name.as_str()) {
            equip_armor(state, None);
        }
    }

    let potion_names: Vec<String> = state.potions.keys().cloned().collect();
    for name in potion_names {
        let count = state.potion_count(&name);
        if count == 0 {
            continue;
        }
        let unit = (catalog::potion_sell_value(&name) as f64 * multiplier).ceil() as i64;
        total += unit * count as i64;
        sold += count as u64;
        state.potions.insert(name, 0);
    }

    if sold == 0 {
        state.notify("You have nothing to sell.", NotificationKind::Error);
        return;
    }
    apply_wild_magic(state, rng);
    state.coins += total;
    state.stats.lifetime_coins += total;
    state.notify(
        format!("Sold all {sold} items for {total} coins!"),
        NotificationKind::Success,
    );
}

pub fn equip_weapon(state: &mut GameState, name: Option<&str>) {
    if let Some(name) = name {
        if state.item_count(name) == 0 {
            state.notify("You don't own this weapon.", NotificationKind::Error);
            return;
        }
        state.equipped_weapon = Some(name.to_string());
        state.notify(format!("Equipped {name}."), NotificationKind::Success);
    } else {
        state.equipped_weapon = None;
        state.notify("Weapon unequipped.", NotificationKind::Success);
    }
}

pub fn equip_armor(state: &mut GameState, name: Option<&str>) {
    if let Some(name) = name {
        if state.item_count(name) == 0 {
            state.notify("You don't own this armor.", NotificationKind::Error);
            return;
        }
        state.equipped_armor = Some(name.to_string());
        state.notify(format!("Equipped {name}."), NotificationKind::Success);
    } else {
        state.equipped_armor = None;
        state.notify("Armor unequipped.", NotificationKind::Success);
    }
}

/// Drink a potion from the stash. Brawl-only potions are refused here,
/// as are boosts already at their stack or duration cap; refused
/// potions are not consumed.
pub fn use_potion(state: &mut GameState, name: &str, rng: &mut impl Rng) -> bool {
    if state.potion_count(name) == 0 {
        return false;
    }
    let def = match catalog::potion_def(name) {
        Some(def) => def,
        None => return false,
    };
    if def.effect.is_brawl_only() {
        state.notify(
            "This potion can only be used in a brawl.",
            NotificationKind::Error,
        );
        return false;
    }

    if let Some(kind) = def.effect.boost_kind() {
        return use_timed_potion(state, name, kind, def.effect);
    }

    match def.effect {
        PotionEffect::TimeSkip { minutes } => {
            *state.potions.entry(name.to_string()).or_insert(0) -= 1;
            time_skip(state, minutes, rng);
            true
        }
        PotionEffect::InstantCrates { crate_type, amount } => {
            *state.potions.entry(name.to_string()).or_insert(0) -= 1;
            for _ in 0..amount {
                state.free_crates_to_claim.push(crate_type);
                if state.free_crates_to_claim.len() > FREE_CRATE_QUEUE_CAP {
                    state.free_crates_to_claim.remove(0);
                }
            }
            state.notify(
                format!("You attract {amount} {}s!", crate_type.display_name()),
                NotificationKind::Success,
            );
            true
        }
        _ => false,
    }
}

fn use_timed_potion(
    state: &mut GameState,
    name: &str,
    kind: BoostKind,
    effect: PotionEffect,
) -> bool {
    let duration = effect.duration().unwrap_or(0);

    if kind == BoostKind::LuckBoost {
        if let Some(existing) = state.active_boosts.get(&BoostKind::LuckBoost) {
            if existing.stacks >= existing.effect.max_stacks() {
                state.notify(
                    format!("No effect: {} is already at maximum stacks!", existing.potion),
                    NotificationKind::Error,
                );
                return false;
            }
        }
        *state.potions.entry(name.to_string()).or_insert(0) -= 1;

        match state.active_boosts.get_mut(&BoostKind::LuckBoost) {
            Some(existing) => {
                existing.stacks += 1;
                let old_value = match existing.effect {
                    PotionEffect::LuckBoost { value, .. } => value,
                    _ => 0.0,
                };
                let new_value = match effect {
                    PotionEffect::LuckBoost { value, .. } => value,
                    _ => 0.0,
                };
                // A stronger luck potion upgrades the whole stack.
                if new_value > old_value {
                    existing.effect = effect;
                    existing.potion = name.to_string();
                }
                existing.time_left = duration;
                let total = state.luck_value();
                state.notify(
                    format!("{name} increased Luck to +{total}%!"),
                    NotificationKind::Success,
                );
            }
            None => {
                state.active_boosts.insert(
                    BoostKind::LuckBoost,
                    ActiveBoost {
                        potion: name.to_string(),
                        effect,
                        time_left: duration,
                        stacks: 1,
                    },
                );
                state.notify(
                    format!("Used {name}! Effect will last for {} minutes.", duration / 60),
                    NotificationKind::Success,
                );
            }
        }
        return true;
    }

    // Other timed boosts do not stack; another dose tops the timer up
    // to a single full duration, never past it.
    if let Some(existing) = state.active_boosts.get(&kind) {
        if duration > 0 && existing.time_left >= duration {
            state.notify(
                format!(
                    "No effect: {} is already at maximum duration!",
                    existing.potion
                ),
                NotificationKind::Error,
            );
            return false;
        }
    }
    *state.potions.entry(name.to_string()).or_insert(0) -= 1;

    match state.active_boosts.get_mut(&kind) {
        Some(existing) => {
            existing.time_left = (existing.time_left + duration).min(duration);
            existing.effect = effect;
            existing.potion = name.to_string();
            state.notify(format!("{name} extended the effect!"), NotificationKind::Success);
        }
        None => {
            state.active_boosts.insert(
                kind,
                ActiveBoost {
                    potion: name.to_string(),
                    effect,
                    time_left: duration,
                    stacks: 1,
                },
            );
            state.notify(
                format!(
                    "Used {name}! The effect will last for {} minutes.",
                    duration / 60
                ),
                NotificationKind::Success,
            );
        }
    }
    true
}

/// Flask of Time: fast-forward the idle systems as if the time had
/// actually passed. Simulates the free-crate spawn cycle tick for
/// tick, burns down boost timers, and shaves brawl cooldowns.
fn time_skip(state: &mut GameState, minutes: u32, rng: &mut impl Rng) {
    let seconds = minutes as u64 * 60;

    for deadline in state.brawl_cooldowns.values_mut() {
        *deadline -= seconds as i64 * 1000;
    }

    let mut timer = state.free_crate_timer;
    let mut delay = state.next_crate_delay;
    let mut remaining = seconds as f64;
    let mut crates_gained = 0u32;
    while remaining > 0.0 {
        if remaining >= timer {
            remaining -= timer;
            crates_gained += 1;
            delay += FREE_CRATE_DELAY_STEP;
            timer = delay;
        } else {
            timer -= remaining;
            remaining = 0.0;
        }
    }
    for _ in 0..crates_gained {
        let chosen = crate::loot::open::roll_free_crate(rng);
        state.free_crates_to_claim.push(chosen);
        if state.free_crates_to_claim.len() > FREE_CRATE_QUEUE_CAP {
            state.free_crates_to_claim.remove(0);
        }
    }
    state.free_crate_timer = timer;
    state.next_crate_delay = delay;

    let mut expired = 0u32;
    state.active_boosts.retain(|_, boost| {
        if boost.time_left as u64 <= seconds {
            expired += 1;
            false
        } else {
            boost.time_left -= seconds as u32;
            true
        }
    });

    if state.auto_claim_active() && !state.free_crates_to_claim.is_empty() {
        claim_free_crates(state, rng);
    }

    let mut message =
        format!("Warped time by {minutes} minutes! Gained {crates_gained} free crates.");
    if expired > 0 {
        message.push_str(&format!(" {expired} potion effects expired."));
    } else if !state.active_boosts.is_empty() {
        message.push_str(" Potion timers reduced.");
    }
    message.push_str(" Brawl cooldowns reduced.");
    state.notify(message, NotificationKind::Success);
}
