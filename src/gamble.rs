//! Coin-flip gambling over a staged selection of items, potions and
//! coins. Stakes leave the owning inventory the moment they are
//! selected; a flip either multiplies them back in or keeps them.

use rand::Rng;

use crate::core::constants::{
    ALL_IN_WIN_MULTIPLIER, COIN_FLIP_WIN_CHANCE, COIN_FLIP_WIN_MULTIPLIER,
    GAMBLE_INSURANCE_REFUND_FRACTION, WEIGHTED_COIN_WIN_CHANCE,
};
use crate::core::game_state::{GambleStake, GameState, NotificationKind, StakeKind};
use crate::items::inventory::apply_wild_magic;
use crate::rebirth::UpgradeId;

/// Move `amount` copies of a named item or potion into the stake.
pub fn stake(state: &mut GameState, name: &str, kind: StakeKind, amount: u32) {
    if amount == 0 {
        return;
    }
    let owned = match kind {
        StakeKind::Item => state.item_count(name),
        StakeKind::Potion => state.potion_count(name),
    };
    if owned < amount {
        state.notify("Not enough to gamble!", NotificationKind::Error);
        return;
    }
    let source = match kind {
        StakeKind::Item => &mut state.inventory,
        StakeKind::Potion => &mut state.potions,
    };
    if let Some(count) = source.get_mut(name) {
        *count -= amount;
    }

    match state
        .gamble
        .stakes
        .iter_mut()
        .find(|s| s.name == name && s.kind == kind)
    {
        Some(existing) => existing.amount += amount,
        None => state.gamble.stakes.push(GambleStake {
            name: name.to_string(),
            kind,
            amount,
        }),
    }
}

pub fn stake_coins(state: &mut GameState, amount: i64) {
    if amount <= 0 {
        state.notify("Invalid amount.", NotificationKind::Error);
        return;
    }
    if state.coins < amount {
        state.notify("Not enough coins!", NotificationKind::Error);
        return;
    }
    state.coins -= amount;
    state.gamble.coins += amount;
}

/// Return every staked item, potion and coin to where it came from.
pub fn restore_selection(state: &mut GameState) {
    let stakes = std::mem::take(&mut state.gamble.stakes);
    for s in stakes {
        let source = match s.kind {
            StakeKind::Item => &mut state.inventory,
            StakeKind::Potion => &mut state.potions,
        };
        *source.entry(s.name).or_insert(0) += s.amount;
    }
    state.coins += state.gamble.coins;
    state.gamble.coins = 0;
    state.gamble.all_in = false;
    state.notify("Restored selection to inventory.", NotificationKind::Success);
}

/// Shove the entire inventory, both potions and items, every coin, and
/// whatever is equipped onto the table. Triples on a win, gone on a
/// loss, and no potion or upgrade can soften it.
pub fn gamble_everything(state: &mut GameState) {
    let mut staged = 0u64;
    let names: Vec<(String, StakeKind, u32)> = state
        .inventory
        .iter()
        .filter(|(_, c)| **c > 0)
        .map(|(n, c)| (n.clone(), StakeKind::Item, *c))
        .chain(
            state
                .potions
                .iter()
                .filter(|(_, c)| **c > 0)
                .map(|(n, c)| (n.clone(), StakeKind::Potion, *c)),
        )
        .collect();
    for (name, kind, amount) in names {
        staged += amount as u64;
        stake(state, &name, kind, amount);
    }
    if state.equipped_weapon.take().is_some() {
        state.notify("Equipped weapon was added to the gamble.", NotificationKind::Success);
    }
    if state.equipped_armor.take().is_some() {
        state.notify("Equipped armor was added to the gamble.", NotificationKind::Success);
    }

    if staged == 0 && state.coins <= 0 {
        state.notify("Nothing to gamble!", NotificationKind::Error);
        return;
    }
    if state.coins > 0 {
        state.gamble.coins += state.coins;
        state.coins = 0;
    }
    state.gamble.all_in = true;
    state.notify("ALL IN! 3x items and coins on win!", NotificationKind::Success);
}

fn return_stakes_multiplied(state: &mut GameState, multiplier: f64) {
    let stakes = std::mem::take(&mut state.gamble.stakes);
    for s in &stakes {
        let returned = (s.amount as f64 * multiplier).floor() as u32;
        match s.kind {
            StakeKind::Item => state.add_item(&s.name, returned),
            StakeKind::Potion => state.add_potion(&s.name, returned),
        }
    }
    state.gamble.stakes = stakes;
}

fn settle_win(state: &mut GameState, total_value: i64, multiplier: f64) {
    return_stakes_multiplied(state, multiplier);
    let coin_return = (state.gamble.coins as f64 * multiplier).floor() as i64;
    let profit = coin_return - state.gamble.coins;
    state.coins += coin_return;
    state.stats.lifetime_coins += profit;
    state.stats.gambles_won += 1;
    state.stats.total_won_value += (total_value as f64 * multiplier).floor() as i64;
}

fn clear_selection(state: &mut GameState) {
    state.gamble.stakes.clear();
    state.gamble.coins = 0;
    state.gamble.all_in = false;
}

/// Flip the coin over the current selection. Returns `true` on a win.
pub fn coin_flip(state: &mut GameState, rng: &mut impl Rng) -> bool {
    if state.gamble.is_empty() {
        return false;
    }
    apply_wild_magic(state, rng);

    let total_value = state.gamble.value();
    state.stats.total_gambled_value += total_value;

    if state.gamble.all_in {
        // All-in is always a fair coin; upgrades and potions sit out.
        let won = rng.gen::<f64>() < COIN_FLIP_WIN_CHANCE;
        if won {
            settle_win(state, total_value, ALL_IN_WIN_MULTIPLIER);
            state.notify(
                "ALL IN WIN! You multiplied your gamble by 3!",
                NotificationKind::Success,
            );
        } else {
            state.stats.gambles_lost += 1;
            state.notify("ALL IN LOSS! You lost everything.", NotificationKind::Error);
        }
        clear_selection(state);
        return won;
    }

    let win_chance = if state.upgrade_tier(UpgradeId::WeightedCoin) > 0 {
        WEIGHTED_COIN_WIN_CHANCE
    } else {
        COIN_FLIP_WIN_CHANCE
    };
    let won = rng.gen::<f64>() < win_chance;
    let high_stakes = state.high_stakes();

    if won {
        // High Stakes replaces the multiplier rather than stacking.
        let multiplier = match high_stakes {
            Some((win_mult, _)) => win_mult,
            None => COIN_FLIP_WIN_MULTIPLIER,
        };
        settle_win(state, total_value, multiplier);
        state.notify(
            format!("You won and multiplied your gamble by {multiplier}!"),
            NotificationKind::Success,
        );
        clear_selection(state);
        return true;
    }

    state.stats.gambles_lost += 1;

    if state.coin_flip_redos > 0 {
        state.coin_flip_redos -= 1;
        state.notify(
            "You lost... but your Second Chance saves you! The items are returned.",
            NotificationKind::Success,
        );
        restore_selection(state);
        return false;
    }

    let phantom_veil = state.phantom_veil_active();
    if high_stakes.is_some() || phantom_veil {
        let loss_multiplier = match high_stakes {
            Some((_, loss_mult)) => loss_mult,
            None => 1.0,
        };
        // The stake itself is already gone; the multiplier charges the
        // overage as debt. Item debt is confined to coins.
        let stakes = std::mem::take(&mut state.gamble.stakes);
        for s in &stakes {
            let extra = ((s.amount as f64 * loss_multiplier).floor() as u32)
                .saturating_sub(s.amount);
            let source = match s.kind {
                StakeKind::Item => &mut state.inventory,
                StakeKind::Potion => &mut state.potions,
            };
            if let Some(count) = source.get_mut(&s.name) {
                *count = count.saturating_sub(extra);
            }
        }
        state.gamble.stakes = stakes;
        let coin_loss = (state.gamble.coins as f64 * loss_multiplier).floor() as i64;
        state.coins -= coin_loss - state.gamble.coins;
        let reason = if high_stakes.is_some() {
            format!("Draught of Ruin caused a {loss_multiplier}x loss!")
        } else {
            "Phantom Veil turned your loss to debt!".to_string()
        };
        state.notify(format!("You lost... {reason}"), NotificationKind::Error);
    } else if state.upgrade_tier(UpgradeId::GambleInsurance) > 0 && !state.gamble_insurance_used {
        state.gamble_insurance_used = true;
        let refund = (total_value as f64 * GAMBLE_INSURANCE_REFUND_FRACTION).floor() as i64;
        state.coins += refund;
        state.stats.lifetime_coins += refund;
        state.notify(
            format!("You lost... but Gamble Insurance refunded you {refund} coins!"),
            NotificationKind::Success,
        );
    } else {
        state.notify(
            "You lost all selected items and coins.",
            NotificationKind::Error,
        );
    }

    clear_selection(state);
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use crate::items::types::{ActiveBoost, BoostKind, PotionEffect};

    #[test]
    fn test_stake_moves_items_out_of_inventory() {
        let mut state = GameState::new(0);
        state.add_item("Dust Bunny", 5);
        stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        assert_eq!(state.item_count("Dust Bunny"), 2);
        assert_eq!(state.gamble.stakes.len(), 1);
        assert_eq!(state.gamble.stakes[0].amount, 3);

        // Staking more merges into the same line.
        stake(&mut state, "Dust Bunny", StakeKind::Item, 2);
        assert_eq!(state.gamble.stakes.len(), 1);
        assert_eq!(state.gamble.stakes[0].amount, 5);
        assert_eq!(state.item_count("Dust Bunny"), 0);

        // Overdrawing is refused.
        stake(&mut state, "Dust Bunny", StakeKind::Item, 1);
        assert_eq!(state.gamble.stakes[0].amount, 5);
    }

    #[test]
    fn test_stake_coins_validates() {
        let mut state = GameState::new(0);
        state.coins = 100;
        stake_coins(&mut state, 0);
        stake_coins(&mut state, -5);
        stake_coins(&mut state, 200);
        assert_eq!(state.gamble.coins, 0);
        assert_eq!(state.coins, 100);
        stake_coins(&mut state, 60);
        assert_eq!(state.gamble.coins, 60);
        assert_eq!(state.coins, 40);
    }

    #[test]
    fn test_restore_selection_returns_everything() {
        let mut state = GameState::new(0);
        state.coins = 50;
        state.add_potion("Minor Luck Potion", 2);
        stake(&mut state, "Minor Luck Potion", StakeKind::Potion, 2);
        stake_coins(&mut state, 30);
        state.gamble.all_in = true;
        restore_selection(&mut state);
        assert_eq!(state.potion_count("Minor Luck Potion"), 2);
        assert_eq!(state.coins, 50);
        assert!(state.gamble.is_empty());
        assert!(!state.gamble.all_in);
    }

    #[test]
    fn test_gamble_everything_takes_the_lot() {
        let mut state = GameState::new(0);
        state.coins = 75;
        state.add_item("Iron Knuckles", 1);
        state.add_item("Dust Bunny", 4);
        state.add_potion("Minor Health Potion", 2);
        state.equipped_weapon = Some("Iron Knuckles".to_string());
        gamble_everything(&mut state);
        assert!(state.gamble.all_in);
        assert_eq!(state.coins, 0);
        assert_eq!(state.gamble.coins, 75);
        assert_eq!(state.gamble.stakes.len(), 3);
        assert_eq!(state.item_count("Iron Knuckles"), 0);
        assert!(state.equipped_weapon.is_none());
    }

    #[test]
    fn test_gamble_everything_with_nothing_is_refused() {
        let mut state = GameState::new(0);
        gamble_everything(&mut state);
        assert!(!state.gamble.all_in);
    }

    #[test]
    fn test_win_doubles_stakes_and_coins() {
        let mut state = GameState::new(0);
        state.coins = 100;
        state.add_item("Dust Bunny", 3);
        stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        stake_coins(&mut state, 100);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            if coin_flip(&mut state, &mut rng) {
                break;
            }
            // Re-stage after a loss.
            state.add_item("Dust Bunny", 3);
            state.coins = 100;
            stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
            stake_coins(&mut state, 100);
        }
        assert_eq!(state.item_count("Dust Bunny"), 6);
        assert_eq!(state.coins, 200);
        assert!(state.gamble.is_empty());
        assert!(state.stats.gambles_won >= 1);
    }

    #[test]
    fn test_loss_keeps_the_stakes() {
        let mut state = GameState::new(0);
        state.add_item("Dust Bunny", 3);
        stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            if !coin_flip(&mut state, &mut rng) {
                break;
            }
            // Won; strip the winnings and try again.
            state.inventory.clear();
            state.coins = 0;
            state.add_item("Dust Bunny", 3);
            stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        }
        assert_eq!(state.item_count("Dust Bunny"), 0);
        assert!(state.gamble.is_empty());
        assert!(state.stats.gambles_lost >= 1);
    }

    #[test]
    fn test_second_chance_restores_on_loss() {
        let mut state = GameState::new(0);
        state.coin_flip_redos = 1;
        state.add_item("Dust Bunny", 3);
        stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            let redos_before = state.coin_flip_redos;
            if !coin_flip(&mut state, &mut rng) && redos_before > 0 {
                break;
            }
            state.inventory.clear();
            state.coins = 0;
            state.add_item("Dust Bunny", 3);
            stake(&mut state, "Dust Bunny", StakeKind::Item, 3);
        }
        assert_eq!(state.coin_flip_redos, 0);
        assert_eq!(state.item_count("Dust Bunny"), 3);
        // The redo still counts as a lost flip in the stats.
        assert!(state.stats.gambles_lost >= 1);
    }

    #[test]
    fn test_insurance_refunds_half_once() {
        let mut state = GameState::new(0);
        state.rebirth_upgrades.insert(UpgradeId::GambleInsurance, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            state.coins = 100;
            state.gamble = Default::default();
            state.gamble_insurance_used = false;
            stake_coins(&mut state, 100);
            if !coin_flip(&mut state, &mut rng) {
                break;
            }
        }
        assert!(state.gamble_insurance_used);
        assert_eq!(state.coins, 50);

        // A second loss in the same life gets nothing back.
        loop {
            state.coins = 100;
            state.gamble = Default::default();
            stake_coins(&mut state, 100);
            if !coin_flip(&mut state, &mut rng) {
                break;
            }
        }
        assert_eq!(state.coins, 0);
    }

    #[test]
    fn test_high_stakes_loss_charges_debt() {
        let mut state = GameState::new(0);
        state.active_boosts.insert(
            BoostKind::HighStakes,
            ActiveBoost {
                potion: "Draught of Ruin".to_string(),
                effect: PotionEffect::HighStakes {
                    win_multiplier: 4.0,
                    loss_multiplier: 2.0,
                    duration: 180,
                },
                time_left: 180,
                stacks: 1,
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            state.coins = 100;
            state.gamble = Default::default();
            stake_coins(&mut state, 100);
            if !coin_flip(&mut state, &mut rng) {
                break;
            }
        }
        // A 2x loss on a 100-coin stake leaves 100 coins of debt.
        assert_eq!(state.coins, -100);
    }

    #[test]
    fn test_high_stakes_win_replaces_multiplier() {
        let mut state = GameState::new(0);
        state.active_boosts.insert(
            BoostKind::HighStakes,
            ActiveBoost {
                potion: "Draught of Ruin".to_string(),
                effect: PotionEffect::HighStakes {
                    win_multiplier: 4.0,
                    loss_multiplier: 2.0,
                    duration: 180,
                },
                time_left: 180,
                stacks: 1,
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            state.coins = 100;
            state.gamble = Default::default();
            stake_coins(&mut state, 100);
            if coin_flip(&mut state, &mut rng) {
                break;
            }
        }
        assert_eq!(state.coins, 400);
    }

    #[test]
    fn test_all_in_pays_triple_and_ignores_high_stakes() {
        let mut state = GameState::new(0);
        state.active_boosts.insert(
            BoostKind::HighStakes,
            ActiveBoost {
                potion: "Draught of Ruin".to_string(),
                effect: PotionEffect::HighStakes {
                    win_multiplier: 4.0,
                    loss_multiplier: 2.0,
                    duration: 180,
                },
                time_left: 180,
                stacks: 1,
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        loop {
            state.coins = 100;
            state.gamble = Default::default();
            gamble_everything(&mut state);
            if coin_flip(&mut state, &mut rng) {
                break;
            }
        }
        assert_eq!(state.coins, 300);
    }

    #[test]
    fn test_weighted_coin_raises_win_rate() {
        let trials = 10_000;
        let mut rng = ChaCha8Rng::seed_from_u64(42);

        let mut plain_wins = 0;
        let mut state = GameState::new(0);
        for _ in 0..trials {
            state.coins = 1;
            state.gamble = Default::default();
            stake_coins(&mut state, 1);
            if coin_flip(&mut state, &mut rng) {
                plain_wins += 1;
            }
        }

        let mut weighted_wins = 0;
        let mut state = GameState::new(0);
        state.rebirth_upgrades.insert(UpgradeId::WeightedCoin, 1);
        for _ in 0..trials {
            state.coins = 1;
            state.gamble = Default::default();
            stake_coins(&mut state, 1);
            if coin_flip(&mut state, &mut rng) {
                weighted_wins += 1;
            }
        }

        let plain = plain_wins as f64 / trials as f64;
        let weighted = weighted_wins as f64 / trials as f64;
        assert!((plain - 0.5).abs() < 0.02, "plain win rate {plain}");
        assert!((weighted - 0.53).abs() < 0.02, "weighted win rate {weighted}");
    }

    #[test]
    fn test_flip_with_empty_selection_is_a_no_op() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        assert!(!coin_flip(&mut state, &mut rng));
        assert_eq!(state.stats.total_gambled_value, 0);
    }
}
