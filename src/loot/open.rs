use rand::Rng;

use crate::core::constants::{
    CRATE_BOUNTY_COINS, FREE_CRATE_DELAY_STEP, FREE_CRATE_QUEUE_CAP, FREE_CRATE_RESET_DELAY,
    OPEN_ALL_CRATES_PER_FEE_COIN, SHOP_HAGGLER_DISCOUNT_PER_TIER, SPEEDY_CRATES_RATE_PER_TIER,
};
use crate::core::game_state::{GameState, NotificationKind};
use crate::items::catalog;
use crate::items::inventory::apply_wild_magic;
use crate::items::types::{ItemCategory, Rarity};
use crate::loot::pools::{apply_luck, crate_pool, select_from_pool, weighted_pick};
use crate::loot::types::{CrateCategory, CrateTier, CrateType, LootAction, LootResult};

/// Marks a crate type as available in the shop, announcing it the
/// first time.
pub fn unlock_crate(state: &mut GameState, crate_type: CrateType) {
    if state.unlocked_crates.insert(crate_type) {
        state.notify(
            format!("Unlocked {}s!", crate_type.display_name()),
            NotificationKind::Success,
        );
    }
}

/// Item names eligible for an `Item` pool slot. Ingredients never drop
/// from crates; weapon and armor crates restrict to their category.
fn item_candidates(rarity: Rarity, category: Option<CrateCategory>) -> Vec<&'static str> {
    let wanted = match category {
        Some(CrateCategory::Weapon) => Some(ItemCategory::Weapon),
        Some(CrateCategory::Armor) => Some(ItemCategory::Armor),
        _ => None,
    };
    catalog::get_all_items()
        .into_iter()
        .filter(|item| item.rarity == rarity && item.category != ItemCategory::Ingredient)
        .filter(|item| wanted.map_or(true, |c| item.category == c))
        .map(|item| item.name)
        .collect()
}

fn potion_candidates(rarity: Rarity) -> Vec<&'static str> {
    catalog::get_all_potions()
        .into_iter()
        .filter(|p| p.rarity == rarity)
        .map(|p| p.name)
        .collect()
}

/// Roll the contents of one crate. Returns `None` when no payload can
/// be produced; callers refund the crate in that case. Does not touch
/// inventories.
pub fn crate_result(
    state: &GameState,
    crate_type: CrateType,
    rng: &mut impl Rng,
) -> Option<LootResult> {
    let mut pool = crate_pool(state, crate_type);
    apply_luck(&mut pool, state.luck_value());
    let slot = select_from_pool(&pool, rng)?;

    match slot.action {
        LootAction::Item => {
            if slot.rarity == Rarity::Lebron {
                return Some(LootResult::Item {
                    name: "LeBron James".to_string(),
                    rarity: Rarity::Lebron,
                });
            }
            let mut candidates = item_candidates(slot.rarity, slot.category);
            if candidates.is_empty() {
                // Category too narrow for this rarity; retry without it.
                candidates = item_candidates(slot.rarity, None);
                if candidates.is_empty() {
                    return None;
                }
            }
            // Duplicates get rarer the more copies are already owned.
            let name = weighted_pick(
                &candidates,
                |name| 1.0 / (state.item_count(name) as f64 + 1.0),
                rng,
            )?;
            Some(LootResult::Item {
                name: name.to_string(),
                rarity: slot.rarity,
            })
        }
        LootAction::Crate => {
            let granted = slot.granted_crate()?;
            Some(LootResult::Crate {
                crate_type: granted,
                rarity: slot.rarity,
            })
        }
        LootAction::Potion => {
            let candidates = potion_candidates(slot.rarity);
            let name = weighted_pick(
                &candidates,
                |name| 1.0 / (state.potion_count(name) as f64 + 1.0),
                rng,
            )?;
            Some(LootResult::Potion {
                name: name.to_string(),
                rarity: slot.rarity,
            })
        }
    }
}

/// Bank a rolled payload: inventory, discovery, pull-value stats, and
/// shop unlocks earned by pulling above the crate's own tier.
pub fn process_crate_result(state: &mut GameState, result: &LootResult) {
    match result {
        LootResult::Item { name, rarity } => {
            state.add_item(name, 1);
            state.stats.total_pull_value += catalog::item_sell_value(name);
            let tier = match rarity {
                Rarity::Lebron => Some(CrateTier::Legendary),
                _ => CrateTier::from_rarity(*rarity),
            };
            if let Some(tier) = tier {
                if tier != CrateTier::Basic {
                    unlock_crate(state, CrateType::Standard(tier));
                }
            }
        }
        LootResult::Crate { crate_type, rarity } => {
            state.add_crate(*crate_type, 1);
            if let Some(tier) = CrateTier::from_rarity(*rarity) {
                state.stats.total_pull_value += tier.shop_value();
            }
            unlock_crate(state, *crate_type);
        }
        LootResult::Potion { name, .. } => {
            state.add_potion(name, 1);
            state.stats.total_pull_value += catalog::potion_sell_value(name);
        }
    }
}

fn award_bounty(state: &mut GameState, crates: u32) {
    use crate::rebirth::UpgradeId;
    if state.upgrade_tier(UpgradeId::CrateBounties) > 0 && crates > 0 {
        let gain = CRATE_BOUNTY_COINS * crates as i64;
        state.coins += gain;
        state.stats.lifetime_coins += gain;
        state.notify(
            format!("+{gain} coins from Crate Bounties!"),
            NotificationKind::Success,
        );
    }
}

/// Open one crate from the stash. The crate is consumed up front and
/// refunded if the roll fails.
pub fn open_crate(
    state: &mut GameState,
    crate_type: CrateType,
    rng: &mut impl Rng,
) -> Option<LootResult> {
    if state.crate_count(crate_type) == 0 {
        state.notify("No crates left!", NotificationKind::Error);
        return None;
    }
    *state.crate_counts.entry(crate_type).or_insert(0) -= 1;
    apply_wild_magic(state, rng);
    state.stats.crates_opened += 1;
    state.stats.total_crate_value += crate_type.shop_value();
    award_bounty(state, 1);

    match crate_result(state, crate_type, rng) {
        Some(result) => {
            process_crate_result(state, &result);
            Some(result)
        }
        None => {
            state.add_crate(crate_type, 1);
            state.notify(
                "There was an error opening the crate.",
                NotificationKind::Error,
            );
            None
        }
    }
}

/// Open the whole stack of one crate type. Costs one coin per five
/// crates unless Crate Bounties is owned; failed rolls are returned to
/// the stash.
pub fn open_all_crates(
    state: &mut GameState,
    crate_type: CrateType,
    rng: &mut impl Rng,
) -> Vec<LootResult> {
    use crate::rebirth::UpgradeId;

    let count = state.crate_count(crate_type);
    if count == 0 {
        state.notify("No crates to open!", NotificationKind::Error);
        return Vec::new();
    }

    let has_bounties = state.upgrade_tier(UpgradeId::CrateBounties) > 0;
    let fee = if has_bounties {
        0
    } else {
        (count as i64 + OPEN_ALL_CRATES_PER_FEE_COIN as i64 - 1)
            / OPEN_ALL_CRATES_PER_FEE_COIN as i64
    };
    if state.coins < fee {
        state.notify(
            format!("Not enough coins! Need {fee} to open all."),
            NotificationKind::Error,
        );
        return Vec::new();
    }

    state.coins -= fee;
    state.crate_counts.insert(crate_type, 0);
    apply_wild_magic(state, rng);

    let crate_value = crate_type.shop_value();
    let mut results = Vec::with_capacity(count as usize);
    let mut failed = 0;
    for _ in 0..count {
        state.stats.crates_opened += 1;
        state.stats.total_crate_value += crate_value;
        match crate_result(state, crate_type, rng) {
            Some(result) => {
                process_crate_result(state, &result);
                results.push(result);
            }
            None => failed += 1,
        }
    }

    if failed > 0 {
        state.add_crate(crate_type, failed);
        state.notify(
            format!("{failed} crate(s) failed to open and were returned."),
            NotificationKind::Error,
        );
    }
    award_bounty(state, count);
    results
}

/// Shop cost of a crate after Shop Haggler and Merchant's Elixir
/// discounts.
pub fn crate_cost(state: &GameState, crate_type: CrateType) -> i64 {
    use crate::rebirth::UpgradeId;
    let mut discount =
        state.upgrade_tier(UpgradeId::ShopHaggler) as f64 * SHOP_HAGGLER_DISCOUNT_PER_TIER;
    discount += state.merchant_wisdom().0;
    (crate_type.shop_value() as f64 * (1.0 - discount)).ceil() as i64
}

pub fn buy_crate(state: &mut GameState, crate_type: CrateType, rng: &mut impl Rng) -> bool {
    let cost = crate_cost(state, crate_type);
    if state.coins < cost {
        state.notify("Not enough coins!", NotificationKind::Error);
        return false;
    }
    apply_wild_magic(state, rng);
    state.coins -= cost;
    state.add_crate(crate_type, 1);
    if !crate_type.starts_unlocked() {
        unlock_crate(state, crate_type);
    }
    state.notify("Purchased a crate!", NotificationKind::Success);
    true
}

/// Weighted table a spawned free crate is drawn from.
const FREE_CRATE_POOL: [(CrateType, f64); 5] = [
    (CrateType::Standard(CrateTier::Basic), 70.0),
    (CrateType::Standard(CrateTier::Rare), 15.0),
    (
        CrateType::Specialized(CrateCategory::Weapon, Rarity::Common),
        5.0,
    ),
    (
        CrateType::Specialized(CrateCategory::Armor, Rarity::Common),
        5.0,
    ),
    (
        CrateType::Specialized(CrateCategory::Potion, Rarity::Common),
        5.0,
    ),
];

/// Draw one crate from the free-crate spawn table.
pub fn roll_free_crate(rng: &mut impl Rng) -> CrateType {
    let total: f64 = FREE_CRATE_POOL.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;
    for (crate_type, weight) in FREE_CRATE_POOL {
        if roll < weight {
            return crate_type;
        }
        roll -= weight;
    }
    FREE_CRATE_POOL[0].0
}

/// One second of the free-crate countdown. On expiry a crate joins the
/// claim queue and the next spawn moves further out; the escalating
/// delay only resets when the queue is claimed.
pub fn tick_free_crate_timer(state: &mut GameState, rng: &mut impl Rng) {
    use crate::rebirth::UpgradeId;

    if state.free_crate_timer > 0.0 {
        let speed =
            1.0 + state.upgrade_tier(UpgradeId::SpeedyCrates) as f64 * SPEEDY_CRATES_RATE_PER_TIER;
        state.free_crate_timer -= speed;
    }
    if state.free_crate_timer > 0.0 {
        return;
    }

    let chosen = roll_free_crate(rng);
    state.free_crates_to_claim.push(chosen);
    if state.free_crates_to_claim.len() > FREE_CRATE_QUEUE_CAP {
        state.free_crates_to_claim.remove(0);
    }
    state.next_crate_delay += FREE_CRATE_DELAY_STEP;
    state.free_crate_timer = state.next_crate_delay;
}

/// Move every queued free crate into the stash and reset the spawn
/// delay escalation.
pub fn claim_free_crates(state: &mut GameState, rng: &mut impl Rng) {
    if state.free_crates_to_claim.is_empty() {
        state.notify("No free crates to claim.", NotificationKind::Error);
        return;
    }
    apply_wild_magic(state, rng);

    let mut summary: Vec<(CrateType, u32)> = Vec::new();
    let queued = std::mem::take(&mut state.free_crates_to_claim);
    for crate_type in queued {
        state.add_crate(crate_type, 1);
        match summary.iter_mut().find(|(ct, _)| *ct == crate_type) {
            Some((_, n)) => *n += 1,
            None => summary.push((crate_type, 1)),
        }
    }
    state.next_crate_delay = FREE_CRATE_RESET_DELAY;

    let text = summary
        .iter()
        .map(|(ct, n)| format!("{n}x {}", ct.display_name()))
        .collect::<Vec<_>>()
        .join(", ");
    state.notify(format!("Claimed: {text}!"), NotificationKind::Success);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_open_crate_consumes_and_banks() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(11);
        let basic = CrateType::Standard(CrateTier::Basic);

        let result = open_crate(&mut state, basic, &mut rng);
        assert!(result.is_some());
        assert_eq!(state.crate_count(basic), 4);
        assert_eq!(state.stats.crates_opened, 1);
        assert_eq!(state.stats.total_crate_value, 5);
        assert!(state.stats.total_pull_value > 0);
    }

    #[test]
    fn test_open_crate_with_empty_stash_is_refused() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let rare = CrateType::Standard(CrateTier::Rare);
        assert!(open_crate(&mut state, rare, &mut rng).is_none());
        assert_eq!(state.stats.crates_opened, 0);
    }

    #[test]
    fn test_lebron_slot_always_resolves_to_lebron_james() {
        let mut state = GameState::new(0);
        // Drown the pool in luck so the legendary crate's lebron rung
        // dominates.
        state.active_boosts.insert(
            crate::items::types::BoostKind::LuckBoost,
            crate::items::types::ActiveBoost {
                potion: "Luck Potion".to_string(),
                effect: crate::items::types::PotionEffect::LuckBoost {
                    value: 97.0,
                    duration: 300,
                    max_stacks: 1,
                },
                time_left: 300,
                stacks: 1,
            },
        );
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        let mut seen_lebron = false;
        for _ in 0..200 {
            if let Some(LootResult::Item { name, rarity }) =
                crate_result(&state, CrateType::Standard(CrateTier::Legendary), &mut rng)
            {
                if rarity == Rarity::Lebron {
                    assert_eq!(name, "LeBron James");
                    seen_lebron = true;
                }
            }
        }
        assert!(seen_lebron);
    }

    #[test]
    fn test_weapon_crate_only_drops_weapons() {
        let state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        let crate_type = CrateType::Specialized(CrateCategory::Weapon, Rarity::Rare);
        for _ in 0..100 {
            match crate_result(&state, crate_type, &mut rng) {
                Some(LootResult::Item { name, rarity }) => {
                    assert_eq!(rarity, Rarity::Rare);
                    let def = catalog::item_def(&name).unwrap();
                    assert_eq!(def.category, ItemCategory::Weapon);
                }
                other => panic!("unexpected payload {other:?}"),
            }
        }
    }

    #[test]
    fn test_ingredients_never_drop() {
        let state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(13);
        for _ in 0..500 {
            if let Some(LootResult::Item { name, .. }) =
                crate_result(&state, CrateType::Standard(CrateTier::Basic), &mut rng)
            {
                let def = catalog::item_def(&name).unwrap();
                assert_ne!(def.category, ItemCategory::Ingredient);
            }
        }
    }

    #[test]
    fn test_pull_above_tier_unlocks_shop_crates() {
        let mut state = GameState::new(0);
        let rare = CrateType::Standard(CrateTier::Rare);
        assert!(!state.unlocked_crates.contains(&rare));
        process_crate_result(
            &mut state,
            &LootResult::Crate {
                crate_type: rare,
                rarity: Rarity::Rare,
            },
        );
        assert!(state.unlocked_crates.contains(&rare));
        assert_eq!(state.crate_count(rare), 1);
    }

    #[test]
    fn test_open_all_charges_fee_and_empties_stack() {
        let mut state = GameState::new(0);
        state.coins = 10;
        let mut rng = ChaCha8Rng::seed_from_u64(21);
        let basic = CrateType::Standard(CrateTier::Basic);
        let results = open_all_crates(&mut state, basic, &mut rng);
        assert_eq!(results.len(), 5);
        assert_eq!(state.crate_count(basic), 0);
        // 5 crates, one coin per 5
        assert_eq!(state.coins, 9);
    }

    #[test]
    fn test_open_all_fee_waived_by_crate_bounties() {
        use crate::rebirth::UpgradeId;
        let mut state = GameState::new(0);
        state.rebirth_upgrades.insert(UpgradeId::CrateBounties, 1);
        let mut rng = ChaCha8Rng::seed_from_u64(22);
        let basic = CrateType::Standard(CrateTier::Basic);
        let results = open_all_crates(&mut state, basic, &mut rng);
        assert_eq!(results.len(), 5);
        // No fee and 5 coins of bounty per crate.
        assert_eq!(state.coins, 25);
    }

    #[test]
    fn test_buy_crate_applies_haggler_discount() {
        use crate::rebirth::UpgradeId;
        let mut state = GameState::new(0);
        state.coins = 100;
        state.rebirth_upgrades.insert(UpgradeId::ShopHaggler, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let rare = CrateType::Standard(CrateTier::Rare);
        assert!(buy_crate(&mut state, rare, &mut rng));
        // 20 * (1 - 0.4) = 12
        assert_eq!(state.coins, 88);
        assert_eq!(state.crate_count(rare), 1);
        assert!(state.unlocked_crates.contains(&rare));
    }

    #[test]
    fn test_buy_crate_refused_without_coins() {
        let mut state = GameState::new(0);
        state.coins = 3;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        assert!(!buy_crate(
            &mut state,
            CrateType::Standard(CrateTier::Basic),
            &mut rng
        ));
        assert_eq!(state.coins, 3);
    }

    #[test]
    fn test_free_crate_spawn_escalates_delay() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        state.free_crate_timer = 1.0;
        tick_free_crate_timer(&mut state, &mut rng);
        assert_eq!(state.free_crates_to_claim.len(), 1);
        assert_eq!(state.next_crate_delay, 40.0);
        assert_eq!(state.free_crate_timer, 40.0);
    }

    #[test]
    fn test_claiming_resets_delay_escalation() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        state.next_crate_delay = 75.0;
        state
            .free_crates_to_claim
            .push(CrateType::Standard(CrateTier::Basic));
        state
            .free_crates_to_claim
            .push(CrateType::Standard(CrateTier::Basic));
        claim_free_crates(&mut state, &mut rng);
        assert!(state.free_crates_to_claim.is_empty());
        assert_eq!(state.crate_count(CrateType::Standard(CrateTier::Basic)), 7);
        assert_eq!(state.next_crate_delay, FREE_CRATE_RESET_DELAY);
    }

    #[test]
    fn test_free_crate_queue_is_capped() {
        let mut state = GameState::new(0);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        state.free_crates_to_claim =
            vec![CrateType::Standard(CrateTier::Basic); FREE_CRATE_QUEUE_CAP];
        state.free_crate_timer = 0.5;
        tick_free_crate_timer(&mut state, &mut rng);
        assert_eq!(state.free_crates_to_claim.len(), FREE_CRATE_QUEUE_CAP);
    }

    #[test]
    fn test_speedy_crates_ticks_faster() {
        use crate::rebirth::UpgradeId;
        let mut state = GameState::new(0);
        state.rebirth_upgrades.insert(UpgradeId::SpeedyCrates, 2);
        let mut rng = ChaCha8Rng::seed_from_u64(8);
        state.free_crate_timer = 10.0;
        tick_free_crate_timer(&mut state, &mut rng);
        assert_eq!(state.free_crate_timer, 8.5);
    }
}
