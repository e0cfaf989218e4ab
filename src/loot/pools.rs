use rand::Rng;

use crate::core::constants::LEGENDARY_UPGRADE_CHANCE;
use crate::core::game_state::GameState;
use crate::items::types::Rarity;
use crate::loot::types::{CrateCategory, CrateTier, CrateType, LootAction, PoolEntry};

/// Loot table for a crate, before luck is applied. Chances are
/// percentages that sum to 100 for every table defined here.
pub fn crate_pool(state: &GameState, crate_type: CrateType) -> Vec<PoolEntry> {
    match crate_type {
        CrateType::Specialized(category, rarity) => {
            let action = match category {
                CrateCategory::Potion => LootAction::Potion,
                _ => LootAction::Item,
            };
            if rarity == Rarity::Legendary {
                // Legendary specialized crates can upgrade into their
                // mythical counterpart.
                let mut base = PoolEntry::new(action, Rarity::Legendary, 100.0 - LEGENDARY_UPGRADE_CHANCE);
                base.category = Some(category);
                let mut upgrade =
                    PoolEntry::new(LootAction::Crate, Rarity::Mythical, LEGENDARY_UPGRADE_CHANCE);
                upgrade.crate_type = Some(CrateType::Specialized(category, Rarity::Mythical));
                vec![base, upgrade]
            } else {
                let mut entry = PoolEntry::new(action, rarity, 100.0);
                entry.category = Some(category);
                vec![entry]
            }
        }
        CrateType::Standard(CrateTier::Basic) => vec![
            PoolEntry::new(LootAction::Item, Rarity::Common, 89.0),
            PoolEntry::new(LootAction::Potion, Rarity::Common, 3.0),
            PoolEntry::new(LootAction::Crate, Rarity::Rare, 7.0),
            PoolEntry::new(LootAction::Crate, Rarity::Epic, 1.0),
        ],
        CrateType::Standard(CrateTier::Rare) => vec![
            PoolEntry::new(LootAction::Item, Rarity::Rare, 80.0),
            PoolEntry::new(LootAction::Potion, Rarity::Rare, 5.0),
            PoolEntry::new(LootAction::Crate, Rarity::Epic, 12.0),
            PoolEntry::new(LootAction::Crate, Rarity::Legendary, 3.0),
        ],
        CrateType::Standard(CrateTier::Epic) => vec![
            PoolEntry::new(LootAction::Item, Rarity::Epic, 85.0),
            PoolEntry::new(LootAction::Crate, Rarity::Legendary, 15.0),
        ],
        CrateType::Standard(CrateTier::Legendary) => {
            let hunter = state.lebron_hunter_bonus();
            vec![
                PoolEntry::new(
                    LootAction::Item,
                    Rarity::Legendary,
                    99.0 - hunter - LEGENDARY_UPGRADE_CHANCE,
                ),
                PoolEntry::new(LootAction::Item, Rarity::Lebron, 1.0 + hunter),
                PoolEntry::new(LootAction::Crate, Rarity::Mythical, LEGENDARY_UPGRADE_CHANCE),
            ]
        }
        CrateType::Standard(CrateTier::Mythical) => vec![
            PoolEntry::new(LootAction::Item, Rarity::Mythical, 95.0),
            PoolEntry::new(LootAction::Item, Rarity::Lebron, 5.0),
        ],
    }
}

/// The ladder luck climbs, worst outcome first. Luck drains chance out
/// of each rung into the one above it, starting from the top pair.
const QUALITY_ORDER: [(LootAction, Rarity); 11] = [
    (LootAction::Item, Rarity::Common),
    (LootAction::Potion, Rarity::Common),
    (LootAction::Crate, Rarity::Rare),
    (LootAction::Item, Rarity::Rare),
    (LootAction::Potion, Rarity::Rare),
    (LootAction::Crate, Rarity::Epic),
    (LootAction::Item, Rarity::Epic),
    (LootAction::Crate, Rarity::Legendary),
    (LootAction::Item, Rarity::Legendary),
    (LootAction::Item, Rarity::Lebron),
    (LootAction::Item, Rarity::Mythical),
];

/// Shift chance toward better outcomes. `luck` is percentage points;
/// each adjacent rung pair moves at most the source rung's remaining
/// chance, and pairs missing from the pool are skipped without
/// consuming luck.
pub fn apply_luck(pool: &mut [PoolEntry], luck: f64) {
    if luck <= 0.0 {
        return;
    }
    let mut luck = luck;

    let find = |pool: &[PoolEntry], key: (LootAction, Rarity)| {
        pool.iter()
            .position(|p| p.action == key.0 && p.rarity == key.1)
    };

    for i in (1..QUALITY_ORDER.len()).rev() {
        if luck <= 0.0 {
            break;
        }
        let (to_idx, from_idx) = match (
            find(pool, QUALITY_ORDER[i]),
            find(pool, QUALITY_ORDER[i - 1]),
        ) {
            (Some(to), Some(from)) => (to, from),
            _ => continue,
        };
        if pool[from_idx].chance <= 0.0 {
            continue;
        }
        let moved = luck.min(pool[from_idx].chance);
        pool[from_idx].chance -= moved;
        pool[to_idx].chance += moved;
        luck -= moved;
    }
}

/// Roll against the pool. Chances are normalized before the roll, so
/// tables that no longer sum to 100 still behave. Falls back to the
/// first entry with positive chance, then the first entry outright.
pub fn select_from_pool(pool: &[PoolEntry], rng: &mut impl Rng) -> Option<PoolEntry> {
    if pool.is_empty() {
        return None;
    }
    let total: f64 = pool.iter().map(|p| p.chance).sum();
    if total > 0.0 {
        let roll = rng.gen::<f64>() * 100.0;
        let mut sum = 0.0;
        for entry in pool {
            sum += entry.chance / total * 100.0;
            if roll <= sum {
                return Some(*entry);
            }
        }
    }
    pool.iter()
        .find(|p| p.chance > 0.0)
        .or_else(|| pool.first())
        .copied()
}

/// Pick from `items` with per-item weights. Non-positive weights are
/// filtered out first; if nothing survives, picks uniformly from the
/// original list instead.
pub fn weighted_pick<'a, T: ?Sized>(
    items: &[&'a T],
    mut weight: impl FnMut(&T) -> f64,
    rng: &mut impl Rng,
) -> Option<&'a T> {
    if items.is_empty() {
        return None;
    }
    let weighted: Vec<(&'a T, f64)> = items
        .iter()
        .map(|item| (*item, weight(item)))
        .filter(|(_, w)| *w > 0.0)
        .collect();

    let total: f64 = weighted.iter().map(|(_, w)| w).sum();
    if weighted.is_empty() || total <= 0.0 {
        return Some(items[rng.gen_range(0..items.len())]);
    }

    let mut roll = rng.gen::<f64>() * total;
    for (item, w) in &weighted {
        if roll < *w {
            return Some(item);
        }
        roll -= w;
    }
    weighted.last().map(|(item, _)| *item)
}
