use std::collections::{BTreeMap, BTreeSet, VecDeque};

use serde::{Deserialize, Serialize};

use crate::brawl::types::{BrawlRarity, BrawlState};
use crate::core::constants::{FREE_CRATE_INITIAL_DELAY, FREE_CRATE_INITIAL_TIMER, MAX_NOTIFICATIONS};
use crate::items::catalog;
use crate::items::types::{ActiveBoost, BoostKind, PotionEffect};
use crate::loot::types::{CrateTier, CrateType};
use crate::rebirth::UpgradeId;

/// Severity of a user-facing notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub message: String,
    pub kind: NotificationKind,
}

/// Whether a gambled stake came from the item or potion inventory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StakeKind {
    Item,
    Potion,
}

/// One line of the coin-flip stake: `amount` copies of a named thing,
/// already removed from the owning inventory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GambleStake {
    pub name: String,
    pub kind: StakeKind,
    pub amount: u32,
}

/// Everything currently riding on the next coin flip.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GambleSelection {
    pub stakes: Vec<GambleStake>,
    pub coins: i64,
    pub all_in: bool,
}

impl GambleSelection {
    pub fn is_empty(&self) -> bool {
        self.stakes.is_empty() && self.coins == 0
    }

    /// Total sell value of everything staked.
    pub fn value(&self) -> i64 {
        let mut total = self.coins;
        for stake in &self.stakes {
            let unit = match stake.kind {
                StakeKind::Item => catalog::item_sell_value(&stake.name),
                StakeKind::Potion => catalog::potion_sell_value(&stake.name),
            };
            total += unit * stake.amount as i64;
        }
        total
    }
}

/// Lifetime and per-life counters surfaced on the stats screen.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GameStats {
    pub lifetime_coins: i64,
    pub crates_opened: u64,
    /// Shop value of every crate opened
    pub total_crate_value: i64,
    /// Sell value of everything pulled from crates
    pub total_pull_value: i64,
    pub total_gambled_value: i64,
    pub total_won_value: i64,
    pub gambles_won: u64,
    pub gambles_lost: u64,
    pub brawls_won: u64,
    pub rebirths: u64,
}

/// The whole game. Logic modules take `&mut GameState` and mutate it
/// synchronously; nothing in here is shared or global.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub save_id: String,
    pub created_at: i64,
    pub last_save_time: i64,
    #[serde(default)]
    pub play_time_seconds: u64,

    pub coins: i64,
    /// Owned item counts by name. Entries may be zero.
    pub inventory: BTreeMap<String, u32>,
    pub potions: BTreeMap<String, u32>,
    pub crate_counts: BTreeMap<CrateType, u32>,
    pub unlocked_crates: BTreeSet<CrateType>,
    /// Append-once discovery lists, in discovery order.
    pub discovered_items: Vec<String>,
    pub discovered_potions: Vec<String>,

    pub equipped_weapon: Option<String>,
    pub equipped_armor: Option<String>,
    pub active_boosts: BTreeMap<BoostKind, ActiveBoost>,

    /// Seconds until the next free crate spawns.
    pub free_crate_timer: f64,
    /// Delay applied after the next spawn; grows until claimed.
    pub next_crate_delay: f64,
    pub free_crates_to_claim: Vec<CrateType>,

    pub gamble: GambleSelection,
    #[serde(default)]
    pub gamble_insurance_used: bool,
    #[serde(default)]
    pub coin_flip_redos: u32,

    /// Highest stage index cleared per tavern; -1 before any clear.
    pub brawl_progress: BTreeMap<BrawlRarity, i32>,
    /// Epoch-millisecond deadlines before each tavern reopens.
    pub brawl_cooldowns: BTreeMap<BrawlRarity, i64>,
    pub taverns_beaten: BTreeSet<BrawlRarity>,
    /// Live encounter; abandoned rather than persisted.
    #[serde(skip)]
    pub active_brawl: Option<BrawlState>,

    pub rebirth_tokens: u32,
    pub rebirth_upgrades: BTreeMap<UpgradeId, u32>,

    #[serde(default)]
    pub stats: GameStats,

    /// Pending toasts for the UI; drained on render, never persisted.
    #[serde(skip)]
    pub notifications: VecDeque<Notification>,
}

impl GameState {
    pub fn new(now: i64) -> Self {
        let mut crate_counts = BTreeMap::new();
        crate_counts.insert(CrateType::Standard(CrateTier::Basic), 5);

        GameState {
            save_id: uuid::Uuid::new_v4().to_string(),
            created_at: now,
            last_save_time: now,
            play_time_seconds: 0,
            coins: 0,
            inventory: BTreeMap::new(),
            potions: BTreeMap::new(),
            crate_counts,
            unlocked_crates: Self::default_unlocks(),
            discovered_items: Vec::new(),
            discovered_potions: Vec::new(),
            equipped_weapon: None,
            equipped_armor: None,
            active_boosts: BTreeMap::new(),
            free_crate_timer: FREE_CRATE_INITIAL_TIMER,
            next_crate_delay: FREE_CRATE_INITIAL_DELAY,
            free_crates_to_claim: Vec::new(),
            gamble: GambleSelection::default(),
            gamble_insurance_used: false,
            coin_flip_redos: 0,
            brawl_progress: BrawlRarity::all().iter().map(|r| (*r, -1)).collect(),
            brawl_cooldowns: BTreeMap::new(),
            taverns_beaten: BTreeSet::new(),
            active_brawl: None,
            rebirth_tokens: 0,
            rebirth_upgrades: BTreeMap::new(),
            stats: GameStats::default(),
            notifications: VecDeque::new(),
        }
    }

    /// Crates available from the start: the basic tier and every
    /// common specialized crate.
    pub fn default_unlocks() -> BTreeSet<CrateType> {
        use crate::items::types::Rarity;
        use crate::loot::types::CrateCategory;
        let mut set = BTreeSet::new();
        set.insert(CrateType::Standard(CrateTier::Basic));
        for cat in [CrateCategory::Weapon, CrateCategory::Armor, CrateCategory::Potion] {
            set.insert(CrateType::Specialized(cat, Rarity::Common));
        }
        set
    }

    pub fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        self.notifications.push_back(Notification {
            message: message.into(),
            kind,
        });
        while self.notifications.len() > MAX_NOTIFICATIONS {
            self.notifications.pop_front();
        }
    }

    pub fn item_count(&self, name: &str) -> u32 {
        self.inventory.get(name).copied().unwrap_or(0)
    }

    pub fn potion_count(&self, name: &str) -> u32 {
        self.potions.get(name).copied().unwrap_or(0)
    }

    pub fn crate_count(&self, crate_type: CrateType) -> u32 {
        self.crate_counts.get(&crate_type).copied().unwrap_or(0)
    }

    pub fn add_item(&mut self, name: &str, amount: u32) {
        *self.inventory.entry(name.to_string()).or_insert(0) += amount;
        if !self.discovered_items.iter().any(|n| n == name) {
            self.discovered_items.push(name.to_string());
        }
    }

    pub fn add_potion(&mut self, name: &str, amount: u32) {
        *self.potions.entry(name.to_string()).or_insert(0) += amount;
        if !self.discovered_potions.iter().any(|n| n == name) {
            self.discovered_potions.push(name.to_string());
        }
    }

    pub fn add_crate(&mut self, crate_type: CrateType, amount: u32) {
        *self.crate_counts.entry(crate_type).or_insert(0) += amount;
    }

    pub fn upgrade_tier(&self, id: UpgradeId) -> u32 {
        self.rebirth_upgrades.get(&id).copied().unwrap_or(0)
    }

    /// Active boost of the given kind, if its timer has not run out.
    pub fn active_boost(&self, kind: BoostKind) -> Option<&ActiveBoost> {
        self.active_boosts.get(&kind).filter(|b| b.time_left > 0)
    }

    /// Combined luck percentage from stacked luck potions.
    pub fn luck_value(&self) -> f64 {
        match self.active_boost(BoostKind::LuckBoost) {
            Some(boost) => match boost.effect {
                PotionEffect::LuckBoost { value, .. } => value * boost.stacks as f64,
                _ => 0.0,
            },
            None => 0.0,
        }
    }

    pub fn lebron_hunter_bonus(&self) -> f64 {
        match self.active_boost(BoostKind::LebronHunter) {
            Some(boost) => match boost.effect {
                PotionEffect::LebronHunter { chance_increase, .. } => chance_increase,
                _ => 0.0,
            },
            None => 0.0,
        }
    }

    /// Merchant's Elixir modifiers as (buy discount, sell bonus).
    pub fn merchant_wisdom(&self) -> (f64, f64) {
        match self.active_boost(BoostKind::MerchantWisdom) {
            Some(boost) => match boost.effect {
                PotionEffect::MerchantWisdom {
                    buy_discount,
                    sell_bonus,
                    ..
                } => (buy_discount, sell_bonus),
                _ => (0.0, 0.0),
            },
            None => (0.0, 0.0),
        }
    }

    /// High Stakes multipliers as (win, loss), if active.
    pub fn high_stakes(&self) -> Option<(f64, f64)> {
        match self.active_boost(BoostKind::HighStakes)?.effect {
            PotionEffect::HighStakes {
                win_multiplier,
                loss_multiplier,
                ..
            } => Some((win_multiplier, loss_multiplier)),
            _ => None,
        }
    }

    pub fn phantom_veil_active(&self) -> bool {
        self.active_boost(BoostKind::PhantomVeil).is_some()
    }

    pub fn auto_claim_active(&self) -> bool {
        self.active_boost(BoostKind::AutoClaim).is_some()
    }

    /// Elixir of Life payload as (per-turn regen, victory coin bonus).
    pub fn immortality(&self) -> Option<(i64, f64)> {
        match self.active_boost(BoostKind::Immortality)?.effect {
            PotionEffect::Immortality {
                hp_regen,
                coin_bonus,
                ..
            } => Some((hp_regen, coin_bonus)),
            _ => None,
        }
    }

    /// Coins plus the sell value of everything owned or staked.
    pub fn net_worth(&self) -> i64 {
        let mut total = self.coins + self.gamble.coins;
        for (name, count) in &self.inventory {
            if *count > 0 {
                total += catalog::item_sell_value(name) * *count as i64;
            }
        }
        for (name, count) in &self.potions {
            if *count > 0 {
                total += catalog::potion_sell_value(name) * *count as i64;
            }
        }
        for stake in &self.gamble.stakes {
            let unit = match stake.kind {
                StakeKind::Item => catalog::item_sell_value(&stake.name),
                StakeKind::Potion => catalog::potion_sell_value(&stake.name),
            };
            total += unit * stake.amount as i64;
        }
        total
    }
}
