//! Rebirth: trade the current life's net worth for permanent upgrade
//! tokens, with a blackjack hand deciding whether the award is paid in
//! full or halved.

pub mod blackjack;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::constants::{
    FREE_CRATE_INITIAL_DELAY, FREE_CRATE_INITIAL_TIMER, NET_WORTH_INFLATION_BONUS,
    REBIRTH_STARTING_BASIC_CRATES, REBIRTH_TOKEN_DIVISOR, STARTING_CAPITAL,
};
use crate::core::game_state::{GameState, NotificationKind};
use crate::loot::types::{CrateTier, CrateType};

use self::blackjack::{BlackjackGame, BlackjackResult};

/// The permanent upgrades sold for rebirth tokens.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum UpgradeId {
    SpeedyCrates,
    CrateBounties,
    SecondChance,
    StartingCapital,
    GoldenTouch,
    ShopHaggler,
    GambleInsurance,
    NetWorthInflation,
    WeightedCoin,
    TavernBrawler,
}

impl UpgradeId {
    pub fn all() -> [UpgradeId; 10] {
        [
            UpgradeId::SpeedyCrates,
            UpgradeId::CrateBounties,
            UpgradeId::SecondChance,
            UpgradeId::StartingCapital,
            UpgradeId::GoldenTouch,
            UpgradeId::ShopHaggler,
            UpgradeId::GambleInsurance,
            UpgradeId::NetWorthInflation,
            UpgradeId::WeightedCoin,
            UpgradeId::TavernBrawler,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            UpgradeId::SpeedyCrates => "Speedy Crates",
            UpgradeId::CrateBounties => "Crate Bounties",
            UpgradeId::SecondChance => "Second Chance",
            UpgradeId::StartingCapital => "Starting Capital",
            UpgradeId::GoldenTouch => "Golden Touch",
            UpgradeId::ShopHaggler => "Shop Haggler",
            UpgradeId::GambleInsurance => "Gamble Insurance",
            UpgradeId::NetWorthInflation => "Net Worth Inflation",
            UpgradeId::WeightedCoin => "Weighted Coin",
            UpgradeId::TavernBrawler => "Tavern Brawler",
        }
    }

    pub fn max_tier(&self) -> u32 {
        match self {
            UpgradeId::SpeedyCrates => 2,
            UpgradeId::CrateBounties => 1,
            UpgradeId::SecondChance => 2,
            UpgradeId::StartingCapital => 3,
            UpgradeId::GoldenTouch => 3,
            UpgradeId::ShopHaggler => 2,
            UpgradeId::GambleInsurance => 1,
            UpgradeId::NetWorthInflation => 1,
            UpgradeId::WeightedCoin => 1,
            UpgradeId::TavernBrawler => 3,
        }
    }

    /// Token cost to go from `tier` to `tier + 1`. `None` past the cap.
    pub fn cost(&self, tier: u32) -> Option<u32> {
        let ladder: &[u32] = match self {
            UpgradeId::SpeedyCrates => &[10, 20],
            UpgradeId::CrateBounties => &[15],
            UpgradeId::SecondChance => &[20, 30],
            UpgradeId::StartingCapital => &[5, 10, 15],
            UpgradeId::GoldenTouch => &[10, 15, 20],
            UpgradeId::ShopHaggler => &[15, 25],
            UpgradeId::GambleInsurance => &[15],
            UpgradeId::NetWorthInflation => &[20],
            UpgradeId::WeightedCoin => &[25],
            UpgradeId::TavernBrawler => &[10, 20, 30],
        };
        ladder.get(tier as usize).copied()
    }

    pub fn description(&self, tier: u32) -> String {
        match self {
            UpgradeId::SpeedyCrates => format!(
                "Free crates generate {}% faster.",
                [25, 50].get(tier.wrapping_sub(1) as usize).unwrap_or(&0)
            ),
            UpgradeId::CrateBounties => {
                "Gain 5 coins every time you open a crate. Also makes \"Open All\" free."
                    .to_string()
            }
            UpgradeId::SecondChance => format!(
                "Once per life, if you lose a coin flip, you can try again for free. ({tier} uses)"
            ),
            UpgradeId::StartingCapital => format!(
                "Start each new life with {} coins.",
                STARTING_CAPITAL
                    .get(tier.wrapping_sub(1) as usize)
                    .unwrap_or(&0)
            ),
            UpgradeId::GoldenTouch => format!(
                "All items sell for {}% more coins.",
                [25, 50, 75].get(tier.wrapping_sub(1) as usize).unwrap_or(&0)
            ),
            UpgradeId::ShopHaggler => format!(
                "Crates purchased from the shop are {}% cheaper.",
                [20, 40].get(tier.wrapping_sub(1) as usize).unwrap_or(&0)
            ),
            UpgradeId::GambleInsurance => {
                "The first time you lose a coin flip each life, get 50% of the gambled value \
                 back in coins as a safety net."
                    .to_string()
            }
            UpgradeId::NetWorthInflation => {
                "Your Net Worth is considered 15% higher when calculating Rebirth Tokens."
                    .to_string()
            }
            UpgradeId::WeightedCoin => {
                "Permanently increase your coin flip win chance from 50% to 53%.".to_string()
            }
            UpgradeId::TavernBrawler => format!(
                "Start every brawl with {} shield and regenerate {}% of your max HP each turn.",
                [10, 25, 50].get(tier.wrapping_sub(1) as usize).unwrap_or(&0),
                [2, 4, 6].get(tier.wrapping_sub(1) as usize).unwrap_or(&0)
            ),
        }
    }
}

/// Spend tokens on the next tier of an upgrade.
pub fn buy_upgrade(state: &mut GameState, id: UpgradeId) -> bool {
    let tier = state.upgrade_tier(id);
    let cost = match id.cost(tier) {
        Some(cost) => cost,
        None => {
            state.notify("Already at max tier.", NotificationKind::Error);
            return false;
        }
    };
    if state.rebirth_tokens < cost {
        state.notify("Not enough rebirth tokens!", NotificationKind::Error);
        return false;
    }
    state.rebirth_tokens -= cost;
    state.rebirth_upgrades.insert(id, tier + 1);
    state.notify(
        format!("Purchased {} (tier {}).", id.name(), tier + 1),
        NotificationKind::Success,
    );
    true
}

/// Tokens a rebirth would award before the blackjack hand, from the
/// inflation-adjusted net worth.
pub fn potential_tokens(state: &GameState) -> u32 {
    base_tokens(state, state.net_worth())
}

fn base_tokens(state: &GameState, net_worth: i64) -> u32 {
    let inflation =
        1.0 + state.upgrade_tier(UpgradeId::NetWorthInflation) as f64 * NET_WORTH_INFLATION_BONUS;
    let effective = net_worth.max(0) as f64 * inflation;
    (effective / REBIRTH_TOKEN_DIVISOR).floor() as u32
}

/// A rebirth in progress: the net worth is locked in when the cards
/// come out, not when the hand ends.
#[derive(Debug, Clone)]
pub struct RebirthCeremony {
    pub net_worth_at_start: i64,
    pub game: BlackjackGame,
}

/// Validate and begin a rebirth. Requires a LeBron James and at least
/// one potential token.
pub fn start_rebirth(state: &mut GameState, rng: &mut impl Rng) -> Option<RebirthCeremony> {
    if potential_tokens(state) == 0 {
        state.notify(
            "Not enough Net Worth for a single token!",
            NotificationKind::Error,
        );
        return None;
    }
    if state.item_count("LeBron James") < 1 {
        state.notify(
            "You must have LeBron James in your inventory to rebirth!",
            NotificationKind::Error,
        );
        return None;
    }
    Some(RebirthCeremony {
        net_worth_at_start: state.net_worth(),
        game: BlackjackGame::new(rng),
    })
}

/// Credit the token award once the hand is decided.
pub fn award_tokens(
    state: &mut GameState,
    ceremony: &RebirthCeremony,
    result: BlackjackResult,
) -> u32 {
    let base = base_tokens(state, ceremony.net_worth_at_start);
    let gained = if result.full_tokens() { base } else { base / 2 };
    state.rebirth_tokens += gained;
    state.notify(result.message(), NotificationKind::Info);
    gained
}

/// Reset the life. Upgrades, tokens and lifetime stats survive;
/// everything else returns to a fresh start, plus Starting Capital.
pub fn finish_rebirth(state: &mut GameState) {
    state.stats.rebirths += 1;

    let capital_tier = state.upgrade_tier(UpgradeId::StartingCapital) as usize;
    state.coins = if capital_tier > 0 {
        STARTING_CAPITAL[capital_tier - 1]
    } else {
        0
    };

    state.inventory.clear();
    state.potions.clear();
    state.crate_counts.clear();
    state.crate_counts.insert(
        CrateType::Standard(CrateTier::Basic),
        REBIRTH_STARTING_BASIC_CRATES,
    );
    state.unlocked_crates = GameState::default_unlocks();
    state.discovered_items.clear();
    state.discovered_potions.clear();

    state.equipped_weapon = None;
    state.equipped_armor = None;
    state.active_boosts.clear();

    state.free_crate_timer = FREE_CRATE_INITIAL_TIMER;
    state.next_crate_delay = FREE_CRATE_INITIAL_DELAY;
    state.free_crates_to_claim.clear();

    state.gamble = Default::default();
    state.gamble_insurance_used = false;
    state.coin_flip_redos = state.upgrade_tier(UpgradeId::SecondChance);

    state.brawl_progress = crate::brawl::types::BrawlRarity::all()
        .iter()
        .map(|r| (*r, -1))
        .collect();
    state.brawl_cooldowns.clear();
    state.taverns_beaten.clear();
    state.active_brawl = None;

    state.notify("Rebirth successful!", NotificationKind::Success);
}
