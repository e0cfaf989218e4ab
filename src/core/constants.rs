// Game balance and tuning constants.
// Grouped by system; every magic number in the logic lives here.

// =============================================================================
// Persistence
// =============================================================================

/// Magic number identifying the save file format
pub const SAVE_VERSION_MAGIC: u64 = 0x484F415244_0001; // "HOARD" + format v1

/// Seconds between autosaves in the main loop
pub const AUTOSAVE_INTERVAL_SECS: u64 = 30;

// =============================================================================
// Free crate timer
// =============================================================================

/// Countdown on a fresh save before the first free crate
pub const FREE_CRATE_INITIAL_TIMER: f64 = 30.0;

/// Delay used for the first spawn cycle
pub const FREE_CRATE_INITIAL_DELAY: f64 = 35.0;

/// Each spawned crate pushes the next one this much further out
pub const FREE_CRATE_DELAY_STEP: f64 = 5.0;

/// Claiming resets the escalating delay back to this
pub const FREE_CRATE_RESET_DELAY: f64 = 30.0;

/// Unclaimed free crates beyond this are dropped, oldest first
pub const FREE_CRATE_QUEUE_CAP: usize = 100;

/// Per-tier speedup from the Speedy Crates upgrade
pub const SPEEDY_CRATES_RATE_PER_TIER: f64 = 0.25;

// =============================================================================
// Crates and loot
// =============================================================================

/// Chance for a legendary draw to upgrade into a mythical crate
pub const LEGENDARY_UPGRADE_CHANCE: f64 = 2.0;

/// Coins granted per crate opened with the Crate Bounties upgrade
pub const CRATE_BOUNTY_COINS: i64 = 5;

/// "Open All" costs one coin per this many crates (waived by Crate Bounties)
pub const OPEN_ALL_CRATES_PER_FEE_COIN: u32 = 5;

/// Per-tier shop discount from the Shop Haggler upgrade
pub const SHOP_HAGGLER_DISCOUNT_PER_TIER: f64 = 0.2;

/// Per-tier sell bonus from the Golden Touch upgrade
pub const GOLDEN_TOUCH_BONUS_PER_TIER: f64 = 0.25;

// =============================================================================
// Brawls
// =============================================================================

pub const PLAYER_MAX_HP: i64 = 100;
pub const PLAYER_MAX_STAMINA: i64 = 100;

/// Stamina cost of an attack
pub const ATTACK_STAMINA_COST: i64 = 20;

/// Shield action grants this much shield and stamina
pub const SHIELD_ACTION_SHIELD_GAIN: i64 = 15;
pub const SHIELD_ACTION_STAMINA_GAIN: i64 = 15;

/// Passive stamina regained at the end of every full round
pub const STAMINA_REGEN_PER_TURN: i64 = 10;

/// Unarmed attack damage before weapon and effect modifiers
pub const BASE_ATTACK_DAMAGE: i64 = 5;

pub const BASE_CRIT_CHANCE: f64 = 0.05;
pub const BASE_CRIT_MULTIPLIER: f64 = 1.5;

/// Chance to escape a brawl without a Smoke Bomb
pub const BASE_RUN_CHANCE: f64 = 0.5;

/// Stun chance applied on opponent crits and default for stun abilities
pub const OPPONENT_STUN_CHANCE: f64 = 0.25;

/// Fraction of pre-mitigation damage the Spiked Shield returns
pub const SPIKED_SHIELD_REFLECT_FRACTION: f64 = 0.20;

/// Warlock's Blade curse rider
pub const WARLOCK_CURSE_CHANCE: f64 = 0.25;
pub const WARLOCK_CURSE_DAMAGE: i64 = 5;
pub const WARLOCK_CURSE_TURNS: i32 = 3;

/// Each strike of a multi-hit lands at this fraction of a basic hit
pub const MULTI_HIT_DAMAGE_SCALE: f64 = 0.6;

/// Turns a charge attack spends winding up
pub const CHARGE_WINDUP_TURNS: i32 = 2;

/// Fraction of max HP healed when advancing to the next stage
pub const STAGE_ADVANCE_HEAL_FRACTION: f64 = 0.10;

/// Stages per tavern; clearing the last one conquers it
pub const TAVERN_FINAL_STAGE: u32 = 30;

/// 1-based stages guarded by bosses
pub const BOSS_STAGES: [u32; 6] = [5, 10, 15, 20, 25, 30];

/// Health/damage growth per stage past the end of the opponent pool
pub const OVERFLOW_SCALING_PER_STAGE: f64 = 0.2;

/// Reward multipliers for first clears vs repeat farming
pub const FIRST_CLEAR_COIN_MULTIPLIER: f64 = 1.5;
pub const FIRST_CLEAR_CHANCE_MULTIPLIER: f64 = 2.0;
pub const REPEAT_COIN_MULTIPLIER: f64 = 0.2;
pub const REPEAT_CHANCE_MULTIPLIER: f64 = 0.25;

/// Defeat costs this fraction of carried coins
pub const DEFEAT_COIN_LOSS_FRACTION: f64 = 0.10;

/// Net worth thresholds for the defeat item-loss ladder
pub const DEFEAT_NET_WORTH_HIGH: i64 = 5000;
pub const DEFEAT_NET_WORTH_MID: i64 = 1000;
pub const DEFEAT_NET_WORTH_LOW: i64 = 100;

/// Tavern Brawler upgrade: starting shield and per-turn HP regen by tier
pub const TAVERN_BRAWLER_SHIELD: [i64; 3] = [10, 25, 50];
pub const TAVERN_BRAWLER_REGEN_FRACTION: [f64; 3] = [0.02, 0.04, 0.06];

// =============================================================================
// Gambling
// =============================================================================

pub const COIN_FLIP_WIN_CHANCE: f64 = 0.5;

/// Win chance with the Weighted Coin upgrade
pub const WEIGHTED_COIN_WIN_CHANCE: f64 = 0.53;

/// Normal winnings multiplier (High Stakes replaces this outright)
pub const COIN_FLIP_WIN_MULTIPLIER: f64 = 2.0;

/// All-in flips pay triple on a fair coin
pub const ALL_IN_WIN_MULTIPLIER: f64 = 3.0;

/// Gamble Insurance refunds this fraction of the gambled value
pub const GAMBLE_INSURANCE_REFUND_FRACTION: f64 = 0.5;

// =============================================================================
// Rebirth
// =============================================================================

/// Net worth per rebirth token
pub const REBIRTH_TOKEN_DIVISOR: f64 = 100.0;

/// Net Worth Inflation upgrade bonus per tier
pub const NET_WORTH_INFLATION_BONUS: f64 = 0.15;

/// Coins granted at the start of a new life by Starting Capital tier
pub const STARTING_CAPITAL: [i64; 3] = [250, 750, 2000];

/// Basic crates granted at the start of every new life
pub const REBIRTH_STARTING_BASIC_CRATES: u32 = 5;

// =============================================================================
// UI queues
// =============================================================================

/// Bounded length of the notification queue
pub const MAX_NOTIFICATIONS: usize = 50;

/// Bounded length of the brawl combat log
pub const MAX_BRAWL_LOG: usize = 100;
