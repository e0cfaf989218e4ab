use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::constants::MAX_BRAWL_LOG;
use crate::loot::types::CrateType;

/// The four taverns, in unlock order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BrawlRarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

/// Requirement for a tavern to appear on the selection screen.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TavernUnlock {
    None,
    NetWorth(i64),
    Rebirths(u64),
}

impl BrawlRarity {
    pub fn all() -> [BrawlRarity; 4] {
        [
            BrawlRarity::Common,
            BrawlRarity::Rare,
            BrawlRarity::Epic,
            BrawlRarity::Legendary,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            BrawlRarity::Common => "common",
            BrawlRarity::Rare => "rare",
            BrawlRarity::Epic => "epic",
            BrawlRarity::Legendary => "legendary",
        }
    }

    pub fn tavern_name(&self) -> &'static str {
        match self {
            BrawlRarity::Common => "The Salty Spitoon",
            BrawlRarity::Rare => "The Tipsy Kobold",
            BrawlRarity::Epic => "The Gilded Goblet",
            BrawlRarity::Legendary => "The Wyrm's Breath Inn",
        }
    }

    pub fn unlock(&self) -> TavernUnlock {
        match self {
            BrawlRarity::Common => TavernUnlock::None,
            BrawlRarity::Rare => TavernUnlock::NetWorth(100),
            BrawlRarity::Epic => TavernUnlock::NetWorth(500),
            BrawlRarity::Legendary => TavernUnlock::Rebirths(1),
        }
    }

    /// Cooldown range in minutes after any brawl at this tavern.
    pub fn cooldown_minutes(&self) -> (f64, f64) {
        match self {
            BrawlRarity::Common => (1.0, 5.0),
            BrawlRarity::Rare => (5.0, 10.0),
            BrawlRarity::Epic => (10.0, 20.0),
            BrawlRarity::Legendary => (20.0, 60.0),
        }
    }
}

/// A status effect on a combatant. Carried alongside a remaining-turn
/// counter in an [`EffectSet`].
///
/// `DefenseUp` and `DefenseDown` are applied by abilities and shown in
/// the UI but have no bearing on the damage math; only attack-side
/// modifiers and the player's own boosts do.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Effect {
    Poison { damage: i64 },
    Burn { damage: i64 },
    Bleed { damage: i64 },
    Cursed { damage: i64 },
    Stun,
    /// Opponent winding up a charged attack.
    Charging { multiplier: f64 },
    AttackUp { multiplier: f64 },
    DefenseUp { multiplier: f64 },
    AttackDown { multiplier: f64 },
    DefenseDown { multiplier: f64 },
    DamageBoost { multiplier: f64 },
    DefenseBoost { multiplier: f64 },
    GuaranteedCrit,
    MaxHpBoost { amount: i64 },
    /// Next player attack transfers a poison DoT to the opponent.
    ApplyPoison { damage: i64, duration: i32 },
    Berserk { damage_multiplier: f64, defense_multiplier: f64 },
    Lifesteal { fraction: f64 },
    /// One-shot bonus to the next escape attempt.
    RunBoost { bonus: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    Poison,
    Burn,
    Bleed,
    Cursed,
    Stun,
    Charging,
    AttackUp,
    DefenseUp,
    AttackDown,
    DefenseDown,
    DamageBoost,
    DefenseBoost,
    GuaranteedCrit,
    MaxHpBoost,
    ApplyPoison,
    Berserk,
    Lifesteal,
    RunBoost,
}

impl Effect {
    pub fn kind(&self) -> EffectKind {
        match self {
            Effect::Poison { .. } => EffectKind::Poison,
            Effect::Burn { .. } => EffectKind::Burn,
            Effect::Bleed { .. } => EffectKind::Bleed,
            Effect::Cursed { .. } => EffectKind::Cursed,
            Effect::Stun => EffectKind::Stun,
            Effect::Charging { .. } => EffectKind::Charging,
            Effect::AttackUp { .. } => EffectKind::AttackUp,
            Effect::DefenseUp { .. } => EffectKind::DefenseUp,
            Effect::AttackDown { .. } => EffectKind::AttackDown,
            Effect::DefenseDown { .. } => EffectKind::DefenseDown,
            Effect::DamageBoost { .. } => EffectKind::DamageBoost,
            Effect::DefenseBoost { .. } => EffectKind::DefenseBoost,
            Effect::GuaranteedCrit => EffectKind::GuaranteedCrit,
            Effect::MaxHpBoost { .. } => EffectKind::MaxHpBoost,
            Effect::ApplyPoison { .. } => EffectKind::ApplyPoison,
            Effect::Berserk { .. } => EffectKind::Berserk,
            Effect::Lifesteal { .. } => EffectKind::Lifesteal,
            Effect::RunBoost { .. } => EffectKind::RunBoost,
        }
    }

    /// Per-turn damage for damage-over-time effects.
    pub fn dot_damage(&self) -> Option<i64> {
        match self {
            Effect::Poison { damage }
            | Effect::Burn { damage }
            | Effect::Bleed { damage }
            | Effect::Cursed { damage } => Some(*damage),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self.kind() {
            EffectKind::Poison => "poison",
            EffectKind::Burn => "burn",
            EffectKind::Bleed => "bleed",
            EffectKind::Cursed => "curse",
            EffectKind::Stun => "stun",
            EffectKind::Charging => "charging",
            EffectKind::AttackUp => "attack up",
            EffectKind::DefenseUp => "defense up",
            EffectKind::AttackDown => "attack down",
            EffectKind::DefenseDown => "defense down",
            EffectKind::DamageBoost => "damage boost",
            EffectKind::DefenseBoost => "defense boost",
            EffectKind::GuaranteedCrit => "guaranteed crit",
            EffectKind::MaxHpBoost => "max hp boost",
            EffectKind::ApplyPoison => "venomed weapon",
            EffectKind::Berserk => "berserk",
            EffectKind::Lifesteal => "lifesteal",
            EffectKind::RunBoost => "run boost",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActiveEffect {
    pub effect: Effect,
    pub turns: i32,
}

/// Status effects on one combatant, at most one per kind. Iteration
/// follows application order, which matters for damage-over-time
/// processing.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EffectSet(Vec<ActiveEffect>);

impl EffectSet {
    pub fn new() -> Self {
        EffectSet(Vec::new())
    }

    /// Apply an effect, replacing any existing effect of the same kind
    /// in place.
    pub fn apply(&mut self, effect: Effect, turns: i32) {
        let kind = effect.kind();
        match self.0.iter_mut().find(|e| e.effect.kind() == kind) {
            Some(existing) => *existing = ActiveEffect { effect, turns },
            None => self.0.push(ActiveEffect { effect, turns }),
        }
    }

    pub fn get(&self, kind: EffectKind) -> Option<&ActiveEffect> {
        self.0.iter().find(|e| e.effect.kind() == kind)
    }

    pub fn contains(&self, kind: EffectKind) -> bool {
        self.get(kind).is_some()
    }

    pub fn remove(&mut self, kind: EffectKind) -> Option<ActiveEffect> {
        let idx = self.0.iter().position(|e| e.effect.kind() == kind)?;
        Some(self.0.remove(idx))
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveEffect> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ActiveEffect> {
        self.0.iter_mut()
    }

    pub fn retain(&mut self, f: impl FnMut(&ActiveEffect) -> bool) {
        self.0.retain(f);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn at(&self, idx: usize) -> Option<&ActiveEffect> {
        self.0.get(idx)
    }

    pub fn at_mut(&mut self, idx: usize) -> Option<&mut ActiveEffect> {
        self.0.get_mut(idx)
    }

    pub fn remove_at(&mut self, idx: usize) -> ActiveEffect {
        self.0.remove(idx)
    }
}

/// Which stat an opponent buff or debuff targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuffStat {
    Attack,
    Defense,
}

/// One opponent ability, dispatched by tag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AbilityKind {
    Shield { value: i64 },
    HeavyHit { multiplier: f64 },
    LifestealHit { fraction: f64 },
    MultiHit { hits: u32 },
    Burn { damage: i64, turns: i32 },
    Bleed { damage: i64, turns: i32 },
    StunChance,
    Buff { stat: BuffStat, value: f64, turns: i32 },
    Debuff { stat: BuffStat, value: f64, turns: i32 },
    ChargeAttack { multiplier: f64 },
    Heal { amount: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ability {
    pub kind: AbilityKind,
    /// Chance to fire when off cooldown, rolled each turn.
    pub chance: f64,
    pub cooldown: i32,
    pub current_cooldown: i32,
}

impl Ability {
    pub fn new(kind: AbilityKind, chance: f64, cooldown: i32) -> Self {
        Ability {
            kind,
            chance,
            cooldown,
            current_cooldown: 0,
        }
    }
}

/// A random drop line in a reward table.
#[derive(Debug, Clone, PartialEq)]
pub struct RewardDrop {
    pub pool: Vec<&'static str>,
    pub chance: f64,
    pub amount: (u32, u32),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrateDrop {
    pub crate_type: CrateType,
    pub chance: f64,
    pub amount: (u32, u32),
}

/// Static reward table attached to an opponent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RewardTable {
    pub coins: Option<(i64, i64)>,
    pub items: Vec<RewardDrop>,
    pub potions: Vec<RewardDrop>,
    pub crates: Vec<CrateDrop>,
}

/// A reward earned during a run, held until settlement.
#[derive(Debug, Clone, PartialEq)]
pub enum BrawlReward {
    Coins { amount: i64 },
    Item { name: String, amount: u32 },
    Potion { name: String, amount: u32 },
    Crate { crate_type: CrateType, amount: u32 },
}

/// A loaded opponent instance. Built from the static tier tables, with
/// overflow scaling already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct Opponent {
    pub name: String,
    pub emoji: &'static str,
    pub max_health: i64,
    pub damage_range: (i64, i64),
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub abilities: Vec<Ability>,
    pub rewards: RewardTable,
    pub is_boss: bool,
}

/// How a finished encounter ended. Drives the settlement screen and
/// what happens on close.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrawlOutcome {
    /// Stage beaten, more to go; close advances to the next stage.
    StageClear,
    /// Stage 30 beaten; the tavern is conquered.
    Conquered,
    Defeated,
    Escaped,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrawlPhase {
    PlayerTurn,
    Settlement(BrawlOutcome),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrawlLogKind {
    Normal,
    Crit,
    Special,
    Status,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BrawlLogEntry {
    pub message: String,
    pub kind: BrawlLogKind,
}

/// Live state of one brawl run. Never persisted; abandoning the
/// program abandons the run.
#[derive(Debug, Clone, PartialEq)]
pub struct BrawlState {
    pub rarity: BrawlRarity,
    /// 0-indexed stage within the tavern.
    pub stage: u32,
    pub phase: BrawlPhase,

    pub player_health: i64,
    pub player_max_health: i64,
    pub player_shield: i64,
    pub player_stamina: i64,
    pub player_max_stamina: i64,
    pub consecutive_shields: u32,
    pub player_effects: EffectSet,

    pub opponent: Opponent,
    pub opponent_health: i64,
    pub opponent_shield: i64,
    pub opponent_effects: EffectSet,

    /// Accumulated across stages, granted only at settlement close.
    pub rewards: Vec<BrawlReward>,
    /// Penalty text computed on defeat, for the settlement screen.
    pub penalty_summary: Option<String>,
    pub log: VecDeque<BrawlLogEntry>,
}

impl BrawlState {
    pub fn push_log(&mut self, message: impl Into<String>, kind: BrawlLogKind) {
        self.log.push_front(BrawlLogEntry {
            message: message.into(),
            kind,
        });
        while self.log.len() > MAX_BRAWL_LOG {
            self.log.pop_back();
        }
    }

    /// Merge a reward into the accumulated list, combining with an
    /// existing line of the same kind and name.
    pub fn merge_reward(&mut self, reward: BrawlReward) {
        for existing in &mut self.rewards {
            match (existing, &reward) {
                (BrawlReward::Coins { amount }, BrawlReward::Coins { amount: add }) => {
                    *amount += add;
                    return;
                }
                (
                    BrawlReward::Item { name, amount },
                    BrawlReward::Item { name: n, amount: add },
                ) if name == n => {
                    *amount += add;
                    return;
                }
                (
                    BrawlReward::Potion { name, amount },
                    BrawlReward::Potion { name: n, amount: add },
                ) if name == n => {
                    *amount += add;
                    return;
                }
                (
                    BrawlReward::Crate { crate_type, amount },
                    BrawlReward::Crate { crate_type: ct, amount: add },
                ) if crate_type == ct => {
                    *amount += add;
                    return;
                }
                _ => {}
            }
        }
        self.rewards.push(reward);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_set_replaces_same_kind() {
        let mut set = EffectSet::new();
        set.apply(Effect::Burn { damage: 5 }, 3);
        set.apply(Effect::Burn { damage: 10 }, 2);
        let burn = set.get(EffectKind::Burn).unwrap();
        assert_eq!(burn.effect, Effect::Burn { damage: 10 });
        assert_eq!(burn.turns, 2);
    }

    #[test]
    fn test_effect_set_keeps_application_order() {
        let mut set = EffectSet::new();
        set.apply(Effect::Poison { damage: 2 }, 3);
        set.apply(Effect::Burn { damage: 4 }, 3);
        set.apply(Effect::Stun, 1);
        let kinds: Vec<EffectKind> = set.iter().map(|e| e.effect.kind()).collect();
        assert_eq!(
            kinds,
            vec![EffectKind::Poison, EffectKind::Burn, EffectKind::Stun]
        );
    }

    #[test]
    fn test_dot_damage_only_for_dots() {
        assert_eq!(Effect::Cursed { damage: 5 }.dot_damage(), Some(5));
        assert_eq!(Effect::Stun.dot_damage(), None);
        assert_eq!(
            Effect::Charging { multiplier: 2.0 }.dot_damage(),
            None
        );
    }

    #[test]
    fn test_reward_merge_combines_matching_lines() {
        let mut brawl = BrawlState {
            rarity: BrawlRarity::Common,
            stage: 0,
            phase: BrawlPhase::PlayerTurn,
            player_health: 100,
            player_max_health: 100,
            player_shield: 0,
            player_stamina: 100,
            player_max_stamina: 100,
            consecutive_shields: 0,
            player_effects: EffectSet::new(),
            opponent: Opponent {
                name: "Test Dummy".to_string(),
                emoji: "🎯",
                max_health: 10,
                damage_range: (1, 2),
                crit_chance: 0.0,
                crit_multiplier: 1.5,
                abilities: Vec::new(),
                rewards: RewardTable::default(),
                is_boss: false,
            },
            opponent_health: 10,
            opponent_shield: 0,
            opponent_effects: EffectSet::new(),
            rewards: Vec::new(),
            penalty_summary: None,
            log: VecDeque::new(),
        };

        brawl.merge_reward(BrawlReward::Coins { amount: 5 });
        brawl.merge_reward(BrawlReward::Coins { amount: 7 });
        brawl.merge_reward(BrawlReward::Item {
            name: "Broken Bottle".to_string(),
            amount: 1,
        });
        brawl.merge_reward(BrawlReward::Item {
            name: "Broken Bottle".to_string(),
            amount: 2,
        });
        assert_eq!(brawl.rewards.len(), 2);
        assert_eq!(brawl.rewards[0], BrawlReward::Coins { amount: 12 });
        assert_eq!(
            brawl.rewards[1],
            BrawlReward::Item {
                name: "Broken Bottle".to_string(),
                amount: 3
            }
        );
    }

    #[test]
    fn test_tavern_unlock_ladder() {
        assert_eq!(BrawlRarity::Common.unlock(), TavernUnlock::None);
        assert_eq!(BrawlRarity::Rare.unlock(), TavernUnlock::NetWorth(100));
        assert_eq!(BrawlRarity::Legendary.unlock(), TavernUnlock::Rebirths(1));
    }
}
