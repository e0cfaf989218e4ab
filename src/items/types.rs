use serde::{Deserialize, Serialize};

use crate::loot::types::CrateType;

/// Item quality tiers, lowest to highest sell value.
///
/// `Lebron` is a one-item tier above everything else; it only ever
/// resolves to "LeBron James".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
    Mythical,
    Lebron,
}

impl Rarity {
    pub fn label(&self) -> &'static str {
        match self {
            Rarity::Common => "common",
            Rarity::Rare => "rare",
            Rarity::Epic => "epic",
            Rarity::Legendary => "legendary",
            Rarity::Mythical => "mythical",
            Rarity::Lebron => "lebron",
        }
    }

    /// Base coin value when selling an item of this rarity.
    pub fn sell_value(&self) -> i64 {
        match self {
            Rarity::Common => 1,
            Rarity::Rare => 5,
            Rarity::Epic => 20,
            Rarity::Legendary => 100,
            Rarity::Mythical => 500,
            Rarity::Lebron => 1000,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Good,
    Ingredient,
    Weapon,
    Armor,
    Consumable,
}

/// Static definition of a single item in the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemDef {
    pub name: &'static str,
    pub rarity: Rarity,
    pub category: ItemCategory,
    pub emoji: &'static str,
    /// Weapon damage added to the base attack. Zero for non-weapons.
    pub damage: i64,
    /// Fractional damage reduction while equipped. Zero for non-armor.
    pub defense: f64,
    pub crit_chance_bonus: f64,
    pub crit_multiplier_bonus: f64,
}

impl ItemDef {
    /// Coin value when sold. Weapons and armor fetch five times the
    /// rarity base; ingredients have a flat price; explicit overrides
    /// win over everything.
    pub fn sell_value(&self) -> i64 {
        if let Some(v) = crate::items::catalog::item_sell_override(self.name) {
            return v;
        }
        if self.category == ItemCategory::Ingredient {
            return 50;
        }
        let base = self.rarity.sell_value();
        match self.category {
            ItemCategory::Weapon | ItemCategory::Armor => base * 5,
            _ => base,
        }
    }
}

/// Effect payload carried by a potion definition.
///
/// `Brawl*` variants are only usable mid-brawl; the timed overworld
/// variants become an [`ActiveBoost`] keyed by [`BoostKind`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PotionEffect {
    LuckBoost { value: f64, duration: u32, max_stacks: u32 },
    InstantCrates { crate_type: CrateType, amount: u32 },
    WildMagic { min: i64, max: i64, duration: u32 },
    TimeSkip { minutes: u32 },
    AutoClaim { duration: u32 },
    MerchantWisdom { buy_discount: f64, sell_bonus: f64, duration: u32 },
    HighStakes { win_multiplier: f64, loss_multiplier: f64, duration: u32 },
    LebronHunter { chance_increase: f64, duration: u32 },
    PhantomVeil { duration: u32 },
    Immortality { duration: u32, hp_regen: i64, coin_bonus: f64 },
    BrawlHeal { amount: i64 },
    BrawlStaminaRestore { amount: i64 },
    BrawlDamageBoost { multiplier: f64, turns: i32 },
    BrawlDefenseBoost { multiplier: f64, turns: i32 },
    BrawlGuaranteedCrit,
    BrawlMaxHpBoost { amount: i64, turns: i32 },
    BrawlApplyPoison { damage: i64, turns: i32 },
    BrawlBerserk { damage_multiplier: f64, defense_multiplier: f64, turns: i32 },
    BrawlLifesteal { fraction: f64, turns: i32 },
}

impl PotionEffect {
    pub fn is_brawl_only(&self) -> bool {
        matches!(
            self,
            PotionEffect::BrawlHeal { .. }
                | PotionEffect::BrawlStaminaRestore { .. }
                | PotionEffect::BrawlDamageBoost { .. }
                | PotionEffect::BrawlDefenseBoost { .. }
                | PotionEffect::BrawlGuaranteedCrit
                | PotionEffect::BrawlMaxHpBoost { .. }
                | PotionEffect::BrawlApplyPoison { .. }
                | PotionEffect::BrawlBerserk { .. }
                | PotionEffect::BrawlLifesteal { .. }
        )
    }

    /// The boost slot this effect occupies while active, if it is a
    /// timed overworld effect.
    pub fn boost_kind(&self) -> Option<BoostKind> {
        match self {
            PotionEffect::LuckBoost { .. } => Some(BoostKind::LuckBoost),
            PotionEffect::WildMagic { .. } => Some(BoostKind::WildMagic),
            PotionEffect::AutoClaim { .. } => Some(BoostKind::AutoClaim),
            PotionEffect::MerchantWisdom { .. } => Some(BoostKind::MerchantWisdom),
            PotionEffect::HighStakes { .. } => Some(BoostKind::HighStakes),
            PotionEffect::LebronHunter { .. } => Some(BoostKind::LebronHunter),
            PotionEffect::PhantomVeil { .. } => Some(BoostKind::PhantomVeil),
            PotionEffect::Immortality { .. } => Some(BoostKind::Immortality),
            _ => None,
        }
    }

    /// Duration in seconds for timed overworld effects.
    pub fn duration(&self) -> Option<u32> {
        match self {
            PotionEffect::LuckBoost { duration, .. }
            | PotionEffect::WildMagic { duration, .. }
            | PotionEffect::AutoClaim { duration }
            | PotionEffect::MerchantWisdom { duration, .. }
            | PotionEffect::HighStakes { duration, .. }
            | PotionEffect::LebronHunter { duration, .. }
            | PotionEffect::PhantomVeil { duration }
            | PotionEffect::Immortality { duration, .. } => Some(*duration),
            _ => None,
        }
    }

    pub fn max_stacks(&self) -> u32 {
        match self {
            PotionEffect::LuckBoost { max_stacks, .. } => *max_stacks,
            _ => 1,
        }
    }
}

/// Slot key for a timed overworld boost. One boost per kind; drinking
/// more of the same kind stacks or extends, it never coexists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum BoostKind {
    LuckBoost,
    WildMagic,
    AutoClaim,
    MerchantWisdom,
    HighStakes,
    LebronHunter,
    PhantomVeil,
    Immortality,
}

/// A timed boost currently affecting the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActiveBoost {
    /// Potion that granted the boost, for display.
    pub potion: String,
    pub effect: PotionEffect,
    /// Seconds remaining; the tick loop decrements this.
    pub time_left: u32,
    pub stacks: u32,
}

/// Static definition of a potion in the catalog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PotionDef {
    pub name: &'static str,
    pub rarity: Rarity,
    pub emoji: &'static str,
    pub sell_value: i64,
    pub effect: PotionEffect,
}

impl PotionDef {
    /// Potions sell for double their listed value.
    pub fn coin_sell_value(&self) -> i64 {
        self.sell_value * 2
    }
}

/// What a consumable item does when used during a brawl.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BrawlItemEffect {
    Heal(i64),
    Damage(i64),
    /// Additive bonus to the next run attempt; does not spend the turn.
    RunBoost(f64),
    Shield(i64),
    StaminaRestore(i64),
}
