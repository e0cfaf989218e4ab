use serde::{Deserialize, Serialize};

use crate::items::types::Rarity;

/// The five standard crate tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrateTier {
    Basic,
    Rare,
    Epic,
    Legendary,
    Mythical,
}

impl CrateTier {
    pub fn label(&self) -> &'static str {
        match self {
            CrateTier::Basic => "basic",
            CrateTier::Rare => "rare",
            CrateTier::Epic => "epic",
            CrateTier::Legendary => "legendary",
            CrateTier::Mythical => "mythical",
        }
    }

    /// Shop price for the tier.
    pub fn shop_value(&self) -> i64 {
        match self {
            CrateTier::Basic => 5,
            CrateTier::Rare => 20,
            CrateTier::Epic => 75,
            CrateTier::Legendary => 200,
            CrateTier::Mythical => 1000,
        }
    }

    /// The tier a standard crate produced at this rarity belongs to.
    pub fn from_rarity(rarity: Rarity) -> Option<CrateTier> {
        match rarity {
            Rarity::Common => Some(CrateTier::Basic),
            Rarity::Rare => Some(CrateTier::Rare),
            Rarity::Epic => Some(CrateTier::Epic),
            Rarity::Legendary => Some(CrateTier::Legendary),
            Rarity::Mythical => Some(CrateTier::Mythical),
            Rarity::Lebron => None,
        }
    }
}

/// Item class a specialized crate is locked to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CrateCategory {
    Weapon,
    Armor,
    Potion,
}

impl CrateCategory {
    pub fn label(&self) -> &'static str {
        match self {
            CrateCategory::Weapon => "weapon",
            CrateCategory::Armor => "armor",
            CrateCategory::Potion => "potion",
        }
    }
}

/// Every openable crate: a standard tier or a category crate pinned to
/// one rarity. Specialized crates never carry the `lebron` rarity.
///
/// Serializes as the flat id (`basic`, `weapon_rare`) so crate counts
/// keyed by type stay readable in any serde format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CrateType {
    Standard(CrateTier),
    Specialized(CrateCategory, Rarity),
}

impl Serialize for CrateType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id())
    }
}

impl<'de> Deserialize<'de> for CrateType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let id = String::deserialize(deserializer)?;
        CrateType::from_id(&id)
            .ok_or_else(|| serde::de::Error::custom(format!("unknown crate id: {id}")))
    }
}

impl CrateType {
    /// Flat identifier, e.g. `basic` or `weapon_rare`.
    pub fn id(&self) -> String {
        match self {
            CrateType::Standard(tier) => tier.label().to_string(),
            CrateType::Specialized(cat, rarity) => format!("{}_{}", cat.label(), rarity.label()),
        }
    }

    pub fn from_id(id: &str) -> Option<CrateType> {
        if let Some((cat, rarity)) = id.split_once('_') {
            let cat = match cat {
                "weapon" => CrateCategory::Weapon,
                "armor" => CrateCategory::Armor,
                "potion" => CrateCategory::Potion,
                _ => return None,
            };
            let rarity = match rarity {
                "common" => Rarity::Common,
                "rare" => Rarity::Rare,
                "epic" => Rarity::Epic,
                "legendary" => Rarity::Legendary,
                "mythical" => Rarity::Mythical,
                _ => return None,
            };
            return Some(CrateType::Specialized(cat, rarity));
        }
        let tier = match id {
            "basic" => CrateTier::Basic,
            "rare" => CrateTier::Rare,
            "epic" => CrateTier::Epic,
            "legendary" => CrateTier::Legendary,
            "mythical" => CrateTier::Mythical,
            _ => return None,
        };
        Some(CrateType::Standard(tier))
    }

    pub fn display_name(&self) -> String {
        let id = self.id();
        let mut name = String::new();
        for word in id.split('_') {
            let mut chars = word.chars();
            if let Some(first) = chars.next() {
                name.push_str(&first.to_uppercase().to_string());
                name.push_str(chars.as_str());
            }
            name.push(' ');
        }
        name.push_str("Crate");
        name
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            CrateType::Standard(CrateTier::Basic) => "🎁",
            CrateType::Standard(CrateTier::Rare) => "📦",
            CrateType::Standard(CrateTier::Epic) => "💎",
            CrateType::Standard(CrateTier::Legendary) => "🌟",
            CrateType::Standard(CrateTier::Mythical) => "✨",
            CrateType::Specialized(CrateCategory::Weapon, _) => "⚔️",
            CrateType::Specialized(CrateCategory::Armor, _) => "🛡️",
            CrateType::Specialized(CrateCategory::Potion, _) => "🧪",
        }
    }

    /// Shop price for this crate.
    pub fn shop_value(&self) -> i64 {
        match self {
            CrateType::Standard(tier) => tier.shop_value(),
            CrateType::Specialized(cat, rarity) => {
                let scale = match cat {
                    CrateCategory::Weapon | CrateCategory::Armor => {
                        [50, 250, 1000, 5000, 25000]
                    }
                    CrateCategory::Potion => [10, 50, 200, 800, 4000],
                };
                match rarity {
                    Rarity::Common => scale[0],
                    Rarity::Rare => scale[1],
                    Rarity::Epic => scale[2],
                    Rarity::Legendary => scale[3],
                    Rarity::Mythical => scale[4],
                    Rarity::Lebron => 0,
                }
            }
        }
    }

    /// Whether this crate starts unlocked on a fresh save.
    pub fn starts_unlocked(&self) -> bool {
        matches!(
            self,
            CrateType::Standard(CrateTier::Basic) | CrateType::Specialized(_, Rarity::Common)
        )
    }
}

/// What a pool slot resolves into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LootAction {
    Item,
    Potion,
    Crate,
}

/// One weighted slot of a crate's loot table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoolEntry {
    pub action: LootAction,
    pub rarity: Rarity,
    /// Category constraint carried by specialized crates.
    pub category: Option<CrateCategory>,
    /// Concrete crate to grant when `action` is `Crate` and the slot
    /// should not fall back to the standard tier of `rarity`.
    pub crate_type: Option<CrateType>,
    pub chance: f64,
}

impl PoolEntry {
    pub fn new(action: LootAction, rarity: Rarity, chance: f64) -> Self {
        PoolEntry {
            action,
            rarity,
            category: None,
            crate_type: None,
            chance,
        }
    }

    /// The crate granted when this slot wins, for `Crate` slots.
    pub fn granted_crate(&self) -> Option<CrateType> {
        if self.action != LootAction::Crate {
            return None;
        }
        self.crate_type
            .or_else(|| CrateTier::from_rarity(self.rarity).map(CrateType::Standard))
    }
}

/// Concrete payload produced by opening a crate.
#[derive(Debug, Clone, PartialEq)]
pub enum LootResult {
    Item { name: String, rarity: Rarity },
    Potion { name: String, rarity: Rarity },
    Crate { crate_type: CrateType, rarity: Rarity },
}

impl LootResult {
    pub fn rarity(&self) -> Rarity {
        match self {
            LootResult::Item { rarity, .. }
            | LootResult::Potion { rarity, .. }
            | LootResult::Crate { rarity, .. } => *rarity,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            LootResult::Item { name, .. } | LootResult::Potion { name, .. } => name.clone(),
            LootResult::Crate { crate_type, .. } => crate_type.display_name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crate_type_id_round_trip() {
        let all = [
            CrateType::Standard(CrateTier::Basic),
            CrateType::Standard(CrateTier::Mythical),
            CrateType::Specialized(CrateCategory::Weapon, Rarity::Common),
            CrateType::Specialized(CrateCategory::Potion, Rarity::Legendary),
        ];
        for ct in all {
            assert_eq!(CrateType::from_id(&ct.id()), Some(ct));
        }
    }

    #[test]
    fn test_crate_type_serializes_as_flat_id() {
        let ct = CrateType::Specialized(CrateCategory::Weapon, Rarity::Rare);
        let json = serde_json::to_string(&ct).unwrap();
        assert_eq!(json, "\"weapon_rare\"");
        let back: CrateType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, ct);
        assert!(serde_json::from_str::<CrateType>("\"weapon_lebron\"").is_err());
    }

    #[test]
    fn test_unknown_crate_ids_rejected() {
        assert_eq!(CrateType::from_id("golden"), None);
        assert_eq!(CrateType::from_id("weapon_lebron"), None);
        assert_eq!(CrateType::from_id("hat_rare"), None);
        assert_eq!(CrateType::from_id(""), None);
    }

    #[test]
    fn test_display_names() {
        assert_eq!(
            CrateType::Standard(CrateTier::Basic).display_name(),
            "Basic Crate"
        );
        assert_eq!(
            CrateType::Specialized(CrateCategory::Weapon, Rarity::Mythical).display_name(),
            "Weapon Mythical Crate"
        );
    }

    #[test]
    fn test_granted_crate_defaults_to_standard_tier() {
        let entry = PoolEntry::new(LootAction::Crate, Rarity::Rare, 7.0);
        assert_eq!(
            entry.granted_crate(),
            Some(CrateType::Standard(CrateTier::Rare))
        );

        let mut upgrade = PoolEntry::new(LootAction::Crate, Rarity::Mythical, 2.0);
        upgrade.crate_type = Some(CrateType::Specialized(
            CrateCategory::Weapon,
            Rarity::Mythical,
        ));
        assert_eq!(upgrade.granted_crate(), upgrade.crate_type);
    }

    #[test]
    fn test_specialized_shop_values_scale_with_rarity() {
        let weapon = |r| CrateType::Specialized(CrateCategory::Weapon, r).shop_value();
        assert_eq!(weapon(Rarity::Common), 50);
        assert_eq!(weapon(Rarity::Mythical), 25000);
        let potion = |r| CrateType::Specialized(CrateCategory::Potion, r).shop_value();
        assert_eq!(potion(Rarity::Rare), 50);
        assert_eq!(potion(Rarity::Legendary), 800);
    }
}
