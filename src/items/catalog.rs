//! Static item and potion catalogs.
//!
//! Every droppable thing in the game is defined here by name. Loot
//! resolution filters these tables by rarity and category; combat reads
//! weapon and armor stats straight from the item definitions.

use super::types::{
    BrawlItemEffect, ItemCategory, ItemDef, PotionDef, PotionEffect, Rarity,
};
use crate::loot::types::{CrateTier, CrateType};

fn item(name: &'static str, rarity: Rarity, category: ItemCategory, emoji: &'static str) -> ItemDef {
    ItemDef {
        name,
        rarity,
        category,
        emoji,
        damage: 0,
        defense: 0.0,
        crit_chance_bonus: 0.0,
        crit_multiplier_bonus: 0.0,
    }
}

fn good(name: &'static str, rarity: Rarity, emoji: &'static str) -> ItemDef {
    item(name, rarity, ItemCategory::Good, emoji)
}

fn consumable(name: &'static str, rarity: Rarity, emoji: &'static str) -> ItemDef {
    item(name, rarity, ItemCategory::Consumable, emoji)
}

fn weapon(name: &'static str, rarity: Rarity, emoji: &'static str, damage: i64) -> ItemDef {
    ItemDef {
        damage,
        ..item(name, rarity, ItemCategory::Weapon, emoji)
    }
}

fn armor(name: &'static str, rarity: Rarity, emoji: &'static str, defense: f64) -> ItemDef {
    ItemDef {
        defense,
        ..item(name, rarity, ItemCategory::Armor, emoji)
    }
}

/// The complete item catalog.
pub fn get_all_items() -> Vec<ItemDef> {
    use Rarity::*;
    vec![
        // Goods (common)
        good("Slightly Bent Paperclip", Common, "📎"),
        good("Mysterious Stained Napkin", Common, "🗒️"),
        good("Single Sock", Common, "🧦"),
        good("Expired Coupon", Common, "🎟️"),
        good("Dust Bunny", Common, "🦠"),
        good("Used Sticky Note", Common, "📝"),
        good("Crumpled Receipt", Common, "🧾"),
        good("Empty Pen", Common, "🖊️"),
        good("A Single Button", Common, "🔘"),
        good("Dead Houseplant", Common, "🥀"),
        good("Outdated Phone Charger", Common, "🔌"),
        good("Fuzzy Lint Ball", Common, "🔵"),
        good("Old Newspaper", Common, "📰"),
        // Consumables (common)
        consumable("Half-Eaten Sandwich", Common, "🥪"),
        consumable("Generic Brand Soda Can", Common, "🥫"),
        consumable("Smoke Bomb", Common, "💨"),
        consumable("Energy Bar", Common, "🍫"),
        // Goods (rare)
        good("Antique Pocket Watch", Rare, "⏱️"),
        good("High-End Drone", Rare, "🛸"),
        good("Self-Lacing Sneakers", Rare, "👟"),
        good("Bonsai Tree", Rare, "🌳"),
        good("Gourmet Coffee Beans", Rare, "☕"),
        good("Professional-Grade Camera", Rare, "📷"),
        good("A Signed First Edition Book", Rare, "📖"),
        good("Vintage Vinyl Record", Rare, "💿"),
        good("Smart Telescope", Rare, "🔭"),
        good("Mechanical Keyboard", Rare, "⌨️"),
        good("Fountain Pen", Rare, "✒️"),
        good("Designer Sunglasses", Rare, "😎"),
        good("A Small Meteorite Fragment", Rare, "☄️"),
        good("Miniature Zen Garden", Rare, "🏞️"),
        // Consumables (rare)
        consumable("Adrenaline Shot", Rare, "💉"),
        // Goods (epic)
        good("Hoverboard from the Future", Epic, "🛹"),
        good("Ring of Invisibility", Epic, "💍"),
        good("Sentient Toaster", Epic, "🤖"),
        good("Portal Gun Replica", Epic, "🌀"),
        good("A Dragon's Egg", Epic, "🥚"),
        good("Self-Solving Rubik's Cube", Epic, "🧩"),
        good("Everlasting Gobstopper", Epic, "🍬"),
        good("Jetpack", Epic, "🚀"),
        good("Golden Spatula", Epic, "🍳"),
        // Goods (legendary)
        good("Grumpy Cat's Scowl", Legendary, "😾"),
        good("Doge's Side-Eye", Legendary, "🐶"),
        good("Stonks Guy's Arrow", Legendary, "📈"),
        good("Skibidi Toilet", Legendary, "🚽"),
        good("Philosoraptor's Question", Legendary, "🦖"),
        good("Salt Bae's Sprinkle", Legendary, "🧂"),
        good("Distracted Boyfriend's Glance", Legendary, "👀"),
        good("Hide the Pain Harold's Smile", Legendary, "😄"),
        good("Pepe the Frog", Legendary, "🐸"),
        // Goods (mythical)
        good("The Holy Grail", Mythical, "🏆"),
        good("Schrodinger's Cat Box", Mythical, "📦"),
        // Goods (lebron)
        good("LeBron James", Lebron, "👑"),
        // Ingredients
        item("Composite Part", Epic, ItemCategory::Ingredient, "⚙️"),
        // Weapons (common)
        weapon("Broken Bottle", Common, "🍾", 3),
        weapon("Dusty Broom", Common, "🧹", 4),
        // Weapons (rare)
        weapon("Rusty Cutlass", Rare, "🗡️", 8),
        weapon("Iron Knuckles", Rare, "👊", 10),
        ItemDef {
            crit_chance_bonus: 0.05,
            ..weapon("Spiked Bat", Rare, "🏏", 12)
        },
        ItemDef {
            crit_chance_bonus: 0.25,
            ..weapon("Shiv", Rare, "🔪", 6)
        },
        // Weapons (epic)
        weapon("Mjolnir Keychain", Epic, "🔨", 18),
        weapon("Lightsaber Hilt", Epic, "⚔️", 20),
        weapon("Enchanted Mace", Epic, "✨", 22),
        ItemDef {
            crit_multiplier_bonus: 1.0,
            ..weapon("Executioner's Axe", Epic, "🪓", 25)
        },
        weapon("Warlock's Blade", Epic, "🗡️", 20),
        // Weapons (legendary)
        ItemDef {
            crit_chance_bonus: 0.15,
            ..weapon("Excalibur", Legendary, "🗡️", 40)
        },
        ItemDef {
            crit_multiplier_bonus: 1.5,
            ..weapon("Gjallarhorn", Legendary, "🚀", 50)
        },
        // Weapons (mythical)
        weapon("BFG 9000", Mythical, "💥", 100),
        // Armor
        armor("Leather Tunic", Common, "👕", 0.05),
        armor("Chainmail Vest", Rare, "⛓️", 0.10),
        armor("Knight's Platebody", Epic, "🛡️", 0.20),
        armor("Spiked Shield", Epic, "🛡️", 0.15),
        armor("Aegis Shield", Legendary, "🛡️", 0.30),
        armor("Adamantium Armor", Mythical, "🛡️", 0.50),
    ]
}

/// The complete potion catalog.
pub fn get_all_potions() -> Vec<PotionDef> {
    use PotionEffect::*;
    use Rarity::*;
    vec![
        // Utility potions
        PotionDef {
            name: "Minor Luck Potion",
            rarity: Common,
            emoji: "🍀",
            sell_value: 18,
            effect: LuckBoost { value: 5.0, duration: 180, max_stacks: 5 },
        },
        PotionDef {
            name: "Luck Potion",
            rarity: Rare,
            emoji: "🍀",
            sell_value: 25,
            effect: LuckBoost { value: 10.0, duration: 300, max_stacks: 5 },
        },
        PotionDef {
            name: "Potion of Crate Attraction",
            rarity: Rare,
            emoji: "🧲",
            sell_value: 70,
            effect: InstantCrates {
                crate_type: CrateType::Standard(CrateTier::Basic),
                amount: 3,
            },
        },
        PotionDef {
            name: "Greater Luck Potion",
            rarity: Epic,
            emoji: "🍀",
            sell_value: 75,
            effect: LuckBoost { value: 15.0, duration: 300, max_stacks: 5 },
        },
        PotionDef {
            name: "Wild Magic Potion",
            rarity: Epic,
            emoji: "🌀",
            sell_value: 50,
            effect: WildMagic { min: -10, max: 15, duration: 300 },
        },
        PotionDef {
            name: "Flask of Time",
            rarity: Epic,
            emoji: "⏳",
            sell_value: 100,
            effect: TimeSkip { minutes: 30 },
        },
        PotionDef {
            name: "Diligent Draft",
            rarity: Rare,
            emoji: "🤖",
            sell_value: 60,
            effect: AutoClaim { duration: 1800 },
        },
        PotionDef {
            name: "Merchant's Elixir",
            rarity: Epic,
            emoji: "💰",
            sell_value: 80,
            effect: MerchantWisdom {
                buy_discount: 0.15,
                sell_bonus: 0.20,
                duration: 900,
            },
        },
        PotionDef {
            name: "Draught of Ruin",
            rarity: Legendary,
            emoji: "🎲",
            sell_value: 250,
            effect: HighStakes {
                win_multiplier: 4.0,
                loss_multiplier: 2.0,
                duration: 180,
            },
        },
        PotionDef {
            name: "King's Favor Potion",
            rarity: Legendary,
            emoji: "👑",
            sell_value: 300,
            effect: LebronHunter { chance_increase: 4.0, duration: 600 },
        },
        PotionDef {
            name: "Phantom Veil Potion",
            rarity: Legendary,
            emoji: "👻",
            sell_value: 200,
            effect: PhantomVeil { duration: 300 },
        },
        PotionDef {
            name: "Elixir of Life",
            rarity: Mythical,
            emoji: "💖",
            sell_value: 1000,
            effect: Immortality {
                duration: 1800,
                hp_regen: 5,
                coin_bonus: 0.1,
            },
        },
        // Combat potions
        PotionDef {
            name: "Minor Health Potion",
            rarity: Common,
            emoji: "❤️",
            sell_value: 10,
            effect: BrawlHeal { amount: 20 },
        },
        PotionDef {
            name: "Minor Stamina Potion",
            rarity: Common,
            emoji: "💧",
            sell_value: 10,
            effect: BrawlStaminaRestore { amount: 50 },
        },
        PotionDef {
            name: "Strength Potion",
            rarity: Rare,
            emoji: "💪",
            sell_value: 40,
            effect: BrawlDamageBoost { multiplier: 1.5, turns: 2 },
        },
        PotionDef {
            name: "Stamina Potion",
            rarity: Rare,
            emoji: "💦",
            sell_value: 40,
            effect: BrawlStaminaRestore { amount: 100 },
        },
        PotionDef {
            name: "Stoneskin Potion",
            rarity: Rare,
            emoji: "🧱",
            sell_value: 40,
            effect: BrawlDefenseBoost { multiplier: 0.5, turns: 2 },
        },
        PotionDef {
            name: "Potion of Swiftness",
            rarity: Rare,
            emoji: "⚡",
            sell_value: 50,
            effect: BrawlGuaranteedCrit,
        },
        PotionDef {
            name: "Elixir of Fortitude",
            rarity: Epic,
            emoji: "➕",
            sell_value: 120,
            effect: BrawlMaxHpBoost { amount: 50, turns: 5 },
        },
        PotionDef {
            name: "Vial of Venom",
            rarity: Epic,
            emoji: "☠️",
            sell_value: 100,
            effect: BrawlApplyPoison { damage: 5, turns: 3 },
        },
        PotionDef {
            name: "Berserker's Brew",
            rarity: Epic,
            emoji: "😡",
            sell_value: 90,
            effect: BrawlBerserk {
                damage_multiplier: 1.5,
                defense_multiplier: 1.25,
                turns: 3,
            },
        },
        PotionDef {
            name: "Vampiric Draught",
            rarity: Legendary,
            emoji: "🦇",
            sell_value: 220,
            effect: BrawlLifesteal { fraction: 0.3, turns: 3 },
        },
    ]
}

pub fn item_def(name: &str) -> Option<ItemDef> {
    get_all_items().into_iter().find(|i| i.name == name)
}

pub fn potion_def(name: &str) -> Option<PotionDef> {
    get_all_potions().into_iter().find(|p| p.name == name)
}

/// Per-item sell price overrides.
pub fn item_sell_override(name: &str) -> Option<i64> {
    match name {
        "Composite Part" => Some(50),
        _ => None,
    }
}

pub fn item_sell_value(name: &str) -> i64 {
    item_def(name).map(|d| d.sell_value()).unwrap_or(0)
}

pub fn potion_sell_value(name: &str) -> i64 {
    potion_def(name).map(|d| d.coin_sell_value()).unwrap_or(0)
}

/// What a consumable does when used during a brawl.
pub fn brawl_item_effect(name: &str) -> Option<BrawlItemEffect> {
    match name {
        "Half-Eaten Sandwich" => Some(BrawlItemEffect::Heal(10)),
        "Generic Brand Soda Can" => Some(BrawlItemEffect::Damage(5)),
        "Smoke Bomb" => Some(BrawlItemEffect::RunBoost(0.4)),
        "Energy Bar" => Some(BrawlItemEffect::StaminaRestore(30)),
        "Adrenaline Shot" => Some(BrawlItemEffect::Shield(20)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_names_are_unique() {
        let items = get_all_items();
        let mut names: Vec<_> = items.iter().map(|i| i.name).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), items.len());
    }

    #[test]
    fn test_every_rarity_has_a_non_ingredient_item() {
        for rarity in [
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
            Rarity::Mythical,
            Rarity::Lebron,
        ] {
            assert!(
                get_all_items()
                    .iter()
                    .any(|i| i.rarity == rarity && i.category != ItemCategory::Ingredient),
                "no droppable item at rarity {rarity:?}"
            );
        }
    }

    #[test]
    fn test_lebron_tier_holds_exactly_one_item() {
        let lebrons: Vec<_> = get_all_items()
            .into_iter()
            .filter(|i| i.rarity == Rarity::Lebron)
            .collect();
        assert_eq!(lebrons.len(), 1);
        assert_eq!(lebrons[0].name, "LeBron James");
    }

    #[test]
    fn test_weapon_and_armor_sell_at_five_times_rarity_base() {
        let knuckles = item_def("Iron Knuckles").unwrap();
        assert_eq!(knuckles.sell_value(), 25);
        let tunic = item_def("Leather Tunic").unwrap();
        assert_eq!(tunic.sell_value(), 5);
        // Override beats the category rule
        let part = item_def("Composite Part").unwrap();
        assert_eq!(part.sell_value(), 50);
    }

    #[test]
    fn test_potion_sell_value_doubles_listed_value() {
        assert_eq!(potion_sell_value("Minor Luck Potion"), 36);
        assert_eq!(potion_sell_value("Elixir of Life"), 2000);
        assert_eq!(potion_sell_value("No Such Brew"), 0);
    }

    #[test]
    fn test_weapon_stats_present() {
        let shiv = item_def("Shiv").unwrap();
        assert_eq!(shiv.damage, 6);
        assert!((shiv.crit_chance_bonus - 0.25).abs() < f64::EPSILON);

        let axe = item_def("Executioner's Axe").unwrap();
        assert_eq!(axe.damage, 25);
        assert!((axe.crit_multiplier_bonus - 1.0).abs() < f64::EPSILON);

        let adamantium = item_def("Adamantium Armor").unwrap();
        assert!((adamantium.defense - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_brawl_consumables_cover_all_consumable_items() {
        for item in get_all_items() {
            if item.category == ItemCategory::Consumable {
                assert!(
                    brawl_item_effect(item.name).is_some(),
                    "{} has no brawl effect",
                    item.name
                );
            }
        }
        assert_eq!(brawl_item_effect("Dust Bunny"), None);
    }

    #[test]
    fn test_every_potion_rarity_reachable_from_drops() {
        // Potion crates exist at all five standard rarities
        for rarity in [
            Rarity::Common,
            Rarity::Rare,
            Rarity::Epic,
            Rarity::Legendary,
            Rarity::Mythical,
        ] {
            assert!(
                get_all_potions().iter().any(|p| p.rarity == rarity),
                "no potion at rarity {rarity:?}"
            );
        }
    }
}
