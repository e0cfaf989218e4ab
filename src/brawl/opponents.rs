use crate::brawl::types::{
    Ability, AbilityKind, BrawlRarity, BuffStat, CrateDrop, Opponent, RewardDrop, RewardTable,
};
use crate::loot::types::{CrateTier, CrateType};

/// A pool or boss entry before it is instantiated for a stage.
#[derive(Debug, Clone, PartialEq)]
pub struct OpponentDef {
    pub name: &'static str,
    pub emoji: &'static str,
    pub health: i64,
    pub damage_range: (i64, i64),
    pub crit_chance: f64,
    pub crit_multiplier: f64,
    pub abilities: Vec<Ability>,
    pub rewards: RewardTable,
}

fn opponent(
    name: &'static str,
    emoji: &'static str,
    health: i64,
    damage_range: (i64, i64),
) -> OpponentDef {
    OpponentDef {
        name,
        emoji,
        health,
        damage_range,
        crit_chance: 0.0,
        crit_multiplier: 1.5,
        abilities: Vec::new(),
        rewards: RewardTable::default(),
    }
}

fn coins(def: OpponentDef, min: i64, max: i64) -> OpponentDef {
    OpponentDef {
        rewards: RewardTable {
            coins: Some((min, max)),
            ..def.rewards
        },
        ..def
    }
}

fn item_drop(
    mut def: OpponentDef,
    pool: &[&'static str],
    chance: f64,
    amount: (u32, u32),
) -> OpponentDef {
    def.rewards.items.push(RewardDrop {
        pool: pool.to_vec(),
        chance,
        amount,
    });
    def
}

fn potion_drop(
    mut def: OpponentDef,
    pool: &[&'static str],
    chance: f64,
    amount: (u32, u32),
) -> OpponentDef {
    def.rewards.potions.push(RewardDrop {
        pool: pool.to_vec(),
        chance,
        amount,
    });
    def
}

fn crate_drop(
    mut def: OpponentDef,
    crate_type: CrateType,
    chance: f64,
    amount: (u32, u32),
) -> OpponentDef {
    def.rewards.crates.push(CrateDrop {
        crate_type,
        chance,
        amount,
    });
    def
}

fn ability(mut def: OpponentDef, kind: AbilityKind, chance: f64, cooldown: i32) -> OpponentDef {
    def.abilities.push(Ability::new(kind, chance, cooldown));
    def
}

fn crits(def: OpponentDef, chance: f64) -> OpponentDef {
    OpponentDef {
        crit_chance: chance,
        ..def
    }
}

const BASIC: CrateType = CrateType::Standard(CrateTier::Basic);
const RARE: CrateType = CrateType::Standard(CrateTier::Rare);
const EPIC: CrateType = CrateType::Standard(CrateTier::Epic);
const LEGENDARY: CrateType = CrateType::Standard(CrateTier::Legendary);
const MYTHICAL: CrateType = CrateType::Standard(CrateTier::Mythical);

/// Rotating non-boss opponents for a tavern. Stage N before the first
/// boss uses entry N; stages past the pool reuse the last entry with
/// overflow scaling.
pub fn tier_pool(rarity: BrawlRarity) -> Vec<OpponentDef> {
    match rarity {
        BrawlRarity::Common => vec![
            item_drop(
                coins(crits(opponent("Drunken Thug", "😠", 30, (3, 6)), 0.05), 2, 5),
                &["Slightly Bent Paperclip", "Broken Bottle"],
                0.5,
                (1, 2),
            ),
            item_drop(
                coins(opponent("Rowdy Patron", "🍻", 40, (4, 7)), 3, 6),
                &["Broken Bottle"],
                0.6,
                (1, 1),
            ),
            crate_drop(
                ability(
                    opponent("Bar Bouncer", "💪", 50, (5, 8)),
                    AbilityKind::Shield { value: 10 },
                    0.3,
                    3,
                ),
                BASIC,
                0.8,
                (1, 1),
            ),
        ],
        BrawlRarity::Rare => vec![
            potion_drop(
                coins(
                    ability(
                        crits(opponent("Goblin Stabber", "👺", 40, (7, 12)), 0.1),
                        AbilityKind::Bleed { damage: 4, turns: 2 },
                        0.4,
                        3,
                    ),
                    10,
                    20,
                ),
                &["Minor Luck Potion", "Minor Health Potion"],
                0.4,
                (1, 1),
            ),
            item_drop(
                coins(
                    ability(
                        opponent("Alley Cat Scrapper", "😼", 55, (6, 9)),
                        AbilityKind::MultiHit { hits: 2 },
                        0.5,
                        2,
                    ),
                    12,
                    18,
                ),
                &["Shiv"],
                0.1,
                (1, 1),
            ),
            crate_drop(
                item_drop(
                    ability(
                        opponent("Grumpy Dwarf", "🧔", 80, (6, 10)),
                        AbilityKind::HeavyHit { multiplier: 1.5 },
                        0.4,
                        2,
                    ),
                    &["Iron Knuckles", "Spiked Bat"],
                    0.2,
                    (1, 1),
                ),
                RARE,
                0.1,
                (1, 1),
            ),
        ],
        BrawlRarity::Epic => vec![
            potion_drop(
                ability(
                    ability(
                        opponent("Cursed Shade", "👻", 130, (18, 22)),
                        AbilityKind::LifestealHit { fraction: 0.5 },
                        0.4,
                        3,
                    ),
                    AbilityKind::Debuff {
                        stat: BuffStat::Attack,
                        value: 0.8,
                        turns: 2,
                    },
                    0.3,
                    4,
                ),
                &["Stoneskin Potion"],
                0.6,
                (1, 1),
            ),
            potion_drop(
                coins(
                    ability(
                        crits(opponent("One-Eyed Pirate", "🏴‍☠️", 150, (20, 30)), 0.1),
                        AbilityKind::StunChance,
                        0.2,
                        4,
                    ),
                    50,
                    75,
                ),
                &["Strength Potion", "Stoneskin Potion", "Potion of Swiftness"],
                0.5,
                (1, 1),
            ),
            potion_drop(
                ability(
                    ability(
                        opponent("Corrupted Alchemist", "👨\u{200d}🔬", 140, (15, 20)),
                        AbilityKind::Debuff {
                            stat: BuffStat::Attack,
                            value: 0.75,
                            turns: 3,
                        },
                        0.4,
                        3,
                    ),
                    AbilityKind::Burn { damage: 8, turns: 3 },
                    0.4,
                    4,
                ),
                &["Vial of Venom", "Berserker's Brew"],
                0.25,
                (1, 1),
            ),
        ],
        BrawlRarity::Legendary => vec![
            item_drop(
                ability(
                    ability(
                        opponent("Armored Knight", "🛡️", 250, (25, 40)),
                        AbilityKind::Shield { value: 25 },
                        0.5,
                        2,
                    ),
                    AbilityKind::Buff {
                        stat: BuffStat::Defense,
                        value: 2.0,
                        turns: 2,
                    },
                    0.2,
                    5,
                ),
                &["Composite Part"],
                0.9,
                (1, 2),
            ),
            crate_drop(
                potion_drop(
                    ability(
                        ability(
                            opponent("Fire Mage", "🔥", 180, (20, 30)),
                            AbilityKind::Burn { damage: 10, turns: 3 },
                            0.6,
                            3,
                        ),
                        AbilityKind::Heal { amount: 30 },
                        0.2,
                        4,
                    ),
                    &["Vial of Venom", "Elixir of Fortitude"],
                    0.3,
                    (1, 1),
                ),
                EPIC,
                0.25,
                (1, 1),
            ),
            item_drop(
                coins(
                    ability(
                        opponent("Cave Troll", "🗿", 400, (30, 35)),
                        AbilityKind::ChargeAttack { multiplier: 2.5 },
                        0.5,
                        3,
                    ),
                    100,
                    150,
                ),
                &["Executioner's Axe"],
                0.2,
                (1, 1),
            ),
        ],
    }
}

/// Boss override for a 1-based stage number, if this stage is guarded.
pub fn tier_boss(rarity: BrawlRarity, stage: u32) -> Option<OpponentDef> {
    let def = match (rarity, stage) {
        (BrawlRarity::Common, 5) => potion_drop(
            ability(
                opponent("The Grifter", "😒", 70, (5, 7)),
                AbilityKind::Debuff {
                    stat: BuffStat::Attack,
                    value: 0.75,
                    turns: 2,
                },
                0.5,
                3,
            ),
            &["Minor Luck Potion"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Common, 10) => crate_drop(
            ability(
                ability(
                    opponent("Head Bouncer", "😡", 120, (8, 12)),
                    AbilityKind::HeavyHit { multiplier: 1.5 },
                    0.4,
                    2,
                ),
                AbilityKind::Shield { value: 15 },
                0.3,
                4,
            ),
            RARE,
            0.75,
            (1, 1),
        ),
        (BrawlRarity::Common, 15) => item_drop(
            ability(
                opponent("Bar Room Champion", "🏆", 150, (10, 15)),
                AbilityKind::MultiHit { hits: 2 },
                0.4,
                3,
            ),
            &["Dusty Broom"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Common, 20) => coins(
            ability(
                opponent("The Loan Shark", "🦈", 180, (12, 18)),
                AbilityKind::Bleed { damage: 5, turns: 3 },
                0.6,
                3,
            ),
            20,
            40,
        ),
        (BrawlRarity::Common, 25) => item_drop(
            ability(
                opponent("The Card Sharp", "🃏", 160, (10, 15)),
                AbilityKind::StunChance,
                0.3,
                4,
            ),
            &["Shiv"],
            0.8,
            (1, 1),
        ),
        (BrawlRarity::Common, 30) => item_drop(
            crate_drop(
                ability(
                    ability(
                        opponent("Tavern Owner", "😈", 250, (15, 20)),
                        AbilityKind::ChargeAttack { multiplier: 2.0 },
                        0.4,
                        3,
                    ),
                    AbilityKind::Heal { amount: 40 },
                    0.25,
                    4,
                ),
                RARE,
                1.0,
                (1, 1),
            ),
            &["Iron Knuckles"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Rare, 5) => potion_drop(
            ability(
                opponent("Hobgoblin Chieftain", "👹", 100, (10, 15)),
                AbilityKind::Buff {
                    stat: BuffStat::Attack,
                    value: 1.5,
                    turns: 2,
                },
                0.5,
                3,
            ),
            &["Strength Potion"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Rare, 10) => crate_drop(
            ability(
                opponent("Dwarven Berserker", "🔨", 180, (12, 18)),
                AbilityKind::HeavyHit { multiplier: 1.2 },
                0.8,
                1,
            ),
            EPIC,
            0.25,
            (1, 1),
        ),
        (BrawlRarity::Rare, 15) => item_drop(
            ability(
                ability(
                    opponent("Bandit Leader", "🤠", 160, (15, 20)),
                    AbilityKind::MultiHit { hits: 2 },
                    0.4,
                    3,
                ),
                AbilityKind::Debuff {
                    stat: BuffStat::Attack,
                    value: 0.8,
                    turns: 2,
                },
                0.3,
                4,
            ),
            &["Spiked Bat"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Rare, 20) => coins(
            ability(
                opponent("Ogre Bruiser", "🦍", 250, (20, 25)),
                AbilityKind::ChargeAttack { multiplier: 2.0 },
                0.4,
                3,
            ),
            40,
            60,
        ),
        (BrawlRarity::Rare, 25) => item_drop(
            ability(
                opponent("Corrupted Knight", "💀", 200, (18, 22)),
                AbilityKind::LifestealHit { fraction: 0.5 },
                0.3,
                4,
            ),
            &["Warlock's Blade"],
            0.5,
            (1, 1),
        ),
        (BrawlRarity::Rare, 30) => item_drop(
            crate_drop(
                ability(
                    ability(
                        ability(
                            opponent("Kobold King", "👑", 300, (20, 25)),
                            AbilityKind::MultiHit { hits: 3 },
                            0.3,
                            4,
                        ),
                        AbilityKind::Bleed { damage: 8, turns: 3 },
                        0.5,
                        4,
                    ),
                    AbilityKind::Heal { amount: 50 },
                    0.2,
                    5,
                ),
                EPIC,
                0.5,
                (1, 1),
            ),
            &["Mjolnir Keychain"],
            0.3,
            (1, 1),
        ),
        (BrawlRarity::Epic, 5) => item_drop(
            ability(
                OpponentDef {
                    crit_multiplier: 2.0,
                    ..opponent("Executioner", "🪓", 200, (25, 30))
                },
                AbilityKind::Debuff {
                    stat: BuffStat::Defense,
                    value: 0.5,
                    turns: 2,
                },
                0.5,
                4,
            ),
            &["Executioner's Axe"],
            0.3,
            (1, 1),
        ),
        (BrawlRarity::Epic, 10) => crate_drop(
            ability(
                ability(
                    opponent("War Mage", "🧙", 180, (20, 25)),
                    AbilityKind::Burn { damage: 10, turns: 3 },
                    0.6,
                    3,
                ),
                AbilityKind::Shield { value: 40 },
                0.4,
                4,
            ),
            LEGENDARY,
            0.2,
            (1, 1),
        ),
        (BrawlRarity::Epic, 15) => item_drop(
            ability(
                opponent("Grave Warden", "⚰️", 300, (22, 28)),
                AbilityKind::Buff {
                    stat: BuffStat::Defense,
                    value: 2.0,
                    turns: 2,
                },
                0.4,
                5,
            ),
            &["Spiked Shield"],
            0.7,
            (1, 1),
        ),
        (BrawlRarity::Epic, 20) => coins(
            ability(
                opponent("Giant Slayer", "💪", 250, (30, 40)),
                AbilityKind::HeavyHit { multiplier: 1.8 },
                0.5,
                3,
            ),
            80,
            120,
        ),
        (BrawlRarity::Epic, 25) => potion_drop(
            ability(
                ability(
                    opponent("Twin Assassins", "🥷", 220, (15, 20)),
                    AbilityKind::MultiHit { hits: 2 },
                    1.0,
                    2,
                ),
                AbilityKind::Bleed { damage: 7, turns: 2 },
                0.6,
                3,
            ),
            &["Berserker's Brew", "Potion of Swiftness"],
            0.4,
            (1, 1),
        ),
        (BrawlRarity::Epic, 30) => item_drop(
            crate_drop(
                ability(
                    ability(
                        opponent("The Gilded Golem", "🏆", 500, (30, 35)),
                        AbilityKind::Shield { value: 80 },
                        0.6,
                        3,
                    ),
                    AbilityKind::ChargeAttack { multiplier: 2.5 },
                    0.3,
                    4,
                ),
                LEGENDARY,
                0.4,
                (1, 1),
            ),
            &["Composite Part"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 5) => crate_drop(
            ability(
                ability(
                    opponent("Young Dragon", "🐲", 350, (30, 35)),
                    AbilityKind::Burn { damage: 12, turns: 3 },
                    0.7,
                    3,
                ),
                AbilityKind::HeavyHit { multiplier: 1.5 },
                0.4,
                2,
            ),
            LEGENDARY,
            0.6,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 10) => potion_drop(
            ability(
                ability(
                    opponent("The Lich", "💀", 300, (25, 30)),
                    AbilityKind::LifestealHit { fraction: 0.6 },
                    0.6,
                    3,
                ),
                AbilityKind::Debuff {
                    stat: BuffStat::Defense,
                    value: 0.5,
                    turns: 2,
                },
                0.4,
                4,
            ),
            &["Vampiric Draught"],
            1.0,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 15) => crate_drop(
            item_drop(
                coins(
                    ability(
                        ability(
                            opponent("Abyssal Horror", "🐙", 450, (30, 40)),
                            AbilityKind::LifestealHit { fraction: 0.4 },
                            0.5,
                            3,
                        ),
                        AbilityKind::Debuff {
                            stat: BuffStat::Attack,
                            value: 0.7,
                            turns: 2,
                        },
                        0.5,
                        3,
                    ),
                    150,
                    200,
                ),
                &["Warlock's Blade", "Spiked Shield"],
                0.1,
                (1, 1),
            ),
            LEGENDARY,
            0.05,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 20) => crate_drop(
            coins(
                ability(
                    ability(
                        crits(opponent("The Landlord", "😤", 500, (35, 45)), 0.15),
                        AbilityKind::HeavyHit { multiplier: 2.0 },
                        0.4,
                        4,
                    ),
                    AbilityKind::Shield { value: 50 },
                    0.3,
                    4,
                ),
                200,
                300,
            ),
            LEGENDARY,
            0.1,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 25) => item_drop(
            ability(
                ability(
                    opponent("Avatar of War", "⚔️", 400, (30, 35)),
                    AbilityKind::MultiHit { hits: 3 },
                    0.5,
                    3,
                ),
                AbilityKind::Buff {
                    stat: BuffStat::Attack,
                    value: 2.0,
                    turns: 2,
                },
                0.3,
                5,
            ),
            &["Excalibur"],
            0.3,
            (1, 1),
        ),
        (BrawlRarity::Legendary, 30) => item_drop(
            crate_drop(
                ability(
                    ability(
                        ability(
                            ability(
                                opponent("The Wyrm God", "🐉", 1000, (40, 50)),
                                AbilityKind::ChargeAttack { multiplier: 3.0 },
                                0.5,
                                3,
                            ),
                            AbilityKind::Heal { amount: 100 },
                            0.25,
                            5,
                        ),
                        AbilityKind::Debuff {
                            stat: BuffStat::Attack,
                            value: 0.5,
                            turns: 3,
                        },
                        0.4,
                        4,
                    ),
                    AbilityKind::Burn { damage: 15, turns: 3 },
                    0.6,
                    3,
                ),
                MYTHICAL,
                0.5,
                (1, 1),
            ),
            &["Gjallarhorn", "Aegis Shield"],
            0.5,
            (1, 1),
        ),
        _ => return None,
    };
    Some(def)
}

impl OpponentDef {
    /// Instantiate for the arena, optionally scaled up for stages past
    /// the end of the pool.
    pub fn instantiate(&self, scale: f64, is_boss: bool) -> Opponent {
        let enraged = scale > 1.0;
        Opponent {
            name: if enraged {
                format!("Enraged {}", self.name)
            } else {
                self.name.to_string()
            },
            emoji: self.emoji,
            max_health: (self.health as f64 * scale).floor() as i64,
            damage_range: (
                (self.damage_range.0 as f64 * scale).floor() as i64,
                (self.damage_range.1 as f64 * scale).floor() as i64,
            ),
            crit_chance: self.crit_chance,
            crit_multiplier: self.crit_multiplier,
            abilities: self.abilities.clone(),
            rewards: self.rewards.clone(),
            is_boss,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::types::Rarity;

    #[test]
    fn test_every_tier_has_a_pool_and_six_bosses() {
        for rarity in BrawlRarity::all() {
            assert_eq!(tier_pool(rarity).len(), 3, "{rarity:?} pool");
            for stage in [5, 10, 15, 20, 25, 30] {
                assert!(
                    tier_boss(rarity, stage).is_some(),
                    "{rarity:?} stage {stage} has no boss"
                );
            }
            for stage in [1, 2, 3, 4, 6, 29] {
                assert!(tier_boss(rarity, stage).is_none());
            }
        }
    }

    #[test]
    fn test_reward_item_names_exist_in_catalog() {
        use crate::items::catalog;
        for rarity in BrawlRarity::all() {
            let mut defs = tier_pool(rarity);
            for stage in [5, 10, 15, 20, 25, 30] {
                if let Some(boss) = tier_boss(rarity, stage) {
                    defs.push(boss);
                }
            }
            for def in defs {
                for drop in &def.rewards.items {
                    for name in &drop.pool {
                        assert!(
                            catalog::item_def(name).is_some(),
                            "{} rewards unknown item {name}",
                            def.name
                        );
                    }
                }
                for drop in &def.rewards.potions {
                    for name in &drop.pool {
                        assert!(
                            catalog::potion_def(name).is_some(),
                            "{} rewards unknown potion {name}",
                            def.name
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn test_instantiate_scales_enraged_opponents() {
        let def = opponent("Drunken Thug", "😠", 30, (3, 6));
        let plain = def.instantiate(1.0, false);
        assert_eq!(plain.name, "Drunken Thug");
        assert_eq!(plain.max_health, 30);

        let enraged = def.instantiate(1.4, false);
        assert_eq!(enraged.name, "Enraged Drunken Thug");
        assert_eq!(enraged.max_health, 42);
        assert_eq!(enraged.damage_range, (4, 8));
    }

    #[test]
    fn test_final_bosses_reward_crates() {
        for rarity in BrawlRarity::all() {
            let boss = tier_boss(rarity, 30).unwrap();
            assert!(!boss.rewards.crates.is_empty(), "{rarity:?} final boss");
        }
    }

    #[test]
    fn test_reward_rarity_catalog_spot_checks() {
        use crate::items::catalog;
        let excalibur = catalog::item_def("Excalibur").unwrap();
        assert_eq!(excalibur.rarity, Rarity::Legendary);
        assert!(catalog::item_def("Aegis Shield").is_some());
        assert!(catalog::item_def("Gjallarhorn").is_some());
    }
}
