//! RPG stats
//!
//! Per-actor attributes (strength, defense, crit, ...) with clamped setters.
//! Health, speed and intelligence drive host attributes; their setters
//! recompute the dependent attribute immediately. Also holds the damage and
//! defense formulas and the stat bonuses carried by equipment items.

use std::ops::Add;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::actor::{Actor, BASE_MAX_HEALTH, PropertyValue};
use crate::config::ManaConfig;
use crate::item::{Container, ItemStack};
use crate::mana::Mana;

/// Bonus speed points per speed effect level
const SPEED_PER_LEVEL: i64 = 100;
const MAX_SPEED_AMPLIFIER: i64 = 5;
/// Intelligence adds this much flat damage per point
const INTELLIGENCE_DAMAGE: f64 = 0.25;
const EQUIPMENT_FLAG: &str = "equipment";
/// Lore lines written by [`ItemStats::update_lore`] start with this color code
const STAT_LORE_PREFIX: &str = "§7";

// ============================================================================
// Stat Types
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stat {
    Strength,
    Defense,
    Health,
    Speed,
    CritChance,
    CritDamage,
    AttackSpeed,
    Intelligence,
}

impl Stat {
    pub const ALL: [Stat; 8] = [
        Stat::Strength,
        Stat::Defense,
        Stat::Health,
        Stat::Speed,
        Stat::CritChance,
        Stat::CritDamage,
        Stat::AttackSpeed,
        Stat::Intelligence,
    ];

    /// Actor property key
    pub fn key(&self) -> &'static str {
        match self {
            Stat::Strength => "strength",
            Stat::Defense => "defense",
            Stat::Health => "bonusHealth",
            Stat::Speed => "bonusSpeed",
            Stat::CritChance => "critChance",
            Stat::CritDamage => "critDamage",
            Stat::AttackSpeed => "attackSpeed",
            Stat::Intelligence => "intelligence",
        }
    }

    /// Item property key for the bonus an item grants
    pub fn item_key(&self) -> &'static str {
        match self {
            Stat::Strength => "itemStrength",
            Stat::Defense => "itemDefense",
            Stat::Health => "itemHealth",
            Stat::Speed => "itemSpeed",
            Stat::CritChance => "itemCritChance",
            Stat::CritDamage => "itemCritDamage",
            Stat::AttackSpeed => "itemAttackSpeed",
            Stat::Intelligence => "itemIntelligence",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Stat::Strength => "Strength",
            Stat::Defense => "Defense",
            Stat::Health => "Health",
            Stat::Speed => "Speed",
            Stat::CritChance => "Crit Chance",
            Stat::CritDamage => "Crit Damage",
            Stat::AttackSpeed => "Attack Speed",
            Stat::Intelligence => "Intelligence",
        }
    }

    pub fn default_value(&self) -> i64 {
        match self {
            Stat::CritChance => 5,
            Stat::CritDamage => 50,
            _ => 0,
        }
    }

    pub fn clamp(&self, value: i64) -> i64 {
        match self {
            Stat::CritChance => value.clamp(0, 100),
            _ => value.max(0),
        }
    }

    fn lore_line(&self, value: i64) -> String {
        match self {
            Stat::Strength => format!("§7Strength: §c+{}", value),
            Stat::Defense => format!("§7Defense: §a+{}", value),
            Stat::Health => format!("§7Health: §c+{}", value),
            Stat::Speed => format!("§7Speed: §f+{}", value),
            Stat::CritChance => format!("§7Crit Chance: §9+{}%", value),
            Stat::CritDamage => format!("§7Crit Damage: §9+{}%", value),
            Stat::AttackSpeed => format!("§7Attack Speed: §e+{}", value),
            Stat::Intelligence => format!("§7Intelligence: §b+{}", value),
        }
    }
}

// ============================================================================
// Stat Block
// ============================================================================

/// A full set of stat values (an actor snapshot, item bonuses, or a sum)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatBlock {
    pub strength: i64,
    pub defense: i64,
    pub health: i64,
    pub speed: i64,
    pub crit_chance: i64,
    pub crit_damage: i64,
    pub attack_speed: i64,
    pub intelligence: i64,
}

impl StatBlock {
    /// Starting values for a fresh actor
    pub fn starting() -> Self {
        let mut block = Self::default();
        for stat in Stat::ALL {
            block.set(stat, stat.default_value());
        }
        block
    }

    pub fn get(&self, stat: Stat) -> i64 {
        match stat {
            Stat::Strength => self.strength,
            Stat::Defense => self.defense,
            Stat::Health => self.health,
            Stat::Speed => self.speed,
            Stat::CritChance => self.crit_chance,
            Stat::CritDamage => self.crit_damage,
            Stat::AttackSpeed => self.attack_speed,
            Stat::Intelligence => self.intelligence,
        }
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        let slot = match stat {
            Stat::Strength => &mut self.strength,
            Stat::Defense => &mut self.defense,
            Stat::Health => &mut self.health,
            Stat::Speed => &mut self.speed,
            Stat::CritChance => &mut self.crit_chance,
            Stat::CritDamage => &mut self.crit_damage,
            Stat::AttackSpeed => &mut self.attack_speed,
            Stat::Intelligence => &mut self.intelligence,
        };
        *slot = value;
    }
}

impl Add for StatBlock {
    type Output = StatBlock;

    fn add(self, rhs: StatBlock) -> StatBlock {
        let mut total = self;
        for stat in Stat::ALL {
            total.set(stat, self.get(stat) + rhs.get(stat));
        }
        total
    }
}

// ============================================================================
// Combat Results
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DamageRoll {
    pub damage: i64,
    pub is_critical: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefenseResult {
    pub original_damage: i64,
    pub final_damage: i64,
    pub damage_blocked: i64,
}

/// damage = base * (1 + str/100) + int * 0.25, then crit multiplier
pub fn damage_roll<R: Rng + ?Sized>(stats: &StatBlock, base: f64, rng: &mut R) -> DamageRoll {
    let strength = stats.strength as f64;
    let intelligence = stats.intelligence as f64;
    let crit_chance = stats.crit_chance as f64;
    let crit_damage = stats.crit_damage as f64;

    let mut damage = base * (1.0 + strength / 100.0) + intelligence * INTELLIGENCE_DAMAGE;

    let is_critical = rng.gen_range(0.0..100.0) < crit_chance;
    if is_critical {
        damage *= 1.0 + crit_damage / 100.0;
    }

    DamageRoll {
        damage: damage.floor() as i64,
        is_critical,
    }
}

/// Hyperbolic defense curve: never blocks everything, always lets 1 through.
pub fn defense_reduction(defense: i64, incoming: i64) -> DefenseResult {
    let defense = defense.max(0) as f64;
    let reduction = defense / (defense + 100.0);
    let reduced = incoming as f64 * (1.0 - reduction);
    DefenseResult {
        original_damage: incoming,
        final_damage: (reduced.floor() as i64).max(1),
        damage_blocked: (incoming as f64 - reduced).floor() as i64,
    }
}

// ============================================================================
// Actor Stats
// ============================================================================

/// Stat ledger view over an actor's properties
pub struct Stats<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
    base_mana: i64,
    mana_per_intelligence: f64,
}

impl<'a, A: Actor + ?Sized> Stats<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self::with_config(actor, &ManaConfig::default())
    }

    pub fn with_config(actor: &'a mut A, mana: &ManaConfig) -> Self {
        Self {
            actor,
            base_mana: mana.base_max,
            mana_per_intelligence: mana.mana_per_intelligence,
        }
    }

    pub fn get(&self, stat: Stat) -> i64 {
        self.actor.int(stat.key(), stat.default_value())
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        self.actor.set_int(stat.key(), stat.clamp(value));
        self.sync(stat);
    }

    pub fn add(&mut self, stat: Stat, amount: i64) {
        let current = self.get(stat);
        self.set(stat, current.saturating_add(amount));
    }

    pub fn remove(&mut self, stat: Stat, amount: i64) {
        let current = self.get(stat);
        self.set(stat, current.saturating_sub(amount));
    }

    pub fn all(&self) -> StatBlock {
        let mut block = StatBlock::default();
        for stat in Stat::ALL {
            block.set(stat, self.get(stat));
        }
        block
    }

    /// Write every stat from `block` and sync all derived attributes once.
    pub fn init(&mut self, block: &StatBlock) {
        for stat in Stat::ALL {
            self.actor.set_int(stat.key(), stat.clamp(block.get(stat)));
        }
        self.update_health();
        self.update_speed();
        self.update_mana_from_intelligence();
    }

    fn sync(&mut self, stat: Stat) {
        match stat {
            Stat::Health => self.update_health(),
            Stat::Speed => self.update_speed(),
            Stat::Intelligence => self.update_mana_from_intelligence(),
            _ => {}
        }
    }

    /// 2 bonus health = 1 extra heart
    fn update_health(&mut self) {
        let bonus = self.get(Stat::Health);
        self.actor.set_max_health(BASE_MAX_HEALTH + bonus / 2);
    }

    fn update_speed(&mut self) {
        let level = (self.get(Stat::Speed) / SPEED_PER_LEVEL).min(MAX_SPEED_AMPLIFIER);
        let amplifier = (level > 0).then_some(level as u8);
        self.actor.set_speed_effect(amplifier);
    }

    /// Cap = base + intelligence share + granted bonuses (prestige, rewards).
    fn update_mana_from_intelligence(&mut self) {
        let intelligence = self.get(Stat::Intelligence);
        let bonus = (intelligence as f64 * self.mana_per_intelligence).floor() as i64;
        let mut mana = Mana::of(&mut *self.actor);
        let granted = mana.bonus_max();
        mana.set_max(self.base_mana + bonus + granted);
    }

    // ------------------------------------------------------------------------
    // Formulas
    // ------------------------------------------------------------------------

    pub fn calculate_damage(&self, base: f64) -> DamageRoll {
        self.calculate_damage_with(base, &mut rand::thread_rng())
    }

    pub fn calculate_damage_with<R: Rng + ?Sized>(&self, base: f64, rng: &mut R) -> DamageRoll {
        damage_roll(&self.all(), base, rng)
    }

    pub fn calculate_defense(&self, incoming: i64) -> DefenseResult {
        defense_reduction(self.get(Stat::Defense), incoming)
    }
}

// ============================================================================
// Item Stats
// ============================================================================

/// Stat bonuses granted by a single item
pub fn item_stats(item: &ItemStack) -> StatBlock {
    let mut block = StatBlock::default();
    for stat in Stat::ALL {
        block.set(stat, item.int(stat.item_key(), 0));
    }
    block
}

/// Writer for stat bonuses on an item; keeps the stat lore lines in sync.
pub struct ItemStats<'a> {
    item: &'a mut ItemStack,
}

impl<'a> ItemStats<'a> {
    pub fn of(item: &'a mut ItemStack) -> Self {
        Self { item }
    }

    pub fn get(&self, stat: Stat) -> i64 {
        self.item.int(stat.item_key(), 0)
    }

    pub fn set(&mut self, stat: Stat, value: i64) {
        self.item
            .set_property(stat.item_key(), PropertyValue::Int(stat.clamp(value)));
        self.update_lore();
    }

    /// Replace all stat lines in the lore with the current bonuses
    pub fn update_lore(&mut self) {
        let mut lore: Vec<String> = self
            .item
            .lore
            .iter()
            .filter(|line| !line.starts_with(STAT_LORE_PREFIX))
            .cloned()
            .collect();

        for stat in Stat::ALL {
            let value = self.get(stat);
            if value > 0 {
                lore.push(stat.lore_line(value));
            }
        }
        self.item.lore = lore;
    }
}

/// Build a named, unstackable equipment item carrying stat bonuses.
pub fn create_item_with_stats(type_id: &str, name: &str, stats: &StatBlock, lore: &[&str]) -> ItemStack {
    let mut item = ItemStack::named(type_id, name, &[]).unstackable();
    {
        let mut writer = ItemStats::of(&mut item);
        for stat in Stat::ALL {
            let value = stats.get(stat);
            if value != 0 {
                writer.set(stat, value);
            }
        }
    }
    item.set_property(EQUIPMENT_FLAG, PropertyValue::Bool(true));

    let mut full_lore: Vec<String> = lore.iter().map(|l| l.to_string()).collect();
    full_lore.extend(item.lore.drain(..));
    item.lore = full_lore;
    item
}

/// Sum of bonuses from every equipment item in a container
pub fn equipment_stats(container: &Container) -> StatBlock {
    container
        .items()
        .filter(|item| item.flag(EQUIPMENT_FLAG))
        .map(item_stats)
        .fold(StatBlock::default(), |total, bonus| total + bonus)
}

/// Base stats plus equipment bonuses. Nothing is written back to the actor.
///
/// Used for damage, regen and ability contexts. Host attributes derived in
/// [`Stats`] (max health, speed effect, max mana) follow base stats only, so
/// equipment intelligence speeds up regen but does not raise the mana cap.
pub fn effective_stats<A: Actor + ?Sized>(actor: &mut A) -> StatBlock {
    let equipment = equipment_stats(actor.inventory());
    Stats::of(actor).all() + equipment
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MemoryActor;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn stats_actor(block: StatBlock) -> MemoryActor {
        let mut actor = MemoryActor::new("Steve");
        Stats::of(&mut actor).init(&block);
        actor
    }

    #[test]
    fn test_defaults_and_clamping() {
        let mut actor = MemoryActor::new("Steve");
        let mut stats = Stats::of(&mut actor);
        assert_eq!(stats.get(Stat::CritChance), 5);
        assert_eq!(stats.get(Stat::CritDamage), 50);
        assert_eq!(stats.get(Stat::Strength), 0);

        stats.set(Stat::CritChance, 250);
        assert_eq!(stats.get(Stat::CritChance), 100);
        stats.add(Stat::CritChance, -500);
        assert_eq!(stats.get(Stat::CritChance), 0);

        stats.remove(Stat::Strength, 10);
        assert_eq!(stats.get(Stat::Strength), 0);
    }

    #[test]
    fn test_intelligence_updates_max_mana() {
        let mut actor = MemoryActor::new("Steve");
        Stats::of(&mut actor).set(Stat::Intelligence, 10);
        assert_eq!(Mana::of(&mut actor).max(), 120);

        Stats::of(&mut actor).add(Stat::Intelligence, 5);
        assert_eq!(Mana::of(&mut actor).max(), 130);
    }

    #[test]
    fn test_health_and_speed_sync() {
        let mut actor = MemoryActor::new("Steve");
        Stats::of(&mut actor).set(Stat::Health, 11);
        assert_eq!(actor.max_health, 25);

        Stats::of(&mut actor).set(Stat::Speed, 250);
        assert_eq!(actor.speed_effect, Some(2));
        Stats::of(&mut actor).set(Stat::Speed, 9000);
        assert_eq!(actor.speed_effect, Some(5));
        Stats::of(&mut actor).set(Stat::Speed, 99);
        assert_eq!(actor.speed_effect, None);
    }

    #[test]
    fn test_damage_without_crit() {
        let mut block = StatBlock::starting();
        block.strength = 50;
        block.intelligence = 8;
        block.crit_chance = 0;
        let mut actor = stats_actor(block);

        let mut rng = StdRng::seed_from_u64(7);
        let roll = Stats::of(&mut actor).calculate_damage_with(10.0, &mut rng);
        // 10 * 1.5 + 8 * 0.25 = 17
        assert_eq!(roll, DamageRoll { damage: 17, is_critical: false });
    }

    #[test]
    fn test_damage_with_guaranteed_crit() {
        let mut block = StatBlock::starting();
        block.crit_chance = 100;
        block.crit_damage = 50;
        let mut actor = stats_actor(block);

        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..20 {
            let roll = Stats::of(&mut actor).calculate_damage_with(10.0, &mut rng);
            assert!(roll.is_critical);
            assert_eq!(roll.damage, 15);
        }
    }

    #[test]
    fn test_defense_curve() {
        assert_eq!(defense_reduction(100, 100).final_damage, 50);
        assert_eq!(defense_reduction(100, 100).damage_blocked, 50);
        assert_eq!(defense_reduction(0, 100).final_damage, 100);
        assert_eq!(defense_reduction(0, 100).damage_blocked, 0);
        assert_eq!(defense_reduction(1_000_000, 3).final_damage, 1);
        assert_eq!(defense_reduction(50, 0).final_damage, 1);

        for defense in [0, 1, 10, 99, 100, 1000, 50_000] {
            for incoming in [0, 1, 2, 7, 100, 10_000] {
                assert!(defense_reduction(defense, incoming).final_damage >= 1);
            }
        }
    }

    #[test]
    fn test_item_lore_tracks_stats() {
        let sword = create_item_with_stats(
            "minecraft:iron_sword",
            "Training Sword",
            &StatBlock { strength: 5, crit_chance: 3, ..StatBlock::default() },
            &["Your first weapon"],
        );

        assert_eq!(sword.max_amount, 1);
        assert!(sword.flag("equipment"));
        assert_eq!(
            sword.lore,
            vec!["Your first weapon", "§7Strength: §c+5", "§7Crit Chance: §9+3%"]
        );

        let mut sword = sword;
        ItemStats::of(&mut sword).set(Stat::Strength, 0);
        assert_eq!(sword.lore, vec!["Your first weapon", "§7Crit Chance: §9+3%"]);
    }

    #[test]
    fn test_equipment_stats_sum_only_equipment() {
        let mut container = Container::new(4);
        container.add_item(create_item_with_stats(
            "minecraft:iron_sword",
            "Sword",
            &StatBlock { strength: 5, ..StatBlock::default() },
            &[],
        ));
        container.add_item(create_item_with_stats(
            "minecraft:leather_chestplate",
            "Armor",
            &StatBlock { defense: 8, strength: 2, ..StatBlock::default() },
            &[],
        ));
        let mut plain = ItemStack::new("minecraft:stick", 1);
        plain.set_property("itemStrength", PropertyValue::Int(99));
        container.add_item(plain);

        let total = equipment_stats(&container);
        assert_eq!(total.strength, 7);
        assert_eq!(total.defense, 8);
    }

    #[test]
    fn test_effective_stats_adds_equipment_without_writing() {
        let mut block = StatBlock::starting();
        block.strength = 5;
        let mut actor = stats_actor(block);
        actor.inventory.add_item(create_item_with_stats(
            "minecraft:iron_sword",
            "Sword",
            &StatBlock { strength: 10, intelligence: 20, ..StatBlock::default() },
            &[],
        ));
        let max_before = Mana::of(&mut actor).max();

        let effective = effective_stats(&mut actor);
        assert_eq!(effective.strength, 15);
        assert_eq!(effective.intelligence, block.intelligence + 20);
        assert_eq!(Stats::of(&mut actor).get(Stat::Strength), 5);
        // Equipment intelligence never feeds the mana cap
        assert_eq!(Mana::of(&mut actor).max(), max_before);
    }
}
