//! Progression Tracker
//!
//! Turns host events into skill XP, mastery uses and recipe unlocks, and
//! owns the achievement table. XP always goes through [`award_xp`] so the
//! prestige multiplier applies.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::actor::Actor;
use crate::config::ForgeConfig;
use crate::events::GameEvent;
use crate::mana::Mana;
use crate::progression::{Mastery, Prestige, RecipeUnlocks, SkillType, Skills, award_xp};

/// Mastery id credited for every broken block
pub const MINING_MASTERY: &str = "mining";
pub const CRAFTING_XP: i64 = 5;
pub const TITLE_KEY: &str = "title";
const PRESTIGE_NOTIFIED_KEY: &str = "prestige_ready_notified";

/// Skill XP for breaking a block: ores 5 mining, logs 2 foraging, else 1 mining
pub fn block_xp(block_type: &str) -> (SkillType, i64) {
    if block_type.contains("ore") {
        (SkillType::Mining, 5)
    } else if block_type.contains("log") {
        (SkillType::Foraging, 2)
    } else {
        (SkillType::Mining, 1)
    }
}

/// Combat XP for a kill: bosses 50, hostiles 5, else 3
pub fn kill_xp(entity_type: &str) -> i64 {
    if entity_type.contains("boss") {
        50
    } else if entity_type.contains("hostile") {
        5
    } else {
        3
    }
}

// ============================================================================
// Achievements
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Reward {
    Xp { skill: SkillType, amount: i64 },
    Mana { amount: i64 },
    Recipe { id: String },
    Title { title: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Achievement {
    pub name: String,
    pub description: String,
    pub reward: Reward,
}

impl Achievement {
    fn new(name: &str, description: &str, reward: Reward) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            reward,
        }
    }
}

/// One-shot achievements keyed by id. Completion is stored on the actor as
/// `achievement_<id>`.
#[derive(Debug, Clone, Default)]
pub struct Achievements {
    entries: BTreeMap<String, Achievement>,
}

impl Achievements {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn standard() -> Self {
        let mut achievements = Self::new();
        achievements.insert(
            "first_kill",
            Achievement::new(
                "First Blood",
                "Kill your first enemy",
                Reward::Xp {
                    skill: SkillType::Combat,
                    amount: 100,
                },
            ),
        );
        achievements.insert(
            "master_crafter",
            Achievement::new(
                "Master Crafter",
                "Reach crafting level 25",
                Reward::Recipe {
                    id: "legendary_weapons".to_string(),
                },
            ),
        );
        achievements.insert(
            "weapon_master",
            Achievement::new(
                "Weapon Master",
                "Get mastery 5 on any weapon",
                Reward::Mana { amount: 50 },
            ),
        );
        achievements.insert(
            "prestigious",
            Achievement::new(
                "Prestigious",
                "Reach prestige level 1",
                Reward::Title {
                    title: "§6[Prestigious]".to_string(),
                },
            ),
        );
        achievements
    }

    pub fn insert(&mut self, id: &str, achievement: Achievement) {
        self.entries.insert(id.to_string(), achievement);
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.entries.get(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn is_completed<A: Actor + ?Sized>(actor: &A, id: &str) -> bool {
        actor.flag(&format!("achievement_{}", id))
    }

    /// Grant an achievement once. Returns true only on the granting call.
    pub fn check<A: Actor + ?Sized>(&self, actor: &mut A, id: &str, config: &ForgeConfig) -> bool {
        let Some(achievement) = self.entries.get(id) else {
            debug!("Unknown achievement '{}'", id);
            return false;
        };
        if Self::is_completed(actor, id) {
            return false;
        }

        actor.set_flag(&format!("achievement_{}", id), true);
        match &achievement.reward {
            Reward::Xp { skill, amount } => {
                Skills::with_config(&mut *actor, &config.skills).add_xp(*skill, *amount);
            }
            Reward::Mana { amount } => Mana::of(&mut *actor).grant_max_bonus(*amount),
            Reward::Recipe { id } => RecipeUnlocks::of(&mut *actor).unlock(id),
            Reward::Title { title } => actor.set_property(TITLE_KEY, title.as_str().into()),
        }

        actor.send_message(&format!("§6§l★ ACHIEVEMENT UNLOCKED! §r§6{}", achievement.name));
        actor.send_message(&format!("§7{}", achievement.description));
        actor.play_sound("ui.toast.challenge_complete");
        info!("{} unlocked achievement {}", actor.name(), id);
        true
    }
}

// ============================================================================
// Recipe Unlocks
// ============================================================================

struct LevelUnlock {
    skill: SkillType,
    level: i64,
    recipe: &'static str,
    display_name: &'static str,
}

const LEVEL_UNLOCKS: [LevelUnlock; 2] = [
    LevelUnlock {
        skill: SkillType::Crafting,
        level: 10,
        recipe: "iron_sword_advanced",
        display_name: "Advanced Iron Sword",
    },
    LevelUnlock {
        skill: SkillType::Combat,
        level: 15,
        recipe: "enchanted_weapon",
        display_name: "Enchanted Weapons",
    },
];

// ============================================================================
// Game Tracker
// ============================================================================

pub struct GameTracker {
    config: ForgeConfig,
    achievements: Achievements,
    /// Ability ids whose held-item kills count toward mastery
    tracked: BTreeSet<String>,
}

impl GameTracker {
    pub fn new<I, S>(config: ForgeConfig, tracked: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            config,
            achievements: Achievements::standard(),
            tracked: tracked.into_iter().map(Into::into).collect(),
        }
    }

    pub fn achievements(&self) -> &Achievements {
        &self.achievements
    }

    pub fn on_event<A: Actor + ?Sized>(&self, actor: &mut A, event: &GameEvent) {
        match event {
            GameEvent::BlockBroken { block_type, .. } => {
                let (skill, amount) = block_xp(block_type);
                award_xp(actor, &self.config, skill, amount);
                self.add_mastery_use(actor, MINING_MASTERY);
            }
            GameEvent::EntityKilled { entity_type, .. } => {
                award_xp(actor, &self.config, SkillType::Combat, kill_xp(entity_type));
                let weapon = actor
                    .held_item()
                    .and_then(|item| item.ability())
                    .filter(|id| self.tracked.contains(*id))
                    .map(str::to_string);
                if let Some(weapon) = weapon {
                    self.add_mastery_use(actor, &weapon);
                }
                self.achievements.check(actor, "first_kill", &self.config);
            }
            GameEvent::ItemCrafted { .. } => {
                award_xp(actor, &self.config, SkillType::Crafting, CRAFTING_XP);
                self.check_recipe_unlocks(actor);
            }
            GameEvent::EntityHurt { .. } | GameEvent::PlayerJoined { .. } | GameEvent::PlayerLeft { .. } => {}
        }
    }

    /// Record a mastery use; reaching the top level grants Weapon Master
    pub fn add_mastery_use<A: Actor + ?Sized>(&self, actor: &mut A, id: &str) {
        let max_level = self.config.mastery.thresholds.len() as u8;
        let mut mastery = Mastery::with_config(&mut *actor, &self.config.mastery);
        if mastery.add_usage(id) && mastery.level(id) >= max_level && id != MINING_MASTERY {
            self.achievements.check(actor, "weapon_master", &self.config);
        }
    }

    /// Unlock the level-gated recipes the actor now qualifies for
    pub fn check_recipe_unlocks<A: Actor + ?Sized>(&self, actor: &mut A) {
        for unlock in &LEVEL_UNLOCKS {
            let level = Skills::with_config(&mut *actor, &self.config.skills).level(unlock.skill);
            let mut unlocks = RecipeUnlocks::of(&mut *actor);
            if level >= unlock.level && !unlocks.has(unlock.recipe) {
                unlocks.unlock(unlock.recipe);
                actor.send_message(&format!("§6New recipe unlocked: §e{}", unlock.display_name));
            }
        }
    }

    /// Periodic checks: skill and prestige achievements, and a one-time
    /// notice once the actor can prestige
    pub fn check_milestones<A: Actor + ?Sized>(&self, actor: &mut A) {
        let crafting = Skills::with_config(&mut *actor, &self.config.skills).level(SkillType::Crafting);
        if crafting >= 25 {
            self.achievements.check(actor, "master_crafter", &self.config);
        }

        let mut prestige = Prestige::with_config(&mut *actor, &self.config);
        let prestige_level = prestige.level();
        let ready = prestige.can_prestige();
        if prestige_level >= 1 {
            self.achievements.check(actor, "prestigious", &self.config);
        }

        if ready && !actor.flag(PRESTIGE_NOTIFIED_KEY) {
            actor.send_message("§6§lYou can now PRESTIGE! §r§eOpen the progression menu to prestige.");
            actor.set_flag(PRESTIGE_NOTIFIED_KEY, true);
        }
    }

    /// Allow the prestige-ready notice to fire again after a prestige
    pub fn reset_prestige_notice<A: Actor + ?Sized>(actor: &mut A) {
        actor.set_flag(PRESTIGE_NOTIFIED_KEY, false);
    }
}
