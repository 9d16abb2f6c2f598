//! Skill progression with exponentially scaling XP requirements.
//!
//! Skills: Combat, Magic, Mining, Foraging, Crafting, Utility
//! - Level 0 to 50, starting at 0
//! - Reaching level L+1 needs (L+1) * 1000 * 1.2^L cumulative XP
//! - Each skill carries a list of unlocked skill-tree nodes

use serde::{Deserialize, Serialize};

use crate::actor::{Actor, PropertyValue};
use crate::config::{DEFAULT_CONFIG, SkillsConfig};
use crate::error::{ForgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Combat,
    Magic,
    Mining,
    Foraging,
    Crafting,
    Utility,
}

impl SkillType {
    pub const ALL: [SkillType; 6] = [
        SkillType::Combat,
        SkillType::Magic,
        SkillType::Mining,
        SkillType::Foraging,
        SkillType::Crafting,
        SkillType::Utility,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SkillType::Combat => "combat",
            SkillType::Magic => "magic",
            SkillType::Mining => "mining",
            SkillType::Foraging => "foraging",
            SkillType::Crafting => "crafting",
            SkillType::Utility => "utility",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "combat" => Some(SkillType::Combat),
            "magic" => Some(SkillType::Magic),
            "mining" => Some(SkillType::Mining),
            "foraging" => Some(SkillType::Foraging),
            "crafting" => Some(SkillType::Crafting),
            "utility" => Some(SkillType::Utility),
            _ => None,
        }
    }

    fn level_key(&self) -> String {
        format!("skill_{}_level", self.as_str())
    }

    fn xp_key(&self) -> String {
        format!("skill_{}_xp", self.as_str())
    }

    fn nodes_key(&self) -> String {
        format!("skill_{}_nodes", self.as_str())
    }
}

/// Cumulative XP needed to advance from `level` to `level + 1`.
/// Level 0 -> 1 = 1000 XP, 1 -> 2 = 2400 XP, 2 -> 3 = 4320 XP
pub fn xp_for_next_level(level: i64, config: &SkillsConfig) -> f64 {
    (level + 1) as f64 * config.base_xp * config.growth.powi(level as i32)
}

/// Highest level whose requirement `xp` satisfies, capped at max level.
pub fn level_for_xp(xp: i64, config: &SkillsConfig) -> i64 {
    let mut level = 0;
    while level < config.max_level && xp as f64 >= xp_for_next_level(level, config) {
        level += 1;
    }
    level
}

/// Individual skill data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    pub level: i64,
    pub xp: i64,
}

impl Skill {
    /// XP still needed for the next level (0 at max level)
    pub fn xp_to_next_level(&self, config: &SkillsConfig) -> i64 {
        if self.level >= config.max_level {
            return 0;
        }
        (xp_for_next_level(self.level, config).ceil() as i64 - self.xp).max(0)
    }

    /// Progress toward the next level (0.0 to 1.0)
    pub fn level_progress(&self, config: &SkillsConfig) -> f32 {
        if self.level >= config.max_level {
            return 1.0;
        }
        let floor = if self.level == 0 {
            0.0
        } else {
            xp_for_next_level(self.level - 1, config)
        };
        let next = xp_for_next_level(self.level, config);
        ((self.xp as f64 - floor) / (next - floor)).clamp(0.0, 1.0) as f32
    }
}

/// Skill ledger view over an actor's properties
pub struct Skills<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
    config: &'a SkillsConfig,
}

impl<'a, A: Actor + ?Sized> Skills<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self::with_config(actor, &DEFAULT_CONFIG.skills)
    }

    pub fn with_config(actor: &'a mut A, config: &'a SkillsConfig) -> Self {
        Self { actor, config }
    }

    pub fn level(&self, skill: SkillType) -> i64 {
        self.actor.int(&skill.level_key(), 0)
    }

    pub fn xp(&self, skill: SkillType) -> i64 {
        self.actor.int(&skill.xp_key(), 0)
    }

    pub fn get(&self, skill: SkillType) -> Skill {
        Skill {
            level: self.level(skill),
            xp: self.xp(skill),
        }
    }

    /// Add XP, returning true if the skill leveled up
    pub fn add_xp(&mut self, skill: SkillType, amount: i64) -> bool {
        let current = self.level(skill);
        let xp = self.xp(skill).saturating_add(amount.max(0));
        self.actor.set_int(&skill.xp_key(), xp);

        let new_level = level_for_xp(xp, self.config).max(current);
        if new_level > current {
            self.actor.set_int(&skill.level_key(), new_level);
            self.actor.send_message(&format!(
                "§6§lSKILL LEVEL UP! §r§e{} is now level {}",
                skill.as_str(),
                new_level
            ));
            self.actor.play_sound("random.levelup");
            true
        } else {
            false
        }
    }

    /// Unlocked skill-tree nodes
    pub fn nodes(&self, skill: SkillType) -> Result<Vec<String>> {
        let key = skill.nodes_key();
        match self.actor.text(&key) {
            Some(raw) if !raw.is_empty() => {
                serde_json::from_str(&raw).map_err(|source| ForgeError::Json { key, source })
            }
            _ => Ok(Vec::new()),
        }
    }

    /// Unlock a node if the skill level covers its cost. Returns true if newly unlocked.
    pub fn unlock_node(&mut self, skill: SkillType, node_id: &str, cost: i64) -> Result<bool> {
        if self.level(skill) < cost {
            return Ok(false);
        }

        let mut nodes = self.nodes(skill)?;
        if nodes.iter().any(|n| n == node_id) {
            return Ok(false);
        }
        nodes.push(node_id.to_string());
        self.store_nodes(skill, &nodes);
        Ok(true)
    }

    /// Zero the level, XP and node list of a skill
    pub fn reset(&mut self, skill: SkillType) {
        self.actor.set_int(&skill.level_key(), 0);
        self.actor.set_int(&skill.xp_key(), 0);
        self.store_nodes(skill, &[]);
    }

    /// Seed every configured category that has never been written
    pub fn initialize(&mut self) {
        for skill in self.config.categories.clone() {
            if !self.actor.has_property(&skill.level_key()) {
                self.reset(skill);
            }
        }
    }

    fn store_nodes(&mut self, skill: SkillType, nodes: &[String]) {
        let encoded = serde_json::Value::from(nodes.to_vec()).to_string();
        self.actor
            .set_property(&skill.nodes_key(), PropertyValue::Text(encoded));
    }
}
