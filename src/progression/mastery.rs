//! Mastery
//!
//! Usage-driven proficiency per ability or weapon. Every use bumps a counter;
//! the level is the number of thresholds the counter has reached.

use serde::Serialize;

use crate::actor::Actor;
use crate::config::{DEFAULT_CONFIG, MasteryConfig};

/// Level reached for a usage count: how many thresholds are `<= usage`.
pub fn level_for_usage(usage: u64, thresholds: &[u64]) -> u8 {
    thresholds.iter().take_while(|t| usage >= **t).count() as u8
}

/// Scaling bonuses granted by a mastery level
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MasteryBonuses {
    pub damage_bonus: f64,
    pub cooldown_reduction: f64,
    pub mana_reduction: f64,
}

pub fn bonuses_for_level(level: u8, config: &MasteryConfig) -> MasteryBonuses {
    let level = f64::from(level);
    MasteryBonuses {
        damage_bonus: level * config.damage_per_level,
        cooldown_reduction: level * config.cooldown_per_level,
        mana_reduction: level * config.mana_per_level,
    }
}

/// Mastery ledger view over an actor's properties
pub struct Mastery<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
    config: &'a MasteryConfig,
}

impl<'a, A: Actor + ?Sized> Mastery<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self::with_config(actor, &DEFAULT_CONFIG.mastery)
    }

    pub fn with_config(actor: &'a mut A, config: &'a MasteryConfig) -> Self {
        Self { actor, config }
    }

    pub fn level(&self, id: &str) -> u8 {
        let stored = self.actor.int(&format!("mastery_{}", id), 0);
        stored.clamp(0, self.config.thresholds.len() as i64) as u8
    }

    pub fn usage(&self, id: &str) -> u64 {
        self.actor.int(&format!("usage_{}", id), 0).max(0) as u64
    }

    /// Record one use. Returns true when a new mastery level was reached.
    pub fn add_usage(&mut self, id: &str) -> bool {
        let usage = self.usage(id) + 1;
        let current = self.level(id);
        self.actor.set_int(&format!("usage_{}", id), usage as i64);

        let reached = level_for_usage(usage, &self.config.thresholds);
        if reached > current {
            self.actor.set_int(&format!("mastery_{}", id), i64::from(reached));
            self.actor
                .send_message(&format!("§d§lMASTERY UP! §r§5{} Mastery {}", id, reached));
            return true;
        }
        false
    }

    pub fn bonuses(&self, id: &str) -> MasteryBonuses {
        bonuses_for_level(self.level(id), self.config)
    }

    /// Seed zeroed counters without touching existing progress
    pub fn initialize(&mut self, id: &str) {
        let level_key = format!("mastery_{}", id);
        if !self.actor.has_property(&level_key) {
            self.actor.set_int(&level_key, 0);
            self.actor.set_int(&format!("usage_{}", id), 0);
        }
    }
}
