use serde::Serialize;

use crate::actor::Actor;
use crate::config::{DEFAULT_CONFIG, ForgeConfig};
use crate::mana::Mana;
use crate::progression::skills::{SkillType, Skills};

const PRESTIGE_KEY: &str = "prestige_level";

/// Permanent bonuses earned through prestige
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrestigeBonuses {
    pub xp_multiplier: f64,
    pub max_mana_bonus: i64,
    pub rare_find_chance: f64,
}

/// Prestige ledger view over an actor's properties
pub struct Prestige<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
    config: &'a ForgeConfig,
}

impl<'a, A: Actor + ?Sized> Prestige<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self::with_config(actor, &DEFAULT_CONFIG)
    }

    pub fn with_config(actor: &'a mut A, config: &'a ForgeConfig) -> Self {
        Self { actor, config }
    }

    pub fn level(&self) -> i64 {
        self.actor.int(PRESTIGE_KEY, 0)
    }

    /// Every required skill at or above the required level
    pub fn can_prestige(&mut self) -> bool {
        let required_level = self.config.prestige.required_level;
        let skills = Skills::with_config(&mut *self.actor, &self.config.skills);
        self.config
            .prestige
            .required_skills
            .iter()
            .all(|skill| skills.level(*skill) >= required_level)
    }

    /// Reset all skill categories and advance one prestige level.
    /// Returns false (and changes nothing) when the actor is not eligible.
    pub fn prestige(&mut self) -> bool {
        if !self.can_prestige() {
            return false;
        }

        let next = self.level() + 1;
        {
            let mut skills = Skills::with_config(&mut *self.actor, &self.config.skills);
            for skill in self
                .config
                .skills
                .categories
                .iter()
                .chain(self.config.prestige.required_skills.iter())
            {
                skills.reset(*skill);
            }
        }

        self.actor.set_int(PRESTIGE_KEY, next);
        Mana::of(&mut *self.actor).grant_max_bonus(self.config.prestige.mana_bonus);

        self.actor
            .send_message(&format!("§c§l§kii§r §6§lPRESTIGE {}! §r§c§l§kii", next));
        self.actor.play_sound("ui.toast.challenge_complete");
        true
    }

    pub fn bonuses(&self) -> PrestigeBonuses {
        let level = self.level();
        PrestigeBonuses {
            xp_multiplier: 1.0 + level as f64 * self.config.prestige.xp_bonus_per_level,
            max_mana_bonus: level * self.config.prestige.mana_bonus,
            rare_find_chance: level as f64 * self.config.prestige.rare_find_per_level,
        }
    }
}

/// Grant skill XP scaled by the actor's prestige multiplier.
/// Returns true if the skill leveled up.
pub fn award_xp<A: Actor + ?Sized>(
    actor: &mut A,
    config: &ForgeConfig,
    skill: SkillType,
    base: i64,
) -> bool {
    let multiplier = Prestige::with_config(&mut *actor, config).bonuses().xp_multiplier;
    let amount = (base as f64 * multiplier).floor() as i64;
    Skills::with_config(actor, &config.skills).add_xp(skill, amount)
}
