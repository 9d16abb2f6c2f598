//! Ability Registry
//!
//! Maps ability ids to handlers and mediates every invocation:
//! look up, mastery-adjusted cost, mana check, handler, deduction.
//!
//! A handler error is logged and swallowed; the mana is still charged.
//! Running out of mana is an expected outcome, reported to the actor and
//! returned to the caller, never an error.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::actor::{Actor, validate_key_part};
use crate::config::MasteryConfig;
use crate::error::{ForgeError, Result};
use crate::mana::{self, Mana, ManaChange};
use crate::progression::Mastery;

use super::context::{AbilityContext, MasteryContext};

/// Handler signature for every ability
pub type AbilityHandler = Box<dyn Fn(&mut dyn Actor, &AbilityContext) -> anyhow::Result<()>>;

struct AbilityEntry {
    handler: AbilityHandler,
    cost: i64,
    uses_cost: bool,
}

/// What happened to an invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum DispatchOutcome {
    /// No ability is registered under this id
    NotFound,
    /// The handler ran; `cost_spent` was charged whether or not it failed
    Executed { cost_spent: i64, handler_failed: bool },
    /// The pool could not cover the adjusted cost; nothing ran
    Insufficient { adjusted_cost: i64, available: i64 },
}

impl DispatchOutcome {
    pub fn handler_ran(&self) -> bool {
        matches!(self, DispatchOutcome::Executed { .. })
    }
}

/// `floor(cost * (1 - mana_reduction))`
pub fn adjusted_cost(cost: i64, mana_reduction: f64) -> i64 {
    ((cost as f64) * (1.0 - mana_reduction)).floor().max(0.0) as i64
}

pub struct AbilityRegistry {
    abilities: HashMap<String, AbilityEntry>,
    mastery: MasteryConfig,
}

impl AbilityRegistry {
    pub fn new() -> Self {
        Self::with_config(MasteryConfig::default())
    }

    pub fn with_config(mastery: MasteryConfig) -> Self {
        Self {
            abilities: HashMap::new(),
            mastery,
        }
    }

    /// Register a handler. A second registration under the same id replaces the first.
    pub fn register<F>(&mut self, id: &str, handler: F, cost: i64, uses_cost: bool) -> Result<()>
    where
        F: Fn(&mut dyn Actor, &AbilityContext) -> anyhow::Result<()> + 'static,
    {
        validate_key_part(id)?;
        if cost < 0 {
            return Err(ForgeError::InvalidAbility {
                id: id.to_string(),
                reason: format!("negative cost {}", cost),
            });
        }

        if self.abilities.contains_key(id) {
            warn!("Duplicate ability ID '{}', overwriting", id);
        }
        self.abilities.insert(
            id.to_string(),
            AbilityEntry {
                handler: Box::new(handler),
                cost,
                uses_cost,
            },
        );
        debug!("Registered ability {} (cost {}, uses mana: {})", id, cost, uses_cost);
        Ok(())
    }

    pub fn unregister(&mut self, id: &str) -> bool {
        self.abilities.remove(id).is_some()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.abilities.contains_key(id)
    }

    /// Base cost before any mastery discount
    pub fn cost(&self, id: &str) -> Option<i64> {
        self.abilities.get(id).map(|e| e.cost)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.abilities.keys()
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }

    /// Dispatch an ability for an actor
    pub fn invoke(&self, id: &str, actor: &mut dyn Actor, ctx: &AbilityContext) -> DispatchOutcome {
        let Some(entry) = self.abilities.get(id) else {
            warn!("Unknown ability '{}' invoked by {}", id, actor.name());
            return DispatchOutcome::NotFound;
        };

        if !entry.uses_cost {
            let handler_failed = run_handler(id, entry, actor, ctx);
            return DispatchOutcome::Executed {
                cost_spent: 0,
                handler_failed,
            };
        }

        let (level, bonuses) = {
            let mastery = Mastery::with_config(&mut *actor, &self.mastery);
            (mastery.level(id), mastery.bonuses(id))
        };
        let adjusted = adjusted_cost(entry.cost, bonuses.mana_reduction);

        let available = Mana::of(&mut *actor).get();
        if available < adjusted {
            actor.send_message(&format!(
                "§cNot enough mana! §7(§b{}§7 needed, §b{}§7 available)",
                adjusted, available
            ));
            actor.play_sound("note.bass");
            return DispatchOutcome::Insufficient {
                adjusted_cost: adjusted,
                available,
            };
        }

        let enriched = ctx.enriched(MasteryContext {
            level,
            bonuses,
            damage_multiplier: 1.0 + bonuses.damage_bonus,
            adjusted_cost: adjusted,
        });
        let handler_failed = run_handler(id, entry, actor, &enriched);

        Mana::of(&mut *actor).remove(adjusted);
        mana::display(actor, ManaChange::Spent(adjusted));

        DispatchOutcome::Executed {
            cost_spent: adjusted,
            handler_failed,
        }
    }
}

impl Default for AbilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Run a handler, returning true if it failed
fn run_handler(id: &str, entry: &AbilityEntry, actor: &mut dyn Actor, ctx: &AbilityContext) -> bool {
    match (entry.handler)(actor, ctx) {
        Ok(()) => false,
        Err(e) => {
            error!("Error using ability {} for {}: {:#}", id, actor.name(), e);
            true
        }
    }
}
