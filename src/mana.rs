//! Mana
//!
//! Per-actor resource pool stored in actor properties. The current value is
//! always kept inside `[0, max]`; every setter clamps.

use crate::actor::{Actor, PropertyValue};
use crate::item::ItemStack;

pub const DEFAULT_MAX_MANA: i64 = 100;
pub const DEFAULT_MANA_REGEN: i64 = 6;

const MANA_KEY: &str = "mana";
const MAX_MANA_KEY: &str = "maxMana";
const REGEN_KEY: &str = "manaRegen";
const BONUS_MAX_KEY: &str = "bonusMaxMana";
const ITEM_COST_KEY: &str = "manaCost";

/// Resource pool view over an actor's properties
pub struct Mana<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
}

impl<'a, A: Actor + ?Sized> Mana<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self { actor }
    }

    pub fn get(&self) -> i64 {
        self.actor.int(MANA_KEY, 0)
    }

    pub fn set(&mut self, value: i64) {
        let max = self.max();
        self.actor.set_int(MANA_KEY, value.clamp(0, max));
    }

    pub fn add(&mut self, amount: i64) {
        let current = self.get();
        self.set(current.saturating_add(amount));
    }

    pub fn remove(&mut self, amount: i64) {
        let current = self.get();
        self.set(current.saturating_sub(amount));
    }

    pub fn has(&self, amount: i64) -> bool {
        self.get() >= amount
    }

    // ------------------------------------------------------------------------
    // Capacity
    // ------------------------------------------------------------------------

    pub fn max(&self) -> i64 {
        self.actor.int(MAX_MANA_KEY, DEFAULT_MAX_MANA)
    }

    /// Set the cap (never below 0), pulling the current value down if needed.
    pub fn set_max(&mut self, value: i64) {
        let new_max = value.max(0);
        self.actor.set_int(MAX_MANA_KEY, new_max);
        if self.get() > new_max {
            self.actor.set_int(MANA_KEY, new_max);
        }
    }

    pub fn add_max(&mut self, amount: i64) {
        let max = self.max();
        self.set_max(max.saturating_add(amount));
    }

    pub fn remove_max(&mut self, amount: i64) {
        let max = self.max();
        self.set_max(max.saturating_sub(amount));
    }

    /// Permanent capacity granted by prestige and rewards. Kept apart from
    /// `maxMana` so recomputing the cap from intelligence preserves it.
    pub fn bonus_max(&self) -> i64 {
        self.actor.int(BONUS_MAX_KEY, 0)
    }

    /// Record a permanent capacity bonus and raise the current cap by it.
    pub fn grant_max_bonus(&mut self, amount: i64) {
        let amount = amount.max(0);
        let bonus = self.bonus_max();
        self.actor.set_int(BONUS_MAX_KEY, bonus.saturating_add(amount));
        self.add_max(amount);
    }

    // ------------------------------------------------------------------------
    // Regeneration
    // ------------------------------------------------------------------------

    pub fn regen(&self) -> i64 {
        self.actor.int(REGEN_KEY, DEFAULT_MANA_REGEN)
    }

    pub fn set_regen(&mut self, value: i64) {
        self.actor.set_int(REGEN_KEY, value.max(0));
    }

    pub fn add_regen(&mut self, amount: i64) {
        let regen = self.regen();
        self.set_regen(regen.saturating_add(amount));
    }

    pub fn remove_regen(&mut self, amount: i64) {
        let regen = self.regen();
        self.set_regen(regen.saturating_sub(amount));
    }

    /// One regeneration step: regen rate plus any external bonus, clamped.
    pub fn regen_tick(&mut self, bonus: i64) {
        let amount = self.regen().saturating_add(bonus.max(0));
        self.add(amount);
    }

    /// Fill the pool and set capacity and regen. Used on first join.
    pub fn init(&mut self, max: i64, regen: i64) {
        self.actor.set_int(MAX_MANA_KEY, max.max(0));
        self.actor.set_int(REGEN_KEY, regen.max(0));
        self.actor.set_int(MANA_KEY, max.max(0));
    }

    pub fn is_initialized(&self) -> bool {
        self.actor.has_property(MAX_MANA_KEY)
    }
}

// ============================================================================
// HUD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManaChange {
    None,
    Spent(i64),
    Gained(i64),
}

/// Show the mana bar on the actor's HUD.
pub fn display<A: Actor + ?Sized>(actor: &mut A, change: ManaChange) {
    let (current, max) = {
        let mana = Mana::of(&mut *actor);
        (mana.get(), mana.max())
    };
    let suffix = match change {
        ManaChange::None => String::new(),
        ManaChange::Spent(n) => format!(" §c-{}", n),
        ManaChange::Gained(n) => format!(" §a+{}", n),
    };
    actor.set_action_bar(&format!("§9Mana: §b{}§7/§b{}{}", current, max, suffix));
}

// ============================================================================
// Item Mana Cost
// ============================================================================

/// Mana cost stamped onto an individual item
pub struct ItemManaCost<'a> {
    item: &'a mut ItemStack,
}

impl<'a> ItemManaCost<'a> {
    pub fn of(item: &'a mut ItemStack) -> Self {
        Self { item }
    }

    pub fn get(&self) -> i64 {
        self.item.int(ITEM_COST_KEY, 0)
    }

    pub fn set(&mut self, value: i64) {
        self.item
            .set_property(ITEM_COST_KEY, PropertyValue::Int(value.max(0)));
    }

    pub fn add(&mut self, amount: i64) {
        let cost = self.get();
        self.set(cost.saturating_add(amount));
    }

    pub fn remove(&mut self, amount: i64) {
        let cost = self.get();
        self.set(cost.saturating_sub(amount));
    }

    pub fn has(&self, amount: i64) -> bool {
        self.get() >= amount
    }
}
