//! Crafting Table
//!
//! A per-actor 3x3 working grid. Items are placed and taken by cell; a craft
//! resolves the grid against the registry, enforces the matched recipe's
//! gates, consumes exactly the claimed cells and delivers the output to the
//! actor's inventory.

use tracing::debug;

use crate::actor::Actor;
use crate::item::ItemStack;

use super::definition::RecipeId;
use super::grid::CraftingGrid;
use super::registry::{CraftCheck, RecipeRegistry};

/// Result of a craft attempt
#[derive(Debug, Clone, PartialEq)]
pub enum CraftResult {
    Crafted {
        recipe: RecipeId,
        output: ItemStack,
        /// Part of the output that did not fit in the inventory
        leftover: Option<ItemStack>,
    },
    Blocked(CraftCheck),
}

fn blocked_reason(check: &CraftCheck) -> Option<String> {
    match check {
        CraftCheck::Locked { .. } => Some("§cYou haven't unlocked this recipe yet!".to_string()),
        CraftCheck::NeedsSkill {
            skill,
            required,
            current,
            ..
        } => Some(format!(
            "§cRequires {} level {}! Current: {}",
            skill.as_str(),
            required,
            current
        )),
        CraftCheck::Ready { .. } | CraftCheck::NoMatch => None,
    }
}

#[derive(Debug, Clone, Default)]
pub struct CraftingTable {
    grid: CraftingGrid,
}

impl CraftingTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn grid(&self) -> &CraftingGrid {
        &self.grid
    }

    /// Place a stack in a cell, returning whatever it replaced
    pub fn put(&mut self, index: usize, stack: ItemStack) -> Option<ItemStack> {
        self.grid.set(index, Some(stack))
    }

    pub fn take(&mut self, index: usize) -> Option<ItemStack> {
        self.grid.take(index)
    }

    /// What the grid would craft for this actor right now
    pub fn preview<A: Actor + ?Sized>(&self, registry: &RecipeRegistry, actor: &mut A) -> CraftCheck {
        registry.find_for(actor, &self.grid)
    }

    /// Craft once. Blocked attempts tell the actor why and leave the grid as is.
    pub fn craft<A: Actor + ?Sized>(&mut self, registry: &RecipeRegistry, actor: &mut A) -> CraftResult {
        let check = registry.find_for(actor, &self.grid);
        let (recipe_id, output) = match check {
            CraftCheck::Ready { recipe, output } => (recipe, output),
            blocked => {
                if let Some(reason) = blocked_reason(&blocked) {
                    actor.send_message(&reason);
                }
                return CraftResult::Blocked(blocked);
            }
        };

        // Consume the exact cells the gated recipe claimed
        let Some(found) = registry.find_recipe(&self.grid) else {
            return CraftResult::Blocked(CraftCheck::NoMatch);
        };
        self.grid = RecipeRegistry::apply(&self.grid, &found.slots);

        let leftover = actor.inventory_mut().add_item(output.clone());
        debug!(
            "{} crafted {} x{} with recipe {}",
            actor.name(),
            output.type_id,
            output.amount,
            recipe_id
        );
        CraftResult::Crafted {
            recipe: recipe_id,
            output,
            leftover,
        }
    }

    /// Return every grid item to the actor. Stacks that do not fit come back.
    pub fn cancel<A: Actor + ?Sized>(&mut self, actor: &mut A) -> Vec<ItemStack> {
        self.grid
            .drain()
            .into_iter()
            .filter_map(|stack| actor.inventory_mut().add_item(stack))
            .collect()
    }
}
