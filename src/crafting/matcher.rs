//! Grid Matching
//!
//! Shaped patterns are slid across every offset that keeps them inside the
//! grid. Shapeless patterns are matched by greedy first-fit: each occupied
//! cell takes the first still-unclaimed requirement of the same type whose
//! amount it covers. First-fit can reject a grid that a full bipartite
//! assignment would accept when two requirements share a type with different
//! amounts and the smaller stack sits first.

use serde::Serialize;

use crate::item::ItemStack;

use super::definition::{Ingredient, RecipePattern};
use super::grid::{CraftingGrid, GRID_SIZE};

/// A grid cell claimed by a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MatchedSlot {
    pub index: usize,
    pub amount: u32,
}

fn covers(stack: &ItemStack, requirement: &Ingredient) -> bool {
    stack.type_id == requirement.type_id && stack.amount >= requirement.amount
}

/// Match a trimmed shaped pattern anywhere in the grid.
pub fn match_shaped(grid: &CraftingGrid, pattern: &RecipePattern) -> Option<Vec<MatchedSlot>> {
    let height = pattern.height();
    let width = pattern.width();
    if height == 0 || width == 0 || height > GRID_SIZE || width > GRID_SIZE {
        return None;
    }

    for top in 0..=(GRID_SIZE - height) {
        for left in 0..=(GRID_SIZE - width) {
            if let Some(slots) = match_at(grid, pattern, top, left) {
                return Some(slots);
            }
        }
    }
    None
}

fn match_at(
    grid: &CraftingGrid,
    pattern: &RecipePattern,
    top: usize,
    left: usize,
) -> Option<Vec<MatchedSlot>> {
    let mut slots = Vec::new();

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            let inside = row >= top
                && row < top + pattern.height()
                && col >= left
                && col < left + pattern.width();
            let expected = if inside {
                pattern.rows[row - top][col - left].as_ref()
            } else {
                None
            };
            let actual = grid.at(row, col);

            match (expected, actual) {
                (None, None) => {}
                (Some(requirement), Some(stack)) if covers(stack, requirement) => {
                    slots.push(MatchedSlot {
                        index: CraftingGrid::index(row, col),
                        amount: requirement.amount,
                    });
                }
                _ => return None,
            }
        }
    }
    Some(slots)
}

/// Match a position-free ingredient list against the grid.
pub fn match_shapeless(grid: &CraftingGrid, pattern: &RecipePattern) -> Option<Vec<MatchedSlot>> {
    let requirements: Vec<&Ingredient> = pattern.ingredients().collect();
    if requirements.is_empty() || grid.occupied_count() != requirements.len() {
        return None;
    }

    let mut claimed = vec![false; requirements.len()];
    let mut slots = Vec::with_capacity(requirements.len());

    for (index, stack) in grid.occupied() {
        let found = requirements
            .iter()
            .enumerate()
            .find(|(i, requirement)| !claimed[*i] && covers(stack, requirement))
            .map(|(i, _)| i)?;
        claimed[found] = true;
        slots.push(MatchedSlot {
            index,
            amount: requirements[found].amount,
        });
    }
    Some(slots)
}

/// Match by recipe kind
pub fn match_pattern(
    grid: &CraftingGrid,
    pattern: &RecipePattern,
    shaped: bool,
) -> Option<Vec<MatchedSlot>> {
    if shaped {
        match_shaped(grid, pattern)
    } else {
        match_shapeless(grid, pattern)
    }
}
