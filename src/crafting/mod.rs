//! Crafting System
//!
//! Recipe definitions, the 3x3 grid matcher, the recipe registry and the
//! per-actor crafting table.

pub mod definition;
pub mod grid;
pub mod matcher;
pub mod registry;
pub mod table;

pub use definition::{Ingredient, Recipe, RecipeId, RecipeOptions, RecipePattern, Requirement};
pub use grid::{CraftingGrid, GRID_CELLS, GRID_SIZE};
pub use matcher::MatchedSlot;
pub use registry::{ConsumeOutcome, CraftCheck, RecipeMatch, RecipeRegistry};
pub use table::{CraftResult, CraftingTable};
