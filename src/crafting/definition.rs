//! Crafting Recipe Definitions
//!
//! Defines the data structures for crafting recipes, including TOML
//! deserialization (Raw*) and resolved versions with defaults applied.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::item::ItemStack;
use crate::progression::SkillType;

use super::grid::GRID_SIZE;

/// Sequential id handed out at registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RecipeId(pub u32);

impl std::fmt::Display for RecipeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ============================================================================
// Resolved Structures
// ============================================================================

/// One required cell: an item type and the minimum stack size
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Ingredient {
    pub type_id: String,
    pub amount: u32,
}

impl Ingredient {
    pub fn new(type_id: &str, amount: u32) -> Self {
        Self {
            type_id: type_id.to_string(),
            amount,
        }
    }

    pub fn one(type_id: &str) -> Self {
        Self::new(type_id, 1)
    }
}

/// Grid of requirements; `None` cells must be empty
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecipePattern {
    pub rows: Vec<Vec<Option<Ingredient>>>,
}

impl RecipePattern {
    pub fn from_rows(rows: Vec<Vec<Option<Ingredient>>>) -> Self {
        Self { rows }
    }

    /// Row-major cells, chunked into rows of three
    pub fn from_cells(cells: Vec<Option<Ingredient>>) -> Self {
        let rows = cells.chunks(GRID_SIZE).map(|c| c.to_vec()).collect();
        Self { rows }
    }

    /// Position-free ingredient list for shapeless recipes
    pub fn shapeless(ingredients: Vec<Ingredient>) -> Self {
        Self::from_cells(ingredients.into_iter().map(Some).collect())
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// All concrete requirements in row-major order
    pub fn ingredients(&self) -> impl Iterator<Item = &Ingredient> {
        self.rows.iter().flatten().flatten()
    }

    /// Check shape and quantities, failing fast on programmer errors.
    pub fn validate(&self, shaped: bool) -> Result<()> {
        if self.ingredients().next().is_none() {
            return Err(ForgeError::MalformedPattern(
                "pattern has no ingredients".to_string(),
            ));
        }
        if let Some(bad) = self.ingredients().find(|i| i.amount == 0) {
            return Err(ForgeError::MalformedPattern(format!(
                "ingredient '{}' requires zero items",
                bad.type_id
            )));
        }
        if let Some(bad) = self.ingredients().find(|i| i.type_id.is_empty()) {
            return Err(ForgeError::MalformedPattern(format!(
                "ingredient with empty type id (amount {})",
                bad.amount
            )));
        }

        if shaped {
            if self.height() > GRID_SIZE {
                return Err(ForgeError::MalformedPattern(format!(
                    "{} rows exceed the {}x{} grid",
                    self.height(),
                    GRID_SIZE,
                    GRID_SIZE
                )));
            }
            let width = self.width();
            if self.rows.iter().any(|r| r.len() != width) {
                return Err(ForgeError::MalformedPattern(
                    "shaped pattern rows have different widths".to_string(),
                ));
            }
            if width > GRID_SIZE {
                return Err(ForgeError::MalformedPattern(format!(
                    "{} columns exceed the {}x{} grid",
                    width, GRID_SIZE, GRID_SIZE
                )));
            }
        } else {
            let count = self.ingredients().count();
            if count > GRID_SIZE * GRID_SIZE {
                return Err(ForgeError::MalformedPattern(format!(
                    "{} shapeless ingredients exceed the grid",
                    count
                )));
            }
        }
        Ok(())
    }

    /// Drop all-empty border rows and columns
    pub fn trimmed(&self) -> RecipePattern {
        let mut rows = self.rows.clone();

        while rows.first().is_some_and(|r| r.iter().all(Option::is_none)) {
            rows.remove(0);
        }
        while rows.last().is_some_and(|r| r.iter().all(Option::is_none)) {
            rows.pop();
        }

        let column_empty =
            |rows: &[Vec<Option<Ingredient>>], col: usize| rows.iter().all(|r| r[col].is_none());

        while rows.first().is_some_and(|r| !r.is_empty()) && column_empty(&rows, 0) {
            for row in &mut rows {
                row.remove(0);
            }
        }
        while let Some(last) = rows.first().and_then(|r| r.len().checked_sub(1)) {
            if !column_empty(&rows, last) {
                break;
            }
            for row in &mut rows {
                row.pop();
            }
        }

        RecipePattern { rows }
    }
}

/// Skill gate on a recipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    pub skill: SkillType,
    pub level: i64,
}

/// Extra registration options beyond pattern and output
#[derive(Debug, Clone, Default)]
pub struct RecipeOptions {
    pub shaped: bool,
    pub name: Option<String>,
    pub requirement: Option<Requirement>,
    /// Recipe key the actor must have unlocked
    pub unlock: Option<String>,
}

impl RecipeOptions {
    pub fn shaped() -> Self {
        Self {
            shaped: true,
            ..Self::default()
        }
    }

    pub fn shapeless() -> Self {
        Self::default()
    }
}

/// A registered recipe
#[derive(Debug, Clone)]
pub struct Recipe {
    pub id: RecipeId,
    pub name: String,
    /// Stored trimmed to its bounding box when shaped
    pub pattern: RecipePattern,
    pub output: ItemStack,
    pub shaped: bool,
    pub requirement: Option<Requirement>,
    pub unlock: Option<String>,
}

// ============================================================================
// Raw TOML Structures
// ============================================================================

fn default_count() -> u32 {
    1
}

/// Raw ingredient entry from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawIngredient {
    pub item_id: String,
    #[serde(default = "default_count")]
    pub count: u32,
}

/// Raw output entry from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawOutput {
    pub item_id: String,
    #[serde(default = "default_count")]
    pub count: u32,
    pub name: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
}

/// Raw recipe definition from TOML.
///
/// Shaped recipes use `pattern` rows of single-character keys resolved
/// through `key`; a space or `.` is an empty cell. Shapeless recipes list
/// `ingredients` instead.
#[derive(Debug, Clone, Deserialize)]
pub struct RawRecipeDefinition {
    pub display_name: Option<String>,
    #[serde(default)]
    pub shaped: bool,
    #[serde(default)]
    pub pattern: Vec<String>,
    #[serde(default)]
    pub key: BTreeMap<char, RawIngredient>,
    #[serde(default)]
    pub ingredients: Vec<RawIngredient>,
    pub output: RawOutput,
    pub requires: Option<Requirement>,
    pub unlock: Option<String>,
}

impl RawIngredient {
    fn resolve(&self) -> Ingredient {
        Ingredient::new(&self.item_id, self.count)
    }
}

impl RawOutput {
    pub fn to_stack(&self) -> ItemStack {
        let mut stack = ItemStack::new(&self.item_id, self.count);
        if let Some(name) = &self.name {
            stack.name_tag = Some(name.clone());
        }
        stack.lore = self.lore.clone();
        stack
    }
}

impl RawRecipeDefinition {
    /// Resolve into a pattern plus registration options
    pub fn resolve(&self, id: &str) -> Result<(RecipePattern, ItemStack, RecipeOptions)> {
        let pattern = if self.shaped {
            let mut rows = Vec::with_capacity(self.pattern.len());
            for line in &self.pattern {
                let mut row = Vec::new();
                for symbol in line.chars() {
                    if symbol == ' ' || symbol == '.' {
                        row.push(None);
                        continue;
                    }
                    let raw = self.key.get(&symbol).ok_or_else(|| {
                        ForgeError::MalformedPattern(format!(
                            "recipe '{}' uses undefined key '{}'",
                            id, symbol
                        ))
                    })?;
                    row.push(Some(raw.resolve()));
                }
                rows.push(row);
            }
            RecipePattern::from_rows(rows)
        } else {
            RecipePattern::shapeless(self.ingredients.iter().map(RawIngredient::resolve).collect())
        };

        let options = RecipeOptions {
            shaped: self.shaped,
            name: Some(
                self.display_name
                    .clone()
                    .unwrap_or_else(|| id.replace('_', " ")),
            ),
            requirement: self.requires,
            unlock: self.unlock.clone(),
        };

        Ok((pattern, self.output.to_stack(), options))
    }
}
