//! Crafting Recipe Registry
//!
//! Holds registered recipes in registration order and resolves grids
//! against them. When several recipes match a grid, the earliest registered
//! one wins.

use std::collections::BTreeMap;
use std::path::Path;

use tracing::{debug, info, warn};

use crate::actor::Actor;
use crate::error::{ForgeError, Result};
use crate::item::ItemStack;
use crate::progression::{RecipeUnlocks, SkillType, Skills};

use super::definition::{RawRecipeDefinition, Recipe, RecipeId, RecipeOptions, RecipePattern};
use super::grid::CraftingGrid;
use super::matcher::{MatchedSlot, match_pattern};

/// A recipe together with the grid cells it claimed
#[derive(Debug, Clone)]
pub struct RecipeMatch<'a> {
    pub recipe: &'a Recipe,
    pub slots: Vec<MatchedSlot>,
}

/// Result of checking a grid on behalf of an actor
#[derive(Debug, Clone, PartialEq)]
pub enum CraftCheck {
    Ready { recipe: RecipeId, output: ItemStack },
    /// The recipe needs an unlock the actor does not have
    Locked { recipe: RecipeId, unlock: String },
    NeedsSkill {
        recipe: RecipeId,
        skill: SkillType,
        required: i64,
        current: i64,
    },
    NoMatch,
}

impl CraftCheck {
    pub fn is_ready(&self) -> bool {
        matches!(self, CraftCheck::Ready { .. })
    }
}

/// Result of consuming ingredients for a produced output
#[derive(Debug, Clone, PartialEq)]
pub enum ConsumeOutcome {
    /// Grid after the matched cells were decremented
    Consumed(CraftingGrid),
    /// No recipe for this output matches the grid; nothing was touched
    NotMatched,
}

/// Registry for all crafting recipes
pub struct RecipeRegistry {
    recipes: Vec<Recipe>,
    next_id: u32,
}

impl RecipeRegistry {
    pub fn new() -> Self {
        Self {
            recipes: Vec::new(),
            next_id: 0,
        }
    }

    /// Register a recipe and return its id
    pub fn register(
        &mut self,
        pattern: RecipePattern,
        output: &ItemStack,
        shaped: bool,
    ) -> Result<RecipeId> {
        let options = if shaped {
            RecipeOptions::shaped()
        } else {
            RecipeOptions::shapeless()
        };
        self.register_with(pattern, output, options)
    }

    /// Register a recipe with a name, skill gate or unlock key
    pub fn register_with(
        &mut self,
        pattern: RecipePattern,
        output: &ItemStack,
        options: RecipeOptions,
    ) -> Result<RecipeId> {
        pattern.validate(options.shaped)?;
        if output.amount == 0 || output.type_id.is_empty() {
            return Err(ForgeError::MalformedPattern(format!(
                "recipe output '{}' x{} is empty",
                output.type_id, output.amount
            )));
        }

        let pattern = if options.shaped {
            pattern.trimmed()
        } else {
            pattern
        };

        let id = RecipeId(self.next_id);
        self.next_id += 1;

        let name = options
            .name
            .unwrap_or_else(|| format!("{} {}", output.type_id, id));
        debug!(
            "Registered recipe {} '{}' ({}) -> {} x{}",
            id,
            name,
            if options.shaped { "shaped" } else { "shapeless" },
            output.type_id,
            output.amount
        );

        self.recipes.push(Recipe {
            id,
            name,
            pattern,
            output: output.clone(),
            shaped: options.shaped,
            requirement: options.requirement,
            unlock: options.unlock,
        });
        Ok(id)
    }

    /// Remove a recipe. Returns false when the id is unknown.
    pub fn unregister(&mut self, id: RecipeId) -> bool {
        let before = self.recipes.len();
        self.recipes.retain(|r| r.id != id);
        self.recipes.len() != before
    }

    pub fn clear(&mut self) {
        self.recipes.clear();
    }

    /// Output of the first recipe matching the grid
    pub fn find(&self, grid: &CraftingGrid) -> Option<ItemStack> {
        self.find_recipe(grid).map(|m| m.recipe.output.clone())
    }

    /// First recipe matching the grid, with its claimed cells
    pub fn find_recipe(&self, grid: &CraftingGrid) -> Option<RecipeMatch<'_>> {
        if grid.is_empty() {
            return None;
        }
        self.recipes.iter().find_map(|recipe| {
            match_pattern(grid, &recipe.pattern, recipe.shaped)
                .map(|slots| RecipeMatch { recipe, slots })
        })
    }

    /// Match the grid and check the matched recipe's unlock and skill gate
    pub fn find_for<A: Actor + ?Sized>(&self, actor: &mut A, grid: &CraftingGrid) -> CraftCheck {
        let Some(found) = self.find_recipe(grid) else {
            return CraftCheck::NoMatch;
        };
        let recipe = found.recipe;

        if let Some(unlock) = &recipe.unlock {
            if !RecipeUnlocks::of(&mut *actor).has(unlock) {
                return CraftCheck::Locked {
                    recipe: recipe.id,
                    unlock: unlock.clone(),
                };
            }
        }

        if let Some(requirement) = recipe.requirement {
            let current = Skills::of(&mut *actor).level(requirement.skill);
            if current < requirement.level {
                return CraftCheck::NeedsSkill {
                    recipe: recipe.id,
                    skill: requirement.skill,
                    required: requirement.level,
                    current,
                };
            }
        }

        CraftCheck::Ready {
            recipe: recipe.id,
            output: recipe.output.clone(),
        }
    }

    /// Consume the ingredients of the first recipe producing `output` that
    /// matches the grid. Recipes are looked up by output type.
    pub fn consume_ingredients(&self, grid: &CraftingGrid, output: &ItemStack) -> ConsumeOutcome {
        let matched = self
            .recipes
            .iter()
            .filter(|r| r.output.type_id == output.type_id)
            .find_map(|r| match_pattern(grid, &r.pattern, r.shaped));

        match matched {
            Some(slots) => ConsumeOutcome::Consumed(Self::apply(grid, &slots)),
            None => ConsumeOutcome::NotMatched,
        }
    }

    /// Decrement the cells a match claimed
    pub fn apply(grid: &CraftingGrid, slots: &[MatchedSlot]) -> CraftingGrid {
        let mut remaining = grid.clone();
        for slot in slots {
            remaining.decrement(slot.index, slot.amount);
        }
        remaining
    }

    /// Load all recipe definitions from `data_dir/recipes/*.toml`.
    ///
    /// Files are read in name order and recipes within a file in id order,
    /// so match priority is stable across runs.
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<usize> {
        let recipes_dir = data_dir.join("recipes");

        if !recipes_dir.exists() {
            warn!("Recipes directory does not exist: {:?}", recipes_dir);
            return Ok(0);
        }

        let mut paths = Vec::new();
        for entry in std::fs::read_dir(&recipes_dir).map_err(|e| ForgeError::io(&recipes_dir, e))? {
            let path = entry.map_err(|e| ForgeError::io(&recipes_dir, e))?.path();
            if path.extension().is_some_and(|ext| ext == "toml") {
                paths.push(path);
            }
        }
        paths.sort();

        let mut loaded = 0;
        for path in paths {
            let content = std::fs::read_to_string(&path).map_err(|e| ForgeError::io(&path, e))?;

            // Parse as table of recipes
            let table: BTreeMap<String, RawRecipeDefinition> =
                toml::from_str(&content).map_err(|e| ForgeError::toml(&path, e))?;

            for (id, raw) in table {
                if self.recipes.iter().any(|r| r.name == id) {
                    warn!("Duplicate recipe '{}' in {:?}, registering both", id, path);
                }
                let (pattern, output, mut options) = raw.resolve(&id)?;
                options.name = Some(id.clone());
                let recipe_id = self.register_with(pattern, &output, options)?;
                info!(
                    "Loaded recipe: {} ({}) - {} ingredients -> {} x{}",
                    raw.display_name.as_deref().unwrap_or(&id),
                    recipe_id,
                    raw.pattern.len().max(raw.ingredients.len()),
                    output.type_id,
                    output.amount
                );
                loaded += 1;
            }
        }

        info!("Loaded {} recipe definitions", loaded);
        Ok(loaded)
    }

    pub fn get(&self, id: RecipeId) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    /// Look up a recipe by its registered name
    pub fn by_name(&self, name: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.name == name)
    }

    /// Snapshot of every recipe in registration order
    pub fn all(&self) -> Vec<Recipe> {
        self.recipes.clone()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Recipe> {
        self.recipes.iter()
    }

    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }
}

impl Default for RecipeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MemoryActor;
    use crate::crafting::definition::{Ingredient, Requirement};
    use std::io::Write;
    use tempfile::TempDir;

    fn req(type_id: &str) -> Option<Ingredient> {
        Some(Ingredient::one(type_id))
    }

    fn sword_pattern() -> RecipePattern {
        RecipePattern::from_rows(vec![
            vec![req("minecraft:iron_ingot")],
            vec![req("minecraft:iron_ingot")],
            vec![req("minecraft:stick")],
        ])
    }

    fn sword_grid(col: usize) -> CraftingGrid {
        let mut grid = CraftingGrid::new();
        grid.set(col, Some(ItemStack::new("minecraft:iron_ingot", 1)));
        grid.set(3 + col, Some(ItemStack::new("minecraft:iron_ingot", 1)));
        grid.set(6 + col, Some(ItemStack::new("minecraft:stick", 1)));
        grid
    }

    #[test]
    fn test_register_assigns_sequential_ids() {
        let mut registry = RecipeRegistry::new();
        let sword = ItemStack::new("minecraft:iron_sword", 1);
        let a = registry.register(sword_pattern(), &sword, true).unwrap();
        let b = registry.register(sword_pattern(), &sword, false).unwrap();
        assert_eq!(a, RecipeId(0));
        assert_eq!(b, RecipeId(1));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_register_clones_output() {
        let mut registry = RecipeRegistry::new();
        let mut sword = ItemStack::new("minecraft:iron_sword", 1);
        registry.register(sword_pattern(), &sword, true).unwrap();
        sword.name_tag = Some("Renamed".to_string());

        let found = registry.find(&sword_grid(0)).unwrap();
        assert!(found.name_tag.is_none());
    }

    #[test]
    fn test_malformed_pattern_rejected() {
        let mut registry = RecipeRegistry::new();
        let output = ItemStack::new("minecraft:stone", 1);
        let err = registry
            .register(RecipePattern::from_rows(vec![vec![None]]), &output, true)
            .unwrap_err();
        assert!(matches!(err, ForgeError::MalformedPattern(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_shaped_translation_invariance() {
        let mut registry = RecipeRegistry::new();
        let sword = ItemStack::new("minecraft:iron_sword", 1);
        registry.register(sword_pattern(), &sword, true).unwrap();

        for col in 0..3 {
            assert_eq!(registry.find(&sword_grid(col)), Some(sword.clone()));
        }
    }

    #[test]
    fn test_extra_item_rejects_match() {
        let mut registry = RecipeRegistry::new();
        registry
            .register(sword_pattern(), &ItemStack::new("minecraft:iron_sword", 1), true)
            .unwrap();

        let mut grid = sword_grid(0);
        grid.set(2, Some(ItemStack::new("minecraft:dirt", 1)));
        assert!(registry.find(&grid).is_none());
    }

    #[test]
    fn test_first_registered_wins() {
        let mut registry = RecipeRegistry::new();
        let first = ItemStack::new("minecraft:iron_sword", 1);
        let second = ItemStack::new("minecraft:diamond_sword", 1);
        registry.register(sword_pattern(), &first, true).unwrap();
        registry.register(sword_pattern(), &second, true).unwrap();
        assert_eq!(registry.find(&sword_grid(1)), Some(first));
    }

    #[test]
    fn test_consume_round_trip() {
        let mut registry = RecipeRegistry::new();
        let pearls = RecipePattern::from_rows(vec![
            vec![Some(Ingredient::new("minecraft:ender_pearl", 4))],
            vec![req("minecraft:stick")],
        ]);
        let output = ItemStack::new("minecraft:ender_eye", 1);
        registry.register(pearls, &output, true).unwrap();

        let mut grid = CraftingGrid::new();
        grid.set(1, Some(ItemStack::new("minecraft:ender_pearl", 10)));
        grid.set(4, Some(ItemStack::new("minecraft:stick", 1)));

        let found = registry.find(&grid).unwrap();
        let ConsumeOutcome::Consumed(after) = registry.consume_ingredients(&grid, &found) else {
            panic!("expected ingredients to be consumed");
        };
        assert_eq!(after.get(1).unwrap().amount, 6);
        assert!(after.get(4).is_none());
        // Original grid untouched
        assert_eq!(grid.get(1).unwrap().amount, 10);

        // Putting the consumed quantities back restores the input
        let mut restored = after.clone();
        restored.set(1, Some(ItemStack::new("minecraft:ender_pearl", 6 + 4)));
        restored.set(4, Some(ItemStack::new("minecraft:stick", 1)));
        assert_eq!(restored, grid);
    }

    #[test]
    fn test_find_is_repeatable() {
        let mut registry = RecipeRegistry::new();
        let sword = ItemStack::new("minecraft:iron_sword", 1);
        registry.register(sword_pattern(), &sword, true).unwrap();
        registry
            .register(
                RecipePattern::shapeless(vec![Ingredient::one("minecraft:coal"), Ingredient::one("minecraft:stick")]),
                &ItemStack::new("minecraft:torch", 4),
                false,
            )
            .unwrap();

        let grid = sword_grid(2);
        let first = registry.find(&grid);
        for _ in 0..5 {
            assert_eq!(registry.find(&grid), first);
        }
        assert_eq!(first, Some(sword));

        let mut torch_grid = CraftingGrid::new();
        torch_grid.set(8, Some(ItemStack::new("minecraft:coal", 1)));
        torch_grid.set(0, Some(ItemStack::new("minecraft:stick", 1)));
        let torch = registry.find(&torch_grid);
        assert!(torch.is_some());
        for _ in 0..5 {
            assert_eq!(registry.find(&torch_grid), torch);
        }
    }

    #[test]
    fn test_padded_two_row_pattern() {
        let mut registry = RecipeRegistry::new();
        let pattern = RecipePattern::from_rows(vec![
            vec![Some(Ingredient::new("minecraft:iron_ingot", 2)), None, None],
            vec![req("minecraft:stick"), None, None],
        ]);
        let output = ItemStack::new("minecraft:iron_shovel", 1);
        registry.register(pattern, &output, true).unwrap();

        let mut grid = CraftingGrid::new();
        grid.set(0, Some(ItemStack::new("minecraft:iron_ingot", 2)));
        grid.set(3, Some(ItemStack::new("minecraft:stick", 1)));
        assert_eq!(registry.find(&grid), Some(output));

        for unused in [1, 2, 4, 5, 6, 7, 8] {
            let mut cluttered = grid.clone();
            cluttered.set(unused, Some(ItemStack::new("minecraft:dirt", 1)));
            assert!(registry.find(&cluttered).is_none(), "cell {}", unused);
        }
    }

    #[test]
    fn test_consume_without_match() {
        let mut registry = RecipeRegistry::new();
        registry
            .register(sword_pattern(), &ItemStack::new("minecraft:iron_sword", 1), true)
            .unwrap();
        let grid = sword_grid(0);
        assert_eq!(
            registry.consume_ingredients(&grid, &ItemStack::new("minecraft:bread", 1)),
            ConsumeOutcome::NotMatched
        );
    }

    #[test]
    fn test_unregister_and_clear() {
        let mut registry = RecipeRegistry::new();
        let sword = ItemStack::new("minecraft:iron_sword", 1);
        let id = registry.register(sword_pattern(), &sword, true).unwrap();
        assert!(registry.unregister(id));
        assert!(!registry.unregister(id));
        assert!(registry.find(&sword_grid(0)).is_none());

        registry.register(sword_pattern(), &sword, true).unwrap();
        registry.clear();
        assert!(registry.all().is_empty());
    }

    #[test]
    fn test_find_for_checks_gates() {
        let mut registry = RecipeRegistry::new();
        let aote = ItemStack::named("minecraft:iron_sword", "AOTE", &[]);
        let options = RecipeOptions {
            shaped: true,
            name: Some("aote".to_string()),
            requirement: Some(Requirement {
                skill: SkillType::Combat,
                level: 10,
            }),
            unlock: Some("aote".to_string()),
        };
        let id = registry.register_with(sword_pattern(), &aote, options).unwrap();

        let mut actor = MemoryActor::new("Steve");
        let grid = sword_grid(2);
        assert_eq!(
            registry.find_for(&mut actor, &grid),
            CraftCheck::Locked {
                recipe: id,
                unlock: "aote".to_string()
            }
        );

        RecipeUnlocks::of(&mut actor).unlock("aote");
        assert_eq!(
            registry.find_for(&mut actor, &grid),
            CraftCheck::NeedsSkill {
                recipe: id,
                skill: SkillType::Combat,
                required: 10,
                current: 0
            }
        );

        actor.set_int("skill_combat_level", 10);
        assert!(registry.find_for(&mut actor, &grid).is_ready());
        assert_eq!(registry.find_for(&mut actor, &CraftingGrid::new()), CraftCheck::NoMatch);
    }

    #[test]
    fn test_load_recipes_from_directory() {
        let temp_dir = TempDir::new().unwrap();
        let recipes_dir = temp_dir.path().join("recipes");
        std::fs::create_dir(&recipes_dir).unwrap();

        let toml_content = r#"
[iron_sword]
shaped = true
pattern = ["I", "I", "S"]

[iron_sword.key]
I = { item_id = "minecraft:iron_ingot" }
S = { item_id = "minecraft:stick" }

[iron_sword.output]
item_id = "minecraft:iron_sword"

[mana_brew]
[[mana_brew.ingredients]]
item_id = "minecraft:glass_bottle"
[[mana_brew.ingredients]]
item_id = "minecraft:lapis_lazuli"
count = 4

[mana_brew.output]
item_id = "minecraft:potion"
name = "Mana Brew"
"#;

        let mut file = std::fs::File::create(recipes_dir.join("basic.toml")).unwrap();
        file.write_all(toml_content.as_bytes()).unwrap();
        std::fs::write(recipes_dir.join("notes.txt"), "ignored").unwrap();

        let mut registry = RecipeRegistry::new();
        assert_eq!(registry.load_from_directory(temp_dir.path()).unwrap(), 2);

        let sword = registry.by_name("iron_sword").unwrap();
        assert!(sword.shaped);
        assert_eq!(sword.id, RecipeId(0));
        assert_eq!(registry.find(&sword_grid(1)).unwrap().type_id, "minecraft:iron_sword");

        let brew = registry.by_name("mana_brew").unwrap();
        assert!(!brew.shaped);
        assert_eq!(brew.output.name_tag.as_deref(), Some("Mana Brew"));
    }

    #[test]
    fn test_load_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = RecipeRegistry::new();
        assert_eq!(registry.load_from_directory(temp_dir.path()).unwrap(), 0);
    }

    #[test]
    fn test_load_bad_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let recipes_dir = temp_dir.path().join("recipes");
        std::fs::create_dir(&recipes_dir).unwrap();
        std::fs::write(recipes_dir.join("broken.toml"), "[oops\n").unwrap();

        let mut registry = RecipeRegistry::new();
        let err = registry.load_from_directory(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ForgeError::Toml { .. }));
    }
}
