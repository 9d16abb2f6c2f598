use std::collections::HashMap;
use std::path::Path;

use tracing::{info, warn};

use crate::error::{ForgeError, Result};
use crate::item::ItemStack;

use super::item_def::{ItemDefinition, RawItemDefinition};

/// Registry for all custom item definitions
pub struct ItemRegistry {
    items: HashMap<String, ItemDefinition>,
}

impl ItemRegistry {
    pub fn new() -> Self {
        Self {
            items: HashMap::new(),
        }
    }

    /// Load all item definitions from `data_dir/items/*.toml`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<()> {
        let items_dir = data_dir.join("items");

        if !items_dir.exists() {
            warn!("Items directory does not exist: {:?}", items_dir);
            return Ok(());
        }

        let entries = std::fs::read_dir(&items_dir).map_err(|e| ForgeError::io(&items_dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| ForgeError::io(&items_dir, e))?;
            let path = entry.path();

            if path.extension().is_some_and(|ext| ext == "toml") {
                let content = std::fs::read_to_string(&path).map_err(|e| ForgeError::io(&path, e))?;

                // Parse as table of items
                let table: HashMap<String, RawItemDefinition> =
                    toml::from_str(&content).map_err(|e| ForgeError::toml(&path, e))?;

                for (id, raw) in table {
                    if self.items.contains_key(&id) {
                        warn!("Duplicate item ID '{}' in {:?}, overwriting", id, path);
                    }
                    let item = ItemDefinition::from_raw(&id, &raw);
                    self.items.insert(id, item);
                }
            }
        }

        info!("Loaded {} item definitions", self.items.len());

        Ok(())
    }

    pub fn insert(&mut self, item: ItemDefinition) {
        if self.items.contains_key(&item.id) {
            warn!("Duplicate item ID '{}', overwriting", item.id);
        }
        self.items.insert(item.id.clone(), item);
    }

    /// Get an item definition by ID
    pub fn get(&self, id: &str) -> Option<&ItemDefinition> {
        self.items.get(id)
    }

    /// Build a stack of a defined item
    pub fn create_stack(&self, id: &str) -> Result<ItemStack> {
        self.get(id)
            .map(ItemDefinition::create_stack)
            .ok_or_else(|| ForgeError::UnknownItem(id.to_string()))
    }

    /// Get all item IDs
    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.items.keys()
    }

    pub fn all(&self) -> impl Iterator<Item = &ItemDefinition> {
        self.items.values()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl Default for ItemRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_items() {
        let temp_dir = TempDir::new().unwrap();
        let items_dir = temp_dir.path().join("items");
        fs::create_dir(&items_dir).unwrap();
        fs::write(
            items_dir.join("weapons.toml"),
            r#"
            [AOTE]
            item_type = "minecraft:diamond_sword"
            display_name = "§9Aspect of the End"
            mana_cost = 50

            [ROGUE_SWORD]
            item_type = "minecraft:golden_sword"

            [ROGUE_SWORD.stats]
            strength = 20
            "#,
        )
        .unwrap();
        fs::write(items_dir.join("notes.txt"), "ignored").unwrap();

        let mut registry = ItemRegistry::new();
        registry.load_from_directory(temp_dir.path()).unwrap();
        assert_eq!(registry.len(), 2);

        let stack = registry.create_stack("ROGUE_SWORD").unwrap();
        assert_eq!(stack.ability(), Some("ROGUE_SWORD"));
        assert!(matches!(
            registry.create_stack("HYPERION"),
            Err(ForgeError::UnknownItem(_))
        ));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let temp_dir = TempDir::new().unwrap();
        let mut registry = ItemRegistry::new();
        registry.load_from_directory(temp_dir.path()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_bad_toml_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let items_dir = temp_dir.path().join("items");
        fs::create_dir(&items_dir).unwrap();
        fs::write(items_dir.join("broken.toml"), "[AOTE\nitem_type =").unwrap();

        let mut registry = ItemRegistry::new();
        let err = registry.load_from_directory(temp_dir.path()).unwrap_err();
        assert!(matches!(err, ForgeError::Toml { .. }));
    }
}
