use serde::Deserialize;

use crate::actor::PropertyValue;
use crate::item::{ABILITY_KEY, ItemStack};
use crate::mana::ItemManaCost;
use crate::stats::{StatBlock, create_item_with_stats};

// ============================================================================
// Raw Item Definition (direct from TOML)
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct RawItemDefinition {
    /// Host item type the custom item is built on (e.g., "minecraft:diamond_sword")
    pub item_type: String,
    pub display_name: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub stats: StatBlock,
    /// Counts toward equipment totals; defaults to true when any stat is set
    pub equipment: Option<bool>,
    /// Ability fired by the item; defaults to the item id
    pub ability: Option<String>,
    #[serde(default)]
    pub mana_cost: i64,
}

// ============================================================================
// Resolved Item Definition
// ============================================================================

#[derive(Debug, Clone)]
pub struct ItemDefinition {
    pub id: String,
    pub item_type: String,
    pub display_name: String,
    pub lore: Vec<String>,
    pub stats: StatBlock,
    pub equipment: bool,
    pub ability: String,
    pub mana_cost: i64,
}

impl ItemDefinition {
    pub fn from_raw(id: &str, raw: &RawItemDefinition) -> Self {
        Self {
            id: id.to_string(),
            item_type: raw.item_type.clone(),
            display_name: raw.display_name.clone().unwrap_or_else(|| id.to_string()),
            lore: raw.lore.clone(),
            stats: raw.stats,
            equipment: raw.equipment.unwrap_or(raw.stats != StatBlock::default()),
            ability: raw.ability.clone().unwrap_or_else(|| id.to_string()),
            mana_cost: raw.mana_cost.max(0),
        }
    }

    /// A fresh single stack of this item, stats and ability binding applied
    pub fn create_stack(&self) -> ItemStack {
        let lore: Vec<&str> = self.lore.iter().map(String::as_str).collect();
        let mut stack = if self.equipment {
            create_item_with_stats(&self.item_type, &self.display_name, &self.stats, &lore)
        } else {
            ItemStack::named(&self.item_type, &self.display_name, &lore).unstackable()
        };

        stack.set_property(ABILITY_KEY, PropertyValue::from(self.ability.as_str()));
        if self.mana_cost > 0 {
            ItemManaCost::of(&mut stack).set(self.mana_cost);
        }
        stack
    }
}
