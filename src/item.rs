use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::PropertyValue;

/// Stack limit for ordinary items
pub const DEFAULT_MAX_STACK: u32 = 64;

/// Item property naming the ability the item fires
pub const ABILITY_KEY: &str = "ability";

// ============================================================================
// Item Stack
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemStack {
    pub type_id: String,
    pub amount: u32,
    #[serde(default)]
    pub name_tag: Option<String>,
    #[serde(default)]
    pub lore: Vec<String>,
    #[serde(default)]
    pub properties: BTreeMap<String, PropertyValue>,
    #[serde(default = "default_max_stack")]
    pub max_amount: u32,
}

fn default_max_stack() -> u32 {
    DEFAULT_MAX_STACK
}

impl ItemStack {
    pub fn new(type_id: &str, amount: u32) -> Self {
        Self {
            type_id: type_id.to_string(),
            amount,
            name_tag: None,
            lore: Vec::new(),
            properties: BTreeMap::new(),
            max_amount: DEFAULT_MAX_STACK,
        }
    }

    /// A single named item with lore, as handed out for custom weapons
    pub fn named(type_id: &str, name: &str, lore: &[&str]) -> Self {
        let mut stack = Self::new(type_id, 1);
        stack.name_tag = Some(name.to_string());
        stack.lore = lore.iter().map(|l| l.to_string()).collect();
        stack
    }

    pub fn with_amount(&self, amount: u32) -> Self {
        let mut stack = self.clone();
        stack.amount = amount;
        stack
    }

    pub fn unstackable(mut self) -> Self {
        self.max_amount = 1;
        self
    }

    pub fn is_stackable(&self) -> bool {
        self.max_amount > 1
    }

    /// Same type, name, lore and properties: the two stacks may merge.
    pub fn is_stackable_with(&self, other: &ItemStack) -> bool {
        self.type_id == other.type_id
            && self.name_tag == other.name_tag
            && self.lore == other.lore
            && self.properties == other.properties
    }

    pub fn property(&self, key: &str) -> Option<&PropertyValue> {
        self.properties.get(key)
    }

    pub fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }

    pub fn int(&self, key: &str, default: i64) -> i64 {
        self.property(key)
            .and_then(|v| v.as_int())
            .unwrap_or(default)
    }

    pub fn flag(&self, key: &str) -> bool {
        self.property(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    /// Ability bound to this item: the `ability` property, else the name tag
    pub fn ability(&self) -> Option<&str> {
        self.property(ABILITY_KEY)
            .and_then(|v| v.as_text())
            .or(self.name_tag.as_deref())
    }
}

/// How many items from `from` can be moved onto `to`. None when the stacks
/// cannot merge or `to` is already full.
pub fn stack_transfer(from: &ItemStack, to: &ItemStack) -> Option<u32> {
    if !to.is_stackable_with(from) || to.amount >= to.max_amount {
        return None;
    }
    let room = to.max_amount - to.amount;
    Some(room.min(from.amount))
}

// ============================================================================
// Container
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    pub slots: Vec<Option<ItemStack>>,
}

impl Container {
    pub fn new(size: usize) -> Self {
        Self {
            slots: vec![None; size],
        }
    }

    pub fn size(&self) -> usize {
        self.slots.len()
    }

    pub fn get(&self, slot: usize) -> Option<&ItemStack> {
        self.slots.get(slot).and_then(|s| s.as_ref())
    }

    /// Replace a slot. Out-of-range slots are ignored.
    pub fn set(&mut self, slot: usize, item: Option<ItemStack>) {
        if let Some(target) = self.slots.get_mut(slot) {
            *target = item;
        }
    }

    pub fn items(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter().flatten()
    }

    /// Add a stack, merging into compatible stacks before using empty slots.
    /// Returns whatever did not fit.
    pub fn add_item(&mut self, mut stack: ItemStack) -> Option<ItemStack> {
        // First, top up existing stacks
        for existing in self.slots.iter_mut().flatten() {
            if stack.amount == 0 {
                break;
            }
            if let Some(moved) = stack_transfer(&stack, existing) {
                existing.amount += moved;
                stack.amount -= moved;
            }
        }

        // Then, fill empty slots
        for slot in &mut self.slots {
            if stack.amount == 0 {
                break;
            }
            if slot.is_none() {
                let add = stack.amount.min(stack.max_amount.max(1));
                *slot = Some(stack.with_amount(add));
                stack.amount -= add;
            }
        }

        (stack.amount > 0).then_some(stack)
    }

    /// Total quantity of a type across all slots
    pub fn count(&self, type_id: &str) -> u32 {
        self.items()
            .filter(|s| s.type_id == type_id)
            .map(|s| s.amount)
            .sum()
    }
}
