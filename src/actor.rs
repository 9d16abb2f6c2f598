//! Actor capability
//!
//! The host owns players and their persistent state. Everything in this crate
//! reaches that state through the [`Actor`] trait: a namespaced key-value
//! property store plus a handful of presentation calls (chat message, sound
//! cue, HUD line) and the few host attributes that stats drive directly.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{ForgeError, Result};
use crate::item::{Container, ItemStack};

/// Default player inventory size used by [`MemoryActor`]
pub const INVENTORY_SIZE: usize = 36;

/// Host health before any stat bonus is applied
pub const BASE_MAX_HEALTH: i64 = 20;

// ============================================================================
// Property Values
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
}

impl PropertyValue {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            PropertyValue::Int(v) => Some(*v),
            PropertyValue::Float(v) => Some(v.floor() as i64),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            PropertyValue::Int(v) => Some(*v as f64),
            PropertyValue::Float(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PropertyValue::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::Text(v) => Some(v),
            _ => None,
        }
    }
}

impl From<i64> for PropertyValue {
    fn from(value: i64) -> Self {
        PropertyValue::Int(value)
    }
}

impl From<f64> for PropertyValue {
    fn from(value: f64) -> Self {
        PropertyValue::Float(value)
    }
}

impl From<bool> for PropertyValue {
    fn from(value: bool) -> Self {
        PropertyValue::Bool(value)
    }
}

impl From<&str> for PropertyValue {
    fn from(value: &str) -> Self {
        PropertyValue::Text(value.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(value: String) -> Self {
        PropertyValue::Text(value)
    }
}

// ============================================================================
// Property Keys
// ============================================================================

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | ':' | '.' | '-')
}

/// Validate a single key part (category, ability id, recipe key, ...).
pub fn validate_key_part(part: &str) -> Result<()> {
    if part.is_empty() {
        return Err(ForgeError::InvalidKey {
            part: part.to_string(),
            reason: "empty",
        });
    }
    if !part.chars().all(is_key_char) {
        return Err(ForgeError::InvalidKey {
            part: part.to_string(),
            reason: "allowed characters are A-Z a-z 0-9 _ : . -",
        });
    }
    Ok(())
}

/// Build a `category_subcategory` property key from validated parts.
pub fn property_key(parts: &[&str]) -> Result<String> {
    for part in parts {
        validate_key_part(part)?;
    }
    Ok(parts.join("_"))
}

// ============================================================================
// Actor Trait
// ============================================================================

/// Host-side handle for a player (or any entity with persistent properties).
pub trait Actor {
    fn id(&self) -> &str;

    fn name(&self) -> &str;

    fn property(&self, key: &str) -> Option<PropertyValue>;

    fn set_property(&mut self, key: &str, value: PropertyValue);

    fn remove_property(&mut self, key: &str);

    fn property_keys(&self) -> Vec<String>;

    fn send_message(&mut self, text: &str);

    fn play_sound(&mut self, cue: &str);

    /// Replace the HUD line shown above the hotbar
    fn set_action_bar(&mut self, text: &str);

    fn set_max_health(&mut self, max_health: i64);

    /// Apply (Some(amplifier)) or clear (None) the movement speed effect
    fn set_speed_effect(&mut self, amplifier: Option<u8>);

    fn inventory(&self) -> &Container;

    fn inventory_mut(&mut self) -> &mut Container;

    /// Item in the currently selected hotbar slot
    fn held_item(&self) -> Option<&ItemStack>;

    fn int(&self, key: &str, default: i64) -> i64 {
        self.property(key)
            .and_then(|v| v.as_int())
            .unwrap_or(default)
    }

    fn set_int(&mut self, key: &str, value: i64) {
        self.set_property(key, PropertyValue::Int(value));
    }

    fn float(&self, key: &str, default: f64) -> f64 {
        self.property(key)
            .and_then(|v| v.as_float())
            .unwrap_or(default)
    }

    fn flag(&self, key: &str) -> bool {
        self.property(key)
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
    }

    fn set_flag(&mut self, key: &str, value: bool) {
        self.set_property(key, PropertyValue::Bool(value));
    }

    fn text(&self, key: &str) -> Option<String> {
        self.property(key)
            .and_then(|v| v.as_text().map(str::to_string))
    }

    fn has_property(&self, key: &str) -> bool {
        self.property(key).is_some()
    }
}

// ============================================================================
// In-Memory Actor
// ============================================================================

/// Self-contained actor used by the headless host and by tests.
#[derive(Debug, Clone)]
pub struct MemoryActor {
    id: String,
    name: String,
    properties: BTreeMap<String, PropertyValue>,
    pub messages: Vec<String>,
    pub sounds: Vec<String>,
    pub action_bar: Option<String>,
    pub max_health: i64,
    pub speed_effect: Option<u8>,
    pub inventory: Container,
    pub selected_slot: usize,
}

impl MemoryActor {
    pub fn new(name: &str) -> Self {
        Self::with_id(&uuid::Uuid::new_v4().to_string(), name)
    }

    pub fn with_id(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            properties: BTreeMap::new(),
            messages: Vec::new(),
            sounds: Vec::new(),
            action_bar: None,
            max_health: BASE_MAX_HEALTH,
            speed_effect: None,
            inventory: Container::new(INVENTORY_SIZE),
            selected_slot: 0,
        }
    }

    /// True if any received message contains `needle`
    pub fn received(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }
}

impl Actor for MemoryActor {
    fn id(&self) -> &str {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn property(&self, key: &str) -> Option<PropertyValue> {
        self.properties.get(key).cloned()
    }

    fn set_property(&mut self, key: &str, value: PropertyValue) {
        self.properties.insert(key.to_string(), value);
    }

    fn remove_property(&mut self, key: &str) {
        self.properties.remove(key);
    }

    fn property_keys(&self) -> Vec<String> {
        self.properties.keys().cloned().collect()
    }

    fn send_message(&mut self, text: &str) {
        self.messages.push(text.to_string());
    }

    fn play_sound(&mut self, cue: &str) {
        self.sounds.push(cue.to_string());
    }

    fn set_action_bar(&mut self, text: &str) {
        self.action_bar = Some(text.to_string());
    }

    fn set_max_health(&mut self, max_health: i64) {
        self.max_health = max_health;
    }

    fn set_speed_effect(&mut self, amplifier: Option<u8>) {
        self.speed_effect = amplifier;
    }

    fn inventory(&self) -> &Container {
        &self.inventory
    }

    fn inventory_mut(&mut self) -> &mut Container {
        &mut self.inventory
    }

    fn held_item(&self) -> Option<&ItemStack> {
        self.inventory.get(self.selected_slot)
    }
}
