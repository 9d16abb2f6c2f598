//! Ability Definitions
//!
//! Per-ability data: mana cost, which item events fire it, cooldown and
//! whether holding the item repeats it. Loaded from `abilities/*.toml`.

use std::collections::{BTreeSet, HashMap};
use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use crate::actor::validate_key_part;
use crate::error::{ForgeError, Result};

use super::context::TriggerKind;

/// Resolved ability definition
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityDefinition {
    pub id: String,
    pub display_name: String,
    pub mana: i64,
    pub events: BTreeSet<TriggerKind>,
    pub cooldown_ms: u64,
    pub repeat: bool,
}

/// Raw ability definition from TOML
#[derive(Debug, Clone, Deserialize)]
pub struct RawAbilityDefinition {
    pub display_name: Option<String>,
    pub mana: i64,
    #[serde(default)]
    pub events: Vec<TriggerKind>,
    #[serde(default)]
    pub cooldown_ms: u64,
    #[serde(default)]
    pub repeat: bool,
}

impl AbilityDefinition {
    pub fn from_raw(id: &str, raw: &RawAbilityDefinition) -> Result<Self> {
        validate_key_part(id)?;
        if raw.mana < 0 {
            return Err(ForgeError::InvalidAbility {
                id: id.to_string(),
                reason: format!("negative mana cost {}", raw.mana),
            });
        }
        if raw.events.is_empty() {
            return Err(ForgeError::InvalidAbility {
                id: id.to_string(),
                reason: "no trigger events".to_string(),
            });
        }

        Ok(Self {
            id: id.to_string(),
            display_name: raw.display_name.clone().unwrap_or_else(|| id.to_string()),
            mana: raw.mana,
            events: raw.events.iter().copied().collect(),
            cooldown_ms: raw.cooldown_ms,
            repeat: raw.repeat,
        })
    }

    pub fn fires_on(&self, trigger: TriggerKind) -> bool {
        self.events.contains(&trigger)
    }
}

/// All ability definitions, keyed by ability id
pub struct AbilityTable {
    abilities: HashMap<String, AbilityDefinition>,
}

impl AbilityTable {
    pub fn new() -> Self {
        Self {
            abilities: HashMap::new(),
        }
    }

    /// Add or replace a definition
    pub fn insert(&mut self, definition: AbilityDefinition) {
        if self.abilities.contains_key(&definition.id) {
            warn!("Duplicate ability ID '{}', overwriting", definition.id);
        }
        self.abilities.insert(definition.id.clone(), definition);
    }

    /// Load all ability definitions from `data_dir/abilities/*.toml`
    pub fn load_from_directory(&mut self, data_dir: &Path) -> Result<()> {
        let abilities_dir = data_dir.join("abilities");

        if !abilities_dir.exists() {
            warn!("Abilities directory does not exist: {:?}", abilities_dir);
            return Ok(());
        }

        let entries =
            std::fs::read_dir(&abilities_dir).map_err(|e| ForgeError::io(&abilities_dir, e))?;

        for entry in entries {
            let path = entry.map_err(|e| ForgeError::io(&abilities_dir, e))?.path();

            if path.extension().is_some_and(|ext| ext == "toml") {
                let content =
                    std::fs::read_to_string(&path).map_err(|e| ForgeError::io(&path, e))?;

                let table: HashMap<String, RawAbilityDefinition> =
                    toml::from_str(&content).map_err(|e| ForgeError::toml(&path, e))?;

                for (id, raw) in table {
                    let definition = AbilityDefinition::from_raw(&id, &raw)?;
                    info!(
                        "Loaded ability: {} ({}) - {} mana, {} ms cooldown{}",
                        definition.display_name,
                        id,
                        definition.mana,
                        definition.cooldown_ms,
                        if definition.repeat { ", repeating" } else { "" }
                    );
                    self.insert(definition);
                }
            }
        }

        info!("Loaded {} ability definitions", self.abilities.len());
        Ok(())
    }

    pub fn get(&self, id: &str) -> Option<&AbilityDefinition> {
        self.abilities.get(id)
    }

    pub fn ids(&self) -> impl Iterator<Item = &String> {
        self.abilities.keys()
    }

    pub fn all(&self) -> impl Iterator<Item = &AbilityDefinition> {
        self.abilities.values()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.abilities.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.abilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.abilities.is_empty()
    }
}

impl Default for AbilityTable {
    fn default() -> Self {
        Self::new()
    }
}
