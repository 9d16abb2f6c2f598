//! Game Event Types
//!
//! Host lifecycle events routed into the runtime. The tracker awards XP,
//! mastery and unlocks from these.

use serde::{Deserialize, Serialize};

/// Events reported by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Actor broke a block
    BlockBroken {
        actor_id: String,
        /// Block type (e.g., "minecraft:iron_ore", "minecraft:oak_log")
        block_type: String,
    },

    /// Actor killed an entity
    EntityKilled {
        actor_id: String,
        /// Entity type of the victim (e.g., "custom:hostile_zombie")
        entity_type: String,
    },

    /// Actor hit an entity (actor is the attacker)
    EntityHurt {
        actor_id: String,
        entity_type: String,
        /// Damage before stat scaling
        damage: f64,
    },

    /// Actor took an item out of a crafting table
    ItemCrafted {
        actor_id: String,
        /// Output item type
        item_type: String,
    },

    PlayerJoined {
        actor_id: String,
    },

    PlayerLeft {
        actor_id: String,
    },
}

impl GameEvent {
    /// Get the actor ID associated with this event
    pub fn actor_id(&self) -> &str {
        match self {
            GameEvent::BlockBroken { actor_id, .. } => actor_id,
            GameEvent::EntityKilled { actor_id, .. } => actor_id,
            GameEvent::EntityHurt { actor_id, .. } => actor_id,
            GameEvent::ItemCrafted { actor_id, .. } => actor_id,
            GameEvent::PlayerJoined { actor_id } => actor_id,
            GameEvent::PlayerLeft { actor_id } => actor_id,
        }
    }

    /// Get event type as string (for logging/debugging)
    pub fn event_type(&self) -> &'static str {
        match self {
            GameEvent::BlockBroken { .. } => "block_broken",
            GameEvent::EntityKilled { .. } => "entity_killed",
            GameEvent::EntityHurt { .. } => "entity_hurt",
            GameEvent::ItemCrafted { .. } => "item_crafted",
            GameEvent::PlayerJoined { .. } => "player_joined",
            GameEvent::PlayerLeft { .. } => "player_left",
        }
    }
}
