//! manaforge
//!
//! RPG progression core for a voxel game host: mana, stats, skills,
//! mastery, prestige, a 3x3 recipe matcher and resource-gated abilities,
//! all stored as properties on host-owned actors.

pub mod abilities;
pub mod actor;
pub mod config;
pub mod crafting;
pub mod data;
pub mod error;
pub mod events;
pub mod item;
pub mod mana;
pub mod progression;
pub mod runtime;
pub mod scheduler;
pub mod stats;
pub mod tracker;

pub use actor::{Actor, MemoryActor, PropertyValue};
pub use config::ForgeConfig;
pub use error::{ForgeError, Result};
pub use events::GameEvent;
pub use runtime::Runtime;
