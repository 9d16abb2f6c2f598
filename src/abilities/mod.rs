//! Ability System
//!
//! Ability definitions, the resource-gated registry, the hook chain around
//! dispatch, cooldowns and item-event triggers.

pub mod builtin;
pub mod context;
pub mod cooldown;
pub mod definition;
pub mod hooks;
pub mod registry;
pub mod trigger;

pub use context::{AbilityContext, MasteryContext, TriggerKind};
pub use cooldown::CooldownTracker;
pub use definition::{AbilityDefinition, AbilityTable};
pub use hooks::{AbilityDispatcher, AbilityHook, UsageTracker};
pub use registry::{AbilityHandler, AbilityRegistry, DispatchOutcome, adjusted_cost};
pub use trigger::{AbilityHost, AbilityParts, AbilityTriggers, TriggerOutcome};
