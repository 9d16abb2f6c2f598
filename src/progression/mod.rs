//! Progression
//!
//! Per-actor counters layered on top of the stat ledger: weapon/ability
//! mastery, skill levels with a node tree, prestige resets, and the set of
//! recipes an actor has unlocked.

pub mod mastery;
pub mod prestige;
pub mod skills;
pub mod unlocks;

pub use mastery::{Mastery, MasteryBonuses, bonuses_for_level, level_for_usage};
pub use prestige::{Prestige, PrestigeBonuses, award_xp};
pub use skills::{Skill, SkillType, Skills, xp_for_next_level};
pub use unlocks::RecipeUnlocks;
