use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::actor::PropertyValue;
use crate::progression::MasteryBonuses;
use crate::stats::StatBlock;

/// Host input that can fire an ability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    Use,
    StartUse,
    StopUse,
    /// Periodic re-dispatch while a repeating ability is held
    Repeat,
    /// Invoked by code rather than an item event
    Direct,
}

impl TriggerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerKind::Use => "use",
            TriggerKind::StartUse => "start_use",
            TriggerKind::StopUse => "stop_use",
            TriggerKind::Repeat => "repeat",
            TriggerKind::Direct => "direct",
        }
    }
}

/// Mastery data the dispatcher computes before running a handler
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MasteryContext {
    pub level: u8,
    pub bonuses: MasteryBonuses,
    pub damage_multiplier: f64,
    pub adjusted_cost: i64,
}

/// Context handed to an ability handler
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbilityContext {
    pub trigger: TriggerKind,
    /// Effective stats (base plus equipment) at trigger time
    pub stats: Option<StatBlock>,
    pub equipment: Option<StatBlock>,
    pub extra: BTreeMap<String, PropertyValue>,
    /// Filled in by the dispatcher for cost-gated abilities
    pub mastery: Option<MasteryContext>,
}

impl AbilityContext {
    pub fn new(trigger: TriggerKind) -> Self {
        Self {
            trigger,
            stats: None,
            equipment: None,
            extra: BTreeMap::new(),
            mastery: None,
        }
    }

    pub fn with_stats(mut self, stats: StatBlock, equipment: StatBlock) -> Self {
        self.stats = Some(stats);
        self.equipment = Some(equipment);
        self
    }

    pub fn with_extra(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }

    /// Multiplier handlers apply to their damage (1.0 without mastery)
    pub fn damage_multiplier(&self) -> f64 {
        self.mastery.map_or(1.0, |m| m.damage_multiplier)
    }

    pub fn mastery_level(&self) -> u8 {
        self.mastery.map_or(0, |m| m.level)
    }

    /// Caller context merged with the dispatcher's mastery data
    pub fn enriched(&self, mastery: MasteryContext) -> Self {
        let mut ctx = self.clone();
        ctx.mastery = Some(mastery);
        ctx
    }
}

impl Default for AbilityContext {
    fn default() -> Self {
        Self::new(TriggerKind::Direct)
    }
}
