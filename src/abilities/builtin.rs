//! Built-in ability handlers for the stock weapons.
//!
//! Movement and particle effects belong to the host; these handlers only
//! drive what the actor capability exposes (sounds, messages, effects).

use tracing::{info, warn};

use crate::actor::Actor;
use crate::error::Result;
use crate::stats::Stat;

use super::context::AbilityContext;
use super::definition::AbilityTable;
use super::registry::AbilityRegistry;

/// Base damage of the dragon breath before strength and mastery
const DRAGON_BREATH_DAMAGE: f64 = 18.0;
const ROGUE_SPEED_AMPLIFIER: u8 = 5;

fn instant_transmission(actor: &mut dyn Actor, _ctx: &AbilityContext) -> anyhow::Result<()> {
    actor.play_sound("mob.endermen.portal");
    Ok(())
}

fn dragon_breath(actor: &mut dyn Actor, ctx: &AbilityContext) -> anyhow::Result<()> {
    let strength = ctx.stats.map_or(0, |s| s.get(Stat::Strength)) as f64;
    let damage = (DRAGON_BREATH_DAMAGE * (1.0 + strength / 100.0) * ctx.damage_multiplier()).floor();
    actor.play_sound("mob.enderdragon.growl");
    actor.send_message(&format!("§6Dragon's breath scorches for §c{}§6 damage", damage));
    Ok(())
}

fn speed_boost(actor: &mut dyn Actor, _ctx: &AbilityContext) -> anyhow::Result<()> {
    actor.set_speed_effect(Some(ROGUE_SPEED_AMPLIFIER));
    actor.play_sound("random.pop");
    Ok(())
}

type BuiltinHandler = fn(&mut dyn Actor, &AbilityContext) -> anyhow::Result<()>;

fn builtin(id: &str) -> Option<BuiltinHandler> {
    match id {
        "AOTE" | "AOTV" => Some(instant_transmission),
        "AOTD" => Some(dragon_breath),
        "ROGUE_SWORD" => Some(speed_boost),
        _ => None,
    }
}

/// Register a handler for every defined ability that has a built-in one,
/// charging the defined mana cost. Returns how many were registered.
pub fn register_builtin(registry: &mut AbilityRegistry, table: &AbilityTable) -> Result<usize> {
    let mut registered = 0;
    for definition in table.all() {
        match builtin(&definition.id) {
            Some(handler) => {
                registry.register(&definition.id, handler, definition.mana, true)?;
                registered += 1;
            }
            None => warn!("No built-in handler for ability '{}'", definition.id),
        }
    }
    info!("Registered {} built-in abilities", registered);
    Ok(registered)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::context::{MasteryContext, TriggerKind};
    use crate::abilities::definition::{AbilityDefinition, RawAbilityDefinition};
    use crate::actor::MemoryActor;
    use crate::progression::MasteryBonuses;
    use crate::stats::StatBlock;

    #[test]
    fn test_dragon_breath_scales() {
        let mut actor = MemoryActor::new("Steve");
        let stats = StatBlock {
            strength: 50,
            ..StatBlock::default()
        };
        let ctx = AbilityContext::new(TriggerKind::Use)
            .with_stats(stats, StatBlock::default())
            .enriched(MasteryContext {
                level: 2,
                bonuses: MasteryBonuses::default(),
                damage_multiplier: 1.1,
                adjusted_cost: 96,
            });
        dragon_breath(&mut actor, &ctx).unwrap();
        // 18 * 1.5 * 1.1 = 29.7
        assert!(actor.received("§c29§6 damage"));
    }

    #[test]
    fn test_register_builtin_skips_unknown() {
        let mut table = AbilityTable::new();
        for (id, mana) in [("AOTE", 50), ("ROGUE_SWORD", 50), ("HYPERION", 300)] {
            let raw = RawAbilityDefinition {
                display_name: None,
                mana,
                events: vec![TriggerKind::Use],
                cooldown_ms: 0,
                repeat: false,
            };
            table.insert(AbilityDefinition::from_raw(id, &raw).unwrap());
        }

        let mut registry = AbilityRegistry::new();
        assert_eq!(register_builtin(&mut registry, &table).unwrap(), 2);
        assert_eq!(registry.cost("ROGUE_SWORD"), Some(50));
        assert!(!registry.contains("HYPERION"));
    }
}
