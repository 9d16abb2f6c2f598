use std::path::PathBuf;

use manaforge::abilities::{DispatchOutcome, TriggerOutcome};
use manaforge::crafting::{CraftCheck, CraftResult};
use manaforge::item::ItemStack;
use manaforge::mana::Mana;
use manaforge::progression::{Mastery, Prestige, SkillType, Skills};
use manaforge::{Actor, ForgeConfig, GameEvent, MemoryActor, Runtime};

fn data_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data")
}

fn runtime() -> Runtime<MemoryActor> {
    let mut config = ForgeConfig::default();
    config.runtime.data_dir = data_dir();
    Runtime::load(config).unwrap()
}

fn select(runtime: &mut Runtime<MemoryActor>, id: &str, ability: &str) {
    let actor = runtime.actor_mut(id).unwrap();
    let slot = actor
        .inventory
        .slots
        .iter()
        .position(|slot| slot.as_ref().and_then(|item| item.ability()) == Some(ability))
        .unwrap();
    actor.selected_slot = slot;
}

#[test]
fn test_shipped_data_loads() {
    let runtime = runtime();
    let world = runtime.world();
    assert_eq!(world.abilities().len(), 4);
    assert_eq!(world.items().len(), 4);
    assert_eq!(world.recipes().len(), 8);
    assert!(world.dispatcher().registry().contains("AOTV"));
    assert_eq!(world.dispatcher().registry().cost("AOTD"), Some(100));
}

#[test]
fn test_join_use_craft_prestige() {
    let mut runtime = runtime();
    runtime.start();
    runtime.join(MemoryActor::with_id("p1", "Steve"));

    // Ability use through the held custom weapon
    runtime.give_item("p1", "AOTE").unwrap();
    select(&mut runtime, "p1", "AOTE");
    let outcome = runtime.use_item("p1");
    assert!(matches!(
        outcome,
        TriggerOutcome::Dispatched(DispatchOutcome::Executed { cost_spent: 50, handler_failed: false })
    ));
    {
        let actor = runtime.actor_mut("p1").unwrap();
        assert_eq!(Mana::of(&mut *actor).get(), 50);
        assert_eq!(Mastery::of(&mut *actor).usage("AOTE"), 1);
        assert_eq!(Skills::of(&mut *actor).xp(SkillType::Magic), 2);
    }

    // Torches from coal over a stick, placed in the right column
    {
        let table = runtime.crafting_table("p1").unwrap();
        table.put(2, ItemStack::new("minecraft:coal", 1));
        table.put(5, ItemStack::new("minecraft:stick", 1));
    }
    let result = runtime.craft("p1").unwrap();
    assert!(matches!(result, CraftResult::Crafted { .. }));
    assert!(runtime.crafting_table("p1").unwrap().grid().is_empty());
    assert_eq!(runtime.actor("p1").unwrap().inventory.count("minecraft:torch"), 4);

    // Gated recipe stays locked until the unlock key is granted
    {
        let table = runtime.crafting_table("p1").unwrap();
        table.put(1, ItemStack::new("minecraft:iron_block", 1));
        table.put(4, ItemStack::new("minecraft:iron_block", 1));
        table.put(7, ItemStack::new("minecraft:stick", 1));
    }
    let result = runtime.craft("p1").unwrap();
    assert!(matches!(result, CraftResult::Blocked(CraftCheck::Locked { .. })));
    runtime.actor_mut("p1").unwrap().set_int("skill_crafting_level", 10);
    runtime.on_event(&GameEvent::ItemCrafted {
        actor_id: "p1".to_string(),
        item_type: "minecraft:torch".to_string(),
    });
    assert!(runtime.actor("p1").unwrap().received("Advanced Iron Sword"));
    assert!(matches!(runtime.craft("p1").unwrap(), CraftResult::Crafted { .. }));

    // Progression milestones announce prestige, then prestige resets skills
    {
        let actor = runtime.actor_mut("p1").unwrap();
        for skill in [SkillType::Combat, SkillType::Magic, SkillType::Utility] {
            actor.set_int(&format!("skill_{}_level", skill.as_str()), 25);
        }
    }
    for _ in 0..100 {
        runtime.tick();
    }
    assert!(runtime.actor("p1").unwrap().received("You can now PRESTIGE"));

    assert!(runtime.prestige("p1"));
    let actor = runtime.actor_mut("p1").unwrap();
    assert_eq!(Prestige::of(&mut *actor).level(), 1);
    assert_eq!(Skills::of(&mut *actor).level(SkillType::Combat), 0);
    assert_eq!(Mastery::of(&mut *actor).usage("AOTE"), 1);
    assert!(actor.received("PRESTIGE 1!"));
}

#[test]
fn test_repeating_ability_lifecycle() {
    let mut runtime = runtime();
    runtime.join(MemoryActor::with_id("p1", "Steve"));
    runtime.give_item("p1", "AOTV").unwrap();
    select(&mut runtime, "p1", "AOTV");

    assert_eq!(runtime.start_use("p1"), TriggerOutcome::RepeatStarted);
    for _ in 0..10 {
        runtime.tick();
    }
    assert_eq!(Mana::of(runtime.actor_mut("p1").unwrap()).get(), 10);

    // Out of mana: the repeat keeps running but nothing is charged
    for _ in 0..10 {
        runtime.tick();
    }
    let actor = runtime.actor("p1").unwrap();
    assert!(actor.received("Not enough mana"));

    assert_eq!(runtime.stop_use("p1"), TriggerOutcome::RepeatStopped);
    assert_eq!(runtime.pending_tasks(), 0);
}
