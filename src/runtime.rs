//! Runtime
//!
//! Owns every joined actor, the loaded tables and the tick scheduler. The
//! host feeds it input (item use, crafting, game events, damage) and calls
//! [`Runtime::tick`] at its own rate; periodic work (mana regeneration,
//! progression milestones, repeating abilities) runs off that tick.

use std::collections::HashMap;
use std::path::Path;

use rand::Rng;
use tracing::{debug, error, info, warn};

use crate::abilities::builtin::register_builtin;
use crate::abilities::{
    AbilityContext, AbilityDispatcher, AbilityHost, AbilityParts, AbilityRegistry, AbilityTable,
    AbilityTriggers, CooldownTracker, DispatchOutcome, TriggerKind, TriggerOutcome, UsageTracker,
};
use crate::actor::Actor;
use crate::config::ForgeConfig;
use crate::crafting::{CraftResult, CraftingTable, RecipeRegistry};
use crate::data::ItemRegistry;
use crate::error::Result;
use crate::events::GameEvent;
use crate::item::ItemStack;
use crate::mana::{self, Mana, ManaChange};
use crate::progression::{Mastery, Prestige, Skills};
use crate::scheduler::{Scheduler, TaskControl};
use crate::stats::{
    DamageRoll, DefenseResult, StatBlock, Stats, create_item_with_stats, damage_roll,
    defense_reduction, effective_stats, equipment_stats,
};
use crate::tracker::GameTracker;

const STATS_INITIALIZED: &str = "stats_initialized";
const SKILLS_INITIALIZED: &str = "skills_initialized";
const PRESTIGE_KEY: &str = "prestige_level";

/// Stats every new actor starts with
pub fn starter_stats() -> StatBlock {
    StatBlock {
        strength: 5,
        defense: 3,
        crit_chance: 5,
        crit_damage: 50,
        intelligence: 10,
        ..StatBlock::default()
    }
}

/// Kit handed out on an actor's first join
pub fn starter_items() -> Vec<ItemStack> {
    let sword = create_item_with_stats(
        "minecraft:iron_sword",
        "§fTraining Sword",
        &StatBlock {
            strength: 5,
            crit_chance: 3,
            ..StatBlock::default()
        },
        &["§7Your first weapon", "§8Train with this to improve"],
    );
    let armor = create_item_with_stats(
        "minecraft:leather_chestplate",
        "§fTraining Armor",
        &StatBlock {
            defense: 8,
            health: 10,
            intelligence: 50,
            ..StatBlock::default()
        },
        &["§7Basic protection", "§8Better than nothing"],
    );
    let stats_book = ItemStack::named(
        "minecraft:book",
        "stats",
        &["§7Right-click to view", "§7your current stats"],
    );
    let menu_compass = ItemStack::named(
        "minecraft:compass",
        "menu",
        &["§7Right-click to open", "§7the main menu"],
    );
    vec![sword, armor, stats_book, menu_compass]
}

fn held_ability<A: Actor + ?Sized>(actor: &A) -> Option<String> {
    actor
        .held_item()
        .and_then(|item| item.ability())
        .map(str::to_string)
}

// ============================================================================
// World
// ============================================================================

/// Everything the scheduled tasks operate on
pub struct World<A: Actor> {
    config: ForgeConfig,
    actors: HashMap<String, A>,
    tables: HashMap<String, CraftingTable>,
    dispatcher: AbilityDispatcher,
    triggers: AbilityTriggers,
    recipes: RecipeRegistry,
    items: ItemRegistry,
    tracker: GameTracker,
}

impl<A: Actor + 'static> AbilityHost for World<A> {
    type Actor = A;

    fn ability_parts(&mut self, actor_id: &str) -> AbilityParts<'_, A> {
        AbilityParts {
            dispatcher: &self.dispatcher,
            triggers: &mut self.triggers,
            actor: self.actors.get_mut(actor_id),
        }
    }
}

impl<A: Actor> World<A> {
    pub fn config(&self) -> &ForgeConfig {
        &self.config
    }

    pub fn actor(&self, id: &str) -> Option<&A> {
        self.actors.get(id)
    }

    pub fn recipes(&self) -> &RecipeRegistry {
        &self.recipes
    }

    pub fn items(&self) -> &ItemRegistry {
        &self.items
    }

    pub fn abilities(&self) -> &AbilityTable {
        self.triggers.table()
    }

    pub fn dispatcher(&self) -> &AbilityDispatcher {
        &self.dispatcher
    }

    pub fn triggers(&self) -> &AbilityTriggers {
        &self.triggers
    }

    /// First-join setup. Each part runs once per actor, guarded by a flag.
    fn initialize_actor(&self, actor: &mut A) {
        let config = &self.config;

        if !Mana::of(&mut *actor).is_initialized() {
            Mana::of(&mut *actor).init(config.mana.default_max, config.mana.default_regen);
        }

        if !actor.flag(STATS_INITIALIZED) {
            Stats::with_config(&mut *actor, &config.mana).init(&starter_stats());
            actor.set_flag(STATS_INITIALIZED, true);
        }

        if !actor.flag(SKILLS_INITIALIZED) {
            Skills::with_config(&mut *actor, &config.skills).initialize();
            {
                let mut mastery = Mastery::with_config(&mut *actor, &config.mastery);
                for id in self.triggers.table().ids() {
                    mastery.initialize(id);
                }
            }
            if !actor.has_property(PRESTIGE_KEY) {
                actor.set_int(PRESTIGE_KEY, 0);
            }

            for item in starter_items() {
                if let Some(leftover) = actor.inventory_mut().add_item(item) {
                    warn!("No room for starter item {} for {}", leftover.type_id, actor.name());
                }
            }

            actor.set_flag(SKILLS_INITIALIZED, true);
            actor.send_message("§aWelcome! Your RPG journey begins now!");
        }
    }

    /// Regen plus floor(intelligence * regen_per_intelligence), then refresh the HUD
    fn regen_mana(&mut self) {
        let per_intelligence = self.config.mana.regen_per_intelligence;
        for actor in self.actors.values_mut() {
            let intelligence = effective_stats(actor).intelligence;
            let bonus = (intelligence as f64 * per_intelligence).floor() as i64;
            Mana::of(&mut *actor).regen_tick(bonus);
            mana::display(actor, ManaChange::None);
        }
    }

    fn check_milestones(&mut self) {
        for actor in self.actors.values_mut() {
            self.tracker.check_milestones(actor);
        }
    }
}

// ============================================================================
// Runtime
// ============================================================================

pub struct Runtime<A: Actor + 'static> {
    world: World<A>,
    scheduler: Scheduler<World<A>>,
    started: bool,
}

impl<A: Actor + 'static> Runtime<A> {
    /// Build a runtime from loaded tables. Every defined ability with a
    /// built-in handler is registered and tracked for XP and mastery.
    pub fn new(
        config: ForgeConfig,
        abilities: AbilityTable,
        recipes: RecipeRegistry,
        items: ItemRegistry,
    ) -> Result<Self> {
        let mut registry = AbilityRegistry::with_config(config.mastery.clone());
        register_builtin(&mut registry, &abilities)?;

        let tracked: Vec<String> = abilities.ids().cloned().collect();
        let dispatcher = AbilityDispatcher::new(registry)
            .with_hook(UsageTracker::new(tracked.clone(), config.clone()));
        let triggers = AbilityTriggers::new(
            abilities,
            CooldownTracker::new(config.cooldown.clone()),
            config.runtime.repeat_interval_ticks,
        );
        let tracker = GameTracker::new(config.clone(), tracked);

        Ok(Self {
            world: World {
                config,
                actors: HashMap::new(),
                tables: HashMap::new(),
                dispatcher,
                triggers,
                recipes,
                items,
                tracker,
            },
            scheduler: Scheduler::new(),
            started: false,
        })
    }

    /// Load abilities, recipes and items from `config.runtime.data_dir`.
    /// A table that fails to load is logged and left empty.
    pub fn load(config: ForgeConfig) -> Result<Self> {
        let data_dir = config.runtime.data_dir.clone();
        let (abilities, recipes, items) = load_tables(&data_dir);
        Self::new(config, abilities, recipes, items)
    }

    pub fn world(&self) -> &World<A> {
        &self.world
    }

    pub fn config(&self) -> &ForgeConfig {
        &self.world.config
    }

    pub fn actor(&self, id: &str) -> Option<&A> {
        self.world.actors.get(id)
    }

    pub fn actor_mut(&mut self, id: &str) -> Option<&mut A> {
        self.world.actors.get_mut(id)
    }

    pub fn actor_count(&self) -> usize {
        self.world.actors.len()
    }

    pub fn current_tick(&self) -> u64 {
        self.scheduler.current_tick()
    }

    /// Scheduled tasks still alive (periodic loops plus active repeats)
    pub fn pending_tasks(&self) -> usize {
        self.scheduler.pending()
    }

    /// Host time derived from the tick counter
    pub fn now_ms(&self) -> u64 {
        self.scheduler.current_tick() * self.world.config.runtime.tick_millis
    }

    /// Register (or replace) an ability handler
    pub fn register_ability<F>(&mut self, id: &str, handler: F, cost: i64, uses_cost: bool) -> Result<()>
    where
        F: Fn(&mut dyn Actor, &AbilityContext) -> anyhow::Result<()> + 'static,
    {
        self.world
            .dispatcher
            .registry_mut()
            .register(id, handler, cost, uses_cost)
    }

    // ------------------------------------------------------------------------
    // Lifecycle
    // ------------------------------------------------------------------------

    /// Start the periodic loops. Calling it again does nothing.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;

        let runtime = &self.world.config.runtime;
        let regen_interval = self.world.config.mana.regen_interval_ticks;
        self.scheduler.run_interval(regen_interval, |world: &mut World<A>| {
            world.regen_mana();
            TaskControl::Continue
        });
        self.scheduler
            .run_interval(runtime.milestone_interval_ticks, |world: &mut World<A>| {
                world.check_milestones();
                TaskControl::Continue
            });

        info!(
            "Runtime started: regen every {} ticks, milestones every {} ticks",
            regen_interval, runtime.milestone_interval_ticks
        );
    }

    pub fn tick(&mut self) {
        self.scheduler.advance(&mut self.world);
    }

    /// Add an actor, initializing its ledgers on first join
    pub fn join(&mut self, mut actor: A) {
        self.world.initialize_actor(&mut actor);
        let id = actor.id().to_string();
        info!("{} joined ({})", actor.name(), id);

        if self.world.actors.insert(id.clone(), actor).is_some() {
            warn!("Actor {} joined twice, replacing", id);
        }
        self.world.tables.entry(id).or_default();
    }

    /// Remove an actor, cancelling its repeat and returning its crafting grid
    pub fn leave(&mut self, actor_id: &str) -> Option<A> {
        let now_ms = self.now_ms();
        self.world.triggers.on_disconnect(&mut self.scheduler, actor_id, now_ms);
        let mut actor = self.world.actors.remove(actor_id)?;

        if let Some(mut table) = self.world.tables.remove(actor_id) {
            for leftover in table.cancel(&mut actor) {
                warn!(
                    "Dropped {} x{} from {}'s crafting grid, inventory full",
                    leftover.type_id,
                    leftover.amount,
                    actor.name()
                );
            }
        }

        info!("{} left ({})", actor.name(), actor_id);
        Some(actor)
    }

    // ------------------------------------------------------------------------
    // Abilities
    // ------------------------------------------------------------------------

    /// Right-click with the held item
    pub fn use_item(&mut self, actor_id: &str) -> TriggerOutcome {
        let now_ms = self.now_ms();
        let world = &mut self.world;
        let Some(actor) = world.actors.get_mut(actor_id) else {
            return TriggerOutcome::Ignored;
        };
        let Some(ability) = held_ability(actor) else {
            return TriggerOutcome::Ignored;
        };
        world
            .triggers
            .handle_use(&world.dispatcher, actor, &ability, TriggerKind::Use, now_ms)
    }

    pub fn start_use(&mut self, actor_id: &str) -> TriggerOutcome {
        let now_ms = self.now_ms();
        let world = &mut self.world;
        let Some(actor) = world.actors.get_mut(actor_id) else {
            return TriggerOutcome::Ignored;
        };
        let Some(ability) = held_ability(actor) else {
            return TriggerOutcome::Ignored;
        };
        world
            .triggers
            .start_use(&mut self.scheduler, &world.dispatcher, actor, &ability, now_ms)
    }

    pub fn stop_use(&mut self, actor_id: &str) -> TriggerOutcome {
        let now_ms = self.now_ms();
        let world = &mut self.world;
        let Some(actor) = world.actors.get_mut(actor_id) else {
            return TriggerOutcome::Ignored;
        };
        let Some(ability) = held_ability(actor) else {
            return TriggerOutcome::Ignored;
        };
        world
            .triggers
            .stop_use(&mut self.scheduler, &world.dispatcher, actor, &ability, now_ms)
    }

    /// Dispatch an ability directly, bypassing item events and cooldowns.
    /// None when the actor has not joined.
    pub fn cast(&mut self, actor_id: &str, ability: &str) -> Option<DispatchOutcome> {
        let world = &mut self.world;
        let actor = world.actors.get_mut(actor_id)?;
        let equipment = equipment_stats(actor.inventory());
        let stats = Stats::of(&mut *actor).all() + equipment;
        let ctx = AbilityContext::new(TriggerKind::Direct).with_stats(stats, equipment);
        Some(world.dispatcher.invoke(ability, actor, &ctx))
    }

    // ------------------------------------------------------------------------
    // Crafting
    // ------------------------------------------------------------------------

    pub fn crafting_table(&mut self, actor_id: &str) -> Option<&mut CraftingTable> {
        self.world.tables.get_mut(actor_id)
    }

    /// Move an inventory stack into a grid cell. A stack already in the cell
    /// goes back to the inventory. Returns false if there was nothing to move.
    pub fn move_to_grid(&mut self, actor_id: &str, slot: usize, cell: usize) -> bool {
        let world = &mut self.world;
        let (Some(actor), Some(table)) = (world.actors.get_mut(actor_id), world.tables.get_mut(actor_id))
        else {
            return false;
        };
        let Some(stack) = actor.inventory().get(slot).cloned() else {
            return false;
        };

        actor.inventory_mut().set(slot, None);
        if let Some(replaced) = table.put(cell, stack) {
            if let Some(leftover) = actor.inventory_mut().add_item(replaced) {
                warn!("Dropped {} x{} moving into the grid", leftover.type_id, leftover.amount);
            }
        }
        true
    }

    /// Craft from the actor's grid. A successful craft counts as an
    /// `ItemCrafted` event for progression.
    pub fn craft(&mut self, actor_id: &str) -> Option<CraftResult> {
        let world = &mut self.world;
        let actor = world.actors.get_mut(actor_id)?;
        let table = world.tables.get_mut(actor_id)?;

        let result = table.craft(&world.recipes, actor);
        if let CraftResult::Crafted { output, .. } = &result {
            let event = GameEvent::ItemCrafted {
                actor_id: actor_id.to_string(),
                item_type: output.type_id.clone(),
            };
            world.tracker.on_event(actor, &event);
        }
        Some(result)
    }

    /// Return grid contents to the inventory; stacks that do not fit are returned
    pub fn cancel_craft(&mut self, actor_id: &str) -> Vec<ItemStack> {
        let world = &mut self.world;
        match (world.actors.get_mut(actor_id), world.tables.get_mut(actor_id)) {
            (Some(actor), Some(table)) => table.cancel(actor),
            _ => Vec::new(),
        }
    }

    /// Give a custom item from the item table. Returns what did not fit.
    pub fn give_item(&mut self, actor_id: &str, item_id: &str) -> Result<Option<ItemStack>> {
        let stack = self.world.items.create_stack(item_id)?;
        match self.world.actors.get_mut(actor_id) {
            Some(actor) => Ok(actor.inventory_mut().add_item(stack)),
            None => Ok(Some(stack)),
        }
    }

    // ------------------------------------------------------------------------
    // Events and combat
    // ------------------------------------------------------------------------

    /// Route a host event. `EntityHurt` carries no progression; hosts apply
    /// damage through [`Runtime::attack_damage`] and [`Runtime::incoming_damage`].
    pub fn on_event(&mut self, event: &GameEvent) {
        debug!("Event {} for {}", event.event_type(), event.actor_id());
        if let GameEvent::PlayerLeft { actor_id } = event {
            self.leave(actor_id);
            return;
        }

        match self.world.actors.get_mut(event.actor_id()) {
            Some(actor) => self.world.tracker.on_event(actor, event),
            None => debug!("Event {} for unknown actor {}", event.event_type(), event.actor_id()),
        }
    }

    /// Scale an outgoing hit by the attacker's stats (equipment included)
    pub fn attack_damage<R: Rng + ?Sized>(
        &mut self,
        attacker_id: &str,
        base: f64,
        rng: &mut R,
    ) -> Option<DamageRoll> {
        let actor = self.world.actors.get_mut(attacker_id)?;
        let roll = damage_roll(&effective_stats(actor), base, rng);
        if roll.is_critical {
            actor.send_message("§c§lCRITICAL STRIKE!");
            actor.play_sound("random.orb");
        }
        Some(roll)
    }

    /// Reduce an incoming hit by the defender's defense
    pub fn incoming_damage(&mut self, defender_id: &str, amount: i64) -> Option<DefenseResult> {
        let actor = self.world.actors.get_mut(defender_id)?;
        let defense = effective_stats(actor).defense;
        let result = defense_reduction(defense, amount);
        if result.damage_blocked > 0 {
            actor.set_action_bar(&format!(
                "§7Blocked §c{} §7damage! (§a{} §7Defense)",
                result.damage_blocked, defense
            ));
        }
        Some(result)
    }

    // ------------------------------------------------------------------------
    // Progression
    // ------------------------------------------------------------------------

    /// Prestige an eligible actor. Returns false if not joined or not eligible.
    pub fn prestige(&mut self, actor_id: &str) -> bool {
        let world = &mut self.world;
        let Some(actor) = world.actors.get_mut(actor_id) else {
            return false;
        };
        if !Prestige::with_config(&mut *actor, &world.config).prestige() {
            return false;
        }

        GameTracker::reset_prestige_notice(actor);
        world.tracker.check_milestones(actor);
        mana::display(actor, ManaChange::None);
        true
    }
}

/// Load every data table under `data_dir`, logging (not propagating) failures
pub fn load_tables(data_dir: &Path) -> (AbilityTable, RecipeRegistry, ItemRegistry) {
    let mut abilities = AbilityTable::new();
    if let Err(e) = abilities.load_from_directory(data_dir) {
        error!("Failed to load ability table: {}", e);
    }

    let mut recipes = RecipeRegistry::new();
    if let Err(e) = recipes.load_from_directory(data_dir) {
        error!("Failed to load recipe registry: {}", e);
    }

    let mut items = ItemRegistry::new();
    if let Err(e) = items.load_from_directory(data_dir) {
        error!("Failed to load item registry: {}", e);
    }

    (abilities, recipes, items)
}
