//! Item Triggers
//!
//! Routes item events (use, start use, stop use) to abilities. Checks the
//! ability's subscribed events and its cooldown, builds the stats context
//! and dispatches. Repeating abilities fire on an interval task for as long
//! as the actor holds the item; every started repeat is cancelled by
//! `stop_repeat`, `on_disconnect`, or by the task itself once the actor is
//! gone.

use std::collections::HashMap;

use serde::Serialize;
use tracing::{debug, info};

use crate::actor::Actor;
use crate::scheduler::{Scheduler, TaskControl, TaskHandle};
use crate::stats::{Stat, Stats, equipment_stats};

use super::context::{AbilityContext, TriggerKind};
use super::cooldown::CooldownTracker;
use super::definition::AbilityTable;
use super::hooks::AbilityDispatcher;
use super::registry::DispatchOutcome;

/// Result of routing one item event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TriggerOutcome {
    /// Not an ability item, or the ability does not listen to this event
    Ignored,
    OnCooldown { remaining_ms: u64 },
    Dispatched(DispatchOutcome),
    RepeatStarted,
    RepeatStopped,
}

/// Disjoint borrows of a host world needed by a repeat task
pub struct AbilityParts<'a, A> {
    pub dispatcher: &'a AbilityDispatcher,
    pub triggers: &'a mut AbilityTriggers,
    pub actor: Option<&'a mut A>,
}

/// World type driven by the scheduler that repeat tasks run against
pub trait AbilityHost: 'static {
    type Actor: Actor;

    fn ability_parts(&mut self, actor_id: &str) -> AbilityParts<'_, Self::Actor>;
}

struct ActiveRepeat {
    ability: String,
    handle: TaskHandle,
}

pub struct AbilityTriggers {
    table: AbilityTable,
    cooldowns: CooldownTracker,
    repeats: HashMap<String, ActiveRepeat>,
    repeat_interval: u64,
}

impl AbilityTriggers {
    pub fn new(table: AbilityTable, cooldowns: CooldownTracker, repeat_interval: u64) -> Self {
        Self {
            table,
            cooldowns,
            repeats: HashMap::new(),
            repeat_interval,
        }
    }

    pub fn table(&self) -> &AbilityTable {
        &self.table
    }

    pub fn is_repeating(&self, actor_id: &str) -> bool {
        self.repeats.contains_key(actor_id)
    }

    /// Ability an actor is currently repeating
    pub fn repeating_ability(&self, actor_id: &str) -> Option<&str> {
        self.repeats.get(actor_id).map(|r| r.ability.as_str())
    }

    pub fn active_repeats(&self) -> usize {
        self.repeats.len()
    }

    /// Fire `ability` for an item event, honoring subscriptions and cooldown
    pub fn handle_use(
        &mut self,
        dispatcher: &AbilityDispatcher,
        actor: &mut dyn Actor,
        ability: &str,
        trigger: TriggerKind,
        now_ms: u64,
    ) -> TriggerOutcome {
        let Some(definition) = self.table.get(ability) else {
            return TriggerOutcome::Ignored;
        };
        if !definition.fires_on(trigger) {
            return TriggerOutcome::Ignored;
        }

        let equipment = equipment_stats(actor.inventory());
        let stats = Stats::of(&mut *actor).all() + equipment;
        let attack_speed = stats.get(Stat::AttackSpeed);

        if let Some(remaining_ms) = self.cooldowns.remaining(
            actor.id(),
            ability,
            definition.cooldown_ms,
            attack_speed,
            now_ms,
        ) {
            let detail = if attack_speed > 0 {
                format!(" ({} Attack Speed)", attack_speed)
            } else {
                String::new()
            };
            actor.send_message(&format!("§cAbility on cooldown!{}", detail));
            actor.play_sound("note.bass");
            return TriggerOutcome::OnCooldown { remaining_ms };
        }

        let ctx = AbilityContext::new(trigger).with_stats(stats, equipment);
        let outcome = dispatcher.invoke(ability, actor, &ctx);
        if outcome.handler_ran() {
            self.cooldowns.mark_used(actor.id(), ability, now_ms);
        }
        TriggerOutcome::Dispatched(outcome)
    }

    /// Item use started: begin a repeat, or fire a start-use ability
    pub fn start_use<W: AbilityHost>(
        &mut self,
        scheduler: &mut Scheduler<W>,
        dispatcher: &AbilityDispatcher,
        actor: &mut W::Actor,
        ability: &str,
        now_ms: u64,
    ) -> TriggerOutcome {
        let Some(definition) = self.table.get(ability) else {
            return TriggerOutcome::Ignored;
        };
        if definition.repeat {
            self.start_repeat(scheduler, dispatcher, actor, ability, now_ms)
        } else {
            self.handle_use(dispatcher, actor, ability, TriggerKind::StartUse, now_ms)
        }
    }

    /// Item use stopped: end a repeat, or fire a stop-use ability
    pub fn stop_use<W: AbilityHost>(
        &mut self,
        scheduler: &mut Scheduler<W>,
        dispatcher: &AbilityDispatcher,
        actor: &mut W::Actor,
        ability: &str,
        now_ms: u64,
    ) -> TriggerOutcome {
        let Some(definition) = self.table.get(ability) else {
            return TriggerOutcome::Ignored;
        };
        if definition.repeat {
            if self.stop_repeat(scheduler, actor.id()) {
                TriggerOutcome::RepeatStopped
            } else {
                TriggerOutcome::Ignored
            }
        } else {
            self.handle_use(dispatcher, actor, ability, TriggerKind::StopUse, now_ms)
        }
    }

    /// Fire once, then every `repeat_interval` ticks while the item is held.
    /// An actor runs at most one repeat at a time: starting a different
    /// ability replaces the running one, restarting the same one is ignored.
    pub fn start_repeat<W: AbilityHost>(
        &mut self,
        scheduler: &mut Scheduler<W>,
        dispatcher: &AbilityDispatcher,
        actor: &mut W::Actor,
        ability: &str,
        now_ms: u64,
    ) -> TriggerOutcome {
        if !self.table.get(ability).is_some_and(|d| d.repeat) {
            return TriggerOutcome::Ignored;
        }
        let actor_id = actor.id().to_string();
        match self.repeats.get(&actor_id) {
            Some(active) if active.ability == ability => return TriggerOutcome::Ignored,
            Some(_) => {
                self.stop_repeat(scheduler, &actor_id);
            }
            None => {}
        }

        self.handle_use(dispatcher, actor, ability, TriggerKind::StartUse, now_ms);

        let task_actor = actor_id.clone();
        let task_ability = ability.to_string();
        let handle = scheduler.run_interval(self.repeat_interval, move |world: &mut W| {
            let parts = world.ability_parts(&task_actor);
            let Some(actor) = parts.actor else {
                parts.triggers.repeats.remove(&task_actor);
                debug!("Repeat of {} ended: {} is gone", task_ability, task_actor);
                return TaskControl::Stop;
            };

            let held = actor.held_item().and_then(|item| item.ability()) == Some(task_ability.as_str());
            if held {
                parts.dispatcher.invoke(
                    &task_ability,
                    actor,
                    &AbilityContext::new(TriggerKind::Repeat),
                );
            }
            TaskControl::Continue
        });

        info!("{} started repeating {} ({})", actor.name(), ability, handle);
        self.repeats.insert(
            actor_id,
            ActiveRepeat {
                ability: ability.to_string(),
                handle,
            },
        );
        TriggerOutcome::RepeatStarted
    }

    /// Cancel an actor's repeat. Returns false if none was running.
    pub fn stop_repeat<W>(&mut self, scheduler: &mut Scheduler<W>, actor_id: &str) -> bool {
        match self.repeats.remove(actor_id) {
            Some(repeat) => {
                scheduler.clear_run(repeat.handle);
                debug!("{} stopped repeating {}", actor_id, repeat.ability);
                true
            }
            None => false,
        }
    }

    /// Cancel a departing actor's repeat and drop its expired cooldowns
    pub fn on_disconnect<W>(&mut self, scheduler: &mut Scheduler<W>, actor_id: &str, now_ms: u64) {
        self.stop_repeat(scheduler, actor_id);
        let table = &self.table;
        self.cooldowns.prune_actor(actor_id, now_ms, |ability| {
            table.get(ability).map_or(0, |d| d.cooldown_ms)
        });
    }
}
