//! Dispatch Hooks
//!
//! Cross-cutting behavior around ability dispatch is an ordered list of
//! hooks configured at startup. Every `before` runs in order ahead of the
//! registry call, then every `after` in the same order with the outcome.

use std::collections::BTreeSet;

use tracing::debug;

use crate::actor::Actor;
use crate::config::ForgeConfig;
use crate::progression::{Mastery, SkillType, award_xp};
use crate::tracker::Achievements;

use super::context::AbilityContext;
use super::registry::{AbilityRegistry, DispatchOutcome};

/// Magic XP granted per tracked ability use
pub const MAGIC_XP_PER_USE: i64 = 2;

pub trait AbilityHook {
    fn name(&self) -> &str;

    fn before(&self, _id: &str, _actor: &mut dyn Actor, _ctx: &AbilityContext) {}

    fn after(
        &self,
        _id: &str,
        _actor: &mut dyn Actor,
        _ctx: &AbilityContext,
        _outcome: &DispatchOutcome,
    ) {
    }
}

/// Registry plus its hook chain
pub struct AbilityDispatcher {
    registry: AbilityRegistry,
    hooks: Vec<Box<dyn AbilityHook>>,
}

impl AbilityDispatcher {
    pub fn new(registry: AbilityRegistry) -> Self {
        Self {
            registry,
            hooks: Vec::new(),
        }
    }

    pub fn with_hook(mut self, hook: impl AbilityHook + 'static) -> Self {
        self.add_hook(hook);
        self
    }

    pub fn add_hook(&mut self, hook: impl AbilityHook + 'static) {
        debug!("Added ability hook '{}'", hook.name());
        self.hooks.push(Box::new(hook));
    }

    pub fn hook_names(&self) -> Vec<&str> {
        self.hooks.iter().map(|h| h.name()).collect()
    }

    pub fn registry(&self) -> &AbilityRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut AbilityRegistry {
        &mut self.registry
    }

    pub fn invoke(&self, id: &str, actor: &mut dyn Actor, ctx: &AbilityContext) -> DispatchOutcome {
        for hook in &self.hooks {
            hook.before(id, actor, ctx);
        }
        let outcome = self.registry.invoke(id, actor, ctx);
        for hook in &self.hooks {
            hook.after(id, actor, ctx, &outcome);
        }
        outcome
    }
}

/// Awards magic XP and a mastery use whenever a tracked ability's handler ran
pub struct UsageTracker {
    tracked: BTreeSet<String>,
    config: ForgeConfig,
    achievements: Achievements,
}

impl UsageTracker {
    pub fn new<I, S>(tracked: I, config: ForgeConfig) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            tracked: tracked.into_iter().map(Into::into).collect(),
            config,
            achievements: Achievements::standard(),
        }
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.tracked.contains(id)
    }
}

impl AbilityHook for UsageTracker {
    fn name(&self) -> &str {
        "usage-tracker"
    }

    fn after(
        &self,
        id: &str,
        actor: &mut dyn Actor,
        _ctx: &AbilityContext,
        outcome: &DispatchOutcome,
    ) {
        if !outcome.handler_ran() || !self.is_tracked(id) {
            return;
        }

        award_xp(actor, &self.config, SkillType::Magic, MAGIC_XP_PER_USE);

        let max_level = self.config.mastery.thresholds.len() as u8;
        let mut mastery = Mastery::with_config(&mut *actor, &self.config.mastery);
        if mastery.add_usage(id) && mastery.level(id) >= max_level {
            self.achievements.check(actor, "weapon_master", &self.config);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::context::TriggerKind;
    use crate::actor::MemoryActor;
    use crate::mana::Mana;
    use crate::progression::Skills;
    use std::cell::RefCell;
    use std::rc::Rc;

    struct Recorder {
        label: &'static str,
        log: Rc<RefCell<Vec<String>>>,
    }

    impl AbilityHook for Recorder {
        fn name(&self) -> &str {
            self.label
        }

        fn before(&self, id: &str, _actor: &mut dyn Actor, _ctx: &AbilityContext) {
            self.log.borrow_mut().push(format!("{} before {}", self.label, id));
        }

        fn after(&self, id: &str, _actor: &mut dyn Actor, _ctx: &AbilityContext, outcome: &DispatchOutcome) {
            self.log
                .borrow_mut()
                .push(format!("{} after {} ran={}", self.label, id, outcome.handler_ran()));
        }
    }

    fn registry() -> AbilityRegistry {
        let mut registry = AbilityRegistry::new();
        registry
            .register("AOTE", |_actor: &mut dyn Actor, _ctx: &AbilityContext| Ok(()), 50, true)
            .unwrap();
        registry
    }

    fn actor_with_mana(current: i64) -> MemoryActor {
        let mut actor = MemoryActor::new("Steve");
        Mana::of(&mut actor).init(100, 6);
        Mana::of(&mut actor).set(current);
        actor
    }

    #[test]
    fn test_hooks_run_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let dispatcher = AbilityDispatcher::new(registry())
            .with_hook(Recorder { label: "a", log: Rc::clone(&log) })
            .with_hook(Recorder { label: "b", log: Rc::clone(&log) });
        assert_eq!(dispatcher.hook_names(), vec!["a", "b"]);

        let mut actor = actor_with_mana(100);
        dispatcher.invoke("AOTE", &mut actor, &AbilityContext::new(TriggerKind::Use));

        assert_eq!(
            *log.borrow(),
            vec!["a before AOTE", "b before AOTE", "a after AOTE ran=true", "b after AOTE ran=true"]
        );
    }

    #[test]
    fn test_usage_tracker_awards_on_execution() {
        let dispatcher = AbilityDispatcher::new(registry())
            .with_hook(UsageTracker::new(["AOTE"], ForgeConfig::default()));

        let mut actor = actor_with_mana(100);
        dispatcher.invoke("AOTE", &mut actor, &AbilityContext::new(TriggerKind::Use));

        assert_eq!(Skills::of(&mut actor).xp(SkillType::Magic), 2);
        assert_eq!(Mastery::of(&mut actor).usage("AOTE"), 1);
    }

    #[test]
    fn test_usage_tracker_skips_when_nothing_ran() {
        let dispatcher = AbilityDispatcher::new(registry())
            .with_hook(UsageTracker::new(["AOTE"], ForgeConfig::default()));

        let mut actor = actor_with_mana(10);
        let outcome = dispatcher.invoke("AOTE", &mut actor, &AbilityContext::new(TriggerKind::Use));
        assert!(matches!(outcome, DispatchOutcome::Insufficient { .. }));
        assert_eq!(Skills::of(&mut actor).xp(SkillType::Magic), 0);
        assert_eq!(Mastery::of(&mut actor).usage("AOTE"), 0);
    }

    #[test]
    fn test_max_mastery_grants_weapon_master() {
        let dispatcher = AbilityDispatcher::new(registry())
            .with_hook(UsageTracker::new(["AOTE"], ForgeConfig::default()));

        let mut actor = actor_with_mana(100);
        actor.set_int("usage_AOTE", 999);
        actor.set_int("mastery_AOTE", 4);
        dispatcher.invoke("AOTE", &mut actor, &AbilityContext::new(TriggerKind::Use));

        assert_eq!(Mastery::of(&mut actor).level("AOTE"), 5);
        assert!(actor.flag("achievement_weapon_master"));
        assert!(actor.received("Weapon Master"));
    }
}
