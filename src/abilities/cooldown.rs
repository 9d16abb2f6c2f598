use std::collections::HashMap;

use crate::config::CooldownConfig;

/// Last-use timestamps per (actor, ability), in host milliseconds
pub struct CooldownTracker {
    last_use: HashMap<(String, String), u64>,
    config: CooldownConfig,
}

impl CooldownTracker {
    pub fn new(config: CooldownConfig) -> Self {
        Self {
            last_use: HashMap::new(),
            config,
        }
    }

    /// Cooldown after the attack-speed reduction, capped at `max_reduction`
    pub fn effective_cooldown(&self, cooldown_ms: u64, attack_speed: i64) -> u64 {
        let reduction = (attack_speed.max(0) as f64 * self.config.attack_speed_factor)
            .min(self.config.max_reduction);
        (cooldown_ms as f64 * (1.0 - reduction)).round() as u64
    }

    /// Milliseconds left before the ability can fire again, or None if ready
    pub fn remaining(
        &self,
        actor_id: &str,
        ability: &str,
        cooldown_ms: u64,
        attack_speed: i64,
        now_ms: u64,
    ) -> Option<u64> {
        let last = self
            .last_use
            .get(&(actor_id.to_string(), ability.to_string()))?;
        let ready_at = last + self.effective_cooldown(cooldown_ms, attack_speed);
        (now_ms < ready_at).then(|| ready_at - now_ms)
    }

    pub fn mark_used(&mut self, actor_id: &str, ability: &str, now_ms: u64) {
        self.last_use
            .insert((actor_id.to_string(), ability.to_string()), now_ms);
    }

    /// Drop an actor's timestamps whose unreduced cooldown has run out.
    /// Entries still cooling down are kept so rejoining does not reset them.
    pub fn prune_actor<F>(&mut self, actor_id: &str, now_ms: u64, cooldown_of: F)
    where
        F: Fn(&str) -> u64,
    {
        self.last_use.retain(|(actor, ability), last| {
            actor != actor_id || now_ms < last.saturating_add(cooldown_of(ability))
        });
    }

    pub fn len(&self) -> usize {
        self.last_use.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_use.is_empty()
    }
}

impl Default for CooldownTracker {
    fn default() -> Self {
        Self::new(CooldownConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attack_speed_shortens_cooldown() {
        let tracker = CooldownTracker::default();
        assert_eq!(tracker.effective_cooldown(1000, 0), 1000);
        assert_eq!(tracker.effective_cooldown(1000, 25), 750);
        // Capped at 80% reduction
        assert_eq!(tracker.effective_cooldown(1000, 500), 200);
    }

    #[test]
    fn test_remaining_until_ready() {
        let mut tracker = CooldownTracker::default();
        assert_eq!(tracker.remaining("p1", "ROGUE_SWORD", 1000, 0, 0), None);

        tracker.mark_used("p1", "ROGUE_SWORD", 10_000);
        assert_eq!(tracker.remaining("p1", "ROGUE_SWORD", 1000, 0, 10_400), Some(600));
        assert_eq!(tracker.remaining("p1", "ROGUE_SWORD", 1000, 50, 10_400), Some(100));
        assert_eq!(tracker.remaining("p1", "ROGUE_SWORD", 1000, 0, 11_000), None);
        // Other actors and abilities are independent
        assert_eq!(tracker.remaining("p2", "ROGUE_SWORD", 1000, 0, 10_400), None);
        assert_eq!(tracker.remaining("p1", "AOTE", 1000, 0, 10_400), None);
    }

    #[test]
    fn test_prune_keeps_running_cooldowns() {
        let mut tracker = CooldownTracker::default();
        tracker.mark_used("p1", "AOTE", 0);
        tracker.mark_used("p1", "ROGUE_SWORD", 0);
        tracker.mark_used("p2", "AOTE", 0);

        let cooldown_of = |ability: &str| if ability == "ROGUE_SWORD" { 1000 } else { 0 };
        tracker.prune_actor("p1", 500, cooldown_of);
        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.remaining("p1", "ROGUE_SWORD", 1000, 0, 500), Some(500));

        tracker.prune_actor("p1", 1000, cooldown_of);
        assert_eq!(tracker.len(), 1);
        assert_eq!(tracker.remaining("p2", "AOTE", 1000, 0, 500), Some(500));
    }
}
