use crate::actor::Actor;

const RECIPE_PREFIX: &str = "recipe_";

/// Recipes an actor has unlocked, stored as `recipe_<key>` flags
pub struct RecipeUnlocks<'a, A: Actor + ?Sized> {
    actor: &'a mut A,
}

impl<'a, A: Actor + ?Sized> RecipeUnlocks<'a, A> {
    pub fn of(actor: &'a mut A) -> Self {
        Self { actor }
    }

    pub fn unlock(&mut self, key: &str) {
        self.actor.set_flag(&format!("{}{}", RECIPE_PREFIX, key), true);
    }

    pub fn lock(&mut self, key: &str) {
        self.actor.set_flag(&format!("{}{}", RECIPE_PREFIX, key), false);
    }

    pub fn has(&self, key: &str) -> bool {
        self.actor.flag(&format!("{}{}", RECIPE_PREFIX, key))
    }

    pub fn unlocked(&self) -> Vec<String> {
        self.actor
            .property_keys()
            .into_iter()
            .filter(|k| self.actor.flag(k))
            .filter_map(|k| k.strip_prefix(RECIPE_PREFIX).map(str::to_string))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::MemoryActor;

    #[test]
    fn test_unlock_lock_cycle() {
        let mut actor = MemoryActor::new("Steve");
        let mut unlocks = RecipeUnlocks::of(&mut actor);
        assert!(!unlocks.has("enchanted_weapon"));

        unlocks.unlock("enchanted_weapon");
        unlocks.unlock("iron_sword_advanced");
        assert!(unlocks.has("enchanted_weapon"));

        unlocks.lock("enchanted_weapon");
        assert!(!unlocks.has("enchanted_weapon"));
        assert_eq!(unlocks.unlocked(), vec!["iron_sword_advanced"]);
    }

    #[test]
    fn test_unlocked_ignores_other_flags() {
        let mut actor = MemoryActor::new("Steve");
        actor.set_flag("stats_initialized", true);
        actor.set_int("recipe_count", 4);
        RecipeUnlocks::of(&mut actor).unlock("legendary_weapons");
        assert_eq!(RecipeUnlocks::of(&mut actor).unlocked(), vec!["legendary_weapons"]);
    }
}
