pub mod item_def;
pub mod item_registry;

pub use item_def::ItemDefinition;
pub use item_registry::ItemRegistry;
