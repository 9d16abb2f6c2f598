use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use tracing::{info, warn};

use manaforge::abilities::TriggerOutcome;
use manaforge::{ForgeConfig, MemoryActor, Runtime};

const DEMO_ACTOR: &str = "demo";

// ============================================================================
// Main
// ============================================================================

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("manaforge=info".parse()?),
        )
        .init();

    let config_path = std::env::var("MANAFORGE_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("manaforge.toml"));
    let config = ForgeConfig::load(&config_path)
        .with_context(|| format!("Failed to load config {:?}", config_path))?;
    let tick_millis = config.runtime.tick_millis.max(1);

    let mut runtime: Runtime<MemoryActor> = Runtime::load(config)?;
    runtime.start();

    // Demo actor with the first custom weapon in hand
    runtime.join(MemoryActor::with_id(DEMO_ACTOR, "Demo"));
    match runtime.give_item(DEMO_ACTOR, "AOTE") {
        Ok(_) => {
            if let Some(actor) = runtime.actor_mut(DEMO_ACTOR) {
                let slot = actor
                    .inventory
                    .slots
                    .iter()
                    .position(|slot| slot.as_ref().and_then(|item| item.ability()) == Some("AOTE"));
                actor.selected_slot = slot.unwrap_or(actor.selected_slot);
            }
            let outcome = runtime.use_item(DEMO_ACTOR);
            if let TriggerOutcome::Dispatched(result) = outcome {
                info!("Demo ability use: {:?}", result);
            }
        }
        Err(e) => warn!("Demo weapon unavailable: {}", e),
    }

    // Game tick loop until Ctrl-C
    let mut interval = tokio::time::interval(Duration::from_millis(tick_millis));
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    info!("manaforge running at {} ms per tick", tick_millis);
    loop {
        tokio::select! {
            _ = interval.tick() => runtime.tick(),
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("Ctrl-C handler failed: {}", e);
                }
                break;
            }
        }
    }

    if let Some(actor) = runtime.leave(DEMO_ACTOR) {
        info!(
            "Shut down after {} ticks; demo actor received {} messages",
            runtime.current_tick(),
            actor.messages.len()
        );
    }
    Ok(())
}
