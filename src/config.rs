//! Configuration
//!
//! Tunable constants for mana, mastery, skills, prestige, cooldowns and the
//! host tick loop. Loaded from an optional TOML file; every field has a
//! default so a missing file or a partial file both work.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{ForgeError, Result};
use crate::progression::SkillType;

/// Shared defaults for ledger views created without an explicit config
pub static DEFAULT_CONFIG: LazyLock<ForgeConfig> = LazyLock::new(ForgeConfig::default);

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ForgeConfig {
    pub mana: ManaConfig,
    pub mastery: MasteryConfig,
    pub skills: SkillsConfig,
    pub prestige: PrestigeConfig,
    pub cooldown: CooldownConfig,
    pub runtime: RuntimeConfig,
}

impl ForgeConfig {
    /// Parse a config from TOML text.
    pub fn from_toml_str(content: &str, origin: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| ForgeError::toml(origin, e))?;
        config.validate(origin)?;
        Ok(config)
    }

    fn validate(&self, origin: &Path) -> Result<()> {
        let thresholds = &self.mastery.thresholds;
        if thresholds.windows(2).any(|pair| pair[0] >= pair[1]) {
            return Err(ForgeError::InvalidConfig {
                path: origin.to_path_buf(),
                reason: format!("mastery.thresholds must be strictly ascending, got {:?}", thresholds),
            });
        }
        Ok(())
    }

    /// Load a config file, falling back to defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ForgeError::io(path, e))?;
        let config = Self::from_toml_str(&content, path)?;
        info!("Loaded config from {:?}", path);
        Ok(config)
    }
}

// ============================================================================
// Sections
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ManaConfig {
    /// Max mana assigned on first initialization
    pub default_max: i64,
    /// Regen per regen tick assigned on first initialization
    pub default_regen: i64,
    /// Max mana before the intelligence bonus is added
    pub base_max: i64,
    pub mana_per_intelligence: f64,
    pub regen_per_intelligence: f64,
    pub regen_interval_ticks: u64,
}

impl Default for ManaConfig {
    fn default() -> Self {
        Self {
            default_max: 100,
            default_regen: 6,
            base_max: 100,
            mana_per_intelligence: 2.0,
            regen_per_intelligence: 0.1,
            regen_interval_ticks: 20,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MasteryConfig {
    /// Usage counts at which mastery levels 1..=N are reached
    pub thresholds: Vec<u64>,
    pub damage_per_level: f64,
    pub cooldown_per_level: f64,
    pub mana_per_level: f64,
}

impl Default for MasteryConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![10, 50, 150, 500, 1000],
            damage_per_level: 0.05,
            cooldown_per_level: 0.10,
            mana_per_level: 0.02,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SkillsConfig {
    pub max_level: i64,
    pub base_xp: f64,
    pub growth: f64,
    /// Categories initialized for every new actor and reset on prestige
    pub categories: Vec<SkillType>,
}

impl Default for SkillsConfig {
    fn default() -> Self {
        Self {
            max_level: 50,
            base_xp: 1000.0,
            growth: 1.2,
            categories: SkillType::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PrestigeConfig {
    pub required_skills: Vec<SkillType>,
    pub required_level: i64,
    pub mana_bonus: i64,
    pub xp_bonus_per_level: f64,
    pub rare_find_per_level: f64,
}

impl Default for PrestigeConfig {
    fn default() -> Self {
        Self {
            required_skills: vec![SkillType::Combat, SkillType::Magic, SkillType::Utility],
            required_level: 25,
            mana_bonus: 50,
            xp_bonus_per_level: 0.1,
            rare_find_per_level: 0.02,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CooldownConfig {
    /// Fractional cooldown reduction per point of attack speed
    pub attack_speed_factor: f64,
    pub max_reduction: f64,
}

impl Default for CooldownConfig {
    fn default() -> Self {
        Self {
            attack_speed_factor: 0.01,
            max_reduction: 0.8,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub data_dir: PathBuf,
    pub tick_millis: u64,
    pub milestone_interval_ticks: u64,
    pub repeat_interval_ticks: u64,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            tick_millis: 50,
            milestone_interval_ticks: 100,
            repeat_interval_ticks: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = ForgeConfig::default();
        assert_eq!(config.mana.default_max, 100);
        assert_eq!(config.mana.default_regen, 6);
        assert_eq!(config.mastery.thresholds, vec![10, 50, 150, 500, 1000]);
        assert_eq!(config.skills.max_level, 50);
        assert_eq!(config.prestige.required_level, 25);
        assert_eq!(config.runtime.repeat_interval_ticks, 10);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let toml_str = r#"
            [mana]
            default_max = 250

            [prestige]
            required_skills = ["combat"]
        "#;

        let config = ForgeConfig::from_toml_str(toml_str, Path::new("inline")).unwrap();
        assert_eq!(config.mana.default_max, 250);
        assert_eq!(config.mana.default_regen, 6);
        assert_eq!(config.prestige.required_skills, vec![SkillType::Combat]);
        assert_eq!(config.prestige.mana_bonus, 50);
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config = ForgeConfig::load(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.cooldown.max_reduction, 0.8);
    }

    #[test]
    fn test_load_bad_file_reports_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manaforge.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"[mana\nbroken").unwrap();

        let err = ForgeConfig::load(&path).unwrap_err();
        assert!(matches!(err, ForgeError::Toml { .. }));
    }

    #[test]
    fn test_unsorted_mastery_thresholds_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("manaforge.toml");
        std::fs::write(&path, "[mastery]\nthresholds = [10, 150, 50]\n").unwrap();
        let err = ForgeConfig::load(&path).unwrap_err();
        assert!(matches!(err, ForgeError::InvalidConfig { .. }));

        let repeated = "[mastery]\nthresholds = [10, 10, 50]\n";
        assert!(ForgeConfig::from_toml_str(repeated, Path::new("inline")).is_err());

        let sorted = "[mastery]\nthresholds = [5, 20]\n";
        let config = ForgeConfig::from_toml_str(sorted, Path::new("inline")).unwrap();
        assert_eq!(config.mastery.thresholds, vec![5, 20]);
    }
}
