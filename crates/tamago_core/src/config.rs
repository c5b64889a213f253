use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::error::ConfigurationError;
use crate::rules::DeathPolicy;
use crate::stage::{LifeStageTable, StageDefinition};

// ============================================================================
// Top-level config
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PetConfig {
    pub name: String,
    pub death_policy: DeathPolicy,
    /// Delay before the first decay tick.
    pub initial_delay_ms: u64,
    /// Wall-clock seconds that make up one pet year.
    pub seconds_per_year: u64,
    /// Replaces the reference life-stage table when present.
    pub stages: Option<Vec<StageDefinition>>,
}

impl Default for PetConfig {
    fn default() -> Self {
        Self {
            name: "Tamago".to_string(),
            death_policy: DeathPolicy::AnyNeedDepleted,
            initial_delay_ms: 2_000,
            seconds_per_year: 60,
            stages: None,
        }
    }
}

impl PetConfig {
    /// Load config from a TOML file, falling back to defaults for missing fields.
    /// After loading, env var overrides are applied.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;
        let mut config: PetConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from path; if the file doesn't exist, return defaults with env overrides.
    /// A file that exists but cannot be read or parsed is an error.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Config file {} not found, using defaults", path.display());
            let mut cfg = Self::default();
            cfg.apply_env_overrides();
            return Ok(cfg);
        }
        Self::load(path)
    }

    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply `TAMAGO_*` overrides from any key/value source.
    /// Unparseable values are logged and ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("TAMAGO_NAME") {
            if !v.trim().is_empty() {
                self.name = v.trim().to_string();
            }
        }
        if let Some(v) = lookup("TAMAGO_DEATH_POLICY") {
            match v.parse() {
                Ok(policy) => self.death_policy = policy,
                Err(e) => tracing::warn!("Ignoring TAMAGO_DEATH_POLICY: {}", e),
            }
        }
        if let Some(v) = lookup("TAMAGO_SECONDS_PER_YEAR") {
            match v.parse() {
                Ok(n) => self.seconds_per_year = n,
                Err(_) => tracing::warn!("Ignoring TAMAGO_SECONDS_PER_YEAR={:?}: not a number", v),
            }
        }
    }

    /// The life-stage table this config describes, validated.
    pub fn life_stage_table(&self) -> Result<LifeStageTable, ConfigurationError> {
        match &self.stages {
            Some(defs) => LifeStageTable::from_definitions(defs),
            None => Ok(LifeStageTable::standard()),
        }
    }

    pub fn initial_delay(&self) -> Duration {
        Duration::from_millis(self.initial_delay_ms)
    }

    pub fn year(&self) -> Result<Duration, ConfigurationError> {
        if self.seconds_per_year == 0 {
            return Err(ConfigurationError::ZeroYear);
        }
        Ok(Duration::from_secs(self.seconds_per_year))
    }
}

// ============================================================================
// Tests
// ============================================================================
