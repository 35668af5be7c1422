use std::{path::Path, time::Duration};

use anyhow::Context;
use config::{Config, Environment, File, FileFormat, FileSourceFile};
use sequencer::SpeedDial;
use serde::Deserialize;
use shared::domain::SpeedFactor;

const DEFAULT_CONFIG_FILE: &str = "explorer";
const ENV_PREFIX: &str = "APP";

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub journey_base_delay_ms: u64,
    pub handshake_base_delay_ms: u64,
    pub speed: SpeedFactor,
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            journey_base_delay_ms: 1200,
            handshake_base_delay_ms: 900,
            speed: SpeedFactor::NORMAL,
            log_filter: "warn".into(),
        }
    }
}

impl Settings {
    pub fn journey_base_delay(&self) -> Duration {
        Duration::from_millis(self.journey_base_delay_ms)
    }

    pub fn handshake_base_delay(&self) -> Duration {
        Duration::from_millis(self.handshake_base_delay_ms)
    }

    /// One speed control for both simulations, each with its own base delay.
    pub fn speed_dials(&self) -> SpeedDials {
        let journey = SpeedDial::new(self.journey_base_delay(), self.speed);
        let handshake = journey.with_base(self.handshake_base_delay());
        SpeedDials { journey, handshake }
    }
}

#[derive(Debug, Clone)]
pub struct SpeedDials {
    pub journey: SpeedDial,
    pub handshake: SpeedDial,
}

/// Defaults, then `explorer.toml` (or `path`), then `APP__*` variables.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<Settings> {
    settings_from(config_file(path), env_source())
}

fn config_file(path: Option<&Path>) -> File<FileSourceFile, FileFormat> {
    match path {
        Some(path) => File::from(path).required(true),
        None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
    }
}

fn env_source() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .separator("__")
        .try_parsing(true)
}

fn settings_from(
    file: File<FileSourceFile, FileFormat>,
    env: Environment,
) -> anyhow::Result<Settings> {
    Config::builder()
        .add_source(file)
        .add_source(env)
        .build()
        .context("failed to read explorer settings")?
        .try_deserialize::<Settings>()
        .context("invalid explorer settings")
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
