use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use std::time::Duration;

/// Complete Jankypet configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct JankypetConfig {
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

/// Pet and decay configuration
#[derive(Debug, Clone, Deserialize)]
pub struct GameConfig {
    #[serde(default = "default_pet_name")]
    pub pet_name: String,
    #[serde(default = "default_max_health")]
    pub max_health: u32,
    #[serde(default = "default_initial_health")]
    pub initial_health: u32,
    /// Seconds between decay ticks
    #[serde(default = "default_decay_interval")]
    pub decay_interval_seconds: u64,
}

fn default_pet_name() -> String {
    "Jankypet".to_string()
}

fn default_max_health() -> u32 {
    100
}

fn default_initial_health() -> u32 {
    50
}

fn default_decay_interval() -> u64 {
    2
}

impl GameConfig {
    pub fn decay_period(&self) -> Duration {
        Duration::from_secs(self.decay_interval_seconds)
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            pet_name: default_pet_name(),
            max_health: default_max_health(),
            initial_health: default_initial_health(),
            decay_interval_seconds: default_decay_interval(),
        }
    }
}

/// HTTP/WebSocket listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    2323
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    EmptyPetName,
    ZeroMaxHealth,
    ZeroInitialHealth,
    InitialHealthAboveMax { initial: u32, max: u32 },
    ZeroDecayInterval,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPetName => write!(f, "game.pet_name must not be empty"),
            ConfigError::ZeroMaxHealth => write!(f, "game.max_health must be positive"),
            ConfigError::ZeroInitialHealth => {
                write!(f, "game.initial_health must be positive")
            }
            ConfigError::InitialHealthAboveMax { initial, max } => write!(
                f,
                "game.initial_health ({}) must not exceed game.max_health ({})",
                initial, max
            ),
            ConfigError::ZeroDecayInterval => {
                write!(f, "game.decay_interval_seconds must be positive")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl JankypetConfig {
    /// Apply `JANKYPET_*` environment overrides. Unparsable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(v) = lookup("JANKYPET_PET_NAME") {
            self.game.pet_name = v;
        }
        if let Some(v) = lookup("JANKYPET_DECAY_INTERVAL_SECONDS") {
            if let Ok(n) = v.parse::<u64>() {
                self.game.decay_interval_seconds = n;
            }
        }
        if let Some(v) = lookup("JANKYPET_HOST") {
            self.server.host = v;
        }
        if let Some(v) = lookup("JANKYPET_PORT") {
            if let Ok(n) = v.parse::<u16>() {
                self.server.port = n;
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let game = &self.game;
        if game.pet_name.trim().is_empty() {
            return Err(ConfigError::EmptyPetName);
        }
        if game.max_health == 0 {
            return Err(ConfigError::ZeroMaxHealth);
        }
        if game.initial_health == 0 {
            return Err(ConfigError::ZeroInitialHealth);
        }
        if game.initial_health > game.max_health {
            return Err(ConfigError::InitialHealthAboveMax {
                initial: game.initial_health,
                max: game.max_health,
            });
        }
        if game.decay_interval_seconds == 0 {
            return Err(ConfigError::ZeroDecayInterval);
        }
        Ok(())
    }
}

/// Load configuration from TOML file
pub fn load_config(path: impl AsRef<Path>) -> Result<JankypetConfig> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    let config: JankypetConfig = toml::from_str(&contents)
        .with_context(|| format!("Failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok(config)
}

/// Load `path` if it exists, otherwise defaults; then apply env overrides
pub fn load_or_default(path: impl AsRef<Path>) -> Result<JankypetConfig> {
    let path = path.as_ref();
    let mut config = if path.exists() {
        load_config(path)?
    } else {
        JankypetConfig::default()
    };
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}
