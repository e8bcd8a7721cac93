//! Configuration management for piston-bot

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;

pub const DEFAULT_DISCORD_API_BASE: &str = "https://discord.com/api/v10";
pub const DEFAULT_PISTON_BASE: &str = "https://emkc.org/api/v2/piston";
pub const DEFAULT_MIN_INTERVAL_MS: u64 = 300;

/// Complete bot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub piston: PistonConfig,
    #[serde(default = "default_port")]
    pub port: u16,
}

/// Discord application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 public key from the developer portal
    pub public_key: String,
    /// Application id, used to address webhook follow-up calls
    pub application_id: String,
    /// API base URL; overridable so tests can point at a mock server
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Execution backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PistonConfig {
    #[serde(default = "default_piston_base")]
    pub base_url: String,
    /// Minimum spacing between backend call starts
    #[serde(default = "default_min_interval")]
    pub min_interval_ms: u64,
}

impl Default for PistonConfig {
    fn default() -> Self {
        Self {
            base_url: default_piston_base(),
            min_interval_ms: default_min_interval(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path))?;

        Ok(config)
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let public_key =
            std::env::var("DISCORD_PUBLIC_KEY").context("DISCORD_PUBLIC_KEY not set")?;
        let application_id =
            std::env::var("DISCORD_APPLICATION_ID").context("DISCORD_APPLICATION_ID not set")?;

        let api_base = std::env::var("DISCORD_API_BASE").unwrap_or_else(|_| default_api_base());
        let base_url = std::env::var("PISTON_URL").unwrap_or_else(|_| default_piston_base());

        let min_interval_ms = std::env::var("PISTON_MIN_INTERVAL_MS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MIN_INTERVAL_MS);

        let port = std::env::var("PORT")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_port);

        Ok(Config {
            discord: DiscordConfig {
                public_key,
                application_id,
                api_base,
            },
            piston: PistonConfig {
                base_url,
                min_interval_ms,
            },
            port,
        })
    }
}

fn default_api_base() -> String {
    DEFAULT_DISCORD_API_BASE.to_string()
}

fn default_piston_base() -> String {
    DEFAULT_PISTON_BASE.to_string()
}

fn default_min_interval() -> u64 {
    DEFAULT_MIN_INTERVAL_MS
}

fn default_port() -> u16 {
    8080
}
