use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Deserializer, de::Error};
use tracing_subscriber::filter::LevelFilter;

/// Default config written on first start
const DEFAULT_CONFIG: &str = include_str!("../../config.toml");

/// Application config
#[derive(Deserialize, Debug)]
pub struct Config {
    /// Url to index database
    pub db_url: String,
    /// Directory with one subdirectory of documents per organization
    pub data_dir: PathBuf,
    /// Organization mapping (JSON)
    pub orgs_file: PathBuf,
    /// Where to write engagement snapshot
    pub stats_file: PathBuf,
    /// Log is appended to this file
    pub log_file: PathBuf,
    #[serde(deserialize_with = "level_filter", default = "default_level")]
    pub log_level: LevelFilter,
    /// Organizations skipped on full scan
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub suffixes: Suffixes,
}

/// File name suffixes of document types
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Suffixes {
    pub info: String,
    pub comments: String,
    pub context: String,
}

impl Default for Suffixes {
    fn default() -> Self {
        Self {
            info: "i.json".into(),
            comments: "c.json".into(),
            context: "ctx.json".into(),
        }
    }
}

fn default_level() -> LevelFilter {
    LevelFilter::INFO
}

fn level_filter<'de, D: Deserializer<'de>>(de: D) -> Result<LevelFilter, D::Error> {
    String::deserialize(de)?
        .parse()
        .map_err(D::Error::custom)
}

impl Config {
    /// Read config from `path`, writing the default one there if it's missing
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            std::fs::write(path, DEFAULT_CONFIG)
                .with_context(|| format!("failed to write default config to {}", path.display()))?;
        }

        let cfg_str = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;

        toml::from_str(&cfg_str)
            .with_context(|| format!("invalid config {}", path.display()))
    }
}
