//! Layered service configuration.
//!
//! Defaults come from the serde attributes below, then an optional file
//! (`solarsite.toml` unless a path is given), then environment variables
//! prefixed with `SOLARSITE` using `__` between sections, for example
//! `SOLARSITE__LIMITS__MAX_PAGE_SIZE=100`.

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;
use crate::persist::PersistenceMode;

pub const DEFAULT_CONFIG_FILE: &str = "solarsite.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub database: DatabaseSettings,
    pub server: ServerSettings,
    pub limits: Limits,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file; in-memory when absent.
    pub path: Option<String>,
}

impl DatabaseSettings {
    pub fn mode(&self) -> PersistenceMode {
        match &self.path {
            Some(path) => PersistenceMode::File(path.clone()),
            None => PersistenceMode::InMemory,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub bind: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self { bind: "127.0.0.1:5000".to_string() }
    }
}

/// Engine tunables: page sizes, prefilter sizes and safety caps.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub nearest_default: u32,
    /// Half-size of the fixed prefilter box for nearest-k queries.
    pub nearest_box_km: f64,
    pub nearest_cap: u32,
    pub radius_cap: u32,
    /// Factor applied to a hard radius before sizing its prefilter box.
    pub radius_inflation: f64,
    pub similar_cap: u32,
    pub similar_default: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            default_page_size: 50,
            max_page_size: 200,
            nearest_default: 20,
            nearest_box_km: 25.0,
            nearest_cap: 1000,
            radius_cap: 5000,
            radius_inflation: 1.2,
            similar_cap: 5000,
            similar_default: 3,
        }
    }
}

impl Limits {
    /// Clamps a requested count into `[1, max_page_size]`, using `default`
    /// when nothing was requested.
    pub fn clamp(&self, requested: Option<i64>, default: u32) -> u32 {
        let max = self.max_page_size.max(1);
        match requested {
            Some(n) => n.clamp(1, i64::from(max)) as u32,
            None => default.clamp(1, max),
        }
    }

    pub fn page_size(&self, requested: Option<i64>) -> u32 {
        self.clamp(requested, self.default_page_size)
    }
}

impl Settings {
    /// Loads settings from `path` (or the default file) and the environment.
    /// A missing file is not an error.
    pub fn load(path: Option<&str>) -> Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path.unwrap_or(DEFAULT_CONFIG_FILE)).required(false))
            .add_source(Environment::with_prefix("SOLARSITE").separator("__"))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }
}
