//! Configuration loading and validation.
//!
//! Sources are layered, lowest priority first:
//!
//! 1. compiled defaults
//! 2. a configuration file (TOML, YAML or JSON, chosen by extension)
//! 3. environment variables prefixed `RENEW_`, with `__` separating nested
//!    keys (`RENEW_EXTRACT__CHUNK_SIZE=4096`)
//!
//! ```toml
//! [repository]
//! path = "/srv/updates"
//! pattern = "*.onv"
//!
//! [extract]
//! chunk_size = 81920
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Json, Serialized, Toml, Yaml};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const ENV_PREFIX: &str = "RENEW_";
pub const DEFAULT_PATTERN: &str = "*.onv";
pub const DEFAULT_CHUNK_SIZE: usize = 81_920;

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub repository: RepositoryConfig,
    pub extract: ExtractConfig,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryConfig {
    /// Directory holding `<version>.onv` packages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
    /// Glob matched against file names in `path`.
    pub pattern: String,
}
impl Default for RepositoryConfig {
    fn default() -> Self {
        Self { path: None, pattern: DEFAULT_PATTERN.to_string() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractConfig {
    /// Bytes copied between progress reports.
    pub chunk_size: usize,
}
impl Default for ExtractConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE }
    }
}

impl Config {
    /// Load configuration from `path`, or from the default location.
    ///
    /// An explicit `path` must exist. The default file
    /// ([`default_path()`](Self::default_path)) is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) if !path.is_file() => exn::bail!(ErrorKind::NotFound(path.to_path_buf())),
            Some(path) => Some(path.to_path_buf()),
            None => Self::default_path().filter(|p| p.is_file()),
        };
        let config: Self = Self::figment(file.as_deref())?
            .extract()
            .or_raise(|| ErrorKind::Load)?;
        config.validate()?;
        tracing::debug!(file = ?file, "Loaded configuration");
        Ok(config)
    }

    /// `config.toml` inside the platform configuration directory.
    pub fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "renew").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    fn figment(file: Option<&Path>) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));
        if let Some(file) = file {
            figment = match file.extension().and_then(|e| e.to_str()) {
                Some("toml") => figment.merge(Toml::file(file)),
                Some("yaml" | "yml") => figment.merge(Yaml::file(file)),
                Some("json") => figment.merge(Json::file(file)),
                _ => exn::bail!(ErrorKind::InvalidValue(format!(
                    "unsupported configuration format: {}",
                    file.display()
                ))),
            };
        }
        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn validate(&self) -> Result<()> {
        if self.extract.chunk_size == 0 {
            exn::bail!(ErrorKind::InvalidValue("extract.chunk_size must be greater than zero".to_string()));
        }
        if self.repository.pattern.is_empty() {
            exn::bail!(ErrorKind::InvalidValue("repository.pattern must not be empty".to_string()));
        }
        Ok(())
    }
}
