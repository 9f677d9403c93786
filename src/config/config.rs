use crate::Result;
use camino::{Utf8Path, Utf8PathBuf};
use ohno::{IntoAppError, app_err};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;

/// The default configuration TOML content, embedded from `default_config.toml`
pub const DEFAULT_CONFIG_TOML: &str = include_str!("../../default_config.toml");

/// Name of the configuration file looked up in the working directory
const CONFIG_FILE_NAME: &str = "f1db.toml";

/// Highest page size the API accepts
const MAX_PAGE_LIMIT: usize = 100;

/// First season of the world championship
const FIRST_CHAMPIONSHIP_SEASON: i32 = 1950;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Root of the Ergast-compatible API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Records requested per page
    #[serde(default = "default_page_limit")]
    pub page_limit: usize,

    /// Retries on throttling, server errors and network failures
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// First season fetched when no races are stored yet
    #[serde(default = "default_first_season")]
    pub first_season: i32,

    /// Seasons re-fetched behind the newest stored season
    #[serde(default = "default_margin")]
    pub races_margin: usize,

    /// Races re-fetched behind the newest stored standings
    #[serde(default = "default_margin")]
    pub standings_margin: usize,

    /// Earliest season whose drivers and constructors get images
    #[serde(default = "default_images_start_season")]
    pub images_start_season: i32,

    /// Edge length in pixels of the stored square images
    #[serde(default = "default_image_size")]
    pub image_size: u32,
}

fn default_base_url() -> String {
    "https://api.jolpi.ca/ergast/f1".to_string()
}

const fn default_page_limit() -> usize {
    MAX_PAGE_LIMIT
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_request_timeout_secs() -> u64 {
    60
}

const fn default_first_season() -> i32 {
    FIRST_CHAMPIONSHIP_SEASON
}

const fn default_margin() -> usize {
    2
}

const fn default_images_start_season() -> i32 {
    2000
}

const fn default_image_size() -> u32 {
    250
}

impl Config {
    /// Load configuration from a file or use defaults
    ///
    /// When no explicit path is given, `f1db.toml` is looked up in `search_dir`; a missing file
    /// yields the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub fn load(search_dir: &Utf8Path, config_path: Option<&Utf8PathBuf>) -> Result<Self> {
        let (final_path, text) = if let Some(path) = config_path {
            let text = fs::read_to_string(path).into_app_err_with(|| format!("reading f1db configuration file '{path}'"))?;
            (path.clone(), text)
        } else {
            let path = search_dir.join(CONFIG_FILE_NAME);
            match fs::read_to_string(&path) {
                Ok(text) => (path, text),
                Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
                Err(e) => return Err(e).into_app_err_with(|| format!("reading f1db configuration file '{path}'")),
            }
        };

        let config: Self = toml::from_str(&text).into_app_err_with(|| format!("parsing configuration file '{final_path}'"))?;
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if a value is out of range
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(app_err!("base_url must not be empty"));
        }

        if !(1..=MAX_PAGE_LIMIT).contains(&self.page_limit) {
            return Err(app_err!("page_limit must be between 1 and {MAX_PAGE_LIMIT}, got {}", self.page_limit));
        }

        if self.request_timeout_secs == 0 {
            return Err(app_err!("request_timeout_secs must be greater than 0"));
        }

        if self.first_season < FIRST_CHAMPIONSHIP_SEASON {
            return Err(app_err!(
                "first_season must be {FIRST_CHAMPIONSHIP_SEASON} or later, got {}",
                self.first_season
            ));
        }

        if self.image_size == 0 {
            return Err(app_err!("image_size must be greater than 0"));
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        toml::from_str(DEFAULT_CONFIG_TOML).expect("default_config.toml should be valid TOML that deserializes to Config")
    }
}
