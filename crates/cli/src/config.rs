//! `willsuite.toml` configuration.
//!
//! Every section and key has a default, so the file and any section in it
//! may be omitted. Command-line flags take precedence over these values.

use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Config file picked up from the working directory when `--config` is
/// not given.
pub(crate) const DEFAULT_CONFIG_FILE: &str = "willsuite.toml";

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    pub logging: LoggingConfig,
    pub clauses: ClausesConfig,
    pub drafts: DraftsConfig,
}

/// `[logging]`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct LoggingConfig {
    /// Level filter such as `"warn"` or `"willsuite_eval=debug"`.
    /// `WILLSUITE_LOG` overrides it.
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: LogFormat::Plain,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum LogFormat {
    #[default]
    Plain,
    Json,
}

/// `[clauses]`
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct ClausesConfig {
    pub drop_unresolved: bool,
}

/// `[drafts]`
#[derive(Debug, Deserialize)]
#[serde(default)]
pub(crate) struct DraftsConfig {
    pub dir: PathBuf,
}

impl Default for DraftsConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from(".willsuite/drafts"),
        }
    }
}

impl Config {
    /// Load `explicit` if given (it must exist), else `willsuite.toml` in
    /// the working directory if present, else defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config, String> {
        let path = match explicit {
            Some(p) => p.to_path_buf(),
            None => {
                let default = PathBuf::from(DEFAULT_CONFIG_FILE);
                if !default.is_file() {
                    return Ok(Config::default());
                }
                default
            }
        };
        let content = std::fs::read_to_string(&path)
            .map_err(|e| format!("could not read config '{}': {}", path.display(), e))?;
        Self::parse(&content).map_err(|e| format!("could not parse '{}': {}", path.display(), e))
    }

    pub fn parse(content: &str) -> Result<Config, toml::de::Error> {
        toml::from_str(content)
    }
}
