use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::files::FileUpdater;
use crate::version::{
    ConfigError, IdentifierRules, NumberRules, Part, PartKind, PartSpec, PartValue, VersionChain,
};

// =============================================================================
// Config file
// =============================================================================

/// Configuration file used when no path is given
pub const DEFAULT_CONFIG_PATH: &str = "version-chain.json";

// =============================================================================
// Logging
// =============================================================================

/// Environment variable holding the log filter directives
pub const LOG_ENV: &str = "VERSION_CHAIN_LOG";

/// Environment variable selecting the log format (`json` or `text`)
pub const LOG_FORMAT_ENV: &str = "VERSION_CHAIN_LOG_FORMAT";

/// Default log filter when `LOG_ENV` is not set
pub const DEFAULT_LOG_FILTER: &str = "warn";

#[derive(Debug, thiserror::Error)]
pub enum ConfigFileError {
    #[error("Failed to access config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path:?}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Version configuration file structure
///
/// `parts` keeps declaration order, which is also the chain order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VersionConfig {
    pub parts: IndexMap<String, PartConfig>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<FileConfig>,
}

/// One part record. Neither `identifier` nor `number` means a plain number part.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PartConfig {
    #[serde(default)]
    pub value: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requires: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<IdentifierConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number: Option<NumberConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IdentifierConfig {
    pub strings: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "kebab-case")]
pub struct NumberConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label_suffix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<RawValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_start: Option<bool>,
}

/// A file whose contents follow the version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileConfig {
    /// Glob relative to the config file's directory
    pub path: PathBuf,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub patterns: Vec<String>,
}

/// Scalar as written in the file: values and starts may be integers or strings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawValue {
    Integer(i64),
    Text(String),
}

impl From<&PartValue> for RawValue {
    fn from(value: &PartValue) -> Self {
        match value {
            PartValue::Number(n) => {
                i64::try_from(*n).map_or_else(|_| RawValue::Text(n.to_string()), RawValue::Integer)
            }
            PartValue::Identifier(s) => RawValue::Text(s.clone()),
        }
    }
}

impl std::fmt::Display for RawValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RawValue::Integer(n) => write!(f, "{}", n),
            RawValue::Text(s) => f.write_str(s),
        }
    }
}

impl RawValue {
    fn to_part_value(&self, key: &str, kind: &PartKind) -> Result<PartValue, ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            key: key.to_string(),
            value: self.to_string(),
        };

        match (kind, self) {
            (PartKind::Number(_), RawValue::Integer(n)) => {
                u64::try_from(*n).map(PartValue::Number).map_err(|_| invalid())
            }
            (PartKind::Number(_), RawValue::Text(s)) => {
                s.trim().parse::<u64>().map(PartValue::Number).map_err(|_| invalid())
            }
            (PartKind::Identifier(_), raw) => Ok(PartValue::Identifier(raw.to_string())),
        }
    }
}

impl NumberConfig {
    fn to_rules(&self, key: &str) -> Result<NumberRules, ConfigError> {
        let mut rules = NumberRules::default()
            .with_label(self.label.clone().unwrap_or_default())
            .with_label_suffix(self.label_suffix.clone().unwrap_or_default())
            .with_show_start(self.show_start.unwrap_or(true));

        if let Some(start) = &self.start {
            rules = rules.with_start(parse_number_start(key, start)?);
        }
        Ok(rules)
    }
}

fn parse_number_start(key: &str, start: &RawValue) -> Result<u64, ConfigError> {
    let start = match start {
        RawValue::Integer(n) => *n,
        RawValue::Text(s) => s.trim().parse::<i64>().map_err(|_| ConfigError::InvalidNumberStart {
            key: key.to_string(),
            start: s.clone(),
        })?,
    };

    u64::try_from(start).map_err(|_| ConfigError::NegativeNumberStart {
        key: key.to_string(),
        start,
    })
}

impl PartConfig {
    pub fn to_spec(&self, key: &str) -> Result<PartSpec, ConfigError> {
        let kind = match (&self.identifier, &self.number) {
            (Some(_), Some(_)) => {
                return Err(ConfigError::AmbiguousKind {
                    key: key.to_string(),
                });
            }
            (Some(identifier), None) => PartKind::Identifier(IdentifierRules::new(
                key,
                identifier.strings.clone(),
                identifier.start.clone(),
            )?),
            (None, Some(number)) => PartKind::Number(number.to_rules(key)?),
            (None, None) => PartKind::default(),
        };

        let mut spec = PartSpec::new(key, kind);
        if let Some(prefix) = &self.prefix {
            spec = spec.with_prefix(prefix.clone());
        }
        if let Some(requires) = &self.requires {
            spec = spec.with_requires(requires.clone());
        }
        Ok(spec)
    }

    pub fn to_part(&self, key: &str) -> Result<Part, ConfigError> {
        let spec = self.to_spec(key)?;
        let value = self
            .value
            .as_ref()
            .map(|raw| raw.to_part_value(key, spec.kind()))
            .transpose()?;
        Part::with_value(spec, value)
    }
}

impl VersionConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigFileError> {
        debug!("Loading config from {:?}", path);

        let content = std::fs::read_to_string(path).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&content).map_err(|source| ConfigFileError::Json {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigFileError> {
        let mut content = serde_json::to_string_pretty(self).map_err(|source| {
            ConfigFileError::Json {
                path: path.to_path_buf(),
                source,
            }
        })?;
        content.push('\n');

        std::fs::write(path, content).map_err(|source| ConfigFileError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Saved config to {:?}", path);
        Ok(())
    }

    /// Build the version chain described by `parts`
    pub fn to_chain(&self) -> Result<VersionChain, ConfigError> {
        let parts = self
            .parts
            .iter()
            .map(|(key, part)| part.to_part(key))
            .collect::<Result<Vec<_>, _>>()?;
        VersionChain::new(parts)
    }

    /// Copy the chain's current values into `parts`.
    ///
    /// The chain and the config must declare the same keys.
    pub fn update_values(&mut self, chain: &VersionChain) -> Result<(), ConfigError> {
        if let Some(missing) = self.parts.keys().find(|key| chain.part(key).is_err()) {
            return Err(ConfigError::MissingPart {
                key: missing.clone(),
            });
        }

        for (key, value) in chain.values() {
            let part = self
                .parts
                .get_mut(key)
                .ok_or_else(|| ConfigError::UndeclaredPart {
                    key: key.to_string(),
                })?;
            part.value = value.map(RawValue::from);
        }
        Ok(())
    }

    /// File updaters for `files`, with path globs resolved against `base_dir`
    pub fn file_updaters(&self, base_dir: &Path) -> Vec<FileUpdater> {
        // The base directory is literal even when it contains glob characters
        let base_dir = PathBuf::from(glob::Pattern::escape(&base_dir.to_string_lossy()));
        self.files
            .iter()
            .map(|file| FileUpdater::new(base_dir.join(&file.path), file.patterns.clone()))
            .collect()
    }
}
