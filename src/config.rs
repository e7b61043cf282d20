//! Console configuration, loaded from a JSON file.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tape_notation::{ContextError, NoteRange, PatternContext};
use thiserror::Error;

use crate::transport::DEFAULT_TERMINATOR;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid pattern settings: {0}")]
    Context(#[from] ContextError),
}

/// Settings for the `tape` console. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Host tapes are sent to
    pub host: String,
    /// UDP port tapes are sent to
    pub port: u16,
    /// Appended to every sent tape
    pub terminator: String,
    /// Note pool for `?`
    pub notes: Option<Vec<String>>,
    /// Range for the default note pool
    pub range: Option<NoteRange>,
    /// Seed for reproducible random values
    pub seed: Option<u64>,
    /// Variables available to every pattern
    pub vars: HashMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            host: "127.0.0.1".to_string(),
            port: 57120,
            terminator: DEFAULT_TERMINATOR.to_string(),
            notes: None,
            range: None,
            seed: None,
            vars: HashMap::new(),
        }
    }
}

impl AppConfig {
    /// Load config from a JSON file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn from_json(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    /// The pattern context described by `notes`, `range` and `vars`
    pub fn pattern_context(&self) -> Result<PatternContext, ConfigError> {
        Ok(PatternContext::new(
            self.notes.clone(),
            self.range,
            self.vars.clone(),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 57120);
        assert_eq!(config.terminator, ";\n");
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_empty_file_uses_defaults() {
        assert_eq!(AppConfig::from_json("{}").unwrap(), AppConfig::default());
    }

    #[test]
    fn test_partial_config() {
        let json = r#"{
            "port": 9000,
            "range": { "min": 48, "max": 60 },
            "vars": { "root": "48" },
            "seed": 7
        }"#;
        let config = AppConfig::from_json(json).unwrap();
        assert_eq!(config.port, 9000);
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.seed, Some(7));

        let ctx = config.pattern_context().unwrap();
        assert!(ctx.notes().is_none());
        assert_eq!(ctx.range(), NoteRange { min: 48, max: 60 });
        assert_eq!(ctx.vars()["root"], "48");
    }

    #[test]
    fn test_serialize_deserialize() {
        let config = AppConfig {
            notes: Some(vec!["60".into(), "67".into()]),
            ..AppConfig::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(AppConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn test_invalid_settings() {
        assert!(matches!(
            AppConfig::from_json(r#"{ "port": "nope" }"#),
            Err(ConfigError::Parse(_))
        ));

        let config = AppConfig::from_json(r#"{ "notes": [] }"#).unwrap();
        assert!(matches!(
            config.pattern_context(),
            Err(ConfigError::Context(ContextError::EmptyNotePool))
        ));
    }

    #[test]
    fn test_wide_range_is_accepted() {
        let config = AppConfig::from_json(r#"{ "range": { "min": 0, "max": 4000000000 } }"#).unwrap();
        let ctx = config.pattern_context().unwrap();
        assert_eq!(ctx.range().max, 4_000_000_000);
    }

    #[test]
    fn test_missing_file() {
        let err = AppConfig::load(Path::new("/nonexistent/tape.json")).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
