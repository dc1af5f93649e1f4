// Configuration loading and parsing (draft.toml, provider.toml).

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::draft::state::BAN_LIST_CAPACITY;
use crate::draft::timer::DEFAULT_TURN_DURATION;
use crate::draft::turn::{EloBracket, Role};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("failed to read config file {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },
}

// ---------------------------------------------------------------------------
// Top-level assembled Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Config {
    pub draft: DraftConfig,
    /// Absent when no provider.toml exists; the provider client is then
    /// disabled and recommendations/predictions report as unavailable.
    pub provider: Option<ProviderConfig>,
    pub data_paths: DataPaths,
}

// ---------------------------------------------------------------------------
// draft.toml structs
// ---------------------------------------------------------------------------

/// Raw deserialization target for the entire draft.toml file.
#[derive(Debug, Clone, Deserialize)]
struct DraftFile {
    draft: DraftConfig,
    data_paths: DataPaths,
}

/// Draft format and session settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DraftConfig {
    /// Bans each side commits before the pick phase. Zero produces a
    /// no-ban format.
    pub ban_count_per_side: usize,
    /// Pick-phase role order; the snake flips which side leads at every
    /// role boundary.
    pub roles: Vec<Role>,
    /// Seconds each side has per turn.
    #[serde(default = "default_turn_duration")]
    pub turn_duration: u32,
    pub elo_bracket: EloBracket,
    #[serde(default)]
    pub patch: Option<String>,
}

fn default_turn_duration() -> u32 {
    DEFAULT_TURN_DURATION
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataPaths {
    /// JSON champion catalog, loaded once at startup.
    pub champions: String,
}

// ---------------------------------------------------------------------------
// provider.toml structs
// ---------------------------------------------------------------------------

/// Wrapper for the top-level `[provider]` table in provider.toml.
#[derive(Debug, Clone, Deserialize)]
struct ProviderFile {
    provider: ProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the recommendation/prediction service.
    pub base_url: String,
    /// Per-request timeout, distinct from the pick timer.
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
}

fn default_provider_timeout() -> u64 {
    20
}

// ---------------------------------------------------------------------------
// Loading logic
// ---------------------------------------------------------------------------

/// Load and validate configuration from `config/draft.toml` and (optionally)
/// `config/provider.toml`, relative to the given `base_dir`.
pub(crate) fn load_config_from(base_dir: &Path) -> Result<Config, ConfigError> {
    let config_dir = base_dir.join("config");

    // --- draft.toml (required) ---
    let draft_path = config_dir.join("draft.toml");
    let draft_text = read_file(&draft_path)?;
    let draft_file: DraftFile =
        toml::from_str(&draft_text).map_err(|e| ConfigError::ParseError {
            path: draft_path.clone(),
            source: e,
        })?;

    // --- provider.toml (optional) ---
    let provider_path = config_dir.join("provider.toml");
    let provider = if provider_path.exists() {
        let provider_text = read_file(&provider_path)?;
        let provider_file: ProviderFile =
            toml::from_str(&provider_text).map_err(|e| ConfigError::ParseError {
                path: provider_path.clone(),
                source: e,
            })?;
        Some(provider_file.provider)
    } else {
        None
    };

    let config = Config {
        draft: draft_file.draft,
        provider,
        data_paths: draft_file.data_paths,
    };

    validate(&config)?;
    Ok(config)
}

/// Load configuration relative to the current working directory.
pub fn load_config() -> Result<Config, ConfigError> {
    let cwd = std::env::current_dir().map_err(|e| ConfigError::ReadError {
        path: PathBuf::from("."),
        source: e,
    })?;
    load_config_from(&cwd)
}

fn read_file(path: &Path) -> Result<String, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_path_buf(),
        source: e,
    })
}

fn validate(config: &Config) -> Result<(), ConfigError> {
    let draft = &config.draft;

    if draft.ban_count_per_side > BAN_LIST_CAPACITY {
        return Err(ConfigError::ValidationError {
            field: "draft.ban_count_per_side".into(),
            message: format!("must be at most {}", BAN_LIST_CAPACITY),
        });
    }

    if draft.roles.is_empty() {
        return Err(ConfigError::ValidationError {
            field: "draft.roles".into(),
            message: "at least one role is required".into(),
        });
    }

    for (i, role) in draft.roles.iter().enumerate() {
        if draft.roles[..i].contains(role) {
            return Err(ConfigError::ValidationError {
                field: "draft.roles".into(),
                message: format!("role `{}` appears more than once", role),
            });
        }
    }

    if draft.turn_duration == 0 {
        return Err(ConfigError::ValidationError {
            field: "draft.turn_duration".into(),
            message: "must be at least 1 second".into(),
        });
    }

    if let Some(provider) = &config.provider {
        if provider.base_url.is_empty() {
            return Err(ConfigError::ValidationError {
                field: "provider.base_url".into(),
                message: "must not be empty".into(),
            });
        }
        if provider.timeout_secs == 0 {
            return Err(ConfigError::ValidationError {
                field: "provider.timeout_secs".into(),
                message: "must be at least 1 second".into(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_draft_file(text: &str) -> DraftFile {
        toml::from_str(text).expect("draft file should parse")
    }

    const MINIMAL_DRAFT_TOML: &str = r#"
        [draft]
        ban_count_per_side = 5
        roles = ["top", "jungle", "mid", "adc", "support"]
        elo_bracket = "emerald"

        [data_paths]
        champions = "data/champions.json"
    "#;

    fn config_from(draft_file: DraftFile, provider: Option<ProviderConfig>) -> Config {
        Config {
            draft: draft_file.draft,
            provider,
            data_paths: draft_file.data_paths,
        }
    }

    #[test]
    fn minimal_draft_toml_parses_with_defaults() {
        let file = parse_draft_file(MINIMAL_DRAFT_TOML);
        assert_eq!(file.draft.ban_count_per_side, 5);
        assert_eq!(file.draft.roles.len(), 5);
        assert_eq!(file.draft.turn_duration, DEFAULT_TURN_DURATION);
        assert_eq!(file.draft.elo_bracket, EloBracket::Emerald);
        assert!(file.draft.patch.is_none());
        assert_eq!(file.data_paths.champions, "data/champions.json");
    }

    #[test]
    fn explicit_fields_override_defaults() {
        let file = parse_draft_file(
            r#"
            [draft]
            ban_count_per_side = 3
            roles = ["mid", "adc"]
            turn_duration = 45
            elo_bracket = "challenger"
            patch = "14.23"

            [data_paths]
            champions = "champions.json"
        "#,
        );
        assert_eq!(file.draft.ban_count_per_side, 3);
        assert_eq!(file.draft.roles, vec![Role::Mid, Role::Adc]);
        assert_eq!(file.draft.turn_duration, 45);
        assert_eq!(file.draft.patch.as_deref(), Some("14.23"));
    }

    #[test]
    fn provider_toml_parses_with_default_timeout() {
        let file: ProviderFile = toml::from_str(
            r#"
            [provider]
            base_url = "http://localhost:9000"
        "#,
        )
        .unwrap();
        assert_eq!(file.provider.base_url, "http://localhost:9000");
        assert_eq!(file.provider.timeout_secs, 20);
    }

    #[test]
    fn validate_accepts_minimal_config() {
        let config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn validate_rejects_oversized_ban_count() {
        let mut config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        config.draft.ban_count_per_side = 6;
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. }
            if field == "draft.ban_count_per_side"));
    }

    #[test]
    fn validate_rejects_empty_roles() {
        let mut config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        config.draft.roles.clear();
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. }
            if field == "draft.roles"));
    }

    #[test]
    fn validate_rejects_duplicate_roles() {
        let mut config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        config.draft.roles = vec![Role::Mid, Role::Top, Role::Mid];
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. }
            if field == "draft.roles"));
    }

    #[test]
    fn validate_rejects_zero_turn_duration() {
        let mut config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        config.draft.turn_duration = 0;
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. }
            if field == "draft.turn_duration"));
    }

    #[test]
    fn validate_rejects_empty_provider_url() {
        let config = config_from(
            parse_draft_file(MINIMAL_DRAFT_TOML),
            Some(ProviderConfig {
                base_url: String::new(),
                timeout_secs: 20,
            }),
        );
        let err = validate(&config).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { field, .. }
            if field == "provider.base_url"));
    }

    #[test]
    fn zero_ban_count_is_a_valid_format() {
        let mut config = config_from(parse_draft_file(MINIMAL_DRAFT_TOML), None);
        config.draft.ban_count_per_side = 0;
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn load_config_from_missing_dir_reports_file_not_found() {
        let err = load_config_from(Path::new("/nonexistent")).unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
