//! Configuration Loader
//!
//! 0. Loads the shared `.env` file if present (via dotenvy)
//! 1. Reads the TOML file named by `FOODGRAM_CONFIG_PATH`
//! 2. Substitutes allow-listed environment variables
//! 3. Deserializes to [`FoodgramConfig`] and validates it

use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, info};
use validator::Validate;

use super::error::{ConfigResult, ConfigurationError};
use super::FoodgramConfig;

const DEFAULT_CONFIG_PATH: &str = "config/foodgram.toml";

/// Environment variable validation rule
#[derive(Debug, Clone)]
struct EnvVarRule {
    name: &'static str,
    description: &'static str,
    pattern: &'static str,
}

/// Variables that may be substituted into the configuration file
fn get_env_var_allowlist() -> Vec<EnvVarRule> {
    vec![
        EnvVarRule {
            name: "DATABASE_URL",
            description: "PostgreSQL connection URL",
            pattern: r"^postgres(ql)?://([a-zA-Z0-9_-]+(:[^@]+)?@)?[a-zA-Z0-9._-]+(:[0-9]+)?/[a-zA-Z0-9_-]+(\?.*)?$",
        },
        EnvVarRule {
            name: "FOODGRAM_ENV",
            description: "Environment name (test, development, production)",
            pattern: r"^(test|development|production)$",
        },
        EnvVarRule {
            name: "FOODGRAM_BIND_ADDRESS",
            description: "API server bind address (host:port)",
            pattern: r"^([0-9]{1,3}(\.[0-9]{1,3}){3}|[a-zA-Z0-9._-]+):[0-9]{1,5}$",
        },
        EnvVarRule {
            name: "FOODGRAM_GATEWAY_BIND_ADDRESS",
            description: "Gateway bind address (host:port)",
            pattern: r"^([0-9]{1,3}(\.[0-9]{1,3}){3}|[a-zA-Z0-9._-]+):[0-9]{1,5}$",
        },
        EnvVarRule {
            name: "FOODGRAM_BACKEND_URL",
            description: "Upstream API base URL used by the gateway",
            pattern: r"^https?://[a-zA-Z0-9._-]+(:[0-9]{1,5})?/?$",
        },
        EnvVarRule {
            name: "FOODGRAM_MEDIA_ROOT",
            description: "Directory for uploaded media",
            pattern: r"^[/\\]?[a-zA-Z0-9._/ -]+$",
        },
        EnvVarRule {
            name: "FOODGRAM_STATIC_ROOT",
            description: "Directory containing the built frontend",
            pattern: r"^[/\\]?[a-zA-Z0-9._/ -]+$",
        },
    ]
}

/// Loads [`FoodgramConfig`] from TOML with environment substitution
#[derive(Debug)]
pub struct ConfigLoader;

impl ConfigLoader {
    /// Detect environment from FOODGRAM_ENV or default to "development"
    pub fn detect_environment() -> String {
        std::env::var("FOODGRAM_ENV").unwrap_or_else(|_| "development".to_string())
    }

    /// Load the shared `.env` file into the process environment
    ///
    /// Variables already set are kept. Binaries call this before
    /// [`crate::logging::init_logging`] so `FOODGRAM_ENV` and `RUST_LOG` from
    /// the file reach the log level choice.
    pub fn load_env_file() -> Option<PathBuf> {
        dotenvy::dotenv().ok()
    }

    /// Load a specific env file; returns whether it was read
    pub fn load_env_file_from(path: &Path) -> bool {
        dotenvy::from_path(path).is_ok()
    }

    /// Load configuration from `FOODGRAM_CONFIG_PATH` (or the default path)
    pub fn load_from_env() -> ConfigResult<FoodgramConfig> {
        Self::load_env_file();

        let config_path = std::env::var("FOODGRAM_CONFIG_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));

        info!(
            config_path = %config_path.display(),
            environment = %Self::detect_environment(),
            "Loading configuration"
        );

        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific file path
    pub fn load_from_path(path: &Path) -> ConfigResult<FoodgramConfig> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigurationError::file_read_error(path.display().to_string(), e))?;

        let config = Self::load_from_str(&contents, &path.display().to_string())?;

        info!(config_path = %path.display(), "Configuration loaded successfully");
        Ok(config)
    }

    /// Parse and validate configuration text; `source` names it in error messages
    pub fn load_from_str(contents: &str, source: &str) -> ConfigResult<FoodgramConfig> {
        let substituted = Self::substitute_env_vars(contents)?;

        let config: FoodgramConfig = toml::from_str(&substituted)
            .map_err(|e| ConfigurationError::invalid_toml(source, e))?;

        config
            .validate()
            .map_err(|errors| ConfigurationError::validation_error(errors.to_string()))?;

        debug!(source = %source, "Configuration validated");
        Ok(config)
    }

    /// Validate an environment variable value against its allowlist rule
    fn validate_env_var(var_name: &str, value: &str) -> ConfigResult<()> {
        let allowlist = get_env_var_allowlist();
        let rule = allowlist
            .iter()
            .find(|rule| rule.name == var_name)
            .ok_or_else(|| {
                ConfigurationError::env_var_error(
                    var_name,
                    format!(
                        "not in the allowlist. Allowed variables: {}",
                        allowlist
                            .iter()
                            .map(|r| r.name)
                            .collect::<Vec<_>>()
                            .join(", ")
                    ),
                )
            })?;

        let regex = Regex::new(rule.pattern).map_err(|e| {
            ConfigurationError::env_var_error(var_name, format!("invalid pattern: {e}"))
        })?;

        if !regex.is_match(value) {
            return Err(ConfigurationError::env_var_error(
                var_name,
                format!("value does not look like a {}", rule.description),
            ));
        }

        Ok(())
    }

    /// Escape characters with special meaning inside TOML basic strings
    fn escape_toml_string(value: &str) -> String {
        value
            .replace('\\', "\\\\")
            .replace('"', "\\\"")
            .replace('\n', "\\n")
            .replace('\r', "\\r")
            .replace('\t', "\\t")
    }

    /// Replace `${VAR}` and `${VAR:-default}` with environment values
    ///
    /// Values taken from the environment are validated and escaped; defaults
    /// written in the file are trusted. A `${VAR}` with no value and no default
    /// is an error.
    fn substitute_env_vars(content: &str) -> ConfigResult<String> {
        let mut result = String::with_capacity(content.len());
        let mut rest = content;

        while let Some(start) = rest.find("${") {
            result.push_str(&rest[..start]);
            let after = &rest[start + 2..];
            let Some(end) = after.find('}') else {
                result.push_str(&rest[start..]);
                rest = "";
                break;
            };

            let expr = &after[..end];
            let (var_name, default_value) = match expr.split_once(":-") {
                Some((name, default)) => (name, Some(default)),
                None => (expr, None),
            };

            let replacement = match std::env::var(var_name) {
                Ok(value) => {
                    Self::validate_env_var(var_name, &value)?;
                    debug!(variable = %var_name, "Substituting configuration value from environment");
                    Self::escape_toml_string(&value)
                }
                Err(_) => match default_value {
                    Some(default) => default.to_string(),
                    None => {
                        return Err(ConfigurationError::env_var_error(
                            var_name,
                            "not set and no default provided",
                        ))
                    }
                },
            };

            result.push_str(&replacement);
            rest = &after[end + 1..];
        }

        result.push_str(rest);
        Ok(result)
    }
}
