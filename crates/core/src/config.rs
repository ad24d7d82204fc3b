use std::{
    collections::HashMap,
    fmt,
    fs::{self, File},
    io::Write,
    path::PathBuf,
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{instrument, warn};
use url::Url;

use crate::{
    assets::{get_config_dir, get_default_config},
    dispatcher::ReplyMode,
    responder::{GENERIC_ACKNOWLEDGEMENT, LocalResponder, ResponderRule},
};

/// Environment variable selecting the endpoint environment.
pub const ENVIRONMENT_VAR: &str = "CHATWISE_ENV";

const DEFAULT_TITLE: &str = "Assistente Virtual";

#[derive(Error, Debug)]
pub enum ChatwiseConfigError {
    #[error("File system error: {0}")]
    IO(#[from] std::io::Error),
    #[error("YAML parsing error: {0}")]
    YAMLError(#[from] serde_yaml::Error),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Deployment environment used to pick the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn as_str(&self) -> &'static str {
        match &self {
            Environment::Development => "development",
            Environment::Production => "production",
            Environment::Test => "test",
        }
    }

    /// Environment named by `CHATWISE_ENV`, or development when unset.
    pub fn from_env() -> Result<Self, ChatwiseConfigError> {
        match std::env::var(ENVIRONMENT_VAR) {
            Ok(value) if !value.trim().is_empty() => value.parse(),
            _ => Ok(Environment::default()),
        }
    }
}

impl FromStr for Environment {
    type Err = ChatwiseConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "production" | "prod" => Ok(Environment::Production),
            "test" => Ok(Environment::Test),
            other => Err(ChatwiseConfigError::Config(format!(
                "Unknown environment '{other}'"
            ))),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings consumed by the chat widget.
#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub endpoint: Url,
    pub credential: Option<String>,
    pub title: String,
    pub mode: ReplyMode,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub widget: WidgetConfig,
    pub responder: LocalResponder,
}

#[derive(Deserialize, Debug)]
#[serde(untagged)]
enum StringOrObject<T> {
    String(String),
    Object(T),
}

#[derive(Deserialize, Debug)]
struct RawConfig {
    widget: RawWidgetConfig,
    #[serde(default)]
    responder: Option<RawResponderConfig>,
}

#[derive(Deserialize, Debug)]
struct RawWidgetConfig {
    endpoint: StringOrObject<HashMap<Environment, String>>,
    #[serde(default)]
    credential: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    mode: ReplyMode,
}

#[derive(Deserialize, Debug)]
struct RawResponderConfig {
    #[serde(default)]
    fallback: Option<String>,
    #[serde(default)]
    rules: Vec<ResponderRule>,
}

/// Resolves `env:NAME` references; other values are returned as is.
fn resolve_value(value: &str) -> Result<String, ChatwiseConfigError> {
    match value.strip_prefix("env:") {
        Some(name) => {
            let name = name.trim();
            std::env::var(name).map_err(|_| {
                ChatwiseConfigError::Config(format!("Environment variable {name} not found"))
            })
        }
        None => Ok(value.to_string()),
    }
}

impl RawWidgetConfig {
    fn resolve_endpoint(&self, environment: Environment) -> Result<Url, ChatwiseConfigError> {
        let raw = match &self.endpoint {
            StringOrObject::String(s) => s.clone(),
            StringOrObject::Object(per_env) => {
                per_env.get(&environment).cloned().ok_or_else(|| {
                    ChatwiseConfigError::Config(format!(
                        "No endpoint configured for environment '{environment}'"
                    ))
                })?
            }
        };

        let resolved = resolve_value(&raw)?;
        Url::parse(resolved.trim()).map_err(|e| {
            ChatwiseConfigError::Config(format!("Invalid endpoint '{resolved}': {e}"))
        })
    }

    // An unresolvable credential is dropped rather than failing: requests then go
    // out without an Authorization header.
    fn resolve_credential(&self) -> Option<String> {
        let raw = self.credential.as_deref()?;
        match resolve_value(raw) {
            Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
            Ok(_) => None,
            Err(e) => {
                warn!("Ignoring credential: {e}");
                None
            }
        }
    }
}

impl RawResponderConfig {
    fn to_responder(&self) -> Result<LocalResponder, ChatwiseConfigError> {
        if let Some(rule) = self.rules.iter().find(|r| r.reply.trim().is_empty()) {
            return Err(ChatwiseConfigError::Config(format!(
                "Responder rule '{}' has a blank reply",
                rule.name
            )));
        }
        let fallback = match &self.fallback {
            Some(f) if f.trim().is_empty() => {
                return Err(ChatwiseConfigError::Config(
                    "Responder fallback is blank".to_string(),
                ));
            }
            Some(f) => f.clone(),
            None => GENERIC_ACKNOWLEDGEMENT.to_string(),
        };
        Ok(LocalResponder::new(self.rules.clone(), fallback))
    }
}

impl RawConfig {
    #[instrument(skip(self))]
    fn to_config(&self, environment: Environment) -> Result<Config, ChatwiseConfigError> {
        let widget = WidgetConfig {
            endpoint: self.widget.resolve_endpoint(environment)?,
            credential: self.widget.resolve_credential(),
            title: self
                .widget
                .title
                .clone()
                .filter(|t| !t.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            mode: self.widget.mode,
        };

        let responder = match &self.responder {
            Some(raw) => raw.to_responder()?,
            None => LocalResponder::default(),
        };

        Ok(Config {
            environment,
            widget,
            responder,
        })
    }
}

#[instrument(skip(config_path))]
pub fn create_or_get_config_file(
    config_path: Option<PathBuf>,
) -> Result<(bool, PathBuf), ChatwiseConfigError> {
    let actual_path = config_path.unwrap_or_else(|| get_config_dir().join("chatwise.yml"));

    let parent_dir = actual_path.parent().ok_or_else(|| {
        ChatwiseConfigError::IO(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "Config path has no parent directory",
        ))
    })?;

    if !parent_dir.exists() {
        fs::create_dir_all(parent_dir)?;
    }

    if actual_path.exists() {
        Ok((true, actual_path))
    } else {
        File::create(&actual_path)?.write_all(get_default_config().as_bytes())?;
        Ok((false, actual_path))
    }
}

/// Load the configuration, resolving the endpoint for `environment`.
#[instrument(skip(config_path))]
pub fn get_config(
    config_path: Option<PathBuf>,
    environment: Environment,
) -> Result<Config, ChatwiseConfigError> {
    let (_, config_file) = create_or_get_config_file(config_path)?;
    let content = fs::read_to_string(&config_file)?;
    let raw: RawConfig = serde_yaml::from_str(&content)?;
    raw.to_config(environment)
}
