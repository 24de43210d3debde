//! Probe configuration.
//!
//! The config file is plain JSON: base URL, the ordered role → token list,
//! and the placeholder values the endpoint templates need. Tokens can be
//! overridden per role through `PROBEGRID_TOKEN_<ROLE>` environment
//! variables so secrets can stay out of the file. All mandatory validation
//! happens here, before the runner ever starts; the core treats what it
//! receives as already valid.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::runner::CredentialSet;
use crate::template::PlaceholderMap;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file `{path}`: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse config file `{path}`: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("config declares no roles; at least one role/token pair is required")]
    NoRoles,
    #[error("role `{role}` has an empty token and no {env_var} override")]
    EmptyToken { role: String, env_var: String },
    #[error("invalid base URL `{base_url}`: {reason}")]
    InvalidBaseUrl { base_url: String, reason: String },
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProbeConfig {
    pub base_url: String,
    pub roles: Vec<RoleEntry>,
    #[serde(default)]
    pub placeholders: HashMap<String, String>,
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RoleEntry {
    pub role: String,
    pub token: String,
}

impl ProbeConfig {
    pub fn credential_set(&self) -> CredentialSet {
        let mut credentials = CredentialSet::new();
        for entry in &self.roles {
            credentials.push(entry.role.clone(), entry.token.clone());
        }
        credentials
    }

    pub fn placeholder_map(&self) -> PlaceholderMap {
        PlaceholderMap::from(self.placeholders.clone())
    }
}

/// Load, apply environment overrides, and validate. Fatal on any problem;
/// this is the only place a credential mistake may stop the process.
pub fn load(path: &Path) -> Result<ProbeConfig, ConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let config: ProbeConfig = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
        path: path.display().to_string(),
        source,
    })?;
    finalize(config)
}

fn finalize(mut config: ProbeConfig) -> Result<ProbeConfig, ConfigError> {
    if config.roles.is_empty() {
        return Err(ConfigError::NoRoles);
    }

    for entry in &mut config.roles {
        let env_var = token_env_var(&entry.role);
        if let Ok(token) = std::env::var(&env_var) {
            if !token.is_empty() {
                entry.token = token;
            }
        }
        if entry.token.is_empty() {
            return Err(ConfigError::EmptyToken {
                role: entry.role.clone(),
                env_var,
            });
        }
    }

    let parsed =
        reqwest::Url::parse(&config.base_url).map_err(|err| ConfigError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: err.to_string(),
        })?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            base_url: config.base_url.clone(),
            reason: format!("unsupported scheme `{}`", parsed.scheme()),
        });
    }

    // Endpoint paths start with `/`; keep the join seam unambiguous.
    while config.base_url.ends_with('/') {
        config.base_url.pop();
    }

    Ok(config)
}

fn token_env_var(role: &str) -> String {
    let suffix: String = role
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_uppercase()
            } else {
                '_'
            }
        })
        .collect();
    format!("PROBEGRID_TOKEN_{suffix}")
}
