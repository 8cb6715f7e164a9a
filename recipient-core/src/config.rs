//! TOML configuration: network, ticker, extra domain suffixes, and the resolver to use.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::classifier::Classifier;
use crate::domain::DomainSuffixSet;
use crate::resolver::{DomainResolver, StaticResolver, UnstoppableResolver, DEFAULT_ENDPOINT};
use crate::types::{Network, Ticker};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unable to read config '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unable to parse config: {0}")]
    Parse(String),
    #[error("invalid config value for '{field}': {message}")]
    InvalidValue { field: &'static str, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolverProvider {
    #[default]
    Unstoppable,
    Static,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsConfig {
    pub extra_suffixes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    pub provider: ResolverProvider,
    pub endpoint: String,
    /// Name of the environment variable holding the API key, if any.
    pub api_key_env: Option<String>,
    pub timeout_ms: u64,
    /// Static records: domain -> ticker -> address.
    pub records: BTreeMap<String, BTreeMap<String, String>>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            provider: ResolverProvider::default(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key_env: Some("UD_API_KEY".to_string()),
            timeout_ms: 8_000,
            records: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RecipientConfig {
    pub network: Network,
    pub ticker: Ticker,
    pub domains: DomainsConfig,
    pub resolver: ResolverConfig,
}

impl RecipientConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ticker.as_str().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "ticker",
                message: "ticker cannot be empty".to_string(),
            });
        }
        if self.resolver.timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "resolver.timeout_ms",
                message: "timeout must be greater than 0".to_string(),
            });
        }
        if self.resolver.provider == ResolverProvider::Unstoppable
            && self.resolver.endpoint.trim().is_empty()
        {
            return Err(ConfigError::InvalidValue {
                field: "resolver.endpoint",
                message: "endpoint cannot be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn suffixes(&self) -> DomainSuffixSet {
        DomainSuffixSet::with_extra(&self.domains.extra_suffixes)
    }

    pub fn classifier(&self) -> Classifier {
        Classifier::new(self.network, self.suffixes())
    }

    pub fn resolver_timeout(&self) -> Duration {
        Duration::from_millis(self.resolver.timeout_ms)
    }

    /// Build the configured resolver. The API key is read from the environment, never the file.
    pub fn build_resolver(&self) -> Result<Arc<dyn DomainResolver>, ConfigError> {
        match self.resolver.provider {
            ResolverProvider::Static => {
                let mut resolver = StaticResolver::new();
                for (domain, records) in &self.resolver.records {
                    if records.is_empty() {
                        resolver.insert_empty(domain);
                    }
                    for (ticker, address) in records {
                        resolver.insert(domain, ticker, address.clone());
                    }
                }
                Ok(Arc::new(resolver))
            }
            ResolverProvider::Unstoppable => {
                let api_key = self
                    .resolver
                    .api_key_env
                    .as_deref()
                    .and_then(|name| std::env::var(name).ok())
                    .filter(|key| !key.trim().is_empty());
                let resolver = UnstoppableResolver::new(
                    self.resolver.endpoint.clone(),
                    api_key,
                    self.resolver_timeout(),
                )
                .map_err(|err| ConfigError::InvalidValue {
                    field: "resolver",
                    message: err.to_string(),
                })?;
                Ok(Arc::new(resolver))
            }
        }
    }
}
