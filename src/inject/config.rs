//! Injector configuration
//!
//! Settings can be loaded from TOML, YAML or JSON. Every field is optional:
//!
//! ```toml
//! cluster_label_name = "cluster"
//!
//! [[matchers]]
//! name = "job"
//! value = "node"
//! type = "="
//! ```

use std::fs;
use std::path::Path;

use derive_more::{Display, Error, From};
use serde_derive::{Deserialize, Serialize};

use super::matcher::{cluster_label_matcher, LabelMatcher};
use super::{try_apply_matchers, InjectError};

#[derive(Debug, Display, From, Error)]
pub enum ConfigError {
    #[display(fmt = "failed to read config: {}", _0)]
    Io(std::io::Error),
    #[display(fmt = "invalid TOML config: {}", _0)]
    Toml(toml::de::Error),
    #[display(fmt = "invalid YAML config: {}", _0)]
    Yaml(serde_yaml::Error),
    #[display(fmt = "invalid JSON config: {}", _0)]
    Json(serde_json::Error),
    #[from(ignore)]
    #[display(fmt = "unsupported config format {:?}", extension)]
    UnsupportedFormat { extension: String },
}

type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InjectorConfig {
    /// Label carrying the cluster name; adds `{label}="$cluster"` when set
    pub cluster_label_name: Option<String>,
    /// Extra matchers applied after the cluster matcher
    pub matchers: Vec<LabelMatcher>,
}

impl InjectorConfig {
    pub fn from_toml_str(input: &str) -> Result<Self> {
        Ok(toml::from_str(input)?)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(input)?)
    }

    pub fn from_json_str(input: &str) -> Result<Self> {
        Ok(serde_json::from_str(input)?)
    }

    /// Load a config file, picking the format from its extension
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();

        let loader: fn(&str) -> Result<Self> = match extension.as_str() {
            "toml" => Self::from_toml_str,
            "yaml" | "yml" => Self::from_yaml_str,
            "json" => Self::from_json_str,
            _ => return Err(ConfigError::UnsupportedFormat { extension }),
        };

        let contents = fs::read_to_string(path)?;
        let config = loader(&contents)?;
        log::info!(
            "Loaded injector config from {} ({} matcher(s))",
            path.display(),
            config.matchers.len()
        );
        Ok(config)
    }

    /// Matchers in application order: cluster matcher first, then the rest
    pub fn effective_matchers(&self) -> Vec<LabelMatcher> {
        let cluster = self
            .cluster_label_name
            .as_deref()
            .and_then(cluster_label_matcher);
        cluster
            .into_iter()
            .chain(self.matchers.iter().cloned())
            .collect()
    }
}

/// Rewrites batches of queries with a fixed set of matchers
#[derive(Debug, Clone)]
pub struct QueryRewriter {
    matchers: Vec<LabelMatcher>,
}

impl QueryRewriter {
    pub fn new(config: InjectorConfig) -> Self {
        let matchers = config.effective_matchers();
        log::debug!("Query rewriter using {} matcher(s)", matchers.len());
        QueryRewriter { matchers }
    }

    pub fn matchers(&self) -> &[LabelMatcher] {
        &self.matchers
    }

    pub fn try_rewrite(&self, query: &str) -> std::result::Result<String, InjectError> {
        try_apply_matchers(query, &self.matchers)
    }

    /// Rewrite one query; an empty string means the query was suppressed
    pub fn rewrite(&self, query: &str) -> String {
        match self.try_rewrite(query) {
            Ok(rendered) => rendered,
            Err(e) => {
                log::warn!("Suppressing query {:?}: {}", query, e);
                String::new()
            }
        }
    }

    pub fn rewrite_all<I, S>(&self, queries: I) -> Vec<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        queries
            .into_iter()
            .map(|query| self.rewrite(query.as_ref()))
            .collect()
    }
}
