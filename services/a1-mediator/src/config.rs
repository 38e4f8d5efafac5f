//! Mediator configuration (strict YAML).
//!
//! Every field has a default, so an empty document is a valid config.

use a1_core::{AppBinding, PolicyTypeId};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_LISTEN: &str = "0.0.0.0:9000";
pub const DEFAULT_XAPP_API: &str = "http://localhost:9100";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path} failed: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid yaml: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MediatorConfig {
    #[serde(default = "default_listen")]
    pub listen: String,

    /// Base URL of the xApp manager's lifecycle API.
    #[serde(default = "default_xapp_api")]
    pub xapp_api: String,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub bindings: Vec<BindingConfig>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    /// JSON file for policy types. In-memory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BindingConfig {
    pub policy_type_id: PolicyTypeId,
    pub app_name: String,
    #[serde(default)]
    pub active: bool,
}

impl From<BindingConfig> for AppBinding {
    fn from(binding: BindingConfig) -> Self {
        AppBinding {
            policy_type_id: binding.policy_type_id,
            app_name: binding.app_name,
            active: binding.active,
        }
    }
}

fn default_listen() -> String {
    DEFAULT_LISTEN.to_string()
}

fn default_xapp_api() -> String {
    DEFAULT_XAPP_API.to_string()
}

impl Default for MediatorConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            xapp_api: default_xapp_api(),
            store: StoreConfig::default(),
            bindings: Vec::new(),
        }
    }
}

impl MediatorConfig {
    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen
            .parse()
            .map_err(|e| ConfigError::Invalid(format!("listen '{}': {e}", self.listen)))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;

        if !(self.xapp_api.starts_with("http://") || self.xapp_api.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "xapp_api must be an http(s) URL, got '{}'",
                self.xapp_api
            )));
        }

        let mut active_types = HashSet::new();
        for binding in &self.bindings {
            if binding.policy_type_id == 0 {
                return Err(ConfigError::Invalid(format!(
                    "binding for '{}' has policy_type_id 0",
                    binding.app_name
                )));
            }
            if binding.app_name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "binding for policy type {} has an empty app_name",
                    binding.policy_type_id
                )));
            }
            if binding.active && !active_types.insert(binding.policy_type_id) {
                return Err(ConfigError::Invalid(format!(
                    "policy type {} has more than one active binding",
                    binding.policy_type_id
                )));
            }
        }
        Ok(())
    }
}

pub fn load_from_file(path: impl AsRef<Path>) -> Result<MediatorConfig, ConfigError> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    load_from_str(&raw)
}

pub fn load_from_str(s: &str) -> Result<MediatorConfig, ConfigError> {
    // an empty document deserializes as null
    let cfg: MediatorConfig = if s.trim().is_empty() {
        MediatorConfig::default()
    } else {
        serde_yaml::from_str(s)?
    };
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_uses_defaults() {
        let cfg = load_from_str("").unwrap();
        assert_eq!(cfg, MediatorConfig::default());
        assert_eq!(cfg.listen_addr().unwrap().port(), 9000);
    }

    #[test]
    fn full_document_parses() {
        let cfg = load_from_str(
            r#"
listen: "127.0.0.1:9001"
xapp_api: "http://xapp-manager:9100"
store:
  path: /var/lib/a1/policy_types.json
bindings:
  - policy_type_id: 20008
    app_name: traffic-steering
    active: true
  - policy_type_id: 20008
    app_name: traffic-steering-v0
"#,
        )
        .unwrap();

        assert_eq!(cfg.xapp_api, "http://xapp-manager:9100");
        assert_eq!(
            cfg.store.path.as_deref(),
            Some(Path::new("/var/lib/a1/policy_types.json"))
        );
        assert_eq!(cfg.bindings.len(), 2);
        assert!(!cfg.bindings[1].active);
    }

    #[test]
    fn shipped_sample_is_valid() {
        let cfg = load_from_str(include_str!("../a1-mediator.yaml")).unwrap();
        assert_eq!(cfg.bindings.len(), 2);
        assert_eq!(cfg.bindings.iter().filter(|b| b.active).count(), 1);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = load_from_str("listen: \"0.0.0.0:9000\"\nxap_api: \"http://x\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn two_active_bindings_are_rejected() {
        let err = load_from_str(
            r#"
bindings:
  - { policy_type_id: 7, app_name: a, active: true }
  - { policy_type_id: 7, app_name: b, active: true }
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("more than one active binding"));
    }

    #[test]
    fn bad_listen_and_url_are_rejected() {
        assert!(matches!(
            load_from_str("listen: nowhere"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            load_from_str("xapp_api: localhost:9100"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn missing_file_is_read_error() {
        let err = load_from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
