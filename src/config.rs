//! Top-level application configuration.
//!
//! Configuration is stored in `bughive.yaml` (or the file named by
//! `BUGHIVE_CONFIG`) and includes:
//! - Which backend the services talk to (in-memory or a remote table API)
//! - Simulated latency and merge policy for the in-memory store
//! - The acting user identity
//! - Seed snapshot location and theme defaults

use std::env;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BugHiveError, Result};
use crate::patch::MergePolicy;
use crate::preferences::Theme;
use crate::store::{Latency, RestSettings};
use crate::types::{EntityId, UserRef};

/// Environment variable naming an alternative config file
pub const CONFIG_ENV: &str = "BUGHIVE_CONFIG";

/// Environment variable overriding the REST API key
pub const API_KEY_ENV: &str = "BUGHIVE_API_KEY";

const CONFIG_FILE: &str = "bughive.yaml";
const DEFAULT_SEED_FILE: &str = "bughive.json";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backing store for all services
    #[serde(default)]
    pub backend: BackendConfig,

    /// Simulated latency of the in-memory store
    #[serde(default, skip_serializing_if = "Latency::is_zero")]
    pub latency: Latency,

    /// How blank values in updates are treated
    #[serde(default, skip_serializing_if = "is_default_merge")]
    pub merge: MergePolicy,

    /// The acting user
    #[serde(default, skip_serializing_if = "IdentityConfig::is_default")]
    pub identity: IdentityConfig,

    /// JSON snapshot loaded into the in-memory store (default: bughive.json)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<PathBuf>,

    /// Theme used when nothing is stored and the terminal gives no hint
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_theme: Option<Theme>,

    /// Directory holding the stored theme preference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferences_dir: Option<PathBuf>,
}

fn is_default_merge(policy: &MergePolicy) -> bool {
    *policy == MergePolicy::default()
}

/// Backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum BackendConfig {
    #[default]
    Memory,
    Rest(RestSettings),
}

/// Identity recorded as ticket reporter and test execution author
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default = "default_identity_id")]
    pub id: EntityId,
    #[serde(default = "default_identity_name")]
    pub name: String,
    #[serde(default = "default_identity_email")]
    pub email: String,
}

fn default_identity_id() -> EntityId {
    EntityId::new("current-user")
}

fn default_identity_name() -> String {
    "Current User".to_string()
}

fn default_identity_email() -> String {
    "user@example.com".to_string()
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            id: default_identity_id(),
            name: default_identity_name(),
            email: default_identity_email(),
        }
    }
}

impl fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("id", &self.id)
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

impl IdentityConfig {
    /// Check if this config has default values
    pub fn is_default(&self) -> bool {
        *self == Self::default()
    }

    pub fn as_user_ref(&self) -> UserRef {
        UserRef::new(self.id.clone(), self.name.clone())
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => PathBuf::from(CONFIG_FILE),
        }
    }

    /// Load configuration from file, or return default if not found
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            BugHiveError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let mut config: Config = serde_yaml_ng::from_str(&content)?;
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content).map_err(|e| {
            BugHiveError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to write config at {}: {}", path.display(), e),
            ))
        })?;

        // The file may hold an API key
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(path, fs::Permissions::from_mode(0o600))?;
        }

        Ok(())
    }

    fn apply_env(&mut self) {
        if let BackendConfig::Rest(settings) = &mut self.backend
            && let Ok(key) = env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            settings.api_key = Some(key);
        }
    }

    fn validate(&self) -> Result<()> {
        if let BackendConfig::Rest(settings) = &self.backend
            && settings.base_url.trim().is_empty()
        {
            return Err(BugHiveError::Config(
                "backend.base_url must not be empty".to_string(),
            ));
        }
        if self.identity.name.trim().is_empty() {
            return Err(BugHiveError::Config(
                "identity.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Location of the seed snapshot
    pub fn seed_path(&self) -> PathBuf {
        self.seed
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SEED_FILE))
    }

    pub fn is_memory_backend(&self) -> bool {
        matches!(self.backend, BackendConfig::Memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.is_memory_backend());
        assert!(config.latency.is_zero());
        assert_eq!(config.merge, MergePolicy::Explicit);
        assert_eq!(config.identity.name, "Current User");
        assert_eq!(config.seed_path(), PathBuf::from("bughive.json"));
    }

    #[test]
    fn test_config_parses_full_file() {
        let yaml = r#"
backend:
  kind: rest
  base_url: https://api.example.com
  api_key: secret-key
  timeout: 10
latency:
  base_ms: 300
  jitter_ms: 200
merge: skip-empty
identity:
  id: "7"
  name: Ada Lovelace
  email: ada@example.com
default_theme: dark
"#;
        let config: Config = serde_yaml_ng::from_str(yaml).unwrap();
        let BackendConfig::Rest(settings) = &config.backend else {
            panic!("expected rest backend");
        };
        assert_eq!(settings.base_url, "https://api.example.com");
        assert_eq!(settings.timeout, 10);
        assert_eq!(config.latency, Latency::new(300, 200));
        assert_eq!(config.merge, MergePolicy::SkipEmpty);
        assert_eq!(config.identity.as_user_ref(), UserRef::new("7", "Ada Lovelace"));
        assert_eq!(config.default_theme, Some(Theme::Dark));
    }

    #[test]
    fn test_partial_identity_fills_defaults() {
        let config: Config = serde_yaml_ng::from_str("identity:\n  name: QA Bot\n").unwrap();
        assert_eq!(config.identity.name, "QA Bot");
        assert_eq!(config.identity.id.as_str(), "current-user");
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let mut settings = RestSettings::new("https://api.example.com");
        settings.api_key = Some("super-secret".to_string());
        let config = Config {
            backend: BackendConfig::Rest(settings),
            ..Default::default()
        };
        assert!(!format!("{config:?}").contains("super-secret"));
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.yaml");
        let config = Config {
            merge: MergePolicy::SkipEmpty,
            seed: Some(PathBuf::from("data.json")),
            ..Default::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.merge, MergePolicy::SkipEmpty);
        assert_eq!(loaded.seed_path(), PathBuf::from("data.json"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.yaml")).unwrap();
        assert!(config.is_memory_backend());
    }

    #[test]
    fn test_empty_base_url_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.yaml");
        fs::write(&path, "backend:\n  kind: rest\n  base_url: ''\n").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(BugHiveError::Config(_))
        ));
    }

    #[test]
    #[serial]
    fn test_api_key_env_override() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bughive.yaml");
        fs::write(
            &path,
            "backend:\n  kind: rest\n  base_url: https://api.example.com\n",
        )
        .unwrap();

        // SAFETY: serialized with other env-touching tests
        unsafe { env::set_var(API_KEY_ENV, "from-env") };
        let config = Config::load_from(&path);
        unsafe { env::remove_var(API_KEY_ENV) };

        let BackendConfig::Rest(settings) = config.unwrap().backend else {
            panic!("expected rest backend");
        };
        assert_eq!(settings.api_key.as_deref(), Some("from-env"));
    }

    #[test]
    #[serial]
    fn test_config_path_env() {
        // SAFETY: serialized with other env-touching tests
        unsafe { env::set_var(CONFIG_ENV, "/tmp/custom.yaml") };
        let path = Config::config_path();
        unsafe { env::remove_var(CONFIG_ENV) };
        assert_eq!(path, PathBuf::from("/tmp/custom.yaml"));
    }
}
