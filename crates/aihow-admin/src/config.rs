//! Admin back-office configuration
//!
//! Loaded from an optional TOML file layered with `AIHOW_` environment
//! variables, where `__` separates nested keys:
//!
//! ```text
//! AIHOW_SESSION__MAX_SESSIONS=5
//! AIHOW_AUDIT__BACKEND=file
//! AIHOW_AUDIT__FILE_PATH=/var/log/aihow/audit.jsonl
//! ```

use std::path::{Path, PathBuf};

use aihow_audit::AuditConfig;
use aihow_roles::{RoleDefinition, RoleRegistry};
use aihow_sessions::AdminSessionConfig;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

type Result<T> = std::result::Result<T, ConfigError>;

const ENV_PREFIX: &str = "AIHOW";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Role definitions; the built-in roles are used when empty
    pub roles: Vec<RoleDefinition>,
    pub session: AdminSessionConfig,
    pub audit: AuditConfig,
    /// Where permission grants are persisted; in-memory only when unset
    pub grants_path: Option<PathBuf>,
}

impl AdminConfig {
    /// Build the role registry this configuration describes
    pub fn role_registry(&self) -> Result<RoleRegistry> {
        let registry = if self.roles.is_empty() {
            RoleRegistry::builtin()?
        } else {
            RoleRegistry::from_definitions(self.roles.clone())?
        };
        Ok(registry)
    }

    pub fn validate(&self) -> Result<()> {
        if self.session.max_sessions == 0 {
            return Err(ConfigError::Validation(
                "session.max_sessions must be greater than 0".to_string(),
            ));
        }
        if self.session.session_timeout_secs == 0 || self.session.activity_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "session timeouts must be greater than 0".to_string(),
            ));
        }
        if self.session.activity_timeout_secs > self.session.session_timeout_secs {
            return Err(ConfigError::Validation(
                "session.activity_timeout_secs cannot exceed session.session_timeout_secs"
                    .to_string(),
            ));
        }

        self.audit.validate()?;
        self.role_registry()?;
        Ok(())
    }
}

/// Locates and loads [`AdminConfig`]
pub struct ConfigLoader {
    config_path: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    pub fn new() -> Self {
        Self::with_path(Self::default_config_path())
    }

    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            env_prefix: ENV_PREFIX.to_string(),
        }
    }

    /// Use a different environment prefix (mainly for tests)
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// `<config_dir>/aihow/admin.toml`
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("aihow")
            .join("admin.toml")
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate; a missing file yields the defaults
    pub fn load(&self) -> Result<AdminConfig> {
        let config = Config::builder()
            .add_source(
                File::from(self.config_path.clone())
                    .format(FileFormat::Toml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(&self.env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let admin_config: AdminConfig = config.try_deserialize()?;
        admin_config.validate()?;

        debug!(path = %self.config_path.display(), "Loaded admin configuration");
        Ok(admin_config)
    }

    /// Write `config` as TOML to the loader's path, creating parent directories
    pub fn save(&self, config: &AdminConfig) -> Result<()> {
        let toml = toml::to_string_pretty(config)?;
        if let Some(parent) = self.config_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(&self.config_path, toml)?;
        Ok(())
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aihow_audit::AuditBackend;
    use aihow_sessions::LimitPolicy;
    use tempfile::TempDir;

    // Unique prefix so the process environment never leaks into these tests
    const TEST_PREFIX: &str = "AIHOW_CONFIG_TEST_UNSET";

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let loader =
            ConfigLoader::with_path(dir.path().join("missing.toml")).with_env_prefix(TEST_PREFIX);

        let config = loader.load().unwrap();
        assert_eq!(config, AdminConfig::default());
        assert_eq!(config.role_registry().unwrap().len(), 3);
    }

    #[test]
    fn test_load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("admin.toml");
        std::fs::write(
            &path,
            r#"
grants_path = "/var/lib/aihow/grants.json"

[session]
max_sessions = 5
on_limit = "evict_oldest"

[audit]
backend = "file"
file_path = "/var/log/aihow/audit.jsonl"

[[roles]]
name = "MODERATOR"
level = 1
permissions = ["moderate_content"]
allowed_routes = ["/admin", "/admin/content/*"]
"#,
        )
        .unwrap();

        let config = ConfigLoader::with_path(&path)
            .with_env_prefix(TEST_PREFIX)
            .load()
            .unwrap();

        assert_eq!(config.session.max_sessions, 5);
        assert_eq!(config.session.on_limit, LimitPolicy::EvictOldest);
        assert_eq!(config.session.activity_timeout_secs, 30 * 60);
        assert_eq!(config.audit.backend, AuditBackend::File);
        assert_eq!(
            config.grants_path.as_deref(),
            Some(Path::new("/var/lib/aihow/grants.json"))
        );

        let registry = config.role_registry().unwrap();
        assert_eq!(registry.len(), 1);
        assert!(registry
            .can_access_route("MODERATOR", "/admin/content/42")
            .unwrap());
    }

    #[test]
    fn test_environment_overrides_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("admin.toml");
        std::fs::write(&path, "[session]\nmax_sessions = 5\n").unwrap();

        std::env::set_var("AIHOW_ENVTEST_SESSION__MAX_SESSIONS", "9");
        let config = ConfigLoader::with_path(&path)
            .with_env_prefix("AIHOW_ENVTEST")
            .load();
        std::env::remove_var("AIHOW_ENVTEST_SESSION__MAX_SESSIONS");

        assert_eq!(config.unwrap().session.max_sessions, 9);
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("admin.toml");
        std::fs::write(&path, "[session]\nmax_sessions = 0\n").unwrap();

        let err = ConfigLoader::with_path(&path)
            .with_env_prefix(TEST_PREFIX)
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_validation_rules() {
        let mut config = AdminConfig::default();
        config.session.activity_timeout_secs = config.session.session_timeout_secs + 1;
        assert!(config.validate().is_err());

        let mut config = AdminConfig::default();
        config.audit.backend = AuditBackend::File;
        assert!(matches!(config.validate(), Err(ConfigError::Audit(_))));

        let mut config = AdminConfig::default();
        config.roles = vec![RoleDefinition::new("BROKEN", 1, &[], &["/a/*/b/*"])];
        assert!(matches!(config.validate(), Err(ConfigError::Role(_))));
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let loader = ConfigLoader::with_path(dir.path().join("nested").join("admin.toml"))
            .with_env_prefix(TEST_PREFIX);

        let mut config = AdminConfig::default();
        config.session.max_sessions = 7;
        config.roles = aihow_roles::builtin_definitions();
        loader.save(&config).unwrap();

        assert_eq!(loader.load().unwrap(), config);
    }
}
