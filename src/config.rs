//! Configuration loading from TOML with environment variable resolution.
//!
//! Reads `config.toml` and deserializes into strongly-typed structs.
//! Passwords are referenced by env-var name in the config and resolved at
//! runtime into `SecretString`s.

use anyhow::{Context, Result};
use secrecy::SecretString;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::warn;

use crate::carousel::engine::MAX_VISIBLE_COUNT;
use crate::carousel::{CarouselTiming, DEFAULT_VISIBLE_COUNT};
use crate::storage::DEFAULT_STORE_FILE;
use crate::types::HubError;

/// Top-level application configuration.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub hub: HubConfig,
    #[serde(default)]
    pub carousel: CarouselConfig,
    #[serde(default)]
    pub simulator: SimulatorConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub auth: AuthConfig,
    #[serde(default)]
    pub dashboard: DashboardConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct HubConfig {
    #[serde(default = "default_hub_name")]
    pub name: String,
    /// Workflow fixture on disk; the embedded catalog is used when unset.
    #[serde(default)]
    pub workflows_path: Option<String>,
    #[serde(default = "default_store_path")]
    pub store_path: String,
    /// Per-visitor state (page view, chat) idle longer than this is dropped.
    #[serde(default = "default_client_idle_minutes")]
    pub client_idle_minutes: i64,
    /// Upper bound on tracked visitors per kind; the least recently seen
    /// is evicted first.
    #[serde(default = "default_max_clients")]
    pub max_clients: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        Self {
            name: default_hub_name(),
            workflows_path: None,
            store_path: default_store_path(),
            client_idle_minutes: default_client_idle_minutes(),
            max_clients: default_max_clients(),
        }
    }
}

impl HubConfig {
    pub fn client_idle_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.client_idle_minutes)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct CarouselConfig {
    #[serde(default = "default_autoplay_interval_ms")]
    pub autoplay_interval_ms: u64,
    /// Drives both the slide animation and the wrap-around snap delay.
    #[serde(default = "default_transition_ms")]
    pub transition_ms: u64,
    #[serde(default = "default_visible_count")]
    pub visible_count: usize,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            autoplay_interval_ms: default_autoplay_interval_ms(),
            transition_ms: default_transition_ms(),
            visible_count: default_visible_count(),
        }
    }
}

impl CarouselConfig {
    pub fn timing(&self) -> Result<CarouselTiming, HubError> {
        CarouselTiming::new(
            Duration::from_millis(self.autoplay_interval_ms),
            Duration::from_millis(self.transition_ms),
        )
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SimulatorConfig {
    #[serde(default = "default_step_interval_ms")]
    pub step_interval_ms: u64,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            step_interval_ms: default_step_interval_ms(),
        }
    }
}

impl SimulatorConfig {
    pub fn step_interval(&self) -> Duration {
        Duration::from_millis(self.step_interval_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChatConfig {
    #[serde(default = "default_typing_delay_ms")]
    pub typing_delay_ms: u64,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            typing_delay_ms: default_typing_delay_ms(),
        }
    }
}

impl ChatConfig {
    pub fn typing_delay(&self) -> Duration {
        Duration::from_millis(self.typing_delay_ms)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AuthConfig {
    #[serde(default = "default_admin_username")]
    pub admin_username: String,
    #[serde(default = "default_admin_password_env")]
    pub admin_password_env: String,
    #[serde(default = "default_demo_email")]
    pub demo_user_email: String,
    #[serde(default = "default_demo_password_env")]
    pub demo_user_password_env: String,
    #[serde(default = "default_session_ttl_hours")]
    pub session_ttl_hours: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: default_admin_username(),
            admin_password_env: default_admin_password_env(),
            demo_user_email: default_demo_email(),
            demo_user_password_env: default_demo_password_env(),
            session_ttl_hours: default_session_ttl_hours(),
        }
    }
}

/// Demo fallbacks used when the password env vars are not set.
pub const DEMO_ADMIN_PASSWORD: &str = "admin123";
pub const DEMO_USER_PASSWORD: &str = "password";

impl AuthConfig {
    pub fn admin_password(&self) -> SecretString {
        resolve_secret(&self.admin_password_env, DEMO_ADMIN_PASSWORD)
    }

    pub fn demo_user_password(&self) -> SecretString {
        resolve_secret(&self.demo_user_password_env, DEMO_USER_PASSWORD)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.session_ttl_hours)
    }
}

fn resolve_secret(env_name: &str, fallback: &str) -> SecretString {
    match AppConfig::resolve_env(env_name) {
        Ok(value) => SecretString::new(value),
        Err(_) => {
            warn!(env = env_name, "Password env var not set, using demo password");
            SecretString::new(fallback.to_string())
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            port: default_port(),
        }
    }
}

fn default_hub_name() -> String {
    "Automation Hub".into()
}
fn default_store_path() -> String {
    DEFAULT_STORE_FILE.into()
}
fn default_client_idle_minutes() -> i64 {
    30
}
fn default_max_clients() -> usize {
    1000
}
fn default_autoplay_interval_ms() -> u64 {
    4000
}
fn default_transition_ms() -> u64 {
    500
}
fn default_visible_count() -> usize {
    DEFAULT_VISIBLE_COUNT
}
fn default_step_interval_ms() -> u64 {
    2000
}
fn default_typing_delay_ms() -> u64 {
    1500
}
fn default_admin_username() -> String {
    "admin".into()
}
fn default_admin_password_env() -> String {
    "HUB_ADMIN_PASSWORD".into()
}
fn default_demo_email() -> String {
    "user@example.com".into()
}
fn default_demo_password_env() -> String {
    "HUB_DEMO_PASSWORD".into()
}
fn default_session_ttl_hours() -> i64 {
    24
}
fn default_true() -> bool {
    true
}
fn default_port() -> u16 {
    8080
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {path}"))?;
        Self::from_toml(&contents).with_context(|| format!("Failed to parse config file: {path}"))
    }

    /// Like `load`, but a missing file yields `None`. A file that exists
    /// and fails to parse or validate is still an error.
    pub fn load_optional(path: &str) -> Result<Option<Self>> {
        if !Path::new(path).exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the runtime cannot work with.
    pub fn validate(&self) -> Result<(), HubError> {
        self.carousel.timing()?;
        let visible = self.carousel.visible_count;
        if visible == 0 || visible > MAX_VISIBLE_COUNT {
            return Err(HubError::InvalidVisibleCount(visible));
        }
        if self.simulator.step_interval_ms == 0 {
            return Err(HubError::Config(
                "simulator step interval must be greater than zero".into(),
            ));
        }
        if self.hub.client_idle_minutes <= 0 || self.hub.max_clients == 0 {
            return Err(HubError::Config(
                "client idle timeout and client limit must be positive".into(),
            ));
        }
        if self.auth.session_ttl_hours <= 0 {
            return Err(HubError::Config("session ttl must be positive".into()));
        }
        Ok(())
    }

    /// Resolve an environment variable name to its value.
    pub fn resolve_env(env_name: &str) -> Result<String> {
        std::env::var(env_name)
            .with_context(|| format!("Environment variable not set: {env_name}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;

    #[test]
    fn test_load_config() {
        // Requires config.toml in the working directory; skipped otherwise.
        if let Ok(cfg) = AppConfig::load("config.toml") {
            assert_eq!(cfg.hub.name, "Automation Hub");
            assert_eq!(cfg.carousel.autoplay_interval_ms, 4000);
            assert_eq!(cfg.carousel.transition_ms, 500);
            assert_eq!(cfg.carousel.visible_count, 2);
            assert_eq!(cfg.chat.typing_delay_ms, 1500);
            assert!(cfg.dashboard.enabled);
        }
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let cfg = AppConfig::from_toml("").unwrap();
        assert_eq!(cfg.carousel.visible_count, 2);
        assert_eq!(cfg.simulator.step_interval_ms, 2000);
        assert_eq!(cfg.auth.admin_username, "admin");
        assert_eq!(cfg.auth.session_ttl_hours, 24);
        assert_eq!(cfg.dashboard.port, 8080);
        assert_eq!(cfg.hub.store_path, DEFAULT_STORE_FILE);
    }

    #[test]
    fn test_partial_section_override() {
        let cfg = AppConfig::from_toml(
            r#"
            [carousel]
            transition_ms = 250

            [dashboard]
            port = 3000
            "#,
        )
        .unwrap();
        assert_eq!(cfg.carousel.transition_ms, 250);
        assert_eq!(cfg.carousel.autoplay_interval_ms, 4000);
        assert_eq!(cfg.dashboard.port, 3000);
        assert!(cfg.dashboard.enabled);

        let timing = cfg.carousel.timing().unwrap();
        assert_eq!(timing.transition(), Duration::from_millis(250));
        assert_eq!(timing.autoplay_interval(), Duration::from_millis(4000));
    }

    #[test]
    fn test_invalid_toml_fails() {
        assert!(AppConfig::from_toml("[carousel]\nvisible_count = \"two\"").is_err());
    }

    #[test]
    fn test_missing_password_env_falls_back() {
        let auth = AuthConfig {
            admin_password_env: "HUB_TEST_UNSET_PASSWORD_VAR_9F2C".into(),
            ..AuthConfig::default()
        };
        assert_eq!(auth.admin_password().expose_secret(), DEMO_ADMIN_PASSWORD);
        assert_eq!(auth.session_ttl(), chrono::Duration::hours(24));
    }

    #[test]
    fn test_missing_file_fails() {
        assert!(AppConfig::load("/tmp/hub_no_such_config.toml").is_err());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let err = AppConfig::from_toml("[carousel]\nautoplay_interval_ms = 0").unwrap_err();
        assert!(matches!(err.downcast_ref::<HubError>(), Some(HubError::Config(_))));
        assert!(AppConfig::from_toml("[carousel]\ntransition_ms = 0").is_err());
        assert!(AppConfig::from_toml("[simulator]\nstep_interval_ms = 0").is_err());
        assert!(AppConfig::from_toml("[carousel]\nvisible_count = 4").is_err());
        assert!(AppConfig::from_toml("[hub]\nmax_clients = 0").is_err());
    }

    #[test]
    fn test_load_optional() {
        let missing = format!("/tmp/hub_no_such_config_{}.toml", uuid::Uuid::new_v4());
        assert!(AppConfig::load_optional(&missing).unwrap().is_none());

        let path = std::env::temp_dir().join(format!("hub_bad_config_{}.toml", uuid::Uuid::new_v4()));
        fs::write(&path, "[carousel]\nvisible_count = \"two\"\n").unwrap();
        let path_str = path.to_str().unwrap();
        let err = AppConfig::load_optional(path_str).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse config file"));

        fs::write(&path, "[dashboard]\nport = 9000\n").unwrap();
        let cfg = AppConfig::load_optional(path_str).unwrap().unwrap();
        assert_eq!(cfg.dashboard.port, 9000);
        fs::remove_file(&path).unwrap();
    }
}
