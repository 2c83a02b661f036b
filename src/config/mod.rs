//! Configuration management for fleetop

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::ClientCredentials;
use crate::error::{ConfigError, Result};
use crate::session::{Credential, DEFAULT_REFRESH_SKEW, FreshnessDefaults, SessionSettings};

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OAuth application id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,

    /// OAuth application secret
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    /// Account email used at login
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Default vehicle id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vehicle_id: Option<String>,

    /// API host override (staging, local mock)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_host: Option<String>,

    /// Last known credential, rewritten after every renewal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential: Option<Credential>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Freshness of live telemetry (drive, charge, climate, vehicle state)
    #[serde(default = "default_fast_window_secs")]
    pub fast_window_secs: u64,

    /// Freshness of settings and configuration
    #[serde(default = "default_slow_window_secs")]
    pub slow_window_secs: u64,

    /// Renew this many seconds before the access token expires
    #[serde(default = "default_refresh_skew_secs")]
    pub refresh_skew_secs: u64,
}

fn default_fast_window_secs() -> u64 {
    FreshnessDefaults::FAST.as_secs()
}

fn default_slow_window_secs() -> u64 {
    FreshnessDefaults::SLOW.as_secs()
}

fn default_refresh_skew_secs() -> u64 {
    DEFAULT_REFRESH_SKEW.as_secs()
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            fast_window_secs: default_fast_window_secs(),
            slow_window_secs: default_slow_window_secs(),
            refresh_skew_secs: default_refresh_skew_secs(),
        }
    }
}

/// State of the stored credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStatus {
    Missing,
    Expired,
    /// Still valid but inside the refresh skew; renewed on next use
    RenewalDue,
    Valid,
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".fleetop").join("config.yaml"))
    }

    /// Resolve an explicit path or fall back to the default
    pub fn resolve_path(path: Option<&Path>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(p.to_path_buf()),
            None => Self::default_path(),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: PathBuf) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(&path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;

        Ok(config)
    }

    /// Load from an explicit path or the default one
    pub fn load_at(path: Option<&Path>) -> Result<Self> {
        Self::load_from(Self::resolve_path(path)?)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: PathBuf) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(&path, contents)?;

        // Holds tokens and the client secret
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(&path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(&path, perms)?;
        }

        Ok(())
    }

    /// Save to an explicit path or the default one
    pub fn save_at(&self, path: Option<&Path>) -> Result<()> {
        self.save_to(Self::resolve_path(path)?)
    }

    pub fn refresh_skew(&self) -> Duration {
        Duration::from_secs(self.preferences.refresh_skew_secs)
    }

    /// Classify the stored credential against the configured skew
    pub fn credential_status(&self) -> CredentialStatus {
        let Some(credential) = &self.credential else {
            return CredentialStatus::Missing;
        };
        if credential.is_expired() {
            return CredentialStatus::Expired;
        }
        let skew = chrono::Duration::from_std(self.refresh_skew())
            .unwrap_or_else(|_| chrono::Duration::zero());
        if credential.needs_renewal(skew) {
            CredentialStatus::RenewalDue
        } else {
            CredentialStatus::Valid
        }
    }

    /// OAuth application credentials, required for every token request
    pub fn client_credentials(&self) -> Result<ClientCredentials> {
        match (&self.client_id, &self.client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Ok(ClientCredentials {
                    client_id: id.clone(),
                    client_secret: secret.clone(),
                })
            }
            _ => Err(ConfigError::Invalid(
                "client_id and client_secret must be set. Run `fleetop init`.".to_string(),
            )
            .into()),
        }
    }

    pub fn require_credential(&self) -> Result<Credential> {
        self.credential
            .clone()
            .ok_or_else(|| ConfigError::MissingCredential.into())
    }

    /// Pick the vehicle: explicit override first, then the configured default
    pub fn require_vehicle_id(&self, override_id: Option<&str>) -> Result<String> {
        override_id
            .map(str::to_string)
            .or_else(|| self.vehicle_id.clone())
            .ok_or_else(|| ConfigError::MissingVehicleId.into())
    }

    /// Session tunables from preferences
    pub fn session_settings(&self) -> SessionSettings {
        SessionSettings {
            refresh_skew: self.refresh_skew(),
            fast_window: Duration::from_secs(self.preferences.fast_window_secs),
            slow_window: Duration::from_secs(self.preferences.slow_window_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use chrono::Utc;
    use tempfile::TempDir;

    fn credential(issued_ago_mins: i64, lifetime_mins: i64) -> Credential {
        Credential::with_lifetime(
            "access",
            "refresh",
            Utc::now() - chrono::Duration::minutes(issued_ago_mins),
            chrono::Duration::minutes(lifetime_mins),
        )
        .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.client_id.is_none());
        assert!(config.vehicle_id.is_none());
        assert!(config.credential.is_none());
        assert_eq!(config.preferences.fast_window_secs, 10);
        assert_eq!(config.preferences.slow_window_secs, 600);
        assert_eq!(config.preferences.refresh_skew_secs, 300);
    }

    #[test]
    fn test_credential_status() {
        let mut config = Config::default();
        assert_eq!(config.credential_status(), CredentialStatus::Missing);

        config.credential = Some(credential(120, 60));
        assert_eq!(config.credential_status(), CredentialStatus::Expired);

        // Expires in 2 minutes, inside the 5 minute skew
        config.credential = Some(credential(58, 60));
        assert_eq!(config.credential_status(), CredentialStatus::RenewalDue);

        config.credential = Some(credential(0, 60));
        assert_eq!(config.credential_status(), CredentialStatus::Valid);
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.yaml");

        let config = Config {
            client_id: Some("cid".to_string()),
            client_secret: Some("secret".to_string()),
            vehicle_id: Some("42".to_string()),
            credential: Some(credential(0, 60)),
            ..Default::default()
        };
        config.save_to(path.clone()).unwrap();

        let loaded = Config::load_from(path.clone()).unwrap();
        assert_eq!(loaded.vehicle_id.as_deref(), Some("42"));
        assert_eq!(loaded.credential, config.credential);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }

    #[test]
    fn test_load_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load_from(dir.path().join("absent.yaml"));
        assert!(matches!(result, Err(Error::Config(ConfigError::NotFound))));
    }

    #[test]
    fn test_invalid_stored_credential_rejected() {
        let yaml = r#"
credential:
  access_token: a
  refresh_token: r
  issued_at: "2024-01-01T00:00:00Z"
  expires_at: "2023-01-01T00:00:00Z"
"#;
        assert!(serde_yaml::from_str::<Config>(yaml).is_err());
    }

    #[test]
    fn test_partial_preferences_use_defaults() {
        let yaml = "preferences:\n  fast_window_secs: 3\n";
        let config: Config = serde_yaml::from_str(yaml).unwrap();

        let settings = config.session_settings();
        assert_eq!(settings.fast_window, Duration::from_secs(3));
        assert_eq!(settings.slow_window, Duration::from_secs(600));
        assert_eq!(settings.refresh_skew, Duration::from_secs(300));
    }

    #[test]
    fn test_vehicle_override_wins() {
        let config = Config {
            vehicle_id: Some("default".to_string()),
            ..Default::default()
        };
        assert_eq!(config.require_vehicle_id(Some("other")).unwrap(), "other");
        assert_eq!(config.require_vehicle_id(None).unwrap(), "default");
        assert!(Config::default().require_vehicle_id(None).is_err());
    }

    #[test]
    fn test_client_credentials_required() {
        assert!(Config::default().client_credentials().is_err());

        let config = Config {
            client_id: Some("id".to_string()),
            client_secret: Some("secret".to_string()),
            ..Default::default()
        };
        assert_eq!(config.client_credentials().unwrap().client_id, "id");
    }
}
