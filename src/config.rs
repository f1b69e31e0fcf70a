// Configuration: the pasted project config blob and the optional
// settings.toml that pre-fills the connect form.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid JSON configuration: {0}")]
    InvalidJson(String),

    #[error("validation error for field `{field}`: {message}")]
    ValidationError { field: String, message: String },

    #[error("failed to parse settings file {path}: {source}")]
    SettingsParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

// ---------------------------------------------------------------------------
// Project config blob
// ---------------------------------------------------------------------------

/// The project connection config, pasted into the connect form as a JSON
/// blob. Only `apiKey` and `projectId` are used by the REST clients; the
/// rest is accepted so a config copied verbatim from a project console
/// parses without editing.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectConfig {
    pub api_key: String,
    pub project_id: String,
    #[serde(default)]
    pub auth_domain: Option<String>,
    #[serde(default)]
    pub storage_bucket: Option<String>,
    #[serde(default)]
    pub messaging_sender_id: Option<String>,
    #[serde(default)]
    pub app_id: Option<String>,
}

/// Parse a pasted config blob. Strict JSON, matching what a project
/// console exports; a helpful error message is the whole UX here.
pub fn parse_project_config(blob: &str) -> Result<ProjectConfig, ConfigError> {
    let config: ProjectConfig =
        serde_json::from_str(blob.trim()).map_err(|e| ConfigError::InvalidJson(e.to_string()))?;
    validate(&config)?;
    Ok(config)
}

fn validate(config: &ProjectConfig) -> Result<(), ConfigError> {
    if config.api_key.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "apiKey".into(),
            message: "must not be empty".into(),
        });
    }
    if config.project_id.trim().is_empty() {
        return Err(ConfigError::ValidationError {
            field: "projectId".into(),
            message: "must not be empty".into(),
        });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// settings.toml
// ---------------------------------------------------------------------------

/// Optional local settings. Everything here only pre-fills the connect and
/// auth forms; nothing is required to run.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub connection: ConnectionSettings,
    #[serde(default)]
    pub auth: AuthSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConnectionSettings {
    /// Path to a JSON file holding the project config blob.
    #[serde(default)]
    pub config_path: Option<String>,
    /// Collection to open on connect.
    #[serde(default)]
    pub collection: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthSettings {
    /// Email pre-filled into the sign-in form. The password is never stored.
    #[serde(default)]
    pub email: Option<String>,
}

impl Settings {
    /// Load settings from the platform config directory
    /// (`~/.config/firedeck/settings.toml` on Linux). A missing file is
    /// the defaults, not an error.
    pub fn load() -> Result<Settings, ConfigError> {
        match settings_path() {
            Some(path) if path.exists() => Settings::load_from(&path),
            _ => Ok(Settings::default()),
        }
    }

    pub(crate) fn load_from(path: &Path) -> Result<Settings, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|_| ConfigError::ValidationError {
            field: "settings".into(),
            message: format!("failed to read {}", path.display()),
        })?;
        toml::from_str(&text).map_err(|e| ConfigError::SettingsParseError {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Read the config blob the settings point at, if any.
    pub fn read_config_blob(&self) -> Option<String> {
        let path = self.connection.config_path.as_deref()?;
        std::fs::read_to_string(path).ok()
    }
}

fn settings_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "firedeck")
        .map(|dirs| dirs.config_dir().join("settings.toml"))
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    const FULL_BLOB: &str = r#"{
        "apiKey": "AIzaSy-test",
        "authDomain": "demo.firebaseapp.com",
        "projectId": "demo-project",
        "storageBucket": "demo.appspot.com",
        "messagingSenderId": "123456789",
        "appId": "1:123:web:abc"
    }"#;

    #[test]
    fn parses_full_console_export() {
        let config = parse_project_config(FULL_BLOB).unwrap();
        assert_eq!(config.api_key, "AIzaSy-test");
        assert_eq!(config.project_id, "demo-project");
        assert_eq!(config.auth_domain.as_deref(), Some("demo.firebaseapp.com"));
        assert_eq!(config.app_id.as_deref(), Some("1:123:web:abc"));
    }

    #[test]
    fn parses_minimal_blob() {
        let config =
            parse_project_config(r#"{ "apiKey": "k", "projectId": "p" }"#).unwrap();
        assert_eq!(config.api_key, "k");
        assert!(config.auth_domain.is_none());
    }

    #[test]
    fn rejects_malformed_json_with_message() {
        let err = parse_project_config("{ apiKey: oops }").unwrap_err();
        assert!(err.to_string().starts_with("Invalid JSON configuration:"));
    }

    #[test]
    fn rejects_blank_required_fields() {
        let err =
            parse_project_config(r#"{ "apiKey": "", "projectId": "p" }"#).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "apiKey"),
            other => panic!("expected ValidationError, got: {other}"),
        }

        let err =
            parse_project_config(r#"{ "apiKey": "k", "projectId": " " }"#).unwrap_err();
        match &err {
            ConfigError::ValidationError { field, .. } => assert_eq!(field, "projectId"),
            other => panic!("expected ValidationError, got: {other}"),
        }
    }

    #[test]
    fn settings_load_from_file() {
        let tmp = std::env::temp_dir().join("firedeck_settings_test");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("settings.toml");
        fs::write(
            &path,
            r#"
[connection]
config_path = "/tmp/fb.json"
collection = "orders"

[auth]
email = "admin@example.com"
"#,
        )
        .unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.connection.config_path.as_deref(), Some("/tmp/fb.json"));
        assert_eq!(settings.connection.collection.as_deref(), Some("orders"));
        assert_eq!(settings.auth.email.as_deref(), Some("admin@example.com"));

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn settings_sections_are_optional() {
        let tmp = std::env::temp_dir().join("firedeck_settings_partial");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("settings.toml");
        fs::write(&path, "[connection]\ncollection = \"users\"\n").unwrap();

        let settings = Settings::load_from(&path).unwrap();
        assert_eq!(settings.connection.collection.as_deref(), Some("users"));
        assert!(settings.auth.email.is_none());

        let _ = fs::remove_dir_all(&tmp);
    }

    #[test]
    fn settings_parse_error_names_the_file() {
        let tmp = std::env::temp_dir().join("firedeck_settings_bad");
        let _ = fs::remove_dir_all(&tmp);
        fs::create_dir_all(&tmp).unwrap();
        let path = tmp.join("settings.toml");
        fs::write(&path, "not [[ valid toml").unwrap();

        let err = Settings::load_from(&path).unwrap_err();
        match &err {
            ConfigError::SettingsParseError { path: p, .. } => {
                assert!(p.ends_with("settings.toml"));
            }
            other => panic!("expected SettingsParseError, got: {other}"),
        }

        let _ = fs::remove_dir_all(&tmp);
    }
}
