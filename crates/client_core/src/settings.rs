use std::{fmt, fs, io, path::Path, str::FromStr, time::Duration};

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

pub const SETTINGS_FILE: &str = "dashboard.toml";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse settings file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid value '{value}' for {key}")]
    InvalidValue { key: &'static str, value: String },
}

/// How the anti-forgery token travels with each request. The same
/// convention is used for create, update and delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenTransport {
    #[default]
    Header,
    FormField,
}

impl FromStr for TokenTransport {
    type Err = SettingsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "header" => Ok(Self::Header),
            "form_field" | "body" => Ok(Self::FormField),
            _ => Err(SettingsError::InvalidValue {
                key: "token_transport",
                value: raw.to_string(),
            }),
        }
    }
}

impl fmt::Display for TokenTransport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::FormField => f.write_str("form_field"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ControllerSettings {
    pub server_url: String,
    pub csrf_field_name: String,
    pub csrf_header_name: String,
    pub token_transport: TokenTransport,
    pub notification_ttl_ms: u64,
    pub reload_delay_ms: u64,
    pub row_exit_ms: u64,
}

impl Default for ControllerSettings {
    fn default() -> Self {
        Self {
            server_url: "http://127.0.0.1:8000".into(),
            csrf_field_name: "csrfmiddlewaretoken".into(),
            csrf_header_name: "X-CSRFToken".into(),
            token_transport: TokenTransport::Header,
            notification_ttl_ms: 5000,
            reload_delay_ms: 1000,
            row_exit_ms: 300,
        }
    }
}

impl ControllerSettings {
    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn reload_delay(&self) -> Duration {
        Duration::from_millis(self.reload_delay_ms)
    }

    pub fn row_exit(&self) -> Duration {
        Duration::from_millis(self.row_exit_ms)
    }
}

/// Defaults, then `dashboard.toml` in the working directory, then the
/// process environment.
pub fn load_settings() -> Result<ControllerSettings, SettingsError> {
    let settings = load_settings_file(Path::new(SETTINGS_FILE))?;
    apply_env_overrides(settings, |key| std::env::var(key).ok())
}

pub fn load_settings_file(path: &Path) -> Result<ControllerSettings, SettingsError> {
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(ControllerSettings::default());
        }
        Err(source) => {
            return Err(SettingsError::Read {
                path: path.display().to_string(),
                source,
            })
        }
    };

    toml::from_str(&raw).map_err(|source| SettingsError::Parse {
        path: path.display().to_string(),
        source,
    })
}

pub fn apply_env_overrides<F>(
    mut settings: ControllerSettings,
    lookup: F,
) -> Result<ControllerSettings, SettingsError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(v) = lookup("DASHBOARD_SERVER_URL") {
        settings.server_url = v;
    }
    if let Some(v) = lookup("APP__SERVER_URL") {
        settings.server_url = v;
    }

    if let Some(v) = lookup("APP__CSRF_FIELD_NAME") {
        settings.csrf_field_name = v;
    }
    if let Some(v) = lookup("APP__CSRF_HEADER_NAME") {
        settings.csrf_header_name = v;
    }

    if let Some(v) = lookup("APP__TOKEN_TRANSPORT") {
        settings.token_transport = v.parse()?;
    }

    if let Some(v) = lookup("APP__NOTIFICATION_TTL_MS") {
        settings.notification_ttl_ms = parse_millis("notification_ttl_ms", &v)?;
    }
    if let Some(v) = lookup("APP__RELOAD_DELAY_MS") {
        settings.reload_delay_ms = parse_millis("reload_delay_ms", &v)?;
    }
    if let Some(v) = lookup("APP__ROW_EXIT_MS") {
        settings.row_exit_ms = parse_millis("row_exit_ms", &v)?;
    }

    Ok(settings)
}

fn parse_millis(key: &'static str, raw: &str) -> Result<u64, SettingsError> {
    raw.trim()
        .parse::<u64>()
        .map_err(|_| SettingsError::InvalidValue {
            key,
            value: raw.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use std::{
        collections::HashMap,
        env,
        time::{SystemTime, UNIX_EPOCH},
    };

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_page_timings() {
        let settings = ControllerSettings::default();
        assert_eq!(settings.notification_ttl(), Duration::from_millis(5000));
        assert_eq!(settings.reload_delay(), Duration::from_millis(1000));
        assert_eq!(settings.row_exit(), Duration::from_millis(300));
        assert_eq!(settings.token_transport, TokenTransport::Header);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let settings =
            load_settings_file(Path::new("/nonexistent/dashboard.toml")).expect("defaults");
        assert_eq!(settings, ControllerSettings::default());
    }

    #[test]
    fn file_values_override_defaults_and_keep_the_rest() {
        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("clock")
            .as_nanos();
        let path = env::temp_dir().join(format!("dashboard_settings_test_{suffix}.toml"));
        fs::write(
            &path,
            "server_url = \"http://school.test\"\ntoken_transport = \"form_field\"\n",
        )
        .expect("write settings");

        let settings = load_settings_file(&path).expect("settings");
        assert_eq!(settings.server_url, "http://school.test");
        assert_eq!(settings.token_transport, TokenTransport::FormField);
        assert_eq!(settings.notification_ttl_ms, 5000);

        fs::remove_file(path).expect("cleanup");
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let settings = apply_env_overrides(
            ControllerSettings::default(),
            lookup_from(&[
                ("DASHBOARD_SERVER_URL", "http://a.test"),
                ("APP__SERVER_URL", "http://b.test"),
                ("APP__TOKEN_TRANSPORT", "form-field"),
                ("APP__ROW_EXIT_MS", "50"),
            ]),
        )
        .expect("settings");
        assert_eq!(settings.server_url, "http://b.test");
        assert_eq!(settings.token_transport, TokenTransport::FormField);
        assert_eq!(settings.row_exit_ms, 50);
    }

    #[test]
    fn invalid_env_values_are_reported() {
        let err = apply_env_overrides(
            ControllerSettings::default(),
            lookup_from(&[("APP__RELOAD_DELAY_MS", "soon")]),
        )
        .expect_err("invalid");
        assert!(matches!(
            err,
            SettingsError::InvalidValue {
                key: "reload_delay_ms",
                ..
            }
        ));
    }
}
