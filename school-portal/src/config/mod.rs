use secrecy::Secret;
use serde::Deserialize;
use service_core::error::AppError;

use crate::session::SecretEncoding;

/// Upper bound on clock-skew allowance for token expiry.
pub const MAX_LEEWAY_SECONDS: i64 = 3600;
/// Upper bound on the idle lifetime of a session: one year.
pub const MAX_INACTIVITY_HOURS: i64 = 24 * 366;

#[derive(Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub backend: BackendSettings,
    pub session: SessionSettings,
    #[serde(default)]
    pub telemetry: TelemetrySettings,
}

#[derive(Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Deserialize, Clone)]
pub struct BackendSettings {
    /// Base URL of the school API (e.g., http://localhost:8080).
    pub url: String,
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

#[derive(Deserialize, Clone)]
pub struct SessionSettings {
    /// Shared HS256 secret of the backend. Without it tokens are read
    /// unverified.
    #[serde(default)]
    pub jwt_secret: Option<Secret<String>>,
    /// How `jwt_secret` turns into key bytes. The backend base64-decodes
    /// its configured secret, so that is the default.
    #[serde(default)]
    pub jwt_secret_encoding: SecretEncoding,
    #[serde(default)]
    pub leeway_seconds: i64,
    #[serde(default = "default_inactivity_hours")]
    pub inactivity_hours: i64,
    #[serde(default)]
    pub secure_cookie: bool,
}

fn default_inactivity_hours() -> i64 {
    24
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_secret_encoding: SecretEncoding::default(),
            leeway_seconds: 0,
            inactivity_hours: default_inactivity_hours(),
            secure_cookie: false,
        }
    }
}

impl SessionSettings {
    /// Reject durations outside the supported ranges, including negatives.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(0..=MAX_LEEWAY_SECONDS).contains(&self.leeway_seconds) {
            anyhow::bail!(
                "session.leeway_seconds must be between 0 and {}, got {}",
                MAX_LEEWAY_SECONDS,
                self.leeway_seconds
            );
        }
        if !(1..=MAX_INACTIVITY_HOURS).contains(&self.inactivity_hours) {
            anyhow::bail!(
                "session.inactivity_hours must be between 1 and {}, got {}",
                MAX_INACTIVITY_HOURS,
                self.inactivity_hours
            );
        }
        Ok(())
    }

    /// Expiry leeway, clamped to the supported range.
    pub fn leeway(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.leeway_seconds.clamp(0, MAX_LEEWAY_SECONDS))
    }

    /// Idle lifetime of a session, clamped to the supported range.
    pub fn inactivity(&self) -> time::Duration {
        time::Duration::hours(self.inactivity_hours.clamp(1, MAX_INACTIVITY_HOURS))
    }
}

#[derive(Deserialize, Clone)]
pub struct TelemetrySettings {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP gRPC collector (e.g., http://tempo:4317). Export is off when unset.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for TelemetrySettings {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            otlp_endpoint: None,
        }
    }
}

pub fn get_configuration() -> Result<Settings, AppError> {
    service_core::config::load_configuration("school-portal")
}
