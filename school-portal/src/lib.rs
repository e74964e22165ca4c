pub mod config;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod policy;
pub mod services;
pub mod session;
pub mod startup;

use config::{SessionSettings, Settings};
use policy::AccessPolicy;
use services::BackendClient;
use session::TokenDecoder;
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<BackendClient>,
    pub tokens: Arc<TokenDecoder>,
    pub policy: Arc<AccessPolicy>,
    pub session: SessionSettings,
}

impl AppState {
    pub fn new(
        backend: Arc<BackendClient>,
        tokens: Arc<TokenDecoder>,
        policy: Arc<AccessPolicy>,
        session: SessionSettings,
    ) -> Self {
        Self {
            backend,
            tokens,
            policy,
            session,
        }
    }

    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        settings.session.validate()?;

        let backend = BackendClient::new(settings.backend.clone())?;
        let tokens = TokenDecoder::from_secret(
            settings.session.jwt_secret.as_ref(),
            settings.session.jwt_secret_encoding,
        )
        .map_err(|e| anyhow::anyhow!("Invalid session.jwt_secret: {}", e))?
        .with_leeway(settings.session.leeway());
        let policy = AccessPolicy::portal()?;

        Ok(Self::new(
            Arc::new(backend),
            Arc::new(tokens),
            Arc::new(policy),
            settings.session.clone(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BackendSettings, ServerSettings, TelemetrySettings};
    use crate::session::SecretEncoding;
    use secrecy::Secret;

    fn settings(session: SessionSettings) -> Settings {
        Settings {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 0,
            },
            backend: BackendSettings {
                url: "http://127.0.0.1:9".to_string(),
                timeout_seconds: 1,
            },
            session,
            telemetry: TelemetrySettings::default(),
        }
    }

    #[test]
    fn test_from_settings_rejects_bad_durations() {
        for (leeway_seconds, inactivity_hours) in [(-30, 24), (i64::MAX, 24), (0, i64::MAX), (0, -1)] {
            let result = AppState::from_settings(&settings(SessionSettings {
                leeway_seconds,
                inactivity_hours,
                ..SessionSettings::default()
            }));
            assert!(result.is_err(), "{leeway_seconds}s / {inactivity_hours}h accepted");
        }
    }

    #[test]
    fn test_from_settings_rejects_bad_base64_secret() {
        let result = AppState::from_settings(&settings(SessionSettings {
            jwt_secret: Some(Secret::new("not base64!".to_string())),
            ..SessionSettings::default()
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_from_settings_verifies_with_secret() {
        let state = AppState::from_settings(&settings(SessionSettings {
            jwt_secret: Some(Secret::new("plain secret".to_string())),
            jwt_secret_encoding: SecretEncoding::Raw,
            leeway_seconds: 30,
            ..SessionSettings::default()
        }))
        .unwrap();
        assert!(state.tokens.verifies_signature());

        let state = AppState::from_settings(&settings(SessionSettings::default())).unwrap();
        assert!(!state.tokens.verifies_signature());
    }
}
