//! Per-request bridge between a visitor's server-side session and
//! [`SessionGate`].
//!
//! The session keys are copied into a [`MemoryCredentialStore`] when the
//! request arrives, the synchronous gate runs against that copy, and any
//! change is written back with [`persist`].

use std::sync::Arc;

use tower_sessions::{session, Session};

use super::decoder::TokenDecoder;
use super::store::{CredentialStore, MemoryCredentialStore, TOKEN_KEY, USER_KEY};
use super::SessionGate;

/// Keys mirrored between the two stores. Token first, so a partial write
/// back can only lose the token, never keep it alone.
pub const SESSION_KEYS: [&str; 2] = [TOKEN_KEY, USER_KEY];

/// Copy the session keys into a fresh store. An unreadable session is
/// treated as signed out.
pub async fn load(session: &Session) -> MemoryCredentialStore {
    let store = MemoryCredentialStore::new();
    for key in SESSION_KEYS {
        match session.get::<String>(key).await {
            Ok(Some(value)) => store.set(key, value),
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, key, "Failed to read session; treating as signed out");
                store.clear();
                break;
            }
        }
    }
    store
}

/// Write the store's view of the session keys back.
pub async fn persist(store: &MemoryCredentialStore, session: &Session) -> Result<(), session::Error> {
    for key in SESSION_KEYS {
        match store.get(key) {
            Some(value) => session.insert(key, value).await?,
            None => {
                session.remove::<String>(key).await?;
            }
        }
    }
    Ok(())
}

/// Gate over a snapshot of `session`.
pub async fn request_gate(
    session: &Session,
    tokens: Arc<TokenDecoder>,
) -> SessionGate<MemoryCredentialStore> {
    SessionGate::new(load(session).await, tokens)
}
