//! Session and role-based authorization for the portal.
//!
//! Leaves first: [`store`] holds the bearer token, [`decoder`] turns it into
//! [`SessionClaims`], [`access`] decides whether a session may enter a
//! resource, and [`home`] picks the landing screen for a role.
//! [`SessionGate`] ties them together over one credential store.

pub mod access;
pub mod claims;
pub mod decoder;
pub mod error;
pub mod home;
pub mod snapshot;
pub mod store;

pub use access::{
    AccessControl, Decision, EmptyRoleSet, Landing, RoleRequirement, RoleSet, Target,
    AUTHENTICATION_PATH, HOME_PATH,
};
pub use claims::{Role, SessionClaims, UnknownRole};
pub use decoder::{SecretEncoding, SessionDecoder, TokenDecoder};
pub use error::{DecodeError, KeyError, ResolverError};
pub use home::{HomeResolver, HomeState};
pub use store::{CredentialStore, MemoryCredentialStore, TOKEN_KEY, USER_KEY};

use std::sync::Arc;

use crate::models::UserContext;

/// Shown when a token carries no school name.
pub const DEFAULT_SCHOOL_NAME: &str = "Unknown School";

/// Session operations over a single credential store.
///
/// Every method re-reads the store, so an [`invalidate`](Self::invalidate)
/// is visible to the very next call.
pub struct SessionGate<S> {
    decoder: SessionDecoder<S>,
}

impl<S: CredentialStore> SessionGate<S> {
    pub fn new(store: S, tokens: impl Into<Arc<TokenDecoder>>) -> Self {
        Self {
            decoder: SessionDecoder::new(store, tokens),
        }
    }

    pub fn decoder(&self) -> &SessionDecoder<S> {
        &self.decoder
    }

    /// Store a freshly issued token, provided it decodes.
    ///
    /// A token that would not produce a session is never written, so the
    /// store cannot end up holding a credential every later check rejects.
    pub fn establish(&self, token: &str) -> Result<SessionClaims, DecodeError> {
        let claims = self.decoder.tokens().decode_token(token)?;
        let store = self.decoder.store();
        store.set(TOKEN_KEY, token.trim().to_string());
        store.set(USER_KEY, claims.display_name().to_string());

        tracing::info!(
            user_id = claims.subject_id(),
            role = %claims.role(),
            "Session established"
        );
        Ok(claims)
    }

    pub fn decode(&self) -> Option<SessionClaims> {
        self.decoder.decode()
    }

    pub fn authorize(&self, required: &RoleRequirement) -> Decision {
        match self.admit(required) {
            Ok(_) => Decision::Allow,
            Err(target) => Decision::Redirect(target),
        }
    }

    /// Like [`authorize`](Self::authorize), but hands back the admitted
    /// session so callers need not decode twice.
    pub fn admit(&self, required: &RoleRequirement) -> Result<SessionClaims, Target> {
        let session = self.decode();
        match (AccessControl::evaluate(session.as_ref(), required), session) {
            (Decision::Allow, Some(claims)) => Ok(claims),
            (Decision::Redirect(target), _) => Err(target),
            (Decision::Allow, None) => Err(Target::Authentication),
        }
    }

    /// Landing navigation for the generic home route.
    pub fn resolve_home(&self) -> Target {
        let session = self.decode();
        match HomeResolver::resolve(session.as_ref()) {
            Ok(target) => target,
            Err(e) => {
                tracing::error!(error = %e, "Home resolution failed");
                Target::Authentication
            }
        }
    }

    /// End the session. The token goes first: its absence alone is enough
    /// for every later decode to report no session.
    pub fn invalidate(&self) {
        let store = self.decoder.store();
        store.remove(TOKEN_KEY);
        store.remove(USER_KEY);
        store.clear();
        tracing::info!("Session invalidated");
    }

    pub fn role(&self) -> Option<Role> {
        self.decode().map(|claims| claims.role())
    }

    pub fn display_name(&self) -> Option<String> {
        self.decode().map(|claims| claims.display_name().to_string())
    }

    pub fn subject_id(&self) -> Option<i64> {
        self.decode().map(|claims| claims.subject_id())
    }

    pub fn school_id(&self) -> Option<i64> {
        self.decode().and_then(|claims| claims.school_id())
    }

    pub fn classroom_id(&self) -> Option<i64> {
        self.decode().and_then(|claims| claims.classroom_id())
    }

    pub fn school_name(&self) -> Option<String> {
        self.decode()
            .and_then(|claims| claims.school_name().map(str::to_string))
    }

    pub fn school_name_or_default(&self) -> String {
        self.school_name()
            .unwrap_or_else(|| DEFAULT_SCHOOL_NAME.to_string())
    }

    pub fn user_context(&self) -> Option<UserContext> {
        self.decode().as_ref().map(UserContext::from)
    }
}
