//! Turns the stored bearer token into [`SessionClaims`].
//!
//! The backend signs tokens with HS256. When the portal knows the shared
//! secret the signature is verified; without it the payload is read
//! unverified, which is what the browser client has always done. Expiry and
//! role validation apply in both modes.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;
use std::sync::Arc;

use super::claims::{RawClaims, SessionClaims};
use super::error::{DecodeError, KeyError};
use super::store::{CredentialStore, TOKEN_KEY};

/// How the configured secret string becomes HMAC key bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretEncoding {
    /// The string is base64 and its decoded bytes are the key. This is how
    /// the backend's JWT library treats a string secret.
    #[default]
    Base64,
    /// The UTF-8 bytes of the string are the key.
    Raw,
}

// Same leniency as the backend's decoder: padding optional, a dangling
// final character ignored.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

fn base64_key(secret: &str) -> Result<Vec<u8>, KeyError> {
    let cleaned: String = secret.chars().filter(|c| !c.is_whitespace()).collect();
    if !cleaned.is_ascii() {
        return Err(KeyError::InvalidBase64("non-ASCII character".to_string()));
    }

    let trimmed = cleaned.trim_end_matches('=');
    let usable = if trimmed.len() % 4 == 1 {
        &trimmed[..trimmed.len() - 1]
    } else {
        trimmed
    };

    let bytes = LENIENT_BASE64
        .decode(usable)
        .map_err(|e| KeyError::InvalidBase64(e.to_string()))?;
    if bytes.is_empty() {
        return Err(KeyError::Empty);
    }
    Ok(bytes)
}

/// Stateless token validator shared by the in-process gate and the web gate.
#[derive(Clone)]
pub struct TokenDecoder {
    key: DecodingKey,
    validation: Validation,
    leeway: Duration,
    verifies_signature: bool,
}

impl TokenDecoder {
    /// Decoder that checks the HS256 signature against the UTF-8 bytes of
    /// `secret`.
    pub fn verified(secret: &Secret<String>) -> Self {
        Self::with_key(DecodingKey::from_secret(secret.expose_secret().as_bytes()))
    }

    /// Decoder that checks the HS256 signature against the base64-decoded
    /// bytes of `secret`.
    pub fn verified_base64(secret: &Secret<String>) -> Result<Self, KeyError> {
        let key = base64_key(secret.expose_secret())?;
        Ok(Self::with_key(DecodingKey::from_secret(&key)))
    }

    fn with_key(key: DecodingKey) -> Self {
        let mut validation = base_validation();
        validation.algorithms = vec![Algorithm::HS256];

        Self {
            key,
            validation,
            leeway: Duration::zero(),
            verifies_signature: true,
        }
    }

    /// Decoder that reads the payload without checking the signature.
    pub fn unverified() -> Self {
        let mut validation = base_validation();
        validation.insecure_disable_signature_validation();

        Self {
            key: DecodingKey::from_secret(&[]),
            validation,
            leeway: Duration::zero(),
            verifies_signature: false,
        }
    }

    pub fn from_secret(
        secret: Option<&Secret<String>>,
        encoding: SecretEncoding,
    ) -> Result<Self, KeyError> {
        match (secret, encoding) {
            (None, _) => Ok(Self::unverified()),
            (Some(secret), SecretEncoding::Raw) => Ok(Self::verified(secret)),
            (Some(secret), SecretEncoding::Base64) => Self::verified_base64(secret),
        }
    }

    /// Grace period applied to `exp`.
    pub fn with_leeway(mut self, leeway: Duration) -> Self {
        self.leeway = leeway.max(Duration::zero());
        self
    }

    pub fn verifies_signature(&self) -> bool {
        self.verifies_signature
    }

    /// Decode one raw token, reporting why it was rejected.
    pub fn decode_token(&self, token: &str) -> Result<SessionClaims, DecodeError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(DecodeError::Absent);
        }

        let data = decode::<RawClaims>(token, &self.key, &self.validation)
            .map_err(|e| DecodeError::Malformed(e.to_string()))?;
        let claims = SessionClaims::from_raw(data.claims)?;

        if claims.is_expired_at(Utc::now(), self.leeway) {
            if let Some(expired_at) = claims.expires_at() {
                return Err(DecodeError::Expired { expired_at });
            }
        }

        Ok(claims)
    }

    /// Same pipeline as [`decode_token`](Self::decode_token), collapsed to an
    /// `Option` with the failure reason logged.
    pub fn decode_credential(&self, token: Option<&str>) -> Option<SessionClaims> {
        let result = match token {
            Some(token) => self.decode_token(token),
            None => Err(DecodeError::Absent),
        };

        match result {
            Ok(claims) => Some(claims),
            Err(DecodeError::Absent) => {
                tracing::debug!("No session credential present");
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "Rejected session credential");
                None
            }
        }
    }
}

fn base_validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    // Expiry is checked against SessionClaims so the reason can be reported
    // and a missing `exp` is tolerated.
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();
    validation
}

/// Reads the credential store and decodes whatever token it holds.
///
/// Every call goes back to the store; nothing is cached between calls.
pub struct SessionDecoder<S> {
    store: S,
    tokens: Arc<TokenDecoder>,
}

impl<S: CredentialStore> SessionDecoder<S> {
    pub fn new(store: S, tokens: impl Into<Arc<TokenDecoder>>) -> Self {
        Self {
            store,
            tokens: tokens.into(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn tokens(&self) -> &TokenDecoder {
        &self.tokens
    }

    pub fn decode(&self) -> Option<SessionClaims> {
        self.tokens
            .decode_credential(self.store.get(TOKEN_KEY).as_deref())
    }

    pub fn try_decode(&self) -> Result<SessionClaims, DecodeError> {
        match self.store.get(TOKEN_KEY) {
            Some(token) => self.tokens.decode_token(&token),
            None => Err(DecodeError::Absent),
        }
    }

    pub fn decode_credential(&self, token: Option<&str>) -> Option<SessionClaims> {
        self.tokens.decode_credential(token)
    }
}
