use chrono::{DateTime, Utc};
use thiserror::Error;

use super::home::HomeState;

/// Why a stored credential did not yield a session.
///
/// Every variant sends the visitor back to authentication; the distinction
/// only exists for diagnostics.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("no credential stored")]
    Absent,

    #[error("malformed credential: {0}")]
    Malformed(String),

    #[error("credential expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },

    #[error("unrecognized role: {0}")]
    UnrecognizedRole(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolverError {
    #[error("cannot {event} while {from:?}")]
    InvalidTransition {
        from: HomeState,
        event: &'static str,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum KeyError {
    #[error("signing secret is empty")]
    Empty,

    #[error("signing secret is not valid base64: {0}")]
    InvalidBase64(String),
}
