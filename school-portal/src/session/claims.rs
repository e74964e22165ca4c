use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::error::DecodeError;

/// Closed set of portal roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    SchoolAdmin,
    Teacher,
    Student,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::SchoolAdmin, Role::Teacher, Role::Student];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::SchoolAdmin => "SCHOOLADMIN",
            Role::Teacher => "TEACHER",
            Role::Student => "STUDENT",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role string outside the closed set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    // Exact match only: "teacher" is as unknown as "PRINCIPAL".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// Token payload as issued by the backend, before validation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RawClaims {
    user_id: i64,
    role: String,
    name: String,
    #[serde(default)]
    school_id: Option<i64>,
    #[serde(default)]
    classroom_id: Option<i64>,
    #[serde(default)]
    school_name: Option<String>,
    /// Login email
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    iat: Option<i64>,
    #[serde(default)]
    exp: Option<i64>,
}

/// Validated projection of a session token.
///
/// Only the decoder builds these; there is no public constructor and no
/// mutator, so a value always reflects one successful decode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    subject_id: i64,
    role: Role,
    display_name: String,
    email: Option<String>,
    school_id: Option<i64>,
    classroom_id: Option<i64>,
    school_name: Option<String>,
    issued_at: Option<DateTime<Utc>>,
    expires_at: Option<DateTime<Utc>>,
}

impl SessionClaims {
    pub(crate) fn from_raw(raw: RawClaims) -> Result<Self, DecodeError> {
        let role = raw
            .role
            .parse::<Role>()
            .map_err(|UnknownRole(role)| DecodeError::UnrecognizedRole(role))?;

        Ok(Self {
            subject_id: raw.user_id,
            role,
            display_name: raw.name,
            email: raw.sub,
            school_id: raw.school_id,
            classroom_id: raw.classroom_id,
            school_name: raw.school_name,
            issued_at: raw.iat.map(timestamp).transpose()?,
            expires_at: raw.exp.map(timestamp).transpose()?,
        })
    }

    pub fn subject_id(&self) -> i64 {
        self.subject_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn school_id(&self) -> Option<i64> {
        self.school_id
    }

    pub fn classroom_id(&self) -> Option<i64> {
        self.classroom_id
    }

    pub fn school_name(&self) -> Option<&str> {
        self.school_name.as_deref()
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        self.issued_at
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// A token without `exp` never expires here; the backend still enforces
    /// its own validity window. A deadline past the representable range
    /// never expires either.
    pub fn is_expired_at(&self, now: DateTime<Utc>, leeway: Duration) -> bool {
        self.expires_at.is_some_and(|expires_at| {
            expires_at
                .checked_add_signed(leeway)
                .is_some_and(|deadline| deadline <= now)
        })
    }
}

fn timestamp(seconds: i64) -> Result<DateTime<Utc>, DecodeError> {
    DateTime::<Utc>::from_timestamp(seconds, 0)
        .ok_or_else(|| DecodeError::Malformed(format!("timestamp out of range: {seconds}")))
}
