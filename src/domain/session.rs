use crate::domain::errors::AnalysisError;
use chrono::{DateTime, Utc};
use std::fmt;

/// Credentials for one market-data provider.
///
/// Owned by whoever builds the provider and handed over explicitly; there is no
/// process-wide session.
#[derive(Clone)]
pub struct ApiSession {
    token: String,
    expires_at: Option<DateTime<Utc>>,
}

impl ApiSession {
    pub fn new(token: impl Into<String>, expires_at: Option<DateTime<Utc>>) -> Self {
        Self {
            token: token.into(),
            expires_at,
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }

    /// Fails with `SessionExpired` when the session is no longer usable at `now`.
    pub fn ensure_valid(&self, now: DateTime<Utc>) -> Result<(), AnalysisError> {
        match self.expires_at {
            Some(at) if now >= at => Err(AnalysisError::SessionExpired {
                expired_at: at.to_rfc3339(),
            }),
            _ => Ok(()),
        }
    }

    pub fn bearer_header(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

// Keep the token out of logs.
impl fmt::Debug for ApiSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ApiSession")
            .field("token", &"<redacted>")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}
