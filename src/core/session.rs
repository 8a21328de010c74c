use crate::utils::error::{Result, StatsError};
use crate::utils::validation::validate_non_empty_string;
use std::fmt;

/// In-memory session cookies for one run. Owned by the fetch phase and dropped
/// with it; never serialized.
pub struct SessionContext {
    client_id: String,
    session_uid: String,
}

impl SessionContext {
    /// Both cookie values must be non-empty, otherwise the session is rejected
    /// up front instead of on the first request.
    pub fn new(client_id: impl Into<String>, session_uid: impl Into<String>) -> Result<Self> {
        let client_id = client_id.into();
        let session_uid = session_uid.into();

        for (field, value) in [("__client_id", &client_id), ("_uid", &session_uid)] {
            validate_non_empty_string(field, value).map_err(|_| StatsError::Auth {
                message: format!("session cookie {} must be non-empty", field),
            })?;
        }

        Ok(Self {
            client_id,
            session_uid,
        })
    }

    /// Renders the judge's cookie pair for the Cookie request header.
    pub fn cookie_header(&self) -> String {
        format!("__client_id={}; _uid={}", self.client_id, self.session_uid)
    }
}

// Credentials must never reach logs; Debug prints placeholders only.
impl fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionContext")
            .field("client_id", &"<redacted>")
            .field("session_uid", &"<redacted>")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_cookie_values() {
        assert!(matches!(
            SessionContext::new("", "12345"),
            Err(StatsError::Auth { .. })
        ));
        assert!(matches!(
            SessionContext::new("abcdef", "   "),
            Err(StatsError::Auth { .. })
        ));
    }

    #[test]
    fn renders_cookie_header() {
        let session = SessionContext::new("abcdef", "12345").unwrap();
        assert_eq!(session.cookie_header(), "__client_id=abcdef; _uid=12345");
    }

    #[test]
    fn debug_output_redacts_credentials() {
        let session = SessionContext::new("super-secret-token", "98765").unwrap();
        let rendered = format!("{:?}", session);

        assert!(!rendered.contains("super-secret-token"));
        assert!(!rendered.contains("98765"));
        assert!(rendered.contains("<redacted>"));
    }
}
