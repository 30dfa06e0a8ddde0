use serde::{Deserialize, Serialize};

/// Lifetime requested for each signed assertion (Google caps it at one hour)
pub const ASSERTION_LIFETIME_SECONDS: i64 = 3600;

/// Claims of the JWT-bearer assertion exchanged for an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssertionClaims {
    /// Issuer (service account email)
    pub iss: String,
    /// Space-separated OAuth2 scopes
    pub scope: String,
    /// Audience (the token endpoint)
    pub aud: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

impl AssertionClaims {
    pub fn new(issuer: &str, scopes: &[String], audience: &str) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            iss: issuer.to_string(),
            scope: scopes.join(" "),
            aud: audience.to_string(),
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECONDS,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scopes_are_space_separated() {
        let claims = AssertionClaims::new(
            "relay@demo.iam.gserviceaccount.com",
            &["scope-a".to_string(), "scope-b".to_string()],
            "https://oauth2.googleapis.com/token",
        );
        assert_eq!(claims.scope, "scope-a scope-b");
        assert_eq!(claims.exp - claims.iat, ASSERTION_LIFETIME_SECONDS);
    }
}
