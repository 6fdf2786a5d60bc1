//! Bearer token issuing and verification.
//!
//! Tokens are HS256 JWTs:
//!
//! ```text
//! base64url({"typ":"JWT","alg":"HS256"})
//!   . base64url({"userId":1,"email":"admin@tienda.local","rol":"admin","iat":…,"exp":…})
//!   . base64url(HMAC-SHA256(header.payload, jwt_secret))
//! ```
//!
//! There is no nonce: the same user, role and issue second always yield the
//! same token.

use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

/// JWT claims structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    #[serde(rename = "userId")]
    pub user_id: i64,

    pub email: String,

    /// Role name (`admin`, `cajero`)
    #[serde(rename = "rol")]
    pub role: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies bearer tokens with one shared secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl_secs: i64,
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("ttl_secs", &self.ttl_secs)
            .finish_non_exhaustive()
    }
}

impl TokenIssuer {
    /// Create a new issuer.
    ///
    /// ## Arguments
    /// * `secret` - HMAC key
    /// * `ttl_secs` - Lifetime added to the issue time to get `exp`
    pub fn new(secret: &str, ttl_secs: i64) -> Self {
        TokenIssuer {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl_secs,
        }
    }

    /// Issue a token at the current time.
    pub fn issue(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        self.issue_at(user_id, email, role, Utc::now())
    }

    /// Issue a token as of `issued_at`.
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        role: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let iat = issued_at.timestamp();

        let claims = Claims {
            user_id,
            email: email.to_string(),
            role: role.to_string(),
            iat,
            exp: iat + self.ttl_secs,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
    }

    /// Check signature and expiry and return the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["exp"]);

        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret-that-is-long-enough-for-hmac", 3600)
    }

    #[test]
    fn test_issue_and_verify() {
        let tokens = issuer();
        let token = tokens.issue(42, "caja@tienda.local", "cajero").unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.email, "caja@tienda.local");
        assert_eq!(claims.role, "cajero");
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn test_three_base64url_parts() {
        let token = issuer().issue(1, "a@b.co", "admin").unwrap();
        let parts: Vec<_> = token.split('.').collect();

        assert_eq!(parts.len(), 3);
        assert!(parts
            .iter()
            .all(|p| p.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')));
    }

    #[test]
    fn test_same_inputs_same_second_same_token() {
        let tokens = issuer();
        let at = Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap();

        let first = tokens.issue_at(7, "x@tienda.local", "admin", at).unwrap();
        let second = tokens.issue_at(7, "x@tienda.local", "admin", at).unwrap();
        let later = tokens
            .issue_at(7, "x@tienda.local", "admin", at + Duration::seconds(1))
            .unwrap();

        assert_eq!(first, second);
        assert_ne!(first, later);
    }

    #[test]
    fn test_expired_token_fails() {
        let tokens = issuer();
        // Well past the default 60 second leeway
        let token = tokens
            .issue_at(1, "old@tienda.local", "admin", Utc::now() - Duration::hours(3))
            .unwrap();

        assert!(tokens.verify(&token).is_err());
    }

    #[test]
    fn test_different_secrets_fail() {
        let token = TokenIssuer::new("secret-alpha", 3600)
            .issue(1, "a@tienda.local", "admin")
            .unwrap();

        assert!(TokenIssuer::new("secret-bravo", 3600).verify(&token).is_err());
    }
}
