//! Access and refresh tokens for staff sessions.
//!
//! An access token is an HS256 JWT naming the user, their role and the
//! `staff_sessions` row it was issued for. The auth extractor checks that row
//! on every request, so signing out or deactivating an account takes effect
//! before the token expires. Refresh tokens are opaque; the database only
//! sees their SHA-256.

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;
use hearth_core::roles::Role;
use hearth_core::types::DbId;

/// `iss` of every token this server issues.
pub const ISSUER: &str = "hearth";

/// Prefix that makes refresh tokens recognisable in logs and support tickets.
const REFRESH_PREFIX: &str = "hrt_";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// User id.
    pub sub: DbId,
    /// Session id.
    pub sid: DbId,
    pub role: Role,
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub access_token_expiry_mins: i64,
    pub refresh_token_expiry_days: i64,
}

impl JwtConfig {
    /// Read `JWT_SECRET` (required), `JWT_ACCESS_EXPIRY_MINS` (default 15)
    /// and `JWT_REFRESH_EXPIRY_DAYS` (default 7).
    ///
    /// # Panics
    ///
    /// Panics if `JWT_SECRET` is missing or empty, or an expiry is not a number.
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").expect("JWT_SECRET must be set in the environment");
        assert!(!secret.is_empty(), "JWT_SECRET must not be empty");

        let number = |name: &str, default: i64| -> i64 {
            std::env::var(name)
                .map(|v| v.parse().unwrap_or_else(|_| panic!("{name} must be a whole number")))
                .unwrap_or(default)
        };

        Self {
            secret,
            access_token_expiry_mins: number("JWT_ACCESS_EXPIRY_MINS", 15),
            refresh_token_expiry_days: number("JWT_REFRESH_EXPIRY_DAYS", 7),
        }
    }

    /// Access token lifetime in seconds.
    pub fn access_ttl_secs(&self) -> i64 {
        self.access_token_expiry_mins * 60
    }
}

/// Sign an access token for `user_id` acting within session `session_id`.
pub fn issue_access_token(
    user_id: DbId,
    session_id: DbId,
    role: Role,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub: user_id,
        sid: session_id,
        role,
        iss: ISSUER.to_string(),
        iat: now,
        exp: now + config.access_ttl_secs(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Check signature, expiry and issuer.
pub fn decode_access_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    let mut validation = Validation::default();
    validation.set_issuer(&[ISSUER]);
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &validation,
    )
    .map(|data| data.claims)
}

/// A fresh refresh token and the hash to store for it.
pub fn new_refresh_token() -> (String, String) {
    let token = format!("{REFRESH_PREFIX}{}", Uuid::new_v4().simple());
    let hash = refresh_token_hash(&token);
    (token, hash)
}

pub fn refresh_token_hash(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> JwtConfig {
        JwtConfig {
            secret: "hearth-test-secret-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        }
    }

    fn sign(claims: &Claims, secret: &str) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn access_token_names_user_session_and_role() {
        let config = config();
        let token = issue_access_token(7, 42, Role::Staff, &config).unwrap();

        let claims = decode_access_token(&token, &config).unwrap();
        assert_eq!(claims.sub, 7);
        assert_eq!(claims.sid, 42);
        assert_eq!(claims.role, Role::Staff);
        assert_eq!(claims.iss, ISSUER);
        assert_eq!(claims.exp - claims.iat, 15 * 60);
    }

    #[test]
    fn expired_token_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            sid: 1,
            role: Role::Admin,
            iss: ISSUER.to_string(),
            // Past the default 60-second leeway.
            iat: now - 600,
            exp: now - 300,
        };
        let config = config();
        assert!(decode_access_token(&sign(&claims, &config.secret), &config).is_err());
    }

    #[test]
    fn foreign_issuer_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = Claims {
            sub: 1,
            sid: 1,
            role: Role::Admin,
            iss: "someone-else".to_string(),
            iat: now,
            exp: now + 60,
        };
        let config = config();
        assert!(decode_access_token(&sign(&claims, &config.secret), &config).is_err());
    }

    #[test]
    fn unknown_role_rejected() {
        let now = chrono::Utc::now().timestamp();
        let claims = serde_json::json!({
            "sub": 1, "sid": 1, "role": "resident", "iss": ISSUER, "iat": now, "exp": now + 60,
        });
        let config = config();
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();
        assert!(decode_access_token(&token, &config).is_err());
    }

    #[test]
    fn token_from_other_secret_rejected() {
        let mut other = config();
        other.secret = "some-other-secret".into();
        let token = issue_access_token(1, 1, Role::Admin, &other).unwrap();
        assert!(decode_access_token(&token, &config()).is_err());
    }

    #[test]
    fn refresh_tokens_are_prefixed_and_hashed() {
        let (token, hash) = new_refresh_token();
        assert!(token.starts_with(REFRESH_PREFIX));
        assert_eq!(hash, refresh_token_hash(&token));
        assert_eq!(hash.len(), 64);
        assert_ne!(new_refresh_token().0, token);
    }
}
