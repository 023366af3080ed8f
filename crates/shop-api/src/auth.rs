//! # Authentication
//!
//! HS256 bearer tokens and Argon2id password hashes.
//!
//! The token is read from `Authorization: Bearer <t>`, a bare
//! `Authorization: <t>` or the `x-auth-token` header. Handlers opt in by
//! taking an [`AuthUser`] or [`AdminUser`] argument.

use crate::error::ApiError;
use crate::state::AppState;
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts, HeaderMap};
use chrono::{Duration, Utc};
use jsonwebtoken::{errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use shop_core::{Requester, ShopError, ShopResult, User};

const USER_TOKEN_DAYS: i64 = 7;
const ADMIN_TOKEN_DAYS: i64 = 1;
const ADMIN_SUBJECT: &str = "admin";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id, or `admin` for the seller
    pub sub: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

/// Signing and verification keys derived from `JWT_SECRET`
#[derive(Clone)]
pub struct TokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue_user_token(&self, user: &User) -> ShopResult<String> {
        self.issue(
            &user.id,
            &user.name,
            &user.email,
            Role::User,
            Duration::days(USER_TOKEN_DAYS),
        )
    }

    pub fn issue_admin_token(&self, seller_email: &str) -> ShopResult<String> {
        self.issue(
            ADMIN_SUBJECT,
            "Admin",
            seller_email,
            Role::Admin,
            Duration::days(ADMIN_TOKEN_DAYS),
        )
    }

    fn issue(
        &self,
        sub: &str,
        name: &str,
        email: &str,
        role: Role,
        lifetime: Duration,
    ) -> ShopResult<String> {
        let now = Utc::now();
        let claims = Claims {
            sub: sub.to_string(),
            name: name.to_string(),
            email: email.to_string(),
            role,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ShopError::Internal(format!("JWT encode: {}", e)))
    }

    pub fn verify(&self, token: &str) -> ShopResult<Claims> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_required_spec_claims(&["sub", "exp"]);

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                match e.kind() {
                    ErrorKind::ExpiredSignature => tracing::debug!("expired token presented"),
                    _ => tracing::debug!(error = %e, "token rejected"),
                }
                ShopError::Unauthorized("Invalid token".to_string())
            })
    }
}

fn token_from_headers(headers: &HeaderMap) -> Option<&str> {
    let from_authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim())
        .map(|v| v.strip_prefix("Bearer ").unwrap_or(v).trim());

    from_authorization
        .or_else(|| {
            headers
                .get("x-auth-token")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
        })
        .filter(|t| !t.is_empty())
}

fn claims_from_parts(parts: &Parts, state: &AppState) -> Result<Claims, ApiError> {
    let token = token_from_headers(&parts.headers).ok_or_else(|| {
        ShopError::Unauthorized("Access denied. No token provided".to_string())
    })?;
    Ok(state.tokens.verify(token)?)
}

/// Any signed-in caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub claims: Claims,
    is_seller: bool,
}

impl AuthUser {
    pub fn id(&self) -> &str {
        &self.claims.sub
    }

    pub fn requester(&self) -> Requester {
        if self.is_seller {
            Requester::admin(self.id())
        } else {
            Requester::user(self.id())
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        let is_seller = is_seller(&claims, state);
        Ok(Self { claims, is_seller })
    }
}

/// The seller; requires an admin token issued for the configured seller email
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub claims: Claims,
}

impl AdminUser {
    pub fn id(&self) -> &str {
        &self.claims.sub
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let claims = claims_from_parts(parts, state)?;
        if !is_seller(&claims, state) {
            return Err(ShopError::Forbidden("Admin access required".to_string()).into());
        }
        Ok(Self { claims })
    }
}

fn is_seller(claims: &Claims, state: &AppState) -> bool {
    claims.role == Role::Admin
        && state
            .config
            .seller_email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&claims.email))
}

/// Hash a password into a PHC string
pub fn hash_password(password: &str) -> ShopResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ShopError::Internal(format!("password hashing failed: {}", e)))
}

/// `Ok(false)` on mismatch; `Err` only for a malformed stored hash
pub fn verify_password(password: &str, hash: &str) -> ShopResult<bool> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| ShopError::Internal(format!("invalid hash format: {}", e)))?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(ShopError::Internal(format!("verify error: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_token_roundtrip() {
        let keys = TokenKeys::new("test-secret");
        let user = User::new("Ada".into(), "ada@example.com".into(), "hash".into());

        let token = keys.issue_user_token(&user).unwrap();
        let claims = keys.verify(&token).unwrap();
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::User);
        assert_eq!(claims.exp - claims.iat, 7 * 24 * 3600);

        let admin = keys.verify(&keys.issue_admin_token("seller@byc.shop").unwrap()).unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.exp - admin.iat, 24 * 3600);
    }

    #[test]
    fn test_foreign_or_garbled_tokens_rejected() {
        let keys = TokenKeys::new("test-secret");
        let token = TokenKeys::new("other-secret")
            .issue_admin_token("seller@byc.shop")
            .unwrap();

        let err = keys.verify(&token).unwrap_err();
        assert_eq!(err.to_string(), "Invalid token");
        assert!(keys.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let keys = TokenKeys::new("test-secret");
        let token = keys
            .issue("u1", "Ada", "ada@example.com", Role::User, Duration::hours(-2))
            .unwrap();
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn test_token_header_forms() {
        let mut headers = HeaderMap::new();
        assert_eq!(token_from_headers(&headers), None);

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("Bearer abc"));
        assert_eq!(token_from_headers(&headers), Some("abc"));

        headers.insert(header::AUTHORIZATION, HeaderValue::from_static("abc"));
        assert_eq!(token_from_headers(&headers), Some("abc"));

        let mut headers = HeaderMap::new();
        headers.insert("x-auth-token", HeaderValue::from_static("xyz"));
        assert_eq!(token_from_headers(&headers), Some("xyz"));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse", &hash).unwrap());
        assert!(!verify_password("battery staple", &hash).unwrap());
        assert!(verify_password("x", "not-a-phc-string").is_err());
    }
}
