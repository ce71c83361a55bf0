use actix_web::cookie::{Cookie, SameSite};
use actix_web::{HttpRequest, HttpResponse};
use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use leptos::logging::log;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

/// Name of the HttpOnly cookie carrying the session token.
pub const AUTH_COOKIE: &str = "auth_token";

/// How long an issued session token stays valid.
const TOKEN_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("authentication required")]
    MissingToken,
    #[error("invalid or expired token")]
    InvalidToken,
    #[error("insufficient permissions")]
    Forbidden,
    #[error("password hashing failed")]
    Hash,
}

impl AuthError {
    /// Maps the auth failure onto the coarse HTTP taxonomy: 401 for
    /// missing/bad credentials, 403 for a valid caller lacking rights.
    pub fn error_response(&self) -> HttpResponse {
        match self {
            AuthError::MissingToken | AuthError::InvalidToken => {
                HttpResponse::Unauthorized().json(json!({ "message": self.to_string() }))
            }
            AuthError::Forbidden => {
                HttpResponse::Forbidden().json(json!({ "message": self.to_string() }))
            }
            AuthError::Hash => HttpResponse::InternalServerError()
                .json(json!({ "message": "Internal server error" })),
        }
    }
}

/// JWT Claims
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: i64, // User id
    pub username: String,
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(user_id: i64, username: &str, role: &str) -> Self {
        let now = Utc::now();
        Self {
            sub: user_id,
            username: username.to_string(),
            role: role.to_string(),
            iat: now.timestamp(),
            exp: (now + Duration::hours(TOKEN_HOURS)).timestamp(),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "Admin"
    }

    /// Owner-or-admin rule used by the review mutation paths.
    pub fn may_act_for(&self, user_id: i64) -> bool {
        self.sub == user_id || self.is_admin()
    }
}

/// The shared secret the tokens are signed with. Read from the environment;
/// the fallback keeps local development working.
pub fn jwt_secret() -> Vec<u8> {
    match std::env::var("EMPORIUM_JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => secret.into_bytes(),
        _ => {
            log!("[AUTH] EMPORIUM_JWT_SECRET not set, using development secret");
            b"emporium-dev-secret".to_vec()
        }
    }
}

pub fn issue_token(secret: &[u8], claims: &Claims) -> Result<String, AuthError> {
    encode(&Header::default(), claims, &EncodingKey::from_secret(secret))
        .map_err(|_| AuthError::InvalidToken)
}

pub fn decode_token(secret: &[u8], token: &str) -> Result<Claims, AuthError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|_| AuthError::InvalidToken)
}

/// Reads and verifies the session cookie on a request.
pub fn authenticate(req: &HttpRequest, secret: &[u8]) -> Result<Claims, AuthError> {
    let cookie = req.cookie(AUTH_COOKIE).ok_or(AuthError::MissingToken)?;
    decode_token(secret, cookie.value())
}

/// Like `authenticate`, but also requires the Admin role.
pub fn authenticate_admin(req: &HttpRequest, secret: &[u8]) -> Result<Claims, AuthError> {
    let claims = authenticate(req, secret)?;
    if !claims.is_admin() {
        return Err(AuthError::Forbidden);
    }
    Ok(claims)
}

/// Session cookie for a freshly issued token. HttpOnly so scripts cannot
/// read it.
pub fn auth_cookie(token: String) -> Cookie<'static> {
    Cookie::build(AUTH_COOKIE, token)
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish()
}

/// An immediately-expiring cookie that clears the session on logout.
pub fn clear_auth_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(AUTH_COOKIE, "")
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .finish();
    cookie.make_removal();
    cookie
}

pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            log!("[AUTH] Password hashing failed: {:?}", e);
            AuthError::Hash
        })
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    match PasswordHash::new(hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let secret = b"test-secret";
        let claims = Claims::new(7, "alice", "Customer");
        let token = issue_token(secret, &claims).unwrap();

        let decoded = decode_token(secret, &token).unwrap();
        assert_eq!(decoded.sub, 7);
        assert_eq!(decoded.username, "alice");
        assert_eq!(decoded.role, "Customer");
        assert!(decoded.exp > decoded.iat);
    }

    #[test]
    fn test_token_rejected_with_wrong_secret() {
        let claims = Claims::new(7, "alice", "Customer");
        let token = issue_token(b"secret-a", &claims).unwrap();
        assert!(decode_token(b"secret-b", &token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let secret = b"test-secret";
        let mut claims = Claims::new(7, "alice", "Customer");
        claims.iat -= 7200;
        claims.exp = claims.iat + 60; // Expired well past the default leeway
        let token = issue_token(secret, &claims).unwrap();
        assert!(decode_token(secret, &token).is_err());
    }

    #[test]
    fn test_ownership_rules() {
        let customer = Claims::new(5, "alice", "Customer");
        assert!(customer.may_act_for(5));
        assert!(!customer.may_act_for(6));
        assert!(!customer.is_admin());

        let admin = Claims::new(1, "root", "Admin");
        assert!(admin.may_act_for(5));
        assert!(admin.is_admin());
    }

    #[test]
    fn test_password_hash_and_verify() {
        let hash = hash_password("hunter2-rotated").unwrap();
        assert_ne!(hash, "hunter2-rotated");
        assert!(verify_password(&hash, "hunter2-rotated"));
        assert!(!verify_password(&hash, "hunter2"));
        assert!(!verify_password("not-a-phc-string", "hunter2-rotated"));
    }
}
