//! JWT issue and validation.

use crate::error::{AppError, AppResult};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session token claims. `jti` is the revocation key; the session guard
/// rejects tokens that lack one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: Uuid,
    pub login: String,
    /// Admin flag.
    pub role: bool,
    #[serde(default)]
    pub jti: Option<Uuid>,
    pub exp: i64,
}

/// Stateless issue/verify pair over a symmetric signing key.
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    validity: Duration,
}

impl TokenService {
    pub fn new(secret: String, validity: Duration) -> Self {
        Self { secret, validity }
    }

    /// Issue a signed token with a fresh random jti and a fixed validity window.
    pub fn issue(&self, user_id: Uuid, is_admin: bool, login: &str) -> AppResult<String> {
        let claims = Claims {
            user_id,
            login: login.to_string(),
            role: is_admin,
            jti: Some(Uuid::new_v4()),
            exp: (Utc::now() + self.validity).timestamp(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .map_err(|e| AppError::Jwt(e.to_string()))?;
        Ok(token)
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> AppResult<Claims> {
        let mut validation = Validation::default();
        validation.validate_exp = true;
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => {
                AppError::Jwt("expired token".to_string())
            }
            jsonwebtoken::errors::ErrorKind::InvalidSignature => {
                AppError::Jwt("invalid signature".to_string())
            }
            _ => AppError::Jwt("invalid token".to_string()),
        })?;
        Ok(data.claims)
    }
}
