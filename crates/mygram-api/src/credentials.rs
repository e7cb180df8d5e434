use std::sync::LazyLock;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};

use mygram_types::api::Claims;

use crate::error::ApiError;

/// Lifetime of an access token, in seconds.
pub const TOKEN_TTL_SECS: i64 = 60 * 60;

/// Hash a password with Argon2id and a fresh random salt.
pub fn hash_password(plaintext: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {}", e)))
}

/// A stored hash that cannot be parsed never verifies.
pub fn verify_password(hash: &str, plaintext: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Hash checked when a login names no known user, so both failures cost the same.
static DECOY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("mygram-decoy-password").ok());

/// Runs a full Argon2 verification that never succeeds.
pub fn verify_decoy(plaintext: &str) {
    if let Some(hash) = DECOY_HASH.as_deref() {
        let _ = verify_password(hash, plaintext);
    }
}

/// Issues and checks HS256 access tokens.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }

    pub fn issue(&self, user_id: &str, email: &str) -> Result<String, ApiError> {
        self.issue_at(user_id, email, Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (unix seconds).
    pub fn issue_at(&self, user_id: &str, email: &str, now: i64) -> Result<String, ApiError> {
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::Internal(format!("token encoding failed: {}", e)))
    }

    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        self.verify_at(token, Utc::now().timestamp())
    }

    /// Check signature and shape, then expiry against `now` with no leeway.
    pub fn verify_at(&self, token: &str, now: i64) -> Result<Claims, ApiError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| ApiError::InvalidToken)?;

        if data.claims.exp <= now {
            return Err(ApiError::InvalidToken);
        }

        Ok(data.claims)
    }
}
