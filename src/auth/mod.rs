use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::config;
use crate::domain::Role;

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: Uuid,
    pub email: String,
    pub role: Role,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(id: Uuid, email: String, role: Role) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id,
            email,
            role,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_jwt(claims: Claims) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &claims, &encoding_key).map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

/// Expiry is enforced by the default validation; callers map any failure
/// to a single 401 without distinguishing the cause.
pub fn decode_jwt(token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let secret = &config::config().security.jwt_secret;
    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    decode::<Claims>(token, &decoding_key, &Validation::default()).map(|data| data.claims)
}

/// Password-reset token pair: the raw token is mailed to the user, only its
/// SHA-256 hex digest is stored.
pub fn generate_reset_token() -> (String, String) {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    let raw: String = bytes.iter().map(|b| format!("{:02x}", b)).collect();
    let digest = hash_reset_token(&raw);
    (raw, digest)
}

pub fn hash_reset_token(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_token_digest_is_stable_and_distinct_from_raw() {
        let (raw, digest) = generate_reset_token();
        assert_eq!(raw.len(), 64);
        assert_eq!(digest.len(), 64);
        assert_ne!(raw, digest);
        assert_eq!(hash_reset_token(&raw), digest);
    }

    #[test]
    fn issued_tokens_decode_back_to_their_claims() {
        let id = Uuid::new_v4();
        let claims = Claims::new(id, "landlord@test.com".to_string(), Role::Landlord);
        let token = generate_jwt(claims).unwrap();
        let decoded = decode_jwt(&token).unwrap();
        assert_eq!(decoded.id, id);
        assert_eq!(decoded.role, Role::Landlord);
    }

    #[test]
    fn garbage_tokens_fail_to_decode() {
        assert!(decode_jwt("not-a-token").is_err());
    }

    #[test]
    fn reset_tokens_are_unique() {
        let (a, _) = generate_reset_token();
        let (b, _) = generate_reset_token();
        assert_ne!(a, b);
    }
}
