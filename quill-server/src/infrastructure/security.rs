use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand_core::{OsRng, RngCore};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Clone)]
pub struct JwtKeys {
    secret: String,
}

impl JwtKeys {
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    pub fn generate_token(&self, principal_id: Uuid) -> Result<String, jsonwebtoken::errors::Error> {
        let now = chrono::Utc::now();
        let claims = Claims {
            sub: principal_id.to_string(),
            exp: (now + chrono::Duration::hours(TOKEN_TTL_HOURS)).timestamp() as usize,
            iat: now.timestamp() as usize,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
    }

    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &Validation::default(),
        )?;
        Ok(data.claims)
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
    pub iat: usize,
}

/// Six decimal digits, never starting with zero.
pub fn generate_code() -> String {
    let n = 100_000 + OsRng.next_u32() % 900_000;
    n.to_string()
}

pub fn hash_code(code: &str) -> Result<String, argon2::password_hash::Error> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let hash = argon2.hash_password(code.as_bytes(), &salt)?.to_string();
    Ok(hash)
}

pub fn verify_code(code: &str, hash: &str) -> Result<bool, argon2::password_hash::Error> {
    let parsed = PasswordHash::new(hash)?;
    let argon2 = Argon2::default();
    Ok(argon2.verify_password(code.as_bytes(), &parsed).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_round_trips_through_hash() {
        let code = generate_code();
        assert_eq!(code.len(), 6);
        let hash = hash_code(&code).unwrap();
        assert!(verify_code(&code, &hash).unwrap());
        assert!(!verify_code("000000", &hash).unwrap());
    }

    #[test]
    fn token_round_trips() {
        let keys = JwtKeys::new("test-secret".into());
        let id = Uuid::new_v4();
        let token = keys.generate_token(id).unwrap();
        let claims = keys.verify_token(&token).unwrap();
        assert_eq!(claims.sub, id.to_string());
    }
}
