use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use crate::types::{AuthError, Claims, CurrentUser};

/// Encodes and verifies the HS256 bearer tokens that identify callers.
#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtService {
    /// Creates a service keyed from the `JWT_SECRET` environment variable.
    pub fn new() -> Self {
        let secret = std::env::var("JWT_SECRET")
            .unwrap_or_else(|_| "your-secret-key-change-this-in-production".to_string());

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_ref()),
            decoding_key: DecodingKey::from_secret(secret.as_ref()),
        }
    }

    /// Generates an access token identifying the given user for one hour.
    pub fn generate_access_token(
        &self,
        user_id: &Uuid,
        username: &str,
    ) -> Result<String, AuthError> {
        let now = Utc::now();
        let expiration = now
            .checked_add_signed(Duration::hours(1))
            .expect("valid timestamp")
            .timestamp() as usize;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            exp: expiration,
            iat: now.timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding_key)?;
        Ok(token)
    }

    /// Verifies a token and returns its claims.
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let token_data = decode::<Claims>(
            token,
            &self.decoding_key,
            &Validation::new(Algorithm::HS256),
        )?;

        Ok(token_data.claims)
    }

    /// Verifies a token and resolves the caller identity from its claims.
    pub fn extract_current_user(&self, token: &str) -> Result<CurrentUser, AuthError> {
        let claims = self.verify_token(token)?;
        let id = Uuid::parse_str(&claims.sub).map_err(|_| AuthError::InvalidToken)?;

        Ok(CurrentUser {
            id,
            username: claims.username,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trip() {
        let service = JwtService::new();
        let user_id = Uuid::new_v4();

        let token = service.generate_access_token(&user_id, "camper_joe").unwrap();
        let user = service.extract_current_user(&token).unwrap();

        assert_eq!(user.id, user_id);
        assert_eq!(user.username, "camper_joe");
    }

    #[test]
    fn test_tampered_token_rejected() {
        let service = JwtService::new();
        let user_id = Uuid::new_v4();

        let mut token = service.generate_access_token(&user_id, "camper_joe").unwrap();
        token.push('x');

        assert!(service.extract_current_user(&token).is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let service = JwtService::new();
        let claims = Claims {
            sub: "not-a-uuid".to_string(),
            username: "camper_joe".to_string(),
            exp: (Utc::now().timestamp() + 3600) as usize,
            iat: Utc::now().timestamp() as usize,
        };
        let token = encode(&Header::default(), &claims, &service.encoding_key).unwrap();

        assert!(matches!(
            service.extract_current_user(&token),
            Err(AuthError::InvalidToken)
        ));
    }
}
