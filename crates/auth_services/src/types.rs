use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the user ID
    pub sub: String,
    /// Display name of the user, embedded into records the user creates
    pub username: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// The authenticated caller, as established from a verified bearer token.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    /// Unique identifier for the user
    pub id: Uuid,
    /// Display name of the user
    pub username: String,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// No bearer token was supplied with the request
    #[error("Authorization token is required")]
    MissingToken,

    /// The supplied token failed verification or has expired
    #[error("Invalid or expired token")]
    InvalidToken,

    /// The token verified but its claims are malformed
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::MissingToken => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "missing_token",
                "message": "Authorization token is required"
            })),
            AuthError::InvalidToken | AuthError::Jwt(_) => {
                HttpResponse::Unauthorized().json(serde_json::json!({
                    "error": "invalid_token",
                    "message": "Invalid or expired token"
                }))
            }
        }
    }
}
