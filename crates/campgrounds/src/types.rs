use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use geocoder::GeocodeError;
use media_store::MediaStoreError;

/// The user who created a campground, embedded in the record and immutable
/// after creation.
#[derive(Debug, Clone, Serialize)]
pub struct CampgroundAuthor {
    /// Unique identifier of the creating user
    pub id: Uuid,
    /// Display name of the creating user
    pub username: String,
}

/// A persisted campground record.
#[derive(Debug, Clone, Serialize)]
pub struct Campground {
    /// Unique identifier, assigned on creation
    pub id: Uuid,
    /// Display name of the campground
    pub name: String,
    /// Price per night
    pub price: f64,
    /// Free-text description
    pub description: String,
    /// Public URL of the campground image
    pub image_url: String,
    /// Opaque media-store handle for the image, used only for deletion
    #[serde(skip_serializing)]
    pub image_public_id: String,
    /// Normalized formatted address from the geocoder
    pub location: String,
    /// Latitude in decimal degrees
    pub lat: f64,
    /// Longitude in decimal degrees
    pub lng: f64,
    /// The creating user
    pub author: CampgroundAuthor,
    /// When the record was created
    pub created_at: DateTime<Utc>,
    /// When the record was last updated
    pub updated_at: DateTime<Utc>,
}

/// A comment attached to a campground. Comments are owned by a separate
/// subsystem; the campground is only their parent for population on Show.
#[derive(Debug, Clone, Serialize)]
pub struct Comment {
    /// Unique identifier for the comment
    pub id: Uuid,
    /// Comment body
    pub text: String,
    /// Display name of the comment author
    pub author_username: String,
    /// When the comment was created
    pub created_at: DateTime<Utc>,
}

/// A campground with its comment sequence populated, as rendered by Show.
#[derive(Debug, Serialize)]
pub struct CampgroundWithComments {
    /// The campground record
    #[serde(flatten)]
    pub campground: Campground,
    /// Comments on this campground, oldest first
    pub comments: Vec<Comment>,
}

/// Fields submitted when creating a campground.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateCampgroundRequest {
    /// Name of the campground
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// Price per night, non-negative
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    /// Free-text description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// Free-text location to be geocoded
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
}

/// Fields submitted when updating a campground. The image attachment is
/// optional and handled separately by the upload receiver.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateCampgroundRequest {
    /// New name of the campground
    #[validate(length(min = 1, max = 255, message = "Name is required"))]
    pub name: String,

    /// New price per night, non-negative
    #[validate(range(min = 0.0, message = "Price cannot be negative"))]
    pub price: f64,

    /// New description
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    /// New free-text location to be geocoded
    #[validate(length(min = 1, max = 255, message = "Location is required"))]
    pub location: String,
}

/// Response structure for the list/search route.
#[derive(Debug, Serialize)]
pub struct ListCampgroundsResponse {
    /// Number of campgrounds returned
    pub total: i64,
    /// The matching campgrounds, newest first
    pub campgrounds: Vec<Campground>,
    /// Human-readable notice when a search matched nothing, otherwise null
    pub no_match: Option<String>,
}

/// Response structure for mutations that report a transient notice.
#[derive(Debug, Serialize)]
pub struct CampgroundMessageResponse {
    /// Human-readable outcome notice
    pub message: String,
    /// The affected campground, when one survives the operation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub campground: Option<Campground>,
}

/// The uniform error type threaded through every campground handler.
///
/// Every failure path maps to exactly one variant and every variant renders
/// a user-visible JSON notice; no failure is silently swallowed on the
/// write paths.
#[derive(Debug, thiserror::Error)]
pub enum CampgroundError {
    /// The request input failed validation (bad file type, empty geocode
    /// result, malformed form field)
    #[error("{0}")]
    Validation(String),

    /// The requested campground does not exist
    #[error("Campground not found")]
    NotFound,

    /// The caller is not the campground's owner
    #[error("You don't have permission to do that")]
    Forbidden,

    /// The geocoding service failed
    #[error("Geocoding failed: {0}")]
    Geocode(#[from] GeocodeError),

    /// The media store failed
    #[error("Media store error: {0}")]
    MediaStore(#[from] MediaStoreError),

    /// The repository failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// The upload could not be staged to local disk
    #[error("Failed to stage upload: {0}")]
    Staging(#[from] std::io::Error),
}

impl actix_web::ResponseError for CampgroundError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            CampgroundError::Validation(message) => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "validation_error",
                    "message": message
                }))
            }
            CampgroundError::NotFound => HttpResponse::NotFound().json(serde_json::json!({
                "error": "not_found",
                "message": "Campground not found"
            })),
            CampgroundError::Forbidden => HttpResponse::Forbidden().json(serde_json::json!({
                "error": "forbidden",
                "message": "You don't have permission to do that"
            })),
            CampgroundError::Geocode(err) => HttpResponse::BadGateway().json(serde_json::json!({
                "error": "upstream_error",
                "message": err.to_string()
            })),
            CampgroundError::MediaStore(err) => {
                HttpResponse::BadGateway().json(serde_json::json!({
                    "error": "upstream_error",
                    "message": err.to_string()
                }))
            }
            CampgroundError::Database(err) => {
                // Detail goes to the log, not to the caller.
                log::error!("Repository failure: {}", err);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
            CampgroundError::Staging(err) => {
                log::error!("Failed to stage upload: {}", err);
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_create_request_validation_bounds() {
        let valid = CreateCampgroundRequest {
            name: "Pine Ridge".to_string(),
            price: 10.0,
            description: "quiet".to_string(),
            location: "Yosemite".to_string(),
        };
        assert!(valid.validate().is_ok());

        let empty_name = CreateCampgroundRequest {
            name: String::new(),
            ..valid_request()
        };
        assert!(empty_name.validate().is_err());

        let negative_price = CreateCampgroundRequest {
            price: -1.0,
            ..valid_request()
        };
        assert!(negative_price.validate().is_err());
    }

    fn valid_request() -> CreateCampgroundRequest {
        CreateCampgroundRequest {
            name: "Pine Ridge".to_string(),
            price: 10.0,
            description: "quiet".to_string(),
            location: "Yosemite".to_string(),
        }
    }

    #[test]
    fn test_error_status_mapping() {
        use actix_web::http::StatusCode;

        let cases = [
            (
                CampgroundError::Validation("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (CampgroundError::NotFound, StatusCode::NOT_FOUND),
            (CampgroundError::Forbidden, StatusCode::FORBIDDEN),
            (
                CampgroundError::Database(sqlx::Error::PoolClosed),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.error_response().status(), expected);
        }
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err = CampgroundError::Validation("Invalid google maps location".to_string());
        assert_eq!(err.to_string(), "Invalid google maps location");
    }
}
