use actix_multipart::Multipart;
use actix_web::{HttpResponse, web};
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

use auth_services::CurrentUser;
use campgrounds::{
    Campground, CampgroundAuthor, CampgroundError, CampgroundMessageResponse, CampgroundService,
    ListCampgroundsResponse, ReadFailurePolicy, UpdateCampgroundRequest, check_campground_ownership,
};
use geocoder::{GeocodeResult, GeocoderClient};
use media_store::MediaStoreClient;
use serde::{Deserialize, Serialize};

use crate::upload::{ALLOWED_IMAGE_EXTENSIONS, StagedUpload, parse_campground_form};

/// Notice rendered when a geocode lookup produces no usable match.
const INVALID_LOCATION: &str = "Invalid google maps location";

/// Notice rendered when a search matches nothing.
const NO_MATCH: &str = "No campgrounds match that query, please try again.";

/// Query parameters accepted by the list route.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    /// Optional free-text filter on campground names
    pub search: Option<String>,
}

/// Lists all campgrounds, or searches them by name.
///
/// The search text is matched as a literal, case-insensitive substring;
/// regex metacharacters in it have no special meaning.
pub async fn list_campgrounds(
    pool: web::Data<PgPool>,
    policy: web::Data<ReadFailurePolicy>,
    query: web::Query<SearchQuery>,
) -> Result<HttpResponse, CampgroundError> {
    let service = CampgroundService::new(pool.get_ref().clone());
    let search = query.search.as_deref().filter(|s| !s.is_empty());

    let result = match search {
        Some(text) => service.search_by_name(text).await,
        None => service.find_all().await,
    };

    let (campgrounds, read_ok) = match result {
        Ok(campgrounds) => (campgrounds, true),
        Err(err) if !policy.surfaces() => {
            log::error!("Failed to list campgrounds: {}", err);
            (Vec::new(), false)
        }
        Err(err) => return Err(err),
    };

    let no_match = match search {
        Some(_) if read_ok && campgrounds.is_empty() => Some(NO_MATCH.to_string()),
        _ => None,
    };

    Ok(HttpResponse::Ok().json(ListCampgroundsResponse {
        total: campgrounds.len() as i64,
        campgrounds,
        no_match,
    }))
}

/// Creates a new campground from a multipart form carrying the record
/// fields and exactly one image attachment.
///
/// Pipeline order: parse and validate, geocode, upload, persist. The
/// geocode runs before the upload so an invalid location never pays for a
/// remote image; if persistence fails after the upload, the fresh asset is
/// destroyed again.
pub async fn create_campground(
    pool: web::Data<PgPool>,
    geocoder_client: web::Data<GeocoderClient>,
    media_client: web::Data<MediaStoreClient>,
    user: CurrentUser,
    payload: Multipart,
) -> Result<HttpResponse, CampgroundError> {
    let (form, staged) = parse_campground_form(payload).await?;
    let Some(staged) = staged else {
        return Err(CampgroundError::Validation(
            "An image file is required".to_string(),
        ));
    };

    let outcome = perform_create(&pool, &geocoder_client, &media_client, &user, form, &staged).await;

    // The staged temp file is done once the remote upload has been
    // attempted (or skipped by an earlier failure).
    staged.discard().await;

    let campground = outcome?;
    log::info!("Created campground {} ({})", campground.name, campground.id);

    Ok(HttpResponse::Created().json(campground))
}

async fn perform_create(
    pool: &web::Data<PgPool>,
    geocoder_client: &GeocoderClient,
    media_client: &MediaStoreClient,
    user: &CurrentUser,
    form: crate::upload::CampgroundForm,
    staged: &StagedUpload,
) -> Result<Campground, CampgroundError> {
    let request = form.into_create_request()?;
    request
        .validate()
        .map_err(|e| CampgroundError::Validation(format!("Validation error: {}", e)))?;

    let geo = lookup_single_location(geocoder_client, &request.location).await?;

    let image = media_client.upload(&staged.path).await?;

    let author = CampgroundAuthor {
        id: user.id,
        username: user.username.clone(),
    };
    let service = CampgroundService::new(pool.get_ref().clone());

    match service.create(&author, &request, &image, &geo).await {
        Ok(campground) => Ok(campground),
        Err(err) => {
            // Compensate: a record that never materialized must not leave
            // an orphaned remote asset behind.
            if let Err(cleanup_err) = media_client.destroy(&image.public_id).await {
                log::warn!(
                    "Failed to destroy orphaned asset {}: {}",
                    image.public_id,
                    cleanup_err
                );
            }
            Err(err)
        }
    }
}

/// Response structure describing the creation form to the frontend.
#[derive(Debug, Serialize)]
pub struct NewCampgroundFormResponse {
    /// Form fields the create route expects
    pub fields: [&'static str; 5],
    /// Extensions accepted for the image attachment
    pub allowed_image_extensions: [&'static str; 4],
}

/// Describes the creation form. Authenticated-only; no business logic.
pub async fn new_campground_form(_user: CurrentUser) -> Result<HttpResponse, CampgroundError> {
    Ok(HttpResponse::Ok().json(NewCampgroundFormResponse {
        fields: ["name", "price", "description", "location", "image"],
        allowed_image_extensions: ALLOWED_IMAGE_EXTENSIONS,
    }))
}

/// Shows one campground with its comment sequence populated.
pub async fn show_campground(
    pool: web::Data<PgPool>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let campground = service
        .find_by_id_with_comments(&id)
        .await?
        .ok_or(CampgroundError::NotFound)?;

    Ok(HttpResponse::Ok().json(campground))
}

/// Fetches a campground for editing. Owner-only.
pub async fn edit_campground_form(
    pool: web::Data<PgPool>,
    policy: web::Data<ReadFailurePolicy>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let campground = match service.find_by_id(&id).await {
        Ok(Some(campground)) => campground,
        Ok(None) => return Err(CampgroundError::NotFound),
        Err(err) if !policy.surfaces() => {
            log::error!("Failed to fetch campground {} for editing: {}", id, err);
            return Err(CampgroundError::NotFound);
        }
        Err(err) => return Err(err),
    };

    check_campground_ownership(&user, &campground).require()?;

    Ok(HttpResponse::Ok().json(campground))
}

/// Updates a campground from a multipart form; the image attachment is
/// optional. Owner-only.
///
/// All fields, including a replaced image pair, persist in one UPDATE after
/// every fallible stage has succeeded, so no partially-described record is
/// ever stored.
pub async fn update_campground(
    pool: web::Data<PgPool>,
    geocoder_client: web::Data<GeocoderClient>,
    media_client: web::Data<MediaStoreClient>,
    user: CurrentUser,
    path: web::Path<Uuid>,
    payload: Multipart,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    let (form, staged) = parse_campground_form(payload).await?;

    let outcome = perform_update(
        &pool,
        &geocoder_client,
        &media_client,
        &user,
        &id,
        form,
        staged.as_ref(),
    )
    .await;

    if let Some(staged) = staged {
        staged.discard().await;
    }

    let campground = outcome?;
    log::info!("Updated campground {} ({})", campground.name, campground.id);

    Ok(HttpResponse::Ok().json(CampgroundMessageResponse {
        message: "Successfully updated!".to_string(),
        campground: Some(campground),
    }))
}

async fn perform_update(
    pool: &web::Data<PgPool>,
    geocoder_client: &GeocoderClient,
    media_client: &MediaStoreClient,
    user: &CurrentUser,
    id: &Uuid,
    form: crate::upload::CampgroundForm,
    staged: Option<&StagedUpload>,
) -> Result<Campground, CampgroundError> {
    let request: UpdateCampgroundRequest = form.into_update_request()?;
    request
        .validate()
        .map_err(|e| CampgroundError::Validation(format!("Validation error: {}", e)))?;

    let service = CampgroundService::new(pool.get_ref().clone());
    let existing = service
        .find_by_id(id)
        .await?
        .ok_or(CampgroundError::NotFound)?;

    check_campground_ownership(user, &existing).require()?;

    // Geocode failure aborts here, leaving the record untouched.
    let geo = lookup_single_location(geocoder_client, &request.location).await?;

    // Without a new attachment the image pair is carried over unchanged.
    let (image_url, image_public_id) = match staged {
        Some(staged) => {
            media_client.destroy(&existing.image_public_id).await?;
            let replacement = media_client.upload(&staged.path).await?;
            (replacement.secure_url, replacement.public_id)
        }
        None => (existing.image_url, existing.image_public_id),
    };

    service
        .update(id, &request, &geo, &image_url, &image_public_id)
        .await
}

/// Deletes a campground. Owner-only.
///
/// Delete is atomic across asset and record, asset-first: if the remote
/// asset cannot be destroyed the record is not removed. A destroyed or
/// already-missing asset counts as destroyed, so retrying after an
/// upstream failure converges.
pub async fn delete_campground(
    pool: web::Data<PgPool>,
    media_client: web::Data<MediaStoreClient>,
    user: CurrentUser,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, CampgroundError> {
    let id = path.into_inner();
    let service = CampgroundService::new(pool.get_ref().clone());

    let campground = service
        .find_by_id(&id)
        .await?
        .ok_or(CampgroundError::NotFound)?;

    check_campground_ownership(&user, &campground).require()?;

    media_client.destroy(&campground.image_public_id).await?;
    service.delete(&id).await?;

    log::info!("Deleted campground {} ({})", campground.name, id);

    Ok(HttpResponse::Ok().json(CampgroundMessageResponse {
        message: "Campground deleted successfully!".to_string(),
        campground: None,
    }))
}

/// Resolve a location to its first geocoding match. An empty result set is
/// a validation failure, not an upstream error.
async fn lookup_single_location(
    client: &GeocoderClient,
    location: &str,
) -> Result<GeocodeResult, CampgroundError> {
    let results = client.geocode(location).await?;

    results
        .into_iter()
        .next()
        .ok_or_else(|| CampgroundError::Validation(INVALID_LOCATION.to_string()))
}
