use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use geocoder::GeocodeResult;
use media_store::UploadedAsset;

use crate::types::*;

/// Repository for campground records.
pub struct CampgroundService {
    pool: PgPool,
}

impl CampgroundService {
    /// Creates a new instance of `CampgroundService` with the provided
    /// database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Persists a new campground assembled from the validated request, the
    /// uploaded image and the geocode result. The image pair and the
    /// geocode triple are written atomically in the single INSERT.
    pub async fn create(
        &self,
        author: &CampgroundAuthor,
        request: &CreateCampgroundRequest,
        image: &UploadedAsset,
        geo: &GeocodeResult,
    ) -> Result<Campground, CampgroundError> {
        let row = sqlx::query(
            r#"
            INSERT INTO campgrounds (
                name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING
                id, name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username, created_at, updated_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.price)
        .bind(request.description.trim())
        .bind(&image.secure_url)
        .bind(&image.public_id)
        .bind(&geo.formatted_address)
        .bind(geo.latitude)
        .bind(geo.longitude)
        .bind(author.id)
        .bind(&author.username)
        .fetch_one(&self.pool)
        .await?;

        Ok(campground_from_row(&row))
    }

    /// Fetches a campground by id, `None` if it does not exist.
    pub async fn find_by_id(&self, id: &Uuid) -> Result<Option<Campground>, CampgroundError> {
        let row = sqlx::query(
            r#"
            SELECT
                id, name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username, created_at, updated_at
            FROM campgrounds
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(campground_from_row))
    }

    /// Fetches a campground by id with its comment sequence populated,
    /// oldest comment first.
    pub async fn find_by_id_with_comments(
        &self,
        id: &Uuid,
    ) -> Result<Option<CampgroundWithComments>, CampgroundError> {
        let Some(campground) = self.find_by_id(id).await? else {
            return Ok(None);
        };

        let rows = sqlx::query(
            r#"
            SELECT id, text, author_username, created_at
            FROM comments
            WHERE campground_id = $1
            ORDER BY created_at
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let comments = rows
            .iter()
            .map(|row| Comment {
                id: row.get("id"),
                text: row.get("text"),
                author_username: row.get("author_username"),
                created_at: row.get("created_at"),
            })
            .collect();

        Ok(Some(CampgroundWithComments {
            campground,
            comments,
        }))
    }

    /// Fetches all campgrounds, newest first.
    pub async fn find_all(&self) -> Result<Vec<Campground>, CampgroundError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username, created_at, updated_at
            FROM campgrounds
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Fetches campgrounds whose name contains the query as a literal,
    /// case-insensitive substring. Regex metacharacters in the query match
    /// only themselves.
    pub async fn search_by_name(&self, query: &str) -> Result<Vec<Campground>, CampgroundError> {
        let rows = sqlx::query(
            r#"
            SELECT
                id, name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username, created_at, updated_at
            FROM campgrounds
            WHERE name ~* $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(name_search_pattern(query))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(campground_from_row).collect())
    }

    /// Overwrites the mutable fields of a campground: name, description,
    /// price, the geocode triple, and the image pair (either the existing
    /// pair or its replacement). One UPDATE, so no intermediate state is
    /// ever persisted. The author columns are never touched.
    pub async fn update(
        &self,
        id: &Uuid,
        request: &UpdateCampgroundRequest,
        geo: &GeocodeResult,
        image_url: &str,
        image_public_id: &str,
    ) -> Result<Campground, CampgroundError> {
        let row = sqlx::query(
            r#"
            UPDATE campgrounds
            SET name = $1,
                price = $2,
                description = $3,
                image_url = $4,
                image_public_id = $5,
                location = $6,
                lat = $7,
                lng = $8,
                updated_at = NOW()
            WHERE id = $9
            RETURNING
                id, name, price, description, image_url, image_public_id,
                location, lat, lng, author_id, author_username, created_at, updated_at
            "#,
        )
        .bind(request.name.trim())
        .bind(request.price)
        .bind(request.description.trim())
        .bind(image_url)
        .bind(image_public_id)
        .bind(&geo.formatted_address)
        .bind(geo.latitude)
        .bind(geo.longitude)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(CampgroundError::NotFound)?;

        Ok(campground_from_row(&row))
    }

    /// Removes a campground record. Its comments cascade away with it.
    pub async fn delete(&self, id: &Uuid) -> Result<(), CampgroundError> {
        sqlx::query("DELETE FROM campgrounds WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// Build the pattern for a case-insensitive literal substring search. All
/// regex metacharacters are escaped so the query text matches verbatim.
pub fn name_search_pattern(query: &str) -> String {
    regex::escape(query)
}

fn campground_from_row(row: &PgRow) -> Campground {
    Campground {
        id: row.get("id"),
        name: row.get("name"),
        price: row.get("price"),
        description: row.get("description"),
        image_url: row.get("image_url"),
        image_public_id: row.get("image_public_id"),
        location: row.get("location"),
        lat: row.get("lat"),
        lng: row.get("lng"),
        author: CampgroundAuthor {
            id: row.get("author_id"),
            username: row.get("author_username"),
        },
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_pattern_escapes_metacharacters() {
        let pattern = name_search_pattern("A+B");
        let re = regex::RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .unwrap();

        assert!(re.is_match("A+B Ranch"));
        assert!(!re.is_match("AB Ranch"));
        assert!(!re.is_match("AAB Ranch"));
    }

    #[test]
    fn test_search_pattern_is_case_insensitive_substring() {
        let pattern = name_search_pattern("pine");
        let re = regex::RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .unwrap();

        assert!(re.is_match("Pine Ridge"));
        assert!(re.is_match("ALPINE MEADOW"));
        assert!(!re.is_match("Cedar Grove"));
    }

    #[test]
    fn test_search_pattern_plain_text_unchanged() {
        assert_eq!(name_search_pattern("Pine Ridge"), "Pine Ridge");
    }

    #[test]
    fn test_search_pattern_neutralizes_wildcards() {
        // ".*" must not become match-everything.
        let pattern = name_search_pattern(".*");
        let re = regex::Regex::new(&pattern).unwrap();

        assert!(re.is_match("a .* b"));
        assert!(!re.is_match("anything at all"));
    }
}
