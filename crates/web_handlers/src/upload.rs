use std::path::{Path, PathBuf};

use actix_multipart::Multipart;
use futures_util::TryStreamExt;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use campgrounds::{CampgroundError, CreateCampgroundRequest, UpdateCampgroundRequest};

/// File extensions accepted for campground images.
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Whether a client-supplied filename carries an allowed image extension.
/// The check is ASCII-case-insensitive and looks only at the final
/// extension, so `photo.png.zip` is rejected.
pub fn is_allowed_image(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ALLOWED_IMAGE_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// An image attachment staged to the local temp directory, awaiting upload
/// to the media store.
#[derive(Debug)]
pub struct StagedUpload {
    /// Where the staged bytes live on disk.
    pub path: PathBuf,
    /// The filename the client supplied.
    pub original_name: String,
}

impl StagedUpload {
    /// Remove the staged file. Called once the remote upload has been
    /// attempted, win or lose; a leftover temp file is logged, never fatal.
    pub async fn discard(self) {
        if let Err(err) = tokio::fs::remove_file(&self.path).await {
            log::warn!("Failed to remove staged upload {}: {}", self.path.display(), err);
        }
    }
}

/// The campground form fields as they arrive over multipart, before
/// validation.
#[derive(Debug, Default)]
pub struct CampgroundForm {
    name: Option<String>,
    price: Option<f64>,
    description: Option<String>,
    location: Option<String>,
}

impl CampgroundForm {
    /// Assemble a create request, reporting any missing field.
    pub fn into_create_request(self) -> Result<CreateCampgroundRequest, CampgroundError> {
        Ok(CreateCampgroundRequest {
            name: require_field(self.name, "name")?,
            price: require_field(self.price, "price")?,
            description: require_field(self.description, "description")?,
            location: require_field(self.location, "location")?,
        })
    }

    /// Assemble an update request, reporting any missing field.
    pub fn into_update_request(self) -> Result<UpdateCampgroundRequest, CampgroundError> {
        Ok(UpdateCampgroundRequest {
            name: require_field(self.name, "name")?,
            price: require_field(self.price, "price")?,
            description: require_field(self.description, "description")?,
            location: require_field(self.location, "location")?,
        })
    }
}

fn require_field<T>(value: Option<T>, name: &str) -> Result<T, CampgroundError> {
    value.ok_or_else(|| CampgroundError::Validation(format!("Missing form field: {}", name)))
}

/// Drain a multipart payload into the campground form fields and, when an
/// `image` file field is present, a staged upload.
///
/// The image extension is checked against the allow-list before a single
/// byte is written to disk, so a bad file type is rejected before any
/// staging or upstream call. At most one image attachment is accepted.
pub async fn parse_campground_form(
    mut payload: Multipart,
) -> Result<(CampgroundForm, Option<StagedUpload>), CampgroundError> {
    let mut form = CampgroundForm::default();
    let mut staged: Option<StagedUpload> = None;

    let result: Result<(), CampgroundError> = async {
        while let Some(mut field) = payload
            .try_next()
            .await
            .map_err(|e| CampgroundError::Validation(format!("Malformed upload: {}", e)))?
        {
            let field_name = field.name().to_string();
            match field_name.as_str() {
                "image" => {
                    if staged.is_some() {
                        return Err(CampgroundError::Validation(
                            "Only one image attachment is allowed".to_string(),
                        ));
                    }
                    staged = Some(stage_image(&mut field).await?);
                }
                "name" => form.name = Some(read_text(&mut field).await?),
                "price" => {
                    let raw = read_text(&mut field).await?;
                    let price = raw.trim().parse::<f64>().map_err(|_| {
                        CampgroundError::Validation("Price must be a number".to_string())
                    })?;
                    form.price = Some(price);
                }
                "description" => form.description = Some(read_text(&mut field).await?),
                "location" => form.location = Some(read_text(&mut field).await?),
                // Unknown fields are drained and ignored.
                _ => while field.try_next().await.unwrap_or(None).is_some() {},
            }
        }
        Ok(())
    }
    .await;

    if let Err(err) = result {
        if let Some(staged) = staged {
            staged.discard().await;
        }
        return Err(err);
    }

    Ok((form, staged))
}

async fn read_text(field: &mut actix_multipart::Field) -> Result<String, CampgroundError> {
    let mut bytes = Vec::new();
    while let Some(chunk) = field
        .try_next()
        .await
        .map_err(|e| CampgroundError::Validation(format!("Malformed upload: {}", e)))?
    {
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes)
        .map_err(|_| CampgroundError::Validation("Form fields must be UTF-8".to_string()))
}

async fn stage_image(field: &mut actix_multipart::Field) -> Result<StagedUpload, CampgroundError> {
    let original_name = field
        .content_disposition()
        .get_filename()
        .map(str::to_string)
        .ok_or_else(|| {
            CampgroundError::Validation("Image attachment is missing a filename".to_string())
        })?;

    if !is_allowed_image(&original_name) {
        return Err(CampgroundError::Validation(
            "Only image files are allowed".to_string(),
        ));
    }

    let path = std::env::temp_dir().join(staged_file_name(&original_name));
    let mut file = tokio::fs::File::create(&path).await?;

    let written: Result<(), CampgroundError> = async {
        while let Some(chunk) = field
            .try_next()
            .await
            .map_err(|e| CampgroundError::Validation(format!("Malformed upload: {}", e)))?
        {
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        Ok(())
    }
    .await;

    if let Err(err) = written {
        if let Err(cleanup_err) = tokio::fs::remove_file(&path).await {
            log::warn!("Failed to remove partial staging file {}: {}", path.display(), cleanup_err);
        }
        return Err(err);
    }

    Ok(StagedUpload {
        path,
        original_name,
    })
}

/// Collision-resistant staging name: a fresh UUID prefixed to the original
/// filename, with any client-supplied path components stripped.
fn staged_file_name(original_name: &str) -> String {
    let basename = original_name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(original_name);

    format!("{}-{}", Uuid::new_v4(), basename)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_extensions_case_insensitive() {
        assert!(is_allowed_image("photo.jpg"));
        assert!(is_allowed_image("photo.JPG"));
        assert!(is_allowed_image("photo.JpEg"));
        assert!(is_allowed_image("photo.png"));
        assert!(is_allowed_image("photo.gif"));
    }

    #[test]
    fn test_disallowed_extensions_rejected() {
        assert!(!is_allowed_image("document.pdf"));
        assert!(!is_allowed_image("archive.zip"));
        assert!(!is_allowed_image("noextension"));
        assert!(!is_allowed_image("photo.jpg.exe"));
        assert!(!is_allowed_image(""));
    }

    #[test]
    fn test_staged_names_are_collision_resistant() {
        let a = staged_file_name("photo.jpg");
        let b = staged_file_name("photo.jpg");

        assert_ne!(a, b);
        assert!(a.ends_with("photo.jpg"));
    }

    #[test]
    fn test_staged_names_strip_path_components() {
        let name = staged_file_name("../../etc/passwd.png");
        assert!(name.ends_with("passwd.png"));
        assert!(!name.contains('/'));

        let windows = staged_file_name("C:\\Users\\me\\photo.gif");
        assert!(windows.ends_with("photo.gif"));
        assert!(!windows.contains('\\'));
    }

    #[test]
    fn test_missing_form_field_reported_by_name() {
        let form = CampgroundForm {
            name: Some("Pine Ridge".to_string()),
            price: Some(10.0),
            description: Some("quiet".to_string()),
            location: None,
        };

        let err = form.into_create_request().unwrap_err();
        assert!(matches!(err, CampgroundError::Validation(ref msg) if msg.contains("location")));
    }
}
