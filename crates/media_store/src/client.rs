use std::path::Path;

use serde::Deserialize;
use tracing::{debug, warn};

/// Errors returned by the media store client.
#[derive(Debug, thiserror::Error)]
pub enum MediaStoreError {
    /// The client could not be constructed or configured.
    #[error("Media store configuration error: {0}")]
    Config(String),

    /// The staged file could not be read from disk.
    #[error("Failed to read staged file: {0}")]
    Io(#[from] std::io::Error),

    /// The request failed at the transport level.
    #[error("Media store request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API refused the operation.
    #[error("Media store rejected the request: {0}")]
    Rejected(String),
}

/// A successfully uploaded image asset.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedAsset {
    /// Public HTTPS URL serving the image.
    pub secure_url: String,
    /// Opaque identifier, required to destroy the asset later.
    pub public_id: String,
}

/// Response structure from the destroy endpoint.
#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Client for a Cloudinary-compatible image hosting API.
pub struct MediaStoreClient {
    client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

impl MediaStoreClient {
    /// Create a new media store client with explicit credentials.
    pub fn new(
        cloud_name: String,
        api_key: String,
        api_secret: String,
    ) -> Result<Self, MediaStoreError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| {
                MediaStoreError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            client,
            base_url: "https://api.cloudinary.com/v1_1".to_string(),
            cloud_name,
            api_key,
            api_secret,
        })
    }

    /// Create a client configured from the `MEDIA_CLOUD_NAME`, `MEDIA_API_KEY`
    /// and `MEDIA_API_SECRET` environment variables.
    pub fn from_env() -> Result<Self, MediaStoreError> {
        let cloud_name = std::env::var("MEDIA_CLOUD_NAME").map_err(|_| {
            MediaStoreError::Config("MEDIA_CLOUD_NAME environment variable not set".to_string())
        })?;
        let api_key = std::env::var("MEDIA_API_KEY").map_err(|_| {
            MediaStoreError::Config("MEDIA_API_KEY environment variable not set".to_string())
        })?;
        let api_secret = std::env::var("MEDIA_API_SECRET").map_err(|_| {
            MediaStoreError::Config("MEDIA_API_SECRET environment variable not set".to_string())
        })?;

        Self::new(cloud_name, api_key, api_secret)
    }

    /// Upload a staged image file, returning its public URL and asset id.
    ///
    /// A single attempt is made, no retry. The staged file is left on disk;
    /// cleanup is the caller's concern.
    pub async fn upload(&self, path: &Path) -> Result<UploadedAsset, MediaStoreError> {
        debug!("Uploading image from {}", path.display());

        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let bytes = tokio::fs::read(path).await?;

        let form = reqwest::multipart::Form::new()
            .part("file", reqwest::multipart::Part::bytes(bytes).file_name(file_name));

        let response = self
            .client
            .post(format!("{}/{}/image/upload", self.base_url, self.cloud_name))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            warn!("Image upload failed with status {}: {}", status, body);
            return Err(MediaStoreError::Rejected(format!(
                "upload failed with status {}",
                status
            )));
        }

        let asset: UploadedAsset = response.json().await?;
        debug!("Uploaded image as asset {}", asset.public_id);

        Ok(asset)
    }

    /// Destroy a previously uploaded asset by its public id.
    ///
    /// Destroying an asset that no longer exists succeeds, so a failed
    /// campground deletion can be retried after the upstream recovers.
    pub async fn destroy(&self, public_id: &str) -> Result<(), MediaStoreError> {
        debug!("Destroying asset {}", public_id);

        let response = self
            .client
            .post(format!("{}/{}/image/destroy", self.base_url, self.cloud_name))
            .basic_auth(&self.api_key, Some(&self.api_secret))
            .form(&[("public_id", public_id)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!("Asset destroy failed with status {}", status);
            return Err(MediaStoreError::Rejected(format!(
                "destroy failed with status {}",
                status
            )));
        }

        let destroy: DestroyResponse = response.json().await?;
        destroy_outcome(&destroy.result)
    }
}

/// Map a destroy `result` field to success or failure. `"not found"` counts
/// as success: the asset is gone either way.
fn destroy_outcome(result: &str) -> Result<(), MediaStoreError> {
    match result {
        "ok" | "not found" => Ok(()),
        other => Err(MediaStoreError::Rejected(format!(
            "destroy returned \"{}\"",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_upload_response() {
        let asset: UploadedAsset = serde_json::from_str(
            r#"{
                "public_id": "campgrounds/pine-ridge-x7f2",
                "secure_url": "https://res.cloudinary.com/demo/image/upload/v1/campgrounds/pine-ridge-x7f2.jpg",
                "width": 1280,
                "height": 720,
                "format": "jpg"
            }"#,
        )
        .unwrap();

        assert_eq!(asset.public_id, "campgrounds/pine-ridge-x7f2");
        assert!(asset.secure_url.starts_with("https://"));
    }

    #[test]
    fn test_destroy_outcome_ok() {
        assert!(destroy_outcome("ok").is_ok());
    }

    #[test]
    fn test_destroy_outcome_missing_asset_is_success() {
        // Retrying a failed delete must succeed once the asset is gone.
        assert!(destroy_outcome("not found").is_ok());
    }

    #[test]
    fn test_destroy_outcome_rejection() {
        let err = destroy_outcome("error").unwrap_err();
        assert!(matches!(err, MediaStoreError::Rejected(_)));
    }

    #[test]
    fn test_client_creation() {
        let client = MediaStoreClient::new(
            "demo".to_string(),
            "key".to_string(),
            "secret".to_string(),
        )
        .unwrap();
        assert_eq!(client.base_url, "https://api.cloudinary.com/v1_1");
    }
}
