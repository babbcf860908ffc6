use serde::Deserialize;
use tracing::{debug, warn};

/// Errors returned by the geocoding client.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The client could not be constructed or configured.
    #[error("Geocoder configuration error: {0}")]
    Config(String),

    /// The request failed at the transport level.
    #[error("Geocoding request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with a non-OK status.
    #[error("Geocoding API error: {0}")]
    Api(String),
}

/// One geocoding match: coordinates plus the normalized address string.
///
/// The three fields are produced together by a single lookup; callers persist
/// them together or not at all.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Latitude in decimal degrees.
    pub latitude: f64,
    /// Longitude in decimal degrees.
    pub longitude: f64,
    /// Normalized formatted address, e.g. "Yosemite National Park, CA, USA".
    pub formatted_address: String,
}

/// Response structure from the Google Maps Geocoding API.
#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    error_message: Option<String>,
    #[serde(default)]
    results: Vec<GeocodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeocodeEntry {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Client for the Google Maps Geocoding API.
pub struct GeocoderClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GeocoderClient {
    /// Create a new geocoding client with an explicit API key.
    pub fn new(api_key: String) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| GeocodeError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: "https://maps.googleapis.com/maps/api/geocode".to_string(),
            api_key,
        })
    }

    /// Create a client configured from the `GEOCODER_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, GeocodeError> {
        let api_key = std::env::var("GEOCODER_API_KEY").map_err(|_| {
            GeocodeError::Config("GEOCODER_API_KEY environment variable not set".to_string())
        })?;

        Self::new(api_key)
    }

    /// Resolve a free-text location into zero or more geocoding matches.
    ///
    /// An unknown location is not an error: the API reports `ZERO_RESULTS`
    /// and this method returns an empty vector. Any other non-OK status is
    /// surfaced as [`GeocodeError::Api`]. A single attempt is made, no retry.
    pub async fn geocode(&self, address: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        debug!("Geocoding location: {}", address);

        let url = format!(
            "{}/json?address={}&key={}",
            self.base_url,
            urlencoding::encode(address),
            self.api_key
        );

        let response: GeocodeResponse = self.client.get(&url).send().await?.json().await?;

        match response.status.as_str() {
            "OK" => Ok(parse_results(response.results)),
            "ZERO_RESULTS" => {
                debug!("No geocoding matches for: {}", address);
                Ok(Vec::new())
            }
            status => {
                warn!("Geocoding API returned status {}: {:?}", status, response.error_message);
                Err(GeocodeError::Api(match response.error_message {
                    Some(message) => format!("{}: {}", status, message),
                    None => status.to_string(),
                }))
            }
        }
    }
}

fn parse_results(entries: Vec<GeocodeEntry>) -> Vec<GeocodeResult> {
    entries
        .into_iter()
        .map(|entry| GeocodeResult {
            latitude: entry.geometry.location.lat,
            longitude: entry.geometry.location.lng,
            formatted_address: entry.formatted_address,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(body: &str) -> GeocodeResponse {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_parse_single_match() {
        let response = parse(
            r#"{
                "status": "OK",
                "results": [
                    {
                        "formatted_address": "Yosemite National Park, CA, USA",
                        "geometry": { "location": { "lat": 37.8651, "lng": -119.5383 } }
                    }
                ]
            }"#,
        );

        let results = parse_results(response.results);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].formatted_address, "Yosemite National Park, CA, USA");
        assert_eq!(results[0].latitude, 37.8651);
        assert_eq!(results[0].longitude, -119.5383);
    }

    #[test]
    fn test_parse_zero_results() {
        let response = parse(r#"{ "status": "ZERO_RESULTS", "results": [] }"#);

        assert_eq!(response.status, "ZERO_RESULTS");
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_parse_error_status_without_results_field() {
        // The API omits "results" entirely on some error statuses.
        let response =
            parse(r#"{ "status": "REQUEST_DENIED", "error_message": "The provided API key is invalid." }"#);

        assert_eq!(response.status, "REQUEST_DENIED");
        assert_eq!(
            response.error_message.as_deref(),
            Some("The provided API key is invalid.")
        );
        assert!(response.results.is_empty());
    }

    #[test]
    fn test_client_creation() {
        let client = GeocoderClient::new("test-key".to_string()).unwrap();
        assert_eq!(client.base_url, "https://maps.googleapis.com/maps/api/geocode");
    }
}
