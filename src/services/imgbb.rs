use async_trait::async_trait;
use serde::Deserialize;

use crate::error::PipelineError;
use crate::models::{HostedImageRef, ImageBlob};

#[derive(Debug, Deserialize)]
struct UploadResponse {
    success: bool,
    data: Option<UploadData>,
}

#[derive(Debug, Deserialize)]
struct UploadData {
    url: Option<String>,
}

/// Seam for the image-hosting backend.
#[async_trait]
pub trait ImageHost: Send + Sync {
    /// Produce a URL the vision endpoint can dereference. Infallible:
    /// hosting problems fall back to an inline data URL, because hosting is
    /// an optimization and must never block the pipeline.
    async fn host_image(&self, blob: &ImageBlob) -> HostedImageRef;
}

/// ImgBB-compatible uploader: multipart form with an `image` field, API key
/// as a query parameter.
pub struct ImgBbClient {
    api_key: Option<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl ImgBbClient {
    pub fn new(api_key: Option<String>, endpoint: impl Into<String>) -> Self {
        Self {
            api_key,
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }

    async fn try_upload(
        &self,
        blob: &ImageBlob,
        api_key: &str,
    ) -> Result<HostedImageRef, PipelineError> {
        let part = reqwest::multipart::Part::bytes(blob.bytes.clone())
            .file_name("upload")
            .mime_str(&blob.mime_type)
            .map_err(|e| PipelineError::TransportFailure(e.to_string()))?;
        let form = reqwest::multipart::Form::new().part("image", part);

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", api_key)])
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::TransportFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::TransportFailure(format!(
                "upload returned HTTP {}: {}",
                status, error_text
            )));
        }

        let parsed: UploadResponse = response
            .json()
            .await
            .map_err(|e| PipelineError::TransportFailure(e.to_string()))?;

        if !parsed.success {
            return Err(PipelineError::TransportFailure(
                "upload response reported success=false".to_string(),
            ));
        }

        parsed
            .data
            .and_then(|data| data.url)
            .map(HostedImageRef)
            .ok_or_else(|| {
                PipelineError::TransportFailure(
                    "upload response did not contain an image URL".to_string(),
                )
            })
    }
}

#[async_trait]
impl ImageHost for ImgBbClient {
    async fn host_image(&self, blob: &ImageBlob) -> HostedImageRef {
        let Some(api_key) = self.api_key.as_deref() else {
            log::info!("🖼️ No hosting key configured, using inline data URL");
            return HostedImageRef(blob.to_data_url());
        };

        log::info!("📤 Uploading image to host ({} bytes)", blob.bytes.len());
        match self.try_upload(blob, api_key).await {
            Ok(hosted) => {
                log::info!("✅ Image hosted at {}", hosted);
                hosted
            }
            Err(err) => {
                log::warn!("⚠️ {}, falling back to inline data URL", err);
                HostedImageRef(blob.to_data_url())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob() -> ImageBlob {
        ImageBlob::new(vec![0xFF, 0xD8, 0xFF, 0xE0], "image/jpeg")
    }

    #[tokio::test]
    async fn test_missing_key_returns_data_url_without_network() {
        // Unroutable endpoint: any network attempt would fail loudly, so a
        // passing test means no call was made.
        let client = ImgBbClient::new(None, "http://localhost:0/upload");
        let hosted = client.host_image(&blob()).await;

        assert!(hosted.is_data_url());
        assert_eq!(hosted.as_str(), blob().to_data_url());
    }

    #[tokio::test]
    async fn test_upload_failure_falls_back_to_data_url() {
        let client = ImgBbClient::new(Some("key123".to_string()), "http://localhost:0/upload");
        let hosted = client.host_image(&blob()).await;

        assert!(hosted.is_data_url());
        assert_eq!(hosted.as_str(), blob().to_data_url());
    }

    #[test]
    fn test_upload_response_parsing() {
        let parsed: UploadResponse =
            serde_json::from_str(r#"{"success":true,"data":{"url":"https://i.ibb.co/x/y.jpg"}}"#)
                .unwrap();
        assert!(parsed.success);
        assert_eq!(
            parsed.data.and_then(|d| d.url).as_deref(),
            Some("https://i.ibb.co/x/y.jpg")
        );

        let no_url: UploadResponse = serde_json::from_str(r#"{"success":false}"#).unwrap();
        assert!(!no_url.success);
        assert!(no_url.data.is_none());
    }
}
