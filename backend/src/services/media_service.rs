//! Media host collaborator contract.
//!
//! Video files, thumbnails, and avatars live on an external media host.
//! The core only needs one operation from it: take a server-local file and
//! return the hosted URL plus the duration when the host can measure one.
//! Everything about the host itself (CDN, transcoding, retention) is its
//! own business.

use crate::config::Config;
use crate::errors::{ServiceError, ServiceResult};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::Path;

/// Result of a successful upload.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaAsset {
    /// Publicly reachable URL of the stored file.
    pub url: String,
    /// Media duration in seconds, when the host reports one (video/audio).
    pub duration_seconds: Option<f64>,
}

/// Upload contract for the external media host.
#[async_trait]
pub trait MediaHost: Send + Sync {
    async fn upload(&self, local_path: &Path) -> ServiceResult<MediaAsset>;
}

/// Media host reachable over HTTP: the file is posted as multipart form
/// data and the host answers with the asset description.
pub struct HttpMediaHost {
    client: reqwest::Client,
    upload_url: String,
}

impl HttpMediaHost {
    pub fn new(config: &Config) -> Self {
        HttpMediaHost {
            client: reqwest::Client::new(),
            upload_url: config.media_upload_url.clone(),
        }
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, local_path: &Path) -> ServiceResult<MediaAsset> {
        let bytes = tokio::fs::read(local_path).await.map_err(|_| {
            ServiceError::validation(format!(
                "Media file not readable: {}",
                local_path.display()
            ))
        })?;

        let file_name = local_path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());

        let part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(&self.upload_url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ServiceError::external_service(format!("Media upload failed: {e}")))?;

        if !response.status().is_success() {
            return Err(ServiceError::external_service(format!(
                "Media host returned {}",
                response.status()
            )));
        }

        response
            .json::<MediaAsset>()
            .await
            .map_err(|e| ServiceError::external_service(format!("Bad media host response: {e}")))
    }
}
