//! Image hosting for CMS uploads (ImageKit).

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// Folder every CMS upload lands in.
pub const UPLOAD_FOLDER: &str = "/cms";

#[derive(Debug, Clone)]
pub struct MediaConfig {
    pub private_key: Option<String>,
    pub upload_url: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self {
            private_key: None,
            upload_url: "https://upload.imagekit.io/api/v1/files/upload".into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub url: String,
    pub file_id: String,
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("image host is not configured")]
    NotConfigured,

    #[error("image host transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("image host rejected upload ({status}): {body}")]
    Rejected { status: u16, body: String },
}

#[async_trait]
pub trait ImageHost: Send + Sync {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, MediaError>;
}

pub fn from_config(config: &MediaConfig) -> Arc<dyn ImageHost> {
    match &config.private_key {
        Some(key) => Arc::new(ImageKit::new(key.clone(), config.upload_url.clone())),
        None => {
            warn!("IMAGEKIT_PRIVATE_KEY not set, uploads are disabled");
            Arc::new(DisabledImageHost)
        }
    }
}

pub struct ImageKit {
    client: reqwest::Client,
    private_key: String,
    upload_url: String,
}

impl ImageKit {
    pub fn new(private_key: String, upload_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            private_key,
            upload_url,
        }
    }
}

#[async_trait]
impl ImageHost for ImageKit {
    async fn upload(&self, file: UploadFile) -> Result<UploadedImage, MediaError> {
        let mut part = Part::bytes(file.bytes).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type)?;
        }

        let form = Form::new()
            .part("file", part)
            .text("fileName", file.file_name)
            .text("folder", UPLOAD_FOLDER);

        // ImageKit authenticates with the private key as the basic-auth
        // username and an empty password.
        let response = self
            .client
            .post(&self.upload_url)
            .basic_auth(&self.private_key, Some(""))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MediaError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<UploadedImage>().await?)
    }
}

pub struct DisabledImageHost;

#[async_trait]
impl ImageHost for DisabledImageHost {
    async fn upload(&self, _file: UploadFile) -> Result<UploadedImage, MediaError> {
        Err(MediaError::NotConfigured)
    }
}
