use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::debug;

use super::config::MediaConfig;
use super::error::MediaError;
use super::signature::api_sign_request;
use super::traits::{
    DestroyOutcome, MediaStore, ResourceType, UploadCredentials, UploadRequest, UploadedAsset,
};

/// Media store backed by the Cloudinary upload API.
pub struct CloudinaryStore {
    client: reqwest::Client,
    config: MediaConfig,
}

#[derive(Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: ErrorDetail,
}

#[derive(Deserialize)]
struct ErrorDetail {
    message: String,
}

impl CloudinaryStore {
    pub fn new(config: MediaConfig) -> Result<Self, MediaError> {
        if config.cloud_name.trim().is_empty() {
            return Err(MediaError::Config("cloud_name must be set".into()));
        }
        if config.api_key.trim().is_empty() || config.api_secret.trim().is_empty() {
            return Err(MediaError::Config(
                "api_key and api_secret must be set".into(),
            ));
        }
        Ok(Self {
            client: reqwest::Client::new(),
            config,
        })
    }

    fn endpoint(&self, resource_type: ResourceType, action: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            action
        )
    }

    /// Sign `params` and return them with `api_key` and `signature` appended.
    fn signed_params(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = api_sign_request(
            &params,
            &self.config.api_secret,
            self.config.signature_algorithm,
        );
        params.push(("api_key", self.config.api_key.clone()));
        params.push(("signature", signature));
        params
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, MediaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorResponse>(&text)
            .map(|e| e.error.message)
            .unwrap_or(text);
        Err(MediaError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl MediaStore for CloudinaryStore {
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, MediaError> {
        if request.bytes.len() > self.config.max_upload_size {
            return Err(MediaError::SizeLimitExceeded {
                actual: request.bytes.len(),
                limit: self.config.max_upload_size,
            });
        }

        let params = self.signed_params(vec![
            ("folder", request.folder.clone()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let mut part = Part::bytes(request.bytes).file_name(request.filename.clone());
        if let Some(content_type) = request.content_type.as_deref() {
            part = part.mime_str(content_type)?;
        }
        let mut form = Form::new().part("file", part);
        for (key, value) in params {
            form = form.text(key, value);
        }

        let response = self
            .client
            .post(self.endpoint(request.resource_type, "upload"))
            .multipart(form)
            .send()
            .await?;
        let body: UploadResponse = Self::check_status(response).await?.json().await?;

        debug!(public_id = %body.public_id, filename = %request.filename, "Uploaded asset");

        Ok(UploadedAsset {
            public_id: body.public_id,
            secure_url: body.secure_url,
            resource_type: request.resource_type,
        })
    }

    async fn destroy(
        &self,
        public_id: &str,
        resource_type: ResourceType,
    ) -> Result<DestroyOutcome, MediaError> {
        let params = self.signed_params(vec![
            ("invalidate", "true".to_string()),
            ("public_id", public_id.to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ]);

        let response = self
            .client
            .post(self.endpoint(resource_type, "destroy"))
            .form(&params)
            .send()
            .await?;
        let body: DestroyResponse = Self::check_status(response).await?.json().await?;

        match body.result.as_str() {
            "ok" => Ok(DestroyOutcome::Deleted),
            "not found" => Ok(DestroyOutcome::NotFound),
            other => Err(MediaError::InvalidResponse(format!(
                "unexpected destroy result '{other}'"
            ))),
        }
    }

    fn delivery_url(&self, path: &str, resource_type: ResourceType) -> String {
        format!(
            "{}/{}/{}/upload/{}",
            self.config.delivery_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            resource_type,
            path.trim_start_matches('/')
        )
    }

    fn sign_upload(&self, folder: &str, timestamp: i64) -> String {
        api_sign_request(
            &[("folder", folder.to_string()), ("timestamp", timestamp.to_string())],
            &self.config.api_secret,
            self.config.signature_algorithm,
        )
    }

    fn credentials(&self) -> UploadCredentials {
        UploadCredentials {
            api_key: self.config.api_key.clone(),
            cloud_name: self.config.cloud_name.clone(),
        }
    }
}
