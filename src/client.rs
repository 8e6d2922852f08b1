//! HTTP client for the Mistral OCR REST API.
//!
//! Three calls, always in the same order:
//!
//! 1. [`OcrClient::upload`] — multipart `POST /v1/files` with `purpose=ocr`
//! 2. [`OcrClient::get_signed_url`] — `GET /v1/files/{id}/url`, a
//!    time-limited URL the OCR endpoint can read the upload through
//! 3. [`OcrClient::process`] — `POST /v1/ocr` pointing the model at the
//!    signed URL
//!
//! The OCR response body is parsed as raw JSON and handed to
//! [`OcrResult::from_value`] rather than deserialised strictly: the adapter
//! absorbs shape drift between API client generations, so an upstream schema
//! change degrades gracefully instead of failing the run. Failures are not
//! retried — each maps to its stage-specific [`Ocr2MdError`] variant and
//! propagates to the top level.

use crate::config::OcrConfig;
use crate::error::Ocr2MdError;
use crate::response::OcrResult;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::{debug, info};

/// Handle for a file uploaded to the files endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    /// Server-assigned file id, used for the signed-URL request.
    pub id: String,

    /// Filename as stored by the server.
    #[serde(default)]
    pub filename: Option<String>,

    /// Upload size in bytes, when reported.
    #[serde(default, rename = "bytes")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SignedUrl {
    url: String,
}

/// Client for the Mistral files + OCR endpoints.
#[derive(Debug)]
pub struct OcrClient {
    http: reqwest::Client,
    config: OcrConfig,
}

impl OcrClient {
    /// Build a client from the given configuration.
    pub fn new(config: OcrConfig) -> Result<Self, Ocr2MdError> {
        if config.api_key.is_empty() {
            return Err(Ocr2MdError::MissingApiKey {
                var: crate::config::API_KEY_VAR.to_string(),
            });
        }
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Ocr2MdError::Internal(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { http, config })
    }

    /// The configured model identifier.
    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Upload PDF bytes for OCR processing and return the file handle.
    pub async fn upload(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadedFile, Ocr2MdError> {
        let url = endpoint(&self.config.base_url, "/v1/files");
        info!("Uploading '{}' ({} bytes) to {}", file_name, bytes.len(), url);

        let part = reqwest::multipart::Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str("application/pdf")
            .map_err(|e| Ocr2MdError::Internal(format!("multipart: {e}")))?;
        let form = reqwest::multipart::Form::new()
            .text("purpose", "ocr")
            .part("file", part);

        let upload_err = |reason: String| Ocr2MdError::UploadFailed {
            file_name: file_name.to_string(),
            reason,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| upload_err(e.to_string()))?;
        let response = check_status(response).await.map_err(upload_err)?;

        let uploaded: UploadedFile = response
            .json()
            .await
            .map_err(|e| upload_err(format!("unexpected response body: {e}")))?;
        debug!("Uploaded as file id '{}'", uploaded.id);
        Ok(uploaded)
    }

    /// Get a time-limited signed URL for an uploaded file.
    pub async fn get_signed_url(&self, file_id: &str) -> Result<String, Ocr2MdError> {
        let url = endpoint(&self.config.base_url, &format!("/v1/files/{file_id}/url"));
        debug!("Requesting signed URL for '{}'", file_id);

        let sign_err = |reason: String| Ocr2MdError::SignedUrlFailed {
            file_id: file_id.to_string(),
            reason,
        };

        let response = self
            .http
            .get(url)
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| sign_err(e.to_string()))?;
        let response = check_status(response).await.map_err(sign_err)?;

        let signed: SignedUrl = response
            .json()
            .await
            .map_err(|e| sign_err(format!("unexpected response body: {e}")))?;
        Ok(signed.url)
    }

    /// Run OCR on the document behind `document_url`.
    ///
    /// `include_image_base64` asks the service to embed image bytes in the
    /// response, which the caller can later persist via
    /// [`crate::images::extract_images`].
    pub async fn process(
        &self,
        document_url: &str,
        include_image_base64: bool,
    ) -> Result<OcrResult, Ocr2MdError> {
        let url = endpoint(&self.config.base_url, "/v1/ocr");
        let body = ocr_request_body(&self.config.model, document_url, include_image_base64);
        info!("Running OCR with model '{}'", self.config.model);

        let ocr_err = |reason: String| Ocr2MdError::OcrFailed {
            model: self.config.model.clone(),
            reason,
        };

        let response = self
            .http
            .post(url)
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ocr_err(e.to_string()))?;
        let response = check_status(response).await.map_err(ocr_err)?;

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ocr_err(format!("response is not JSON: {e}")))?;
        Ok(OcrResult::from_value(raw))
    }
}

/// Join the base URL and an absolute API path.
fn endpoint(base_url: &str, path: &str) -> String {
    format!("{}{}", base_url.trim_end_matches('/'), path)
}

/// Request body for the `/v1/ocr` endpoint.
fn ocr_request_body(model: &str, document_url: &str, include_image_base64: bool) -> Value {
    json!({
        "model": model,
        "document": {
            "type": "document_url",
            "document_url": document_url,
        },
        "include_image_base64": include_image_base64,
    })
}

/// Turn a non-2xx response into an error string carrying status and body.
async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, String> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let body = body.trim();
    if body.is_empty() {
        Err(format!("HTTP {status}"))
    } else {
        Err(format!("HTTP {status}: {body}"))
    }
}
