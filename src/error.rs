//! Error types for the ocr2md library.
//!
//! Every fatal failure surfaces as an [`Ocr2MdError`] from the top-level
//! entry points. There is deliberately no "page error" tier: the Mistral OCR
//! API returns the whole document in one response, so there is nothing to
//! partially recover — if the upstream call fails, no output is produced.
//!
//! One failure class is intentionally *not* an error: a response whose shape
//! is not recognised by [`crate::response::OcrResult`] normalises to an empty
//! document instead of failing. See [`crate::response`] for the rationale.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the ocr2md library.
#[derive(Debug, Error)]
pub enum Ocr2MdError {
    // ── Configuration errors ─────────────────────────────────────────────
    /// The API credential is missing. Raised before any I/O happens.
    #[error("Environment variable {var} is not set.\nGet an API key at https://console.mistral.ai and run: export {var}=...")]
    MissingApiKey { var: String },

    /// A configuration value failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Input errors ─────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── Upstream API errors ──────────────────────────────────────────────
    /// Uploading the PDF to the files endpoint failed.
    #[error("Failed to upload '{file_name}' to the Mistral files API: {reason}")]
    UploadFailed { file_name: String, reason: String },

    /// The signed-URL request for an uploaded file failed.
    #[error("Failed to get a signed URL for uploaded file '{file_id}': {reason}")]
    SignedUrlFailed { file_id: String, reason: String },

    /// The OCR processing call itself failed.
    #[error("OCR processing failed (model '{model}'): {reason}")]
    OcrFailed { model: String, reason: String },

    // ── Response content errors ──────────────────────────────────────────
    /// An embedded image carried base64 data that does not decode.
    #[error("Image '{id}' in the OCR response is not valid base64: {source}")]
    ImageDecodeFailed {
        id: String,
        #[source]
        source: base64::DecodeError,
    },

    // ── I/O errors ───────────────────────────────────────────────────────
    /// Could not create or write an output file.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Catch-all ────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}
