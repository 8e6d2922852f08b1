//! # ocr2md
//!
//! OCR PDF documents to Markdown using the Mistral OCR API.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Read      load local file, validate %PDF magic bytes
//!  ├─ 2. Upload    multipart POST to the files endpoint (purpose=ocr)
//!  ├─ 3. Sign      fetch a time-limited signed URL for the upload
//!  ├─ 4. OCR       POST /v1/ocr pointing the model at the signed URL
//!  ├─ 5. Normalise adapt whichever response shape arrived to Page values
//!  └─ 6. Output    assembled Markdown + optional images + raw JSON dump
//! ```
//!
//! Steps 1–4 are plumbing around the remote service; the part worth reading
//! is step 5, in [`response`]: the API has delivered results in three
//! different shapes across client generations, and the [`response::OcrResult`]
//! adapter tags the shape once at the boundary so everything downstream sees
//! a single normalised [`response::Page`] type.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ocr2md::{ocr_file, render_markdown, MarkdownOptions, OcrConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Credential read from MISTRAL_API_KEY
//!     let config = OcrConfig::from_env()?;
//!     let result = ocr_file("document.pdf", &config, false).await?;
//!     let markdown = render_markdown(&result, &MarkdownOptions::default());
//!     println!("{markdown}");
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `ocr2md` binary (clap + anyhow + indicatif + dotenvy) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! ocr2md = { version = "0.3", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod client;
pub mod config;
pub mod error;
pub mod images;
pub mod normalize;
pub mod process;
pub mod response;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use client::{OcrClient, UploadedFile};
pub use config::{OcrConfig, OutputFormat};
pub use error::Ocr2MdError;
pub use images::{decode_images, extract_images};
pub use normalize::{render_markdown, render_pages, MarkdownOptions};
pub use process::{ocr_file, process_to_dir, ProcessOptions, ProcessSummary};
pub use response::{ImageRef, OcrResponse, OcrResult, Page};
