//! End-to-end processing: PDF in, markdown / JSON / image files out.
//!
//! [`ocr_file`] drives the three-step API exchange (upload, sign, process)
//! and returns the raw [`OcrResult`]. [`process_to_dir`] additionally writes
//! the requested artefacts into a per-document output directory:
//!
//! ```text
//! <stem>_ocr_results/
//! ├── <stem>.md         (--output-format markdown | both)
//! ├── <stem>_raw.json   (--output-format json | both)
//! └── images/           (--save-images)
//! ```
//!
//! There is no partial output: any upstream failure aborts before the first
//! file is written. Markdown and JSON files are written atomically (temp
//! file + rename) so a crash never leaves a half-written document behind.

use crate::client::OcrClient;
use crate::config::{OcrConfig, OutputFormat};
use crate::error::Ocr2MdError;
use crate::images::extract_images;
use crate::normalize::{render_markdown, MarkdownOptions};
use crate::response::OcrResult;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, info};

/// Name of the image subdirectory, and the link prefix baked into the
/// markdown when images are saved.
const IMAGES_DIR_NAME: &str = "images";

/// Options for [`process_to_dir`].
#[derive(Debug, Clone, Default)]
pub struct ProcessOptions {
    /// Decode embedded images to disk and rewrite their markdown links.
    pub save_images: bool,

    /// Which result artefacts to write.
    pub format: OutputFormat,

    /// Output directory override. Default: `<stem>_ocr_results` relative to
    /// the working directory.
    pub output_dir: Option<PathBuf>,
}

/// What [`process_to_dir`] wrote, and where.
#[derive(Debug)]
pub struct ProcessSummary {
    pub output_dir: PathBuf,
    pub markdown_path: Option<PathBuf>,
    pub json_path: Option<PathBuf>,
    pub images_written: usize,
    pub page_count: usize,
    pub duration_ms: u64,
}

/// OCR a local PDF and return the raw result, writing nothing.
///
/// `include_images` asks the service to embed base64 image data in the
/// response so it can later be extracted.
pub async fn ocr_file(
    pdf_path: impl AsRef<Path>,
    config: &OcrConfig,
    include_images: bool,
) -> Result<OcrResult, Ocr2MdError> {
    let pdf_path = pdf_path.as_ref();
    let (file_name, bytes) = read_pdf(pdf_path).await?;
    let client = OcrClient::new(config.clone())?;

    let uploaded = client.upload(&file_name, bytes).await?;
    let signed_url = client.get_signed_url(&uploaded.id).await?;

    let start = Instant::now();
    let result = client.process(&signed_url, include_images).await?;
    info!(
        "OCR processing completed in {:.2}s",
        start.elapsed().as_secs_f64()
    );
    Ok(result)
}

/// OCR a local PDF and write the requested artefacts.
pub async fn process_to_dir(
    pdf_path: impl AsRef<Path>,
    config: &OcrConfig,
    options: &ProcessOptions,
) -> Result<ProcessSummary, Ocr2MdError> {
    let start = Instant::now();
    let pdf_path = pdf_path.as_ref();
    let stem = pdf_stem(pdf_path);
    let out_dir = options
        .output_dir
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("{stem}_ocr_results")));

    info!("Processing PDF: {}", pdf_path.display());
    let result = ocr_file(pdf_path, config, options.save_images).await?;

    let mut summary = write_results(&result, &stem, &out_dir, options).await?;
    summary.duration_ms = start.elapsed().as_millis() as u64;
    Ok(summary)
}

/// Write markdown / JSON / image artefacts for an already-obtained result.
///
/// Split from [`process_to_dir`] so the output layer is testable without a
/// live API.
pub(crate) async fn write_results(
    result: &OcrResult,
    stem: &str,
    out_dir: &Path,
    options: &ProcessOptions,
) -> Result<ProcessSummary, Ocr2MdError> {
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| Ocr2MdError::OutputWriteFailed {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let images_written = if options.save_images {
        extract_images(result, out_dir.join(IMAGES_DIR_NAME)).await?
    } else {
        0
    };

    let markdown_path = if options.format.wants_markdown() {
        let md_options = if options.save_images {
            MarkdownOptions::with_images(format!("./{IMAGES_DIR_NAME}"))
        } else {
            MarkdownOptions::default()
        };
        let markdown = render_markdown(result, &md_options);
        let path = out_dir.join(format!("{stem}.md"));
        write_atomic(&path, markdown.as_bytes()).await?;
        info!("Markdown content written to {}", path.display());
        Some(path)
    } else {
        None
    };

    let json_path = if options.format.wants_json() {
        // Pretty output: 2-space indent, non-ASCII preserved literally.
        let dump = serde_json::to_string_pretty(&result.to_value())
            .map_err(|e| Ocr2MdError::Internal(format!("JSON dump failed: {e}")))?;
        let path = out_dir.join(format!("{stem}_raw.json"));
        write_atomic(&path, dump.as_bytes()).await?;
        info!("Raw JSON response written to {}", path.display());
        Some(path)
    } else {
        None
    };

    Ok(ProcessSummary {
        output_dir: out_dir.to_path_buf(),
        markdown_path,
        json_path,
        images_written,
        page_count: result.pages().len(),
        duration_ms: 0,
    })
}

/// Read the PDF into memory, validating existence, readability, and the
/// `%PDF` magic bytes before any network call.
async fn read_pdf(path: &Path) -> Result<(String, Vec<u8>), Ocr2MdError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::PermissionDenied => Ocr2MdError::PermissionDenied {
            path: path.to_path_buf(),
        },
        _ => Ocr2MdError::FileNotFound {
            path: path.to_path_buf(),
        },
    })?;

    if bytes.len() < 4 || &bytes[..4] != b"%PDF" {
        let mut magic = [0u8; 4];
        let n = bytes.len().min(4);
        magic[..n].copy_from_slice(&bytes[..n]);
        return Err(Ocr2MdError::NotAPdf {
            path: path.to_path_buf(),
            magic,
        });
    }

    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document.pdf".to_string());
    debug!("Read {} bytes from {}", bytes.len(), path.display());
    Ok((file_name, bytes))
}

/// Base name for output files, derived from the input filename.
fn pdf_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string())
}

/// Atomic write: temp file in the same directory, then rename.
async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), Ocr2MdError> {
    let write_err = |source: std::io::Error| Ocr2MdError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(write_err)?;
    tokio::fs::rename(&tmp_path, path).await.map_err(write_err)
}
