//! Image extraction: decode embedded base64 images and write them to disk.
//!
//! Image refs arrive inline in the OCR response (see
//! [`crate::response::ImageRef`]). Two granularities are exposed:
//! [`decode_images`] returns `(filename, bytes)` pairs for callers that want
//! the buffers, and [`extract_images`] writes them eagerly under an output
//! directory and returns the count — the CLI uses the latter.

use crate::error::Ocr2MdError;
use crate::response::OcrResult;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::Path;
use tracing::{debug, info};

/// Decode every embedded image into `(filename, bytes)` pairs.
///
/// Pairs are ordered by page, then by occurrence within the page. Image refs
/// without base64 data are skipped — they are placeholders only. Invalid
/// base64 is an error naming the offending image.
pub fn decode_images(result: &OcrResult) -> Result<Vec<(String, Vec<u8>)>, Ocr2MdError> {
    let mut decoded = Vec::new();

    for page in result.pages() {
        for img in &page.images {
            let Some(data) = img.image_base64.as_deref().filter(|d| !d.is_empty()) else {
                continue;
            };
            let bytes = STANDARD
                .decode(strip_data_uri(data))
                .map_err(|source| Ocr2MdError::ImageDecodeFailed {
                    id: img.id.clone(),
                    source,
                })?;
            debug!("Decoded image '{}' ({} bytes)", img.id, bytes.len());
            decoded.push((img.id.clone(), bytes));
        }
    }

    Ok(decoded)
}

/// Decode every embedded image and write each under `out_dir`, named by its
/// image id. The directory is created if absent. Returns the number of
/// images written; zero is a valid, non-error outcome.
pub async fn extract_images(
    result: &OcrResult,
    out_dir: impl AsRef<Path>,
) -> Result<usize, Ocr2MdError> {
    let out_dir = out_dir.as_ref();
    tokio::fs::create_dir_all(out_dir)
        .await
        .map_err(|source| Ocr2MdError::OutputWriteFailed {
            path: out_dir.to_path_buf(),
            source,
        })?;

    let decoded = decode_images(result)?;
    let count = decoded.len();

    for (name, bytes) in decoded {
        let path = out_dir.join(&name);
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| Ocr2MdError::OutputWriteFailed {
                path: path.clone(),
                source,
            })?;
        debug!("Saved image: {}", path.display());
    }

    if count > 0 {
        info!("Saved {} images to {}", count, out_dir.display());
    } else {
        info!("No images found in OCR results");
    }

    Ok(count)
}

/// Some client builds prefix the payload with a `data:image/...;base64,`
/// header; the decoder wants only the payload.
fn strip_data_uri(data: &str) -> &str {
    match data.split_once(";base64,") {
        Some((prefix, payload)) if prefix.starts_with("data:") => payload,
        _ => data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ImageRef, OcrResponse, Page};
    use tempfile::TempDir;

    fn result_with_images(images: Vec<ImageRef>) -> OcrResult {
        OcrResult::from(OcrResponse {
            pages: vec![Page {
                markdown: "page".into(),
                images,
                ..Default::default()
            }],
            ..Default::default()
        })
    }

    fn image(id: &str, b64: Option<&str>) -> ImageRef {
        ImageRef {
            id: id.into(),
            image_base64: b64.map(Into::into),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn zero_images_returns_zero_and_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let result = result_with_images(vec![]);
        let count = extract_images(&result, dir.path()).await.unwrap();
        assert_eq!(count, 0);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[tokio::test]
    async fn images_are_written_under_their_ids() {
        let dir = TempDir::new().unwrap();
        // "aGVsbG8=" is "hello"
        let result = result_with_images(vec![
            image("img-0.jpeg", Some("aGVsbG8=")),
            image("img-1.jpeg", None), // placeholder only, not written
        ]);
        let count = extract_images(&result, dir.path()).await.unwrap();
        assert_eq!(count, 1);
        let bytes = std::fs::read(dir.path().join("img-0.jpeg")).unwrap();
        assert_eq!(bytes, b"hello");
        assert!(!dir.path().join("img-1.jpeg").exists());
    }

    #[tokio::test]
    async fn output_directory_is_created() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("out").join("images");
        let result = result_with_images(vec![]);
        extract_images(&result, &nested).await.unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn decode_preserves_page_and_occurrence_order() {
        let result = OcrResult::from(OcrResponse {
            pages: vec![
                Page {
                    images: vec![image("b", Some("Yg==")), image("a", Some("YQ=="))],
                    ..Default::default()
                },
                Page {
                    images: vec![image("c", Some("Yw=="))],
                    ..Default::default()
                },
            ],
            ..Default::default()
        });
        let decoded = decode_images(&result).unwrap();
        let names: Vec<&str> = decoded.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["b", "a", "c"]);
    }

    #[test]
    fn invalid_base64_is_an_error_naming_the_image() {
        let result = result_with_images(vec![image("broken.png", Some("%%not-base64%%"))]);
        let err = decode_images(&result).unwrap_err();
        assert!(matches!(err, Ocr2MdError::ImageDecodeFailed { ref id, .. } if id == "broken.png"));
    }

    #[test]
    fn data_uri_prefix_is_stripped() {
        let result = result_with_images(vec![image(
            "img.png",
            Some("data:image/png;base64,aGVsbG8="),
        )]);
        let decoded = decode_images(&result).unwrap();
        assert_eq!(decoded[0].1, b"hello");
    }
}
