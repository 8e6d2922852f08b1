//! OCR response types and the shape-normalisation adapter.
//!
//! ## Why an adapter enum?
//!
//! Depending on the API client generation that produced it, an OCR result
//! arrives in one of three shapes:
//!
//! 1. a structured response object with a `pages` field (current API),
//! 2. a bare JSON mapping with a `pages` key (older client builds),
//! 3. a bare JSON array of page-like values.
//!
//! Rather than re-checking the shape at every consumer, [`OcrResult`] tags
//! the shape exactly once at the system boundary and converts everything to
//! the single internal [`Page`] type via [`OcrResult::pages`]. All downstream
//! logic (markdown assembly, image extraction) operates only on `Page`.
//!
//! A fourth, unrecognised shape is possible — a string, a number, an object
//! without `pages`. That is *not* an error: it normalises to an empty page
//! list, so a drifting upstream schema degrades to empty output instead of
//! failing the whole run.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

/// Structured OCR response as returned by the current `/v1/ocr` endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OcrResponse {
    /// Per-page results, in document order.
    #[serde(default)]
    pub pages: Vec<Page>,

    /// Model that produced the result, e.g. "mistral-ocr-latest".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    /// Billing/usage metadata, when the API reports it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage_info: Option<UsageInfo>,
}

/// One page of OCR output: markdown text plus any embedded image references.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// Zero-based page index as reported by the API.
    #[serde(default)]
    pub index: usize,

    /// The page content, already formatted as markdown.
    #[serde(default)]
    pub markdown: String,

    /// Images referenced by this page, in occurrence order.
    #[serde(default)]
    pub images: Vec<ImageRef>,

    /// Pixel dimensions of the source page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimensions: Option<PageDimensions>,
}

/// A reference to an image embedded in a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image identifier, also used as the placeholder token in the page
    /// markdown and as the filename when the image is extracted.
    pub id: String,

    /// Raw image bytes, base64-encoded. Present only when the OCR call
    /// requested embedded images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_base64: Option<String>,

    /// Bounding box of the image on the page, when reported.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_left_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_left_y: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_right_x: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bottom_right_y: Option<i64>,
}

impl ImageRef {
    /// True when the reference carries decodable image data.
    pub fn has_data(&self) -> bool {
        self.image_base64.as_deref().is_some_and(|d| !d.is_empty())
    }
}

/// Page dimensions as reported by the OCR service.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct PageDimensions {
    #[serde(default)]
    pub dpi: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub width: u32,
}

/// Usage metadata attached to an OCR response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsageInfo {
    #[serde(default)]
    pub pages_processed: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc_size_bytes: Option<u64>,
}

/// An OCR result in whichever shape the upstream API delivered it.
///
/// Constructed with [`OcrResult::from_value`]; consumed through
/// [`OcrResult::pages`] (normalised pages) or [`OcrResult::to_value`]
/// (raw JSON for dumping).
#[derive(Debug, Clone)]
pub enum OcrResult {
    /// Structured response object (current API shape).
    Response(OcrResponse),
    /// Bare mapping carrying a `pages` key.
    Document(serde_json::Map<String, Value>),
    /// Bare sequence of page-like values.
    Pages(Vec<Value>),
    /// None of the recognised shapes; normalises to an empty document.
    Unrecognized(Value),
}

impl OcrResult {
    /// Detect the shape of a raw JSON value and tag it.
    ///
    /// An object with a `pages` key is first tried as the structured
    /// [`OcrResponse`]; if that fails (e.g. `pages` holds non-page values)
    /// the raw mapping is kept and page extraction falls back to field-wise
    /// reads. Anything that is neither such an object nor an array becomes
    /// [`OcrResult::Unrecognized`].
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::Object(map) if map.contains_key("pages") => {
                match serde_json::from_value::<OcrResponse>(Value::Object(map.clone())) {
                    Ok(resp) => OcrResult::Response(resp),
                    Err(e) => {
                        warn!("OCR response did not match the structured schema ({e}); falling back to field-wise reads");
                        OcrResult::Document(map)
                    }
                }
            }
            Value::Array(items) => OcrResult::Pages(items),
            other => {
                warn!(
                    "Unrecognised OCR response shape ({}); normalising to an empty document",
                    json_kind(&other)
                );
                OcrResult::Unrecognized(other)
            }
        }
    }

    /// Normalise to the internal page representation.
    ///
    /// Page order always matches the input order; nothing is reordered,
    /// deduplicated, or dropped except image refs with no `id` (they can
    /// neither be linked nor extracted). Unrecognised shapes yield an empty
    /// list.
    pub fn pages(&self) -> Vec<Page> {
        match self {
            OcrResult::Response(resp) => resp.pages.clone(),
            OcrResult::Document(map) => map
                .get("pages")
                .and_then(Value::as_array)
                .map(|items| items.iter().map(page_from_value).collect())
                .unwrap_or_default(),
            OcrResult::Pages(items) => items.iter().map(page_from_value).collect(),
            OcrResult::Unrecognized(_) => Vec::new(),
        }
    }

    /// The raw result as a JSON value, for the `--output-format json` dump.
    pub fn to_value(&self) -> Value {
        match self {
            // Serialising a struct with only plain fields cannot fail.
            OcrResult::Response(resp) => serde_json::to_value(resp).unwrap_or(Value::Null),
            OcrResult::Document(map) => Value::Object(map.clone()),
            OcrResult::Pages(items) => Value::Array(items.clone()),
            OcrResult::Unrecognized(v) => v.clone(),
        }
    }
}

impl From<OcrResponse> for OcrResult {
    fn from(resp: OcrResponse) -> Self {
        OcrResult::Response(resp)
    }
}

/// Convert one page-like JSON value into a [`Page`], permissively.
///
/// Missing `markdown` becomes an empty string; malformed `images` entries
/// are skipped rather than failing the page.
fn page_from_value(value: &Value) -> Page {
    let markdown = value
        .get("markdown")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let index = value
        .get("index")
        .and_then(Value::as_u64)
        .unwrap_or_default() as usize;

    let images = value
        .get("images")
        .and_then(Value::as_array)
        .map(|imgs| {
            imgs.iter()
                .filter_map(|img| serde_json::from_value::<ImageRef>(img.clone()).ok())
                .filter(|img| !img.id.is_empty())
                .collect()
        })
        .unwrap_or_default();

    let dimensions = value
        .get("dimensions")
        .and_then(|d| serde_json::from_value(d.clone()).ok());

    Page {
        index,
        markdown,
        images,
        dimensions,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
