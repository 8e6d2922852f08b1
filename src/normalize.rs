//! Markdown assembly: normalised pages → one markdown document.
//!
//! ## Image placeholder rewriting
//!
//! The OCR service represents embedded images as textual placeholders inside
//! the page markdown, and the convention has varied across service versions.
//! Three exact literal patterns are known, and they are tried per image in a
//! fixed order:
//!
//! 1. `!{id}!` — the id wrapped in single bangs
//! 2. `![{id}]({id})` — a self-referential markdown image link
//! 3. `![img-{i}.jpeg](img-{i}.jpeg)` — the fixed per-page placeholder,
//!    where `i` is the zero-based page index
//!
//! Each match is replaced with `![Image {id}]({images_dir}/{id})`. Only exact
//! literal matches are rewritten — no regex, no wildcards. When nothing
//! matches, the page text is left untouched; the image is still eligible for
//! extraction via [`crate::images`]. There is no validation that a
//! substitution happened, so a service-side placeholder change silently stops
//! matching; see the module docs in [`crate::response`] for the same
//! permissive stance on shapes.

use crate::response::{OcrResult, Page};

/// Separator inserted between pages in the assembled document.
const PAGE_SEPARATOR: &str = "\n\n---\n\n";

/// Options controlling markdown assembly.
#[derive(Debug, Clone, Default)]
pub struct MarkdownOptions {
    /// Rewrite image placeholders into markdown image links. Default: false.
    pub include_images: bool,

    /// Link prefix for rewritten image links, e.g. `"./images"`.
    ///
    /// This is a markdown URL prefix, not a filesystem path — it is joined
    /// with `/` regardless of platform. When unset, links point at the bare
    /// image id.
    pub images_dir: Option<String>,
}

impl MarkdownOptions {
    /// Options that rewrite image links against the given directory prefix.
    pub fn with_images(images_dir: impl Into<String>) -> Self {
        Self {
            include_images: true,
            images_dir: Some(images_dir.into()),
        }
    }
}

/// Assemble one markdown document from an OCR result.
///
/// Each page becomes a `## Page {n}` heading (1-based) followed by its
/// markdown text; pages are joined with `\n\n---\n\n` and the document
/// carries a leading blank-line prefix. Page order always matches input
/// order. An unrecognised result shape produces an empty document rather
/// than an error.
///
/// All three accepted input shapes produce byte-identical output for the
/// same logical content: shape detection happens once in
/// [`OcrResult::pages`] and this function only ever sees normalised pages.
pub fn render_markdown(result: &OcrResult, options: &MarkdownOptions) -> String {
    render_pages(&result.pages(), options)
}

/// Assemble a document from already-normalised pages.
pub fn render_pages(pages: &[Page], options: &MarkdownOptions) -> String {
    let rendered: Vec<String> = pages
        .iter()
        .enumerate()
        .map(|(i, page)| render_page(i, page, options))
        .collect();

    format!("\n\n{}", rendered.join(PAGE_SEPARATOR))
}

/// Render a single page: heading, markdown text, optional image rewriting.
fn render_page(index: usize, page: &Page, options: &MarkdownOptions) -> String {
    let mut content = format!("## Page {}\n\n", index + 1);
    content.push_str(&page.markdown);

    if options.include_images {
        for img in &page.images {
            let target = match &options.images_dir {
                Some(dir) => format!("{dir}/{}", img.id),
                None => img.id.clone(),
            };
            let link = format!("![Image {}]({})", img.id, target);

            // Patterns are tried in a fixed order; each is an exact literal.
            let bang_token = format!("!{}!", img.id);
            if content.contains(&bang_token) {
                content = content.replace(&bang_token, &link);
            }

            let self_link = format!("![{0}]({0})", img.id);
            if content.contains(&self_link) {
                content = content.replace(&self_link, &link);
            }

            let page_placeholder = format!("![img-{0}.jpeg](img-{0}.jpeg)", index);
            if content.contains(&page_placeholder) {
                content = content.replace(&page_placeholder, &link);
            }
        }
    }

    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::response::{ImageRef, OcrResponse};
    use serde_json::json;

    fn page(markdown: &str, image_ids: &[&str]) -> Page {
        Page {
            markdown: markdown.to_string(),
            images: image_ids
                .iter()
                .map(|id| ImageRef {
                    id: id.to_string(),
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn two_pages_with_headers_and_separator() {
        let pages = vec![page("A", &[]), page("B", &[])];
        let md = render_pages(&pages, &MarkdownOptions::default());
        assert_eq!(md, "\n\n## Page 1\n\nA\n\n---\n\n## Page 2\n\nB");
    }

    #[test]
    fn empty_result_is_an_empty_document() {
        let md = render_pages(&[], &MarkdownOptions::default());
        assert_eq!(md, "\n\n");
    }

    #[test]
    fn bang_token_is_rewritten() {
        let pages = vec![page("See !img1! below", &["img1"])];
        let md = render_pages(&pages, &MarkdownOptions::with_images("images"));
        assert!(md.contains("![Image img1](images/img1)"), "got: {md}");
        assert!(!md.contains("!img1!"), "token must be consumed, got: {md}");
    }

    #[test]
    fn self_referential_link_is_rewritten() {
        let pages = vec![page("![fig2](fig2)", &["fig2"])];
        let md = render_pages(&pages, &MarkdownOptions::with_images("./images"));
        assert!(md.contains("![Image fig2](./images/fig2)"), "got: {md}");
    }

    #[test]
    fn page_index_placeholder_is_rewritten() {
        // Second page, so the placeholder carries the zero-based index 1.
        let pages = vec![
            page("first", &[]),
            page("![img-1.jpeg](img-1.jpeg)", &["chart-a"]),
        ];
        let md = render_pages(&pages, &MarkdownOptions::with_images("images"));
        assert!(md.contains("![Image chart-a](images/chart-a)"), "got: {md}");
        assert!(!md.contains("img-1.jpeg"), "got: {md}");
    }

    #[test]
    fn no_images_dir_links_to_bare_id() {
        let pages = vec![page("!img1!", &["img1"])];
        let opts = MarkdownOptions {
            include_images: true,
            images_dir: None,
        };
        let md = render_pages(&pages, &opts);
        assert!(md.contains("![Image img1](img1)"), "got: {md}");
    }

    #[test]
    fn unmatched_image_leaves_text_unchanged() {
        let pages = vec![page("No placeholder here", &["img1"])];
        let md = render_pages(&pages, &MarkdownOptions::with_images("images"));
        assert!(md.contains("No placeholder here"));
        assert!(!md.contains("![Image"));
    }

    #[test]
    fn include_images_off_never_rewrites() {
        let pages = vec![page("!img1!", &["img1"])];
        let md = render_pages(&pages, &MarkdownOptions::default());
        assert!(md.contains("!img1!"));
    }

    #[test]
    fn shape_invariance_across_all_three_input_shapes() {
        let structured = OcrResult::from(OcrResponse {
            pages: vec![page("# Intro", &[]), page("Details", &[])],
            ..Default::default()
        });
        let mapping = OcrResult::from_value(json!({
            "pages": [{"markdown": "# Intro"}, {"markdown": "Details"}]
        }));
        let list = OcrResult::from_value(json!([
            {"markdown": "# Intro"}, {"markdown": "Details"}
        ]));

        let opts = MarkdownOptions::default();
        let a = render_markdown(&structured, &opts);
        let b = render_markdown(&mapping, &opts);
        let c = render_markdown(&list, &opts);
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn image_substitution_is_shape_invariant() {
        // Image rewriting must happen on normalised pages, not only for the
        // structured shape — the same placeholder gets rewritten identically
        // no matter which shape delivered it.
        let structured = OcrResult::from(OcrResponse {
            pages: vec![page("See !fig1! here", &["fig1"])],
            ..Default::default()
        });
        let page_json = json!({
            "markdown": "See !fig1! here",
            "images": [{"id": "fig1"}]
        });
        let mapping = OcrResult::from_value(json!({ "pages": [page_json.clone()] }));
        let list = OcrResult::from_value(json!([page_json]));

        let opts = MarkdownOptions::with_images("images");
        let a = render_markdown(&structured, &opts);
        let b = render_markdown(&mapping, &opts);
        let c = render_markdown(&list, &opts);
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert!(a.contains("![Image fig1](images/fig1)"), "got: {a}");
        assert!(!a.contains("!fig1!"), "token must be consumed, got: {a}");
    }

    #[test]
    fn unrecognised_input_renders_empty_without_panicking() {
        for value in [json!(7), json!(null)] {
            let result = OcrResult::from_value(value);
            let md = render_markdown(&result, &MarkdownOptions::default());
            assert_eq!(md, "\n\n");
        }
    }
}
