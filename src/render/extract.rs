//! Extraction policy applied to every rendered page
//!
//! # Policy
//!
//! 1. Remove structural and noise elements (navigation, header, footer, scripts,
//!    styles, asides, forms, SVG, iframes, noscript, buttons, cookie banners)
//! 2. Remove images with fewer than 5 characters of alt text or a `src` that
//!    is not an absolute HTTP(S) URL
//! 3. Convert the cleaned document to markdown with ATX headings and `-` bullets
//! 4. Trim every line and drop blank ones

use crate::render::RenderError;
use htmd::options::{BulletListMarker, HeadingStyle, Options};
use htmd::HtmlToMarkdown;
use scraper::{Html, Selector};

/// Elements removed before conversion
pub const NOISE_SELECTORS: &[&str] = &[
    "nav",
    "footer",
    "script",
    "style",
    "header",
    "aside",
    "form",
    "svg",
    "iframe",
    "noscript",
    "button",
    ".cookie-banner",
    "#cookie-banner",
    "[class*='cookie-consent']",
    "[id*='cookie-consent']",
];

/// Minimum alt text length for an image to be kept
pub const MIN_IMAGE_ALT_LEN: usize = 5;

/// Parses HTML and removes every element the policy treats as noise
pub fn clean_document(html: &str) -> Html {
    let mut document = Html::parse_document(html);

    let mut doomed = Vec::new();
    for selector_str in NOISE_SELECTORS {
        match Selector::parse(selector_str) {
            Ok(selector) => doomed.extend(document.select(&selector).map(|el| el.id())),
            Err(e) => tracing::warn!("Invalid noise selector '{}': {:?}", selector_str, e),
        }
    }

    if let Ok(img_selector) = Selector::parse("img") {
        doomed.extend(
            document
                .select(&img_selector)
                .filter(|img| !keep_image(img.value().attr("alt"), img.value().attr("src")))
                .map(|img| img.id()),
        );
    }

    for id in doomed {
        // Nested matches may already be gone with their ancestor; detach is idempotent.
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }

    document
}

/// Returns true if an image carries enough description to be worth keeping
pub fn keep_image(alt: Option<&str>, src: Option<&str>) -> bool {
    let alt = alt.unwrap_or("");
    let src = src.unwrap_or("");
    alt.chars().count() >= MIN_IMAGE_ALT_LEN && src.starts_with("http")
}

/// Converts cleaned HTML to dense markdown
///
/// # Returns
///
/// * `Ok(String)` - Markdown with no blank lines and no surrounding whitespace per line
/// * `Err(RenderError)` - The converter failed
pub fn to_dense_markdown(html: &str) -> Result<String, RenderError> {
    let converter = HtmlToMarkdown::builder()
        .skip_tags(vec!["head"])
        .options(Options {
            heading_style: HeadingStyle::Atx,
            bullet_list_marker: BulletListMarker::Dash,
            ..Default::default()
        })
        .build();

    let markdown = converter
        .convert(html)
        .map_err(|e| RenderError::Content(e.to_string()))?;

    Ok(densify(&markdown))
}

/// Trims every line and drops the blank ones
pub fn densify(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Runs the whole policy over raw page HTML
pub fn extract_content(html: &str) -> Result<String, RenderError> {
    to_dense_markdown(&clean_document(html).html())
}
