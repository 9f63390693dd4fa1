//! Network I/O and content extraction
//!
//! Pure functions for fetching web pages and turning HTML into text.
//! These are decoupled from the tool system and use standard types.

use std::time::Duration;

use scraper::{ElementRef, Html};
use tracing::debug;

use crate::config::{ContentFormat, FetchConfig};

/// Marker appended to content cut at the length limit
pub const TRUNCATION_MARKER: &str = "... (content truncated)";

/// Elements dropped together with everything inside them
const NOISE_TAGS: [&str; 7] = [
    "script", "style", "noscript", "template", "nav", "footer", "header",
];

/// Elements whose boundaries separate text into lines
const BLOCK_TAGS: &[&str] = &[
    "p", "div", "br", "hr", "li", "ul", "ol", "dl", "dt", "dd", "h1", "h2", "h3", "h4", "h5",
    "h6", "tr", "td", "th", "table", "section", "article", "main", "aside", "blockquote", "pre",
    "title", "head", "body", "form", "figure", "figcaption",
];

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("Unsupported URL scheme: {0}. Only http and https are allowed.")]
    UnsupportedScheme(String),
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),
    #[error("HTTP error: {status} {reason}")]
    Status { status: u16, reason: String },
    #[error("Request failed: {0}")]
    Request(#[source] reqwest::Error),
    #[error("Failed to read response body: {0}")]
    Body(#[source] reqwest::Error),
}

impl FetchError {
    /// Whether the failure happened before any content was received
    pub fn is_request_error(&self) -> bool {
        !matches!(self, Self::Body(_))
    }
}

/// Fetch a website and extract its readable text
///
/// Scripts, styles, navigation, headers and footers are removed before
/// extraction. Content longer than `max_content_length` characters is cut
/// and marked with [`TRUNCATION_MARKER`].
pub async fn fetch_website_content(url: &str, config: &FetchConfig) -> Result<String, FetchError> {
    let parsed_url = url::Url::parse(url)?;

    if parsed_url.scheme() != "http" && parsed_url.scheme() != "https" {
        return Err(FetchError::UnsupportedScheme(parsed_url.scheme().to_string()));
    }

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(FetchError::Request)?;

    let response = client.get(parsed_url).send().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout(config.timeout_secs)
        } else {
            FetchError::Request(e)
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
        });
    }

    let html = response.text().await.map_err(|e| {
        if e.is_timeout() {
            FetchError::Timeout(config.timeout_secs)
        } else {
            FetchError::Body(e)
        }
    })?;

    let content = extract_content(&html, config.format);
    debug!(
        "Extracted {} chars from {} ({} bytes of HTML)",
        content.chars().count(),
        url,
        html.len()
    );

    Ok(truncate_content(content, config.max_content_length))
}

/// Extract readable content from an HTML document
pub fn extract_content(html: &str, format: ContentFormat) -> String {
    match format {
        ContentFormat::Text => html_to_text(html),
        ContentFormat::Markdown => htmd::HtmlToMarkdown::builder()
            .skip_tags(NOISE_TAGS.to_vec())
            .build()
            .convert(html)
            .unwrap_or_else(|_| html_to_text(html))
            .trim()
            .to_string(),
    }
}

/// Parse the document and collect its text, skipping noise subtrees
fn html_to_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut text = String::new();
    collect_text(document.root_element(), &mut text);
    normalize_whitespace(&text)
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
            continue;
        }
        // Comments, doctypes and processing instructions carry no text
        let Some(child) = ElementRef::wrap(child) else {
            continue;
        };

        let name = child.value().name();
        if NOISE_TAGS.contains(&name) {
            continue;
        }
        let block = BLOCK_TAGS.contains(&name);
        if block {
            out.push('\n');
        }
        collect_text(child, out);
        if block {
            out.push('\n');
        }
    }
}

/// Collapse whitespace: trim each line, split on double spaces, join the
/// non-empty phrases with single spaces.
pub fn normalize_whitespace(text: &str) -> String {
    text.lines()
        .map(str::trim)
        .flat_map(|line| line.split("  "))
        .map(str::trim)
        .filter(|phrase| !phrase.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Cut content to `max_chars` characters, appending the truncation marker
pub fn truncate_content(content: String, max_chars: usize) -> String {
    match content.char_indices().nth(max_chars) {
        Some((end, _)) => format!("{}{}", &content[..end], TRUNCATION_MARKER),
        None => content,
    }
}
