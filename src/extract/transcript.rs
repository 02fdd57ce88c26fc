//! Transcript page fetching and body extraction

use crate::network::HttpClient;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use tracing::debug;

/// Heading text that opens the transcript section
pub const TRANSCRIPT_MARKER: &str = "Full Transcript";

static BLOCK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h2, h3, p").unwrap());
static PARAGRAPH_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("invalid URL: must be HTTP(S)")]
    InvalidScheme,

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("fetch timed out")]
    Timeout,

    #[error("fetch failed: {0}")]
    Network(String),

    #[error("fetch failed: status {0}")]
    Status(u16),

    #[error("no transcript text on page")]
    Empty,
}

/// Fetch a transcript page and return its paragraph text, one paragraph
/// per line
pub async fn fetch_transcript_text(
    client: &HttpClient,
    url: &str,
    timeout: Duration,
) -> Result<String, FetchError> {
    validate_url(url)?;

    let response = client
        .get_with_timeout(url, timeout)
        .await
        .map_err(|e| match e.downcast_ref::<reqwest::Error>() {
            Some(re) if re.is_timeout() => FetchError::Timeout,
            _ => FetchError::Network(e.to_string()),
        })?;

    if !response.is_success() {
        return Err(FetchError::Status(response.status));
    }

    let text = extract_transcript(&response.text);
    debug!(url = %url, bytes = response.text.len(), chars = text.len(), "transcript fetched");
    if text.is_empty() {
        return Err(FetchError::Empty);
    }
    Ok(text)
}

fn validate_url(raw: &str) -> Result<(), FetchError> {
    let parsed = url::Url::parse(raw)?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(FetchError::InvalidScheme),
    }
}

/// Paragraphs after the first `h2`/`h3` containing the marker, up to the
/// next `h2`/`h3`. Without a marker heading every paragraph is used.
pub fn extract_transcript(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut in_section = false;
    let mut found = false;
    let mut paragraphs = Vec::new();
    for el in document.select(&BLOCK_SELECTOR) {
        let is_heading = matches!(el.value().name(), "h2" | "h3");
        if is_heading {
            if in_section {
                break;
            }
            if el.text().collect::<String>().contains(TRANSCRIPT_MARKER) {
                in_section = true;
                found = true;
            }
            continue;
        }
        if in_section {
            paragraphs.push(paragraph_text(el));
        }
    }

    if !found {
        paragraphs = document
            .select(&PARAGRAPH_SELECTOR)
            .map(paragraph_text)
            .collect();
    }

    paragraphs.retain(|p| !p.is_empty());
    paragraphs.join("\n")
}

fn paragraph_text(el: ElementRef<'_>) -> String {
    el.text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
