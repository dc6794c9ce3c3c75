use std::path::Path;

use anyhow::Context as _;
use tracing::warn;

use crate::error::{SlidecastError, SlidecastResult};

/// Structured presentation content driving both slide rendering and narration.
///
/// Every field defaults to empty rather than being absent, so downstream code
/// treats absence and emptiness identically.
#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Content {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub slides: Vec<Slide>,
    #[serde(default)]
    pub conclusion: String,
}

#[derive(Clone, Debug, Default, serde::Serialize, serde::Deserialize)]
pub struct Slide {
    #[serde(default)]
    pub title: String,
    #[serde(default, alias = "content")]
    pub body: String,
    #[serde(default, alias = "keyPoints")]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub narration: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetailLevel {
    Low,
    Medium,
    High,
}

/// Request contract for the external content-generation collaborator.
#[derive(Clone, Debug)]
pub struct ContentRequest {
    pub topic: String,
    pub duration_minutes: u32,
    pub detail_level: DetailLevel,
}

/// Collaborator boundary: anything that can produce a `Content`.
///
/// Implementations own any response-repair policy; the pipeline only ever
/// sees a valid `Content` (possibly the placeholder).
pub trait ContentSource {
    fn generate(&self, request: &ContentRequest) -> SlidecastResult<Content>;
}

impl Content {
    pub fn validate(&self) -> SlidecastResult<()> {
        if self.slides.is_empty() {
            return Err(SlidecastError::validation(
                "content must have at least one slide",
            ));
        }
        Ok(())
    }
}

/// Strict parse of an upstream model response into `Content`.
///
/// Tolerates a fenced ```json block around the payload (common in LLM output)
/// but performs no other repair.
pub fn parse_content_json(raw: &str) -> SlidecastResult<Content> {
    let text = strip_code_fence(raw.trim());
    serde_json::from_str(text)
        .map_err(|e| SlidecastError::content(format!("response is not valid content JSON: {e}")))
}

/// Parse with the documented fallback policy: any parse failure substitutes
/// the deterministic placeholder so downstream stages always receive a valid
/// `Content`. The substitution masks the upstream failure and is logged as a
/// warning because it silently changes the user-visible result.
pub fn parse_content_or_placeholder(raw: &str) -> Content {
    match parse_content_json(raw) {
        Ok(content) => content,
        Err(e) => {
            warn!("substituting placeholder content: {e}");
            placeholder_content()
        }
    }
}

/// Deterministic single-slide structure used when upstream content is
/// unparsable, keeping the rest of the pipeline exercisable.
pub fn placeholder_content() -> Content {
    Content {
        title: "Sample Presentation".to_string(),
        overview: "This is a sample presentation generated as a fallback.".to_string(),
        slides: vec![Slide {
            title: "Sample Slide".to_string(),
            body: "Content could not be generated for this topic.".to_string(),
            key_points: vec!["Please try again".to_string()],
            narration: "This is a sample slide shown because content generation failed."
                .to_string(),
        }],
        conclusion: "Thank you for watching.".to_string(),
    }
}

/// Content source backed by a JSON file on disk. Used by the CLI in place of
/// the external LLM collaborator.
pub struct FileContentSource {
    path: std::path::PathBuf,
}

impl FileContentSource {
    pub fn new(path: impl Into<std::path::PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ContentSource for FileContentSource {
    fn generate(&self, _request: &ContentRequest) -> SlidecastResult<Content> {
        Ok(load_content_file(&self.path))
    }
}

/// Read a content JSON file, substituting the placeholder on read or parse
/// failure (logged, never fatal).
pub fn load_content_file(path: &Path) -> Content {
    let raw = match std::fs::read_to_string(path)
        .with_context(|| format!("read content file '{}'", path.display()))
    {
        Ok(raw) => raw,
        Err(e) => {
            warn!("substituting placeholder content: {e:#}");
            return placeholder_content();
        }
    };
    parse_content_or_placeholder(&raw)
}

fn strip_code_fence(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the info string ("json", "JSON", ...) up to the first newline.
    let body = match rest.split_once('\n') {
        Some((_, body)) => body,
        None => rest,
    };
    body.trim().strip_suffix("```").unwrap_or(body).trim()
}
