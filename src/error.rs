use std::path::PathBuf;

pub type SlidecastResult<T> = Result<T, SlidecastError>;

#[derive(thiserror::Error, Debug)]
pub enum SlidecastError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("narration audio not found: '{0}'")]
    NarrationNotFound(PathBuf),

    #[error("slide image not found: '{0}'")]
    SlideImageNotFound(PathBuf),

    #[error("watermark image not found: '{0}'")]
    WatermarkNotFound(PathBuf),

    #[error("media toolkit unavailable: {0}")]
    ToolkitNotFound(String),

    // Carries the encoder's stderr verbatim so operators can diagnose
    // codec/filter issues.
    #[error("encode error: {0}")]
    Encode(String),

    #[error("content error: {0}")]
    Content(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl SlidecastError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    pub fn content(msg: impl Into<String>) -> Self {
        Self::Content(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_prefixes_are_stable() {
        assert!(
            SlidecastError::validation("x")
                .to_string()
                .contains("validation error:")
        );
        assert!(
            SlidecastError::encode("x")
                .to_string()
                .contains("encode error:")
        );
        assert!(
            SlidecastError::content("x")
                .to_string()
                .contains("content error:")
        );
    }

    #[test]
    fn missing_file_errors_name_the_path() {
        let err = SlidecastError::NarrationNotFound(PathBuf::from("a/b.mp3"));
        assert!(err.to_string().contains("a/b.mp3"));
        assert!(err.to_string().contains("narration"));

        let err = SlidecastError::WatermarkNotFound(PathBuf::from("logo.png"));
        assert!(err.to_string().contains("watermark"));
    }

    #[test]
    fn other_preserves_source() {
        let base = std::io::Error::other("boom");
        let err = SlidecastError::Other(anyhow::Error::new(base));
        assert!(err.to_string().contains("boom"));
    }
}
