use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::{SlidecastError, SlidecastResult};

/// Explicit pipeline configuration, resolved once at process startup and
/// passed into components. Components never read the environment themselves.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Encoder binary; a bare name is resolved on PATH.
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    /// Branding image overlaid onto every output video.
    pub watermark_path: PathBuf,
    /// Root for `temp/` (per-run scratch) and `videos/` (final artifacts).
    pub data_dir: PathBuf,
    /// Image-search credential; without it slide backgrounds degrade to the
    /// solid fallback.
    pub unsplash_access_key: Option<String>,
    /// Preferred slide font; the renderer falls back through platform fonts
    /// to a built-in bitmap face when unusable.
    pub font_path: Option<PathBuf>,
}

impl PipelineConfig {
    pub fn new(watermark_path: impl Into<PathBuf>, data_dir: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            watermark_path: watermark_path.into(),
            data_dir: data_dir.into(),
            unsplash_access_key: None,
            font_path: None,
        }
    }

    /// Build configuration from `SLIDECAST_*` environment variables. This is
    /// the single place the environment is consulted.
    pub fn from_env() -> Self {
        let mut cfg = Self::new(
            std::env::var_os("SLIDECAST_WATERMARK")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("assets/watermark.png")),
            std::env::var_os("SLIDECAST_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("data")),
        );
        if let Some(bin) = std::env::var_os("SLIDECAST_FFMPEG") {
            cfg.ffmpeg_bin = PathBuf::from(bin);
        }
        if let Some(bin) = std::env::var_os("SLIDECAST_FFPROBE") {
            cfg.ffprobe_bin = PathBuf::from(bin);
        }
        cfg.unsplash_access_key = std::env::var("UNSPLASH_ACCESS_KEY").ok();
        cfg.font_path = std::env::var_os("SLIDECAST_FONT").map(PathBuf::from);
        cfg
    }

    pub fn temp_dir(&self) -> PathBuf {
        self.data_dir.join("temp")
    }

    pub fn videos_dir(&self) -> PathBuf {
        self.data_dir.join("videos")
    }

    /// Create the data directory tree.
    pub fn ensure_dirs(&self) -> SlidecastResult<()> {
        for dir in [self.temp_dir(), self.videos_dir()] {
            std::fs::create_dir_all(&dir)
                .with_context(|| format!("create data directory '{}'", dir.display()))?;
        }
        Ok(())
    }

    /// Full startup validation for an assemble-capable process: directories
    /// plus the watermark asset. Toolkit discovery is validated separately.
    pub fn validate(&self) -> SlidecastResult<()> {
        self.ensure_dirs()?;
        if !self.watermark_path.exists() {
            return Err(SlidecastError::WatermarkNotFound(
                self.watermark_path.clone(),
            ));
        }
        Ok(())
    }

    pub fn with_watermark(mut self, path: impl Into<PathBuf>) -> Self {
        self.watermark_path = path.into();
        self
    }

    pub fn with_font(mut self, path: Option<PathBuf>) -> Self {
        self.font_path = path;
        self
    }

    pub fn font_path(&self) -> Option<&Path> {
        self.font_path.as_deref()
    }
}
