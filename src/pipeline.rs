use std::path::Path;

use tracing::{info, warn};

use crate::config::PipelineConfig;
use crate::content::Content;
use crate::encode_ffmpeg::{MediaToolkit, VideoArtifact};
use crate::error::SlidecastResult;
use crate::fonts::SlideFace;
use crate::imagesearch::ImageSearch;
use crate::run::RunPaths;
use crate::slides::SlideRenderer;
use crate::timing::TimingPlan;

/// One-request pipeline: render slides, probe narration, plan timing,
/// assemble the MP4. Construction validates configuration once; each `run`
/// call gets its own uniquely scoped filesystem state, so concurrent runs
/// never share paths.
pub struct Pipeline<'a> {
    config: PipelineConfig,
    toolkit: MediaToolkit,
    search: &'a dyn ImageSearch,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        config: PipelineConfig,
        toolkit: MediaToolkit,
        search: &'a dyn ImageSearch,
    ) -> SlidecastResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            toolkit,
            search,
        })
    }

    /// Execute one render → probe → plan → assemble cycle.
    ///
    /// The run's temporary tree is removed on success and retained on
    /// failure for diagnosis.
    pub fn run(&self, content: &Content, narration_audio: &Path) -> SlidecastResult<VideoArtifact> {
        let run = RunPaths::create(&self.config.temp_dir(), &self.config.videos_dir())?;
        info!("starting pipeline run {}", run.run_id());

        let result = self.run_scoped(content, narration_audio, &run);
        match &result {
            Ok(artifact) => {
                run.cleanup();
                info!(
                    "pipeline run {} complete: '{}'",
                    run.run_id(),
                    artifact.path.display()
                );
            }
            Err(e) => {
                warn!("pipeline run {} failed: {e}", run.run_id());
            }
        }
        result
    }

    fn run_scoped(
        &self,
        content: &Content,
        narration_audio: &Path,
        run: &RunPaths,
    ) -> SlidecastResult<VideoArtifact> {
        let face = SlideFace::resolve(self.config.font_path());
        let renderer = SlideRenderer::new(face, self.search);
        let slides = renderer.render(content, run)?;

        let narration_seconds = self.toolkit.probe_audio_duration(narration_audio)?;
        let plan = TimingPlan::uniform(slides.len(), narration_seconds)?;

        self.toolkit.assemble(
            &slides,
            &plan,
            narration_audio,
            &self.config.watermark_path,
            narration_seconds,
            run,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::placeholder_content;
    use crate::error::SlidecastError;
    use crate::imagesearch::NoSearch;

    #[test]
    fn missing_narration_stops_the_run_after_rendering() {
        let tmp = tempfile::tempdir().unwrap();
        let watermark = tmp.path().join("logo.png");
        std::fs::write(&watermark, b"png").unwrap();
        let config = PipelineConfig::new(&watermark, tmp.path().join("data"));
        let toolkit = MediaToolkit::with_binaries("/definitely/not/ffmpeg", "/nor/ffprobe");

        let search = NoSearch;
        let pipeline = Pipeline::new(config, toolkit, &search).unwrap();
        let err = pipeline
            .run(&placeholder_content(), Path::new("/missing/narration.mp3"))
            .unwrap_err();
        assert!(matches!(err, SlidecastError::NarrationNotFound(_)));

        // The failed run's scratch tree is retained for diagnosis.
        let temp = tmp.path().join("data/temp");
        assert!(std::fs::read_dir(&temp).unwrap().next().is_some());
    }

    #[test]
    fn construction_rejects_invalid_configuration() {
        let tmp = tempfile::tempdir().unwrap();
        let config = PipelineConfig::new(tmp.path().join("missing-logo.png"), tmp.path());
        let toolkit = MediaToolkit::with_binaries("ffmpeg", "ffprobe");
        let search = NoSearch;
        assert!(Pipeline::new(config, toolkit, &search).is_err());
    }
}
