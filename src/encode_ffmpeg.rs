use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use anyhow::Context as _;
use tracing::{debug, info};

use crate::error::{SlidecastError, SlidecastResult};
use crate::run::RunPaths;
use crate::slides::RenderedSlide;
use crate::timing::TimingPlan;

/// Watermark width after scaling (height preserves aspect ratio).
const WATERMARK_WIDTH: u32 = 200;
/// Watermark inset from the bottom-left corner.
const WATERMARK_INSET: u32 = 50;
const AUDIO_BITRATE: &str = "192k";

/// Final encoded output of one run: a single MP4 with one H.264 video stream
/// and one AAC audio stream.
#[derive(Clone, Debug)]
pub struct VideoArtifact {
    pub path: PathBuf,
    pub duration_sec: f64,
}

/// External media toolkit (ffmpeg + ffprobe). Probing and encoding go
/// through the same binaries so duration interpretation stays consistent.
#[derive(Clone, Debug)]
pub struct MediaToolkit {
    ffmpeg: PathBuf,
    ffprobe: PathBuf,
}

impl MediaToolkit {
    /// Resolve and verify both binaries. A missing or broken toolkit is a
    /// startup-time fatal condition, checked before any run begins.
    pub fn discover(
        ffmpeg: impl Into<PathBuf>,
        ffprobe: impl Into<PathBuf>,
    ) -> SlidecastResult<Self> {
        let toolkit = Self::with_binaries(ffmpeg, ffprobe);
        for bin in [&toolkit.ffmpeg, &toolkit.ffprobe] {
            let ok = Command::new(bin)
                .arg("-version")
                .stdout(Stdio::null())
                .stderr(Stdio::null())
                .status()
                .map(|s| s.success())
                .unwrap_or(false);
            if !ok {
                return Err(SlidecastError::ToolkitNotFound(format!(
                    "'{}' is not runnable (install ffmpeg or point configuration at it)",
                    bin.display()
                )));
            }
        }
        Ok(toolkit)
    }

    /// Unverified constructor; discovery is the validated path.
    pub fn with_binaries(ffmpeg: impl Into<PathBuf>, ffprobe: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    /// Duration of an audio file in seconds, via ffprobe.
    pub fn probe_audio_duration(&self, audio_path: &Path) -> SlidecastResult<f64> {
        if !audio_path.exists() {
            return Err(SlidecastError::NarrationNotFound(audio_path.to_path_buf()));
        }

        #[derive(serde::Deserialize)]
        struct ProbeFormat {
            duration: Option<String>,
        }
        #[derive(serde::Deserialize)]
        struct ProbeOut {
            format: Option<ProbeFormat>,
        }

        let out = Command::new(&self.ffprobe)
            .args(["-v", "error", "-print_format", "json", "-show_format"])
            .arg(audio_path)
            .output()
            .map_err(|e| {
                SlidecastError::ToolkitNotFound(format!(
                    "failed to run ffprobe '{}': {e}",
                    self.ffprobe.display()
                ))
            })?;
        if !out.status.success() {
            return Err(SlidecastError::encode(format!(
                "ffprobe failed for '{}': {}",
                audio_path.display(),
                String::from_utf8_lossy(&out.stderr)
            )));
        }

        let parsed: ProbeOut =
            serde_json::from_slice(&out.stdout).context("parse ffprobe json output")?;
        let duration = parsed
            .format
            .and_then(|f| f.duration)
            .and_then(|s| s.parse::<f64>().ok())
            .ok_or_else(|| {
                SlidecastError::encode(format!(
                    "ffprobe reported no duration for '{}'",
                    audio_path.display()
                ))
            })?;

        debug!("probed '{}': {duration:.3}s", audio_path.display());
        Ok(duration)
    }

    /// Concatenate timed stills, mux in the narration track, overlay the
    /// watermark, and emit a single MP4.
    ///
    /// `narration_seconds` is the probed narration duration (probing is a
    /// required preceding step through this same toolkit). Output stops at
    /// the shorter of the visual and audio streams rather than padding.
    pub fn assemble(
        &self,
        slides: &[RenderedSlide],
        plan: &TimingPlan,
        narration_audio: &Path,
        watermark: &Path,
        narration_seconds: f64,
        run: &RunPaths,
    ) -> SlidecastResult<VideoArtifact> {
        if slides.is_empty() {
            return Err(SlidecastError::validation("no slides to assemble"));
        }
        if plan.len() != slides.len() {
            return Err(SlidecastError::validation(format!(
                "timing plan covers {} slides but {} were rendered",
                plan.len(),
                slides.len()
            )));
        }
        for slide in slides {
            if !slide.image_path.exists() {
                return Err(SlidecastError::SlideImageNotFound(slide.image_path.clone()));
            }
        }
        if !narration_audio.exists() {
            return Err(SlidecastError::NarrationNotFound(
                narration_audio.to_path_buf(),
            ));
        }
        if !watermark.exists() {
            return Err(SlidecastError::WatermarkNotFound(watermark.to_path_buf()));
        }

        let manifest_path = run.concat_manifest_path();
        write_concat_manifest(&manifest_path, slides, plan)?;

        let out_path = run.output_path();
        let filter = format!(
            "[2:v]scale={WATERMARK_WIDTH}:-1[wm];\
             [0:v][wm]overlay={WATERMARK_INSET}:main_h-overlay_h-{WATERMARK_INSET}:format=auto,\
             format=yuv420p[v]"
        );

        let mut cmd = Command::new(&self.ffmpeg);
        cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"])
            .arg(&manifest_path)
            .arg("-i")
            .arg(narration_audio)
            .arg("-i")
            .arg(watermark)
            .args(["-filter_complex", &filter])
            .args(["-map", "[v]", "-map", "1:a"])
            .args(["-c:v", "libx264", "-c:a", "aac", "-b:a", AUDIO_BITRATE])
            .arg("-shortest")
            .arg(out_path);

        debug!("running encoder: {cmd:?}");
        let out = cmd.output().map_err(|e| {
            SlidecastError::ToolkitNotFound(format!(
                "failed to run ffmpeg '{}': {e}",
                self.ffmpeg.display()
            ))
        })?;
        if !out.status.success() {
            // The encoder's diagnostics pass through verbatim.
            return Err(SlidecastError::Encode(
                String::from_utf8_lossy(&out.stderr).to_string(),
            ));
        }

        let duration_sec = narration_seconds.min(plan.total_seconds());
        info!(
            "encoded '{}' ({duration_sec:.2}s, {} slides)",
            out_path.display(),
            slides.len()
        );
        Ok(VideoArtifact {
            path: out_path.to_path_buf(),
            duration_sec,
        })
    }
}

/// Write the concat-demuxer manifest: each slide image paired with its
/// planned display duration, in slide order. This is the sole input driving
/// playback timing.
pub fn write_concat_manifest(
    path: &Path,
    slides: &[RenderedSlide],
    plan: &TimingPlan,
) -> SlidecastResult<()> {
    let mut body = String::new();
    for (slide, duration) in slides.iter().zip(plan.per_slide()) {
        body.push_str(&format!("file '{}'\n", slide.image_path.display()));
        body.push_str(&format!("duration {duration}\n"));
    }

    let mut file = std::fs::File::create(path)
        .with_context(|| format!("create concat manifest '{}'", path.display()))?;
    file.write_all(body.as_bytes())
        .with_context(|| format!("write concat manifest '{}'", path.display()))?;
    Ok(())
}
