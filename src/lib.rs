#![forbid(unsafe_code)]

pub mod config;
pub mod content;
pub mod encode_ffmpeg;
pub mod error;
pub mod fonts;
pub mod imagesearch;
pub mod narration;
pub mod pipeline;
pub mod run;
pub mod slides;
pub mod timing;

pub use config::PipelineConfig;
pub use content::{Content, ContentRequest, ContentSource, DetailLevel, Slide};
pub use encode_ffmpeg::{MediaToolkit, VideoArtifact};
pub use error::{SlidecastError, SlidecastResult};
pub use pipeline::Pipeline;
pub use run::RunPaths;
pub use slides::{RenderedSlide, SlideRenderer};
pub use timing::TimingPlan;
