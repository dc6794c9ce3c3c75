use std::path::PathBuf;

use clap::{Parser, Subcommand};

use slidecast::content::load_content_file;
use slidecast::fonts::SlideFace;
use slidecast::imagesearch::{ImageSearch, NoSearch, UnsplashClient};
use slidecast::narration::narration_script;
use slidecast::{MediaToolkit, Pipeline, PipelineConfig, RunPaths, SlideRenderer};

#[derive(Parser, Debug)]
#[command(name = "slidecast", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the narration script for a content file.
    Script(ScriptArgs),
    /// Render slide images only (no audio or encoder required).
    Slides(SlidesArgs),
    /// Full run: render slides and assemble the final MP4 (requires
    /// `ffmpeg`/`ffprobe`).
    Render(RenderArgs),
}

#[derive(Parser, Debug)]
struct ScriptArgs {
    /// Content JSON (unparsable input falls back to placeholder content).
    #[arg(long)]
    content: PathBuf,
}

#[derive(Parser, Debug)]
struct SlidesArgs {
    /// Content JSON (unparsable input falls back to placeholder content).
    #[arg(long)]
    content: PathBuf,

    /// Directory for the rendered images.
    #[arg(long, default_value = "data/temp")]
    out_dir: PathBuf,

    /// Preferred slide font (TTF); falls back through platform fonts.
    #[arg(long)]
    font: Option<PathBuf>,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    /// Content JSON (unparsable input falls back to placeholder content).
    #[arg(long)]
    content: PathBuf,

    /// Narration audio file (MP3-compatible).
    #[arg(long)]
    narration: PathBuf,

    /// Watermark image overlaid onto the output.
    #[arg(long)]
    watermark: Option<PathBuf>,

    /// Preferred slide font (TTF); falls back through platform fonts.
    #[arg(long)]
    font: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Script(args) => cmd_script(args),
        Command::Slides(args) => cmd_slides(args),
        Command::Render(args) => cmd_render(args),
    }
}

fn make_search(cfg: &PipelineConfig) -> anyhow::Result<Box<dyn ImageSearch>> {
    match &cfg.unsplash_access_key {
        Some(key) => Ok(Box::new(UnsplashClient::new(key.clone())?)),
        None => Ok(Box::new(NoSearch)),
    }
}

fn cmd_script(args: ScriptArgs) -> anyhow::Result<()> {
    let content = load_content_file(&args.content);
    println!("{}", narration_script(&content));
    Ok(())
}

fn cmd_slides(args: SlidesArgs) -> anyhow::Result<()> {
    let cfg = PipelineConfig::from_env().with_font(args.font);
    let content = load_content_file(&args.content);

    let search = make_search(&cfg)?;
    let face = SlideFace::resolve(cfg.font_path());
    let renderer = SlideRenderer::new(face, search.as_ref());

    let run = RunPaths::create(&args.out_dir, &args.out_dir)?;
    let slides = renderer.render(&content, &run)?;
    for slide in &slides {
        println!("{}", slide.image_path.display());
    }
    Ok(())
}

fn cmd_render(args: RenderArgs) -> anyhow::Result<()> {
    let mut cfg = PipelineConfig::from_env().with_font(args.font);
    if let Some(watermark) = args.watermark {
        cfg = cfg.with_watermark(watermark);
    }

    let toolkit = MediaToolkit::discover(&cfg.ffmpeg_bin, &cfg.ffprobe_bin)?;
    let content = load_content_file(&args.content);
    let search = make_search(&cfg)?;

    let pipeline = Pipeline::new(cfg, toolkit, search.as_ref())?;
    let artifact = pipeline.run(&content, &args.narration)?;

    eprintln!(
        "wrote {} ({:.2}s)",
        artifact.path.display(),
        artifact.duration_sec
    );
    Ok(())
}
