use std::path::PathBuf;

use anyhow::Context as _;
use image::{Rgba, RgbaImage, imageops::FilterType};
use tracing::{debug, info, warn};

use crate::error::SlidecastResult;
use crate::fonts::SlideFace;
use crate::imagesearch::{BackgroundCache, ImageSearch};
use crate::run::RunPaths;
use crate::{Content, Slide};

pub const SLIDE_WIDTH: u32 = 1920;
pub const SLIDE_HEIGHT: u32 = 1080;

/// Brightness factor applied to fetched backgrounds for text legibility.
const DARKEN_FACTOR: f32 = 0.6;
/// Uniform white overlay alpha applied after darkening.
const OVERLAY_ALPHA: u16 = 120;
/// Solid neutral background used when no photo could be fetched.
const FALLBACK_BG: [u8; 3] = [0xf0, 0xf4, 0xff];
const DEFAULT_QUERY: &str = "education";

const TITLE_PX: f32 = 56.0;
const BODY_PX: f32 = 36.0;
const STAMP_PX: f32 = 28.0;
const TITLE_RGB: [u8; 3] = [0x4f, 0x8e, 0xf7];
const BODY_RGB: [u8; 3] = [0x22, 0x22, 0x22];
const STAMP_RGB: [u8; 3] = [0x88, 0x88, 0x88];

const TITLE_X: i32 = 80;
const TITLE_TOP: i32 = 80;
const TITLE_LINE_ADVANCE: i32 = 70;
const TITLE_BLOCK_GAP: i32 = 20;
const BODY_X: i32 = 100;
const BODY_LINE_ADVANCE: i32 = 55;
/// No body line starts below this; keeps the index stamp clear of text.
const BODY_LIMIT_Y: i32 = 940;
pub const TEXT_MAX_WIDTH: f32 = 1720.0;
const STAMP_X: i32 = 1700;
const STAMP_Y: i32 = 1000;

/// One slide rasterized to a 1920x1080 opaque RGB image on disk.
///
/// Ephemeral: owned by the run that produced it and consumed once by the
/// video assembler.
#[derive(Clone, Debug)]
pub struct RenderedSlide {
    pub index: usize,
    pub image_path: PathBuf,
}

pub struct SlideRenderer<'a> {
    face: SlideFace,
    search: &'a dyn ImageSearch,
}

impl<'a> SlideRenderer<'a> {
    pub fn new(face: SlideFace, search: &'a dyn ImageSearch) -> Self {
        Self { face, search }
    }

    /// Render every slide of `content`, in presentation order, into the
    /// run's slide directory. Background and font problems degrade; an empty
    /// slide list aborts.
    pub fn render(&self, content: &Content, run: &RunPaths) -> SlidecastResult<Vec<RenderedSlide>> {
        content.validate()?;

        let cache = BackgroundCache::new(run.cache_dir());
        let topic = content
            .slides
            .first()
            .and_then(|s| display_texts(s).into_iter().next());

        let mut rendered = Vec::with_capacity(content.slides.len());
        for (index, slide) in content.slides.iter().enumerate() {
            let texts = display_texts(slide);
            let title = texts.first().cloned();
            let body = texts.get(1..).unwrap_or_default();

            let query = search_query(topic.as_deref(), title.as_deref());
            let mut canvas = self.background(&cache, &query, index);
            self.draw_text(&mut canvas, title.as_deref(), body, index);

            let path = run.slide_image_path(index);
            image::DynamicImage::ImageRgba8(canvas)
                .to_rgb8()
                .save(&path)
                .with_context(|| format!("write slide image '{}'", path.display()))?;
            debug!("rendered slide {} to '{}'", index + 1, path.display());

            rendered.push(RenderedSlide {
                index,
                image_path: path,
            });
        }

        info!("rendered {} slides for run {}", rendered.len(), run.run_id());
        Ok(rendered)
    }

    /// Fetched photo darkened for legibility, or the solid fallback. Always
    /// succeeds; a failed fetch or decode is the degraded path.
    fn background(&self, cache: &BackgroundCache<'_>, query: &str, index: usize) -> RgbaImage {
        let photo = cache
            .resolve(self.search, query, index)
            .and_then(|path| match image::open(&path) {
                Ok(img) => Some(img),
                Err(e) => {
                    warn!("cached background '{}' unreadable: {e}", path.display());
                    None
                }
            });

        let mut canvas = match photo {
            Some(img) => img
                .resize_exact(SLIDE_WIDTH, SLIDE_HEIGHT, FilterType::Triangle)
                .to_rgba8(),
            None => RgbaImage::from_pixel(
                SLIDE_WIDTH,
                SLIDE_HEIGHT,
                Rgba([FALLBACK_BG[0], FALLBACK_BG[1], FALLBACK_BG[2], 255]),
            ),
        };

        for px in canvas.pixels_mut() {
            for c in 0..3 {
                let darkened = (px.0[c] as f32 * DARKEN_FACTOR) as u16;
                px.0[c] =
                    ((255 * OVERLAY_ALPHA + darkened * (255 - OVERLAY_ALPHA) + 127) / 255) as u8;
            }
            px.0[3] = 255;
        }
        canvas
    }

    fn draw_text(&self, canvas: &mut RgbaImage, title: Option<&str>, body: &[String], index: usize) {
        let mut y = TITLE_TOP;

        if let Some(title) = title {
            for line in wrap_text(&self.face, title, TITLE_PX, TEXT_MAX_WIDTH) {
                self.face.draw(canvas, TITLE_X, y, &line, TITLE_PX, TITLE_RGB);
                y += TITLE_LINE_ADVANCE;
            }
            y += TITLE_BLOCK_GAP;
        }

        'body: for entry in body {
            for line in wrap_text(&self.face, entry, BODY_PX, TEXT_MAX_WIDTH) {
                if y > BODY_LIMIT_Y {
                    break 'body;
                }
                self.face.draw(canvas, BODY_X, y, &line, BODY_PX, BODY_RGB);
                y += BODY_LINE_ADVANCE;
            }
        }

        let stamp = format!("Slide {}", index + 1);
        self.face
            .draw(canvas, STAMP_X, STAMP_Y, &stamp, STAMP_PX, STAMP_RGB);
    }
}

/// Non-empty text fields of a slide in display order: title, then body, then
/// key points. The first entry becomes the display title, the rest the body
/// lines.
pub fn display_texts(slide: &Slide) -> Vec<String> {
    let mut texts = Vec::new();
    for field in [&slide.title, &slide.body] {
        let trimmed = field.trim();
        if !trimmed.is_empty() {
            texts.push(trimmed.to_string());
        }
    }
    for point in &slide.key_points {
        let trimmed = point.trim();
        if !trimmed.is_empty() {
            texts.push(trimmed.to_string());
        }
    }
    texts
}

/// Background search query: overall topic combined with the slide title,
/// falling back to the title alone, then a generic default.
pub fn search_query(topic: Option<&str>, title: Option<&str>) -> String {
    match (topic, title) {
        (Some(topic), Some(title)) => format!("{topic} {title}"),
        (_, Some(title)) => title.to_string(),
        (Some(topic), None) => topic.to_string(),
        (None, None) => DEFAULT_QUERY.to_string(),
    }
}

/// Greedy word wrap against a measured pixel width. A single word wider than
/// the limit is hard-broken so no produced line exceeds `max_width`.
pub fn wrap_text(face: &SlideFace, text: &str, px: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let candidate = if current.is_empty() {
            word.to_string()
        } else {
            format!("{current} {word}")
        };
        if face.measure(&candidate, px) <= max_width {
            current = candidate;
            continue;
        }

        if !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if face.measure(word, px) <= max_width {
            current = word.to_string();
        } else {
            let mut piece = String::new();
            for ch in word.chars() {
                piece.push(ch);
                if face.measure(&piece, px) > max_width && piece.chars().count() > 1 {
                    piece.pop();
                    lines.push(std::mem::take(&mut piece));
                    piece.push(ch);
                }
            }
            current = piece;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
