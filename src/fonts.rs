use std::path::{Path, PathBuf};

use image::RgbaImage;
use tracing::{debug, warn};

/// Platform-bundled font candidates, tried in order after any configured
/// font path. Best-effort: none of these are required to exist.
const PLATFORM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

/// A face the slide renderer can measure and draw with.
///
/// Resolution is best-effort: a named truetype font, then platform-bundled
/// fonts, then a minimal built-in bitmap face. Failing to find any scalable
/// font degrades legibility, never correctness.
pub enum SlideFace {
    Truetype(fontdue::Font),
    Bitmap,
}

impl SlideFace {
    pub fn resolve(configured: Option<&Path>) -> Self {
        let mut candidates: Vec<PathBuf> = Vec::new();
        if let Some(path) = configured {
            candidates.push(path.to_path_buf());
        }
        candidates.extend(PLATFORM_FONTS.iter().map(PathBuf::from));

        for path in &candidates {
            match load_truetype(path) {
                Ok(font) => {
                    debug!("resolved slide font '{}'", path.display());
                    return Self::Truetype(font);
                }
                Err(e) => {
                    if configured == Some(path.as_path()) {
                        warn!("configured font '{}' unusable: {e}", path.display());
                    }
                }
            }
        }

        warn!("no scalable font found, falling back to built-in bitmap face");
        Self::Bitmap
    }

    /// Pixel width of `text` when drawn at `px`.
    pub fn measure(&self, text: &str, px: f32) -> f32 {
        match self {
            Self::Truetype(font) => text
                .chars()
                .map(|ch| font.metrics(ch, px).advance_width)
                .sum(),
            Self::Bitmap => (text.chars().count() as u32 * bitmap_advance(px)) as f32,
        }
    }

    /// Draw `text` with its top-left corner at `(x, y)`.
    pub fn draw(&self, img: &mut RgbaImage, x: i32, y: i32, text: &str, px: f32, rgb: [u8; 3]) {
        match self {
            Self::Truetype(font) => draw_truetype(font, img, x, y, text, px, rgb),
            Self::Bitmap => draw_bitmap(img, x, y, text, px, rgb),
        }
    }
}

fn load_truetype(path: &Path) -> Result<fontdue::Font, String> {
    let bytes = std::fs::read(path).map_err(|e| e.to_string())?;
    fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default()).map_err(|e| e.to_string())
}

fn draw_truetype(
    font: &fontdue::Font,
    img: &mut RgbaImage,
    x: i32,
    y: i32,
    text: &str,
    px: f32,
    rgb: [u8; 3],
) {
    let ascent = font
        .horizontal_line_metrics(px)
        .map(|m| m.ascent)
        .unwrap_or(px * 0.8);
    let baseline = y + ascent.round() as i32;

    let mut pen_x = x as f32;
    for ch in text.chars() {
        let (metrics, coverage) = font.rasterize(ch, px);
        let left = pen_x.round() as i32 + metrics.xmin;
        let top = baseline - metrics.height as i32 - metrics.ymin;

        for row in 0..metrics.height {
            for col in 0..metrics.width {
                let a = coverage[row * metrics.width + col];
                if a == 0 {
                    continue;
                }
                blend_px(img, left + col as i32, top + row as i32, rgb, a);
            }
        }
        pen_x += metrics.advance_width;
    }
}

fn bitmap_scale(px: f32) -> u32 {
    ((px / 8.0).round() as u32).max(1)
}

fn bitmap_advance(px: f32) -> u32 {
    // 5 columns plus 1 column of spacing.
    6 * bitmap_scale(px)
}

fn draw_bitmap(img: &mut RgbaImage, x: i32, y: i32, text: &str, px: f32, rgb: [u8; 3]) {
    let scale = bitmap_scale(px) as i32;
    let mut pen_x = x;
    for ch in text.chars() {
        let rows = bitmap_glyph(ch);
        for (row, bits) in rows.iter().enumerate() {
            for col in 0..5 {
                if bits & (0b1_0000 >> col) == 0 {
                    continue;
                }
                for dy in 0..scale {
                    for dx in 0..scale {
                        blend_px(
                            img,
                            pen_x + col as i32 * scale + dx,
                            y + row as i32 * scale + dy,
                            rgb,
                            255,
                        );
                    }
                }
            }
        }
        pen_x += 6 * scale;
    }
}

fn blend_px(img: &mut RgbaImage, x: i32, y: i32, rgb: [u8; 3], alpha: u8) {
    if x < 0 || y < 0 || x >= img.width() as i32 || y >= img.height() as i32 {
        return;
    }
    let px = img.get_pixel_mut(x as u32, y as u32);
    let a = alpha as u16;
    let inv = 255 - a;
    for c in 0..3 {
        px.0[c] = ((rgb[c] as u16 * a + px.0[c] as u16 * inv + 127) / 255) as u8;
    }
    px.0[3] = 255;
}

/// 5x7 row bitmaps for the built-in face. Lowercase letters reuse the
/// uppercase shapes; unknown characters render as a hollow box.
fn bitmap_glyph(ch: char) -> [u8; 7] {
    let ch = ch.to_ascii_uppercase();
    match ch {
        ' ' => [0; 7],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11110],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01110],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        '.' => [0b00000, 0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b01100],
        ',' => [0b00000, 0b00000, 0b00000, 0b00000, 0b01100, 0b00100, 0b01000],
        ':' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b01100, 0b00000],
        ';' => [0b00000, 0b01100, 0b01100, 0b00000, 0b01100, 0b00100, 0b01000],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00000, 0b00100],
        '?' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b00000, 0b00100],
        '\'' => [0b00100, 0b00100, 0b01000, 0b00000, 0b00000, 0b00000, 0b00000],
        '"' => [0b01010, 0b01010, 0b10100, 0b00000, 0b00000, 0b00000, 0b00000],
        '-' => [0b00000, 0b00000, 0b00000, 0b11111, 0b00000, 0b00000, 0b00000],
        '+' => [0b00000, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0b00000],
        '/' => [0b00001, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b10000],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        _ => [0b11111, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b11111],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bitmap_measure_scales_with_size_and_length() {
        let face = SlideFace::Bitmap;
        let narrow = face.measure("hi", 16.0);
        let wide = face.measure("hi there", 16.0);
        let large = face.measure("hi", 56.0);
        assert!(wide > narrow);
        assert!(large > narrow);
        assert_eq!(face.measure("", 56.0), 0.0);
    }

    #[test]
    fn bitmap_draw_marks_pixels_and_clips_at_edges() {
        let face = SlideFace::Bitmap;
        let mut img = RgbaImage::from_pixel(64, 64, image::Rgba([0, 0, 0, 255]));
        face.draw(&mut img, 2, 2, "A", 16.0, [255, 255, 255]);
        assert!(img.pixels().any(|p| p.0[0] == 255));

        // Off-canvas drawing must not panic.
        face.draw(&mut img, -100, -100, "edge", 16.0, [255, 255, 255]);
        face.draw(&mut img, 60, 60, "edge", 16.0, [255, 255, 255]);
    }

    #[test]
    fn resolve_always_yields_a_face() {
        // With no configured font this must never fail, even on systems
        // without any of the platform candidates.
        let face = SlideFace::resolve(Some(Path::new("/definitely/not/a/font.ttf")));
        assert!(face.measure("fallback", 36.0) > 0.0);
    }
}
