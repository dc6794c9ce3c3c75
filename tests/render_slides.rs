use std::io::Cursor;

use slidecast::content::{Content, Slide};
use slidecast::error::SlidecastResult;
use slidecast::fonts::SlideFace;
use slidecast::imagesearch::ImageSearch;
use slidecast::{RunPaths, SlideRenderer};

struct PhotoSearch {
    rgb: [u8; 3],
}

impl ImageSearch for PhotoSearch {
    fn fetch_landscape(&self, _query: &str) -> SlidecastResult<Option<Vec<u8>>> {
        let img = image::RgbImage::from_pixel(8, 8, image::Rgb(self.rgb));
        let mut out = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgb8(img)
            .write_to(&mut out, image::ImageFormat::Jpeg)
            .unwrap();
        Ok(Some(out.into_inner()))
    }
}

struct FailingSearch;

impl ImageSearch for FailingSearch {
    fn fetch_landscape(&self, _query: &str) -> SlidecastResult<Option<Vec<u8>>> {
        Err(anyhow::anyhow!("network unreachable").into())
    }
}

fn lesson(slide_count: usize) -> Content {
    Content {
        title: "The Water Cycle".to_string(),
        overview: "How water moves through the atmosphere.".to_string(),
        slides: (0..slide_count)
            .map(|i| Slide {
                title: format!("Stage {}", i + 1),
                body: "Water changes state and moves.".to_string(),
                key_points: vec!["evaporation".to_string(), "condensation".to_string()],
                narration: format!("Narration for stage {}.", i + 1),
            })
            .collect(),
        conclusion: "Every drop comes back around.".to_string(),
    }
}

#[test]
fn renders_one_image_per_slide_in_order() {
    let tmp = tempfile::tempdir().unwrap();
    let run = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let search = PhotoSearch { rgb: [200, 40, 40] };
    let renderer = SlideRenderer::new(SlideFace::Bitmap, &search);

    let slides = renderer.render(&lesson(3), &run).unwrap();
    assert_eq!(slides.len(), 3);
    for (i, slide) in slides.iter().enumerate() {
        assert_eq!(slide.index, i);
        assert_eq!(slide.image_path, run.slide_image_path(i));
        let img = image::open(&slide.image_path).unwrap();
        assert_eq!((img.width(), img.height()), (1920, 1080));
    }
}

#[test]
fn fetch_failure_degrades_to_solid_fallback() {
    let tmp = tempfile::tempdir().unwrap();
    let run = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let renderer = SlideRenderer::new(SlideFace::Bitmap, &FailingSearch);

    let slides = renderer.render(&lesson(1), &run).unwrap();
    assert_eq!(slides.len(), 1);

    // Corner is outside every text region, so it shows the solid fallback
    // after darkening and the white overlay.
    let img = image::open(&slides[0].image_path).unwrap().to_rgb8();
    assert_eq!(*img.get_pixel(0, 0), image::Rgb([196, 197, 201]));
}

#[test]
fn fetched_photo_replaces_the_fallback_background() {
    let tmp = tempfile::tempdir().unwrap();
    let run = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let search = PhotoSearch { rgb: [200, 40, 40] };
    let renderer = SlideRenderer::new(SlideFace::Bitmap, &search);

    let slides = renderer.render(&lesson(1), &run).unwrap();
    let img = image::open(&slides[0].image_path).unwrap().to_rgb8();
    assert_ne!(*img.get_pixel(0, 0), image::Rgb([196, 197, 201]));
}

#[test]
fn concurrent_runs_never_share_slide_images() {
    let tmp = tempfile::tempdir().unwrap();
    let a = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let b = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let renderer = SlideRenderer::new(SlideFace::Bitmap, &FailingSearch);

    let slides_a = renderer.render(&lesson(2), &a).unwrap();
    let slides_b = renderer.render(&lesson(2), &b).unwrap();

    b.cleanup();
    for slide in &slides_a {
        assert!(slide.image_path.exists());
    }
    for slide in &slides_b {
        assert!(!slide.image_path.exists());
    }
}

#[test]
fn empty_slide_list_aborts_the_render() {
    let tmp = tempfile::tempdir().unwrap();
    let run = RunPaths::create(tmp.path(), &tmp.path().join("videos")).unwrap();
    let renderer = SlideRenderer::new(SlideFace::Bitmap, &FailingSearch);

    let content = Content {
        title: "Empty".to_string(),
        ..Content::default()
    };
    assert!(renderer.render(&content, &run).is_err());
}
