use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::error::SlidecastResult;

/// Unique filesystem scope for one pipeline run.
///
/// Every temporary path (slide images, background cache, concat manifest) and
/// the output filename carries the run id, so concurrent runs never observe
/// each other's files. The earlier timestamp-at-second-resolution scheme
/// collided under concurrency; run ids replace it.
#[derive(Clone, Debug)]
pub struct RunPaths {
    run_id: String,
    run_dir: PathBuf,
    slides_dir: PathBuf,
    cache_dir: PathBuf,
    output_path: PathBuf,
}

impl RunPaths {
    /// Create the per-run directory tree under `temp_root` and reserve an
    /// output path under `output_root`.
    pub fn create(temp_root: &Path, output_root: &Path) -> SlidecastResult<Self> {
        let run_id = uuid::Uuid::new_v4().simple().to_string();
        Self::create_with_id(temp_root, output_root, &run_id)
    }

    pub fn create_with_id(
        temp_root: &Path,
        output_root: &Path,
        run_id: &str,
    ) -> SlidecastResult<Self> {
        let run_dir = temp_root.join(format!("run_{run_id}"));
        let slides_dir = run_dir.join("slides");
        let cache_dir = run_dir.join("backgrounds");

        for dir in [&run_dir, &slides_dir, &cache_dir] {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("create run directory '{}'", dir.display()))?;
        }
        std::fs::create_dir_all(output_root)
            .with_context(|| format!("create output directory '{}'", output_root.display()))?;

        Ok(Self {
            run_id: run_id.to_string(),
            output_path: output_root.join(format!("video_{run_id}.mp4")),
            run_dir,
            slides_dir,
            cache_dir,
        })
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Slide images are named by 1-based slide index.
    pub fn slide_image_path(&self, index: usize) -> PathBuf {
        self.slides_dir.join(format!("slide_{}.png", index + 1))
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn concat_manifest_path(&self) -> PathBuf {
        self.run_dir.join("concat.txt")
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Remove this run's temporary tree. Intermediate images are owned
    /// exclusively by the run, so this never touches another run's files.
    /// Best-effort: the caller may have already moved or deleted files.
    pub fn cleanup(&self) {
        let _ = std::fs::remove_dir_all(&self.run_dir);
    }
}

/// Filesystem-safe slug of a background-image search query, used as the
/// cache key prefix.
pub fn query_slug(query: &str) -> String {
    let mut slug = String::with_capacity(query.len());
    let mut last_dash = true;
    for ch in query.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    if slug.is_empty() {
        slug.push_str("query");
    }
    slug
}
