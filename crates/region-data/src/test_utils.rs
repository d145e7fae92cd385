//! Shared test helpers for unit and integration tests.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Everything here
//! writes real files under the system temp directory; each [`TestDir`] is
//! unique per process and per call, and is removed on drop.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::assets::Quality;

// ===========================================================================
// Temporary directories
// ===========================================================================

static NEXT_DIR: AtomicUsize = AtomicUsize::new(0);

/// A temporary directory removed when dropped.
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new(suffix: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "region_data_test_{suffix}_{}_{}",
            std::process::id(),
            NEXT_DIR.fetch_add(1, Ordering::Relaxed)
        ));
        let _ = fs::remove_dir_all(&path);
        fs::create_dir_all(&path).unwrap();
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write `contents` to `rel`, creating parent directories. Returns the
    /// absolute path written.
    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        let path = self.path.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, contents).unwrap();
        path
    }

    pub fn mkdir(&self, rel: &str) -> PathBuf {
        let path = self.path.join(rel);
        fs::create_dir_all(&path).unwrap();
        path
    }

    pub fn remove(&self, rel: &str) {
        let path = self.path.join(rel);
        if path.is_dir() {
            fs::remove_dir_all(path).unwrap();
        } else {
            fs::remove_file(path).unwrap();
        }
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.path);
    }
}

// ===========================================================================
// Region fixtures
// ===========================================================================

/// Builder for region content trees in the on-disk layout the loaders read.
///
/// Every method writes immediately and returns `&Self` for chaining.
pub struct RegionFixture {
    dir: TestDir,
    lang: String,
}

impl RegionFixture {
    pub fn new(suffix: &str) -> Self {
        Self::with_lang(suffix, "en")
    }

    pub fn with_lang(suffix: &str, lang: &str) -> Self {
        Self {
            dir: TestDir::new(suffix),
            lang: lang.to_string(),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn lang(&self) -> &str {
        &self.lang
    }

    pub fn write(&self, rel: &str, contents: &str) -> PathBuf {
        self.dir.write(rel, contents)
    }

    pub fn remove(&self, rel: &str) {
        self.dir.remove(rel);
    }

    pub fn meta(&self, region_name: &str, data_json: &str) -> &Self {
        let lang = &self.lang;
        self.write(&format!("meta/{lang}/name.txt"), &format!("{region_name}\n"));
        self.write("meta/data.json", data_json);
        self
    }

    pub fn section(&self, id: &str, name: &str, quick_info: &str) -> &Self {
        self.section_json(
            id,
            &format!(r#"{{"id":"{id}","icon":"","background_image":"{id}_bg"}}"#),
        );
        let lang = &self.lang;
        self.write(
            &format!("sections/{id}/content/{lang}/name.txt"),
            &format!("{name}\n"),
        );
        self.write(
            &format!("sections/{id}/content/{lang}/quick_info.txt"),
            &format!("{quick_info}\n"),
        );
        self
    }

    pub fn section_json(&self, id: &str, json: &str) -> &Self {
        self.write(&format!("sections/{id}/data.json"), json);
        self
    }

    /// A place with all prose files and `data.json` referencing `images`.
    pub fn place(&self, section: &str, id: &str, images: &[&str]) -> &Self {
        let images = json_list(images);
        self.place_json(
            section,
            id,
            &format!(
                r#"{{"id":"{id}","section":"{section}","lat":50.5,"lng":19.25,"website_url":"https://{id}.example","facebook_url":"","images":{images}}}"#
            ),
        );
        let base = format!("sections/{section}/places/{id}/content/{}", self.lang);
        self.write(&format!("{base}/name.txt"), &format!("{id} name\n"));
        self.write(&format!("{base}/quick_info.txt"), &format!("{id} quick\n"));
        self.write(&format!("{base}/overview.txt"), &format!("{id} overview\n"));
        self
    }

    pub fn place_json(&self, section: &str, id: &str, json: &str) -> &Self {
        self.write(&format!("sections/{section}/places/{id}/data.json"), json);
        self
    }

    /// Write numbered content blocks `text_0..` for a place.
    pub fn place_blocks(&self, section: &str, id: &str, blocks: &[(&str, &str)]) -> &Self {
        let base = format!("sections/{section}/places/{id}/content/{}", self.lang);
        for (i, (header, body)) in blocks.iter().enumerate() {
            self.write(&format!("{base}/text_{i}"), &format!("{header}\n///\n{body}\n"));
        }
        self
    }

    pub fn track(&self, id: &str, coords: &[(f64, f64)]) -> &Self {
        let coords = coords
            .iter()
            .map(|(lat, lng)| format!(r#"{{"lat":{lat},"lng":{lng}}}"#))
            .collect::<Vec<_>>()
            .join(",");
        self.write(
            &format!("tracks/{id}/data.json"),
            &format!(r#"{{"id":"{id}","images":[],"coords":[{coords}]}}"#),
        );
        let base = format!("tracks/{id}/{}", self.lang);
        self.write(&format!("{base}/name.txt"), &format!("{id} name\n"));
        self.write(&format!("{base}/overview.txt"), &format!("{id} overview\n"));
        self.write(&format!("{base}/quick_info.txt"), &format!("{id} quick\n"));
        self
    }

    pub fn story(&self, id: &str, images: &[&str]) -> &Self {
        let images = json_list(images);
        self.write(
            &format!("stories/{id}/data.json"),
            &format!(r#"{{"id":"{id}","markdown_filename":"{id}.md","images":{images}}}"#),
        );
        self.write(
            &format!("stories/{id}/{}/name.txt", self.lang),
            &format!("{id} name\n"),
        );
        self
    }

    pub fn dayroom(&self, id: &str, section: &str) -> &Self {
        self.write(
            &format!("dayrooms/{id}/data.json"),
            &format!(
                r#"{{"id":"{id}","type":"club","section":"{section}","lat":1.5,"lng":2.5,"leader":"Ann","images":[]}}"#
            ),
        );
        let base = format!("dayrooms/{id}/content/{}", self.lang);
        self.write(&format!("{base}/name.txt"), &format!("{id} name\n"));
        self.write(&format!("{base}/overview.txt"), &format!("{id} overview\n"));
        self.write(&format!("{base}/quick_info.txt"), &format!("{id} quick\n"));
        self
    }

    pub fn image(&self, quality: Quality, id: &str) -> &Self {
        self.write(&format!("images/{}/{id}.webp", quality.dir_name()), "RIFF");
        self
    }

    /// The region used throughout the end-to-end tests: one section `food`
    /// holding one place `joe` whose single image exists.
    pub fn standard(suffix: &str) -> Self {
        let fixture = Self::new(suffix);
        fixture
            .meta("Region X", r#"{"region_id":"rx","contributors":[]}"#)
            .section_json(
                "food",
                r#"{"id":"food","icon":"🍔","background_image":"food_bg"}"#,
            )
            .write("sections/food/content/en/name.txt", "Food\n");
        fixture.write("sections/food/content/en/quick_info.txt", "Eat well\n");
        fixture
            .place("food", "joe", &["joe1"])
            .place_json("food", "joe", r#"{"id":"joe","images":["joe1"]}"#)
            .image(Quality::Compressed, "joe1");
        fixture
    }
}

fn json_list(items: &[&str]) -> String {
    let quoted: Vec<String> = items.iter().map(|i| format!("\"{i}\"")).collect();
    format!("[{}]", quoted.join(","))
}
