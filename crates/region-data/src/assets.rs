//! Image asset path resolution.
//!
//! Assets are pre-rendered `.webp` files under `<root>/images/<tier>/`. The
//! resolver computes paths and checks existence, but a missing file is only
//! ever a warning.

use std::path::{Path, PathBuf};

/// Image quality tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Quality {
    /// The variant bundled with client apps.
    Compressed,
    /// The full, uncompressed source image.
    Original,
}

impl Quality {
    pub fn dir_name(self) -> &'static str {
        match self {
            Quality::Compressed => "compressed",
            Quality::Original => "original",
        }
    }
}

/// An image identifier that did not resolve to an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetWarning {
    pub image: String,
    pub path: PathBuf,
}

impl std::fmt::Display for AssetWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "image '{}' does not exist at {}", self.image, self.path.display())
    }
}

/// Path of `image` in the given tier. Pure path arithmetic.
pub fn image_path(root: &Path, image: &str, quality: Quality) -> PathBuf {
    root.join("images")
        .join(quality.dir_name())
        .join(format!("{image}.webp"))
}

/// Resolve `image` and check that it exists.
///
/// The computed path is returned either way; when the file is absent a
/// warning is pushed onto `warnings` and logged.
pub fn resolve_image(
    root: &Path,
    image: &str,
    quality: Quality,
    warnings: &mut Vec<AssetWarning>,
) -> PathBuf {
    let path = image_path(root, image, quality);
    if !path.is_file() {
        tracing::warn!(image, path = %path.display(), "image does not exist");
        warnings.push(AssetWarning {
            image: image.to_string(),
            path: path.clone(),
        });
    }
    path
}

/// Resolve every identifier in `images`, preserving length and order.
pub fn resolve_images(
    root: &Path,
    images: &[String],
    quality: Quality,
    warnings: &mut Vec<AssetWarning>,
) -> Vec<PathBuf> {
    images
        .iter()
        .map(|image| resolve_image(root, image, quality, warnings))
        .collect()
}
