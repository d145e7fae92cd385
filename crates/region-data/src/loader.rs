//! Generic entity loading.
//!
//! Each entity kind is described declaratively by an [`EntityKind`] impl:
//! which localized prose files it needs, where they live, whether it carries
//! numbered content blocks, and which image tier its `images` resolve to.
//! [`load_entity`] drives every kind through the same steps:
//!
//! 1. read the required prose files from the localized directory;
//! 2. scan numbered content blocks, if the kind has them;
//! 3. parse `data.json` into the kind's metadata struct;
//! 4. resolve image identifiers, if the kind has a tier;
//! 5. hand the parts to [`EntityKind::assemble`].
//!
//! Prose and metadata fields are disjoint, so the merge in step 5 is a plain
//! struct construction.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;

use crate::assets::{AssetWarning, Quality, resolve_images};
use crate::context::LoadContext;
use crate::error::LoadError;
use crate::text::{ContentBlock, NumberedBlocks, read_prose};

/// Name of the metadata file in every entity directory.
pub const METADATA_FILE: &str = "data.json";

// ===========================================================================
// Field mapping
// ===========================================================================

/// Where an entity keeps its localized files, relative to its directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentLayout {
    /// `<entity>/content/<lang>/`
    Nested,
    /// `<entity>/<lang>/`
    Flat,
}

impl ContentLayout {
    pub fn localized_dir(self, entity_dir: &Path, language: &str) -> PathBuf {
        match self {
            ContentLayout::Nested => entity_dir.join("content").join(language),
            ContentLayout::Flat => entity_dir.join(language),
        }
    }
}

/// A localized prose field backed by its own text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Name,
    QuickInfo,
    Overview,
}

impl TextField {
    pub fn file_name(self) -> &'static str {
        match self {
            TextField::Name => "name.txt",
            TextField::QuickInfo => "quick_info.txt",
            TextField::Overview => "overview.txt",
        }
    }
}

/// Prose values read for one entity, keyed by field.
#[derive(Debug, Default)]
pub struct LocalizedText {
    values: Vec<(TextField, String)>,
}

impl LocalizedText {
    /// Take the value of `field`, or an empty string if the kind never
    /// declared it.
    pub fn take(&mut self, field: TextField) -> String {
        match self.values.iter().position(|(f, _)| *f == field) {
            Some(i) => self.values.swap_remove(i).1,
            None => String::new(),
        }
    }
}

/// Everything [`load_entity`] gathered for one entity.
pub struct Parts<D> {
    pub dir: PathBuf,
    pub data: D,
    pub text: LocalizedText,
    pub blocks: Vec<ContentBlock>,
    pub image_paths: Vec<PathBuf>,
}

/// Declarative description of one entity kind.
pub trait EntityKind: Sized {
    /// Human-readable kind, used in logs.
    const KIND: &'static str;
    const LAYOUT: ContentLayout;
    /// Required prose files, read in this order.
    const TEXT: &'static [TextField];
    /// Whether numbered `text_<n>` blocks are scanned.
    const BLOCKS: bool = false;
    /// Tier to resolve `images` against; `None` skips resolution.
    const IMAGE_TIER: Option<Quality> = None;

    type Data: DeserializeOwned;

    /// Image identifiers listed in the metadata.
    fn images(_data: &Self::Data) -> &[String] {
        &[]
    }

    fn assemble(
        ctx: &LoadContext,
        parts: Parts<Self::Data>,
        warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError>;
}

// ===========================================================================
// Loading
// ===========================================================================

/// Load one entity of kind `K` from `dir`.
///
/// Errors are returned unwrapped; the caller adds the entity path.
pub fn load_entity<K: EntityKind>(
    ctx: &LoadContext,
    dir: &Path,
    warnings: &mut Vec<AssetWarning>,
) -> Result<K, LoadError> {
    ctx.check_cancelled()?;

    let localized = K::LAYOUT.localized_dir(dir, ctx.language());
    let mut text = LocalizedText::default();
    for &field in K::TEXT {
        let value = read_prose(&localized.join(field.file_name()), dir)?;
        text.values.push((field, value));
    }

    let blocks = if K::BLOCKS {
        NumberedBlocks::new(&localized).collect::<Result<Vec<_>, _>>()?
    } else {
        Vec::new()
    };

    ctx.check_cancelled()?;
    let data: K::Data = read_metadata(&dir.join(METADATA_FILE))?;

    let image_paths = match K::IMAGE_TIER {
        Some(quality) => resolve_images(ctx.root(), K::images(&data), quality, warnings),
        None => Vec::new(),
    };

    K::assemble(
        ctx,
        Parts {
            dir: dir.to_path_buf(),
            data,
            text,
            blocks,
            image_paths,
        },
        warnings,
    )
}

/// Read and strictly parse a metadata file.
pub fn read_metadata<T: DeserializeOwned>(file: &Path) -> Result<T, LoadError> {
    let content = std::fs::read_to_string(file).map_err(|e| LoadError::MalformedMetadata {
        file: file.to_path_buf(),
        detail: e.to_string(),
    })?;
    serde_json::from_str(&content).map_err(|e| LoadError::MalformedMetadata {
        file: file.to_path_buf(),
        detail: e.to_string(),
    })
}
