//! Top-level aggregation of a region root into one [`Datafile`].

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::assets::AssetWarning;
use crate::context::{CancelToken, LoadContext};
use crate::error::LoadError;
use crate::loader::load_entity;
use crate::model::{Datafile, Dayroom, Meta, Section, Story, Track};
use crate::walker::walk_collection;

pub const META_DIR: &str = "meta";
pub const SECTIONS_DIR: &str = "sections";
pub const TRACKS_DIR: &str = "tracks";
pub const STORIES_DIR: &str = "stories";
pub const DAYROOMS_DIR: &str = "dayrooms";

/// A successful aggregation: the datafile plus every non-fatal asset
/// warning, in document order.
#[derive(Debug, Clone)]
pub struct Aggregation {
    pub datafile: Datafile,
    pub warnings: Vec<AssetWarning>,
}

/// Aggregate `root` for `language` with default options.
pub fn aggregate(root: &Path, language: &str) -> Result<Aggregation, LoadError> {
    Aggregator::new(root, language).run()
}

/// Configurable aggregation of one region root.
#[derive(Debug, Clone)]
pub struct Aggregator {
    root: PathBuf,
    language: String,
    parallel: bool,
    cancel: CancelToken,
    started_at: Option<DateTime<Utc>>,
}

impl Aggregator {
    pub fn new(root: impl Into<PathBuf>, language: &str) -> Self {
        Self {
            root: root.into(),
            language: language.to_string(),
            parallel: false,
            cancel: CancelToken::new(),
            started_at: None,
        }
    }

    /// Load independent collections and siblings concurrently. Only takes
    /// effect with the `parallel` feature.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Use `at` instead of the current time as the generation moment.
    pub fn started_at(mut self, at: DateTime<Utc>) -> Self {
        self.started_at = Some(at);
        self
    }

    /// Run the aggregation.
    ///
    /// Any error means no datafile was produced. A cancelled run always
    /// yields a single [`LoadError::Cancelled`].
    pub fn run(&self) -> Result<Aggregation, LoadError> {
        let root = std::path::absolute(&self.root).map_err(|source| LoadError::Read {
            file: self.root.clone(),
            source,
        })?;
        let ctx = LoadContext::new(&root, &self.language)
            .with_started_at(self.started_at.unwrap_or_else(Utc::now))
            .with_cancel(self.cancel.clone())
            .with_parallel(self.parallel);

        let span = tracing::info_span!("aggregate", root = %root.display(), lang = %self.language);
        let _guard = span.enter();

        let result = load_region(&ctx);
        if ctx.is_cancelled() {
            return Err(LoadError::Cancelled);
        }
        let aggregation = result?;

        let datafile = &aggregation.datafile;
        tracing::info!(
            sections = datafile.sections.len(),
            places = datafile.sections.iter().map(|s| s.places.len()).sum::<usize>(),
            tracks = datafile.tracks.len(),
            stories = datafile.stories.len(),
            dayrooms = datafile.dayrooms.len(),
            missing_images = aggregation.warnings.len(),
            "aggregated region"
        );
        Ok(aggregation)
    }
}

struct Collections {
    sections: Vec<Section>,
    tracks: Vec<Track>,
    stories: Vec<Story>,
    dayrooms: Vec<Dayroom>,
}

fn load_region(ctx: &LoadContext) -> Result<Aggregation, LoadError> {
    let mut warnings = Vec::new();

    let meta_dir = ctx.root().join(META_DIR);
    let meta: Meta =
        load_entity(ctx, &meta_dir, &mut warnings).map_err(|e| e.in_entity(&meta_dir))?;

    let collections = load_collections(ctx, &mut warnings)?;

    Ok(Aggregation {
        datafile: Datafile {
            meta,
            sections: collections.sections,
            tracks: collections.tracks,
            stories: collections.stories,
            dayrooms: collections.dayrooms,
        },
        warnings,
    })
}

fn load_collections(
    ctx: &LoadContext,
    warnings: &mut Vec<AssetWarning>,
) -> Result<Collections, LoadError> {
    #[cfg(feature = "parallel")]
    if ctx.parallel() {
        return load_collections_parallel(ctx, warnings);
    }

    let root = ctx.root();
    Ok(Collections {
        sections: walk_collection(ctx, &root.join(SECTIONS_DIR), warnings)?,
        tracks: walk_collection(ctx, &root.join(TRACKS_DIR), warnings)?,
        stories: walk_collection(ctx, &root.join(STORIES_DIR), warnings)?,
        dayrooms: walk_collection(ctx, &root.join(DAYROOMS_DIR), warnings)?,
    })
}

#[cfg(feature = "parallel")]
type Staged<K> = (Result<Vec<K>, LoadError>, Vec<AssetWarning>);

#[cfg(feature = "parallel")]
fn stage<K>(ctx: &LoadContext, collection: &str) -> Staged<K>
where
    K: crate::loader::EntityKind + Send,
{
    let mut warnings = Vec::new();
    let result = walk_collection(ctx, &ctx.root().join(collection), &mut warnings);
    (result, warnings)
}

/// Walk the four collections concurrently. Errors and warnings are taken in
/// stage order so the outcome matches a sequential run.
#[cfg(feature = "parallel")]
fn load_collections_parallel(
    ctx: &LoadContext,
    warnings: &mut Vec<AssetWarning>,
) -> Result<Collections, LoadError> {
    let (sections, (tracks, (stories, dayrooms))) = rayon::join(
        || stage::<Section>(ctx, SECTIONS_DIR),
        || {
            rayon::join(
                || stage::<Track>(ctx, TRACKS_DIR),
                || {
                    rayon::join(
                        || stage::<Story>(ctx, STORIES_DIR),
                        || stage::<Dayroom>(ctx, DAYROOMS_DIR),
                    )
                },
            )
        },
    );

    let sections = collect_stage(sections, warnings)?;
    let tracks = collect_stage(tracks, warnings)?;
    let stories = collect_stage(stories, warnings)?;
    let dayrooms = collect_stage(dayrooms, warnings)?;
    Ok(Collections {
        sections,
        tracks,
        stories,
        dayrooms,
    })
}

#[cfg(feature = "parallel")]
fn collect_stage<K>(
    (result, local): Staged<K>,
    warnings: &mut Vec<AssetWarning>,
) -> Result<Vec<K>, LoadError> {
    let loaded = result?;
    warnings.extend(local);
    Ok(loaded)
}
