//! One-level collection traversal.
//!
//! A collection directory (`sections/`, `places/`, `tracks/`, ...) holds one
//! child directory per entity. The walker lists those children in byte-wise
//! name order, loads each one, and returns the results in that order. It
//! never descends further; nested collections are walked by the loader that
//! owns them.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::assets::AssetWarning;
use crate::context::LoadContext;
use crate::error::LoadError;
use crate::loader::{EntityKind, load_entity};

/// Immediate child directories of `dir`, sorted by name.
///
/// Returns `Ok(None)` when `dir` does not exist. Plain files and hidden
/// directories (leading `.`) are skipped.
pub fn child_dirs(dir: &Path) -> Result<Option<Vec<PathBuf>>, LoadError> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(LoadError::Collection {
                dir: dir.to_path_buf(),
                source,
            });
        }
    };

    let mut children = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Collection {
            dir: dir.to_path_buf(),
            source,
        })?;
        let hidden = entry.file_name().to_string_lossy().starts_with('.');
        let path = entry.path();
        if !hidden && path.is_dir() {
            children.push(path);
        }
    }
    children.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(Some(children))
}

/// Walk `dir` with an arbitrary per-child loader.
///
/// The first failing child aborts the walk; its error is wrapped with the
/// child's path and nothing loaded so far is returned. Warnings are appended
/// in child order.
pub fn walk<T, F>(
    ctx: &LoadContext,
    dir: &Path,
    warnings: &mut Vec<AssetWarning>,
    load: F,
) -> Result<Vec<T>, LoadError>
where
    T: Send,
    F: Fn(&LoadContext, &Path, &mut Vec<AssetWarning>) -> Result<T, LoadError> + Sync,
{
    let Some(children) = child_dirs(dir)? else {
        tracing::debug!(dir = %dir.display(), "collection absent");
        return Ok(Vec::new());
    };

    #[cfg(feature = "parallel")]
    if ctx.parallel() {
        return walk_parallel(ctx, &children, warnings, load);
    }

    let mut loaded = Vec::with_capacity(children.len());
    for child in &children {
        let entity = load(ctx, child, warnings).map_err(|e| e.in_entity(child))?;
        loaded.push(entity);
    }
    Ok(loaded)
}

#[cfg(feature = "parallel")]
fn walk_parallel<T, F>(
    ctx: &LoadContext,
    children: &[PathBuf],
    warnings: &mut Vec<AssetWarning>,
    load: F,
) -> Result<Vec<T>, LoadError>
where
    T: Send,
    F: Fn(&LoadContext, &Path, &mut Vec<AssetWarning>) -> Result<T, LoadError> + Sync,
{
    use rayon::prelude::*;

    // `collect` on an indexed parallel iterator keeps enumeration order.
    let results: Vec<(Result<T, LoadError>, Vec<AssetWarning>)> = children
        .par_iter()
        .map(|child| {
            let mut local = Vec::new();
            let result = load(ctx, child, &mut local);
            (result, local)
        })
        .collect();

    let mut loaded = Vec::with_capacity(children.len());
    for (child, (result, local)) in children.iter().zip(results) {
        loaded.push(result.map_err(|e| e.in_entity(child))?);
        warnings.extend(local);
    }
    Ok(loaded)
}

/// Walk `dir`, loading every child as an entity of kind `K`.
pub fn walk_collection<K>(
    ctx: &LoadContext,
    dir: &Path,
    warnings: &mut Vec<AssetWarning>,
) -> Result<Vec<K>, LoadError>
where
    K: EntityKind + Send,
{
    let loaded = walk(ctx, dir, warnings, load_entity::<K>)?;
    tracing::debug!(kind = K::KIND, dir = %dir.display(), count = loaded.len(), "walked collection");
    Ok(loaded)
}
