//! Region Data -- aggregates hand-authored region content into one datafile.
//!
//! A region root is a directory tree mixing per-entity `data.json` metadata
//! with per-language plain-text files. This crate walks that tree and merges
//! both sources into a single [`model::Datafile`] for client apps.
//!
//! # Pipeline
//!
//! 1. **Meta** -- `meta/<lang>/name.txt` + `meta/data.json`.
//! 2. **Sections** -- each child of `sections/`, each of which walks its own
//!    `places/` collection.
//! 3. **Tracks**, **Stories**, **Dayrooms** -- optional collections; an
//!    absent directory yields no entities.
//!
//! The first fatal error aborts the whole run with the failing entity's path.
//! Missing image files are reported separately as
//! [`assets::AssetWarning`]s and never abort anything.
//!
//! ```rust,ignore
//! let aggregation = region_data::aggregate(Path::new("regions/krakow"), "en")?;
//! for warning in &aggregation.warnings {
//!     eprintln!("{warning}");
//! }
//! serde_json::to_writer(out, &aggregation.datafile)?;
//! ```
//!
//! # Key Types
//!
//! - [`aggregate::Aggregator`] -- orchestrates one run; optional concurrency
//!   (feature `parallel`) and cooperative cancellation.
//! - [`loader::EntityKind`] -- declarative field mapping driving the single
//!   generic [`loader::load_entity`].
//! - [`walker`] -- one-level, ordered collection traversal.
//! - [`text`] -- prose files and tolerant three-line content blocks.
//! - [`assets`] -- image path resolution and existence checks.

pub mod aggregate;
pub mod assets;
pub mod context;
pub mod error;
pub mod kinds;
pub mod loader;
pub mod model;
pub mod schema;
pub mod text;
pub mod walker;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use aggregate::{Aggregation, Aggregator, aggregate};
pub use assets::{AssetWarning, Quality};
pub use context::CancelToken;
pub use error::LoadError;
pub use model::{Datafile, Dayroom, Meta, Place, Section, Story, Track};
