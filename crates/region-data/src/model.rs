//! The aggregated datafile and its entities.
//!
//! These are the serialized output types. Each is built once by its loader
//! and never modified afterwards. Derived image paths are kept beside the
//! entity but are never serialized.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::schema::{Coords, SourceData};
use crate::text::ContentBlock;

/// Root document handed to the output sink.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Datafile {
    pub meta: Meta,
    pub sections: Vec<Section>,
    pub tracks: Vec<Track>,
    pub stories: Vec<Story>,
    pub dayrooms: Vec<Dayroom>,
}

impl Datafile {
    /// Every derived image path, sections and their places first, then stories.
    pub fn image_paths(&self) -> impl Iterator<Item = &Path> {
        let places = self
            .sections
            .iter()
            .flat_map(|s| s.places.iter())
            .flat_map(|p| p.image_paths());
        let stories = self.stories.iter().flat_map(|s| s.image_paths());
        places.chain(stories)
    }
}

/// Region identity and provenance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Meta {
    pub region_id: String,
    pub region_name: String,
    pub generated_at: DateTime<Utc>,
    pub contributors: Vec<String>,
    pub featured: Vec<String>,
    pub sources: Vec<SourceData>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Section {
    pub id: String,
    pub name: String,
    pub icon: String,
    #[serde(rename = "background_image")]
    pub bg_image: String,
    pub quick_info: String,
    pub places: Vec<Place>,
}

/// A single point of interest.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Place {
    pub id: String,
    pub name: String,
    pub section: String,
    pub icon: String,
    pub quick_info: String,
    pub overview: String,
    pub lat: f64,
    pub lng: f64,
    pub website_url: String,
    pub facebook_url: String,
    #[serde(flatten)]
    pub blocks: ContentBlocks,
    pub images: Vec<String>,
    #[serde(skip)]
    pub(crate) image_paths: Vec<PathBuf>,
}

impl Place {
    /// Absolute compressed-tier paths, one per entry of `images`. They are
    /// specific to the machine that ran the aggregation.
    pub fn image_paths(&self) -> impl Iterator<Item = &Path> {
        self.image_paths.iter().map(PathBuf::as_path)
    }
}

/// Ordered content blocks of a place.
///
/// Serialized as the two parallel arrays `headers` and `content`, which is
/// the shape client apps read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentBlocks(pub Vec<ContentBlock>);

impl ContentBlocks {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ContentBlock> {
        self.0.iter()
    }
}

impl std::ops::Index<usize> for ContentBlocks {
    type Output = ContentBlock;

    fn index(&self, index: usize) -> &ContentBlock {
        &self.0[index]
    }
}

impl Serialize for ContentBlocks {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let headers: Vec<&str> = self.0.iter().map(|b| b.header.as_str()).collect();
        let content: Vec<&str> = self.0.iter().map(|b| b.body.as_str()).collect();

        let mut map = serializer.serialize_map(Some(2))?;
        map.serialize_entry("headers", &headers)?;
        map.serialize_entry("content", &content)?;
        map.end()
    }
}

/// A linear geographic feature such as a bike trail.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub quick_info: String,
    pub overview: String,
    pub images: Vec<String>,
    pub coords: Vec<Coords>,
}

/// A longer piece of text about a particular topic.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Story {
    pub id: String,
    pub name: String,
    #[serde(rename = "markdown_filename")]
    pub markdown_file: String,
    pub images: Vec<String>,
    #[serde(skip)]
    pub(crate) image_paths: Vec<PathBuf>,
}

impl Story {
    pub fn image_paths(&self) -> impl Iterator<Item = &Path> {
        self.image_paths.iter().map(PathBuf::as_path)
    }
}

/// A venue run by the local community.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dayroom {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub section: String,
    pub name: String,
    pub quick_info: String,
    pub overview: String,
    pub images: Vec<String>,
    pub lat: f64,
    pub lng: f64,
    pub leader: String,
}
