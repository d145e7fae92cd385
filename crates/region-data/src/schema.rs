//! Serde structs for the per-entity `data.json` files.
//!
//! Only structured fields live here; localized prose comes from text files.
//! Every field defaults to its zero value when absent or `null`, and unknown
//! keys are ignored, so the JSON step only fails on syntax or type errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Read an explicit `null` as the field's zero value.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// `meta/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct MetaData {
    #[serde(deserialize_with = "null_as_default")]
    pub region_id: String,
    /// Overrides the loader-computed generation time when present.
    pub generated_at: Option<DateTime<Utc>>,
    #[serde(deserialize_with = "null_as_default")]
    pub contributors: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub featured: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub sources: Vec<SourceData>,
}

/// A source attribution listed in region metadata.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceData {
    #[serde(deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub website_url: String,
}

/// `sections/<id>/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SectionData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_default")]
    pub background_image: String,
}

/// `sections/<section>/places/<id>/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PlaceData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub section: String,
    #[serde(deserialize_with = "null_as_default")]
    pub icon: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lng: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub website_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub facebook_url: String,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Coords {
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lng: f64,
}

/// `tracks/<id>/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct TrackData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub coords: Vec<Coords>,
}

/// `stories/<id>/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoryData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub markdown_filename: String,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}

/// `dayrooms/<id>/data.json`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DayroomData {
    #[serde(deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(rename = "type", deserialize_with = "null_as_default")]
    pub kind: String,
    #[serde(deserialize_with = "null_as_default")]
    pub section: String,
    #[serde(deserialize_with = "null_as_default")]
    pub lat: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub lng: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub leader: String,
    #[serde(deserialize_with = "null_as_default")]
    pub images: Vec<String>,
}
