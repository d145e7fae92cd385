//! Field mappings for the six entity kinds.

use crate::assets::{AssetWarning, Quality};
use crate::context::{LoadContext, truncate_to_minute};
use crate::error::LoadError;
use crate::loader::{ContentLayout, EntityKind, Parts, TextField};
use crate::model::{ContentBlocks, Dayroom, Meta, Place, Section, Story, Track};
use crate::schema::{DayroomData, MetaData, PlaceData, SectionData, StoryData, TrackData};
use crate::walker::walk_collection;

/// Collection directory holding a section's places.
pub const PLACES_DIR: &str = "places";

impl EntityKind for Meta {
    const KIND: &'static str = "meta";
    const LAYOUT: ContentLayout = ContentLayout::Flat;
    const TEXT: &'static [TextField] = &[TextField::Name];

    type Data = MetaData;

    fn assemble(
        ctx: &LoadContext,
        mut parts: Parts<MetaData>,
        _warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let computed = truncate_to_minute(ctx.started_at());
        let data = parts.data;

        // Metadata is applied after the computed default, so a `generated_at`
        // key in data.json wins.
        let generated_at = match data.generated_at {
            Some(from_json) => {
                tracing::warn!(
                    %from_json,
                    %computed,
                    "meta data.json overrides generated_at"
                );
                from_json
            }
            None => computed,
        };

        tracing::info!(region = %data.region_id, "loaded region meta");
        Ok(Meta {
            region_id: data.region_id,
            region_name: parts.text.take(TextField::Name),
            generated_at,
            contributors: data.contributors,
            featured: data.featured,
            sources: data.sources,
        })
    }
}

impl EntityKind for Section {
    const KIND: &'static str = "section";
    const LAYOUT: ContentLayout = ContentLayout::Nested;
    const TEXT: &'static [TextField] = &[TextField::Name, TextField::QuickInfo];

    type Data = SectionData;

    fn assemble(
        ctx: &LoadContext,
        mut parts: Parts<SectionData>,
        warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let places: Vec<Place> = walk_collection(ctx, &parts.dir.join(PLACES_DIR), warnings)?;
        let data = parts.data;

        tracing::info!(section = %data.id, places = places.len(), "loaded section");
        Ok(Section {
            id: data.id,
            name: parts.text.take(TextField::Name),
            icon: data.icon,
            bg_image: data.background_image,
            quick_info: parts.text.take(TextField::QuickInfo),
            places,
        })
    }
}

impl EntityKind for Place {
    const KIND: &'static str = "place";
    const LAYOUT: ContentLayout = ContentLayout::Nested;
    const TEXT: &'static [TextField] =
        &[TextField::Name, TextField::QuickInfo, TextField::Overview];
    const BLOCKS: bool = true;
    const IMAGE_TIER: Option<Quality> = Some(Quality::Compressed);

    type Data = PlaceData;

    fn images(data: &PlaceData) -> &[String] {
        &data.images
    }

    fn assemble(
        _ctx: &LoadContext,
        mut parts: Parts<PlaceData>,
        _warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let data = parts.data;

        tracing::debug!(place = %data.id, blocks = parts.blocks.len(), "loaded place");
        for (i, path) in parts.image_paths.iter().enumerate() {
            tracing::debug!(place = %data.id, index = i, path = %path.display(), "image");
        }

        Ok(Place {
            id: data.id,
            name: parts.text.take(TextField::Name),
            section: data.section,
            icon: data.icon,
            quick_info: parts.text.take(TextField::QuickInfo),
            overview: parts.text.take(TextField::Overview),
            lat: data.lat,
            lng: data.lng,
            website_url: data.website_url,
            facebook_url: data.facebook_url,
            blocks: ContentBlocks(parts.blocks),
            images: data.images,
            image_paths: parts.image_paths,
        })
    }
}

impl EntityKind for Track {
    const KIND: &'static str = "track";
    const LAYOUT: ContentLayout = ContentLayout::Flat;
    const TEXT: &'static [TextField] =
        &[TextField::Name, TextField::Overview, TextField::QuickInfo];

    type Data = TrackData;

    fn assemble(
        _ctx: &LoadContext,
        mut parts: Parts<TrackData>,
        _warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let data = parts.data;

        tracing::info!(track = %data.id, points = data.coords.len(), "loaded track");
        Ok(Track {
            id: data.id,
            name: parts.text.take(TextField::Name),
            quick_info: parts.text.take(TextField::QuickInfo),
            overview: parts.text.take(TextField::Overview),
            images: data.images,
            coords: data.coords,
        })
    }
}

impl EntityKind for Story {
    const KIND: &'static str = "story";
    const LAYOUT: ContentLayout = ContentLayout::Flat;
    const TEXT: &'static [TextField] = &[TextField::Name];
    const IMAGE_TIER: Option<Quality> = Some(Quality::Compressed);

    type Data = StoryData;

    fn images(data: &StoryData) -> &[String] {
        &data.images
    }

    fn assemble(
        _ctx: &LoadContext,
        mut parts: Parts<StoryData>,
        _warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let data = parts.data;

        tracing::info!(story = %data.id, "loaded story");
        Ok(Story {
            id: data.id,
            name: parts.text.take(TextField::Name),
            markdown_file: data.markdown_filename,
            images: data.images,
            image_paths: parts.image_paths,
        })
    }
}

impl EntityKind for Dayroom {
    const KIND: &'static str = "dayroom";
    const LAYOUT: ContentLayout = ContentLayout::Nested;
    const TEXT: &'static [TextField] =
        &[TextField::Name, TextField::Overview, TextField::QuickInfo];

    type Data = DayroomData;

    fn assemble(
        _ctx: &LoadContext,
        mut parts: Parts<DayroomData>,
        _warnings: &mut Vec<AssetWarning>,
    ) -> Result<Self, LoadError> {
        let data = parts.data;

        tracing::info!(dayroom = %data.id, "loaded dayroom");
        Ok(Dayroom {
            id: data.id,
            kind: data.kind,
            section: data.section,
            name: parts.text.take(TextField::Name),
            quick_info: parts.text.take(TextField::QuickInfo),
            overview: parts.text.take(TextField::Overview),
            images: data.images,
            lat: data.lat,
            lng: data.lng,
            leader: data.leader,
        })
    }
}
