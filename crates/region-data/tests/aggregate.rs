use std::path::Path;

use chrono::{Duration, TimeZone, Timelike, Utc};
use region_data::test_utils::RegionFixture;
use region_data::{Aggregator, LoadError, Quality, aggregate};

// -----------------------------------------------------------------------
// End-to-end
// -----------------------------------------------------------------------

#[test]
fn standard_region_end_to_end() {
    let fixture = RegionFixture::standard("e2e_standard");

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    let datafile = &aggregation.datafile;

    assert_eq!(datafile.meta.region_id, "rx");
    assert_eq!(datafile.meta.region_name, "Region X");
    assert_eq!(datafile.sections.len(), 1);
    assert_eq!(datafile.sections[0].name, "Food");
    assert_eq!(datafile.sections[0].icon, "🍔");
    assert_eq!(datafile.sections[0].quick_info, "Eat well");
    assert_eq!(datafile.sections[0].places[0].id, "joe");

    let paths: Vec<&Path> = datafile.sections[0].places[0].image_paths().collect();
    assert_eq!(paths.len(), 1);
    assert!(paths[0].ends_with("images/compressed/joe1.webp"));
    assert!(aggregation.warnings.is_empty());

    assert!(datafile.tracks.is_empty());
    assert!(datafile.stories.is_empty());
    assert!(datafile.dayrooms.is_empty());
}

#[test]
fn localized_fields_match_files_verbatim() {
    let fixture = RegionFixture::standard("e2e_verbatim");
    fixture.write(
        "sections/food/places/joe/content/en/overview.txt",
        "Line one\nLine two, with \"quotes\" and ünïcödé\n",
    );

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    assert_eq!(
        aggregation.datafile.sections[0].places[0].overview,
        "Line one\nLine two, with \"quotes\" and ünïcödé"
    );
}

#[test]
fn every_collection_is_loaded_in_directory_order() {
    let fixture = RegionFixture::standard("e2e_full");
    fixture
        .section("culture", "Culture", "Museums")
        .place("culture", "museum", &[])
        .track("river", &[(50.0, 19.9), (50.1, 20.0)])
        .track("forest", &[])
        .story("legend", &["dragon"])
        .image(Quality::Compressed, "dragon")
        .dayroom("seniors", "culture");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;

    let sections: Vec<&str> = datafile.sections.iter().map(|s| s.id.as_str()).collect();
    assert_eq!(sections, vec!["culture", "food"]);
    let tracks: Vec<&str> = datafile.tracks.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(tracks, vec!["forest", "river"]);
    assert_eq!(datafile.tracks[1].coords.len(), 2);
    assert_eq!(datafile.stories[0].markdown_file, "legend.md");
    assert_eq!(datafile.dayrooms[0].section, "culture");
    assert_eq!(datafile.image_paths().count(), 2);
}

#[test]
fn serialized_datafile_shape() {
    let fixture = RegionFixture::standard("e2e_json");
    fixture.place_blocks("food", "joe", &[("Menu", "Fries")]);

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    let value = serde_json::to_value(&datafile).unwrap();

    assert_eq!(value["meta"]["region_name"], "Region X");
    assert_eq!(value["sections"][0]["background_image"], "food_bg");
    let joe = &value["sections"][0]["places"][0];
    assert_eq!(joe["headers"], serde_json::json!(["Menu"]));
    assert_eq!(joe["content"], serde_json::json!(["Fries"]));
    assert_eq!(joe["images"], serde_json::json!(["joe1"]));
    assert_eq!(value["tracks"], serde_json::json!([]));
    assert!(!value.to_string().contains(".webp"));
}

// -----------------------------------------------------------------------
// Idempotence and timestamps
// -----------------------------------------------------------------------

#[test]
fn repeated_runs_are_identical_apart_from_timestamp() {
    let fixture = RegionFixture::standard("e2e_idempotent");
    fixture.track("river", &[(1.0, 2.0)]).story("legend", &[]);

    let first = Aggregator::new(fixture.root(), "en")
        .started_at(Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap())
        .run()
        .unwrap();
    let mut second = Aggregator::new(fixture.root(), "en")
        .started_at(Utc.with_ymd_and_hms(2024, 6, 1, 9, 15, 0).unwrap())
        .run()
        .unwrap();

    assert_ne!(first.datafile.meta.generated_at, second.datafile.meta.generated_at);
    second.datafile.meta.generated_at = first.datafile.meta.generated_at;
    assert_eq!(first.datafile, second.datafile);
    assert_eq!(first.warnings, second.warnings);
}

#[test]
fn generated_at_is_rounded_down_to_the_minute() {
    let fixture = RegionFixture::standard("e2e_minute");
    let started =
        Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 59).unwrap() + Duration::milliseconds(750);

    let meta = Aggregator::new(fixture.root(), "en")
        .started_at(started)
        .run()
        .unwrap()
        .datafile
        .meta;
    assert_eq!(
        meta.generated_at,
        Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap()
    );
}

#[test]
fn default_clock_has_whole_minutes() {
    let fixture = RegionFixture::standard("e2e_clock");
    let meta = aggregate(fixture.root(), "en").unwrap().datafile.meta;
    assert_eq!(meta.generated_at.second(), 0);
    assert_eq!(meta.generated_at.nanosecond(), 0);
}

// -----------------------------------------------------------------------
// Tolerance
// -----------------------------------------------------------------------

#[test]
fn truncated_block_file_is_accepted() {
    let fixture = RegionFixture::standard("e2e_truncated");
    fixture.write("sections/food/places/joe/content/en/text_0", "Header\n");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    let place = &datafile.sections[0].places[0];
    assert_eq!(place.blocks.len(), 1);
    assert_eq!(place.blocks[0].header, "Header");
    assert_eq!(place.blocks[0].body, "");
}

#[test]
fn block_scan_stops_at_first_gap() {
    let fixture = RegionFixture::standard("e2e_blocks");
    fixture.place_blocks("food", "joe", &[("A", "a"), ("B", "b")]);
    fixture.write("sections/food/places/joe/content/en/text_3", "D\n///\nd\n");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    let place = &datafile.sections[0].places[0];
    let headers: Vec<&str> = place.blocks.iter().map(|b| b.header.as_str()).collect();
    assert_eq!(headers, vec!["A", "B"]);
}

#[test]
fn lone_later_block_is_never_scanned() {
    let fixture = RegionFixture::standard("e2e_lone_block");
    fixture.write("sections/food/places/joe/content/en/text_2", "C\n///\nc\n");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    let place = &datafile.sections[0].places[0];
    assert!(place.blocks.is_empty());
}

#[test]
fn absent_optional_collections_are_empty() {
    let fixture = RegionFixture::standard("e2e_optional");
    assert!(!fixture.root().join("tracks").exists());

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    assert!(datafile.tracks.is_empty());
    assert!(datafile.stories.is_empty());
    assert!(datafile.dayrooms.is_empty());
}

#[test]
fn section_without_places_directory_is_empty() {
    let fixture = RegionFixture::standard("e2e_no_places");
    fixture.section("empty", "Empty", "Nothing here");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    assert_eq!(datafile.sections[0].id, "empty");
    assert!(datafile.sections[0].places.is_empty());
}

#[test]
fn metadata_missing_fields_take_zero_values() {
    let fixture = RegionFixture::standard("e2e_sparse_json");

    let datafile = aggregate(fixture.root(), "en").unwrap().datafile;
    let place = &datafile.sections[0].places[0];
    // The standard fixture's joe/data.json only has id and images.
    assert_eq!(place.section, "");
    assert_eq!(place.lat, 0.0);
    assert_eq!(place.website_url, "");
}

#[test]
fn null_metadata_fields_take_zero_values() {
    let fixture = RegionFixture::standard("e2e_null_json");
    fixture.place_json(
        "food",
        "joe",
        r#"{"id":"joe","facebook_url":null,"lat":null,"images":null}"#,
    );

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    let place = &aggregation.datafile.sections[0].places[0];
    assert_eq!(place.id, "joe");
    assert_eq!(place.facebook_url, "");
    assert_eq!(place.lat, 0.0);
    assert!(place.images.is_empty());
    assert_eq!(place.image_paths().count(), 0);
    assert!(aggregation.warnings.is_empty());
}

// -----------------------------------------------------------------------
// Assets
// -----------------------------------------------------------------------

#[test]
fn missing_image_warns_but_succeeds() {
    let fixture = RegionFixture::standard("e2e_missing_image");
    fixture.remove("images/compressed/joe1.webp");

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    let expected = fixture.root().join("images/compressed/joe1.webp");

    let paths: Vec<&Path> = aggregation.datafile.sections[0].places[0]
        .image_paths()
        .collect();
    assert_eq!(paths, vec![expected.as_path()]);
    assert_eq!(aggregation.warnings.len(), 1);
    assert_eq!(aggregation.warnings[0].image, "joe1");
    assert_eq!(aggregation.warnings[0].path, expected);
}

#[test]
fn original_tier_does_not_satisfy_compressed() {
    let fixture = RegionFixture::standard("e2e_original_tier");
    fixture.remove("images/compressed/joe1.webp");
    fixture.image(Quality::Original, "joe1");

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    assert_eq!(aggregation.warnings.len(), 1);
}

#[test]
fn warnings_follow_document_order() {
    let fixture = RegionFixture::standard("e2e_warning_order");
    fixture
        .place("food", "kim", &["k1", "k2"])
        .story("legend", &["s1"]);

    let aggregation = aggregate(fixture.root(), "en").unwrap();
    let images: Vec<&str> = aggregation
        .warnings
        .iter()
        .map(|w| w.image.as_str())
        .collect();
    assert_eq!(images, vec!["k1", "k2", "s1"]);
}

// -----------------------------------------------------------------------
// Fatal errors
// -----------------------------------------------------------------------

#[test]
fn missing_overview_is_fatal_with_path() {
    let fixture = RegionFixture::standard("e2e_fatal");
    fixture.remove("sections/food/places/joe/content/en/overview.txt");

    let err = aggregate(fixture.root(), "en").unwrap_err();
    let expected = fixture
        .root()
        .join("sections/food/places/joe/content/en/overview.txt");

    assert!(matches!(
        err.root_cause(),
        LoadError::MissingContent { file, .. } if file == &expected
    ));
    assert_eq!(
        err.entity_path(),
        Some(fixture.root().join("sections/food").as_path())
    );
    let msg = err.to_string();
    assert!(msg.contains("sections/food/places/joe"));
    assert!(msg.contains("overview.txt"));
}

#[test]
fn malformed_place_metadata_is_fatal() {
    let fixture = RegionFixture::standard("e2e_malformed");
    fixture.place_json("food", "joe", r#"{"id":"joe","lat":"north"}"#);

    let err = aggregate(fixture.root(), "en").unwrap_err();
    assert!(matches!(
        err.root_cause(),
        LoadError::MalformedMetadata { file, .. } if file.ends_with("places/joe/data.json")
    ));
}

#[test]
fn later_stage_failure_discards_earlier_results() {
    let fixture = RegionFixture::standard("e2e_late_failure");
    fixture.dayroom("club", "food");
    fixture.remove("dayrooms/club/content/en/name.txt");

    let err = aggregate(fixture.root(), "en").unwrap_err();
    assert_eq!(
        err.entity_path(),
        Some(fixture.root().join("dayrooms/club").as_path())
    );
}

#[test]
fn first_failing_stage_wins() {
    let fixture = RegionFixture::standard("e2e_stage_order");
    fixture.track("river", &[]).story("legend", &[]);
    fixture.write("tracks/river/data.json", "{");
    fixture.remove("stories/legend/en/name.txt");

    let err = aggregate(fixture.root(), "en").unwrap_err();
    assert!(matches!(
        err.root_cause(),
        LoadError::MalformedMetadata { .. }
    ));
}
