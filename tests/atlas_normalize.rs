use glam::UVec2;
use kestrel_sprite_anim::atlas::{normalize, parse_atlas_json, parse_atlas_slice, Rect};
use kestrel_sprite_anim::{AtlasError, AtlasFrames};
use serde_json::json;
use std::fs;

#[test]
fn strip_image_is_cut_into_equal_columns() {
    let atlas = normalize(None, Some(UVec2::new(100, 20)), Some(4)).expect("strip atlas");
    let frames = atlas.flat_frames().expect("strip atlases are flat");
    assert_eq!(frames.len(), 4);
    for (index, frame) in frames.iter().enumerate() {
        assert_eq!(frame.rect, Rect::new(index as u32 * 25, 0, 25, 20));
        assert_eq!(frame.source_size, UVec2::new(25, 20));
    }
    assert_eq!(atlas.image_size, UVec2::new(100, 20));
    assert_eq!(atlas.meta.version.as_deref(), Some("1.0"));
    assert_eq!(atlas.meta.scale.as_deref(), Some("1"));
}

#[test]
fn uneven_strip_yields_no_frames() {
    let atlas = normalize(None, Some(UVec2::new(100, 20)), Some(3)).expect("uneven strip still normalizes");
    assert!(atlas.is_flat());
    assert_eq!(atlas.frame_count(), 0, "100px cannot be split into 3 equal frames");
}

#[test]
fn missing_inputs_are_reported() {
    assert!(matches!(normalize(None, None, None), Err(AtlasError::MissingInput)));
    assert!(matches!(normalize(None, Some(UVec2::new(64, 16)), None), Err(AtlasError::MissingInput)));
    assert!(matches!(normalize(None, None, Some(4)), Err(AtlasError::MissingInput)));
}

#[test]
fn array_atlas_is_adopted_in_order() {
    let raw = json!({
        "frames": [
            { "filename": "b", "frame": { "x": 16, "y": 0, "w": 16, "h": 16 }, "sourceSize": { "w": 16, "h": 16 } },
            { "filename": "a", "frame": { "x": 0, "y": 0, "w": 16, "h": 16 }, "sourceSize": { "w": 16, "h": 16 } }
        ],
        "meta": { "size": { "w": 32, "h": 16 }, "image": "sheet.png" }
    });
    let atlas = normalize(Some(&raw), None, None).expect("array atlas");
    let frames = atlas.flat_frames().expect("array atlases are flat");
    let names: Vec<&str> = frames.iter().filter_map(|frame| frame.name.as_deref()).collect();
    assert_eq!(names, ["b", "a"]);
    assert_eq!(frames[0].rect.x, 16);
    assert_eq!(atlas.meta.image.as_deref(), Some("sheet.png"));
}

#[test]
fn atlas_json_takes_precedence_over_strip_inputs() {
    let raw = json!({
        "frames": [
            { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } }
        ],
        "meta": { "size": { "w": 8, "h": 8 } }
    });
    let atlas = normalize(Some(&raw), Some(UVec2::new(400, 100)), Some(4)).expect("json atlas");
    assert_eq!(atlas.image_size, UVec2::new(8, 8));
    assert_eq!(atlas.frame_count(), 1);
}

#[test]
fn hash_atlas_keeps_keys_in_file_order() {
    let bytes = fs::read("fixtures/atlases/hero_hash.json").expect("read hero fixture");
    let atlas = parse_atlas_slice(&bytes).expect("parse hero fixture");
    let keys: Vec<&str> = match &atlas.frames {
        AtlasFrames::Keyed(entries) => entries.iter().map(|entry| entry.key.as_ref()).collect(),
        AtlasFrames::Flat(_) => panic!("hash atlas must stay keyed"),
    };
    assert_eq!(keys, ["Hero_Walk_0", "Hero_Walk_1", "Hero_Walk_2", "Hero_Run_0", "Hero_Run_1", "Hero_Idle_0"]);
    assert_eq!(atlas.image_size, UVec2::new(128, 96));
    assert_eq!(atlas.first_frame().map(|frame| frame.rect), Some(Rect::new(0, 0, 32, 48)));
}

#[test]
fn keyed_value_order_survives_value_input() {
    let raw = json!({
        "frames": {
            "walk_2": { "frame": { "x": 16, "y": 0, "w": 8, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } },
            "walk_10": { "frame": { "x": 8, "y": 0, "w": 8, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } },
            "walk_1": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } }
        },
        "meta": { "size": { "w": 24, "h": 8 } }
    });
    let atlas = normalize(Some(&raw), None, None).expect("keyed value atlas");
    let keys: Vec<&str> =
        atlas.keyed_frames().expect("keyed").iter().map(|entry| entry.key.as_ref()).collect();
    assert_eq!(keys, ["walk_2", "walk_10", "walk_1"]);
}

#[test]
fn missing_meta_size_is_malformed() {
    let bytes = fs::read("fixtures/atlases/broken/no_meta_size.json").expect("read broken fixture");
    let err = parse_atlas_slice(&bytes).expect_err("meta.size is required");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)), "unexpected error: {err:?}");
    assert!(err.to_string().contains("size"), "unexpected message: {err}");

    let raw = json!({ "frames": [] });
    let err = normalize(Some(&raw), None, None).expect_err("meta is required");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)));
}

#[test]
fn missing_source_size_is_malformed() {
    let raw = json!({
        "frames": { "idle": { "frame": { "x": 0, "y": 0, "w": 8, "h": 8 } } },
        "meta": { "size": { "w": 8, "h": 8 } }
    });
    let err = normalize(Some(&raw), None, None).expect_err("sourceSize is required");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)));
    assert!(err.to_string().contains("sourceSize"), "unexpected message: {err}");
}

#[test]
fn zero_sized_frames_are_rejected() {
    let raw = json!({
        "frames": [ { "frame": { "x": 0, "y": 0, "w": 0, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } } ],
        "meta": { "size": { "w": 8, "h": 8 } }
    });
    let err = normalize(Some(&raw), None, None).expect_err("empty rect");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)));

    let raw = json!({ "frames": [], "meta": { "size": { "w": 0, "h": 8 } } });
    assert!(matches!(normalize(Some(&raw), None, None), Err(AtlasError::MalformedAtlas(_))));
}

#[test]
fn rect_past_u32_range_is_malformed() {
    let raw = json!({
        "frames": [ { "frame": { "x": 4294967295u32, "y": 0, "w": 2, "h": 8 }, "sourceSize": { "w": 2, "h": 8 } } ],
        "meta": { "size": { "w": 8, "h": 8 } }
    });
    let err = normalize(Some(&raw), None, None).expect_err("x + w overflows");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)), "unexpected error: {err:?}");
    assert!(err.to_string().contains("overflows"), "unexpected message: {err}");

    let text = r#"{
        "frames": { "tall": { "frame": { "x": 0, "y": 4294967290, "w": 8, "h": 8 }, "sourceSize": { "w": 8, "h": 8 } } },
        "meta": { "size": { "w": 8, "h": 8 } }
    }"#;
    let err = parse_atlas_json(text).expect_err("y + h overflows");
    assert!(matches!(err, AtlasError::MalformedAtlas(_)), "unexpected error: {err:?}");
}

#[test]
fn unparsable_json_surfaces_as_json_error() {
    let err = parse_atlas_slice(b"{ not json").expect_err("garbage input");
    assert!(matches!(err, AtlasError::Json(_)));
}
