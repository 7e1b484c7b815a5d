use std::fs;
use std::path::Path;

use morpheas::prelude::*;
use tempfile::TempDir;

fn write_png(dir: &Path, file: &str, width: u32, height: u32) {
    image::RgbaImage::from_pixel(width, height, image::Rgba([200, 100, 50, 255]))
        .save(dir.join(file))
        .unwrap();
}

fn assets() -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    write_png(dir.path(), "small.png", 3, 2);
    write_png(dir.path(), "large.png", 8, 6);
    dir
}

fn world_in(dir: &TempDir) -> World {
    World::new(WorldConfig::new().asset_path(dir.path()))
}

#[test]
fn test_texture_loaded_on_add() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = assets();
    let mut world = world_in(&dir);

    let id = world.add(Morph::new().texture("small")).unwrap();

    let morph = world.morph(id).unwrap();
    assert_eq!(morph.get_size(), Size::new(3.0, 2.0));
    assert_eq!(world.texture(id), Some("small"));

    let record = morph.active_texture().unwrap();
    assert_eq!(record.path.as_deref(), Some(dir.path().join("small.png").as_path()));
    assert_eq!(&record.to_rgba8()[..4], &[200, 100, 50, 255]);
    assert!(!record.is_uploaded());
}

#[test]
fn test_texture_scale_applies_to_size() {
    let dir = assets();
    let mut world = World::new(
        WorldConfig::new()
            .asset_path(dir.path())
            .texture_scale(2.0),
    );

    let id = world.add(Morph::new().texture("small")).unwrap();
    assert_eq!(world.morph(id).unwrap().get_size(), Size::new(6.0, 4.0));
}

#[test]
fn test_texture_cached_after_first_load() {
    let dir = assets();
    let mut world = world_in(&dir);
    let id = world.add(Morph::new()).unwrap();

    world.set_texture(id, "small").unwrap();
    fs::remove_file(dir.path().join("small.png")).unwrap();
    world.set_texture(id, "small").unwrap();

    assert_eq!(world.morph(id).unwrap().textures().len(), 1);
    assert_eq!(world.texture(id), Some("small"));
}

#[test]
fn test_switching_textures_resizes() {
    let dir = assets();
    let mut world = world_in(&dir);
    let id = world.add(Morph::new()).unwrap();

    world.set_texture(id, "small").unwrap();
    world.set_texture(id, "large").unwrap();
    assert_eq!(world.morph(id).unwrap().get_size(), Size::new(8.0, 6.0));

    world.set_texture(id, "small").unwrap();
    let morph = world.morph(id).unwrap();
    assert_eq!(morph.get_size(), Size::new(3.0, 2.0));
    assert_eq!(morph.textures().len(), 2);
}

#[test]
fn test_missing_texture_keeps_active_one() {
    let dir = assets();
    let mut world = world_in(&dir);
    let id = world.add(Morph::new().texture("large")).unwrap();

    let err = world.set_texture(id, "ghost").unwrap_err();
    assert!(matches!(err, MorphError::AssetNotFound { ref name, .. } if name == "ghost"));

    let morph = world.morph(id).unwrap();
    assert_eq!(world.texture(id), Some("large"));
    assert_eq!(morph.textures().len(), 1);
    assert_eq!(morph.get_size(), Size::new(8.0, 6.0));
}

#[test]
fn test_explicit_extension() {
    let dir = assets();
    let mut world = world_in(&dir);
    let id = world.add(Morph::new().texture("large.png")).unwrap();
    assert_eq!(world.texture(id), Some("large.png"));
}

#[test]
fn test_svg_fallback() {
    let dir = assets();
    fs::write(
        dir.path().join("badge.svg"),
        r##"<svg xmlns="http://www.w3.org/2000/svg" width="12" height="7">
            <rect width="12" height="7" fill="#00ff00"/>
        </svg>"##,
    )
    .unwrap();
    let mut world = world_in(&dir);

    let id = world.add(Morph::new().texture("badge")).unwrap();

    let morph = world.morph(id).unwrap();
    assert_eq!(morph.get_size(), Size::new(12.0, 7.0));
    let record = morph.active_texture().unwrap();
    assert_eq!(&record.to_rgba8()[..4], &[0, 255, 0, 255]);
}

#[test]
fn test_corrupt_file_is_a_decode_error() {
    let dir = assets();
    fs::write(dir.path().join("broken.png"), b"not a png").unwrap();
    let mut world = world_in(&dir);

    let err = world.add(Morph::new().texture("broken")).unwrap_err();
    assert!(matches!(err, MorphError::AssetDecode { .. }));
    assert!(world.children(world.root()).is_empty());
}

#[test]
fn test_texture_property() {
    let dir = assets();
    let mut world = world_in(&dir);
    let id = world.add(Morph::new()).unwrap();

    world
        .set_property(id, Property::Texture, PropertyValue::Text(Some("small".into())))
        .unwrap();
    assert_eq!(
        world.get_property(id, Property::Texture).unwrap(),
        PropertyValue::Text(Some("small".into()))
    );

    world
        .set_property(id, Property::Texture, PropertyValue::Text(None))
        .unwrap();
    assert_eq!(world.texture(id), None);
    // The record stays cached for the next activation
    assert_eq!(world.morph(id).unwrap().textures().len(), 1);
}
