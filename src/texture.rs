//! Texture records and asset loading.
//!
//! A texture is identified by a name resolved against the world's asset
//! directory. Raster formats (PNG, JPEG, GIF, WebP) are decoded through
//! `image`; SVG files are rasterized at their natural size through `resvg`.
//! Pixels are stored as normalized RGBA floats, rows top-first, and stay on
//! the CPU side until a render backend uploads them.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{MorphError, Result};

/// Opaque handle to a texture living in a render backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub u64);

#[derive(Debug, Clone)]
pub struct TextureRecord {
    pub name: String,
    /// Natural width in pixels
    pub width: u32,
    /// Natural height in pixels
    pub height: u32,
    /// RGBA in `[0, 1]`, `width * height * 4` values, top row first
    pub pixels: Vec<f32>,
    /// Multiplier applied to the natural size when the texture is activated
    pub scale: f32,
    pub path: Option<PathBuf>,
    /// Set once the pixels have been uploaded
    pub gpu: Option<TextureHandle>,
}

impl TextureRecord {
    /// Build a record from 8-bit RGBA rows.
    pub fn from_rgba8(name: impl Into<String>, width: u32, height: u32, rgba: &[u8]) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            pixels: rgba.iter().map(|&c| c as f32 / 255.0).collect(),
            scale: 1.0,
            path: None,
            gpu: None,
        }
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn is_uploaded(&self) -> bool {
        self.gpu.is_some()
    }

    /// Size the owning morph takes when this texture is activated.
    pub fn display_size(&self) -> (f32, f32) {
        (
            (self.width as f32 * self.scale).round(),
            (self.height as f32 * self.scale).round(),
        )
    }

    /// Pixels packed back into 8-bit RGBA, the layout GPUs consume.
    pub fn to_rgba8(&self) -> Vec<u8> {
        self.pixels
            .iter()
            .map(|&c| (c.clamp(0.0, 1.0) * 255.0).round() as u8)
            .collect()
    }
}

/// Textures cached on a morph, at most one of them active.
#[derive(Debug, Default)]
pub struct TextureSet {
    records: HashMap<String, TextureRecord>,
    active: Option<String>,
}

impl TextureSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&TextureRecord> {
        self.records.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut TextureRecord> {
        self.records.get_mut(name)
    }

    /// Store a record, returning the one it replaced.
    pub fn insert(&mut self, record: TextureRecord) -> Option<TextureRecord> {
        self.records.insert(record.name.clone(), record)
    }

    /// Make `name` the active texture. Returns `false` if it is not cached.
    pub fn activate(&mut self, name: &str) -> bool {
        if self.records.contains_key(name) {
            self.active = Some(name.to_string());
            true
        } else {
            false
        }
    }

    pub fn deactivate(&mut self) {
        self.active = None;
    }

    pub fn active_name(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active(&self) -> Option<&TextureRecord> {
        self.active.as_deref().and_then(|name| self.records.get(name))
    }

    pub fn active_mut(&mut self) -> Option<&mut TextureRecord> {
        match self.active.as_deref() {
            Some(name) => self.records.get_mut(name),
            None => None,
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextureRecord> {
        self.records.values()
    }

    /// Take every GPU handle out of the set, leaving the records un-uploaded.
    pub fn take_handles(&mut self) -> Vec<TextureHandle> {
        self.records
            .values_mut()
            .filter_map(|record| record.gpu.take())
            .collect()
    }
}

/// Resolves texture names to files and decodes them.
#[derive(Debug, Clone)]
pub struct TextureLoader {
    base_path: PathBuf,
    default_scale: f32,
}

impl TextureLoader {
    pub fn new(base_path: impl Into<PathBuf>, default_scale: f32) -> Self {
        Self {
            base_path: base_path.into(),
            default_scale,
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Find the file backing `name`.
    ///
    /// A name with an extension is taken literally; a bare name tries
    /// `<name>.png` and then `<name>.svg`.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        let direct = self.base_path.join(name);
        let candidates = if Path::new(name).extension().is_some() {
            vec![direct]
        } else {
            vec![direct.with_extension("png"), direct.with_extension("svg")]
        };

        candidates
            .into_iter()
            .find(|path| path.is_file())
            .ok_or_else(|| MorphError::AssetNotFound {
                name: name.to_string(),
                base: self.base_path.clone(),
            })
    }

    /// Decode the asset backing `name` into a fresh, un-uploaded record.
    pub fn load(&self, name: &str) -> Result<TextureRecord> {
        let path = self.resolve(name)?;
        let is_svg = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("svg"))
            .unwrap_or(false);

        let (width, height, rgba) = if is_svg {
            load_svg(&path)?
        } else {
            load_raster(&path)?
        };

        log::debug!("loaded texture {} ({}x{}) from {}", name, width, height, path.display());

        let mut record = TextureRecord::from_rgba8(name, width, height, &rgba);
        record.scale = self.default_scale;
        record.path = Some(path);
        Ok(record)
    }
}

fn decode_error(path: &Path, reason: impl ToString) -> MorphError {
    MorphError::AssetDecode {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn load_raster(path: &Path) -> Result<(u32, u32, Vec<u8>)> {
    let img = image::open(path).map_err(|e| decode_error(path, e))?;
    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(decode_error(path, "empty image"));
    }
    Ok((width, height, rgba.into_raw()))
}

fn load_svg(path: &Path) -> Result<(u32, u32, Vec<u8>)> {
    let data = std::fs::read(path).map_err(|e| decode_error(path, e))?;
    let tree = resvg::usvg::Tree::from_data(&data, &resvg::usvg::Options::default())
        .map_err(|e| decode_error(path, e))?;
    let size = tree.size();
    let width = size.width().ceil() as u32;
    let height = size.height().ceil() as u32;

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| decode_error(path, "empty image"))?;
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::identity(),
        &mut pixmap.as_mut(),
    );

    // The pixmap is premultiplied; records hold straight alpha
    let rgba = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    Ok((width, height, rgba))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(dir: &Path, name: &str, width: u32, height: u32) {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba([255, 0, 0, 255]));
        img.save(dir.join(name)).unwrap();
    }

    #[test]
    fn test_record_from_rgba8_normalizes() {
        let record = TextureRecord::from_rgba8("t", 1, 1, &[255, 0, 51, 255]);
        assert_eq!(record.pixels, vec![1.0, 0.0, 0.2, 1.0]);
        assert_eq!(record.to_rgba8(), vec![255, 0, 51, 255]);
        assert!(!record.is_uploaded());
    }

    #[test]
    fn test_record_display_size_uses_scale() {
        let record = TextureRecord::from_rgba8("t", 64, 30, &vec![0; 64 * 30 * 4]).with_scale(0.5);
        assert_eq!(record.display_size(), (32.0, 15.0));
    }

    #[test]
    fn test_texture_set_activate() {
        let mut set = TextureSet::new();
        assert!(!set.activate("missing"));
        assert!(set.active().is_none());

        set.insert(TextureRecord::from_rgba8("a", 1, 1, &[0, 0, 0, 0]));
        set.insert(TextureRecord::from_rgba8("b", 1, 1, &[0, 0, 0, 0]));
        assert!(set.activate("b"));
        assert_eq!(set.active_name(), Some("b"));
        assert_eq!(set.len(), 2);

        set.deactivate();
        assert!(set.active().is_none());
    }

    #[test]
    fn test_texture_set_take_handles() {
        let mut set = TextureSet::new();
        let mut record = TextureRecord::from_rgba8("a", 1, 1, &[0, 0, 0, 0]);
        record.gpu = Some(TextureHandle(7));
        set.insert(record);
        set.insert(TextureRecord::from_rgba8("b", 1, 1, &[0, 0, 0, 0]));

        assert_eq!(set.take_handles(), vec![TextureHandle(7)]);
        assert!(set.iter().all(|r| r.gpu.is_none()));
    }

    #[test]
    fn test_loader_resolves_png_before_svg() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "icon.png", 2, 2);
        std::fs::write(dir.path().join("icon.svg"), "<svg/>").unwrap();

        let loader = TextureLoader::new(dir.path(), 1.0);
        assert_eq!(loader.resolve("icon").unwrap(), dir.path().join("icon.png"));
    }

    #[test]
    fn test_loader_missing_asset() {
        let dir = tempfile::tempdir().unwrap();
        let loader = TextureLoader::new(dir.path(), 1.0);
        let err = loader.load("nothing").unwrap_err();
        assert!(matches!(err, MorphError::AssetNotFound { ref name, .. } if name == "nothing"));
    }

    #[test]
    fn test_loader_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        write_png(dir.path(), "red.png", 3, 2);

        let loader = TextureLoader::new(dir.path(), 0.5);
        let record = loader.load("red").unwrap();
        assert_eq!((record.width, record.height), (3, 2));
        assert_eq!(record.pixels.len(), 3 * 2 * 4);
        assert_eq!(&record.pixels[..4], &[1.0, 0.0, 0.0, 1.0]);
        assert_eq!(record.scale, 0.5);
        assert_eq!(record.path.as_deref(), Some(dir.path().join("red.png").as_path()));
    }

    #[test]
    fn test_loader_rasterizes_svg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("square.svg"),
            r##"<svg xmlns="http://www.w3.org/2000/svg" width="4" height="6"><rect width="4" height="6" fill="#00ff00"/></svg>"##,
        )
        .unwrap();

        let loader = TextureLoader::new(dir.path(), 1.0);
        let record = loader.load("square").unwrap();
        assert_eq!((record.width, record.height), (4, 6));
        assert_eq!(&record.pixels[..4], &[0.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn test_loader_reports_undecodable_file() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.png"), b"not a png").unwrap();

        let loader = TextureLoader::new(dir.path(), 1.0);
        assert!(matches!(
            loader.load("broken"),
            Err(MorphError::AssetDecode { .. })
        ));
    }
}
