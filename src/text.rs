//! Text labels.
//!
//! Font rasterization sits behind the [`TextShaper`] capability so the tree
//! never depends on a particular font stack. [`CosmicTextShaper`] is the
//! implementation used by real hosts.

use cosmic_text::{Attrs, Buffer, Family, FontSystem, Metrics, Shaping, SwashCache};

use crate::error::{MorphError, Result};

/// Name of the texture a text morph draws its raster into.
pub const TEXT_TEXTURE: &str = "text";

const DEFAULT_FONT_SIZE: f32 = 16.0;
const DEFAULT_DPI: f32 = 72.0;

/// White glyph coverage, 8-bit RGBA, rows top-first.
#[derive(Debug, Clone, PartialEq)]
pub struct TextRaster {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

pub trait TextShaper {
    /// Rasterize a single run of text at `px` pixels per em.
    fn rasterize(&mut self, text: &str, px: f32) -> Result<TextRaster>;
}

/// Text carried by a label morph.
///
/// `revision` increases on every change; the canvas re-rasterizes when it
/// differs from the revision it last drew.
#[derive(Debug, Clone)]
pub struct TextContent {
    text: String,
    font_size: f32,
    dpi: f32,
    revision: u64,
    rendered: Option<u64>,
}

impl TextContent {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            font_size: DEFAULT_FONT_SIZE,
            dpi: DEFAULT_DPI,
            revision: 0,
            rendered: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    pub fn dpi(&self) -> f32 {
        self.dpi
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.revision += 1;
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font_size = size;
        self.revision += 1;
    }

    pub fn set_dpi(&mut self, dpi: f32) {
        self.dpi = dpi;
        self.revision += 1;
    }

    /// Pixel size the font is rasterized at.
    pub fn pixel_size(&self) -> f32 {
        self.font_size * self.dpi / 72.0
    }

    pub fn needs_raster(&self) -> bool {
        self.rendered != Some(self.revision)
    }

    pub(crate) fn mark_rendered(&mut self) {
        self.rendered = Some(self.revision);
    }
}

pub struct CosmicTextShaper {
    font_system: FontSystem,
    swash_cache: SwashCache,
}

impl CosmicTextShaper {
    pub fn new() -> Self {
        Self {
            font_system: FontSystem::new(),
            swash_cache: SwashCache::new(),
        }
    }

    fn shape(&mut self, text: &str, px: f32) -> Buffer {
        let metrics = Metrics::new(px, px * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);

        buffer.set_size(&mut self.font_system, None, None);
        buffer.set_text(
            &mut self.font_system,
            text,
            &Attrs::new().family(Family::SansSerif),
            Shaping::Advanced,
            None,
        );
        buffer.shape_until_scroll(&mut self.font_system, true);
        buffer
    }
}

fn extent(buffer: &Buffer, px: f32) -> (f32, f32) {
    let mut width = 0.0f32;
    let mut height = 0.0f32;
    for run in buffer.layout_runs() {
        width = width.max(run.line_w);
        height += run.line_height;
    }

    // Empty text still occupies a line
    if height == 0.0 {
        height = px * 1.2;
    }
    (width, height)
}

impl Default for CosmicTextShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl TextShaper for CosmicTextShaper {
    fn rasterize(&mut self, text: &str, px: f32) -> Result<TextRaster> {
        if !px.is_finite() || px <= 0.0 {
            return Err(MorphError::Text(format!("invalid font size {px}")));
        }

        let buffer = self.shape(text, px);
        let (w, h) = extent(&buffer, px);
        let width = w.ceil().max(1.0) as u32;
        let height = h.ceil().max(1.0) as u32;
        let mut pixels = vec![0u8; (width * height * 4) as usize];

        buffer.draw(
            &mut self.font_system,
            &mut self.swash_cache,
            cosmic_text::Color::rgb(255, 255, 255),
            |x, y, w, h, color| {
                for dy in 0..h as i32 {
                    for dx in 0..w as i32 {
                        let (cx, cy) = (x + dx, y + dy);
                        if cx < 0 || cy < 0 || cx >= width as i32 || cy >= height as i32 {
                            continue;
                        }
                        let idx = ((cy as u32 * width + cx as u32) * 4) as usize;
                        pixels[idx] = 255;
                        pixels[idx + 1] = 255;
                        pixels[idx + 2] = 255;
                        pixels[idx + 3] = pixels[idx + 3].max(color.a());
                    }
                }
            },
        );

        Ok(TextRaster {
            width,
            height,
            pixels,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_pixel_size() {
        let mut content = TextContent::new("label");
        assert_eq!(content.pixel_size(), 16.0);
        content.set_dpi(144.0);
        assert_eq!(content.pixel_size(), 32.0);
    }

    #[test]
    fn test_content_revision_tracking() {
        let mut content = TextContent::new("a");
        assert!(content.needs_raster());
        content.mark_rendered();
        assert!(!content.needs_raster());

        content.set_text("b");
        assert!(content.needs_raster());
        assert_eq!(content.text(), "b");
    }

    #[test]
    fn test_rasterize_rejects_bad_size() {
        let mut shaper = CosmicTextShaper::new();
        assert!(matches!(
            shaper.rasterize("x", 0.0),
            Err(MorphError::Text(_))
        ));
    }

    #[test]
    fn test_rasterize_dimensions_match_buffer() {
        let mut shaper = CosmicTextShaper::new();
        let raster = shaper.rasterize("Hello", 16.0).unwrap();
        assert!(raster.width >= 1 && raster.height >= 1);
        assert_eq!(raster.pixels.len(), (raster.width * raster.height * 4) as usize);
    }
}
