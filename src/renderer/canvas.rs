use crate::error::Result;
use crate::geometry::{pixel_to_ndc, rounded_rect_points, texcoord_span, Color, Point, Rect};
use crate::text::{TextShaper, TEXT_TEXTURE};
use crate::texture::TextureRecord;
use crate::tree::NodeId;
use crate::world::World;

use super::vertex::{ColorVertex, QuadVertex};
use super::{DrawCommand, Frame, RenderBackend};

/// Turns a world into frames for a [`RenderBackend`].
///
/// Textures are uploaded the first time a morph showing them is drawn and
/// reused afterwards. GPU handles of removed morphs are released at the start
/// of the next render.
pub struct Canvas<B: RenderBackend> {
    backend: B,
    shaper: Option<Box<dyn TextShaper>>,
    frame: Frame,
}

impl<B: RenderBackend> Canvas<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            shaper: None,
            frame: Frame::default(),
        }
    }

    /// Install the shaper text morphs are rasterized with.
    pub fn with_text_shaper(mut self, shaper: impl TextShaper + 'static) -> Self {
        self.shaper = Some(Box::new(shaper));
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn into_backend(self) -> B {
        self.backend
    }

    /// The last rendered frame.
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Free every GPU handle held by `world`, e.g. before dropping or
    /// rebuilding it. Textures are uploaded again if drawn later.
    pub fn release_all(&mut self, world: &mut World) {
        let handles = world.take_all_textures();
        log::debug!("releasing {} textures", handles.len());
        for handle in handles {
            self.backend.release_texture(handle);
        }
    }

    /// Build and submit a frame for the world's active region.
    pub fn render(&mut self, world: &mut World) -> Result<&Frame> {
        for handle in world.take_released_textures() {
            self.backend.release_texture(handle);
        }

        let region = world.active_region();
        let mut frame = Frame::new(region);
        let children = world.children(world.root()).to_vec();
        for child in children {
            self.draw_node(world, child, region, &mut frame)?;
        }

        self.backend.submit(&frame)?;
        self.frame = frame;
        Ok(&self.frame)
    }

    fn draw_node(
        &mut self,
        world: &mut World,
        id: NodeId,
        clip: Rect,
        frame: &mut Frame,
    ) -> Result<()> {
        match world.morph(id) {
            Some(morph) if !morph.is_hidden() && morph.can_draw() => {}
            _ => return Ok(()),
        }
        self.refresh_text(world, id)?;

        let rect = Rect::from_origin_size(world.absolute_position(id), world.display_size(id));
        let Some(visible) = clip.intersection(&rect) else {
            return Ok(());
        };
        let region = world.active_region();
        let scale = world.cumulative_scale(id);
        let segments = world.config().corner_segments;

        let Some(morph) = world.morph_mut(id) else {
            return Ok(());
        };
        let color = morph.get_color();
        let radius = morph.get_corner_radius() * scale;
        let corners = morph.get_corners();

        if let Some(texture) = morph.textures_mut().active_mut() {
            let handle = match texture.gpu {
                Some(handle) => handle,
                None => {
                    let handle = self.backend.upload_texture(texture)?;
                    log::debug!("uploaded texture {} as {:?}", texture.name, handle);
                    texture.gpu = Some(handle);
                    handle
                }
            };
            frame.commands.push(DrawCommand::Quad {
                node: id,
                texture: handle,
                vertices: quad_vertices(rect, clip, region, color),
            });
        } else if color.a > 0.0 {
            let vertices = rounded_rect_points(rect, radius, segments, corners)
                .into_iter()
                .map(|p| color_vertex(p, clip, region, color))
                .collect();
            frame
                .commands
                .push(DrawCommand::Polygon { node: id, vertices });
        }

        let children = world.children(id).to_vec();
        for child in children {
            self.draw_node(world, child, visible, frame)?;
        }
        Ok(())
    }

    /// Rasterize a text morph whose text changed since it was last drawn.
    fn refresh_text(&mut self, world: &mut World, id: NodeId) -> Result<()> {
        let Some(morph) = world.morph_mut(id) else {
            return Ok(());
        };
        let Some(content) = morph.text_content() else {
            return Ok(());
        };
        if !content.needs_raster() {
            return Ok(());
        }

        let Some(shaper) = self.shaper.as_mut() else {
            log::warn!("text morph {:?} drawn without a text shaper", id);
            if let Some(content) = morph.text_content_mut() {
                content.mark_rendered();
            }
            return Ok(());
        };

        let raster = shaper.rasterize(content.text(), content.pixel_size())?;
        let record =
            TextureRecord::from_rgba8(TEXT_TEXTURE, raster.width, raster.height, &raster.pixels);
        if let Some(handle) = morph.insert_texture(record).and_then(|old| old.gpu) {
            self.backend.release_texture(handle);
        }
        if let Some(content) = morph.text_content_mut() {
            content.mark_rendered();
        }
        Ok(())
    }
}

fn ndc(p: Point, region: Rect) -> [f32; 2] {
    [
        pixel_to_ndc(p.x, region.x, region.right()),
        pixel_to_ndc(p.y, region.y, region.top()),
    ]
}

fn clamp_to(p: Point, clip: Rect) -> Point {
    Point::new(
        p.x.clamp(clip.x, clip.right()),
        p.y.clamp(clip.y, clip.top()),
    )
}

fn color_vertex(p: Point, clip: Rect, region: Rect, color: Color) -> ColorVertex {
    ColorVertex {
        position: ndc(clamp_to(p, clip), region),
        color: color.to_array(),
    }
}

/// Quad for `rect` cropped to `clip`, in NDC of `region`.
///
/// Texture coordinates are pulled in by the cropped fraction on each side so
/// the visible part of the texture keeps its scale.
fn quad_vertices(rect: Rect, clip: Rect, region: Rect, color: Color) -> [QuadVertex; 4] {
    let [x1, y1, x2, y2] = rect.corners();
    let bl = clamp_to(Point::new(x1, y1), clip);
    let tr = clamp_to(Point::new(x2, y2), clip);

    let (u0, u1) = texcoord_span(rect.x, rect.width, clip.x, clip.right());
    let (t0, t1) = texcoord_span(rect.y, rect.height, clip.y, clip.top());
    // Pixel space is y-up, texture rows are top-first
    let (v_bottom, v_top) = (1.0 - t0, 1.0 - t1);

    let color = color.to_array();
    let vertex = |x: f32, y: f32, u: f32, v: f32| QuadVertex {
        position: ndc(Point::new(x, y), region),
        uv: [u, v],
        color,
    };

    [
        vertex(bl.x, bl.y, u0, v_bottom),
        vertex(tr.x, bl.y, u1, v_bottom),
        vertex(tr.x, tr.y, u1, v_top),
        vertex(bl.x, tr.y, u0, v_top),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-5 && (a[1] - b[1]).abs() < 1e-5
    }

    #[test]
    fn test_quad_inside_region() {
        let region = Rect::new(0.0, 0.0, 200.0, 100.0);
        let rect = Rect::new(50.0, 25.0, 100.0, 50.0);
        let quad = quad_vertices(rect, region, region, Color::WHITE);

        assert!(approx(quad[0].position, [-0.5, -0.5]));
        assert!(approx(quad[2].position, [0.5, 0.5]));
        assert_eq!(quad[0].uv, [0.0, 1.0]);
        assert_eq!(quad[1].uv, [1.0, 1.0]);
        assert_eq!(quad[2].uv, [1.0, 0.0]);
        assert_eq!(quad[3].uv, [0.0, 0.0]);
    }

    #[test]
    fn test_quad_cropped_by_clip() {
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = Rect::new(0.0, 0.0, 50.0, 100.0);
        // Right half overflows the clip
        let rect = Rect::new(25.0, 0.0, 50.0, 50.0);
        let quad = quad_vertices(rect, clip, region, Color::WHITE);

        assert!(approx(quad[1].position, [0.0, -1.0]));
        assert!((quad[1].uv[0] - 0.5).abs() < 1e-5);
        assert_eq!(quad[0].uv[0], 0.0);
    }

    #[test]
    fn test_quad_cropped_at_top_keeps_bottom_rows() {
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = Rect::new(0.0, 0.0, 100.0, 50.0);
        // Upper half is outside, so only the lower texture rows remain
        let rect = Rect::new(0.0, 25.0, 50.0, 50.0);
        let quad = quad_vertices(rect, clip, region, Color::WHITE);

        assert!((quad[0].uv[1] - 1.0).abs() < 1e-5);
        assert!((quad[3].uv[1] - 0.5).abs() < 1e-5);
    }

    #[test]
    fn test_color_vertex_clamped() {
        let region = Rect::new(0.0, 0.0, 100.0, 100.0);
        let clip = Rect::new(10.0, 10.0, 20.0, 20.0);
        let v = color_vertex(Point::new(0.0, 50.0), clip, region, Color::BLACK);
        assert!(approx(v.position, [-0.8, -0.4]));
        assert_eq!(v.color, [0.0, 0.0, 0.0, 1.0]);
    }
}
