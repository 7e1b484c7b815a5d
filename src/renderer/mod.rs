//! Rendering of a morph tree.
//!
//! [`Canvas`] walks the visible tree and turns it into a [`Frame`]: a flat,
//! ordered list of draw commands with vertices already in normalized device
//! coordinates and clipped against their ancestors. A [`RenderBackend`]
//! owns the GPU side: it uploads textures on request and executes frames.
//!
//! Two backends ship with the crate: [`HeadlessBackend`], which records what
//! it is asked to do, and [`WgpuBackend`], which draws with wgpu.

mod canvas;
mod gpu;
mod gpu_context;
mod headless;
mod vertex;

pub use canvas::Canvas;
pub use gpu::WgpuBackend;
pub use gpu_context::GpuContext;
pub use headless::HeadlessBackend;
pub use vertex::{fan_indices, ColorVertex, QuadVertex, QUAD_INDICES};

use crate::error::Result;
use crate::geometry::Rect;
use crate::texture::{TextureHandle, TextureRecord};
use crate::tree::NodeId;

pub trait RenderBackend {
    /// Copy the record's pixels to the GPU and return a handle to them.
    fn upload_texture(&mut self, texture: &TextureRecord) -> Result<TextureHandle>;

    /// Free a handle returned by [`upload_texture`](Self::upload_texture).
    fn release_texture(&mut self, handle: TextureHandle);

    /// Execute a frame.
    fn submit(&mut self, frame: &Frame) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    /// Textured quad, vertices bottom-left, bottom-right, top-right, top-left.
    Quad {
        node: NodeId,
        texture: TextureHandle,
        vertices: [QuadVertex; 4],
    },
    /// Convex flat-colored polygon, drawn as a triangle fan.
    Polygon {
        node: NodeId,
        vertices: Vec<ColorVertex>,
    },
}

impl DrawCommand {
    pub fn node(&self) -> NodeId {
        match self {
            DrawCommand::Quad { node, .. } | DrawCommand::Polygon { node, .. } => *node,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frame {
    /// Host viewport the NDC coordinates are relative to
    pub viewport: Rect,
    /// Back to front
    pub commands: Vec<DrawCommand>,
}

impl Frame {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            commands: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Commands emitted for `node`.
    pub fn commands_for(&self, node: NodeId) -> impl Iterator<Item = &DrawCommand> {
        self.commands.iter().filter(move |c| c.node() == node)
    }
}
