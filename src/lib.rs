//! A retained-mode morph tree for 2D overlays drawn inside host viewports.
//!
//! The host feeds input with [`World::on_event`] and redraws with
//! [`World::draw`]; everything in between (hit-testing, drag tracking,
//! clipping, lazy texture upload) happens here.

pub mod action;
pub mod config;
mod dispatch;
pub mod error;
pub mod event;
pub mod geometry;
pub mod morph;
pub mod property;
pub mod registry;
pub mod text;
pub mod texture;
pub mod tree;
pub mod world;

// Public for hosts bringing their own GPU backend
pub mod renderer;

pub use error::{MorphError, Result};
pub use world::World;

pub mod prelude {
    pub use crate::action::{Action, ActionContext, ActionKind, Reply};
    pub use crate::config::{DispatchOrder, WorldConfig};
    pub use crate::error::{MorphError, Result};
    pub use crate::event::{InputEvent, Key, MouseButton};
    pub use crate::geometry::{Color, Corners, Point, Rect, Size};
    pub use crate::morph::{EventFlags, Morph, MorphKind};
    pub use crate::property::{Property, PropertyValue};
    pub use crate::renderer::{Canvas, HeadlessBackend, RenderBackend, WgpuBackend};
    pub use crate::text::{CosmicTextShaper, TextShaper};
    pub use crate::tree::NodeId;
    pub use crate::World;
}
