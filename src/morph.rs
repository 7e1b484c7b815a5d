//! The morph record: one node of the GUI tree.
//!
//! A morph only stores its canonical local state. Everything that depends on
//! ancestors (world position, absolute position, cumulative scale, the
//! envelope of its subtree) is derived by [`World`](crate::world::World) on
//! demand, so nothing here can go stale when an ancestor moves.

use bitflags::bitflags;

use crate::action::{Action, ActionKind, ActionSlots};
use crate::error::{MorphError, Result};
use crate::geometry::{Color, Corners, Point, Rect, Size};
use crate::text::TextContent;
use crate::texture::{TextureRecord, TextureSet};

bitflags! {
    /// Which pointer events a morph reacts to. Empty means transparent.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
    pub struct EventFlags: u8 {
        /// Takes part in dispatch at all
        const EVENTS     = 0b0001;
        /// Consumes button presses inside its bounds
        const MOUSE_DOWN = 0b0010;
        /// Buttons fade with the pointer
        const MOUSE_OVER = 0b0100;
        /// Declared drag-and-drop capability, informational
        const DRAG_DROP  = 0b1000;
    }
}

#[derive(Debug)]
pub enum MorphKind {
    Plain,
    /// Reacts to every pointer event and fades when the pointer leaves.
    Button,
    /// A label whose texture is rasterized from its text.
    Text(TextContent),
}

impl MorphKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            MorphKind::Plain => "Morph",
            MorphKind::Button => "Button",
            MorphKind::Text(_) => "Text",
        }
    }
}

const DEFAULT_SIZE: f32 = 100.0;

/// Alpha a button shows while the pointer is away from it.
pub const BUTTON_IDLE_ALPHA: f32 = 0.5;

#[derive(Debug)]
pub struct Morph {
    name: Option<String>,
    kind: MorphKind,
    position: Point,
    width: f32,
    height: f32,
    scale: f32,
    color: Color,
    hidden: bool,
    can_draw: bool,
    corner_radius: f32,
    corners: Corners,
    flags: EventFlags,
    textures: TextureSet,
    actions: ActionSlots,
    /// Pointer position recorded when the drag started or last moved
    drag_anchor: Option<Point>,
    /// Texture named at construction, loaded when the morph is attached
    pending_texture: Option<String>,
}

impl Default for Morph {
    fn default() -> Self {
        Self::with_kind(MorphKind::Plain)
    }
}

fn check_dimension(field: &'static str, value: f32) -> Result<f32> {
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(MorphError::InvalidDimension { field, value })
    }
}

impl Morph {
    fn with_kind(kind: MorphKind) -> Self {
        Self {
            name: None,
            kind,
            position: Point::ORIGIN,
            width: DEFAULT_SIZE,
            height: DEFAULT_SIZE,
            scale: 1.0,
            color: Color::WHITE,
            hidden: false,
            can_draw: true,
            corner_radius: 0.0,
            corners: Corners::ALL,
            flags: EventFlags::empty(),
            textures: TextureSet::new(),
            actions: ActionSlots::new(),
            drag_anchor: None,
            pending_texture: None,
        }
    }

    /// A plain 100x100 white morph that ignores events.
    pub fn new() -> Self {
        Self::default()
    }

    /// A morph that handles presses, hover and drag.
    pub fn button() -> Self {
        let mut morph = Self::with_kind(MorphKind::Button);
        morph.flags = EventFlags::all();
        morph
    }

    /// A text label. Its size follows the rasterized text once drawn.
    pub fn text(text: impl Into<String>) -> Self {
        Self::with_kind(MorphKind::Text(TextContent::new(text)))
    }

    // Builder methods

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn position(mut self, x: f32, y: f32) -> Self {
        self.position = Point::new(x, y);
        self
    }

    /// Negative or non-finite dimensions are clamped to zero.
    pub fn size(mut self, width: f32, height: f32) -> Self {
        self.width = check_dimension("width", width).unwrap_or(0.0);
        self.height = check_dimension("height", height).unwrap_or(0.0);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Texture to load and activate when the morph joins a world.
    pub fn texture(mut self, name: impl Into<String>) -> Self {
        self.pending_texture = Some(name.into());
        self
    }

    pub fn on(mut self, kind: ActionKind, action: impl Action + 'static) -> Self {
        self.actions.bind(kind, action);
        self
    }

    pub fn flags(mut self, flags: EventFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn corner_radius(mut self, radius: f32) -> Self {
        self.corner_radius = radius.max(0.0);
        self
    }

    pub fn corners(mut self, corners: Corners) -> Self {
        self.corners = corners;
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn font_size(mut self, size: f32) -> Self {
        if let MorphKind::Text(content) = &mut self.kind {
            content.set_font_size(size);
        }
        self
    }

    // Accessors

    pub fn get_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn kind(&self) -> &MorphKind {
        &self.kind
    }

    pub fn type_name(&self) -> &'static str {
        self.kind.type_name()
    }

    pub fn is_button(&self) -> bool {
        matches!(self.kind, MorphKind::Button)
    }

    pub fn text_content(&self) -> Option<&TextContent> {
        match &self.kind {
            MorphKind::Text(content) => Some(content),
            _ => None,
        }
    }

    pub fn text_content_mut(&mut self) -> Option<&mut TextContent> {
        match &mut self.kind {
            MorphKind::Text(content) => Some(content),
            _ => None,
        }
    }

    pub fn get_position(&self) -> Point {
        self.position
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn get_size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// This morph's own scale factor.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn get_color(&self) -> Color {
        self.color
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn can_draw(&self) -> bool {
        self.can_draw
    }

    pub fn get_corner_radius(&self) -> f32 {
        self.corner_radius
    }

    pub fn get_corners(&self) -> Corners {
        self.corners
    }

    pub fn event_flags(&self) -> EventFlags {
        self.flags
    }

    pub fn handles(&self, flags: EventFlags) -> bool {
        self.flags.contains(flags)
    }

    /// `[x, y, x + width, y + height]` in the parent's frame.
    pub fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.get_size())
    }

    pub fn textures(&self) -> &TextureSet {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureSet {
        &mut self.textures
    }

    pub fn active_texture(&self) -> Option<&TextureRecord> {
        self.textures.active()
    }

    pub fn actions(&self) -> &ActionSlots {
        &self.actions
    }

    pub fn actions_mut(&mut self) -> &mut ActionSlots {
        &mut self.actions
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_anchor.is_some()
    }

    pub fn drag_anchor(&self) -> Option<Point> {
        self.drag_anchor
    }

    // Mutation

    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    pub fn set_position(&mut self, position: Point) {
        self.position = position;
    }

    pub fn set_width(&mut self, width: f32) -> Result<()> {
        self.width = check_dimension("width", width)?;
        Ok(())
    }

    pub fn set_height(&mut self, height: f32) -> Result<()> {
        self.height = check_dimension("height", height)?;
        Ok(())
    }

    /// Set both dimensions; on error neither changes.
    pub fn set_size(&mut self, width: f32, height: f32) -> Result<()> {
        let width = check_dimension("width", width)?;
        let height = check_dimension("height", height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    pub fn set_scale(&mut self, scale: f32) -> Result<()> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(MorphError::InvalidDimension {
                field: "scale",
                value: scale,
            });
        }
        self.scale = scale;
        Ok(())
    }

    pub fn set_color(&mut self, color: Color) {
        self.color = color;
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.color = self.color.with_alpha(alpha);
    }

    /// Hide only this morph. [`World::set_hidden`](crate::world::World::set_hidden)
    /// cascades to the subtree.
    pub(crate) fn set_hidden_flag(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    pub fn set_can_draw(&mut self, can_draw: bool) {
        self.can_draw = can_draw;
    }

    pub fn set_corner_radius(&mut self, radius: f32) {
        self.corner_radius = radius.max(0.0);
    }

    pub fn set_corners(&mut self, corners: Corners) {
        self.corners = corners;
    }

    pub fn set_event_flags(&mut self, flags: EventFlags) {
        self.flags = flags;
    }

    /// Replace the label text. Returns `false` for morphs without text.
    pub fn set_text(&mut self, text: impl Into<String>) -> bool {
        match self.text_content_mut() {
            Some(content) => {
                content.set_text(text);
                true
            }
            None => false,
        }
    }

    /// Activate a cached texture and take its display size.
    pub fn activate_texture(&mut self, name: &str) -> bool {
        if !self.textures.activate(name) {
            return false;
        }
        if let Some((width, height)) = self.textures.active().map(|t| t.display_size()) {
            self.width = width;
            self.height = height;
        }
        true
    }

    /// Cache `record` and activate it. Returns the record it replaced.
    pub fn insert_texture(&mut self, record: TextureRecord) -> Option<TextureRecord> {
        let name = record.name.clone();
        let replaced = self.textures.insert(record);
        self.activate_texture(&name);
        replaced
    }

    pub(crate) fn begin_drag(&mut self, anchor: Point) {
        self.drag_anchor = Some(anchor);
    }

    pub(crate) fn end_drag(&mut self) {
        self.drag_anchor = None;
    }

    pub(crate) fn take_pending_texture(&mut self) -> Option<String> {
        self.pending_texture.take()
    }

    pub(crate) fn restore_pending_texture(&mut self, name: String) {
        self.pending_texture = Some(name);
    }
}
