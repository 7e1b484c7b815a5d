//! The world: root of a morph tree and owner of per-frame state.
//!
//! All morphs of one GUI live in a single [`World`]. The world owns the arena,
//! the instance registry, the texture loader, and the state a dispatch pass
//! shares between nodes: the current input event, the pointer in region-local
//! and window coordinates, the active draw region and the consumed flag.

use crate::config::WorldConfig;
use crate::error::{MorphError, Result};
use crate::event::InputEvent;
use crate::geometry::{Point, Rect, Size};
use crate::morph::Morph;
use crate::registry::Registry;
use crate::renderer::{Canvas, RenderBackend};
use crate::texture::{TextureHandle, TextureLoader};
use crate::tree::{NodeId, Tree};

/// Registry kind of the root node.
pub const WORLD_KIND: &str = "World";

pub struct World {
    tree: Tree,
    root: NodeId,
    config: WorldConfig,
    loader: TextureLoader,
    registry: Registry,
    pub(crate) input_event: Option<InputEvent>,
    pub(crate) consumed: bool,
    pub(crate) pointer_local: Point,
    pub(crate) pointer_absolute: Point,
    /// Region that delivered the last event
    pub(crate) window_region: Rect,
    /// Viewport of the last draw
    pub(crate) active_region: Rect,
    /// GPU handles of removed morphs, waiting for the canvas to free them
    released: Vec<TextureHandle>,
}

impl Default for World {
    fn default() -> Self {
        Self::new(WorldConfig::default())
    }
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let mut tree = Tree::new();
        let root = tree.insert(Morph::new().name("world").size(0.0, 0.0));

        let registry = Registry::with_root(root, WORLD_KIND);

        let loader = TextureLoader::new(config.asset_path.clone(), config.texture_scale);

        Self {
            tree,
            root,
            config,
            loader,
            registry,
            input_event: None,
            consumed: false,
            pointer_local: Point::ORIGIN,
            pointer_absolute: Point::ORIGIN,
            window_region: Rect::default(),
            active_region: Rect::default(),
            released: Vec::new(),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn loader(&self) -> &TextureLoader {
        &self.loader
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }

    pub fn morph(&self, id: NodeId) -> Option<&Morph> {
        self.tree.get(id)
    }

    pub fn morph_mut(&mut self, id: NodeId) -> Option<&mut Morph> {
        self.tree.get_mut(id)
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&Morph> {
        self.tree.get(id).ok_or(MorphError::UnknownNode(id))
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut Morph> {
        self.tree.get_mut(id).ok_or(MorphError::UnknownNode(id))
    }

    // Tree structure

    /// Attach `morph` as the last (topmost) child of the root.
    pub fn add(&mut self, morph: Morph) -> Result<NodeId> {
        self.add_child(self.root, morph)
    }

    /// Attach `morph` as the last (topmost) child of `parent`.
    ///
    /// A texture named at construction is loaded first; if that fails the
    /// tree is left untouched.
    pub fn add_child(&mut self, parent: NodeId, mut morph: Morph) -> Result<NodeId> {
        if !self.tree.contains(parent) {
            return Err(MorphError::UnknownNode(parent));
        }

        if let Some(name) = morph.take_pending_texture() {
            match self.loader.load(&name) {
                Ok(record) => {
                    morph.insert_texture(record);
                }
                Err(err) => {
                    morph.restore_pending_texture(name);
                    return Err(err);
                }
            }
        }

        let kind = morph.type_name();
        let id = self.tree.insert(morph);
        self.tree.set_parent(id, parent);
        self.registry.register(id, kind)?;

        log::debug!("attached {} {:?} to {:?}", kind, id, parent);
        Ok(id)
    }

    /// Detach `id` and its subtree.
    ///
    /// Descendants are dropped; the detached morph itself is returned. GPU
    /// handles owned by the subtree are queued and freed by the next
    /// [`Canvas::render`].
    pub fn remove(&mut self, id: NodeId) -> Result<Morph> {
        if id == self.root {
            return Err(MorphError::DetachRoot);
        }
        if !self.tree.contains(id) {
            return Err(MorphError::UnknownNode(id));
        }

        let subtree = self.tree.descendants(id);
        // Deepest first so every parent link stays valid while unlinking
        for &node in subtree.iter().skip(1).rev() {
            if let Some(mut morph) = self.tree.remove(node) {
                self.released.extend(morph.textures_mut().take_handles());
            }
            self.registry.unregister(node);
        }

        self.registry.unregister(id);
        let mut morph = self.tree.remove(id).ok_or(MorphError::UnknownNode(id))?;
        self.released.extend(morph.textures_mut().take_handles());

        log::debug!("removed {:?} ({} nodes)", id, subtree.len());
        Ok(morph)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.tree.children(id)
    }

    /// `id` and all of its descendants, depth-first pre-order.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        self.tree.descendants(id)
    }

    /// The root `id` belongs to.
    pub fn world_of(&self, id: NodeId) -> Option<NodeId> {
        self.tree.root_of(id)
    }

    /// First morph named `name`, depth-first from the root.
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.find_in(self.root, name)
    }

    /// First morph named `name` below `id`, depth-first.
    pub fn find_in(&self, id: NodeId, name: &str) -> Option<NodeId> {
        self.tree
            .descendants(id)
            .into_iter()
            .skip(1)
            .find(|&node| {
                self.tree
                    .get(node)
                    .and_then(|m| m.get_name())
                    .is_some_and(|n| n == name)
            })
    }

    // Derived geometry

    /// Sum of the positions of `id` and its ancestors below the root.
    pub fn world_position(&self, id: NodeId) -> Point {
        let mut position = Point::ORIGIN;
        let mut current = id;
        while let Some(parent) = self.tree.parent(current) {
            if let Some(morph) = self.tree.get(current) {
                position = position + morph.get_position();
            }
            current = parent;
        }
        position
    }

    /// Position in host window pixels.
    pub fn absolute_position(&self, id: NodeId) -> Point {
        let origin = self.active_region.origin();
        if self.tree.parent(id).is_none() {
            let position = self
                .tree
                .get(id)
                .map(|m| m.get_position())
                .unwrap_or(Point::ORIGIN);
            return position + origin;
        }
        self.world_position(id) + origin
    }

    /// Product of the scales of `id` and all of its ancestors.
    pub fn cumulative_scale(&self, id: NodeId) -> f32 {
        let mut scale = 1.0;
        let mut current = Some(id);
        while let Some(node) = current {
            if let Some(morph) = self.tree.get(node) {
                scale *= morph.scale();
            }
            current = self.tree.parent(node);
        }
        scale
    }

    /// Size on screen: the morph's size times its cumulative scale.
    pub fn display_size(&self, id: NodeId) -> Size {
        let scale = self.cumulative_scale(id);
        self.tree
            .get(id)
            .map(|m| Size::new(m.width() * scale, m.height() * scale))
            .unwrap_or(Size::zero())
    }

    /// Area covered by `id` and its descendants, in world space.
    pub fn envelope(&self, id: NodeId) -> Option<Rect> {
        self.tree
            .descendants(id)
            .into_iter()
            .filter_map(|node| {
                let morph = self.tree.get(node)?;
                Some(Rect::from_origin_size(
                    self.world_position(node),
                    morph.get_size(),
                ))
            })
            .reduce(|acc, rect| acc.union(&rect))
    }

    /// Whether the pointer lies strictly inside the morph on screen.
    pub fn is_mouse_over(&self, id: NodeId) -> bool {
        let rect = Rect::from_origin_size(self.world_position(id), self.display_size(id));
        rect.contains_strict(self.pointer_local.x, self.pointer_local.y)
    }

    // Mutation

    /// Hide or show `id` and its whole subtree.
    pub fn set_hidden(&mut self, id: NodeId, hidden: bool) -> Result<()> {
        if !self.tree.contains(id) {
            return Err(MorphError::UnknownNode(id));
        }
        for node in self.tree.descendants(id) {
            if let Some(morph) = self.tree.get_mut(node) {
                morph.set_hidden_flag(hidden);
            }
        }
        Ok(())
    }

    pub fn set_scale(&mut self, id: NodeId, scale: f32) -> Result<()> {
        self.get_mut(id)?.set_scale(scale)
    }

    /// Activate texture `name` on `id`, loading it on first use.
    ///
    /// On failure the morph's textures are unchanged.
    pub fn set_texture(&mut self, id: NodeId, name: &str) -> Result<()> {
        if self.get_mut(id)?.activate_texture(name) {
            return Ok(());
        }
        let record = self.loader.load(name)?;
        self.get_mut(id)?.insert_texture(record);
        Ok(())
    }

    /// Name of the active texture of `id`.
    pub fn texture(&self, id: NodeId) -> Option<&str> {
        self.tree.get(id).and_then(|m| m.textures().active_name())
    }

    // Frame state

    /// Whether some morph claimed the last event. Hosts swallow the native
    /// event when this is set.
    pub fn consumed_event(&self) -> bool {
        self.consumed
    }

    pub fn input_event(&self) -> Option<&InputEvent> {
        self.input_event.as_ref()
    }

    /// Pointer relative to the active draw region.
    pub fn pointer_local(&self) -> Point {
        self.pointer_local
    }

    /// Pointer in host window pixels.
    pub fn pointer_absolute(&self) -> Point {
        self.pointer_absolute
    }

    pub fn window_region(&self) -> Rect {
        self.window_region
    }

    pub fn active_region(&self) -> Rect {
        self.active_region
    }

    pub fn auto_hide(&self) -> bool {
        self.config.auto_hide
    }

    pub fn set_auto_hide(&mut self, auto_hide: bool) {
        self.config.auto_hide = auto_hide;
    }

    /// Draw the tree into `viewport`.
    ///
    /// Returns `false` when auto-hide suppressed the frame because the pointer
    /// is outside the viewport; the previous draw region is kept in that case.
    pub fn draw<B: RenderBackend>(
        &mut self,
        viewport: Rect,
        canvas: &mut Canvas<B>,
    ) -> Result<bool> {
        if self.config.auto_hide
            && !viewport.contains(self.pointer_absolute.x, self.pointer_absolute.y)
        {
            log::trace!("pointer outside viewport, frame skipped");
            return Ok(false);
        }

        self.active_region = viewport;
        let root = self.root;
        self.get_mut(root)?
            .set_size(viewport.width.max(0.0), viewport.height.max(0.0))?;

        canvas.render(self)?;
        Ok(true)
    }

    pub(crate) fn take_released_textures(&mut self) -> Vec<TextureHandle> {
        std::mem::take(&mut self.released)
    }

    /// Every GPU handle in the world, including queued ones.
    pub(crate) fn take_all_textures(&mut self) -> Vec<TextureHandle> {
        let mut handles = self.take_released_textures();
        for node in self.tree.descendants(self.root) {
            if let Some(morph) = self.tree.get_mut(node) {
                handles.extend(morph.textures_mut().take_handles());
            }
        }
        handles
    }
}
