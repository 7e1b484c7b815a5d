use std::path::PathBuf;

/// Order in which a dispatch pass visits a node and its subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispatchOrder {
    /// Children first, last-added child first, then the node itself.
    /// The visually topmost and most deeply nested widget gets the first
    /// chance to consume an event.
    #[default]
    ChildrenFirst,
    /// The node first; its subtree is only visited when the node itself
    /// does not handle events.
    SelfFirst,
}

#[derive(Debug, Clone)]
pub struct WorldConfig {
    /// Base directory texture names are resolved against.
    pub asset_path: PathBuf,
    /// Scale stored in freshly loaded texture records.
    pub texture_scale: f32,
    /// Skip drawing while the pointer is outside the viewport.
    pub auto_hide: bool,
    pub dispatch_order: DispatchOrder,
    /// Number of arc points generated per rounded corner.
    pub corner_segments: usize,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            asset_path: PathBuf::from("media/graphics"),
            texture_scale: 1.0,
            auto_hide: false,
            dispatch_order: DispatchOrder::ChildrenFirst,
            corner_segments: 8,
        }
    }
}

impl WorldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn asset_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.asset_path = path.into();
        self
    }

    pub fn texture_scale(mut self, scale: f32) -> Self {
        self.texture_scale = scale;
        self
    }

    pub fn auto_hide(mut self, auto_hide: bool) -> Self {
        self.auto_hide = auto_hide;
        self
    }

    pub fn dispatch_order(mut self, order: DispatchOrder) -> Self {
        self.dispatch_order = order;
        self
    }

    pub fn corner_segments(mut self, segments: usize) -> Self {
        self.corner_segments = segments;
        self
    }
}
