use std::collections::HashMap;

use crate::error::Result;
use crate::texture::{TextureHandle, TextureRecord};

use super::{Frame, RenderBackend};

/// A backend without a GPU. It hands out handles, tracks which are live and
/// keeps every submitted frame, which makes it suitable for tests and for
/// hosts that only need the draw list.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    next_handle: u64,
    live: HashMap<TextureHandle, (u32, u32)>,
    uploads: usize,
    releases: usize,
    frames: Vec<Frame>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn upload_count(&self) -> usize {
        self.uploads
    }

    pub fn release_count(&self) -> usize {
        self.releases
    }

    pub fn is_live(&self, handle: TextureHandle) -> bool {
        self.live.contains_key(&handle)
    }

    pub fn live_textures(&self) -> usize {
        self.live.len()
    }

    /// Size of the texture behind `handle`.
    pub fn texture_size(&self, handle: TextureHandle) -> Option<(u32, u32)> {
        self.live.get(&handle).copied()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn last_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload_texture(&mut self, texture: &TextureRecord) -> Result<TextureHandle> {
        self.next_handle += 1;
        let handle = TextureHandle(self.next_handle);
        self.live.insert(handle, (texture.width, texture.height));
        self.uploads += 1;
        Ok(handle)
    }

    fn release_texture(&mut self, handle: TextureHandle) {
        if self.live.remove(&handle).is_some() {
            self.releases += 1;
        } else {
            log::warn!("release of unknown texture {:?}", handle);
        }
    }

    fn submit(&mut self, frame: &Frame) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_headless_handles() {
        let mut backend = HeadlessBackend::new();
        let record = TextureRecord::from_rgba8("t", 2, 3, &[0; 24]);

        let a = backend.upload_texture(&record).unwrap();
        let b = backend.upload_texture(&record).unwrap();
        assert_ne!(a, b);
        assert_eq!(backend.texture_size(a), Some((2, 3)));
        assert_eq!(backend.live_textures(), 2);

        backend.release_texture(a);
        backend.release_texture(a);
        assert!(!backend.is_live(a));
        assert!(backend.is_live(b));
        assert_eq!(backend.release_count(), 1);
        assert_eq!(backend.upload_count(), 2);
    }
}
