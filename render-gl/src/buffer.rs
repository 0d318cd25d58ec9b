//! Registered GL buffers.

use crate::api;
use crate::api::types::*;
use lumen_render::buffer::UploadPolicy;

/// Storage flags for a buffer created under `policy`. Streaming and
/// one-shot buffers are written only by device-side copies, so they get
/// immutable storage with no host-access flags.
pub(crate) fn storage_flags(policy: UploadPolicy) -> GLbitfield {
    match policy {
        UploadPolicy::Direct => api::DYNAMIC_STORAGE_BIT,
        UploadPolicy::Streaming => 0,
        UploadPolicy::OneShot => 0,
    }
}

/// Live GL buffer tracked by the registry.
///
/// Invariant: `valid` implies `obj` names a live allocation of at least
/// `size` bytes.
#[derive(Copy, Clone, Debug)]
pub(crate) struct GlBufferState {
    pub obj: GLuint,
    pub size: u64,
    pub valid: bool,
    pub policy: UploadPolicy,
}

impl GlBufferState {
    /// Whether `[offset, offset + bytes)` lies inside the buffer. Wide
    /// arithmetic; offsets near `u64::MAX` cannot wrap around.
    pub fn is_in_range(&self, offset: u64, bytes: u64) -> bool {
        offset
            .checked_add(bytes)
            .map_or(false, |end| end <= self.size)
    }
}
