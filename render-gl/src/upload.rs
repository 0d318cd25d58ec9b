//! Streaming upload ring.
//!
//! A persistently mapped, coherent buffer written by the CPU and read by
//! device-side copies. Writes never stall on in-flight GPU work; the
//! tradeoff is that the ring wraps when it runs out of space, so a slot
//! is only safe to reuse once the GPU has consumed the copy issued from
//! it. Ring sizing is the caller's lever for that (see
//! `GlBackendConfig::upload_ring_size`).

use crate::api;
use crate::api::types::*;
use crate::device::GlDevice;
use crate::util::align_offset;
use std::ptr;

pub(crate) struct MappedRing {
    obj: GLuint,
    ptr: *mut u8,
    size: usize,
    head: usize,
    align: usize,
}

impl MappedRing {
    pub fn new(gl: &mut impl GlDevice, size: usize, align: usize) -> MappedRing {
        let obj = gl.create_buffer(
            size as u64,
            api::MAP_WRITE_BIT | api::MAP_PERSISTENT_BIT | api::MAP_COHERENT_BIT,
            None,
        );
        let ptr = gl.map_buffer_persistent(obj, size as u64);
        MappedRing {
            obj,
            ptr,
            size,
            head: 0,
            align,
        }
    }

    /// Stages `data` into the ring and returns `(ring object, offset)`
    /// of the staged bytes, or `None` when the payload can never fit.
    pub fn stage(&mut self, data: &[u8]) -> Option<(GLuint, usize)> {
        if data.len() > self.size {
            return None;
        }
        let offset = match align_offset(
            data.len() as u64,
            self.align as u64,
            self.head as u64..self.size as u64,
        ) {
            Some(offset) => offset as usize,
            None => {
                // wrap to the start of the ring
                self.head = 0;
                align_offset(data.len() as u64, self.align as u64, 0..self.size as u64)? as usize
            }
        };
        unsafe {
            ptr::copy_nonoverlapping(data.as_ptr(), self.ptr.add(offset), data.len());
        }
        self.head = offset + data.len();
        Some((self.obj, offset))
    }

    pub fn destroy(self, gl: &mut impl GlDevice) {
        gl.unmap_buffer(self.obj);
        gl.delete_buffer(self.obj);
    }
}
