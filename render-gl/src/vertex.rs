//! Vertex specification state: a VAO plus the byte offset of the usable
//! index region, keyed by a generational handle.

use crate::api::types::*;
use lumen_render::vertex::VertexSpecId;
use slotmap::{new_key_type, Key, KeyData};

new_key_type! {
    pub(crate) struct VertexSpecKey;
}

#[derive(Debug)]
pub(crate) struct GlVertexSpec {
    pub vao: GLuint,
    /// `None` when the specification carries no index buffer binding.
    pub index_offset: Option<u64>,
}

pub(crate) fn key_to_id(key: VertexSpecKey) -> VertexSpecId {
    VertexSpecId(key.data().as_ffi())
}

pub(crate) fn id_to_key(id: VertexSpecId) -> VertexSpecKey {
    KeyData::from_ffi(id.0).into()
}
