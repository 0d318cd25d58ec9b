//! Vertex specifications: attribute layout, vertex buffer bindings and
//! the optional index buffer binding, referenced by draws through an
//! opaque handle.

/// Describes the type of indices contained in an index buffer.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum IndexFormat {
    /// 8-bit unsigned integer indices
    U8,
    /// 16-bit unsigned integer indices
    U16,
    /// 32-bit unsigned integer indices
    U32,
}

impl IndexFormat {
    pub fn element_size(self) -> u64 {
        match self {
            IndexFormat::U8 => 1,
            IndexFormat::U16 => 2,
            IndexFormat::U32 => 4,
        }
    }
}

/// Data format of a single vertex attribute.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum VertexFormat {
    F32,
    F32x2,
    F32x3,
    F32x4,
    U32,
    /// Four unsigned bytes normalized to `[0, 1]`.
    U8x4Norm,
}

/// Opaque, generational handle to a registered vertex specification.
///
/// Handles become stale when the specification is released; a stale
/// handle in a draw command reports `UnknownSource`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexSpecId(pub u64);

/// One attribute within a vertex specification. `binding` indexes into
/// the specification's vertex buffer list.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct VertexAttributeDesc {
    pub location: u32,
    pub binding: u32,
    pub format: VertexFormat,
    /// Byte offset of the attribute relative to the start of a vertex.
    pub offset: u32,
}

/// A vertex buffer slot, referencing a registered buffer by name. The
/// slot's binding index is its position in the buffer list.
#[derive(Copy, Clone, Debug)]
pub struct VertexBufferDesc<'a> {
    pub buffer: &'a str,
    pub stride: u32,
    /// Byte offset of the first vertex inside the buffer.
    pub offset: u64,
}

/// Index buffer binding of a vertex specification. The element width is
/// chosen per draw command, not here.
#[derive(Copy, Clone, Debug)]
pub struct IndexBufferDesc<'a> {
    pub buffer: &'a str,
    /// Byte offset at which the usable index region begins.
    pub offset: u64,
}

/// Full description of a vertex specification.
#[derive(Copy, Clone, Debug)]
pub struct VertexSpecDesc<'a> {
    pub attributes: &'a [VertexAttributeDesc],
    pub buffers: &'a [VertexBufferDesc<'a>],
    pub indices: Option<IndexBufferDesc<'a>>,
}
