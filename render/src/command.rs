//! Command records.
//!
//! A [`Command`] is an immutable, tagged description of one GPU action,
//! carrying only the parameters its kind needs. Payloads are borrowed
//! from the submitter for the duration of the call; backends must not
//! retain them.

use crate::buffer::{BindingSpace, UploadKind};
use crate::pipeline::{
    BlendState, ClearMask, ClearValues, CullModeFlags, DepthTestState, PrimitiveTopology,
    ScissorState, StencilFacing, StencilState,
};
use crate::vertex::{IndexFormat, VertexSpecId};

/// A single backend-neutral GPU action.
#[derive(Clone, Debug)]
pub enum Command<'a> {
    Draw(DrawParams),
    DrawIndexed(DrawIndexedParams),
    DrawIndirect(DrawIndirectParams<'a>),
    DrawIndexedIndirect(DrawIndexedIndirectParams<'a>),
    UploadBuffer {
        buffer: &'a str,
        kind: UploadKind,
        dest_offset: u64,
        data: &'a [u8],
    },
    CopyBuffer {
        src: &'a str,
        dst: &'a str,
        src_offset: u64,
        dst_offset: u64,
        byte_count: u64,
    },
    AttachBuffer {
        buffer: &'a str,
        space: BindingSpace,
        index: u32,
    },
    SetBlending {
        draw_buffer: u32,
        state: BlendState,
    },
    SetStencil {
        facing: StencilFacing,
        state: StencilState,
    },
    SetScissor {
        viewport: u32,
        state: ScissorState,
    },
    SetCullMode {
        mode: CullModeFlags,
    },
    SetDepthTest {
        state: DepthTestState,
    },
    SetDepthRange {
        viewport: u32,
        near: f64,
        far: f64,
    },
    ClearWindow {
        mask: ClearMask,
        values: ClearValues,
    },
}

/// Parameters for non-indexed draws.
#[derive(Copy, Clone, Debug)]
pub struct DrawParams {
    pub vertex_spec: VertexSpecId,
    pub topology: PrimitiveTopology,
    pub first_vertex: u32,
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_instance: u32,
}

/// Parameters for indexed draws.
#[derive(Copy, Clone, Debug)]
pub struct DrawIndexedParams {
    pub vertex_spec: VertexSpecId,
    pub topology: PrimitiveTopology,
    pub index_format: IndexFormat,
    pub first_index: u32,
    pub index_count: u32,
    pub instance_count: u32,
    /// Added to every index fetched from the index buffer.
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// Parameters for non-indexed indirect draws. Records are read from the
/// named buffer, tightly packed.
#[derive(Copy, Clone, Debug)]
pub struct DrawIndirectParams<'a> {
    pub vertex_spec: VertexSpecId,
    pub topology: PrimitiveTopology,
    pub indirect_source: &'a str,
    /// Offset into the indirect source, in whole records.
    pub indirect_offset: u64,
    pub draw_count: u32,
}

/// Parameters for indexed indirect draws.
#[derive(Copy, Clone, Debug)]
pub struct DrawIndexedIndirectParams<'a> {
    pub vertex_spec: VertexSpecId,
    pub topology: PrimitiveTopology,
    pub index_format: IndexFormat,
    pub indirect_source: &'a str,
    pub indirect_offset: u64,
    pub draw_count: u32,
}
