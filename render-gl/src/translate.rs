//! Backend-neutral enums to GL tokens.
//!
//! Every table is an exhaustive match over a closed enum, so totality is
//! checked when the crate compiles rather than at call time.

use crate::api;
use crate::api::types::*;
use lumen_render::buffer::BindingSpace;
use lumen_render::pipeline::{
    BlendFactor, BlendOp, ClearMask, CompareOp, CullModeFlags, PrimitiveTopology, StencilOp,
};
use lumen_render::vertex::{IndexFormat, VertexFormat};

pub(crate) fn topology_to_gl(topo: PrimitiveTopology) -> GLenum {
    match topo {
        PrimitiveTopology::PointList => api::POINTS,
        PrimitiveTopology::LineList => api::LINES,
        PrimitiveTopology::TriangleList => api::TRIANGLES,
        PrimitiveTopology::TriangleStrip => api::TRIANGLE_STRIP,
        PrimitiveTopology::TriangleFan => api::TRIANGLE_FAN,
    }
}

pub(crate) fn index_format_to_gl(format: IndexFormat) -> GLenum {
    match format {
        IndexFormat::U8 => api::UNSIGNED_BYTE,
        IndexFormat::U16 => api::UNSIGNED_SHORT,
        IndexFormat::U32 => api::UNSIGNED_INT,
    }
}

pub(crate) fn compare_op_to_gl(op: CompareOp) -> GLenum {
    match op {
        CompareOp::Never => api::NEVER,
        CompareOp::Less => api::LESS,
        CompareOp::Equal => api::EQUAL,
        CompareOp::LessOrEqual => api::LEQUAL,
        CompareOp::Greater => api::GREATER,
        CompareOp::NotEqual => api::NOTEQUAL,
        CompareOp::GreaterOrEqual => api::GEQUAL,
        CompareOp::Always => api::ALWAYS,
    }
}

pub(crate) fn stencil_op_to_gl(op: StencilOp) -> GLenum {
    match op {
        StencilOp::Keep => api::KEEP,
        StencilOp::Zero => api::ZERO,
        StencilOp::Replace => api::REPLACE,
        StencilOp::IncrementAndClamp => api::INCR,
        StencilOp::DecrementAndClamp => api::DECR,
        StencilOp::Invert => api::INVERT,
        StencilOp::IncrementAndWrap => api::INCR_WRAP,
        StencilOp::DecrementAndWrap => api::DECR_WRAP,
    }
}

pub(crate) fn blend_factor_to_gl(factor: BlendFactor) -> GLenum {
    match factor {
        BlendFactor::Zero => api::ZERO,
        BlendFactor::One => api::ONE,
        BlendFactor::SrcColor => api::SRC_COLOR,
        BlendFactor::OneMinusSrcColor => api::ONE_MINUS_SRC_COLOR,
        BlendFactor::DstColor => api::DST_COLOR,
        BlendFactor::OneMinusDstColor => api::ONE_MINUS_DST_COLOR,
        BlendFactor::SrcAlpha => api::SRC_ALPHA,
        BlendFactor::OneMinusSrcAlpha => api::ONE_MINUS_SRC_ALPHA,
        BlendFactor::DstAlpha => api::DST_ALPHA,
        BlendFactor::OneMinusDstAlpha => api::ONE_MINUS_DST_ALPHA,
        BlendFactor::ConstantColor => api::CONSTANT_COLOR,
        BlendFactor::OneMinusConstantColor => api::ONE_MINUS_CONSTANT_COLOR,
        BlendFactor::ConstantAlpha => api::CONSTANT_ALPHA,
        BlendFactor::OneMinusConstantAlpha => api::ONE_MINUS_CONSTANT_ALPHA,
        BlendFactor::SrcAlphaSaturate => api::SRC_ALPHA_SATURATE,
        BlendFactor::Src1Color => api::SRC1_COLOR,
        BlendFactor::OneMinusSrc1Color => api::ONE_MINUS_SRC1_COLOR,
        BlendFactor::Src1Alpha => api::SRC1_ALPHA,
        BlendFactor::OneMinusSrc1Alpha => api::ONE_MINUS_SRC1_ALPHA,
    }
}

pub(crate) fn blend_op_to_gl(op: BlendOp) -> GLenum {
    match op {
        BlendOp::Add => api::FUNC_ADD,
        BlendOp::Subtract => api::FUNC_SUBTRACT,
        BlendOp::ReverseSubtract => api::FUNC_REVERSE_SUBTRACT,
        BlendOp::Min => api::MIN,
        BlendOp::Max => api::MAX,
    }
}

/// Face token for a non-empty cull mode. `NONE` never reaches this
/// table; the executor turns it into a disable.
pub(crate) fn cull_mode_to_gl(mode: CullModeFlags) -> GLenum {
    if mode.contains(CullModeFlags::FRONT_AND_BACK) {
        api::FRONT_AND_BACK
    } else if mode.contains(CullModeFlags::FRONT) {
        api::FRONT
    } else {
        api::BACK
    }
}

pub(crate) fn binding_space_to_gl(space: BindingSpace) -> GLenum {
    match space {
        BindingSpace::UniformBuffer => api::UNIFORM_BUFFER,
        BindingSpace::ShaderStorageBuffer => api::SHADER_STORAGE_BUFFER,
        BindingSpace::AtomicCounterBuffer => api::ATOMIC_COUNTER_BUFFER,
    }
}

pub(crate) fn clear_mask_to_gl(mask: ClearMask) -> GLbitfield {
    let mut bits = 0;
    if mask.contains(ClearMask::COLOR) {
        bits |= api::COLOR_BUFFER_BIT;
    }
    if mask.contains(ClearMask::DEPTH) {
        bits |= api::DEPTH_BUFFER_BIT;
    }
    if mask.contains(ClearMask::STENCIL) {
        bits |= api::STENCIL_BUFFER_BIT;
    }
    bits
}

/// `(component count, component type, normalized, integer)` for a vertex
/// attribute format.
pub(crate) fn vertex_format_to_gl(format: VertexFormat) -> (i32, GLenum, bool, bool) {
    match format {
        VertexFormat::F32 => (1, api::FLOAT, false, false),
        VertexFormat::F32x2 => (2, api::FLOAT, false, false),
        VertexFormat::F32x3 => (3, api::FLOAT, false, false),
        VertexFormat::F32x4 => (4, api::FLOAT, false, false),
        VertexFormat::U32 => (1, api::UNSIGNED_INT, false, true),
        VertexFormat::U8x4Norm => (4, api::UNSIGNED_BYTE, true, false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topology_tokens() {
        assert_eq!(topology_to_gl(PrimitiveTopology::TriangleList), api::TRIANGLES);
        assert_eq!(topology_to_gl(PrimitiveTopology::TriangleStrip), api::TRIANGLE_STRIP);
        assert_eq!(topology_to_gl(PrimitiveTopology::TriangleFan), api::TRIANGLE_FAN);
        assert_eq!(topology_to_gl(PrimitiveTopology::PointList), api::POINTS);
        assert_eq!(topology_to_gl(PrimitiveTopology::LineList), api::LINES);
    }

    #[test]
    fn index_format_tokens() {
        assert_eq!(index_format_to_gl(IndexFormat::U8), api::UNSIGNED_BYTE);
        assert_eq!(index_format_to_gl(IndexFormat::U16), api::UNSIGNED_SHORT);
        assert_eq!(index_format_to_gl(IndexFormat::U32), api::UNSIGNED_INT);
    }

    #[test]
    fn compare_op_tokens() {
        let cases = [
            (CompareOp::Never, api::NEVER),
            (CompareOp::Less, api::LESS),
            (CompareOp::Equal, api::EQUAL),
            (CompareOp::LessOrEqual, api::LEQUAL),
            (CompareOp::Greater, api::GREATER),
            (CompareOp::NotEqual, api::NOTEQUAL),
            (CompareOp::GreaterOrEqual, api::GEQUAL),
            (CompareOp::Always, api::ALWAYS),
        ];
        for &(op, token) in &cases {
            assert_eq!(compare_op_to_gl(op), token);
        }
    }

    #[test]
    fn stencil_op_tokens() {
        let cases = [
            (StencilOp::Keep, api::KEEP),
            (StencilOp::Zero, api::ZERO),
            (StencilOp::Replace, api::REPLACE),
            (StencilOp::IncrementAndClamp, api::INCR),
            (StencilOp::DecrementAndClamp, api::DECR),
            (StencilOp::Invert, api::INVERT),
            (StencilOp::IncrementAndWrap, api::INCR_WRAP),
            (StencilOp::DecrementAndWrap, api::DECR_WRAP),
        ];
        for &(op, token) in &cases {
            assert_eq!(stencil_op_to_gl(op), token);
        }
    }

    #[test]
    fn blend_factor_tokens_cover_dual_source() {
        assert_eq!(blend_factor_to_gl(BlendFactor::Zero), api::ZERO);
        assert_eq!(blend_factor_to_gl(BlendFactor::SrcAlphaSaturate), api::SRC_ALPHA_SATURATE);
        assert_eq!(blend_factor_to_gl(BlendFactor::Src1Color), api::SRC1_COLOR);
        assert_eq!(blend_factor_to_gl(BlendFactor::OneMinusSrc1Alpha), api::ONE_MINUS_SRC1_ALPHA);
    }

    #[test]
    fn cull_mode_tokens() {
        assert_eq!(cull_mode_to_gl(CullModeFlags::FRONT), api::FRONT);
        assert_eq!(cull_mode_to_gl(CullModeFlags::BACK), api::BACK);
        assert_eq!(cull_mode_to_gl(CullModeFlags::FRONT_AND_BACK), api::FRONT_AND_BACK);
    }

    #[test]
    fn clear_mask_combinations() {
        assert_eq!(clear_mask_to_gl(ClearMask::COLOR), api::COLOR_BUFFER_BIT);
        assert_eq!(
            clear_mask_to_gl(ClearMask::COLOR | ClearMask::DEPTH),
            api::COLOR_BUFFER_BIT | api::DEPTH_BUFFER_BIT
        );
        assert_eq!(
            clear_mask_to_gl(ClearMask::ALL),
            api::COLOR_BUFFER_BIT | api::DEPTH_BUFFER_BIT | api::STENCIL_BUFFER_BIT
        );
    }

    #[test]
    fn binding_space_tokens() {
        assert_eq!(binding_space_to_gl(BindingSpace::UniformBuffer), api::UNIFORM_BUFFER);
        assert_eq!(
            binding_space_to_gl(BindingSpace::ShaderStorageBuffer),
            api::SHADER_STORAGE_BUFFER
        );
        assert_eq!(
            binding_space_to_gl(BindingSpace::AtomicCounterBuffer),
            api::ATOMIC_COUNTER_BUFFER
        );
    }
}
