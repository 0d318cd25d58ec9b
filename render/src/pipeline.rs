//! Pipeline-state records and the enums they are built from.
//!
//! The records carry plain values only; float fields that participate in
//! redundant-state detection are `NotNan` so the records stay `Eq`.

use bitflags::bitflags;
use ordered_float::NotNan;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum PrimitiveTopology {
    PointList,
    LineList,
    TriangleList,
    TriangleStrip,
    TriangleFan,
}

/// Comparison function shared by the depth and stencil tests.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum CompareOp {
    Never,
    Less,
    Equal,
    LessOrEqual,
    Greater,
    NotEqual,
    GreaterOrEqual,
    Always,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StencilOp {
    Keep,
    Zero,
    Replace,
    IncrementAndClamp,
    DecrementAndClamp,
    Invert,
    IncrementAndWrap,
    DecrementAndWrap,
}

/// Face scope of a stencil configuration command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum StencilFacing {
    Front,
    Back,
    FrontAndBack,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendFactor {
    Zero,
    One,
    SrcColor,
    OneMinusSrcColor,
    DstColor,
    OneMinusDstColor,
    SrcAlpha,
    OneMinusSrcAlpha,
    DstAlpha,
    OneMinusDstAlpha,
    ConstantColor,
    OneMinusConstantColor,
    ConstantAlpha,
    OneMinusConstantAlpha,
    SrcAlphaSaturate,
    Src1Color,
    OneMinusSrc1Color,
    Src1Alpha,
    OneMinusSrc1Alpha,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BlendOp {
    Add,
    Subtract,
    ReverseSubtract,
    Min,
    Max,
}

/// Shader pipeline stages, as reported by reflection.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum ShaderStage {
    Vertex,
    Fragment,
    Geometry,
    TessControl,
    TessEval,
    Compute,
}

bitflags! {
    /// `NONE` disables culling entirely.
    #[derive(Default)]
    pub struct CullModeFlags: u32 {
        const NONE = 0;
        const FRONT = 1;
        const BACK = 2;
        const FRONT_AND_BACK = Self::FRONT.bits | Self::BACK.bits;
    }
}

bitflags! {
    /// Which framebuffer aspects a clear command touches.
    pub struct ClearMask: u32 {
        const COLOR = (1 << 0);
        const DEPTH = (1 << 1);
        const STENCIL = (1 << 2);
        const ALL = Self::COLOR.bits | Self::DEPTH.bits | Self::STENCIL.bits;
    }
}

/// Blend configuration for one draw buffer.
///
/// When `enabled` is false every other field is inert: the backend
/// disables blending for the draw buffer and touches nothing else.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct BlendState {
    pub enabled: bool,
    /// Constant blend color referenced by the `Constant*` factors.
    pub constant: [NotNan<f32>; 4],
    pub rgb_op: BlendOp,
    pub alpha_op: BlendOp,
    pub src_rgb: BlendFactor,
    pub dst_rgb: BlendFactor,
    pub src_alpha: BlendFactor,
    pub dst_alpha: BlendFactor,
}

/// Stencil configuration for one face scope.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct StencilState {
    pub enabled: bool,
    pub compare_op: CompareOp,
    pub reference: i32,
    pub compare_mask: u32,
    pub write_mask: u32,
    pub fail_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub pass_op: StencilOp,
}

/// Scissor rectangle for one viewport.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct ScissorState {
    pub enabled: bool,
    pub left: i32,
    pub bottom: i32,
    pub width: u32,
    pub height: u32,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct DepthTestState {
    pub enabled: bool,
    pub compare_op: CompareOp,
    /// Whether passing fragments update the depth buffer.
    pub write: bool,
}

/// Values applied before a framebuffer clear. Always applied in full,
/// regardless of the clear mask.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ClearValues {
    pub color: [f32; 4],
    pub depth: f64,
    pub stencil: i32,
}

impl Default for ClearValues {
    fn default() -> ClearValues {
        ClearValues {
            color: [0.0; 4],
            depth: 1.0,
            stencil: 0,
        }
    }
}
