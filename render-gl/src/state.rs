//! Redundant-state elision.
//!
//! The cache remembers the last value applied for every piece of
//! pipeline state the executor touches and skips GL calls whose effect
//! is already in place. An identical config command therefore emits
//! nothing, and a disabled config emits at most the disable toggle.

use crate::api;
use crate::api::types::*;
use crate::device::GlDevice;
use crate::translate::{
    blend_factor_to_gl, blend_op_to_gl, compare_op_to_gl, cull_mode_to_gl, stencil_op_to_gl,
};
use lumen_render::pipeline::{
    BlendState, CompareOp, CullModeFlags, ScissorState, StencilFacing, StencilState,
};
use ordered_float::NotNan;

/// Implementation limits queried once at backend creation.
pub struct ImplementationParameters {
    pub max_draw_buffers: usize,
    pub max_viewports: usize,
    pub uniform_buffer_alignment: usize,
}

impl ImplementationParameters {
    pub fn populate(gl: &mut impl GlDevice) -> ImplementationParameters {
        ImplementationParameters {
            max_draw_buffers: gl.get_integer(api::MAX_DRAW_BUFFERS).max(1) as usize,
            max_viewports: gl.get_integer(api::MAX_VIEWPORTS).max(1) as usize,
            uniform_buffer_alignment: gl
                .get_integer(api::UNIFORM_BUFFER_OFFSET_ALIGNMENT)
                .max(1) as usize,
        }
    }
}

trait CacheSlot<T: PartialEq> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, apply: F);
}

impl<T: PartialEq> CacheSlot<T> for Option<T> {
    fn update_cached<F: FnOnce()>(&mut self, new: T, apply: F) {
        if self.as_ref().map_or(true, |v| *v != new) {
            self.replace(new);
            apply();
        }
    }
}

pub(crate) struct StateCache {
    blend: Vec<Option<BlendState>>,
    blend_constant: Option<[NotNan<f32>; 4]>,
    stencil_enabled: Option<bool>,
    stencil_front: Option<StencilState>,
    stencil_back: Option<StencilState>,
    scissors: Vec<Option<ScissorState>>,
    cull_enable: Option<bool>,
    cull_mode: Option<CullModeFlags>,
    depth_test_enabled: Option<bool>,
    depth_write: Option<bool>,
    depth_compare: Option<CompareOp>,
    depth_ranges: Vec<Option<(f64, f64)>>,
    vertex_array: Option<GLuint>,
    indirect_buffer: Option<GLuint>,
}

impl StateCache {
    pub fn new(params: &ImplementationParameters) -> StateCache {
        StateCache {
            blend: vec![None; params.max_draw_buffers],
            blend_constant: None,
            stencil_enabled: None,
            stencil_front: None,
            stencil_back: None,
            scissors: vec![None; params.max_viewports],
            cull_enable: None,
            cull_mode: None,
            depth_test_enabled: None,
            depth_write: None,
            depth_compare: None,
            depth_ranges: vec![None; params.max_viewports],
            vertex_array: None,
            indirect_buffer: None,
        }
    }

    /// Forgets everything. Call after foreign code touched the context.
    pub fn invalidate(&mut self) {
        for slot in self.blend.iter_mut() {
            *slot = None;
        }
        for slot in self.scissors.iter_mut() {
            *slot = None;
        }
        for slot in self.depth_ranges.iter_mut() {
            *slot = None;
        }
        self.blend_constant = None;
        self.stencil_enabled = None;
        self.stencil_front = None;
        self.stencil_back = None;
        self.cull_enable = None;
        self.cull_mode = None;
        self.depth_test_enabled = None;
        self.depth_write = None;
        self.depth_compare = None;
        self.vertex_array = None;
        self.indirect_buffer = None;
    }

    pub fn set_vertex_array(&mut self, gl: &mut impl GlDevice, vao: GLuint) {
        self.vertex_array.update_cached(vao, || {
            gl.bind_vertex_array(vao);
        });
    }

    pub fn set_indirect_buffer(&mut self, gl: &mut impl GlDevice, obj: GLuint) {
        self.indirect_buffer.update_cached(obj, || {
            gl.bind_buffer(api::DRAW_INDIRECT_BUFFER, obj);
        });
    }

    /// Applies one draw buffer's blend state. Index must be below the
    /// device's draw buffer limit.
    pub fn set_blend(&mut self, gl: &mut impl GlDevice, index: u32, state: &BlendState) {
        let slot = &mut self.blend[index as usize];
        if !state.enabled {
            if slot.map_or(true, |cached| cached.enabled) {
                gl.disable_indexed(api::BLEND, index);
            }
            *slot = Some(*state);
            return;
        }
        if slot.map_or(true, |cached| cached != *state) {
            *slot = Some(*state);
            gl.enable_indexed(api::BLEND, index);
            self.blend_constant.update_cached(state.constant, || {
                gl.blend_color(
                    state.constant[0].into_inner(),
                    state.constant[1].into_inner(),
                    state.constant[2].into_inner(),
                    state.constant[3].into_inner(),
                );
            });
            gl.blend_equation_separate_indexed(
                index,
                blend_op_to_gl(state.rgb_op),
                blend_op_to_gl(state.alpha_op),
            );
            gl.blend_func_separate_indexed(
                index,
                blend_factor_to_gl(state.src_rgb),
                blend_factor_to_gl(state.dst_rgb),
                blend_factor_to_gl(state.src_alpha),
                blend_factor_to_gl(state.dst_alpha),
            );
        }
    }

    pub fn set_stencil(&mut self, gl: &mut impl GlDevice, facing: StencilFacing, state: &StencilState) {
        if !state.enabled {
            self.stencil_enabled.update_cached(false, || {
                gl.disable(api::STENCIL_TEST);
            });
            return;
        }
        self.stencil_enabled.update_cached(true, || {
            gl.enable(api::STENCIL_TEST);
        });
        match facing {
            StencilFacing::Front => {
                apply_stencil_face(gl, api::FRONT, &mut self.stencil_front, state)
            }
            StencilFacing::Back => apply_stencil_face(gl, api::BACK, &mut self.stencil_back, state),
            StencilFacing::FrontAndBack => {
                apply_stencil_face(gl, api::FRONT, &mut self.stencil_front, state);
                apply_stencil_face(gl, api::BACK, &mut self.stencil_back, state);
            }
        }
    }

    /// Applies one viewport's scissor state. Index must be below the
    /// device's viewport limit.
    pub fn set_scissor(&mut self, gl: &mut impl GlDevice, viewport: u32, state: &ScissorState) {
        let slot = &mut self.scissors[viewport as usize];
        if !state.enabled {
            if slot.map_or(true, |cached| cached.enabled) {
                gl.disable_indexed(api::SCISSOR_TEST, viewport);
            }
            *slot = Some(*state);
            return;
        }
        if slot.map_or(true, |cached| cached != *state) {
            *slot = Some(*state);
            gl.enable_indexed(api::SCISSOR_TEST, viewport);
            gl.scissor_indexed(
                viewport,
                state.left,
                state.bottom,
                state.width as i32,
                state.height as i32,
            );
        }
    }

    pub fn set_cull_mode(&mut self, gl: &mut impl GlDevice, mode: CullModeFlags) {
        if mode == CullModeFlags::NONE {
            self.cull_enable.update_cached(false, || {
                gl.disable(api::CULL_FACE);
            });
            return;
        }
        self.cull_enable.update_cached(true, || {
            gl.enable(api::CULL_FACE);
        });
        self.cull_mode.update_cached(mode, || {
            gl.cull_face(cull_mode_to_gl(mode));
        });
    }

    pub fn set_depth_test(&mut self, gl: &mut impl GlDevice, enabled: bool, compare_op: CompareOp, write: bool) {
        if !enabled {
            self.depth_test_enabled.update_cached(false, || {
                gl.disable(api::DEPTH_TEST);
            });
            return;
        }
        self.depth_test_enabled.update_cached(true, || {
            gl.enable(api::DEPTH_TEST);
        });
        self.depth_compare.update_cached(compare_op, || {
            gl.depth_func(compare_op_to_gl(compare_op));
        });
        self.depth_write.update_cached(write, || {
            gl.depth_mask(write);
        });
    }

    /// Applies one viewport's depth range. Index must be below the
    /// device's viewport limit.
    pub fn set_depth_range(&mut self, gl: &mut impl GlDevice, viewport: u32, near: f64, far: f64) {
        self.depth_ranges[viewport as usize].update_cached((near, far), || {
            gl.depth_range_indexed(viewport, near, far);
        });
    }
}

fn apply_stencil_face(
    gl: &mut impl GlDevice,
    face: GLenum,
    slot: &mut Option<StencilState>,
    state: &StencilState,
) {
    if slot.map_or(true, |cached| cached != *state) {
        *slot = Some(*state);
        gl.stencil_func_separate(
            face,
            compare_op_to_gl(state.compare_op),
            state.reference,
            state.compare_mask,
        );
        gl.stencil_mask_separate(face, state.write_mask);
        gl.stencil_op_separate(
            face,
            stencil_op_to_gl(state.fail_op),
            stencil_op_to_gl(state.depth_fail_op),
            stencil_op_to_gl(state.pass_op),
        );
    }
}
