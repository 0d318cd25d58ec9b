//! Call-logging device used by the backend's tests.
//!
//! Mutating calls are recorded in submission order; queries are answered
//! from configurable canned values and never logged.

use crate::api;
use crate::api::types::*;
use crate::device::GlDevice;
use fxhash::FxHashMap;
use std::collections::VecDeque;

/// One mutating GL call, as observed by [`MockGl`].
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum GlCall {
    CreateBuffer {
        obj: GLuint,
        size: u64,
        flags: GLbitfield,
        with_data: bool,
    },
    DeleteBuffer(GLuint),
    MapBuffer(GLuint),
    UnmapBuffer(GLuint),
    BufferSubData {
        obj: GLuint,
        offset: u64,
        len: u64,
    },
    CopyBufferSubData {
        src: GLuint,
        dst: GLuint,
        src_offset: u64,
        dst_offset: u64,
        bytes: u64,
    },
    BindBuffer {
        target: GLenum,
        obj: GLuint,
    },
    BindBufferBase {
        target: GLenum,
        index: u32,
        obj: GLuint,
    },
    CreateVertexArray(GLuint),
    DeleteVertexArray(GLuint),
    VertexArrayAttrib {
        vao: GLuint,
        location: u32,
        binding: u32,
    },
    VertexArrayVertexBuffer {
        vao: GLuint,
        binding: u32,
        buffer: GLuint,
        offset: u64,
        stride: u32,
    },
    VertexArrayElementBuffer {
        vao: GLuint,
        buffer: GLuint,
    },
    BindVertexArray(GLuint),
    Enable(GLenum),
    Disable(GLenum),
    EnableIndexed(GLenum, u32),
    DisableIndexed(GLenum, u32),
    BlendColor {
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    },
    BlendEquationSeparate {
        buf: u32,
        rgb: GLenum,
        alpha: GLenum,
    },
    BlendFuncSeparate {
        buf: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    },
    StencilFuncSeparate {
        face: GLenum,
        func: GLenum,
        reference: i32,
        mask: u32,
    },
    StencilMaskSeparate {
        face: GLenum,
        mask: u32,
    },
    StencilOpSeparate {
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    },
    ScissorIndexed {
        index: u32,
        left: i32,
        bottom: i32,
        width: i32,
        height: i32,
    },
    CullFace(GLenum),
    DepthFunc(GLenum),
    DepthMask(bool),
    DepthRangeIndexed {
        index: u32,
        near: f64,
        far: f64,
    },
    ClearColor {
        r: f32,
        g: f32,
        b: f32,
        a: f32,
    },
    ClearDepth(f64),
    ClearStencil(i32),
    Clear(GLbitfield),
    DrawArrays {
        mode: GLenum,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    },
    DrawElements {
        mode: GLenum,
        count: i32,
        ty: GLenum,
        offset: usize,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    },
    MultiDrawArraysIndirect {
        mode: GLenum,
        offset: usize,
        draw_count: i32,
        stride: i32,
    },
    MultiDrawElementsIndirect {
        mode: GLenum,
        ty: GLenum,
        offset: usize,
        draw_count: i32,
        stride: i32,
    },
    CreateShader(GLenum),
    DeleteShader(GLuint),
    ShaderSource {
        obj: GLuint,
        len: usize,
    },
    CompileShader(GLuint),
    ShaderBinarySpirv {
        obj: GLuint,
        len: usize,
    },
    SpecializeShader {
        obj: GLuint,
        entry_point: String,
    },
    CreateProgram(GLuint),
    DeleteProgram(GLuint),
    AttachShader {
        program: GLuint,
        shader: GLuint,
    },
    LinkProgram(GLuint),
}

pub(crate) struct MockGl {
    pub calls: Vec<GlCall>,
    /// Injected `get_error` results; empty means `NO_ERROR`.
    pub errors: VecDeque<GLenum>,
    pub compile_ok: bool,
    pub specialize_ok: bool,
    pub link_ok: bool,
    pub info_log: String,
    next_name: GLuint,
    mapped: FxHashMap<GLuint, Box<[u8]>>,
}

impl MockGl {
    pub fn new() -> MockGl {
        MockGl {
            calls: Vec::new(),
            errors: VecDeque::new(),
            compile_ok: true,
            specialize_ok: true,
            link_ok: true,
            info_log: String::new(),
            next_name: 1,
            mapped: FxHashMap::default(),
        }
    }

    fn fresh_name(&mut self) -> GLuint {
        let name = self.next_name;
        self.next_name += 1;
        name
    }
}

impl GlDevice for MockGl {
    fn get_integer(&mut self, pname: GLenum) -> i32 {
        match pname {
            api::MAX_DRAW_BUFFERS => 8,
            api::MAX_VIEWPORTS => 16,
            api::UNIFORM_BUFFER_OFFSET_ALIGNMENT => 256,
            _ => 0,
        }
    }

    fn get_error(&mut self) -> GLenum {
        self.errors.pop_front().unwrap_or(api::NO_ERROR)
    }

    fn create_buffer(&mut self, size: u64, flags: GLbitfield, initial: Option<&[u8]>) -> GLuint {
        let obj = self.fresh_name();
        self.calls.push(GlCall::CreateBuffer {
            obj,
            size,
            flags,
            with_data: initial.is_some(),
        });
        obj
    }

    fn delete_buffer(&mut self, obj: GLuint) {
        self.calls.push(GlCall::DeleteBuffer(obj));
    }

    fn map_buffer_persistent(&mut self, obj: GLuint, size: u64) -> *mut u8 {
        self.calls.push(GlCall::MapBuffer(obj));
        let backing = self
            .mapped
            .entry(obj)
            .or_insert_with(|| vec![0u8; size as usize].into_boxed_slice());
        backing.as_mut_ptr()
    }

    fn unmap_buffer(&mut self, obj: GLuint) {
        self.calls.push(GlCall::UnmapBuffer(obj));
        self.mapped.remove(&obj);
    }

    fn buffer_sub_data(&mut self, obj: GLuint, offset: u64, data: &[u8]) {
        self.calls.push(GlCall::BufferSubData {
            obj,
            offset,
            len: data.len() as u64,
        });
    }

    fn copy_buffer_sub_data(
        &mut self,
        src: GLuint,
        dst: GLuint,
        src_offset: u64,
        dst_offset: u64,
        bytes: u64,
    ) {
        self.calls.push(GlCall::CopyBufferSubData {
            src,
            dst,
            src_offset,
            dst_offset,
            bytes,
        });
    }

    fn bind_buffer(&mut self, target: GLenum, obj: GLuint) {
        self.calls.push(GlCall::BindBuffer { target, obj });
    }

    fn bind_buffer_base(&mut self, target: GLenum, index: u32, obj: GLuint) {
        self.calls.push(GlCall::BindBufferBase { target, index, obj });
    }

    fn create_vertex_array(&mut self) -> GLuint {
        let obj = self.fresh_name();
        self.calls.push(GlCall::CreateVertexArray(obj));
        obj
    }

    fn delete_vertex_array(&mut self, obj: GLuint) {
        self.calls.push(GlCall::DeleteVertexArray(obj));
    }

    fn vertex_array_attrib(
        &mut self,
        vao: GLuint,
        location: u32,
        binding: u32,
        _size: i32,
        _ty: GLenum,
        _normalized: bool,
        _integer: bool,
        _relative_offset: u32,
    ) {
        self.calls.push(GlCall::VertexArrayAttrib {
            vao,
            location,
            binding,
        });
    }

    fn vertex_array_vertex_buffer(
        &mut self,
        vao: GLuint,
        binding: u32,
        buffer: GLuint,
        offset: u64,
        stride: u32,
    ) {
        self.calls.push(GlCall::VertexArrayVertexBuffer {
            vao,
            binding,
            buffer,
            offset,
            stride,
        });
    }

    fn vertex_array_element_buffer(&mut self, vao: GLuint, buffer: GLuint) {
        self.calls.push(GlCall::VertexArrayElementBuffer { vao, buffer });
    }

    fn bind_vertex_array(&mut self, obj: GLuint) {
        self.calls.push(GlCall::BindVertexArray(obj));
    }

    fn enable(&mut self, cap: GLenum) {
        self.calls.push(GlCall::Enable(cap));
    }

    fn disable(&mut self, cap: GLenum) {
        self.calls.push(GlCall::Disable(cap));
    }

    fn enable_indexed(&mut self, cap: GLenum, index: u32) {
        self.calls.push(GlCall::EnableIndexed(cap, index));
    }

    fn disable_indexed(&mut self, cap: GLenum, index: u32) {
        self.calls.push(GlCall::DisableIndexed(cap, index));
    }

    fn blend_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.calls.push(GlCall::BlendColor { r, g, b, a });
    }

    fn blend_equation_separate_indexed(&mut self, buf: u32, rgb: GLenum, alpha: GLenum) {
        self.calls.push(GlCall::BlendEquationSeparate { buf, rgb, alpha });
    }

    fn blend_func_separate_indexed(
        &mut self,
        buf: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        self.calls.push(GlCall::BlendFuncSeparate {
            buf,
            src_rgb,
            dst_rgb,
            src_alpha,
            dst_alpha,
        });
    }

    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32) {
        self.calls.push(GlCall::StencilFuncSeparate {
            face,
            func,
            reference,
            mask,
        });
    }

    fn stencil_mask_separate(&mut self, face: GLenum, mask: u32) {
        self.calls.push(GlCall::StencilMaskSeparate { face, mask });
    }

    fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) {
        self.calls.push(GlCall::StencilOpSeparate {
            face,
            stencil_fail,
            depth_fail,
            depth_pass,
        });
    }

    fn scissor_indexed(&mut self, index: u32, left: i32, bottom: i32, width: i32, height: i32) {
        self.calls.push(GlCall::ScissorIndexed {
            index,
            left,
            bottom,
            width,
            height,
        });
    }

    fn cull_face(&mut self, mode: GLenum) {
        self.calls.push(GlCall::CullFace(mode));
    }

    fn depth_func(&mut self, func: GLenum) {
        self.calls.push(GlCall::DepthFunc(func));
    }

    fn depth_mask(&mut self, write: bool) {
        self.calls.push(GlCall::DepthMask(write));
    }

    fn depth_range_indexed(&mut self, index: u32, near: f64, far: f64) {
        self.calls.push(GlCall::DepthRangeIndexed { index, near, far });
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.calls.push(GlCall::ClearColor { r, g, b, a });
    }

    fn clear_depth(&mut self, depth: f64) {
        self.calls.push(GlCall::ClearDepth(depth));
    }

    fn clear_stencil(&mut self, stencil: i32) {
        self.calls.push(GlCall::ClearStencil(stencil));
    }

    fn clear(&mut self, mask: GLbitfield) {
        self.calls.push(GlCall::Clear(mask));
    }

    fn draw_arrays_instanced_base_instance(
        &mut self,
        mode: GLenum,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    ) {
        self.calls.push(GlCall::DrawArrays {
            mode,
            first,
            count,
            instances,
            base_instance,
        });
    }

    fn draw_elements_instanced_base_vertex_base_instance(
        &mut self,
        mode: GLenum,
        count: i32,
        ty: GLenum,
        offset: usize,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    ) {
        self.calls.push(GlCall::DrawElements {
            mode,
            count,
            ty,
            offset,
            instances,
            base_vertex,
            base_instance,
        });
    }

    fn multi_draw_arrays_indirect(&mut self, mode: GLenum, offset: usize, draw_count: i32, stride: i32) {
        self.calls.push(GlCall::MultiDrawArraysIndirect {
            mode,
            offset,
            draw_count,
            stride,
        });
    }

    fn multi_draw_elements_indirect(
        &mut self,
        mode: GLenum,
        ty: GLenum,
        offset: usize,
        draw_count: i32,
        stride: i32,
    ) {
        self.calls.push(GlCall::MultiDrawElementsIndirect {
            mode,
            ty,
            offset,
            draw_count,
            stride,
        });
    }

    fn create_shader(&mut self, stage: GLenum) -> GLuint {
        self.calls.push(GlCall::CreateShader(stage));
        self.fresh_name()
    }

    fn delete_shader(&mut self, obj: GLuint) {
        self.calls.push(GlCall::DeleteShader(obj));
    }

    fn shader_source(&mut self, obj: GLuint, source: &[u8]) {
        self.calls.push(GlCall::ShaderSource {
            obj,
            len: source.len(),
        });
    }

    fn compile_shader(&mut self, obj: GLuint) -> bool {
        self.calls.push(GlCall::CompileShader(obj));
        self.compile_ok
    }

    fn shader_binary_spirv(&mut self, obj: GLuint, bytecode: &[u8]) {
        self.calls.push(GlCall::ShaderBinarySpirv {
            obj,
            len: bytecode.len(),
        });
    }

    fn specialize_shader(&mut self, obj: GLuint, entry_point: &str) -> bool {
        self.calls.push(GlCall::SpecializeShader {
            obj,
            entry_point: entry_point.to_string(),
        });
        self.specialize_ok
    }

    fn shader_info_log(&mut self, _obj: GLuint) -> String {
        self.info_log.clone()
    }

    fn create_program(&mut self) -> GLuint {
        let obj = self.fresh_name();
        self.calls.push(GlCall::CreateProgram(obj));
        obj
    }

    fn delete_program(&mut self, obj: GLuint) {
        self.calls.push(GlCall::DeleteProgram(obj));
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        self.calls.push(GlCall::AttachShader { program, shader });
    }

    fn link_program_object(&mut self, program: GLuint) -> bool {
        self.calls.push(GlCall::LinkProgram(program));
        self.link_ok
    }

    fn program_info_log(&mut self, _obj: GLuint) -> String {
        self.info_log.clone()
    }
}
