//! The device seam between the backend and the GL driver.
//!
//! Everything the backend emits goes through [`GlDevice`]; the trait is
//! cut at the granularity of the GL 4.5 entry points so tests can assert
//! exact call sequences against a logging implementation.

use crate::api;
use crate::api::types::*;
use std::ffi::CString;
use std::os::raw::c_void;
use std::ptr;

/// The subset of OpenGL 4.5 (direct state access) used by the backend.
pub trait GlDevice {
    // queries
    fn get_integer(&mut self, pname: GLenum) -> i32;
    fn get_error(&mut self) -> GLenum;

    // buffers
    fn create_buffer(&mut self, size: u64, flags: GLbitfield, initial: Option<&[u8]>) -> GLuint;
    fn delete_buffer(&mut self, obj: GLuint);
    /// Maps the whole buffer for persistent, coherent, unsynchronized
    /// writes. The pointer stays valid until `unmap_buffer`.
    fn map_buffer_persistent(&mut self, obj: GLuint, size: u64) -> *mut u8;
    fn unmap_buffer(&mut self, obj: GLuint);
    fn buffer_sub_data(&mut self, obj: GLuint, offset: u64, data: &[u8]);
    fn copy_buffer_sub_data(
        &mut self,
        src: GLuint,
        dst: GLuint,
        src_offset: u64,
        dst_offset: u64,
        bytes: u64,
    );
    fn bind_buffer(&mut self, target: GLenum, obj: GLuint);
    fn bind_buffer_base(&mut self, target: GLenum, index: u32, obj: GLuint);

    // vertex arrays
    fn create_vertex_array(&mut self) -> GLuint;
    fn delete_vertex_array(&mut self, obj: GLuint);
    fn vertex_array_attrib(
        &mut self,
        vao: GLuint,
        location: u32,
        binding: u32,
        size: i32,
        ty: GLenum,
        normalized: bool,
        integer: bool,
        relative_offset: u32,
    );
    fn vertex_array_vertex_buffer(
        &mut self,
        vao: GLuint,
        binding: u32,
        buffer: GLuint,
        offset: u64,
        stride: u32,
    );
    fn vertex_array_element_buffer(&mut self, vao: GLuint, buffer: GLuint);
    fn bind_vertex_array(&mut self, obj: GLuint);

    // pipeline state
    fn enable(&mut self, cap: GLenum);
    fn disable(&mut self, cap: GLenum);
    fn enable_indexed(&mut self, cap: GLenum, index: u32);
    fn disable_indexed(&mut self, cap: GLenum, index: u32);
    fn blend_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn blend_equation_separate_indexed(&mut self, buf: u32, rgb: GLenum, alpha: GLenum);
    fn blend_func_separate_indexed(
        &mut self,
        buf: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    );
    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32);
    fn stencil_mask_separate(&mut self, face: GLenum, mask: u32);
    fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    );
    fn scissor_indexed(&mut self, index: u32, left: i32, bottom: i32, width: i32, height: i32);
    fn cull_face(&mut self, mode: GLenum);
    fn depth_func(&mut self, func: GLenum);
    fn depth_mask(&mut self, write: bool);
    fn depth_range_indexed(&mut self, index: u32, near: f64, far: f64);
    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32);
    fn clear_depth(&mut self, depth: f64);
    fn clear_stencil(&mut self, stencil: i32);
    fn clear(&mut self, mask: GLbitfield);

    // draws
    fn draw_arrays_instanced_base_instance(
        &mut self,
        mode: GLenum,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    );
    fn draw_elements_instanced_base_vertex_base_instance(
        &mut self,
        mode: GLenum,
        count: i32,
        ty: GLenum,
        offset: usize,
        instances: i32,
        base_vertex: i32,
        base_instance: u32,
    );
    fn multi_draw_arrays_indirect(&mut self, mode: GLenum, offset: usize, draw_count: i32, stride: i32);
    fn multi_draw_elements_indirect(
        &mut self,
        mode: GLenum,
        ty: GLenum,
        offset: usize,
        draw_count: i32,
        stride: i32,
    );

    // shader objects
    fn create_shader(&mut self, stage: GLenum) -> GLuint;
    fn delete_shader(&mut self, obj: GLuint);
    fn shader_source(&mut self, obj: GLuint, source: &[u8]);
    fn compile_shader(&mut self, obj: GLuint) -> bool;
    fn shader_binary_spirv(&mut self, obj: GLuint, bytecode: &[u8]);
    fn specialize_shader(&mut self, obj: GLuint, entry_point: &str) -> bool;
    fn shader_info_log(&mut self, obj: GLuint) -> String;
    fn create_program(&mut self) -> GLuint;
    fn delete_program(&mut self, obj: GLuint);
    fn attach_shader(&mut self, program: GLuint, shader: GLuint);
    fn link_program_object(&mut self, program: GLuint) -> bool;
    fn program_info_log(&mut self, obj: GLuint) -> String;
}

/// Driver-backed device over function pointers loaded from the current
/// GL context. The context must stay current on the calling thread for
/// the lifetime of the value.
pub struct LoadedGl {
    gl: api::Gl,
}

impl LoadedGl {
    pub fn load_with<F>(loader: F) -> LoadedGl
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        LoadedGl {
            gl: api::Gl::load_with(loader),
        }
    }
}

impl GlDevice for LoadedGl {
    fn get_integer(&mut self, pname: GLenum) -> i32 {
        let mut v = 0;
        unsafe {
            self.gl.GetIntegerv(pname, &mut v);
        }
        v
    }

    fn get_error(&mut self) -> GLenum {
        unsafe { self.gl.GetError() }
    }

    fn create_buffer(&mut self, size: u64, flags: GLbitfield, initial: Option<&[u8]>) -> GLuint {
        let mut obj: GLuint = 0;
        unsafe {
            self.gl.CreateBuffers(1, &mut obj);
            self.gl.NamedBufferStorage(
                obj,
                size as GLsizeiptr,
                if let Some(data) = initial {
                    data.as_ptr() as *const GLvoid
                } else {
                    ptr::null()
                },
                flags,
            );
        }
        obj
    }

    fn delete_buffer(&mut self, obj: GLuint) {
        unsafe {
            self.gl.DeleteBuffers(1, &obj);
        }
    }

    fn map_buffer_persistent(&mut self, obj: GLuint, size: u64) -> *mut u8 {
        let flags = api::MAP_UNSYNCHRONIZED_BIT
            | api::MAP_WRITE_BIT
            | api::MAP_PERSISTENT_BIT
            | api::MAP_COHERENT_BIT;
        unsafe { self.gl.MapNamedBufferRange(obj, 0, size as GLsizeiptr, flags) as *mut u8 }
    }

    fn unmap_buffer(&mut self, obj: GLuint) {
        unsafe {
            self.gl.UnmapNamedBuffer(obj);
        }
    }

    fn buffer_sub_data(&mut self, obj: GLuint, offset: u64, data: &[u8]) {
        unsafe {
            self.gl.NamedBufferSubData(
                obj,
                offset as GLintptr,
                data.len() as GLsizeiptr,
                data.as_ptr() as *const GLvoid,
            );
        }
    }

    fn copy_buffer_sub_data(
        &mut self,
        src: GLuint,
        dst: GLuint,
        src_offset: u64,
        dst_offset: u64,
        bytes: u64,
    ) {
        unsafe {
            self.gl.CopyNamedBufferSubData(
                src,
                dst,
                src_offset as GLintptr,
                dst_offset as GLintptr,
                bytes as GLsizeiptr,
            );
        }
    }

    fn bind_buffer(&mut self, target: GLenum, obj: GLuint) {
        unsafe {
            self.gl.BindBuffer(target, obj);
        }
    }

    fn bind_buffer_base(&mut self, target: GLenum, index: u32, obj: GLuint) {
        unsafe {
            self.gl.BindBufferBase(target, index, obj);
        }
    }

    fn create_vertex_array(&mut self) -> GLuint {
        let mut obj: GLuint = 0;
        unsafe {
            self.gl.CreateVertexArrays(1, &mut obj);
        }
        obj
    }

    fn delete_vertex_array(&mut self, obj: GLuint) {
        unsafe {
            self.gl.DeleteVertexArrays(1, &obj);
        }
    }

    fn vertex_array_attrib(
        &mut self,
        vao: GLuint,
        location: u32,
        binding: u32,
        size: i32,
        ty: GLenum,
        normalized: bool,
        integer: bool,
        relative_offset: u32,
    ) {
        unsafe {
            self.gl.EnableVertexArrayAttrib(vao, location);
            if integer {
                self.gl
                    .VertexArrayAttribIFormat(vao, location, size, ty, relative_offset);
            } else {
                self.gl.VertexArrayAttribFormat(
                    vao,
                    location,
                    size,
                    ty,
                    if normalized { api::TRUE } else { api::FALSE },
                    relative_offset,
                );
            }
            self.gl.VertexArrayAttribBinding(vao, location, binding);
        }
    }

    fn vertex_array_vertex_buffer(
        &mut self,
        vao: GLuint,
        binding: u32,
        buffer: GLuint,
        offset: u64,
        stride: u32,
    ) {
        unsafe {
            self.gl
                .VertexArrayVertexBuffer(vao, binding, buffer, offset as GLintptr, stride as GLsizei);
        }
    }

    fn vertex_array_element_buffer(&mut self, vao: GLuint, buffer: GLuint) {
        unsafe {
            self.gl.VertexArrayElementBuffer(vao, buffer);
        }
    }

    fn bind_vertex_array(&mut self, obj: GLuint) {
        unsafe {
            self.gl.BindVertexArray(obj);
        }
    }

    fn enable(&mut self, cap: GLenum) {
        unsafe {
            self.gl.Enable(cap);
        }
    }

    fn disable(&mut self, cap: GLenum) {
        unsafe {
            self.gl.Disable(cap);
        }
    }

    fn enable_indexed(&mut self, cap: GLenum, index: u32) {
        unsafe {
            self.gl.Enablei(cap, index);
        }
    }

    fn disable_indexed(&mut self, cap: GLenum, index: u32) {
        unsafe {
            self.gl.Disablei(cap, index);
        }
    }

    fn blend_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.BlendColor(r, g, b, a);
        }
    }

    fn blend_equation_separate_indexed(&mut self, buf: u32, rgb: GLenum, alpha: GLenum) {
        unsafe {
            self.gl.BlendEquationSeparatei(buf, rgb, alpha);
        }
    }

    fn blend_func_separate_indexed(
        &mut self,
        buf: u32,
        src_rgb: GLenum,
        dst_rgb: GLenum,
        src_alpha: GLenum,
        dst_alpha: GLenum,
    ) {
        unsafe {
            self.gl
                .BlendFuncSeparatei(buf, src_rgb, dst_rgb, src_alpha, dst_alpha);
        }
    }

    fn stencil_func_separate(&mut self, face: GLenum, func: GLenum, reference: i32, mask: u32) {
        unsafe {
            self.gl.StencilFuncSeparate(face, func, reference, mask);
        }
    }

    fn stencil_mask_separate(&mut self, face: GLenum, mask: u32) {
        unsafe {
            self.gl.StencilMaskSeparate(face, mask);
        }
    }

    fn stencil_op_separate(
        &mut self,
        face: GLenum,
        stencil_fail: GLenum,
        depth_fail: GLenum,
        depth_pass: GLenum,
    ) {
        unsafe {
            self.gl
                .StencilOpSeparate(face, stencil_fail, depth_fail, depth_pass);
        }
    }

    fn scissor_indexed(&mut self, index: u32, left: i32, bottom: i32, width: i32, height: i32) {
        unsafe {
            self.gl.ScissorIndexed(index, left, bottom, width, height);
        }
    }

    fn cull_face(&mut self, mode: GLenum) {
        unsafe {
            self.gl.CullFace(mode);
        }
    }

    fn depth_func(&mut self, func: GLenum) {
        unsafe {
            self.gl.DepthFunc(func);
        }
    }

    fn depth_mask(&mut self, write: bool) {
        unsafe {
            self.gl.DepthMask(if write { api::TRUE } else { api::FALSE });
        }
    }

    fn depth_range_indexed(&mut self, index: u32, near: f64, far: f64) {
        unsafe {
            self.gl.DepthRangeIndexed(index, near, far);
        }
    }

    fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        unsafe {
            self.gl.ClearColor(r, g, b, a);
        }
    }

    fn clear_depth(&mut self, depth: f64) {
        unsafe {
            self.gl.ClearDepth(depth);
        }
    }

    fn clear_stencil(&mut self, stencil: i32) {
        unsafe {
            self.gl.ClearStencil(stencil);
        }
    }

    fn clear(&mut self, mask: GLbitfield) {
        unsafe {
            self.gl.Clear(mask);
        }
    }

    fn draw_arrays_instanced_base_instance(
        &mut self,
        mode: GLenum,
        first: i32,
        count: i32,
        instances: i32,
        base_instance: u32,
    ) {
        unsafe {
            self.gl
                .DrawArraysInstancedBaseInstance(mode, first, count, instances, base_instance);
        }
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
        unsafe {
            self.gl.DrawElementsInstancedBaseVertexBaseInstance(
                mode,
                count,
                ty,
                offset as *const GLvoid,
                instances,
                base_vertex,
                base_instance,
            );
        }
    }

    fn multi_draw_arrays_indirect(&mut self, mode: GLenum, offset: usize, draw_count: i32, stride: i32) {
        unsafe {
            self.gl
                .MultiDrawArraysIndirect(mode, offset as *const GLvoid, draw_count, stride);
        }
    }

    fn multi_draw_elements_indirect(
        &mut self,
        mode: GLenum,
        ty: GLenum,
        offset: usize,
        draw_count: i32,
        stride: i32,
    ) {
        unsafe {
            self.gl
                .MultiDrawElementsIndirect(mode, ty, offset as *const GLvoid, draw_count, stride);
        }
    }

    fn create_shader(&mut self, stage: GLenum) -> GLuint {
        unsafe { self.gl.CreateShader(stage) }
    }

    fn delete_shader(&mut self, obj: GLuint) {
        unsafe {
            self.gl.DeleteShader(obj);
        }
    }

    fn shader_source(&mut self, obj: GLuint, source: &[u8]) {
        let sources = [source.as_ptr() as *const GLchar];
        let lengths = [source.len() as GLint];
        unsafe {
            self.gl
                .ShaderSource(obj, 1, sources.as_ptr(), lengths.as_ptr());
        }
    }

    fn compile_shader(&mut self, obj: GLuint) -> bool {
        unsafe {
            self.gl.CompileShader(obj);
            let mut status = 0;
            self.gl.GetShaderiv(obj, api::COMPILE_STATUS, &mut status);
            status == api::TRUE as GLint
        }
    }

    fn shader_binary_spirv(&mut self, obj: GLuint, bytecode: &[u8]) {
        unsafe {
            self.gl.ShaderBinary(
                1,
                &obj,
                api::SHADER_BINARY_FORMAT_SPIR_V,
                bytecode.as_ptr() as *const c_void,
                bytecode.len() as GLsizei,
            );
        }
    }

    fn specialize_shader(&mut self, obj: GLuint, entry_point: &str) -> bool {
        let entry_point = CString::new(entry_point).unwrap_or_default();
        unsafe {
            self.gl
                .SpecializeShader(obj, entry_point.as_ptr(), 0, ptr::null(), ptr::null());
            let mut status = 0;
            self.gl.GetShaderiv(obj, api::COMPILE_STATUS, &mut status);
            status == api::TRUE as GLint
        }
    }

    fn shader_info_log(&mut self, obj: GLuint) -> String {
        unsafe {
            let mut log_size = 0;
            self.gl.GetShaderiv(obj, api::INFO_LOG_LENGTH, &mut log_size);
            let mut log_buf = vec![0u8; log_size.max(0) as usize];
            let mut written = 0;
            self.gl.GetShaderInfoLog(
                obj,
                log_buf.len() as GLsizei,
                &mut written,
                log_buf.as_mut_ptr() as *mut GLchar,
            );
            log_buf.truncate(written.max(0) as usize);
            String::from_utf8_lossy(&log_buf).into_owned()
        }
    }

    fn create_program(&mut self) -> GLuint {
        unsafe { self.gl.CreateProgram() }
    }

    fn delete_program(&mut self, obj: GLuint) {
        unsafe {
            self.gl.DeleteProgram(obj);
        }
    }

    fn attach_shader(&mut self, program: GLuint, shader: GLuint) {
        unsafe {
            self.gl.AttachShader(program, shader);
        }
    }

    fn link_program_object(&mut self, program: GLuint) -> bool {
        unsafe {
            self.gl.LinkProgram(program);
            let mut status = 0;
            self.gl.GetProgramiv(program, api::LINK_STATUS, &mut status);
            status == api::TRUE as GLint
        }
    }

    fn program_info_log(&mut self, obj: GLuint) -> String {
        unsafe {
            let mut log_size = 0;
            self.gl.GetProgramiv(obj, api::INFO_LOG_LENGTH, &mut log_size);
            let mut log_buf = vec![0u8; log_size.max(0) as usize];
            let mut written = 0;
            self.gl.GetProgramInfoLog(
                obj,
                log_buf.len() as GLsizei,
                &mut written,
                log_buf.as_mut_ptr() as *mut GLchar,
            );
            log_buf.truncate(written.max(0) as usize);
            String::from_utf8_lossy(&log_buf).into_owned()
        }
    }
}
