//! Command execution.
//!
//! [`Gl45Backend`] resolves every resource reference a command carries,
//! translates the backend-neutral enums, routes pipeline state through
//! the redundancy cache and issues the GL call. Statuses propagate the
//! first failure; state already applied when a command fails part-way
//! stays applied.

use crate::api;
use crate::api::types::*;
use crate::buffer::{storage_flags, GlBufferState};
use crate::config::GlBackendConfig;
use crate::device::GlDevice;
use crate::state::{ImplementationParameters, StateCache};
use crate::translate::{
    binding_space_to_gl, clear_mask_to_gl, index_format_to_gl, topology_to_gl, vertex_format_to_gl,
};
use crate::upload::MappedRing;
use crate::vertex::{id_to_key, key_to_id, GlVertexSpec, VertexSpecKey};
use fxhash::FxHashMap;
use lumen_render::buffer::{
    BindingSpace, DrawIndexedIndirectArgs, DrawIndirectArgs, UploadKind, UploadPolicy,
};
use lumen_render::command::{
    Command, DrawIndexedIndirectParams, DrawIndexedParams, DrawIndirectParams, DrawParams,
};
use lumen_render::error::{Error, Result};
use lumen_render::pipeline::{ClearMask, ClearValues};
use lumen_render::vertex::{VertexSpecDesc, VertexSpecId};
use slotmap::SlotMap;
use smallvec::SmallVec;
use std::mem;

/// OpenGL 4.5 command executor and resource registry.
///
/// Single-owner: every method takes `&mut self` and must run on the
/// thread that owns the GL context behind `G`.
pub struct Gl45Backend<G: GlDevice> {
    gl: G,
    params: ImplementationParameters,
    state: StateCache,
    buffers: FxHashMap<String, GlBufferState>,
    vertex_specs: SlotMap<VertexSpecKey, GlVertexSpec>,
    ring: MappedRing,
}

fn find_buffer<'m>(
    buffers: &'m FxHashMap<String, GlBufferState>,
    name: &str,
) -> Result<&'m GlBufferState> {
    let state = buffers
        .get(name)
        .ok_or_else(|| Error::UnknownSource(format!("no buffer named '{}' registered", name)))?;
    if !state.valid {
        return Err(Error::BrokenSource(format!(
            "buffer '{}' is not in a usable state",
            name
        )));
    }
    Ok(state)
}

impl<G: GlDevice> Gl45Backend<G> {
    pub fn new(mut gl: G, cfg: &GlBackendConfig) -> Gl45Backend<G> {
        let params = ImplementationParameters::populate(&mut gl);
        let state = StateCache::new(&params);
        let ring = MappedRing::new(&mut gl, cfg.upload_ring_size, params.uniform_buffer_alignment);
        Gl45Backend {
            gl,
            params,
            state,
            buffers: FxHashMap::default(),
            vertex_specs: SlotMap::with_key(),
            ring,
        }
    }

    pub fn params(&self) -> &ImplementationParameters {
        &self.params
    }

    /// Forgets all cached pipeline state. Call after foreign code has
    /// touched the GL context.
    pub fn invalidate_state_cache(&mut self) {
        self.state.invalidate();
    }

    /// Releases every registered resource and the streaming ring.
    pub fn destroy(self) {
        let Gl45Backend {
            mut gl,
            buffers,
            vertex_specs,
            ring,
            ..
        } = self;
        for (_, state) in buffers {
            gl.delete_buffer(state.obj);
        }
        for (_, spec) in vertex_specs {
            gl.delete_vertex_array(spec.vao);
        }
        ring.destroy(&mut gl);
    }

    // --- resource registry ---------------------------------------------

    /// Creates a buffer of `size` bytes under `name`, replacing any
    /// previous buffer of that name. `initial` must fit inside `size`.
    pub fn register_buffer(
        &mut self,
        name: &str,
        size: u64,
        policy: UploadPolicy,
        initial: Option<&[u8]>,
    ) -> Result<()> {
        if let Some(data) = initial {
            if data.len() as u64 > size {
                return Err(Error::RangeOverflow(format!(
                    "initial contents do not fit in buffer '{}'",
                    name
                )));
            }
        }
        let obj = self.gl.create_buffer(size, storage_flags(policy), initial);
        if let Err(err) = self.check_device_error("buffer creation") {
            self.gl.delete_buffer(obj);
            return Err(err);
        }
        debug!("registered buffer '{}' ({} bytes, {:?})", name, size, policy);
        let state = GlBufferState {
            obj,
            size,
            valid: true,
            policy,
        };
        if let Some(old) = self.buffers.insert(name.to_string(), state) {
            self.gl.delete_buffer(old.obj);
        }
        Ok(())
    }

    pub fn release_buffer(&mut self, name: &str) -> Result<()> {
        match self.buffers.remove(name) {
            Some(state) => {
                self.gl.delete_buffer(state.obj);
                debug!("released buffer '{}'", name);
                Ok(())
            }
            None => Err(Error::UnknownSource(format!(
                "no buffer named '{}' registered",
                name
            ))),
        }
    }

    /// Builds a VAO from the description and returns its handle. Buffer
    /// names in the description resolve through the buffer registry.
    pub fn register_vertex_specification(&mut self, desc: &VertexSpecDesc) -> Result<VertexSpecId> {
        let mut bindings: SmallVec<[(GLuint, u64, u32); 4]> = SmallVec::new();
        for vb in desc.buffers {
            let state = find_buffer(&self.buffers, vb.buffer)?;
            bindings.push((state.obj, vb.offset, vb.stride));
        }
        let index_binding = match &desc.indices {
            Some(ib) => {
                let state = find_buffer(&self.buffers, ib.buffer)?;
                Some((state.obj, ib.offset))
            }
            None => None,
        };

        let vao = self.gl.create_vertex_array();
        for (binding, &(obj, offset, stride)) in bindings.iter().enumerate() {
            self.gl
                .vertex_array_vertex_buffer(vao, binding as u32, obj, offset, stride);
        }
        for attrib in desc.attributes {
            let (size, ty, normalized, integer) = vertex_format_to_gl(attrib.format);
            self.gl.vertex_array_attrib(
                vao,
                attrib.location,
                attrib.binding,
                size,
                ty,
                normalized,
                integer,
                attrib.offset,
            );
        }
        let index_offset = match index_binding {
            Some((obj, offset)) => {
                self.gl.vertex_array_element_buffer(vao, obj);
                Some(offset)
            }
            None => None,
        };
        if let Err(err) = self.check_device_error("vertex specification creation") {
            self.gl.delete_vertex_array(vao);
            return Err(err);
        }
        let key = self.vertex_specs.insert(GlVertexSpec { vao, index_offset });
        debug!(
            "registered vertex specification (vao {}, {} attributes)",
            vao,
            desc.attributes.len()
        );
        Ok(key_to_id(key))
    }

    pub fn release_vertex_specification(&mut self, id: VertexSpecId) -> Result<()> {
        match self.vertex_specs.remove(id_to_key(id)) {
            Some(spec) => {
                self.gl.delete_vertex_array(spec.vao);
                Ok(())
            }
            None => Err(Error::UnknownSource(
                "vertex specification handle is stale or unregistered".to_string(),
            )),
        }
    }

    // --- command execution ---------------------------------------------

    pub fn execute(&mut self, cmd: &Command) -> Result<()> {
        match cmd {
            Command::Draw(params) => self.execute_draw(params),
            Command::DrawIndexed(params) => self.execute_draw_indexed(params),
            Command::DrawIndirect(params) => self.execute_draw_indirect(params),
            Command::DrawIndexedIndirect(params) => self.execute_draw_indexed_indirect(params),
            Command::UploadBuffer {
                buffer,
                kind,
                dest_offset,
                data,
            } => self.execute_buffer_upload(buffer, *kind, *dest_offset, data),
            Command::CopyBuffer {
                src,
                dst,
                src_offset,
                dst_offset,
                byte_count,
            } => self.execute_buffer_copy(src, dst, *src_offset, *dst_offset, *byte_count),
            Command::AttachBuffer {
                buffer,
                space,
                index,
            } => self.execute_buffer_attach(buffer, *space, *index),
            Command::SetBlending { draw_buffer, state } => {
                self.check_draw_buffer_index(*draw_buffer)?;
                self.state.set_blend(&mut self.gl, *draw_buffer, state);
                Ok(())
            }
            Command::SetStencil { facing, state } => {
                self.state.set_stencil(&mut self.gl, *facing, state);
                Ok(())
            }
            Command::SetScissor { viewport, state } => {
                self.check_viewport_index(*viewport)?;
                self.state.set_scissor(&mut self.gl, *viewport, state);
                Ok(())
            }
            Command::SetCullMode { mode } => {
                self.state.set_cull_mode(&mut self.gl, *mode);
                Ok(())
            }
            Command::SetDepthTest { state } => {
                self.state
                    .set_depth_test(&mut self.gl, state.enabled, state.compare_op, state.write);
                Ok(())
            }
            Command::SetDepthRange {
                viewport,
                near,
                far,
            } => {
                self.check_viewport_index(*viewport)?;
                self.state
                    .set_depth_range(&mut self.gl, *viewport, *near, *far);
                Ok(())
            }
            Command::ClearWindow { mask, values } => self.execute_clear(*mask, values),
        }
    }

    /// Binds the specification's VAO and, for indexed draws, returns the
    /// byte offset of the usable index region.
    fn bind_vertex_specification(&mut self, id: VertexSpecId, needs_indices: bool) -> Result<u64> {
        let spec = self.vertex_specs.get(id_to_key(id)).ok_or_else(|| {
            Error::UnknownSource("vertex specification handle is stale or unregistered".to_string())
        })?;
        let (vao, index_offset) = (spec.vao, spec.index_offset);
        self.state.set_vertex_array(&mut self.gl, vao);
        if needs_indices {
            index_offset.ok_or_else(|| {
                Error::BrokenSource(
                    "vertex specification has no index buffer binding".to_string(),
                )
            })
        } else {
            Ok(0)
        }
    }

    fn execute_draw(&mut self, params: &DrawParams) -> Result<()> {
        self.bind_vertex_specification(params.vertex_spec, false)?;
        self.gl.draw_arrays_instanced_base_instance(
            topology_to_gl(params.topology),
            params.first_vertex as i32,
            params.vertex_count as i32,
            params.instance_count as i32,
            params.first_instance,
        );
        Ok(())
    }

    fn execute_draw_indexed(&mut self, params: &DrawIndexedParams) -> Result<()> {
        let index_offset = self.bind_vertex_specification(params.vertex_spec, true)?;
        let element_size = params.index_format.element_size();
        let byte_offset = params.first_index as u64 * element_size + index_offset;
        self.gl.draw_elements_instanced_base_vertex_base_instance(
            topology_to_gl(params.topology),
            params.index_count as i32,
            index_format_to_gl(params.index_format),
            byte_offset as usize,
            params.instance_count as i32,
            params.vertex_offset,
            params.first_instance,
        );
        Ok(())
    }

    /// Resolves the indirect source, validates the record range and
    /// binds the buffer; returns the byte offset of the first record.
    fn bind_indirect_source(
        &mut self,
        name: &str,
        record_size: u64,
        record_offset: u64,
        draw_count: u32,
    ) -> Result<u64> {
        let state = *find_buffer(&self.buffers, name)?;
        let byte_offset = record_offset.checked_mul(record_size).ok_or_else(|| {
            Error::RangeOverflow(format!(
                "indirect draw range is out of range in buffer '{}'",
                name
            ))
        })?;
        let byte_count = record_size * draw_count as u64;
        if !state.is_in_range(byte_offset, byte_count) {
            return Err(Error::RangeOverflow(format!(
                "indirect draw range is out of range in buffer '{}'",
                name
            )));
        }
        self.state.set_indirect_buffer(&mut self.gl, state.obj);
        Ok(byte_offset)
    }

    fn execute_draw_indirect(&mut self, params: &DrawIndirectParams) -> Result<()> {
        self.bind_vertex_specification(params.vertex_spec, false)?;
        let byte_offset = self.bind_indirect_source(
            params.indirect_source,
            mem::size_of::<DrawIndirectArgs>() as u64,
            params.indirect_offset,
            params.draw_count,
        )?;
        self.gl.multi_draw_arrays_indirect(
            topology_to_gl(params.topology),
            byte_offset as usize,
            params.draw_count as i32,
            0,
        );
        Ok(())
    }

    fn execute_draw_indexed_indirect(&mut self, params: &DrawIndexedIndirectParams) -> Result<()> {
        // records address the index buffer from offset zero; the vertex
        // specification's index-region offset is not applied to indirect
        // draws
        self.bind_vertex_specification(params.vertex_spec, true)?;
        let byte_offset = self.bind_indirect_source(
            params.indirect_source,
            mem::size_of::<DrawIndexedIndirectArgs>() as u64,
            params.indirect_offset,
            params.draw_count,
        )?;
        self.gl.multi_draw_elements_indirect(
            topology_to_gl(params.topology),
            index_format_to_gl(params.index_format),
            byte_offset as usize,
            params.draw_count as i32,
            0,
        );
        Ok(())
    }

    fn execute_buffer_upload(
        &mut self,
        name: &str,
        kind: UploadKind,
        dest_offset: u64,
        data: &[u8],
    ) -> Result<()> {
        let state = *find_buffer(&self.buffers, name)?;
        if !state.is_in_range(dest_offset, data.len() as u64) {
            return Err(Error::RangeOverflow(format!(
                "upload range is out of range in buffer '{}'",
                name
            )));
        }
        match kind {
            UploadKind::Direct => self.gl.buffer_sub_data(state.obj, dest_offset, data),
            UploadKind::Streamed => self.upload_streamed(state.obj, dest_offset, data),
            UploadKind::OneShot => self.upload_one_shot(state.obj, dest_offset, data),
        }
        self.check_device_error("buffer upload")
    }

    fn upload_streamed(&mut self, dst: GLuint, dest_offset: u64, data: &[u8]) {
        match self.ring.stage(data) {
            Some((ring_obj, ring_offset)) => {
                self.gl.copy_buffer_sub_data(
                    ring_obj,
                    dst,
                    ring_offset as u64,
                    dest_offset,
                    data.len() as u64,
                );
            }
            // payload larger than the ring: stage through a transient
            // buffer instead
            None => self.upload_one_shot(dst, dest_offset, data),
        }
    }

    fn upload_one_shot(&mut self, dst: GLuint, dest_offset: u64, data: &[u8]) {
        let staging = self.gl.create_buffer(data.len() as u64, 0, Some(data));
        self.gl
            .copy_buffer_sub_data(staging, dst, 0, dest_offset, data.len() as u64);
        // the driver retires the storage once the copy completes
        self.gl.delete_buffer(staging);
    }

    fn execute_buffer_copy(
        &mut self,
        src: &str,
        dst: &str,
        src_offset: u64,
        dst_offset: u64,
        byte_count: u64,
    ) -> Result<()> {
        let src_state = *find_buffer(&self.buffers, src)?;
        let dst_state = *find_buffer(&self.buffers, dst)?;
        if !src_state.is_in_range(src_offset, byte_count) {
            return Err(Error::RangeOverflow(format!(
                "requested copy range is out of range in buffer '{}'",
                src
            )));
        }
        if !dst_state.is_in_range(dst_offset, byte_count) {
            return Err(Error::RangeOverflow(format!(
                "requested copy range is out of range in buffer '{}'",
                dst
            )));
        }
        self.gl
            .copy_buffer_sub_data(src_state.obj, dst_state.obj, src_offset, dst_offset, byte_count);
        self.check_device_error("buffer copy")
    }

    fn execute_buffer_attach(&mut self, name: &str, space: BindingSpace, index: u32) -> Result<()> {
        let state = *find_buffer(&self.buffers, name)?;
        self.gl
            .bind_buffer_base(binding_space_to_gl(space), index, state.obj);
        self.check_device_error("buffer attach")
    }

    fn execute_clear(&mut self, mask: ClearMask, values: &ClearValues) -> Result<()> {
        let [r, g, b, a] = values.color;
        self.gl.clear_color(r, g, b, a);
        self.gl.clear_depth(values.depth);
        self.gl.clear_stencil(values.stencil);
        self.gl.clear(clear_mask_to_gl(mask));
        Ok(())
    }

    fn check_draw_buffer_index(&self, index: u32) -> Result<()> {
        if (index as usize) < self.params.max_draw_buffers {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "draw buffer index {} exceeds the device limit of {}",
                index, self.params.max_draw_buffers
            )))
        }
    }

    fn check_viewport_index(&self, index: u32) -> Result<()> {
        if (index as usize) < self.params.max_viewports {
            Ok(())
        } else {
            Err(Error::Unsupported(format!(
                "viewport index {} exceeds the device limit of {}",
                index, self.params.max_viewports
            )))
        }
    }

    fn check_device_error(&mut self, what: &str) -> Result<()> {
        let err = self.gl.get_error();
        if err == api::NO_ERROR {
            Ok(())
        } else {
            Err(Error::BackendFailure(format!(
                "device reported error {:#06x} during {}",
                err, what
            )))
        }
    }
}
