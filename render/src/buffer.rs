//! Buffer upload disciplines, attachment points and indirect-draw
//! argument layouts.

/// Discipline used by a single upload command.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UploadKind {
    /// Synchronous write straight into buffer storage. Racy with any
    /// in-flight GPU read of the range; the caller owns correctness.
    Direct,
    /// Write through the persistently mapped streaming ring followed by
    /// a device-side copy. Visible to subsequent commands in the stream;
    /// draws already in flight see the previous contents.
    Streamed,
    /// Write through a transient staging buffer that is released once
    /// its copy has been issued.
    OneShot,
}

/// Creation-time policy of a registered buffer. Selects the storage
/// flags the buffer is allocated with.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UploadPolicy {
    /// The buffer accepts direct host writes.
    Direct,
    /// The buffer is fed through the streaming ring.
    Streaming,
    /// The buffer is fed through transient staging copies.
    OneShot,
}

/// Indexed binding targets for buffer attachment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BindingSpace {
    UniformBuffer,
    ShaderStorageBuffer,
    AtomicCounterBuffer,
}

/// GPU-side layout of one non-indexed indirect draw record.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DrawIndirectArgs {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

/// GPU-side layout of one indexed indirect draw record.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct DrawIndexedIndirectArgs {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
    pub first_instance: u32,
}
