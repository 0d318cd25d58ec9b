/// Graphics APIs a backend or a shader target can address.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum GraphicsApi {
    /// OpenGL 4.5 core profile.
    Gl45,
    /// Vulkan 1.3. Scaffolding only for now: no shader target is
    /// registered for it, so artifact queries report `Unsupported`.
    Vk13,
}
