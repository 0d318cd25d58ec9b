//! Shader front-end: sessions, modules, linked programs and per-target
//! artifacts.
//!
//! [`ShaderFrontend`] keeps the session state machine and the module /
//! program registries; the compiler itself sits behind the
//! [`CompilerBackend`] seam, with [`ShadercBackend`] as the production
//! implementation.

#[macro_use]
extern crate log;

mod compiler;
mod frontend;
mod reflection;
mod shaderc_backend;

pub use self::compiler::{CompilerBackend, Diagnostics, EntryPointDesc, SessionDesc, ShaderMacro};
pub use self::frontend::{ShaderArtifact, ShaderFrontend};
pub use self::reflection::{BindingReflection, ReflectionLayout};
pub use self::shaderc_backend::ShadercBackend;
