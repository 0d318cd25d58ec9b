//! OpenGL 4.5 backend for the lumen command stream.
//!
//! [`Gl45Backend`] owns the resource registries and the redundant-state
//! cache, and translates backend-neutral [`Command`] records into GL
//! calls through the [`GlDevice`] seam. All calls must happen on the
//! thread that owns the GL context.
//!
//! [`Command`]: ../lumen_render/command/enum.Command.html

#[macro_use]
extern crate log;

mod api;
mod buffer;
mod command;
mod config;
mod device;
#[cfg(test)]
mod mock;
mod pipeline;
mod state;
mod translate;
mod upload;
mod util;
mod vertex;

pub use self::command::Gl45Backend;
pub use self::config::GlBackendConfig;
pub use self::device::{GlDevice, LoadedGl};
pub use self::pipeline::{link_shader_program, GlShaderModule};
pub use self::state::ImplementationParameters;
