//! The consumed shader-compiler contract.

use crate::reflection::ReflectionLayout;
use lumen_render::api::GraphicsApi;
use lumen_render::pipeline::ShaderStage;
use std::path::PathBuf;

/// A preprocessor definition passed to the session.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ShaderMacro {
    pub name: String,
    pub value: String,
}

/// Parameters of a compilation session. `targets` assigns one code-
/// generation slot per API, in order.
#[derive(Clone, Debug, Default)]
pub struct SessionDesc {
    pub macros: Vec<ShaderMacro>,
    pub search_paths: Vec<PathBuf>,
    pub targets: Vec<GraphicsApi>,
}

/// An entry point located inside a loaded module.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct EntryPointDesc {
    pub name: String,
    pub stage: ShaderStage,
}

/// Diagnostics blob: human-readable UTF-8 text. The front-end treats
/// any non-empty blob as failure, so implementations report warnings
/// and errors through the same channel.
pub type Diagnostics = String;

/// Seam between the front-end and a concrete compiler library.
///
/// Implementations return `(None, diagnostics)` on hard failure and may
/// return `(Some(_), diagnostics)` when the compiler produced output
/// alongside complaints; the front-end rejects both.
pub trait CompilerBackend {
    type Module: Clone;
    type Program;

    /// Tears down any previous session and creates a fresh one.
    fn create_session(&mut self, desc: &SessionDesc) -> std::result::Result<(), String>;

    fn load_module(
        &mut self,
        name: &str,
        path: &str,
        source: &str,
    ) -> (Option<Self::Module>, Diagnostics);

    fn find_entry_point(&self, module: &Self::Module, name: &str) -> Option<EntryPointDesc>;

    /// Composes `{entry module, entry point, extra modules}` in that
    /// order and links the result.
    fn link(
        &mut self,
        entry_module: &Self::Module,
        entry_point: &EntryPointDesc,
        extra_modules: &[&Self::Module],
    ) -> (Option<Self::Program>, Diagnostics);

    /// Entry-point code for one session target slot.
    fn entry_point_code(&self, program: &Self::Program, target: usize)
        -> (Option<Vec<u8>>, Diagnostics);

    fn layout(
        &self,
        program: &Self::Program,
        target: usize,
    ) -> (Option<ReflectionLayout>, Diagnostics);
}
