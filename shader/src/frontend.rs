//! Session, module and program bookkeeping over a [`CompilerBackend`].

use crate::compiler::{CompilerBackend, SessionDesc, ShaderMacro};
use crate::reflection::ReflectionLayout;
use fxhash::FxHashMap;
use lumen_render::api::GraphicsApi;
use lumen_render::error::{Error, Result};
use smallvec::SmallVec;
use std::path::PathBuf;

/// Compiled code and reflection for one `(program, api)` pair.
///
/// `code` is a freshly allocated copy owned by the caller; dropping the
/// artifact is the release contract. Nothing inside borrows from the
/// compiler session.
#[derive(Clone, Debug)]
pub struct ShaderArtifact {
    pub code: Vec<u8>,
    pub layout: ReflectionLayout,
}

struct SessionState {
    targets: Vec<GraphicsApi>,
}

/// The shader front-end.
///
/// Owns the compiler backend plus the name-keyed module and program
/// registries. The value has a single owner; every operation takes
/// `&mut self`. Modules and programs never outlive their session:
/// re-initializing drops them all.
pub struct ShaderFrontend<C: CompilerBackend> {
    compiler: C,
    session: Option<SessionState>,
    modules: FxHashMap<String, C::Module>,
    programs: FxHashMap<String, C::Program>,
}

impl<C: CompilerBackend> ShaderFrontend<C> {
    pub fn new(compiler: C) -> ShaderFrontend<C> {
        ShaderFrontend {
            compiler,
            session: None,
            modules: FxHashMap::default(),
            programs: FxHashMap::default(),
        }
    }

    /// Creates a fresh session, unconditionally discarding any previous
    /// one together with every module and program loaded into it.
    pub fn init_session(&mut self, macros: &[ShaderMacro], search_paths: &[PathBuf]) -> Result<()> {
        // handles scoped to the old session must not survive it
        self.modules.clear();
        self.programs.clear();
        self.session = None;

        let targets = vec![GraphicsApi::Gl45];
        let desc = SessionDesc {
            macros: macros.to_vec(),
            search_paths: search_paths.to_vec(),
            targets: targets.clone(),
        };
        self.compiler
            .create_session(&desc)
            .map_err(Error::BackendFailure)?;
        self.session = Some(SessionState { targets });
        debug!(
            "shader session initialized ({} macros, {} search paths)",
            macros.len(),
            search_paths.len()
        );
        Ok(())
    }

    fn require_session(&self) -> Result<&SessionState> {
        self.session.as_ref().ok_or_else(|| {
            Error::BackendFailure("no active shader session; call init_session first".to_string())
        })
    }

    /// Compiles `source` as if it lived at `<name>.hlsl` and records the
    /// module under `name`, replacing any previous module of that name.
    /// Any diagnostics output fails the load and leaves the registry
    /// untouched, whether or not a module handle was also produced.
    pub fn load_module(&mut self, name: &str, source: &str) -> Result<()> {
        self.require_session()?;
        let path = format!("{}.hlsl", name);
        let (module, diagnostics) = self.compiler.load_module(name, &path, source);
        if !diagnostics.is_empty() {
            return Err(Error::BackendFailure(format!(
                "loading shader module '{}' failed: {}",
                name, diagnostics
            )));
        }
        let module = module.ok_or_else(|| {
            Error::BackendFailure(format!(
                "loading shader module '{}' produced no module",
                name
            ))
        })?;
        self.modules.insert(name.to_string(), module);
        Ok(())
    }

    /// Links `{entry_module, entry point, extra_modules}` into a program
    /// recorded under `program_name`, replacing any previous program of
    /// that name.
    pub fn link_program(
        &mut self,
        program_name: &str,
        entry_module: &str,
        entry_name: &str,
        extra_modules: &[&str],
    ) -> Result<()> {
        self.require_session()?;
        let module = self.modules.get(entry_module).ok_or_else(|| {
            Error::UnknownName(format!("no loaded shader module named '{}'", entry_module))
        })?;
        let entry = self.compiler.find_entry_point(module, entry_name).ok_or_else(|| {
            Error::BackendFailure(format!(
                "no entry point named '{}' in module '{}'",
                entry_name, entry_module
            ))
        })?;
        let mut extras: SmallVec<[&C::Module; 4]> = SmallVec::new();
        for extra in extra_modules {
            extras.push(self.modules.get(*extra).ok_or_else(|| {
                Error::UnknownName(format!("no loaded shader module named '{}'", extra))
            })?);
        }
        let (program, diagnostics) = self.compiler.link(module, &entry, &extras);
        if !diagnostics.is_empty() {
            return Err(Error::BackendFailure(format!(
                "linking shader program '{}' failed: {}",
                program_name, diagnostics
            )));
        }
        let program = program.ok_or_else(|| {
            Error::BackendFailure(format!(
                "linking shader program '{}' produced no program",
                program_name
            ))
        })?;
        self.programs.insert(program_name.to_string(), program);
        Ok(())
    }

    fn target_slot(&self, api: GraphicsApi) -> Result<usize> {
        let session = self.require_session()?;
        session
            .targets
            .iter()
            .position(|t| *t == api)
            .ok_or_else(|| {
                Error::Unsupported(format!("no shader target registered for {:?}", api))
            })
    }

    /// Returns a freshly allocated artifact for `(program_name, api)`.
    pub fn program_artifact(&self, program_name: &str, api: GraphicsApi) -> Result<ShaderArtifact> {
        let program = self.programs.get(program_name).ok_or_else(|| {
            Error::UnknownName(format!(
                "no linked shader program named '{}'",
                program_name
            ))
        })?;
        let target = self.target_slot(api)?;
        let (code, diagnostics) = self.compiler.entry_point_code(program, target);
        if !diagnostics.is_empty() {
            return Err(Error::BackendFailure(format!(
                "extracting code for shader program '{}' failed: {}",
                program_name, diagnostics
            )));
        }
        let code = code.ok_or_else(|| {
            Error::BackendFailure(format!(
                "extracting code for shader program '{}' produced no data",
                program_name
            ))
        })?;
        let (layout, diagnostics) = self.compiler.layout(program, target);
        if !diagnostics.is_empty() {
            return Err(Error::BackendFailure(format!(
                "extracting layout for shader program '{}' failed: {}",
                program_name, diagnostics
            )));
        }
        let layout = layout.ok_or_else(|| {
            Error::BackendFailure(format!(
                "extracting layout for shader program '{}' produced no layout",
                program_name
            ))
        })?;
        Ok(ShaderArtifact { code, layout })
    }

    pub fn has_module(&self, name: &str) -> bool {
        self.modules.contains_key(name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn has_program(&self, name: &str) -> bool {
        self.programs.contains_key(name)
    }
}
