//! shaderc-backed compiler.
//!
//! Modules are HLSL-flavored sources annotated with a
//! `#pragma shader_stage(...)` line; they are preprocessed at load time
//! (includes resolve against the session search paths) and composed by
//! source concatenation at link time. The GL target emits SPIR-V for
//! the OpenGL environment, which the GL backend consumes through its
//! shader-binary path.

use crate::compiler::{CompilerBackend, Diagnostics, EntryPointDesc, SessionDesc, ShaderMacro};
use crate::reflection::{reflect_spirv, ReflectionLayout};
use lazy_static::lazy_static;
use lumen_render::api::GraphicsApi;
use lumen_render::pipeline::ShaderStage;
use regex::Regex;
use shaderc::{
    CompileOptions, Compiler, EnvVersion, IncludeType, ResolvedInclude, ShaderKind,
    SourceLanguage, TargetEnv,
};
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

lazy_static! {
    static ref RE_STAGE_PRAGMA: Regex =
        Regex::new(r"(?m)^\s*#\s*pragma\s+shader_stage\s*\(\s*(?P<stage>\w+)\s*\)").unwrap();
}

/// At most one compiler context may live in the process.
static CONTEXT_LIVE: AtomicBool = AtomicBool::new(false);

pub struct ShadercBackend {
    compiler: Compiler,
    session: Option<Session>,
}

struct Session {
    macros: Vec<ShaderMacro>,
    search_paths: Vec<PathBuf>,
    targets: Vec<GraphicsApi>,
}

/// Preprocessed module source plus the stage scanned out of it.
#[derive(Clone, Debug)]
pub struct ShadercModule {
    name: String,
    source: String,
    stage: ShaderStage,
}

pub struct ShadercProgram {
    targets: Vec<TargetArtifact>,
}

struct TargetArtifact {
    code: Vec<u8>,
    layout: ReflectionLayout,
}

impl ShadercBackend {
    /// Fails when a compiler context is already live in this process or
    /// the compiler library cannot be initialized. Dropping the backend
    /// releases the context slot.
    pub fn new() -> Result<ShadercBackend, String> {
        if CONTEXT_LIVE.swap(true, Ordering::SeqCst) {
            return Err("a shader compiler context is already live in this process".to_string());
        }
        match Compiler::new() {
            Some(compiler) => Ok(ShadercBackend {
                compiler,
                session: None,
            }),
            None => {
                CONTEXT_LIVE.store(false, Ordering::SeqCst);
                Err("shader compiler context creation failed".to_string())
            }
        }
    }

    fn build_options(session: &Session, target: Option<GraphicsApi>) -> Option<CompileOptions<'static>> {
        let mut options = CompileOptions::new()?;
        options.set_source_language(SourceLanguage::HLSL);
        for macro_def in &session.macros {
            options.add_macro_definition(&macro_def.name, Some(&macro_def.value));
        }
        if let Some(api) = target {
            let (env, version) = match api {
                GraphicsApi::Gl45 => (TargetEnv::OpenGL, EnvVersion::OpenGL4_5),
                GraphicsApi::Vk13 => (TargetEnv::Vulkan, EnvVersion::Vulkan1_3),
            };
            options.set_target_env(env, version as u32);
        }
        let search_paths = session.search_paths.clone();
        options.set_include_callback(move |requested, _ty: IncludeType, _requester, _depth| {
            resolve_include(&search_paths, requested)
        });
        Some(options)
    }
}

impl Drop for ShadercBackend {
    fn drop(&mut self) {
        CONTEXT_LIVE.store(false, Ordering::SeqCst);
    }
}

fn resolve_include(search_paths: &[PathBuf], requested: &str) -> Result<ResolvedInclude, String> {
    for dir in search_paths {
        let candidate = dir.join(requested);
        if let Ok(content) = fs::read_to_string(&candidate) {
            return Ok(ResolvedInclude {
                resolved_name: candidate.to_string_lossy().into_owned(),
                content,
            });
        }
    }
    Err(format!("include '{}' not found on any search path", requested))
}

fn parse_stage(source: &str) -> Option<ShaderStage> {
    let captures = RE_STAGE_PRAGMA.captures(source)?;
    match &captures["stage"] {
        "vertex" => Some(ShaderStage::Vertex),
        "fragment" => Some(ShaderStage::Fragment),
        "geometry" => Some(ShaderStage::Geometry),
        "tesscontrol" => Some(ShaderStage::TessControl),
        "tesseval" => Some(ShaderStage::TessEval),
        "compute" => Some(ShaderStage::Compute),
        _ => None,
    }
}

fn stage_to_kind(stage: ShaderStage) -> ShaderKind {
    match stage {
        ShaderStage::Vertex => ShaderKind::Vertex,
        ShaderStage::Fragment => ShaderKind::Fragment,
        ShaderStage::Geometry => ShaderKind::Geometry,
        ShaderStage::TessControl => ShaderKind::TessControl,
        ShaderStage::TessEval => ShaderKind::TessEvaluation,
        ShaderStage::Compute => ShaderKind::Compute,
    }
}

/// Whether `source` contains a function definition named `name`: a
/// line-leading return type followed by the name and an opening paren.
fn source_defines_function(source: &str, name: &str) -> bool {
    let pattern = format!(
        r"(?m)^\s*[A-Za-z_][A-Za-z0-9_]*(?:<[^>\n]*>)?\s+{}\s*\(",
        regex::escape(name)
    );
    Regex::new(&pattern)
        .map(|re| re.is_match(source))
        .unwrap_or(false)
}

impl CompilerBackend for ShadercBackend {
    type Module = ShadercModule;
    type Program = ShadercProgram;

    fn create_session(&mut self, desc: &SessionDesc) -> Result<(), String> {
        // dropping the previous session invalidates everything scoped
        // to it
        self.session = None;
        self.session = Some(Session {
            macros: desc.macros.clone(),
            search_paths: desc.search_paths.clone(),
            targets: desc.targets.clone(),
        });
        Ok(())
    }

    fn load_module(
        &mut self,
        name: &str,
        path: &str,
        source: &str,
    ) -> (Option<ShadercModule>, Diagnostics) {
        let session = match &self.session {
            Some(session) => session,
            None => return (None, "no active compiler session".to_string()),
        };
        let stage = match parse_stage(source) {
            Some(stage) => stage,
            None => {
                return (
                    None,
                    format!(
                        "module '{}' carries no #pragma shader_stage(...) annotation",
                        name
                    ),
                )
            }
        };
        let options = match ShadercBackend::build_options(session, None) {
            Some(options) => options,
            None => return (None, "compiler options allocation failed".to_string()),
        };
        match self.compiler.preprocess(source, path, "main", Some(&options)) {
            Ok(artifact) => {
                let diagnostics = artifact.get_warning_messages();
                let module = ShadercModule {
                    name: name.to_string(),
                    source: artifact.as_text(),
                    stage,
                };
                (Some(module), diagnostics)
            }
            Err(err) => (None, err.to_string()),
        }
    }

    fn find_entry_point(&self, module: &ShadercModule, name: &str) -> Option<EntryPointDesc> {
        if source_defines_function(&module.source, name) {
            Some(EntryPointDesc {
                name: name.to_string(),
                stage: module.stage,
            })
        } else {
            None
        }
    }

    fn link(
        &mut self,
        entry_module: &ShadercModule,
        entry_point: &EntryPointDesc,
        extra_modules: &[&ShadercModule],
    ) -> (Option<ShadercProgram>, Diagnostics) {
        let session = match &self.session {
            Some(session) => session,
            None => return (None, "no active compiler session".to_string()),
        };

        // source-level composition: the entry module first, then the
        // extras in submission order
        let mut source = String::with_capacity(
            entry_module.source.len()
                + extra_modules.iter().map(|m| m.source.len() + 1).sum::<usize>(),
        );
        source.push_str(&entry_module.source);
        for module in extra_modules {
            source.push('\n');
            source.push_str(&module.source);
        }

        let file = format!("{}.hlsl", entry_module.name);
        let mut targets = Vec::with_capacity(session.targets.len());
        for &target_api in &session.targets {
            let options = match ShadercBackend::build_options(session, Some(target_api)) {
                Some(options) => options,
                None => return (None, "compiler options allocation failed".to_string()),
            };
            let artifact = match self.compiler.compile_into_spirv(
                &source,
                stage_to_kind(entry_point.stage),
                &file,
                &entry_point.name,
                Some(&options),
            ) {
                Ok(artifact) => artifact,
                Err(err) => return (None, err.to_string()),
            };
            let warnings = artifact.get_warning_messages();
            if !warnings.is_empty() {
                return (None, warnings);
            }
            let layout = match reflect_spirv(&entry_point.name, entry_point.stage, artifact.as_binary())
            {
                Ok(layout) => layout,
                Err(err) => return (None, err),
            };
            targets.push(TargetArtifact {
                code: artifact.as_binary_u8().to_vec(),
                layout,
            });
        }

        (Some(ShadercProgram { targets }), String::new())
    }

    fn entry_point_code(
        &self,
        program: &ShadercProgram,
        target: usize,
    ) -> (Option<Vec<u8>>, Diagnostics) {
        match program.targets.get(target) {
            Some(artifact) => (Some(artifact.code.clone()), String::new()),
            None => (None, format!("no artifact for target slot {}", target)),
        }
    }

    fn layout(
        &self,
        program: &ShadercProgram,
        target: usize,
    ) -> (Option<ReflectionLayout>, Diagnostics) {
        match program.targets.get(target) {
            Some(artifact) => (Some(artifact.layout.clone()), String::new()),
            None => (None, format!("no artifact for target slot {}", target)),
        }
    }
}
