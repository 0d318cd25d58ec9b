//! GL shader objects from front-end artifacts.
//!
//! The GL target of the shader front-end emits SPIR-V for the OpenGL
//! environment; [`GlShaderModule::from_spirv`] turns such an artifact
//! into a shader object via `ShaderBinary` + `SpecializeShader`. A GLSL
//! source path is kept for shaders authored outside the front-end.

use crate::api;
use crate::api::types::*;
use crate::device::GlDevice;
use lumen_render::error::{Error, Result};
use lumen_render::pipeline::ShaderStage;

pub(crate) fn shader_stage_to_glenum(stage: ShaderStage) -> GLenum {
    match stage {
        ShaderStage::Vertex => api::VERTEX_SHADER,
        ShaderStage::Fragment => api::FRAGMENT_SHADER,
        ShaderStage::Geometry => api::GEOMETRY_SHADER,
        ShaderStage::TessControl => api::TESS_CONTROL_SHADER,
        ShaderStage::TessEval => api::TESS_EVALUATION_SHADER,
        ShaderStage::Compute => api::COMPUTE_SHADER,
    }
}

#[derive(Debug)]
pub struct GlShaderModule {
    pub(crate) obj: GLuint,
    pub stage: ShaderStage,
}

impl GlShaderModule {
    /// Creates a module from a SPIR-V artifact. The entry point must
    /// match the one the artifact was compiled for.
    pub fn from_spirv(
        gl: &mut impl GlDevice,
        stage: ShaderStage,
        entry_point: &str,
        bytecode: &[u8],
    ) -> Result<GlShaderModule> {
        let obj = gl.create_shader(shader_stage_to_glenum(stage));
        gl.shader_binary_spirv(obj, bytecode);
        if !gl.specialize_shader(obj, entry_point) {
            let log = gl.shader_info_log(obj);
            gl.delete_shader(obj);
            return Err(Error::BackendFailure(format!(
                "shader specialization failed: {}",
                log
            )));
        }
        Ok(GlShaderModule { obj, stage })
    }

    pub fn from_glsl(
        gl: &mut impl GlDevice,
        stage: ShaderStage,
        source: &[u8],
    ) -> Result<GlShaderModule> {
        let obj = gl.create_shader(shader_stage_to_glenum(stage));
        gl.shader_source(obj, source);
        if !gl.compile_shader(obj) {
            let log = gl.shader_info_log(obj);
            gl.delete_shader(obj);
            return Err(Error::BackendFailure(format!(
                "shader compilation failed: {}",
                log
            )));
        }
        Ok(GlShaderModule { obj, stage })
    }

    pub fn destroy(self, gl: &mut impl GlDevice) {
        gl.delete_shader(self.obj);
    }
}

/// Links shader modules into a program object and returns its name.
pub fn link_shader_program(gl: &mut impl GlDevice, modules: &[&GlShaderModule]) -> Result<GLuint> {
    let program = gl.create_program();
    for module in modules {
        gl.attach_shader(program, module.obj);
    }
    if !gl.link_program_object(program) {
        let log = gl.program_info_log(program);
        gl.delete_program(program);
        return Err(Error::BackendFailure(format!(
            "program link failed: {}",
            log
        )));
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{GlCall, MockGl};

    #[test]
    fn spirv_module_specializes_on_the_entry_point() {
        let mut gl = MockGl::new();
        let module =
            GlShaderModule::from_spirv(&mut gl, ShaderStage::Vertex, "vs_main", &[0u8; 64]).unwrap();
        assert_eq!(gl.calls[0], GlCall::CreateShader(api::VERTEX_SHADER));
        assert!(matches!(gl.calls[1], GlCall::ShaderBinarySpirv { len: 64, .. }));
        assert!(matches!(
            &gl.calls[2],
            GlCall::SpecializeShader { entry_point, .. } if entry_point == "vs_main"
        ));
        module.destroy(&mut gl);
    }

    #[test]
    fn failed_specialization_reports_the_log_and_frees_the_object() {
        let mut gl = MockGl::new();
        gl.specialize_ok = false;
        gl.info_log = "bad bytecode".to_string();
        let err = GlShaderModule::from_spirv(&mut gl, ShaderStage::Fragment, "fs_main", &[0u8; 8])
            .unwrap_err();
        match err {
            lumen_render::Error::BackendFailure(msg) => assert!(msg.contains("bad bytecode")),
            other => panic!("expected BackendFailure, got {:?}", other),
        }
        assert!(gl.calls.iter().any(|c| matches!(c, GlCall::DeleteShader(_))));
    }

    #[test]
    fn failed_glsl_compile_reports_the_log() {
        let mut gl = MockGl::new();
        gl.compile_ok = false;
        gl.info_log = "0:1: syntax error".to_string();
        let err =
            GlShaderModule::from_glsl(&mut gl, ShaderStage::Vertex, b"void main() {").unwrap_err();
        assert!(matches!(err, lumen_render::Error::BackendFailure(_)));
    }

    #[test]
    fn linking_attaches_every_module() {
        let mut gl = MockGl::new();
        let vs = GlShaderModule::from_spirv(&mut gl, ShaderStage::Vertex, "vs", &[0u8; 4]).unwrap();
        let fs = GlShaderModule::from_spirv(&mut gl, ShaderStage::Fragment, "fs", &[0u8; 4]).unwrap();
        gl.calls.clear();
        let program = link_shader_program(&mut gl, &[&vs, &fs]).unwrap();
        let attached: Vec<GLuint> = gl
            .calls
            .iter()
            .filter_map(|c| match c {
                GlCall::AttachShader { shader, .. } => Some(*shader),
                _ => None,
            })
            .collect();
        assert_eq!(attached.len(), 2);
        assert!(gl.calls.contains(&GlCall::LinkProgram(program)));
    }

    #[test]
    fn failed_link_frees_the_program() {
        let mut gl = MockGl::new();
        let vs = GlShaderModule::from_spirv(&mut gl, ShaderStage::Vertex, "vs", &[0u8; 4]).unwrap();
        gl.link_ok = false;
        gl.info_log = "unresolved interface".to_string();
        let err = link_shader_program(&mut gl, &[&vs]).unwrap_err();
        assert!(matches!(err, lumen_render::Error::BackendFailure(_)));
        assert!(gl.calls.iter().any(|c| matches!(c, GlCall::DeleteProgram(_))));
    }
}
