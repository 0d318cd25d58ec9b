use gl_generator::{Api, Fallbacks, Profile, Registry, StructGenerator};
use std::env;
use std::fs::File;
use std::path::PathBuf;

fn main() {
    let dest = PathBuf::from(env::var("OUT_DIR").unwrap());
    let mut file = File::create(dest.join("gl_bindings.rs")).unwrap();

    // 4.6 core for SpecializeShader; everything else the backend emits
    // is 4.5 direct state access.
    Registry::new(Api::Gl, (4, 6), Profile::Core, Fallbacks::All, ["GL_ARB_gl_spirv"])
        .write_bindings(StructGenerator, &mut file)
        .unwrap();
}
