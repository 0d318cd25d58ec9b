//! OpenGL bindings generated by `gl_generator` at build time.

#![allow(clippy::all)]
#![allow(non_upper_case_globals)]
#![allow(non_snake_case)]
#![allow(non_camel_case_types)]
#![allow(unused)]

include!(concat!(env!("OUT_DIR"), "/gl_bindings.rs"));
