pub mod application;
pub mod colors;
pub mod context;
pub mod debug;
pub mod diagnostics;
pub mod graphics;
pub mod program;
pub mod run;
pub mod shader_source;

#[cfg(test)]
mod testing;

pub use diagnostics::{DiagnosticEvent, ErrorCode, ErrorQueue, Guarded, guarded, guarded_call};
pub use graphics::{GlApi, GraphicsApi, ProgramId, ShaderId};
pub use program::{BuildError, LinkedProgram, ProgramBuilder, build_program};
pub use shader_source::{ShaderBundle, StageKind, split_shader_bundle};
