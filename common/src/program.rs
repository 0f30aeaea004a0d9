use std::fmt;

use crate::diagnostics::guarded;
use crate::graphics::{
    self, GraphicsApi, ProgramId, ProgramParameter, ShaderId, ShaderParameter,
};
use crate::shader_source::{ShaderBundle, StageKind};

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("failed to compile {stage} shader: {log}")]
    Compile { stage: StageKind, log: String },
    #[error("failed to link program: {log}")]
    Link { log: String },
    #[error("failed to create {object} object")]
    ObjectCreation { object: &'static str },
}

/// A program that linked but did not validate against the current pipeline
/// state. Never fatal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationWarning {
    pub log: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program failed validation: {}", self.log)
    }
}

/// A compiled shader stage. Only lives until the program it belongs to is linked.
#[derive(Debug)]
pub struct CompiledStage {
    kind: StageKind,
    id: ShaderId,
}

impl CompiledStage {
    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn release<A: GraphicsApi + ?Sized>(self, api: &A) {
        guarded(api, "glDeleteShader(stage)", || api.delete_shader(self.id));
        log::trace!("Released {} shader {}", self.kind(), self.id.0);
    }
}

/// Compiles `source` as a `kind` stage. On failure the stage object is
/// already deleted and the driver's log is returned.
pub fn compile_stage<A: GraphicsApi + ?Sized>(
    api: &A,
    kind: StageKind,
    source: &str,
) -> Result<CompiledStage, BuildError> {
    let id = guarded(api, "glCreateShader(kind)", || api.create_shader(kind)).into_value();
    if id.is_null() {
        return Err(BuildError::ObjectCreation { object: "shader" });
    }

    guarded(api, "glShaderSource(id, 1, &src, nullptr)", || {
        api.shader_source(id, source)
    });
    guarded(api, "glCompileShader(id)", || api.compile_shader(id));

    let status = guarded(api, "glGetShaderiv(id, GL_COMPILE_STATUS, &result)", || {
        api.shader_parameter(id, ShaderParameter::CompileStatus)
    })
    .into_value();

    if status == 0 {
        let log = guarded(api, "glGetShaderInfoLog(id)", || {
            graphics::shader_info_log(api, id)
        })
        .into_value();
        log::error!("Failed to compile {kind} shader!\n{log}");

        guarded(api, "glDeleteShader(id)", || api.delete_shader(id));
        return Err(BuildError::Compile { stage: kind, log });
    }

    log::debug!("Compiled {kind} shader {}", id.0);
    Ok(CompiledStage { kind, id })
}

/// A linked program, ready to be bound.
///
/// Deleting consumes the handle, so a program can only be released once.
#[derive(Debug, PartialEq, Eq)]
pub struct LinkedProgram {
    id: ProgramId,
}

impl LinkedProgram {
    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn bind<A: GraphicsApi + ?Sized>(&self, api: &A) -> bool {
        guarded(api, "glUseProgram(program)", || api.use_program(self.id)).is_clean()
    }

    pub fn uniform_location<A: GraphicsApi + ?Sized>(&self, api: &A, name: &str) -> Option<i32> {
        let location = guarded(api, "glGetUniformLocation(program, name)", || {
            api.uniform_location(self.id, name)
        })
        .into_value();

        (location != -1).then_some(location)
    }

    /// Checks whether the program can run in the current pipeline state.
    pub fn validate<A: GraphicsApi + ?Sized>(&self, api: &A) -> Option<ValidationWarning> {
        guarded(api, "glValidateProgram(program)", || api.validate_program(self.id));

        let status = guarded(api, "glGetProgramiv(program, GL_VALIDATE_STATUS)", || {
            api.program_parameter(self.id, ProgramParameter::ValidateStatus)
        })
        .into_value();

        if status != 0 {
            return None;
        }

        let log = guarded(api, "glGetProgramInfoLog(program)", || {
            graphics::program_info_log(api, self.id)
        })
        .into_value();
        Some(ValidationWarning { log })
    }

    pub fn delete<A: GraphicsApi + ?Sized>(self, api: &A) {
        guarded(api, "glDeleteProgram(program)", || api.delete_program(self.id));
    }
}

#[derive(Clone, Debug)]
pub struct ProgramBuilder {
    validate: bool,
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self { validate: true }
    }
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn validate(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Compiles both stages of `bundle` and links them.
    ///
    /// Both stages are always compiled, even when the first one fails, so
    /// every compile error ends up in the log. The stage objects are deleted
    /// before returning whatever the outcome.
    pub fn build<A: GraphicsApi + ?Sized>(
        &self,
        api: &A,
        bundle: &ShaderBundle,
    ) -> Result<LinkedProgram, BuildError> {
        let [vertex, fragment] = [StageKind::Vertex, StageKind::Fragment]
            .map(|kind| compile_stage(api, kind, bundle.source(kind)));

        let stage_id = |stage: &Result<CompiledStage, BuildError>| {
            stage.as_ref().map_or(ShaderId::NULL, CompiledStage::id)
        };
        let linked = link(api, [stage_id(&vertex), stage_id(&fragment)]);

        let vertex = vertex.map(|stage| stage.release(api));
        let fragment = fragment.map(|stage| stage.release(api));

        // A compile error explains a link error, so it wins.
        let program = match (vertex, fragment, linked) {
            (Err(error), _, linked) | (_, Err(error), linked) => {
                if let Ok(program) = linked {
                    program.delete(api);
                }
                return Err(error);
            }
            (Ok(()), Ok(()), linked) => linked?,
        };

        if self.validate {
            if let Some(warning) = program.validate(api) {
                log::warn!("{warning}");
            }
        }

        log::info!("Linked program {}", program.id.0);
        Ok(program)
    }
}

fn link<A: GraphicsApi + ?Sized>(
    api: &A,
    stages: [ShaderId; 2],
) -> Result<LinkedProgram, BuildError> {
    let id = guarded(api, "glCreateProgram()", || api.create_program()).into_value();
    if id.is_null() {
        return Err(BuildError::ObjectCreation { object: "program" });
    }

    for stage in stages {
        guarded(api, "glAttachShader(program, stage)", || api.attach_shader(id, stage));
    }
    guarded(api, "glLinkProgram(program)", || api.link_program(id));

    let status = guarded(api, "glGetProgramiv(program, GL_LINK_STATUS, &result)", || {
        api.program_parameter(id, ProgramParameter::LinkStatus)
    })
    .into_value();

    if status == 0 {
        let log = guarded(api, "glGetProgramInfoLog(program)", || {
            graphics::program_info_log(api, id)
        })
        .into_value();
        log::error!("Failed to link program!\n{log}");

        guarded(api, "glDeleteProgram(program)", || api.delete_program(id));
        return Err(BuildError::Link { log });
    }

    Ok(LinkedProgram { id })
}

pub fn build_program<A: GraphicsApi + ?Sized>(
    api: &A,
    bundle: &ShaderBundle,
) -> Result<LinkedProgram, BuildError> {
    ProgramBuilder::new().build(api, bundle)
}
