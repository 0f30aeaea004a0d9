//! In-memory stand-in for an OpenGL context.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};

use crate::diagnostics::{ErrorCode, ErrorQueue};
use crate::graphics::{
    GraphicsApi, ProgramId, ProgramParameter, ShaderId, ShaderParameter,
};
use crate::shader_source::StageKind;

struct FakeShader {
    kind: StageKind,
    source: String,
    compiled: bool,
    log: String,
}

#[derive(Default)]
struct FakeProgram {
    attached: Vec<ShaderId>,
    linked: bool,
    validated: bool,
    uniforms: Vec<String>,
    log: String,
}

/// Compiles anything that has a `main` and balanced braces, links any program
/// with one compiled stage of each kind.
#[derive(Default)]
pub struct FakeGl {
    next_id: Cell<u32>,
    errors: RefCell<VecDeque<ErrorCode>>,
    context_lost: Cell<bool>,
    fail_program_creation: Cell<bool>,
    fail_validation: Cell<bool>,
    shaders: RefCell<HashMap<ShaderId, FakeShader>>,
    programs: RefCell<HashMap<ProgramId, FakeProgram>>,
    deleted_shaders: RefCell<Vec<ShaderId>>,
    log_fetches: Cell<usize>,
}

impl FakeGl {
    pub const COMPILE_ERROR_LOG: &'static str = "0:1(1): error: syntax error, unexpected token";
    pub const LINK_ERROR_LOG: &'static str = "error: program lacks a compiled vertex or fragment stage";
    pub const VALIDATE_ERROR_LOG: &'static str = "validation failed: no vertex array object bound";

    pub fn raise(&self, code: ErrorCode) {
        self.errors.borrow_mut().push_back(code);
    }

    pub fn set_context_lost(&self, lost: bool) {
        self.context_lost.set(lost);
    }

    pub fn set_fail_program_creation(&self, fail: bool) {
        self.fail_program_creation.set(fail);
    }

    pub fn set_fail_validation(&self, fail: bool) {
        self.fail_validation.set(fail);
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.borrow().len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.borrow().len()
    }

    pub fn deleted_shaders(&self) -> Vec<ShaderId> {
        self.deleted_shaders.borrow().clone()
    }

    pub fn is_compiled(&self, kind: StageKind) -> bool {
        self.shaders
            .borrow()
            .values()
            .any(|shader| shader.kind == kind && shader.compiled)
    }

    pub fn log_fetches(&self) -> usize {
        self.log_fetches.get()
    }

    fn allocate(&self) -> u32 {
        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        id
    }

    fn compiles(source: &str) -> bool {
        source.contains("void main")
            && source.matches('{').count() == source.matches('}').count()
    }

    fn truncated(log: &str, capacity: usize) -> String {
        log.chars().take(capacity.saturating_sub(1)).collect()
    }

    fn log_length(log: &str) -> i32 {
        if log.is_empty() { 0 } else { log.len() as i32 + 1 }
    }
}

impl ErrorQueue for FakeGl {
    fn poll_error(&self) -> Option<ErrorCode> {
        if self.context_lost.get() {
            return Some(ErrorCode(gl::CONTEXT_LOST));
        }
        self.errors.borrow_mut().pop_front()
    }
}

impl GraphicsApi for FakeGl {
    fn create_shader(&self, kind: StageKind) -> ShaderId {
        let id = ShaderId(self.allocate());
        self.shaders.borrow_mut().insert(
            id,
            FakeShader {
                kind,
                source: String::new(),
                compiled: false,
                log: String::new(),
            },
        );
        id
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        match self.shaders.borrow_mut().get_mut(&shader) {
            Some(entry) => entry.source = source.to_string(),
            None => self.raise(ErrorCode(gl::INVALID_VALUE)),
        }
    }

    fn compile_shader(&self, shader: ShaderId) {
        match self.shaders.borrow_mut().get_mut(&shader) {
            Some(entry) => {
                entry.compiled = Self::compiles(&entry.source);
                entry.log = if entry.compiled {
                    String::new()
                } else {
                    Self::COMPILE_ERROR_LOG.to_string()
                };
            }
            None => self.raise(ErrorCode(gl::INVALID_VALUE)),
        }
    }

    fn shader_parameter(&self, shader: ShaderId, parameter: ShaderParameter) -> i32 {
        let shaders = self.shaders.borrow();
        let Some(entry) = shaders.get(&shader) else {
            self.raise(ErrorCode(gl::INVALID_VALUE));
            return 0;
        };
        match parameter {
            ShaderParameter::CompileStatus => entry.compiled as i32,
            ShaderParameter::InfoLogLength => Self::log_length(&entry.log),
        }
    }

    fn shader_info_log(&self, shader: ShaderId, capacity: usize) -> String {
        self.log_fetches.set(self.log_fetches.get() + 1);
        self.shaders
            .borrow()
            .get(&shader)
            .map(|entry| Self::truncated(&entry.log, capacity))
            .unwrap_or_default()
    }

    fn delete_shader(&self, shader: ShaderId) {
        if shader.is_null() {
            return;
        }
        if self.shaders.borrow_mut().remove(&shader).is_some() {
            self.deleted_shaders.borrow_mut().push(shader);
        } else {
            self.raise(ErrorCode(gl::INVALID_VALUE));
        }
    }

    fn create_program(&self) -> ProgramId {
        if self.fail_program_creation.get() {
            return ProgramId::NULL;
        }
        let id = ProgramId(self.allocate());
        self.programs.borrow_mut().insert(id, FakeProgram::default());
        id
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        if !self.shaders.borrow().contains_key(&shader) {
            self.raise(ErrorCode(gl::INVALID_VALUE));
            return;
        }
        match self.programs.borrow_mut().get_mut(&program) {
            Some(entry) => entry.attached.push(shader),
            None => self.raise(ErrorCode(gl::INVALID_VALUE)),
        }
    }

    fn link_program(&self, program: ProgramId) {
        let shaders = self.shaders.borrow();
        let mut programs = self.programs.borrow_mut();
        let Some(entry) = programs.get_mut(&program) else {
            self.raise(ErrorCode(gl::INVALID_VALUE));
            return;
        };

        let stages: Vec<&FakeShader> = entry
            .attached
            .iter()
            .filter_map(|id| shaders.get(id))
            .filter(|shader| shader.compiled)
            .collect();
        let has = |kind| stages.iter().any(|shader| shader.kind == kind);
        let linked = has(StageKind::Vertex) && has(StageKind::Fragment);

        entry.uniforms = if linked {
            stages
                .iter()
                .flat_map(|shader| shader.source.lines())
                .filter_map(|line| line.trim().strip_prefix("uniform "))
                .filter_map(|declaration| declaration.trim_end_matches(';').split_whitespace().last())
                .map(str::to_string)
                .collect()
        } else {
            Vec::new()
        };
        entry.linked = linked;
        entry.log = if linked {
            String::new()
        } else {
            Self::LINK_ERROR_LOG.to_string()
        };
    }

    fn validate_program(&self, program: ProgramId) {
        let fail = self.fail_validation.get();
        match self.programs.borrow_mut().get_mut(&program) {
            Some(entry) => {
                entry.validated = entry.linked && !fail;
                if !entry.validated {
                    entry.log = Self::VALIDATE_ERROR_LOG.to_string();
                }
            }
            None => self.raise(ErrorCode(gl::INVALID_VALUE)),
        }
    }

    fn program_parameter(&self, program: ProgramId, parameter: ProgramParameter) -> i32 {
        let programs = self.programs.borrow();
        let Some(entry) = programs.get(&program) else {
            self.raise(ErrorCode(gl::INVALID_VALUE));
            return 0;
        };
        match parameter {
            ProgramParameter::LinkStatus => entry.linked as i32,
            ProgramParameter::ValidateStatus => entry.validated as i32,
            ProgramParameter::InfoLogLength => Self::log_length(&entry.log),
        }
    }

    fn program_info_log(&self, program: ProgramId, capacity: usize) -> String {
        self.log_fetches.set(self.log_fetches.get() + 1);
        self.programs
            .borrow()
            .get(&program)
            .map(|entry| Self::truncated(&entry.log, capacity))
            .unwrap_or_default()
    }

    fn use_program(&self, program: ProgramId) {
        if program.is_null() {
            return;
        }
        match self.programs.borrow().get(&program) {
            Some(entry) if entry.linked => {}
            Some(_) => self.raise(ErrorCode(gl::INVALID_OPERATION)),
            None => self.raise(ErrorCode(gl::INVALID_VALUE)),
        }
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> i32 {
        let programs = self.programs.borrow();
        let Some(entry) = programs.get(&program).filter(|entry| entry.linked) else {
            self.raise(ErrorCode(gl::INVALID_OPERATION));
            return -1;
        };

        entry
            .uniforms
            .iter()
            .position(|uniform| uniform == name)
            .map_or(-1, |index| index as i32)
    }

    fn delete_program(&self, program: ProgramId) {
        if program.is_null() {
            return;
        }
        if self.programs.borrow_mut().remove(&program).is_none() {
            self.raise(ErrorCode(gl::INVALID_VALUE));
        }
    }
}
