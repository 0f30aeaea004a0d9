use std::ffi::{CString, c_void};
use std::marker::PhantomData;

use gl::types::{GLchar, GLint, GLsizei, GLuint};

use crate::diagnostics::{ErrorCode, ErrorQueue};
use crate::shader_source::StageKind;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ShaderId(pub GLuint);

impl ShaderId {
    pub const NULL: ShaderId = ShaderId(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProgramId(pub GLuint);

impl ProgramId {
    pub const NULL: ProgramId = ProgramId(0);

    pub fn is_null(self) -> bool {
        self == Self::NULL
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ShaderParameter {
    CompileStatus,
    InfoLogLength,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ProgramParameter {
    LinkStatus,
    ValidateStatus,
    InfoLogLength,
}

/// The shader and program object calls the program builder needs.
///
/// Names mirror the GL entry points they stand for. Ids of `0` are the null
/// object, exactly as in GL.
pub trait GraphicsApi: ErrorQueue {
    fn create_shader(&self, kind: StageKind) -> ShaderId;
    fn shader_source(&self, shader: ShaderId, source: &str);
    fn compile_shader(&self, shader: ShaderId);
    fn shader_parameter(&self, shader: ShaderId, parameter: ShaderParameter) -> i32;
    /// Reads at most `capacity` bytes of the log, terminator included.
    fn shader_info_log(&self, shader: ShaderId, capacity: usize) -> String;
    fn delete_shader(&self, shader: ShaderId);

    fn create_program(&self) -> ProgramId;
    fn attach_shader(&self, program: ProgramId, shader: ShaderId);
    fn link_program(&self, program: ProgramId);
    fn validate_program(&self, program: ProgramId);
    fn program_parameter(&self, program: ProgramId, parameter: ProgramParameter) -> i32;
    /// Reads at most `capacity` bytes of the log, terminator included.
    fn program_info_log(&self, program: ProgramId, capacity: usize) -> String;
    fn use_program(&self, program: ProgramId);
    fn uniform_location(&self, program: ProgramId, name: &str) -> i32;
    fn delete_program(&self, program: ProgramId);
}

/// Fetches a shader's info log: asks for its length, then reads that many bytes.
pub fn shader_info_log<A: GraphicsApi + ?Sized>(api: &A, shader: ShaderId) -> String {
    let length = api.shader_parameter(shader, ShaderParameter::InfoLogLength);
    if length <= 0 {
        return String::new();
    }
    api.shader_info_log(shader, length as usize)
}

/// Fetches a program's info log: asks for its length, then reads that many bytes.
pub fn program_info_log<A: GraphicsApi + ?Sized>(api: &A, program: ProgramId) -> String {
    let length = api.program_parameter(program, ProgramParameter::InfoLogLength);
    if length <= 0 {
        return String::new();
    }
    api.program_info_log(program, length as usize)
}

/// Converts a GL-written log buffer into a string, stopping at the terminator.
fn log_from_buffer(mut buffer: Vec<u8>, written: GLsizei) -> String {
    let written = usize::try_from(written).unwrap_or(0).min(buffer.len());
    buffer.truncate(written);
    if let Some(end) = buffer.iter().position(|&byte| byte == 0) {
        buffer.truncate(end);
    }
    String::from_utf8_lossy(&buffer).trim_end().to_string()
}

/// Handle to the OpenGL function pointers loaded for the current context.
///
/// The pointers are process-global in the `gl` crate but only valid on the
/// thread where the context is current, so this handle is neither `Send` nor
/// `Sync`.
#[derive(Debug)]
pub struct GlApi {
    _not_send: PhantomData<*const ()>,
}

impl GlApi {
    /// Loads every entry point through `loader`.
    ///
    /// The context the loader belongs to must be current on this thread.
    pub fn load<F>(loader: F) -> Self
    where
        F: FnMut(&'static str) -> *const c_void,
    {
        gl::load_with(loader);
        Self {
            _not_send: PhantomData,
        }
    }

    pub fn version(&self) -> String {
        self.get_string(gl::VERSION)
    }

    pub fn renderer(&self) -> String {
        self.get_string(gl::RENDERER)
    }

    fn get_string(&self, name: gl::types::GLenum) -> String {
        unsafe {
            let raw = gl::GetString(name);
            if raw.is_null() {
                return String::new();
            }
            std::ffi::CStr::from_ptr(raw.cast())
                .to_string_lossy()
                .into_owned()
        }
    }
}

impl ErrorQueue for GlApi {
    fn poll_error(&self) -> Option<ErrorCode> {
        match unsafe { gl::GetError() } {
            gl::NO_ERROR => None,
            code => Some(ErrorCode(code)),
        }
    }
}

impl GraphicsApi for GlApi {
    fn create_shader(&self, kind: StageKind) -> ShaderId {
        ShaderId(unsafe { gl::CreateShader(kind.gl_enum()) })
    }

    fn shader_source(&self, shader: ShaderId, source: &str) {
        let pointer = source.as_ptr().cast::<GLchar>();
        let length = source.len() as GLint;
        unsafe { gl::ShaderSource(shader.0, 1, &pointer, &length) };
    }

    fn compile_shader(&self, shader: ShaderId) {
        unsafe { gl::CompileShader(shader.0) };
    }

    fn shader_parameter(&self, shader: ShaderId, parameter: ShaderParameter) -> i32 {
        let name = match parameter {
            ShaderParameter::CompileStatus => gl::COMPILE_STATUS,
            ShaderParameter::InfoLogLength => gl::INFO_LOG_LENGTH,
        };
        let mut value: GLint = 0;
        unsafe { gl::GetShaderiv(shader.0, name, &mut value) };
        value
    }

    fn shader_info_log(&self, shader: ShaderId, capacity: usize) -> String {
        let mut buffer = vec![0u8; capacity];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetShaderInfoLog(
                shader.0,
                capacity as GLsizei,
                &mut written,
                buffer.as_mut_ptr().cast(),
            )
        };
        log_from_buffer(buffer, written)
    }

    fn delete_shader(&self, shader: ShaderId) {
        unsafe { gl::DeleteShader(shader.0) };
    }

    fn create_program(&self) -> ProgramId {
        ProgramId(unsafe { gl::CreateProgram() })
    }

    fn attach_shader(&self, program: ProgramId, shader: ShaderId) {
        unsafe { gl::AttachShader(program.0, shader.0) };
    }

    fn link_program(&self, program: ProgramId) {
        unsafe { gl::LinkProgram(program.0) };
    }

    fn validate_program(&self, program: ProgramId) {
        unsafe { gl::ValidateProgram(program.0) };
    }

    fn program_parameter(&self, program: ProgramId, parameter: ProgramParameter) -> i32 {
        let name = match parameter {
            ProgramParameter::LinkStatus => gl::LINK_STATUS,
            ProgramParameter::ValidateStatus => gl::VALIDATE_STATUS,
            ProgramParameter::InfoLogLength => gl::INFO_LOG_LENGTH,
        };
        let mut value: GLint = 0;
        unsafe { gl::GetProgramiv(program.0, name, &mut value) };
        value
    }

    fn program_info_log(&self, program: ProgramId, capacity: usize) -> String {
        let mut buffer = vec![0u8; capacity];
        let mut written: GLsizei = 0;
        unsafe {
            gl::GetProgramInfoLog(
                program.0,
                capacity as GLsizei,
                &mut written,
                buffer.as_mut_ptr().cast(),
            )
        };
        log_from_buffer(buffer, written)
    }

    fn use_program(&self, program: ProgramId) {
        unsafe { gl::UseProgram(program.0) };
    }

    fn uniform_location(&self, program: ProgramId, name: &str) -> i32 {
        // Names with interior nul bytes cannot exist in GLSL.
        let Ok(name) = CString::new(name) else {
            return -1;
        };
        unsafe { gl::GetUniformLocation(program.0, name.as_ptr()) }
    }

    fn delete_program(&self, program: ProgramId) {
        unsafe { gl::DeleteProgram(program.0) };
    }
}
