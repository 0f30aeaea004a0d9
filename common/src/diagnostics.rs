use std::fmt;
use std::panic::Location;

/// Upper bound on codes read per drain or poll. A lost context can keep
/// reporting an error forever.
pub const MAX_QUEUED_ERRORS: usize = 32;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ErrorCode(pub u32);

impl ErrorCode {
    pub fn name(self) -> &'static str {
        match self.0 {
            gl::INVALID_ENUM => "GL_INVALID_ENUM",
            gl::INVALID_VALUE => "GL_INVALID_VALUE",
            gl::INVALID_OPERATION => "GL_INVALID_OPERATION",
            gl::STACK_OVERFLOW => "GL_STACK_OVERFLOW",
            gl::STACK_UNDERFLOW => "GL_STACK_UNDERFLOW",
            gl::OUT_OF_MEMORY => "GL_OUT_OF_MEMORY",
            gl::INVALID_FRAMEBUFFER_OPERATION => "GL_INVALID_FRAMEBUFFER_OPERATION",
            gl::CONTEXT_LOST => "GL_CONTEXT_LOST",
            _ => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.0, self.name())
    }
}

/// The error flags of a graphics API, read one code at a time.
pub trait ErrorQueue {
    /// Pops the next queued error, `None` once the queue reports no error.
    fn poll_error(&self) -> Option<ErrorCode>;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    pub file: &'static str,
    pub line: u32,
}

impl SourceLocation {
    #[track_caller]
    pub fn caller() -> Self {
        Location::caller().into()
    }
}

impl From<&'static Location<'static>> for SourceLocation {
    fn from(location: &'static Location<'static>) -> Self {
        Self {
            file: location.file(),
            line: location.line(),
        }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiagnosticEvent {
    pub call: String,
    pub code: ErrorCode,
    pub location: SourceLocation,
}

impl fmt::Display for DiagnosticEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[OpenGL Error] ({}): {} {}", self.code, self.call, self.location)
    }
}

/// Result of a guarded call: the call's own return value plus every error the
/// queue reported right after it.
#[derive(Debug)]
pub struct Guarded<T> {
    pub value: T,
    pub events: Vec<DiagnosticEvent>,
}

impl<T> Guarded<T> {
    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

fn drain<Q: ErrorQueue + ?Sized>(queue: &Q) -> usize {
    let mut stale = 0;
    while stale < MAX_QUEUED_ERRORS && queue.poll_error().is_some() {
        stale += 1;
    }
    stale
}

pub fn guarded_at<Q, T, F>(
    queue: &Q,
    description: &str,
    location: SourceLocation,
    thunk: F,
) -> Guarded<T>
where
    Q: ErrorQueue + ?Sized,
    F: FnOnce() -> T,
{
    let stale = drain(queue);
    if stale > 0 {
        log::trace!("Cleared {stale} stale error(s) before {description}");
    }

    let value = thunk();

    let mut events = Vec::new();
    while events.len() < MAX_QUEUED_ERRORS {
        let Some(code) = queue.poll_error() else {
            break;
        };

        let event = DiagnosticEvent {
            call: description.to_string(),
            code,
            location,
        };
        log::error!("{event}");
        events.push(event);
    }

    Guarded { value, events }
}

/// Runs `thunk` with the error queue cleared beforehand and checked afterwards.
///
/// Every error code found is logged, tagged with `description` and the
/// caller's file and line, and returned alongside the thunk's value.
#[track_caller]
pub fn guarded<Q, T, F>(queue: &Q, description: &str, thunk: F) -> Guarded<T>
where
    Q: ErrorQueue + ?Sized,
    F: FnOnce() -> T,
{
    guarded_at(queue, description, SourceLocation::caller(), thunk)
}

/// Same as [`guarded`] for calls whose only interesting outcome is whether the
/// API raised an error. Returns `true` when none was raised.
#[track_caller]
pub fn guarded_call<Q, F>(queue: &Q, description: &str, thunk: F) -> bool
where
    Q: ErrorQueue + ?Sized,
    F: FnOnce(),
{
    guarded_at(queue, description, SourceLocation::caller(), thunk).is_clean()
}
