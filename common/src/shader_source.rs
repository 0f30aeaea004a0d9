use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const MARKER: &str = "#shader";

#[derive(Debug, thiserror::Error)]
pub enum ShaderSourceError {
    #[error("failed to read shader bundle {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StageKind {
    Vertex,
    Fragment,
}

impl StageKind {
    pub fn gl_enum(self) -> gl::types::GLenum {
        match self {
            StageKind::Vertex => gl::VERTEX_SHADER,
            StageKind::Fragment => gl::FRAGMENT_SHADER,
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Vertex => f.write_str("vertex"),
            StageKind::Fragment => f.write_str("fragment"),
        }
    }
}

/// Vertex and fragment source read from one `#shader`-annotated file.
///
/// Either field may be empty. An empty stage is not rejected here, it simply
/// fails to compile later.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ShaderBundle {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderBundle {
    pub fn source(&self, kind: StageKind) -> &str {
        match kind {
            StageKind::Vertex => &self.vertex,
            StageKind::Fragment => &self.fragment,
        }
    }

    fn buffer_mut(&mut self, kind: StageKind) -> &mut String {
        match kind {
            StageKind::Vertex => &mut self.vertex,
            StageKind::Fragment => &mut self.fragment,
        }
    }
}

pub fn split_shader_bundle(path: impl AsRef<Path>) -> Result<ShaderBundle, ShaderSourceError> {
    let path = path.as_ref();

    let bytes = fs::read(path).map_err(|source| ShaderSourceError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    // Comments in legacy encodings must not make the whole bundle unreadable
    let text = String::from_utf8_lossy(&bytes);
    let bundle = parse_shader_bundle(&text);
    log::debug!(
        "Split {}: {} vertex bytes, {} fragment bytes",
        path.display(),
        bundle.vertex.len(),
        bundle.fragment.len()
    );

    Ok(bundle)
}

/// Splits `text` into its vertex and fragment sections.
///
/// A line containing `#shader` switches the active section to whichever of
/// `vertex` or `fragment` appears on it and is itself dropped. Lines before the
/// first marker belong to no section and are dropped as well. Lines are split
/// on `\n` only, so a `\r` before it is kept as content.
pub fn parse_shader_bundle(text: &str) -> ShaderBundle {
    let mut bundle = ShaderBundle::default();
    let mut current: Option<StageKind> = None;

    for line in text.split_inclusive('\n') {
        let line = line.strip_suffix('\n').unwrap_or(line);

        if line.contains(MARKER) {
            if line.contains("vertex") {
                current = Some(StageKind::Vertex);
            } else if line.contains("fragment") {
                current = Some(StageKind::Fragment);
            }
            continue;
        }

        if let Some(kind) = current {
            let buffer = bundle.buffer_mut(kind);
            buffer.push_str(line);
            buffer.push('\n');
        }
    }

    bundle
}
