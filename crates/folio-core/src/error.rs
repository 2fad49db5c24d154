use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid directory: {0}")]
    InvalidDirectory(PathBuf),
    #[error("failed to load texture {path}: {reason}")]
    Texture { path: PathBuf, reason: String },
    #[error("font error: {0}")]
    Font(String),
    #[error("failed to create window: {0}")]
    Window(String),
    #[error("failed to create drawing surface: {0}")]
    Surface(String),
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
