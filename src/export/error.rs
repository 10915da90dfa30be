//! Error types for export operations.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("failed to read '{path}': {message}")]
    SourceUnreadable { path: PathBuf, message: String },

    #[error("Output folder must differ from source folder for {0}")]
    OutputCollision(PathBuf),

    #[error("resize failed: {0}")]
    ResizeFailed(String),

    #[error("failed to encode {format}: {message}")]
    EncodeFailed { format: &'static str, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collision_message_names_the_file() {
        let err = ExportError::OutputCollision(PathBuf::from("/photos/a.jpg"));
        assert!(err.to_string().contains("/photos/a.jpg"));
        assert!(err.to_string().contains("must differ"));
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: ExportError = io.into();
        assert!(err.to_string().contains("denied"));
    }
}
