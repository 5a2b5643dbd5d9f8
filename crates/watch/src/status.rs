use std::{io, path::PathBuf};

/// Writes a worker's heartbeat banner to the health-check file.
///
/// The file is truncated on every write, so its presence and content
/// reflect the most recently started worker since process launch.
#[derive(Debug, Clone)]
pub struct StatusWriter {
    path: PathBuf,
    message: String,
}

impl StatusWriter {
    /// Create a writer for the given path and banner line.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self { path: path.into(), message: message.into() }
    }

    /// Truncate the file and write the banner.
    pub fn write(&self) -> io::Result<()> {
        std::fs::write(&self.path, self.message.as_bytes())
    }
}
