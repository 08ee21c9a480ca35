use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use herald_core::error::AppError;
use herald_core::models::Article;
use herald_core::traits::ContentWriter;
use tempfile::NamedTempFile;

/// Writes aggregated articles to a JSON file.
///
/// The document is a pretty-printed array of article records. It is staged in
/// a temporary file next to the destination and renamed into place, so a
/// failed write leaves any previous file untouched.
#[derive(Debug, Clone)]
pub struct JsonFileWriter {
    path: PathBuf,
}

impl JsonFileWriter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_dir(&self) -> &Path {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        }
    }
}

impl ContentWriter for JsonFileWriter {
    fn write(&self, articles: &[Article]) -> Result<(), AppError> {
        let shown = self.path.display();
        let io_err = |e: std::io::Error| AppError::WriterError(format!("{shown}: {e}"));

        let staged = NamedTempFile::new_in(self.staging_dir()).map_err(io_err)?;
        {
            let mut out = BufWriter::new(staged.as_file());
            serde_json::to_writer_pretty(&mut out, articles)
                .map_err(|e| AppError::WriterError(format!("{shown}: {e}")))?;
            out.flush().map_err(io_err)?;
        }
        staged.persist(&self.path).map_err(|e| io_err(e.error))?;

        tracing::info!(path = %shown, count = articles.len(), "Wrote articles");
        Ok(())
    }
}
