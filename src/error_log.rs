use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

pub const ERROR_LOG_NAME: &str = "errores_resoluciones.log";

/// Receives whole-document failures during a batch.
pub trait FailureLog {
    fn record(&mut self, filename: &str, error: &anyhow::Error) -> Result<()>;
}

/// Append-only failure log file, opened once per batch. Each entry is a
/// block: a summary line, the full error chain, then a blank line.
pub struct ErrorLog {
    path: PathBuf,
    file: File,
    entries: usize,
}

impl ErrorLog {
    /// Truncate `path` and write the header.
    pub fn create(path: &Path) -> Result<Self> {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)
            .with_context(|| format!("Failed to open error log {:?}", path))?;
        writeln!(file, "Log de errores al procesar resoluciones")?;
        writeln!(file, "=====================================")?;
        writeln!(file, "Inicio: {}", chrono::Local::now().to_rfc3339())?;
        writeln!(file)?;
        file.flush()?;
        Ok(ErrorLog {
            path: path.to_path_buf(),
            file,
            entries: 0,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn entries(&self) -> usize {
        self.entries
    }

    /// Write the closing line and release the file.
    pub fn close(mut self) -> Result<usize> {
        writeln!(
            self.file,
            "Fin: {} ({} errores)",
            chrono::Local::now().to_rfc3339(),
            self.entries
        )?;
        self.file.flush()?;
        Ok(self.entries)
    }
}

impl FailureLog for ErrorLog {
    fn record(&mut self, filename: &str, error: &anyhow::Error) -> Result<()> {
        writeln!(
            self.file,
            "[{}] Error procesando {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            filename,
            error
        )?;
        for cause in error.chain().skip(1) {
            writeln!(self.file, "    causa: {}", cause)?;
        }
        writeln!(self.file)?;
        self.file.flush()?;
        self.entries += 1;
        Ok(())
    }
}

// ── Tests ──
