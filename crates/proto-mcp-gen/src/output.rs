// crates/proto-mcp-gen/src/output.rs
// ============================================================================
// Module: Artifact Output
// Description: Atomic artifact writes and drift checks.
// Purpose: Place generated files on disk and verify they are current.
// Dependencies: tracing
// ============================================================================

//! ## Overview
//! Artifacts are written to a temporary file beside the destination and then
//! renamed into place, so readers never observe a partially written file.
//! The check path compares on-disk files with freshly rendered contents and
//! reports the first file that differs.

use std::fs;
use std::fs::OpenOptions;
use std::io::ErrorKind;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;

use tracing::info;

use crate::Artifact;
use crate::GenError;

// ============================================================================
// CONSTANTS: Temporary output file handling
// ============================================================================

/// Attempts made to allocate a unique temporary file.
const TEMP_ATTEMPTS: usize = 16;
/// Process-wide counter for temporary file names.
static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

// ============================================================================
// SECTION: Public API
// ============================================================================

/// Writes every artifact under `out_dir`, creating directories as needed.
///
/// # Errors
/// Returns [`GenError::Io`] when a directory or file cannot be written.
pub fn write_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<(), GenError> {
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        write_output(&path, &artifact.contents)?;
        info!(path = %path.display(), bytes = artifact.contents.len(), "artifact written");
    }
    Ok(())
}

/// Verifies every artifact under `out_dir` matches the rendered contents.
///
/// # Errors
/// Returns [`GenError::Drift`] when a file is missing or differs, and
/// [`GenError::Io`] when a file cannot be read.
pub fn check_artifacts(out_dir: &Path, artifacts: &[Artifact]) -> Result<(), GenError> {
    for artifact in artifacts {
        let path = out_dir.join(&artifact.path);
        check_output(&path, &artifact.contents)?;
    }
    info!(out_dir = %out_dir.display(), artifacts = artifacts.len(), "artifacts up to date");
    Ok(())
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes the contents to `path` through a temporary sibling file.
fn write_output(path: &Path, contents: &str) -> Result<(), GenError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| GenError::Io(err.to_string()))?;
    }
    let mut temp = TempOutput::create(path)?;
    temp.file.write_all(contents.as_bytes()).map_err(|err| GenError::Io(err.to_string()))?;
    temp.file.sync_all().map_err(|err| GenError::Io(err.to_string()))?;
    temp.persist(path)
}

/// Compares the rendered contents against the existing file.
fn check_output(path: &Path, contents: &str) -> Result<(), GenError> {
    let existing = match fs::read_to_string(path) {
        Ok(existing) => existing,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(drift(path, "is missing"));
        }
        Err(err) => return Err(GenError::Io(err.to_string())),
    };
    if existing == contents { Ok(()) } else { Err(drift(path, "is out of date")) }
}

/// Builds the drift error for one artifact.
fn drift(path: &Path, state: &str) -> GenError {
    GenError::Drift(format!("{} {state}. Run proto-mcp-gen generate.", path.display()))
}

/// Temporary output file removed on drop unless persisted.
struct TempOutput {
    /// Temporary file location.
    path: PathBuf,
    /// Open handle for writing.
    file: fs::File,
    /// Set once the file has been renamed into place.
    persisted: bool,
}

impl TempOutput {
    /// Allocates a uniquely named file next to `dest`.
    fn create(dest: &Path) -> Result<Self, GenError> {
        let parent = dest.parent().unwrap_or_else(|| Path::new("."));
        let file_name = dest
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| GenError::Io("artifact path has no file name".to_string()))?;
        for _ in 0 .. TEMP_ATTEMPTS {
            let attempt = TEMP_COUNTER.fetch_add(1, Ordering::Relaxed);
            let path = parent.join(format!(".{file_name}.{}.{attempt}.tmp", std::process::id()));
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => {
                    return Ok(Self {
                        path,
                        file,
                        persisted: false,
                    });
                }
                Err(err) if err.kind() == ErrorKind::AlreadyExists => {}
                Err(err) => return Err(GenError::Io(err.to_string())),
            }
        }
        Err(GenError::Io(format!("no free temporary name for {file_name}")))
    }

    /// Renames the file over `dest`.
    ///
    /// Where rename cannot replace an existing file, the destination is
    /// removed first.
    fn persist(mut self, dest: &Path) -> Result<(), GenError> {
        if fs::rename(&self.path, dest).is_err() {
            if dest.exists() {
                fs::remove_file(dest).map_err(|err| GenError::Io(err.to_string()))?;
            }
            fs::rename(&self.path, dest).map_err(|err| GenError::Io(err.to_string()))?;
        }
        self.persisted = true;
        Ok(())
    }
}

impl Drop for TempOutput {
    fn drop(&mut self) {
        if !self.persisted {
            let _ = fs::remove_file(&self.path);
        }
    }
}
