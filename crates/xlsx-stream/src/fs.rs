//! Atomic replacement of output files.
//!
//! Output is written to a temp file in the destination directory (so the final rename never
//! crosses devices), flushed and synced, then renamed over the destination. If writing fails,
//! the temp file is removed and the destination is left untouched.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::{Result, XlsxStreamError};

fn parent_dir_or_dot(path: &Path) -> &Path {
    // `Path::parent` is `Some("")` for bare file names like `report.xlsx`.
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

/// Check that `dest` can be replaced: an existing destination must not be read-only, and its
/// directory must exist.
pub fn ensure_writable(dest: &Path) -> Result<()> {
    let not_writable = || XlsxStreamError::NotWritable(dest.to_path_buf());
    match fs::metadata(dest) {
        Ok(meta) if meta.is_dir() || meta.permissions().readonly() => return Err(not_writable()),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {}
        Err(_) => return Err(not_writable()),
    }
    if !parent_dir_or_dot(dest).is_dir() {
        return Err(not_writable());
    }
    Ok(())
}

/// Write `dest` through `write_fn` and move it into place only once `write_fn` succeeded.
pub fn atomic_write<T>(
    dest: &Path,
    write_fn: impl FnOnce(&mut File) -> Result<T>,
) -> Result<T> {
    let dir = parent_dir_or_dot(dest);
    let mut tmp = NamedTempFile::new_in(dir)?;
    let out = write_fn(tmp.as_file_mut())?;

    tmp.as_file_mut().flush()?;
    tmp.as_file().sync_all()?;
    tmp.persist(dest).map_err(|err| XlsxStreamError::Io(err.error))?;

    // Best-effort: the file is already in place.
    let _ = File::open(dir).and_then(|d| d.sync_all());
    Ok(out)
}
