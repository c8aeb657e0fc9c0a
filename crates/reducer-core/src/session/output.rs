use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::error::{Error, Result};

/// `REDUCED_<stem><ext>` beside the source file.
pub fn default_output_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = source
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    source.with_file_name(format!("REDUCED_{}{}", stem, ext))
}

/// Write `bytes` to a temporary file in the destination directory and move
/// it into place, so a failed write never leaves a partial file behind.
pub fn write_atomic(destination: &Path, bytes: &[u8]) -> Result<()> {
    let failed = |source: std::io::Error| Error::WriteFailed {
        path: destination.to_path_buf(),
        source,
    };
    let dir = match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(dir).map_err(failed)?;
    file.write_all(bytes).map_err(failed)?;
    file.as_file().sync_all().map_err(failed)?;
    file.persist(destination).map_err(|e| failed(e.error))?;
    Ok(())
}
