//! Output path resolution.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

/// Make `path_out` absolute and check that it can receive a new file.
///
/// Resolution is lexical; the file itself need not exist. The file name is
/// used exactly as given.
pub fn resolve_output_path(path_out: &Path) -> Result<PathBuf> {
    let path_abs = std::path::absolute(path_out)
        .with_context(|| format!("Cannot resolve output path {:?}", path_out))?;

    if path_abs.is_dir() {
        bail!("Output path is a directory: {}", path_abs.display());
    }
    if let Some(path_parent) = path_abs.parent()
        && !path_parent.is_dir()
    {
        bail!(
            "Output directory does not exist: {}",
            path_parent.display()
        );
    }

    Ok(path_abs)
}
