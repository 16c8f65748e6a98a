//! Replacing output files in one step.

use std::{
    fs::{self, File},
    io::Write,
    path::Path,
};

use tempfile::NamedTempFile;

use crate::error::Error;

fn parent_dir_or_dot(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

pub(crate) fn write_failure(path: &Path) -> impl FnOnce(std::io::Error) -> Error + '_ {
    move |error| Error::WriteFailure {
        error,
        filename: path.display().to_string(),
    }
}

/// Write `dest` through a temporary file in the same directory
/// that only replaces `dest` once `write_fn` has succeeded.
///
/// Missing parent directories are created.
pub(crate) fn atomic_write<T>(
    dest: &Path,
    write_fn: impl FnOnce(&mut File) -> Result<T, Error>,
) -> Result<T, Error> {
    let dir = parent_dir_or_dot(dest);
    fs::create_dir_all(dir).map_err(write_failure(dest))?;

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_failure(dest))?;
    let out = write_fn(tmp.as_file_mut())?;

    tmp.as_file_mut().flush().map_err(write_failure(dest))?;
    tmp.as_file().sync_all().map_err(write_failure(dest))?;

    tmp.persist(dest)
        .map_err(|persist| write_failure(dest)(persist.error))?;

    Ok(out)
}
