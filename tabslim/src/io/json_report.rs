//! Writing of JSON reports

use std::{io::BufWriter, io::Write, path::Path};

use serde::Serialize;
use serde_json::ser::PrettyFormatter;

use crate::error::Error;

use super::atomic::{atomic_write, write_failure};

/// Write `value` as JSON indented by four spaces.
///
/// The file at `path` is only replaced once serialization has succeeded.
pub fn write_json_report<T: Serialize + ?Sized>(value: &T, path: &Path) -> Result<(), Error> {
    atomic_write(path, |file| {
        let mut writer = BufWriter::new(file);
        let formatter = PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);

        value
            .serialize(&mut serializer)
            .map_err(|error| Error::Serialization {
                error,
                filename: path.display().to_string(),
            })?;
        writer.flush().map_err(write_failure(path))?;

        log::info!("wrote report \"{}\"", path.display());
        Ok(())
    })
}
