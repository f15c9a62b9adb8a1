//! CSV persistence for wealth snapshots and amortization reports
//!
//! Every file is written to a sibling temporary path first and renamed into
//! place, so readers never observe a half-written file.

mod report;
mod snapshot;

pub use report::{write_amortization_report, write_amortization_report_to_writer};
pub use snapshot::{
    load_or_initialize, read_snapshots, read_snapshots_from_reader, write_snapshots,
    write_snapshots_to_writer, LoadedState,
};

use crate::error::StoreError;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Round to whole cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Two-decimal rendering used in every exported file
pub fn format_cents(value: f64) -> String {
    let rounded = round_cents(value);
    // Avoid writing "-0.00"
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format!("{:.2}", rounded)
}

pub(crate) fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> StoreError + '_ {
    move |source| StoreError::Io {
        path: path.display().to_string(),
        source,
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Write through `write`, then atomically move the result to `path`
pub(crate) fn write_atomically<F>(path: &Path, write: F) -> Result<(), StoreError>
where
    F: FnOnce(BufWriter<File>) -> Result<(), StoreError>,
{
    let tmp = temp_path(path);
    let file = File::create(&tmp).map_err(io_error(&tmp))?;

    if let Err(e) = write(BufWriter::new(file)) {
        let _ = fs::remove_file(&tmp);
        return Err(e);
    }
    fs::rename(&tmp, path).map_err(|e| {
        let _ = fs::remove_file(&tmp);
        io_error(path)(e)
    })?;

    log::debug!("wrote {}", path.display());
    Ok(())
}

/// Flush a finished CSV writer, surfacing buffered I/O failures
pub(crate) fn finish<W: Write>(mut writer: csv::Writer<W>) -> Result<(), StoreError> {
    writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
