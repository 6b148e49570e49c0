//! Result table writer

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::field::InterpolationResult;

/// Header row of every result table.
pub const RESULT_HEADER: &str =
    "Node ID,X Coordinate,Y Coordinate,Z Coordinate,Interpolated Value";

/// Output path for the results of `source`: `<output_dir>/<stem>_results.csv`.
pub fn results_path(output_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    output_dir.join(format!("{}_results.csv", stem))
}

/// Write a result table as CSV to `path`.
///
/// The table is written to a temporary file next to `path` and renamed into
/// place once complete, so a failed write leaves no file at `path`.
pub fn write_results<P: AsRef<Path>>(path: P, results: &[InterpolationResult]) -> Result<()> {
    let path = path.as_ref();
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".nodeidw-")
        .suffix(".partial")
        .tempfile_in(dir)?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        write_results_to(&mut writer, results)?;
        writer.flush()?;
    }
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Write a result table as CSV to any writer.
pub fn write_results_to<W: Write>(writer: &mut W, results: &[InterpolationResult]) -> Result<()> {
    writeln!(writer, "{}", RESULT_HEADER)?;
    for r in results {
        writeln!(
            writer,
            "{},{},{},{},{}",
            r.query_id, r.position.x, r.position.y, r.position.z, r.value
        )?;
    }
    Ok(())
}

/// Writes one `<stem>_results.csv` per source file into a directory.
#[derive(Debug, Clone)]
pub struct CsvResultWriter {
    output_dir: PathBuf,
}

impl CsvResultWriter {
    pub fn new<P: Into<PathBuf>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write the results for `source`, creating the output directory if
    /// needed. Returns the path written.
    pub fn write(&self, source: &Path, results: &[InterpolationResult]) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)?;
        let path = results_path(&self.output_dir, source);
        write_results(&path, results)?;
        Ok(path)
    }
}
