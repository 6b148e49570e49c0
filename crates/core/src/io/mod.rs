//! Text I/O for source node files, query point lists and result tables
//!
//! These are the file-facing collaborators around the interpolation core;
//! nothing in `field` or the algorithms crate depends on them.

mod discover;
mod queries;
mod results;
mod source;

pub use discover::{list_source_files, SourceFilter};
pub use queries::{parse_queries, read_queries};
pub use results::{results_path, write_results, write_results_to, CsvResultWriter, RESULT_HEADER};
pub use source::{parse_samples, read_samples, SampleParse, SourceFormat};

use crate::error::{Error, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::Path;

/// Open `path` for buffered reading, mapping a missing file to
/// [`Error::MissingInput`].
pub(crate) fn open_input(path: &Path) -> Result<BufReader<File>> {
    match File::open(path) {
        Ok(file) => Ok(BufReader::new(file)),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(Error::MissingInput(path.to_path_buf())),
        Err(e) => Err(Error::Io(e)),
    }
}

/// Parse one whitespace-separated field, describing failures for
/// [`Error::MalformedRecord`].
pub(crate) fn parse_field<T>(fields: &[&str], idx: usize, line: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let token = fields.get(idx).ok_or_else(|| Error::MalformedRecord {
        line,
        reason: format!("missing field {}", idx),
    })?;
    token.parse::<T>().map_err(|e| Error::MalformedRecord {
        line,
        reason: format!("field {} ({:?}): {}", idx, token, e),
    })
}
