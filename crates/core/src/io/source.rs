//! Source node file reader
//!
//! Source files are solver exports: free-form preamble, a header line
//! containing a marker word (`nodenumber`), then one whitespace-separated
//! record per node:
//!
//! ```text
//! nodenumber x-coordinate y-coordinate z-coordinate ... value
//!          1  0.0 0.0 0.0  ...  12.5
//! ```

use serde::{Deserialize, Serialize};
use std::io::BufRead;
use std::path::Path;
use tracing::{debug, warn};

use super::{open_input, parse_field};
use crate::error::{Error, Result};
use crate::field::{Position, SampleSet, ScalarSample};

/// Layout of a source node file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceFormat {
    /// Records start after the first line containing this marker.
    pub header_marker: String,
    /// Number of fields a record line must have; other lines are ignored.
    pub columns: usize,
    /// Field holding the scalar value (0-based).
    pub value_column: usize,
}

impl Default for SourceFormat {
    fn default() -> Self {
        Self {
            header_marker: "nodenumber".to_string(),
            columns: 9,
            value_column: 8,
        }
    }
}

impl SourceFormat {
    fn validate(&self) -> Result<()> {
        if self.columns < 4 {
            return Err(Error::invalid_argument(
                "columns",
                self.columns,
                "records need at least id, x, y, z",
            ));
        }
        if self.value_column < 4 || self.value_column >= self.columns {
            return Err(Error::invalid_argument(
                "value_column",
                self.value_column,
                format!("must lie in 4..{}", self.columns),
            ));
        }
        Ok(())
    }
}

/// Samples read from a source file together with the records that were
/// skipped because they failed to parse.
#[derive(Debug, Default)]
pub struct SampleParse {
    pub samples: SampleSet,
    /// One [`Error::MalformedRecord`] per skipped line.
    pub malformed: Vec<Error>,
}

/// Read the samples of a source node file.
///
/// Returns [`Error::MissingInput`] if the file does not exist. Malformed
/// records are skipped and listed in [`SampleParse::malformed`].
pub fn read_samples<P: AsRef<Path>>(path: P, format: &SourceFormat) -> Result<SampleParse> {
    let path = path.as_ref();
    let reader = open_input(path)?;
    let parsed = parse_samples(reader, format)?;
    debug!(
        "{}: {} samples, {} malformed records",
        path.display(),
        parsed.samples.len(),
        parsed.malformed.len()
    );
    Ok(parsed)
}

/// Parse source records from any buffered reader.
pub fn parse_samples<R: BufRead>(reader: R, format: &SourceFormat) -> Result<SampleParse> {
    format.validate()?;

    let mut parsed = SampleParse::default();
    let mut in_records = false;

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let line = line.trim();

        if line.contains(format.header_marker.as_str()) {
            in_records = true;
            continue;
        }
        if !in_records || line.is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != format.columns {
            debug!(
                "line {}: {} fields, expected {}; not a record",
                line_number,
                fields.len(),
                format.columns
            );
            continue;
        }

        match parse_record(&fields, format.value_column, line_number) {
            Ok(sample) => parsed.samples.push(sample),
            Err(e) => {
                warn!("skipping record: {}", e);
                parsed.malformed.push(e);
            }
        }
    }

    Ok(parsed)
}

fn parse_record(fields: &[&str], value_column: usize, line: usize) -> Result<ScalarSample> {
    let id = parse_field::<i64>(fields, 0, line)?;
    let x = parse_field::<f64>(fields, 1, line)?;
    let y = parse_field::<f64>(fields, 2, line)?;
    let z = parse_field::<f64>(fields, 3, line)?;
    let value = parse_field::<f64>(fields, value_column, line)?;

    // `f64::from_str` accepts "nan" and "inf"
    let position = Position::new(x, y, z);
    if !position.is_finite() || !value.is_finite() {
        return Err(Error::MalformedRecord {
            line,
            reason: format!("non-finite coordinate or value in node {}", id),
        });
    }
    Ok(ScalarSample::new(id, position, value))
}
