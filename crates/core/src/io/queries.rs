//! Query point list reader
//!
//! One point per line: `id x y z`, extra trailing fields ignored.

use std::io::BufRead;
use std::path::Path;

use super::{open_input, parse_field};
use crate::error::Result;
use crate::field::{Position, QueryPoint};

/// Read a query point list file.
///
/// Unlike source records, a query line that fails to parse is an error for
/// the whole list: every output table is aligned to it.
pub fn read_queries<P: AsRef<Path>>(path: P) -> Result<Vec<QueryPoint>> {
    let reader = open_input(path.as_ref())?;
    parse_queries(reader)
}

/// Parse query points from any buffered reader.
///
/// Lines with fewer than four fields are skipped.
pub fn parse_queries<R: BufRead>(reader: R) -> Result<Vec<QueryPoint>> {
    let mut queries = Vec::new();

    for (idx, line) in reader.lines().enumerate() {
        let line_number = idx + 1;
        let line = line?;
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            continue;
        }

        let id = parse_field::<i64>(&fields, 0, line_number)?;
        let x = parse_field::<f64>(&fields, 1, line_number)?;
        let y = parse_field::<f64>(&fields, 2, line_number)?;
        let z = parse_field::<f64>(&fields, 3, line_number)?;
        queries.push(QueryPoint::new(id, Position::new(x, y, z)));
    }

    Ok(queries)
}
