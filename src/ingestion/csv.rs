//! Delimited-text (CSV) parsing.
//!
//! The first row is the header and defines field names; every later row becomes one
//! [`Record`] keyed positionally by the header. Quoted cells may contain delimiters and line
//! breaks.

use std::io::Read;

use crate::error::IngestResult;
use crate::types::Record;

/// Parse CSV text into records, collecting the whole sequence.
///
/// Rules:
///
/// - CSV must have a header row (an empty payload yields no records).
/// - Short rows are padded: header fields without a cell get `""`.
/// - Cells beyond the header count are ignored.
/// - Cell values are kept verbatim (no trimming).
pub fn parse_csv_str(input: &str) -> IngestResult<Vec<Record>> {
    csv_records(input.as_bytes())?.collect()
}

/// Stream records from any CSV reader.
///
/// The header row is read eagerly; data rows are read one at a time as the returned iterator
/// is advanced.
pub fn csv_records<R: Read>(reader: R) -> IngestResult<impl Iterator<Item = IngestResult<Record>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_owned).collect();

    Ok(rdr
        .into_records()
        .enumerate()
        .map(move |(row_idx0, result)| {
            // 1-based data row; the header is not counted.
            let row = row_idx0 + 1;
            let cells = result?;
            Ok(row_to_record(row, &headers, &cells))
        }))
}

fn row_to_record(row: usize, headers: &[String], cells: &csv::StringRecord) -> Record {
    if cells.len() > headers.len() {
        log::warn!(
            "csv row {row} has {} cells but header has {} fields; ignoring trailing cells",
            cells.len(),
            headers.len()
        );
    }

    let mut record = Record::with_capacity(headers.len());
    for (idx, name) in headers.iter().enumerate() {
        record.insert(name.as_str(), cells.get(idx).unwrap_or(""));
    }
    record
}
