
use anyhow::Context;
use csv::StringRecord;
use serde::Serialize;
use std::collections::HashSet;
use std::io::Read;

use crate::parsing::score_table::table_reader_builder;

/// The first ordering problem found in a table
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum OrderError {
    #[error("out of order at line {line}: {chrom}:{position} follows {chrom}:{previous}")]
    PositionDecreased { line: u64, chrom: String, position: u64, previous: u64 },
    #[error("out of order at line {line}: chromosome {chrom} reappears after other chromosomes")]
    ChromosomeRevisited { line: u64, chrom: String }
}

/// Counts from a table that passed the order check
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct OrderReport {
    /// Data rows scanned
    pub rows: u64,
    /// Distinct chromosomes seen
    pub chromosomes: u64
}

/// Scans a table and verifies that rows are sorted by position within each chromosome and that chromosomes are contiguous.
/// Only the first two columns (chromosome, position) are used, so any sorted tab-delimited table works.
/// # Arguments
/// * `reader` - the table contents
/// # Errors
/// * `OrderError` for the first row that breaks the order
/// * if reading fails or a position is not an integer
pub fn check_sort_order<R: Read>(reader: R) -> anyhow::Result<OrderReport> {
    let mut csv_reader = table_reader_builder().from_reader(reader);
    let mut record = StringRecord::new();

    let mut report = OrderReport::default();
    let mut seen: HashSet<String> = Default::default();
    let mut last_chrom: Option<String> = None;
    let mut last_position: u64 = 0;

    while csv_reader.read_record(&mut record)? {
        let line = record.position().map(|p| p.line()).unwrap_or_default();
        let chrom = record.get(0).unwrap_or_default();
        let position: u64 = record.get(1).unwrap_or_default().parse()
            .with_context(|| format!("Invalid position at line {line}: {record:?}"))?;

        if last_chrom.as_deref() == Some(chrom) {
            if position < last_position {
                return Err(OrderError::PositionDecreased {
                    line, chrom: chrom.to_string(), position, previous: last_position
                }.into());
            }
        } else {
            if !seen.insert(chrom.to_string()) {
                return Err(OrderError::ChromosomeRevisited { line, chrom: chrom.to_string() }.into());
            }
            last_chrom = Some(chrom.to_string());
        }

        last_position = position;
        report.rows += 1;
    }

    report.chromosomes = seen.len() as u64;
    Ok(report)
}
