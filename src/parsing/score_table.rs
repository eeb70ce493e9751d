
use anyhow::{anyhow, bail, Context};
use csv::StringRecord;
use log::trace;
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::data_types::bases::Base;
use crate::data_types::position_group::{PositionGroup, ScoreRow};
use crate::util::text_io::open_input;

/// Column holding the phred-like score; the column before it (raw score) is unused
const SCORE_COLUMN: usize = 5;

/// Shared builder for the tab-delimited tables we read: no header, `#` comments, and no quoting
pub fn table_reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(false)
        .comment(Some(b'#'))
        .quoting(false)
        .flexible(true);
    builder
}

/// A single parsed row of the score table
#[derive(Clone, Debug, PartialEq)]
pub struct TableRow {
    /// Chromosome name
    pub chrom: String,
    /// Position, 1-based
    pub position: u64,
    /// Reference base or ambiguity code
    pub reference: String,
    /// The alternate base and its score
    pub row: ScoreRow,
    /// Line in the input, 1-based
    pub line: u64
}

/// Streams a sorted score table, yielding all rows that share a (chromosome, position) as one group.
/// Input rows have at least six tab-separated fields: chromosome, position, reference, alternate, raw score, phred score.
pub struct ScoreTableReader<R: Read> {
    /// The underlying TSV reader
    csv_reader: csv::Reader<R>,
    /// Re-usable record buffer
    record: StringRecord,
    /// First row of the next group, read while finishing the previous one
    pending: Option<TableRow>,
    /// Number of rows parsed so far
    rows_read: u64
}

impl ScoreTableReader<Box<dyn Read>> {
    /// Opens a score table from a path; see [`open_input`] for supported inputs.
    /// # Arguments
    /// * `filename` - the table to open, "-" for stdin
    pub fn from_path(filename: &Path) -> anyhow::Result<Self> {
        let reader = open_input(filename)?;
        Ok(Self::from_reader(reader))
    }
}

impl<R: Read> ScoreTableReader<R> {
    /// Wraps any reader containing a score table
    pub fn from_reader(reader: R) -> Self {
        Self {
            csv_reader: table_reader_builder().from_reader(reader),
            record: StringRecord::new(),
            pending: None,
            rows_read: 0
        }
    }

    /// Number of data rows parsed so far
    pub fn rows_read(&self) -> u64 {
        self.rows_read
    }

    /// Reads and parses the next data row, None at end of input.
    /// # Errors
    /// * if the underlying read fails
    /// * if the row has fewer than six fields or any field fails to parse
    pub fn next_row(&mut self) -> anyhow::Result<Option<TableRow>> {
        if !self.csv_reader.read_record(&mut self.record)? {
            return Ok(None);
        }
        let line = self.record.position().map(|p| p.line()).unwrap_or_default();
        let row = parse_row(&self.record, line)
            .with_context(|| format!("Error while parsing line {line}: {:?}", self.record))?;
        self.rows_read += 1;
        Ok(Some(row))
    }

    /// Reads the next group of rows sharing a chromosome and position, None at end of input.
    /// # Errors
    /// * if any row fails to parse
    pub fn next_group(&mut self) -> anyhow::Result<Option<PositionGroup>> {
        let first = match self.pending.take() {
            Some(row) => row,
            None => match self.next_row()? {
                Some(row) => row,
                None => return Ok(None)
            }
        };

        let mut rows = vec![first.row];
        loop {
            match self.next_row()? {
                Some(row) if row.chrom == first.chrom && row.position == first.position => {
                    rows.push(row.row);
                },
                Some(row) => {
                    self.pending = Some(row);
                    break;
                },
                None => break
            }
        }

        trace!("Group {}:{} -> {rows:?}", first.chrom, first.position);
        Ok(Some(PositionGroup::new(first.chrom, first.position, first.reference, rows)))
    }
}

impl<R: Read> Iterator for ScoreTableReader<R> {
    type Item = anyhow::Result<PositionGroup>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_group().transpose()
    }
}

/// Converts a raw TSV record into a table row
fn parse_row(record: &StringRecord, line: u64) -> anyhow::Result<TableRow> {
    if record.len() <= SCORE_COLUMN {
        bail!("expected at least {} fields, found {}", SCORE_COLUMN + 1, record.len());
    }

    // all fields are guaranteed to exist at this point
    let chrom = record[0].to_string();
    let position: u64 = record[1].parse()
        .with_context(|| format!("invalid position {:?}", &record[1]))?;
    if position == 0 {
        bail!("positions are 1-based, found 0");
    }
    let reference = record[2].to_string();
    let alternate = Base::from_str(&record[3])
        .map_err(|_e| anyhow!("invalid alternate base {:?}", &record[3]))?;
    let score: f64 = record[SCORE_COLUMN].parse()
        .with_context(|| format!("invalid score {:?}", &record[SCORE_COLUMN]))?;

    Ok(TableRow {
        chrom, position, reference,
        row: ScoreRow { alternate, score },
        line
    })
}
