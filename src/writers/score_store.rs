
use anyhow::Context;
use byteorder::{LittleEndian, WriteBytesExt};
use indexmap::IndexMap;
use indicatif::ProgressBar;
use log::{debug, info};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::codec::{encode, CodecError, SENTINEL};
use crate::data_types::index_entry::IndexEntry;
use crate::data_types::position_group::{GroupError, PositionGroup};
use crate::data_types::score_quad::ScoreQuad;
use crate::parsing::score_table::ScoreTableReader;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error("ordering violation at {chrom}:{position}: {buffer_length} positions are already stored")]
    OrderingViolation { chrom: String, position: u64, buffer_length: u64 },
    #[error("chromosome {chrom} reappeared after it was completed; chromosomes must not be interleaved")]
    ChromosomeRevisited { chrom: String },
    #[error("error while encoding {chrom}:{position}")]
    Encoding { chrom: String, position: u64, #[source] source: CodecError },
    #[error(transparent)]
    Group(#[from] GroupError),
    #[error("error while writing the score store")]
    Io(#[from] std::io::Error)
}

/// Builds the paths of the binary and index files for a store prefix.
/// The extensions are appended so prefixes like `cadd.v1.3` are kept intact.
/// # Arguments
/// * `prefix` - the shared path prefix
pub fn store_paths(prefix: &Path) -> (PathBuf, PathBuf) {
    let mut bin_fn = prefix.to_owned().into_os_string();
    bin_fn.push(".bin");
    let mut idx_fn = prefix.to_owned().into_os_string();
    idx_fn.push(".idx");
    (PathBuf::from(bin_fn), PathBuf::from(idx_fn))
}

/// The encoded records for a single chromosome, one per 1-based position starting at 1.
/// Positions without data are filled with the sentinel record.
#[derive(Debug)]
pub struct ChromosomeBuffer {
    /// Chromosome name
    chrom: String,
    /// Encoded records, index = position - 1
    records: Vec<u32>
}

impl ChromosomeBuffer {
    /// Creates an empty buffer for a chromosome
    pub fn new(chrom: String) -> Self {
        Self {
            chrom,
            records: vec![]
        }
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn records(&self) -> &[u32] {
        &self.records
    }

    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Appends the record for a position, padding any skipped positions with the sentinel.
    /// Returns the number of sentinel records that were added.
    /// # Arguments
    /// * `position` - 1-based position of the record, must be past the end of the buffer
    /// * `value` - the encoded record
    /// # Errors
    /// * if the position is already covered by the buffer
    pub fn push(&mut self, position: u64, value: u32) -> Result<u64, StoreError> {
        let buffer_length = self.len();
        if position <= buffer_length {
            return Err(StoreError::OrderingViolation {
                chrom: self.chrom.clone(),
                position,
                buffer_length
            });
        }

        let padding = position - 1 - buffer_length;
        self.records.resize((position - 1) as usize, SENTINEL);
        self.records.push(value);
        debug_assert_eq!(self.len(), position);
        Ok(padding)
    }

    /// Writes the buffer to the store, consuming it.
    /// The records go to the binary output as little-endian u32s, followed by one line in the index.
    /// # Arguments
    /// * `bin_writer` - the binary store output
    /// * `idx_writer` - the index output
    pub fn flush<B: Write, I: Write>(self, bin_writer: &mut B, idx_writer: &mut I) -> std::io::Result<IndexEntry> {
        for &value in self.records.iter() {
            bin_writer.write_u32::<LittleEndian>(value)?;
        }
        let entry = IndexEntry::new(self.chrom, self.records.len() as u64);
        idx_writer.write_all(entry.to_index_line().as_bytes())?;
        idx_writer.flush()?;
        Ok(entry)
    }
}

/// Statistics collected while building a store
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StoreSummary {
    /// The index entries in store order
    pub chromosomes: Vec<IndexEntry>,
    /// Total records written, real and sentinel
    pub total_records: u64,
    /// Positions that came from the input
    pub scored_positions: u64,
    /// Positions that had an ambiguous reference resolved
    pub ambiguous_positions: u64,
    /// Number of gaps between scored positions
    pub gap_spans: u64,
    /// Sentinel records written inside gaps, excluding leading padding
    pub gap_positions: u64
}

/// Streams position groups into the binary store and its index.
/// Input must be sorted by position within a chromosome, and each chromosome must be contiguous.
pub struct StoreWriter<B: Write, I: Write> {
    /// Binary output
    bin_writer: B,
    /// Index output
    idx_writer: I,
    /// Records for the chromosome currently being built
    current: Option<ChromosomeBuffer>,
    /// Completed chromosomes and their record counts
    completed: IndexMap<String, u64>,
    /// Running statistics
    summary: StoreSummary
}

impl StoreWriter<BufWriter<File>, BufWriter<File>> {
    /// Creates `<prefix>.bin` and `<prefix>.idx`, overwriting anything present.
    /// # Arguments
    /// * `prefix` - the shared output path prefix
    pub fn from_prefix(prefix: &Path) -> std::io::Result<Self> {
        let (bin_fn, idx_fn) = store_paths(prefix);
        let bin_writer = BufWriter::new(File::create(bin_fn)?);
        let idx_writer = BufWriter::new(File::create(idx_fn)?);
        Ok(Self::new(bin_writer, idx_writer))
    }
}

impl<B: Write, I: Write> StoreWriter<B, I> {
    /// Constructor
    pub fn new(bin_writer: B, idx_writer: I) -> Self {
        Self {
            bin_writer,
            idx_writer,
            current: None,
            completed: Default::default(),
            summary: Default::default()
        }
    }

    /// Resolves a group of input rows and adds it to the store.
    /// # Arguments
    /// * `group` - all rows for one position
    /// # Errors
    /// * if the group cannot be resolved into a single score quad
    /// * see [`StoreWriter::add_quad`]
    pub fn add_group(&mut self, group: &PositionGroup) -> Result<(), StoreError> {
        let quad = group.resolve_quad()?;
        if group.is_ambiguous() {
            debug!("Resolved ambiguous reference {:?} at {}:{}", group.reference(), group.chrom(), group.position());
            self.summary.ambiguous_positions += 1;
        }
        self.add_quad(group.chrom(), group.position(), &quad)
    }

    /// Encodes a score quad and appends it to the current chromosome, switching chromosomes if needed.
    /// # Arguments
    /// * `chrom` - chromosome of the position
    /// * `position` - 1-based position
    /// * `quad` - scores for the position
    /// # Errors
    /// * if the quad does not have exactly one missing base
    /// * if the position is not after the last position of the chromosome
    /// * if the chromosome was already completed
    /// * if flushing the previous chromosome fails
    pub fn add_quad(&mut self, chrom: &str, position: u64, quad: &ScoreQuad) -> Result<(), StoreError> {
        let value = encode(quad)
            .map_err(|source| StoreError::Encoding { chrom: chrom.to_string(), position, source })?;

        let buffer = self.buffer_for(chrom)?;
        let is_leading = buffer.is_empty();
        let previous_end = buffer.len();
        let padding = buffer.push(position, value)?;

        // leading padding is not a gap
        if padding > 0 && !is_leading {
            info!("Filling {padding} empty positions at {chrom}:{}-{}", previous_end + 1, position - 1);
            self.summary.gap_spans += 1;
            self.summary.gap_positions += padding;
        }
        self.summary.scored_positions += 1;
        Ok(())
    }

    /// Returns the buffer for a chromosome, flushing the current one if the chromosome changed
    fn buffer_for(&mut self, chrom: &str) -> Result<&mut ChromosomeBuffer, StoreError> {
        let is_current = self.current.as_ref()
            .map(|b| b.chrom() == chrom)
            .unwrap_or(false);

        if !is_current {
            if self.completed.contains_key(chrom) {
                return Err(StoreError::ChromosomeRevisited { chrom: chrom.to_string() });
            }
            self.flush_current()?;
            info!("Encoding chromosome {chrom}...");
            self.current = Some(ChromosomeBuffer::new(chrom.to_string()));
        }

        // always set right above
        Ok(self.current.get_or_insert_with(|| ChromosomeBuffer::new(chrom.to_string())))
    }

    /// Flushes the active chromosome buffer if one exists
    fn flush_current(&mut self) -> Result<(), StoreError> {
        if let Some(buffer) = self.current.take() {
            if buffer.is_empty() {
                return Ok(());
            }
            let entry = buffer.flush(&mut self.bin_writer, &mut self.idx_writer)?;
            info!("Wrote {} records for chromosome {}", entry.record_count, entry.chrom);
            self.summary.total_records += entry.record_count;
            self.completed.insert(entry.chrom.clone(), entry.record_count);
            self.summary.chromosomes.push(entry);
        }
        Ok(())
    }

    /// Flushes the final chromosome and both outputs, returning the build statistics.
    /// # Errors
    /// * if any write fails
    pub fn finish(mut self) -> Result<StoreSummary, StoreError> {
        self.flush_current()?;
        self.bin_writer.flush()?;
        self.idx_writer.flush()?;
        Ok(self.summary)
    }
}

/// Streams every position group from a score table into a store writer, then finishes the store.
/// The writer is consumed, so on any error its outputs are dropped (and flushed) before returning.
/// # Arguments
/// * `table_reader` - the sorted score table
/// * `store_writer` - destination store
/// * `progress` - incremented once per position
/// # Errors
/// * if the table cannot be parsed
/// * any [`StoreError`], with the offending position group attached as context
pub fn encode_score_table<R: Read, B: Write, I: Write>(
    table_reader: &mut ScoreTableReader<R>, mut store_writer: StoreWriter<B, I>, progress: &ProgressBar
) -> anyhow::Result<StoreSummary> {
    while let Some(group) = table_reader.next_group()? {
        store_writer.add_group(&group)
            .with_context(|| format!(
                "Error while adding {}:{} (reference {:?}, rows {:?})",
                group.chrom(), group.position(), group.reference(), group.rows()
            ))?;
        progress.inc(1);
    }

    let summary = store_writer.finish()?;
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::decode;
    use crate::data_types::bases::Base;
    use crate::data_types::position_group::ScoreRow;

    fn read_u32s(bytes: &[u8]) -> Vec<u32> {
        bytes.chunks_exact(4)
            .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect()
    }

    fn group(chrom: &str, position: u64, reference: &str, pairs: &[(Base, f64)]) -> PositionGroup {
        let rows = pairs.iter()
            .map(|&(alternate, score)| ScoreRow { alternate, score })
            .collect();
        PositionGroup::new(chrom.to_string(), position, reference.to_string(), rows)
    }

    #[test]
    fn test_leading_padding() {
        let mut buffer = ChromosomeBuffer::new("1".to_string());
        assert_eq!(buffer.push(10, 7).unwrap(), 9);
        assert_eq!(buffer.len(), 10);
        assert!(buffer.records()[..9].iter().all(|&v| v == SENTINEL));
        assert_eq!(buffer.records()[9], 7);
    }

    #[test]
    fn test_gap_filling() {
        let mut buffer = ChromosomeBuffer::new("1".to_string());
        assert_eq!(buffer.push(1, 11).unwrap(), 0);
        assert_eq!(buffer.push(5, 55).unwrap(), 3);
        assert_eq!(buffer.push(9, 99).unwrap(), 3);
        assert_eq!(buffer.records(), &[11, 0, 0, 0, 55, 0, 0, 0, 99]);
    }

    #[test]
    fn test_ordering_violation() {
        let mut buffer = ChromosomeBuffer::new("1".to_string());
        buffer.push(5, 1).unwrap();
        assert!(matches!(
            buffer.push(5, 2),
            Err(StoreError::OrderingViolation { position: 5, buffer_length: 5, .. })
        ));
        assert!(matches!(
            buffer.push(3, 2),
            Err(StoreError::OrderingViolation { position: 3, buffer_length: 5, .. })
        ));
    }

    #[test]
    fn test_end_to_end_example() {
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let summary = {
            let mut writer = StoreWriter::new(&mut bin, &mut idx);
            writer.add_group(&group("1", 1, "A", &[(Base::C, 10.0), (Base::G, 20.0), (Base::T, 30.0)])).unwrap();
            writer.add_group(&group("1", 3, "G", &[(Base::A, 5.0), (Base::C, 15.0), (Base::T, 25.0)])).unwrap();
            writer.finish().unwrap()
        };

        let expected = vec![
            encode(&ScoreQuad::new(None, Some(10.0), Some(20.0), Some(30.0))).unwrap(),
            SENTINEL,
            encode(&ScoreQuad::new(Some(5.0), Some(15.0), None, Some(25.0))).unwrap(),
        ];
        assert_eq!(bin.len(), 12);
        assert_eq!(read_u32s(&bin), expected);
        assert_eq!(String::from_utf8(idx).unwrap(), "1\t3\n");

        assert_eq!(summary.chromosomes, vec![IndexEntry::new("1".to_string(), 3)]);
        assert_eq!(summary.total_records, 3);
        assert_eq!(summary.scored_positions, 2);
        assert_eq!(summary.gap_spans, 1);
        assert_eq!(summary.gap_positions, 1);
    }

    #[test]
    fn test_flush_boundary() {
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let summary = {
            let mut writer = StoreWriter::new(&mut bin, &mut idx);
            writer.add_group(&group("1", 2, "A", &[(Base::C, 1.0), (Base::G, 2.0), (Base::T, 3.0)])).unwrap();
            writer.add_group(&group("2", 4, "C", &[(Base::A, 1.0), (Base::G, 2.0), (Base::T, 3.0)])).unwrap();
            writer.add_group(&group("2", 5, "C", &[(Base::A, 4.0), (Base::G, 5.0), (Base::T, 6.0)])).unwrap();
            writer.finish().unwrap()
        };

        assert_eq!(String::from_utf8(idx).unwrap(), "1\t2\n2\t5\n");
        let total: u64 = summary.chromosomes.iter().map(|e| e.record_count).sum();
        assert_eq!(bin.len() as u64, 4 * total);
        assert_eq!(summary.total_records, 7);
        // leading padding is not a gap
        assert_eq!(summary.gap_spans, 0);

        let records = read_u32s(&bin);
        assert_eq!(records[0], SENTINEL);
        assert_eq!(decode(records[1]).missing_base(), Some(Base::A));
        assert_eq!(&records[2..5], &[SENTINEL, SENTINEL, SENTINEL]);
        assert_eq!(decode(records[5]).missing_base(), Some(Base::C));
    }

    #[test]
    fn test_ambiguity_drop() {
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let summary = {
            let mut writer = StoreWriter::new(&mut bin, &mut idx);
            writer.add_group(&group("3", 1, "R", &[(Base::A, 9.0), (Base::C, 1.0), (Base::G, 2.0), (Base::T, 3.0)])).unwrap();
            writer.finish().unwrap()
        };
        assert_eq!(summary.ambiguous_positions, 1);
        assert_eq!(
            read_u32s(&bin),
            vec![encode(&ScoreQuad::new(None, Some(1.0), Some(2.0), Some(3.0))).unwrap()]
        );
    }

    #[test]
    fn test_fatal_errors() {
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let mut writer = StoreWriter::new(&mut bin, &mut idx);
        let triple = [(Base::C, 1.0), (Base::G, 2.0), (Base::T, 3.0)];

        writer.add_group(&group("1", 5, "A", &triple)).unwrap();
        assert!(matches!(
            writer.add_group(&group("1", 5, "A", &triple)),
            Err(StoreError::OrderingViolation { .. })
        ));
        assert!(matches!(
            writer.add_group(&group("1", 6, "A", &triple[..2])),
            Err(StoreError::Group(GroupError::InvalidInputShape { .. }))
        ));
        assert!(matches!(
            writer.add_group(&group("1", 6, "Y", &[(Base::A, 0.0), (Base::C, 1.0), (Base::G, 2.0), (Base::T, 3.0)])),
            Err(StoreError::Group(GroupError::UnrecognizedAmbiguityCode { .. }))
        ));
        assert!(matches!(
            writer.add_group(&group("1", 6, "A", &[(Base::C, 1.0), (Base::C, 2.0), (Base::T, 3.0)])),
            Err(StoreError::Encoding { source: CodecError::InvalidMissingCount { count: 2 }, .. })
        ));

        writer.add_group(&group("2", 1, "A", &triple)).unwrap();
        assert!(matches!(
            writer.add_group(&group("1", 10, "A", &triple)),
            Err(StoreError::ChromosomeRevisited { .. })
        ));
    }

    #[test]
    fn test_empty_input() {
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let summary = StoreWriter::new(&mut bin, &mut idx).finish().unwrap();
        assert!(bin.is_empty());
        assert!(idx.is_empty());
        assert_eq!(summary, StoreSummary::default());
    }

    #[test]
    fn test_encode_abort() {
        let table = "1\t1\tA\tC\t0\t1.0\n1\t1\tA\tG\t0\t2.0\n1\t1\tA\tT\t0\t3.0\n1\t2\tY\tA\t0\t1.0\n1\t2\tY\tC\t0\t1.0\n1\t2\tY\tG\t0\t1.0\n1\t2\tY\tT\t0\t1.0\n";
        let mut reader = ScoreTableReader::from_reader(table.as_bytes());
        let mut bin: Vec<u8> = vec![];
        let mut idx: Vec<u8> = vec![];
        let err = encode_score_table(
            &mut reader, StoreWriter::new(&mut bin, &mut idx), &ProgressBar::hidden()
        ).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoreError>(),
            Some(StoreError::Group(GroupError::UnrecognizedAmbiguityCode { .. }))
        ));
        // nothing is written for a partial chromosome
        assert!(bin.is_empty());
        assert!(idx.is_empty());
    }

    #[test]
    fn test_store_paths() {
        let (bin_fn, idx_fn) = store_paths(Path::new("out/cadd.v1.3"));
        assert_eq!(bin_fn, PathBuf::from("out/cadd.v1.3.bin"));
        assert_eq!(idx_fn, PathBuf::from("out/cadd.v1.3.idx"));
    }

    #[test]
    fn test_example_file() {
        let tmp_dir = tempfile::tempdir().unwrap();
        let prefix = tmp_dir.path().join("example");
        let writer = StoreWriter::from_prefix(&prefix).unwrap();
        let mut reader = ScoreTableReader::from_path(Path::new("test_data/scores_small.tsv")).unwrap();
        let progress = ProgressBar::hidden();
        let summary = encode_score_table(&mut reader, writer, &progress).unwrap();
        assert_eq!(progress.position(), 6);
        assert_eq!(reader.rows_read(), 19);

        assert_eq!(summary.chromosomes, vec![
            IndexEntry::new("1".to_string(), 4),
            IndexEntry::new("2".to_string(), 5),
            IndexEntry::new("X".to_string(), 7),
        ]);
        assert_eq!(summary.scored_positions, 6);
        assert_eq!(summary.ambiguous_positions, 1);
        assert_eq!(summary.gap_spans, 2);
        assert_eq!(summary.gap_positions, 3);

        let (bin_fn, idx_fn) = store_paths(&prefix);
        assert_eq!(std::fs::metadata(bin_fn).unwrap().len(), 4 * 16);
        assert_eq!(std::fs::read_to_string(idx_fn).unwrap(), "1\t4\n2\t5\nX\t7\n");
    }
}
