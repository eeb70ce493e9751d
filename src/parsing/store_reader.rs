
use anyhow::{anyhow, bail, Context};
use byteorder::{ByteOrder, LittleEndian};
use indexmap::IndexMap;
use log::debug;
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

use crate::codec::decode;
use crate::data_types::bases::Base;
use crate::data_types::index_entry::{IndexEntry, RECORD_BYTES};
use crate::data_types::score_quad::ScoreQuad;
use crate::parsing::score_table::table_reader_builder;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LookupError {
    #[error("chromosome not found in index: {chrom}")]
    UnknownChromosome { chrom: String },
    #[error("requested position out of range: {chrom}:{position} (stored length {record_count})")]
    PositionOutOfRange { chrom: String, position: u64, record_count: u64 }
}

/// Location of one chromosome within the binary file
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ChromSlice {
    /// Offset of the first record, in records
    record_offset: u64,
    /// Number of records
    record_count: u64
}

/// Read-only view of a score store, with the binary file memory-mapped for O(1) lookups.
pub struct ScoreStore {
    /// Chromosome slices in store order
    slices: IndexMap<String, ChromSlice>,
    /// The mapped binary file
    mmap: Mmap
}

impl std::fmt::Debug for ScoreStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // the raw mapping is not useful to print
        f.debug_struct("ScoreStore")
            .field("slices", &self.slices)
            .field("mmap_len", &self.mmap.len())
            .finish()
    }
}

/// Derives the binary file path from an index path by swapping the extension
pub fn bin_path_from_index(idx_fn: &Path) -> PathBuf {
    idx_fn.with_extension("bin")
}

/// Loads the index entries from a `<prefix>.idx` file
/// # Arguments
/// * `idx_fn` - path to the index file
/// # Errors
/// * if the file cannot be read
/// * if any row is not a chromosome and record count
/// * if a chromosome appears twice
pub fn load_index(idx_fn: &Path) -> anyhow::Result<Vec<IndexEntry>> {
    let mut csv_reader = table_reader_builder()
        .comment(None)
        .from_path(idx_fn)
        .with_context(|| format!("Error while opening {idx_fn:?}:"))?;

    let mut entries: Vec<IndexEntry> = vec![];
    for result in csv_reader.records() {
        let row = result.with_context(|| format!("Error while reading {idx_fn:?}"))?;
        let chrom = row.get(0).ok_or(anyhow!("Missing chromosome on row: {row:?}"))?;
        let record_count: u64 = row.get(1).ok_or(anyhow!("Missing record count on row: {row:?}"))?
            .trim()
            .parse()
            .with_context(|| format!("Invalid record count on row: {row:?}"))?;
        if entries.iter().any(|e| e.chrom == chrom) {
            bail!("Duplicate chromosome found in index: {chrom}");
        }
        entries.push(IndexEntry::new(chrom.to_string(), record_count));
    }
    Ok(entries)
}

impl ScoreStore {
    /// Opens a store from its index file; the binary file must sit next to it with a `.bin` extension.
    /// # Arguments
    /// * `idx_fn` - path to `<prefix>.idx`
    /// # Errors
    /// * if either file is missing or unreadable
    /// * if the binary length does not match the record counts in the index
    pub fn open(idx_fn: &Path) -> anyhow::Result<Self> {
        let bin_fn = bin_path_from_index(idx_fn);
        let entries = load_index(idx_fn)?;

        let file = File::open(&bin_fn)
            .with_context(|| format!("Error while opening {bin_fn:?}:"))?;
        // SAFETY: the store is treated as read-only and is not expected to change while mapped
        let mmap = unsafe { Mmap::map(&file) }
            .with_context(|| format!("Error while memory mapping {bin_fn:?}:"))?;

        let store = Self::from_parts(entries, mmap)?;
        debug!("Loaded store with {} chromosomes from {idx_fn:?}", store.slices.len());
        Ok(store)
    }

    /// Combines pre-loaded index entries with a mapped binary file
    fn from_parts(entries: Vec<IndexEntry>, mmap: Mmap) -> anyhow::Result<Self> {
        let mut slices: IndexMap<String, ChromSlice> = Default::default();
        let mut record_offset = 0;
        for entry in entries.into_iter() {
            let record_count = entry.record_count;
            slices.insert(entry.chrom, ChromSlice { record_offset, record_count });
            record_offset += record_count;
        }

        let expected_bytes = record_offset * RECORD_BYTES;
        if mmap.len() as u64 != expected_bytes {
            bail!("Binary store has {} bytes, but the index describes {expected_bytes} bytes", mmap.len());
        }

        Ok(Self {
            slices, mmap
        })
    }

    /// Returns the index entries in store order
    pub fn chromosomes(&self) -> Vec<IndexEntry> {
        self.slices.iter()
            .map(|(chrom, slice)| IndexEntry::new(chrom.clone(), slice.record_count))
            .collect()
    }

    /// Returns the number of records stored for a chromosome, None if it is not in the store
    pub fn record_count(&self, chrom: &str) -> Option<u64> {
        self.slices.get(chrom).map(|s| s.record_count)
    }

    /// Returns the raw encoded record at a position.
    /// # Arguments
    /// * `chrom` - the chromosome
    /// * `position` - 1-based position
    /// # Errors
    /// * if the chromosome is not in the store
    /// * if the position is 0 or past the last stored position
    pub fn raw(&self, chrom: &str, position: u64) -> Result<u32, LookupError> {
        let slice = self.slices.get(chrom)
            .ok_or_else(|| LookupError::UnknownChromosome { chrom: chrom.to_string() })?;
        if position == 0 || position > slice.record_count {
            return Err(LookupError::PositionOutOfRange {
                chrom: chrom.to_string(),
                position,
                record_count: slice.record_count
            });
        }

        let start = ((slice.record_offset + position - 1) * RECORD_BYTES) as usize;
        Ok(LittleEndian::read_u32(&self.mmap[start..start + RECORD_BYTES as usize]))
    }

    /// Returns the decoded scores at a position; see [`ScoreStore::raw`] for errors.
    pub fn scores(&self, chrom: &str, position: u64) -> Result<ScoreQuad, LookupError> {
        Ok(decode(self.raw(chrom, position)?))
    }

    /// Returns the decoded score for a single alternate base.
    /// The reference base is never scored, so it returns 0.0.
    /// Positions that were padded also return 0.0 for every base.
    /// See [`ScoreStore::raw`] for errors.
    pub fn score(&self, chrom: &str, position: u64, alternate: Base) -> Result<f64, LookupError> {
        let quad = self.scores(chrom, position)?;
        Ok(quad.get(alternate).unwrap_or(0.0))
    }
}
