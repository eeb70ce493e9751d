
use serde::Serialize;

/// Number of bytes used by each encoded record in the binary store
pub const RECORD_BYTES: u64 = 4;

/// One line of the store index, describing the slice of the binary file that belongs to a chromosome
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct IndexEntry {
    /// Chromosome name
    pub chrom: String,
    /// Number of records, which is also the last position stored for this chromosome
    pub record_count: u64
}

impl IndexEntry {
    /// Constructor
    pub fn new(chrom: String, record_count: u64) -> Self {
        Self {
            chrom, record_count
        }
    }

    /// Length of this chromosome's slice in the binary file
    pub fn byte_length(&self) -> u64 {
        self.record_count * RECORD_BYTES
    }

    /// Formats the entry as a line of the index file, including the newline
    pub fn to_index_line(&self) -> String {
        format!("{}\t{}\n", self.chrom, self.record_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_entry() {
        let entry = IndexEntry::new("chr1".to_string(), 3);
        assert_eq!(entry.byte_length(), 12);
        assert_eq!(entry.to_index_line(), "chr1\t3\n");
    }
}
