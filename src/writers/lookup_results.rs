
use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::data_types::bases::Base;
use crate::parsing::lookup_queries::LookupQuery;
use crate::parsing::store_reader::LookupError;
use crate::util::text_io::create_output;

/// Writes scored queries as a tab-delimited table with a header
pub struct LookupResultWriter<W: Write> {
    /// Handle on the writer
    csv_writer: csv::Writer<W>
}

/// Contains all the data written to each row of the output
#[derive(Serialize)]
struct LookupResultRow<'a> {
    chrom: &'a str,
    pos: u64,
    alt: Base,
    /// Empty when the lookup failed
    score: Option<String>
}

impl LookupResultWriter<Box<dyn Write>> {
    /// Creates the output file; see [`create_output`] for supported outputs.
    /// # Arguments
    /// * `filename` - path to the output, "-" for stdout
    pub fn new(filename: &Path) -> anyhow::Result<Self> {
        let writer: Box<dyn Write> = Box::new(create_output(filename)?);
        Ok(Self::from_writer(writer))
    }
}

impl<W: Write> LookupResultWriter<W> {
    /// Wraps any writer
    pub fn from_writer(writer: W) -> Self {
        let csv_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .from_writer(writer);
        Self {
            csv_writer
        }
    }

    /// Writes one query and its score, which is left empty if the lookup failed
    /// # Arguments
    /// * `query` - the variant that was looked up
    /// * `result` - the decoded score or the lookup error
    pub fn write_result(&mut self, query: &LookupQuery, result: &Result<f64, LookupError>) -> csv::Result<()> {
        let row = LookupResultRow {
            chrom: &query.chrom,
            pos: query.position,
            alt: query.alternate,
            score: result.as_ref().ok().map(|s| format!("{s:.3}"))
        };
        self.csv_writer.serialize(&row)
    }

    /// Flushes everything to the underlying writer
    pub fn finish(mut self) -> std::io::Result<()> {
        self.csv_writer.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_results() {
        let mut output: Vec<u8> = vec![];
        {
            let mut writer = LookupResultWriter::from_writer(&mut output);
            let query = LookupQuery { chrom: "1".to_string(), position: 3, alternate: Base::C };
            writer.write_result(&query, &Ok(15.0488758553)).unwrap();
            let query = LookupQuery { chrom: "9".to_string(), position: 1, alternate: Base::A };
            writer.write_result(&query, &Err(LookupError::UnknownChromosome { chrom: "9".to_string() })).unwrap();
            writer.finish().unwrap();
        }
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "chrom\tpos\talt\tscore\n1\t3\tC\t15.049\n9\t1\tA\t\n"
        );
    }
}
