
use anyhow::{anyhow, Context};
use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use crate::data_types::bases::Base;
use crate::parsing::score_table::table_reader_builder;
use crate::util::text_io::open_input;

/// A single variant to score against the store
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LookupQuery {
    /// Chromosome name
    pub chrom: String,
    /// Position, 1-based
    pub position: u64,
    /// Alternate base to score
    pub alternate: Base
}

/// Parses queries from a tab-delimited table with chromosome, position, and alternate base columns.
/// Extra columns are ignored and `#` lines are skipped.
/// # Arguments
/// * `reader` - the query table
/// # Errors
/// * if a row has fewer than three fields or a field fails to parse
pub fn read_queries<R: Read>(reader: R) -> anyhow::Result<Vec<LookupQuery>> {
    let mut csv_reader = table_reader_builder().from_reader(reader);
    let mut queries = vec![];
    for result in csv_reader.records() {
        let row = result.context("Error while reading queries")?;
        let chrom = row.get(0).ok_or(anyhow!("Missing chromosome on row: {row:?}"))?;
        let position: u64 = row.get(1).ok_or(anyhow!("Missing position on row: {row:?}"))?
            .parse()
            .with_context(|| format!("Invalid position on row: {row:?}"))?;
        let alternate = row.get(2).ok_or(anyhow!("Missing alternate on row: {row:?}"))?;
        let alternate = Base::from_str(alternate)
            .map_err(|_e| anyhow!("Invalid alternate base on row: {row:?}"))?;
        queries.push(LookupQuery {
            chrom: chrom.to_string(),
            position,
            alternate
        });
    }
    Ok(queries)
}

/// Loads all queries from a file, see [`read_queries`].
/// # Arguments
/// * `filename` - the query table, "-" for stdin
pub fn load_queries(filename: &Path) -> anyhow::Result<Vec<LookupQuery>> {
    let reader = open_input(filename)?;
    read_queries(reader)
        .with_context(|| format!("Error while loading {filename:?}:"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_queries() {
        let table = "#chrom\tpos\talt\n1\t3\tc\n2\t10\tT\textra\n";
        let queries = read_queries(table.as_bytes()).unwrap();
        assert_eq!(queries, vec![
            LookupQuery { chrom: "1".to_string(), position: 3, alternate: Base::C },
            LookupQuery { chrom: "2".to_string(), position: 10, alternate: Base::T },
        ]);
    }

    #[test]
    fn test_bad_queries() {
        assert!(read_queries("1\t3\n".as_bytes()).is_err());
        assert!(read_queries("1\tx\tA\n".as_bytes()).is_err());
        assert!(read_queries("1\t3\tN\n".as_bytes()).is_err());
    }
}
