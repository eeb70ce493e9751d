
use anyhow::{anyhow, bail, Context};
use csv::StringRecord;
use log::debug;
use std::io::{Read, Write};

/// Columns we need from the score table header, matched case-insensitively
const REQUIRED_COLUMNS: [&str; 6] = ["chrom", "pos", "ref", "alt", "rawscore", "phred"];

/// Column indices of the required fields, in [`REQUIRED_COLUMNS`] order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct ColumnLayout {
    indices: [usize; 6]
}

impl ColumnLayout {
    /// Builds the layout from a `#Chrom ...` header record
    fn from_header(header: &StringRecord) -> anyhow::Result<Self> {
        let names: Vec<String> = header.iter()
            .map(|h| h.trim_start_matches('#').trim().to_ascii_lowercase())
            .collect();

        let mut indices = [0; 6];
        for (slot, column) in REQUIRED_COLUMNS.iter().enumerate() {
            indices[slot] = names.iter()
                .position(|n| n == column)
                .ok_or(anyhow!("Missing column {column:?} in header: {header:?}"))?;
        }
        Ok(Self { indices })
    }

    fn field<'a>(&self, record: &'a StringRecord, slot: usize) -> anyhow::Result<&'a str> {
        record.get(self.indices[slot])
            .ok_or(anyhow!("Missing {:?} field in row: {record:?}", REQUIRED_COLUMNS[slot]))
    }
}

/// Builds the VCF header lines, carrying the score table comment along
fn vcf_header(comment: &str) -> String {
    format!("##fileformat=VCFv4.1
##INFO=<ID=raw,Number=1,Type=Float,Description=\"raw cadd score\">
##INFO=<ID=phred,Number=1,Type=Float,Description=\"phred-scaled cadd score\">
##CADDCOMMENT=<ID=comment,comment=\"{comment}\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
")
}

/// Converts a CADD score table into a sites-only VCF with `raw` and `phred` INFO fields.
/// The table starts with a free-text comment line, followed by a `#Chrom` header naming the columns.
/// Returns the number of variant records written.
/// # Arguments
/// * `reader` - the score table
/// * `writer` - destination for the VCF text
/// * `precision` - number of decimals kept for both scores
/// # Errors
/// * if the header is missing or lacks a required column
/// * if a score is not a number
/// * if writing fails
pub fn convert_to_vcf<R: Read, W: Write>(reader: R, writer: &mut W, precision: usize) -> anyhow::Result<u64> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(false)
        .quoting(false)
        .flexible(true)
        .from_reader(reader);

    let mut layout: Option<ColumnLayout> = None;
    let mut header_written = false;
    let mut records_written: u64 = 0;
    for (i, result) in csv_reader.records().enumerate() {
        let record = result.context("Error while reading score table")?;
        let first_field = record.get(0).unwrap_or_default();
        let is_header = first_field.to_ascii_lowercase().starts_with("#chrom");

        if i == 0 && !is_header {
            // the leading comment line, e.g. "## CADD v1.3 ..."
            let comment = record.iter().collect::<Vec<&str>>().join("\t");
            let comment = comment.trim_start_matches(['#', ' ']).trim();
            writer.write_all(vcf_header(comment).as_bytes())?;
            header_written = true;
            continue;
        }
        if !header_written {
            writer.write_all(vcf_header("").as_bytes())?;
            header_written = true;
        }
        if is_header {
            layout = Some(ColumnLayout::from_header(&record)?);
            debug!("Score table columns: {layout:?}");
            continue;
        }
        if first_field.starts_with('#') {
            continue;
        }

        let layout = match layout.as_ref() {
            Some(l) => l,
            None => bail!("Found data before the #Chrom header: {record:?}")
        };
        let rawscore: f64 = layout.field(&record, 4)?.parse()
            .with_context(|| format!("Invalid raw score in row: {record:?}"))?;
        let phred: f64 = layout.field(&record, 5)?.parse()
            .with_context(|| format!("Invalid phred score in row: {record:?}"))?;
        writeln!(
            writer,
            "{}\t{}\t.\t{}\t{}\t1\tPASS\traw={:.*};phred={:.*}",
            layout.field(&record, 0)?,
            layout.field(&record, 1)?,
            layout.field(&record, 2)?,
            layout.field(&record, 3)?,
            precision, rawscore,
            precision, phred
        )?;
        records_written += 1;
    }

    writer.flush()?;
    Ok(records_written)
}
