
use anyhow::Context;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Returns true if the path is the "-" placeholder for stdin/stdout
pub fn is_std_stream(filename: &Path) -> bool {
    filename.as_os_str() == "-"
}

/// Returns true if the path has a .gz extension
pub fn is_gzipped(filename: &Path) -> bool {
    filename.extension().unwrap_or_default() == "gz"
}

/// Opens a text input for streaming.
/// Paths ending in .gz are decompressed, which includes bgzip files since they are multi-member gzip.
/// # Arguments
/// * `filename` - the file path to open, or "-" for stdin
/// # Errors
/// * if the file does not open properly
pub fn open_input(filename: &Path) -> anyhow::Result<Box<dyn Read>> {
    if is_std_stream(filename) {
        return Ok(Box::new(BufReader::new(std::io::stdin())));
    }

    let file = File::open(filename)
        .with_context(|| format!("Error while opening {filename:?}:"))?;
    let reader: Box<dyn Read> = if is_gzipped(filename) {
        Box::new(flate2::read::MultiGzDecoder::new(BufReader::new(file)))
    } else {
        Box::new(BufReader::new(file))
    };
    Ok(reader)
}

/// Creates a buffered text output.
/// Paths ending in .gz are gzip compressed with the default level.
/// # Arguments
/// * `filename` - the file path to create, or "-" for stdout
/// # Errors
/// * if the file cannot be created
pub fn create_output(filename: &Path) -> anyhow::Result<BufWriter<Box<dyn Write>>> {
    let writer: Box<dyn Write> = if is_std_stream(filename) {
        Box::new(std::io::stdout())
    } else {
        let file = File::create(filename)
            .with_context(|| format!("Error while creating {filename:?}:"))?;
        if is_gzipped(filename) {
            Box::new(flate2::write::GzEncoder::new(file, flate2::Compression::default()))
        } else {
            Box::new(file)
        }
    };
    Ok(BufWriter::new(writer))
}
