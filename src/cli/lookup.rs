
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_input_filename, check_output_parent, check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::store_reader::bin_path_from_index;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct LookupSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    caddpack_version: String,

    /// Store index file; the matching .bin must be next to it
    #[clap(required = true)]
    #[clap(short = 's')]
    #[clap(long = "store")]
    #[clap(value_name = "IDX")]
    #[clap(help_heading = Some("Input/Output"))]
    pub store_index: PathBuf,

    /// Variants to score (TSV: chrom, pos, alt); use "-" for stdin
    #[clap(required = true)]
    #[clap(short = 'q')]
    #[clap(long = "queries")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub query_filename: PathBuf,

    /// Output scores (TSV, optionally gzipped); use "-" for stdout
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "-")]
    pub output_filename: PathBuf,

    /// Number of threads to use for lookups
    #[clap(long = "threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    pub threads: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_lookup_settings(mut settings: LookupSettings) -> anyhow::Result<LookupSettings> {
    // hard code the version in
    settings.caddpack_version = FULL_VERSION.clone();
    info!("caddpack version: {:?}", &settings.caddpack_version);
    info!("Sub-command: lookup");
    info!("Inputs:");

    check_required_filename(&settings.store_index, "Store index")?;
    info!("\tStore index: {:?}", &settings.store_index);
    let bin_fn = bin_path_from_index(&settings.store_index);
    check_required_filename(&bin_fn, "Binary store")?;
    info!("\tBinary store: {bin_fn:?}");
    check_input_filename(&settings.query_filename, "Queries")?;
    info!("\tQueries: {:?}", &settings.query_filename);

    info!("Outputs:");
    check_output_parent(&settings.output_filename, "Output")?;
    info!("\tScores: {:?}", &settings.output_filename);

    if settings.threads == 0 {
        settings.threads = 1;
    }
    info!("Processing threads: {}", settings.threads);

    Ok(settings)
}
