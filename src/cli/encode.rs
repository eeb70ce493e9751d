
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_input_filename, check_output_parent, AFTER_HELP, FULL_VERSION};
use crate::writers::score_store::store_paths;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct EncodeSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    caddpack_version: String,

    /// Sorted CADD score table (TSV, optionally gzipped); use "-" for stdin
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Output prefix; creates <PREFIX>.bin and <PREFIX>.idx
    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(value_name = "PREFIX")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_prefix: PathBuf,

    /// Optional output summary of the build (JSON)
    #[clap(long = "output-summary")]
    #[clap(value_name = "JSON")]
    #[clap(help_heading = Some("Input/Output"))]
    pub output_summary_filename: Option<PathBuf>,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_encode_settings(mut settings: EncodeSettings) -> anyhow::Result<EncodeSettings> {
    // hard code the version in
    settings.caddpack_version = FULL_VERSION.clone();
    info!("caddpack version: {:?}", &settings.caddpack_version);
    info!("Sub-command: encode");
    info!("Inputs:");

    check_input_filename(&settings.input_filename, "Score table")?;
    info!("\tScore table: {:?}", &settings.input_filename);

    // outputs
    info!("Outputs:");
    check_output_parent(&settings.output_prefix, "Output prefix")?;
    let (bin_fn, idx_fn) = store_paths(&settings.output_prefix);
    info!("\tBinary store: {bin_fn:?}");
    info!("\tStore index: {idx_fn:?}");
    if let Some(summary_fn) = settings.output_summary_filename.as_deref() {
        check_output_parent(summary_fn, "Output summary")?;
        info!("\tSummary: {summary_fn:?}");
    }

    Ok(settings)
}
