
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_input_filename, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct CheckOrderSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    caddpack_version: String,

    /// Table to check (TSV, optionally gzipped); use "-" for stdin
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_check_order_settings(mut settings: CheckOrderSettings) -> anyhow::Result<CheckOrderSettings> {
    // hard code the version in
    settings.caddpack_version = FULL_VERSION.clone();
    info!("caddpack version: {:?}", &settings.caddpack_version);
    info!("Sub-command: check-order");
    info!("Inputs:");

    check_input_filename(&settings.input_filename, "Table")?;
    info!("\tTable: {:?}", &settings.input_filename);

    Ok(settings)
}
