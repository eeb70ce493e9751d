
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_input_filename, check_required_filename, AFTER_HELP, FULL_VERSION};
use crate::parsing::store_reader::bin_path_from_index;

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct VerifySettings {
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

    /// The score table used to build the store; use "-" for stdin
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Maximum allowed difference between a table score and its decoded value
    #[clap(long = "tolerance")]
    #[clap(value_name = "FLOAT")]
    #[clap(help_heading = Some("Verify parameters"))]
    #[clap(default_value = "0.05")]
    pub tolerance: f64,

    /// Only check every Nth position
    #[clap(long = "step")]
    #[clap(value_name = "N")]
    #[clap(help_heading = Some("Verify parameters"))]
    #[clap(default_value = "1")]
    pub step: u64,

    /// Maximum number of mismatches to report individually
    #[clap(long = "max-reported")]
    #[clap(value_name = "N")]
    #[clap(help_heading = Some("Verify parameters"))]
    #[clap(default_value = "10")]
    pub max_reported: u64,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_verify_settings(mut settings: VerifySettings) -> anyhow::Result<VerifySettings> {
    // hard code the version in
    settings.caddpack_version = FULL_VERSION.clone();
    info!("caddpack version: {:?}", &settings.caddpack_version);
    info!("Sub-command: verify");
    info!("Inputs:");

    check_required_filename(&settings.store_index, "Store index")?;
    info!("\tStore index: {:?}", &settings.store_index);
    let bin_fn = bin_path_from_index(&settings.store_index);
    check_required_filename(&bin_fn, "Binary store")?;
    info!("\tBinary store: {bin_fn:?}");
    check_input_filename(&settings.input_filename, "Score table")?;
    info!("\tScore table: {:?}", &settings.input_filename);

    info!("Verify parameters:");
    ensure!(settings.tolerance >= 0.0, "--tolerance must be >=0");
    info!("\tTolerance: {}", settings.tolerance);
    ensure!(settings.step > 0, "--step must be >0");
    info!("\tStep: {}", settings.step);
    info!("\tMax reported: {}", settings.max_reported);

    Ok(settings)
}
