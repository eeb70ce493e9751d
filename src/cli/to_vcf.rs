
use anyhow::ensure;
use clap::Args;
use log::info;
use serde::Serialize;
use std::path::PathBuf;

use crate::cli::core::{check_input_filename, check_output_parent, AFTER_HELP, FULL_VERSION};

#[derive(Args, Clone, Default, Serialize)]
#[clap(author, about,
    after_help = &**AFTER_HELP
)]
pub struct ToVcfSettings {
    #[clap(default_value = "")]
    #[clap(hide = true)]
    caddpack_version: String,

    /// CADD score table with a #Chrom header (TSV, optionally gzipped); use "-" for stdin
    #[clap(required = true)]
    #[clap(short = 'i')]
    #[clap(long = "input")]
    #[clap(value_name = "TSV")]
    #[clap(help_heading = Some("Input/Output"))]
    pub input_filename: PathBuf,

    /// Output VCF, gzipped if it ends in .gz; use "-" for stdout
    #[clap(short = 'o')]
    #[clap(long = "output")]
    #[clap(value_name = "VCF")]
    #[clap(help_heading = Some("Input/Output"))]
    #[clap(default_value = "-")]
    pub output_filename: PathBuf,

    /// Number of decimals kept for the raw and phred scores
    #[clap(long = "precision")]
    #[clap(value_name = "DIGITS")]
    #[clap(help_heading = Some("Conversion parameters"))]
    #[clap(default_value = "1")]
    pub precision: usize,

    /// Enable verbose output.
    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = clap::ArgAction::Count)]
    pub verbosity: u8,
}

pub fn check_to_vcf_settings(mut settings: ToVcfSettings) -> anyhow::Result<ToVcfSettings> {
    // hard code the version in
    settings.caddpack_version = FULL_VERSION.clone();
    info!("caddpack version: {:?}", &settings.caddpack_version);
    info!("Sub-command: to-vcf");
    info!("Inputs:");

    check_input_filename(&settings.input_filename, "Score table")?;
    info!("\tScore table: {:?}", &settings.input_filename);

    info!("Outputs:");
    check_output_parent(&settings.output_filename, "Output VCF")?;
    info!("\tVCF: {:?}", &settings.output_filename);

    info!("Conversion parameters:");
    ensure!(settings.precision <= 10, "--precision must be <=10");
    info!("\tPrecision: {}", settings.precision);

    Ok(settings)
}
