
use anyhow::bail;
use clap::{Parser, Subcommand};
use chrono::Datelike;
use lazy_static::lazy_static;
use std::path::Path;

use crate::cli::check_order::CheckOrderSettings;
use crate::cli::encode::EncodeSettings;
use crate::cli::lookup::LookupSettings;
use crate::cli::to_vcf::ToVcfSettings;
use crate::cli::verify::VerifySettings;
use crate::util::text_io::is_std_stream;

lazy_static! {
    /// Stores the full version string we plan to use, which is generated in build.rs
    /// # Examples
    /// * `0.3.1-6bb9635-dirty` - while on a dirty branch
    /// * `0.3.1-6bb9635` - with a fresh commit
    pub static ref FULL_VERSION: String = format!("{}-{}", env!("CARGO_PKG_VERSION"), env!("VERGEN_GIT_DESCRIBE"));

    /// Shared after help string containing the legalese.
    pub static ref AFTER_HELP: String = format!("Copyright (C) 2024-{}     caddpack developers
This program comes with ABSOLUTELY NO WARRANTY; CADD scores are
freely available for non-commercial applications only.", chrono::Utc::now().year());
}

#[derive(Parser)]
#[clap(author,
    version = &**FULL_VERSION,
    about,
    after_help = &**AFTER_HELP)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands
}

/// caddpack, compact storage and lookup for genome-wide CADD scores.
/// Select a subcommand to see more usage information:
#[derive(Subcommand)]
pub enum Commands {
    /// Builds the binary score store from a sorted CADD score table
    Encode(Box<EncodeSettings>),
    /// Scores a batch of variants against a binary score store
    Lookup(Box<LookupSettings>),
    /// Checks a binary score store against the score table it was built from
    Verify(Box<VerifySettings>),
    /// Checks that a score table is sorted by chromosome and position
    CheckOrder(Box<CheckOrderSettings>),
    /// Converts a CADD score table into a sites-only VCF
    ToVcf(Box<ToVcfSettings>)
}

pub fn get_cli() -> Cli {
    Cli::parse()
}

/// Checks if a file exists and will otherwise exit
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_required_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if !filename.exists() {
        bail!("{} does not exist: \"{}\"", label, filename.display());
    }

    // file exists
    Ok(())
}

/// Same as [`check_required_filename`], but "-" is accepted as stdin
/// # Arguments
/// * `filename` - the file path to check for
/// * `label` - the label to use for error messages
pub fn check_input_filename(filename: &Path, label: &str) -> anyhow::Result<()> {
    if is_std_stream(filename) {
        return Ok(());
    }
    check_required_filename(filename, label)
}

/// Checks that the folder an output will be written to exists
/// # Arguments
/// * `filename` - the output file path
/// * `label` - the label to use for error messages
pub fn check_output_parent(filename: &Path, label: &str) -> anyhow::Result<()> {
    if is_std_stream(filename) {
        return Ok(());
    }
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            bail!("{} folder does not exist: \"{}\"", label, parent.display());
        }
    }
    Ok(())
}
