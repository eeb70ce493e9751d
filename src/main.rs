
use indicatif::{ParallelProgressIterator, ProgressBar};
use log::{LevelFilter, debug, error, info, warn};
use rayon::prelude::*;
use std::time::Instant;

use caddpack::cli::check_order::{CheckOrderSettings, check_check_order_settings};
use caddpack::cli::core::{Commands, get_cli};
use caddpack::cli::encode::{EncodeSettings, check_encode_settings};
use caddpack::cli::lookup::{LookupSettings, check_lookup_settings};
use caddpack::cli::to_vcf::{ToVcfSettings, check_to_vcf_settings};
use caddpack::cli::verify::{VerifySettings, check_verify_settings};
use caddpack::parsing::lookup_queries::load_queries;
use caddpack::parsing::order_check::{OrderError, check_sort_order};
use caddpack::parsing::score_table::ScoreTableReader;
use caddpack::parsing::store_reader::ScoreStore;
use caddpack::util::json_io::save_json;
use caddpack::util::progress_bar::{get_progress_style, get_spinner_style};
use caddpack::util::text_io::{create_output, open_input};
use caddpack::verify::{VerifyConfigBuilder, verify_store};
use caddpack::writers::lookup_results::LookupResultWriter;
use caddpack::writers::score_store::{StoreError, StoreWriter, encode_score_table};
use caddpack::writers::score_vcf::convert_to_vcf;

/// Sets up logging before we check the other settings
fn init_logging(verbosity: u8) {
    let filter_level: LevelFilter = match verbosity {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace
    };
    env_logger::builder()
        .format_timestamp_millis()
        .filter_level(filter_level)
        .init();
}

/// Picks the exit code for a failed store build; only write failures are I/O errors
fn encode_exit_code(e: &anyhow::Error) -> i32 {
    match e.downcast_ref::<StoreError>() {
        Some(StoreError::Io(_)) => exitcode::IOERR,
        _ => exitcode::DATAERR
    }
}

fn run_encode(settings: EncodeSettings) {
    // start the timer
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_encode_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    info!("Opening score table...");
    let mut table_reader = match ScoreTableReader::from_path(&settings.input_filename) {
        Ok(tr) => tr,
        Err(e) => {
            error!("Error while opening score table: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Creating score store at {:?}...", settings.output_prefix);
    let store_writer = match StoreWriter::from_prefix(&settings.output_prefix) {
        Ok(sw) => sw,
        Err(e) => {
            error!("Error while creating score store: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Encoding positions...");
    let progress = ProgressBar::new_spinner()
        .with_style(get_spinner_style())
        .with_message("positions");
    let summary = match encode_score_table(&mut table_reader, store_writer, &progress) {
        Ok(s) => s,
        Err(e) => {
            progress.abandon();
            error!("Error while encoding score table at row {}: {e:#}", table_reader.rows_read());
            std::process::exit(encode_exit_code(&e));
        }
    };
    progress.finish();

    for entry in summary.chromosomes.iter() {
        debug!("\t{}: {} records", entry.chrom, entry.record_count);
    }
    info!("Chromosomes written: {}", summary.chromosomes.len());
    info!("Total records: {}", summary.total_records);
    info!("Scored positions: {}", summary.scored_positions);
    info!("Ambiguous positions: {}", summary.ambiguous_positions);
    info!("Gaps: {} spanning {} positions", summary.gap_spans, summary.gap_positions);

    if let Some(summary_fn) = settings.output_summary_filename.as_deref() {
        info!("Saving build summary to {summary_fn:?}...");
        if let Err(e) = save_json(&summary, summary_fn) {
            error!("Error while saving build summary: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }

    info!("Encode completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_lookup(settings: LookupSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_lookup_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    // set up the number of threads for rayon
    match rayon::ThreadPoolBuilder::new().num_threads(settings.threads).build_global() {
        Ok(()) => {},
        Err(e) => {
            error!("Error while building thread pool: {e}");
            std::process::exit(exitcode::OSERR);
        }
    };

    info!("Loading score store...");
    let store = match ScoreStore::open(&settings.store_index) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading score store: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    debug!("Store chromosomes: {:?}", store.chromosomes());

    info!("Loading queries...");
    let queries = match load_queries(&settings.query_filename) {
        Ok(q) => q,
        Err(e) => {
            error!("Error while loading queries: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    info!("Loaded {} queries.", queries.len());

    info!("Scoring queries...");
    let results: Vec<_> = queries.par_iter()
        .map(|q| store.score(&q.chrom, q.position, q.alternate))
        .progress_with_style(get_progress_style())
        .collect();

    info!("Saving scores to {:?}...", settings.output_filename);
    let mut result_writer = match LookupResultWriter::new(&settings.output_filename) {
        Ok(w) => w,
        Err(e) => {
            error!("Error while creating output: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    let mut failed: u64 = 0;
    for (query, result) in queries.iter().zip(results.iter()) {
        if let Err(e) = result {
            failed += 1;
            debug!("Failed lookup for {}:{} {}: {e}", query.chrom, query.position, query.alternate);
        }
        if let Err(e) = result_writer.write_result(query, result) {
            error!("Error while writing scores: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    }
    if let Err(e) = result_writer.finish() {
        error!("Error while writing scores: {e:#}");
        std::process::exit(exitcode::IOERR);
    }

    if failed > 0 {
        warn!("{failed} / {} queries could not be scored, their scores are left empty.", queries.len());
    }
    info!("Lookup completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_verify(settings: VerifySettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_verify_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let config = match VerifyConfigBuilder::default()
        .tolerance(settings.tolerance)
        .step(settings.step)
        .max_reported(settings.max_reported)
        .build() {
        Ok(c) => c,
        Err(e) => {
            error!("Error while building verify config: {e:#}");
            std::process::exit(exitcode::SOFTWARE);
        }
    };

    info!("Loading score store...");
    let store = match ScoreStore::open(&settings.store_index) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while loading score store: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Opening score table...");
    let table_reader = match ScoreTableReader::from_path(&settings.input_filename) {
        Ok(tr) => tr,
        Err(e) => {
            error!("Error while opening score table: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Comparing score table against the store...");
    let summary = match verify_store(table_reader, &store, config) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying score store: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };

    info!("Positions seen: {}", summary.positions_seen);
    info!("Positions checked: {}", summary.positions_checked);
    info!("Scores checked: {}", summary.scores_checked);
    info!("Maximum absolute error: {:.4}", summary.max_abs_error);
    if !summary.is_success() {
        error!("Found {} mismatched positions.", summary.mismatches);
        std::process::exit(exitcode::DATAERR);
    }

    info!("Verify completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_check_order(settings: CheckOrderSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_check_order_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let reader = match open_input(&settings.input_filename) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while opening table: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Checking sort order...");
    match check_sort_order(reader) {
        Ok(report) => {
            info!("Rows checked: {}", report.rows);
            info!("Chromosomes: {}", report.chromosomes);
        },
        Err(e) => {
            error!("{e:#}");
            let code = if e.downcast_ref::<OrderError>().is_some() {
                exitcode::DATAERR
            } else {
                exitcode::IOERR
            };
            std::process::exit(code);
        }
    };

    info!("Check-order completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn run_to_vcf(settings: ToVcfSettings) {
    let start_time = Instant::now();
    init_logging(settings.verbosity);

    let settings = match check_to_vcf_settings(settings) {
        Ok(s) => s,
        Err(e) => {
            error!("Error while verifying settings: {e:#}");
            std::process::exit(exitcode::CONFIG);
        }
    };

    let reader = match open_input(&settings.input_filename) {
        Ok(r) => r,
        Err(e) => {
            error!("Error while opening score table: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };
    let mut writer = match create_output(&settings.output_filename) {
        Ok(w) => w,
        Err(e) => {
            error!("Error while creating output: {e:#}");
            std::process::exit(exitcode::IOERR);
        }
    };

    info!("Converting score table to VCF...");
    let records_written = match convert_to_vcf(reader, &mut writer, settings.precision) {
        Ok(c) => c,
        Err(e) => {
            error!("Error while converting to VCF: {e:#}");
            std::process::exit(exitcode::DATAERR);
        }
    };
    // finalizes any compression
    drop(writer);

    info!("Records written: {records_written}");
    info!("To-vcf completed in {} seconds.", start_time.elapsed().as_secs_f64());
}

fn main() {
    let cli = get_cli();
    match cli.command {
        Commands::Encode(settings) => {
            run_encode(*settings);
        },
        Commands::Lookup(settings) => {
            run_lookup(*settings);
        },
        Commands::Verify(settings) => {
            run_verify(*settings);
        },
        Commands::CheckOrder(settings) => {
            run_check_order(*settings);
        },
        Commands::ToVcf(settings) => {
            run_to_vcf(*settings);
        }
    }

    info!("Process finished successfully.");
}
