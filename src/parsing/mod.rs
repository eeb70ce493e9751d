/*!
# Parsing module
Contains the logic for parsing score tables, query files, and the binary score store.
*/
/// Loads variants to score from a tab-delimited query file
pub mod lookup_queries;
/// Streaming check that a table is sorted by chromosome and position
pub mod order_check;
/// Streaming reader that groups score table rows by position
pub mod score_table;
/// Memory-mapped reader for the binary score store
pub mod store_reader;
