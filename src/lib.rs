
/// Command line interface functionality
pub mod cli;
/// Packs per-base scores into a single 32-bit record and back
pub mod codec;
/// Contains various shared data types
pub mod data_types;
/// Tooling for parsing input files into meaningful structs / data
pub mod parsing;
/// Various utility functions that tend to be very generic
pub mod util;
/// Checks a built store against its source table
pub mod verify;
/// All output writers
pub mod writers;
