/*!
# CLI module
Command line interface functionality that is specific to caddpack.
*/

/// The check-order CLI subcommand
pub mod check_order;
/// The main CLI module that contains the top-level CLI parser and help text
pub mod core;
/// The encode CLI subcommand
pub mod encode;
/// The lookup CLI subcommand
pub mod lookup;
/// The to-vcf CLI subcommand
pub mod to_vcf;
/// The verify CLI subcommand
pub mod verify;
