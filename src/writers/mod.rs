/*!
# Writers module
Contains the logic for writing the binary score store and the outputs of the lookup and to-vcf commands.
*/
/// Writes looked-up scores as a tab-delimited table
pub mod lookup_results;
/// Builds the binary store and its index from position groups
pub mod score_store;
/// Converts a score table into a sites-only VCF
pub mod score_vcf;
