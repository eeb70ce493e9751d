
/// The four nucleotides a score can be assigned to
pub mod bases;
/// Index entries describing one chromosome in the binary store
pub mod index_entry;
/// All input rows for a single position, and how they resolve into scores
pub mod position_group;
/// Up to four per-base scores for a single position
pub mod score_quad;
