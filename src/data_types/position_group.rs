
use crate::data_types::bases::Base;
use crate::data_types::score_quad::ScoreQuad;

/// Fatal problems with the rows grouped at a single position
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum GroupError {
    #[error("invalid input shape at {chrom}:{position} (reference {reference:?}): found {row_count} rows, expected 3")]
    InvalidInputShape { chrom: String, position: u64, reference: String, row_count: usize },
    #[error("unrecognized ambiguity code {reference:?} at {chrom}:{position} with {row_count} rows")]
    UnrecognizedAmbiguityCode { chrom: String, position: u64, reference: String, row_count: usize }
}

/// A single scored substitution from the input table
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScoreRow {
    /// The alternate base
    pub alternate: Base,
    /// Phred-like score for the substitution
    pub score: f64
}

/// All input rows that share a chromosome and position
#[derive(Clone, Debug, PartialEq)]
pub struct PositionGroup {
    /// Chromosome name
    chrom: String,
    /// Position, 1-based
    position: u64,
    /// Reference base, or an ambiguity code
    reference: String,
    /// The scored alternates in input order
    rows: Vec<ScoreRow>
}

impl PositionGroup {
    /// Constructor
    pub fn new(chrom: String, position: u64, reference: String, rows: Vec<ScoreRow>) -> Self {
        Self {
            chrom, position, reference, rows
        }
    }

    // getters
    pub fn chrom(&self) -> &str {
        &self.chrom
    }

    pub fn position(&self) -> u64 {
        self.position
    }

    pub fn reference(&self) -> &str {
        &self.reference
    }

    pub fn rows(&self) -> &[ScoreRow] {
        &self.rows
    }

    /// Returns true if this group needs an ambiguity code resolved before encoding
    pub fn is_ambiguous(&self) -> bool {
        self.rows.len() == 4
    }

    /// Converts the rows into a score quad.
    /// Groups of three are used directly.
    /// Groups of four only occur when the reference is an IUPAC code, and the A row is dropped for the two codes that include A (R = A/G, M = A/C).
    /// # Errors
    /// * if the row count is not 3 or 4
    /// * if a 4-row group has any other reference code
    /// * if a 4-row group with a recognized code has no A row to drop
    pub fn resolve_quad(&self) -> Result<ScoreQuad, GroupError> {
        match self.rows.len() {
            3 => Ok(ScoreQuad::from_pairs(self.rows.iter().map(|r| (r.alternate, r.score)))),
            4 => match self.reference.as_str() {
                "R" | "M" => {
                    if !self.rows.iter().any(|r| r.alternate == Base::A) {
                        return Err(self.shape_error());
                    }
                    Ok(ScoreQuad::from_pairs(
                        self.rows.iter()
                            .filter(|r| r.alternate != Base::A)
                            .map(|r| (r.alternate, r.score))
                    ))
                },
                _ => Err(GroupError::UnrecognizedAmbiguityCode {
                    chrom: self.chrom.clone(),
                    position: self.position,
                    reference: self.reference.clone(),
                    row_count: self.rows.len()
                })
            },
            _ => Err(self.shape_error())
        }
    }

    fn shape_error(&self) -> GroupError {
        GroupError::InvalidInputShape {
            chrom: self.chrom.clone(),
            position: self.position,
            reference: self.reference.clone(),
            row_count: self.rows.len()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(Base, f64)]) -> Vec<ScoreRow> {
        pairs.iter()
            .map(|&(alternate, score)| ScoreRow { alternate, score })
            .collect()
    }

    #[test]
    fn test_triple() {
        let group = PositionGroup::new(
            "1".to_string(), 1, "A".to_string(),
            rows(&[(Base::C, 10.0), (Base::G, 20.0), (Base::T, 30.0)])
        );
        assert!(!group.is_ambiguous());
        assert_eq!(group.resolve_quad().unwrap(), ScoreQuad::new(None, Some(10.0), Some(20.0), Some(30.0)));
    }

    #[test]
    fn test_ambiguity_drop() {
        for code in ["R", "M"] {
            let group = PositionGroup::new(
                "3".to_string(), 60830763, code.to_string(),
                rows(&[(Base::A, 0.45), (Base::C, 0.445), (Base::G, 0.478), (Base::T, 0.429)])
            );
            assert!(group.is_ambiguous());
            assert_eq!(group.resolve_quad().unwrap(), ScoreQuad::new(None, Some(0.445), Some(0.478), Some(0.429)));
        }
    }

    #[test]
    fn test_unrecognized_ambiguity() {
        let group = PositionGroup::new(
            "3".to_string(), 100, "Y".to_string(),
            rows(&[(Base::A, 1.0), (Base::C, 2.0), (Base::G, 3.0), (Base::T, 4.0)])
        );
        assert_eq!(group.resolve_quad(), Err(GroupError::UnrecognizedAmbiguityCode {
            chrom: "3".to_string(), position: 100, reference: "Y".to_string(), row_count: 4
        }));
    }

    #[test]
    fn test_ambiguity_without_a() {
        let group = PositionGroup::new(
            "3".to_string(), 100, "R".to_string(),
            rows(&[(Base::C, 1.0), (Base::C, 2.0), (Base::G, 3.0), (Base::T, 4.0)])
        );
        assert!(matches!(group.resolve_quad(), Err(GroupError::InvalidInputShape { row_count: 4, .. })));
    }

    #[test]
    fn test_invalid_shape() {
        let group = PositionGroup::new(
            "1".to_string(), 5, "A".to_string(),
            rows(&[(Base::C, 1.0), (Base::G, 2.0)])
        );
        assert_eq!(group.resolve_quad(), Err(GroupError::InvalidInputShape {
            chrom: "1".to_string(), position: 5, reference: "A".to_string(), row_count: 2
        }));

        let group = PositionGroup::new(
            "1".to_string(), 5, "A".to_string(),
            rows(&[(Base::C, 1.0), (Base::G, 2.0), (Base::T, 3.0), (Base::C, 4.0), (Base::G, 5.0)])
        );
        assert!(matches!(group.resolve_quad(), Err(GroupError::InvalidInputShape { row_count: 5, .. })));
    }
}
