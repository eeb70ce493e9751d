
use crate::data_types::bases::{Base, ALL_BASES};

/// The scores for all four possible alternate bases at one genomic position.
/// In a well-formed quad exactly one slot is empty, which is the reference base (it is never scored against itself).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreQuad {
    /// Scores in A, C, G, T order
    scores: [Option<f64>; 4]
}

impl ScoreQuad {
    /// Constructor
    /// # Arguments
    /// * `a` - score for an A alternate, None if A is the reference
    /// * `c` - score for a C alternate, None if C is the reference
    /// * `g` - score for a G alternate, None if G is the reference
    /// * `t` - score for a T alternate, None if T is the reference
    pub fn new(a: Option<f64>, c: Option<f64>, g: Option<f64>, t: Option<f64>) -> Self {
        Self {
            scores: [a, c, g, t]
        }
    }

    /// Builds a quad from (base, score) pairs; any base that is not provided stays empty.
    /// If a base is provided more than once, the last score wins.
    /// # Arguments
    /// * `pairs` - the observed alternate bases and their scores
    pub fn from_pairs<I: IntoIterator<Item = (Base, f64)>>(pairs: I) -> Self {
        let mut scores = [None; 4];
        for (base, score) in pairs {
            scores[base.index()] = Some(score);
        }
        Self { scores }
    }

    /// The record used to pad positions without any data: A is the reference and every other base scores 0.0.
    pub fn sentinel() -> Self {
        Self::new(None, Some(0.0), Some(0.0), Some(0.0))
    }

    /// Returns the score for a given base
    pub fn get(&self, base: Base) -> Option<f64> {
        self.scores[base.index()]
    }

    /// Returns the raw slots in A, C, G, T order
    pub fn scores(&self) -> &[Option<f64>; 4] {
        &self.scores
    }

    /// Returns the number of empty slots, which is 1 for a well-formed quad
    pub fn missing_count(&self) -> usize {
        self.scores.iter().filter(|s| s.is_none()).count()
    }

    /// Returns the base for the first empty slot, if any
    pub fn missing_base(&self) -> Option<Base> {
        ALL_BASES.into_iter()
            .find(|b| self.scores[b.index()].is_none())
    }

    /// Iterates over the filled slots in A, C, G, T order
    pub fn present(&self) -> impl Iterator<Item = (Base, f64)> + '_ {
        ALL_BASES.into_iter()
            .filter_map(|b| self.scores[b.index()].map(|s| (b, s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_pairs() {
        let quad = ScoreQuad::from_pairs([(Base::T, 30.0), (Base::C, 10.0), (Base::G, 20.0)]);
        assert_eq!(quad, ScoreQuad::new(None, Some(10.0), Some(20.0), Some(30.0)));
        assert_eq!(quad.missing_count(), 1);
        assert_eq!(quad.missing_base(), Some(Base::A));
        assert_eq!(quad.get(Base::G), Some(20.0));
        assert_eq!(
            quad.present().collect::<Vec<_>>(),
            vec![(Base::C, 10.0), (Base::G, 20.0), (Base::T, 30.0)]
        );
    }

    #[test]
    fn test_duplicate_pairs() {
        // a duplicate alternate leaves two slots empty
        let quad = ScoreQuad::from_pairs([(Base::A, 1.0), (Base::A, 2.0), (Base::G, 3.0)]);
        assert_eq!(quad.get(Base::A), Some(2.0));
        assert_eq!(quad.missing_count(), 2);
        assert_eq!(quad.missing_base(), Some(Base::C));
    }

    #[test]
    fn test_sentinel() {
        let sentinel = ScoreQuad::sentinel();
        assert_eq!(sentinel.missing_base(), Some(Base::A));
        assert_eq!(sentinel.present().map(|(_b, s)| s).sum::<f64>(), 0.0);
    }
}
