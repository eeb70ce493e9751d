
use strum_macros::{AsRefStr, EnumIter, EnumString};

/// One of the four unambiguous nucleotides.
/// The discriminant is the slot index used in a [`ScoreQuad`](crate::data_types::score_quad::ScoreQuad) and in the low bits of an encoded record.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, AsRefStr, EnumIter, EnumString, serde::Serialize)]
pub enum Base {
    #[strum(ascii_case_insensitive)]
    A=0,
    #[strum(ascii_case_insensitive)]
    C,
    #[strum(ascii_case_insensitive)]
    G,
    #[strum(ascii_case_insensitive)]
    T
}

/// All bases in slot order
pub const ALL_BASES: [Base; 4] = [Base::A, Base::C, Base::G, Base::T];

impl Base {
    /// Returns the slot index for this base, range: [0, 3]
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Converts a slot index back into a base, None if out of range
    pub fn from_index(index: usize) -> Option<Base> {
        ALL_BASES.get(index).copied()
    }
}

impl std::fmt::Display for Base {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_ref())
    }
}
