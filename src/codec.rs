/*!
# Score codec
Packs the three scored alternates at a position into a single `u32`.
The two lowest bits store the slot of the reference (missing) base, followed by three 10-bit fields holding each remaining score multiplied by [`SCALE_FACTOR`] and rounded.
Scores are expected in [0, 100), which keeps every field at or below 1023.

# Example usage
```rust
use caddpack::codec::{decode, encode};
use caddpack::data_types::bases::Base;
use caddpack::data_types::score_quad::ScoreQuad;

let quad = ScoreQuad::new(Some(5.0), Some(15.0), None, Some(25.0));
let encoded = encode(&quad).unwrap();
assert_eq!(encoded & 0b11, 2); // G is the reference

let decoded = decode(encoded);
assert_eq!(decoded.missing_base(), Some(Base::G));
assert!((decoded.get(Base::C).unwrap() - 15.0).abs() < 0.05);
```
*/
use itertools::Itertools;

use crate::data_types::score_quad::ScoreQuad;

/// Maps the score domain [0, 100] onto the 10-bit range [0, 1023]
pub const SCALE_FACTOR: f64 = 10.23;
/// Mask for a single 10-bit score field
pub const FIELD_MASK: u32 = 0x3FF;
/// Mask for the missing base slot
pub const MISSING_MASK: u32 = 0b11;
/// Bit offsets of the three score fields
pub const FIELD_SHIFTS: [u32; 3] = [2, 12, 22];
/// Encoded value of [`ScoreQuad::sentinel`], i.e. A missing and all other scores 0.0
pub const SENTINEL: u32 = 0;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum CodecError {
    #[error("score quad must have exactly one missing base, found {count}")]
    InvalidMissingCount { count: usize }
}

/// Quantizes a single score into its 10-bit field value
fn quantize(score: f64) -> u32 {
    debug_assert!(
        (0.0..=(FIELD_MASK as f64 + 0.5) / SCALE_FACTOR).contains(&score),
        "score {score} does not fit in a 10-bit field"
    );
    (score * SCALE_FACTOR).round() as u32
}

/// Packs a score quad into a single encoded record.
/// # Arguments
/// * `quad` - the scores at a position, the reference base must be the only empty slot
/// # Errors
/// * if the quad does not have exactly one empty slot
pub fn encode(quad: &ScoreQuad) -> Result<u32, CodecError> {
    let count = quad.missing_count();
    let missing = match quad.missing_base() {
        Some(base) if count == 1 => base,
        _ => return Err(CodecError::InvalidMissingCount { count })
    };

    // exactly three remain at this point
    let (x, y, z) = quad.present()
        .map(|(_base, score)| quantize(score))
        .collect_tuple()
        .ok_or(CodecError::InvalidMissingCount { count })?;

    Ok(missing.index() as u32
        | (x << FIELD_SHIFTS[0])
        | (y << FIELD_SHIFTS[1])
        | (z << FIELD_SHIFTS[2]))
}

/// Unpacks an encoded record back into approximate scores.
/// Every value is within half a quantization step (0.5 / [`SCALE_FACTOR`]) of the encoded score.
/// # Arguments
/// * `value` - the encoded record
pub fn decode(value: u32) -> ScoreQuad {
    let missing = (value & MISSING_MASK) as usize;
    let mut fields = FIELD_SHIFTS.iter()
        .map(|shift| ((value >> shift) & FIELD_MASK) as f64 / SCALE_FACTOR);

    // the recovered values fill the non-missing slots in order
    let mut scores = [None; 4];
    for (slot, score) in scores.iter_mut().enumerate() {
        if slot != missing {
            *score = fields.next();
        }
    }
    let [a, c, g, t] = scores;
    ScoreQuad::new(a, c, g, t)
}
