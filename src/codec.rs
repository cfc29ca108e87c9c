//! Fixed-length word codec for the sequence predictor
//!
//! Words are turned into vectors of `SEQUENCE_LENGTH` floats by scaling
//! each character's code point into `[0, 1]` and zero-padding the tail.
//! Words longer than the sequence length are lossily truncated; that is
//! accepted behavior, not a defect.

/// Length of every encoded vector.
pub const SEQUENCE_LENGTH: usize = 20;

/// Encode a word into a fixed-length numeric vector.
///
/// The word is lower-cased first, so `encode("Spear")` and
/// `encode("spear")` produce the same vector.
pub fn encode(word: &str) -> Vec<f32> {
    let mut vector: Vec<f32> = word
        .to_lowercase()
        .chars()
        .map(|c| c as u32 as f32 / 255.0)
        .take(SEQUENCE_LENGTH)
        .collect();
    vector.resize(SEQUENCE_LENGTH, 0.0);
    vector
}

/// Decode a vector back into a word.
///
/// Components are scaled back to code points and rounded to the nearest
/// integer; trailing whitespace and control characters left over from the
/// zero padding are trimmed. For lower-case ASCII letter words of length
/// at most [`SEQUENCE_LENGTH`], `decode(encode(w)) == w` holds exactly,
/// since code points up to 255 survive the `/255` and `*255` round trip
/// under round-to-nearest.
pub fn decode(encoded: &[f32]) -> String {
    let word: String = encoded
        .iter()
        .map(|&component| {
            let code = (component * 255.0).round() as u32;
            char::from_u32(code).unwrap_or('\u{0}')
        })
        .collect();
    word.trim_end_matches(|c: char| c.is_whitespace() || c.is_control())
        .to_string()
}
