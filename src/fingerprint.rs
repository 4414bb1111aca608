//! Question fingerprinting.
//!
//! The dedup key of a record is a 32-bit rolling polynomial hash (base 31)
//! of its question text. The exact arithmetic is part of the storage format:
//! collections written by earlier installs are keyed by it, so it must not
//! be swapped for a stronger hash without migrating those keys.

use crate::types::Fingerprint;

/// Computes the fingerprint of a question text.
///
/// Starting from 0, every UTF-16 code unit `c` updates the accumulator as
/// `h = (h << 5) - h + c`, wrapping to a signed 32-bit integer at each step.
/// The result is rendered as lowercase hex with a leading `-` when negative.
///
/// Only the question text goes in; two records with the same question and
/// different answers share a fingerprint.
///
/// # Example
/// ```
/// use quizvault::fingerprint;
///
/// assert_eq!(fingerprint("").as_str(), "0");
/// assert_eq!(fingerprint("a").as_str(), "61");
/// assert_eq!(fingerprint("ab").as_str(), "c21");
/// ```
pub fn fingerprint(text: &str) -> Fingerprint {
    let hash = text.encode_utf16().fold(0i32, |h, unit| {
        h.wrapping_shl(5).wrapping_sub(h).wrapping_add(i32::from(unit))
    });
    Fingerprint::from_hash(hash)
}
