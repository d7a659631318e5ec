//! Packed validity bitmasks.
//!
//! Bit `b` of a mask lives in word `b / 64` at bit position `b % 64`
//! (least significant bit first). Pad bits past the logical length in the
//! final word are never read and are written as zero.

use gribjump_core::BITS_PER_WORD;

/// Words needed for `len` bits.
pub const fn word_count(len: usize) -> usize {
    gribjump_core::range::mask_word_count(len)
}

/// Read bit `pos`. Positions past the end of `words` read as unset.
pub fn get_bit(words: &[u64], pos: usize) -> bool {
    words
        .get(pos / BITS_PER_WORD)
        .is_some_and(|w| (w >> (pos % BITS_PER_WORD)) & 1 == 1)
}

/// Expand the first `len` bits into booleans.
pub fn unpack_bits(words: &[u64], len: usize) -> Vec<bool> {
    (0..len).map(|b| get_bit(words, b)).collect()
}

/// Pack booleans into words, zero-padding the final word.
pub fn pack_bits(bits: &[bool]) -> Vec<u64> {
    let mut words = vec![0u64; word_count(bits.len())];
    for (b, &set) in bits.iter().enumerate() {
        if set {
            words[b / BITS_PER_WORD] |= 1u64 << (b % BITS_PER_WORD);
        }
    }
    words
}

/// Number of set bits among the first `len` positions.
pub fn count_set(words: &[u64], len: usize) -> usize {
    let full = len / BITS_PER_WORD;
    let mut count: usize = words
        .iter()
        .take(full)
        .map(|w| w.count_ones() as usize)
        .sum();
    let rem = len % BITS_PER_WORD;
    if rem > 0 {
        if let Some(w) = words.get(full) {
            count += (w & ((1u64 << rem) - 1)).count_ones() as usize;
        }
    }
    count
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn low_bit_first() {
        assert_eq!(unpack_bits(&[0b101], 3), vec![true, false, true]);
    }

    #[test]
    fn pad_bits_are_ignored() {
        // Bit 3 is set but lies past the logical length.
        assert_eq!(unpack_bits(&[0b1101], 3), vec![true, false, true]);
        assert_eq!(count_set(&[0b1101], 3), 2);
    }

    #[test]
    fn second_word() {
        let words = [0u64, 1u64 << 2];
        assert!(get_bit(&words, 66));
        assert!(!get_bit(&words, 65));
        assert!(!get_bit(&words, 500));
    }

    #[test]
    fn word_counts() {
        assert_eq!(word_count(0), 0);
        assert_eq!(word_count(1), 1);
        assert_eq!(word_count(64), 1);
        assert_eq!(word_count(65), 2);
        assert_eq!(word_count(49), 1);
    }

    #[test]
    fn pack_zero_pads_final_word() {
        let words = pack_bits(&[true; 65]);
        assert_eq!(words, vec![u64::MAX, 1]);
    }

    proptest! {
        #[test]
        fn pack_then_unpack_is_identity(bits in prop::collection::vec(any::<bool>(), 0..300)) {
            let words = pack_bits(&bits);
            prop_assert_eq!(words.len(), word_count(bits.len()));
            prop_assert_eq!(unpack_bits(&words, bits.len()), bits.clone());
            prop_assert_eq!(count_set(&words, bits.len()), bits.iter().filter(|&&b| b).count());
        }
    }
}
