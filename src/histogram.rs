//! 26-bucket letter-frequency histogram and its wire encoding.
//!
//! The histogram is the one message a worker ever transmits: 26 counts in
//! alphabetical order, encoded as fixed-width native-endian integers so the
//! supervisor can read it with a single bounded read.

/// Number of buckets, one per letter a-z.
pub const ALPHABET_LEN: usize = 26;

/// Letter-frequency table, index 0 = 'a', case-insensitive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; ALPHABET_LEN],
}

impl Histogram {
    /// Size of the serialized form: 26 native-endian u64 values.
    pub const WIRE_LEN: usize = ALPHABET_LEN * std::mem::size_of::<u64>();

    /// Count the alphabetic bytes in a buffer.
    ///
    /// Non-alphabetic bytes are ignored; an empty buffer yields all zeros.
    pub fn of_bytes(data: &[u8]) -> Self {
        let mut counts = [0u64; ALPHABET_LEN];
        for byte in data {
            if byte.is_ascii_alphabetic() {
                counts[(byte.to_ascii_lowercase() - b'a') as usize] += 1;
            }
        }
        Self { counts }
    }

    /// Sum of all buckets, equal to the number of alphabetic bytes counted.
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// Iterate buckets in alphabetical order as (letter, count) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (char, u64)> + '_ {
        self.counts
            .iter()
            .enumerate()
            .map(|(i, &count)| ((b'a' + i as u8) as char, count))
    }

    /// Serialize for transmission over a result channel.
    pub fn to_wire(&self) -> [u8; Self::WIRE_LEN] {
        let mut buf = [0u8; Self::WIRE_LEN];
        for (chunk, count) in buf.chunks_exact_mut(8).zip(self.counts) {
            chunk.copy_from_slice(&count.to_ne_bytes());
        }
        buf
    }

    /// Decode a full wire payload.
    pub fn from_wire(buf: &[u8; Self::WIRE_LEN]) -> Self {
        let mut counts = [0u64; ALPHABET_LEN];
        for (count, chunk) in counts.iter_mut().zip(buf.chunks_exact(8)) {
            *count = u64::from_ne_bytes(chunk.try_into().expect("chunk is 8 bytes"));
        }
        Self { counts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_buffer_is_all_zeros() {
        let histogram = Histogram::of_bytes(b"");
        assert_eq!(histogram.total(), 0);
        assert!(histogram.iter().all(|(_, count)| count == 0));
    }

    #[test]
    fn test_counts_are_case_insensitive() {
        let lower = Histogram::of_bytes(b"hello");
        let mixed = Histogram::of_bytes(b"HeLLo");
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_non_alphabetic_bytes_are_ignored() {
        let histogram = Histogram::of_bytes(b"a1b2c3 \n\t!@#");
        assert_eq!(histogram.total(), 3);
    }

    #[test]
    fn test_total_matches_alphabetic_byte_count() {
        let data = b"The quick brown fox jumps over the lazy dog 123!";
        let alphabetic = data.iter().filter(|b| b.is_ascii_alphabetic()).count() as u64;
        assert_eq!(Histogram::of_bytes(data).total(), alphabetic);
    }

    #[test]
    fn test_known_distribution() {
        let histogram = Histogram::of_bytes(b"AbcAbc");
        let counts: Vec<(char, u64)> = histogram.iter().collect();
        assert_eq!(counts[0], ('a', 2));
        assert_eq!(counts[1], ('b', 2));
        assert_eq!(counts[2], ('c', 2));
        assert!(counts[3..].iter().all(|&(_, count)| count == 0));
    }

    #[test]
    fn test_wire_encoding_preserves_counts() {
        let original = Histogram::of_bytes(b"zzz yyy x");
        let decoded = Histogram::from_wire(&original.to_wire());
        assert_eq!(original, decoded);
        assert_eq!(decoded.total(), 7);
    }
}
