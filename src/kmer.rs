//! K-mer representation and canonicalization.
//!
//! Two storage strategies implement the same [`KmerRepr`] capability set with
//! no runtime dispatch between them: [`PackedKmer`] packs up to 32 bases into
//! a `u64` (2 bits per base); [`WideKmer`] holds an arbitrary-length base
//! string across `u64` limbs, most-significant limb first, so that `Ord`/`Eq`
//! on the limb vector agree with lexicographic order on the base string (the
//! canonical form being the numerically smaller of a k-mer and its reverse
//! complement falls out of that for free).

use std::hash::Hash;

/// Encodes a single ASCII DNA base (`A`/`C`/`G`/`T`, case-insensitive) as its
/// 2-bit code (A=00, C=01, G=10, T=11). Returns `None` for anything else.
#[inline]
pub fn encode_base(byte: u8) -> Option<u8> {
    match byte {
        b'A' | b'a' => Some(0b00),
        b'C' | b'c' => Some(0b01),
        b'G' | b'g' => Some(0b10),
        b'T' | b't' => Some(0b11),
        _ => None,
    }
}

#[inline]
fn decode_base(code: u8) -> u8 {
    match code & 0b11 {
        0b00 => b'A',
        0b01 => b'C',
        0b10 => b'G',
        _ => b'T',
    }
}

#[inline]
const fn complement_code(code: u8) -> u8 {
    code ^ 0b11
}

/// Capability set shared by both k-mer storage strategies.
///
/// Implementations are value types: cheap to clone, ordered so that `Ord`
/// matches lexicographic order on the underlying base string, and usable as
/// hash map keys.
pub trait KmerRepr: Clone + Eq + Hash + Ord + Send + Sync + std::fmt::Debug + 'static {
    /// The maximum k-mer length this representation supports.
    const MAX_K: usize;

    /// Encodes a window of exactly `bases.len()` ASCII bases. Returns the
    /// position of the first invalid byte on failure.
    fn encode(bases: &[u8]) -> Result<Self, usize>;

    /// Returns the reverse complement of this k-mer.
    fn reverse_complement(&self) -> Self;

    /// Returns the lexicographically smaller of this k-mer and its reverse
    /// complement.
    fn canonical(&self) -> Self {
        let rc = self.reverse_complement();
        if rc < *self {
            rc
        } else {
            self.clone()
        }
    }

    /// Decodes back into an owned ASCII base string, for output/debugging.
    fn to_bases(&self) -> Vec<u8>;

    /// Slides the window one base to the right: drops the leading base and
    /// appends `next_base`. Returns `None` if `next_base` is not a
    /// recognized DNA base, leaving the window to be rebuilt from scratch.
    fn shift_left(&self, next_base: u8) -> Option<Self>;
}

/// A k-mer of length `k <= 32`, bit-packed into a single `u64` (2 bits/base).
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub struct PackedKmer {
    bits: u64,
    k: u8,
}

impl PartialOrd for PackedKmer {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PackedKmer {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        debug_assert_eq!(self.k, other.k, "comparing PackedKmer of different k");
        self.bits.cmp(&other.bits)
    }
}

impl KmerRepr for PackedKmer {
    const MAX_K: usize = 32;

    fn encode(bases: &[u8]) -> Result<Self, usize> {
        assert!(
            bases.len() <= Self::MAX_K,
            "PackedKmer cannot hold k > {}",
            Self::MAX_K
        );
        let mut bits: u64 = 0;
        for (i, &b) in bases.iter().enumerate() {
            let code = encode_base(b).ok_or(i)?;
            bits = (bits << 2) | u64::from(code);
        }
        Ok(PackedKmer {
            bits,
            k: bases.len() as u8,
        })
    }

    fn reverse_complement(&self) -> Self {
        let mut bits = self.bits;
        let mut rc: u64 = 0;
        for _ in 0..self.k {
            let code = (bits & 0b11) as u8;
            rc = (rc << 2) | u64::from(complement_code(code));
            bits >>= 2;
        }
        PackedKmer { bits: rc, k: self.k }
    }

    fn to_bases(&self) -> Vec<u8> {
        (0..self.k)
            .map(|i| {
                let shift = (self.k - 1 - i) * 2;
                decode_base(((self.bits >> shift) & 0b11) as u8)
            })
            .collect()
    }

    fn shift_left(&self, next_base: u8) -> Option<Self> {
        let code = encode_base(next_base)?;
        let width = u32::from(self.k) * 2;
        let mask = if width >= 64 { u64::MAX } else { (1u64 << width) - 1 };
        let bits = ((self.bits << 2) | u64::from(code)) & mask;
        Some(PackedKmer { bits, k: self.k })
    }
}

/// A k-mer of arbitrary length `k > 32`, packed 2-bits-per-base across `u64`
/// limbs, most-significant limb (and most-significant bits within the final
/// partially-filled limb) first.
#[derive(Debug, Clone, Eq, PartialEq, Hash, PartialOrd, Ord)]
pub struct WideKmer {
    limbs: Vec<u64>,
    k: usize,
}

impl KmerRepr for WideKmer {
    const MAX_K: usize = usize::MAX / 2;

    fn encode(bases: &[u8]) -> Result<Self, usize> {
        let mut limbs = Vec::with_capacity(bases.len() / 32 + 1);
        let mut current: u64 = 0;
        let mut filled = 0u8;
        for (i, &b) in bases.iter().enumerate() {
            let code = encode_base(b).ok_or(i)?;
            current = (current << 2) | u64::from(code);
            filled += 1;
            if filled == 32 {
                limbs.push(current);
                current = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            limbs.push(current);
        }
        Ok(WideKmer {
            limbs,
            k: bases.len(),
        })
    }

    fn reverse_complement(&self) -> Self {
        let digits: Vec<u8> = self.digits().into_iter().rev().map(complement_code).collect();
        Self::from_digits(&digits)
    }

    fn to_bases(&self) -> Vec<u8> {
        self.digits().into_iter().map(decode_base).collect()
    }

    fn shift_left(&self, next_base: u8) -> Option<Self> {
        let code = encode_base(next_base)?;
        let mut digits = self.digits();
        digits.remove(0);
        digits.push(code);
        Some(Self::from_digits(&digits))
    }
}

impl WideKmer {
    /// Every 2-bit code in this k-mer, most significant (first base) first.
    fn digits(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.k);
        let mut remaining = self.k;
        for (limb_idx, &limb) in self.limbs.iter().enumerate() {
            let in_limb = if limb_idx + 1 == self.limbs.len() {
                remaining
            } else {
                32
            };
            for i in 0..in_limb {
                let shift = (in_limb - 1 - i) * 2;
                out.push(((limb >> shift) & 0b11) as u8);
            }
            remaining -= in_limb;
        }
        out
    }

    fn from_digits(digits: &[u8]) -> Self {
        let mut limbs = Vec::with_capacity(digits.len() / 32 + 1);
        let mut current: u64 = 0;
        let mut filled = 0u8;
        for &d in digits {
            current = (current << 2) | u64::from(d);
            filled += 1;
            if filled == 32 {
                limbs.push(current);
                current = 0;
                filled = 0;
            }
        }
        if filled > 0 {
            limbs.push(current);
        }
        WideKmer {
            limbs,
            k: digits.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_roundtrip() {
        for seq in ["ACGT", "AAAA", "TTTT", "GATTACA"] {
            let kmer = PackedKmer::encode(seq.as_bytes()).unwrap();
            assert_eq!(kmer.to_bases(), seq.as_bytes());
        }
    }

    #[test]
    fn packed_rejects_invalid_base() {
        let err = PackedKmer::encode(b"ACNT").unwrap_err();
        assert_eq!(err, 2);
    }

    #[test]
    fn packed_lowercase_accepted() {
        let kmer = PackedKmer::encode(b"acgt").unwrap();
        assert_eq!(kmer.to_bases(), b"ACGT");
    }

    #[test]
    fn packed_canonical_palindrome() {
        let kmer = PackedKmer::encode(b"ACGT").unwrap();
        assert_eq!(kmer.canonical().to_bases(), b"ACGT");
    }

    #[test]
    fn packed_canonical_picks_smaller() {
        let aaa = PackedKmer::encode(b"AAA").unwrap();
        assert_eq!(aaa.canonical().to_bases(), b"AAA");

        let ttt = PackedKmer::encode(b"TTT").unwrap();
        assert_eq!(ttt.canonical().to_bases(), b"AAA");

        assert_eq!(aaa.canonical(), ttt.canonical());
    }

    #[test]
    fn packed_reverse_complement_gattaca() {
        let kmer = PackedKmer::encode(b"GATTACA").unwrap();
        assert_eq!(kmer.reverse_complement().to_bases(), b"TGTAATC");
    }

    #[test]
    fn packed_ordering_matches_lexicographic_bytes() {
        let a = PackedKmer::encode(b"AAAA").unwrap();
        let c = PackedKmer::encode(b"CCCC").unwrap();
        let g = PackedKmer::encode(b"GGGG").unwrap();
        assert!(a < c);
        assert!(c < g);
    }

    #[test]
    fn wide_roundtrip_across_limb_boundary() {
        let seq = "ACGT".repeat(20); // k = 80, > 32, spans 3 limbs
        let kmer = WideKmer::encode(seq.as_bytes()).unwrap();
        assert_eq!(kmer.to_bases(), seq.as_bytes());
    }

    #[test]
    fn wide_reverse_complement_matches_expected_bytes() {
        let seq = b"GATTACAGATTACA"; // k=14, still small but exercises the WideKmer path
        let wide = WideKmer::encode(seq).unwrap();
        let expected: Vec<u8> = seq
            .iter()
            .rev()
            .map(|&b| match b {
                b'A' => b'T',
                b'C' => b'G',
                b'G' => b'C',
                _ => b'A',
            })
            .collect();
        assert_eq!(wide.reverse_complement().to_bases(), expected);
    }

    #[test]
    fn wide_reverse_complement_self_inverse() {
        let seq = "ACGTTGCAACGTTGCAACGT".repeat(3);
        let kmer = WideKmer::encode(seq.as_bytes()).unwrap();
        let rc = kmer.reverse_complement();
        assert_eq!(rc.reverse_complement(), kmer);
    }

    #[test]
    fn wide_ordering_matches_lexicographic_bytes() {
        let a = WideKmer::encode(&b"A".repeat(40)).unwrap();
        let c = WideKmer::encode(&b"C".repeat(40)).unwrap();
        assert!(a < c);
    }

    #[test]
    fn packed_shift_left_slides_the_window() {
        let kmer = PackedKmer::encode(b"ACGT").unwrap();
        let shifted = kmer.shift_left(b'A').unwrap();
        assert_eq!(shifted.to_bases(), b"CGTA");
    }

    #[test]
    fn packed_shift_left_rejects_invalid_base() {
        let kmer = PackedKmer::encode(b"ACGT").unwrap();
        assert!(kmer.shift_left(b'N').is_none());
    }

    #[test]
    fn wide_shift_left_slides_the_window() {
        let seq = "ACGTTGCAACGTTGCA"; // k = 16
        let kmer = WideKmer::encode(seq.as_bytes()).unwrap();
        let shifted = kmer.shift_left(b'G').unwrap();
        assert_eq!(shifted.to_bases(), b"CGTTGCAACGTTGCAG");
    }

    #[test]
    fn packed_canonical_byte_dump_snapshot() {
        let kmer = PackedKmer::encode(b"GATTACA").unwrap();
        insta::assert_snapshot!(format!("{:?}", kmer.canonical().to_bases()), @"[71, 65, 84, 84, 65, 67, 65]");
    }
}
