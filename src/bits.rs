//! Bit-level helpers used by the tile decoder.

/// Expand bytes into individual bits, most significant bit first.
pub fn unpack_bits(bytes: &[u8]) -> Vec<u8> {
    bytes
        .iter()
        .flat_map(|&byte| (0..8).rev().map(move |shift| (byte >> shift) & 1))
        .collect()
}

/// Interpret a sequence of 0/1 values as a big-endian number. The last bit is
/// the least significant; an empty slice is 0.
pub fn bits_to_int(bits: &[u8]) -> u64 {
    bits.iter()
        .fold(0u64, |value, &bit| (value << 1) | u64::from(bit & 1))
}
