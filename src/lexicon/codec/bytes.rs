//! Low-level byte decoding utilities.
//!
//! Index fields are read as raw byte arrays first and interpreted in both
//! byte orders afterwards, so these helpers work on slices rather than
//! readers. Short input is zero-padded on the right instead of failing.

use byteorder::{BigEndian, ByteOrder, LittleEndian};

fn padded<const N: usize>(bytes: &[u8]) -> [u8; N] {
    let mut buf = [0u8; N];
    let n = bytes.len().min(N);
    buf[..n].copy_from_slice(&bytes[..n]);
    buf
}

pub fn read_u32_be(bytes: &[u8]) -> u32 {
    BigEndian::read_u32(&padded::<4>(bytes))
}

pub fn read_u32_le(bytes: &[u8]) -> u32 {
    LittleEndian::read_u32(&padded::<4>(bytes))
}

pub fn read_u64_be(bytes: &[u8]) -> u64 {
    BigEndian::read_u64(&padded::<8>(bytes))
}

pub fn read_u64_le(bytes: &[u8]) -> u64 {
    LittleEndian::read_u64(&padded::<8>(bytes))
}

/// Reads a 4 or 8 byte offset field in both byte orders.
///
/// Returns `(big_endian, little_endian)`.
pub fn read_offset_pair(bytes: &[u8]) -> (u64, u64) {
    if bytes.len() == 8 {
        (read_u64_be(bytes), read_u64_le(bytes))
    } else {
        (read_u32_be(bytes) as u64, read_u32_le(bytes) as u64)
    }
}

/// Upper-case hex with a `0x` prefix, e.g. `0x0000006C`.
pub fn hex_upper(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode_upper(bytes))
}

/// Upper-case hex of the reversed byte sequence (the little-endian reading).
pub fn hex_upper_reversed(bytes: &[u8]) -> String {
    let reversed: Vec<u8> = bytes.iter().rev().copied().collect();
    hex_upper(&reversed)
}

/// Hex dump of the first `len` bytes, 16 bytes (32 hex digits) per line.
pub fn hex_dump(bytes: &[u8], len: usize) -> String {
    let slice = &bytes[..bytes.len().min(len)];
    slice
        .chunks(16)
        .map(hex::encode_upper)
        .collect::<Vec<_>>()
        .join("\n")
}
