//! Big-endian integer extraction and the CRC-16/IBM checksum.
//!
//! Every reader takes the buffer and an explicit offset and returns a
//! [`Parsed`] carrying the value together with the offset of the next unread
//! byte. Callers thread that offset through their own decoding steps; no reader
//! keeps a cursor of its own.

use crc::{CRC_16_ARC, Crc};

use crate::{CodecError, Result};

/// A value read from a buffer and the offset immediately after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parsed<T> {
    pub value: T,
    pub next: usize,
}

impl<T> Parsed<T> {
    pub fn new(value: T, next: usize) -> Self {
        Self { value, next }
    }

    /// Transform the value, keeping the offset.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Parsed<U> {
        Parsed { value: f(self.value), next: self.next }
    }
}

/// Bounds-checked view of `bytes[start..end]`.
fn span(bytes: &[u8], start: usize, end: usize) -> Result<&[u8]> {
    if start > end {
        return Err(CodecError::out_of_bounds(start, end, bytes.len()));
    }
    bytes.get(start..end).ok_or_else(|| CodecError::out_of_bounds(start, end, bytes.len()))
}

/// Big-endian unsigned integer over `bytes[start..end]`.
///
/// Spans wider than 8 bytes keep the low 64 bits.
pub fn read_unsigned(bytes: &[u8], start: usize, end: usize) -> Result<u64> {
    Ok(span(bytes, start, end)?.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b)))
}

/// Big-endian two's complement signed integer over `bytes[start..end]`.
///
/// The top bit of the first byte is the sign. Negative values are decoded by
/// complementing every byte, accumulating the magnitude and negating
/// `magnitude + 1`.
pub fn read_signed_twos_complement(bytes: &[u8], start: usize, end: usize) -> Result<i64> {
    let raw = span(bytes, start, end)?;
    let negative = raw.first().is_some_and(|b| b & 0x80 != 0);
    if !negative {
        return Ok(raw.iter().fold(0i64, |acc, &b| (acc << 8) | i64::from(b)));
    }
    let magnitude = raw.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(!b));
    // magnitude < 2^63 for widths up to 8 because the complemented sign bit is 0
    Ok((magnitude as i64).wrapping_neg().wrapping_sub(1))
}

/// Unsigned integer of `width` bytes at `at`.
pub fn read_uint(bytes: &[u8], at: usize, width: usize) -> Result<Parsed<u64>> {
    let end = at.checked_add(width).ok_or_else(|| CodecError::out_of_bounds(at, usize::MAX, bytes.len()))?;
    Ok(Parsed::new(read_unsigned(bytes, at, end)?, end))
}

pub fn read_u8(bytes: &[u8], at: usize) -> Result<Parsed<u8>> {
    let byte = bytes.get(at).ok_or_else(|| CodecError::out_of_bounds(at, at + 1, bytes.len()))?;
    Ok(Parsed::new(*byte, at + 1))
}

pub fn read_u16(bytes: &[u8], at: usize) -> Result<Parsed<u16>> {
    Ok(read_uint(bytes, at, 2)?.map(|v| v as u16))
}

pub fn read_u32(bytes: &[u8], at: usize) -> Result<Parsed<u32>> {
    Ok(read_uint(bytes, at, 4)?.map(|v| v as u32))
}

pub fn read_u64(bytes: &[u8], at: usize) -> Result<Parsed<u64>> {
    read_uint(bytes, at, 8)
}

pub fn read_i16(bytes: &[u8], at: usize) -> Result<Parsed<i16>> {
    Ok(Parsed::new(read_signed_twos_complement(bytes, at, at + 2)? as i16, at + 2))
}

pub fn read_i32(bytes: &[u8], at: usize) -> Result<Parsed<i32>> {
    Ok(Parsed::new(read_signed_twos_complement(bytes, at, at + 4)? as i32, at + 4))
}

/// Borrow `len` bytes starting at `at`.
pub fn take(bytes: &[u8], at: usize, len: usize) -> Result<Parsed<&[u8]>> {
    let end = at.checked_add(len).ok_or_else(|| CodecError::out_of_bounds(at, usize::MAX, bytes.len()))?;
    Ok(Parsed::new(span(bytes, at, end)?, end))
}

/// CRC-16/IBM, catalogued as CRC-16/ARC (reflected polynomial 0xA001, initial value 0, no final xor).
const CRC16: Crc<u16> = Crc::<u16>::new(&CRC_16_ARC);

/// CRC-16/IBM over the whole slice.
pub fn crc16_ibm(bytes: &[u8]) -> u16 {
    CRC16.checksum(bytes)
}
