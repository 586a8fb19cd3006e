//! Little Endian Base 128 encoding of 32-bit words.
//!
//! Every decoder takes `(data, offset)` and returns the decoded value with the
//! offset one past the last byte consumed. Encoders take `(buf, offset)` and
//! return the offset one past the last byte written.

use std::convert::Infallible;

use crate::error::{Error, Result};

/// Longest encoding of a 32-bit value.
pub const MAX_LEB128_LEN: usize = 5;

/// The 7-bit groups of one encoding, as read off the wire.
struct Groups {
    /// Accumulated bits. The fifth byte is OR'd in unmasked at bit 28.
    bits: u32,
    /// Bytes consumed, 1..=5.
    count: u32,
    last: u8,
    end: usize,
}

impl Groups {
    /// Sign-extend from bit `7 * count - 1`. Five-byte encodings already
    /// fill all 32 bits and are taken as-is.
    fn sign_extended(&self) -> i32 {
        if self.count < MAX_LEB128_LEN as u32 {
            let shift = 32 - 7 * self.count;
            ((self.bits as i32) << shift) >> shift
        } else {
            self.bits as i32
        }
    }
}

/// Walk one encoding starting at `offset`, fetching bytes through `byte_at`.
///
/// Stops at the first byte with a clear continuation bit, or after the fifth
/// byte regardless of its continuation bit.
#[inline(always)]
fn read_groups<E>(
    offset: usize,
    mut byte_at: impl FnMut(usize) -> std::result::Result<u8, E>,
) -> std::result::Result<Groups, E> {
    let mut bits = 0u32;
    let mut pos = offset;
    let mut count = 0u32;

    loop {
        let byte = byte_at(pos)?;
        pos += 1;
        count += 1;

        if count == MAX_LEB128_LEN as u32 {
            // Bits shifted past bit 31 fall off; the unchecked decoders
            // tolerate them.
            bits |= u32::from(byte) << 28;
            return Ok(Groups {
                bits,
                count,
                last: byte,
                end: pos,
            });
        }

        bits |= u32::from(byte & 0x7f) << (7 * (count - 1));
        if byte & 0x80 == 0 {
            return Ok(Groups {
                bits,
                count,
                last: byte,
                end: pos,
            });
        }
    }
}

fn read_groups_unchecked(data: &[u8], offset: usize) -> Groups {
    let Ok(groups) = read_groups(offset, |pos| Ok::<u8, Infallible>(data[pos]));
    groups
}

fn read_groups_checked(data: &[u8], offset: usize, limit: Option<usize>) -> Result<Groups> {
    let bound = limit.map_or(data.len(), |limit| limit.min(data.len()));
    let groups = read_groups(offset, |pos| {
        if pos < bound {
            Ok(data[pos])
        } else {
            log::debug!("LEB128 at {offset:#x} runs past limit {bound:#x}");
            Err(Error::InvalidLeb128(offset))
        }
    })?;

    if groups.count == MAX_LEB128_LEN as u32 && groups.last & 0xf0 != 0 {
        log::debug!(
            "LEB128 at {offset:#x} has high bits set in fifth byte {:#04x}",
            groups.last
        );
        return Err(Error::InvalidLeb128(offset));
    }

    Ok(groups)
}

/// Decode an unsigned LEB128 value from `data` starting at `offset`.
/// Returns (value, next_offset).
///
/// Garbage in the high four bits of a fifth byte is tolerated and dropped.
/// Only use this on data that has already been verified.
///
/// # Panics
///
/// Panics if `data` ends before the encoding does.
pub fn decode_unsigned(data: &[u8], offset: usize) -> (u32, usize) {
    let groups = read_groups_unchecked(data, offset);
    (groups.bits, groups.end)
}

/// Decode a signed LEB128 value from `data` starting at `offset`.
/// Returns (value, next_offset).
///
/// # Panics
///
/// Panics if `data` ends before the encoding does.
pub fn decode_signed(data: &[u8], offset: usize) -> (i32, usize) {
    let groups = read_groups_unchecked(data, offset);
    (groups.sign_extended(), groups.end)
}

/// Decode an unsigned LEB128 value, verifying it.
///
/// No byte at or past `limit` (nor past the end of `data`) is read. A
/// five-byte encoding is only valid if its fifth byte has the high four bits
/// clear.
pub fn decode_unsigned_checked(
    data: &[u8],
    offset: usize,
    limit: Option<usize>,
) -> Result<(u32, usize)> {
    let groups = read_groups_checked(data, offset, limit)?;
    Ok((groups.bits, groups.end))
}

/// Decode a signed LEB128 value, verifying it under the same rules as
/// [`decode_unsigned_checked`].
pub fn decode_signed_checked(
    data: &[u8],
    offset: usize,
    limit: Option<usize>,
) -> Result<(i32, usize)> {
    let groups = read_groups_checked(data, offset, limit)?;
    Ok((groups.sign_extended(), groups.end))
}

/// Decode a `uleb128p1` value: an unsigned LEB128 holding `value + 1`, so
/// that `-1` (no index) takes a single byte.
///
/// # Panics
///
/// Panics if `data` ends before the encoding does.
pub fn decode_unsigned_p1(data: &[u8], offset: usize) -> (i32, usize) {
    let (raw, end) = decode_unsigned(data, offset);
    ((raw as i32).wrapping_sub(1), end)
}

/// Checked form of [`decode_unsigned_p1`].
pub fn decode_unsigned_p1_checked(
    data: &[u8],
    offset: usize,
    limit: Option<usize>,
) -> Result<(i32, usize)> {
    let (raw, end) = decode_unsigned_checked(data, offset, limit)?;
    Ok(((raw as i32).wrapping_sub(1), end))
}

/// Write `value` as unsigned LEB128 into `buf` at `offset`.
/// Returns the offset one past the last byte written.
///
/// # Panics
///
/// Panics if fewer than [`unsigned_size`]`(value)` bytes are available.
pub fn encode_unsigned(buf: &mut [u8], offset: usize, mut value: u32) -> usize {
    let mut pos = offset;
    loop {
        let out = (value & 0x7f) as u8;
        if u32::from(out) == value {
            buf[pos] = out;
            return pos + 1;
        }
        buf[pos] = out | 0x80;
        pos += 1;
        value >>= 7;
    }
}

/// Write `value` as signed LEB128 into `buf` at `offset`.
/// Returns the offset one past the last byte written.
///
/// Values below `-(1 << 27)` take five bytes whose last byte carries sign
/// bits in its high nibble; [`decode_signed_checked`] rejects those.
///
/// # Panics
///
/// Panics if fewer than [`signed_size`]`(value)` bytes are available.
pub fn encode_signed(buf: &mut [u8], offset: usize, mut value: i32) -> usize {
    let mut pos = offset;
    loop {
        let out = (value & 0x7f) as u8;
        value >>= 7;
        let sign_clear = out & 0x40 == 0;
        if (value == 0 && sign_clear) || (value == -1 && !sign_clear) {
            buf[pos] = out;
            return pos + 1;
        }
        buf[pos] = out | 0x80;
        pos += 1;
    }
}

/// Write `value` in `uleb128p1` form. Returns the next offset.
///
/// # Panics
///
/// Panics if fewer than [`unsigned_p1_size`]`(value)` bytes are available.
pub fn encode_unsigned_p1(buf: &mut [u8], offset: usize, value: i32) -> usize {
    encode_unsigned(buf, offset, value.wrapping_add(1) as u32)
}

/// Number of bytes [`encode_unsigned`] writes for `value`.
pub fn unsigned_size(mut value: u32) -> usize {
    let mut count = 0;
    loop {
        value >>= 7;
        count += 1;
        if value == 0 {
            return count;
        }
    }
}

/// Number of bytes [`encode_signed`] writes for `value`.
pub fn signed_size(value: i32) -> usize {
    // Fold negative values onto their one's complement; the sign then needs
    // one extra bit on top of the significant ones.
    let folded = value ^ (value >> 31);
    let bits = 33 - folded.leading_zeros() as usize;
    bits.div_ceil(7)
}

/// Number of bytes [`encode_unsigned_p1`] writes for `value`.
pub fn unsigned_p1_size(value: i32) -> usize {
    unsigned_size(value.wrapping_add(1) as u32)
}

/// Append `value` as unsigned LEB128 to `out`.
pub fn push_unsigned(out: &mut Vec<u8>, value: u32) {
    let start = out.len();
    out.resize(start + unsigned_size(value), 0);
    encode_unsigned(out, start, value);
}

/// Append `value` as signed LEB128 to `out`.
pub fn push_signed(out: &mut Vec<u8>, value: i32) {
    let start = out.len();
    out.resize(start + signed_size(value), 0);
    encode_signed(out, start, value);
}
