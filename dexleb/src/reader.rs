//! Bounds-checked cursor over a byte slice.

use crate::error::Result;
use crate::leb128::{decode_signed_checked, decode_unsigned_checked, decode_unsigned_p1_checked};

/// Reads consecutive LEB128 values from a slice, never past `limit`.
///
/// A failed read leaves the position where it was. Callers should treat the
/// enclosing structure as malformed rather than resume from there.
#[derive(Debug, Clone)]
pub struct Leb128Reader<'a> {
    data: &'a [u8],
    pos: usize,
    limit: usize,
}

impl<'a> Leb128Reader<'a> {
    /// Read the whole of `data` from the start.
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            limit: data.len(),
        }
    }

    /// Start reading at `offset`, bounded by the end of `data`.
    pub fn at(data: &'a [u8], offset: usize) -> Self {
        Self {
            data,
            pos: offset,
            limit: data.len(),
        }
    }

    /// Read from the start of `data`, never touching bytes at or past
    /// `limit`. The limit is clamped to `data.len()`.
    pub fn with_limit(data: &'a [u8], limit: usize) -> Self {
        Self {
            data,
            pos: 0,
            limit: limit.min(data.len()),
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn remaining(&self) -> usize {
        self.limit.saturating_sub(self.pos)
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn read_unsigned(&mut self) -> Result<u32> {
        let (value, next) = decode_unsigned_checked(self.data, self.pos, Some(self.limit))?;
        self.pos = next;
        Ok(value)
    }

    pub fn read_signed(&mut self) -> Result<i32> {
        let (value, next) = decode_signed_checked(self.data, self.pos, Some(self.limit))?;
        self.pos = next;
        Ok(value)
    }

    /// Read a `uleb128p1` value, where `-1` stands for "no index".
    pub fn read_unsigned_p1(&mut self) -> Result<i32> {
        let (value, next) = decode_unsigned_p1_checked(self.data, self.pos, Some(self.limit))?;
        self.pos = next;
        Ok(value)
    }
}
