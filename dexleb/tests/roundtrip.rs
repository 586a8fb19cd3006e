mod common;

use common::{assert_unsigned_roundtrip, boundary_values};
use dexleb::*;

#[test]
fn unsigned_boundaries() {
    for value in boundary_values() {
        assert_unsigned_roundtrip(value);
    }
}

#[test]
fn unsigned_stride() {
    // Coarse sweep over the whole range.
    let mut value = 0u32;
    while let Some(next) = value.checked_add(0x0001_3579) {
        assert_unsigned_roundtrip(value);
        value = next;
    }
}

#[test]
fn encoding_is_minimal() {
    for value in boundary_values() {
        let mut out = Vec::new();
        push_unsigned(&mut out, value);
        let last = *out.last().unwrap();
        assert_eq!(last & 0x80, 0, "{value:#x} ends with a continuation byte");
        if out.len() > 1 {
            assert_ne!(last, 0x00, "{value:#x} has a trailing zero group");
        }
        assert!((1..=MAX_LEB128_LEN).contains(&out.len()));
    }
}

#[test]
fn single_byte_only_below_128() {
    assert_eq!(unsigned_size(0), 1);
    assert_eq!(unsigned_size(127), 1);
    assert!(boundary_values()
        .into_iter()
        .filter(|&v| v >= 128)
        .all(|v| unsigned_size(v) > 1));
}

#[test]
fn signed_roundtrip() {
    let mut values = vec![0, 1, -1, i32::MAX, i32::MIN, -123_456];
    for bits in [6u32, 13, 20, 27] {
        let edge = 1i32 << bits;
        values.extend([edge - 1, edge, -edge, -edge - 1]);
    }
    for value in values {
        let mut out = Vec::new();
        push_signed(&mut out, value);
        assert_eq!(out.len(), signed_size(value), "size of {value}");
        assert_eq!(decode_signed(&out, 0), (value, out.len()), "decode {value}");
    }
}

#[test]
fn signed_checked_accepts_up_to_four_bytes() {
    for value in [-(1 << 27), (1 << 27) - 1, -1, 0, 64, -65] {
        let mut out = Vec::new();
        push_signed(&mut out, value);
        assert_eq!(decode_signed_checked(&out, 0, None), Ok((value, out.len())));
    }
}

#[test]
fn signed_checked_rejects_sign_nibble() {
    // Five-byte negatives carry sign bits in the fifth byte's high nibble.
    let mut out = Vec::new();
    push_signed(&mut out, i32::MIN);
    assert_eq!(out.len(), 5);
    assert_eq!(decode_signed(&out, 0), (i32::MIN, 5));
    assert_eq!(decode_signed_checked(&out, 0, None), Err(Error::InvalidLeb128(0)));

    // The same value with the nibble cleared is accepted by both.
    let trimmed = [0x80, 0x80, 0x80, 0x80, 0x08];
    assert_eq!(decode_signed_checked(&trimmed, 0, None), Ok((i32::MIN, 5)));
}

#[test]
fn signed_decoder_agrees_with_unsigned_bit_pattern() {
    // A positive value whose top encoded bit is clear reads the same both ways.
    for value in [0u32, 1, 0x3f, 0x1fff, 0x0fff_ffff >> 1, 0x7fff_ffff] {
        let mut out = Vec::new();
        push_unsigned(&mut out, value);
        let (signed, end) = decode_signed(&out, 0);
        let (unsigned, _) = decode_unsigned(&out, 0);
        let expected = if out.len() < MAX_LEB128_LEN {
            let shift = 32 - 7 * out.len() as u32;
            ((unsigned as i32) << shift) >> shift
        } else {
            unsigned as i32
        };
        assert_eq!(signed, expected, "{value:#x}");
        assert_eq!(end, out.len());
    }
}

#[test]
fn unsigned_p1_roundtrip() {
    for value in [-1, 0, 1, 126, 127, 0x3fff, i32::MAX - 1] {
        let mut buf = [0u8; MAX_LEB128_LEN];
        let end = encode_unsigned_p1(&mut buf, 0, value);
        assert_eq!(end, unsigned_p1_size(value));
        assert_eq!(decode_unsigned_p1(&buf, 0), (value, end));
        assert_eq!(decode_unsigned_p1_checked(&buf, 0, None), Ok((value, end)));
    }
}
