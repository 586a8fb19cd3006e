use dexleb::*;

/// Values straddling every group boundary, plus the extremes.
pub fn boundary_values() -> Vec<u32> {
    let mut values = vec![0, 1, u32::MAX, u32::MAX - 1, 0x8000_0000, 0x7fff_ffff];
    for bits in [7u32, 14, 21, 28] {
        let edge = 1u32 << bits;
        values.extend([edge - 1, edge, edge + 1]);
    }
    values
}

pub fn assert_unsigned_roundtrip(value: u32) {
    let mut buf = [0u8; MAX_LEB128_LEN + 1];
    let end = encode_unsigned(&mut buf, 1, value);
    assert_eq!(end - 1, unsigned_size(value), "size mismatch for {value:#x}");
    assert_eq!(decode_unsigned(&buf, 1), (value, end), "unchecked {value:#x}");
    assert_eq!(
        decode_unsigned_checked(&buf, 1, Some(end)),
        Ok((value, end)),
        "checked {value:#x}"
    );
}
