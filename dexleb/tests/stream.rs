use dexleb::*;

fn encode_all(values: &[u32]) -> Vec<u8> {
    let mut out = Vec::new();
    for &v in values {
        push_unsigned(&mut out, v);
    }
    out
}

#[test]
fn reader_walks_a_packed_stream() {
    let values = [3, 0, 300, u32::MAX, 127, 128];
    let bytes = encode_all(&values);
    let mut reader = Leb128Reader::new(&bytes);
    for &expected in &values {
        assert_eq!(reader.read_unsigned(), Ok(expected));
    }
    assert!(reader.is_empty());
    assert_eq!(reader.position(), bytes.len());
}

#[test]
fn cursor_lands_one_past_each_value() {
    let values = [1, 0x80, 0x4000, 0x20_0000, 0x1000_0000];
    let bytes = encode_all(&values);
    let mut offset = 0;
    for (i, &expected) in values.iter().enumerate() {
        let (value, next) = decode_unsigned(&bytes, offset);
        assert_eq!(value, expected);
        assert_eq!(next - offset, i + 1);
        offset = next;
    }
    assert_eq!(offset, bytes.len());
}

#[test]
fn truncated_stream_is_reported_at_the_broken_value() {
    let mut bytes = encode_all(&[5, 0x4000]);
    bytes.pop();
    let mut reader = Leb128Reader::new(&bytes);
    assert_eq!(reader.read_unsigned(), Ok(5));
    let err = reader.read_unsigned().unwrap_err();
    assert_eq!(err, Error::InvalidLeb128(1));
    assert_eq!(err.to_string(), "Invalid LEB128 encoding at offset 0x1");
}

#[test]
fn limit_splits_a_stream() {
    let bytes = encode_all(&[0x80, 0x80]);
    // First value ends at 2; the second straddles the limit.
    let mut reader = Leb128Reader::with_limit(&bytes, 3);
    assert_eq!(reader.read_unsigned(), Ok(0x80));
    assert!(reader.read_unsigned().is_err());
    assert_eq!(decode_unsigned_checked(&bytes, 2, None), Ok((0x80, 4)));
}
