//! 32-bit LEB128 codec for DEX container files.
//!
//! Two decoding tiers are provided. The plain decoders ([`decode_unsigned`],
//! [`decode_signed`]) are meant for data that has already been verified and
//! tolerate junk in the high bits of a fifth byte. The checked decoders
//! ([`decode_unsigned_checked`], [`decode_signed_checked`]) enforce a read
//! limit and reject five-byte encodings that do not fit in 32 bits.
//!
//! ```
//! use dexleb::{decode_unsigned_checked, encode_unsigned, unsigned_size};
//!
//! let mut buf = [0u8; 5];
//! let end = encode_unsigned(&mut buf, 0, 624_485);
//! assert_eq!(end, unsigned_size(624_485));
//! assert_eq!(&buf[..end], &[0xe5, 0x8e, 0x26]);
//! assert_eq!(decode_unsigned_checked(&buf, 0, None)?, (624_485, 3));
//! # Ok::<(), dexleb::Error>(())
//! ```

pub mod error;
pub mod leb128;
pub mod reader;

pub use error::{Error, Result};
pub use leb128::{
    MAX_LEB128_LEN, decode_signed, decode_signed_checked, decode_unsigned,
    decode_unsigned_checked, decode_unsigned_p1, decode_unsigned_p1_checked, encode_signed,
    encode_unsigned, encode_unsigned_p1, push_signed, push_unsigned, signed_size,
    unsigned_p1_size, unsigned_size,
};
pub use reader::Leb128Reader;
