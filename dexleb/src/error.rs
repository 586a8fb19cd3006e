use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// The encoding starting at this offset runs past the readable bound,
    /// or is five bytes long with bits set in the fifth byte's high nibble.
    #[error("Invalid LEB128 encoding at offset {0:#x}")]
    InvalidLeb128(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
