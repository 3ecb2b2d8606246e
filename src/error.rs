// src/error.rs
use crate::disk_formats::MediaVariant;
use thiserror::Error;

/// Fatal failures. Any of these aborts the build before output is written.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to read any {name} data")]
    EmptyInput { name: &'static str },
    #[error("{name} data file was larger than {capacity} bytes")]
    OversizeInput { name: &'static str, capacity: usize },
    #[error("ran out of tags in the tag source after {supplied} of {required} tags")]
    TagSourceExhausted { supplied: usize, required: usize },
    #[error("tag {tag:?} has chars not found in the ROM (offending byte ${byte:02X})")]
    InvalidTagCharacter { tag: String, byte: u8 },
    #[error("invalid disk image: {0}")]
    InvalidImage(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Advisory diagnostics. These never change the bytes of the image.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Warning {
    #[error("tag {tag:?} will be clipped to 12 bytes")]
    TagTruncated { tag: String },
    #[error("bootloader appears to be of an unknown type")]
    UnknownBootloader,
    #[error(
        "a bootloader built for {bootloader} media may not be suitable for {target} media; \
         proceed with caution"
    )]
    MediaMismatch { bootloader: MediaVariant, target: MediaVariant },
}
