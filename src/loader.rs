// src/loader.rs
use crate::error::BuildError;
use std::io::Read;

/// Bytes loaded from an input file, zero-padded out to a fixed capacity.
#[derive(Debug, Clone)]
pub struct PaddedBinary {
    pub data: Vec<u8>,
    /// Length of the input before padding.
    pub original_size: usize,
}

/// Reads at most `size` bytes from `source` and zero-pads them to exactly `size`.
///
/// One extra byte is requested so that inputs larger than `size` are detected
/// without reading the whole source. Empty inputs are rejected.
pub fn read_padded<R: Read>(
    source: R,
    size: usize,
    name: &'static str,
) -> Result<PaddedBinary, BuildError> {
    let mut data = Vec::with_capacity(size + 1);
    source.take(size as u64 + 1).read_to_end(&mut data)?;

    if data.is_empty() {
        return Err(BuildError::EmptyInput { name });
    }
    if data.len() > size {
        return Err(BuildError::OversizeInput { name, capacity: size });
    }

    let original_size = data.len();
    data.resize(size, 0);
    log::debug!("loaded {} {} bytes, padded to {}", original_size, name, size);
    Ok(PaddedBinary { data, original_size })
}
