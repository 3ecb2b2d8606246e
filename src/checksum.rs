// src/checksum.rs
//
// Both checksums walk the buffer as big-endian 16-bit words. Callers only pass
// even-length buffers; a trailing odd byte would be ignored.

use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::Cursor;

fn words(data: &[u8]) -> impl Iterator<Item = u16> + '_ {
    data.chunks_exact(2).map(BigEndian::read_u16)
}

/// DiskCopy 4.2 checksum: add each word, then rotate the 32-bit sum right by one.
pub fn container_checksum(data: &[u8]) -> u32 {
    words(data).fold(0u32, |acc, w| acc.wrapping_add(w as u32).rotate_right(1))
}

/// Checksum the bootloader uses to verify the sectors it loaded.
///
/// Covers `program_size` rounded up to a whole number of 512-byte sectors.
/// Each step adds a word, truncates to 16 bits and rotates left by one.
pub fn program_checksum(data: &[u8], program_size: usize) -> u16 {
    let extent = (program_size + 0x1FF) & !0x1FF;
    words(&data[..extent.min(data.len())]).fold(0u16, |acc, w| acc.wrapping_add(w).rotate_left(1))
}

/// Reads back a stored big-endian program checksum.
pub fn read_program_checksum(bytes: &[u8]) -> std::io::Result<u16> {
    Cursor::new(bytes).read_u16::<BigEndian>()
}
