// src/tags.rs
//
// Sector tags read by the "Stepleton" bootloader. The bootloader prints the
// tag of every program sector but the last while loading, so the tags double
// as a progress display.

use crate::error::{BuildError, Warning};
use crate::{SECTOR_SIZE, TAG_SIZE};
use std::io::{self, BufRead};

/// Tag for the bootloader's own sector. Only the $AAAA at offset 4 matters:
/// it marks the disk as bootable.
pub const BOOT_TAG: [u8; TAG_SIZE] = *b"Booo\xaa\xaaoooot!";

/// Tag of the last program sector is this marker followed by the program checksum.
pub const LAST_TAG_MARKER: [u8; 10] = *b"Last out!\0";

/// A finite, non-restartable stream of tag lines.
pub trait TagSource {
    /// The next raw line, or `None` once the source is exhausted. Lines are
    /// bytes; anything outside the ROM's character set is rejected later.
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>>;
}

/// Tag lines read from a text file, one tag per line.
pub struct LineTags<R> {
    reader: R,
}

impl<R: BufRead> LineTags<R> {
    pub fn new(reader: R) -> Self {
        LineTags { reader }
    }
}

impl<R: BufRead> TagSource for LineTags<R> {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        let mut line = Vec::new();
        match self.reader.read_until(b'\n', &mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Stand-in used when no tag file is given: `READ 0.5K`, `READ 1.0K`, ...
#[derive(Debug, Default)]
pub struct DefaultTags {
    sectors_read: u32,
}

impl TagSource for DefaultTags {
    fn next_line(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.sectors_read += 1;
        Ok(Some(format!("READ {:.1}K\n", 0.5 * self.sectors_read as f64).into_bytes()))
    }
}

fn is_rom_char(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'0'..=b'9' | b' ' | b'.' | b'/' | b'-' | b'?')
}

/// Turns one raw line into a 12-byte tag.
///
/// Line endings are clipped, the characters are checked against those the
/// boot ROM can display, and the result is space-padded or truncated.
pub fn make_tag(line: &[u8], warnings: &mut Vec<Warning>) -> Result<[u8; TAG_SIZE], BuildError> {
    let end = line.iter().rposition(|&b| b != b'\r' && b != b'\n').map_or(0, |i| i + 1);
    let tag = &line[..end];

    if let Some(&byte) = tag.iter().find(|&&b| !is_rom_char(b)) {
        return Err(BuildError::InvalidTagCharacter {
            tag: String::from_utf8_lossy(tag).into_owned(),
            byte,
        });
    }

    // Only ROM characters are left, all of them ASCII.
    if tag.len() > TAG_SIZE {
        warnings.push(Warning::TagTruncated { tag: String::from_utf8_lossy(tag).into_owned() });
    }

    let mut out = [b' '; TAG_SIZE];
    let len = tag.len().min(TAG_SIZE);
    out[..len].copy_from_slice(&tag[..len]);
    Ok(out)
}

/// Number of tags pulled from the tag source for a program of `program_size` bytes.
pub fn content_tag_count(program_size: usize) -> usize {
    program_size.saturating_sub(1) / SECTOR_SIZE
}

/// Builds the complete tag region for the disk.
///
/// Sector order: the boot tag, one tag from `source` for every program sector
/// except the last, the end marker carrying `checksum`, then zeros up to
/// `tag_region_size`.
pub fn assemble_tags(
    source: &mut dyn TagSource,
    checksum: u16,
    program_size: usize,
    tag_region_size: usize,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<u8>, BuildError> {
    let mut tags = Vec::with_capacity(tag_region_size);
    tags.extend_from_slice(&BOOT_TAG);

    let required = content_tag_count(program_size);
    for supplied in 0..required {
        let line = source
            .next_line()?
            .ok_or(BuildError::TagSourceExhausted { supplied, required })?;
        tags.extend_from_slice(&make_tag(&line, warnings)?);
    }

    tags.extend_from_slice(&LAST_TAG_MARKER);
    tags.extend_from_slice(&checksum.to_be_bytes());

    tags.resize(tag_region_size, 0);
    log::debug!("assembled {} content tags, checksum {:04X}", required, checksum);
    Ok(tags)
}
