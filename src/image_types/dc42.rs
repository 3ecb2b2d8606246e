// src/image_types/dc42.rs
//
// DiskCopy 4.2 container. All fields are big-endian.
//
//   0   64  disk name, Pascal string, NUL padded
//   64   4  data size
//   68   4  tag size
//   72   4  data checksum
//   76   4  tag checksum (skips the first 12 tag bytes)
//   80   1  disk type
//   81   1  format byte
//   82   2  magic, 0x0100
//   84      data, then tags

use crate::checksum::container_checksum;
use crate::disk_formats::FloppyProfile;
use crate::error::BuildError;
use crate::TAG_SIZE;
use byteorder::{BigEndian, ByteOrder, ReadBytesExt};
use std::io::{Cursor, Read, Write};

pub const HEADER_SIZE: usize = 84;
pub const NAME_FIELD_SIZE: usize = 64;
pub const MAGIC: u16 = 0x0100;

/// Like all Lisa images, ours are named "-not a Macintosh disk-".
pub const LISA_DISK_NAME: &str = "-not a Macintosh disk-";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dc42Header {
    pub name: String,
    pub data_size: u32,
    pub tag_size: u32,
    pub data_checksum: u32,
    pub tag_checksum: u32,
    pub disk_type: u8,
    pub format: u8,
    pub magic: u16,
}

impl Dc42Header {
    pub fn encode(&self) -> [u8; HEADER_SIZE] {
        let mut raw = [0u8; HEADER_SIZE];
        raw[..NAME_FIELD_SIZE].copy_from_slice(&pascal_name(&self.name));
        BigEndian::write_u32(&mut raw[64..68], self.data_size);
        BigEndian::write_u32(&mut raw[68..72], self.tag_size);
        BigEndian::write_u32(&mut raw[72..76], self.data_checksum);
        BigEndian::write_u32(&mut raw[76..80], self.tag_checksum);
        raw[80] = self.disk_type;
        raw[81] = self.format;
        BigEndian::write_u16(&mut raw[82..84], self.magic);
        raw
    }

    pub fn read_from<R: Read>(input: &mut R) -> std::io::Result<Self> {
        let mut name = [0u8; NAME_FIELD_SIZE];
        input.read_exact(&mut name)?;
        let len = (name[0] as usize).min(NAME_FIELD_SIZE - 1);
        Ok(Dc42Header {
            name: String::from_utf8_lossy(&name[1..1 + len]).into_owned(),
            data_size: input.read_u32::<BigEndian>()?,
            tag_size: input.read_u32::<BigEndian>()?,
            data_checksum: input.read_u32::<BigEndian>()?,
            tag_checksum: input.read_u32::<BigEndian>()?,
            disk_type: input.read_u8()?,
            format: input.read_u8()?,
            magic: input.read_u16::<BigEndian>()?,
        })
    }
}

/// Length byte, at most 63 bytes of text, NUL padding.
fn pascal_name(name: &str) -> [u8; NAME_FIELD_SIZE] {
    let mut field = [0u8; NAME_FIELD_SIZE];
    let bytes = name.as_bytes();
    let len = bytes.len().min(NAME_FIELD_SIZE - 1);
    field[0] = len as u8;
    field[1..1 + len].copy_from_slice(&bytes[..len]);
    field
}

/// A complete disk image: header plus data and tags in on-disk order.
#[derive(Debug, Clone)]
pub struct Dc42Image {
    pub header: Dc42Header,
    pub data: Vec<u8>,
    pub tags: Vec<u8>,
}

impl Dc42Image {
    /// Wraps data and tags already in on-disk order, computing both checksums.
    pub fn new(profile: &FloppyProfile, data: Vec<u8>, tags: Vec<u8>) -> Self {
        let header = Dc42Header {
            name: LISA_DISK_NAME.to_string(),
            data_size: profile.data_size as u32,
            tag_size: profile.tag_size as u32,
            data_checksum: container_checksum(&data),
            tag_checksum: tag_checksum(&tags),
            disk_type: profile.disk_type,
            format: profile.format,
            magic: MAGIC,
        };
        log::debug!(
            "data checksum {:08X}, tag checksum {:08X}",
            header.data_checksum,
            header.tag_checksum
        );
        Dc42Image { header, data, tags }
    }

    pub fn write_to<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        out.write_all(&self.to_bytes())?;
        out.flush()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut raw = Vec::with_capacity(HEADER_SIZE + self.data.len() + self.tags.len());
        raw.extend_from_slice(&self.header.encode());
        raw.extend_from_slice(&self.data);
        raw.extend_from_slice(&self.tags);
        raw
    }

    pub fn parse(raw: &[u8]) -> Result<Self, BuildError> {
        if raw.len() < HEADER_SIZE {
            return Err(BuildError::InvalidImage(format!(
                "{} bytes is too short for a DiskCopy 4.2 header",
                raw.len()
            )));
        }
        let header = Dc42Header::read_from(&mut Cursor::new(raw))?;
        let data_end = HEADER_SIZE + header.data_size as usize;
        let tags_end = data_end + header.tag_size as usize;
        if raw.len() != tags_end {
            return Err(BuildError::InvalidImage(format!(
                "header declares {} data and {} tag bytes but {} bytes follow it",
                header.data_size,
                header.tag_size,
                raw.len() - HEADER_SIZE
            )));
        }
        Ok(Dc42Image {
            data: raw[HEADER_SIZE..data_end].to_vec(),
            tags: raw[data_end..tags_end].to_vec(),
            header,
        })
    }

    pub fn data_checksum_ok(&self) -> bool {
        container_checksum(&self.data) == self.header.data_checksum
    }

    pub fn tag_checksum_ok(&self) -> bool {
        tag_checksum(&self.tags) == self.header.tag_checksum
    }
}

/// The tag checksum leaves out the first sector's tag.
pub fn tag_checksum(tags: &[u8]) -> u32 {
    container_checksum(tags.get(TAG_SIZE..).unwrap_or(&[]))
}
