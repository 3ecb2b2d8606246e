// src/disk_formats/mod.rs

pub mod sony;
pub mod twiggy;

pub use sony::{SONY_400K, SONY_800K};
pub use twiggy::TWIGGY;

use std::fmt;

/// The kinds of floppy media a bootable image can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum MediaVariant {
    /// 400k single-sided Sony 3.5" disk.
    #[value(name = "sony-400k")]
    Sony400k,
    /// 800k double-sided Sony 3.5" disk.
    #[value(name = "sony-800k")]
    Sony800k,
    /// 860k double-sided Twiggy 5.25" disk.
    #[value(name = "twiggy")]
    Twiggy,
}

impl MediaVariant {
    pub const ALL: [MediaVariant; 3] =
        [MediaVariant::Sony400k, MediaVariant::Sony800k, MediaVariant::Twiggy];

    pub fn profile(self) -> &'static FloppyProfile {
        match self {
            MediaVariant::Sony400k => &SONY_400K,
            MediaVariant::Sony800k => &SONY_800K,
            MediaVariant::Twiggy => &TWIGGY,
        }
    }
}

impl fmt::Display for MediaVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MediaVariant::Sony400k => "sony-400k",
            MediaVariant::Sony800k => "sony-800k",
            MediaVariant::Twiggy => "twiggy",
        })
    }
}

/// How sectors from the two sides of a disk are ordered in the image file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SideLayout {
    /// All of side 1, then all of side 2 (or a single side).
    Contiguous,
    /// Side 1 track t, then side 2 track t, for every track.
    TrackInterleaved,
}

/// Sizes and DiskCopy codes for one kind of floppy media.
#[derive(Debug, Clone, Copy)]
pub struct FloppyProfile {
    pub media: MediaVariant,
    pub name: &'static str,
    pub data_size: usize,
    pub tag_size: usize,
    pub disk_type: u8,
    pub format: u8,
    /// Bootloader builds considered suitable for this media.
    pub compatible_bootloaders: &'static [MediaVariant],
    pub layout: SideLayout,
}

impl FloppyProfile {
    pub fn sectors(&self) -> usize {
        self.data_size / crate::SECTOR_SIZE
    }

    /// Reorders side-contiguous data and tags into the order stored in the image.
    pub fn to_disk_order(&self, data: Vec<u8>, tags: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
        match self.layout {
            SideLayout::Contiguous => (data, tags),
            SideLayout::TrackInterleaved => {
                log::info!("interleaving sides for {}", self.name);
                (
                    sony::interleave_sides(&data, crate::SECTOR_SIZE),
                    sony::interleave_sides(&tags, crate::TAG_SIZE),
                )
            }
        }
    }

    /// Inverse of [`FloppyProfile::to_disk_order`].
    pub fn from_disk_order(&self, data: Vec<u8>, tags: Vec<u8>) -> (Vec<u8>, Vec<u8>) {
        match self.layout {
            SideLayout::Contiguous => (data, tags),
            SideLayout::TrackInterleaved => (
                sony::split_sides(&data, crate::SECTOR_SIZE),
                sony::split_sides(&tags, crate::TAG_SIZE),
            ),
        }
    }
}

/// Identifies the media from the fields of a DiskCopy header.
pub fn infer_profile(
    data_size: usize,
    tag_size: usize,
    disk_type: u8,
    format: u8,
) -> Option<&'static FloppyProfile> {
    MediaVariant::ALL
        .iter()
        .map(|m| m.profile())
        .find(|p| {
            p.data_size == data_size
                && p.tag_size == tag_size
                && p.disk_type == disk_type
                && p.format == format
        })
}
