// src/disk_formats/sony.rs

use super::{FloppyProfile, MediaVariant, SideLayout};

/// 400k single-sided Sony disk (GCR, "Mac 400k" interleaving).
pub const SONY_400K: FloppyProfile = FloppyProfile {
    media: MediaVariant::Sony400k,
    name: "400k Sony 3.5\" SS",
    data_size: 0x64000,
    tag_size: 0x2580,
    disk_type: 0x00,
    format: 0x02,
    // An 800k bootloader build is also fine on 400k media; not the reverse.
    compatible_bootloaders: &[MediaVariant::Sony400k, MediaVariant::Sony800k],
    layout: SideLayout::Contiguous,
};

/// 800k double-sided Sony disk. DiskCopy stores its sides track by track.
pub const SONY_800K: FloppyProfile = FloppyProfile {
    media: MediaVariant::Sony800k,
    name: "800k Sony 3.5\" DS",
    data_size: 0xC8000,
    tag_size: 0x4B00,
    disk_type: 0x01,
    format: 0x22,
    compatible_bootloaders: &[MediaVariant::Sony800k],
    layout: SideLayout::TrackInterleaved,
};

/// Sony drives vary the spindle speed by zone: 16 tracks per zone, fewer
/// sectors per track towards the hub.
pub const TRACKS_PER_ZONE: usize = 16;
pub const ZONE_SECTORS: [usize; 5] = [12, 11, 10, 9, 8];

/// Sectors in each of the 80 tracks on one side.
pub fn track_sectors() -> impl Iterator<Item = usize> {
    ZONE_SECTORS
        .into_iter()
        .flat_map(|sectors| std::iter::repeat(sectors).take(TRACKS_PER_ZONE))
}

/// Byte ranges of each track within one side, for records of `unit` bytes per sector.
fn track_bounds(unit: usize) -> impl Iterator<Item = (usize, usize)> {
    track_sectors().scan(0, move |begin, sectors| {
        let start = *begin;
        *begin += sectors * unit;
        Some((start, *begin))
    })
}

/// Riffles the two halves of a side-contiguous buffer track by track.
///
/// `buf` must hold two full sides: `2 * 800 * unit` bytes.
pub fn interleave_sides(buf: &[u8], unit: usize) -> Vec<u8> {
    let side = buf.len() / 2;
    debug_assert_eq!(side, track_sectors().sum::<usize>() * unit);

    let mut out = Vec::with_capacity(buf.len());
    for (begin, end) in track_bounds(unit) {
        out.extend_from_slice(&buf[begin..end]);
        out.extend_from_slice(&buf[side + begin..side + end]);
    }
    out
}

/// Undoes [`interleave_sides`].
pub fn split_sides(buf: &[u8], unit: usize) -> Vec<u8> {
    let side = buf.len() / 2;
    debug_assert_eq!(side, track_sectors().sum::<usize>() * unit);

    let mut out = vec![0u8; buf.len()];
    let mut pos = 0;
    for (begin, end) in track_bounds(unit) {
        let len = end - begin;
        out[begin..end].copy_from_slice(&buf[pos..pos + len]);
        pos += len;
        out[side + begin..side + end].copy_from_slice(&buf[pos..pos + len]);
        pos += len;
    }
    out
}
