// src/disk_formats/twiggy.rs

use super::{FloppyProfile, MediaVariant, SideLayout};

/// 860k Twiggy disk as stored by BLU. Sides are already contiguous in the image.
pub const TWIGGY: FloppyProfile = FloppyProfile {
    media: MediaVariant::Twiggy,
    name: "860k Twiggy 5.25\"",
    data_size: 0xD4C00,
    tag_size: 0x4FC8,
    disk_type: 0x54, // BLU's disk code for Twiggy
    format: 0x01,    // BLU's format code for Twiggy
    compatible_bootloaders: &[MediaVariant::Twiggy],
    layout: SideLayout::Contiguous,
};
