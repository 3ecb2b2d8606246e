// src/compat.rs
//
// Loose check that a bootloader was built for the media it is going onto.
// A bootloader counts as built for some media if every byte string in that
// media's signature set occurs somewhere in it.

use crate::disk_formats::{FloppyProfile, MediaVariant};
use crate::error::Warning;

#[derive(Debug, Clone)]
pub struct SignatureSet {
    pub media: MediaVariant,
    pub signatures: &'static [&'static [u8]],
}

impl SignatureSet {
    pub fn matches(&self, bootloader: &[u8]) -> bool {
        self.signatures.iter().all(|sig| contains(bootloader, sig))
    }
}

/// Signature sets for every bootloader build we know how to recognise.
#[derive(Debug, Clone)]
pub struct MediaCatalog {
    pub signature_sets: Vec<SignatureSet>,
}

impl MediaCatalog {
    /// Signatures of the "Stepleton" bootloader builds.
    pub fn stepleton() -> Self {
        MediaCatalog {
            signature_sets: vec![
                SignatureSet {
                    media: MediaVariant::Sony400k,
                    signatures: &[b"\x4f\x07", b"\x7f\xff\x00\x00", b"\x0f\x1f\x2f\x3f\xff"],
                },
                SignatureSet {
                    media: MediaVariant::Sony800k,
                    signatures: &[b"\x4f\x07", b"\x7f\xfe\x00\x00", b"\x0f\x1f\x2f\x3f\xff"],
                },
                SignatureSet {
                    media: MediaVariant::Twiggy,
                    signatures: &[
                        b"\x2d\x0e",
                        b"\x7f\xfe\x00\x00",
                        b"\x03\x0a\x10\x16\x1c\x22\x29\xff",
                    ],
                },
            ],
        }
    }

    /// Every media whose signature set is fully present in `bootloader`.
    pub fn matching_media(&self, bootloader: &[u8]) -> Vec<MediaVariant> {
        self.signature_sets
            .iter()
            .filter(|set| set.matches(bootloader))
            .map(|set| set.media)
            .collect()
    }

    /// Identifies the bootloader build, if exactly one signature set matches.
    pub fn classify(&self, bootloader: &[u8]) -> Option<MediaVariant> {
        match self.matching_media(bootloader).as_slice() {
            [media] => Some(*media),
            _ => None,
        }
    }

    /// Checks `bootloader` against `target`. Returns a warning if the build is
    /// unknown or not one considered suitable for the target media.
    pub fn check(&self, bootloader: &[u8], target: &FloppyProfile) -> Option<Warning> {
        let Some(built_for) = self.classify(bootloader) else {
            return Some(Warning::UnknownBootloader);
        };
        log::info!("bootloader appears to be built for {} media", built_for);

        if target.compatible_bootloaders.contains(&built_for) {
            None
        } else {
            Some(Warning::MediaMismatch { bootloader: built_for, target: target.media })
        }
    }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    needle.is_empty() || haystack.windows(needle.len()).any(|w| w == needle)
}
