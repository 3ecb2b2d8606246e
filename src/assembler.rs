// src/assembler.rs
use crate::checksum::{program_checksum, read_program_checksum};
use crate::compat::MediaCatalog;
use crate::disk_formats::{self, FloppyProfile};
use crate::error::{BuildError, Warning};
use crate::image_types::dc42::Dc42Image;
use crate::loader::read_padded;
use crate::tags::{assemble_tags, TagSource, BOOT_TAG, LAST_TAG_MARKER};
use crate::{BOOTLOADER_SIZE, SECTOR_SIZE, TAG_SIZE};
use std::io::Read;

/// Result of a successful build.
#[derive(Debug)]
pub struct BuiltImage {
    pub image: Dc42Image,
    pub program_size: usize,
    pub program_checksum: u16,
    pub warnings: Vec<Warning>,
}

/// Assembles a bootable DiskCopy 4.2 image for `profile`.
///
/// Nothing is returned unless every stage succeeds; warnings are collected
/// along the way and never change the image.
pub fn build_image<B: Read, P: Read>(
    bootloader: B,
    program: P,
    tags: &mut dyn TagSource,
    profile: &FloppyProfile,
    catalog: &MediaCatalog,
) -> Result<BuiltImage, BuildError> {
    let mut warnings = Vec::new();

    let bootloader = read_padded(bootloader, BOOTLOADER_SIZE, "bootloader")?;
    warnings.extend(catalog.check(&bootloader.data, profile));

    // The bootloader occupies the first sector; the program gets the rest.
    let program = read_padded(program, profile.data_size - BOOTLOADER_SIZE, "program")?;
    let checksum = program_checksum(&program.data, program.original_size);
    log::info!(
        "program is {} bytes ({} sectors), checksum {:04X}",
        program.original_size,
        program.original_size.div_ceil(SECTOR_SIZE),
        checksum
    );

    let mut data = bootloader.data;
    data.extend_from_slice(&program.data);

    let tag_data = assemble_tags(
        tags,
        checksum,
        program.original_size,
        profile.tag_size,
        &mut warnings,
    )?;

    let (data, tag_data) = profile.to_disk_order(data, tag_data);
    let image = Dc42Image::new(profile, data, tag_data);

    Ok(BuiltImage {
        image,
        program_size: program.original_size,
        program_checksum: checksum,
        warnings,
    })
}

fn ok_or_mismatch(ok: bool) -> &'static str {
    if ok { "ok" } else { "MISMATCH" }
}

/// Human-readable report on a DiskCopy 4.2 image.
///
/// For media this tool knows, the tags are read back in sector order to find
/// the program's extent and check the checksum stored in its last tag.
pub fn display(raw: &[u8], catalog: &MediaCatalog, list_tags: bool) -> Result<String, BuildError> {
    let image = Dc42Image::parse(raw)?;
    let header = &image.header;
    let mut output = Vec::new();

    output.push(format!("DiskCopy 4.2 image: {:?}", header.name));
    output.push(format!(
        "Data: {} bytes, checksum {:08X} ({})",
        header.data_size,
        header.data_checksum,
        ok_or_mismatch(image.data_checksum_ok())
    ));
    output.push(format!(
        "Tags: {} bytes, checksum {:08X} ({})",
        header.tag_size,
        header.tag_checksum,
        ok_or_mismatch(image.tag_checksum_ok())
    ));
    output.push(format!(
        "Disk type ${:02X}, format ${:02X}, magic ${:04X}",
        header.disk_type, header.format, header.magic
    ));

    let Some(profile) = disk_formats::infer_profile(
        header.data_size as usize,
        header.tag_size as usize,
        header.disk_type,
        header.format,
    ) else {
        output.push("Detected Media: unknown".to_string());
        return Ok(output.join("\n"));
    };
    output.push(format!(
        "Detected Media: {} ({}, {} sectors)",
        profile.name,
        profile.media,
        profile.sectors()
    ));

    let (data, tags) = profile.from_disk_order(image.data, image.tags);
    let sector_tags: Vec<&[u8]> = tags.chunks_exact(TAG_SIZE).collect();

    let bootable = sector_tags.first().map_or(false, |t| t[4..6] == BOOT_TAG[4..6]);
    output.push(format!("Bootable: {}", if bootable { "yes" } else { "no" }));

    let loader = &data[..BOOTLOADER_SIZE];
    match (catalog.check(loader, profile), catalog.classify(loader)) {
        (Some(warning), _) => output.push(format!("Bootloader: {}", warning)),
        (None, Some(media)) => output.push(format!("Bootloader: built for {}", media)),
        (None, None) => output.push("Bootloader: unknown".to_string()),
    }

    let last = sector_tags
        .iter()
        .skip(1)
        .position(|t| t[..LAST_TAG_MARKER.len()] == LAST_TAG_MARKER)
        .map(|i| i + 1);

    match last {
        Some(last) => {
            let stored = read_program_checksum(&sector_tags[last][LAST_TAG_MARKER.len()..])?;
            let computed = program_checksum(&data[BOOTLOADER_SIZE..], last * SECTOR_SIZE);
            output.push(format!(
                "Program: {} sectors, checksum {:04X} ({})",
                last,
                stored,
                ok_or_mismatch(stored == computed)
            ));
            if list_tags {
                for (sector, tag) in sector_tags[1..last].iter().enumerate() {
                    output.push(format!("Sector {}: {}", sector + 1, String::from_utf8_lossy(tag)));
                }
            }
        }
        None => output.push("Program: no end-of-program tag found".to_string()),
    }

    Ok(output.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::disk_formats::{MediaVariant, SONY_400K, SONY_800K, TWIGGY};
    use crate::image_types::dc42::HEADER_SIZE;
    use crate::tags::{DefaultTags, LineTags};
    use std::io::Cursor;

    fn sony_400k_loader() -> Vec<u8> {
        let mut loader = vec![0x4E, 0x71, 0x4F, 0x07, 0x4E, 0x71, 0x7F, 0xFF, 0x00, 0x00];
        loader.extend_from_slice(&[0x0F, 0x1F, 0x2F, 0x3F, 0xFF]);
        loader
    }

    fn build(
        program: &[u8],
        tags: &mut dyn TagSource,
        profile: &FloppyProfile,
    ) -> Result<BuiltImage, BuildError> {
        build_image(
            Cursor::new(sony_400k_loader()),
            Cursor::new(program.to_vec()),
            tags,
            profile,
            &MediaCatalog::stepleton(),
        )
    }

    #[test]
    fn image_has_header_data_and_tags() {
        let program: Vec<u8> = (0..1500u32).map(|i| (i % 253) as u8).collect();
        let built = build(&program, &mut DefaultTags::default(), &SONY_400K).unwrap();
        assert!(built.warnings.is_empty());
        assert_eq!(built.program_size, 1500);

        let raw = built.image.to_bytes();
        assert_eq!(raw.len(), HEADER_SIZE + 0x64000 + 0x2580);
        assert_eq!(&raw[HEADER_SIZE..HEADER_SIZE + 15], sony_400k_loader().as_slice());
        assert_eq!(&raw[HEADER_SIZE + 512..HEADER_SIZE + 2012], program.as_slice());
        assert!(raw[HEADER_SIZE + 2012..HEADER_SIZE + 0x64000].iter().all(|&b| b == 0));

        let tags = &raw[HEADER_SIZE + 0x64000..];
        assert_eq!(&tags[..12], &BOOT_TAG);
        assert_eq!(&tags[12..24], b"READ 0.5K   ");
        assert_eq!(&tags[24..36], b"READ 1.0K   ");
        assert_eq!(&tags[36..46], &LAST_TAG_MARKER);
        assert_eq!(&tags[46..48], &built.program_checksum.to_be_bytes());
    }

    #[test]
    fn empty_program_is_rejected() {
        let err = build(&[], &mut DefaultTags::default(), &SONY_400K).unwrap_err();
        assert!(matches!(err, BuildError::EmptyInput { name: "program" }));
    }

    #[test]
    fn oversized_program_is_rejected() {
        let program = vec![0u8; 0x64000 - 512 + 1];
        let err = build(&program, &mut DefaultTags::default(), &SONY_400K).unwrap_err();
        assert!(matches!(err, BuildError::OversizeInput { name: "program", capacity: 0x63E00 }));
    }

    #[test]
    fn oversized_bootloader_is_rejected() {
        let err = build_image(
            Cursor::new(vec![0u8; 513]),
            Cursor::new(vec![0u8; 2]),
            &mut DefaultTags::default(),
            &SONY_400K,
            &MediaCatalog::stepleton(),
        )
        .unwrap_err();
        assert!(matches!(err, BuildError::OversizeInput { name: "bootloader", .. }));
    }

    #[test]
    fn all_zero_single_sector_program() {
        let built = build(&[0u8; 2], &mut LineTags::new(Cursor::new(Vec::new())), &TWIGGY).unwrap();
        assert_eq!(built.program_checksum, 0);
        let tags = &built.image.tags;
        assert_eq!(tags.len(), TWIGGY.tag_size);
        assert_eq!(&tags[..12], &BOOT_TAG);
        assert_eq!(&tags[12..22], &LAST_TAG_MARKER);
        assert_eq!(&tags[22..24], &[0, 0]);
        assert!(tags[24..].iter().all(|&b| b == 0));
    }

    #[test]
    fn program_of_1024_bytes_uses_one_content_tag() {
        let mut source = LineTags::new(Cursor::new(b"FIRST\nSECOND\n".to_vec()));
        let built = build(&[0x11; 1024], &mut source, &SONY_400K).unwrap();
        let tags = &built.image.tags;
        assert_eq!(&tags[12..24], b"FIRST       ");
        assert_eq!(&tags[24..34], &LAST_TAG_MARKER);
        assert_eq!(source.next_line().unwrap().as_deref(), Some(&b"SECOND\n"[..]));
    }

    #[test]
    fn tag_errors_abort_the_build() {
        let mut source = LineTags::new(Cursor::new(b"ok\n".to_vec()));
        let err = build(&[1u8; 600], &mut source, &SONY_400K).unwrap_err();
        assert!(matches!(err, BuildError::InvalidTagCharacter { .. }));

        let mut source = LineTags::new(Cursor::new(Vec::new()));
        let err = build(&[1u8; 600], &mut source, &SONY_400K).unwrap_err();
        assert!(matches!(err, BuildError::TagSourceExhausted { supplied: 0, required: 1 }));
    }

    #[test]
    fn warnings_do_not_change_the_image() {
        let mut source = LineTags::new(Cursor::new(b"THIS TAG IS FAR TOO LONG\n".to_vec()));
        let built = build(&[7u8; 700], &mut source, &SONY_400K).unwrap();
        assert_eq!(built.warnings.len(), 1);
        assert_eq!(&built.image.tags[12..24], b"THIS TAG IS ");

        let unknown = build_image(
            Cursor::new(vec![0u8; 16]),
            Cursor::new(vec![7u8; 700]),
            &mut LineTags::new(Cursor::new(b"THIS TAG IS \n".to_vec())),
            &SONY_400K,
            &MediaCatalog::stepleton(),
        )
        .unwrap();
        assert_eq!(unknown.warnings, vec![Warning::UnknownBootloader]);
        assert_eq!(unknown.image.tags, built.image.tags);
    }

    #[test]
    fn mismatched_media_is_only_a_warning() {
        let built = build(&[1, 2, 3, 4], &mut DefaultTags::default(), &SONY_800K).unwrap();
        assert_eq!(
            built.warnings,
            vec![Warning::MediaMismatch {
                bootloader: MediaVariant::Sony400k,
                target: MediaVariant::Sony800k,
            }]
        );
    }

    #[test]
    fn sony_800k_images_are_side_interleaved() {
        // Fill both sides so that side 2 track 0 is recognisable.
        let mut program = vec![0x55u8; 0x64000 - 512];
        program.extend_from_slice(&[0xAA; 0x64000]);
        let built = build(&program, &mut DefaultTags::default(), &SONY_800K).unwrap();
        let data = &built.image.data;
        assert_eq!(&data[..15], sony_400k_loader().as_slice());
        assert_eq!(data[12 * 512 - 1], 0x55);
        assert!(data[12 * 512..24 * 512].iter().all(|&b| b == 0xAA));
        assert_eq!(data[24 * 512], 0x55);

        // Boot tag stays first; side 2 track 0 tags follow side 1 track 0.
        let tags = &built.image.tags;
        assert_eq!(&tags[..12], &BOOT_TAG);
        assert_eq!(&tags[12 * 12..12 * 12 + 9], b"READ 400.");
    }

    #[test]
    fn builds_are_deterministic() {
        let program: Vec<u8> = (0..5000u32).map(|i| (i * 3) as u8).collect();
        let a = build(&program, &mut DefaultTags::default(), &SONY_800K).unwrap();
        let b = build(&program, &mut DefaultTags::default(), &SONY_800K).unwrap();
        assert_eq!(a.image.to_bytes(), b.image.to_bytes());
    }

    #[test]
    fn display_verifies_built_images() {
        let program: Vec<u8> = (0..3000u32).map(|i| (i * 7) as u8).collect();
        for profile in [&SONY_400K, &SONY_800K, &TWIGGY] {
            let mut source = LineTags::new(Cursor::new(b"ONE\nTWO\nTHREE\nFOUR\nFIVE\n".to_vec()));
            let built = build(&program, &mut source, profile).unwrap();
            let raw = built.image.to_bytes();
            let report = display(&raw, &MediaCatalog::stepleton(), true).unwrap();
            assert!(report.contains("Bootable: yes"), "{}", report);
            assert!(!report.contains("MISMATCH"), "{}", report);
            assert!(report.contains("Program: 6 sectors"), "{}", report);
            assert!(report.contains("Sector 5: FIVE"), "{}", report);
        }
    }

    #[test]
    fn display_flags_corruption() {
        let built = build(&[9u8; 2000], &mut DefaultTags::default(), &SONY_400K).unwrap();
        let mut raw = built.image.to_bytes();
        raw[HEADER_SIZE + 600] ^= 1;
        let report = display(&raw, &MediaCatalog::stepleton(), false).unwrap();
        assert!(report.contains("Data: 409600 bytes"));
        assert!(report.contains("(MISMATCH)"));
    }

    #[test]
    fn display_rejects_garbage() {
        assert!(display(&[0u8; 10], &MediaCatalog::stepleton(), false).is_err());
    }
}
