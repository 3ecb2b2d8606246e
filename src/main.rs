use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::path::{Path, PathBuf};

mod assembler;
mod checksum;
mod compat;
mod disk_formats;
mod error;
mod image_types;
mod loader;
mod tags;

use compat::MediaCatalog;
use disk_formats::MediaVariant;
use tags::{DefaultTags, LineTags, TagSource};

pub const SECTOR_SIZE: usize = 512;
pub const TAG_SIZE: usize = 12;
/// The bootloader fills exactly the first sector.
pub const BOOTLOADER_SIZE: usize = SECTOR_SIZE;

#[derive(Parser)]
#[command(about = "Build bootable Lisa floppy disk images (DiskCopy 4.2)")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Embed a bootloader and a 68000 program (loaded at $800) in a disk image
    Build {
        /// Program binary to load and run
        program: PathBuf,
        /// Where to write the disk image; `-` for standard output
        #[arg(short, long, default_value = "-")]
        output: PathBuf,
        /// "Stepleton" bootloader binary
        #[arg(short, long, default_value = "Bootloader.bin")]
        bootloader: PathBuf,
        /// Text file with one loading-display tag per line
        #[arg(short, long)]
        tags_file: Option<PathBuf>,
        /// Target floppy media
        #[arg(short, long, value_enum, default_value_t = MediaVariant::Sony400k)]
        floppy: MediaVariant,
        #[arg(long)]
        verbose: bool,
    },
    /// Describe a DiskCopy 4.2 image and verify its checksums
    Display {
        #[arg(short, long)]
        input: PathBuf,
        /// List the tag of every program sector
        #[arg(long)]
        tags: bool,
        #[arg(long)]
        verbose: bool,
    },
}

fn init_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn open(path: &Path, what: &str) -> Result<File> {
    File::open(path).with_context(|| format!("cannot open {} file {}", what, path.display()))
}

/// `-` names standard output.
fn is_stdout(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn output_writer(path: &Path) -> Result<Box<dyn Write>> {
    if is_stdout(path) {
        return Ok(Box::new(io::stdout().lock()));
    }
    let file = File::create(path).with_context(|| format!("cannot create {}", path.display()))?;
    Ok(Box::new(file))
}

fn build(
    program: &Path,
    output: &Path,
    bootloader: &Path,
    tags_file: Option<&Path>,
    floppy: MediaVariant,
) -> Result<()> {
    let catalog = MediaCatalog::stepleton();
    let profile = floppy.profile();

    let mut tag_source: Box<dyn TagSource> = match tags_file {
        Some(path) => Box::new(LineTags::new(BufReader::new(open(path, "tags")?))),
        None => Box::new(DefaultTags::default()),
    };

    let built = assembler::build_image(
        open(bootloader, "bootloader")?,
        open(program, "program")?,
        tag_source.as_mut(),
        profile,
        &catalog,
    )
    .context("disk image not written")?;

    for warning in &built.warnings {
        log::warn!("{}", warning);
    }

    // The image is complete in memory; only now touch the output.
    built.image.write_to(&mut output_writer(output)?)?;

    log::info!(
        "wrote {} image for a {}-byte program (checksum {:04X}) to {}",
        profile.name,
        built.program_size,
        built.program_checksum,
        output.display()
    );
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { program, output, bootloader, tags_file, floppy, verbose } => {
            init_logging(verbose);
            build(&program, &output, &bootloader, tags_file.as_deref(), floppy)?;
        }
        Commands::Display { input, tags, verbose } => {
            init_logging(verbose);
            let mut raw = Vec::new();
            open(&input, "image")?.read_to_end(&mut raw)?;
            println!("{}", assembler::display(&raw, &MediaCatalog::stepleton(), tags)?);
        }
    }
    Ok(())
}
