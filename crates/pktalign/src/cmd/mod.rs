use std::path::{Path, PathBuf};

use clap::{Args, Subcommand};
use pktalign_proto::ProtocolDescriptor;

use crate::exit::{io_error, CliError, CliResult, DATA_INVALID, INTERNAL};
use crate::output::OutputFormat;

pub mod envinfo;
pub mod gen;
pub mod info;
pub mod run;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Generate a synthetic capture of framed bus words.
    Gen(GenArgs),
    /// Align a capture stream and print per-word metadata.
    Run(RunArgs),
    /// Validate a descriptor file and print its layout.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
    /// Print build and environment diagnostics.
    Envinfo(EnvinfoArgs),
}

pub fn dispatch(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Gen(args) => gen::run(args),
        Command::Run(args) => run::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
        Command::Envinfo(args) => envinfo::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct GenArgs {
    /// Output capture file. Writes to stdout when omitted.
    pub output: Option<PathBuf>,
    /// Descriptor JSON file.
    #[arg(long, value_name = "FILE", conflicts_with = "demo")]
    pub descriptor: Option<PathBuf>,
    /// Use the built-in demo descriptor (H=6, L=3, pattern 45 32 11).
    #[arg(long)]
    pub demo: bool,
    /// Bus word width in bytes.
    #[arg(long, default_value = "16")]
    pub word_bytes: usize,
    /// Channel-id width in bits (2^bits channels).
    #[arg(long, default_value = "2")]
    pub channel_bits: u8,
    /// Number of channels to put traffic on.
    #[arg(long, default_value = "2")]
    pub active_channels: u16,
    /// Messages to generate per active channel.
    #[arg(long, default_value = "16")]
    pub messages: usize,
    /// Maximum message length in bytes (clamped to the length field's range).
    #[arg(long, default_value = "64")]
    pub max_len: u64,
    /// Percent chance of an idle step after each word.
    #[arg(long, default_value = "0")]
    pub idle: u8,
    /// Seed for deterministic output.
    #[arg(long)]
    pub seed: Option<u64>,
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Input capture file. Reads from stdin when omitted.
    pub input: Option<PathBuf>,
    /// Descriptor JSON file.
    #[arg(long, value_name = "FILE", conflicts_with = "demo")]
    pub descriptor: Option<PathBuf>,
    /// Use the built-in demo descriptor.
    #[arg(long)]
    pub demo: bool,
    /// Print only words with at least one header candidate.
    #[arg(long)]
    pub matches_only: bool,
    /// Stop after processing N words.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Descriptor JSON file.
    #[arg(value_name = "FILE", conflicts_with = "demo")]
    pub descriptor: Option<PathBuf>,
    /// Describe the built-in demo descriptor.
    #[arg(long)]
    pub demo: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Args, Debug, Default)]
pub struct EnvinfoArgs {}

/// Load a descriptor from a JSON file, or fall back to the built-in demo
/// protocol when no file is given.
pub fn load_descriptor(path: Option<&Path>) -> CliResult<ProtocolDescriptor> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?;
            serde_json::from_str(&text).map_err(|err| {
                CliError::new(
                    DATA_INVALID,
                    format!("invalid descriptor {}: {err}", path.display()),
                )
            })
        }
        None => demo_descriptor(),
    }
}

/// The demo protocol: 6-byte header, 3 pattern bytes 45 32 11, 3-byte
/// big-endian length field.
pub fn demo_descriptor() -> CliResult<ProtocolDescriptor> {
    ProtocolDescriptor::new(
        6,
        6,
        3,
        vec![true, true, true, false, false, false],
        vec![0x45, 0x32, 0x11, 0x00, 0x00, 0x00],
    )
    .map_err(|err| CliError::new(INTERNAL, format!("demo descriptor: {err}")))
}
