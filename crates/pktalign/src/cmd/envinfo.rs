use std::collections::BTreeMap;

use serde::Serialize;

use crate::cmd::EnvinfoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct PlatformInfo {
    os: String,
    arch: String,
}

#[derive(Serialize)]
struct EnvInfoOutput {
    version: String,
    target: String,
    rust_version: String,
    git_hash: String,
    capture_format: u8,
    platform: PlatformInfo,
    environment: BTreeMap<String, Option<String>>,
}

pub fn run(_args: EnvinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let mut env = BTreeMap::new();
    env.insert("RUST_LOG".to_string(), std::env::var("RUST_LOG").ok());
    env.insert(
        "PKTALIGN_LOG_LEVEL".to_string(),
        std::env::var("PKTALIGN_LOG_LEVEL").ok(),
    );

    let output = EnvInfoOutput {
        version: env!("CARGO_PKG_VERSION").to_string(),
        target: target_triple(),
        rust_version: option_env!("RUSTC_VERSION")
            .unwrap_or("unknown")
            .to_string(),
        git_hash: option_env!("GIT_HASH").unwrap_or("unknown").to_string(),
        capture_format: pktalign_capture::VERSION,
        platform: PlatformInfo {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        environment: env,
    };

    print_envinfo(&output, format);
    Ok(SUCCESS)
}

fn target_triple() -> String {
    if let Some(target) = option_env!("PKTALIGN_BUILD_TARGET") {
        return target.to_string();
    }

    match (std::env::consts::ARCH, std::env::consts::OS) {
        ("aarch64", "macos") => "aarch64-apple-darwin".to_string(),
        ("x86_64", "macos") => "x86_64-apple-darwin".to_string(),
        ("aarch64", "linux") => "aarch64-unknown-linux-gnu".to_string(),
        ("x86_64", "linux") => "x86_64-unknown-linux-gnu".to_string(),
        ("x86_64", "windows") => "x86_64-pc-windows-msvc".to_string(),
        (arch, os) => format!("{arch}-unknown-{os}"),
    }
}

fn print_envinfo(output: &EnvInfoOutput, format: OutputFormat) {
    match format {
        OutputFormat::Json => println!(
            "{}",
            serde_json::to_string(output).unwrap_or_else(|_| "{}".to_string())
        ),
        _ => {
            println!("pktalign environment\n");
            println!("  Version:    {}", output.version);
            println!("  Target:     {}", output.target);
            println!("  Rust:       {}", output.rust_version);
            println!("  Git hash:   {}", output.git_hash);
            println!("  Capture:    format v{}", output.capture_format);
            println!(
                "  Platform:   {} ({})",
                output.platform.os, output.platform.arch
            );
            println!("\n  Environment:");
            for (k, v) in &output.environment {
                println!("    {:<20} {}", k, v.as_deref().unwrap_or("(not set)"));
            }
        }
    }
}
