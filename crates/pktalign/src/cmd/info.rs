use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pktalign_proto::ProtocolDescriptor;
use serde::Serialize;

use crate::cmd::{load_descriptor, InfoArgs};
use crate::exit::{CliResult, SUCCESS};
use crate::output::OutputFormat;

#[derive(Serialize)]
struct DescriptorOutput<'a> {
    header_len: usize,
    min_msg_len: usize,
    len_start: usize,
    len_field_len: usize,
    tail_len: usize,
    mask: &'a [bool],
    pattern: &'a [u8],
}

pub fn run(args: InfoArgs, format: OutputFormat) -> CliResult<i32> {
    let descriptor = load_descriptor(args.descriptor.as_deref())?;
    print_descriptor(&descriptor, format);
    Ok(SUCCESS)
}

fn print_descriptor(descriptor: &ProtocolDescriptor, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = DescriptorOutput {
                header_len: descriptor.header_len(),
                min_msg_len: descriptor.min_msg_len(),
                len_start: descriptor.len_start(),
                len_field_len: descriptor.len_field_len(),
                tail_len: descriptor.tail_len(),
                mask: descriptor.mask(),
                pattern: descriptor.pattern(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        _ => {
            println!("header length:      {} bytes", descriptor.header_len());
            println!("min message length: {} bytes", descriptor.min_msg_len());
            println!(
                "length field:       bytes {}..{} (big-endian)",
                descriptor.len_start(),
                descriptor.header_len()
            );
            println!("carry-over tail:    {} bytes", descriptor.tail_len());

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["BYTE", "ROLE", "EXPECTED"]);
            for j in 0..descriptor.header_len() {
                let (role, expected) = if j >= descriptor.len_start() {
                    ("length", "-".to_string())
                } else if descriptor.mask()[j] {
                    ("pattern", format!("0x{:02X}", descriptor.pattern()[j]))
                } else {
                    ("any", "-".to_string())
                };
                table.add_row(vec![j.to_string(), role.to_string(), expected]);
            }
            println!("{table}");
        }
    }
}
