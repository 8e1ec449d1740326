//! Minimal library walkthrough: build a descriptor, feed two words on one
//! channel, and print where headers were found.
//!
//! Run with `cargo run -p pktalign --example align-demo`.

use pktalign::engine::Aligner;
use pktalign::proto::{BusGeometry, PacketWord, ProtocolDescriptor};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 6-byte header: three fixed pattern bytes, then a 3-byte big-endian
    // message length. Minimum message length equals the header length.
    let descriptor = ProtocolDescriptor::new(
        6,
        6,
        3,
        vec![true, true, true, false, false, false],
        vec![0x45, 0x32, 0x11, 0x00, 0x00, 0x00],
    )?;
    let geometry = BusGeometry::new(16, 1)?;
    let mut engine = Aligner::new(descriptor, geometry)?;

    // A 9-byte message at offset 0 and a header straddling the word
    // boundary at offset 13.
    let mut first = vec![0u8; 16];
    first[..9].copy_from_slice(&[0x45, 0x32, 0x11, 0x00, 0x00, 0x09, 0xDE, 0xAD, 0xBE]);
    first[13..].copy_from_slice(&[0x45, 0x32, 0x11]);
    let mut second = vec![0u8; 16];
    second[..3].copy_from_slice(&[0x00, 0x00, 0x0A]);

    for (index, payload) in [first, second].into_iter().enumerate() {
        let word = PacketWord::new(0, payload);
        if let Some(out) = engine.step(Some(word))? {
            for offset in out.info.match_offsets() {
                println!(
                    "word {index}: header at byte {offset}, next message {:+} words, byte {}",
                    out.info.next_msg_word_offset[offset],
                    out.info.next_msg_byte_offset[offset],
                );
            }
        }
    }

    Ok(())
}
