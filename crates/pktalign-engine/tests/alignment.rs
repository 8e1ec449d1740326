//! End-to-end properties of the alignment stage: straddling-boundary
//! equivalence against a wide-word oracle, matcher correctness against a
//! naive reference, and planted-header round trips over random inputs.

use pktalign_engine::{AlignedWord, Aligner, HeaderMatcher};
use pktalign_proto::{BusGeometry, PacketWord, ProtocolDescriptor};

const WIDTH: usize = 16;

fn demo_descriptor() -> ProtocolDescriptor {
    ProtocolDescriptor::new(
        6,
        6,
        3,
        vec![true, true, true, false, false, false],
        vec![0x45, 0x32, 0x11, 0x00, 0x00, 0x00],
    )
    .unwrap()
}

fn plant_header(buf: &mut [u8], at: usize, len: u32) {
    buf[at..at + 3].copy_from_slice(&[0x45, 0x32, 0x11]);
    buf[at + 3..at + 6].copy_from_slice(&len.to_be_bytes()[1..]);
}

/// Absolute next-message byte position for array index `i`, given the
/// stream position where the containing word starts.
fn absolute_boundary(out: &AlignedWord, i: usize, word_start: i64, width: i64) -> i64 {
    word_start + out.info.next_msg_word_offset[i] * width + out.info.next_msg_byte_offset[i] as i64
}

#[test]
fn straddling_header_matches_wide_word_oracle_at_every_cut() {
    let desc = demo_descriptor();
    let header_len = desc.header_len();

    for cut in 1..header_len {
        // Header split `cut` bytes into the first word.
        let start = WIDTH - cut;
        let mut stream = vec![0u8; 2 * WIDTH];
        plant_header(&mut stream, start, 7);

        let mut narrow = Aligner::new(desc.clone(), BusGeometry::new(WIDTH, 2).unwrap()).unwrap();
        let out1 = narrow
            .step(Some(PacketWord::new(0, stream[..WIDTH].to_vec())))
            .unwrap()
            .unwrap();
        let out2 = narrow
            .step(Some(PacketWord::new(0, stream[WIDTH..].to_vec())))
            .unwrap()
            .unwrap();

        let mut wide =
            Aligner::new(desc.clone(), BusGeometry::new(2 * WIDTH, 2).unwrap()).unwrap();
        let oracle = wide
            .step(Some(PacketWord::new(0, stream.clone())))
            .unwrap()
            .unwrap();

        // Every start position both paths can decide: stream positions
        // 0 ..= 2W-H. The two-word path reports positions in the first
        // word's final H-1 bytes alongside the second word.
        for pos in 0..=(2 * WIDTH - header_len) {
            let (out, word_start) = if pos <= WIDTH - header_len {
                (&out1, 0i64)
            } else {
                (&out2, WIDTH as i64)
            };
            let i = pos % WIDTH;

            assert_eq!(
                out.info.header_match[i], oracle.info.header_match[pos],
                "cut {cut}, stream position {pos}"
            );
            assert_eq!(
                absolute_boundary(out, i, word_start, WIDTH as i64),
                absolute_boundary(&oracle, pos, 0, 2 * WIDTH as i64),
                "cut {cut}, stream position {pos}"
            );
        }

        // And the planted straddle start itself is flagged.
        let out = if start <= WIDTH - header_len {
            &out1
        } else {
            &out2
        };
        assert!(out.info.header_match[start], "cut {cut}");
    }
}

#[test]
fn straddling_equivalence_holds_on_random_streams() {
    let desc = demo_descriptor();
    let header_len = desc.header_len();
    fastrand::seed(0x5EED);

    for _ in 0..200 {
        let mut stream = vec![0u8; 2 * WIDTH];
        for byte in stream.iter_mut() {
            *byte = fastrand::u8(..);
        }

        let mut narrow = Aligner::new(desc.clone(), BusGeometry::new(WIDTH, 1).unwrap()).unwrap();
        let out1 = narrow
            .step(Some(PacketWord::new(0, stream[..WIDTH].to_vec())))
            .unwrap()
            .unwrap();
        let out2 = narrow
            .step(Some(PacketWord::new(0, stream[WIDTH..].to_vec())))
            .unwrap()
            .unwrap();

        let mut wide =
            Aligner::new(desc.clone(), BusGeometry::new(2 * WIDTH, 1).unwrap()).unwrap();
        let oracle = wide
            .step(Some(PacketWord::new(0, stream.clone())))
            .unwrap()
            .unwrap();

        for pos in 0..=(2 * WIDTH - header_len) {
            let out = if pos <= WIDTH - header_len { &out1 } else { &out2 };
            assert_eq!(out.info.header_match[pos % WIDTH], oracle.info.header_match[pos]);
        }
    }
}

#[test]
fn matcher_agrees_with_naive_reference_on_random_descriptors() {
    fastrand::seed(0xA11C);

    for _ in 0..500 {
        let header_len = fastrand::usize(2..=8);
        let len_start = fastrand::usize(1..header_len.min(8));
        let mut mask = vec![false; header_len];
        let mut pattern = vec![0u8; header_len];
        for j in 0..len_start {
            mask[j] = fastrand::bool();
            pattern[j] = fastrand::u8(..);
        }
        if !mask.iter().any(|&m| m) {
            mask[0] = true;
        }

        let desc =
            ProtocolDescriptor::new(header_len, header_len, len_start, mask.clone(), pattern.clone())
                .unwrap();
        let matcher = HeaderMatcher::new(&desc);

        let window: Vec<u8> = (0..64).map(|_| fastrand::u8(..)).collect();
        for offset in 0..=(window.len() - header_len) {
            let naive = (0..len_start)
                .all(|j| !mask[j] || window[offset + j] == pattern[j]);
            assert_eq!(matcher.matches_at(&window, offset), naive);
        }
    }
}

#[test]
fn planted_headers_round_trip_at_random_offsets() {
    let desc = demo_descriptor();
    fastrand::seed(0xBEEF);

    for _ in 0..300 {
        let offset = fastrand::usize(0..=WIDTH - desc.header_len());
        let len = fastrand::u32(0..64);
        let mut payload: Vec<u8> = (0..WIDTH).map(|_| fastrand::u8(..)).collect();
        plant_header(&mut payload, offset, len);

        let mut engine =
            Aligner::new(desc.clone(), BusGeometry::new(WIDTH, 3).unwrap()).unwrap();
        let channel = fastrand::u16(0..8);
        let out = engine
            .step(Some(PacketWord::new(channel, payload)))
            .unwrap()
            .unwrap();

        let target = offset + len as usize;
        assert!(out.info.header_match[offset]);
        assert_eq!(
            out.info.next_msg_word_offset[offset],
            (target / WIDTH) as i64
        );
        assert_eq!(out.info.next_msg_byte_offset[offset], target % WIDTH);
        assert_eq!(out.info.next_msg_same_word[offset], target < WIDTH);
    }
}

#[test]
fn interleaved_channels_keep_tails_isolated() {
    let desc = demo_descriptor();
    let mut engine = Aligner::new(desc, BusGeometry::new(WIDTH, 1).unwrap()).unwrap();

    // Channel 0: header split 2/4 across its own word boundary.
    let mut first = vec![0u8; WIDTH];
    first[WIDTH - 2..].copy_from_slice(&[0x45, 0x32]);
    engine.step(Some(PacketWord::new(0, first))).unwrap();

    // Channel 1 traffic in between, full of pattern-like bytes.
    let noise = vec![0x45u8; WIDTH];
    engine.step(Some(PacketWord::new(1, noise))).unwrap();

    let mut second = vec![0u8; WIDTH];
    second[..4].copy_from_slice(&[0x11, 0x00, 0x00, 0x05]);
    let out = engine
        .step(Some(PacketWord::new(0, second)))
        .unwrap()
        .unwrap();

    assert!(out.info.header_match[WIDTH - 2]);
    // Boundary: started 2 bytes before this word, length 5.
    assert_eq!(out.info.next_msg_word_offset[WIDTH - 2], 0);
    assert_eq!(out.info.next_msg_byte_offset[WIDTH - 2], 3);
}
