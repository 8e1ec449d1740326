use std::fs::File;
use std::io::Write;

use pktalign_capture::WordWriter;
use pktalign_proto::{BusGeometry, PacketWord, ProtocolDescriptor};

use crate::cmd::{load_descriptor, GenArgs};
use crate::exit::{io_error, proto_error, CliError, CliResult, SUCCESS, USAGE};

pub fn run(args: GenArgs) -> CliResult<i32> {
    let descriptor = load_descriptor(args.descriptor.as_deref())?;
    let geometry = BusGeometry::new(args.word_bytes, args.channel_bits)
        .map_err(|err| proto_error("invalid bus geometry", err))?;

    if geometry.word_bytes() < descriptor.header_len() {
        return Err(CliError::new(
            USAGE,
            format!(
                "word width {} cannot carry {}-byte headers",
                geometry.word_bytes(),
                descriptor.header_len()
            ),
        ));
    }
    let field_len = descriptor.len_field_len();
    if field_len < 8 && (descriptor.min_msg_len() as u64) > (1u64 << (8 * field_len)) - 1 {
        return Err(CliError::new(
            USAGE,
            format!(
                "{}-byte length field cannot encode minimum message length {}",
                field_len,
                descriptor.min_msg_len()
            ),
        ));
    }
    let active = usize::from(args.active_channels).min(geometry.channel_count());
    if active == 0 {
        return Err(CliError::new(USAGE, "at least one active channel required"));
    }

    let mut rng = match args.seed {
        Some(seed) => fastrand::Rng::with_seed(seed),
        None => fastrand::Rng::new(),
    };

    // Per-channel byte streams of concatenated messages, chopped into words.
    let mut queues: Vec<Vec<PacketWord>> = (0..active)
        .map(|channel| {
            let stream = message_stream(&descriptor, &args, &mut rng);
            chop_into_words(&stream, channel as u16, geometry.word_bytes())
        })
        .collect();

    let steps = interleave(&mut queues, args.idle, &mut rng);

    let written = match &args.output {
        Some(path) => {
            let file = File::create(path)
                .map_err(|err| io_error(&format!("failed creating {}", path.display()), err))?;
            write_steps(file, geometry, &steps)?
        }
        None => write_steps(std::io::stdout().lock(), geometry, &steps)?,
    };

    tracing::info!(
        words = written.0,
        idle_steps = written.1,
        channels = active,
        "capture generated"
    );
    Ok(SUCCESS)
}

/// One channel's worth of framed messages as a flat byte stream.
fn message_stream(
    descriptor: &ProtocolDescriptor,
    args: &GenArgs,
    rng: &mut fastrand::Rng,
) -> Vec<u8> {
    let header_len = descriptor.header_len();
    let field_len = descriptor.len_field_len();
    let field_cap = if field_len >= 8 {
        u64::MAX
    } else {
        (1u64 << (8 * field_len)) - 1
    };
    let min_len = descriptor.min_msg_len() as u64;
    let max_len = args.max_len.min(field_cap).max(min_len);

    let mut stream = Vec::new();
    for _ in 0..args.messages {
        let msg_len = rng.u64(min_len..=max_len);

        for (j, &masked) in descriptor.mask()[..descriptor.len_start()].iter().enumerate() {
            stream.push(if masked {
                descriptor.pattern()[j]
            } else {
                rng.u8(..)
            });
        }
        stream.extend_from_slice(&msg_len.to_be_bytes()[8 - field_len..]);
        for _ in 0..(msg_len as usize - header_len) {
            stream.push(rng.u8(..));
        }
    }
    stream
}

/// Chop a byte stream into bus words: the first word carries `sop`, the
/// last carries `eop` with the count of meaningful bytes; a final partial
/// word is zero-padded.
fn chop_into_words(stream: &[u8], channel: u16, width: usize) -> Vec<PacketWord> {
    let mut words: Vec<PacketWord> = stream
        .chunks(width)
        .map(|chunk| {
            let mut payload = chunk.to_vec();
            payload.resize(width, 0);
            PacketWord::new(channel, payload)
        })
        .collect();

    if let Some(first) = words.first_mut() {
        first.sop = true;
    }
    let last_len = stream.len() - (words.len().saturating_sub(1)) * width;
    if let Some(last) = words.last_mut() {
        last.eop = true;
        last.valid_bytes = last_len as u8;
    }
    words
}

/// Randomly interleave per-channel word queues, preserving each channel's
/// internal order, with optional idle gaps. `None` entries are idle steps.
fn interleave(
    queues: &mut [Vec<PacketWord>],
    idle_pct: u8,
    rng: &mut fastrand::Rng,
) -> Vec<Option<PacketWord>> {
    for queue in queues.iter_mut() {
        queue.reverse(); // pop from the back, cheaply
    }

    let mut steps = Vec::new();
    loop {
        let live: Vec<usize> = queues
            .iter()
            .enumerate()
            .filter(|(_, q)| !q.is_empty())
            .map(|(i, _)| i)
            .collect();
        if live.is_empty() {
            break;
        }
        let pick = live[rng.usize(..live.len())];
        if let Some(word) = queues[pick].pop() {
            steps.push(Some(word));
        }
        if idle_pct > 0 && rng.u8(..100) < idle_pct {
            steps.push(None);
        }
    }
    steps
}

fn write_steps<W: Write>(
    sink: W,
    geometry: BusGeometry,
    steps: &[Option<PacketWord>],
) -> CliResult<(u64, u64)> {
    let mut writer = WordWriter::new(sink, geometry);
    let mut words = 0u64;
    let mut idles = 0u64;
    for step in steps {
        match step {
            Some(word) => {
                writer
                    .write_word(word.clone())
                    .map_err(|err| crate::exit::capture_error("write failed", err))?;
                words += 1;
            }
            None => {
                writer
                    .write_idle()
                    .map_err(|err| crate::exit::capture_error("write failed", err))?;
                idles += 1;
            }
        }
    }
    Ok((words, idles))
}
