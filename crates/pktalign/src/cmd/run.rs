use std::fs::File;
use std::io::Read;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use pktalign_capture::{Step, WordReader};
use pktalign_engine::Aligner;

use crate::cmd::{load_descriptor, RunArgs};
use crate::exit::{align_error, capture_error, io_error, proto_error, CliError, CliResult, SUCCESS};
use crate::output::{print_aligned, OutputFormat, RunSummary};

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let descriptor = load_descriptor(args.descriptor.as_deref())?;

    match &args.input {
        Some(path) => {
            let file = File::open(path)
                .map_err(|err| io_error(&format!("failed opening {}", path.display()), err))?;
            align_stream(file, descriptor, &args, format, None)
        }
        None => {
            let running = Arc::new(AtomicBool::new(true));
            install_ctrlc_handler(running.clone())?;
            align_stream(
                std::io::stdin().lock(),
                descriptor,
                &args,
                format,
                Some(running),
            )
        }
    }
}

fn align_stream<R: Read>(
    source: R,
    descriptor: pktalign_proto::ProtocolDescriptor,
    args: &RunArgs,
    format: OutputFormat,
    running: Option<Arc<AtomicBool>>,
) -> CliResult<i32> {
    let mut reader = WordReader::new(source);
    let geometry = reader
        .geometry()
        .map_err(|err| capture_error("failed reading capture preamble", err))?;
    let mut engine = Aligner::new(descriptor, geometry)
        .map_err(|err| proto_error("descriptor does not fit this bus", err))?;

    let mut summary = RunSummary::default();
    let mut index = 0u64;

    while running
        .as_ref()
        .is_none_or(|flag| flag.load(Ordering::SeqCst))
    {
        let step = match reader.read_step() {
            Ok(Some(step)) => step,
            Ok(None) => break,
            Err(err) => return Err(capture_error("failed reading capture", err)),
        };

        match step {
            Step::Idle => summary.record_idle(),
            Step::Word(word) => {
                let Some(out) = engine
                    .step(Some(word))
                    .map_err(|err| align_error("alignment failed", err))?
                else {
                    continue;
                };
                summary.record_word(&out);

                if !args.matches_only || out.info.match_count() > 0 {
                    print_aligned(index, &out, format);
                }

                index += 1;
                if args.count.is_some_and(|count| index >= count) {
                    break;
                }
            }
        }
    }

    if format == OutputFormat::Summary {
        summary.print(format);
    } else {
        tracing::info!(
            words = summary.words,
            matches = summary.total_matches,
            "capture aligned"
        );
    }
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| {
        CliError::new(
            crate::exit::INTERNAL,
            format!("signal handler setup failed: {err}"),
        )
    })
}
