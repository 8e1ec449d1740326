use std::collections::BTreeMap;
use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use pktalign_engine::AlignedWord;
use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
    Summary,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct MatchOutput {
    offset: usize,
    next_word_offset: i64,
    next_byte_offset: usize,
    same_word: bool,
}

#[derive(Serialize)]
struct WordOutput {
    index: u64,
    channel: u16,
    sop: bool,
    eop: bool,
    valid_bytes: u8,
    payload: String,
    matches: Vec<MatchOutput>,
}

pub fn print_aligned(index: u64, out: &AlignedWord, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let word = WordOutput {
                index,
                channel: out.word.channel,
                sop: out.word.sop,
                eop: out.word.eop,
                valid_bytes: out.word.valid_bytes,
                payload: hex(&out.word.payload),
                matches: matches_of(out),
            };
            println!(
                "{}",
                serde_json::to_string(&word).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["WORD", "CH", "FLAGS", "MATCHES", "NEXT BOUNDARY"])
                .add_row(vec![
                    index.to_string(),
                    out.word.channel.to_string(),
                    flags(out),
                    match_offsets_text(out),
                    boundaries_text(out),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "word={index} channel={} flags={} payload={} matches=[{}] next=[{}]",
                out.word.channel,
                flags(out),
                hex(&out.word.payload),
                match_offsets_text(out),
                boundaries_text(out),
            );
        }
        OutputFormat::Summary => {}
    }
}

fn matches_of(out: &AlignedWord) -> Vec<MatchOutput> {
    out.info
        .match_offsets()
        .map(|offset| MatchOutput {
            offset,
            next_word_offset: out.info.next_msg_word_offset[offset],
            next_byte_offset: out.info.next_msg_byte_offset[offset],
            same_word: out.info.next_msg_same_word[offset],
        })
        .collect()
}

fn match_offsets_text(out: &AlignedWord) -> String {
    let offsets: Vec<String> = out.info.match_offsets().map(|i| i.to_string()).collect();
    if offsets.is_empty() {
        "-".to_string()
    } else {
        offsets.join(",")
    }
}

fn boundaries_text(out: &AlignedWord) -> String {
    let parts: Vec<String> = out
        .info
        .match_offsets()
        .map(|i| {
            format!(
                "{}\u{2192}{:+}w:{}",
                i, out.info.next_msg_word_offset[i], out.info.next_msg_byte_offset[i]
            )
        })
        .collect();
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(" ")
    }
}

fn flags(out: &AlignedWord) -> String {
    match (out.word.sop, out.word.eop) {
        (true, true) => "SE".to_string(),
        (true, false) => "S".to_string(),
        (false, true) => "E".to_string(),
        (false, false) => "-".to_string(),
    }
}

pub fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

#[derive(Debug, Default, Serialize)]
pub struct ChannelStats {
    pub words: u64,
    pub matches: u64,
}

/// Running totals for a `run` invocation.
#[derive(Debug, Default, Serialize)]
pub struct RunSummary {
    pub words: u64,
    pub idle_steps: u64,
    pub words_with_matches: u64,
    pub total_matches: u64,
    pub channels: BTreeMap<u16, ChannelStats>,
}

impl RunSummary {
    pub fn record_word(&mut self, out: &AlignedWord) {
        let matches = out.info.match_count() as u64;
        self.words += 1;
        self.total_matches += matches;
        if matches > 0 {
            self.words_with_matches += 1;
        }
        let stats = self.channels.entry(out.word.channel).or_default();
        stats.words += 1;
        stats.matches += matches;
    }

    pub fn record_idle(&mut self) {
        self.idle_steps += 1;
    }

    pub fn print(&self, format: OutputFormat) {
        match format {
            OutputFormat::Json => {
                println!(
                    "{}",
                    serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
                );
            }
            _ => {
                println!("words processed:     {}", self.words);
                println!("idle steps:          {}", self.idle_steps);
                println!("words with matches:  {}", self.words_with_matches);
                println!("header candidates:   {}", self.total_matches);
                for (channel, stats) in &self.channels {
                    println!(
                        "  channel {:<5} words={:<8} matches={}",
                        channel, stats.words, stats.matches
                    );
                }
            }
        }
    }
}
