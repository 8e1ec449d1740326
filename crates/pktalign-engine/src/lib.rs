//! Streaming header-alignment engine for multiplexed word buses.
//!
//! The engine consumes fixed-width bus words, channel-multiplexed, and
//! emits per-word alignment metadata in a single bounded pass: at every
//! byte offset, whether a protocol header could start there (including
//! headers straddling the previous word boundary of the same channel), and
//! the precomputed position where the following message would begin.
//!
//! It deliberately stops there. No message reassembly, no flow control, no
//! payload validation: those belong to downstream consumers of the
//! metadata. See [`Aligner::step`] for the per-word contract.

pub mod aligner;
pub mod error;
pub mod locator;
pub mod matcher;
pub mod state;

pub use aligner::{AlignedWord, Aligner, PacketInfo};
pub use error::{AlignError, Result};
pub use locator::{Candidate, NextMsgLocator};
pub use matcher::HeaderMatcher;
pub use state::TailStore;
