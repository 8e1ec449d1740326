//! Header alignment for multiplexed packet-bus word streams.
//!
//! pktalign aligns a channel-multiplexed stream of fixed-width bus words
//! against a statically-configured length-prefixed framing protocol: per
//! word it reports every byte offset where a header could start (boundary
//! straddles included) and the precomputed position of the following
//! message.
//!
//! # Crate Structure
//!
//! - [`proto`]: protocol descriptor, bus geometry, and word types
//! - [`capture`]: word-stream serialization (files, pipes)
//! - [`engine`]: the alignment engine itself

/// Re-export protocol descriptor and bus types.
pub mod proto {
    pub use pktalign_proto::*;
}

/// Re-export capture stream types.
pub mod capture {
    pub use pktalign_capture::*;
}

/// Re-export engine types.
pub mod engine {
    pub use pktalign_engine::*;
}
