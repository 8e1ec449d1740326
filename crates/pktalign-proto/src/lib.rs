//! Protocol descriptor and bus-word types for pktalign.
//!
//! A [`ProtocolDescriptor`] captures an externally-defined length-prefixed
//! framing protocol as plain values: header length, minimum message length,
//! length-field position, and a per-byte match mask/pattern. A
//! [`BusGeometry`] captures the physical word bus: word width and channel-id
//! bit width. Both are validated once at construction and immutable after.

pub mod bus;
pub mod descriptor;
pub mod error;

pub use bus::{BusGeometry, PacketWord, MAX_CHANNEL_BITS, MAX_WORD_BYTES};
pub use descriptor::{ProtocolDescriptor, MAX_LEN_FIELD};
pub use error::{ProtoError, Result};
