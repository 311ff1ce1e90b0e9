//! Wire framing for command streams.
//!
//! cmdframe delimits serialized command messages on a byte stream with a
//! 4-byte big-endian size prefix, and can wrap each frame in a checksummed
//! frame (magic marker + CRC-32C) so receivers detect corruption.
//!
//! # Crate Structure
//!
//! - [`frame`]: message frames, checksummed frames, the CRC-32C engine and
//!   stream adapters

/// Re-export frame types.
pub mod frame {
    pub use cmdframe_frame::*;
}
