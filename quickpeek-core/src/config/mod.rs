//! Coordinator configuration
//!
//! Tunables for the sequencer, the takeback handshake and the wake lock.
//! Platforms that persist them store postcard binary data.

pub mod types;

pub use types::*;
