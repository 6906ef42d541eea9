//! Board-agnostic quick-peek display update coordinator
//!
//! Sits between a low-power companion controller and the host's panel
//! driver. While the host sleeps, the companion raises requests to wake
//! the panel, draw a buffer, erase a region and finish; this crate
//! turns them into framebuffer calls and acks, one at a time.
//!
//! - Collaborator traits (companion link, framebuffer, wake lock)
//! - Command queue, prepared-state rules and enable voting
//! - The [`Coordinator`]: ingestion, sequencer, reset and suspend gate
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to later modules
mod fmt;

pub mod config;
pub mod coordinator;
pub mod state;
pub mod traits;

#[cfg(test)]
mod testing;

pub use config::CoordinatorConfig;
pub use coordinator::{Coordinator, DeviceMode, ExchangeError, IngestError};
pub use state::{Exchange, SequencerPhase, VoterId};
