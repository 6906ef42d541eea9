//! Companion link implementations
//!
//! Concrete [`CompanionLink`](quickpeek_core::traits::CompanionLink)
//! transports for the quick-peek coordinator:
//!
//! - I2C register access over `embedded-hal-async`

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod companion;

pub use companion::{I2cCompanion, DEFAULT_ADDRESS};
