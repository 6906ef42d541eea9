//! Quick-Peek companion controller wire format
//!
//! This crate defines the register-level protocol between the host
//! application processor and the low-power companion controller that
//! requests always-on-display ("peek") updates while the host sleeps.
//!
//! # Protocol Overview
//!
//! Every exchange is a fixed-size frame read from or written to a one-byte
//! register address. Multi-byte fields are big-endian.
//!
//! ```text
//! ┌──────────────┬──────┬──────┬─────────────────────────────────────┐
//! │ REGISTER     │ DIR  │ SIZE │ CONTENT                             │
//! ├──────────────┼──────┼──────┼─────────────────────────────────────┤
//! │ PeekStatus   │ W    │ 1B   │ 1 = handover, 0 = takeback          │
//! │ PeekEvent    │ R    │ 2B   │ panel state (2b) | reason (4b)      │
//! │ DrawParams   │ R    │ 5B   │ buffer id, x, y                     │
//! │ EraseParams  │ R    │ 8B   │ x1, y1, x2, y2                      │
//! │ PeekAck      │ W    │ 2B   │ ack code (2b) | reason (4b), buf id │
//! │ CompanionBusy│ R    │ 1B   │ non-zero while companion is busy    │
//! └──────────────┴──────┴──────┴─────────────────────────────────────┘
//! ```
//!
//! The companion drives the sequence; the host only answers each request
//! with exactly one ack frame.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod frame;
pub mod messages;
pub mod reason;
pub mod register;

pub use frame::{
    AckFrame, DrawParams, ProtocolError, StatusWord, ACK_FRAME_LEN, DRAW_PARAMS_LEN,
    ERASE_PARAMS_LEN, MAX_BUFFER_ID, NO_OVERRIDE, STATUS_FRAME_LEN,
};
pub use messages::{PanelState, Point, QuickPeekMessage, Rect};
pub use reason::{AckCode, Reason};
pub use register::{Register, HANDOVER, TAKEBACK};
