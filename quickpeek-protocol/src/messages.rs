//! Decoded quick-peek requests
//!
//! A [`QuickPeekMessage`] is built by the host from one status frame and,
//! for Draw and Erase, one parameter frame.

use crate::frame::{AckFrame, DrawParams, StatusWord};
use crate::reason::{AckCode, Reason};

/// Panel power state reported by the companion (opaque 2-bit value)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PanelState(pub u8);

impl PanelState {
    /// Build from the low two bits of a status word
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits & 0x03)
    }
}

/// Origin override for a Draw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Point {
    pub x: u16,
    pub y: u16,
}

impl Point {
    pub const fn new(x: u16, y: u16) -> Self {
        Self { x, y }
    }
}

/// Region cleared by an Erase request
///
/// Only well-formed when `x2 > x1` and `y2 > y1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rect {
    pub x1: u16,
    pub y1: u16,
    pub x2: u16,
    pub y2: u16,
}

impl Rect {
    pub const fn new(x1: u16, y1: u16, x2: u16, y2: u16) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Check the corner ordering invariant
    pub fn is_valid(&self) -> bool {
        self.x2 > self.x1 && self.y2 > self.y1
    }
}

/// One request from the companion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum QuickPeekMessage {
    /// Wake the panel for peek drawing
    Prepare { panel_state: PanelState },
    /// Show buffer `buffer_id`, optionally moved to `point`
    Draw {
        panel_state: PanelState,
        buffer_id: u8,
        point: Option<Point>,
    },
    /// Clear `rect`
    Erase { panel_state: PanelState, rect: Rect },
    /// End of the peek sequence
    Complete { panel_state: PanelState },
}

impl QuickPeekMessage {
    /// Build a parameterless request from a status word
    ///
    /// Returns `None` for Draw and Erase, which need their parameter frame.
    pub fn from_status(status: StatusWord) -> Option<Self> {
        let panel_state = status.panel_state;
        match status.reason {
            Reason::Prepare => Some(QuickPeekMessage::Prepare { panel_state }),
            Reason::Complete => Some(QuickPeekMessage::Complete { panel_state }),
            Reason::Draw | Reason::Erase => None,
        }
    }

    /// Build a Draw request
    pub fn draw(panel_state: PanelState, params: DrawParams) -> Self {
        QuickPeekMessage::Draw {
            panel_state,
            buffer_id: params.buffer_id,
            point: params.point,
        }
    }

    /// Build an Erase request
    pub fn erase(panel_state: PanelState, rect: Rect) -> Self {
        QuickPeekMessage::Erase { panel_state, rect }
    }

    /// Request reason
    pub fn reason(&self) -> Reason {
        match self {
            QuickPeekMessage::Prepare { .. } => Reason::Prepare,
            QuickPeekMessage::Draw { .. } => Reason::Draw,
            QuickPeekMessage::Erase { .. } => Reason::Erase,
            QuickPeekMessage::Complete { .. } => Reason::Complete,
        }
    }

    /// Panel state reported with the request
    pub fn panel_state(&self) -> PanelState {
        match *self {
            QuickPeekMessage::Prepare { panel_state }
            | QuickPeekMessage::Draw { panel_state, .. }
            | QuickPeekMessage::Erase { panel_state, .. }
            | QuickPeekMessage::Complete { panel_state } => panel_state,
        }
    }

    /// Buffer id of a Draw request
    pub fn buffer_id(&self) -> Option<u8> {
        match self {
            QuickPeekMessage::Draw { buffer_id, .. } => Some(*buffer_id),
            _ => None,
        }
    }

    /// Build the ack frame answering this request
    pub fn ack(&self, code: AckCode) -> AckFrame {
        AckFrame {
            code,
            reason: Some(self.reason()),
            buffer_id: self.buffer_id().unwrap_or(0),
        }
    }
}
