//! Fixed-size frame encoding and decoding
//!
//! Frame layouts:
//! - STATUS (2 bytes): bits 0-1 panel state, bits 2-5 reason, rest reserved
//! - DRAW PARAMS (5 bytes): buffer id, x (u16 BE), y (u16 BE)
//! - ERASE PARAMS (8 bytes): x1, y1, x2, y2 (u16 BE each)
//! - ACK (2 bytes): bits 0-1 ack code, bits 2-5 reason; buffer id in byte 1

use crate::messages::{PanelState, Point, Rect};
use crate::reason::{AckCode, Reason, REASON_NONE};

/// Status frame size in bytes
pub const STATUS_FRAME_LEN: usize = 2;

/// Draw parameter frame size in bytes
pub const DRAW_PARAMS_LEN: usize = 5;

/// Erase parameter frame size in bytes
pub const ERASE_PARAMS_LEN: usize = 8;

/// Ack frame size in bytes
pub const ACK_FRAME_LEN: usize = 2;

/// Coordinate value meaning "keep the buffer's own origin"
pub const NO_OVERRIDE: u16 = 0xFFFF;

/// Largest buffer id the companion can address
pub const MAX_BUFFER_ID: u8 = 0x3F;

const PANEL_STATE_MASK: u8 = 0x03;
const REASON_SHIFT: u8 = 2;
const REASON_MASK: u8 = 0x0F;

/// Errors that can occur while decoding a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProtocolError {
    /// Reason field holds a value outside Prepare..Complete
    UnknownReason(u8),
    /// Fewer bytes than the frame layout requires
    ShortFrame,
}

fn be16(bytes: &[u8], at: usize) -> u16 {
    u16::from_be_bytes([bytes[at], bytes[at + 1]])
}

/// Decoded status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct StatusWord {
    pub panel_state: PanelState,
    pub reason: Reason,
}

impl StatusWord {
    /// Decode a status frame
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < STATUS_FRAME_LEN {
            return Err(ProtocolError::ShortFrame);
        }

        let word = bytes[0];
        let reason_bits = (word >> REASON_SHIFT) & REASON_MASK;
        let reason = Reason::from_bits(reason_bits).ok_or(ProtocolError::UnknownReason(reason_bits))?;

        Ok(Self {
            panel_state: PanelState::from_bits(word & PANEL_STATE_MASK),
            reason,
        })
    }

    /// Encode a status frame (companion side, used for simulation)
    pub fn encode(&self) -> [u8; STATUS_FRAME_LEN] {
        [
            (self.panel_state.0 & PANEL_STATE_MASK) | (self.reason.to_bits() << REASON_SHIFT),
            0,
        ]
    }
}

/// Decoded Draw parameter frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DrawParams {
    /// Raw buffer id; range checking is the consumer's job
    pub buffer_id: u8,
    pub point: Option<Point>,
}

impl DrawParams {
    /// Decode a Draw parameter frame
    ///
    /// The override point is only present when neither coordinate is
    /// [`NO_OVERRIDE`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < DRAW_PARAMS_LEN {
            return Err(ProtocolError::ShortFrame);
        }

        let x = be16(bytes, 1);
        let y = be16(bytes, 3);
        let point = if x == NO_OVERRIDE || y == NO_OVERRIDE {
            None
        } else {
            Some(Point::new(x, y))
        };

        Ok(Self {
            buffer_id: bytes[0],
            point,
        })
    }

    /// Encode a Draw parameter frame (companion side, used for simulation)
    pub fn encode(&self) -> [u8; DRAW_PARAMS_LEN] {
        let (x, y) = match self.point {
            Some(p) => (p.x, p.y),
            None => (NO_OVERRIDE, NO_OVERRIDE),
        };
        let x = x.to_be_bytes();
        let y = y.to_be_bytes();
        [self.buffer_id, x[0], x[1], y[0], y[1]]
    }
}

impl Rect {
    /// Decode an Erase parameter frame
    ///
    /// Corner ordering is not checked here, see [`Rect::is_valid`].
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < ERASE_PARAMS_LEN {
            return Err(ProtocolError::ShortFrame);
        }

        Ok(Rect::new(
            be16(bytes, 0),
            be16(bytes, 2),
            be16(bytes, 4),
            be16(bytes, 6),
        ))
    }

    /// Encode an Erase parameter frame (companion side, used for simulation)
    pub fn encode(&self) -> [u8; ERASE_PARAMS_LEN] {
        let mut buf = [0u8; ERASE_PARAMS_LEN];
        buf[0..2].copy_from_slice(&self.x1.to_be_bytes());
        buf[2..4].copy_from_slice(&self.y1.to_be_bytes());
        buf[4..6].copy_from_slice(&self.x2.to_be_bytes());
        buf[6..8].copy_from_slice(&self.y2.to_be_bytes());
        buf
    }
}

/// Ack frame sent once per processed request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AckFrame {
    pub code: AckCode,
    /// Reason of the acked request, `None` when no request was decoded
    pub reason: Option<Reason>,
    /// Buffer id of an acked Draw, otherwise 0
    pub buffer_id: u8,
}

impl AckFrame {
    /// Ack that refers to no decoded request
    pub const fn bare(code: AckCode) -> Self {
        Self {
            code,
            reason: None,
            buffer_id: 0,
        }
    }

    /// Encode this ack into its wire frame
    pub fn encode(&self) -> [u8; ACK_FRAME_LEN] {
        let reason = self.reason.map_or(REASON_NONE, Reason::to_bits);
        [
            self.code.to_bits() | ((reason & REASON_MASK) << REASON_SHIFT),
            self.buffer_id,
        ]
    }

    /// Decode an ack frame (companion side, used for simulation)
    pub fn parse(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < ACK_FRAME_LEN {
            return Err(ProtocolError::ShortFrame);
        }

        let reason_bits = (bytes[0] >> REASON_SHIFT) & REASON_MASK;
        let reason = match reason_bits {
            REASON_NONE => None,
            bits => Some(Reason::from_bits(bits).ok_or(ProtocolError::UnknownReason(bits))?),
        };

        Ok(Self {
            code: AckCode::from_bits(bytes[0]),
            reason,
            buffer_id: bytes[1],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_status_bit_layout() {
        // panel_state = 1, reason = Prepare (1) -> 0b0000_0101
        let status = StatusWord::parse(&[0x05, 0x00]).unwrap();
        assert_eq!(status.panel_state, PanelState(1));
        assert_eq!(status.reason, Reason::Prepare);

        // panel_state = 2, reason = Complete (4) -> 0b0001_0010
        let status = StatusWord::parse(&[0x12, 0x00]).unwrap();
        assert_eq!(status.panel_state, PanelState(2));
        assert_eq!(status.reason, Reason::Complete);
    }

    #[test]
    fn test_status_reserved_bits_ignored() {
        let status = StatusWord::parse(&[0xC9, 0xFF]).unwrap();
        assert_eq!(status.reason, Reason::Draw);
        assert_eq!(status.panel_state, PanelState(1));
    }

    #[test]
    fn test_status_unknown_reason() {
        assert_eq!(
            StatusWord::parse(&[0x00, 0x00]),
            Err(ProtocolError::UnknownReason(0))
        );
        assert_eq!(
            StatusWord::parse(&[0x3C, 0x00]),
            Err(ProtocolError::UnknownReason(0x0F))
        );
    }

    #[test]
    fn test_short_frames() {
        assert_eq!(StatusWord::parse(&[0x05]), Err(ProtocolError::ShortFrame));
        assert_eq!(DrawParams::parse(&[0; 4]), Err(ProtocolError::ShortFrame));
        assert_eq!(Rect::parse(&[0; 7]), Err(ProtocolError::ShortFrame));
        assert_eq!(AckFrame::parse(&[]), Err(ProtocolError::ShortFrame));
    }

    #[test]
    fn test_draw_params_with_point() {
        let params = DrawParams::parse(&[3, 0x00, 0x64, 0x00, 0xC8]).unwrap();
        assert_eq!(params.buffer_id, 3);
        assert_eq!(params.point, Some(Point::new(100, 200)));
    }

    #[test]
    fn test_draw_params_sentinel() {
        let params = DrawParams::parse(&[7, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(params.point, None);

        // A single sentinel coordinate also disables the override
        let params = DrawParams::parse(&[7, 0x00, 0x10, 0xFF, 0xFF]).unwrap();
        assert_eq!(params.point, None);
    }

    #[test]
    fn test_draw_params_keeps_oversized_buffer_id() {
        let params = DrawParams::parse(&[0xF0, 0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(params.buffer_id, 0xF0);
    }

    #[test]
    fn test_erase_params() {
        let rect = Rect::parse(&[0x00, 0x0A, 0x00, 0x14, 0x01, 0x00, 0x00, 0x80]).unwrap();
        assert_eq!(rect, Rect::new(10, 20, 256, 128));
    }

    #[test]
    fn test_ack_encoding() {
        let ack = AckFrame {
            code: AckCode::Ack,
            reason: Some(Reason::Draw),
            buffer_id: 3,
        };
        assert_eq!(ack.encode(), [0x08, 0x03]);

        let ack = AckFrame::bare(AckCode::Invalid);
        assert_eq!(ack.encode(), [0x02, 0x00]);

        let ack = AckFrame {
            code: AckCode::EsdRecovered,
            reason: Some(Reason::Prepare),
            buffer_id: 0,
        };
        assert_eq!(ack.encode(), [0x07, 0x00]);
    }

    #[test]
    fn test_ack_keeps_out_of_range_buffer_id() {
        // 65 must not alias buffer 1
        let ack = AckFrame {
            code: AckCode::Invalid,
            reason: Some(Reason::Draw),
            buffer_id: 65,
        };
        assert_eq!(ack.encode(), [0x0A, 65]);
        assert_eq!(AckFrame::parse(&ack.encode()).unwrap().buffer_id, 65);
    }

    proptest! {
        #[test]
        fn status_decoding_never_panics(b0 in any::<u8>(), b1 in any::<u8>()) {
            match StatusWord::parse(&[b0, b1]) {
                Ok(status) => {
                    prop_assert_eq!(status.panel_state.0, b0 & 0x03);
                    prop_assert_eq!(status.reason.to_bits(), (b0 >> 2) & 0x0F);
                }
                Err(e) => prop_assert_eq!(e, ProtocolError::UnknownReason((b0 >> 2) & 0x0F)),
            }
        }

        #[test]
        fn erase_rect_fields_are_big_endian(bytes in any::<[u8; 8]>()) {
            let rect = Rect::parse(&bytes).unwrap();
            prop_assert_eq!(rect.x1, u16::from_be_bytes([bytes[0], bytes[1]]));
            prop_assert_eq!(rect.y2, u16::from_be_bytes([bytes[6], bytes[7]]));
            prop_assert_eq!(rect.is_valid(), rect.x2 > rect.x1 && rect.y2 > rect.y1);
        }
    }
}
