//! Ack channel
//!
//! Exactly one ack frame answers every request the companion raised,
//! whether it was applied, rejected or superseded by a reset.

use embassy_sync::blocking_mutex::raw::RawMutex;
use quickpeek_protocol::{AckCode, AckFrame, QuickPeekMessage, Register};

use super::Coordinator;
use crate::traits::{CompanionLink, QuickDraw, TransportError, WakeLock};

/// Encode and transmit one ack frame
///
/// Failures are logged and returned; there is no retry at this layer.
pub async fn send_ack<L: CompanionLink>(link: &mut L, frame: AckFrame) -> Result<(), TransportError> {
    let bytes = frame.encode();
    trace!("ack {:?} reason={:?}", frame.code, frame.reason);

    link.write(Register::PeekAck, &bytes).await.map_err(|e| {
        warn!("Failed to send ack {:?}: {:?}", frame.code, e);
        e
    })
}

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Report `code` for `message`, or for an undecoded request if `None`
    ///
    /// Sent regardless of device mode or feature state so the companion
    /// is never left waiting.
    pub async fn acknowledge(&self, message: Option<&QuickPeekMessage>, code: AckCode) {
        let frame = message.map_or(AckFrame::bare(code), |m| m.ack(code));
        let mut device = self.device.lock().await;
        let _ = send_ack(&mut device.link, frame).await;
    }
}
