//! Event ingestion
//!
//! Runs in the companion interrupt handler task. Reads the status pair and
//! any parameters, queues the request and schedules the sequencer. Never
//! waits on the sequencer or the framebuffer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use quickpeek_protocol::{
    AckCode, DrawParams, ProtocolError, QuickPeekMessage, Reason, Rect, Register, StatusWord,
    DRAW_PARAMS_LEN, ERASE_PARAMS_LEN, STATUS_FRAME_LEN,
};

use super::{Coordinator, DeviceMode};
use crate::state::Enqueued;
use crate::traits::{CompanionLink, QuickDraw, TransportError, WakeLock};

/// Why an interrupt could not be turned into a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum IngestError {
    Transport(TransportError),
    Protocol(ProtocolError),
}

impl From<TransportError> for IngestError {
    fn from(e: TransportError) -> Self {
        IngestError::Transport(e)
    }
}

impl From<ProtocolError> for IngestError {
    fn from(e: ProtocolError) -> Self {
        IngestError::Protocol(e)
    }
}

/// Read one request from the companion
pub async fn read_message<L: CompanionLink>(link: &mut L) -> Result<QuickPeekMessage, IngestError> {
    let mut status = [0u8; STATUS_FRAME_LEN];
    link.read(Register::PeekEvent, &mut status).await?;
    let status = StatusWord::parse(&status)?;

    if let Some(message) = QuickPeekMessage::from_status(status) {
        return Ok(message);
    }

    // Draw and Erase carry a parameter frame
    if status.reason == Reason::Draw {
        let mut params = [0u8; DRAW_PARAMS_LEN];
        link.read(Register::DrawParams, &mut params).await?;
        Ok(QuickPeekMessage::draw(status.panel_state, DrawParams::parse(&params)?))
    } else {
        let mut params = [0u8; ERASE_PARAMS_LEN];
        link.read(Register::EraseParams, &mut params).await?;
        Ok(QuickPeekMessage::erase(status.panel_state, Rect::parse(&params)?))
    }
}

/// Outcome of handing a request to the command queue
enum Admission {
    Queued(Enqueued),
    Disabled,
    Full,
}

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Service one companion interrupt
    ///
    /// While wakeable interrupts are suppressed the link is not touched;
    /// the interrupt is only counted and replayed by
    /// [`resume`](Self::resume). Outside [`DeviceMode::Normal`] the
    /// companion is not speaking the peek protocol and the interrupt is
    /// dropped without a read.
    pub async fn handle_interrupt(&self) {
        let suppressed = self.with_state(|s| {
            if s.suppress_wakeable_interrupts {
                s.ignored_interrupt_count = s.ignored_interrupt_count.saturating_add(1);
                true
            } else {
                s.peek_activity = true;
                false
            }
        });
        if suppressed {
            debug!("Interrupt ignored while suspended");
            return;
        }

        let result = {
            let mut device = self.device.lock().await;
            if device.mode != DeviceMode::Normal {
                debug!("Interrupt dropped in {:?} mode", device.mode);
                return;
            }
            read_message(&mut device.link).await
        };

        match result {
            Ok(message) => self.submit(message).await,
            Err(e) => {
                warn!("Failed to read quick-peek request: {:?}", e);
                self.acknowledge(None, AckCode::Invalid).await;
                self.release_if_quiescent();
            }
        }
    }

    /// Queue a decoded request and schedule the sequencer if idle
    ///
    /// Disabled or overflowing requests are answered `Invalid` at once.
    pub async fn submit(&self, message: QuickPeekMessage) {
        // Taken before queueing so a fast sequencer cannot release first
        self.wakelock.acquire();

        let admission = self.with_state(|s| {
            if !s.enabled {
                return Admission::Disabled;
            }
            match s.enqueue(message) {
                Ok(queued) => Admission::Queued(queued),
                Err(_) => Admission::Full,
            }
        });

        match admission {
            Admission::Queued(Enqueued::Schedule) => {
                trace!("Queued {:?}, scheduling sequencer", message.reason());
                self.schedule.signal(());
            }
            Admission::Queued(Enqueued::Running) => {
                trace!("Queued {:?}", message.reason());
            }
            Admission::Disabled => {
                debug!("Quick-peek disabled, rejecting {:?}", message.reason());
                self.acknowledge(Some(&message), AckCode::Invalid).await;
                self.release_if_quiescent();
            }
            Admission::Full => {
                warn!("Command queue full, rejecting {:?}", message.reason());
                self.acknowledge(Some(&message), AckCode::Invalid).await;
                self.release_if_quiescent();
            }
        }
    }
}
