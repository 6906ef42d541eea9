//! Sequencer
//!
//! The single consumer of the command queue. Each request is validated
//! against the prepared flag, applied to the framebuffer and acked, in
//! arrival order. A failing request is acked `Invalid` and the loop moves
//! on.

use embassy_sync::blocking_mutex::raw::RawMutex;
use quickpeek_protocol::{AckCode, QuickPeekMessage};

use super::Coordinator;
use crate::state::validate;
use crate::traits::{CompanionLink, PrepareOutcome, QuickDraw, WakeLock};

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Sequencer task body
    ///
    /// Waits for ingestion to schedule a run and drains the queue.
    pub async fn run(&self) -> ! {
        info!("Sequencer started");
        loop {
            self.schedule.wait().await;
            self.service().await;
        }
    }

    /// Drain the command queue once
    ///
    /// Returns when the queue is empty. The wake lock is released if
    /// nothing is prepared at that point; a prepared panel keeps it held
    /// until Complete or reset.
    pub async fn service(&self) {
        loop {
            // The panel lock spans pop..ack so reset can wait for this request
            let mut panel = self.panel.lock().await;
            let Some(message) = self.with_state(|s| s.next_for_sequencer()) else {
                break;
            };

            let code = self.dispatch(&mut *panel, &message).await;
            self.acknowledge(Some(&message), code).await;

            // Let a waiting reset take the panel before the next pop
            drop(panel);
            embassy_futures::yield_now().await;
        }

        // Under the queue lock, or a concurrent enqueue could lose its token
        self.with_state(|s| {
            if s.is_quiescent() {
                s.wake_idle_waiters();
                trace!("Sequencer idle, releasing wake lock");
                self.wakelock.release();
            }
        });
    }

    /// Apply one request and pick its ack code
    async fn dispatch(&self, panel: &mut P, message: &QuickPeekMessage) -> AckCode {
        let prepared = self.with_state(|s| s.prepared);
        if let Err(e) = validate(message, prepared, self.config.max_buffer_id) {
            debug!("Rejecting {:?}: {:?}", message.reason(), e);
            return AckCode::Invalid;
        }

        match *message {
            QuickPeekMessage::Prepare { panel_state } => match panel.prepare(panel_state).await {
                Ok(PrepareOutcome::Ready) => {
                    self.with_state(|s| s.prepared = true);
                    AckCode::Ack
                }
                Ok(PrepareOutcome::EsdRecovered) => {
                    warn!("Panel recovered from ESD during prepare");
                    self.with_state(|s| s.prepared = true);
                    AckCode::EsdRecovered
                }
                Err(e) => {
                    warn!("Prepare failed: {:?}", e);
                    AckCode::Invalid
                }
            },
            QuickPeekMessage::Draw {
                buffer_id, point, ..
            } => match panel.execute(buffer_id, point).await {
                Ok(()) => AckCode::Ack,
                Err(e) => {
                    warn!("Draw of buffer {} failed: {:?}", buffer_id, e);
                    AckCode::Invalid
                }
            },
            QuickPeekMessage::Erase { rect, .. } => match panel.erase(rect).await {
                Ok(()) => AckCode::Ack,
                Err(e) => {
                    warn!("Erase failed: {:?}", e);
                    AckCode::Invalid
                }
            },
            QuickPeekMessage::Complete { .. } => {
                let result = panel.cleanup().await;
                self.with_state(|s| s.prepared = false);
                match result {
                    Ok(()) => AckCode::Ack,
                    Err(e) => {
                        warn!("Cleanup failed: {:?}", e);
                        AckCode::Invalid
                    }
                }
            }
        }
    }
}
