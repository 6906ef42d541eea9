//! Reset and drain
//!
//! Returns the coordinator to its initial, unprepared state. Requests that
//! were still queued are answered `Done` without touching the framebuffer.

use embassy_sync::blocking_mutex::raw::RawMutex;
use quickpeek_protocol::AckCode;

use super::{Coordinator, DeviceMode};
use crate::traits::{CompanionLink, QuickDraw, WakeLock};

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Drain the queue, undo any prepare and release the wake lock
    ///
    /// Waits for a request the sequencer is applying to finish. Calling it
    /// on an already clean coordinator only releases the wake lock.
    /// Requests that arrive once the drain started are left to the
    /// sequencer and meet an unprepared panel.
    pub async fn reset(&self) {
        let drained = self.with_state(|s| s.detach_queue());

        // Blocks until the sequencer is between requests
        let mut panel = self.panel.lock().await;

        if self.with_state(|s| s.prepared) {
            debug!("Reset while prepared, cleaning up panel");
            if let Err(e) = panel.cleanup().await {
                warn!("Cleanup during reset failed: {:?}", e);
            }
        }

        if !drained.is_empty() {
            info!("Reset drained {} queued request(s)", drained.len());
        }
        for message in drained.iter() {
            self.acknowledge(Some(message), AckCode::Done).await;
        }

        self.with_state(|s| {
            s.clear_transient();
            if s.is_quiescent() {
                s.wake_idle_waiters();
            }
            // Requests queued after the drain still need the host awake
            if s.is_empty() {
                self.wakelock.release();
            }
        });
        drop(panel);
    }

    /// Change the companion mode
    ///
    /// Always resets. Entering [`DeviceMode::Normal`] also re-resolves the
    /// enable vote, which is skipped in any other mode.
    pub async fn set_mode(&self, mode: DeviceMode) {
        let previous = {
            let mut device = self.device.lock().await;
            core::mem::replace(&mut device.mode, mode)
        };
        if previous != mode {
            info!("Companion mode {:?} -> {:?}", previous, mode);
        }

        self.reset().await;

        if mode == DeviceMode::Normal {
            self.resolve().await;
        }
    }

    /// Device detach
    ///
    /// Stops accepting requests and drains what is left.
    pub async fn shutdown(&self) {
        self.with_state(|s| s.enabled = false);
        self.reset().await;
        info!("Quick-peek coordinator shut down");
    }
}
