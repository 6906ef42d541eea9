//! Idle/suspend gate
//!
//! Hooks for the platform's suspend negotiation. Once the coordinator
//! reports idle, wakeable interrupts are parked until [`resume`].
//!
//! [`resume`]: Coordinator::resume

use core::future::poll_fn;
use core::task::Poll;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_time::{with_timeout, Duration};

use super::Coordinator;
use crate::traits::{CompanionLink, QuickDraw, WakeLock};

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Report whether the system may suspend
    ///
    /// True only when nothing is queued, running or prepared. A true result
    /// also stops servicing wakeable interrupts.
    pub fn can_idle(&self) -> bool {
        self.with_state(|s| {
            if s.is_quiescent() {
                s.suppress_wakeable_interrupts = true;
                true
            } else {
                false
            }
        })
    }

    /// Wait until [`can_idle`](Self::can_idle) holds or `timeout` elapses
    ///
    /// Returns whether the coordinator became idle in time.
    pub async fn block_until_idle(&self, timeout: Duration) -> bool {
        if self.can_idle() {
            return true;
        }

        let idle = poll_fn(|cx| {
            self.with_state(|s| {
                if s.is_quiescent() {
                    s.suppress_wakeable_interrupts = true;
                    Poll::Ready(())
                } else {
                    s.register_idle_waiter(cx.waker());
                    Poll::Pending
                }
            })
        });

        let reached = with_timeout(timeout, idle).await.is_ok();
        if !reached {
            debug!("Quick-peek still busy after suspend timeout");
        }
        reached
    }

    /// Leave suspend
    ///
    /// Re-enables wakeable interrupts and services the companion once if
    /// any interrupt arrived while they were parked.
    pub async fn resume(&self) {
        let ignored = self.with_state(|s| {
            s.suppress_wakeable_interrupts = false;
            core::mem::take(&mut s.ignored_interrupt_count)
        });

        if ignored > 0 {
            info!("Servicing {} interrupt(s) ignored during suspend", ignored);
            self.handle_interrupt().await;
        }
    }
}
