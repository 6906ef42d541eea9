//! Quick-peek display update coordinator
//!
//! One [`Coordinator`] exists per attached companion controller. All entry
//! points take `&self`, so platforms share it as a `&'static` handle between
//! the interrupt task, the sequencer task and the suspend hooks.
//!
//! # Locks
//!
//! - queue lock: blocking mutex around [`CoordinatorState`], never held
//!   across an await. Wake lock releases happen inside it.
//! - vote lock: blocking mutex around [`VoteState`]
//! - device lock: async mutex around the companion link and device mode
//! - panel lock: async mutex around the framebuffer, held by the sequencer
//!   for one whole request so reset can wait for it
//!
//! Lock order is panel, then device. The queue lock is never taken while
//! the device lock is held, and the vote lock is a leaf.

mod ack;
mod gate;
mod ingest;
mod reset;
mod sequencer;
mod voter;

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex as BlockingMutex;
use embassy_sync::mutex::Mutex;
use embassy_sync::signal::Signal;

use crate::config::CoordinatorConfig;
use crate::state::{CoordinatorState, SequencerPhase, VoteState};
use crate::traits::{CompanionLink, QuickDraw, WakeLock};

pub use ingest::IngestError;
pub use voter::ExchangeError;

/// Operating mode of the companion controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DeviceMode {
    /// Normal operation, quick-peek available
    Normal,
    /// Factory test firmware running
    FactoryTest,
    /// Companion is in its bootloader
    Bootloader,
}

/// Companion link plus the mode it is in, guarded by the device lock
struct Device<L> {
    link: L,
    mode: DeviceMode,
}

/// Quick-peek coordinator
pub struct Coordinator<M: RawMutex, L, P, W> {
    config: CoordinatorConfig,
    state: BlockingMutex<M, RefCell<CoordinatorState>>,
    votes: BlockingMutex<M, RefCell<VoteState>>,
    device: Mutex<M, Device<L>>,
    panel: Mutex<M, P>,
    wakelock: W,
    /// Wakes the sequencer task
    schedule: Signal<M, ()>,
}

impl<M, L, P, W> Coordinator<M, L, P, W>
where
    M: RawMutex,
    L: CompanionLink,
    P: QuickDraw,
    W: WakeLock,
{
    /// Create a coordinator at device attach
    ///
    /// Quick-peek starts disabled until every voter has voted for it and
    /// [`resolve`](Self::resolve) ran.
    pub fn new(config: CoordinatorConfig, link: L, panel: P, wakelock: W) -> Self {
        Self {
            config,
            state: BlockingMutex::new(RefCell::new(CoordinatorState::new())),
            votes: BlockingMutex::new(RefCell::new(VoteState::new())),
            device: Mutex::new(Device {
                link,
                mode: DeviceMode::Normal,
            }),
            panel: Mutex::new(panel),
            wakelock,
            schedule: Signal::new(),
        }
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    /// Between a successful Prepare and the next Complete
    pub fn is_prepared(&self) -> bool {
        self.with_state(|s| s.prepared)
    }

    pub fn is_in_progress(&self) -> bool {
        self.with_state(|s| s.in_progress)
    }

    pub fn phase(&self) -> SequencerPhase {
        SequencerPhase::from_in_progress(self.is_in_progress())
    }

    /// Ingestion currently accepts requests
    pub fn is_enabled(&self) -> bool {
        self.with_state(|s| s.enabled)
    }

    /// Requests are waiting in the command queue
    pub fn is_pending(&self) -> bool {
        self.with_state(|s| s.is_pending())
    }

    /// Interrupts skipped while suspended
    pub fn ignored_interrupts(&self) -> u16 {
        self.with_state(|s| s.ignored_interrupt_count)
    }

    /// Wakeable interrupts are currently being ignored
    pub fn is_suppressed(&self) -> bool {
        self.with_state(|s| s.suppress_wakeable_interrupts)
    }

    /// Return and clear the quick-peek activity flag
    ///
    /// Lets the touch path tell a peek-originated wakeup from its own.
    pub fn take_peek_activity(&self) -> bool {
        self.with_state(|s| core::mem::take(&mut s.peek_activity))
    }

    /// Current companion mode
    pub async fn mode(&self) -> DeviceMode {
        self.device.lock().await.mode
    }

    /// Give back the collaborators after detach
    pub fn into_parts(self) -> (L, P, W) {
        let device = self.device.into_inner();
        (device.link, self.panel.into_inner(), self.wakelock)
    }

    /// Run `f` under the queue lock
    fn with_state<R>(&self, f: impl FnOnce(&mut CoordinatorState) -> R) -> R {
        self.state.lock(|state| f(&mut state.borrow_mut()))
    }

    /// Hand out a grace period on the wake lock if nothing else holds it
    fn release_if_quiescent(&self) {
        let grace = embassy_time::Duration::from_millis(self.config.wakelock_grace_ms as u64);
        self.with_state(|s| {
            if s.is_quiescent() {
                self.wakelock.release_after(grace);
            }
        });
    }
}
