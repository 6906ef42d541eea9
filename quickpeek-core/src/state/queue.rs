//! Coordinator state guarded by the queue lock
//!
//! Every method here is O(1) so the lock can be taken from the interrupt
//! path. Nothing in this module awaits.

use core::task::Waker;

use embassy_sync::waitqueue::MultiWakerRegistration;
use heapless::Deque;
use quickpeek_protocol::QuickPeekMessage;

/// Maximum queued requests
pub const QUEUE_DEPTH: usize = 16;

/// Maximum concurrent `block_until_idle` callers
pub const IDLE_WAITERS: usize = 4;

/// Pending request list
pub type CommandQueue = Deque<QuickPeekMessage, QUEUE_DEPTH>;

/// Result of [`CoordinatorState::enqueue`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Enqueued {
    /// Queued; the sequencer was idle and must be scheduled
    Schedule,
    /// Queued behind a sequencer that is already running
    Running,
}

/// Shared coordinator state
pub struct CoordinatorState {
    pub(crate) queue: CommandQueue,
    /// Between a successful Prepare and the next Complete
    pub(crate) prepared: bool,
    /// Sequencer is scheduled or draining
    pub(crate) in_progress: bool,
    /// Ingestion accepts requests
    pub(crate) enabled: bool,
    /// Interrupts skipped while wakeable interrupts were suppressed
    pub(crate) ignored_interrupt_count: u16,
    pub(crate) suppress_wakeable_interrupts: bool,
    /// A quick-peek interrupt was serviced since the last check
    pub(crate) peek_activity: bool,
    idle_waiters: MultiWakerRegistration<IDLE_WAITERS>,
}

impl Default for CoordinatorState {
    fn default() -> Self {
        Self::new()
    }
}

impl CoordinatorState {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            prepared: false,
            in_progress: false,
            enabled: false,
            ignored_interrupt_count: 0,
            suppress_wakeable_interrupts: false,
            peek_activity: false,
            idle_waiters: MultiWakerRegistration::new(),
        }
    }

    /// Append a request
    ///
    /// Marks the sequencer in progress when it was idle so that at most
    /// one run is ever scheduled. A full queue hands the message back.
    pub fn enqueue(&mut self, message: QuickPeekMessage) -> Result<Enqueued, QuickPeekMessage> {
        self.queue.push_back(message)?;

        if self.in_progress {
            Ok(Enqueued::Running)
        } else {
            self.in_progress = true;
            Ok(Enqueued::Schedule)
        }
    }

    /// Take the next request for the sequencer
    ///
    /// An empty queue ends the current run.
    pub fn next_for_sequencer(&mut self) -> Option<QuickPeekMessage> {
        match self.queue.pop_front() {
            Some(message) => {
                self.in_progress = true;
                Some(message)
            }
            None => {
                self.in_progress = false;
                None
            }
        }
    }

    /// Check whether requests are waiting
    pub fn is_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// No queued, running or prepared work
    pub fn is_quiescent(&self) -> bool {
        !self.in_progress && !self.prepared && self.queue.is_empty()
    }

    /// Swap the queue for an empty one and return the old contents
    pub fn detach_queue(&mut self) -> CommandQueue {
        core::mem::replace(&mut self.queue, Deque::new())
    }

    /// Clear per-sequence bookkeeping
    pub fn clear_transient(&mut self) {
        self.prepared = false;
        self.ignored_interrupt_count = 0;
        self.suppress_wakeable_interrupts = false;
    }

    pub fn register_idle_waiter(&mut self, waker: &Waker) {
        self.idle_waiters.register(waker);
    }

    pub fn wake_idle_waiters(&mut self) {
        self.idle_waiters.wake();
    }
}
