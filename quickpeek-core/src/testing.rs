//! Host-side mocks for the collaborator traits
//!
//! Each mock is a cheap handle over shared state, so a test keeps one
//! clone for assertions while the coordinator owns the other.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::sync::mpsc;
use std::thread;

use embassy_futures::block_on;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_time::Duration;
use quickpeek_protocol::{
    AckFrame, DrawParams, PanelState, Point, Reason, Rect, Register, StatusWord,
};

use crate::config::CoordinatorConfig;
use crate::coordinator::Coordinator;
use crate::state::VoterId;
use crate::traits::{
    CompanionLink, FramebufferError, PrepareOutcome, QuickDraw, TransportError, WakeLock,
};

#[derive(Default)]
struct LinkLog {
    /// Scripted register contents, consumed in order
    script: VecDeque<(Register, Vec<u8>)>,
    reads: Vec<Register>,
    writes: Vec<(Register, Vec<u8>)>,
    fail_writes: bool,
}

/// Scripted companion link
#[derive(Clone, Default)]
pub struct MockLink {
    log: Rc<RefCell<LinkLog>>,
}

impl MockLink {
    /// Queue the bytes returned by the next read of `register`
    pub fn push_raw(&self, register: Register, bytes: &[u8]) {
        self.log
            .borrow_mut()
            .script
            .push_back((register, bytes.to_vec()));
    }

    fn push_status(&self, panel_state: u8, reason: Reason) {
        let status = StatusWord {
            panel_state: PanelState(panel_state),
            reason,
        };
        self.push_raw(Register::PeekEvent, &status.encode());
    }

    pub fn push_prepare(&self, panel_state: u8) {
        self.push_status(panel_state, Reason::Prepare);
    }

    pub fn push_complete(&self, panel_state: u8) {
        self.push_status(panel_state, Reason::Complete);
    }

    pub fn push_draw(&self, buffer_id: u8, point: Option<Point>) {
        self.push_status(1, Reason::Draw);
        let params = DrawParams { buffer_id, point };
        self.push_raw(Register::DrawParams, &params.encode());
    }

    pub fn push_erase(&self, rect: Rect) {
        self.push_status(1, Reason::Erase);
        self.push_raw(Register::EraseParams, &rect.encode());
    }

    /// Script one busy-register poll; unscripted polls read idle
    pub fn push_busy(&self, busy: u8) {
        self.push_raw(Register::CompanionBusy, &[busy]);
    }

    /// Make every following write fail with [`TransportError::Nack`]
    pub fn fail_writes(&self, fail: bool) {
        self.log.borrow_mut().fail_writes = fail;
    }

    /// Registers read so far
    pub fn reads(&self) -> Vec<Register> {
        self.log.borrow().reads.clone()
    }

    /// Decoded ack frames written so far
    pub fn acks(&self) -> Vec<AckFrame> {
        self.writes_to(Register::PeekAck)
            .iter()
            .map(|bytes| AckFrame::parse(bytes).unwrap())
            .collect()
    }

    /// Handover/takeback bytes written so far
    pub fn peek_status_writes(&self) -> Vec<u8> {
        self.writes_to(Register::PeekStatus)
            .iter()
            .map(|bytes| bytes[0])
            .collect()
    }

    fn writes_to(&self, register: Register) -> Vec<Vec<u8>> {
        self.log
            .borrow()
            .writes
            .iter()
            .filter(|(r, _)| *r == register)
            .map(|(_, bytes)| bytes.clone())
            .collect()
    }
}

impl CompanionLink for MockLink {
    async fn read(&mut self, register: Register, buf: &mut [u8]) -> Result<(), TransportError> {
        let mut log = self.log.borrow_mut();
        log.reads.push(register);

        let scripted = matches!(log.script.front(), Some((r, _)) if *r == register);
        if scripted {
            let (_, bytes) = log.script.pop_front().unwrap();
            if bytes.len() != buf.len() {
                return Err(TransportError::Bus);
            }
            buf.copy_from_slice(&bytes);
            Ok(())
        } else if register == Register::CompanionBusy {
            buf.fill(0);
            Ok(())
        } else {
            Err(TransportError::Nack)
        }
    }

    async fn write(&mut self, register: Register, data: &[u8]) -> Result<(), TransportError> {
        let mut log = self.log.borrow_mut();
        if log.fail_writes {
            return Err(TransportError::Nack);
        }
        log.writes.push((register, data.to_vec()));
        Ok(())
    }
}

/// Framebuffer call as observed by [`MockPanel`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PanelCall {
    Prepare(u8),
    Execute(u8, Option<Point>),
    Erase(Rect),
    Cleanup,
}

/// How [`MockPanel::prepare`](QuickDraw::prepare) answers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrepareScript {
    #[default]
    Ready,
    EsdRecovered,
    Fail,
}

#[derive(Default)]
struct PanelLog {
    calls: Vec<PanelCall>,
    prepare: PrepareScript,
    execute_error: Option<FramebufferError>,
    erase_error: Option<FramebufferError>,
    cleanup_error: Option<FramebufferError>,
    yield_in_execute: bool,
}

/// Recording framebuffer
#[derive(Clone, Default)]
pub struct MockPanel {
    log: Rc<RefCell<PanelLog>>,
}

impl MockPanel {
    pub fn calls(&self) -> Vec<PanelCall> {
        self.log.borrow().calls.clone()
    }

    pub fn script_prepare(&self, script: PrepareScript) {
        self.log.borrow_mut().prepare = script;
    }

    pub fn fail_execute(&self, error: FramebufferError) {
        self.log.borrow_mut().execute_error = Some(error);
    }

    pub fn fail_erase(&self, error: FramebufferError) {
        self.log.borrow_mut().erase_error = Some(error);
    }

    pub fn fail_cleanup(&self, error: FramebufferError) {
        self.log.borrow_mut().cleanup_error = Some(error);
    }

    /// Suspend once inside `execute`, as a slow panel refresh would
    pub fn yield_in_execute(&self, enable: bool) {
        self.log.borrow_mut().yield_in_execute = enable;
    }

    fn record(&self, call: PanelCall) {
        self.log.borrow_mut().calls.push(call);
    }
}

impl QuickDraw for MockPanel {
    async fn prepare(&mut self, panel_state: PanelState) -> Result<PrepareOutcome, FramebufferError> {
        self.record(PanelCall::Prepare(panel_state.0));
        match self.log.borrow().prepare {
            PrepareScript::Ready => Ok(PrepareOutcome::Ready),
            PrepareScript::EsdRecovered => Ok(PrepareOutcome::EsdRecovered),
            PrepareScript::Fail => Err(FramebufferError::Panel),
        }
    }

    async fn execute(&mut self, buffer_id: u8, point: Option<Point>) -> Result<(), FramebufferError> {
        self.record(PanelCall::Execute(buffer_id, point));
        let yield_once = self.log.borrow().yield_in_execute;
        if yield_once {
            embassy_futures::yield_now().await;
        }
        self.log.borrow().execute_error.map_or(Ok(()), Err)
    }

    async fn erase(&mut self, rect: Rect) -> Result<(), FramebufferError> {
        self.record(PanelCall::Erase(rect));
        self.log.borrow().erase_error.map_or(Ok(()), Err)
    }

    async fn cleanup(&mut self) -> Result<(), FramebufferError> {
        self.record(PanelCall::Cleanup);
        self.log.borrow().cleanup_error.map_or(Ok(()), Err)
    }
}

#[derive(Default)]
struct WakeLog {
    held: bool,
    acquires: usize,
    releases: usize,
    timed_releases: usize,
    track_unguarded: bool,
    unguarded_releases: usize,
}

/// Counting wake lock
#[derive(Clone, Default)]
pub struct MockWakeLock {
    log: Rc<RefCell<WakeLog>>,
}

impl MockWakeLock {
    pub fn is_held(&self) -> bool {
        self.log.borrow().held
    }

    pub fn acquires(&self) -> usize {
        self.log.borrow().acquires
    }

    pub fn releases(&self) -> usize {
        self.log.borrow().releases
    }

    pub fn timed_releases(&self) -> usize {
        self.log.borrow().timed_releases
    }

    /// Count releases made outside the queue lock
    ///
    /// Each release then costs a short wait, so only tests about lock
    /// discipline turn this on.
    pub fn track_unguarded_releases(&self) {
        self.log.borrow_mut().track_unguarded = true;
    }

    pub fn unguarded_releases(&self) -> usize {
        self.log.borrow().unguarded_releases
    }
}

impl WakeLog {
    fn record_release(&mut self) {
        if self.track_unguarded && !in_critical_section() {
            self.unguarded_releases += 1;
        }
    }
}

/// Whether this thread is inside a critical section
///
/// The host implementation is one global lock, so another thread cannot
/// enter while this one holds it.
fn in_critical_section() -> bool {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        critical_section::with(|_| {
            let _ = tx.send(());
        })
    });
    rx.recv_timeout(std::time::Duration::from_millis(20)).is_err()
}

impl WakeLock for MockWakeLock {
    fn acquire(&self) {
        let mut log = self.log.borrow_mut();
        log.held = true;
        log.acquires += 1;
    }

    fn release(&self) {
        let mut log = self.log.borrow_mut();
        log.held = false;
        log.releases += 1;
        log.record_release();
    }

    // The grace period is not simulated
    fn release_after(&self, _timeout: Duration) {
        let mut log = self.log.borrow_mut();
        log.held = false;
        log.timed_releases += 1;
        log.record_release();
    }
}

pub type TestCoordinator =
    Coordinator<CriticalSectionRawMutex, MockLink, MockPanel, MockWakeLock>;

/// Test-side handles to the coordinator's collaborators
pub struct Mocks {
    pub link: MockLink,
    pub panel: MockPanel,
    pub wakelock: MockWakeLock,
}

impl Coordinator<CriticalSectionRawMutex, MockLink, MockPanel, MockWakeLock> {
    /// Fresh coordinator, feature disabled
    pub fn build() -> (Self, Mocks) {
        Self::build_with(CoordinatorConfig::default())
    }

    pub fn build_with(config: CoordinatorConfig) -> (Self, Mocks) {
        let mocks = Mocks {
            link: MockLink::default(),
            panel: MockPanel::default(),
            wakelock: MockWakeLock::default(),
        };
        let coordinator = Self::new(
            config,
            mocks.link.clone(),
            mocks.panel.clone(),
            mocks.wakelock.clone(),
        );
        (coordinator, mocks)
    }

    /// Coordinator after every voter enabled the feature
    pub fn enabled() -> (Self, Mocks) {
        Self::enabled_with(CoordinatorConfig::default())
    }

    pub fn enabled_with(config: CoordinatorConfig) -> (Self, Mocks) {
        let (coordinator, mocks) = Self::build_with(config);
        for voter in VoterId::ALL {
            coordinator.vote(voter, true);
        }
        block_on(coordinator.resolve());
        (coordinator, mocks)
    }
}
