//! Framebuffer trait for peek drawing

use core::future::Future;

use quickpeek_protocol::{PanelState, Point, Rect};

/// Errors reported by the framebuffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FramebufferError {
    /// Panel did not respond or rejected the command
    Panel,
    /// Framebuffer is owned by another client
    Busy,
    /// Buffer or region unknown to the framebuffer
    InvalidArgument,
}

/// Successful result of [`QuickDraw::prepare`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PrepareOutcome {
    /// Panel is ready for peek drawing
    Ready,
    /// Panel is ready, but only after recovering from an ESD event
    EsdRecovered,
}

/// Partial-update primitives of the host framebuffer
///
/// Calls may block for a panel refresh. The coordinator never holds its
/// queue lock across them.
pub trait QuickDraw {
    /// Wake the panel into peek mode
    fn prepare(
        &mut self,
        panel_state: PanelState,
    ) -> impl Future<Output = Result<PrepareOutcome, FramebufferError>>;

    /// Show a pre-rendered buffer, optionally moved to `point`
    fn execute(
        &mut self,
        buffer_id: u8,
        point: Option<Point>,
    ) -> impl Future<Output = Result<(), FramebufferError>>;

    /// Clear a region
    fn erase(&mut self, rect: Rect) -> impl Future<Output = Result<(), FramebufferError>>;

    /// Leave peek mode
    fn cleanup(&mut self) -> impl Future<Output = Result<(), FramebufferError>>;
}
