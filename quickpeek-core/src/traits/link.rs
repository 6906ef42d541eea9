//! Companion controller link trait

use core::future::Future;

use quickpeek_protocol::Register;

/// Errors that can occur on the companion link
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// Companion did not acknowledge the transfer
    Nack,
    /// Bus-level failure (arbitration, framing, ...)
    Bus,
    /// Transfer did not complete in time
    Timeout,
    /// Frame does not fit the transfer buffer
    FrameTooLong,
}

/// Register-style link to the companion controller
///
/// Every transfer moves one fixed-size frame. Callers serialize access
/// through the coordinator's device lock.
pub trait CompanionLink {
    /// Read exactly `buf.len()` bytes from `register`
    fn read(
        &mut self,
        register: Register,
        buf: &mut [u8],
    ) -> impl Future<Output = Result<(), TransportError>>;

    /// Write `data` to `register`
    fn write(
        &mut self,
        register: Register,
        data: &[u8],
    ) -> impl Future<Output = Result<(), TransportError>>;
}
