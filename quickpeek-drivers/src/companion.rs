//! Companion controller over I2C
//!
//! Each register is a fixed-size frame. Reads are a register-address
//! write followed by a repeated-start read; writes send the address byte
//! and the frame in one transfer. A write longer than the register's
//! frame never reaches the bus.

use embedded_hal::i2c::ErrorKind;
use embedded_hal_async::i2c::I2c;
use heapless::Vec;
use quickpeek_core::traits::{CompanionLink, TransportError};
use quickpeek_protocol::{Register, ERASE_PARAMS_LEN};

/// Default 7-bit address of the companion controller
pub const DEFAULT_ADDRESS: u8 = 0x39;

/// Register byte plus the largest frame
const MAX_WRITE_LEN: usize = 1 + ERASE_PARAMS_LEN;

/// I2C-attached companion controller
pub struct I2cCompanion<I2C> {
    i2c: I2C,
    address: u8,
}

impl<I2C> I2cCompanion<I2C>
where
    I2C: I2c,
{
    /// Create a link at [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    pub fn address(&self) -> u8 {
        self.address
    }

    /// Give back the bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

fn map_error<E: embedded_hal::i2c::Error>(e: E) -> TransportError {
    let kind = e.kind();
    #[cfg(feature = "defmt")]
    defmt::debug!("Companion I2C error: {}", defmt::Debug2Format(&kind));

    match kind {
        ErrorKind::NoAcknowledge(_) => TransportError::Nack,
        _ => TransportError::Bus,
    }
}

impl<I2C> CompanionLink for I2cCompanion<I2C>
where
    I2C: I2c,
{
    async fn read(&mut self, register: Register, buf: &mut [u8]) -> Result<(), TransportError> {
        self.i2c
            .write_read(self.address, &[register.addr()], buf)
            .await
            .map_err(map_error)
    }

    async fn write(&mut self, register: Register, data: &[u8]) -> Result<(), TransportError> {
        if data.len() > register.frame_len() {
            return Err(TransportError::FrameTooLong);
        }

        let mut frame: Vec<u8, MAX_WRITE_LEN> = Vec::new();
        frame
            .push(register.addr())
            .map_err(|_| TransportError::FrameTooLong)?;
        frame
            .extend_from_slice(data)
            .map_err(|_| TransportError::FrameTooLong)?;

        self.i2c
            .write(self.address, &frame)
            .await
            .map_err(map_error)
    }
}
