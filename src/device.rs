//! Si47xx Bus Transport
//!
//! This module provides the low-level I2C transport for Si47xx series radio
//! receivers. It supports both synchronous and asynchronous operation.
//!
//! The interface is built around the `Device<I2C>` struct which wraps an I2C
//! bus and provides methods for:
//! - Executing chip commands and collecting their fixed-length responses
//! - Polling the clear-to-send (CTS) status bit between commands
//! - Streaming firmware patch chunks during a patched power-up
//!
//! Every command follows the same wire shape: one opcode byte and its
//! argument bytes in a single write, a poll of the one-byte status word until
//! CTS is raised, then a fixed-length read whose first byte repeats the
//! status word.
//!
//! # Example
//! ```no_run
//! use si4735::{Device, GetRevision, SenPin};
//!
//! fn read_revision<I2C, D>(i2c: I2C, mut delay: D) -> Result<(), si4735::Error>
//! where
//!     I2C: embedded_hal::i2c::I2c,
//!     D: embedded_hal::delay::DelayNs,
//! {
//!     // Create the device on the address selected by the SEN pin strap
//!     let mut device = Device::new(i2c, SenPin::Low);
//!
//!     // Execute a command
//!     let _revision = device.execute_command(GetRevision, &mut delay)?;
//!     Ok(())
//! }
//! ```

use core::convert::Infallible;

use embedded_hal::i2c::ErrorKind;

use crate::poll::Deadline;
use crate::{ByteArray, Command, Error, FromByteArray, IntStatus, ToByteArray};

/// I2C address with the SEN pin strapped low.
const ADDR_SEN_LOW: u8 = 0x11;
/// I2C address with the SEN pin strapped high.
const ADDR_SEN_HIGH: u8 = 0x63;

/// Interval between CTS polls.
const CTS_POLL_STEP_US: u32 = 500;

/// Strap level of the SEN pin, which selects the chip's I2C address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SenPin {
    /// SEN tied low, address 0x11
    Low,
    /// SEN tied high, address 0x63
    High,
}

impl SenPin {
    fn address(self) -> u8 {
        match self {
            SenPin::Low => ADDR_SEN_LOW,
            SenPin::High => ADDR_SEN_HIGH,
        }
    }
}

fn map_bus_error<E: embedded_hal::i2c::Error>(e: E) -> Error {
    match e.kind() {
        ErrorKind::NoAcknowledge(_) => Error::NoAck,
        _ => Error::BusTimeout,
    }
}

/// Low-level transport for a Si47xx receiver.
///
/// This struct wraps an I2C bus and provides command execution with CTS
/// handshaking. It supports both synchronous operation through the
/// embedded-hal traits and asynchronous operation through embedded-hal-async.
pub struct Device<I2C> {
    i2c: I2C,
    address: u8,
    cts_budget_ms: u32,
}

impl<I2C> Device<I2C> {
    /// Creates a new Device instance wrapping the provided I2C bus.
    ///
    /// # Arguments
    /// * `i2c` - An I2C bus implementing the required embedded-hal traits
    /// * `sen` - Strap level of the chip's SEN pin
    pub fn new(i2c: I2C, sen: SenPin) -> Self {
        Self {
            i2c,
            address: sen.address(),
            cts_budget_ms: 100,
        }
    }

    /// Sets the time budget for each CTS wait.
    ///
    /// Most commands raise CTS within 300 us; the power-up sequence can take
    /// considerably longer with a crystal oscillator warming up.
    pub fn set_cts_budget_ms(&mut self, budget_ms: u32) {
        self.cts_budget_ms = budget_ms;
    }

    /// Releases the underlying I2C bus.
    ///
    /// This method consumes the Device instance and returns the wrapped bus.
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal::i2c::I2c,
{
    /// Reads the one-byte status word.
    pub fn read_status(&mut self) -> Result<IntStatus, Error> {
        let mut raw = [0u8; 1];
        self.i2c
            .read(self.address, &mut raw)
            .map_err(map_bus_error)?;
        Ok(IntStatus::from_bits_retain(raw[0]))
    }

    /// Polls the status word until CTS is raised.
    ///
    /// # Errors
    /// * `Error::BusTimeout` - CTS not raised within the configured budget
    pub fn wait_cts<D>(&mut self, delay: &mut D) -> Result<IntStatus, Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        let mut deadline = Deadline::new(self.cts_budget_ms);
        loop {
            let status = self.read_status()?;
            if status.contains(IntStatus::CTS) {
                return Ok(status);
            }
            if !deadline.tick(delay, CTS_POLL_STEP_US) {
                return Err(Error::BusTimeout);
            }
        }
    }

    /// Executes a command on the device.
    ///
    /// Writes the opcode and argument bytes, waits for CTS, then reads the
    /// fixed-length response.
    ///
    /// # Type Parameters
    /// * `C` - Command type implementing the Command trait with u8 ID
    ///
    /// # Arguments
    /// * `command` - The command to execute
    /// * `delay` - Delay provider used while polling for CTS
    ///
    /// # Returns
    /// Command response parameters on success
    ///
    /// # Errors
    /// * `Error::NoAck` - The chip did not acknowledge its address
    /// * `Error::BusTimeout` - I2C failure or CTS never raised
    /// * `Error::DeviceError` - The chip rejected the command (ERR bit)
    /// * `Error::InvalidResponse` - Failed to parse the command response
    pub fn execute_command<C, D>(
        &mut self,
        command: C,
        delay: &mut D,
    ) -> Result<C::ResponseParameters, Error>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
        D: embedded_hal::delay::DelayNs,
    {
        let request = command.invoking_parameters().to_bytes().unwrap();

        self.i2c
            .transaction(
                self.address,
                &mut [
                    embedded_hal::i2c::Operation::Write(&[C::id()]),
                    embedded_hal::i2c::Operation::Write(request.as_ref()),
                ],
            )
            .map_err(map_bus_error)?;

        let status = self.wait_cts(delay)?;
        if status.contains(IntStatus::ERR) {
            return Err(Error::DeviceError);
        }

        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();
        self.i2c
            .read(self.address, raw_response.as_mut())
            .map_err(map_bus_error)?;

        C::ResponseParameters::from_bytes(raw_response).map_err(|_| Error::InvalidResponse)
    }

    /// Writes one chunk of a firmware patch and waits for CTS.
    ///
    /// Patch chunks are raw 8-byte records sent between a patched power-up
    /// and the first tune command; they are not regular commands and have no
    /// response payload.
    pub fn send_patch_chunk<D>(&mut self, chunk: &[u8], delay: &mut D) -> Result<(), Error>
    where
        D: embedded_hal::delay::DelayNs,
    {
        self.i2c.write(self.address, chunk).map_err(map_bus_error)?;

        let status = self.wait_cts(delay)?;
        if status.contains(IntStatus::ERR) {
            return Err(Error::DeviceError);
        }
        Ok(())
    }
}

impl<I2C> Device<I2C>
where
    I2C: embedded_hal_async::i2c::I2c,
{
    /// Asynchronously reads the one-byte status word.
    ///
    /// This is the async version of [`read_status`](Device::read_status).
    pub async fn read_status_async(&mut self) -> Result<IntStatus, Error> {
        let mut raw = [0u8; 1];
        self.i2c
            .read(self.address, &mut raw)
            .await
            .map_err(map_bus_error)?;
        Ok(IntStatus::from_bits_retain(raw[0]))
    }

    /// Asynchronously polls the status word until CTS is raised.
    ///
    /// This is the async version of [`wait_cts`](Device::wait_cts).
    pub async fn wait_cts_async<D>(&mut self, delay: &mut D) -> Result<IntStatus, Error>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        let mut deadline = Deadline::new(self.cts_budget_ms);
        loop {
            let status = self.read_status_async().await?;
            if status.contains(IntStatus::CTS) {
                return Ok(status);
            }
            if !deadline.tick_async(delay, CTS_POLL_STEP_US).await {
                return Err(Error::BusTimeout);
            }
        }
    }

    /// Asynchronously executes a command on the device.
    ///
    /// This is the async version of [`execute_command`](Device::execute_command).
    pub async fn execute_command_async<C, D>(
        &mut self,
        command: C,
        delay: &mut D,
    ) -> Result<C::ResponseParameters, Error>
    where
        C: Command<IdType = u8>,
        C::CommandParameters: ToByteArray<Error = Infallible>,
        D: embedded_hal_async::delay::DelayNs,
    {
        let request = command.invoking_parameters().to_bytes().unwrap();

        self.i2c
            .transaction(
                self.address,
                &mut [
                    embedded_hal_async::i2c::Operation::Write(&[C::id()]),
                    embedded_hal_async::i2c::Operation::Write(request.as_ref()),
                ],
            )
            .await
            .map_err(map_bus_error)?;

        let status = self.wait_cts_async(delay).await?;
        if status.contains(IntStatus::ERR) {
            return Err(Error::DeviceError);
        }

        let mut raw_response = <C::ResponseParameters as FromByteArray>::Array::new();
        self.i2c
            .read(self.address, raw_response.as_mut())
            .await
            .map_err(map_bus_error)?;

        C::ResponseParameters::from_bytes(raw_response).map_err(|_| Error::InvalidResponse)
    }

    /// Asynchronously writes one chunk of a firmware patch and waits for CTS.
    ///
    /// This is the async version of [`send_patch_chunk`](Device::send_patch_chunk).
    pub async fn send_patch_chunk_async<D>(
        &mut self,
        chunk: &[u8],
        delay: &mut D,
    ) -> Result<(), Error>
    where
        D: embedded_hal_async::delay::DelayNs,
    {
        self.i2c
            .write(self.address, chunk)
            .await
            .map_err(map_bus_error)?;

        let status = self.wait_cts_async(delay).await?;
        if status.contains(IntStatus::ERR) {
            return Err(Error::DeviceError);
        }
        Ok(())
    }
}
