//! Hardware interface abstraction
//!
//! This module provides the [`BridgeInterface`] trait and the [`Interface`] struct
//! for talking to the TC358778XBG over its I2C control bus.
//!
//! ## Addressing
//!
//! Every bridge register has a 16-bit address. A transfer carries the high byte
//! (the register *page*) first, followed by the low byte and then the register
//! data. The chip increments its internal address pointer by one for every data
//! byte it receives, so adjacent registers can be written in a single block.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_hal::i2c::{I2c, Operation};
//! use tc358778::{BridgeInterface, Interface};
//! # use core::convert::Infallible;
//! # struct MockI2c;
//! # impl embedded_hal::i2c::ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! let mut interface = Interface::new(MockI2c);
//!
//! // SYSCTL (0x0002) = 0x0000
//! let _ = interface.write_block(0x00, &[0x02, 0x00, 0x00]);
//!
//! // Read back the first 16 bytes of the PPI page
//! let mut buf = [0u8; 16];
//! let _ = interface.read_block(0x02, 0x00, &mut buf);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::I2c;

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Default 7-bit I2C address of the TC358778XBG
pub const DEFAULT_ADDRESS: u8 = 0x0E;

/// Largest single transfer, counted from the low address byte
///
/// The bridge is driven with SMBus-style block writes, which carry at most
/// 32 bytes after the page byte.
pub const MAX_TRANSFER_LEN: usize = 32;

/// Trait for the control bus to the bridge
///
/// This trait abstracts over different bus implementations, allowing the
/// [`Bridge`](crate::bridge::Bridge) to work with any transport that can move
/// address-tagged byte blocks.
///
/// Implementations must complete each call as one bus transaction; the bridge
/// does not tolerate another transfer being interleaved inside a call.
pub trait BridgeInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Write a block of bytes starting at a register address
    ///
    /// # Arguments
    ///
    /// * `page` - High byte of the 16-bit register address
    /// * `data` - Low address byte followed by the register data
    fn write_block(&mut self, page: u8, data: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Read a block of bytes starting at a register address
    ///
    /// # Arguments
    ///
    /// * `page` - High byte of the 16-bit register address
    /// * `offset` - Low byte of the 16-bit register address
    /// * `buf` - Buffer filled with consecutive register bytes
    fn read_block(
        &mut self,
        page: u8,
        offset: u8,
        buf: &mut [u8],
    ) -> InterfaceResult<(), Self::Error>;
}

/// Errors that can occur at the interface level
#[derive(Debug)]
pub enum InterfaceError<I2cErr> {
    /// I2C communication error
    I2c(I2cErr),
    /// Block exceeds [`MAX_TRANSFER_LEN`]
    TooLong {
        /// Requested length in bytes
        len: usize,
    },
}

impl<I2cErr: Debug> core::fmt::Display for InterfaceError<I2cErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C error: {e:?}"),
            Self::TooLong { len } => {
                write!(f, "Block of {len} bytes exceeds {MAX_TRANSFER_LEN}")
            }
        }
    }
}

impl<I2cErr: Debug> core::error::Error for InterfaceError<I2cErr> {}

/// I2C interface implementation for the TC358778XBG
///
/// Implements [`BridgeInterface`] for any embedded-hal v1.0 [`I2c`] bus.
pub struct Interface<I2C> {
    /// I2C bus
    i2c: I2C,
    /// 7-bit device address
    address: u8,
}

impl<I2C> Interface<I2C>
where
    I2C: I2c,
{
    /// Create a new Interface at [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C) -> Self {
        Self::with_address(i2c, DEFAULT_ADDRESS)
    }

    /// Create a new Interface at a custom 7-bit address
    pub fn with_address(i2c: I2C, address: u8) -> Self {
        Self { i2c, address }
    }

    /// Get the 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Release the underlying I2C bus
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> BridgeInterface for Interface<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    type Error = InterfaceError<I2C::Error>;

    fn write_block(&mut self, page: u8, data: &[u8]) -> InterfaceResult<(), Self::Error> {
        if data.len() > MAX_TRANSFER_LEN {
            return Err(InterfaceError::TooLong { len: data.len() });
        }
        let mut frame = [0u8; MAX_TRANSFER_LEN + 1];
        frame[0] = page;
        frame[1..=data.len()].copy_from_slice(data);
        self.i2c
            .write(self.address, &frame[..=data.len()])
            .map_err(InterfaceError::I2c)
    }

    fn read_block(
        &mut self,
        page: u8,
        offset: u8,
        buf: &mut [u8],
    ) -> InterfaceResult<(), Self::Error> {
        if buf.len() > MAX_TRANSFER_LEN {
            return Err(InterfaceError::TooLong { len: buf.len() });
        }
        self.i2c
            .write_read(self.address, &[page, offset], buf)
            .map_err(InterfaceError::I2c)
    }
}
