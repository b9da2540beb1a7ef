//! Address-tagged register blocks
//!
//! A [`RegisterBlock`] is one bus transfer: a 16-bit start address followed by
//! the bytes for consecutive registers. The bridge auto-increments its address
//! pointer per byte, so every byte between the first and last register must be
//! present; unused registers inside a block are written as explicit zeros.
//!
//! ## Packing
//!
//! - [`push_u16`](RegisterBlock::push_u16) emits bits 7:0 then bits 15:8.
//! - [`push_u32`](RegisterBlock::push_u32) emits bits 15:0 then bits 31:16.
//!   The low half must go first or the chip latches misaligned contents.
//!
//! The control port shifts each 16-bit half in high byte first. Register
//! values taken from the datasheet go through
//! [`push_register16`](RegisterBlock::push_register16) and
//! [`push_register32`](RegisterBlock::push_register32), which swap the bytes
//! of each half before packing.
//!
//! ```
//! use tc358778::RegisterBlock;
//!
//! let mut block = RegisterBlock::new(0x0210);
//! if block.push_u32(0x1234_5678).is_err() {
//!     return;
//! }
//! assert_eq!(block.page(), 0x02);
//! assert_eq!(block.as_bytes(), &[0x10, 0x78, 0x56, 0x34, 0x12]);
//! ```

use crate::error::BuilderError;
use crate::interface::MAX_TRANSFER_LEN;

/// Ordered bytes for consecutive registers starting at `address`
#[derive(Clone, Copy, PartialEq)]
pub struct RegisterBlock {
    address: u16,
    /// Low address byte followed by payload
    buf: [u8; MAX_TRANSFER_LEN],
    len: usize,
}

impl RegisterBlock {
    /// Largest payload a single block can carry
    pub const MAX_PAYLOAD: usize = MAX_TRANSFER_LEN - 1;

    /// Create an empty block starting at `address`
    pub fn new(address: u16) -> Self {
        let mut buf = [0u8; MAX_TRANSFER_LEN];
        buf[0] = (address & 0xFF) as u8;
        Self {
            address,
            buf,
            len: 1,
        }
    }

    /// Create a block from raw payload bytes
    pub fn with_bytes(address: u16, payload: &[u8]) -> Result<Self, BuilderError> {
        let mut block = Self::new(address);
        block.push_bytes(payload)?;
        Ok(block)
    }

    /// Create a block holding a single 16-bit register value
    pub fn with_register16(address: u16, value: u16) -> Result<Self, BuilderError> {
        let mut block = Self::new(address);
        block.push_register16(value)?;
        Ok(block)
    }

    /// Create a block holding a single 32-bit register value
    pub fn with_register32(address: u16, value: u32) -> Result<Self, BuilderError> {
        let mut block = Self::new(address);
        block.push_register32(value)?;
        Ok(block)
    }

    /// Append raw bytes
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<&mut Self, BuilderError> {
        let end = self.len + bytes.len();
        if end > MAX_TRANSFER_LEN {
            return Err(BuilderError::BlockOverflow {
                address: self.address,
            });
        }
        self.buf[self.len..end].copy_from_slice(bytes);
        self.len = end;
        Ok(self)
    }

    /// Append one byte
    pub fn push_u8(&mut self, value: u8) -> Result<&mut Self, BuilderError> {
        self.push_bytes(&[value])
    }

    /// Append a 16-bit register value, bits 7:0 first
    pub fn push_u16(&mut self, value: u16) -> Result<&mut Self, BuilderError> {
        self.push_bytes(&value.to_le_bytes())
    }

    /// Append a 32-bit register value as [bits 15:0][bits 31:16]
    pub fn push_u32(&mut self, value: u32) -> Result<&mut Self, BuilderError> {
        let [b0, b1, b2, b3] = value.to_le_bytes();
        self.push_bytes(&[b0, b1, b2, b3])
    }

    /// Append a 16-bit register value in control-port order (bits 15:8 first)
    pub fn push_register16(&mut self, value: u16) -> Result<&mut Self, BuilderError> {
        self.push_u16(value.swap_bytes())
    }

    /// Append a 32-bit register value in control-port order
    ///
    /// Bits 15:0 go first, each half high byte first.
    pub fn push_register32(&mut self, value: u32) -> Result<&mut Self, BuilderError> {
        self.push_u32(((value & 0x00FF_00FF) << 8) | ((value >> 8) & 0x00FF_00FF))
    }

    /// Full 16-bit start address
    pub fn address(&self) -> u16 {
        self.address
    }

    /// Register page (high address byte), sent ahead of [`as_bytes`](Self::as_bytes)
    pub fn page(&self) -> u8 {
        (self.address >> 8) as u8
    }

    /// Transfer bytes: low address byte followed by the payload
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Payload bytes without the address byte
    pub fn payload(&self) -> &[u8] {
        &self.buf[1..self.len]
    }

    /// 16-bit register value at `address`, as passed to
    /// [`push_register16`](Self::push_register16)
    ///
    /// `None` if the block does not cover both bytes of the register.
    pub fn register16(&self, address: u16) -> Option<u16> {
        let offset = usize::from(address.checked_sub(self.address)?);
        match self.payload().get(offset..offset + 2)? {
            &[high, low] => Some(u16::from_be_bytes([high, low])),
            _ => None,
        }
    }
}

impl core::fmt::Debug for RegisterBlock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "RegisterBlock({:#06x}, {:02x?})", self.address, self.payload())
    }
}
