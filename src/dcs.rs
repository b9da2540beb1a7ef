//! Panel packet framing
//!
//! The bridge relays DSI packets to the panel through its command registers
//! on page 0x06. One packet takes several register writes: the packet type,
//! the data words, then a start trigger. A [`Frame`] holds those writes in
//! order; the caller issues them back to back and then waits
//! [`Packet::settle_ms`] before the next packet.
//!
//! ```
//! use tc358778::{Packet, PacketKind};
//!
//! let frame = match Packet::Long(&[0xAA, 0xBB, 0xCC]).frame() {
//!     Ok(frame) => frame,
//!     Err(_) => return,
//! };
//! assert_eq!(frame.kind(), PacketKind::Long);
//! assert_eq!(frame.writes().len(), 6);
//! assert_eq!(frame.writes()[2].as_bytes(), &[0x10, 0xAA, 0xBB, 0xCC]);
//! ```

use crate::block::RegisterBlock;
use crate::command::*;
use crate::error::BuilderError;

/// Largest LONG payload: the write-data window 0x0610..=0x061F
pub const MAX_LONG_PAYLOAD: usize = 16;

/// Most register writes any packet kind needs
const MAX_FRAME_WRITES: usize = 6;

// DCSCMD_TYPE: bits 15:8 transfer mode, bits 7:0 DSI data type
const TYPE_DCS_SHORT: u16 = 0x1005;
const TYPE_DCS_SHORT_PARAM: u16 = 0x1015;
const TYPE_GENERIC_SHORT_PARAM: u16 = 0x1023;
const TYPE_DCS_LONG: u16 = 0x4039;

/// DCSCMD_ST value that starts the transfer
const START: u16 = 0x0001;

const CMD_SETTLE_MS: u32 = 10;
const WRITE_SETTLE_MS: u32 = 1;

/// Kind of relayed packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PacketKind {
    /// Zero-parameter DCS command
    Command,
    /// One-parameter DCS write
    Write,
    /// One-parameter generic (manufacturer) write
    Generic,
    /// DCS long write
    Long,
}

/// A packet to relay to the panel
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Packet<'a> {
    /// Zero-parameter DCS command, by opcode
    Command(u8),
    /// Write one byte to a panel register
    Write {
        /// Panel register
        register: u8,
        /// Value written
        value: u8,
    },
    /// Manufacturer-specific write of one byte to a panel register
    Generic {
        /// Panel register
        register: u8,
        /// Value written
        value: u8,
    },
    /// DCS long write carrying up to [`MAX_LONG_PAYLOAD`] bytes
    Long(&'a [u8]),
}

impl Packet<'_> {
    /// Packet kind
    pub fn kind(&self) -> PacketKind {
        match self {
            Self::Command(_) => PacketKind::Command,
            Self::Write { .. } => PacketKind::Write,
            Self::Generic { .. } => PacketKind::Generic,
            Self::Long(_) => PacketKind::Long,
        }
    }

    /// Time the panel needs after the packet, in milliseconds
    pub fn settle_ms(&self) -> u32 {
        match self {
            Self::Command(_) => CMD_SETTLE_MS,
            _ => WRITE_SETTLE_MS,
        }
    }

    /// Encode the packet as relay register writes
    ///
    /// # Errors
    ///
    /// Returns [`BuilderError::PayloadTooLong`] if a LONG payload exceeds
    /// [`MAX_LONG_PAYLOAD`].
    pub fn frame(&self) -> Result<Frame, BuilderError> {
        let reg16 = RegisterBlock::with_register16;
        let mut frame = Frame::new(self.kind());
        match *self {
            Self::Command(opcode) => {
                frame.push(reg16(DCSCMD_TYPE, TYPE_DCS_SHORT)?);
                frame.push(reg16(DCSCMD_WD0, u16::from(opcode))?);
                frame.push(reg16(DCSCMD_ST, START)?);
            }
            Self::Write { register: reg, value } | Self::Generic { register: reg, value } => {
                let packet_type = if matches!(self, Self::Write { .. }) {
                    TYPE_DCS_SHORT_PARAM
                } else {
                    TYPE_GENERIC_SHORT_PARAM
                };
                frame.push(reg16(DCSCMD_TYPE, packet_type)?);
                // Parameter in bits 15:8, panel register in bits 7:0
                frame.push(reg16(DCSCMD_WD0, u16::from_be_bytes([value, reg]))?);
                frame.push(reg16(DCSCMD_ST, START)?);
            }
            Self::Long(payload) => {
                if payload.len() > MAX_LONG_PAYLOAD {
                    return Err(BuilderError::PayloadTooLong {
                        len: payload.len(),
                        max: MAX_LONG_PAYLOAD,
                    });
                }
                frame.push(reg16(DCSCMD_TYPE, TYPE_DCS_LONG)?);
                frame.push(reg16(DCSCMD_WC, payload.len() as u16)?);
                frame.push(RegisterBlock::with_bytes(DCSCMD_WD0, payload)?);
                frame.push(reg16(DCSCMD_ST, START)?);
                frame.push(reg16(DCSCMD_WC, 0)?);
                frame.push(RegisterBlock::with_bytes(DCSCMD_WD1, &[0; 6])?);
            }
        }
        Ok(frame)
    }
}

/// Ordered relay register writes for one packet
#[derive(Clone, Debug)]
pub struct Frame {
    kind: PacketKind,
    writes: [RegisterBlock; MAX_FRAME_WRITES],
    len: usize,
}

impl Frame {
    fn new(kind: PacketKind) -> Self {
        Self {
            kind,
            writes: [RegisterBlock::new(DCSCMD_ST); MAX_FRAME_WRITES],
            len: 0,
        }
    }

    fn push(&mut self, block: RegisterBlock) {
        if let Some(slot) = self.writes.get_mut(self.len) {
            *slot = block;
            self.len += 1;
        }
    }

    /// Packet kind this frame encodes
    pub fn kind(&self) -> PacketKind {
        self.kind
    }

    /// Register writes, in bus order
    pub fn writes(&self) -> &[RegisterBlock] {
        &self.writes[..self.len]
    }
}

/// Named zero-argument panel commands
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PanelCommand {
    /// Turn the display on
    DisplayOn,
    /// Turn the display off
    DisplayOff,
    /// Enter sleep mode
    Sleep,
    /// Leave sleep mode
    Wake,
    /// Enter idle mode (reduced colour)
    Idle,
    /// Leave idle mode
    IdleOff,
    /// Software reset
    Reset,
    /// Enable the tearing effect output
    TearingOn,
}

impl PanelCommand {
    /// DCS opcode for this command
    pub fn opcode(self) -> u8 {
        match self {
            Self::DisplayOn => DCS_DISPLAY_ON,
            Self::DisplayOff => DCS_DISPLAY_OFF,
            Self::Sleep => DCS_ENTER_SLEEP,
            Self::Wake => DCS_EXIT_SLEEP,
            Self::Idle => DCS_IDLE_ON,
            Self::IdleOff => DCS_IDLE_OFF,
            Self::Reset => DCS_SOFT_RESET,
            Self::TearingOn => DCS_TEAR_ON,
        }
    }

    /// Packet relaying this command
    pub fn packet(self) -> Packet<'static> {
        Packet::Command(self.opcode())
    }
}
