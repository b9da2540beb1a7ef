//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! the PLL search ([`ClockError`]) and bring-up operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`ClockError`] - No PLL settings reach the requested frequency
//! - [`BuilderError`] - Errors while validating the configuration or packing registers
//! - [`Error`] - Runtime errors, tagged with the stage and operation that failed
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level bus errors
//!
//! Nothing is retried. A failed bus write leaves the bridge in an unknown
//! state, so the caller restarts the whole sequence if it wants another try.
//!
//! ## Example
//!
//! ```
//! use tc358778::{Builder, BuilderError};
//!
//! let result = Builder::new().lanes(6).build();
//! assert!(matches!(result, Err(BuilderError::InvalidLaneCount { lanes: 6 })));
//! ```

use crate::bridge::Stage;
use crate::dcs::PacketKind;
use crate::interface::BridgeInterface;

/// The PLL search found no usable settings
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ClockError {
    /// Pixel clock is zero, the target is at or below 31.25 MHz, or no
    /// prescaler keeps the feedback divider within 9 bits
    NoSolution {
        /// Incoming pixel clock in Hz
        pixel_clock_hz: u32,
        /// Requested PLL frequency in Hz
        target_hz: u32,
    },
}

impl core::fmt::Display for ClockError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NoSolution {
                pixel_clock_hz,
                target_hz,
            } => write!(
                f,
                "No PLL settings reach {target_hz} Hz from a {pixel_clock_hz} Hz pixel clock"
            ),
        }
    }
}

impl core::error::Error for ClockError {}

/// Errors that can occur when building configuration
///
/// These errors occur before any bus traffic.
#[derive(Debug, PartialEq)]
pub enum BuilderError {
    /// Lane count outside 1..=4
    InvalidLaneCount {
        /// Requested lane count
        lanes: u8,
    },
    /// Colour depth other than 24 bits per pixel
    InvalidColorDepth {
        /// Requested bits per pixel
        bits: u8,
    },
    /// Active area has zero width or height
    InvalidTiming {
        /// Horizontal active pixels
        h_active: u16,
        /// Vertical active lines
        v_active: u16,
    },
    /// Lane capacitance, current or delay selector out of range
    InvalidLaneTuning {
        /// Data lane index, or `None` for the clock lane
        lane: Option<u8>,
    },
    /// PLL search failed
    Clock(ClockError),
    /// Derived value does not fit its register field
    FieldOverflow {
        /// Register field name
        field: &'static str,
        /// Derived value
        value: u32,
        /// Largest value the field holds
        max: u32,
    },
    /// Register block longer than one bus transfer
    BlockOverflow {
        /// Start address of the block
        address: u16,
    },
    /// Long packet payload larger than the relay window
    PayloadTooLong {
        /// Payload length in bytes
        len: usize,
        /// Largest payload accepted
        max: usize,
    },
}

impl From<ClockError> for BuilderError {
    fn from(e: ClockError) -> Self {
        Self::Clock(e)
    }
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::InvalidLaneCount { lanes } => {
                write!(f, "Invalid lane count {lanes} (expected 1 to 4)")
            }
            Self::InvalidColorDepth { bits } => {
                write!(f, "Invalid colour depth {bits} (only RGB888 is supported)")
            }
            Self::InvalidTiming { h_active, v_active } => {
                write!(f, "Invalid active area {h_active}x{v_active}")
            }
            Self::InvalidLaneTuning { lane: Some(lane) } => {
                write!(f, "Invalid tuning for data lane {lane}")
            }
            Self::InvalidLaneTuning { lane: None } => write!(f, "Invalid clock lane tuning"),
            Self::Clock(e) => write!(f, "{e}"),
            Self::FieldOverflow { field, value, max } => {
                write!(f, "{field} = {value} exceeds register maximum {max}")
            }
            Self::BlockOverflow { address } => {
                write!(f, "Register block at {address:#06x} exceeds one transfer")
            }
            Self::PayloadTooLong { len, max } => {
                write!(f, "Long packet payload of {len} bytes exceeds {max}")
            }
        }
    }
}

impl core::error::Error for BuilderError {}

/// Bus operation in progress when an error occurred
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Operation {
    /// Register block write starting at `address`
    RegisterWrite {
        /// Start address of the block
        address: u16,
    },
    /// Register block read starting at `address`
    RegisterRead {
        /// Start address of the read
        address: u16,
    },
    /// Write `step` (0-based) of a relayed panel packet
    ///
    /// The panel command was left incomplete.
    Frame {
        /// Packet kind being relayed
        kind: PacketKind,
        /// Index of the failed write within the frame
        step: u8,
    },
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::RegisterWrite { address } => write!(f, "write at {address:#06x}"),
            Self::RegisterRead { address } => write!(f, "read at {address:#06x}"),
            Self::Frame { kind, step } => write!(f, "{kind:?} packet write {step}"),
        }
    }
}

/// Errors that can occur while driving the bridge
///
/// Generic over the interface type to preserve the specific error type.
#[derive(Debug)]
pub enum Error<I: BridgeInterface> {
    /// Bus transfer failed
    ///
    /// `stage` is `None` for operations outside the bring-up sequence.
    Bus {
        /// Bring-up stage in progress
        stage: Option<Stage>,
        /// Operation that failed
        operation: Operation,
        /// Underlying interface error
        source: I::Error,
    },
    /// Configuration image or packet frame could not be built
    Build(BuilderError),
    /// Bring-up already completed; reconfiguration is not supported
    AlreadyStreaming,
}

impl<I: BridgeInterface> From<BuilderError> for Error<I> {
    fn from(e: BuilderError) -> Self {
        Self::Build(e)
    }
}

impl<I: BridgeInterface> From<ClockError> for Error<I> {
    fn from(e: ClockError) -> Self {
        Self::Build(BuilderError::Clock(e))
    }
}

impl<I: BridgeInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Bus {
                stage: Some(stage),
                operation,
                source,
            } => write!(f, "Bus error during {stage:?}, {operation}: {source:?}"),
            Self::Bus {
                stage: None,
                operation,
                source,
            } => write!(f, "Bus error, {operation}: {source:?}"),
            Self::Build(e) => write!(f, "{e}"),
            Self::AlreadyStreaming => write!(f, "Bridge is already streaming video"),
        }
    }
}

impl<I: BridgeInterface + core::fmt::Debug> core::error::Error for Error<I> {}
