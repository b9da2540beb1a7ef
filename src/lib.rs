//! TC358778XBG RGB to MIPI-DSI Bridge Driver
//!
//! A bring-up driver for the Toshiba TC358778XBG parallel RGB to MIPI-DSI
//! bridge and the A026EAN01.0 800x1280 panel behind it.
//!
//! ## Features
//!
//! - `no_std` compatible
//! - `embedded-hal` v1.0 support (I2C control bus, blocking delays)
//! - PLL parameter search and D-PHY timing derivation from the pixel clock
//! - Configurable lane count, lane drive, video timing and DSI link options
//! - Panel command relay (short, generic and long DCS packets)
//! - `defmt` formatting for the public enums (with `defmt` feature)
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::delay::DelayNs;
//! use embedded_hal::i2c::{I2c, Operation};
//! use tc358778::{Bridge, Builder, ClockSpec, Interface, PanelCommand};
//!
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
//! # struct MockDelay;
//! # impl DelayNs for MockDelay { fn delay_ns(&mut self, _ns: u32) {} }
//! # let i2c = MockI2c;
//! # let mut delay = MockDelay;
//! let interface = Interface::new(i2c);
//! let config = match Builder::new()
//!     .clock(ClockSpec {
//!         pixel_clock_hz: 73_008_960,
//!         target_hz: 808_680_000,
//!     })
//!     .lanes(4)
//!     .build()
//! {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut bridge = match Bridge::new(interface, &config) {
//!     Ok(bridge) => bridge,
//!     Err(_) => return,
//! };
//! if let Ok(report) = bridge.bring_up(&mut delay) {
//!     let _ = report.pll_hz;
//! }
//! let _ = bridge.panel_command(PanelCommand::DisplayOff, &mut delay);
//! ```

#![no_std]

#[cfg(any(test, feature = "alloc"))]
extern crate alloc;

/// Address-tagged register blocks
pub mod block;
/// Bring-up sequencer
pub mod bridge;
/// TC358778XBG register map and DCS opcodes
pub mod command;
/// Bridge and panel configuration types and builder
pub mod config;
/// Panel packet framing
pub mod dcs;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Configuration image
pub mod layout;
/// A026EAN01.0 panel tables
pub mod panel;
/// PLL parameter search
pub mod pll;
/// D-PHY timing derivation
pub mod timing;

pub use block::RegisterBlock;
pub use bridge::{BringUpReport, Bridge, Stage};
pub use config::{Builder, ClockSpec, Config, DsiOptions, LaneTuning, PanelTiming};
pub use dcs::{Frame, MAX_LONG_PAYLOAD, Packet, PacketKind, PanelCommand};
pub use error::{BuilderError, ClockError, Error, Operation};
pub use interface::InterfaceError;
pub use interface::{BridgeInterface, DEFAULT_ADDRESS, Interface, MAX_TRANSFER_LEN};
pub use layout::ConfigImage;
pub use pll::PllSolution;
pub use timing::PhyTimings;
