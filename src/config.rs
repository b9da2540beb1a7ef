//! Bridge and panel configuration types and builder
//!
//! Everything the bring-up needs is fixed here, before any bus traffic. The
//! defaults describe the A026EAN01.0 800x1280 panel on four DSI lanes.

pub use crate::error::BuilderError;

/// Incoming pixel clock and requested PLL frequency
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ClockSpec {
    /// Parallel RGB pixel clock in Hz
    pub pixel_clock_hz: u32,
    /// Target PLL output frequency in Hz
    pub target_hz: u32,
}

impl Default for ClockSpec {
    fn default() -> Self {
        Self {
            pixel_clock_hz: 73_008_960,
            target_hz: 808_680_000,
        }
    }
}

/// Panel video timing, in pixels and lines
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PanelTiming {
    /// Horizontal active pixels
    pub h_active: u16,
    /// Horizontal front porch
    pub h_front_porch: u16,
    /// Horizontal sync pulse width
    pub h_sync_width: u16,
    /// Horizontal back porch
    pub h_back_porch: u16,
    /// Vertical active lines
    pub v_active: u16,
    /// Vertical front porch
    pub v_front_porch: u16,
    /// Vertical sync pulse width
    pub v_sync_width: u16,
    /// Vertical back porch
    pub v_back_porch: u16,
    /// Bits per pixel on the RGB input
    ///
    /// The bridge input format, DSI data type and panel pixel format are all
    /// set up for RGB888, so only 24 is accepted.
    pub color_depth: u8,
    /// Delay from RGB input to DSI output, in bytes
    pub vsync_delay: u16,
    /// Sync events instead of sync pulses
    pub event_mode: bool,
}

impl Default for PanelTiming {
    fn default() -> Self {
        Self {
            h_active: 800,
            h_front_porch: 4,
            h_sync_width: 68,
            h_back_porch: 72,
            v_active: 1280,
            v_front_porch: 6,
            v_sync_width: 1,
            v_back_porch: 2,
            color_depth: 24,
            vsync_delay: 3 * 0x06,
            event_mode: true,
        }
    }
}

impl PanelTiming {
    /// Horizontal sync width sent to the bridge
    ///
    /// In event mode the sync period covers both porches.
    pub fn effective_h_sync(&self) -> u16 {
        if self.event_mode {
            self.h_back_porch.saturating_add(self.h_front_porch)
        } else {
            self.h_sync_width
        }
    }

    /// Vertical sync width sent to the bridge
    pub fn effective_v_sync(&self) -> u16 {
        if self.event_mode {
            self.v_back_porch.saturating_add(self.v_front_porch)
        } else {
            self.v_sync_width
        }
    }

    /// Convert a pixel count to bytes at the configured colour depth
    pub fn pixels_to_bytes(&self, pixels: u16) -> u32 {
        u32::from(pixels) * u32::from(self.color_depth) / 8
    }
}

/// Drive tuning for one D-PHY lane
///
/// Not derived from timing; tuned on the board.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LaneTuning {
    /// Output capacitor: 0 = 0 pF, 1 = 2.8 pF, 2 = 3.2 pF, 3 = 3.6 pF
    pub capacitance: u8,
    /// Added output current: 0 = +0%, 1 = +25%, 2 and 3 = +50%
    pub current: u8,
    /// Output delay in steps of roughly 25 ps (0..=15)
    pub delay: u8,
}

impl LaneTuning {
    /// Maximum capacitance selector
    pub const MAX_CAPACITANCE: u8 = 3;
    /// Maximum current selector
    pub const MAX_CURRENT: u8 = 3;
    /// Maximum delay step
    pub const MAX_DELAY: u8 = 15;

    fn is_valid(&self) -> bool {
        self.capacitance <= Self::MAX_CAPACITANCE
            && self.current <= Self::MAX_CURRENT
            && self.delay <= Self::MAX_DELAY
    }
}

/// DSI link options
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DsiOptions {
    /// Enable peripheral response timeout
    pub pr_timeout: bool,
    /// Enable turnaround timeout
    pub ta_timeout: bool,
    /// Enable low-power receive timeout
    pub lrx_timeout: bool,
    /// Enable high-speed transmit timeout
    pub hstx_timeout: bool,
    /// Disable contention detection
    pub contention_disable: bool,
    /// Disable ECC checking
    pub ecc_disable: bool,
    /// Transmit in high-speed mode
    pub hs_tx_mode: bool,
    /// Disable CRC checking
    pub crc_disable: bool,
    /// Keep the high-speed clock running between packets
    pub hs_clock_continuous: bool,
    /// Disable automatic end-of-transmission packets
    pub eot_disable: bool,
}

impl Default for DsiOptions {
    fn default() -> Self {
        Self {
            pr_timeout: true,
            ta_timeout: true,
            lrx_timeout: true,
            hstx_timeout: true,
            contention_disable: false,
            ecc_disable: false,
            hs_tx_mode: true,
            crc_disable: false,
            hs_clock_continuous: false,
            eot_disable: false,
        }
    }
}

/// Bridge and panel configuration
///
/// Use [`Builder`] to create a Config.
#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Clock inputs for the PLL search
    pub clock: ClockSpec,
    /// Panel video timing
    pub timing: PanelTiming,
    /// Number of DSI data lanes (1..=4)
    pub lanes: u8,
    /// Clock lane drive tuning
    pub clock_lane: LaneTuning,
    /// Data lane drive tuning, lanes 0..=3
    pub data_lanes: [LaneTuning; 4],
    /// DSI link options
    pub dsi: DsiOptions,
    /// Continuous D-PHY clock (TXOPTIONCNTRL)
    pub clock_continuous: bool,
}

/// Builder for constructing bridge configuration
///
/// # Example
///
/// ```rust,no_run
/// use tc358778::{Builder, ClockSpec};
///
/// let config = match Builder::new()
///     .clock(ClockSpec {
///         pixel_clock_hz: 73_008_960,
///         target_hz: 808_680_000,
///     })
///     .lanes(4)
///     .build()
/// {
///     Ok(config) => config,
///     Err(_) => return,
/// };
/// let _ = config;
/// ```
#[must_use]
#[derive(Default)]
pub struct Builder {
    clock: ClockSpec,
    timing: PanelTiming,
    lanes: Option<u8>,
    clock_lane: LaneTuning,
    data_lanes: [LaneTuning; 4],
    dsi: DsiOptions,
    clock_continuous: bool,
}

impl Builder {
    /// Default number of DSI data lanes
    pub const DEFAULT_LANES: u8 = 4;

    /// The only supported RGB input depth
    pub const COLOR_DEPTH: u8 = 24;

    /// Create a new Builder with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the pixel clock and PLL target
    pub fn clock(mut self, clock: ClockSpec) -> Self {
        self.clock = clock;
        self
    }

    /// Set the panel video timing
    pub fn timing(mut self, timing: PanelTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Set the number of DSI data lanes
    pub fn lanes(mut self, lanes: u8) -> Self {
        self.lanes = Some(lanes);
        self
    }

    /// Set the clock lane drive tuning
    pub fn clock_lane(mut self, tuning: LaneTuning) -> Self {
        self.clock_lane = tuning;
        self
    }

    /// Set the drive tuning for one data lane
    ///
    /// Indices above 3 are ignored.
    pub fn data_lane(mut self, index: usize, tuning: LaneTuning) -> Self {
        if let Some(lane) = self.data_lanes.get_mut(index) {
            *lane = tuning;
        }
        self
    }

    /// Set the DSI link options
    pub fn dsi(mut self, options: DsiOptions) -> Self {
        self.dsi = options;
        self
    }

    /// Enable the continuous D-PHY clock
    pub fn clock_continuous(mut self, value: bool) -> Self {
        self.clock_continuous = value;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    ///
    /// - `BuilderError::InvalidLaneCount` unless 1..=4 lanes
    /// - `BuilderError::InvalidColorDepth` unless 24 bits per pixel
    /// - `BuilderError::InvalidTiming` if the active area is empty
    /// - `BuilderError::InvalidLaneTuning` if a selector is out of range
    pub fn build(self) -> Result<Config, BuilderError> {
        let lanes = self.lanes.unwrap_or(Self::DEFAULT_LANES);
        if !(1..=4).contains(&lanes) {
            return Err(BuilderError::InvalidLaneCount { lanes });
        }
        if self.timing.color_depth != Self::COLOR_DEPTH {
            return Err(BuilderError::InvalidColorDepth {
                bits: self.timing.color_depth,
            });
        }
        if self.timing.h_active == 0 || self.timing.v_active == 0 {
            return Err(BuilderError::InvalidTiming {
                h_active: self.timing.h_active,
                v_active: self.timing.v_active,
            });
        }
        if !self.clock_lane.is_valid() {
            return Err(BuilderError::InvalidLaneTuning { lane: None });
        }
        if let Some(index) = self.data_lanes.iter().position(|lane| !lane.is_valid()) {
            return Err(BuilderError::InvalidLaneTuning {
                lane: Some(index as u8),
            });
        }

        Ok(Config {
            clock: self.clock,
            timing: self.timing,
            lanes,
            clock_lane: self.clock_lane,
            data_lanes: self.data_lanes,
            dsi: self.dsi,
            clock_continuous: self.clock_continuous,
        })
    }
}
