//! Configuration image
//!
//! [`ConfigImage::build`] runs the PLL search and the D-PHY timing derivation
//! once and packs every bridge register block the bring-up writes. Nothing
//! here touches the bus, and the image is never modified afterwards.
//!
//! ```
//! use tc358778::{Builder, ConfigImage};
//!
//! let config = match Builder::new().build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let image = match ConfigImage::build(&config) {
//!     Ok(image) => image,
//!     Err(_) => return,
//! };
//! assert_eq!(image.pll().frequency_hz(), 810_399_457);
//! assert_eq!(image.timings().line_init, 80);
//! ```

use crate::block::RegisterBlock;
use crate::command::*;
use crate::config::{Config, DsiOptions, LaneTuning};
use crate::error::BuilderError;
use crate::pll::PllSolution;
use crate::timing::PhyTimings;

/// Number of DSI_CONFW writes in the error-handling stage
pub const DSI_CONF_WRITES: usize = 2 + DSI_CONF_ERROR_MASKS.len();

/// Every bridge register block of one bring-up, grouped by stage
#[derive(Clone, Debug)]
pub struct ConfigImage {
    pll: PllSolution,
    timings: PhyTimings,
    lanes: u8,
    global: [RegisterBlock; 4],
    pll_enable: RegisterBlock,
    phy: [RegisterBlock; 2],
    ppi: [RegisterBlock; 2],
    ppi_start: RegisterBlock,
    dsi_start: RegisterBlock,
    dsi_conf: [RegisterBlock; DSI_CONF_WRITES],
    dsi_ready: RegisterBlock,
    panel_reset: RegisterBlock,
    panel_run: RegisterBlock,
    rgb_timing: [u8; 6],
    lut_enter: [RegisterBlock; 4],
    lut_exit: [RegisterBlock; 5],
    video: [RegisterBlock; 3],
}

impl ConfigImage {
    /// Build the image for `config`
    ///
    /// # Errors
    ///
    /// - `BuilderError::Clock` if the PLL search fails
    /// - `BuilderError::FieldOverflow` if a derived value does not fit its
    ///   register field
    pub fn build(config: &Config) -> Result<Self, BuilderError> {
        let pll = PllSolution::solve(config.clock.pixel_clock_hz, config.clock.target_hz)?;
        let timings = PhyTimings::derive(pll.byte_clock_hz());
        log::debug!(
            "PLL: E={} F={} P={} -> {} Hz (byte clock {} Hz)",
            pll.divisor_exp(),
            pll.feedback_divider(),
            pll.prescaler(),
            pll.frequency_hz(),
            pll.byte_clock_hz()
        );
        log::debug!("PHY timings: {:?}", timings);

        Ok(Self {
            pll,
            timings,
            lanes: config.lanes,
            global: global_blocks(config, &pll)?,
            pll_enable: RegisterBlock::with_register16(
                PLLCTL1,
                u16::from_be_bytes([pll.ctl3(), PLL_RUNNING]),
            )?,
            phy: phy_blocks(config)?,
            ppi: ppi_blocks(config, &timings)?,
            ppi_start: RegisterBlock::with_register32(STARTPPI, 1)?,
            dsi_start: RegisterBlock::with_register32(DSI_START, 1)?,
            dsi_conf: dsi_conf_blocks(config)?,
            dsi_ready: RegisterBlock::with_register16(DATAFMT, DATAFMT_DSI_READY)?,
            panel_reset: RegisterBlock::with_register16(GPIOOUT, GPIOOUT_PANEL_RESET)?,
            panel_run: RegisterBlock::with_register16(GPIOOUT, GPIOOUT_PANEL_RUN)?,
            rgb_timing: rgb_timing(config)?,
            lut_enter: [
                RegisterBlock::with_register16(DATAFMT, DATAFMT_LUT)?,
                RegisterBlock::with_register16(DSITX_DT, DSITX_DT_LONG_WRITE)?,
                RegisterBlock::with_register16(WORD_COUNT, WORD_COUNT_LUT)?,
                RegisterBlock::with_register16(DBG_LCNT, DBG_LCNT_LUT)?,
            ],
            lut_exit: [
                RegisterBlock::with_register16(DBG_LCNT, DBG_LCNT_RESTORE[0])?,
                RegisterBlock::with_register16(DBG_LCNT, DBG_LCNT_RESTORE[1])?,
                RegisterBlock::with_register16(DBG_LCNT, DBG_LCNT_RESTORE[2])?,
                RegisterBlock::with_register16(DATAFMT, DATAFMT_VIDEO)?,
                RegisterBlock::with_register16(DSITX_DT, DSITX_DT_RGB888)?,
            ],
            video: video_blocks(config)?,
        })
    }

    /// PLL settings in use
    pub fn pll(&self) -> &PllSolution {
        &self.pll
    }

    /// D-PHY timing counts in use
    pub fn timings(&self) -> &PhyTimings {
        &self.timings
    }

    /// Number of DSI data lanes
    pub fn lanes(&self) -> u8 {
        self.lanes
    }

    /// Global control, GPIO, PLL and video-format blocks, then PP_MISC
    pub fn global(&self) -> &[RegisterBlock] {
        &self.global
    }

    /// PLLCTL1 with the PLL clock output enabled
    pub fn pll_enable(&self) -> &RegisterBlock {
        &self.pll_enable
    }

    /// Lane drive tuning and lane enables
    pub fn phy(&self) -> &[RegisterBlock] {
        &self.phy
    }

    /// PPI timing counters
    pub fn ppi(&self) -> &[RegisterBlock] {
        &self.ppi
    }

    /// STARTPPI commit
    pub fn ppi_start(&self) -> &RegisterBlock {
        &self.ppi_start
    }

    /// DSI_START
    pub fn dsi_start(&self) -> &RegisterBlock {
        &self.dsi_start
    }

    /// DSI_CONFW writes: control word, error masks, then the control-bit clear
    pub fn dsi_conf(&self) -> &[RegisterBlock] {
        &self.dsi_conf
    }

    /// DATAFMT once the DSI link is configured
    pub fn dsi_ready(&self) -> &RegisterBlock {
        &self.dsi_ready
    }

    /// GPIOOUT asserting the panel reset line
    pub fn panel_reset(&self) -> &RegisterBlock {
        &self.panel_reset
    }

    /// GPIOOUT releasing the panel from reset
    pub fn panel_run(&self) -> &RegisterBlock {
        &self.panel_run
    }

    /// Payload of the panel's RGB interface timing long write
    pub fn rgb_timing(&self) -> &[u8] {
        &self.rgb_timing
    }

    /// Bridge writes that route host long writes to the panel
    pub fn lut_enter(&self) -> &[RegisterBlock] {
        &self.lut_enter
    }

    /// Bridge writes that hand the video path back to the RGB input
    pub fn lut_exit(&self) -> &[RegisterBlock] {
        &self.lut_exit
    }

    /// Video timing block, then CONFCTL and DATAFMT
    pub fn video(&self) -> &[RegisterBlock] {
        &self.video
    }

    /// Value for the panel's lane-count register
    pub fn panel_lane_select(&self) -> u8 {
        self.lanes.saturating_sub(1)
    }
}

/// Reject a value wider than its register field
fn fit(field: &'static str, value: u32, max: u32) -> Result<u32, BuilderError> {
    if value > max {
        return Err(BuilderError::FieldOverflow { field, value, max });
    }
    Ok(value)
}

fn fit_u8(field: &'static str, value: u32) -> Result<u32, BuilderError> {
    fit(field, value, u32::from(u8::MAX))
}

fn fit_u16(field: &'static str, value: u32) -> Result<u16, BuilderError> {
    fit(field, value, u32::from(u16::MAX)).map(|v| v as u16)
}

fn global_blocks(config: &Config, pll: &PllSolution) -> Result<[RegisterBlock; 4], BuilderError> {
    // SYSCTL, CONFCTL, FIFOCTL, DATAFMT
    let mut control = RegisterBlock::new(SYSCTL);
    control
        .push_register16(0)?
        .push_register16(CONFCTL_SETUP)?
        .push_register16(config.timing.vsync_delay)?
        .push_register16(DATAFMT_SETUP)?;

    // GPIOEN, GPIODIR, GPIOIN, GPIOOUT, PLLCTL0, PLLCTL1
    let mut gpio_pll = RegisterBlock::new(GPIOEN);
    gpio_pll
        .push_register16(0)?
        .push_register16(GPIODIR_PANEL)?
        .push_register16(0)?
        .push_register16(GPIOOUT_PANEL_RUN)?
        .push_register16(u16::from_be_bytes([pll.ctl1(), pll.ctl2()]))?
        .push_register16(u16::from_be_bytes([pll.ctl3(), PLL_LOCKING]))?;

    Ok([
        control,
        gpio_pll,
        RegisterBlock::with_register16(DSITX_DT, DSITX_DT_RGB888)?,
        // HSYNC and VSYNC active low
        RegisterBlock::with_register16(PP_MISC, 0)?,
    ])
}

fn lane_drive(tuning: &LaneTuning) -> u32 {
    (u32::from(tuning.capacitance) << 8)
        | (u32::from(tuning.delay) << 4)
        | u32::from(tuning.current)
}

fn phy_blocks(config: &Config) -> Result<[RegisterBlock; 2], BuilderError> {
    let mut drive = RegisterBlock::new(CLW_DPHYCONTTX);
    drive.push_register32(lane_drive(&config.clock_lane))?;
    for lane in &config.data_lanes {
        drive.push_register32(lane_drive(lane))?;
    }

    // Clock lane and all data lanes enabled
    let mut control = RegisterBlock::new(CLW_CNTRL);
    for _ in 0..5 {
        control.push_register32(0)?;
    }
    Ok([drive, control])
}

fn ppi_blocks(config: &Config, t: &PhyTimings) -> Result<[RegisterBlock; 2], BuilderError> {
    let line_init = fit_u8("LINEINITCNT", t.line_init)?;
    let lptx = fit_u8("LPTXTIMECNT", t.lptx_time)?;
    let clk_prepare = fit_u8("TCLK_PREPARECNT", t.clk_prepare)?;
    let clk_zero = fit_u8("TCLK_ZEROCNT", t.clk_zero)?;
    let clk_trail = fit_u8("TCLK_TRAILCNT", t.clk_trail)?;
    let hs_prepare = fit_u8("THS_PREPARECNT", t.hs_prepare)?;
    let hs_zero = fit_u8("THS_ZEROCNT", t.hs_zero)?;
    let wakeup = fit_u8("TWAKEUP", t.wakeup)?;
    let clk_post = fit_u8("TCLK_POSTCNT", t.clk_post)?;
    let hs_trail = fit_u8("THS_TRAILCNT", t.hs_trail)?;

    // LINEINITCNT through TWAKEUP; the two 256-cycle counts live in bits 15:8
    let mut first = RegisterBlock::new(LINEINITCNT);
    first
        .push_register32(line_init << 8)?
        .push_register32(lptx)?
        .push_register32((clk_zero << 8) | clk_prepare)?
        .push_register32(clk_trail)?
        .push_register32((hs_zero << 8) | hs_prepare)?
        .push_register32(wakeup << 8)?;

    // TCLK_POSTCNT through BTACNTRL1
    let mut second = RegisterBlock::new(TCLK_POSTCNT);
    second
        .push_register32(clk_post)?
        .push_register32(hs_trail)?
        .push_register32(HSTXVREGCNT_VALUE)?
        .push_register32(HSTXVREGEN_ALL)?
        .push_register32(u32::from(config.clock_continuous))?
        .push_register32(BTACNTRL1_VALUE)?;

    Ok([first, second])
}

/// DSI_CONTROL bits from the link options and lane count
pub fn dsi_control_word(options: &DsiOptions, lanes: u8) -> u16 {
    let bit = |flag: bool, weight: u16| if flag { weight } else { 0 };
    let d1 = bit(options.pr_timeout, 2) + bit(options.ta_timeout, 1);
    let d2 = bit(options.lrx_timeout, 8)
        + bit(options.hstx_timeout, 4)
        + bit(options.contention_disable, 2)
        + bit(options.ecc_disable, 1);
    let d3 = bit(options.hs_tx_mode, 8)
        + bit(options.crc_disable, 4)
        + bit(options.hs_clock_continuous, 2);
    let d4 = 2 * u16::from(lanes.saturating_sub(1)) + bit(options.eot_disable, 1);
    u16::from_be_bytes([(16 * d1 + d2) as u8, (16 * d3 + d4) as u8])
}

fn dsi_conf_blocks(config: &Config) -> Result<[RegisterBlock; DSI_CONF_WRITES], BuilderError> {
    let control = dsi_control_word(&config.dsi, config.lanes);
    let mut blocks = [RegisterBlock::new(DSI_CONFW); DSI_CONF_WRITES];
    blocks[0] =
        RegisterBlock::with_register32(DSI_CONFW, DSI_CONF_SET_CONTROL | u32::from(control))?;
    for (block, word) in blocks[1..].iter_mut().zip(DSI_CONF_ERROR_MASKS) {
        *block = RegisterBlock::with_register32(DSI_CONFW, word)?;
    }
    blocks[DSI_CONF_WRITES - 1] =
        RegisterBlock::with_register32(DSI_CONFW, DSI_CONF_CLEAR_CONTROL)?;
    Ok(blocks)
}

fn rgb_timing(config: &Config) -> Result<[u8; 6], BuilderError> {
    let t = &config.timing;
    let vfp = fit_u8("RGB VFP", u32::from(t.v_front_porch / 2))?;
    let vbp = fit_u8("RGB VBP", u32::from(t.v_back_porch / 2))?;
    let hfp = fit_u8("RGB HFP", u32::from(t.h_front_porch))?;
    let hbp = fit_u8("RGB HBP", u32::from(t.h_back_porch))?;
    Ok([
        0x4B,
        crate::panel::RGB_TIMING,
        vfp as u8,
        vbp as u8,
        hfp as u8,
        hbp as u8,
    ])
}

fn video_blocks(config: &Config) -> Result<[RegisterBlock; 3], BuilderError> {
    let t = &config.timing;
    let h_sync = fit_u16("DSI_HSW", t.pixels_to_bytes(t.effective_h_sync()))?;
    let h_back = fit_u16("DSI_HBPR", t.pixels_to_bytes(t.h_back_porch))?;
    let h_active = fit_u16("DSI_HACT", t.pixels_to_bytes(t.h_active))?;

    // DSI_EVENT, DSI_VSW, DSI_VBPR, DSI_VACT, DSI_HSW, DSI_HBPR, DSI_HACT
    let mut timing = RegisterBlock::new(DSI_EVENT);
    timing
        .push_register16(u16::from(t.event_mode))?
        .push_register16(t.effective_v_sync())?
        .push_register16(t.v_back_porch)?
        .push_register16(t.v_active)?
        .push_register16(h_sync)?
        .push_register16(h_back)?
        .push_register16(h_active)?;

    Ok([
        timing,
        RegisterBlock::with_register16(CONFCTL, CONFCTL_VIDEO)?,
        RegisterBlock::with_register16(DATAFMT, DATAFMT_VIDEO)?,
    ])
}
