//! TC358778XBG register map and DCS opcodes
//!
//! Register addresses are full 16-bit addresses. The high byte selects the
//! register page on the control bus (see [`crate::interface`]).

// Global registers (0x00xx)

/// System control (0x0002)
pub const SYSCTL: u16 = 0x0002;

/// Configuration control (0x0004)
///
/// Enables the parallel input port once the video path is configured.
pub const CONFCTL: u16 = 0x0004;

/// FIFO control (0x0006)
///
/// Holds the RGB to DSI start delay (VSDELAY) in bytes.
pub const FIFOCTL: u16 = 0x0006;

/// Data format control (0x0008)
pub const DATAFMT: u16 = 0x0008;

/// GPIO enable (0x000E)
pub const GPIOEN: u16 = 0x000E;

/// GPIO direction (0x0010)
pub const GPIODIR: u16 = 0x0010;

/// GPIO output level (0x0014)
///
/// Drives the panel reset line.
pub const GPIOOUT: u16 = 0x0014;

/// PLL control 0 (0x0016): prescaler and feedback divider
pub const PLLCTL0: u16 = 0x0016;

/// PLL control 1 (0x0018): output divisor and enables
pub const PLLCTL1: u16 = 0x0018;

/// Word count for host-driven video (0x0022)
pub const WORD_COUNT: u16 = 0x0022;

/// Parallel port miscellaneous control (0x0032)
///
/// Carries the HSYNC/VSYNC polarity bits.
pub const PP_MISC: u16 = 0x0032;

/// DSI data type for the video stream (0x0050)
pub const DSITX_DT: u16 = 0x0050;

/// Debug line count / video source select (0x00E0)
pub const DBG_LCNT: u16 = 0x00E0;

// D-PHY registers (0x01xx)

/// Clock lane D-PHY control (0x0100), followed by data lanes 0..=3
pub const CLW_DPHYCONTTX: u16 = 0x0100;

/// Clock lane control (0x0140), followed by data lanes 0..=3
pub const CLW_CNTRL: u16 = 0x0140;

// PPI registers (0x02xx)

/// PPI start (0x0204)
pub const STARTPPI: u16 = 0x0204;

/// Line initialisation count (0x0210), first of the PPI timing block
pub const LINEINITCNT: u16 = 0x0210;

/// Clock post count (0x0228), first of the second PPI timing block
pub const TCLK_POSTCNT: u16 = 0x0228;

// DSI TX registers (0x05xx)

/// DSI configuration write port (0x0500)
pub const DSI_CONFW: u16 = 0x0500;

/// DSI start (0x0518)
pub const DSI_START: u16 = 0x0518;

// DSI command relay (0x06xx)

/// DCS command start (0x0600)
pub const DCSCMD_ST: u16 = 0x0600;

/// DCS command packet type (0x0602)
pub const DCSCMD_TYPE: u16 = 0x0602;

/// DCS command word count (0x0604)
pub const DCSCMD_WC: u16 = 0x0604;

/// DCS command write data, first word (0x0610)
pub const DCSCMD_WD0: u16 = 0x0610;

/// DCS command write data, second word (0x0612)
pub const DCSCMD_WD1: u16 = 0x0612;

/// Video event mode, first of the video timing block (0x0620)
pub const DSI_EVENT: u16 = 0x0620;

// Register values

/// PLLCTL1 low byte while the PLL locks: PLL enabled, clock gated
pub const PLL_LOCKING: u8 = 0x03;

/// PLLCTL1 low byte once locked: PLL enabled, clock running
pub const PLL_RUNNING: u8 = 0x13;

/// CONFCTL during setup: parallel port disabled
pub const CONFCTL_SETUP: u16 = 0x0004;

/// DATAFMT during setup
pub const DATAFMT_SETUP: u16 = 0x004C;

/// GPIODIR with the panel reset line as an output
pub const GPIODIR_PANEL: u16 = 0x00F9;

/// GPIOOUT holding the panel in reset
pub const GPIOOUT_PANEL_RESET: u16 = 0x0000;

/// WORD_COUNT while the lookup table is streamed
pub const WORD_COUNT_LUT: u16 = 0x03FC;

/// DBG_LCNT: route DCS long writes from the host while the table streams
pub const DBG_LCNT_LUT: u16 = 0x8000;

/// DBG_LCNT sequence that hands the video path back to the RGB input
pub const DBG_LCNT_RESTORE: [u16; 3] = [0xE000, 0x2000, 0x0000];

/// HSTXVREGCNT: regulator settle count
pub const HSTXVREGCNT_VALUE: u32 = 0x0000_0010;

/// HSTXVREGEN: regulators on for the clock lane and data lanes 0..=3
pub const HSTXVREGEN_ALL: u32 = 0x0000_001F;

/// BTACNTRL1: bus turnaround timing
pub const BTACNTRL1_VALUE: u32 = 0x000B_0003;

/// DSI_CONFW command: set bits in DSI_CONTROL
pub const DSI_CONF_SET_CONTROL: u32 = 0xA300_0000;

/// DSI_CONFW command: clear the setup bits in DSI_CONTROL
pub const DSI_CONF_CLEAR_CONTROL: u32 = 0xC300_8201;

/// DSI_CONFW commands that program the error masks and interrupt enables
pub const DSI_CONF_ERROR_MASKS: [u32; 7] = [
    0xA604_000F,
    0xAE00_0000,
    0xAF00_0000,
    0xB11A_2F58,
    0xB21A_2F58,
    0xB400_03B7,
    0xB500_03B7,
];

/// DATAFMT after the DSI error masks are applied
pub const DATAFMT_DSI_READY: u16 = 0x004E;

/// DATAFMT while the colour lookup table is streamed
pub const DATAFMT_LUT: u16 = 0x0001;

/// DATAFMT for live RGB888 video
pub const DATAFMT_VIDEO: u16 = 0x004F;

/// CONFCTL with the parallel port enabled
pub const CONFCTL_VIDEO: u16 = 0x0044;

/// DSITX_DT for DCS long writes
pub const DSITX_DT_LONG_WRITE: u16 = 0x0039;

/// DSITX_DT for packed RGB888 pixel streams
pub const DSITX_DT_RGB888: u16 = 0x002E;

/// GPIOOUT with the panel released from reset
pub const GPIOOUT_PANEL_RUN: u16 = 0x0006;

// DCS opcodes

/// Soft reset (0x01)
pub const DCS_SOFT_RESET: u8 = 0x01;

/// Enter sleep mode (0x10)
pub const DCS_ENTER_SLEEP: u8 = 0x10;

/// Exit sleep mode (0x11)
pub const DCS_EXIT_SLEEP: u8 = 0x11;

/// Display off (0x28)
pub const DCS_DISPLAY_OFF: u8 = 0x28;

/// Display on (0x29)
pub const DCS_DISPLAY_ON: u8 = 0x29;

/// Tearing effect line on (0x35)
pub const DCS_TEAR_ON: u8 = 0x35;

/// Exit idle mode (0x38)
pub const DCS_IDLE_OFF: u8 = 0x38;

/// Enter idle mode (0x39)
pub const DCS_IDLE_ON: u8 = 0x39;

/// Set pixel format (0x3A)
pub const DCS_SET_PIXEL_FORMAT: u8 = 0x3A;

/// Manufacturer page select register on the panel
pub const PANEL_PAGE_SELECT: u8 = 0xFF;

/// Pixel format value for 24 bits per pixel
pub const PIXEL_FORMAT_24BPP: u8 = 0x77;
