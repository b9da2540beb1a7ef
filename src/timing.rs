//! D-PHY timing derivation
//!
//! Every PPI counter in the bridge counts byte-clock cycles. The D-PHY timing
//! table gives most parameters as a `[min, max]` window in nanoseconds; those
//! take the average of both extrema in cycles, rounded down. Single-bound
//! parameters use `floor(bound / period)` plus a fixed fractional offset.
//!
//! All arithmetic is integer: a duration of `ns` nanoseconds at `f` Hz is
//! `ns * f / 1e9` cycles, with offsets expressed in quarter cycles.

/// Integer counts of byte-clock cycles for each PPI timing register
///
/// Values are not range-checked here; [`ConfigImage`](crate::layout::ConfigImage)
/// rejects any that do not fit their register field.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhyTimings {
    /// LINEINITCNT, in units of 256 cycles (100 us)
    pub line_init: u32,
    /// LPTXTIMECNT: low-power transmit period (50 ns)
    pub lptx_time: u32,
    /// TCLK_PREPARE (38..95 ns)
    pub clk_prepare: u32,
    /// TCLK_ZERO: 300 ns minus TCLK_PREPARE
    pub clk_zero: u32,
    /// TCLK_TRAIL (60..105 ns)
    pub clk_trail: u32,
    /// THS_PREPARE (40..85 ns)
    pub hs_prepare: u32,
    /// THS_ZERO: 145 ns minus THS_PREPARE
    pub hs_zero: u32,
    /// TWAKEUP, in units of 256 low-power periods (1 ms)
    pub wakeup: u32,
    /// TCLK_POST: 60 ns plus 7 cycles
    pub clk_post: u32,
    /// THS_TRAIL (60..105 ns)
    pub hs_trail: u32,
}

const NS_PER_S: i64 = 1_000_000_000;

/// Inputs are clamped here so intermediate products stay within `i64`
const MAX_BYTE_CLOCK_HZ: u64 = 1_000_000_000_000;

// Fractional offsets, in quarter cycles
const OFFSET_NONE: i64 = 0;
const OFFSET_QUARTER_DOWN: i64 = -1;
const OFFSET_HALF: i64 = 2;
const OFFSET_THREE_QUARTERS: i64 = 3;
const OFFSET_ONE: i64 = 4;
const OFFSET_ONE_DOWN: i64 = -4;

/// Fixed cycles added to TCLK_POST
const CLK_POST_EXTRA: u32 = 7;

impl PhyTimings {
    /// Derive every PPI timing count from the byte clock
    ///
    /// The byte-clock period in nanoseconds is `1e9 / byte_clock_hz`.
    pub fn derive(byte_clock_hz: u64) -> Self {
        let f = i64::try_from(byte_clock_hz.min(MAX_BYTE_CLOCK_HZ)).unwrap_or(0);
        let cycles = |ns: i64, offset: i64| -> i64 { cycles_at(ns, f, offset) };

        let line_init = 100_000 * f / (256 * NS_PER_S) + 1;
        let lptx_time = cycles(50, OFFSET_NONE);

        let clk_prepare = (cycles(38, OFFSET_NONE) + cycles(95, OFFSET_ONE_DOWN).max(0)) / 2;
        let clk_zero = (cycles(300, OFFSET_ONE) - clk_prepare).max(0);
        let clk_trail = (cycles(60, OFFSET_THREE_QUARTERS) + cycles(105, OFFSET_HALF)) / 2;

        let hs_prepare =
            (cycles(40, OFFSET_HALF) + cycles(85, OFFSET_QUARTER_DOWN).max(0)) / 2;
        let hs_zero = (cycles(145, OFFSET_THREE_QUARTERS) - hs_prepare).max(0);

        let wakeup = 1_000_000 * f / ((lptx_time + 1) * NS_PER_S * 256) + 1;
        let clk_post = cycles(60, OFFSET_NONE);
        let hs_trail = (cycles(60, OFFSET_HALF) + cycles(105, OFFSET_HALF)) / 2;

        Self {
            line_init: to_count(line_init),
            lptx_time: to_count(lptx_time),
            clk_prepare: to_count(clk_prepare),
            clk_zero: to_count(clk_zero),
            clk_trail: to_count(clk_trail),
            hs_prepare: to_count(hs_prepare),
            hs_zero: to_count(hs_zero),
            wakeup: to_count(wakeup),
            clk_post: to_count(clk_post) + CLK_POST_EXTRA,
            hs_trail: to_count(hs_trail),
        }
    }
}

/// `trunc(ns * f / 1e9 + offset / 4)`
fn cycles_at(ns: i64, f: i64, offset_quarters: i64) -> i64 {
    // i64 division truncates toward zero
    (4 * ns * f + offset_quarters * NS_PER_S) / (4 * NS_PER_S)
}

fn to_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}
