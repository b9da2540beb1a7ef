//! PLL parameter search
//!
//! The bridge multiplies the incoming pixel clock up to the DSI bit clock with
//! a PLL configured by three integers:
//!
//! - divisor exponent `E` (0..=3): output divisor `2^E`, keeps the VCO in range
//! - feedback divider `F` (0..=511)
//! - prescaler `P` (0..=15)
//!
//! [`PllSolution::solve`] searches every prescaler for the feedback ratio that
//! lands closest to an integer, using 1e8 fixed-point arithmetic.
//!
//! ```
//! use tc358778::PllSolution;
//!
//! let pll = match PllSolution::solve(73_008_960, 808_680_000) {
//!     Ok(pll) => pll,
//!     Err(_) => return,
//! };
//! assert_eq!(pll.feedback_divider(), 443);
//! assert_eq!(pll.prescaler(), 9);
//! assert_eq!(pll.frequency_hz(), 810_399_457);
//! ```

use crate::error::ClockError;

/// Fixed-point scale of the feedback ratio
const SCALE: u128 = 100_000_000;

/// Largest feedback divider that fits the 9-bit field
pub const MAX_FEEDBACK_DIVIDER: u16 = 511;

/// Largest prescaler that fits the 4-bit field
pub const MAX_PRESCALER: u8 = 15;

/// Largest output divisor exponent
pub const MAX_DIVISOR_EXP: u8 = 3;

/// Immutable result of the PLL search
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PllSolution {
    divisor_exp: u8,
    feedback_divider: u16,
    prescaler: u8,
    frequency_hz: u64,
}

impl PllSolution {
    /// Find the PLL settings that best approximate `target_hz`
    ///
    /// Deterministic in its inputs. Among prescalers with equal deviation the
    /// lowest one wins.
    ///
    /// # Errors
    ///
    /// Returns [`ClockError::NoSolution`] if the pixel clock is zero, the target
    /// needs a divisor exponent above 3 (at or below 31.25 MHz), or no
    /// prescaler keeps the feedback divider within 9 bits.
    pub fn solve(pixel_clock_hz: u32, target_hz: u32) -> Result<Self, ClockError> {
        let no_solution = ClockError::NoSolution {
            pixel_clock_hz,
            target_hz,
        };
        if pixel_clock_hz == 0 {
            return Err(no_solution);
        }
        let divisor_exp = divisor_exponent(target_hz).ok_or(no_solution)?;

        // (2^E * target) / (pixel / 4), scaled by 1e8
        let base = SCALE * (1u128 << divisor_exp) * u128::from(target_hz) * 4
            / u128::from(pixel_clock_hz);

        // (prescaler, scaled ratio, distance to the nearest integer ratio)
        let mut best: Option<(u8, u128, u128)> = None;
        for prescaler in 0..=MAX_PRESCALER {
            let scaled = base * (u128::from(prescaler) + 1);
            if scaled == 0 || scaled / SCALE > u128::from(MAX_FEEDBACK_DIVIDER) {
                continue;
            }
            let distance = distance_to_integer(scaled);
            let better = match best {
                // distance / scaled < best_distance / best_scaled
                Some((_, best_scaled, best_distance)) => {
                    distance * best_scaled < best_distance * scaled
                }
                None => true,
            };
            if better {
                best = Some((prescaler, scaled, distance));
            }
        }
        let (prescaler, scaled, _) = best.ok_or(no_solution)?;
        let feedback_divider = (scaled / SCALE) as u16;

        // +1 keeps the achieved clock from landing just under the target
        let frequency_hz = (u64::from(feedback_divider) + 1) * u64::from(pixel_clock_hz)
            / (4 * (1u64 << divisor_exp) * (u64::from(prescaler) + 1))
            + 1;

        Ok(Self {
            divisor_exp,
            feedback_divider,
            prescaler,
            frequency_hz,
        })
    }

    /// Output divisor exponent `E`
    pub fn divisor_exp(&self) -> u8 {
        self.divisor_exp
    }

    /// Feedback divider `F`
    pub fn feedback_divider(&self) -> u16 {
        self.feedback_divider
    }

    /// Prescaler `P`
    pub fn prescaler(&self) -> u8 {
        self.prescaler
    }

    /// Achieved PLL frequency in Hz
    pub fn frequency_hz(&self) -> u64 {
        self.frequency_hz
    }

    /// D-PHY byte clock (PLL / 4) in Hz
    pub fn byte_clock_hz(&self) -> u64 {
        self.frequency_hz / 4
    }

    /// DSI bit clock (PLL * 2) in Hz
    pub fn bit_clock_hz(&self) -> u64 {
        self.frequency_hz * 2
    }

    /// PLLCTL0 high byte: `P * 16 + F / 256`
    pub fn ctl1(&self) -> u8 {
        (self.prescaler << 4) | (self.feedback_divider >> 8) as u8
    }

    /// PLLCTL0 low byte: `F mod 256`
    pub fn ctl2(&self) -> u8 {
        (self.feedback_divider & 0xFF) as u8
    }

    /// PLLCTL1 high byte: `E * 4`
    pub fn ctl3(&self) -> u8 {
        self.divisor_exp << 2
    }
}

/// `3 - trunc(log2(target / 62.5 MHz))` below 1 GHz, `0` above
fn divisor_exponent(target_hz: u32) -> Option<u8> {
    match target_hz {
        0..=31_250_000 => None,
        31_250_001..=124_999_999 => Some(3),
        125_000_000..=249_999_999 => Some(2),
        250_000_000..=499_999_999 => Some(1),
        _ => Some(0),
    }
}

fn distance_to_integer(scaled: u128) -> u128 {
    let nearest = (scaled + SCALE / 2) / SCALE * SCALE;
    scaled.abs_diff(nearest)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Scans all 512 feedback dividers for every prescaler instead of rounding.
    ///
    /// Shares the fixed-point ratio with `solve`, so it checks the
    /// nearest-integer search; `exact_deviation` checks the ratio itself.
    fn oracle_best(pixel_clock_hz: u32, target_hz: u32) -> (u8, u128, u128) {
        let exp = divisor_exponent(target_hz).unwrap();
        let base =
            SCALE * (1u128 << exp) * u128::from(target_hz) * 4 / u128::from(pixel_clock_hz);
        let mut best: Option<(u8, u128, u128)> = None;
        for p in 0..16u8 {
            let scaled = base * (u128::from(p) + 1);
            if scaled / SCALE >= 512 {
                continue;
            }
            let distance = (0..=512u128)
                .map(|n| scaled.abs_diff(n * SCALE))
                .min()
                .unwrap();
            match best {
                Some((_, s, d)) if d * scaled <= distance * s => {}
                _ => best = Some((p, scaled, distance)),
            }
        }
        best.unwrap()
    }

    #[test]
    fn test_golden_reference_clock() {
        let pll = PllSolution::solve(73_008_960, 808_680_000).unwrap();
        assert_eq!(pll.divisor_exp(), 0);
        assert_eq!(pll.feedback_divider(), 443);
        assert_eq!(pll.prescaler(), 9);
        assert_eq!(pll.frequency_hz(), 810_399_457);
        assert_eq!(pll.byte_clock_hz(), 202_599_864);
        assert_eq!(pll.bit_clock_hz(), 1_620_798_914);
    }

    #[test]
    fn test_control_bytes() {
        let pll = PllSolution::solve(73_008_960, 808_680_000).unwrap();
        assert_eq!(pll.ctl1(), 0x91);
        assert_eq!(pll.ctl2(), 0xBB);
        assert_eq!(pll.ctl3(), 0x00);
    }

    #[test]
    fn test_divisor_exponent_ranges() {
        assert_eq!(divisor_exponent(40_000_000), Some(3));
        assert_eq!(divisor_exponent(100_000_000), Some(3));
        assert_eq!(divisor_exponent(125_000_000), Some(2));
        assert_eq!(divisor_exponent(400_000_000), Some(1));
        assert_eq!(divisor_exponent(498_400_000), Some(1));
        assert_eq!(divisor_exponent(808_680_000), Some(0));
        assert_eq!(divisor_exponent(1_200_000_000), Some(0));
        assert_eq!(divisor_exponent(31_250_000), None);
    }

    #[test]
    fn test_other_known_solutions() {
        let pll = PllSolution::solve(27_000_000, 400_000_000).unwrap();
        assert_eq!(
            (pll.divisor_exp(), pll.feedback_divider(), pll.prescaler()),
            (1, 237, 1)
        );
        assert_eq!(pll.frequency_hz(), 401_625_001);

        let pll = PllSolution::solve(25_000_000, 100_000_000).unwrap();
        assert_eq!(
            (pll.divisor_exp(), pll.feedback_divider(), pll.prescaler()),
            (3, 128, 0)
        );
        assert_eq!(pll.frequency_hz(), 100_781_251);

        let pll = PllSolution::solve(74_250_000, 1_200_000_000).unwrap();
        assert_eq!(
            (pll.divisor_exp(), pll.feedback_divider(), pll.prescaler()),
            (0, 193, 2)
        );
        assert_eq!(pll.frequency_hz(), 1_200_375_001);
    }

    #[test]
    fn test_ties_keep_lowest_prescaler() {
        // Prescalers 0..=7 all give the same relative deviation here
        let pll = PllSolution::solve(67_546_000, 498_400_000).unwrap();
        assert_eq!(pll.prescaler(), 0);
        assert_eq!(pll.feedback_divider(), 59);
        assert_eq!(pll.divisor_exp(), 1);
    }

    #[test]
    fn test_matches_exhaustive_oracle() {
        let cases = [
            (73_008_960, 808_680_000),
            (67_546_000, 498_400_000),
            (27_000_000, 400_000_000),
            (25_000_000, 100_000_000),
            (50_000_000, 40_000_000),
            (148_500_000, 891_000_000),
            (33_264_000, 297_000_000),
        ];
        for (pixel, target) in cases {
            let pll = PllSolution::solve(pixel, target).unwrap();
            let (p, scaled, distance) = oracle_best(pixel, target);
            assert_eq!(pll.prescaler(), p, "pixel {pixel} target {target}");
            assert_eq!(u128::from(pll.feedback_divider()), scaled / SCALE);
            assert_eq!(distance_to_integer(scaled), distance);
            assert!(pll.feedback_divider() <= MAX_FEEDBACK_DIVIDER);
            assert!(pll.prescaler() <= MAX_PRESCALER);
            assert!(pll.divisor_exp() <= MAX_DIVISOR_EXP);
        }
    }

    /// Relative deviation of the best feedback divider for `prescaler`,
    /// from the exact ratio `target * 2^E * 4 * (P + 1) / pixel`
    fn exact_deviation(
        pixel_clock_hz: u32,
        target_hz: u32,
        exp: u8,
        prescaler: u8,
    ) -> Option<f64> {
        let ratio = u128::from(prescaler) + 1;
        let num = (1u128 << exp) * u128::from(target_hz) * 4 * ratio;
        let den = u128::from(pixel_clock_hz);
        if num / den >= 512 {
            return None;
        }
        let nearest = (2 * num + den) / (2 * den);
        Some(num.abs_diff(nearest * den) as f64 / num as f64)
    }

    #[test]
    fn test_no_prescaler_beats_the_solution_exactly() {
        let cases = [
            (73_008_960, 808_680_000),
            (27_000_000, 400_000_000),
            (148_500_000, 891_000_000),
            (33_264_000, 297_000_000),
            (24_000_000, 1_200_000_000),
        ];
        for (pixel, target) in cases {
            let pll = PllSolution::solve(pixel, target).unwrap();
            let exp = pll.divisor_exp();
            let chosen = exact_deviation(pixel, target, exp, pll.prescaler()).unwrap();
            let best = (0..=MAX_PRESCALER)
                .filter_map(|p| exact_deviation(pixel, target, exp, p))
                .fold(f64::INFINITY, f64::min);
            assert!(
                chosen <= best + 1e-9,
                "pixel {pixel} target {target}: {chosen} vs {best}"
            );
        }
    }

    #[test]
    fn test_zero_pixel_clock_has_no_solution() {
        let result = PllSolution::solve(0, 808_680_000);
        assert!(matches!(
            result,
            Err(ClockError::NoSolution {
                pixel_clock_hz: 0,
                ..
            })
        ));
    }

    #[test]
    fn test_low_target_has_no_solution() {
        assert!(PllSolution::solve(73_008_960, 0).is_err());
        assert!(PllSolution::solve(73_008_960, 31_250_000).is_err());
    }

    #[test]
    fn test_oversized_ratio_has_no_solution() {
        // Ratio above 511 even with P = 0
        assert!(PllSolution::solve(1_000_000, 200_000_000).is_err());
    }
}
