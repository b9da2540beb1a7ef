//! A026EAN01.0 panel tables
//!
//! Register settings for the panel's driver IC, sent as one-parameter DCS
//! writes while the panel is in its manufacturer command pages, and the
//! colour-correction rows streamed during the lookup-table stage.

use crate::command::PANEL_PAGE_SELECT;

/// Panel register that holds the DSI lane count (lanes - 1)
pub const LANE_SELECT: u8 = 0xBA;

/// Value written to [`LANE_SELECT`] in [`INIT_TABLE`]; replaced at send time
pub const LANE_SELECT_PLACEHOLDER: u8 = 0x03;

/// RGB interface timing register
pub const RGB_TIMING: u8 = 0x3B;

/// Manufacturer page used to unlock the vendor pages
pub const UNLOCK_PAGE: u8 = 0xEE;

/// Unlock register on [`UNLOCK_PAGE`]
pub const UNLOCK_REGISTER: u8 = 0x26;

/// Value pulsed into [`UNLOCK_REGISTER`]
pub const UNLOCK_VALUE: u8 = 0x08;

/// `(register, value)` pairs written in order after the panel leaves sleep
///
/// Writes to [`PANEL_PAGE_SELECT`] switch the manufacturer page; `0xFB = 0x01`
/// stops the page from reloading its defaults from OTP.
pub const INIT_TABLE: &[(u8, u8)] = &[
    // Manufacturer page 1
    (PANEL_PAGE_SELECT, 0x01),
    (0xFB, 0x01),
    (0x00, 0x48),
    (0x01, 0x33),
    (0x02, 0x53),
    (0x03, 0x55),
    (0x04, 0x55),
    (0x05, 0x33),
    (0x06, 0x22),
    (0x08, 0x56),
    (0x09, 0x8F),
    (0x0B, 0x97),
    (0x0C, 0x97),
    (0x0D, 0x2F),
    (0x0E, 0x24),
    (0x11, 0x7F),
    (0x12, 0x03),
    (0x36, 0x73),
    (0x0F, 0x04),
    (PANEL_PAGE_SELECT, UNLOCK_PAGE),
    (0xFB, 0x01),
    (0x04, 0xAD),
    // Manufacturer page 5
    (PANEL_PAGE_SELECT, 0x00),
    (PANEL_PAGE_SELECT, 0x05),
    (0xFB, 0x01),
    (0x01, 0x00),
    (0x02, 0x8C),
    (0x03, 0x8C),
    (0x04, 0x8C),
    (0x05, 0x30),
    (0x06, 0x33),
    (0x07, 0x01),
    (0x08, 0x00),
    (0x09, 0x46),
    (0x0A, 0x46),
    (0x0D, 0x0B),
    (0x0E, 0x1D),
    (0x0F, 0x08),
    (0x10, 0x53),
    (0x11, 0x00),
    (0x12, 0x00),
    (0x14, 0x01),
    (0x15, 0x00),
    (0x16, 0x05),
    (0x17, 0x04),
    (0x19, 0x7F),
    (0x1A, 0xFF),
    (0x1B, 0x0F),
    (0x1C, 0x00),
    (0x1D, 0x00),
    (0x1E, 0x00),
    (0x1F, 0x07),
    (0x20, 0x00),
    (0x21, 0x02),
    (0x22, 0x55),
    (0x23, 0x0D),
    (0x6C, 0x00),
    (0x6D, 0x00),
    (0x2D, 0x02),
    (0x83, 0x02),
    (0x9E, 0x58),
    (0x9F, 0x58),
    (0xA0, 0x41),
    (0xA2, 0x10),
    (0xBB, 0x0A),
    (0xBC, 0x0A),
    (0x28, 0x01),
    (0x2F, 0x02),
    (0x32, 0x08),
    (0x33, 0xB8),
    (0x36, 0x02),
    (0x37, 0x00),
    (0x43, 0x00),
    (0x4B, 0x21),
    (0x4C, 0x03),
    (0x50, 0x21),
    (0x51, 0x03),
    (0x58, 0x21),
    (0x59, 0x03),
    (0x5D, 0x21),
    (0x5E, 0x03),
    // Manufacturer page 4
    (PANEL_PAGE_SELECT, 0x04),
    (0xFB, 0x01),
    (0x0A, 0x03),
    // User command set
    (PANEL_PAGE_SELECT, 0x00),
    (0xFB, 0x01),
    (0x51, 0x07),
    (0x53, 0x2C),
    (0x55, 0x03),
    (0x5E, 0x00),
    (0xC2, 0x03),
    (LANE_SELECT, LANE_SELECT_PLACEHOLDER),
    (0xBC, 0x00),
    (0x35, 0x00),
];

/// Rows shared by all three colour channels
const LUT_LOW_ROWS: [[u8; 8]; 4] = [
    [0x04, 0x00, 0x0C, 0x08, 0x14, 0x10, 0x1C, 0x18],
    [0x24, 0x20, 0x2C, 0x28, 0x34, 0x30, 0x3C, 0x38],
    [0x45, 0x41, 0x4D, 0x49, 0x55, 0x51, 0x5D, 0x59],
    [0x65, 0x61, 0x6D, 0x69, 0x75, 0x71, 0x7D, 0x79],
];

const LUT_RED_HIGH_ROWS: [[u8; 8]; 4] = [
    [0x86, 0x82, 0x8E, 0x88, 0x96, 0x92, 0x9E, 0x9A],
    [0xA6, 0xA2, 0xAE, 0xA8, 0xB6, 0xB2, 0xBE, 0xBA],
    [0xC7, 0xC3, 0xCF, 0xC9, 0xD7, 0xD3, 0xDF, 0xDB],
    [0xE7, 0xE3, 0xEF, 0xE9, 0xF7, 0xF3, 0xFF, 0xFB],
];

const LUT_HIGH_ROWS: [[u8; 8]; 4] = [
    [0x86, 0x82, 0x8E, 0x8A, 0x96, 0x92, 0x9E, 0x9A],
    [0xA6, 0xA2, 0xAE, 0xAA, 0xB6, 0xB2, 0xBE, 0xBA],
    [0xC7, 0xC3, 0xCF, 0xCB, 0xD7, 0xD3, 0xDF, 0xDB],
    [0xE7, 0xE3, 0xEF, 0xEB, 0xF7, 0xF3, 0xFF, 0xFB],
];

/// Rows per colour channel
pub const LUT_ROWS_PER_CHANNEL: usize = 8;

/// Colour-correction rows in send order: red, green, then blue
pub fn lut_rows() -> impl Iterator<Item = &'static [u8; 8]> {
    let red = LUT_LOW_ROWS.iter().chain(LUT_RED_HIGH_ROWS.iter());
    let green = LUT_LOW_ROWS.iter().chain(LUT_HIGH_ROWS.iter());
    let blue = LUT_LOW_ROWS.iter().chain(LUT_HIGH_ROWS.iter());
    red.chain(green).chain(blue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn test_lut_has_three_channels_of_eight_rows() {
        let rows: Vec<_> = lut_rows().collect();
        assert_eq!(rows.len(), 3 * LUT_ROWS_PER_CHANNEL);
        assert_eq!(rows[0][0], 0x04);
        assert_eq!(rows[4][3], 0x88);
        assert_eq!(rows[12][3], 0x8A);
        assert_eq!(rows[23], &[0xE7, 0xE3, 0xEF, 0xEB, 0xF7, 0xF3, 0xFF, 0xFB]);
    }

    #[test]
    fn test_init_table_ends_on_user_page() {
        let last_page = INIT_TABLE
            .iter()
            .rev()
            .find(|(register, _)| *register == PANEL_PAGE_SELECT)
            .map(|(_, value)| *value);
        assert_eq!(last_page, Some(0x00));
        assert_eq!(
            INIT_TABLE.iter().filter(|(r, _)| *r == LANE_SELECT).count(),
            1
        );
    }
}
