//! Bring-up sequencer
//!
//! [`Bridge::bring_up`] walks the eight [`Stage`]s in order, writing the
//! register blocks of a prebuilt [`ConfigImage`] and relaying the panel's
//! initialisation packets. The first bus error aborts the whole sequence and
//! is reported with the stage and operation that failed.

use embedded_hal::delay::DelayNs;

use crate::block::RegisterBlock;
use crate::command::{DCS_SET_PIXEL_FORMAT, PANEL_PAGE_SELECT, PIXEL_FORMAT_24BPP};
use crate::config::Config;
use crate::dcs::{Packet, PanelCommand};
use crate::error::{BuilderError, Error, Operation};
use crate::interface::BridgeInterface;
use crate::layout::ConfigImage;
use crate::panel;

type BridgeResult<T, I> = core::result::Result<T, Error<I>>;

/// PLL lock time before the clock output is enabled
const PLL_LOCK_MS: u32 = 5;
/// Wait after each DSI_CONFW write
const DSI_CONF_SETTLE_MS: u32 = 100;
/// Panel settle time after wake, power and table writes
const PANEL_SETTLE_MS: u32 = 100;
/// Wait before the first command to the panel
const PANEL_POWER_UP_MS: u32 = 20;
/// Panel reset pulse width
const PANEL_RESET_US: u32 = 10;
/// Wait after releasing the panel reset line
const PANEL_RESET_RECOVERY_MS: u32 = 20;
/// Wait between the two halves of the vendor page unlock
const UNLOCK_GAP_MS: u32 = 1;
/// Wait after the vendor page unlock
const UNLOCK_SETTLE_MS: u32 = 10;
/// Wait after the lookup table is handed back to the video path
const LUT_SETTLE_MS: u32 = 100;

/// One ordered phase of the bring-up
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Stage {
    /// System control, GPIO, PLL and input format
    GlobalRegisters,
    /// D-PHY lane drive and enables
    PhyRegisters,
    /// PPI timing counters
    PpiRegisters,
    /// DSI transmitter start
    TxRegisters,
    /// DSI control word and error masks
    ErrorHandling,
    /// Panel reset, wake and register table
    ScreenRegisters,
    /// Panel colour-correction table
    LookupTable,
    /// Video timing and RGB input enable
    DsiTxRegisters,
}

impl Stage {
    /// Every stage, in execution order
    pub const ALL: [Stage; 8] = [
        Stage::GlobalRegisters,
        Stage::PhyRegisters,
        Stage::PpiRegisters,
        Stage::TxRegisters,
        Stage::ErrorHandling,
        Stage::ScreenRegisters,
        Stage::LookupTable,
        Stage::DsiTxRegisters,
    ];

    /// Stage that follows this one, if any
    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self as usize + 1).copied()
    }
}

/// Values worth logging once the bridge is streaming
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BringUpReport {
    /// Achieved PLL frequency in Hz
    pub pll_hz: u64,
    /// D-PHY byte clock in Hz
    pub byte_clock_hz: u64,
    /// DSI bit clock in Hz
    pub bit_clock_hz: u64,
    /// LINEINITCNT, in units of 256 byte-clock cycles
    pub line_init: u32,
}

/// TC358778XBG bridge driver
///
/// Owns the control bus and the configuration image. Bring-up runs once;
/// afterwards the bridge streams RGB input to the panel and only
/// [`panel_command`](Self::panel_command) and
/// [`read_registers`](Self::read_registers) remain useful.
pub struct Bridge<I>
where
    I: BridgeInterface,
{
    /// Hardware interface
    interface: I,
    /// Register blocks and derived clocks
    image: ConfigImage,
    /// Last stage entered
    stage: Option<Stage>,
    /// Whether the final stage completed
    streaming: bool,
}

impl<I> Bridge<I>
where
    I: BridgeInterface,
{
    /// Create a new Bridge, building the configuration image up front
    ///
    /// # Errors
    ///
    /// Fails without touching the bus if the PLL search finds no settings or
    /// a derived value does not fit its register.
    pub fn new(interface: I, config: &Config) -> Result<Self, BuilderError> {
        Ok(Self {
            interface,
            image: ConfigImage::build(config)?,
            stage: None,
            streaming: false,
        })
    }

    /// Run the full bring-up sequence
    ///
    /// Stages run strictly in order. On error the remaining stages are
    /// skipped; the caller may start again from the first stage.
    ///
    /// # Errors
    ///
    /// - `Error::AlreadyStreaming` if a previous bring-up completed
    /// - `Error::Bus` with the failing stage and operation
    pub fn bring_up<D: DelayNs>(&mut self, delay: &mut D) -> BridgeResult<BringUpReport, I> {
        if self.streaming {
            return Err(Error::AlreadyStreaming);
        }

        for stage in Stage::ALL {
            self.stage = Some(stage);
            log::debug!("Entering {:?}", stage);
            let mut link = Link {
                interface: &mut self.interface,
                stage: Some(stage),
            };
            run_stage(&mut link, &self.image, stage, delay)?;
            log::info!("{:?} complete", stage);
        }
        self.streaming = true;

        let pll = self.image.pll();
        let report = BringUpReport {
            pll_hz: pll.frequency_hz(),
            byte_clock_hz: pll.byte_clock_hz(),
            bit_clock_hz: pll.bit_clock_hz(),
            line_init: self.image.timings().line_init,
        };
        log::info!(
            "Bridge streaming: PLL {} Hz, byte clock {} Hz, bit clock {} Hz, LINEINITCNT {}",
            report.pll_hz,
            report.byte_clock_hz,
            report.bit_clock_hz,
            report.line_init
        );
        Ok(report)
    }

    /// Send a named command to the panel
    pub fn panel_command<D: DelayNs>(
        &mut self,
        command: PanelCommand,
        delay: &mut D,
    ) -> BridgeResult<(), I> {
        log::debug!("Panel command {:?}", command);
        self.send_packet(command.packet(), delay)
    }

    /// Relay an arbitrary packet to the panel
    ///
    /// # Errors
    ///
    /// - `Error::Build` if a long payload exceeds the relay window
    /// - `Error::Bus` with the index of the failed write within the frame
    pub fn send_packet<D: DelayNs>(
        &mut self,
        packet: Packet<'_>,
        delay: &mut D,
    ) -> BridgeResult<(), I> {
        let mut link = Link {
            interface: &mut self.interface,
            stage: None,
        };
        link.send(packet, delay)
    }

    /// Read consecutive register bytes starting at `address`
    pub fn read_registers(&mut self, address: u16, buf: &mut [u8]) -> BridgeResult<(), I> {
        let [page, offset] = address.to_be_bytes();
        self.interface
            .read_block(page, offset, buf)
            .map_err(|source| Error::Bus {
                stage: None,
                operation: Operation::RegisterRead { address },
                source,
            })?;
        log::debug!("Read {:#06x}: {:02x?}", address, buf);
        Ok(())
    }

    /// Configuration image in use
    pub fn image(&self) -> &ConfigImage {
        &self.image
    }

    /// Last stage entered, or `None` before the first bring-up
    pub fn stage(&self) -> Option<Stage> {
        self.stage
    }

    /// Whether bring-up completed and the bridge is streaming video
    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    /// Release the underlying interface
    pub fn release(self) -> I {
        self.interface
    }
}

/// Bus access tagged with the stage errors are reported against
struct Link<'a, I: BridgeInterface> {
    interface: &'a mut I,
    stage: Option<Stage>,
}

impl<I: BridgeInterface> Link<'_, I> {
    fn write(&mut self, block: &RegisterBlock) -> BridgeResult<(), I> {
        log::trace!("Write {:?}", block);
        self.interface
            .write_block(block.page(), block.as_bytes())
            .map_err(|source| Error::Bus {
                stage: self.stage,
                operation: Operation::RegisterWrite {
                    address: block.address(),
                },
                source,
            })
    }

    fn write_all(&mut self, blocks: &[RegisterBlock]) -> BridgeResult<(), I> {
        for block in blocks {
            self.write(block)?;
        }
        Ok(())
    }

    /// Issue every write of the packet's frame, then wait for the panel
    fn send<D: DelayNs>(&mut self, packet: Packet<'_>, delay: &mut D) -> BridgeResult<(), I> {
        let frame = packet.frame()?;
        for (step, block) in frame.writes().iter().enumerate() {
            log::trace!("{:?} packet write {}: {:?}", frame.kind(), step, block);
            self.interface
                .write_block(block.page(), block.as_bytes())
                .map_err(|source| Error::Bus {
                    stage: self.stage,
                    operation: Operation::Frame {
                        kind: frame.kind(),
                        step: step as u8,
                    },
                    source,
                })?;
        }
        delay.delay_ms(packet.settle_ms());
        Ok(())
    }

    fn panel_write<D: DelayNs>(
        &mut self,
        register: u8,
        value: u8,
        delay: &mut D,
    ) -> BridgeResult<(), I> {
        self.send(Packet::Write { register, value }, delay)
    }
}

fn run_stage<I: BridgeInterface, D: DelayNs>(
    link: &mut Link<'_, I>,
    image: &ConfigImage,
    stage: Stage,
    delay: &mut D,
) -> BridgeResult<(), I> {
    match stage {
        Stage::GlobalRegisters => {
            link.write_all(image.global())?;
            delay.delay_ms(PLL_LOCK_MS);
            link.write(image.pll_enable())
        }
        Stage::PhyRegisters => link.write_all(image.phy()),
        Stage::PpiRegisters => {
            link.write_all(image.ppi())?;
            link.write(image.ppi_start())
        }
        Stage::TxRegisters => link.write(image.dsi_start()),
        Stage::ErrorHandling => {
            for block in image.dsi_conf() {
                link.write(block)?;
                delay.delay_ms(DSI_CONF_SETTLE_MS);
            }
            link.write(image.dsi_ready())
        }
        Stage::ScreenRegisters => screen_registers(link, image, delay),
        Stage::LookupTable => {
            link.write_all(image.lut_enter())?;
            for row in panel::lut_rows() {
                link.send(Packet::Long(row), delay)?;
            }
            link.write_all(image.lut_exit())?;
            delay.delay_ms(LUT_SETTLE_MS);
            Ok(())
        }
        Stage::DsiTxRegisters => link.write_all(image.video()),
    }
}

fn screen_registers<I: BridgeInterface, D: DelayNs>(
    link: &mut Link<'_, I>,
    image: &ConfigImage,
    delay: &mut D,
) -> BridgeResult<(), I> {
    let wake = PanelCommand::Wake.packet();

    delay.delay_ms(PANEL_POWER_UP_MS);
    link.send(wake, delay)?;
    delay.delay_ms(PANEL_SETTLE_MS);

    // Unlock the vendor pages
    link.panel_write(PANEL_PAGE_SELECT, panel::UNLOCK_PAGE, delay)?;
    link.panel_write(panel::UNLOCK_REGISTER, panel::UNLOCK_VALUE, delay)?;
    delay.delay_ms(UNLOCK_GAP_MS);
    link.panel_write(panel::UNLOCK_REGISTER, 0x00, delay)?;
    link.panel_write(PANEL_PAGE_SELECT, 0x00, delay)?;
    delay.delay_ms(UNLOCK_SETTLE_MS);

    link.write(image.panel_reset())?;
    delay.delay_us(PANEL_RESET_US);
    link.write(image.panel_run())?;
    delay.delay_ms(PANEL_RESET_RECOVERY_MS);

    link.send(wake, delay)?;
    delay.delay_ms(PANEL_SETTLE_MS);

    for &(register, value) in panel::INIT_TABLE {
        let value = if register == panel::LANE_SELECT {
            image.panel_lane_select()
        } else {
            value
        };
        link.panel_write(register, value, delay)?;
    }
    link.send(Packet::Long(image.rgb_timing()), delay)?;
    delay.delay_ms(PANEL_SETTLE_MS);

    link.send(wake, delay)?;
    delay.delay_ms(PANEL_SETTLE_MS);
    link.send(PanelCommand::DisplayOn.packet(), delay)?;
    delay.delay_ms(PANEL_SETTLE_MS);

    link.panel_write(DCS_SET_PIXEL_FORMAT, PIXEL_FORMAT_24BPP, delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Builder;
    use crate::dcs::PacketKind;
    use alloc::vec::Vec;

    #[derive(Debug, PartialEq)]
    struct MockError;

    #[derive(Debug, Default)]
    struct MockInterface {
        writes: Vec<(u8, Vec<u8>)>,
        reads: Vec<(u8, u8, usize)>,
        /// Index of the write attempt that fails
        fail_at: Option<usize>,
        attempts: usize,
    }

    impl MockInterface {
        fn failing_at(index: usize) -> Self {
            Self {
                fail_at: Some(index),
                ..Self::default()
            }
        }
    }

    impl BridgeInterface for MockInterface {
        type Error = MockError;

        fn write_block(&mut self, page: u8, data: &[u8]) -> Result<(), Self::Error> {
            let attempt = self.attempts;
            self.attempts += 1;
            if self.fail_at == Some(attempt) {
                return Err(MockError);
            }
            self.writes.push((page, data.to_vec()));
            Ok(())
        }

        fn read_block(
            &mut self,
            page: u8,
            offset: u8,
            buf: &mut [u8],
        ) -> Result<(), Self::Error> {
            self.reads.push((page, offset, buf.len()));
            for (i, byte) in buf.iter_mut().enumerate() {
                *byte = i as u8;
            }
            Ok(())
        }
    }

    #[derive(Debug, Default)]
    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    fn test_bridge(interface: MockInterface) -> Bridge<MockInterface> {
        let config = Builder::new().build().unwrap();
        Bridge::new(interface, &config).unwrap()
    }

    fn block_bytes(block: &RegisterBlock) -> (u8, Vec<u8>) {
        (block.page(), block.as_bytes().to_vec())
    }

    fn packet_bytes(packet: Packet<'_>) -> Vec<(u8, Vec<u8>)> {
        packet.frame().unwrap().writes().iter().map(block_bytes).collect()
    }

    fn panel_write_bytes(register: u8, value: u8) -> Vec<(u8, Vec<u8>)> {
        packet_bytes(Packet::Write { register, value })
    }

    /// Every bus write of a bring-up, grouped by stage
    fn expected_writes(image: &ConfigImage) -> Vec<(Stage, Vec<(u8, Vec<u8>)>)> {
        let wake = packet_bytes(PanelCommand::Wake.packet());

        let mut global: Vec<_> = image.global().iter().map(block_bytes).collect();
        global.push(block_bytes(image.pll_enable()));

        let mut ppi: Vec<_> = image.ppi().iter().map(block_bytes).collect();
        ppi.push(block_bytes(image.ppi_start()));

        let mut errors: Vec<_> = image.dsi_conf().iter().map(block_bytes).collect();
        errors.push(block_bytes(image.dsi_ready()));

        let mut screen = wake.clone();
        screen.extend(panel_write_bytes(PANEL_PAGE_SELECT, panel::UNLOCK_PAGE));
        screen.extend(panel_write_bytes(panel::UNLOCK_REGISTER, panel::UNLOCK_VALUE));
        screen.extend(panel_write_bytes(panel::UNLOCK_REGISTER, 0x00));
        screen.extend(panel_write_bytes(PANEL_PAGE_SELECT, 0x00));
        screen.push(block_bytes(image.panel_reset()));
        screen.push(block_bytes(image.panel_run()));
        screen.extend(wake.iter().cloned());
        for &(register, value) in panel::INIT_TABLE {
            let value = if register == panel::LANE_SELECT {
                image.panel_lane_select()
            } else {
                value
            };
            screen.extend(panel_write_bytes(register, value));
        }
        screen.extend(packet_bytes(Packet::Long(image.rgb_timing())));
        screen.extend(wake.iter().cloned());
        screen.extend(packet_bytes(PanelCommand::DisplayOn.packet()));
        screen.extend(panel_write_bytes(DCS_SET_PIXEL_FORMAT, PIXEL_FORMAT_24BPP));

        let mut lut: Vec<_> = image.lut_enter().iter().map(block_bytes).collect();
        for row in panel::lut_rows() {
            lut.extend(packet_bytes(Packet::Long(row)));
        }
        lut.extend(image.lut_exit().iter().map(block_bytes));

        alloc::vec![
            (Stage::GlobalRegisters, global),
            (Stage::PhyRegisters, image.phy().iter().map(block_bytes).collect()),
            (Stage::PpiRegisters, ppi),
            (Stage::TxRegisters, alloc::vec![block_bytes(image.dsi_start())]),
            (Stage::ErrorHandling, errors),
            (Stage::ScreenRegisters, screen),
            (Stage::LookupTable, lut),
            (Stage::DsiTxRegisters, image.video().iter().map(block_bytes).collect()),
        ]
    }

    /// Writes issued by the stages before `stage`
    fn writes_before(image: &ConfigImage, stage: Stage) -> Vec<(u8, Vec<u8>)> {
        expected_writes(image)
            .into_iter()
            .take_while(|(s, _)| *s < stage)
            .flat_map(|(_, writes)| writes)
            .collect()
    }

    /// Writes issued before the first panel packet
    fn register_stage_writes(image: &ConfigImage) -> Vec<(u8, Vec<u8>)> {
        writes_before(image, Stage::ScreenRegisters)
    }

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::GlobalRegisters.next(), Some(Stage::PhyRegisters));
        assert_eq!(Stage::LookupTable.next(), Some(Stage::DsiTxRegisters));
        assert_eq!(Stage::DsiTxRegisters.next(), None);
        assert!(Stage::ALL.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_bring_up_reports_reference_clocks() {
        let mut bridge = test_bridge(MockInterface::default());
        let report = bridge.bring_up(&mut MockDelay::default()).unwrap();
        assert_eq!(
            report,
            BringUpReport {
                pll_hz: 810_399_457,
                byte_clock_hz: 202_599_864,
                bit_clock_hz: 1_620_798_914,
                line_init: 80,
            }
        );
        assert!(bridge.is_streaming());
        assert_eq!(bridge.stage(), Some(Stage::DsiTxRegisters));
    }

    #[test]
    fn test_stages_write_in_order() {
        let mut bridge = test_bridge(MockInterface::default());
        bridge.bring_up(&mut MockDelay::default()).unwrap();
        let expected = expected_writes(bridge.image());
        assert_eq!(
            expected.iter().map(|(stage, _)| *stage).collect::<Vec<_>>(),
            Stage::ALL
        );

        let interface = bridge.release();
        let mut offset = 0;
        for (stage, writes) in &expected {
            let end = offset + writes.len();
            assert_eq!(
                interface.writes[offset..end],
                writes[..],
                "{:?} writes out of order",
                stage
            );
            offset = end;
        }
        assert_eq!(offset, interface.writes.len());
    }

    #[test]
    fn test_lookup_table_follows_pixel_format_write() {
        let mut bridge = test_bridge(MockInterface::default());
        bridge.bring_up(&mut MockDelay::default()).unwrap();
        let lut_start = writes_before(bridge.image(), Stage::LookupTable).len();
        let interface = bridge.release();

        let pixel_format = panel_write_bytes(DCS_SET_PIXEL_FORMAT, PIXEL_FORMAT_24BPP);
        assert_eq!(interface.writes[lut_start - 3..lut_start], pixel_format[..]);
        assert_eq!(interface.writes[lut_start], (0x00, alloc::vec![0x08, 0x00, 0x01]));
    }

    #[test]
    fn test_write_and_delay_totals() {
        let mut bridge = test_bridge(MockInterface::default());
        let mut delay = MockDelay::default();
        bridge.bring_up(&mut delay).unwrap();
        let interface = bridge.release();

        let table = panel::INIT_TABLE.len();
        assert_eq!(interface.writes.len(), 212 + 3 * table);
        assert_eq!(delay.total_ns, 1_626_010_000 + table as u64 * 1_000_000);
    }

    #[test]
    fn test_screen_stage_starts_with_wake() {
        let mut bridge = test_bridge(MockInterface::default());
        bridge.bring_up(&mut MockDelay::default()).unwrap();
        let start = register_stage_writes(bridge.image()).len();
        let interface = bridge.release();
        let wake: [&[u8]; 3] = [&[0x02, 0x10, 0x05], &[0x10, 0x00, 0x11], &[0x00, 0x00, 0x01]];
        for (i, want) in wake.iter().enumerate() {
            assert_eq!(interface.writes[start + i], (0x06, want.to_vec()));
        }
        // Unlock: FF <- EE
        assert_eq!(interface.writes[start + 4], (0x06, alloc::vec![0x10, 0xEE, 0xFF]));
    }

    #[test]
    fn test_lane_count_reaches_panel_table() {
        let config = Builder::new().lanes(2).build().unwrap();
        let mut bridge = Bridge::new(MockInterface::default(), &config).unwrap();
        bridge.bring_up(&mut MockDelay::default()).unwrap();
        let interface = bridge.release();
        let lane_select = interface
            .writes
            .iter()
            .filter(|(page, bytes)| *page == 0x06 && bytes.as_slice() == [0x10, 0x01, 0xBA])
            .count();
        assert_eq!(lane_select, 1);
    }

    #[test]
    fn test_bus_error_aborts_remaining_stages() {
        // Write 10 is DSI_START, the only write of the TX stage
        let mut bridge = test_bridge(MockInterface::failing_at(10));
        let result = bridge.bring_up(&mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::Bus {
                stage: Some(Stage::TxRegisters),
                operation: Operation::RegisterWrite { address: 0x0518 },
                source: MockError,
            })
        ));
        assert_eq!(bridge.stage(), Some(Stage::TxRegisters));
        assert!(!bridge.is_streaming());

        let interface = bridge.release();
        assert_eq!(interface.attempts, 11);
        assert_eq!(interface.writes.len(), 10);
        assert!(interface.writes.iter().all(|(page, _)| *page <= 0x02));
    }

    #[test]
    fn test_failure_in_any_stage_stops_the_sequence() {
        let image = test_bridge(MockInterface::default()).image().clone();
        for stage in Stage::ALL {
            let before = writes_before(&image, stage);
            let mut bridge = test_bridge(MockInterface::failing_at(before.len()));
            let result = bridge.bring_up(&mut MockDelay::default());
            assert!(
                matches!(result, Err(Error::Bus { stage: Some(s), .. }) if s == stage),
                "failure in {:?} reported as {:?}",
                stage,
                result
            );
            assert_eq!(bridge.stage(), Some(stage));
            assert!(!bridge.is_streaming());

            let interface = bridge.release();
            assert_eq!(interface.attempts, before.len() + 1);
            assert_eq!(interface.writes, before, "writes after failing {:?}", stage);
        }
    }

    #[test]
    fn test_interrupted_frame_reports_step() {
        let start = register_stage_writes(test_bridge(MockInterface::default()).image()).len();

        let mut bridge = test_bridge(MockInterface::failing_at(start + 1));
        let result = bridge.bring_up(&mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::Bus {
                stage: Some(Stage::ScreenRegisters),
                operation: Operation::Frame {
                    kind: PacketKind::Command,
                    step: 1,
                },
                ..
            })
        ));
        assert_eq!(bridge.release().writes.len(), start + 1);
    }

    #[test]
    fn test_second_bring_up_is_rejected() {
        let mut bridge = test_bridge(MockInterface::default());
        let mut delay = MockDelay::default();
        bridge.bring_up(&mut delay).unwrap();
        let result = bridge.bring_up(&mut delay);
        assert!(matches!(result, Err(Error::AlreadyStreaming)));
    }

    #[test]
    fn test_retry_after_failure_starts_over() {
        let mut bridge = test_bridge(MockInterface::failing_at(3));
        let mut delay = MockDelay::default();
        assert!(bridge.bring_up(&mut delay).is_err());
        let report = bridge.bring_up(&mut delay).unwrap();
        assert_eq!(report.pll_hz, 810_399_457);
        let interface = bridge.release();
        assert_eq!(interface.writes[3].1[0], 0x02);
    }

    #[test]
    fn test_panel_command_after_bring_up() {
        let mut bridge = test_bridge(MockInterface::default());
        let mut delay = MockDelay::default();
        bridge.bring_up(&mut delay).unwrap();
        let before = delay.total_ns;

        bridge
            .panel_command(PanelCommand::DisplayOff, &mut delay)
            .unwrap();
        assert_eq!(delay.total_ns - before, 10_000_000);
        let interface = bridge.release();
        let tail = &interface.writes[interface.writes.len() - 3..];
        assert_eq!(tail[1], (0x06, alloc::vec![0x10, 0x00, 0x28]));
    }

    #[test]
    fn test_packet_error_outside_bring_up_has_no_stage() {
        let mut bridge = test_bridge(MockInterface::failing_at(0));
        let result = bridge.panel_command(PanelCommand::Wake, &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::Bus {
                stage: None,
                operation: Operation::Frame { step: 0, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_oversized_packet_is_rejected_before_bus() {
        let mut bridge = test_bridge(MockInterface::default());
        let payload = [0u8; 17];
        let result = bridge.send_packet(Packet::Long(&payload), &mut MockDelay::default());
        assert!(matches!(
            result,
            Err(Error::Build(BuilderError::PayloadTooLong { len: 17, .. }))
        ));
        assert!(bridge.release().writes.is_empty());
    }

    #[test]
    fn test_read_registers() {
        let mut bridge = test_bridge(MockInterface::default());
        let mut buf = [0u8; 4];
        bridge.read_registers(0x0518, &mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3]);
        assert_eq!(bridge.release().reads, [(0x05, 0x18, 4)]);
    }
}
