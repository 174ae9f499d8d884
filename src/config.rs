//!# Controller configuration
//! [Configuration] bundles the bit timing and the automatic management flags written
//! during initialization. The default matches the reset friendly settings of the vendor library.
//!
//! ```
//!# use stm32f37x_can::config::*;
//!# use embedded_time::rate::Hertz;
//!#
//! let config = Configuration {
//!     bit_timing: BitTiming::from_bitrate(Hertz(36_000_000), Hertz(500_000)).unwrap(),
//!     flags: ControllerFlags {
//!         auto_bus_off: true,
//!         ..Default::default()
//!     },
//! };
//!
//! assert_eq!(4, config.bit_timing.prescaler);
//! ```
use crate::registers::{BitTimingReg, InterruptEnableReg, MasterControlReg};
use embedded_time::rate::Hertz;

/// Entire configuration applied by [crate::can::Controller::initialize]
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Configuration {
    pub bit_timing: BitTiming,
    pub flags: ControllerFlags,
}

/// Bit timing and test mode, encoded to the BTR register
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct BitTiming {
    /// Bit segment 1
    pub seg1: Segment1,
    /// Bit segment 2
    pub seg2: Segment2,
    /// Resynchronization jump width
    pub sjw: SyncJumpWidth,
    /// Baud rate prescaler (1-1024)
    pub prescaler: u16,
    /// Silent/loop back test mode
    pub mode: TestMode,
}

impl Default for BitTiming {
    fn default() -> Self {
        Self {
            seg1: Segment1::Tq4,
            seg2: Segment2::Tq3,
            sjw: SyncJumpWidth::Tq1,
            prescaler: 1,
            mode: TestMode::Normal,
        }
    }
}

impl BitTiming {
    /// Smallest number of time quanta per bit accepted by the hardware
    const MIN_QUANTA: u32 = 8;
    /// Largest number of time quanta per bit (1 + 16 + 8)
    const MAX_QUANTA: u32 = 25;

    /// Calculates the bit timing for the given peripheral clock and bit rate.
    ///
    /// Prefers the highest number of time quanta per bit, with the sample point placed at 87.5%.
    /// Returns None if no exact prescaler exists.
    pub fn from_bitrate(clock: Hertz, bitrate: Hertz) -> Option<Self> {
        if bitrate.0 == 0 {
            return None;
        }

        (Self::MIN_QUANTA..=Self::MAX_QUANTA).rev().find_map(|quanta| {
            let divisor = bitrate.0.checked_mul(quanta)?;
            if clock.0 % divisor != 0 {
                return None;
            }

            let prescaler = clock.0 / divisor;
            if !(1..=1024).contains(&prescaler) {
                return None;
            }

            // Quanta up to and including the sample point
            let sample = (quanta * 7 + 4) / 8;

            Some(Self {
                seg1: Segment1::from_quanta((sample - 1) as u8)?,
                seg2: Segment2::from_quanta((quanta - sample) as u8)?,
                sjw: SyncJumpWidth::Tq1,
                prescaler: prescaler as u16,
                mode: TestMode::Normal,
            })
        })
    }

    /// Encodes the bit timing to BTR:
    /// `(mode << 30) | (sjw << 24) | (bs1 << 16) | (bs2 << 20) | (prescaler - 1)`
    pub fn as_register(&self) -> u32 {
        debug_assert!((1..=1024).contains(&self.prescaler), "Prescaler out of range");

        BitTimingReg::new()
            .with_mode(self.mode as u8)
            .with_sjw(self.sjw as u8)
            .with_ts1(self.seg1 as u8)
            .with_ts2(self.seg2 as u8)
            .with_brp(self.prescaler.wrapping_sub(1) & 0x3FF)
            .into()
    }

    /// Maps BTR register value to bit timing
    pub fn from_register(register: u32) -> Self {
        let btr = BitTimingReg::from(register);

        Self {
            seg1: Segment1::from_register(btr.ts1()),
            seg2: Segment2::from_register(btr.ts2()),
            sjw: SyncJumpWidth::from_register(btr.sjw()),
            prescaler: btr.brp() + 1,
            mode: TestMode::from_register(btr.mode()),
        }
    }
}

/// Operating test mode, BTR bits 31 (SILM) and 30 (LBKM)
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TestMode {
    Normal = 0b00,
    LoopBack = 0b01,
    Silent = 0b10,
    SilentLoopBack = 0b11,
}

impl Default for TestMode {
    fn default() -> Self {
        Self::Normal
    }
}

impl TestMode {
    pub(crate) fn from_register(bits: u8) -> Self {
        match bits & 0b11 {
            0b00 => Self::Normal,
            0b01 => Self::LoopBack,
            0b10 => Self::Silent,
            _ => Self::SilentLoopBack,
        }
    }
}

/// Resynchronization jump width in time quanta
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SyncJumpWidth {
    Tq1 = 0,
    Tq2 = 1,
    Tq3 = 2,
    Tq4 = 3,
}

impl SyncJumpWidth {
    pub(crate) fn from_register(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Self::Tq1,
            1 => Self::Tq2,
            2 => Self::Tq3,
            _ => Self::Tq4,
        }
    }
}

/// Length of bit segment 1 in time quanta
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Segment1 {
    Tq1 = 0,
    Tq2 = 1,
    Tq3 = 2,
    Tq4 = 3,
    Tq5 = 4,
    Tq6 = 5,
    Tq7 = 6,
    Tq8 = 7,
    Tq9 = 8,
    Tq10 = 9,
    Tq11 = 10,
    Tq12 = 11,
    Tq13 = 12,
    Tq14 = 13,
    Tq15 = 14,
    Tq16 = 15,
}

impl Segment1 {
    /// Returns the segment for the given number of time quanta (1-16)
    pub fn from_quanta(quanta: u8) -> Option<Self> {
        match quanta {
            1..=16 => Some(Self::from_register(quanta - 1)),
            _ => None,
        }
    }

    pub(crate) fn from_register(bits: u8) -> Self {
        match bits & 0xF {
            0 => Self::Tq1,
            1 => Self::Tq2,
            2 => Self::Tq3,
            3 => Self::Tq4,
            4 => Self::Tq5,
            5 => Self::Tq6,
            6 => Self::Tq7,
            7 => Self::Tq8,
            8 => Self::Tq9,
            9 => Self::Tq10,
            10 => Self::Tq11,
            11 => Self::Tq12,
            12 => Self::Tq13,
            13 => Self::Tq14,
            14 => Self::Tq15,
            _ => Self::Tq16,
        }
    }
}

/// Length of bit segment 2 in time quanta
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Segment2 {
    Tq1 = 0,
    Tq2 = 1,
    Tq3 = 2,
    Tq4 = 3,
    Tq5 = 4,
    Tq6 = 5,
    Tq7 = 6,
    Tq8 = 7,
}

impl Segment2 {
    /// Returns the segment for the given number of time quanta (1-8)
    pub fn from_quanta(quanta: u8) -> Option<Self> {
        match quanta {
            1..=8 => Some(Self::from_register(quanta - 1)),
            _ => None,
        }
    }

    pub(crate) fn from_register(bits: u8) -> Self {
        match bits & 0b111 {
            0 => Self::Tq1,
            1 => Self::Tq2,
            2 => Self::Tq3,
            3 => Self::Tq4,
            4 => Self::Tq5,
            5 => Self::Tq6,
            6 => Self::Tq7,
            _ => Self::Tq8,
        }
    }
}

/// Automatic management options, one MCR bit each
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct ControllerFlags {
    /// Time triggered communication mode (TTCM)
    pub time_triggered: bool,
    /// Automatic bus-off recovery (ABOM)
    pub auto_bus_off: bool,
    /// Automatic wake-up on bus activity (AWUM)
    pub auto_wake_up: bool,
    /// Disables automatic retransmission (NART)
    pub no_auto_retransmission: bool,
    /// Receive FIFO locked against overrun (RFLM)
    pub rx_fifo_locked: bool,
    /// Transmit priority by request order instead of identifier (TXFP)
    pub tx_fifo_priority: bool,
}

impl ControllerFlags {
    /// Writes the flags into the given MCR value, other bits are kept
    pub(crate) fn apply(&self, register: u32) -> u32 {
        MasterControlReg::from(register)
            .with_ttcm(self.time_triggered)
            .with_abom(self.auto_bus_off)
            .with_awum(self.auto_wake_up)
            .with_nart(self.no_auto_retransmission)
            .with_rflm(self.rx_fifo_locked)
            .with_txfp(self.tx_fifo_priority)
            .into()
    }

    /// Maps MCR register value to flags
    pub fn from_register(register: u32) -> Self {
        let mcr = MasterControlReg::from(register);

        Self {
            time_triggered: mcr.ttcm(),
            auto_bus_off: mcr.abom(),
            auto_wake_up: mcr.awum(),
            no_auto_retransmission: mcr.nart(),
            rx_fifo_locked: mcr.rflm(),
            tx_fifo_priority: mcr.txfp(),
        }
    }
}

/// Interrupt sources enabled in IER
#[derive(Default, Copy, Clone, Debug, PartialEq)]
pub struct Interrupts {
    pub sleep: bool,
    pub wake_up: bool,
    pub error: bool,
    pub last_error_code: bool,
    pub bus_off: bool,
    pub error_passive: bool,
    pub error_warning: bool,
    pub fifo1_overrun: bool,
    pub fifo1_full: bool,
    pub fifo1_pending: bool,
    pub fifo0_overrun: bool,
    pub fifo0_full: bool,
    pub fifo0_pending: bool,
    pub tx_mailbox_empty: bool,
}

impl Interrupts {
    /// Encodes the interrupt selection to IER
    pub(crate) fn as_register(&self) -> u32 {
        InterruptEnableReg::new()
            .with_slkie(self.sleep)
            .with_wkuie(self.wake_up)
            .with_errie(self.error)
            .with_lecie(self.last_error_code)
            .with_bofie(self.bus_off)
            .with_epvie(self.error_passive)
            .with_ewgie(self.error_warning)
            .with_fovie1(self.fifo1_overrun)
            .with_ffie1(self.fifo1_full)
            .with_fmpie1(self.fifo1_pending)
            .with_fovie0(self.fifo0_overrun)
            .with_ffie0(self.fifo0_full)
            .with_fmpie0(self.fifo0_pending)
            .with_tmeie(self.tx_mailbox_empty)
            .into()
    }
}
