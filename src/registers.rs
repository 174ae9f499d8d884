#![allow(unused_braces)]
use byteorder::{BigEndian, ByteOrder};
use modular_bitfield_msb::prelude::*;

pub(crate) const REGISTER_MCR: u16 = 0x000;
pub(crate) const REGISTER_MSR: u16 = 0x004;
pub(crate) const REGISTER_TSR: u16 = 0x008;
pub(crate) const REGISTER_RF0R: u16 = 0x00C;
pub(crate) const REGISTER_IER: u16 = 0x014;
pub(crate) const REGISTER_ESR: u16 = 0x018;
pub(crate) const REGISTER_BTR: u16 = 0x01C;

pub(crate) const REGISTER_FMR: u16 = 0x200;
pub(crate) const REGISTER_FM1R: u16 = 0x204;
pub(crate) const REGISTER_FS1R: u16 = 0x20C;
pub(crate) const REGISTER_FFA1R: u16 = 0x214;
pub(crate) const REGISTER_FA1R: u16 = 0x21C;

/// Filter init mode bit of FMR
pub(crate) const FMR_FINIT: u32 = 1;

/// Transmit request bit of TIR
pub(crate) const TIR_TXRQ: u32 = 1;

/// TSR request completed bit of mailbox 0, shifted by 8 per mailbox
pub(crate) const TSR_RQCP0: u32 = 1 << 0;
/// TSR request completed bits of all mailboxes
pub(crate) const TSR_RQCP_ALL: u32 = TSR_RQCP0 | (TSR_RQCP0 << 8) | (TSR_RQCP0 << 16);
/// TSR transmission OK bit of mailbox 0, shifted by 8 per mailbox
pub(crate) const TSR_TXOK0: u32 = 1 << 1;
/// TSR abort request bit of mailbox 0, shifted by 8 per mailbox
pub(crate) const TSR_ABRQ0: u32 = 1 << 7;
/// TSR transmit mailbox empty bit of mailbox 0, shifted by 1 per mailbox
pub(crate) const TSR_TME0: u32 = 1 << 26;

/// Implements the conversion between raw register words and bitfields.
/// Bitfields are MSB first, so the byte stream maps to big endian words.
macro_rules! register_word {
    ($($reg:ident),+) => {
        $(
            impl From<u32> for $reg {
                fn from(value: u32) -> Self {
                    let mut bytes = [0u8; 4];
                    BigEndian::write_u32(&mut bytes, value);
                    Self::from_bytes(bytes)
                }
            }

            impl From<$reg> for u32 {
                fn from(register: $reg) -> Self {
                    BigEndian::read_u32(&register.into_bytes())
                }
            }
        )+
    };
}

register_word!(MasterControlReg, MasterStatusReg, BitTimingReg, ErrorStatusReg, InterruptEnableReg);
register_word!(IdentifierReg, TxDataLengthReg, RxDataLengthReg, RxFifoReg);

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Master control register (MCR)
pub struct MasterControlReg {
    #[skip]
    __: B15,
    /// Debug freeze
    pub dbf: bool,
    /// Software master reset
    pub reset: bool,
    #[skip]
    __: B7,
    /// Time triggered communication mode
    pub ttcm: bool,
    /// Automatic bus-off management
    pub abom: bool,
    /// Automatic wakeup mode
    pub awum: bool,
    /// No automatic retransmission
    pub nart: bool,
    /// Receive FIFO locked mode
    pub rflm: bool,
    /// Transmit FIFO priority
    pub txfp: bool,
    /// Sleep mode request
    pub sleep: bool,
    /// Initialization request
    pub inrq: bool,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Master status register (MSR)
pub struct MasterStatusReg {
    #[skip]
    __: B20,
    /// CAN RX signal
    pub rx: bool,
    /// Last sample point
    pub samp: bool,
    /// Receive mode
    pub rxm: bool,
    /// Transmit mode
    pub txm: bool,
    #[skip]
    __: B3,
    /// Sleep acknowledge interrupt
    pub slaki: bool,
    /// Wakeup interrupt
    pub wkui: bool,
    /// Error interrupt
    pub erri: bool,
    /// Sleep acknowledge
    pub slak: bool,
    /// Initialization acknowledge
    pub inak: bool,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Bit timing register (BTR)
pub struct BitTimingReg {
    /// Silent and loop back mode bits
    pub mode: B2,
    #[skip]
    __: B4,
    /// Resynchronization jump width
    pub sjw: B2,
    #[skip]
    __: B1,
    /// Time segment 2
    pub ts2: B3,
    /// Time segment 1
    pub ts1: B4,
    #[skip]
    __: B6,
    /// Baud rate prescaler
    pub brp: B10,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Error status register (ESR)
pub struct ErrorStatusReg {
    /// Receive error counter
    pub rec: u8,
    /// Least significant byte of the transmit error counter
    pub tec: u8,
    #[skip]
    __: B9,
    /// Last error code
    pub lec: B3,
    #[skip]
    __: B1,
    /// Bus-off flag
    pub boff: bool,
    /// Error passive flag
    pub epvf: bool,
    /// Error warning flag
    pub ewgf: bool,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Interrupt enable register (IER)
pub struct InterruptEnableReg {
    #[skip]
    __: B14,
    pub slkie: bool,
    pub wkuie: bool,
    pub errie: bool,
    #[skip]
    __: B3,
    pub lecie: bool,
    pub bofie: bool,
    pub epvie: bool,
    pub ewgie: bool,
    #[skip]
    __: B1,
    pub fovie1: bool,
    pub ffie1: bool,
    pub fmpie1: bool,
    pub fovie0: bool,
    pub ffie0: bool,
    pub fmpie0: bool,
    pub tmeie: bool,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Mailbox identifier register (TIxR/RIxR)
pub struct IdentifierReg {
    /// Standard identifier or 11 msb of extended identifier
    pub stid: B11,
    /// 18 lsb of extended identifier
    pub exid: B18,
    /// Identifier extension
    pub ide: bool,
    /// Remote transmission request
    pub rtr: bool,
    /// Transmit request (TX only)
    pub txrq: bool,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Mailbox data length control and time stamp register (TDTxR)
pub struct TxDataLengthReg {
    /// Message time stamp
    pub time: u16,
    #[skip]
    __: B7,
    /// Transmit global time
    pub tgt: bool,
    #[skip]
    __: B4,
    /// Data length code
    pub dlc: B4,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Receive FIFO mailbox data length control and time stamp register (RDTxR)
pub struct RxDataLengthReg {
    /// Message time stamp
    pub time: u16,
    /// Filter match index
    pub fmi: u8,
    #[skip]
    __: B4,
    /// Data length code
    pub dlc: B4,
}

#[bitfield]
#[derive(Default, Copy, Clone, Debug)]
/// Receive FIFO register (RF0R/RF1R)
pub struct RxFifoReg {
    #[skip]
    __: B26,
    /// Release FIFO output mailbox
    pub rfom: bool,
    /// FIFO overrun
    pub fovr: bool,
    /// FIFO full
    pub full: bool,
    #[skip]
    __: B1,
    /// Number of pending messages
    pub fmp: B2,
}

/// Identifier register address of the given TX mailbox
pub(crate) fn tx_identifier_register(mailbox: u8) -> u16 {
    0x180 + 0x10 * mailbox as u16
}

/// Data length and time stamp register address of the given TX mailbox
pub(crate) fn tx_data_length_register(mailbox: u8) -> u16 {
    0x184 + 0x10 * mailbox as u16
}

/// Low data register address of the given TX mailbox
pub(crate) fn tx_data_low_register(mailbox: u8) -> u16 {
    0x188 + 0x10 * mailbox as u16
}

/// High data register address of the given TX mailbox
pub(crate) fn tx_data_high_register(mailbox: u8) -> u16 {
    0x18C + 0x10 * mailbox as u16
}

/// Identifier register address of the given RX FIFO output mailbox
pub(crate) fn rx_identifier_register(fifo: u8) -> u16 {
    0x1B0 + 0x10 * fifo as u16
}

pub(crate) fn rx_data_length_register(fifo: u8) -> u16 {
    0x1B4 + 0x10 * fifo as u16
}

pub(crate) fn rx_data_low_register(fifo: u8) -> u16 {
    0x1B8 + 0x10 * fifo as u16
}

pub(crate) fn rx_data_high_register(fifo: u8) -> u16 {
    0x1BC + 0x10 * fifo as u16
}

/// RF0R or RF1R address
pub(crate) fn rx_fifo_register(fifo: u8) -> u16 {
    REGISTER_RF0R + 4 * fifo as u16
}

/// First filter register (FR1) of the given bank
pub(crate) fn filter_register_1(bank: u8) -> u16 {
    0x240 + 8 * bank as u16
}

/// Second filter register (FR2) of the given bank
pub(crate) fn filter_register_2(bank: u8) -> u16 {
    0x244 + 8 * bank as u16
}
