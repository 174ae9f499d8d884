//!# CAN Frame
//! Classic CAN 2.0 frame with up to 8 data bytes, standard or extended identifier.
//!
//! ```
//!# use stm32f37x_can::frame::CanFrame;
//!# use embedded_can::{Frame, Id, StandardId};
//!
//! let frame = CanFrame::new(StandardId::new(0x123).unwrap(), &[0x1, 0x2, 0x3]).unwrap();
//!
//! assert_eq!(3, frame.dlc());
//! assert_eq!(&[0x1, 0x2, 0x3], frame.data());
//! assert!(CanFrame::new(StandardId::new(0x123).unwrap(), &[0u8; 9]).is_none());
//! ```
use crate::filter::{identifier_register, Fifo, EXTENDED_IDENTIFIER_MASK};
use crate::registers::{IdentifierReg, RxDataLengthReg, TxDataLengthReg};
use byteorder::{ByteOrder, LittleEndian};
use embedded_can::{ExtendedId, Frame, Id, StandardId};

/// Maximum number of data bytes of a classic CAN frame
pub const MAX_PAYLOAD: usize = 8;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct CanFrame {
    pub identifier: Id,
    pub rtr: bool,
    pub dlc: usize,
    pub data: [u8; MAX_PAYLOAD],
}

impl Frame for CanFrame {
    fn new(id: impl Into<Id>, data: &[u8]) -> Option<Self> {
        if data.len() > MAX_PAYLOAD {
            return None;
        }

        let mut frame = CanFrame {
            identifier: id.into(),
            rtr: false,
            dlc: data.len(),
            data: [0; MAX_PAYLOAD],
        };
        frame.data[..data.len()].copy_from_slice(data);
        Some(frame)
    }

    fn new_remote(id: impl Into<Id>, dlc: usize) -> Option<Self> {
        if dlc > MAX_PAYLOAD {
            return None;
        }

        Some(CanFrame {
            identifier: id.into(),
            rtr: true,
            dlc,
            data: [0; MAX_PAYLOAD],
        })
    }

    fn is_extended(&self) -> bool {
        matches!(self.identifier, Id::Extended(_))
    }

    fn is_remote_frame(&self) -> bool {
        self.rtr
    }

    fn id(&self) -> Id {
        self.identifier
    }

    fn dlc(&self) -> usize {
        self.dlc
    }

    fn data(&self) -> &[u8] {
        if self.rtr {
            return &[];
        }

        &self.data[..self.dlc.min(MAX_PAYLOAD)]
    }
}

impl CanFrame {
    /// Identifier register value without transmit request
    pub(crate) fn identifier_register(&self) -> u32 {
        identifier_register(self.identifier).with_rtr(self.rtr).into()
    }

    /// Applies the data length code to the given TDTR value
    pub(crate) fn data_length_register(&self, register: u32) -> u32 {
        TxDataLengthReg::from(register)
            .with_dlc(self.dlc.min(MAX_PAYLOAD) as u8)
            .into()
    }

    /// Data words for TDLR and TDHR
    pub(crate) fn data_registers(&self) -> (u32, u32) {
        (
            LittleEndian::read_u32(&self.data[..4]),
            LittleEndian::read_u32(&self.data[4..]),
        )
    }

    /// Decodes the content of a FIFO output mailbox
    pub(crate) fn from_registers(identifier: u32, data_length: u32, low: u32, high: u32) -> Self {
        let rir = IdentifierReg::from(identifier);
        let rdtr = RxDataLengthReg::from(data_length);

        let identifier = if rir.ide() {
            let raw = (rir.stid() as u32) << 18 | (rir.exid() & EXTENDED_IDENTIFIER_MASK);
            Id::Extended(ExtendedId::new(raw).unwrap_or(ExtendedId::ZERO))
        } else {
            Id::Standard(StandardId::new(rir.stid()).unwrap_or(StandardId::ZERO))
        };

        let mut data = [0u8; MAX_PAYLOAD];
        LittleEndian::write_u32(&mut data[..4], low);
        LittleEndian::write_u32(&mut data[4..], high);

        Self {
            identifier,
            rtr: rir.rtr(),
            // DLC values above 8 are treated as 8 by the hardware
            dlc: (rdtr.dlc() as usize).min(MAX_PAYLOAD),
            data,
        }
    }
}

/// Frame read from a receive FIFO
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ReceivedFrame {
    pub frame: CanFrame,
    /// FIFO the frame was read from
    pub fifo: Fifo,
    /// Index of the filter that accepted the frame
    pub filter_match_index: u8,
    /// Time stamp captured at start of frame reception
    pub timestamp: u16,
}

impl ReceivedFrame {
    pub(crate) fn from_registers(fifo: Fifo, identifier: u32, data_length: u32, low: u32, high: u32) -> Self {
        let rdtr = RxDataLengthReg::from(data_length);

        Self {
            frame: CanFrame::from_registers(identifier, data_length, low, high),
            fifo,
            filter_match_index: rdtr.fmi(),
            timestamp: rdtr.time(),
        }
    }
}
