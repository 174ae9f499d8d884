//!# CAN Filter
//! A [FilterBank] describes one of the 14 acceptance filter banks. Each bank either holds a single
//! 32-bit filter or two 16-bit filters, used in identifier/mask or identifier list mode.
//!
//! ```
//!# use stm32f37x_can::filter::{Fifo, FilterBank, FilterScale};
//!# use embedded_can::{Id, ExtendedId, StandardId};
//!
//! // Accept extended identifiers whose upper byte is 0xC6, store them in FIFO 1
//! let id = Id::Extended(ExtendedId::new(0xC672).unwrap());
//! let bank = FilterBank::mask32(2, id, 0xFF00, Fifo::Fifo1);
//! assert_eq!(FilterScale::Single32, bank.scale);
//!
//! // Accept four standard identifiers in bank 3
//! let ids = [0x100, 0x101, 0x200, 0x7FF].map(|raw| StandardId::new(raw).unwrap());
//! let bank = FilterBank::list16(3, ids, Fifo::Fifo0);
//! assert_eq!((0x2020_2000, 0xFFE0_4000), bank.as_registers());
//! ```
use crate::registers::IdentifierReg;
use embedded_can::{Id, StandardId};

/// Number of filter banks of the peripheral
pub const FILTER_BANKS: u8 = 14;

pub const STANDARD_IDENTIFIER_MASK: u16 = 0x7FF;

pub const EXTENDED_IDENTIFIER_MASK: u32 = 0x3FFFF;

/// Receive FIFO
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Fifo {
    Fifo0 = 0,
    Fifo1 = 1,
}

/// Width of the filters inside a bank (FS1R)
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FilterScale {
    /// Two 16-bit filters sharing the bank
    Dual16,
    /// One 32-bit filter occupying the whole bank
    Single32,
}

/// Matching mode of a bank (FM1R)
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum FilterMode {
    /// Identifier with mask
    IdMask,
    /// List of identifiers, matched exactly
    IdList,
}

/// Configuration of a single filter bank
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FilterBank {
    /// Bank index (0-13)
    pub index: u8,
    pub scale: FilterScale,
    pub mode: FilterMode,
    /// FIFO receiving the matching frames
    pub fifo: Fifo,
    /// Activate the bank after programming
    pub active: bool,
    pub id_high: u16,
    pub id_low: u16,
    pub mask_id_high: u16,
    pub mask_id_low: u16,
}

impl FilterBank {
    /// 32-bit mask filter with an all zero mask, so every frame matches
    pub fn accept_all(index: u8, fifo: Fifo) -> Self {
        Self::from_words(index, FilterScale::Single32, FilterMode::IdMask, fifo, 0, 0)
    }

    /// 32-bit filter matching the given identifier exactly, including RTR frames
    pub fn exact(index: u8, identifier: Id, fifo: Fifo) -> Self {
        Self::from_words(
            index,
            FilterScale::Single32,
            FilterMode::IdList,
            fifo,
            filter_word(identifier, false),
            filter_word(identifier, true),
        )
    }

    /// 32-bit mask filter. Only identifier bits set in `mask` must match,
    /// the mask is interpreted in the format (standard/extended) of `identifier`.
    /// The identifier format itself always has to match.
    pub fn mask32(index: u8, identifier: Id, mask: u32, fifo: Fifo) -> Self {
        let mask_register = match identifier {
            Id::Standard(_) => IdentifierReg::new().with_stid(mask as u16 & STANDARD_IDENTIFIER_MASK),
            Id::Extended(_) => IdentifierReg::new()
                .with_exid(mask & EXTENDED_IDENTIFIER_MASK)
                .with_stid((mask >> 18) as u16 & STANDARD_IDENTIFIER_MASK),
        };

        let mask_word = u32::from(mask_register.with_ide(true));

        Self::from_words(
            index,
            FilterScale::Single32,
            FilterMode::IdMask,
            fifo,
            filter_word(identifier, false),
            mask_word,
        )
    }

    /// 32-bit list filter accepting two identifiers
    pub fn list32(index: u8, identifiers: [Id; 2], fifo: Fifo) -> Self {
        Self::from_words(
            index,
            FilterScale::Single32,
            FilterMode::IdList,
            fifo,
            filter_word(identifiers[0], false),
            filter_word(identifiers[1], false),
        )
    }

    /// Two 16-bit mask filters for standard identifiers, given as (identifier, mask) pairs
    pub fn mask16(index: u8, filters: [(StandardId, u16); 2], fifo: Fifo) -> Self {
        let [(id_low, mask_low), (id_high, mask_high)] = filters;

        Self {
            index,
            scale: FilterScale::Dual16,
            mode: FilterMode::IdMask,
            fifo,
            active: true,
            id_high: filter_half_word(id_high.as_raw()),
            id_low: filter_half_word(id_low.as_raw()),
            // IDE bit is part of the mask so extended frames are rejected
            mask_id_high: filter_half_word(mask_high & STANDARD_IDENTIFIER_MASK) | (1 << 3),
            mask_id_low: filter_half_word(mask_low & STANDARD_IDENTIFIER_MASK) | (1 << 3),
        }
    }

    /// Two 16-bit list filters accepting four standard identifiers
    pub fn list16(index: u8, identifiers: [StandardId; 4], fifo: Fifo) -> Self {
        let [first, second, third, fourth] = identifiers.map(|id| filter_half_word(id.as_raw()));

        Self {
            index,
            scale: FilterScale::Dual16,
            mode: FilterMode::IdList,
            fifo,
            active: true,
            id_low: first,
            mask_id_low: second,
            id_high: third,
            mask_id_high: fourth,
        }
    }

    /// Leaves the bank deactivated after programming
    pub fn inactive(mut self) -> Self {
        self.active = false;
        self
    }

    /// Returns the FR1 and FR2 register values of the bank
    pub fn as_registers(&self) -> (u32, u32) {
        match self.scale {
            FilterScale::Dual16 => (
                (self.mask_id_low as u32) << 16 | self.id_low as u32,
                (self.mask_id_high as u32) << 16 | self.id_high as u32,
            ),
            FilterScale::Single32 => (
                (self.id_high as u32) << 16 | self.id_low as u32,
                (self.mask_id_high as u32) << 16 | self.mask_id_low as u32,
            ),
        }
    }

    fn from_words(index: u8, scale: FilterScale, mode: FilterMode, fifo: Fifo, first: u32, second: u32) -> Self {
        Self {
            index,
            scale,
            mode,
            fifo,
            active: true,
            id_high: (first >> 16) as u16,
            id_low: first as u16,
            mask_id_high: (second >> 16) as u16,
            mask_id_low: second as u16,
        }
    }
}

/// Identifier register layout shared by mailboxes and 32-bit filters
pub(crate) fn identifier_register(identifier: Id) -> IdentifierReg {
    match identifier {
        Id::Standard(sid) => IdentifierReg::new().with_stid(sid.as_raw()),
        Id::Extended(eid) => IdentifierReg::new()
            .with_ide(true)
            .with_exid(eid.as_raw() & EXTENDED_IDENTIFIER_MASK)
            .with_stid((eid.as_raw() >> 18) as u16 & STANDARD_IDENTIFIER_MASK),
    }
}

/// 32-bit filter word of the given identifier
fn filter_word(identifier: Id, remote: bool) -> u32 {
    identifier_register(identifier).with_rtr(remote).into()
}

/// 16-bit filter layout: STID[15:5] RTR[4] IDE[3] EXID[17:15][2:0]
fn filter_half_word(standard_id: u16) -> u16 {
    (standard_id & STANDARD_IDENTIFIER_MASK) << 5
}
