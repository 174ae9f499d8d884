use crate::peripheral::RegisterAccess;
use crate::registers::{REGISTER_BTR, REGISTER_FMR, REGISTER_MCR, REGISTER_MSR, REGISTER_RF0R, REGISTER_TSR};
use mockall::mock;
use std::collections::BTreeMap;

mock! {
    pub Registers {}

    impl RegisterAccess for Registers {
        fn read(&mut self, offset: u16) -> u32;
        fn write(&mut self, offset: u16, value: u32);
    }
}

const MCR: u16 = REGISTER_MCR;
const MSR: u16 = REGISTER_MSR;
const TSR: u16 = REGISTER_TSR;
const RF0R: u16 = REGISTER_RF0R;
const RF1R: u16 = REGISTER_RF0R + 4;
const BTR: u16 = REGISTER_BTR;
const FMR: u16 = REGISTER_FMR;

/// Register file simulating the INRQ/INAK and SLEEP/SLAK handshakes
#[derive(Debug)]
pub struct SimulatedCan {
    pub registers: BTreeMap<u16, u32>,

    /// Number of MSR reads until a requested mode is acknowledged, None => never
    pub ack_after: Option<u32>,

    /// Total number of MSR reads
    pub status_reads: u32,

    /// MSR reads since the last mode request was seen
    pending_reads: u32,
}

impl SimulatedCan {
    pub fn new(ack_after: Option<u32>) -> Self {
        let mut can = Self {
            registers: BTreeMap::new(),
            ack_after,
            status_reads: 0,
            pending_reads: 0,
        };
        can.reset();
        can
    }

    /// Register value, zero if never written
    pub fn get(&self, offset: u16) -> u32 {
        self.registers.get(&offset).copied().unwrap_or(0)
    }

    pub fn set(&mut self, offset: u16, value: u32) {
        self.registers.insert(offset, value);
    }

    fn reset(&mut self) {
        self.registers.clear();
        self.set(MCR, 0x0001_0002);
        self.set(MSR, 0x0000_0C02);
        self.set(TSR, 0x1C00_0000);
        self.set(BTR, 0x0123_0000);
        self.set(FMR, 0x2A1C_0E01);
    }

    fn read_status(&mut self) -> u32 {
        self.status_reads += 1;

        let mcr = self.get(MCR);
        let inak = mcr & 0b01;
        let slak = if inak == 0 { mcr & 0b10 } else { 0 };
        let target = inak | slak;

        let msr = self.get(MSR);
        if msr & 0b11 != target {
            self.pending_reads += 1;

            if let Some(ack_after) = self.ack_after {
                if self.pending_reads >= ack_after {
                    self.set(MSR, (msr & !0b11) | target);
                    self.pending_reads = 0;
                }
            }
        }

        self.get(MSR)
    }
}

impl RegisterAccess for SimulatedCan {
    fn read(&mut self, offset: u16) -> u32 {
        match offset {
            MSR => self.read_status(),
            _ => self.get(offset),
        }
    }

    fn write(&mut self, offset: u16, value: u32) {
        match offset {
            MCR if value & (1 << 15) != 0 => self.reset(),
            MCR => {
                self.pending_reads = 0;
                self.set(MCR, value);
            }
            // RQCP, TXOK, ALST and TERR are cleared by writing one, ABRQ is ignored
            TSR => {
                let tsr = self.get(TSR);
                self.set(TSR, tsr & !(value & 0x000F_0F0F));
            }
            // SLAKI, WKUI and ERRI are cleared by writing one
            MSR => {
                let msr = self.get(MSR);
                self.set(MSR, msr & !(value & 0b1_1100));
            }
            // FULL and FOVR are cleared by writing one, releasing the output mailbox frees a slot
            RF0R | RF1R => {
                let mut rfr = self.get(offset) & !(value & 0b1_1000);

                if value & (1 << 5) != 0 {
                    rfr = (rfr & !0b1011) | (rfr & 0b11).saturating_sub(1);
                }

                self.set(offset, rfr);
            }
            _ => self.set(offset, value),
        }
    }
}
