//! # Dummy register file for doc examples
//!
//! Acknowledges every mode request on the first status read and starts with the
//! reset values of the peripheral.
use crate::peripheral::RegisterAccess;

/// Size of the simulated register block in bytes (up to the last filter bank)
const BLOCK_SIZE: usize = 0x320;

#[derive(Debug)]
pub struct ExampleRegisters {
    words: [u32; BLOCK_SIZE / 4],
}

impl Default for ExampleRegisters {
    fn default() -> Self {
        let mut registers = Self {
            words: [0; BLOCK_SIZE / 4],
        };

        // MCR: debug freeze and sleep request
        registers.words[0x000 / 4] = 0x0001_0002;
        // MSR: sleep acknowledge, RX and SAMP high
        registers.words[0x004 / 4] = 0x0000_0C02;
        // TSR: all mailboxes empty
        registers.words[0x008 / 4] = 0x1C00_0000;
        registers.words[0x01C / 4] = 0x0123_0000;
        registers.words[0x200 / 4] = 0x2A1C_0E01;

        registers
    }
}

impl RegisterAccess for ExampleRegisters {
    fn read(&mut self, offset: u16) -> u32 {
        if offset == 0x004 {
            let mcr = self.words[0];
            let inak = mcr & 0b01;
            let slak = if inak == 0 { mcr & 0b10 } else { 0 };

            self.words[1] = (self.words[1] & !0b11) | inak | slak;
        }

        self.words[offset as usize / 4]
    }

    fn write(&mut self, offset: u16, value: u32) {
        self.words[offset as usize / 4] = value;
    }
}
