//!# Register access
//! The controller never touches memory directly. All accesses go through [RegisterAccess], which is
//! implemented by [MemoryMapped] for real hardware and by simulated register files in tests.
//!
//! ```no_run
//!# use stm32f37x_can::can::Controller;
//!# use stm32f37x_can::peripheral::{MemoryMapped, CAN1_BASE};
//!#
//! // Safety: CAN1 clock is enabled and no other handle to the peripheral exists
//! let registers = unsafe { MemoryMapped::new(CAN1_BASE) };
//! let controller = Controller::new(registers);
//! ```
use core::ptr;

/// Base address of the CAN1 peripheral on STM32F37x devices
pub const CAN1_BASE: usize = 0x4000_6400;

/// 32-bit register access relative to the peripheral base address
pub trait RegisterAccess {
    /// Reads the register at the given byte offset
    fn read(&mut self, offset: u16) -> u32;

    /// Writes the register at the given byte offset
    fn write(&mut self, offset: u16, value: u32);
}

/// Volatile access to a memory mapped register block
#[derive(Debug)]
pub struct MemoryMapped {
    base: *mut u32,
}

impl MemoryMapped {
    /// Creates a new handle for the register block at `base`
    ///
    /// # Safety
    ///
    /// `base` must point to a bxCAN register block and the returned handle must be
    /// the only one in use for that block.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base: base as *mut u32 }
    }
}

impl RegisterAccess for MemoryMapped {
    fn read(&mut self, offset: u16) -> u32 {
        // Safety: guaranteed by the contract of new()
        unsafe { ptr::read_volatile(self.base.add(offset as usize / 4)) }
    }

    fn write(&mut self, offset: u16, value: u32) {
        // Safety: guaranteed by the contract of new()
        unsafe { ptr::write_volatile(self.base.add(offset as usize / 4), value) }
    }
}
