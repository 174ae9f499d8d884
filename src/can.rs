//!# CAN Controller device
//!
//!```
//!# use stm32f37x_can::can::Controller;
//!# use stm32f37x_can::config::Configuration;
//!# use stm32f37x_can::example::ExampleRegisters;
//!#
//! let registers = ExampleRegisters::default();
//!
//! // Initialize controller object
//! let mut can_controller = Controller::new(registers);
//!
//! // Use default configuration settings
//! let can_config = Configuration::default();
//!
//! // Configure CAN controller
//! can_controller.initialize(&can_config).unwrap();
//! ```

use crate::config::{BitTiming, Configuration, ControllerFlags, Interrupts};
use crate::filter::{Fifo, FilterBank, FilterMode, FilterScale, FILTER_BANKS};
use crate::frame::{CanFrame, ReceivedFrame};
use crate::peripheral::RegisterAccess;
use crate::poll::{wait_for, ACK_ATTEMPTS};
use crate::registers::*;
use crate::status::{ErrorStatus, FifoStatus, Flag, Interrupt, OperatingMode, OperationStatus, TransmitStatus};
use log::{debug, trace};

/// Mode transition handshakes between driver and hardware
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Handshake {
    /// INRQ set, waiting for INAK
    EnterInitialization,
    /// INRQ cleared, waiting for INAK to clear
    LeaveInitialization,
    /// SLEEP set, waiting for SLAK
    EnterSleep,
    /// SLEEP cleared, waiting for SLAK to clear
    LeaveSleep,
}

/// Possible CAN errors during Configuration/Transmission/Reception
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CanError {
    /// Hardware did not acknowledge the mode transition within the polling limit
    HandshakeTimeout(Handshake),
    /// All three transmit mailboxes are pending
    NoEmptyMailbox,
    /// RX fifo empty error
    RxFifoEmpty,
    /// Frames were lost because the FIFO was full
    FifoOverrun(Fifo),
}

impl embedded_can::Error for CanError {
    fn kind(&self) -> embedded_can::ErrorKind {
        match self {
            CanError::FifoOverrun(_) => embedded_can::ErrorKind::Overrun,
            _ => embedded_can::ErrorKind::Other,
        }
    }
}

/// Transmit mailbox
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Mailbox {
    Mailbox0 = 0,
    Mailbox1 = 1,
    Mailbox2 = 2,
}

impl Mailbox {
    const ALL: [Mailbox; 3] = [Mailbox::Mailbox0, Mailbox::Mailbox1, Mailbox::Mailbox2];
}

/// Main bxCAN controller device
pub struct Controller<R: RegisterAccess> {
    /// Peripheral register block
    registers: R,

    /// Number of status reads before a handshake is considered timed out
    ack_attempts: u32,
}

/// Trait for CAN controller
pub trait CanController {
    type Error;

    /// Transmit CAN frame, returns the mailbox used
    fn transmit(&mut self, frame: &CanFrame) -> Result<Mailbox, Self::Error>;

    /// Receive CAN frame from the given FIFO
    fn receive(&mut self, fifo: Fifo) -> Result<ReceivedFrame, Self::Error>;

    /// Program the given filter bank
    fn set_filter(&mut self, filter: &FilterBank) -> Result<(), Self::Error>;
}

impl<R: RegisterAccess> CanController for Controller<R> {
    type Error = CanError;

    fn transmit(&mut self, frame: &CanFrame) -> Result<Mailbox, Self::Error> {
        let tsr = self.registers.read(REGISTER_TSR);

        let mailbox = Mailbox::ALL
            .into_iter()
            .find(|mailbox| tsr & (TSR_TME0 << *mailbox as u32) != 0)
            .ok_or(CanError::NoEmptyMailbox)?;

        let index = mailbox as u8;

        // TXRQ is cleared for an empty mailbox, so the identifier can be written as a whole
        self.registers
            .write(tx_identifier_register(index), frame.identifier_register());

        let tdtr = self.registers.read(tx_data_length_register(index));
        self.registers
            .write(tx_data_length_register(index), frame.data_length_register(tdtr));

        let (low, high) = frame.data_registers();
        self.registers.write(tx_data_low_register(index), low);
        self.registers.write(tx_data_high_register(index), high);

        // Request transmission
        self.modify(tx_identifier_register(index), |tir| tir | TIR_TXRQ);

        trace!("Frame {:?} queued in {:?}", frame.identifier, mailbox);
        Ok(mailbox)
    }

    /// An overrun is reported once and cleared, the frames still pending are returned by the following calls.
    fn receive(&mut self, fifo: Fifo) -> Result<ReceivedFrame, Self::Error> {
        let status = self.read_fifo_status(fifo);

        if status.overrun {
            self.clear_flag(Flag::FifoOverrun(fifo));
            debug!("Receive {fifo:?} overrun");
            return Err(CanError::FifoOverrun(fifo));
        }

        if status.pending == 0 {
            return Err(CanError::RxFifoEmpty);
        }

        let index = fifo as u8;
        let frame = ReceivedFrame::from_registers(
            fifo,
            self.registers.read(rx_identifier_register(index)),
            self.registers.read(rx_data_length_register(index)),
            self.registers.read(rx_data_low_register(index)),
            self.registers.read(rx_data_high_register(index)),
        );

        self.release_fifo(fifo);

        Ok(frame)
    }

    fn set_filter(&mut self, filter: &FilterBank) -> Result<(), Self::Error> {
        self.configure_filter(filter);
        Ok(())
    }
}

impl<R: RegisterAccess> Controller<R> {
    pub fn new(registers: R) -> Self {
        Self {
            registers,
            ack_attempts: ACK_ATTEMPTS,
        }
    }

    /// Overrides the number of status reads done while waiting for INAK/SLAK
    pub fn with_ack_attempts(mut self, attempts: u32) -> Self {
        self.ack_attempts = attempts;
        self
    }

    /// Releases the register access handle
    pub fn free(self) -> R {
        self.registers
    }

    /// Brings the controller from reset or sleep into normal operation with the given settings.
    ///
    /// On a timeout while entering initialization mode nothing is programmed and the
    /// initialization request stays asserted. Retrying is left to the caller.
    pub fn initialize(&mut self, config: &Configuration) -> Result<(), CanError> {
        // Exit from sleep mode and request initialization
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_sleep(false).into()
        });
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_inrq(true).into()
        });

        if !self.wait_status(|msr| msr.inak()) {
            return Err(CanError::HandshakeTimeout(Handshake::EnterInitialization));
        }

        self.modify(REGISTER_MCR, |mcr| config.flags.apply(mcr));
        self.registers.write(REGISTER_BTR, config.bit_timing.as_register());

        // Request leave of initialization
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_inrq(false).into()
        });

        if !self.wait_status(|msr| !msr.inak()) {
            return Err(CanError::HandshakeTimeout(Handshake::LeaveInitialization));
        }

        debug!("CAN controller initialized with {:?}", config.bit_timing);
        Ok(())
    }

    /// Programs a single filter bank. Filter init mode is entered for the duration of the call,
    /// which affects all banks.
    pub fn configure_filter(&mut self, filter: &FilterBank) {
        debug_assert!(filter.index < FILTER_BANKS, "Invalid filter bank {}", filter.index);

        let bank_bit = 1u32 << filter.index;

        self.modify(REGISTER_FMR, |fmr| fmr | FMR_FINIT);

        // Deactivate bank while it is modified
        self.modify(REGISTER_FA1R, |fa1r| fa1r & !bank_bit);

        let (first, second) = filter.as_registers();
        match filter.scale {
            FilterScale::Dual16 => self.modify(REGISTER_FS1R, |fs1r| fs1r & !bank_bit),
            FilterScale::Single32 => self.modify(REGISTER_FS1R, |fs1r| fs1r | bank_bit),
        }
        self.registers.write(filter_register_1(filter.index), first);
        self.registers.write(filter_register_2(filter.index), second);

        match filter.mode {
            FilterMode::IdMask => self.modify(REGISTER_FM1R, |fm1r| fm1r & !bank_bit),
            FilterMode::IdList => self.modify(REGISTER_FM1R, |fm1r| fm1r | bank_bit),
        }

        match filter.fifo {
            Fifo::Fifo0 => self.modify(REGISTER_FFA1R, |ffa1r| ffa1r & !bank_bit),
            Fifo::Fifo1 => self.modify(REGISTER_FFA1R, |ffa1r| ffa1r | bank_bit),
        }

        if filter.active {
            self.modify(REGISTER_FA1R, |fa1r| fa1r | bank_bit);
        }

        self.modify(REGISTER_FMR, |fmr| fmr & !FMR_FINIT);

        trace!("Filter bank {} configured: {:?}", filter.index, filter);
    }

    /// Requests the given operating mode and waits for the hardware to acknowledge it
    pub fn request_mode(&mut self, mode: OperatingMode) -> Result<(), CanError> {
        let (inrq, sleep) = match mode {
            OperatingMode::Initialization => (true, false),
            OperatingMode::Normal => (false, false),
            OperatingMode::Sleep => (false, true),
        };

        let previous = MasterControlReg::from(self.registers.read(REGISTER_MCR));
        self.registers
            .write(REGISTER_MCR, previous.with_inrq(inrq).with_sleep(sleep).into());

        if !self.wait_status(|msr| msr.inak() == inrq && msr.slak() == sleep) {
            let handshake = match mode {
                OperatingMode::Initialization => Handshake::EnterInitialization,
                OperatingMode::Normal if previous.sleep() => Handshake::LeaveSleep,
                OperatingMode::Normal => Handshake::LeaveInitialization,
                OperatingMode::Sleep => Handshake::EnterSleep,
            };

            return Err(CanError::HandshakeTimeout(handshake));
        }

        debug!("CAN controller entered {mode:?} mode");
        Ok(())
    }

    /// Enters low power sleep mode
    pub fn sleep(&mut self) -> Result<(), CanError> {
        self.request_mode(OperatingMode::Sleep)
    }

    /// Leaves sleep mode and waits for SLAK to clear
    pub fn wake_up(&mut self) -> Result<(), CanError> {
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_sleep(false).into()
        });

        if !self.wait_status(|msr| !msr.slak()) {
            return Err(CanError::HandshakeTimeout(Handshake::LeaveSleep));
        }

        Ok(())
    }

    /// Software master reset, controller returns to sleep mode with reset register values
    pub fn reset(&mut self) {
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_reset(true).into()
        });
    }

    /// Freezes reception/transmission while the core is halted by a debugger
    pub fn set_debug_freeze(&mut self, enabled: bool) {
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_dbf(enabled).into()
        });
    }

    /// Enables time triggered communication, time stamps are sent in the last two data bytes
    pub fn set_time_triggered_mode(&mut self, enabled: bool) {
        self.modify(REGISTER_MCR, |mcr| {
            MasterControlReg::from(mcr).with_ttcm(enabled).into()
        });

        for mailbox in Mailbox::ALL {
            self.modify(tx_data_length_register(mailbox as u8), |tdtr| {
                TxDataLengthReg::from(tdtr).with_tgt(enabled).into()
            });
        }
    }

    /// Enables the selected interrupt sources, all others get disabled
    pub fn set_interrupts(&mut self, interrupts: &Interrupts) {
        self.registers.write(REGISTER_IER, interrupts.as_register());
    }

    /// Returns the state of the last transmit request of the given mailbox
    pub fn transmit_status(&mut self, mailbox: Mailbox) -> TransmitStatus {
        let tsr = self.registers.read(REGISTER_TSR);
        let shift = 8 * mailbox as u32;

        let completed = tsr & (TSR_RQCP0 << shift) != 0;
        let succeeded = tsr & (TSR_TXOK0 << shift) != 0;
        let empty = tsr & (TSR_TME0 << mailbox as u32) != 0;

        match (completed, succeeded, empty) {
            (true, true, true) => TransmitStatus::Ok,
            (false, _, false) => TransmitStatus::Pending,
            _ => TransmitStatus::Failed,
        }
    }

    /// Aborts a pending transmit request
    pub fn cancel_transmit(&mut self, mailbox: Mailbox) {
        // All other TSR status bits are cleared by writing one, so only ABRQ gets written
        self.registers.write(REGISTER_TSR, TSR_ABRQ0 << (8 * mailbox as u32));

        debug!("Transmission of {mailbox:?} aborted");
    }

    /// Returns the number of frames pending in the given FIFO
    pub fn message_pending(&mut self, fifo: Fifo) -> u8 {
        self.read_fifo_status(fifo).pending
    }

    /// Reads pending count, full and overrun flags of the given FIFO
    pub fn read_fifo_status(&mut self, fifo: Fifo) -> FifoStatus {
        FifoStatus::from_register(self.registers.read(rx_fifo_register(fifo as u8)))
    }

    /// Returns true if the given status flag is set
    pub fn flag_status(&mut self, flag: Flag) -> bool {
        let (register, mask) = flag.location();
        self.registers.read(register) & mask != 0
    }

    /// Clears the given status flag by writing only its bit.
    /// Error warning, error passive and bus-off follow the error counters, nothing is written for them.
    pub fn clear_flag(&mut self, flag: Flag) {
        match flag {
            Flag::ErrorWarning | Flag::ErrorPassive | Flag::BusOff => {}
            // LEC is the only writable field of ESR
            Flag::LastErrorCode => self.registers.write(REGISTER_ESR, 0),
            _ => {
                let (register, mask) = flag.location();
                self.registers.write(register, mask);
            }
        }
    }

    /// Returns true if the interrupt is enabled and its source is pending
    pub fn interrupt_status(&mut self, interrupt: Interrupt) -> bool {
        if self.registers.read(REGISTER_IER) & interrupt.enable_mask() == 0 {
            return false;
        }

        if let Some(flag) = interrupt.flag() {
            return self.flag_status(flag);
        }

        match interrupt {
            Interrupt::TxMailboxEmpty => self.registers.read(REGISTER_TSR) & TSR_RQCP_ALL != 0,
            Interrupt::FifoPending(fifo) => self.message_pending(fifo) != 0,
            _ => self.read_operation_status().error_interrupt,
        }
    }

    /// Clears the pending bits of the given interrupt source
    pub fn clear_interrupt(&mut self, interrupt: Interrupt) {
        match interrupt {
            Interrupt::TxMailboxEmpty => self.registers.write(REGISTER_TSR, TSR_RQCP_ALL),
            // Cleared by hardware once all frames are released
            Interrupt::FifoPending(_) => {}
            Interrupt::FifoFull(fifo) => self.clear_flag(Flag::FifoFull(fifo)),
            Interrupt::FifoOverrun(fifo) => self.clear_flag(Flag::FifoOverrun(fifo)),
            Interrupt::WakeUp => self.clear_flag(Flag::WakeUp),
            Interrupt::SleepAcknowledge => self.clear_flag(Flag::SleepAcknowledge),
            Interrupt::ErrorWarning | Interrupt::ErrorPassive | Interrupt::BusOff => self.clear_error_interrupt(),
            Interrupt::LastErrorCode | Interrupt::Error => {
                self.clear_flag(Flag::LastErrorCode);
                self.clear_error_interrupt();
            }
        }
    }

    /// Releases the output mailbox of the given FIFO
    pub fn release_fifo(&mut self, fifo: Fifo) {
        self.registers
            .write(rx_fifo_register(fifo as u8), RxFifoReg::new().with_rfom(true).into());
    }

    /// Reads and returns the operation status
    pub fn read_operation_status(&mut self) -> OperationStatus {
        OperationStatus::from_register(self.registers.read(REGISTER_MSR))
    }

    /// Reads and returns error counters and flags
    pub fn read_error_status(&mut self) -> ErrorStatus {
        ErrorStatus::from_register(self.registers.read(REGISTER_ESR))
    }

    /// Reads and returns the current bit timing configuration
    pub fn read_bit_timing(&mut self) -> BitTiming {
        BitTiming::from_register(self.registers.read(REGISTER_BTR))
    }

    /// Reads and returns the current automatic management flags
    pub fn read_flags(&mut self) -> ControllerFlags {
        ControllerFlags::from_register(self.registers.read(REGISTER_MCR))
    }

    fn clear_error_interrupt(&mut self) {
        self.registers
            .write(REGISTER_MSR, MasterStatusReg::new().with_erri(true).into());
    }

    /// Polls MSR until `condition` holds, at most `ack_attempts` reads
    fn wait_status<F>(&mut self, condition: F) -> bool
    where
        F: Fn(MasterStatusReg) -> bool,
    {
        let registers = &mut self.registers;
        wait_for(self.ack_attempts, || {
            condition(MasterStatusReg::from(registers.read(REGISTER_MSR)))
        })
    }

    /// Read-modify-write of a single register
    fn modify<F>(&mut self, register: u16, f: F)
    where
        F: FnOnce(u32) -> u32,
    {
        let value = self.registers.read(register);
        self.registers.write(register, f(value));
    }
}

impl<R: RegisterAccess> embedded_can::nb::Can for Controller<R> {
    type Frame = CanFrame;
    type Error = CanError;

    /// Queues the frame in the first empty mailbox, blocks if all mailboxes are pending.
    /// Lower priority frames are never replaced, so `Ok(None)` is returned on success.
    fn transmit(&mut self, frame: &Self::Frame) -> nb::Result<Option<Self::Frame>, Self::Error> {
        match CanController::transmit(self, frame) {
            Ok(_) => Ok(None),
            Err(CanError::NoEmptyMailbox) => Err(nb::Error::WouldBlock),
            Err(error) => Err(nb::Error::Other(error)),
        }
    }

    /// Returns the next frame of FIFO 0, then FIFO 1
    fn receive(&mut self) -> nb::Result<Self::Frame, Self::Error> {
        for fifo in [Fifo::Fifo0, Fifo::Fifo1] {
            match CanController::receive(self, fifo) {
                Ok(received) => return Ok(received.frame),
                Err(CanError::RxFifoEmpty) => continue,
                Err(error) => return Err(nb::Error::Other(error)),
            }
        }

        Err(nb::Error::WouldBlock)
    }
}
