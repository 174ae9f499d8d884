use crate::can::Mailbox;
use crate::filter::Fifo;
use crate::registers::*;

/// Operation status read from MSR register
#[derive(Copy, Clone, Debug)]
pub struct OperationStatus {
    /// Current operation mode derived from INAK and SLAK
    pub mode: OperatingMode,

    /// True while the controller is receiving
    pub receiving: bool,

    /// True while the controller is transmitting
    pub transmitting: bool,

    /// Value of RX at the last sample point
    pub last_sample: bool,

    /// Current level of the CAN RX pin
    pub rx_level: bool,

    /// Sleep acknowledge interrupt pending
    pub sleep_interrupt: bool,

    /// Wake-up interrupt pending
    pub wake_up_interrupt: bool,

    /// Error interrupt pending
    pub error_interrupt: bool,
}

impl OperationStatus {
    pub(crate) fn from_register(register: u32) -> Self {
        let msr = MasterStatusReg::from(register);

        Self {
            mode: OperatingMode::from_register(register),
            receiving: msr.rxm(),
            transmitting: msr.txm(),
            last_sample: msr.samp(),
            rx_level: msr.rx(),
            sleep_interrupt: msr.slaki(),
            wake_up_interrupt: msr.wkui(),
            error_interrupt: msr.erri(),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum OperatingMode {
    /// Controller is in initialization mode (INAK set)
    Initialization,
    /// Controller is active on the bus
    Normal,
    /// Controller is in low power sleep mode (SLAK set)
    Sleep,
}

impl OperatingMode {
    pub(crate) fn from_register(register: u32) -> Self {
        let msr = MasterStatusReg::from(register);

        match (msr.inak(), msr.slak()) {
            (true, _) => Self::Initialization,
            (false, true) => Self::Sleep,
            (false, false) => Self::Normal,
        }
    }
}

/// Error counters and flags read from ESR register
#[derive(Copy, Clone, Debug)]
pub struct ErrorStatus {
    pub receive_error_count: u8,
    pub transmit_error_count: u8,
    pub last_error: LastErrorCode,
    pub bus_off: bool,
    pub error_passive: bool,
    pub error_warning: bool,
}

impl ErrorStatus {
    pub(crate) fn from_register(register: u32) -> Self {
        let esr = ErrorStatusReg::from(register);

        Self {
            receive_error_count: esr.rec(),
            transmit_error_count: esr.tec(),
            last_error: LastErrorCode::from_register(esr.lec()),
            bus_off: esr.boff(),
            error_passive: esr.epvf(),
            error_warning: esr.ewgf(),
        }
    }
}

/// Last error code (LEC) of ESR
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum LastErrorCode {
    NoError = 0b000,
    Stuff = 0b001,
    Form = 0b010,
    Acknowledgment = 0b011,
    BitRecessive = 0b100,
    BitDominant = 0b101,
    Crc = 0b110,
    SoftwareSet = 0b111,
}

impl LastErrorCode {
    pub(crate) fn from_register(bits: u8) -> Self {
        match bits & 0b111 {
            0b000 => Self::NoError,
            0b001 => Self::Stuff,
            0b010 => Self::Form,
            0b011 => Self::Acknowledgment,
            0b100 => Self::BitRecessive,
            0b101 => Self::BitDominant,
            0b110 => Self::Crc,
            _ => Self::SoftwareSet,
        }
    }

    /// Maps the code to the generic CAN error kind, None if no error was recorded
    pub fn kind(&self) -> Option<embedded_can::ErrorKind> {
        use embedded_can::ErrorKind;

        match self {
            Self::NoError | Self::SoftwareSet => None,
            Self::Stuff => Some(ErrorKind::Stuff),
            Self::Form => Some(ErrorKind::Form),
            Self::Acknowledgment => Some(ErrorKind::Acknowledge),
            Self::BitRecessive | Self::BitDominant => Some(ErrorKind::Bit),
            Self::Crc => Some(ErrorKind::Crc),
        }
    }
}

/// State of a transmit request
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TransmitStatus {
    /// Request not yet completed
    Pending,
    /// Frame was transmitted successfully
    Ok,
    /// Request completed without success (arbitration lost, error or abort)
    Failed,
}

/// Receive FIFO state read from RF0R/RF1R
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FifoStatus {
    /// Number of frames waiting in the FIFO
    pub pending: u8,
    /// All three FIFO slots are occupied
    pub full: bool,
    /// A frame was lost because the FIFO was full
    pub overrun: bool,
}

impl FifoStatus {
    pub(crate) fn from_register(register: u32) -> Self {
        let rfr = RxFifoReg::from(register);

        Self {
            pending: rfr.fmp(),
            full: rfr.full(),
            overrun: rfr.fovr(),
        }
    }
}

/// Status flags of the controller
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Flag {
    /// Last request of the mailbox completed (RQCPx). Clearing it also resets TXOK, ALST and TERR.
    RequestCompleted(Mailbox),
    /// FIFO holds three frames (FULLx)
    FifoFull(Fifo),
    /// Frame lost because the FIFO was full (FOVRx)
    FifoOverrun(Fifo),
    /// Start of frame detected in sleep mode (WKUI)
    WakeUp,
    /// Sleep mode entered (SLAKI)
    SleepAcknowledge,
    /// Error warning limit reached (EWGF), read only
    ErrorWarning,
    /// Error passive limit reached (EPVF), read only
    ErrorPassive,
    /// Bus-off state entered (BOFF), read only
    BusOff,
    /// Last error code (LEC) is not zero
    LastErrorCode,
}

impl Flag {
    /// Register holding the flag and the mask of the flag bits
    pub(crate) fn location(&self) -> (u16, u32) {
        match *self {
            Flag::RequestCompleted(mailbox) => (REGISTER_TSR, TSR_RQCP0 << (8 * mailbox as u32)),
            Flag::FifoFull(fifo) => (rx_fifo_register(fifo as u8), RxFifoReg::new().with_full(true).into()),
            Flag::FifoOverrun(fifo) => (rx_fifo_register(fifo as u8), RxFifoReg::new().with_fovr(true).into()),
            Flag::WakeUp => (REGISTER_MSR, MasterStatusReg::new().with_wkui(true).into()),
            Flag::SleepAcknowledge => (REGISTER_MSR, MasterStatusReg::new().with_slaki(true).into()),
            Flag::ErrorWarning => (REGISTER_ESR, ErrorStatusReg::new().with_ewgf(true).into()),
            Flag::ErrorPassive => (REGISTER_ESR, ErrorStatusReg::new().with_epvf(true).into()),
            Flag::BusOff => (REGISTER_ESR, ErrorStatusReg::new().with_boff(true).into()),
            Flag::LastErrorCode => (REGISTER_ESR, ErrorStatusReg::new().with_lec(0b111).into()),
        }
    }
}

/// Interrupt sources of the controller
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Interrupt {
    /// A transmit request completed
    TxMailboxEmpty,
    /// At least one frame is pending in the FIFO
    FifoPending(Fifo),
    FifoFull(Fifo),
    FifoOverrun(Fifo),
    WakeUp,
    SleepAcknowledge,
    ErrorWarning,
    ErrorPassive,
    BusOff,
    LastErrorCode,
    /// Error interrupt (ERRI) raised by any of the enabled error sources
    Error,
}

impl Interrupt {
    /// IER bit enabling the interrupt
    pub(crate) fn enable_mask(&self) -> u32 {
        let ier = InterruptEnableReg::new();

        let ier = match *self {
            Interrupt::TxMailboxEmpty => ier.with_tmeie(true),
            Interrupt::FifoPending(Fifo::Fifo0) => ier.with_fmpie0(true),
            Interrupt::FifoPending(Fifo::Fifo1) => ier.with_fmpie1(true),
            Interrupt::FifoFull(Fifo::Fifo0) => ier.with_ffie0(true),
            Interrupt::FifoFull(Fifo::Fifo1) => ier.with_ffie1(true),
            Interrupt::FifoOverrun(Fifo::Fifo0) => ier.with_fovie0(true),
            Interrupt::FifoOverrun(Fifo::Fifo1) => ier.with_fovie1(true),
            Interrupt::WakeUp => ier.with_wkuie(true),
            Interrupt::SleepAcknowledge => ier.with_slkie(true),
            Interrupt::ErrorWarning => ier.with_ewgie(true),
            Interrupt::ErrorPassive => ier.with_epvie(true),
            Interrupt::BusOff => ier.with_bofie(true),
            Interrupt::LastErrorCode => ier.with_lecie(true),
            Interrupt::Error => ier.with_errie(true),
        };

        ier.into()
    }

    /// Status flag signalling the interrupt, None if the source is not a single flag
    pub(crate) fn flag(&self) -> Option<Flag> {
        match *self {
            Interrupt::FifoFull(fifo) => Some(Flag::FifoFull(fifo)),
            Interrupt::FifoOverrun(fifo) => Some(Flag::FifoOverrun(fifo)),
            Interrupt::WakeUp => Some(Flag::WakeUp),
            Interrupt::SleepAcknowledge => Some(Flag::SleepAcknowledge),
            Interrupt::ErrorWarning => Some(Flag::ErrorWarning),
            Interrupt::ErrorPassive => Some(Flag::ErrorPassive),
            Interrupt::BusOff => Some(Flag::BusOff),
            Interrupt::LastErrorCode => Some(Flag::LastErrorCode),
            Interrupt::TxMailboxEmpty | Interrupt::FifoPending(_) | Interrupt::Error => None,
        }
    }
}
