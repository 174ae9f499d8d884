use crate::can::{CanController, CanError, Controller, Mailbox};
use crate::filter::Fifo;
use crate::mocks::SimulatedCan;
use crate::registers::*;
use crate::status::{FifoStatus, Flag, Interrupt};
use crate::tests::can::Mocks;
use embedded_can::{Error, ErrorKind, Frame, Id, StandardId};
use mockall::Sequence;

#[test]
fn test_flag_status() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_read(REGISTER_RF0R, 0x0000_0018, &mut seq);
    mocks.mock_read(0x010, 0x0000_0018, &mut seq);
    mocks.mock_read(REGISTER_TSR, 0x1C01_0000, &mut seq);
    mocks.mock_read(REGISTER_ESR, 0x0000_0060, &mut seq);
    mocks.mock_read(REGISTER_ESR, 0x0000_0060, &mut seq);

    let mut controller = mocks.into_controller();

    assert!(controller.flag_status(Flag::FifoOverrun(Fifo::Fifo0)));
    assert!(controller.flag_status(Flag::FifoFull(Fifo::Fifo1)));
    assert!(controller.flag_status(Flag::RequestCompleted(Mailbox::Mailbox2)));
    assert!(controller.flag_status(Flag::LastErrorCode));
    assert!(!controller.flag_status(Flag::BusOff));
}

#[test]
fn test_clear_flag_fifo_overrun() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    // FOVR1 only, FULL1 and RFOM1 untouched
    mocks.mock_write(0x010, 1 << 4, &mut seq);

    mocks.into_controller().clear_flag(Flag::FifoOverrun(Fifo::Fifo1));
}

#[test]
fn test_clear_flag_fifo_full() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_RF0R, 1 << 3, &mut seq);

    mocks.into_controller().clear_flag(Flag::FifoFull(Fifo::Fifo0));
}

#[test]
fn test_clear_flag_request_completed() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_TSR, 1 << 16, &mut seq);

    mocks.into_controller().clear_flag(Flag::RequestCompleted(Mailbox::Mailbox2));
}

#[test]
fn test_clear_flag_status_register() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_MSR, 1 << 3, &mut seq);
    mocks.mock_write(REGISTER_MSR, 1 << 4, &mut seq);

    let mut controller = mocks.into_controller();
    controller.clear_flag(Flag::WakeUp);
    controller.clear_flag(Flag::SleepAcknowledge);
}

#[test]
fn test_clear_flag_last_error_code() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_ESR, 0x0, &mut seq);

    mocks.into_controller().clear_flag(Flag::LastErrorCode);
}

#[test]
fn test_clear_flag_read_only() {
    // No register access expected
    let mut controller = Mocks::default().into_controller();

    controller.clear_flag(Flag::BusOff);
    controller.clear_flag(Flag::ErrorPassive);
    controller.clear_flag(Flag::ErrorWarning);
}

#[test]
fn test_interrupt_status_disabled() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    // Only FIFO 0 pending interrupt enabled, overrun flag not even read
    mocks.mock_read(REGISTER_IER, 1 << 1, &mut seq);

    assert!(!mocks.into_controller().interrupt_status(Interrupt::FifoOverrun(Fifo::Fifo0)));
}

#[test]
fn test_interrupt_status_enabled() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_read(REGISTER_IER, 1 << 3, &mut seq);
    mocks.mock_read(REGISTER_RF0R, 0x0000_0010, &mut seq);

    mocks.mock_read(REGISTER_IER, 1 << 1, &mut seq);
    mocks.mock_read(REGISTER_RF0R, 0x0000_0002, &mut seq);

    mocks.mock_read(REGISTER_IER, 1 << 0, &mut seq);
    mocks.mock_read(REGISTER_TSR, 0x1C00_0100, &mut seq);

    mocks.mock_read(REGISTER_IER, 1 << 15, &mut seq);
    mocks.mock_read(REGISTER_MSR, 0x0000_0C00, &mut seq);

    let mut controller = mocks.into_controller();

    assert!(controller.interrupt_status(Interrupt::FifoOverrun(Fifo::Fifo0)));
    assert!(controller.interrupt_status(Interrupt::FifoPending(Fifo::Fifo0)));
    assert!(controller.interrupt_status(Interrupt::TxMailboxEmpty));
    assert!(!controller.interrupt_status(Interrupt::Error));
}

#[test]
fn test_clear_interrupt_tx_mailbox_empty() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_TSR, 0x0001_0101, &mut seq);

    mocks.into_controller().clear_interrupt(Interrupt::TxMailboxEmpty);
}

#[test]
fn test_clear_interrupt_error() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(REGISTER_ESR, 0x0, &mut seq);
    mocks.mock_write(REGISTER_MSR, 1 << 2, &mut seq);
    // Bus-off only resets ERRI
    mocks.mock_write(REGISTER_MSR, 1 << 2, &mut seq);

    let mut controller = mocks.into_controller();
    controller.clear_interrupt(Interrupt::Error);
    controller.clear_interrupt(Interrupt::BusOff);
}

#[test]
fn test_clear_interrupt_fifo() {
    let mut mocks = Mocks::default();
    let mut seq = Sequence::new();

    mocks.mock_write(0x010, 1 << 3, &mut seq);

    let mut controller = mocks.into_controller();
    controller.clear_interrupt(Interrupt::FifoFull(Fifo::Fifo1));
    // Nothing written, FMP is maintained by hardware
    controller.clear_interrupt(Interrupt::FifoPending(Fifo::Fifo1));
}

#[test]
fn test_clear_interrupt_keeps_acknowledge() {
    let mut can = SimulatedCan::new(Some(1));
    can.set(REGISTER_MSR, 0x0000_0C1E);

    let mut controller = Controller::new(can);
    controller.clear_interrupt(Interrupt::WakeUp);
    controller.clear_interrupt(Interrupt::SleepAcknowledge);

    // SLAK untouched, ERRI still pending
    assert_eq!(0x0000_0C06, controller.free().get(REGISTER_MSR));
}

#[test]
fn test_receive_reports_overrun_once() {
    let mut can = SimulatedCan::new(Some(1));
    // FOVR, FULL and three frames pending
    can.set(REGISTER_RF0R, 0x0000_001B);
    can.set(0x1B0, 0x123 << 21);
    can.set(0x1B4, 1);

    let mut controller = Controller::new(can);
    assert_eq!(
        FifoStatus {
            pending: 3,
            full: true,
            overrun: true,
        },
        controller.read_fifo_status(Fifo::Fifo0)
    );

    let error = CanController::receive(&mut controller, Fifo::Fifo0).unwrap_err();
    assert_eq!(CanError::FifoOverrun(Fifo::Fifo0), error);
    assert_eq!(ErrorKind::Overrun, error.kind());
    assert!(!controller.flag_status(Flag::FifoOverrun(Fifo::Fifo0)));

    // No frame consumed by the overrun report
    assert_eq!(3, controller.message_pending(Fifo::Fifo0));
    for remaining in [2, 1, 0] {
        let received = CanController::receive(&mut controller, Fifo::Fifo0).unwrap();
        assert_eq!(Id::Standard(StandardId::new(0x123).unwrap()), received.frame.id());
        assert_eq!(remaining, controller.message_pending(Fifo::Fifo0));
    }

    assert_eq!(0, controller.free().get(REGISTER_RF0R));
}

#[test]
fn test_receive_nb_overrun() {
    let mut can = SimulatedCan::new(Some(1));
    can.set(REGISTER_RF0R, 0x0000_0011);

    let mut controller = Controller::new(can);

    assert!(matches!(
        embedded_can::nb::Can::receive(&mut controller),
        Err(nb::Error::Other(CanError::FifoOverrun(Fifo::Fifo0)))
    ));
    assert!(embedded_can::nb::Can::receive(&mut controller).is_ok());
}
