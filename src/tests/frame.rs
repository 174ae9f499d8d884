use crate::filter::Fifo;
use crate::frame::{CanFrame, ReceivedFrame};
use embedded_can::{ExtendedId, Frame, Id, StandardId};

const EXTENDED_ID: u32 = 0x14C92A2B;

#[test]
fn test_new_data_frame() {
    let frame = CanFrame::new(StandardId::new(0x7FF).unwrap(), &[0xAA; 8]).unwrap();

    assert!(!frame.is_extended());
    assert!(!frame.is_remote_frame());
    assert_eq!(8, frame.dlc());
    assert_eq!(&[0xAA; 8], frame.data());

    let frame = CanFrame::new(ExtendedId::new(EXTENDED_ID).unwrap(), &[]).unwrap();
    assert!(frame.is_extended());
    assert_eq!(0, frame.dlc());
    assert!(frame.data().is_empty());
}

#[test]
fn test_new_remote_frame() {
    let frame = CanFrame::new_remote(StandardId::new(0x100).unwrap(), 4).unwrap();

    assert!(frame.is_remote_frame());
    assert_eq!(4, frame.dlc());
    assert!(frame.data().is_empty());

    assert!(CanFrame::new_remote(StandardId::new(0x100).unwrap(), 9).is_none());
}

#[test]
fn test_identifier_register_standard() {
    let frame = CanFrame::new(StandardId::new(0x123).unwrap(), &[]).unwrap();
    assert_eq!(0x2460_0000, frame.identifier_register());

    let frame = CanFrame::new_remote(StandardId::new(0x123).unwrap(), 0).unwrap();
    assert_eq!(0x2460_0002, frame.identifier_register());
}

#[test]
fn test_identifier_register_extended() {
    let frame = CanFrame::new(ExtendedId::new(EXTENDED_ID).unwrap(), &[]).unwrap();
    assert_eq!((EXTENDED_ID << 3) | 0b100, frame.identifier_register());
}

#[test]
fn test_data_length_register_keeps_time_stamp() {
    let frame = CanFrame::new(StandardId::new(0x1).unwrap(), &[0x1, 0x2, 0x3]).unwrap();

    assert_eq!(0xABCD_0103, frame.data_length_register(0xABCD_010F));
}

#[test]
fn test_data_registers() {
    let frame = CanFrame::new(StandardId::new(0x1).unwrap(), &[0x1, 0x2, 0x3, 0x4, 0x5, 0x6]).unwrap();

    assert_eq!((0x0403_0201, 0x0000_0605), frame.data_registers());
}

#[test]
fn test_from_registers_standard() {
    let frame = CanFrame::from_registers(0x2460_0000, 0x0000_0003, 0x0403_0201, 0x0807_0605);

    assert_eq!(Id::Standard(StandardId::new(0x123).unwrap()), frame.id());
    assert!(!frame.is_remote_frame());
    assert_eq!(&[0x1, 0x2, 0x3], frame.data());
}

#[test]
fn test_from_registers_extended_remote() {
    let frame = CanFrame::from_registers((EXTENDED_ID << 3) | 0b110, 0x0000_0002, 0x0, 0x0);

    assert_eq!(Id::Extended(ExtendedId::new(EXTENDED_ID).unwrap()), frame.id());
    assert!(frame.is_remote_frame());
    assert_eq!(2, frame.dlc());
    assert!(frame.data().is_empty());
}

#[test]
fn test_from_registers_dlc_above_eight() {
    let frame = CanFrame::from_registers(0x2460_0000, 0x0000_000F, 0x0403_0201, 0x0807_0605);

    assert_eq!(8, frame.dlc());
    assert_eq!(&[0x1, 0x2, 0x3, 0x4, 0x5, 0x6, 0x7, 0x8], frame.data());
}

#[test]
fn test_dlc_above_eight() {
    let frame = CanFrame {
        identifier: Id::Standard(StandardId::new(0x1).unwrap()),
        rtr: false,
        dlc: 16,
        data: [0x5A; 8],
    };

    assert_eq!(&[0x5A; 8], frame.data());
    assert_eq!(0x0000_0008, frame.data_length_register(0x0));
}

#[test]
fn test_received_frame() {
    let received = ReceivedFrame::from_registers(Fifo::Fifo1, 0x2460_0000, 0x1234_0501, 0x0000_00FF, 0x0);

    assert_eq!(Fifo::Fifo1, received.fifo);
    assert_eq!(5, received.filter_match_index);
    assert_eq!(0x1234, received.timestamp);
    assert_eq!(&[0xFF], received.frame.data());
}
