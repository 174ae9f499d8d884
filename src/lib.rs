#![cfg_attr(not(test), no_std)]
#![cfg_attr(feature = "strict", deny(warnings))]
#![allow(clippy::identity_op)]

//! # Library for the STM32F37x bxCAN controller
//!
//! Crate currently offer the following features:
//! * Controller initialization with INAK handshake and bounded polling
//! * Bit timing calculation and encoding
//! * 16-bit and 32-bit acceptance filter banks in mask and list mode
//! * Standard and extended ID formats for CAN 2.0 frames
//! * `embedded_can::nb::Can` implementation
//! * no_std support
//!
//!## CAN Tx/Rx example
//!
//!```
//!use stm32f37x_can::example::ExampleRegisters;
//!use stm32f37x_can::can::{CanController, Controller, Mailbox};
//!use stm32f37x_can::config::*;
//!use stm32f37x_can::filter::{Fifo, FilterBank};
//!use stm32f37x_can::frame::CanFrame;
//!use embedded_can::{Frame, Id, StandardId};
//!
//!let mut controller = Controller::new(ExampleRegisters::default());
//!
//! // configure CAN controller
//!controller
//!    .initialize(&Configuration {
//!        bit_timing: BitTiming {
//!            seg1: Segment1::Tq6,
//!            seg2: Segment2::Tq3,
//!            sjw: SyncJumpWidth::Tq1,
//!            prescaler: 10,
//!            mode: TestMode::LoopBack,
//!        },
//!        flags: ControllerFlags {
//!            auto_bus_off: true,
//!            ..Default::default()
//!        },
//!    })
//!    .unwrap();
//!
//! // Accept every frame in FIFO 0
//!controller.set_filter(&FilterBank::accept_all(0, Fifo::Fifo0)).unwrap();
//!
//! // Create and transmit frame
//!let can_id = Id::Standard(StandardId::new(0x55).unwrap());
//!let frame = CanFrame::new(can_id, &[1, 2, 3, 4, 5, 6, 7, 8]).unwrap();
//!assert_eq!(Mailbox::Mailbox0, controller.transmit(&frame).unwrap());
//!```

pub mod can;
pub mod config;
pub mod filter;
pub mod frame;
pub mod peripheral;
pub mod poll;
pub mod status;

pub mod example;
#[cfg(test)]
pub(crate) mod mocks;
mod registers;
#[cfg(test)]
mod tests;
