//! VoltGraph - voltage strip-chart recorder for RP2040
//!
//! A periodic timer drives a sampling state machine that reads a voltage
//! sensor over I2C; completed samples are drawn as a scrolling strip chart on
//! a 320x240 TFT.
//!
//! ## Architecture
//! - **Queues**: every task owns one bounded inbox; queues are the only
//!   synchronization between tasks
//! - **Priorities**: bus service and sampler run on an interrupt executor
//!   and preempt rendering, timers and supervision
//! - **Faults**: any protocol violation halts the system
//!
//! Everything except [`hardware`] is board-independent and runs under host
//! unit tests.

#![cfg_attr(not(test), no_std)]

// Must come first: provides the logging macros to every module below
mod fmt;

pub mod bus;
pub mod channels;
pub mod color;
pub mod config;
pub mod display;
pub mod fatal;
pub mod graph;
pub mod queue;
pub mod render;
pub mod sampler;
pub mod stats;
pub mod supervisor;
pub mod timer;
pub mod types;

#[cfg(feature = "rp2040")]
pub mod hardware;

#[cfg(feature = "rp2040")]
embassy_rp::bind_interrupts!(pub struct Irqs {
    I2C0_IRQ => embassy_rp::i2c::InterruptHandler<embassy_rp::peripherals::I2C0>;
});
