//! Fatal fault handling
//!
//! Every failure in the pipeline is unrecoverable. Code that detects one
//! produces a [`Fault`]; the run loop that owns the failing step hands it to
//! [`halt`] on the spot. There is no retry and no degraded mode.

/// Everything that can stop the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Fault {
    /// A task could not be spawned at start-up
    Spawn,
    /// A message arrived in a state that does not expect it
    Protocol {
        state: crate::sampler::SamplerState,
        message: u8,
    },
    /// A payload is longer than the queue record can hold
    OversizePayload { len: usize, capacity: usize },
    /// A bus response is shorter than the decoding policy needs
    ShortResponse { len: usize, needed: usize },
    /// An interrupt-context producer found its target queue full
    QueueFull { queue: &'static str },
    /// The bus service refused a transaction request
    BusRejected { address: u8 },
    /// The bus driver reported a transfer error
    BusTransfer { address: u8 },
    /// The display driver reported an error
    Display,
}

/// Report `fault` and stop the system. Never returns.
#[track_caller]
pub fn halt(fault: Fault) -> ! {
    error!("FATAL: {:?}", fault);
    panic!("fatal fault: {:?}", fault);
}
