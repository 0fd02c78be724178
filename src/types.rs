//! Message records exchanged between the VoltGraph tasks
//!
//! Every message is a tagged variant with a capacity-bounded payload, so a
//! record is always copied by value into its queue and a payload can never
//! exceed the limit of the queue it travels on.

use core::ops::Deref;

use heapless::Vec;

use crate::config::{BUS_COMMAND_LEN, SENSOR_PAYLOAD_LEN, TEXT_PAYLOAD_LEN};
use crate::fatal::Fault;

// ===================================================================
// Payloads
// ===================================================================

/// Length-prefixed byte payload holding at most `N` bytes.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Payload<const N: usize> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> Payload<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self { bytes: Vec::new() }
    }

    /// Copy `bytes` into a new payload.
    ///
    /// A slice longer than `N` is an [`Fault::OversizePayload`]; it is never
    /// truncated.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, Fault> {
        Vec::from_slice(bytes)
            .map(|bytes| Self { bytes })
            .map_err(|_| Fault::OversizePayload {
                len: bytes.len(),
                capacity: N,
            })
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Append one byte; fails once the payload is full.
    pub fn push(&mut self, byte: u8) -> Result<(), Fault> {
        self.bytes.push(byte).map_err(|_| Fault::OversizePayload {
            len: N + 1,
            capacity: N,
        })
    }
}

impl<const N: usize> Deref for Payload<N> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(feature = "defmt")]
impl<const N: usize> defmt::Format for Payload<N> {
    fn format(&self, f: defmt::Formatter) {
        defmt::write!(f, "{=[u8]}", self.as_slice())
    }
}

/// Raw sensor bytes, also used for graph updates
pub type SensorPayload = Payload<SENSOR_PAYLOAD_LEN>;
/// Text for the display status row
pub type TextPayload = Payload<TEXT_PAYLOAD_LEN>;
/// Command bytes written to a bus device
pub type CommandPayload = Payload<BUS_COMMAND_LEN>;

// ===================================================================
// Sampler Inbox
// ===================================================================

/// Tag a caller attaches to a bus transaction; the completion carries it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransactionKind {
    /// Sensor configuration write
    VoltInit,
    /// Sensor conversion read
    VoltRead,
}

/// Messages consumed by the sampling task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerMessage {
    /// Periodic tick from the sampling timer
    Timer { ticks_elapsed: u32 },
    /// A bus transaction finished; `data` holds the raw response
    BusComplete {
        kind: TransactionKind,
        data: SensorPayload,
    },
}

impl SamplerMessage {
    /// Numeric message type, as used in log lines and fault reports
    pub fn type_code(&self) -> u8 {
        match self {
            SamplerMessage::BusComplete {
                kind: TransactionKind::VoltInit,
                ..
            } => 1,
            SamplerMessage::BusComplete {
                kind: TransactionKind::VoltRead,
                ..
            } => 2,
            SamplerMessage::Timer { .. } => 3,
        }
    }
}

// ===================================================================
// Renderer Inbox
// ===================================================================

/// Messages consumed by the rendering task
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RenderMessage {
    /// Periodic tick from the redraw timer
    Timer { ticks_elapsed: u32 },
    /// Raw sensor samples to append to the graph
    GraphSample(SensorPayload),
    /// Text for the status row
    PrintText(TextPayload),
}

impl RenderMessage {
    /// Numeric message type, as used in log lines
    pub fn type_code(&self) -> u8 {
        match self {
            RenderMessage::Timer { .. } => 1,
            RenderMessage::PrintText(_) => 2,
            RenderMessage::GraphSample(_) => 3,
        }
    }

    /// Build a `PrintText` message.
    ///
    /// Text longer than the display payload limit is rejected, never cut short.
    pub fn print(text: &str) -> Result<Self, Fault> {
        TextPayload::from_slice(text.as_bytes()).map(RenderMessage::PrintText)
    }
}

// ===================================================================
// Bus Service Inbox
// ===================================================================

/// A transaction request for the bus service
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusRequest {
    pub address: u8,
    pub kind: TransactionKind,
    pub command: CommandPayload,
    pub response_len: usize,
}

impl BusRequest {
    /// Build a request; `command` and `response_len` must fit their payloads.
    pub fn new(
        address: u8,
        kind: TransactionKind,
        command: &[u8],
        response_len: usize,
    ) -> Result<Self, Fault> {
        if response_len > SensorPayload::CAPACITY {
            return Err(Fault::OversizePayload {
                len: response_len,
                capacity: SensorPayload::CAPACITY,
            });
        }

        Ok(Self {
            address,
            kind,
            command: CommandPayload::from_slice(command)?,
            response_len,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_rejects_oversize_slice() {
        let bytes = [0u8; SENSOR_PAYLOAD_LEN + 1];
        assert_eq!(
            SensorPayload::from_slice(&bytes),
            Err(Fault::OversizePayload {
                len: SENSOR_PAYLOAD_LEN + 1,
                capacity: SENSOR_PAYLOAD_LEN,
            })
        );
    }

    #[test]
    fn payload_keeps_exact_length() {
        let payload = SensorPayload::from_slice(&[1, 2, 3]).unwrap();
        assert_eq!(payload.len(), 3);
        assert_eq!(payload.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn print_message_at_limit_is_accepted() {
        let text = "abcdefghijklmnopqrst";
        assert_eq!(text.len(), TEXT_PAYLOAD_LEN);
        match RenderMessage::print(text).unwrap() {
            RenderMessage::PrintText(payload) => assert_eq!(payload.as_slice(), text.as_bytes()),
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn print_message_over_limit_is_rejected() {
        let text = "this line is far too long for the status row";
        assert!(matches!(
            RenderMessage::print(text),
            Err(Fault::OversizePayload { capacity: TEXT_PAYLOAD_LEN, .. })
        ));
    }

    #[test]
    fn bus_request_rejects_long_response() {
        let result = BusRequest::new(0x4F, TransactionKind::VoltRead, &[0xAA], 9);
        assert!(matches!(result, Err(Fault::OversizePayload { len: 9, .. })));
    }

    #[test]
    fn type_codes_are_distinct_per_inbox() {
        let init = SamplerMessage::BusComplete {
            kind: TransactionKind::VoltInit,
            data: SensorPayload::new(),
        };
        let read = SamplerMessage::BusComplete {
            kind: TransactionKind::VoltRead,
            data: SensorPayload::new(),
        };
        let tick = SamplerMessage::Timer { ticks_elapsed: 1 };
        assert_eq!([init.type_code(), read.type_code(), tick.type_code()], [1, 2, 3]);
    }
}
