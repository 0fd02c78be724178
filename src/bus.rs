//! Bus transaction service
//!
//! The service owns the I2C bus. Clients enqueue [`BusRequest`]s through the
//! [`BusService`] trait; the service performs each transfer in order and
//! delivers the response to the sampling task as a
//! [`SamplerMessage::BusComplete`] tagged with the request's
//! [`TransactionKind`].

use embedded_hal_async::i2c::I2c;

use crate::channels::{BusQueue, BusSender, SamplerSender};
use crate::config::SENSOR_PAYLOAD_LEN;
use crate::fatal::{halt, Fault};
use crate::types::{BusRequest, SamplerMessage, SensorPayload};

/// The bus service would not accept a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusRejected;

/// Capability to submit transactions to the bus service
pub trait BusService {
    /// Queue `request` without blocking. The completion arrives later as a
    /// message on the requester's inbox.
    fn enqueue(&self, request: BusRequest) -> Result<(), BusRejected>;
}

impl BusService for BusSender<'_> {
    fn enqueue(&self, request: BusRequest) -> Result<(), BusRejected> {
        self.try_send(request).map_err(|_| BusRejected)
    }
}

/// Perform one transaction and return the response bytes.
async fn transfer<I: I2c>(i2c: &mut I, request: &BusRequest) -> Result<SensorPayload, Fault> {
    let mut response = [0u8; SENSOR_PAYLOAD_LEN];
    let response = &mut response[..request.response_len];

    let result = if response.is_empty() {
        i2c.write(request.address, &request.command).await
    } else {
        i2c.write_read(request.address, &request.command, response)
            .await
    };

    if result.is_err() {
        return Err(Fault::BusTransfer {
            address: request.address,
        });
    }

    SensorPayload::from_slice(response)
}

/// Bus service run loop: serve requests from `requests` forever and hand each
/// completion to `completions`.
pub async fn run_bus_service<I: I2c>(
    mut i2c: I,
    requests: &BusQueue,
    completions: SamplerSender<'_>,
) {
    info!("Bus service started");

    loop {
        let request = requests.recv().await;
        trace!(
            "Bus request {:?} addr=0x{:02X} len={}",
            request.kind,
            request.address,
            request.response_len
        );

        let data = match transfer(&mut i2c, &request).await {
            Ok(data) => data,
            Err(fault) => halt(fault),
        };

        let completion = SamplerMessage::BusComplete {
            kind: request.kind,
            data,
        };
        completions.send_forever(completion).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::channels::SamplerQueue;
    use crate::queue::Queue;
    use crate::types::TransactionKind;
    use core::convert::Infallible;
    use embassy_futures::block_on;
    use embassy_futures::select::{select, Either};
    use embedded_hal_async::i2c::{ErrorType, Operation};

    /// Records writes and answers reads with a counting pattern.
    struct FakeI2c {
        writes: Vec<(u8, Vec<u8>)>,
        next_byte: u8,
    }

    impl FakeI2c {
        fn new() -> Self {
            Self {
                writes: Vec::new(),
                next_byte: 10,
            }
        }
    }

    impl ErrorType for FakeI2c {
        type Error = Infallible;
    }

    impl I2c for FakeI2c {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            for op in operations {
                match op {
                    Operation::Write(bytes) => self.writes.push((address, bytes.to_vec())),
                    Operation::Read(buffer) => {
                        for byte in buffer.iter_mut() {
                            *byte = self.next_byte;
                            self.next_byte = self.next_byte.wrapping_add(10);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    #[test]
    fn enqueue_is_rejected_when_bus_queue_is_full() {
        let queue: BusQueue = Queue::new();
        let bus = queue.sender();
        for _ in 0..queue.capacity() {
            let request = BusRequest::new(0x4F, TransactionKind::VoltRead, &[0xAA], 8).unwrap();
            bus.enqueue(request).unwrap();
        }

        let request = BusRequest::new(0x4F, TransactionKind::VoltRead, &[0xAA], 8).unwrap();
        assert_eq!(bus.enqueue(request), Err(BusRejected));
    }

    #[test]
    fn write_only_request_completes_with_empty_payload() {
        let mut i2c = FakeI2c::new();
        let request = BusRequest::new(0x4F, TransactionKind::VoltInit, &[0xAC, 0x00], 0).unwrap();

        let data = block_on(transfer(&mut i2c, &request)).unwrap();

        assert!(data.is_empty());
        assert_eq!(i2c.writes, [(0x4F, vec![0xAC, 0x00])]);
    }

    #[test]
    fn service_delivers_tagged_completions_in_order() {
        let requests: BusQueue = Queue::new();
        let completions: SamplerQueue = Queue::new();

        requests
            .try_send(BusRequest::new(0x4F, TransactionKind::VoltInit, &[0xAC, 0x00], 0).unwrap())
            .unwrap();
        requests
            .try_send(BusRequest::new(0x4F, TransactionKind::VoltRead, &[0xAA], 8).unwrap())
            .unwrap();

        let outcome = block_on(select(
            run_bus_service(FakeI2c::new(), &requests, completions.sender()),
            async { (completions.recv().await, completions.recv().await) },
        ));

        let (first, second) = match outcome {
            Either::Second(pair) => pair,
            Either::First(()) => panic!("bus service returned"),
        };
        assert_eq!(
            first,
            SamplerMessage::BusComplete {
                kind: TransactionKind::VoltInit,
                data: SensorPayload::new(),
            }
        );
        assert_eq!(
            second,
            SamplerMessage::BusComplete {
                kind: TransactionKind::VoltRead,
                data: SensorPayload::from_slice(&[10, 20, 30, 40, 50, 60, 70, 80]).unwrap(),
            }
        );
    }
}
