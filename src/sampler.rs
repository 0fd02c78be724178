//! Voltage sampling state machine
//!
//! The sensor must be configured before its conversions mean anything, so the
//! task walks a three-state machine:
//!
//! - `Uninitialized`: nothing sent yet. [`Sampler::start`] enqueues the
//!   configuration write and moves to `InitializationSent`.
//! - `InitializationSent`: waiting for the configuration acknowledgment.
//!   Timer ticks are ignored; any other acknowledgment is fatal.
//! - `Ready`: each timer tick enqueues a read; each read acknowledgment is
//!   decoded and forwarded to the renderer.
//!
//! An acknowledgment that arrives in a state that did not ask for it means the
//! task and the bus have lost step with each other, and halts the system.

use crate::bus::BusService;
use crate::channels::{RenderSender, SamplerQueue};
use crate::config::{
    SENSOR_I2C_ADDRESS, SENSOR_INIT_COMMAND, SENSOR_READ_COMMAND, SENSOR_READ_LEN,
};
use crate::fatal::{halt, Fault};
use crate::stats::PipelineStats;
use crate::types::{BusRequest, RenderMessage, SamplerMessage, SensorPayload, TransactionKind};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplerState {
    Uninitialized,
    InitializationSent,
    Ready,
}

/// How a read response is turned into graph samples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReadDecoding {
    /// Every response byte is one sample
    Independent,
    /// The first two bytes form a big-endian 10-bit conversion, reduced to
    /// one 8-bit sample
    BigEndianWord,
}

/// Sensor protocol parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplerConfig {
    pub address: u8,
    pub init_command: &'static [u8],
    pub read_command: &'static [u8],
    pub read_len: usize,
    pub decoding: ReadDecoding,
}

impl SamplerConfig {
    /// The 8-sample block read used by the voltage board
    pub const fn voltage_sensor() -> Self {
        Self {
            address: SENSOR_I2C_ADDRESS,
            init_command: &SENSOR_INIT_COMMAND,
            read_command: &SENSOR_READ_COMMAND,
            read_len: SENSOR_READ_LEN,
            decoding: ReadDecoding::Independent,
        }
    }
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self::voltage_sensor()
    }
}

pub struct Sampler {
    config: SamplerConfig,
    state: SamplerState,
}

impl Sampler {
    pub const fn new(config: SamplerConfig) -> Self {
        Self {
            config,
            state: SamplerState::Uninitialized,
        }
    }

    pub fn state(&self) -> SamplerState {
        self.state
    }

    /// Send the configuration write. Only valid once, before any message.
    pub fn start<B: BusService>(&mut self, bus: &B) -> Result<(), Fault> {
        if self.state != SamplerState::Uninitialized {
            return Err(Fault::Protocol {
                state: self.state,
                message: 0,
            });
        }

        let request = BusRequest::new(
            self.config.address,
            TransactionKind::VoltInit,
            self.config.init_command,
            0,
        )?;
        bus.enqueue(request).map_err(|_| Fault::BusRejected {
            address: self.config.address,
        })?;

        self.transition(SamplerState::InitializationSent);
        Ok(())
    }

    /// Apply one inbox message. Returns the samples to forward, if any.
    pub fn handle<B: BusService>(
        &mut self,
        msg: SamplerMessage,
        bus: &B,
    ) -> Result<Option<SensorPayload>, Fault> {
        let code = msg.type_code();

        match (self.state, msg) {
            (SamplerState::Ready, SamplerMessage::Timer { .. }) => {
                self.request_read(bus)?;
                Ok(None)
            }
            // Ticks before the sensor is configured are dropped
            (_, SamplerMessage::Timer { .. }) => Ok(None),

            (
                SamplerState::InitializationSent,
                SamplerMessage::BusComplete {
                    kind: TransactionKind::VoltInit,
                    ..
                },
            ) => {
                self.transition(SamplerState::Ready);
                Ok(None)
            }

            (
                SamplerState::Ready,
                SamplerMessage::BusComplete {
                    kind: TransactionKind::VoltRead,
                    data,
                },
            ) => self.decode(&data).map(Some),

            (state, SamplerMessage::BusComplete { .. }) => Err(Fault::Protocol {
                state,
                message: code,
            }),
        }
    }

    fn request_read<B: BusService>(&self, bus: &B) -> Result<(), Fault> {
        let request = BusRequest::new(
            self.config.address,
            TransactionKind::VoltRead,
            self.config.read_command,
            self.config.read_len,
        )?;
        bus.enqueue(request).map_err(|_| Fault::BusRejected {
            address: self.config.address,
        })
    }

    fn decode(&self, data: &SensorPayload) -> Result<SensorPayload, Fault> {
        match self.config.decoding {
            ReadDecoding::Independent => Ok(data.clone()),
            ReadDecoding::BigEndianWord => {
                let [high, low, ..] = data.as_slice() else {
                    return Err(Fault::ShortResponse {
                        len: data.len(),
                        needed: 2,
                    });
                };
                let word = u16::from_be_bytes([*high, *low]);
                let mut samples = SensorPayload::new();
                samples.push((word >> 2).min(u8::MAX as u16) as u8)?;
                Ok(samples)
            }
        }
    }

    fn transition(&mut self, next: SamplerState) {
        debug!("Sampler: {:?} -> {:?}", self.state, next);
        self.state = next;
    }
}

// ===================================================================
// Sampling Task
// ===================================================================

/// Everything the sampling task holds for its lifetime
pub struct SamplerContext<'a, B> {
    pub inbox: &'a SamplerQueue,
    pub bus: B,
    pub render: RenderSender<'a>,
    pub stats: &'a PipelineStats,
}

/// Sampling task run loop. Starts the sensor, then serves the inbox forever.
pub async fn run_sampler<B: BusService>(config: SamplerConfig, ctx: SamplerContext<'_, B>) {
    info!("Sampler task started (sensor 0x{:02X})", config.address);

    let mut sampler = Sampler::new(config);
    if let Err(fault) = sampler.start(&ctx.bus) {
        halt(fault);
    }

    loop {
        let msg = ctx.inbox.recv().await;
        let is_tick = matches!(msg, SamplerMessage::Timer { .. });

        let samples = match sampler.handle(msg, &ctx.bus) {
            Ok(samples) => samples,
            Err(fault) => halt(fault),
        };

        if is_tick && sampler.state() == SamplerState::Ready {
            ctx.stats.record_read_request();
        }

        if let Some(samples) = samples {
            let count = samples.len();
            // Block rather than drop: a slow renderer throttles sampling
            ctx.render
                .send_forever(RenderMessage::GraphSample(samples))
                .await;
            ctx.stats.record_samples(count);
        }
    }
}
