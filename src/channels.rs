//! Inter-task communication queues
//!
//! The three process-lifetime queues of the VoltGraph pipeline. They are
//! created at compile time, so start-up cannot run out of queue memory.

use crate::config::QUEUE_DEPTH;
use crate::queue::{Queue, QueueSender};
use crate::types::{BusRequest, RenderMessage, SamplerMessage};

pub type SamplerQueue = Queue<SamplerMessage, QUEUE_DEPTH>;
pub type RenderQueue = Queue<RenderMessage, QUEUE_DEPTH>;
pub type BusQueue = Queue<BusRequest, QUEUE_DEPTH>;

pub type SamplerSender<'a> = QueueSender<'a, SamplerMessage, QUEUE_DEPTH>;
pub type RenderSender<'a> = QueueSender<'a, RenderMessage, QUEUE_DEPTH>;
pub type BusSender<'a> = QueueSender<'a, BusRequest, QUEUE_DEPTH>;

/// Sampling task inbox: timer ticks and bus completions
pub static SAMPLER_QUEUE: SamplerQueue = Queue::new();

/// Rendering task inbox: timer ticks, graph samples and status text
pub static RENDER_QUEUE: RenderQueue = Queue::new();

/// Bus service inbox: transaction requests
pub static BUS_QUEUE: BusQueue = Queue::new();
