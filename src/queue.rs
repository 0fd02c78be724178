//! Bounded message queues
//!
//! [`Queue`] is a fixed-capacity FIFO built on an Embassy channel. It is the
//! only synchronization primitive between tasks: one task consumes each
//! queue, any number of tasks or timer contexts may produce into it.

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::channel::Channel;
use embassy_time::{with_timeout, Duration};

/// How long a queue operation may suspend the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Fail immediately; the only mode allowed from timer/interrupt context
    NoWait,
    /// Suspend for at most this long
    Ticks(Duration),
    /// Suspend until the operation completes
    Forever,
}

/// The operation could not complete within its [`Timeout`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TimedOut;

/// Fixed-capacity FIFO of `T` records, `N` deep
pub struct Queue<T, const N: usize> {
    channel: Channel<CriticalSectionRawMutex, T, N>,
}

impl<T, const N: usize> Queue<T, N> {
    pub const fn new() -> Self {
        Self {
            channel: Channel::new(),
        }
    }

    /// Copy `msg` into the queue, waiting for room according to `timeout`.
    pub async fn send(&self, msg: T, timeout: Timeout) -> Result<(), TimedOut> {
        match timeout {
            Timeout::NoWait => self.try_send(msg),
            Timeout::Ticks(limit) => with_timeout(limit, self.channel.send(msg))
                .await
                .map_err(|_| TimedOut),
            Timeout::Forever => {
                self.send_forever(msg).await;
                Ok(())
            }
        }
    }

    /// Wait as long as it takes for room. Cannot time out.
    pub async fn send_forever(&self, msg: T) {
        self.channel.send(msg).await
    }

    /// Non-blocking send for timer and interrupt contexts.
    pub fn try_send(&self, msg: T) -> Result<(), TimedOut> {
        self.channel.try_send(msg).map_err(|_| TimedOut)
    }

    /// Take the oldest message, waiting according to `timeout`.
    pub async fn receive(&self, timeout: Timeout) -> Result<T, TimedOut> {
        match timeout {
            Timeout::NoWait => self.try_receive().ok_or(TimedOut),
            Timeout::Ticks(limit) => with_timeout(limit, self.channel.receive())
                .await
                .map_err(|_| TimedOut),
            Timeout::Forever => Ok(self.channel.receive().await),
        }
    }

    /// Wait as long as it takes for the next message. This is what every task
    /// main loop blocks on.
    pub async fn recv(&self) -> T {
        self.channel.receive().await
    }

    pub fn try_receive(&self) -> Option<T> {
        self.channel.try_receive().ok()
    }

    pub fn len(&self) -> usize {
        self.channel.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channel.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.channel.is_full()
    }

    pub const fn capacity(&self) -> usize {
        N
    }

    /// Producer handle for this queue
    pub fn sender(&self) -> QueueSender<'_, T, N> {
        QueueSender { queue: self }
    }
}

impl<T, const N: usize> Default for Queue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Cheap, copyable producer handle passed to the tasks that feed a queue
pub struct QueueSender<'a, T, const N: usize> {
    queue: &'a Queue<T, N>,
}

impl<T, const N: usize> Clone for QueueSender<'_, T, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T, const N: usize> Copy for QueueSender<'_, T, N> {}

impl<'a, T, const N: usize> QueueSender<'a, T, N> {
    pub async fn send(&self, msg: T, timeout: Timeout) -> Result<(), TimedOut> {
        self.queue.send(msg, timeout).await
    }

    pub async fn send_forever(&self, msg: T) {
        self.queue.send_forever(msg).await
    }

    pub fn try_send(&self, msg: T) -> Result<(), TimedOut> {
        self.queue.try_send(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use embassy_futures::select::{select, Either};

    #[test]
    fn fifo_order_is_preserved() {
        let queue: Queue<u8, 4> = Queue::new();
        for value in [3, 1, 2] {
            queue.try_send(value).unwrap();
        }

        let drained: [u8; 3] = core::array::from_fn(|_| queue.try_receive().unwrap());
        assert_eq!(drained, [3, 1, 2]);
        assert!(queue.is_empty());
    }

    #[test]
    fn non_blocking_send_fails_when_full() {
        let queue: Queue<u8, 2> = Queue::new();
        queue.try_send(1).unwrap();
        queue.try_send(2).unwrap();

        assert!(queue.is_full());
        assert_eq!(queue.try_send(3), Err(TimedOut));
        assert_eq!(block_on(queue.send(3, Timeout::NoWait)), Err(TimedOut));
        assert_eq!(queue.len(), 2);
    }

    #[test]
    fn receive_without_waiting_on_empty_queue_times_out() {
        let queue: Queue<u8, 2> = Queue::new();
        assert_eq!(block_on(queue.receive(Timeout::NoWait)), Err(TimedOut));
    }

    #[test]
    fn bounded_receive_times_out_on_empty_queue() {
        let queue: Queue<u8, 2> = Queue::new();
        let result = block_on(queue.receive(Timeout::Ticks(Duration::from_millis(5))));
        assert_eq!(result, Err(TimedOut));
    }

    #[test]
    fn bounded_send_times_out_on_full_queue() {
        let queue: Queue<u8, 1> = Queue::new();
        queue.try_send(7).unwrap();
        let result = block_on(queue.send(8, Timeout::Ticks(Duration::from_millis(5))));
        assert_eq!(result, Err(TimedOut));
        assert_eq!(queue.try_receive(), Some(7));
    }

    #[test]
    fn blocked_sender_resumes_once_consumer_drains() {
        let queue: Queue<u8, 1> = Queue::new();
        let sender = queue.sender();
        sender.try_send(1).unwrap();

        let outcome = block_on(select(sender.send(2, Timeout::Forever), async {
            assert_eq!(queue.recv().await, 1);
            queue.recv().await
        }));

        // The sender finishes first; the second value is then still queued.
        match outcome {
            Either::First(sent) => {
                assert_eq!(sent, Ok(()));
                assert_eq!(queue.try_receive(), Some(2));
            }
            Either::Second(value) => assert_eq!(value, 2),
        }
    }

    #[test]
    fn forever_send_waits_for_room() {
        let queue: Queue<u8, 1> = Queue::new();
        let sender = queue.sender();
        sender.try_send(1).unwrap();

        let (_, drained) = block_on(embassy_futures::join::join(sender.send_forever(2), async {
            let first = queue.recv().await;
            (first, queue.recv().await)
        }));

        assert_eq!(drained, (1, 2));
        assert!(queue.is_empty());
    }

    #[test]
    fn capacity_reports_depth() {
        let queue: Queue<u8, 10> = Queue::default();
        assert_eq!(queue.capacity(), 10);
    }
}
