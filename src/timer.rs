//! Periodic timer sources
//!
//! A ticker posts one timer message per period into a task inbox. Like an
//! interrupt-context producer it never waits: a full inbox means the consumer
//! has stalled, and that is fatal.

use embassy_time::{Duration, Instant, Ticker};

use crate::fatal::{halt, Fault};
use crate::queue::QueueSender;

/// Post `make_message(ticks_elapsed)` into `sender` every `period`.
///
/// `ticks_elapsed` counts time-base ticks since the previous post.
pub async fn run_ticker<T, const N: usize>(
    name: &'static str,
    sender: QueueSender<'_, T, N>,
    period: Duration,
    make_message: impl Fn(u32) -> T,
) {
    info!("Timer '{}' started ({} ms)", name, period.as_millis());

    let mut ticker = Ticker::every(period);
    let mut last = Instant::now();

    loop {
        ticker.next().await;

        let now = Instant::now();
        let elapsed = (now - last).as_ticks() as u32;
        last = now;

        if sender.try_send(make_message(elapsed)).is_err() {
            halt(Fault::QueueFull { queue: name });
        }
    }
}
