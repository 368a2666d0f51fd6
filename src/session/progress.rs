use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// How often the status caption advances while a request is in flight.
pub const PROGRESS_TICK: Duration = Duration::from_millis(2500);

/// Captions shown while the model works, cycled in order.
pub const PROGRESS_CAPTIONS: &[&str] = &[
    "Looking closely at the ingredients...",
    "Listening for health claims in the audio...",
    "Consulting classical medical texts...",
    "Searching clinical research databases...",
    "Weighing the safety evidence...",
    "Drafting your verdict card...",
];

/// Next caption index, wrapping at `len`.
pub fn next_index(current: usize, len: usize) -> usize {
    if len == 0 {
        0
    } else {
        (current + 1) % len
    }
}

/// Call `advance` every `period` until `token` is cancelled or `advance`
/// returns `false`. The first call happens one full period after spawning.
pub fn spawn_ticker<F>(period: Duration, token: CancellationToken, mut advance: F) -> JoinHandle<()>
where
    F: FnMut() -> bool + Send + 'static,
{
    let period = period.max(Duration::from_millis(1));
    tokio::spawn(async move {
        let mut interval = interval_at(Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = interval.tick() => {
                    if !advance() {
                        break;
                    }
                }
            }
        }
    })
}
