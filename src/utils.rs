use crate::config::DelayRange;
use rand::Rng;
use std::time::Duration;

/// Pick a duration uniformly from the range
pub fn random_delay(range: &DelayRange) -> Duration {
    let min = range.min_secs.max(0.0);
    let max = range.max_secs.max(min);
    if max <= min {
        return Duration::from_secs_f64(min);
    }
    let secs = rand::thread_rng().gen_range(min..=max);
    Duration::from_secs_f64(secs)
}

/// Sleep for a random duration within the range, logging the wait
pub async fn pause(range: &DelayRange, reason: &str) {
    let delay = random_delay(range);
    if delay.is_zero() {
        return;
    }
    ::log::debug!("Waiting {:.1} seconds ({})", delay.as_secs_f64(), reason);
    tokio::time::sleep(delay).await;
}
