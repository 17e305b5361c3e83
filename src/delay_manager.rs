use std::time::Duration;
use std::thread;
use rand::Rng;
use log::debug;

/// Uniform jitter between retry attempts. A fixed cadence is easy for the
/// target site to fingerprint as automation.
pub const RETRY_BACKOFF_MIN_SECS: f64 = 2.0;
pub const RETRY_BACKOFF_MAX_SECS: f64 = 4.0;

pub fn jittered_delay(min_secs: f64, max_secs: f64) {
    if max_secs <= 0.0 {
        return;
    }
    let mut rng = rand::thread_rng();
    let delay_secs = rng.gen_range(min_secs..=max_secs);
    debug!("Waiting {:.1}s before next attempt...", delay_secs);
    thread::sleep(Duration::from_secs_f64(delay_secs));
}

pub fn launch_delay(secs: f64) {
    if secs <= 0.0 {
        return;
    }
    thread::sleep(Duration::from_secs_f64(secs));
}
