use log::{info, warn, error};

use crate::delay_manager;
use crate::profile_scraper::profile_url;
use crate::record_store::FollowerRecord;

pub const DEFAULT_MIN_FOLLOWERS: i64 = 5000;

/// Opening tabs faster than this tends to trip traffic blocks.
pub const MIN_LAUNCH_DELAY_SECS: f64 = 2.0;

pub struct LaunchFilter {
    pub min_followers: i64,
    /// `None` means no upper bound.
    pub max_followers: Option<i64>,
}

/// Keep records with a numeric count in `[min, max]` inclusive, sorted by
/// follower count descending. Failure-marker rows have no count and are
/// excluded outright.
pub fn filter_and_sort(
    records: Vec<FollowerRecord>,
    filter: &LaunchFilter,
) -> Vec<(String, i64)> {
    let mut hits: Vec<(String, i64)> = records
        .into_iter()
        .filter_map(|r| r.followers.count().map(|c| (r.username, c)))
        .filter(|(_, count)| {
            *count >= filter.min_followers
                && filter.max_followers.map_or(true, |max| *count <= max)
        })
        .collect();
    hits.sort_by(|a, b| b.1.cmp(&a.1));
    hits
}

pub fn parse_min_followers(input: &str) -> i64 {
    match input.trim().parse() {
        Ok(min) => min,
        Err(_) => {
            warn!(
                "Invalid input. Using default minimum cutoff of {}.",
                DEFAULT_MIN_FOLLOWERS
            );
            DEFAULT_MIN_FOLLOWERS
        }
    }
}

/// `0` and unparseable input both mean "no upper limit".
pub fn parse_max_followers(input: &str) -> Option<i64> {
    match input.trim().parse::<i64>() {
        Ok(max) if max > 0 => Some(max),
        Ok(_) => None,
        Err(_) => {
            warn!("Invalid input. Using no upper limit.");
            None
        }
    }
}

pub fn parse_delay_secs(input: &str) -> f64 {
    match input.trim().parse::<f64>() {
        Ok(delay) if delay >= MIN_LAUNCH_DELAY_SECS => delay,
        Ok(_) => {
            warn!(
                "Delay too short! Setting to the recommended minimum of {} seconds.",
                MIN_LAUNCH_DELAY_SECS
            );
            MIN_LAUNCH_DELAY_SECS
        }
        Err(_) => {
            warn!(
                "Invalid input. Using the default delay of {} seconds.",
                MIN_LAUNCH_DELAY_SECS
            );
            MIN_LAUNCH_DELAY_SECS
        }
    }
}

/// Fire-and-forget: open each profile in the system browser with a pause
/// between openings. One failed launch never stops the sequence.
pub fn launch(profiles: &[(String, i64)], delay_secs: f64) {
    for (username, followers) in profiles {
        let url = profile_url(username);
        info!("Opening: {} with {} followers", url, followers);
        if let Err(e) = open::that(&url) {
            error!("Failed to open {}: {}", url, e);
        }
        delay_manager::launch_delay(delay_secs);
    }
}
