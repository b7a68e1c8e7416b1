//! Link statistics task
//!
//! Compares the drop counters once per interval and reports anything the
//! link had to discard. Purely diagnostic, nothing is fed back.

use defmt::*;
use embassy_time::{Duration, Ticker};

use crate::link::LINK;

/// Report interval in seconds
pub const STATS_INTERVAL_S: u64 = 10;

/// Stats task - warns once per interval when data was dropped
#[embassy_executor::task]
pub async fn stats_task() {
    info!("Stats task started");

    let mut ticker = Ticker::every(Duration::from_secs(STATS_INTERVAL_S));
    let mut last = LINK.stats();

    loop {
        ticker.next().await;

        let now = LINK.stats();
        let delta = now.since(&last);
        if delta.has_drops() {
            warn!("Link dropped data in the last {}s: {}", STATS_INTERVAL_S, delta);
        } else {
            trace!("{} lines in the last {}s", delta.lines_committed, STATS_INTERVAL_S);
        }
        last = now;
    }
}
