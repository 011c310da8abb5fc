//! Search window computation.
//!
//! The departures endpoint accepts at most two days per query and also
//! partitions its data by UTC calendar day, so a window may touch at most two
//! consecutive day indices. The window always starts at the story clock and
//! only its end is ever pulled in.

use skyhop_core::{day_index, SearchWindow, SECS_PER_DAY, SECS_PER_HOUR};

/// Window of `lookback_hours` starting at `sim_time_utc`, clamped to the source's limits.
pub fn compute_window(
    sim_time_utc: i64,
    lookback_hours: i64,
    max_window_secs: i64,
) -> SearchWindow {
    let begin_utc = sim_time_utc;
    let span = lookback_hours.max(0).saturating_mul(SECS_PER_HOUR);
    let mut end_utc = begin_utc.saturating_add(span.min(max_window_secs.max(0)));

    let begin_day = day_index(begin_utc);
    if day_index(end_utc) - begin_day > 1 {
        end_utc = (begin_day + 2) * SECS_PER_DAY - 1;
    }

    SearchWindow { begin_utc, end_utc }
}
