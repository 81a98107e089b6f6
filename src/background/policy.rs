//! Background refresh policy
//!
//! Decides once per refresh tick whether a new background should be
//! fetched, and tracks the in-flight remote fetch.

use chrono::{DateTime, TimeDelta, Utc};

use crate::state::data::IntervalClass;

/// Outcome of a refresh tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshDecision {
    /// Nothing to do this tick
    NoOp,
    /// Fetch a new image unless one is already loading
    Fetch,
    /// Fetch even if a load is in flight; recovers from a stalled load
    ForceFetch,
}

/// Where a fetch gets its image from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchSource {
    /// A new photo from the photo service
    Remote,
    /// The last photo saved on disk
    Cache,
}

/// Identity of one fetch, handed back on completion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub id: u64,
    pub source: FetchSource,
    pub started_at: DateTime<Utc>,
}

/// What to do with a successful fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Show the image
    Apply,
    /// A more recently issued image is already on screen; drop this one
    Superseded,
}

/// Pure decision table for an elapsed time since the last change
pub fn decide(interval: IntervalClass, elapsed: TimeDelta) -> RefreshDecision {
    match interval {
        IntervalClass::Minute => {
            if elapsed < TimeDelta::minutes(1) {
                RefreshDecision::NoOp
            } else {
                RefreshDecision::Fetch
            }
        }
        IntervalClass::Hour => {
            if elapsed < TimeDelta::hours(1) {
                RefreshDecision::NoOp
            } else if elapsed > TimeDelta::hours(3) {
                RefreshDecision::ForceFetch
            } else {
                RefreshDecision::Fetch
            }
        }
        IntervalClass::Day => {
            if elapsed < TimeDelta::days(1) {
                RefreshDecision::NoOp
            } else {
                RefreshDecision::Fetch
            }
        }
    }
}

/// Refresh bookkeeping owned by the clock screen
#[derive(Debug, Clone, Default)]
pub struct RefreshState {
    last_change: Option<DateTime<Utc>>,
    is_loading: bool,
    /// Id of the last ticket handed out
    issued: u64,
    /// Id of the newest remote fetch; only its completion clears `is_loading`
    latest_remote: u64,
    /// Id of the ticket whose image is on screen, 0 for none
    shown: u64,
}

impl RefreshState {
    /// Start from the persisted time of the last background change
    pub fn new(last_change: Option<DateTime<Utc>>) -> Self {
        Self {
            last_change,
            ..Self::default()
        }
    }

    pub fn last_change(&self) -> Option<DateTime<Utc>> {
        self.last_change
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Number of tickets handed out so far
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Time since the last change. A background that was never changed
    /// counts as infinitely old.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        match self.last_change {
            Some(last) => now.signed_duration_since(last),
            None => TimeDelta::MAX,
        }
    }

    /// Decision for one refresh tick, including the in-flight guard
    pub fn on_tick(&self, now: DateTime<Utc>, interval: IntervalClass) -> RefreshDecision {
        match decide(interval, self.elapsed(now)) {
            RefreshDecision::Fetch if self.is_loading => RefreshDecision::NoOp,
            decision => decision,
        }
    }

    /// Issue a ticket. Remote fetches set the loading flag; cache loads
    /// never hold back a refresh.
    pub fn begin_fetch(&mut self, now: DateTime<Utc>, source: FetchSource) -> FetchTicket {
        self.issued += 1;

        if source == FetchSource::Remote {
            self.is_loading = true;
            self.latest_remote = self.issued;
        }

        FetchTicket {
            id: self.issued,
            source,
            started_at: now,
        }
    }

    /// Record a successful fetch.
    ///
    /// Any image issued after the one on screen is applied, even if newer
    /// fetches are still in flight. Remote images move the last-change
    /// time to when the fetch started; cached images leave it alone.
    pub fn finish_success(&mut self, ticket: FetchTicket) -> Completion {
        if ticket.source == FetchSource::Remote && ticket.id == self.latest_remote {
            self.is_loading = false;
        }

        if ticket.id <= self.shown {
            return Completion::Superseded;
        }

        self.shown = ticket.id;
        if ticket.source == FetchSource::Remote {
            self.last_change = Some(ticket.started_at);
        }
        Completion::Apply
    }

    /// Record a failed fetch. The last-change time never moves. For the
    /// newest remote fetch the loading flag is only cleared when
    /// `reset_loading` is set; cache failures never touch it.
    pub fn finish_failure(&mut self, ticket: FetchTicket, reset_loading: bool) {
        if reset_loading && ticket.source == FetchSource::Remote && ticket.id == self.latest_remote {
            self.is_loading = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn base() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
    }

    fn after(secs: i64) -> DateTime<Utc> {
        base() + TimeDelta::seconds(secs)
    }

    #[test]
    fn test_minute_table() {
        let state = RefreshState::new(Some(base()));
        assert_eq!(state.on_tick(after(59), IntervalClass::Minute), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(60), IntervalClass::Minute), RefreshDecision::Fetch);
        assert_eq!(state.on_tick(after(86_400 * 3), IntervalClass::Minute), RefreshDecision::Fetch);
    }

    #[test]
    fn test_hour_table() {
        let state = RefreshState::new(Some(base()));
        assert_eq!(state.on_tick(after(3_599), IntervalClass::Hour), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(3_600), IntervalClass::Hour), RefreshDecision::Fetch);
        assert_eq!(state.on_tick(after(10_800), IntervalClass::Hour), RefreshDecision::Fetch);
        assert_eq!(state.on_tick(after(10_801), IntervalClass::Hour), RefreshDecision::ForceFetch);
    }

    #[test]
    fn test_day_table() {
        let state = RefreshState::new(Some(base()));
        assert_eq!(state.on_tick(after(86_399), IntervalClass::Day), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(86_400), IntervalClass::Day), RefreshDecision::Fetch);
    }

    #[test]
    fn test_loading_suppresses_fetch_but_not_force() {
        let mut state = RefreshState::new(Some(base()));
        state.begin_fetch(base(), FetchSource::Remote);

        assert_eq!(state.on_tick(after(60), IntervalClass::Minute), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(7_200), IntervalClass::Hour), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(86_400), IntervalClass::Day), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(10_801), IntervalClass::Hour), RefreshDecision::ForceFetch);
    }

    #[test]
    fn test_never_changed_fetches_immediately() {
        let state = RefreshState::new(None);
        assert_eq!(state.on_tick(base(), IntervalClass::Minute), RefreshDecision::Fetch);
        assert_eq!(state.on_tick(base(), IntervalClass::Hour), RefreshDecision::ForceFetch);
        assert_eq!(state.on_tick(base(), IntervalClass::Day), RefreshDecision::Fetch);
    }

    #[test]
    fn test_clock_set_backwards_waits() {
        let state = RefreshState::new(Some(after(600)));
        assert_eq!(state.on_tick(base(), IntervalClass::Minute), RefreshDecision::NoOp);
    }

    #[test]
    fn test_success_records_fetch_start_and_clears_loading() {
        let mut state = RefreshState::new(Some(base()));
        let started = after(3_600);
        let ticket = state.begin_fetch(started, FetchSource::Remote);
        assert!(state.is_loading());

        assert_eq!(state.finish_success(ticket), Completion::Apply);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(started));
    }

    #[test]
    fn test_cache_load_keeps_timestamp() {
        let mut state = RefreshState::new(Some(base()));
        let ticket = state.begin_fetch(after(5), FetchSource::Cache);
        assert!(!state.is_loading());

        assert_eq!(state.finish_success(ticket), Completion::Apply);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(base()));
    }

    #[test]
    fn test_cache_load_does_not_block_refresh() {
        let mut state = RefreshState::new(Some(base()));
        let cached = state.begin_fetch(base(), FetchSource::Cache);

        // The first check runs alongside the cache load
        assert_eq!(state.on_tick(after(86_400), IntervalClass::Day), RefreshDecision::Fetch);

        // A corrupt cache file leaves nothing stuck
        state.finish_failure(cached, false);
        assert!(!state.is_loading());
        assert_eq!(state.on_tick(after(86_400 * 30), IntervalClass::Day), RefreshDecision::Fetch);
    }

    #[test]
    fn test_late_cache_load_does_not_replace_remote_image() {
        let mut state = RefreshState::new(None);
        let cached = state.begin_fetch(base(), FetchSource::Cache);
        let remote = state.begin_fetch(base(), FetchSource::Remote);

        assert_eq!(state.finish_success(remote), Completion::Apply);
        assert_eq!(state.finish_success(cached), Completion::Superseded);
        assert_eq!(state.last_change(), Some(base()));
    }

    #[test]
    fn test_failure_leaves_loading_stuck_by_default() {
        let mut state = RefreshState::new(Some(base()));
        let ticket = state.begin_fetch(after(60), FetchSource::Remote);

        state.finish_failure(ticket, false);
        assert!(state.is_loading());
        assert_eq!(state.last_change(), Some(base()));

        // Only the hour force rule gets past a stuck flag
        assert_eq!(state.on_tick(after(120), IntervalClass::Minute), RefreshDecision::NoOp);
        assert_eq!(state.on_tick(after(10_801), IntervalClass::Hour), RefreshDecision::ForceFetch);
    }

    #[test]
    fn test_failure_with_reset_clears_loading() {
        let mut state = RefreshState::new(Some(base()));
        let ticket = state.begin_fetch(after(60), FetchSource::Remote);

        state.finish_failure(ticket, true);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(base()));
        assert_eq!(state.on_tick(after(61), IntervalClass::Minute), RefreshDecision::Fetch);
    }

    #[test]
    fn test_completions_out_of_order() {
        let mut state = RefreshState::new(Some(base()));
        let older = state.begin_fetch(after(3_600), FetchSource::Remote);
        let newer = state.begin_fetch(after(10_801), FetchSource::Remote);

        assert_eq!(state.finish_success(newer), Completion::Apply);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(after(10_801)));

        // The older photo finishing late must not replace the newer one
        assert_eq!(state.finish_success(older), Completion::Superseded);
        assert_eq!(state.last_change(), Some(after(10_801)));
    }

    #[test]
    fn test_older_fetch_applies_while_newer_is_in_flight() {
        let mut state = RefreshState::new(Some(base()));
        let older = state.begin_fetch(after(3_600), FetchSource::Remote);
        let newer = state.begin_fetch(after(10_801), FetchSource::Remote);

        assert_eq!(state.finish_success(older), Completion::Apply);
        assert_eq!(state.last_change(), Some(after(3_600)));
        assert!(state.is_loading());

        // A failure of an older fetch must not clear the flag for the newer one
        state.finish_failure(older, true);
        assert!(state.is_loading());

        assert_eq!(state.finish_success(newer), Completion::Apply);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(after(10_801)));
    }

    #[test]
    fn test_slow_downloads_end_force_refresh() {
        // Ticks every second, every download takes two seconds
        let mut state = RefreshState::new(None);
        let mut in_flight: Vec<FetchTicket> = Vec::new();
        let mut applied = 0;

        for second in 0..600 {
            let now = after(second);

            let (done, pending): (Vec<_>, Vec<_>) = in_flight
                .into_iter()
                .partition(|t| now - t.started_at >= TimeDelta::seconds(2));
            in_flight = pending;
            for ticket in done {
                if state.finish_success(ticket) == Completion::Apply {
                    applied += 1;
                }
            }

            if state.on_tick(now, IntervalClass::Hour) != RefreshDecision::NoOp {
                in_flight.push(state.begin_fetch(now, FetchSource::Remote));
            }
        }

        assert_eq!(state.issued(), 2);
        assert_eq!(applied, 2);
        assert!(!state.is_loading());
        assert_eq!(state.last_change(), Some(after(1)));
    }
}
