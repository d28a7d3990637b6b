use chrono::{DateTime, Utc};

/// Bounds how much time-series history is fetched per id.
///
/// Full histories can be enormous; both knobs trade completeness for fetch
/// time and are independent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeriesWindow {
    /// Skip points that have already elapsed, starting the cursor at "now"
    /// instead of the interval start.
    pub skip_past_data: bool,
    /// Hard cap on points fetched per id, even if the server holds more.
    pub max_points: Option<u64>,
}

impl SeriesWindow {
    /// Starting offset for an interval beginning at `interval_start`,
    /// evaluated at `now`.
    pub fn start_offset(&self, interval_start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
        if self.skip_past_data {
            offset_from_now(interval_start, now)
        } else {
            0
        }
    }

    /// Absolute offset at which fetching must stop, if capped.
    pub fn stop_offset(&self, start_offset: u64) -> Option<u64> {
        self.max_points.map(|max| start_offset + max)
    }
}

/// Number of hourly points between an interval's start and "now".
///
/// Series values are hourly, so the already-elapsed prefix is simply the
/// whole hours since the interval began. Intervals starting in the future
/// have nothing to skip.
pub fn offset_from_now(interval_start: DateTime<Utc>, now: DateTime<Utc>) -> u64 {
    let elapsed = now.signed_duration_since(interval_start);
    elapsed.num_hours().max(0) as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    fn t0() -> DateTime<Utc> {
        "2021-03-01T00:00:00Z".parse().unwrap()
    }

    #[test]
    fn skips_elapsed_hours() {
        let window = SeriesWindow {
            skip_past_data: true,
            max_points: None,
        };
        let now = t0() + TimeDelta::hours(48);
        assert_eq!(window.start_offset(t0(), now), 48);
    }

    #[test]
    fn future_interval_skips_nothing() {
        let now = t0() - TimeDelta::hours(5);
        assert_eq!(offset_from_now(t0(), now), 0);
    }

    #[test]
    fn stop_offset_adds_cap_to_start() {
        let window = SeriesWindow {
            skip_past_data: true,
            max_points: Some(120),
        };
        assert_eq!(window.stop_offset(48), Some(168));
    }
}
