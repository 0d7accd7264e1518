use std::time::Duration;

/// Ordered retry-wait schedule for one call, consumed front to back.
///
/// The schedule is fixed at submission time and never recomputed: attempt `k`
/// always waits the `k`-th listed duration before attempt `k + 1`. An empty
/// schedule means the call is attempted exactly once. No jitter is applied;
/// a schedule that wants jitter must encode it in the listed values.
/// Cloning is cheap enough for call sites to snapshot per-request settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BackoffSchedule {
    intervals: Vec<Duration>,
}

impl BackoffSchedule {
    pub fn new(intervals: Vec<Duration>) -> Self {
        Self { intervals }
    }

    /// A schedule with no retries: one attempt, then terminal.
    pub fn none() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Wait duration before attempt `attempt + 1`, or `None` once the
    /// schedule is exhausted. `attempt` is 0-based.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        self.intervals.get(attempt as usize).copied()
    }

    /// Total attempts a call using this schedule can make, first one included.
    pub fn max_attempts(&self) -> u32 {
        self.intervals.len() as u32 + 1
    }

    pub fn intervals(&self) -> &[Duration] {
        &self.intervals
    }
}

impl Default for BackoffSchedule {
    /// Stock schedule: 10 seconds, 5 minutes, 20 minutes.
    fn default() -> Self {
        Self::new(vec![
            Duration::from_secs(10),
            Duration::from_secs(5 * 60),
            Duration::from_secs(20 * 60),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delays_are_consumed_front_to_back() {
        let schedule = BackoffSchedule::new(vec![
            Duration::from_millis(100),
            Duration::from_millis(200),
        ]);
        assert_eq!(schedule.delay_for(0), Some(Duration::from_millis(100)));
        assert_eq!(schedule.delay_for(1), Some(Duration::from_millis(200)));
        assert_eq!(schedule.delay_for(2), None);
        assert_eq!(schedule.max_attempts(), 3);
    }

    #[test]
    fn empty_schedule_means_single_attempt() {
        let schedule = BackoffSchedule::none();
        assert_eq!(schedule.delay_for(0), None);
        assert_eq!(schedule.max_attempts(), 1);
    }

    #[test]
    fn same_attempt_always_yields_same_delay() {
        let schedule = BackoffSchedule::default();
        assert_eq!(schedule.intervals().len(), 3);
        assert_eq!(schedule.delay_for(1), schedule.delay_for(1));
        assert_eq!(schedule.delay_for(0), Some(Duration::from_secs(10)));
        assert_eq!(schedule.delay_for(2), Some(Duration::from_secs(20 * 60)));
    }
}
