//! Fixed-interval tick scheduling.

use std::time::{Duration, Instant};

/// Decides when the next render tick is due.
///
/// The first poll is always due. Later ticks keep a fixed cadence; if the
/// host falls more than one interval behind, missed ticks are skipped
/// rather than replayed in a burst.
#[derive(Clone, Debug)]
pub struct Ticker {
    interval: Duration,
    next_due: Option<Instant>,
}

impl Ticker {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval: interval.max(Duration::from_millis(1)),
            next_due: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// True if a tick is due at `now`; schedules the following one.
    pub fn due(&mut self, now: Instant) -> bool {
        match self.next_due {
            Some(due) if now < due => false,
            Some(due) => {
                let next = due + self.interval;
                self.next_due = Some(if next <= now { now + self.interval } else { next });
                true
            }
            None => {
                self.next_due = Some(now + self.interval);
                true
            }
        }
    }

    /// Time until the next tick, zero if one is already due.
    pub fn until_next(&self, now: Instant) -> Duration {
        self.next_due
            .map(|due| due.saturating_duration_since(now))
            .unwrap_or(Duration::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn fixed_cadence() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(50 * MS);
        assert!(ticker.due(t0));
        assert!(!ticker.due(t0 + 10 * MS));
        assert!(!ticker.due(t0 + 49 * MS));
        assert!(ticker.due(t0 + 55 * MS));
        // Next stays on the 50ms grid, not 55+50
        assert!(ticker.due(t0 + 100 * MS));
        assert_eq!(ticker.until_next(t0 + 120 * MS), 30 * MS);
    }

    #[test]
    fn skips_missed_ticks() {
        let t0 = Instant::now();
        let mut ticker = Ticker::new(50 * MS);
        ticker.due(t0);
        assert!(ticker.due(t0 + 500 * MS));
        assert!(!ticker.due(t0 + 510 * MS));
        assert!(ticker.due(t0 + 550 * MS));
    }

    #[test]
    fn zero_interval_clamped() {
        assert_eq!(Ticker::new(Duration::ZERO).interval(), MS);
        assert_eq!(Ticker::new(MS).until_next(Instant::now()), Duration::ZERO);
    }
}
