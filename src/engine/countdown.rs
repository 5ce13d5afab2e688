use serde::Serialize;

/// Emitted by [`Countdown::tick`]; each variant fires at most once per
/// countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum CountdownEvent {
    /// Remaining time crossed 10% of the total (only meaningful above the
    /// one-minute mark).
    TimeWarning,
    /// Remaining time crossed sixty seconds.
    CriticalWarning,
    Expired,
}

/// One-second countdown for a timed attempt. Untimed (practice) attempts
/// never warn and never expire.
#[derive(Debug, Clone)]
pub(crate) struct Countdown {
    total_seconds: Option<u64>,
    remaining_seconds: u64,
    warned_time: bool,
    warned_critical: bool,
    expired: bool,
}

impl Countdown {
    pub(crate) fn timed(total_seconds: u64) -> Self {
        Self {
            total_seconds: Some(total_seconds),
            remaining_seconds: total_seconds,
            warned_time: false,
            warned_critical: false,
            expired: false,
        }
    }

    pub(crate) fn untimed() -> Self {
        Self {
            total_seconds: None,
            remaining_seconds: 0,
            warned_time: false,
            warned_critical: false,
            expired: false,
        }
    }

    pub(crate) fn is_timed(&self) -> bool {
        self.total_seconds.is_some()
    }

    pub(crate) fn remaining_seconds(&self) -> Option<u64> {
        self.total_seconds.map(|_| self.remaining_seconds)
    }

    pub(crate) fn is_expired(&self) -> bool {
        self.expired
    }

    /// Advances the countdown by one second and reports threshold crossings.
    /// Ticking after expiry is a no-op.
    pub(crate) fn tick(&mut self) -> Vec<CountdownEvent> {
        let Some(total) = self.total_seconds else {
            return Vec::new();
        };
        if self.expired {
            return Vec::new();
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        let remaining = self.remaining_seconds;
        let mut events = Vec::new();

        if !self.warned_time && remaining > 60 && remaining <= total / 10 {
            self.warned_time = true;
            events.push(CountdownEvent::TimeWarning);
        }

        if !self.warned_critical && remaining > 0 && remaining <= 60 {
            self.warned_critical = true;
            events.push(CountdownEvent::CriticalWarning);
        }

        if remaining == 0 {
            self.expired = true;
            events.push(CountdownEvent::Expired);
        }

        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(countdown: &mut Countdown, ticks: u64) -> Vec<CountdownEvent> {
        let mut events = Vec::new();
        for _ in 0..ticks {
            events.extend(countdown.tick());
        }
        events
    }

    #[test]
    fn timed_countdown_emits_each_event_once() {
        let mut countdown = Countdown::timed(1000);

        let events = drain(&mut countdown, 1000);
        assert_eq!(
            events,
            vec![
                CountdownEvent::TimeWarning,
                CountdownEvent::CriticalWarning,
                CountdownEvent::Expired
            ]
        );
        assert!(countdown.is_expired());
    }

    #[test]
    fn time_warning_fires_at_ten_percent() {
        let mut countdown = Countdown::timed(1000);

        assert!(drain(&mut countdown, 899).is_empty());
        assert_eq!(countdown.tick(), vec![CountdownEvent::TimeWarning]);
        assert!(countdown.tick().is_empty());
    }

    #[test]
    fn short_exam_skips_time_warning() {
        // 10% of five minutes is under a minute, so only the critical
        // warning fires.
        let mut countdown = Countdown::timed(300);

        let events = drain(&mut countdown, 300);
        assert_eq!(events, vec![CountdownEvent::CriticalWarning, CountdownEvent::Expired]);
    }

    #[test]
    fn ticks_after_expiry_are_noops() {
        let mut countdown = Countdown::timed(2);
        drain(&mut countdown, 2);
        assert!(countdown.is_expired());

        assert!(countdown.tick().is_empty());
        assert_eq!(countdown.remaining_seconds(), Some(0));
    }

    #[test]
    fn untimed_never_warns_or_expires() {
        let mut countdown = Countdown::untimed();

        assert!(drain(&mut countdown, 10_000).is_empty());
        assert!(!countdown.is_expired());
        assert_eq!(countdown.remaining_seconds(), None);
    }
}
