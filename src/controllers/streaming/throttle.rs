use std::time::{Duration, Instant};

/// Spaces session dispatches at least `min_interval` apart.
///
/// The throttle only decides *when* the pending request may go; coalescing is
/// the caller keeping a single pending slot that newer requests overwrite.
#[derive(Debug, Clone)]
pub struct Throttle {
    min_interval: Duration,
    last_dispatch: Option<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    DispatchNow,
    WaitFor(Duration),
}

impl Throttle {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_dispatch: None,
        }
    }

    #[must_use]
    pub fn check(&self, now: Instant) -> ThrottleDecision {
        let Some(last_dispatch) = self.last_dispatch else {
            return ThrottleDecision::DispatchNow;
        };

        let ready_at = last_dispatch + self.min_interval;
        if now >= ready_at {
            ThrottleDecision::DispatchNow
        } else {
            ThrottleDecision::WaitFor(ready_at - now)
        }
    }

    pub fn mark_dispatched(&mut self, now: Instant) {
        self.last_dispatch = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatches_immediately_when_idle() {
        let throttle = Throttle::new(Duration::from_millis(100));

        assert_eq!(throttle.check(Instant::now()), ThrottleDecision::DispatchNow);
    }

    #[test]
    fn waits_out_the_remaining_interval() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        let start = Instant::now();
        throttle.mark_dispatched(start);

        let decision = throttle.check(start + Duration::from_millis(30));

        assert_eq!(decision, ThrottleDecision::WaitFor(Duration::from_millis(70)));
    }

    #[test]
    fn dispatches_once_the_interval_elapsed() {
        let mut throttle = Throttle::new(Duration::from_millis(100));
        let start = Instant::now();
        throttle.mark_dispatched(start);

        assert_eq!(
            throttle.check(start + Duration::from_millis(100)),
            ThrottleDecision::DispatchNow
        );
    }

    #[test]
    fn zero_interval_never_waits() {
        let mut throttle = Throttle::new(Duration::ZERO);
        let start = Instant::now();
        throttle.mark_dispatched(start);

        assert_eq!(throttle.check(start), ThrottleDecision::DispatchNow);
    }
}
