//! Quiet-period debouncing for text inputs

use std::time::Duration;
use tokio::time::Instant;

/// Default quiet period before typed text is committed
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Holds at most one pending value; scheduling again replaces it and restarts the timer.
#[derive(Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    /// Take the pending value once its deadline has passed
    pub fn fire_due(&mut self, now: Instant) -> Option<T> {
        match &self.pending {
            Some((deadline, _)) if *deadline <= now => self.pending.take().map(|(_, value)| value),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_single_commit_after_last_keystroke() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DEFAULT_DEBOUNCE);
        let mut commits = Vec::new();

        let keystrokes = [(0, "i"), (100, "in"), (200, "inc"), (550, "ince")];
        let mut pending_keys = keystrokes.iter().peekable();

        // Step through time in 10ms increments
        for t in (0..=1500).step_by(10) {
            while let Some((at, text)) = pending_keys.peek() {
                if *at != t {
                    break;
                }
                debouncer.schedule(text.to_string(), start + ms(*at));
                pending_keys.next();
            }
            if let Some(value) = debouncer.fire_due(start + ms(t)) {
                commits.push((t, value));
            }
        }

        assert_eq!(commits, vec![(1050, "ince".to_string())]);
    }

    #[test]
    fn test_not_due_before_deadline() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.schedule(1, start);
        assert_eq!(debouncer.fire_due(start + ms(499)), None);
        assert_eq!(debouncer.deadline(), Some(start + ms(500)));
        assert_eq!(debouncer.fire_due(start + ms(500)), Some(1));
        assert_eq!(debouncer.deadline(), None);
    }

    #[test]
    fn test_cancel_drops_pending_value() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(ms(500));
        debouncer.schedule("x", start);
        debouncer.cancel();
        assert_eq!(debouncer.fire_due(start + ms(2000)), None);
    }
}
