//! Trailing-edge debounce for save scheduling.
//!
//! Mutations happen in bursts (tap storms, buy sprees), and writing a blob
//! per mutation would hammer storage. [`DebouncedSaver`] coalesces them: each
//! dirty mark restarts a countdown, and the save fires once when the burst
//! goes quiet. It holds no timer of its own; the engine polls it from its
//! once-per-second tick with the same clock it does everything else with.

/// Poll-driven trailing debounce window.
#[derive(Debug)]
pub struct DebouncedSaver {
    delay_ms: i64,
    due_at_ms: Option<i64>,
}

impl DebouncedSaver {
    pub fn new(delay_ms: i64) -> Self {
        Self {
            delay_ms,
            due_at_ms: None,
        }
    }

    /// Records a mutation. The pending save (if any) is pushed back so the
    /// write lands `delay_ms` after the burst ends, not during it.
    pub fn mark_dirty(&mut self, now_ms: i64) {
        self.due_at_ms = Some(now_ms.saturating_add(self.delay_ms));
    }

    /// Returns true exactly once when the window has elapsed, disarming in
    /// the same call. The caller performs the save.
    pub fn take_due(&mut self, now_ms: i64) -> bool {
        match self.due_at_ms {
            Some(due) if due <= now_ms => {
                self.due_at_ms = None;
                true
            }
            _ => false,
        }
    }

    /// Drops any pending save, e.g. after an explicit immediate save made it
    /// redundant.
    pub fn cancel(&mut self) {
        self.due_at_ms = None;
    }

    /// Whether a save is scheduled.
    pub fn is_pending(&self) -> bool {
        self.due_at_ms.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_coalesces_into_one_save() {
        let mut saver = DebouncedSaver::new(1_000);
        saver.mark_dirty(0);
        saver.mark_dirty(300);
        saver.mark_dirty(600);
        assert!(!saver.take_due(1_599));
        assert!(saver.take_due(1_600));
        assert!(!saver.take_due(1_601));
        assert!(!saver.is_pending());
    }

    #[test]
    fn quiet_saver_never_fires() {
        let mut saver = DebouncedSaver::new(1_000);
        assert!(!saver.take_due(i64::MAX));
    }

    #[test]
    fn rearms_after_firing() {
        let mut saver = DebouncedSaver::new(1_000);
        saver.mark_dirty(0);
        assert!(saver.take_due(1_000));
        saver.mark_dirty(5_000);
        assert!(!saver.take_due(5_999));
        assert!(saver.take_due(6_000));
    }

    #[test]
    fn cancel_discards_pending_save() {
        let mut saver = DebouncedSaver::new(1_000);
        saver.mark_dirty(0);
        saver.cancel();
        assert!(!saver.take_due(10_000));
    }

    #[test]
    fn zero_delay_fires_on_next_poll() {
        let mut saver = DebouncedSaver::new(0);
        saver.mark_dirty(42);
        assert!(saver.take_due(42));
    }
}
