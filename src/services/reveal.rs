use std::time::Duration;

use tokio::time::{interval, MissedTickBehavior};

/// Progress of a character-by-character reveal of an already received reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reveal {
    text: String,
    /// Byte offset of the end of the revealed prefix, always on a char boundary.
    shown: usize,
}

impl Reveal {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            shown: 0,
        }
    }

    /// Number of ticks the whole reveal takes.
    pub fn tick_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_done(&self) -> bool {
        self.shown >= self.text.len()
    }

    pub fn display(&self) -> &str {
        &self.text[..self.shown]
    }

    pub fn full_text(&self) -> &str {
        &self.text
    }

    /// Reveal one more character. Returns `false` once nothing is left.
    pub fn advance(&mut self) -> bool {
        match self.text[self.shown..].chars().next() {
            Some(c) => {
                self.shown += c.len_utf8();
                true
            }
            None => false,
        }
    }
}

/// Emit exactly `ticks` callbacks, one per `period`, then return.
///
/// The first callback fires one period after the call, never immediately.
pub async fn run_ticks<F>(ticks: usize, period: Duration, mut on_tick: F)
where
    F: FnMut(usize) + Send,
{
    if ticks == 0 {
        return;
    }

    let mut timer = interval(period);
    timer.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval completes immediately.
    timer.tick().await;

    for tick in 1..=ticks {
        timer.tick().await;
        on_tick(tick);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_reveal_one_char_per_advance() {
        let mut reveal = Reveal::new("abc");
        assert_eq!(reveal.tick_count(), 3);
        assert_eq!(reveal.display(), "");

        let mut renderings = Vec::new();
        while reveal.advance() {
            renderings.push(reveal.display().to_string());
        }
        assert_eq!(renderings, ["a", "ab", "abc"]);
        assert!(reveal.is_done());
        assert!(!reveal.advance());
    }

    #[test]
    fn test_reveal_respects_char_boundaries() {
        let mut reveal = Reveal::new("héllo 👋");
        assert_eq!(reveal.tick_count(), 7);
        let mut count = 0;
        while reveal.advance() {
            count += 1;
        }
        assert_eq!(count, 7);
        assert_eq!(reveal.display(), "héllo 👋");
    }

    #[test]
    fn test_empty_reveal_is_done() {
        let mut reveal = Reveal::new("");
        assert!(reveal.is_done());
        assert!(!reveal.advance());
        assert_eq!(reveal.full_text(), "");
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_ticks_emits_exact_count() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_cb = seen.clone();

        let start = tokio::time::Instant::now();
        run_ticks(5, Duration::from_millis(50), move |tick| {
            seen_cb.lock().unwrap().push(tick);
        })
        .await;

        assert_eq!(*seen.lock().unwrap(), vec![1, 2, 3, 4, 5]);
        assert_eq!(start.elapsed(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_zero_ticks_returns_immediately() {
        let start = tokio::time::Instant::now();
        run_ticks(0, Duration::from_millis(50), |_| panic!("no ticks expected")).await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
