use std::time::{Duration, Instant};

use crate::control::EngineHandle;

/// Time left to sleep so that a tick which already spent `work` lasts
/// `1 / max_fps` seconds. Zero when the rate is unlimited (`<= 0`).
///
/// Rates too low for a [`Duration`] to hold their period saturate to
/// [`Duration::MAX`].
pub fn pacing_delay(max_fps: f64, work: Duration) -> Duration {
    if !max_fps.is_finite() || max_fps <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(1.0 / max_fps)
        .unwrap_or(Duration::MAX)
        .saturating_sub(work)
}

/// Caps the tick rate of the engine loop.
#[derive(Debug, Clone)]
pub struct FrameClock {
    handle: EngineHandle,
}

impl FrameClock {
    pub fn new(handle: EngineHandle) -> Self {
        Self { handle }
    }

    /// Sleeps off the rest of the current tick and returns the tick's full
    /// duration, measured again after waking since sleeps overshoot.
    ///
    /// A stop request cuts the sleep short.
    pub fn pace(&self, tick_start: Instant) -> Duration {
        let delay = pacing_delay(self.handle.max_fps(), tick_start.elapsed());
        if !delay.is_zero() {
            self.handle.sleep(delay);
        }
        tick_start.elapsed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_fills_remaining_budget() {
        let delay = pacing_delay(10.0, Duration::from_millis(30));
        assert!((delay.as_secs_f64() - 0.07).abs() < 1e-9);
    }

    #[test]
    fn test_unlimited_rate_never_sleeps() {
        assert_eq!(pacing_delay(0.0, Duration::ZERO), Duration::ZERO);
        assert_eq!(pacing_delay(-5.0, Duration::from_millis(3)), Duration::ZERO);
        assert_eq!(pacing_delay(f64::NAN, Duration::ZERO), Duration::ZERO);
        assert_eq!(pacing_delay(f64::INFINITY, Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_over_budget_work_never_sleeps() {
        assert_eq!(pacing_delay(10.0, Duration::from_millis(250)), Duration::ZERO);
    }

    #[test]
    fn test_tiny_rate_saturates() {
        assert_eq!(pacing_delay(1e-300, Duration::ZERO), Duration::MAX);
        assert_eq!(
            pacing_delay(1e-300, Duration::from_secs(1)),
            Duration::MAX - Duration::from_secs(1)
        );
    }

    #[test]
    fn test_pace_tiny_rate_waits_for_stop() {
        let handle = EngineHandle::new(1e-19);
        let clock = FrameClock::new(handle.clone());
        let stopper = std::thread::spawn(move || {
            std::thread::sleep(Duration::from_millis(30));
            handle.stop();
        });

        let elapsed = clock.pace(Instant::now());
        stopper.join().unwrap();
        assert!(elapsed >= Duration::from_millis(25), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(5));
    }

    #[test]
    fn test_pace_blocks_until_budget_spent() {
        let clock = FrameClock::new(EngineHandle::new(20.0));
        let start = Instant::now();
        let elapsed = clock.pace(start);
        assert!(elapsed >= Duration::from_millis(45), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_secs(2));
    }

    #[test]
    fn test_pace_unlimited_reports_work_time() {
        let clock = FrameClock::new(EngineHandle::new(0.0));
        let elapsed = clock.pace(Instant::now());
        assert!(elapsed < Duration::from_millis(50));
    }
}
