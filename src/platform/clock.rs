//! Frame pacing

use std::time::{Duration, Instant};

/// Monotonic clock that holds the loop to a target frame rate
#[derive(Debug)]
pub struct FrameClock {
    frame: Duration,
    last: Instant,
}

impl FrameClock {
    pub fn new(fps: u32) -> Self {
        Self {
            frame: Duration::from_nanos(1_000_000_000 / fps.max(1) as u64),
            last: Instant::now(),
        }
    }

    /// Target frame duration
    pub fn frame(&self) -> Duration {
        self.frame
    }

    /// Sleep off whatever is left of the current frame, then return the time
    /// since the previous call (in seconds)
    pub fn tick(&mut self) -> f32 {
        let deadline = self.last + self.frame;
        let now = Instant::now();
        if now < deadline {
            std::thread::sleep(deadline - now);
        }
        let now = Instant::now();
        let elapsed = now.duration_since(self.last);
        self.last = now;
        elapsed.as_secs_f32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_waits_at_least_one_frame() {
        let mut clock = FrameClock::new(100);
        assert_eq!(clock.frame(), Duration::from_millis(10));
        clock.tick();
        let dt = clock.tick();
        assert!(dt >= 0.0099, "frame took {dt}s");
    }
}
