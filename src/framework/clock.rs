
use std::time::{Instant, Duration};

use crate::debug;

/// One presented frame as seen by the updater.
#[derive(Clone, Debug)]
pub struct Frame {
    /// Number of the frame, first frame has order 1
    pub order: u64,
    pub time:  Instant,
    /// Wall time since previous frame, used only for camera smoothing
    pub delta: Duration,
}

/// Clock counting frames as they are requested by display refresh
///  - it measures time between frames
///  - it reports frames per second once a second
pub struct FrameClock {
    current_frame: Frame,

    // FPS measurement
    elapsed_seconds: f32,
    frame_counter:   u32,
}

impl FrameClock {
    pub fn now() -> Self {
        Self {
            current_frame: Frame {
                order: 0,
                time:  Instant::now(),
                delta: Duration::ZERO,
            },
            elapsed_seconds: 0.0,
            frame_counter:   0,
        }
    }

    /// Advances the clock by one frame and returns the new current frame.
    pub fn next_frame(&mut self) -> &Frame {
        self.advance_to(Instant::now())
    }

    fn advance_to(&mut self, time: Instant) -> &Frame {
        self.current_frame.order += 1;
        self.current_frame.delta  = time.saturating_duration_since(self.current_frame.time);
        self.current_frame.time   = time;

        self.elapsed_seconds += self.current_frame.delta.as_secs_f32();
        self.frame_counter += 1;
        if self.elapsed_seconds > 1.0 {
            debug!("Frames per second: {}", self.frame_counter);
            self.elapsed_seconds -= 1.0;
            self.frame_counter = 0;
        }

        &self.current_frame
    }

    pub fn current_frame(&self) -> &Frame {
        &self.current_frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frames_are_numbered_from_one() {
        let mut clock = FrameClock::now();
        assert_eq!(clock.current_frame().order, 0);
        assert_eq!(clock.next_frame().order, 1);
        assert_eq!(clock.next_frame().order, 2);
    }

    #[test]
    fn fps_counter_restarts_after_a_second() {
        let mut clock = FrameClock::now();
        let start = clock.current_frame().time;
        for i in 1..=3 {
            clock.advance_to(start + Duration::from_millis(300 * i));
        }
        assert_eq!(clock.frame_counter, 3);
        clock.advance_to(start + Duration::from_millis(1200));
        assert_eq!(clock.frame_counter, 0);
        assert!((clock.elapsed_seconds - 0.2).abs() < 1e-4);
        assert_eq!(clock.current_frame().delta, Duration::from_millis(300));
    }
}
