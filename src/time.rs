use std::time::{Duration, Instant};

enum Clock {
    Real { start: Instant, last: Instant },
    Fixed { step: Duration, elapsed: Duration },
}

/// Frame clock. Real-time for interactive runs, fixed-step for reproducible headless runs.
pub struct Time {
    clock: Clock,
    pub delta: Duration,
    frame: u64,
}

impl Default for Time {
    fn default() -> Self {
        Self::new()
    }
}

impl Time {
    pub fn new() -> Self {
        let now = Instant::now();
        Self { clock: Clock::Real { start: now, last: now }, delta: Duration::ZERO, frame: 0 }
    }

    pub fn fixed(step: Duration) -> Self {
        Self { clock: Clock::Fixed { step, elapsed: Duration::ZERO }, delta: Duration::ZERO, frame: 0 }
    }

    pub fn tick(&mut self) {
        match &mut self.clock {
            Clock::Real { last, .. } => {
                let now = Instant::now();
                self.delta = now - *last;
                *last = now;
            }
            Clock::Fixed { step, elapsed } => {
                *elapsed += *step;
                self.delta = *step;
            }
        }
        self.frame += 1;
    }

    pub fn delta_seconds(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    pub fn elapsed_seconds(&self) -> f32 {
        match &self.clock {
            Clock::Real { start, last } => last.duration_since(*start).as_secs_f32(),
            Clock::Fixed { elapsed, .. } => elapsed.as_secs_f32(),
        }
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }
}
