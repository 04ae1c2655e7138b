/// A monotonically increasing time source, in seconds.
pub trait Clock {
    fn now(&self) -> f64;
}

/// Clock driven by the render loop: frames rendered divided by the sample rate.
#[derive(Debug, Clone)]
pub struct SampleClock {
    frames: u64,
    sample_rate: f32,
}

impl SampleClock {
    pub fn new(sample_rate: f32) -> Self {
        Self {
            frames: 0,
            sample_rate,
        }
    }

    pub fn sample_rate(&self) -> f32 {
        self.sample_rate
    }

    /// Rebases the clock on a new sample rate without moving the current time.
    pub fn set_sample_rate(&mut self, sample_rate: f32) {
        if sample_rate == self.sample_rate || sample_rate <= 0.0 {
            return;
        }
        let now = self.now();
        self.sample_rate = sample_rate;
        self.frames = (now * sample_rate as f64).round() as u64;
    }

    pub fn advance(&mut self, frames: u64) {
        self.frames += frames;
    }
}

impl Clock for SampleClock {
    fn now(&self) -> f64 {
        self.frames as f64 / self.sample_rate as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_clock_advances() {
        let mut clock = SampleClock::new(1000.0);
        assert_eq!(clock.now(), 0.0);
        clock.advance(250);
        assert_eq!(clock.now(), 0.25);
    }

    #[test]
    fn test_sample_rate_change_keeps_time() {
        let mut clock = SampleClock::new(1000.0);
        clock.advance(500);
        clock.set_sample_rate(48000.0);
        assert_eq!(clock.now(), 0.5);
        clock.advance(48000);
        assert_eq!(clock.now(), 1.5);
    }
}
