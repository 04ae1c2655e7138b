use super::error::GeneratorError;
use std::f32::consts::PI;

/// Identity of one tone generator instance, unique for the lifetime of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GeneratorId(pub u64);

/// Completion signal: the named generator has stopped emitting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorEnded {
    pub id: GeneratorId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Lifecycle {
    Playing,
    Stopping { at: f64 },
    Ended,
}

/// Output of one rendered sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Emission {
    Sample(f32),
    /// Emitted once, on the first sample at or past the stop time.
    Ended(GeneratorEnded),
    Silent,
}

/// Single-use triangle oscillator fixed at one frequency.
///
/// Starts emitting on creation. [`ToneGenerator::stop`] may be called once; it
/// schedules the end of emission, after which the generator reports
/// [`Emission::Ended`] and never sounds again.
#[derive(Debug, Clone)]
pub struct ToneGenerator {
    id: GeneratorId,
    frequency: f32,
    start_time: f64,
    phase: f32,
    lifecycle: Lifecycle,
}

impl ToneGenerator {
    pub fn start(id: GeneratorId, frequency: f32, now: f64) -> Self {
        log::debug!("Generator {:?} started at {:.1} Hz", id, frequency);
        Self {
            id,
            frequency,
            start_time: now,
            phase: 0.0,
            lifecycle: Lifecycle::Playing,
        }
    }

    pub fn id(&self) -> GeneratorId {
        self.id
    }

    pub fn frequency(&self) -> f32 {
        self.frequency
    }

    pub fn start_time(&self) -> f64 {
        self.start_time
    }

    /// Scheduled stop time, if `stop` has been called.
    pub fn stop_time(&self) -> Option<f64> {
        match self.lifecycle {
            Lifecycle::Stopping { at } => Some(at),
            _ => None,
        }
    }

    pub fn is_stopping(&self) -> bool {
        !matches!(self.lifecycle, Lifecycle::Playing)
    }

    pub fn has_ended(&self) -> bool {
        self.lifecycle == Lifecycle::Ended
    }

    pub fn stop(&mut self, at: f64) -> Result<(), GeneratorError> {
        match self.lifecycle {
            Lifecycle::Playing => {
                self.lifecycle = Lifecycle::Stopping { at };
                log::debug!("Generator {:?} will stop at {:.3}s", self.id, at);
                Ok(())
            }
            _ => Err(GeneratorError::AlreadyStopped),
        }
    }

    pub fn render(&mut self, now: f64, sample_rate: f32) -> Emission {
        match self.lifecycle {
            Lifecycle::Ended => return Emission::Silent,
            Lifecycle::Stopping { at } if now >= at => {
                self.lifecycle = Lifecycle::Ended;
                log::debug!("Generator {:?} ended at {:.3}s", self.id, now);
                return Emission::Ended(GeneratorEnded { id: self.id });
            }
            _ => {}
        }

        let sample = triangle(self.phase);
        self.phase += 2.0 * PI * self.frequency / sample_rate;
        if self.phase >= 2.0 * PI {
            self.phase -= 2.0 * PI;
        }
        Emission::Sample(sample)
    }
}

fn triangle(phase: f32) -> f32 {
    (2.0 / PI) * phase.sin().asin()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_triangle_shape() {
        assert_abs_diff_eq!(triangle(0.0), 0.0, epsilon = 1e-6);
        assert_abs_diff_eq!(triangle(PI / 2.0), 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(triangle(PI / 4.0), 0.5, epsilon = 1e-3);
        assert_abs_diff_eq!(triangle(3.0 * PI / 2.0), -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_emits_one_cycle_per_period() {
        let mut generator = ToneGenerator::start(GeneratorId(1), 100.0, 0.0);
        let sample_rate = 400.0;
        let samples: Vec<f32> = (0..4)
            .map(|i| match generator.render(i as f64 / 400.0, sample_rate) {
                Emission::Sample(s) => s,
                other => panic!("unexpected {:?}", other),
            })
            .collect();
        assert_abs_diff_eq!(samples[0], 0.0, epsilon = 1e-5);
        assert_abs_diff_eq!(samples[1], 1.0, epsilon = 1e-3);
        assert_abs_diff_eq!(samples[2], 0.0, epsilon = 1e-3);
        assert_abs_diff_eq!(samples[3], -1.0, epsilon = 1e-3);
    }

    #[test]
    fn test_stop_is_single_use() {
        let mut generator = ToneGenerator::start(GeneratorId(7), 220.0, 0.0);
        assert!(generator.stop(0.5).is_ok());
        assert_eq!(generator.stop(0.6), Err(GeneratorError::AlreadyStopped));
        assert_eq!(generator.stop_time(), Some(0.5));
    }

    #[test]
    fn test_keeps_sounding_until_stop_time_then_signals_once() {
        let mut generator = ToneGenerator::start(GeneratorId(3), 220.0, 0.0);
        generator.stop(0.01).unwrap();

        assert!(matches!(
            generator.render(0.005, 1000.0),
            Emission::Sample(_)
        ));
        assert_eq!(
            generator.render(0.01, 1000.0),
            Emission::Ended(GeneratorEnded { id: GeneratorId(3) })
        );
        assert!(generator.has_ended());
        assert_eq!(generator.render(0.011, 1000.0), Emission::Silent);
        assert_eq!(generator.stop(1.0), Err(GeneratorError::AlreadyStopped));
    }
}
