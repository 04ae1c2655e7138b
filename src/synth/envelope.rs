use super::config::AdsrParams;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RampKind {
    /// Jump to the value at the point's time.
    Step,
    /// Interpolate linearly from the previous point, arriving at the point's time.
    Linear,
}

/// A scheduled (time, value) pair on the gain timeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RampPoint {
    pub time: f64,
    pub value: f32,
    pub kind: RampKind,
}

/// Automation timeline for the envelope gain stage.
///
/// Holds the last reached point (the anchor) plus the points still ahead of
/// the clock. Times are seconds on the shared clock; values are amplitudes.
#[derive(Debug, Clone)]
pub struct GainParam {
    anchor_time: f64,
    anchor_value: f32,
    pending: Vec<RampPoint>,
}

impl GainParam {
    pub fn new(initial: f32) -> Self {
        Self {
            anchor_time: 0.0,
            anchor_value: initial,
            pending: Vec::new(),
        }
    }

    /// Gain the curve produces at time `t` (expected to be at or after the anchor).
    pub fn value_at(&self, t: f64) -> f32 {
        let mut from_time = self.anchor_time;
        let mut from_value = self.anchor_value;
        for point in &self.pending {
            if point.time <= t {
                from_time = point.time;
                from_value = point.value;
                continue;
            }
            return match point.kind {
                RampKind::Step => from_value,
                RampKind::Linear => {
                    let span = point.time - from_time;
                    if span <= 0.0 {
                        point.value
                    } else {
                        let progress = ((t - from_time) / span).clamp(0.0, 1.0) as f32;
                        from_value + (point.value - from_value) * progress
                    }
                }
            };
        }
        from_value
    }

    /// Points scheduled but not yet reached.
    pub fn pending(&self) -> &[RampPoint] {
        &self.pending
    }

    /// Discards every pending point at or after `t`.
    pub fn cancel_scheduled_values(&mut self, t: f64) {
        self.pending.retain(|p| p.time < t);
    }

    pub fn set_value_at_time(&mut self, value: f32, t: f64) {
        self.insert(RampPoint {
            time: t,
            value,
            kind: RampKind::Step,
        });
    }

    pub fn linear_ramp_to_value_at_time(&mut self, value: f32, t: f64) {
        self.insert(RampPoint {
            time: t,
            value,
            kind: RampKind::Linear,
        });
    }

    /// Pins the live gain at `now` after dropping everything from `now` on,
    /// so the next ramp starts where the curve actually is. Returns the pinned value.
    pub fn anchor_at(&mut self, now: f64) -> f32 {
        let current = self.value_at(now);
        self.cancel_scheduled_values(now);
        self.set_value_at_time(current, now);
        current
    }

    /// Folds points the clock has passed into the anchor.
    pub fn advance(&mut self, now: f64) {
        let passed = self.pending.partition_point(|p| p.time <= now);
        if passed == 0 {
            return;
        }
        let last = self.pending[passed - 1];
        self.anchor_time = last.time;
        self.anchor_value = last.value;
        self.pending.drain(..passed);
    }

    fn insert(&mut self, point: RampPoint) {
        debug_assert!(
            self.pending.last().map_or(true, |p| p.time <= point.time),
            "ramp points must be scheduled in time order"
        );
        let index = self.pending.partition_point(|p| p.time <= point.time);
        self.pending.insert(index, point);
    }
}

impl Default for GainParam {
    fn default() -> Self {
        Self::new(0.0)
    }
}

/// Schedules the piecewise-linear ADSR curve onto a [`GainParam`].
#[derive(Debug, Clone)]
pub struct EnvelopeScheduler {
    params: AdsrParams,
}

impl EnvelopeScheduler {
    pub fn new(params: AdsrParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &AdsrParams {
        &self.params
    }

    /// Ramp from the live gain to full level over `attack`, then down to `sustain` over `decay`.
    /// Returns the time at which the sustain plateau is reached.
    pub fn schedule_attack_decay(&self, now: f64, gain: &mut GainParam) -> f64 {
        let attack_end = now + self.params.attack() as f64;
        let decay_end = attack_end + self.params.decay() as f64;

        let from = gain.anchor_at(now);
        gain.linear_ramp_to_value_at_time(1.0, attack_end);
        gain.linear_ramp_to_value_at_time(self.params.sustain(), decay_end);

        log::debug!(
            "Attack/decay scheduled from gain {:.3} at {:.3}s, sustain at {:.3}s",
            from,
            now,
            decay_end
        );
        decay_end
    }

    /// Ramp from the live gain to silence over `release`. Returns the time silence is reached.
    pub fn schedule_release(&self, now: f64, gain: &mut GainParam) -> f64 {
        let release_end = now + self.params.release() as f64;

        let from = gain.anchor_at(now);
        gain.linear_ramp_to_value_at_time(0.0, release_end);

        log::debug!(
            "Release scheduled from gain {:.3} at {:.3}s, silent at {:.3}s",
            from,
            now,
            release_end
        );
        release_end
    }
}
