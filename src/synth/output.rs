/// Master volume: a fixed gain applied to the mixed signal before it reaches the device.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputStage {
    gain: f32,
}

impl OutputStage {
    pub fn new(gain: f32) -> Self {
        Self {
            gain: gain.clamp(0.0, 1.0),
        }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    #[inline]
    pub fn apply(&self, sample: f32) -> f32 {
        sample * self.gain
    }
}

impl Default for OutputStage {
    fn default() -> Self {
        Self::new(0.5)
    }
}
