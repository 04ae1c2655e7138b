use super::config::{AdsrParams, SynthConfig};
use super::envelope::{EnvelopeScheduler, GainParam};
use super::error::ConfigError;
use super::oscillator::{Emission, GeneratorEnded, GeneratorId, ToneGenerator};

/// Whether the controller is holding a note. `Idle` means "accepting new notes";
/// a released note may still be ringing out.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteState {
    Idle,
    Sounding { frequency: f32, start_time: f64 },
}

/// Single-voice note lifecycle: owns the envelope gain stage and the one
/// tone generator that may be connected to it.
#[derive(Debug, Clone)]
pub struct NoteController {
    state: NoteState,
    envelope: EnvelopeScheduler,
    gain: GainParam,
    generator: Option<ToneGenerator>,
    next_generator_id: u64,
    stop_margin: f64,
}

impl NoteController {
    pub fn new(params: AdsrParams, stop_margin: f32) -> Self {
        Self {
            state: NoteState::Idle,
            envelope: EnvelopeScheduler::new(params),
            gain: GainParam::new(0.0),
            generator: None,
            next_generator_id: 0,
            stop_margin: stop_margin.max(0.0) as f64,
        }
    }

    pub fn from_config(config: &SynthConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::new(config.adsr()?, config.stop_margin))
    }

    pub fn state(&self) -> NoteState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, NoteState::Sounding { .. })
    }

    pub fn gain(&self) -> &GainParam {
        &self.gain
    }

    pub fn generator(&self) -> Option<&ToneGenerator> {
        self.generator.as_ref()
    }

    /// Starts a note, or retriggers the held one.
    ///
    /// The current generator is kept only if it is still playing at the same
    /// pitch; otherwise it is disconnected and replaced. Attack always restarts
    /// from the live gain.
    pub fn note_on(&mut self, frequency: f32, now: f64) {
        if !(frequency.is_finite() && frequency > 0.0) {
            log::warn!("Note on ignored: invalid frequency {}", frequency);
            return;
        }

        let keep_generator = matches!(
            &self.generator,
            Some(g) if !g.is_stopping() && g.frequency() == frequency
        );
        if !keep_generator {
            if let Some(old) = self.generator.take() {
                log::debug!("Disconnecting generator {:?} (superseded)", old.id());
            }
            let id = self.allocate_generator_id();
            self.generator = Some(ToneGenerator::start(id, frequency, now));
        }

        match self.state {
            NoteState::Idle => log::debug!("Note on {:.1} Hz at {:.3}s", frequency, now),
            NoteState::Sounding { .. } => {
                log::debug!("Retrigger {:.1} Hz at {:.3}s", frequency, now)
            }
        }

        self.envelope.schedule_attack_decay(now, &mut self.gain);
        self.state = NoteState::Sounding {
            frequency,
            start_time: now,
        };
    }

    /// Releases the held note. The generator keeps running through the release
    /// tail and stops `stop_margin` after silence. No-op while idle.
    pub fn note_off(&mut self, now: f64) {
        if !self.is_playing() {
            log::debug!("Note off ignored at {:.3}s: no note is sounding", now);
            return;
        }

        let silent_at = self.envelope.schedule_release(now, &mut self.gain);
        if let Some(generator) = self.generator.as_mut() {
            if let Err(e) = generator.stop(silent_at + self.stop_margin) {
                log::warn!("Generator {:?} could not be stopped: {}", generator.id(), e);
            }
        }
        self.state = NoteState::Idle;
        log::debug!("Note off at {:.3}s", now);
    }

    /// Renders one sample of generator output through the envelope gain.
    /// Returns a completion signal on the sample the generator ends.
    pub fn render(&mut self, now: f64, sample_rate: f32) -> (f32, Option<GeneratorEnded>) {
        let gain = self.gain.value_at(now);
        match self.generator.as_mut().map(|g| g.render(now, sample_rate)) {
            Some(Emission::Sample(sample)) => (sample * gain, None),
            Some(Emission::Ended(ended)) => (0.0, Some(ended)),
            Some(Emission::Silent) | None => (0.0, None),
        }
    }

    /// Drops automation points the clock has passed.
    pub fn advance(&mut self, now: f64) {
        self.gain.advance(now);
    }

    /// Deferred cleanup for a finished generator. Signals naming a generator
    /// that has already been replaced are ignored.
    pub fn on_generator_ended(&mut self, ended: GeneratorEnded) {
        match &self.generator {
            Some(current) if current.id() == ended.id => {
                log::debug!("Generator {:?} finished, disconnecting", ended.id);
                self.generator = None;
            }
            _ => log::debug!("Ignoring stale completion from generator {:?}", ended.id),
        }
    }

    fn allocate_generator_id(&mut self) -> GeneratorId {
        self.next_generator_id += 1;
        GeneratorId(self.next_generator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn controller() -> NoteController {
        NoteController::new(AdsrParams::new(0.1, 0.1, 0.3, 0.2).unwrap(), 0.01)
    }

    #[test]
    fn test_note_on_from_idle() {
        let mut ctl = controller();
        ctl.note_on(440.0, 0.0);

        assert_eq!(
            ctl.state(),
            NoteState::Sounding {
                frequency: 440.0,
                start_time: 0.0
            }
        );
        let generator = ctl.generator().unwrap();
        assert_eq!(generator.frequency(), 440.0);
        assert!(!generator.is_stopping());
        assert_abs_diff_eq!(ctl.gain().value_at(0.1), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_note_off_mid_decay() {
        let mut ctl = controller();
        ctl.note_on(440.0, 0.0);
        ctl.note_off(0.15);

        assert_eq!(ctl.state(), NoteState::Idle);
        assert_abs_diff_eq!(ctl.gain().value_at(0.15), 0.65, epsilon = 1e-5);
        assert_abs_diff_eq!(ctl.gain().value_at(0.35), 0.0, epsilon = 1e-5);
        let stop_at = ctl.generator().unwrap().stop_time().unwrap();
        assert_abs_diff_eq!(stop_at, 0.36, epsilon = 1e-6);
    }

    #[test]
    fn test_note_off_while_idle_is_noop() {
        let mut ctl = controller();
        ctl.note_off(0.0);
        assert_eq!(ctl.state(), NoteState::Idle);
        assert!(ctl.generator().is_none());
        assert!(ctl.gain().pending().is_empty());

        ctl.note_on(220.0, 0.0);
        ctl.note_off(0.3);
        let pending_before = ctl.gain().pending().to_vec();
        let stop_before = ctl.generator().unwrap().stop_time();

        ctl.note_off(0.32);
        assert_eq!(ctl.gain().pending(), pending_before.as_slice());
        assert_eq!(ctl.generator().unwrap().stop_time(), stop_before);
    }

    #[test]
    fn test_invalid_frequency_is_ignored() {
        let mut ctl = controller();
        ctl.note_on(0.0, 0.0);
        ctl.note_on(f32::NAN, 0.0);
        assert_eq!(ctl.state(), NoteState::Idle);
        assert!(ctl.generator().is_none());
    }

    #[test]
    fn test_retrigger_same_pitch_keeps_generator() {
        let mut ctl = controller();
        ctl.note_on(440.0, 0.0);
        let first = ctl.generator().unwrap().id();
        ctl.note_on(440.0, 0.05);

        assert_eq!(ctl.generator().unwrap().id(), first);
        assert_abs_diff_eq!(ctl.gain().value_at(0.05), 0.5, epsilon = 1e-5);
    }

    #[test]
    fn test_retrigger_new_pitch_replaces_generator() {
        let mut ctl = controller();
        ctl.note_on(220.0, 0.0);
        let first = ctl.generator().unwrap().id();
        ctl.note_on(330.0, 0.05);

        let current = ctl.generator().unwrap();
        assert_ne!(current.id(), first);
        assert_eq!(current.frequency(), 330.0);
    }

    #[test]
    fn test_note_on_during_release_replaces_stopping_generator() {
        let mut ctl = controller();
        ctl.note_on(220.0, 0.0);
        ctl.note_off(0.3);
        let released = ctl.generator().unwrap().id();

        ctl.note_on(220.0, 0.4);
        let current = ctl.generator().unwrap();
        assert_ne!(current.id(), released);
        assert!(!current.is_stopping());
        // Attack restarts from wherever the release had reached
        assert_abs_diff_eq!(ctl.gain().value_at(0.4), 0.15, epsilon = 1e-5);
    }

    #[test]
    fn test_stale_completion_is_ignored() {
        let mut ctl = controller();
        ctl.note_on(220.0, 0.0);
        ctl.note_off(0.05);
        let old = ctl.generator().unwrap().id();
        ctl.note_on(330.0, 0.1);

        ctl.on_generator_ended(GeneratorEnded { id: old });
        assert_eq!(ctl.generator().unwrap().frequency(), 330.0);
    }

    #[test]
    fn test_completion_clears_matching_handle() {
        let mut ctl = controller();
        ctl.note_on(220.0, 0.0);
        ctl.note_off(0.2);

        let mut ended = None;
        let mut t = 0.2;
        while t < 1.0 && ended.is_none() {
            ended = ctl.render(t, 1000.0).1;
            t += 0.001;
        }
        let ended = ended.expect("generator should end after the release tail");
        ctl.on_generator_ended(ended);
        assert!(ctl.generator().is_none());
        assert_eq!(ctl.render(t, 1000.0), (0.0, None));
    }
}
