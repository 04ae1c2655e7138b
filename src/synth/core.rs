use super::clock::{Clock, SampleClock};
use super::config::SynthConfig;
use super::controller::{NoteController, NoteState};
use super::error::ConfigError;
use super::note::NoteEvent;
use super::oscillator::GeneratorEnded;
use super::output::OutputStage;

const DEFAULT_SAMPLE_RATE: f32 = 44100.0;

/// The synthesizer engine: one note controller rendered against a sample
/// clock and sent through the fixed output stage.
pub struct Synth {
    clock: SampleClock,
    controller: NoteController,
    output_stage: OutputStage,
    ended: Vec<GeneratorEnded>, // Completion signals raised during the current block
}

impl Synth {
    pub fn new(config: &SynthConfig) -> Result<Self, ConfigError> {
        let controller = NoteController::from_config(config)?;
        log::info!(
            "Synth ready: A={}s D={}s S={} R={}s, master volume {}",
            config.attack,
            config.decay,
            config.sustain,
            config.release,
            config.master_volume
        );
        Ok(Self {
            clock: SampleClock::new(DEFAULT_SAMPLE_RATE),
            controller,
            output_stage: OutputStage::new(config.master_volume),
            ended: Vec::new(),
        })
    }

    /// Current time on the engine's clock, in seconds.
    pub fn now(&self) -> f64 {
        self.clock.now()
    }

    pub fn state(&self) -> NoteState {
        self.controller.state()
    }

    pub fn controller(&self) -> &NoteController {
        &self.controller
    }

    pub fn note_on(&mut self, frequency: f32) {
        let now = self.clock.now();
        self.controller.note_on(frequency, now);
    }

    pub fn note_off(&mut self) {
        let now = self.clock.now();
        self.controller.note_off(now);
    }

    pub fn handle_event(&mut self, event: NoteEvent) {
        match event {
            NoteEvent::On { frequency } => self.note_on(frequency),
            NoteEvent::Off => self.note_off(),
        }
    }

    /// Renders a mono block. Completion signals raised while rendering are
    /// delivered to the controller once the block is done.
    pub fn process(&mut self, output: &mut [f32], sample_rate: f32) {
        self.clock.set_sample_rate(sample_rate);

        for sample in output.iter_mut() {
            let now = self.clock.now();
            let (voice, ended) = self.controller.render(now, sample_rate);
            if let Some(ended) = ended {
                self.ended.push(ended);
            }
            *sample = self.output_stage.apply(voice);
            self.clock.advance(1);
        }

        self.controller.advance(self.clock.now());
        for ended in self.ended.drain(..) {
            self.controller.on_generator_ended(ended);
        }
    }
}
