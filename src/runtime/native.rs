use crate::audio::{AudioBackend, CpalBackend};
use crate::input::KeyboardHandler;
use crate::synth::note::NoteEvent;
use crate::synth::{Synth, SynthConfig};
use anyhow::Context;
use std::sync::mpsc::{channel, Receiver};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Native runtime synth: the engine plus the queue of note events waiting
/// for the next render block.
pub struct NativeSynth {
    synth: Synth,
    note_receiver: Receiver<NoteEvent>,
    scratch: Vec<f32>,
}

impl NativeSynth {
    pub fn new(synth: Synth, note_receiver: Receiver<NoteEvent>) -> Self {
        Self {
            synth,
            note_receiver,
            scratch: Vec::new(),
        }
    }

    pub fn synth(&self) -> &Synth {
        &self.synth
    }

    /// Applies queued note events, then renders one mono block.
    pub fn process(&mut self, output: &mut [f32], sample_rate: f32) {
        self.process_note_events();
        self.synth.process(output, sample_rate);
    }

    /// Renders `frames` mono samples and copies each into every channel of the interleaved `data`.
    pub fn process_interleaved(&mut self, data: &mut [f32], channels: usize, sample_rate: f32) {
        let frames = data.len() / channels.max(1);
        let mut buffer = std::mem::take(&mut self.scratch);
        buffer.resize(frames, 0.0);
        self.process(&mut buffer, sample_rate);

        for (frame, value) in data.chunks_mut(channels.max(1)).zip(buffer.iter()) {
            frame.fill(*value);
        }
        self.scratch = buffer;
    }

    fn process_note_events(&mut self) {
        while let Ok(event) = self.note_receiver.try_recv() {
            self.synth.handle_event(event);
        }
    }
}

pub fn start(config: SynthConfig) -> anyhow::Result<()> {
    let (note_tx, note_rx) = channel();

    let synth = Synth::new(&config).context("invalid synth configuration")?;
    let synth = Arc::new(Mutex::new(NativeSynth::new(synth, note_rx)));

    let mut audio_backend = CpalBackend::new(synth);
    audio_backend.start()?;

    let mut keyboard_handler = KeyboardHandler::new(&config, note_tx);
    log::info!("Hold A or S to play, Ctrl+C to quit");

    loop {
        keyboard_handler.update();
        std::thread::sleep(POLL_INTERVAL);
    }
}
