use crate::synth::note::NoteEvent;
use crate::synth::SynthConfig;
use device_query::{DeviceQuery, DeviceState, Keycode};
use std::sync::mpsc::Sender;

/// Decides which key owns the single voice.
///
/// The most recently pressed key owns it; releasing any other key is ignored,
/// so letting go of an earlier key never silences a later one.
#[derive(Debug, Clone)]
pub struct KeyTracker {
    key_to_frequency: Vec<(Keycode, f32)>,
    key_states: Vec<bool>,
    owner: Option<Keycode>,
}

impl KeyTracker {
    pub fn new(key_to_frequency: Vec<(Keycode, f32)>) -> Self {
        let key_states = vec![false; key_to_frequency.len()];
        Self {
            key_to_frequency,
            key_states,
            owner: None,
        }
    }

    pub fn owner(&self) -> Option<Keycode> {
        self.owner
    }

    /// Compares the currently pressed keys with the last poll and returns the
    /// note events to send, releases first.
    pub fn update(&mut self, pressed: &[Keycode]) -> Vec<NoteEvent> {
        let mut events = Vec::new();

        for (i, (key, _)) in self.key_to_frequency.iter().enumerate() {
            if self.key_states[i] && !pressed.contains(key) {
                self.key_states[i] = false;
                if self.owner == Some(*key) {
                    log::debug!("Key '{:?}' released - sending note off", key);
                    self.owner = None;
                    events.push(NoteEvent::off());
                } else {
                    log::debug!("Key '{:?}' released but does not own the voice", key);
                }
            }
        }

        for (i, (key, frequency)) in self.key_to_frequency.iter().enumerate() {
            if !self.key_states[i] && pressed.contains(key) {
                self.key_states[i] = true;
                match NoteEvent::on(*frequency) {
                    Ok(event) => {
                        log::debug!("Key '{:?}' pressed - sending note on at {} Hz", key, frequency);
                        self.owner = Some(*key);
                        events.push(event);
                    }
                    Err(e) => log::warn!("Key '{:?}' ignored: {}", key, e),
                }
            }
        }

        events
    }
}

pub struct KeyboardHandler {
    device_state: DeviceState,
    tracker: KeyTracker,
    note_sender: Sender<NoteEvent>,
}

impl KeyboardHandler {
    pub fn new(config: &SynthConfig, note_sender: Sender<NoteEvent>) -> Self {
        let tracker = KeyTracker::new(vec![
            (Keycode::A, config.frequency),
            (Keycode::S, config.second_frequency),
        ]);
        Self {
            device_state: DeviceState::new(),
            tracker,
            note_sender,
        }
    }

    pub fn update(&mut self) {
        let keys: Vec<Keycode> = self.device_state.get_keys();
        for event in self.tracker.update(&keys) {
            if let Err(e) = self.note_sender.send(event) {
                log::error!("Error sending note event: {}", e);
            }
        }
    }
}
