/// A trigger request from an input source, applied by the engine at the next render block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NoteEvent {
    On { frequency: f32 },
    Off,
}

impl NoteEvent {
    pub fn on(frequency: f32) -> Result<Self, String> {
        if frequency.is_finite() && frequency > 0.0 {
            Ok(NoteEvent::On { frequency })
        } else {
            Err(format!("Invalid note frequency: {}", frequency))
        }
    }

    pub fn off() -> Self {
        NoteEvent::Off
    }
}
