use crate::audio::AudioBackend;
use crate::runtime::NativeSynth;
use anyhow::{anyhow, bail, Context};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{SampleFormat, Stream};
use std::sync::{Arc, Mutex};

pub struct CpalBackend {
    stream: Option<Stream>,
    synth: Arc<Mutex<NativeSynth>>,
}

impl CpalBackend {
    pub fn new(synth: Arc<Mutex<NativeSynth>>) -> Self {
        Self {
            stream: None,
            synth,
        }
    }

    fn build_stream(&mut self) -> anyhow::Result<Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| anyhow!("No output device available"))?;
        log::info!("Selected device: {}", device.name().unwrap_or_default());

        let supported_config = device
            .default_output_config()
            .context("failed to query default output config")?;
        let stream_config: cpal::StreamConfig = supported_config.clone().into();

        let sample_rate = stream_config.sample_rate.0 as f32;
        let channels = stream_config.channels as usize;
        log::info!("Output: {} Hz, {} channel(s)", sample_rate, channels);

        let synth = self.synth.clone();

        let stream = match supported_config.sample_format() {
            SampleFormat::F32 => device.build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| match synth.lock() {
                    Ok(mut synth) => synth.process_interleaved(data, channels, sample_rate),
                    Err(_) => {
                        log::error!("Synth lock poisoned, rendering silence");
                        data.fill(0.0);
                    }
                },
                |err| log::error!("Stream error: {}", err),
                None,
            )?,
            other => bail!("Unsupported sample format: {:?}", other),
        };

        Ok(stream)
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> anyhow::Result<()> {
        let stream = self.build_stream()?;
        stream.play().context("failed to start stream")?;
        self.stream = Some(stream);
        Ok(())
    }

    fn stop(&mut self) -> anyhow::Result<()> {
        if let Some(stream) = &self.stream {
            stream.pause().context("failed to stop stream")?;
        }
        Ok(())
    }
}
