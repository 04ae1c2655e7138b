use trianglesynth::runtime::native;
use trianglesynth::synth::SynthConfig;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = SynthConfig::from_env()?;
    native::start(config)
}
