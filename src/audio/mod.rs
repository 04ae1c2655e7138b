mod cpal_backend;
pub use self::cpal_backend::CpalBackend;

pub trait AudioBackend {
    fn start(&mut self) -> anyhow::Result<()>;
    fn stop(&mut self) -> anyhow::Result<()>;
}
