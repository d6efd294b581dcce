//! Audio output backends for candleplay.

mod cpal_backend;
mod devices;
mod rodio_backend;
mod traits;

pub use cpal_backend::CpalBackend;
pub use devices::{list_output_devices, DeviceInfo};
pub use rodio_backend::RodioBackend;
pub use traits::{AudioBackend, AudioError};

/// The ranked backend list: direct cpal streaming first, rodio as fallback.
pub fn default_backends(device: Option<&str>) -> Vec<Box<dyn AudioBackend>> {
    let primary = match device {
        Some(name) => CpalBackend::with_device(name),
        None => CpalBackend::new(),
    };
    vec![Box::new(primary), Box::new(RodioBackend::new())]
}
