//! Output device enumeration across all available hosts.

use cpal::traits::{DeviceTrait, HostTrait};
use tracing::debug;

/// One output device as reported by cpal.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceInfo {
    pub host: String,
    pub name: String,
    /// Default output of its host
    pub is_default: bool,
}

/// List output devices of every host cpal can open. Hosts that fail to
/// open or enumerate are skipped.
pub fn list_output_devices() -> Vec<DeviceInfo> {
    let mut found = Vec::new();
    for host_id in cpal::available_hosts() {
        let host = match cpal::host_from_id(host_id) {
            Ok(host) => host,
            Err(err) => {
                debug!(host = host_id.name(), %err, "host unavailable");
                continue;
            }
        };
        let default_name = host.default_output_device().and_then(|d| d.name().ok());
        let Ok(devices) = host.output_devices() else {
            continue;
        };
        for device in devices {
            if let Ok(name) = device.name() {
                found.push(DeviceInfo {
                    host: host_id.name().to_string(),
                    is_default: default_name.as_deref() == Some(name.as_str()),
                    name,
                });
            }
        }
    }
    found
}
