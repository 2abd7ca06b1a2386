//! Device bundle for device-generated commands.

use crate::ext;

/// Pairs the core device dispatch with the extension's entry points.
///
/// Cheap to clone; both tables are plain function-pointer structs.
#[derive(Clone)]
pub struct DgcDevice {
    device: ash::Device,
    ext: ext::Device,
}

impl DgcDevice {
    /// Load the extension entry points for a device created with
    /// `VK_EXT_device_generated_commands` enabled.
    pub fn new(instance: &ash::Instance, device: &ash::Device) -> Self {
        Self {
            device: device.clone(),
            ext: ext::Device::new(instance, device),
        }
    }

    pub fn raw(&self) -> &ash::Device {
        &self.device
    }

    pub fn ext(&self) -> &ext::Device {
        &self.ext
    }
}
