//! Device support checks for generated commands.
//!
//! Capability problems surface here, synchronously, before any layout
//! or buffer touches the device.

use crate::error::{DgcError, Result};
use crate::execution_set::ExecutionSetModel;
use crate::ext;
use crate::layout::Layout;
use ash::vk;
use std::ffi::CStr;

/// Extension that must be enabled at device creation.
pub const REQUIRED_EXTENSION: &CStr = ext::EXTENSION_NAME;

/// Feature struct to chain into `VkDeviceCreateInfo`, with the core
/// feature enabled.
pub fn required_features() -> ext::PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {
    ext::PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {
        device_generated_commands: vk::TRUE,
        ..Default::default()
    }
}

/// Reject devices that do not expose the extension at all, before any
/// feature query.
pub fn check_device(capabilities: &pyrite_gpu::GpuCapabilities) -> Result<()> {
    if !capabilities.supports_device_generated_commands {
        return Err(DgcError::NotSupported(format!(
            "{} does not support VK_EXT_device_generated_commands",
            capabilities.device_name
        )));
    }
    Ok(())
}

/// Queried features and limits for device-generated commands.
#[derive(Debug, Clone)]
pub struct DgcProperties {
    pub device_generated_commands: bool,
    pub dynamic_generated_pipeline_layout: bool,

    pub max_indirect_pipeline_count: u32,
    pub max_indirect_shader_object_count: u32,
    pub max_indirect_sequence_count: u32,
    pub max_token_count: u32,
    pub max_token_offset: u32,
    pub max_indirect_stride: u32,
    pub supported_input_modes: ext::IndirectCommandsInputModeFlagsEXT,
    pub supported_shader_stages: vk::ShaderStageFlags,
    pub pipeline_binding_stages: vk::ShaderStageFlags,
    pub shader_binding_stages: vk::ShaderStageFlags,
}

impl DgcProperties {
    /// Query features and properties from a physical device.
    ///
    /// # Safety
    /// The instance and physical device must be valid, and the instance
    /// must support `vkGetPhysicalDeviceProperties2`.
    pub unsafe fn query(instance: &ash::Instance, physical_device: vk::PhysicalDevice) -> Self {
        let mut dgc_features = ext::PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT::default();
        let mut features2 = vk::PhysicalDeviceFeatures2::default().push_next(&mut dgc_features);
        instance.get_physical_device_features2(physical_device, &mut features2);

        let mut dgc_props = ext::PhysicalDeviceDeviceGeneratedCommandsPropertiesEXT::default();
        let mut props2 = vk::PhysicalDeviceProperties2::default().push_next(&mut dgc_props);
        instance.get_physical_device_properties2(physical_device, &mut props2);

        Self {
            device_generated_commands: dgc_features.device_generated_commands == vk::TRUE,
            dynamic_generated_pipeline_layout: dgc_features.dynamic_generated_pipeline_layout
                == vk::TRUE,

            max_indirect_pipeline_count: dgc_props.max_indirect_pipeline_count,
            max_indirect_shader_object_count: dgc_props.max_indirect_shader_object_count,
            max_indirect_sequence_count: dgc_props.max_indirect_sequence_count,
            max_token_count: dgc_props.max_indirect_commands_token_count,
            max_token_offset: dgc_props.max_indirect_commands_token_offset,
            max_indirect_stride: dgc_props.max_indirect_commands_indirect_stride,
            supported_input_modes: dgc_props.supported_indirect_commands_input_modes,
            supported_shader_stages: dgc_props.supported_indirect_commands_shader_stages,
            pipeline_binding_stages: dgc_props
                .supported_indirect_commands_shader_stages_pipeline_binding,
            shader_binding_stages: dgc_props
                .supported_indirect_commands_shader_stages_shader_binding,
        }
    }

    /// The core feature bit; nothing else works without it.
    pub fn ensure_supported(&self) -> Result<()> {
        if !self.device_generated_commands {
            return Err(DgcError::NotSupported(
                "deviceGeneratedCommands feature not available".into(),
            ));
        }
        Ok(())
    }

    pub fn check_stages(&self, stages: vk::ShaderStageFlags) -> Result<()> {
        if !self.supported_shader_stages.contains(stages) {
            return Err(DgcError::NotSupported(format!(
                "indirect shader stages {stages:?} not supported (have {:?})",
                self.supported_shader_stages
            )));
        }
        Ok(())
    }

    pub fn check_input_mode(&self, mode: ext::IndirectCommandsInputModeFlagsEXT) -> Result<()> {
        if !self.supported_input_modes.contains(mode) {
            return Err(DgcError::NotSupported(format!(
                "index buffer input mode {:#x} not supported",
                mode.0
            )));
        }
        Ok(())
    }

    pub fn check_sequence_count(&self, count: u32) -> Result<()> {
        if count > self.max_indirect_sequence_count {
            return Err(DgcError::NotSupported(format!(
                "{count} sequences exceed the limit of {}",
                self.max_indirect_sequence_count
            )));
        }
        Ok(())
    }

    /// Validate a built layout against the device limits.
    pub fn check_layout(&self, layout: &Layout) -> Result<()> {
        self.ensure_supported()?;
        self.check_stages(layout.stage_mask())?;

        let tokens = layout.tokens();
        if tokens.len() as u32 > self.max_token_count {
            return Err(DgcError::NotSupported(format!(
                "{} tokens exceed the limit of {}",
                tokens.len(),
                self.max_token_count
            )));
        }
        if let Some(worst) = tokens.iter().map(|t| t.offset).max() {
            if worst > self.max_token_offset {
                return Err(DgcError::NotSupported(format!(
                    "token offset {worst} exceeds the limit of {}",
                    self.max_token_offset
                )));
            }
        }
        if layout.stride() > self.max_indirect_stride {
            return Err(DgcError::NotSupported(format!(
                "stride {} exceeds the limit of {}",
                layout.stride(),
                self.max_indirect_stride
            )));
        }
        for entry in tokens {
            if let crate::token::Token::IndexBufferBind { mode } = entry.token {
                self.check_input_mode(mode)?;
            }
        }
        Ok(())
    }

    /// Validate an execution-set configuration before creating it.
    pub fn check_execution_set(
        &self,
        model: ExecutionSetModel,
        capacity: u32,
        stages: vk::ShaderStageFlags,
    ) -> Result<()> {
        self.ensure_supported()?;
        let (limit, binding_stages, what) = match model {
            ExecutionSetModel::Pipelines => (
                self.max_indirect_pipeline_count,
                self.pipeline_binding_stages,
                "pipelines",
            ),
            ExecutionSetModel::ShaderObjects => (
                self.max_indirect_shader_object_count,
                self.shader_binding_stages,
                "shader objects",
            ),
        };
        if capacity > limit {
            return Err(DgcError::NotSupported(format!(
                "{capacity} {what} exceed the execution-set limit of {limit}"
            )));
        }
        if !binding_stages.contains(stages) {
            return Err(DgcError::NotSupported(format!(
                "stages {stages:?} cannot be bound through {what}"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutBuilder, LayoutUsageFlags};

    fn generous() -> DgcProperties {
        DgcProperties {
            device_generated_commands: true,
            dynamic_generated_pipeline_layout: false,
            max_indirect_pipeline_count: 16,
            max_indirect_shader_object_count: 16,
            max_indirect_sequence_count: 1 << 20,
            max_token_count: 16,
            max_token_offset: 2048,
            max_indirect_stride: 2048,
            supported_input_modes: ext::IndirectCommandsInputModeFlagsEXT::VULKAN_INDEX_BUFFER,
            supported_shader_stages: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            pipeline_binding_stages: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
            shader_binding_stages: vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
        }
    }

    fn vertex_draw_layout() -> Layout {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        builder.add_draw_token();
        builder.build().unwrap()
    }

    #[test]
    fn feature_gate() {
        let mut props = generous();
        assert!(props.ensure_supported().is_ok());
        props.device_generated_commands = false;
        assert!(matches!(
            props.ensure_supported(),
            Err(DgcError::NotSupported(_))
        ));
    }

    #[test]
    fn layout_within_limits_passes() {
        assert!(generous().check_layout(&vertex_draw_layout()).is_ok());
    }

    #[test]
    fn unsupported_stage_rejected() {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::COMPUTE);
        builder.add_draw_token();
        let layout = builder.build().unwrap();
        assert!(matches!(
            generous().check_layout(&layout),
            Err(DgcError::NotSupported(_))
        ));
    }

    #[test]
    fn dxgi_mode_needs_device_support() {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        builder.add_index_buffer_token(ext::IndirectCommandsInputModeFlagsEXT::DXGI_INDEX_BUFFER);
        builder.add_draw_indexed_token();
        let layout = builder.build().unwrap();
        assert!(matches!(
            generous().check_layout(&layout),
            Err(DgcError::NotSupported(_))
        ));
    }

    #[test]
    fn execution_set_capacity_limit() {
        let props = generous();
        assert!(props
            .check_execution_set(
                ExecutionSetModel::Pipelines,
                16,
                vk::ShaderStageFlags::VERTEX
            )
            .is_ok());
        assert!(matches!(
            props.check_execution_set(
                ExecutionSetModel::Pipelines,
                17,
                vk::ShaderStageFlags::VERTEX
            ),
            Err(DgcError::NotSupported(_))
        ));
    }
}
