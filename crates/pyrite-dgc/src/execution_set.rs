//! Indirect execution sets: indexable tables of pipeline or
//! shader-object variants selectable per sequence.
//!
//! A manager is created with one backing model and a fixed capacity.
//! Variants are staged with `add_*` and flushed with
//! [`update`](ExecutionSetManager::update); [`handle`](ExecutionSetManager::handle)
//! refuses to hand out the set while writes are still pending, which is
//! the freeze point callers rely on before recording.

use crate::device::DgcDevice;
use crate::error::{DgcError, Result};
use crate::ext;
use ash::vk;

/// Backing model for an execution set, chosen once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionSetModel {
    /// Each variant is a whole graphics pipeline.
    Pipelines,
    /// Each variant is a set of independent per-stage shader objects.
    ShaderObjects,
}

impl ExecutionSetModel {
    pub(crate) fn info_type(self) -> ext::IndirectExecutionSetInfoTypeEXT {
        match self {
            Self::Pipelines => ext::IndirectExecutionSetInfoTypeEXT::PIPELINES,
            Self::ShaderObjects => ext::IndirectExecutionSetInfoTypeEXT::SHADER_OBJECTS,
        }
    }
}

/// One shader-object stage slot for a shader-backed set.
pub struct ShaderStageInfo {
    pub shader: vk::ShaderEXT,
    pub set_layouts: Vec<vk::DescriptorSetLayout>,
}

/// Builds and owns a `VkIndirectExecutionSetEXT`.
pub struct ExecutionSetManager {
    handle: ext::IndirectExecutionSetEXT,
    model: ExecutionSetModel,
    capacity: u32,
    pending_pipelines: Vec<ext::WriteIndirectExecutionSetPipelineEXT>,
    pending_shaders: Vec<ext::WriteIndirectExecutionSetShaderEXT>,
}

impl ExecutionSetManager {
    /// Create a pipeline-backed set seeded with an initial pipeline.
    ///
    /// # Safety
    /// The device must be valid; `initial_pipeline` must be
    /// indirect-bindable and outlive the set.
    pub unsafe fn new_pipelines(
        device: &DgcDevice,
        initial_pipeline: vk::Pipeline,
        capacity: u32,
    ) -> Result<Self> {
        let pipeline_info = ext::IndirectExecutionSetPipelineInfoEXT {
            initial_pipeline,
            max_pipeline_count: capacity,
            ..Default::default()
        };
        let create_info = ext::IndirectExecutionSetCreateInfoEXT {
            s_type: ext::STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_CREATE_INFO_EXT,
            p_next: std::ptr::null(),
            ty: ext::IndirectExecutionSetInfoTypeEXT::PIPELINES,
            info: ext::IndirectExecutionSetInfoEXT {
                p_pipeline_info: std::ptr::from_ref(&pipeline_info),
            },
        };

        let handle = device.ext().create_indirect_execution_set(&create_info)?;
        tracing::debug!(capacity, "created pipeline-backed execution set");

        Ok(Self {
            handle,
            model: ExecutionSetModel::Pipelines,
            capacity,
            pending_pipelines: Vec::new(),
            pending_shaders: Vec::new(),
        })
    }

    /// Create a shader-object-backed set seeded with one shader per
    /// stage slot.
    ///
    /// # Safety
    /// The device must be valid; every shader must be indirect-bindable
    /// and outlive the set.
    pub unsafe fn new_shaders(
        device: &DgcDevice,
        stage_infos: &[ShaderStageInfo],
        push_constant_ranges: &[vk::PushConstantRange],
        capacity: u32,
    ) -> Result<Self> {
        let initial_shaders: Vec<vk::ShaderEXT> =
            stage_infos.iter().map(|info| info.shader).collect();
        let layout_infos: Vec<ext::IndirectExecutionSetShaderLayoutInfoEXT> = stage_infos
            .iter()
            .map(|info| ext::IndirectExecutionSetShaderLayoutInfoEXT {
                set_layout_count: info.set_layouts.len() as u32,
                p_set_layouts: info.set_layouts.as_ptr(),
                ..Default::default()
            })
            .collect();

        let shader_info = ext::IndirectExecutionSetShaderInfoEXT {
            shader_count: initial_shaders.len() as u32,
            p_initial_shaders: initial_shaders.as_ptr(),
            p_set_layout_infos: layout_infos.as_ptr(),
            max_shader_count: capacity,
            push_constant_range_count: push_constant_ranges.len() as u32,
            p_push_constant_ranges: push_constant_ranges.as_ptr(),
            ..Default::default()
        };
        let create_info = ext::IndirectExecutionSetCreateInfoEXT {
            s_type: ext::STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_CREATE_INFO_EXT,
            p_next: std::ptr::null(),
            ty: ext::IndirectExecutionSetInfoTypeEXT::SHADER_OBJECTS,
            info: ext::IndirectExecutionSetInfoEXT {
                p_shader_info: std::ptr::from_ref(&shader_info),
            },
        };

        let handle = device.ext().create_indirect_execution_set(&create_info)?;
        tracing::debug!(
            capacity,
            stages = stage_infos.len(),
            "created shader-backed execution set"
        );

        Ok(Self {
            handle,
            model: ExecutionSetModel::ShaderObjects,
            capacity,
            pending_pipelines: Vec::new(),
            pending_shaders: Vec::new(),
        })
    }

    pub fn model(&self) -> ExecutionSetModel {
        self.model
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    fn check_index(&self, index: u32) -> Result<()> {
        // At-capacity indices are rejected outright, never clamped.
        if index >= self.capacity {
            return Err(DgcError::IndexOutOfRange {
                index,
                capacity: self.capacity,
            });
        }
        Ok(())
    }

    /// Stage a pipeline write at `index`. Re-staging an index before
    /// [`update`](Self::update) replaces the earlier write; duplicate
    /// writes to one index in a single flush are illegal device-side.
    pub fn add_pipeline(&mut self, index: u32, pipeline: vk::Pipeline) -> Result<()> {
        if self.model != ExecutionSetModel::Pipelines {
            return Err(DgcError::ExecutionSetModel);
        }
        self.check_index(index)?;

        let write = ext::WriteIndirectExecutionSetPipelineEXT {
            index,
            pipeline,
            ..Default::default()
        };
        match self.pending_pipelines.iter_mut().find(|w| w.index == index) {
            Some(existing) => *existing = write,
            None => self.pending_pipelines.push(write),
        }
        Ok(())
    }

    /// Stage a write from a pipeline wrapper at `index`.
    pub fn add_graphics_pipeline(
        &mut self,
        index: u32,
        pipeline: &pyrite_gpu::GraphicsPipeline,
    ) -> Result<()> {
        self.add_pipeline(index, pipeline.pipeline)
    }

    /// Stage a shader write at `index` (a flat slot across all stage
    /// positions). Same overwrite semantics as [`add_pipeline`](Self::add_pipeline).
    pub fn add_shader(&mut self, index: u32, shader: vk::ShaderEXT) -> Result<()> {
        if self.model != ExecutionSetModel::ShaderObjects {
            return Err(DgcError::ExecutionSetModel);
        }
        self.check_index(index)?;

        let write = ext::WriteIndirectExecutionSetShaderEXT {
            index,
            shader,
            ..Default::default()
        };
        match self.pending_shaders.iter_mut().find(|w| w.index == index) {
            Some(existing) => *existing = write,
            None => self.pending_shaders.push(write),
        }
        Ok(())
    }

    fn pending_count(&self) -> usize {
        self.pending_pipelines.len() + self.pending_shaders.len()
    }

    /// Flush staged writes to the device.
    ///
    /// # Safety
    /// The device must be valid and the set must not be referenced by
    /// pending command buffers.
    pub unsafe fn update(&mut self, device: &DgcDevice) {
        if !self.pending_pipelines.is_empty() {
            device
                .ext()
                .update_indirect_execution_set_pipeline(self.handle, &self.pending_pipelines);
            self.pending_pipelines.clear();
        }
        if !self.pending_shaders.is_empty() {
            device
                .ext()
                .update_indirect_execution_set_shader(self.handle, &self.pending_shaders);
            self.pending_shaders.clear();
        }
    }

    /// The set handle, for recording. Fails while writes are pending.
    pub fn handle(&self) -> Result<ext::IndirectExecutionSetEXT> {
        let pending = self.pending_count();
        if pending > 0 {
            return Err(DgcError::PendingWrites(pending));
        }
        Ok(self.handle)
    }

    /// Destroy the device set.
    ///
    /// # Safety
    /// The set must not be in use.
    pub unsafe fn destroy(&self, device: &DgcDevice) {
        device.ext().destroy_indirect_execution_set(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ash::vk::Handle;

    fn host_only(model: ExecutionSetModel, capacity: u32) -> ExecutionSetManager {
        ExecutionSetManager {
            handle: ext::IndirectExecutionSetEXT::null(),
            model,
            capacity,
            pending_pipelines: Vec::new(),
            pending_shaders: Vec::new(),
        }
    }

    #[test]
    fn index_at_capacity_rejected() {
        let mut manager = host_only(ExecutionSetModel::Pipelines, 4);
        assert!(matches!(
            manager.add_pipeline(4, vk::Pipeline::null()),
            Err(DgcError::IndexOutOfRange {
                index: 4,
                capacity: 4,
            })
        ));
        assert!(manager.add_pipeline(3, vk::Pipeline::null()).is_ok());
    }

    #[test]
    fn model_mismatch_rejected() {
        let mut manager = host_only(ExecutionSetModel::Pipelines, 2);
        assert!(matches!(
            manager.add_shader(0, vk::ShaderEXT::null()),
            Err(DgcError::ExecutionSetModel)
        ));

        let mut manager = host_only(ExecutionSetModel::ShaderObjects, 2);
        assert!(matches!(
            manager.add_pipeline(0, vk::Pipeline::null()),
            Err(DgcError::ExecutionSetModel)
        ));
    }

    #[test]
    fn readding_an_index_overwrites_the_pending_write() {
        let mut manager = host_only(ExecutionSetModel::Pipelines, 2);
        manager.add_pipeline(1, vk::Pipeline::from_raw(0x10)).unwrap();
        manager.add_pipeline(1, vk::Pipeline::from_raw(0x20)).unwrap();

        assert_eq!(manager.pending_pipelines.len(), 1);
        assert_eq!(
            manager.pending_pipelines[0].pipeline,
            vk::Pipeline::from_raw(0x20)
        );
    }

    #[test]
    fn handle_refused_while_writes_pending() {
        let mut manager = host_only(ExecutionSetModel::Pipelines, 2);
        manager.add_pipeline(0, vk::Pipeline::null()).unwrap();
        assert!(matches!(manager.handle(), Err(DgcError::PendingWrites(1))));
    }
}
