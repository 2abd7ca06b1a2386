//! Preprocess buffer sizing and the generated-commands dispatch info.
//!
//! The preprocess buffer is opaque device scratch: written once by the
//! device during preprocessing, read once during execution, and never
//! touched by the host. Its size comes from
//! `vkGetGeneratedCommandsMemoryRequirementsEXT` and must be known
//! before any recording begins.

use crate::device::DgcDevice;
use crate::error::Result;
use crate::ext;
use crate::layout::{IndirectCommandsLayout, LayoutUsageFlags};
use ash::vk;
use pyrite_gpu::{command, sync, GpuAllocator, GpuBuffer};

/// Where the generated commands take their pipeline or shader state
/// from when no execution set is selected per sequence.
pub enum IndirectState {
    /// Variants selected per sequence from an execution set.
    ExecutionSet(ext::IndirectExecutionSetEXT),
    /// One fixed indirect-bindable pipeline.
    Pipeline(vk::Pipeline),
    /// One fixed set of indirect-bindable shader objects.
    Shaders(Vec<vk::ShaderEXT>),
}

impl IndirectState {
    fn execution_set(&self) -> ext::IndirectExecutionSetEXT {
        match self {
            Self::ExecutionSet(handle) => *handle,
            _ => ext::IndirectExecutionSetEXT::null(),
        }
    }
}

/// Device-local scratch for preprocessed command generation.
pub struct PreprocessBuffer {
    buffer: Option<GpuBuffer>,
    size: vk::DeviceSize,
    address: vk::DeviceAddress,
}

impl PreprocessBuffer {
    /// Query requirements and allocate. A zero-sized requirement is
    /// valid and produces no buffer (null address).
    ///
    /// # Safety
    /// All handles must be valid; the state handles must match what
    /// will later be bound for execution.
    pub unsafe fn new(
        device: &DgcDevice,
        allocator: &mut GpuAllocator,
        state: &IndirectState,
        layout: &IndirectCommandsLayout,
        max_sequence_count: u32,
        max_draw_count: u32,
    ) -> Result<Self> {
        let mut pipeline_info = ext::GeneratedCommandsPipelineInfoEXT::default();
        let mut shader_info = ext::GeneratedCommandsShaderInfoEXT::default();

        let mut mem_reqs_info = ext::GeneratedCommandsMemoryRequirementsInfoEXT {
            indirect_execution_set: state.execution_set(),
            indirect_commands_layout: layout.handle(),
            max_sequence_count,
            max_draw_count,
            ..Default::default()
        };
        match state {
            IndirectState::ExecutionSet(_) => {}
            IndirectState::Pipeline(pipeline) => {
                pipeline_info.pipeline = *pipeline;
                mem_reqs_info.p_next = std::ptr::from_ref(&pipeline_info).cast();
            }
            IndirectState::Shaders(shaders) => {
                shader_info.shader_count = shaders.len() as u32;
                shader_info.p_shaders = shaders.as_ptr();
                mem_reqs_info.p_next = std::ptr::from_ref(&shader_info).cast();
            }
        }

        let requirements = device
            .ext()
            .get_generated_commands_memory_requirements(&mem_reqs_info);
        tracing::debug!(
            size = requirements.size,
            alignment = requirements.alignment,
            "preprocess buffer requirements"
        );

        if requirements.size == 0 {
            return Ok(Self {
                buffer: None,
                size: 0,
                address: 0,
            });
        }

        let usage2 = vk::BufferUsageFlags2KHR::SHADER_DEVICE_ADDRESS
            | ext::BUFFER_USAGE_2_PREPROCESS_BUFFER;
        let mut usage2_info = vk::BufferUsageFlags2CreateInfoKHR::default().usage(usage2);
        let buffer_info = vk::BufferCreateInfo::default()
            .size(requirements.size)
            .sharing_mode(vk::SharingMode::EXCLUSIVE)
            .push_next(&mut usage2_info);

        let buffer = allocator.create_buffer_with_info(
            &buffer_info,
            gpu_allocator::MemoryLocation::GpuOnly,
            "dgc preprocess",
        )?;
        let address = buffer.device_address(device.raw());

        Ok(Self {
            buffer: Some(buffer),
            size: requirements.size,
            address,
        })
    }

    /// Required size reported by the device, even when no buffer was
    /// allocated.
    pub fn size(&self) -> vk::DeviceSize {
        self.size
    }

    /// Device address, or 0 when no scratch is needed.
    pub fn address(&self) -> vk::DeviceAddress {
        self.address
    }

    pub fn needed(&self) -> bool {
        self.size > 0
    }

    /// Release the buffer. Legal as soon as the preprocess→execute
    /// cycle that used it has completed on the device.
    pub fn free(&mut self, allocator: &mut GpuAllocator) -> Result<()> {
        if let Some(mut buffer) = self.buffer.take() {
            allocator.free_buffer(&mut buffer)?;
        }
        self.address = 0;
        Ok(())
    }
}

/// Host-side mirror of `VkGeneratedCommandsInfoEXT`.
pub struct GeneratedCommandsInfo {
    pub state: IndirectState,
    pub shader_stages: vk::ShaderStageFlags,
    pub layout: ext::IndirectCommandsLayoutEXT,
    pub layout_flags: LayoutUsageFlags,
    pub indirect_address: vk::DeviceAddress,
    pub indirect_size: vk::DeviceSize,
    pub preprocess_address: vk::DeviceAddress,
    pub preprocess_size: vk::DeviceSize,
    pub max_sequence_count: u32,
    /// Address of a device-side `u32` sequence count, or 0 to run
    /// `max_sequence_count` sequences unconditionally.
    pub sequence_count_address: vk::DeviceAddress,
    pub max_draw_count: u32,
}

impl GeneratedCommandsInfo {
    pub fn new(
        state: IndirectState,
        layout: &IndirectCommandsLayout,
        stream_address: vk::DeviceAddress,
        stream_size: vk::DeviceSize,
        preprocess: &PreprocessBuffer,
        max_sequence_count: u32,
    ) -> Self {
        Self {
            state,
            shader_stages: layout.stage_mask(),
            layout: layout.handle(),
            layout_flags: layout.flags(),
            indirect_address: stream_address,
            indirect_size: stream_size,
            preprocess_address: preprocess.address(),
            preprocess_size: preprocess.size(),
            max_sequence_count,
            sequence_count_address: 0,
            max_draw_count: 1,
        }
    }

    pub fn with_sequence_count_address(mut self, address: vk::DeviceAddress) -> Self {
        self.sequence_count_address = address;
        self
    }

    pub fn with_max_draw_count(mut self, count: u32) -> Self {
        self.max_draw_count = count;
        self
    }

    /// Build the raw info with its `pNext` chain and hand it to `f`.
    /// The chained structs only live for the call, which keeps the raw
    /// pointers inside them impossible to store.
    pub fn with_vk_info<R>(&self, f: impl FnOnce(&ext::GeneratedCommandsInfoEXT) -> R) -> R {
        let mut pipeline_info = ext::GeneratedCommandsPipelineInfoEXT::default();
        let mut shader_info = ext::GeneratedCommandsShaderInfoEXT::default();

        let mut info = ext::GeneratedCommandsInfoEXT {
            shader_stages: self.shader_stages,
            indirect_execution_set: self.state.execution_set(),
            indirect_commands_layout: self.layout,
            indirect_address: self.indirect_address,
            indirect_address_size: self.indirect_size,
            preprocess_address: self.preprocess_address,
            preprocess_size: self.preprocess_size,
            max_sequence_count: self.max_sequence_count,
            sequence_count_address: self.sequence_count_address,
            max_draw_count: self.max_draw_count,
            ..Default::default()
        };
        match &self.state {
            IndirectState::ExecutionSet(_) => {}
            IndirectState::Pipeline(pipeline) => {
                pipeline_info.pipeline = *pipeline;
                info.p_next = std::ptr::from_ref(&pipeline_info).cast();
            }
            IndirectState::Shaders(shaders) => {
                shader_info.shader_count = shaders.len() as u32;
                shader_info.p_shaders = shaders.as_ptr();
                info.p_next = std::ptr::from_ref(&shader_info).cast();
            }
        }

        f(&info)
    }
}

/// Memory dependency between the preprocess write and the execution
/// stage's indirect-command read. Omitting it is a data race, not a
/// performance bug.
///
/// # Safety
/// The command buffer must be in the recording state.
pub unsafe fn preprocess_to_execute_barrier(device: &ash::Device, cmd: vk::CommandBuffer) {
    let barrier = vk::MemoryBarrier::default()
        .src_access_mask(vk::AccessFlags::COMMAND_PREPROCESS_WRITE_NV)
        .dst_access_mask(vk::AccessFlags::INDIRECT_COMMAND_READ);
    device.cmd_pipeline_barrier(
        cmd,
        vk::PipelineStageFlags::COMMAND_PREPROCESS_NV,
        vk::PipelineStageFlags::DRAW_INDIRECT,
        vk::DependencyFlags::empty(),
        &[barrier],
        &[],
        &[],
    );
}

/// Submit an execution command buffer, optionally preceded by a
/// preprocess batch. The execute batch waits on the preprocess batch at
/// the indirect-draw stage; the call blocks until both complete.
///
/// # Safety
/// All handles must be valid and the command buffers fully recorded.
pub unsafe fn submit_with_preprocess(
    device: &ash::Device,
    queue: vk::Queue,
    cmd: vk::CommandBuffer,
    preprocess_cmd: Option<vk::CommandBuffer>,
) -> Result<()> {
    let cmd_buffers = [cmd];
    let Some(preprocess_cmd) = preprocess_cmd else {
        let submit = vk::SubmitInfo::default().command_buffers(&cmd_buffers);
        command::submit_and_wait(device, queue, &[submit])?;
        return Ok(());
    };

    let semaphore = sync::create_semaphore(device)?;
    let semaphores = [semaphore];
    let wait_stages = [vk::PipelineStageFlags::DRAW_INDIRECT];
    let preprocess_buffers = [preprocess_cmd];

    let submits = [
        vk::SubmitInfo::default()
            .command_buffers(&preprocess_buffers)
            .signal_semaphores(&semaphores),
        vk::SubmitInfo::default()
            .wait_semaphores(&semaphores)
            .wait_dst_stage_mask(&wait_stages)
            .command_buffers(&cmd_buffers),
    ];

    let result = command::submit_and_wait(device, queue, &submits);
    device.destroy_semaphore(semaphore, None);
    result?;
    Ok(())
}
