//! Raw bindings for `VK_EXT_device_generated_commands`.
//!
//! The `ash` release we build against ships Vulkan headers that predate
//! this extension, so the handles, structures and entry points are
//! declared here in the same shape `ash` uses for its generated
//! extension modules. Everything matches the published registry
//! definitions for extension 573.

use ash::prelude::VkResult;
use ash::vk::{self, Handle};
use std::ffi::{c_void, CStr};
use std::mem;
use std::ptr;

/// Extension name, for device creation.
pub const EXTENSION_NAME: &CStr = c"VK_EXT_device_generated_commands";
pub const SPEC_VERSION: u32 = 1;

// Structure type values from the registry (extension 573 block).
pub const STRUCTURE_TYPE_PHYSICAL_DEVICE_DEVICE_GENERATED_COMMANDS_FEATURES_EXT:
    vk::StructureType = vk::StructureType::from_raw(1_000_572_000);
pub const STRUCTURE_TYPE_PHYSICAL_DEVICE_DEVICE_GENERATED_COMMANDS_PROPERTIES_EXT:
    vk::StructureType = vk::StructureType::from_raw(1_000_572_001);
pub const STRUCTURE_TYPE_GENERATED_COMMANDS_MEMORY_REQUIREMENTS_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_002);
pub const STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_CREATE_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_003);
pub const STRUCTURE_TYPE_GENERATED_COMMANDS_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_004);
pub const STRUCTURE_TYPE_WRITE_INDIRECT_EXECUTION_SET_PIPELINE_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_005);
pub const STRUCTURE_TYPE_INDIRECT_COMMANDS_LAYOUT_CREATE_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_006);
pub const STRUCTURE_TYPE_INDIRECT_COMMANDS_LAYOUT_TOKEN_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_007);
pub const STRUCTURE_TYPE_WRITE_INDIRECT_EXECUTION_SET_SHADER_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_008);
pub const STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_PIPELINE_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_009);
pub const STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_SHADER_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_010);
pub const STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_SHADER_LAYOUT_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_011);
pub const STRUCTURE_TYPE_GENERATED_COMMANDS_PIPELINE_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_012);
pub const STRUCTURE_TYPE_GENERATED_COMMANDS_SHADER_INFO_EXT: vk::StructureType =
    vk::StructureType::from_raw(1_000_572_013);

pub const OBJECT_TYPE_INDIRECT_COMMANDS_LAYOUT_EXT: vk::ObjectType =
    vk::ObjectType::from_raw(1_000_572_000);
pub const OBJECT_TYPE_INDIRECT_EXECUTION_SET_EXT: vk::ObjectType =
    vk::ObjectType::from_raw(1_000_572_001);

/// `VK_PIPELINE_CREATE_2_INDIRECT_BINDABLE_BIT_EXT`
pub const PIPELINE_CREATE_2_INDIRECT_BINDABLE: vk::PipelineCreateFlags2KHR =
    vk::PipelineCreateFlags2KHR::from_raw(0x40_0000_0000);
/// `VK_SHADER_CREATE_INDIRECT_BINDABLE_BIT_EXT`
pub const SHADER_CREATE_INDIRECT_BINDABLE: vk::ShaderCreateFlagsEXT =
    vk::ShaderCreateFlagsEXT::from_raw(0x80);
/// `VK_BUFFER_USAGE_2_PREPROCESS_BUFFER_BIT_EXT`
pub const BUFFER_USAGE_2_PREPROCESS_BUFFER: vk::BufferUsageFlags2KHR =
    vk::BufferUsageFlags2KHR::from_raw(0x8000_0000);

/// `VkIndirectCommandsLayoutEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct IndirectCommandsLayoutEXT(u64);

impl IndirectCommandsLayoutEXT {
    pub const fn null() -> Self {
        Self(0)
    }
}

impl Handle for IndirectCommandsLayoutEXT {
    const TYPE: vk::ObjectType = OBJECT_TYPE_INDIRECT_COMMANDS_LAYOUT_EXT;
    fn as_raw(self) -> u64 {
        self.0
    }
    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// `VkIndirectExecutionSetEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct IndirectExecutionSetEXT(u64);

impl IndirectExecutionSetEXT {
    pub const fn null() -> Self {
        Self(0)
    }
}

impl Handle for IndirectExecutionSetEXT {
    const TYPE: vk::ObjectType = OBJECT_TYPE_INDIRECT_EXECUTION_SET_EXT;
    fn as_raw(self) -> u64 {
        self.0
    }
    fn from_raw(raw: u64) -> Self {
        Self(raw)
    }
}

/// `VkIndirectCommandsTokenTypeEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IndirectCommandsTokenTypeEXT(pub i32);

impl IndirectCommandsTokenTypeEXT {
    pub const EXECUTION_SET: Self = Self(0);
    pub const PUSH_CONSTANT: Self = Self(1);
    pub const SEQUENCE_INDEX: Self = Self(2);
    pub const INDEX_BUFFER: Self = Self(3);
    pub const VERTEX_BUFFER: Self = Self(4);
    pub const DRAW_INDEXED: Self = Self(5);
    pub const DRAW: Self = Self(6);
    pub const DRAW_INDEXED_COUNT: Self = Self(7);
    pub const DRAW_COUNT: Self = Self(8);
    pub const DISPATCH: Self = Self(9);
}

/// `VkIndirectExecutionSetInfoTypeEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct IndirectExecutionSetInfoTypeEXT(pub i32);

impl IndirectExecutionSetInfoTypeEXT {
    pub const PIPELINES: Self = Self(0);
    pub const SHADER_OBJECTS: Self = Self(1);
}

/// `VkIndirectCommandsLayoutUsageFlagsEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct IndirectCommandsLayoutUsageFlagsEXT(pub u32);

impl IndirectCommandsLayoutUsageFlagsEXT {
    pub const EXPLICIT_PREPROCESS: Self = Self(0b01);
    pub const UNORDERED_SEQUENCES: Self = Self(0b10);
}

impl std::ops::BitOr for IndirectCommandsLayoutUsageFlagsEXT {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// `VkIndirectCommandsInputModeFlagsEXT`
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Debug)]
pub struct IndirectCommandsInputModeFlagsEXT(pub u32);

impl IndirectCommandsInputModeFlagsEXT {
    pub const VULKAN_INDEX_BUFFER: Self = Self(0b01);
    pub const DXGI_INDEX_BUFFER: Self = Self(0b10);

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl std::ops::BitOr for IndirectCommandsInputModeFlagsEXT {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

/// `VkPhysicalDeviceDeviceGeneratedCommandsFeaturesEXT`
#[repr(C)]
#[derive(Debug)]
pub struct PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {
    pub s_type: vk::StructureType,
    pub p_next: *mut c_void,
    pub device_generated_commands: vk::Bool32,
    pub dynamic_generated_pipeline_layout: vk::Bool32,
}

impl Default for PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_PHYSICAL_DEVICE_DEVICE_GENERATED_COMMANDS_FEATURES_EXT,
            p_next: ptr::null_mut(),
            device_generated_commands: vk::FALSE,
            dynamic_generated_pipeline_layout: vk::FALSE,
        }
    }
}

unsafe impl vk::ExtendsPhysicalDeviceFeatures2 for PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {}
unsafe impl vk::ExtendsDeviceCreateInfo for PhysicalDeviceDeviceGeneratedCommandsFeaturesEXT {}

/// `VkPhysicalDeviceDeviceGeneratedCommandsPropertiesEXT`
#[repr(C)]
#[derive(Debug)]
pub struct PhysicalDeviceDeviceGeneratedCommandsPropertiesEXT {
    pub s_type: vk::StructureType,
    pub p_next: *mut c_void,
    pub max_indirect_pipeline_count: u32,
    pub max_indirect_shader_object_count: u32,
    pub max_indirect_sequence_count: u32,
    pub max_indirect_commands_token_count: u32,
    pub max_indirect_commands_token_offset: u32,
    pub max_indirect_commands_indirect_stride: u32,
    pub supported_indirect_commands_input_modes: IndirectCommandsInputModeFlagsEXT,
    pub supported_indirect_commands_shader_stages: vk::ShaderStageFlags,
    pub supported_indirect_commands_shader_stages_pipeline_binding: vk::ShaderStageFlags,
    pub supported_indirect_commands_shader_stages_shader_binding: vk::ShaderStageFlags,
    pub device_generated_commands_transform_feedback: vk::Bool32,
    pub device_generated_commands_multi_draw_indirect_count: vk::Bool32,
}

impl Default for PhysicalDeviceDeviceGeneratedCommandsPropertiesEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_PHYSICAL_DEVICE_DEVICE_GENERATED_COMMANDS_PROPERTIES_EXT,
            p_next: ptr::null_mut(),
            max_indirect_pipeline_count: 0,
            max_indirect_shader_object_count: 0,
            max_indirect_sequence_count: 0,
            max_indirect_commands_token_count: 0,
            max_indirect_commands_token_offset: 0,
            max_indirect_commands_indirect_stride: 0,
            supported_indirect_commands_input_modes: IndirectCommandsInputModeFlagsEXT::default(),
            supported_indirect_commands_shader_stages: vk::ShaderStageFlags::empty(),
            supported_indirect_commands_shader_stages_pipeline_binding: vk::ShaderStageFlags::empty(
            ),
            supported_indirect_commands_shader_stages_shader_binding: vk::ShaderStageFlags::empty(),
            device_generated_commands_transform_feedback: vk::FALSE,
            device_generated_commands_multi_draw_indirect_count: vk::FALSE,
        }
    }
}

unsafe impl vk::ExtendsPhysicalDeviceProperties2
    for PhysicalDeviceDeviceGeneratedCommandsPropertiesEXT
{
}

/// `VkGeneratedCommandsMemoryRequirementsInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCommandsMemoryRequirementsInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub indirect_execution_set: IndirectExecutionSetEXT,
    pub indirect_commands_layout: IndirectCommandsLayoutEXT,
    pub max_sequence_count: u32,
    pub max_draw_count: u32,
}

impl Default for GeneratedCommandsMemoryRequirementsInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_GENERATED_COMMANDS_MEMORY_REQUIREMENTS_INFO_EXT,
            p_next: ptr::null(),
            indirect_execution_set: IndirectExecutionSetEXT::null(),
            indirect_commands_layout: IndirectCommandsLayoutEXT::null(),
            max_sequence_count: 0,
            max_draw_count: 0,
        }
    }
}

/// `VkIndirectExecutionSetPipelineInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectExecutionSetPipelineInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub initial_pipeline: vk::Pipeline,
    pub max_pipeline_count: u32,
}

impl Default for IndirectExecutionSetPipelineInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_PIPELINE_INFO_EXT,
            p_next: ptr::null(),
            initial_pipeline: vk::Pipeline::null(),
            max_pipeline_count: 0,
        }
    }
}

/// `VkIndirectExecutionSetShaderLayoutInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectExecutionSetShaderLayoutInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub set_layout_count: u32,
    pub p_set_layouts: *const vk::DescriptorSetLayout,
}

impl Default for IndirectExecutionSetShaderLayoutInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_SHADER_LAYOUT_INFO_EXT,
            p_next: ptr::null(),
            set_layout_count: 0,
            p_set_layouts: ptr::null(),
        }
    }
}

/// `VkIndirectExecutionSetShaderInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectExecutionSetShaderInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub shader_count: u32,
    pub p_initial_shaders: *const vk::ShaderEXT,
    pub p_set_layout_infos: *const IndirectExecutionSetShaderLayoutInfoEXT,
    pub max_shader_count: u32,
    pub push_constant_range_count: u32,
    pub p_push_constant_ranges: *const vk::PushConstantRange,
}

impl Default for IndirectExecutionSetShaderInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_INDIRECT_EXECUTION_SET_SHADER_INFO_EXT,
            p_next: ptr::null(),
            shader_count: 0,
            p_initial_shaders: ptr::null(),
            p_set_layout_infos: ptr::null(),
            max_shader_count: 0,
            push_constant_range_count: 0,
            p_push_constant_ranges: ptr::null(),
        }
    }
}

/// `VkIndirectExecutionSetInfoEXT`
#[repr(C)]
#[derive(Clone, Copy)]
pub union IndirectExecutionSetInfoEXT {
    pub p_pipeline_info: *const IndirectExecutionSetPipelineInfoEXT,
    pub p_shader_info: *const IndirectExecutionSetShaderInfoEXT,
}

/// `VkIndirectExecutionSetCreateInfoEXT`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IndirectExecutionSetCreateInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub ty: IndirectExecutionSetInfoTypeEXT,
    pub info: IndirectExecutionSetInfoEXT,
}

/// `VkWriteIndirectExecutionSetPipelineEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WriteIndirectExecutionSetPipelineEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub index: u32,
    pub pipeline: vk::Pipeline,
}

impl Default for WriteIndirectExecutionSetPipelineEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_WRITE_INDIRECT_EXECUTION_SET_PIPELINE_EXT,
            p_next: ptr::null(),
            index: 0,
            pipeline: vk::Pipeline::null(),
        }
    }
}

/// `VkWriteIndirectExecutionSetShaderEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct WriteIndirectExecutionSetShaderEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub index: u32,
    pub shader: vk::ShaderEXT,
}

impl Default for WriteIndirectExecutionSetShaderEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_WRITE_INDIRECT_EXECUTION_SET_SHADER_EXT,
            p_next: ptr::null(),
            index: 0,
            shader: vk::ShaderEXT::null(),
        }
    }
}

/// `VkIndirectCommandsPushConstantTokenEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectCommandsPushConstantTokenEXT {
    pub update_range: vk::PushConstantRange,
}

/// `VkIndirectCommandsVertexBufferTokenEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectCommandsVertexBufferTokenEXT {
    pub vertex_binding_unit: u32,
}

/// `VkIndirectCommandsIndexBufferTokenEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectCommandsIndexBufferTokenEXT {
    pub mode: IndirectCommandsInputModeFlagsEXT,
}

/// `VkIndirectCommandsExecutionSetTokenEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct IndirectCommandsExecutionSetTokenEXT {
    pub ty: IndirectExecutionSetInfoTypeEXT,
    pub shader_stages: vk::ShaderStageFlags,
}

/// `VkIndirectCommandsTokenDataEXT`
#[repr(C)]
#[derive(Clone, Copy)]
pub union IndirectCommandsTokenDataEXT {
    pub p_push_constant: *const IndirectCommandsPushConstantTokenEXT,
    pub p_vertex_buffer: *const IndirectCommandsVertexBufferTokenEXT,
    pub p_index_buffer: *const IndirectCommandsIndexBufferTokenEXT,
    pub p_execution_set: *const IndirectCommandsExecutionSetTokenEXT,
    pub raw: *const c_void,
}

/// `VkIndirectCommandsLayoutTokenEXT`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IndirectCommandsLayoutTokenEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub ty: IndirectCommandsTokenTypeEXT,
    pub data: IndirectCommandsTokenDataEXT,
    pub offset: u32,
}

/// `VkIndirectCommandsLayoutCreateInfoEXT`
#[repr(C)]
#[derive(Clone, Copy)]
pub struct IndirectCommandsLayoutCreateInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub flags: IndirectCommandsLayoutUsageFlagsEXT,
    pub shader_stages: vk::ShaderStageFlags,
    pub indirect_stride: u32,
    pub pipeline_layout: vk::PipelineLayout,
    pub token_count: u32,
    pub p_tokens: *const IndirectCommandsLayoutTokenEXT,
}

/// `VkGeneratedCommandsPipelineInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCommandsPipelineInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub pipeline: vk::Pipeline,
}

impl Default for GeneratedCommandsPipelineInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_GENERATED_COMMANDS_PIPELINE_INFO_EXT,
            p_next: ptr::null(),
            pipeline: vk::Pipeline::null(),
        }
    }
}

/// `VkGeneratedCommandsShaderInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCommandsShaderInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub shader_count: u32,
    pub p_shaders: *const vk::ShaderEXT,
}

impl Default for GeneratedCommandsShaderInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_GENERATED_COMMANDS_SHADER_INFO_EXT,
            p_next: ptr::null(),
            shader_count: 0,
            p_shaders: ptr::null(),
        }
    }
}

/// `VkGeneratedCommandsInfoEXT`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct GeneratedCommandsInfoEXT {
    pub s_type: vk::StructureType,
    pub p_next: *const c_void,
    pub shader_stages: vk::ShaderStageFlags,
    pub indirect_execution_set: IndirectExecutionSetEXT,
    pub indirect_commands_layout: IndirectCommandsLayoutEXT,
    pub indirect_address: vk::DeviceAddress,
    pub indirect_address_size: vk::DeviceSize,
    pub preprocess_address: vk::DeviceAddress,
    pub preprocess_size: vk::DeviceSize,
    pub max_sequence_count: u32,
    pub sequence_count_address: vk::DeviceAddress,
    pub max_draw_count: u32,
}

impl Default for GeneratedCommandsInfoEXT {
    fn default() -> Self {
        Self {
            s_type: STRUCTURE_TYPE_GENERATED_COMMANDS_INFO_EXT,
            p_next: ptr::null(),
            shader_stages: vk::ShaderStageFlags::empty(),
            indirect_execution_set: IndirectExecutionSetEXT::null(),
            indirect_commands_layout: IndirectCommandsLayoutEXT::null(),
            indirect_address: 0,
            indirect_address_size: 0,
            preprocess_address: 0,
            preprocess_size: 0,
            max_sequence_count: 0,
            sequence_count_address: 0,
            max_draw_count: 0,
        }
    }
}

#[allow(non_camel_case_types)]
pub type PFN_vkCreateIndirectCommandsLayoutEXT = unsafe extern "system" fn(
    vk::Device,
    *const IndirectCommandsLayoutCreateInfoEXT,
    *const vk::AllocationCallbacks<'_>,
    *mut IndirectCommandsLayoutEXT,
) -> vk::Result;

#[allow(non_camel_case_types)]
pub type PFN_vkDestroyIndirectCommandsLayoutEXT = unsafe extern "system" fn(
    vk::Device,
    IndirectCommandsLayoutEXT,
    *const vk::AllocationCallbacks<'_>,
);

#[allow(non_camel_case_types)]
pub type PFN_vkCreateIndirectExecutionSetEXT = unsafe extern "system" fn(
    vk::Device,
    *const IndirectExecutionSetCreateInfoEXT,
    *const vk::AllocationCallbacks<'_>,
    *mut IndirectExecutionSetEXT,
) -> vk::Result;

#[allow(non_camel_case_types)]
pub type PFN_vkDestroyIndirectExecutionSetEXT = unsafe extern "system" fn(
    vk::Device,
    IndirectExecutionSetEXT,
    *const vk::AllocationCallbacks<'_>,
);

#[allow(non_camel_case_types)]
pub type PFN_vkUpdateIndirectExecutionSetPipelineEXT = unsafe extern "system" fn(
    vk::Device,
    IndirectExecutionSetEXT,
    u32,
    *const WriteIndirectExecutionSetPipelineEXT,
);

#[allow(non_camel_case_types)]
pub type PFN_vkUpdateIndirectExecutionSetShaderEXT = unsafe extern "system" fn(
    vk::Device,
    IndirectExecutionSetEXT,
    u32,
    *const WriteIndirectExecutionSetShaderEXT,
);

#[allow(non_camel_case_types)]
pub type PFN_vkGetGeneratedCommandsMemoryRequirementsEXT = unsafe extern "system" fn(
    vk::Device,
    *const GeneratedCommandsMemoryRequirementsInfoEXT,
    *mut vk::MemoryRequirements2<'_>,
);

#[allow(non_camel_case_types)]
pub type PFN_vkCmdPreprocessGeneratedCommandsEXT = unsafe extern "system" fn(
    vk::CommandBuffer,
    *const GeneratedCommandsInfoEXT,
    vk::CommandBuffer,
);

#[allow(non_camel_case_types)]
pub type PFN_vkCmdExecuteGeneratedCommandsEXT =
    unsafe extern "system" fn(vk::CommandBuffer, vk::Bool32, *const GeneratedCommandsInfoEXT);

/// Function pointer table, loaded through `vkGetDeviceProcAddr`.
#[derive(Clone)]
pub struct DeviceFn {
    pub create_indirect_commands_layout_ext: PFN_vkCreateIndirectCommandsLayoutEXT,
    pub destroy_indirect_commands_layout_ext: PFN_vkDestroyIndirectCommandsLayoutEXT,
    pub create_indirect_execution_set_ext: PFN_vkCreateIndirectExecutionSetEXT,
    pub destroy_indirect_execution_set_ext: PFN_vkDestroyIndirectExecutionSetEXT,
    pub update_indirect_execution_set_pipeline_ext: PFN_vkUpdateIndirectExecutionSetPipelineEXT,
    pub update_indirect_execution_set_shader_ext: PFN_vkUpdateIndirectExecutionSetShaderEXT,
    pub get_generated_commands_memory_requirements_ext:
        PFN_vkGetGeneratedCommandsMemoryRequirementsEXT,
    pub cmd_preprocess_generated_commands_ext: PFN_vkCmdPreprocessGeneratedCommandsEXT,
    pub cmd_execute_generated_commands_ext: PFN_vkCmdExecuteGeneratedCommandsEXT,
}

impl DeviceFn {
    pub fn load<F: FnMut(&CStr) -> *const c_void>(mut f: F) -> Self {
        unsafe {
            Self {
                create_indirect_commands_layout_ext: mem::transmute(f(
                    c"vkCreateIndirectCommandsLayoutEXT",
                )),
                destroy_indirect_commands_layout_ext: mem::transmute(f(
                    c"vkDestroyIndirectCommandsLayoutEXT",
                )),
                create_indirect_execution_set_ext: mem::transmute(f(
                    c"vkCreateIndirectExecutionSetEXT",
                )),
                destroy_indirect_execution_set_ext: mem::transmute(f(
                    c"vkDestroyIndirectExecutionSetEXT",
                )),
                update_indirect_execution_set_pipeline_ext: mem::transmute(f(
                    c"vkUpdateIndirectExecutionSetPipelineEXT",
                )),
                update_indirect_execution_set_shader_ext: mem::transmute(f(
                    c"vkUpdateIndirectExecutionSetShaderEXT",
                )),
                get_generated_commands_memory_requirements_ext: mem::transmute(f(
                    c"vkGetGeneratedCommandsMemoryRequirementsEXT",
                )),
                cmd_preprocess_generated_commands_ext: mem::transmute(f(
                    c"vkCmdPreprocessGeneratedCommandsEXT",
                )),
                cmd_execute_generated_commands_ext: mem::transmute(f(
                    c"vkCmdExecuteGeneratedCommandsEXT",
                )),
            }
        }
    }
}

/// Extension device dispatch, mirroring `ash`'s generated `Device` wrappers.
#[derive(Clone)]
pub struct Device {
    handle: vk::Device,
    fp: DeviceFn,
}

impl Device {
    /// Load the extension entry points for a device.
    ///
    /// The device must have been created with
    /// [`EXTENSION_NAME`] enabled; the entry points are null otherwise
    /// and any call through them is undefined.
    pub fn new(instance: &ash::Instance, device: &ash::Device) -> Self {
        let handle = device.handle();
        let fp = DeviceFn::load(|name| unsafe {
            mem::transmute(instance.get_device_proc_addr(handle, name.as_ptr()))
        });
        Self { handle, fp }
    }

    pub fn fp(&self) -> &DeviceFn {
        &self.fp
    }

    pub fn device(&self) -> vk::Device {
        self.handle
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkCreateIndirectCommandsLayoutEXT.html>
    pub unsafe fn create_indirect_commands_layout(
        &self,
        create_info: &IndirectCommandsLayoutCreateInfoEXT,
    ) -> VkResult<IndirectCommandsLayoutEXT> {
        let mut layout = IndirectCommandsLayoutEXT::null();
        (self.fp.create_indirect_commands_layout_ext)(
            self.handle,
            create_info,
            ptr::null(),
            &mut layout,
        )
        .result_with_success(layout)
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkDestroyIndirectCommandsLayoutEXT.html>
    pub unsafe fn destroy_indirect_commands_layout(&self, layout: IndirectCommandsLayoutEXT) {
        (self.fp.destroy_indirect_commands_layout_ext)(self.handle, layout, ptr::null());
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkCreateIndirectExecutionSetEXT.html>
    pub unsafe fn create_indirect_execution_set(
        &self,
        create_info: &IndirectExecutionSetCreateInfoEXT,
    ) -> VkResult<IndirectExecutionSetEXT> {
        let mut set = IndirectExecutionSetEXT::null();
        (self.fp.create_indirect_execution_set_ext)(self.handle, create_info, ptr::null(), &mut set)
            .result_with_success(set)
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkDestroyIndirectExecutionSetEXT.html>
    pub unsafe fn destroy_indirect_execution_set(&self, set: IndirectExecutionSetEXT) {
        (self.fp.destroy_indirect_execution_set_ext)(self.handle, set, ptr::null());
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkUpdateIndirectExecutionSetPipelineEXT.html>
    pub unsafe fn update_indirect_execution_set_pipeline(
        &self,
        set: IndirectExecutionSetEXT,
        writes: &[WriteIndirectExecutionSetPipelineEXT],
    ) {
        (self.fp.update_indirect_execution_set_pipeline_ext)(
            self.handle,
            set,
            writes.len() as u32,
            writes.as_ptr(),
        );
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkUpdateIndirectExecutionSetShaderEXT.html>
    pub unsafe fn update_indirect_execution_set_shader(
        &self,
        set: IndirectExecutionSetEXT,
        writes: &[WriteIndirectExecutionSetShaderEXT],
    ) {
        (self.fp.update_indirect_execution_set_shader_ext)(
            self.handle,
            set,
            writes.len() as u32,
            writes.as_ptr(),
        );
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkGetGeneratedCommandsMemoryRequirementsEXT.html>
    pub unsafe fn get_generated_commands_memory_requirements(
        &self,
        info: &GeneratedCommandsMemoryRequirementsInfoEXT,
    ) -> vk::MemoryRequirements {
        let mut mem_reqs = vk::MemoryRequirements2::default();
        (self.fp.get_generated_commands_memory_requirements_ext)(self.handle, info, &mut mem_reqs);
        mem_reqs.memory_requirements
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkCmdPreprocessGeneratedCommandsEXT.html>
    pub unsafe fn cmd_preprocess_generated_commands(
        &self,
        command_buffer: vk::CommandBuffer,
        info: &GeneratedCommandsInfoEXT,
        state_command_buffer: vk::CommandBuffer,
    ) {
        (self.fp.cmd_preprocess_generated_commands_ext)(command_buffer, info, state_command_buffer);
    }

    /// <https://registry.khronos.org/vulkan/specs/latest/man/html/vkCmdExecuteGeneratedCommandsEXT.html>
    pub unsafe fn cmd_execute_generated_commands(
        &self,
        command_buffer: vk::CommandBuffer,
        is_preprocessed: bool,
        info: &GeneratedCommandsInfoEXT,
    ) {
        (self.fp.cmd_execute_generated_commands_ext)(
            command_buffer,
            vk::Bool32::from(is_preprocessed),
            info,
        );
    }
}
