//! Token catalog for indirect command sequences.
//!
//! Each sequence in a command stream is a fixed-shape binary record; a
//! token describes one field of that record. The catalog is closed:
//! the device consumes exactly these token kinds and no others.

use crate::execution_set::ExecutionSetModel;
use crate::ext;
use ash::vk;
use bytemuck::{Pod, Zeroable};

/// `DXGI_FORMAT_R32_UINT`, the index-type tag used in DXGI input mode.
pub const DXGI_FORMAT_R32_UINT: u32 = 42;
/// `DXGI_FORMAT_R16_UINT`.
pub const DXGI_FORMAT_R16_UINT: u32 = 57;

/// Map a Vulkan index type to its DXGI format tag.
pub fn dxgi_index_format(index_type: vk::IndexType) -> Option<u32> {
    match index_type {
        vk::IndexType::UINT32 => Some(DXGI_FORMAT_R32_UINT),
        vk::IndexType::UINT16 => Some(DXGI_FORMAT_R16_UINT),
        _ => None,
    }
}

/// Draw parameters as they appear in the stream (16 bytes).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawCommand {
    pub vertex_count: u32,
    pub instance_count: u32,
    pub first_vertex: u32,
    pub first_instance: u32,
}

/// Indexed draw parameters (20 bytes). The vertex offset is signed to
/// permit negative base-vertex rebias.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct DrawIndexedCommand {
    pub index_count: u32,
    pub instance_count: u32,
    pub first_index: u32,
    pub vertex_offset: i32,
    pub first_instance: u32,
}

/// Vertex buffer bind descriptor (16 bytes). The address is an opaque
/// device pointer, never dereferenced on the host.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BindVertexBufferCommand {
    pub buffer_address: u64,
    pub size: u32,
    pub stride: u32,
}

/// Index buffer bind descriptor (16 bytes). `index_type` holds a
/// `VkIndexType` value in Vulkan input mode, or a DXGI format tag in
/// DXGI input mode.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Pod, Zeroable)]
pub struct BindIndexBufferCommand {
    pub buffer_address: u64,
    pub size: u32,
    pub index_type: u32,
}

/// One field descriptor within a per-sequence record.
#[derive(Debug, Clone, Copy)]
pub enum Token {
    /// Selects a variant from an indirect execution set. Pipeline-backed
    /// sets read one index; shader-object sets read one index per stage
    /// bit in `stages`.
    ExecutionSetSelect {
        model: ExecutionSetModel,
        stages: vk::ShaderStageFlags,
    },
    /// Writes `range.size` opaque bytes into the given push-constant range.
    PushConstant { range: vk::PushConstantRange },
    /// Device-written sequence index into a fixed 4-byte push-constant
    /// range. Occupies stream bytes but takes no caller value.
    SequenceIndex { range: vk::PushConstantRange },
    /// Binds a vertex buffer at the given binding slot.
    VertexBufferBind { binding: u32 },
    /// Binds an index buffer; `mode` selects Vulkan or DXGI descriptors.
    IndexBufferBind {
        mode: ext::IndirectCommandsInputModeFlagsEXT,
    },
    Draw,
    DrawIndexed,
}

impl Token {
    /// Bytes this token occupies in each sequence.
    pub fn data_size(&self) -> u32 {
        const U32_SIZE: u32 = 4;
        match self {
            Self::ExecutionSetSelect { model, stages } => match model {
                ExecutionSetModel::Pipelines => U32_SIZE,
                ExecutionSetModel::ShaderObjects => U32_SIZE * stages.as_raw().count_ones(),
            },
            Self::PushConstant { range } | Self::SequenceIndex { range } => range.size,
            Self::VertexBufferBind { .. } => std::mem::size_of::<BindVertexBufferCommand>() as u32,
            Self::IndexBufferBind { .. } => std::mem::size_of::<BindIndexBufferCommand>() as u32,
            Self::Draw => std::mem::size_of::<DrawCommand>() as u32,
            Self::DrawIndexed => std::mem::size_of::<DrawIndexedCommand>() as u32,
        }
    }

    /// Whether this token provokes work. The device scans tokens
    /// sequentially and an action token terminates the sequence, so a
    /// layout carries exactly one, last.
    pub fn is_action(&self) -> bool {
        matches!(self, Self::Draw | Self::DrawIndexed)
    }

    /// Push-constant and sequence-index tokens reference a pipeline
    /// layout at device-layout creation time.
    pub fn requires_pipeline_layout(&self) -> bool {
        matches!(self, Self::PushConstant { .. } | Self::SequenceIndex { .. })
    }

    /// Stages this token itself addresses; must be covered by the
    /// layout's stage mask.
    pub fn required_stages(&self) -> vk::ShaderStageFlags {
        match self {
            Self::ExecutionSetSelect { stages, .. } => *stages,
            Self::PushConstant { range } | Self::SequenceIndex { range } => range.stage_flags,
            _ => vk::ShaderStageFlags::empty(),
        }
    }

    /// Raw token type for the device layout.
    pub fn token_type(&self) -> ext::IndirectCommandsTokenTypeEXT {
        match self {
            Self::ExecutionSetSelect { .. } => ext::IndirectCommandsTokenTypeEXT::EXECUTION_SET,
            Self::PushConstant { .. } => ext::IndirectCommandsTokenTypeEXT::PUSH_CONSTANT,
            Self::SequenceIndex { .. } => ext::IndirectCommandsTokenTypeEXT::SEQUENCE_INDEX,
            Self::VertexBufferBind { .. } => ext::IndirectCommandsTokenTypeEXT::VERTEX_BUFFER,
            Self::IndexBufferBind { .. } => ext::IndirectCommandsTokenTypeEXT::INDEX_BUFFER,
            Self::Draw => ext::IndirectCommandsTokenTypeEXT::DRAW,
            Self::DrawIndexed => ext::IndirectCommandsTokenTypeEXT::DRAW_INDEXED,
        }
    }

    /// Short kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::ExecutionSetSelect { .. } => "execution-set select",
            Self::PushConstant { .. } => "push constant",
            Self::SequenceIndex { .. } => "sequence index",
            Self::VertexBufferBind { .. } => "vertex buffer bind",
            Self::IndexBufferBind { .. } => "index buffer bind",
            Self::Draw => "draw",
            Self::DrawIndexed => "indexed draw",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_sizes() {
        assert_eq!(Token::Draw.data_size(), 16);
        assert_eq!(Token::DrawIndexed.data_size(), 20);
        assert_eq!(Token::VertexBufferBind { binding: 0 }.data_size(), 16);
        assert_eq!(
            Token::IndexBufferBind {
                mode: ext::IndirectCommandsInputModeFlagsEXT::VULKAN_INDEX_BUFFER
            }
            .data_size(),
            16
        );
    }

    #[test]
    fn execution_set_size_follows_model() {
        let stages = vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT;
        let pipelines = Token::ExecutionSetSelect {
            model: ExecutionSetModel::Pipelines,
            stages,
        };
        let shaders = Token::ExecutionSetSelect {
            model: ExecutionSetModel::ShaderObjects,
            stages,
        };
        assert_eq!(pipelines.data_size(), 4);
        assert_eq!(shaders.data_size(), 8);
    }

    #[test]
    fn action_tokens() {
        assert!(Token::Draw.is_action());
        assert!(Token::DrawIndexed.is_action());
        assert!(!Token::VertexBufferBind { binding: 0 }.is_action());
    }

    #[test]
    fn dxgi_format_tags() {
        assert_eq!(dxgi_index_format(vk::IndexType::UINT32), Some(42));
        assert_eq!(dxgi_index_format(vk::IndexType::UINT16), Some(57));
        assert_eq!(dxgi_index_format(vk::IndexType::UINT8_EXT), None);
    }
}
