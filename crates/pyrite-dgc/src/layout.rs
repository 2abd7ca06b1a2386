//! Indirect commands layout construction.
//!
//! A [`LayoutBuilder`] accumulates tokens and derives each token's byte
//! offset from the running stream range, so offsets are never fixed
//! constants. [`build`](LayoutBuilder::build) validates the
//! configuration and freezes an immutable [`Layout`];
//! [`Layout::create`] then produces the device handle.

use crate::device::DgcDevice;
use crate::error::{DgcError, Result};
use crate::execution_set::ExecutionSetModel;
use crate::ext;
use crate::token::Token;
use ash::vk;
use bitflags::bitflags;

bitflags! {
    /// Layout-wide option flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct LayoutUsageFlags: u32 {
        /// Sequences must be preprocessed explicitly before execution.
        const EXPLICIT_PREPROCESS = 0b01;
        /// Sequences may execute in any order.
        const UNORDERED_SEQUENCES = 0b10;
    }
}

impl LayoutUsageFlags {
    pub(crate) fn to_vk(self) -> ext::IndirectCommandsLayoutUsageFlagsEXT {
        ext::IndirectCommandsLayoutUsageFlagsEXT(self.bits())
    }
}

fn align_up(value: u32, alignment: u32) -> u32 {
    (value + alignment - 1) & !(alignment - 1)
}

/// A token and the stream offset it was frozen at.
#[derive(Debug, Clone, Copy)]
pub struct LayoutToken {
    pub token: Token,
    pub offset: u32,
}

/// Accumulates tokens for an indirect commands layout.
pub struct LayoutBuilder {
    flags: LayoutUsageFlags,
    stage_mask: vk::ShaderStageFlags,
    tokens: Vec<LayoutToken>,
    manual_stride: Option<u32>,
}

impl LayoutBuilder {
    pub fn new(flags: LayoutUsageFlags, stage_mask: vk::ShaderStageFlags) -> Self {
        Self {
            flags,
            stage_mask,
            tokens: Vec::new(),
            manual_stride: None,
        }
    }

    /// Current stream range: the furthest byte any token reaches.
    pub fn stream_range(&self) -> u32 {
        self.tokens
            .iter()
            .map(|t| t.offset + t.token.data_size())
            .max()
            .unwrap_or(0)
    }

    /// Per-sequence stride the layout will carry. Manual override wins;
    /// otherwise the stream range rounded up to 4 bytes.
    pub fn stride(&self) -> u32 {
        self.manual_stride
            .unwrap_or_else(|| align_up(self.stream_range(), 4))
    }

    /// Override the derived stride, e.g. to pad sequences apart.
    pub fn set_stream_stride(&mut self, stride: u32) -> &mut Self {
        self.manual_stride = Some(stride);
        self
    }

    fn push(&mut self, token: Token) -> u32 {
        let offset = self.stream_range();
        self.tokens.push(LayoutToken { token, offset });
        offset
    }

    /// Append a token; returns the byte offset it occupies within each
    /// sequence. Appending never moves a previously returned offset.
    pub fn add_execution_set_token(
        &mut self,
        model: ExecutionSetModel,
        stages: vk::ShaderStageFlags,
    ) -> u32 {
        self.push(Token::ExecutionSetSelect { model, stages })
    }

    pub fn add_push_constant_token(&mut self, range: vk::PushConstantRange) -> u32 {
        self.push(Token::PushConstant { range })
    }

    pub fn add_sequence_index_token(&mut self, range: vk::PushConstantRange) -> u32 {
        self.push(Token::SequenceIndex { range })
    }

    pub fn add_vertex_buffer_token(&mut self, binding: u32) -> u32 {
        self.push(Token::VertexBufferBind { binding })
    }

    pub fn add_index_buffer_token(&mut self, mode: ext::IndirectCommandsInputModeFlagsEXT) -> u32 {
        self.push(Token::IndexBufferBind { mode })
    }

    pub fn add_draw_token(&mut self) -> u32 {
        self.push(Token::Draw)
    }

    pub fn add_draw_indexed_token(&mut self) -> u32 {
        self.push(Token::DrawIndexed)
    }

    /// Validate and freeze the layout.
    pub fn build(self) -> Result<Layout> {
        if self.tokens.is_empty() {
            return Err(DgcError::EmptyLayout);
        }

        let action_positions: Vec<usize> = self
            .tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.token.is_action())
            .map(|(i, _)| i)
            .collect();
        match action_positions.as_slice() {
            [] => return Err(DgcError::MissingActionToken),
            [last] if *last == self.tokens.len() - 1 => {}
            [misplaced] => return Err(DgcError::ActionTokenNotLast(*misplaced)),
            _ => return Err(DgcError::MultipleActionTokens),
        }

        let mut seen_index_buffer = false;
        let mut seen_execution_set = false;
        let mut vertex_bindings = Vec::new();
        for entry in &self.tokens {
            match entry.token {
                Token::ExecutionSetSelect { .. } => {
                    if seen_execution_set {
                        return Err(DgcError::DuplicateToken("execution-set select"));
                    }
                    seen_execution_set = true;
                }
                Token::IndexBufferBind { .. } => {
                    if seen_index_buffer {
                        return Err(DgcError::DuplicateToken("index buffer bind"));
                    }
                    seen_index_buffer = true;
                }
                Token::VertexBufferBind { binding } => {
                    if vertex_bindings.contains(&binding) {
                        return Err(DgcError::DuplicateToken("vertex buffer bind"));
                    }
                    vertex_bindings.push(binding);
                }
                Token::SequenceIndex { range } => {
                    if range.size != 4 {
                        return Err(DgcError::SequenceIndexRange(range.size));
                    }
                }
                _ => {}
            }

            let required = entry.token.required_stages();
            if !self.stage_mask.contains(required) {
                return Err(DgcError::StageMask {
                    token: required,
                    layout: self.stage_mask,
                });
            }
        }

        let stride = self.stride();
        Ok(Layout {
            tokens: self.tokens,
            stride,
            flags: self.flags,
            stage_mask: self.stage_mask,
        })
    }
}

/// Immutable token layout. Describes the binary shape of one sequence.
#[derive(Debug, Clone)]
pub struct Layout {
    tokens: Vec<LayoutToken>,
    stride: u32,
    flags: LayoutUsageFlags,
    stage_mask: vk::ShaderStageFlags,
}

impl Layout {
    pub fn tokens(&self) -> &[LayoutToken] {
        &self.tokens
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn flags(&self) -> LayoutUsageFlags {
        self.flags
    }

    pub fn stage_mask(&self) -> vk::ShaderStageFlags {
        self.stage_mask
    }

    /// Create the device layout handle.
    ///
    /// `pipeline_layout` may be null only when no token writes push
    /// constants.
    ///
    /// # Safety
    /// The device must be valid and `pipeline_layout` must outlive the
    /// returned layout if non-null.
    pub unsafe fn create(
        &self,
        device: &DgcDevice,
        pipeline_layout: vk::PipelineLayout,
    ) -> Result<IndirectCommandsLayout> {
        if pipeline_layout == vk::PipelineLayout::null()
            && self.tokens.iter().any(|t| t.token.requires_pipeline_layout())
        {
            return Err(DgcError::MissingPipelineLayout);
        }

        // Per-token data structs must stay alive across the create call,
        // so they are materialized first and referenced afterwards.
        enum TokenData {
            PushConstant(ext::IndirectCommandsPushConstantTokenEXT),
            VertexBuffer(ext::IndirectCommandsVertexBufferTokenEXT),
            IndexBuffer(ext::IndirectCommandsIndexBufferTokenEXT),
            ExecutionSet(ext::IndirectCommandsExecutionSetTokenEXT),
            None,
        }

        let data: Vec<TokenData> = self
            .tokens
            .iter()
            .map(|entry| match entry.token {
                Token::PushConstant { range } | Token::SequenceIndex { range } => {
                    TokenData::PushConstant(ext::IndirectCommandsPushConstantTokenEXT {
                        update_range: range,
                    })
                }
                Token::VertexBufferBind { binding } => {
                    TokenData::VertexBuffer(ext::IndirectCommandsVertexBufferTokenEXT {
                        vertex_binding_unit: binding,
                    })
                }
                Token::IndexBufferBind { mode } => {
                    TokenData::IndexBuffer(ext::IndirectCommandsIndexBufferTokenEXT { mode })
                }
                Token::ExecutionSetSelect { model, stages } => {
                    TokenData::ExecutionSet(ext::IndirectCommandsExecutionSetTokenEXT {
                        ty: model.info_type(),
                        shader_stages: stages,
                    })
                }
                Token::Draw | Token::DrawIndexed => TokenData::None,
            })
            .collect();

        let vk_tokens: Vec<ext::IndirectCommandsLayoutTokenEXT> = self
            .tokens
            .iter()
            .zip(&data)
            .map(|(entry, data)| ext::IndirectCommandsLayoutTokenEXT {
                s_type: ext::STRUCTURE_TYPE_INDIRECT_COMMANDS_LAYOUT_TOKEN_EXT,
                p_next: std::ptr::null(),
                ty: entry.token.token_type(),
                data: match data {
                    TokenData::PushConstant(pc) => ext::IndirectCommandsTokenDataEXT {
                        p_push_constant: std::ptr::from_ref(pc),
                    },
                    TokenData::VertexBuffer(vb) => ext::IndirectCommandsTokenDataEXT {
                        p_vertex_buffer: std::ptr::from_ref(vb),
                    },
                    TokenData::IndexBuffer(ib) => ext::IndirectCommandsTokenDataEXT {
                        p_index_buffer: std::ptr::from_ref(ib),
                    },
                    TokenData::ExecutionSet(es) => ext::IndirectCommandsTokenDataEXT {
                        p_execution_set: std::ptr::from_ref(es),
                    },
                    TokenData::None => ext::IndirectCommandsTokenDataEXT {
                        raw: std::ptr::null(),
                    },
                },
                offset: entry.offset,
            })
            .collect();

        let create_info = ext::IndirectCommandsLayoutCreateInfoEXT {
            s_type: ext::STRUCTURE_TYPE_INDIRECT_COMMANDS_LAYOUT_CREATE_INFO_EXT,
            p_next: std::ptr::null(),
            flags: self.flags.to_vk(),
            shader_stages: self.stage_mask,
            indirect_stride: self.stride,
            pipeline_layout,
            token_count: vk_tokens.len() as u32,
            p_tokens: vk_tokens.as_ptr(),
        };

        let handle = device.ext().create_indirect_commands_layout(&create_info)?;
        tracing::debug!(
            tokens = vk_tokens.len(),
            stride = self.stride,
            "created indirect commands layout"
        );

        Ok(IndirectCommandsLayout {
            handle,
            stride: self.stride,
            flags: self.flags,
            stage_mask: self.stage_mask,
        })
    }
}

/// Device-side layout handle plus the host facts callers keep needing.
pub struct IndirectCommandsLayout {
    handle: ext::IndirectCommandsLayoutEXT,
    stride: u32,
    flags: LayoutUsageFlags,
    stage_mask: vk::ShaderStageFlags,
}

impl IndirectCommandsLayout {
    pub fn handle(&self) -> ext::IndirectCommandsLayoutEXT {
        self.handle
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn flags(&self) -> LayoutUsageFlags {
        self.flags
    }

    pub fn stage_mask(&self) -> vk::ShaderStageFlags {
        self.stage_mask
    }

    /// Destroy the device layout.
    ///
    /// # Safety
    /// The layout must not be referenced by pending command buffers.
    pub unsafe fn destroy(&self, device: &DgcDevice) {
        device.ext().destroy_indirect_commands_layout(self.handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(offset: u32, size: u32) -> vk::PushConstantRange {
        vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .offset(offset)
            .size(size)
    }

    fn graphics_builder(flags: LayoutUsageFlags) -> LayoutBuilder {
        LayoutBuilder::new(
            flags,
            vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
        )
    }

    #[test]
    fn offsets_follow_stream_range() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        assert_eq!(builder.add_push_constant_token(range(0, 8)), 0);
        assert_eq!(builder.add_vertex_buffer_token(0), 8);
        assert_eq!(builder.add_draw_token(), 24);
        assert_eq!(builder.stride(), 40);
    }

    #[test]
    fn adding_tokens_never_moves_existing_offsets() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        let first = builder.add_push_constant_token(range(0, 4));
        let second = builder.add_vertex_buffer_token(0);
        builder.add_draw_token();
        let layout = builder.build().unwrap();
        assert_eq!(layout.tokens()[0].offset, first);
        assert_eq!(layout.tokens()[1].offset, second);
    }

    #[test]
    fn stride_is_aligned() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_push_constant_token(range(0, 6));
        builder.add_draw_token();
        let layout = builder.build().unwrap();
        // 6 + 16 = 22, rounded up.
        assert_eq!(layout.stride(), 24);
    }

    #[test]
    fn manual_stride_overrides_range() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_draw_token();
        builder.set_stream_stride(64);
        let layout = builder.build().unwrap();
        assert_eq!(layout.stride(), 64);
    }

    #[test]
    fn empty_layout_rejected() {
        let builder = graphics_builder(LayoutUsageFlags::empty());
        assert!(matches!(builder.build(), Err(DgcError::EmptyLayout)));
    }

    #[test]
    fn action_token_must_be_last() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_draw_token();
        builder.add_vertex_buffer_token(0);
        assert!(matches!(
            builder.build(),
            Err(DgcError::ActionTokenNotLast(0))
        ));
    }

    #[test]
    fn missing_action_token_rejected() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_vertex_buffer_token(0);
        assert!(matches!(builder.build(), Err(DgcError::MissingActionToken)));
    }

    #[test]
    fn duplicate_action_token_rejected() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_draw_token();
        builder.add_draw_indexed_token();
        assert!(matches!(
            builder.build(),
            Err(DgcError::MultipleActionTokens)
        ));
    }

    #[test]
    fn duplicate_binds_rejected() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_vertex_buffer_token(2);
        builder.add_vertex_buffer_token(2);
        builder.add_draw_token();
        assert!(matches!(
            builder.build(),
            Err(DgcError::DuplicateToken("vertex buffer bind"))
        ));

        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        let mode = ext::IndirectCommandsInputModeFlagsEXT::VULKAN_INDEX_BUFFER;
        builder.add_index_buffer_token(mode);
        builder.add_index_buffer_token(mode);
        builder.add_draw_indexed_token();
        assert!(matches!(
            builder.build(),
            Err(DgcError::DuplicateToken("index buffer bind"))
        ));
    }

    #[test]
    fn distinct_vertex_bindings_allowed() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_vertex_buffer_token(0);
        builder.add_vertex_buffer_token(1);
        builder.add_draw_token();
        assert!(builder.build().is_ok());
    }

    #[test]
    fn stage_mask_must_cover_tokens() {
        let mut builder = LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        builder.add_push_constant_token(
            vk::PushConstantRange::default()
                .stage_flags(vk::ShaderStageFlags::FRAGMENT)
                .size(4),
        );
        builder.add_draw_token();
        assert!(matches!(builder.build(), Err(DgcError::StageMask { .. })));
    }

    #[test]
    fn sequence_index_range_must_be_four_bytes() {
        let mut builder = graphics_builder(LayoutUsageFlags::empty());
        builder.add_sequence_index_token(range(0, 8));
        builder.add_draw_token();
        assert!(matches!(
            builder.build(),
            Err(DgcError::SequenceIndexRange(8))
        ));
    }

    #[test]
    fn flags_convert_to_raw_bits() {
        let flags = LayoutUsageFlags::EXPLICIT_PREPROCESS | LayoutUsageFlags::UNORDERED_SEQUENCES;
        assert_eq!(
            flags.to_vk(),
            ext::IndirectCommandsLayoutUsageFlagsEXT::EXPLICIT_PREPROCESS
                | ext::IndirectCommandsLayoutUsageFlagsEXT::UNORDERED_SEQUENCES
        );
    }

    #[test]
    fn align_up_behaviour() {
        assert_eq!(align_up(0, 4), 0);
        assert_eq!(align_up(1, 4), 4);
        assert_eq!(align_up(22, 4), 24);
        assert_eq!(align_up(24, 4), 24);
    }
}
