//! Sequence values and stream encoding.
//!
//! A [`Sequence`] supplies one value per layout token; [`encode`]
//! serializes a batch of sequences into the flat byte buffer the
//! device consumes. Encoding is all-or-nothing: any mismatch rejects
//! the whole batch before a single byte is produced.

use crate::error::{DgcError, Result};
use crate::layout::Layout;
use crate::token::{
    BindIndexBufferCommand, BindVertexBufferCommand, DrawCommand, DrawIndexedCommand, Token,
};

/// One concrete value for a layout token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue<'a> {
    /// Variant indices for an execution-set select token. Pipeline sets
    /// take exactly one index; shader-object sets one per stage bit.
    ExecutionSetIndices(&'a [u32]),
    /// Raw bytes for a push-constant token; length must equal the
    /// token's declared range size.
    PushConstant(&'a [u8]),
    /// Placeholder for a sequence-index token. The slot is zero-filled;
    /// the device writes the actual index.
    SequenceIndex,
    VertexBuffer(BindVertexBufferCommand),
    IndexBuffer(BindIndexBufferCommand),
    Draw(DrawCommand),
    DrawIndexed(DrawIndexedCommand),
}

impl TokenValue<'_> {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::ExecutionSetIndices(_) => "execution-set select",
            Self::PushConstant(_) => "push constant",
            Self::SequenceIndex => "sequence index",
            Self::VertexBuffer(_) => "vertex buffer bind",
            Self::IndexBuffer(_) => "index buffer bind",
            Self::Draw(_) => "draw",
            Self::DrawIndexed(_) => "indexed draw",
        }
    }
}

/// One logical draw instruction: values for every token in a layout,
/// in layout order.
#[derive(Debug, Clone, Default)]
pub struct Sequence<'a> {
    values: Vec<TokenValue<'a>>,
}

impl<'a> Sequence<'a> {
    pub fn new() -> Self {
        Self { values: Vec::new() }
    }

    pub fn push(&mut self, value: TokenValue<'a>) -> &mut Self {
        self.values.push(value);
        self
    }

    pub fn values(&self) -> &[TokenValue<'a>] {
        &self.values
    }
}

/// Validate a value against its token; returns the bytes to copy, or
/// `None` for slots the encoder zero-fills.
fn payload_bytes<'v>(
    token: &Token,
    value: &'v TokenValue<'_>,
    sequence: usize,
    position: usize,
) -> Result<Option<&'v [u8]>> {
    let mismatch = || DgcError::ValueKindMismatch {
        sequence,
        token: position,
        expected: token.kind_name(),
        actual: value.kind_name(),
    };

    match (token, value) {
        (Token::ExecutionSetSelect { .. }, TokenValue::ExecutionSetIndices(indices)) => {
            let expected = token.data_size() / 4;
            if indices.len() != expected as usize {
                return Err(DgcError::ExecutionSetIndexCount {
                    expected,
                    actual: indices.len(),
                });
            }
            Ok(Some(bytemuck::cast_slice(indices)))
        }
        (Token::PushConstant { range }, TokenValue::PushConstant(bytes)) => {
            if bytes.len() != range.size as usize {
                return Err(DgcError::PushConstantSize {
                    expected: range.size,
                    actual: bytes.len(),
                });
            }
            Ok(Some(bytes))
        }
        (Token::SequenceIndex { .. }, TokenValue::SequenceIndex) => Ok(None),
        (Token::VertexBufferBind { .. }, TokenValue::VertexBuffer(cmd)) => {
            Ok(Some(bytemuck::bytes_of(cmd)))
        }
        (Token::IndexBufferBind { .. }, TokenValue::IndexBuffer(cmd)) => {
            Ok(Some(bytemuck::bytes_of(cmd)))
        }
        (Token::Draw, TokenValue::Draw(cmd)) => Ok(Some(bytemuck::bytes_of(cmd))),
        (Token::DrawIndexed, TokenValue::DrawIndexed(cmd)) => Ok(Some(bytemuck::bytes_of(cmd))),
        _ => Err(mismatch()),
    }
}

/// Serialize sequences against a layout.
///
/// Output length is `layout.stride() * sequences.len()`; every value
/// lands at its token's frozen offset and padding gaps stay zeroed.
pub fn encode(layout: &Layout, sequences: &[Sequence<'_>]) -> Result<Vec<u8>> {
    let tokens = layout.tokens();
    let stride = layout.stride() as usize;

    // Validate everything up front so a failure leaves nothing half-written.
    for (seq_idx, sequence) in sequences.iter().enumerate() {
        if sequence.values().len() != tokens.len() {
            return Err(DgcError::TokenCountMismatch {
                sequence: seq_idx,
                expected: tokens.len(),
                actual: sequence.values().len(),
            });
        }
        for (pos, (entry, value)) in tokens.iter().zip(sequence.values()).enumerate() {
            payload_bytes(&entry.token, value, seq_idx, pos)?;
        }
    }

    let mut out = vec![0u8; stride * sequences.len()];
    for (seq_idx, sequence) in sequences.iter().enumerate() {
        let base = seq_idx * stride;
        for (pos, (entry, value)) in tokens.iter().zip(sequence.values()).enumerate() {
            if let Some(bytes) = payload_bytes(&entry.token, value, seq_idx, pos)? {
                let start = base + entry.offset as usize;
                out[start..start + bytes.len()].copy_from_slice(bytes);
            }
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{LayoutBuilder, LayoutUsageFlags};
    use ash::vk;

    fn draw_layout() -> Layout {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        builder.add_draw_token();
        builder.build().unwrap()
    }

    fn draw(vertex_count: u32, instance_count: u32, first_vertex: u32, first_instance: u32) -> DrawCommand {
        DrawCommand {
            vertex_count,
            instance_count,
            first_vertex,
            first_instance,
        }
    }

    fn draw_sequence(cmd: DrawCommand) -> Sequence<'static> {
        let mut seq = Sequence::new();
        seq.push(TokenValue::Draw(cmd));
        seq
    }

    #[test]
    fn encodes_draws_back_to_back() {
        let layout = draw_layout();
        let draws = [draw(3, 1, 0, 0), draw(6, 1, 0, 1), draw(3, 2, 9, 0)];
        let sequences: Vec<_> = draws.iter().map(|d| draw_sequence(*d)).collect();

        let bytes = encode(&layout, &sequences).unwrap();
        assert_eq!(bytes.len(), layout.stride() as usize * 3);

        for (i, expected) in draws.iter().enumerate() {
            let base = i * layout.stride() as usize;
            let decoded: DrawCommand =
                bytemuck::pod_read_unaligned(&bytes[base..base + 16]);
            assert_eq!(decoded, *expected);
        }
    }

    #[test]
    fn encoding_is_deterministic() {
        let layout = draw_layout();
        let sequences = vec![draw_sequence(draw(3, 2, 9, 0))];
        assert_eq!(
            encode(&layout, &sequences).unwrap(),
            encode(&layout, &sequences).unwrap()
        );
    }

    #[test]
    fn negative_vertex_offset_round_trips() {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        builder.add_draw_indexed_token();
        let layout = builder.build().unwrap();

        let cmd = DrawIndexedCommand {
            index_count: 6,
            instance_count: 1,
            first_index: 0,
            vertex_offset: -128,
            first_instance: 0,
        };
        let mut seq = Sequence::new();
        seq.push(TokenValue::DrawIndexed(cmd));

        let bytes = encode(&layout, &[seq]).unwrap();
        let decoded: DrawIndexedCommand = bytemuck::pod_read_unaligned(&bytes[0..20]);
        assert_eq!(decoded.vertex_offset, -128);
    }

    #[test]
    fn sequence_index_slot_is_zero_filled() {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        let range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .size(4);
        builder.add_sequence_index_token(range);
        builder.add_draw_token();
        let layout = builder.build().unwrap();

        let mut seq = Sequence::new();
        seq.push(TokenValue::SequenceIndex);
        seq.push(TokenValue::Draw(draw(3, 1, 0, 0)));

        let bytes = encode(&layout, &[seq]).unwrap();
        assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
        let decoded: DrawCommand = bytemuck::pod_read_unaligned(&bytes[4..20]);
        assert_eq!(decoded, draw(3, 1, 0, 0));
    }

    #[test]
    fn missing_value_rejected() {
        let layout = draw_layout();
        let empty = Sequence::new();
        assert!(matches!(
            encode(&layout, &[empty]),
            Err(DgcError::TokenCountMismatch {
                sequence: 0,
                expected: 1,
                actual: 0,
            })
        ));
    }

    #[test]
    fn kind_mismatch_rejected() {
        let layout = draw_layout();
        let mut seq = Sequence::new();
        seq.push(TokenValue::DrawIndexed(DrawIndexedCommand {
            index_count: 3,
            instance_count: 1,
            first_index: 0,
            vertex_offset: 0,
            first_instance: 0,
        }));
        assert!(matches!(
            encode(&layout, &[seq]),
            Err(DgcError::ValueKindMismatch { .. })
        ));
    }

    #[test]
    fn push_constant_size_checked() {
        let mut builder =
            LayoutBuilder::new(LayoutUsageFlags::empty(), vk::ShaderStageFlags::VERTEX);
        let range = vk::PushConstantRange::default()
            .stage_flags(vk::ShaderStageFlags::VERTEX)
            .size(8);
        builder.add_push_constant_token(range);
        builder.add_draw_token();
        let layout = builder.build().unwrap();

        let short = [0u8; 4];
        let mut seq = Sequence::new();
        seq.push(TokenValue::PushConstant(&short));
        seq.push(TokenValue::Draw(draw(3, 1, 0, 0)));
        assert!(matches!(
            encode(&layout, &[seq]),
            Err(DgcError::PushConstantSize {
                expected: 8,
                actual: 4,
            })
        ));
    }

    #[test]
    fn execution_set_index_count_checked() {
        use crate::execution_set::ExecutionSetModel;

        let stages = vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT;
        let mut builder = LayoutBuilder::new(LayoutUsageFlags::empty(), stages);
        builder.add_execution_set_token(ExecutionSetModel::ShaderObjects, stages);
        builder.add_draw_token();
        let layout = builder.build().unwrap();

        let one_index = [0u32];
        let mut seq = Sequence::new();
        seq.push(TokenValue::ExecutionSetIndices(&one_index));
        seq.push(TokenValue::Draw(draw(3, 1, 0, 0)));
        assert!(matches!(
            encode(&layout, &[seq]),
            Err(DgcError::ExecutionSetIndexCount {
                expected: 2,
                actual: 1,
            })
        ));
    }

    #[test]
    fn rejection_reports_no_partial_output() {
        let layout = draw_layout();
        let sequences = vec![draw_sequence(draw(3, 1, 0, 0)), Sequence::new()];
        // The second sequence is malformed; the first must not leak out.
        assert!(encode(&layout, &sequences).is_err());
    }
}
