//! Encodes a small batch of draw sequences and decodes the stream back
//! from the layout's frozen offsets. Token order between the
//! push-constant and vertex-bind tokens is picked from a seeded RNG,
//! since the format supports any legal ordering with only the action
//! token's position fixed.

use ash::vk;
use pyrite_dgc::layout::{Layout, LayoutBuilder, LayoutUsageFlags};
use pyrite_dgc::token::{BindVertexBufferCommand, DrawCommand};
use pyrite_dgc::{encode, Sequence, TokenValue};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const DRAWS: [DrawCommand; 3] = [
    DrawCommand {
        vertex_count: 3,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 0,
    },
    DrawCommand {
        vertex_count: 6,
        instance_count: 1,
        first_vertex: 0,
        first_instance: 1,
    },
    DrawCommand {
        vertex_count: 3,
        instance_count: 2,
        first_vertex: 9,
        first_instance: 0,
    },
];

fn push_constant_range() -> vk::PushConstantRange {
    vk::PushConstantRange::default()
        .stage_flags(vk::ShaderStageFlags::VERTEX)
        .size(8)
}

/// Builds the layout with the non-action tokens in either order and
/// reports where each token landed.
struct Scenario {
    layout: Layout,
    pc_first: bool,
    pc_offset: u32,
    vb_offset: u32,
    draw_offset: u32,
}

fn build_scenario(pc_first: bool) -> Scenario {
    let mut builder = LayoutBuilder::new(
        LayoutUsageFlags::empty(),
        vk::ShaderStageFlags::VERTEX | vk::ShaderStageFlags::FRAGMENT,
    );
    let (pc_offset, vb_offset) = if pc_first {
        let pc = builder.add_push_constant_token(push_constant_range());
        let vb = builder.add_vertex_buffer_token(0);
        (pc, vb)
    } else {
        let vb = builder.add_vertex_buffer_token(0);
        let pc = builder.add_push_constant_token(push_constant_range());
        (pc, vb)
    };
    let draw_offset = builder.add_draw_token();

    Scenario {
        layout: builder.build().expect("layout must build"),
        pc_first,
        pc_offset,
        vb_offset,
        draw_offset,
    }
}

fn encode_scenario(scenario: &Scenario, draws: &[DrawCommand]) -> Vec<u8> {
    let vertex_bind = BindVertexBufferCommand {
        buffer_address: 0xdead_beef_0000_1000,
        size: 256,
        stride: 16,
    };

    let pc_payloads: Vec<[u8; 8]> = (0..draws.len()).map(|i| [i as u8; 8]).collect();
    let sequences: Vec<Sequence> = draws
        .iter()
        .zip(&pc_payloads)
        .map(|(draw, pc)| {
            let mut seq = Sequence::new();
            if scenario.pc_first {
                seq.push(TokenValue::PushConstant(pc.as_slice()));
                seq.push(TokenValue::VertexBuffer(vertex_bind));
            } else {
                seq.push(TokenValue::VertexBuffer(vertex_bind));
                seq.push(TokenValue::PushConstant(pc.as_slice()));
            }
            seq.push(TokenValue::Draw(*draw));
            seq
        })
        .collect();

    encode(&scenario.layout, &sequences).expect("encode must succeed")
}

fn decode_draw(bytes: &[u8], stride: usize, sequence: usize, offset: u32) -> DrawCommand {
    let start = sequence * stride + offset as usize;
    bytemuck::pod_read_unaligned(&bytes[start..start + 16])
}

#[test]
fn three_sequence_scenario_round_trips_in_both_orders() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let first_order: bool = rng.gen();

    for pc_first in [first_order, !first_order] {
        let scenario = build_scenario(pc_first);
        let stride = scenario.layout.stride() as usize;
        let bytes = encode_scenario(&scenario, &DRAWS);

        assert_eq!(bytes.len(), stride * DRAWS.len());
        // 8 (push constant) + 16 (vertex bind) + 16 (draw).
        assert_eq!(stride, 40);
        assert_eq!(scenario.draw_offset, 24);

        for (i, expected) in DRAWS.iter().enumerate() {
            let decoded = decode_draw(&bytes, stride, i, scenario.draw_offset);
            assert_eq!(decoded, *expected, "sequence {i}, pc_first={pc_first}");

            let pc_start = i * stride + scenario.pc_offset as usize;
            assert_eq!(&bytes[pc_start..pc_start + 8], &[i as u8; 8]);

            let vb: BindVertexBufferCommand = bytemuck::pod_read_unaligned(
                &bytes[i * stride + scenario.vb_offset as usize
                    ..i * stride + scenario.vb_offset as usize + 16],
            );
            assert_eq!(vb.buffer_address, 0xdead_beef_0000_1000);
        }
    }
}

#[test]
fn token_order_moves_offsets_but_not_stride() {
    let pc_first = build_scenario(true);
    let bind_first = build_scenario(false);

    assert_eq!(pc_first.pc_offset, 0);
    assert_eq!(pc_first.vb_offset, 8);
    assert_eq!(bind_first.vb_offset, 0);
    assert_eq!(bind_first.pc_offset, 16);
    assert_eq!(pc_first.layout.stride(), bind_first.layout.stride());
}

#[test]
fn encoding_is_deterministic_across_calls() {
    let scenario = build_scenario(true);
    assert_eq!(
        encode_scenario(&scenario, &DRAWS),
        encode_scenario(&scenario, &DRAWS)
    );
}

#[test]
fn permuting_sequences_permutes_whole_blocks() {
    let scenario = build_scenario(true);
    let stride = scenario.layout.stride() as usize;

    let forward = encode_scenario(&scenario, &DRAWS);
    let reversed_draws: Vec<DrawCommand> = DRAWS.iter().rev().copied().collect();
    let reversed = encode_scenario(&scenario, &reversed_draws);

    for i in 0..DRAWS.len() {
        let j = DRAWS.len() - 1 - i;
        assert_eq!(
            decode_draw(&forward, stride, i, scenario.draw_offset),
            decode_draw(&reversed, stride, j, scenario.draw_offset),
        );
    }
}
