//! Device-generated command streams over
//! `VK_EXT_device_generated_commands`.
//!
//! The pieces, leaves first:
//! - [`token`]: the closed catalog of per-sequence field descriptors.
//! - [`layout`]: builds an immutable token layout with derived offsets
//!   and stride, and creates the device layout handle.
//! - [`encoder`]: serializes sequences of token values into the flat
//!   stream buffer the device consumes.
//! - [`execution_set`]: indexable tables of pipeline or shader-object
//!   variants selectable per sequence.
//! - [`preprocess`] and [`recorder`]: the two-phase preprocess/execute
//!   protocol, including the barrier and the state-capture rules.
//! - [`support`]: feature and limit checks, surfaced before any device
//!   work.
//! - [`ext`]: raw extension bindings in `ash`'s style.

pub mod device;
pub mod encoder;
pub mod error;
pub mod execution_set;
pub mod ext;
pub mod layout;
pub mod preprocess;
pub mod recorder;
pub mod support;
pub mod token;

pub use device::DgcDevice;
pub use encoder::{encode, Sequence, TokenValue};
pub use error::{DgcError, Result};
pub use execution_set::{ExecutionSetManager, ExecutionSetModel, ShaderStageInfo};
pub use layout::{IndirectCommandsLayout, Layout, LayoutBuilder, LayoutToken, LayoutUsageFlags};
pub use preprocess::{
    preprocess_to_execute_barrier, submit_with_preprocess, GeneratedCommandsInfo, IndirectState,
    PreprocessBuffer,
};
pub use recorder::{CommandStreamRecorder, PreprocessMode, Preprocessed, StateRecorded};
pub use support::{check_device, DgcProperties};
pub use token::{
    BindIndexBufferCommand, BindVertexBufferCommand, DrawCommand, DrawIndexedCommand, Token,
};
