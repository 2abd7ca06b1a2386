//! Device-generated-commands error types.

use ash::vk;
use thiserror::Error;

/// Errors raised while building layouts, encoding streams, or driving
/// the preprocess/execute protocol.
#[derive(Error, Debug)]
pub enum DgcError {
    /// Vulkan error.
    #[error("Vulkan error: {0}")]
    Vulkan(#[from] vk::Result),

    /// Error from the GPU plumbing layer.
    #[error(transparent)]
    Gpu(#[from] pyrite_gpu::GpuError),

    /// Layout built with no tokens.
    #[error("Commands layout has no tokens")]
    EmptyLayout,

    /// Layout has no draw or dispatch token.
    #[error("Commands layout has no action token")]
    MissingActionToken,

    /// The action token must terminate the sequence.
    #[error("Action token at position {0} is not the last token")]
    ActionTokenNotLast(usize),

    /// More than one work-provoking token in a layout.
    #[error("Commands layout has more than one action token")]
    MultipleActionTokens,

    /// Two tokens claim the same bind slot.
    #[error("Duplicate {0} token")]
    DuplicateToken(&'static str),

    /// Sequence-index tokens update a fixed 4-byte range.
    #[error("Sequence-index token range size is {0}, must be 4")]
    SequenceIndexRange(u32),

    /// Token stage mask escapes the layout's stage mask.
    #[error("Token stages {token:?} not covered by layout stages {layout:?}")]
    StageMask {
        token: vk::ShaderStageFlags,
        layout: vk::ShaderStageFlags,
    },

    /// Push-constant and sequence-index tokens need a pipeline layout.
    #[error("Commands layout token requires a pipeline layout")]
    MissingPipelineLayout,

    /// Sequence value count differs from the layout token count.
    #[error("Sequence {sequence} has {actual} values, layout declares {expected} tokens")]
    TokenCountMismatch {
        sequence: usize,
        expected: usize,
        actual: usize,
    },

    /// Sequence value kind differs from the layout token kind.
    #[error("Sequence {sequence}, token {token}: expected {expected} value, got {actual}")]
    ValueKindMismatch {
        sequence: usize,
        token: usize,
        expected: &'static str,
        actual: &'static str,
    },

    /// Push-constant payload length differs from the declared range.
    #[error("Push constant payload is {actual} bytes, declared range is {expected}")]
    PushConstantSize { expected: u32, actual: usize },

    /// Execution-set select value carries the wrong number of indices.
    #[error("Execution-set select has {actual} indices, token expects {expected}")]
    ExecutionSetIndexCount { expected: u32, actual: usize },

    /// Pipeline write into a shader-object set or vice versa.
    #[error("Execution-set write does not match the set's backing model")]
    ExecutionSetModel,

    /// Variant index at or past the set's capacity.
    #[error("Execution-set index {index} out of range (capacity {capacity})")]
    IndexOutOfRange { index: u32, capacity: u32 },

    /// Handle requested while writes are still pending.
    #[error("Execution set has {0} pending writes, call update() first")]
    PendingWrites(usize),

    /// Preprocessing requested on a layout built without the
    /// explicit-preprocess flag.
    #[error("Commands layout was not created for explicit preprocessing")]
    ExplicitPreprocessRequired,

    /// Recorder driven against its configured mode.
    #[error("Invalid recorder transition: {0}")]
    InvalidTransition(&'static str),

    /// Device lacks a required feature, limit, or extension.
    #[error("Not supported: {0}")]
    NotSupported(String),
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, DgcError>;
