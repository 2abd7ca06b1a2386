//! Thin Vulkan plumbing shared by the Pyrite crates.
//!
//! This crate provides:
//! - GPU capability detection
//! - Memory allocation via gpu-allocator
//! - Command pool and submission helpers
//! - Pipeline wrappers for indirect-bindable graphics pipelines

pub mod capabilities;
pub mod command;
pub mod error;
pub mod memory;
pub mod pipeline;
pub mod sync;

pub use capabilities::{GpuCapabilities, GpuVendor};
pub use command::CommandPool;
pub use error::{GpuError, Result};
pub use memory::{GpuAllocator, GpuBuffer};
pub use pipeline::{GraphicsPipeline, GraphicsPipelineConfig};
pub use sync::{create_fence, create_semaphore, wait_for_fence};
