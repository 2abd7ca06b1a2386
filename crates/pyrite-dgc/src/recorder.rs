//! Preprocess/execute recording protocol.
//!
//! Generated commands may run straight from the encoded stream, or be
//! preprocessed into device-native form first. Preprocessing captures
//! bound pipeline/shader state from a *state* command buffer, which is
//! either the execution buffer itself or a separate throwaway buffer.
//! The recorder is a typestate over that protocol: an execution with
//! `is_preprocessed = true` is only reachable through a completed
//! [`preprocess`](StateRecorded::preprocess), so the undefined-behavior
//! paths are unrepresentable rather than checked late.
//!
//! The recorder emits into command buffers the caller has already begun;
//! preprocessing must be recorded outside a render pass, execution
//! wherever draws are legal.

use crate::device::DgcDevice;
use crate::error::{DgcError, Result};
use crate::layout::LayoutUsageFlags;
use crate::preprocess::{preprocess_to_execute_barrier, GeneratedCommandsInfo};
use ash::vk;

/// Where preprocessing happens relative to execution. An
/// implementation/performance choice: all three modes must produce
/// identical results for the same stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreprocessMode {
    /// Execute directly from the encoded stream.
    NoPreprocess,
    /// Preprocess on the execution command buffer, barrier, execute.
    SamePreprocessContext,
    /// Capture state on a separate throwaway command buffer; it can be
    /// freed the moment `preprocess` returns.
    SeparateStateContext,
}

impl PreprocessMode {
    pub fn uses_preprocess(self) -> bool {
        !matches!(self, Self::NoPreprocess)
    }

    pub fn separate_state(self) -> bool {
        matches!(self, Self::SeparateStateContext)
    }
}

/// Entry state of the protocol.
pub struct CommandStreamRecorder {
    mode: PreprocessMode,
    info: GeneratedCommandsInfo,
}

impl CommandStreamRecorder {
    pub fn new(mode: PreprocessMode, info: GeneratedCommandsInfo) -> Self {
        Self { mode, info }
    }

    /// Record pipeline/shader binding state.
    ///
    /// `bind` records the binds onto whichever command buffer supplies
    /// state for this mode: `state_cmd` in separate-state mode (where it
    /// is required), the execution buffer otherwise (where `state_cmd`
    /// must be absent). The closure may run again later to rebind state
    /// on the execution buffer.
    ///
    /// # Safety
    /// Both command buffers must be in the recording state.
    pub unsafe fn record_state<F>(
        self,
        execution_cmd: vk::CommandBuffer,
        state_cmd: Option<vk::CommandBuffer>,
        bind: F,
    ) -> Result<StateRecorded<F>>
    where
        F: Fn(vk::CommandBuffer),
    {
        match (self.mode.separate_state(), state_cmd) {
            (true, Some(cmd)) => bind(cmd),
            (false, None) => bind(execution_cmd),
            (true, None) => {
                return Err(DgcError::InvalidTransition(
                    "separate-state mode needs a state command buffer",
                ))
            }
            (false, Some(_)) => {
                return Err(DgcError::InvalidTransition(
                    "state command buffer is only used in separate-state mode",
                ))
            }
        }

        Ok(StateRecorded {
            mode: self.mode,
            info: self.info,
            execution_cmd,
            state_cmd,
            bind,
        })
    }
}

/// Binding state has been recorded on the state source.
pub struct StateRecorded<F> {
    mode: PreprocessMode,
    info: GeneratedCommandsInfo,
    execution_cmd: vk::CommandBuffer,
    state_cmd: Option<vk::CommandBuffer>,
    bind: F,
}

impl<F: Fn(vk::CommandBuffer)> StateRecorded<F> {
    /// Execute straight from the stream. [`NoPreprocess`](PreprocessMode::NoPreprocess) only.
    ///
    /// # Safety
    /// The execution command buffer must be recording, with any render
    /// pass state the generated draws require already in effect.
    pub unsafe fn execute(self, device: &DgcDevice) -> Result<()> {
        if self.mode.uses_preprocess() {
            return Err(DgcError::InvalidTransition(
                "preprocessing mode requires preprocess() before execute()",
            ));
        }
        self.info.with_vk_info(|vk_info| {
            device
                .ext()
                .cmd_execute_generated_commands(self.execution_cmd, false, vk_info);
        });
        Ok(())
    }

    /// Record the preprocess step on the execution buffer, followed by
    /// the preprocess→execute barrier.
    ///
    /// In separate-state mode the returned command buffer is the state
    /// buffer, handed back because the device has already captured
    /// everything it needs from it; the caller may free it immediately.
    /// The execution buffer is rebound in that case, since its own
    /// state was never set.
    ///
    /// # Safety
    /// The execution command buffer must be recording, outside a render
    /// pass.
    pub unsafe fn preprocess(
        self,
        device: &DgcDevice,
    ) -> Result<(Preprocessed, Option<vk::CommandBuffer>)> {
        if !self.mode.uses_preprocess() {
            return Err(DgcError::InvalidTransition(
                "no-preprocess mode cannot record a preprocess step",
            ));
        }
        if !self
            .info
            .layout_flags
            .contains(LayoutUsageFlags::EXPLICIT_PREPROCESS)
        {
            return Err(DgcError::ExplicitPreprocessRequired);
        }

        let state_source = match self.state_cmd {
            Some(cmd) => cmd,
            None => self.execution_cmd,
        };

        self.info.with_vk_info(|vk_info| {
            device
                .ext()
                .cmd_preprocess_generated_commands(self.execution_cmd, vk_info, state_source);
        });
        preprocess_to_execute_barrier(device.raw(), self.execution_cmd);

        let released = if self.mode.separate_state() {
            (self.bind)(self.execution_cmd);
            self.state_cmd
        } else {
            None
        };

        Ok((
            Preprocessed {
                info: self.info,
                execution_cmd: self.execution_cmd,
            },
            released,
        ))
    }
}

/// The stream has been preprocessed and the barrier recorded.
pub struct Preprocessed {
    info: GeneratedCommandsInfo,
    execution_cmd: vk::CommandBuffer,
}

impl Preprocessed {
    /// Execute the preprocessed commands.
    ///
    /// # Safety
    /// The execution command buffer must be recording, with any render
    /// pass state the generated draws require already in effect.
    pub unsafe fn execute(self, device: &DgcDevice) -> Result<()> {
        self.info.with_vk_info(|vk_info| {
            device
                .ext()
                .cmd_execute_generated_commands(self.execution_cmd, true, vk_info);
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_properties() {
        assert!(!PreprocessMode::NoPreprocess.uses_preprocess());
        assert!(PreprocessMode::SamePreprocessContext.uses_preprocess());
        assert!(PreprocessMode::SeparateStateContext.uses_preprocess());

        assert!(!PreprocessMode::NoPreprocess.separate_state());
        assert!(!PreprocessMode::SamePreprocessContext.separate_state());
        assert!(PreprocessMode::SeparateStateContext.separate_state());
    }
}
