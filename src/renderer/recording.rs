use anyhow::{bail, Result};
use glam::Mat4;

use super::{DepthPass, LitPass, ShadowBackend};
use crate::light::MAX_LIGHTS;
use crate::shadow::LitFrameUniform;

/// Depth target handle handed out by [`RecordingBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordedDepthTarget {
    pub id: u32,
    pub slot: usize,
    pub layers: u32,
    pub resolution: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub enum BackendCommand {
    BeginFrame,
    CreateDepthTarget { slot: usize, id: u32, layers: u32, resolution: u32 },
    ClearDepthSlice { slot: usize, id: u32, layer: u32 },
    DrawDepth { slot: usize, id: u32, layer: u32, view_proj: Mat4, draws: usize },
    LitPass { bound: [Option<u32>; MAX_LIGHTS], uniform: Box<LitFrameUniform>, draws: usize },
    EndFrame,
}

/// Backend that records what it is asked to do instead of talking to a GPU. Used by tests and
/// dry runs of the binary.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    commands: Vec<BackendCommand>,
    next_id: u32,
    fail_allocations: bool,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent depth-target allocation fail.
    pub fn fail_allocations(&mut self, fail: bool) {
        self.fail_allocations = fail;
    }

    pub fn commands(&self) -> &[BackendCommand] {
        &self.commands
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn depth_draws_for_slot(&self, slot: usize) -> usize {
        self.commands
            .iter()
            .filter(|cmd| matches!(cmd, BackendCommand::DrawDepth { slot: s, .. } if *s == slot))
            .count()
    }

    pub fn allocations_for_slot(&self, slot: usize) -> Vec<u32> {
        self.commands
            .iter()
            .filter_map(|cmd| match cmd {
                BackendCommand::CreateDepthTarget { slot: s, layers, .. } if *s == slot => Some(*layers),
                _ => None,
            })
            .collect()
    }

    pub fn lit_passes(&self) -> Vec<&BackendCommand> {
        self.commands.iter().filter(|cmd| matches!(cmd, BackendCommand::LitPass { .. })).collect()
    }

    /// Uniform block handed to the most recent lit pass.
    pub fn last_lit_uniform(&self) -> Option<&LitFrameUniform> {
        self.commands.iter().rev().find_map(|cmd| match cmd {
            BackendCommand::LitPass { uniform, .. } => Some(uniform.as_ref()),
            _ => None,
        })
    }
}

impl ShadowBackend for RecordingBackend {
    type DepthTarget = RecordedDepthTarget;

    fn create_depth_target(&mut self, slot: usize, layers: u32, resolution: u32) -> Result<Self::DepthTarget> {
        if self.fail_allocations {
            bail!("Depth target allocation refused for light slot {slot} ({layers} layers)");
        }
        let id = self.next_id;
        self.next_id += 1;
        self.commands.push(BackendCommand::CreateDepthTarget { slot, id, layers, resolution });
        Ok(RecordedDepthTarget { id, slot, layers, resolution })
    }

    fn begin_frame(&mut self) -> Result<()> {
        self.commands.push(BackendCommand::BeginFrame);
        Ok(())
    }

    fn depth_pass(&mut self, pass: DepthPass<'_, Self::DepthTarget>) -> Result<()> {
        if pass.layer >= pass.target.layers {
            bail!(
                "Depth layer {} out of range for target {} ({} layers)",
                pass.layer,
                pass.target.id,
                pass.target.layers
            );
        }
        let (slot, id, layer) = (pass.slot, pass.target.id, pass.layer);
        self.commands.push(BackendCommand::ClearDepthSlice { slot, id, layer });
        self.commands.push(BackendCommand::DrawDepth {
            slot,
            id,
            layer,
            view_proj: pass.view_proj,
            draws: pass.casters.len(),
        });
        Ok(())
    }

    fn lit_pass(&mut self, pass: LitPass<'_, Self::DepthTarget>) -> Result<()> {
        let mut bound = [None; MAX_LIGHTS];
        for (dst, target) in bound.iter_mut().zip(pass.depth_targets.iter()) {
            *dst = target.map(|t| t.id);
        }
        self.commands.push(BackendCommand::LitPass {
            bound,
            uniform: Box::new(*pass.uniform),
            draws: pass.draws.len(),
        });
        Ok(())
    }

    fn end_frame(&mut self) -> Result<()> {
        self.commands.push(BackendCommand::EndFrame);
        Ok(())
    }
}
