//! GPU rendering subsystem.
//!
//! `backend` defines the handle-level seam, `wgpu_backend` implements it,
//! `quad` owns the fixed geometry and its load/draw/release sequence and
//! `shader` checks WGSL stages before they reach the device.
//!
//! Convention: vertex positions are already in clip space.

mod backend;
pub mod quad;
mod shader;
mod wgpu_backend;

#[cfg(test)]
pub(crate) mod mock;

pub use backend::{BufferKind, DrawIndexed, DrawPass, GpuBackend, VertexAttribute, VertexLayout};
pub use quad::{QuadResources, QuadScene, ShaderSources};
pub use shader::{
    compile_stage, link_stages, ShaderBuildError, ShaderDiagnostic, ShaderPhase, ShaderStage,
    StageInfo,
};
pub use wgpu_backend::{WgpuBackend, WgpuPass, WgpuShader, WgpuVertexArray};
