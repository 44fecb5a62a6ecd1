//! Handle-level GPU operations used by the quad scene.
//!
//! `GpuBackend` owns handle creation and destruction; `DrawPass` records the
//! per-frame bind + draw commands. `WgpuBackend` is the real implementation,
//! tests use a recording backend.

use super::shader::{ShaderDiagnostic, ShaderStage};

/// Which binding point a buffer is created for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum BufferKind {
    Vertex,
    Index,
}

/// Single float vertex attribute.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct VertexAttribute {
    /// Shader input location.
    pub location: u32,
    /// Number of `f32` components (1..=4).
    pub components: u32,
    pub normalized: bool,
    /// Byte offset inside one vertex.
    pub offset: u64,
}

/// Layout of one interleaved vertex buffer.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct VertexLayout {
    /// Bytes between consecutive vertices.
    pub stride: u64,
    pub attributes: Vec<VertexAttribute>,
}

impl VertexLayout {
    /// Layout with a single attribute at location 0 and a tight stride.
    pub fn packed_f32(components: u32) -> Self {
        Self {
            stride: u64::from(components) * std::mem::size_of::<f32>() as u64,
            attributes: vec![VertexAttribute {
                location: 0,
                components,
                normalized: false,
                offset: 0,
            }],
        }
    }

    pub fn provides_location(&self, location: u32) -> bool {
        self.attributes.iter().any(|a| a.location == location)
    }
}

/// Indexed triangle-list draw request over `u32` indices.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct DrawIndexed {
    pub index_count: u32,
    pub first_index: u32,
    pub base_vertex: i32,
}

/// Handle lifecycle operations.
///
/// Every `create_*`/`compile_*`/`link_*` has a matching `delete_*` taking the
/// handle by value, so a handle cannot be released twice.
pub trait GpuBackend {
    type Buffer;
    type Shader;
    type Program;
    type VertexArray;

    fn create_vertex_array(&mut self, label: &str) -> Self::VertexArray;

    /// Creates a buffer, uploads `contents` as static data and binds it to
    /// `vertex_array` at the slot implied by `kind`.
    fn create_buffer(
        &mut self,
        vertex_array: &mut Self::VertexArray,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> Self::Buffer;

    /// Describes and enables the vertex attributes of `vertex_array`.
    fn set_vertex_layout(&mut self, vertex_array: &mut Self::VertexArray, layout: &VertexLayout);

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<Self::Shader, ShaderDiagnostic>;

    /// Links a vertex and a fragment stage. The stages stay owned by the caller.
    fn link_program(
        &mut self,
        label: &str,
        vertex: &Self::Shader,
        fragment: &Self::Shader,
        layout: &VertexLayout,
    ) -> Result<Self::Program, ShaderDiagnostic>;

    fn delete_shader(&mut self, shader: Self::Shader);
    fn delete_buffer(&mut self, buffer: Self::Buffer);
    fn delete_vertex_array(&mut self, vertex_array: Self::VertexArray);
    fn delete_program(&mut self, program: Self::Program);
}

/// Per-frame command recording against handles of backend `B`.
pub trait DrawPass<B: GpuBackend> {
    fn use_program(&mut self, program: &B::Program);
    fn bind_vertex_array(&mut self, vertex_array: &B::VertexArray);
    fn draw_indexed(&mut self, call: DrawIndexed);
}
