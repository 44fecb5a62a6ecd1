//! Fixed quad: two triangles, one vertex buffer, one index buffer, one program.

use std::borrow::Cow;

use bytemuck::{Pod, Zeroable};

use super::backend::{BufferKind, DrawIndexed, DrawPass, GpuBackend, VertexLayout};
use super::shader::{ShaderBuildError, ShaderStage};

pub const VERTEX_SHADER: &str = include_str!("shaders/quad.vert.wgsl");
pub const FRAGMENT_SHADER: &str = include_str!("shaders/quad.frag.wgsl");

#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct QuadVertex {
    pub pos: [f32; 3], // clip space
}

impl QuadVertex {
    pub fn layout() -> VertexLayout {
        VertexLayout::packed_f32(3)
    }
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { pos: [0.5, 0.5, 0.0] },
    QuadVertex { pos: [0.5, -0.5, 0.0] },
    QuadVertex { pos: [-0.5, -0.5, 0.0] },
    QuadVertex { pos: [-0.5, 0.5, 0.5] },
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// The single draw issued per frame.
pub const fn quad_draw_call() -> DrawIndexed {
    DrawIndexed {
        index_count: QUAD_INDICES.len() as u32,
        first_index: 0,
        base_vertex: 0,
    }
}

/// WGSL sources for the two stages.
#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl Default for ShaderSources {
    fn default() -> Self {
        Self {
            vertex: Cow::Borrowed(VERTEX_SHADER),
            fragment: Cow::Borrowed(FRAGMENT_SHADER),
        }
    }
}

/// The four live handles of a loaded quad.
///
/// Built all at once by [`QuadResources::create`] and released all at once by
/// [`QuadResources::release`].
pub struct QuadResources<B: GpuBackend> {
    vertex_buffer: B::Buffer,
    index_buffer: B::Buffer,
    vertex_array: B::VertexArray,
    program: B::Program,
}

impl<B: GpuBackend> QuadResources<B> {
    /// Runs the load sequence. On a shader failure every handle created so
    /// far is deleted before the diagnostics are returned.
    pub fn create(backend: &mut B, sources: &ShaderSources) -> Result<Self, ShaderBuildError> {
        let mut vertex_array = backend.create_vertex_array("tessera quad vao");

        let vertex_buffer = backend.create_buffer(
            &mut vertex_array,
            BufferKind::Vertex,
            "tessera quad vbo",
            bytemuck::cast_slice(&QUAD_VERTICES),
        );

        let index_buffer = backend.create_buffer(
            &mut vertex_array,
            BufferKind::Index,
            "tessera quad ibo",
            bytemuck::cast_slice(&QUAD_INDICES),
        );

        let layout = QuadVertex::layout();

        let program = match build_program(backend, sources, &layout) {
            Ok(p) => p,
            Err(err) => {
                backend.delete_buffer(vertex_buffer);
                backend.delete_buffer(index_buffer);
                backend.delete_vertex_array(vertex_array);
                return Err(err);
            }
        };

        backend.set_vertex_layout(&mut vertex_array, &layout);

        Ok(Self {
            vertex_buffer,
            index_buffer,
            vertex_array,
            program,
        })
    }

    pub fn draw<P: DrawPass<B>>(&self, pass: &mut P) {
        pass.use_program(&self.program);
        pass.bind_vertex_array(&self.vertex_array);
        pass.draw_indexed(quad_draw_call());
    }

    pub fn release(self, backend: &mut B) {
        backend.delete_buffer(self.vertex_buffer);
        backend.delete_buffer(self.index_buffer);
        backend.delete_vertex_array(self.vertex_array);
        backend.delete_program(self.program);
    }
}

/// Compiles both stages even when the first one fails, so every compile
/// diagnostic is reported.
fn build_program<B: GpuBackend>(
    backend: &mut B,
    sources: &ShaderSources,
    layout: &VertexLayout,
) -> Result<B::Program, ShaderBuildError> {
    let vertex = backend.compile_shader(ShaderStage::Vertex, "tessera quad vs", &sources.vertex);
    let fragment =
        backend.compile_shader(ShaderStage::Fragment, "tessera quad fs", &sources.fragment);

    let (vertex, fragment) = match (vertex, fragment) {
        (Ok(vs), Ok(fs)) => (vs, fs),
        (Err(vs_diag), Err(fs_diag)) => return Err(ShaderBuildError::new(vs_diag, [fs_diag])),
        (Err(diag), Ok(fs)) => {
            backend.delete_shader(fs);
            return Err(diag.into());
        }
        (Ok(vs), Err(diag)) => {
            backend.delete_shader(vs);
            return Err(diag.into());
        }
    };

    let program = backend.link_program("tessera quad program", &vertex, &fragment, layout);

    // Stage units are only needed for linking.
    backend.delete_shader(vertex);
    backend.delete_shader(fragment);

    program.map_err(ShaderBuildError::from)
}

/// Owner of the optional quad resources across the app lifecycle.
pub struct QuadScene<B: GpuBackend> {
    sources: ShaderSources,
    resources: Option<QuadResources<B>>,
}

impl<B: GpuBackend> Default for QuadScene<B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: GpuBackend> QuadScene<B> {
    pub fn new() -> Self {
        Self::with_sources(ShaderSources::default())
    }

    pub fn with_sources(sources: ShaderSources) -> Self {
        Self { sources, resources: None }
    }

    pub fn is_loaded(&self) -> bool {
        self.resources.is_some()
    }

    /// Creates the GPU resources. A second call while loaded is ignored.
    ///
    /// Each shader diagnostic is logged, then all are returned; the scene
    /// stays unloaded and [`render`](Self::render) draws nothing.
    pub fn load(&mut self, backend: &mut B) -> Result<(), ShaderBuildError> {
        if self.resources.is_some() {
            log::warn!("quad scene already loaded; ignoring load");
            return Ok(());
        }

        match QuadResources::create(backend, &self.sources) {
            Ok(resources) => {
                self.resources = Some(resources);
                log::debug!(
                    "quad loaded: {} vertices, {} indices",
                    QUAD_VERTICES.len(),
                    QUAD_INDICES.len()
                );
                Ok(())
            }
            Err(err) => {
                for diag in err.diagnostics() {
                    log::error!("{diag}");
                }
                Err(err)
            }
        }
    }

    /// Records the quad draw. Returns `false` when nothing is loaded.
    pub fn render<P: DrawPass<B>>(&self, pass: &mut P) -> bool {
        let Some(resources) = self.resources.as_ref() else { return false };
        resources.draw(pass);
        true
    }

    /// Releases the GPU resources if loaded. Safe to call repeatedly.
    pub fn release(&mut self, backend: &mut B) {
        if let Some(resources) = self.resources.take() {
            resources.release(backend);
            log::debug!("quad released");
        }
    }
}
