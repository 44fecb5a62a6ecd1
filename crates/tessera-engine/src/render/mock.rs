//! Recording backend for GPU-free tests.

use std::collections::HashSet;

use super::backend::{BufferKind, DrawIndexed, DrawPass, GpuBackend, VertexLayout};
use super::shader::{self, ShaderDiagnostic, ShaderStage, StageInfo};

#[derive(Debug)]
pub(crate) struct MockBuffer(u32);

#[derive(Debug)]
pub(crate) struct MockShader {
    id: u32,
    info: StageInfo,
}

#[derive(Debug)]
pub(crate) struct MockProgram(u32);

#[derive(Debug, Clone)]
pub(crate) struct MockVertexArray {
    pub id: u32,
    pub vertex: Option<u32>,
    pub index: Option<u32>,
    pub layout: Option<VertexLayout>,
}

/// Tracks live handle ids and panics on double deletes.
#[derive(Debug, Default)]
pub(crate) struct MockBackend {
    next_id: u32,
    buffers: HashSet<u32>,
    shaders: HashSet<u32>,
    programs: HashSet<u32>,
    vertex_arrays: HashSet<u32>,
    last_vertex_array: Option<MockVertexArray>,

    pub uploads: Vec<(BufferKind, usize)>,
    pub shaders_compiled: u32,
    pub deletes: u32,
}

impl MockBackend {
    fn id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    pub fn live_buffers(&self) -> usize {
        self.buffers.len()
    }

    pub fn live_shaders(&self) -> usize {
        self.shaders.len()
    }

    pub fn live_programs(&self) -> usize {
        self.programs.len()
    }

    pub fn live_vertex_arrays(&self) -> usize {
        self.vertex_arrays.len()
    }

    /// Buffers, vertex arrays and programs (shader stages excluded).
    pub fn live_handles(&self) -> usize {
        self.live_buffers() + self.live_vertex_arrays() + self.live_programs()
    }

    pub fn last_vertex_array(&self) -> Option<&MockVertexArray> {
        self.last_vertex_array.as_ref()
    }
}

impl GpuBackend for MockBackend {
    type Buffer = MockBuffer;
    type Shader = MockShader;
    type Program = MockProgram;
    type VertexArray = MockVertexArray;

    fn create_vertex_array(&mut self, _label: &str) -> MockVertexArray {
        let id = self.id();
        self.vertex_arrays.insert(id);
        MockVertexArray { id, vertex: None, index: None, layout: None }
    }

    fn create_buffer(
        &mut self,
        vertex_array: &mut MockVertexArray,
        kind: BufferKind,
        _label: &str,
        contents: &[u8],
    ) -> MockBuffer {
        let id = self.id();
        self.buffers.insert(id);
        self.uploads.push((kind, contents.len()));
        match kind {
            BufferKind::Vertex => vertex_array.vertex = Some(id),
            BufferKind::Index => vertex_array.index = Some(id),
        }
        self.last_vertex_array = Some(vertex_array.clone());
        MockBuffer(id)
    }

    fn set_vertex_layout(&mut self, vertex_array: &mut MockVertexArray, layout: &VertexLayout) {
        vertex_array.layout = Some(layout.clone());
        self.last_vertex_array = Some(vertex_array.clone());
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        _label: &str,
        source: &str,
    ) -> Result<MockShader, ShaderDiagnostic> {
        let info = shader::compile_stage(stage, source)?;
        let id = self.id();
        self.shaders.insert(id);
        self.shaders_compiled += 1;
        Ok(MockShader { id, info })
    }

    fn link_program(
        &mut self,
        _label: &str,
        vertex: &MockShader,
        fragment: &MockShader,
        layout: &VertexLayout,
    ) -> Result<MockProgram, ShaderDiagnostic> {
        shader::link_stages(&vertex.info, &fragment.info, layout)?;
        let id = self.id();
        self.programs.insert(id);
        Ok(MockProgram(id))
    }

    fn delete_shader(&mut self, shader: MockShader) {
        assert!(self.shaders.remove(&shader.id), "shader {} deleted twice", shader.id);
        self.deletes += 1;
    }

    fn delete_buffer(&mut self, buffer: MockBuffer) {
        assert!(self.buffers.remove(&buffer.0), "buffer {} deleted twice", buffer.0);
        self.deletes += 1;
    }

    fn delete_vertex_array(&mut self, vertex_array: MockVertexArray) {
        assert!(
            self.vertex_arrays.remove(&vertex_array.id),
            "vertex array {} deleted twice",
            vertex_array.id
        );
        self.deletes += 1;
    }

    fn delete_program(&mut self, program: MockProgram) {
        assert!(self.programs.remove(&program.0), "program {} deleted twice", program.0);
        self.deletes += 1;
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) enum PassCommand {
    UseProgram(u32),
    BindVertexArray(u32),
    Draw(DrawIndexed),
}

#[derive(Debug, Default)]
pub(crate) struct MockPass {
    pub commands: Vec<PassCommand>,
}

impl DrawPass<MockBackend> for MockPass {
    fn use_program(&mut self, program: &MockProgram) {
        self.commands.push(PassCommand::UseProgram(program.0));
    }

    fn bind_vertex_array(&mut self, vertex_array: &MockVertexArray) {
        self.commands.push(PassCommand::BindVertexArray(vertex_array.id));
    }

    fn draw_indexed(&mut self, call: DrawIndexed) {
        self.commands.push(PassCommand::Draw(call));
    }
}
