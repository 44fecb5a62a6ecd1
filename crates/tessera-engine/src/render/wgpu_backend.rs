use wgpu::util::DeviceExt;

use super::backend::{BufferKind, DrawIndexed, DrawPass, GpuBackend, VertexAttribute, VertexLayout};
use super::shader::{self, ShaderDiagnostic, ShaderStage, StageInfo};

/// `GpuBackend` over a wgpu device.
///
/// Keeps a clone of the device handle, so an app can hold on to it between
/// callbacks. Programs target `surface_format`.
pub struct WgpuBackend {
    device: wgpu::Device,
    surface_format: wgpu::TextureFormat,
}

impl WgpuBackend {
    pub fn new(device: &wgpu::Device, surface_format: wgpu::TextureFormat) -> Self {
        Self {
            device: device.clone(),
            surface_format,
        }
    }
}

/// Validated shader module plus the facts needed to link it.
pub struct WgpuShader {
    module: wgpu::ShaderModule,
    info: StageInfo,
}

/// Vertex array equivalent: the buffers bound for drawing plus the
/// attribute layout described for them.
#[derive(Default)]
pub struct WgpuVertexArray {
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    layout: Option<VertexLayout>,
}

impl GpuBackend for WgpuBackend {
    type Buffer = wgpu::Buffer;
    type Shader = WgpuShader;
    type Program = wgpu::RenderPipeline;
    type VertexArray = WgpuVertexArray;

    fn create_vertex_array(&mut self, _label: &str) -> WgpuVertexArray {
        WgpuVertexArray::default()
    }

    fn create_buffer(
        &mut self,
        vertex_array: &mut WgpuVertexArray,
        kind: BufferKind,
        label: &str,
        contents: &[u8],
    ) -> wgpu::Buffer {
        let usage = match kind {
            BufferKind::Vertex => wgpu::BufferUsages::VERTEX,
            BufferKind::Index => wgpu::BufferUsages::INDEX,
        };

        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(label),
            contents,
            usage,
        });

        match kind {
            BufferKind::Vertex => vertex_array.vertex_buffer = Some(buffer.clone()),
            BufferKind::Index => vertex_array.index_buffer = Some(buffer.clone()),
        }

        buffer
    }

    fn set_vertex_layout(&mut self, vertex_array: &mut WgpuVertexArray, layout: &VertexLayout) {
        vertex_array.layout = Some(layout.clone());
    }

    fn compile_shader(
        &mut self,
        stage: ShaderStage,
        label: &str,
        source: &str,
    ) -> Result<WgpuShader, ShaderDiagnostic> {
        // Validate first: wgpu treats invalid modules as uncaptured device errors.
        let info = shader::compile_stage(stage, source)?;

        let module = self.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(label),
            source: wgpu::ShaderSource::Wgsl(source.into()),
        });

        Ok(WgpuShader { module, info })
    }

    fn link_program(
        &mut self,
        label: &str,
        vertex: &WgpuShader,
        fragment: &WgpuShader,
        layout: &VertexLayout,
    ) -> Result<wgpu::RenderPipeline, ShaderDiagnostic> {
        shader::link_stages(&vertex.info, &fragment.info, layout)?;

        let attributes = layout
            .attributes
            .iter()
            .map(to_wgpu_attribute)
            .collect::<Result<Vec<_>, _>>()?;

        let buffers = [wgpu::VertexBufferLayout {
            array_stride: layout.stride,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &attributes,
        }];

        let pipeline_layout = self.device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some(label),
            bind_group_layouts: &[],
            immediate_size: 0,
        });

        let pipeline = self.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &vertex.module,
                entry_point: Some(vertex.info.entry_point.as_str()),
                compilation_options: Default::default(),
                buffers: &buffers,
            },

            fragment: Some(wgpu::FragmentState {
                module: &fragment.module,
                entry_point: Some(fragment.info.entry_point.as_str()),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: self.surface_format,
                    blend: None,
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

        Ok(pipeline)
    }

    fn delete_shader(&mut self, shader: WgpuShader) {
        drop(shader);
    }

    fn delete_buffer(&mut self, buffer: wgpu::Buffer) {
        buffer.destroy();
    }

    fn delete_vertex_array(&mut self, vertex_array: WgpuVertexArray) {
        drop(vertex_array);
    }

    fn delete_program(&mut self, program: wgpu::RenderPipeline) {
        drop(program);
    }
}

fn to_wgpu_attribute(attr: &VertexAttribute) -> Result<wgpu::VertexAttribute, ShaderDiagnostic> {
    // `normalized` has no effect on float attributes.
    let format = match attr.components {
        1 => wgpu::VertexFormat::Float32,
        2 => wgpu::VertexFormat::Float32x2,
        3 => wgpu::VertexFormat::Float32x3,
        4 => wgpu::VertexFormat::Float32x4,
        n => {
            return Err(ShaderDiagnostic::link(format!(
                "attribute at location {} has {n} components; expected 1..=4",
                attr.location
            )));
        }
    };

    Ok(wgpu::VertexAttribute {
        format,
        offset: attr.offset,
        shader_location: attr.location,
    })
}

/// Render pass wrapper handed to frame callbacks.
///
/// Binding a vertex array only remembers its index buffer; it is set on the
/// pass when a draw is issued.
pub struct WgpuPass<'p> {
    pass: wgpu::RenderPass<'p>,
    index_buffer: Option<wgpu::Buffer>,
}

impl<'p> WgpuPass<'p> {
    pub(crate) fn new(pass: wgpu::RenderPass<'p>) -> Self {
        Self { pass, index_buffer: None }
    }
}

impl DrawPass<WgpuBackend> for WgpuPass<'_> {
    fn use_program(&mut self, program: &wgpu::RenderPipeline) {
        self.pass.set_pipeline(program);
    }

    fn bind_vertex_array(&mut self, vertex_array: &WgpuVertexArray) {
        self.index_buffer = vertex_array.index_buffer.clone();

        // Without a layout no attribute is enabled, so the vertex buffer stays unbound.
        if vertex_array.layout.is_none() {
            log::warn!("vertex array has no attribute layout; vertex buffer not bound");
            return;
        }
        if let Some(vbo) = vertex_array.vertex_buffer.as_ref() {
            self.pass.set_vertex_buffer(0, vbo.slice(..));
        }
    }

    fn draw_indexed(&mut self, call: DrawIndexed) {
        let Some(ibo) = self.index_buffer.as_ref() else {
            log::warn!("indexed draw without a bound index buffer; skipped");
            return;
        };

        self.pass.set_index_buffer(ibo.slice(..), wgpu::IndexFormat::Uint32);

        let first = call.first_index;
        self.pass.draw_indexed(first..first + call.index_count, call.base_vertex, 0..1);
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::render::quad::{QUAD_INDICES, QUAD_VERTICES, QuadScene, ShaderSources};

    const TARGET_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8Unorm;

    /// Device on wgpu's noop backend plus a log of uncaptured device errors.
    fn noop_device() -> (wgpu::Device, wgpu::Queue, Arc<Mutex<Vec<String>>>) {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::NOOP,
            backend_options: wgpu::BackendOptions {
                noop: wgpu::NoopBackendOptions { enable: true },
                ..Default::default()
            },
            ..Default::default()
        });

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions::default()))
            .expect("noop adapter");
        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor::default()))
            .expect("noop device");

        let errors = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&errors);
        device.on_uncaptured_error(Arc::new(move |e: wgpu::Error| {
            sink.lock().unwrap().push(e.to_string());
        }));

        (device, queue, errors)
    }

    fn assert_no_device_errors(errors: &Mutex<Vec<String>>) {
        let errors = errors.lock().unwrap();
        assert!(errors.is_empty(), "uncaptured device errors: {errors:?}");
    }

    #[test]
    fn quad_loads_and_releases_twice_on_device() {
        let (device, _queue, errors) = noop_device();
        let mut backend = WgpuBackend::new(&device, TARGET_FORMAT);
        let mut scene: QuadScene<WgpuBackend> = QuadScene::new();

        scene.load(&mut backend).expect("quad loads");
        assert!(scene.is_loaded());

        scene.release(&mut backend);
        scene.release(&mut backend);
        assert!(!scene.is_loaded());

        assert_no_device_errors(&errors);
    }

    #[test]
    fn buffers_hold_exact_bytes_and_bind_to_vertex_array() {
        let (device, _queue, errors) = noop_device();
        let mut backend = WgpuBackend::new(&device, TARGET_FORMAT);
        let mut vao = backend.create_vertex_array("test vao");

        let vbo = backend.create_buffer(
            &mut vao,
            BufferKind::Vertex,
            "test vbo",
            bytemuck::cast_slice(&QUAD_VERTICES),
        );
        let ibo = backend.create_buffer(
            &mut vao,
            BufferKind::Index,
            "test ibo",
            bytemuck::cast_slice(&QUAD_INDICES),
        );

        assert_eq!(vbo.size(), 48);
        assert!(vbo.usage().contains(wgpu::BufferUsages::VERTEX));
        assert_eq!(ibo.size(), 24);
        assert!(ibo.usage().contains(wgpu::BufferUsages::INDEX));
        assert!(vao.vertex_buffer.is_some());
        assert!(vao.index_buffer.is_some());
        assert!(vao.layout.is_none());

        backend.delete_buffer(vbo);
        backend.delete_buffer(ibo);
        backend.delete_vertex_array(vao);

        assert_no_device_errors(&errors);
    }

    #[test]
    fn invalid_source_never_reaches_device() {
        let (device, _queue, errors) = noop_device();
        let mut backend = WgpuBackend::new(&device, TARGET_FORMAT);
        let mut scene = QuadScene::with_sources(ShaderSources {
            vertex: "not wgsl".into(),
            fragment: "also not wgsl".into(),
        });

        let err = scene.load(&mut backend).unwrap_err();
        assert_eq!(err.diagnostics().len(), 2);
        assert!(!scene.is_loaded());

        assert_no_device_errors(&errors);
    }

    #[test]
    fn loaded_quad_records_one_indexed_draw() {
        let (device, queue, errors) = noop_device();
        let mut backend = WgpuBackend::new(&device, TARGET_FORMAT);
        let mut scene: QuadScene<WgpuBackend> = QuadScene::new();
        scene.load(&mut backend).expect("quad loads");

        let target = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("test target"),
            size: wgpu::Extent3d { width: 800, height: 600, depth_or_array_layers: 1 },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TARGET_FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = target.create_view(&wgpu::TextureViewDescriptor::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor::default());

        {
            let rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("test pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color::BLACK),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
                multiview_mask: None,
            });

            let mut pass = WgpuPass::new(rpass);
            assert!(scene.render(&mut pass));
            assert!(pass.index_buffer.is_some());
        }

        queue.submit(std::iter::once(encoder.finish()));
        scene.release(&mut backend);

        assert_no_device_errors(&errors);
    }

    #[test]
    fn packed_layout_maps_to_float32x3() {
        let layout = VertexLayout::packed_f32(3);
        let attr = to_wgpu_attribute(&layout.attributes[0]).unwrap();
        assert_eq!(attr.format, wgpu::VertexFormat::Float32x3);
        assert_eq!(attr.offset, 0);
        assert_eq!(attr.shader_location, 0);
    }

    #[test]
    fn oversized_attribute_is_a_link_error() {
        let attr = VertexAttribute { location: 1, components: 5, normalized: false, offset: 0 };
        assert!(to_wgpu_attribute(&attr).is_err());
    }
}
