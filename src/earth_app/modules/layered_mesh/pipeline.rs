use std::{borrow::Cow, collections::BTreeMap};

use strum::EnumCount;

use crate::framework::{
    assets::TextureBinding,
    gpu::{self, vertices::{MeshVertex, Vertex}},
    renderer::{RenderContext, TextureCache},
    scene_graph::TextureSlot,
};

use super::{LightsUniform, MaterialUniform, SurfacePipeline};

#[repr(C)]
#[derive(Debug, Copy, Clone, bytemuck::Pod, bytemuck::Zeroable)]
pub struct PushConstants {
    pub model: glam::Mat4,
}

/// Render pipelines of lit and unlit triangle meshes together with their shared bind group layouts
///  - group 0: globals
///  - group 1: lights
///  - group 2: material uniform, one texture per [`TextureSlot`] and a sampler
#[derive(Debug)]
pub struct MeshPipelines {
    pipelines:                  BTreeMap<SurfacePipeline, wgpu::RenderPipeline>,
    material_bind_group_layout: wgpu::BindGroupLayout,
    lights_buffer:              gpu::Buffer<LightsUniform>,
    lights_bind_group:          wgpu::BindGroup,
}

impl MeshPipelines {

    #[profiler::function]
    pub fn new(context: &RenderContext) -> Self {
        let device = &context.gpu.device;

        // ⬇ load and compile wgsl shader code
        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Layered Mesh Shader"),
            source: wgpu::ShaderSource::Wgsl(Cow::Borrowed(include_str!("_shader.wgsl"))),
        });

        let lights_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Lights Bind Group Layout"),
            entries: &[uniform_entry(0)],
        });
        let lights_buffer = gpu::Buffer::new_uniform(&context.gpu, Some("Mesh Lights Uniform Buffer"), LightsUniform::default());
        let lights_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Lights Bind Group"),
            layout: &lights_bind_group_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: lights_buffer.buffer.as_entire_binding(),
            }],
        });

        // ⬇ material uniform is followed by one texture binding per slot and the sampler
        let mut material_entries = vec![uniform_entry(0)];
        for slot in 0..TextureSlot::COUNT {
            material_entries.push(wgpu::BindGroupLayoutEntry {
                binding: 1 + slot as u32,
                visibility: wgpu::ShaderStages::FRAGMENT,
                ty: wgpu::BindingType::Texture {
                    sample_type: wgpu::TextureSampleType::Float { filterable: true },
                    view_dimension: wgpu::TextureViewDimension::D2,
                    multisampled: false,
                },
                count: None,
            });
        }
        material_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1 + TextureSlot::COUNT as u32,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
            count: None,
        });
        let material_bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("Mesh Material Bind Group Layout"),
            entries: &material_entries,
        });

        // ⬇ define layout of buffers for our render pipelines
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Layered Mesh Pipeline Layout"),
            bind_group_layouts: &[
                &context.globals.bind_group_layout,
                &lights_bind_group_layout,
                &material_bind_group_layout,
            ],
            // model matrix of drawn surface as push constant
            push_constant_ranges: &[wgpu::PushConstantRange {
                stages: wgpu::ShaderStages::VERTEX,
                range: 0..std::mem::size_of::<PushConstants>() as u32,
            }],
        });

        let pipelines = [
            SurfacePipeline::Opaque,
            SurfacePipeline::AdditiveDepthWrite,
            SurfacePipeline::AlphaBlended,
            SurfacePipeline::Additive,
        ]
        .into_iter()
        .map(|kind| (kind, create_pipeline(context, kind, &shader, &pipeline_layout)))
        .collect();

        Self {
            pipelines,
            material_bind_group_layout,
            lights_buffer,
            lights_bind_group,
        }
    }

    pub fn pipeline(&self, kind: SurfacePipeline) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(&kind)
    }

    pub fn lights_bind_group(&self) -> &wgpu::BindGroup {
        &self.lights_bind_group
    }

    pub fn update_lights(&mut self, gpu: &gpu::Context, lights: LightsUniform) {
        self.lights_buffer.queue_update(gpu, &[lights]);
    }

    /// Binds material uniform with textures currently resolved for the surface.
    pub fn create_material_bind_group(
        &self,
        gpu: &gpu::Context,
        uniform: &gpu::Buffer<MaterialUniform>,
        textures: &TextureCache,
        bindings: &[TextureBinding; TextureSlot::COUNT],
    ) -> wgpu::BindGroup {
        let mut entries = vec![wgpu::BindGroupEntry {
            binding: 0,
            resource: uniform.buffer.as_entire_binding(),
        }];
        for (slot, binding) in bindings.iter().enumerate() {
            entries.push(wgpu::BindGroupEntry {
                binding: 1 + slot as u32,
                resource: wgpu::BindingResource::TextureView(textures.view(*binding)),
            });
        }
        entries.push(wgpu::BindGroupEntry {
            binding: 1 + TextureSlot::COUNT as u32,
            resource: wgpu::BindingResource::Sampler(textures.sampler()),
        });

        gpu.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("Mesh Material Bind Group"),
            layout: &self.material_bind_group_layout,
            entries: &entries,
        })
    }
}

fn uniform_entry(binding: u32) -> wgpu::BindGroupLayoutEntry {
    wgpu::BindGroupLayoutEntry {
        binding,
        visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
        ty: wgpu::BindingType::Buffer {
            ty: wgpu::BufferBindingType::Uniform,
            has_dynamic_offset: false,
            min_binding_size: None,
        },
        count: None,
    }
}

fn create_pipeline(
    context: &RenderContext,
    kind: SurfacePipeline,
    shader: &wgpu::ShaderModule,
    layout: &wgpu::PipelineLayout,
) -> wgpu::RenderPipeline {
    context.gpu.device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some(kind.label()),
        layout: Some(layout),
        // ⬇ Vertex shader -> define an entry point in our shader
        vertex: wgpu::VertexState {
            module: shader,
            entry_point: "vs_main",
            buffers: &[MeshVertex::vertex_layout()],
        },
        // ⬇ Fragment shader -> define an entry point in our shader
        fragment: Some(wgpu::FragmentState {
            module: shader,
            entry_point: "fs_main",
            targets: &[Some(wgpu::ColorTargetState {
                format: context.surface_config.format,
                blend: kind.blend(),
                write_mask: wgpu::ColorWrites::ALL,
            })],
        }),
        // ⬇ triplets of indexed vertices are individual triangles, back faces are culled
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            unclipped_depth: false,
            polygon_mode: wgpu::PolygonMode::Fill,
            conservative: false,
        },
        depth_stencil: Some(gpu::DepthStencilTexture::stencil(kind.depth_write())),
        multisample: gpu::multisample_state(context.sample_count),
        multiview: None,
    })
}
